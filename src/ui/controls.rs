// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Per-stage action buttons.

use crate::models::wizard::Stage;

/// What the user asked for this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlAction {
    None,
    Upload,
    Rotate(f64),
    ConfirmRotation,
    Back,
    CropAndSave,
    Restart,
}

/// Display the buttons for the current stage.
pub fn show(ui: &mut egui::Ui, stage: &Stage, rotation_step: f64, busy: bool) -> ControlAction {
    let mut action = ControlAction::None;

    ui.horizontal(|ui| {
        match stage {
            Stage::Idle | Stage::Processing { .. } => {
                let button = egui::Button::new("Upload Bangle Image");
                if ui.add_enabled(!busy, button).clicked() {
                    action = ControlAction::Upload;
                }
            }
            Stage::Rotating { image } => {
                if ui.button("← Left").clicked() {
                    action = ControlAction::Rotate(-rotation_step);
                }
                if ui.button("Right →").clicked() {
                    action = ControlAction::Rotate(rotation_step);
                }
                ui.label(format!("Rotation: {:+.0}°", image.angle()));
                ui.separator();
                if ui.button("Done").clicked() {
                    action = ControlAction::ConfirmRotation;
                }
            }
            Stage::Cropping { crop, error, .. } => {
                if ui.button("Back").clicked() {
                    action = ControlAction::Back;
                }
                let region = crop.region();
                ui.label(format!("Selection: {:.0} × {:.0}", region.width, region.height));
                ui.separator();
                if ui.button("Crop & Save").clicked() {
                    action = ControlAction::CropAndSave;
                }
                // Shown here so the canvas above keeps its size.
                if let Some(message) = error {
                    ui.separator();
                    ui.colored_label(egui::Color32::LIGHT_RED, format!("Failed: {}", message));
                }
            }
            Stage::Done { .. } | Stage::Failed { .. } => {
                if ui.button("Start over").clicked() {
                    action = ControlAction::Restart;
                }
            }
        }
    });

    action
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::crop::{CropRectangle, CropRegion};
    use crate::models::session::SourceImage;
    use image::RgbaImage;
    use std::path::PathBuf;

    fn cropping(error: Option<String>) -> Stage {
        Stage::Cropping {
            image: SourceImage::new(
                PathBuf::from("bangle.png"),
                "bangle".to_string(),
                PathBuf::from("bangle_no_bg.png"),
                RgbaImage::new(4, 4),
            ),
            crop: CropRectangle::new(CropRegion::new(0.0, 0.0, 2.0, 2.0), 20.0),
            error,
        }
    }

    /// Lay the controls out in a bottom panel and return the panel's height.
    fn panel_height(stage: &Stage) -> f32 {
        let ctx = egui::Context::default();
        let mut height = 0.0;
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            let panel = egui::TopBottomPanel::bottom("controls").show(ctx, |ui| {
                assert_eq!(show(ui, stage, 1.0, false), ControlAction::None);
            });
            height = panel.response.rect.height();
        });
        height
    }

    #[test]
    fn test_crop_error_stays_in_one_row() {
        let plain = panel_height(&cropping(None));
        let failed = panel_height(&cropping(Some("crop region is empty".to_string())));
        assert!(plain > 0.0);
        assert!((failed - plain).abs() < 1.0, "{} vs {}", failed, plain);
    }
}
