// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Wizard progress bar.
//!
//! This module shows which step of upload → background removal → rotate →
//! crop the user is on, with a short hint for the current step.

use crate::models::wizard::Stage;

/// The four wizard steps, in order.
const STEPS: [&str; 4] = ["① Upload", "② Remove background", "③ Rotate", "④ Crop"];

/// Index into `STEPS` for `stage`; `None` once the flow has ended.
fn current_step(stage: &Stage) -> Option<usize> {
    match stage {
        Stage::Idle => Some(0),
        Stage::Processing { .. } => Some(1),
        Stage::Rotating { .. } => Some(2),
        Stage::Cropping { .. } => Some(3),
        Stage::Done { .. } | Stage::Failed { .. } => None,
    }
}

fn hint(stage: &Stage) -> &'static str {
    match stage {
        Stage::Idle => "Pick a PNG or JPEG photo of a bangle",
        Stage::Processing { .. } => "Removing background, this can take a moment",
        Stage::Rotating { .. } => "Straighten the bangle with the arrow buttons or the ←/→ keys",
        Stage::Cropping { .. } => "Drag the rectangle to move it, drag its edges or corners to resize",
        Stage::Done { .. } => "Finished",
        Stage::Failed { .. } => "Something went wrong",
    }
}

/// Display the progress bar for the current stage.
pub fn show(ui: &mut egui::Ui, stage: &Stage) {
    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        let current = current_step(stage);
        for (index, step) in STEPS.iter().enumerate() {
            if index > 0 {
                ui.label(egui::RichText::new("›").weak());
            }
            // Not clickable: the wizard only moves through its own buttons.
            let _ = ui.selectable_label(current == Some(index), *step);
        }

        ui.separator();

        ui.label(egui::RichText::new(hint(stage)).italics().weak());
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_step_follows_stage() {
        assert_eq!(current_step(&Stage::Idle), Some(0));
        assert_eq!(
            current_step(&Stage::Processing {
                input: PathBuf::from("a.png")
            }),
            Some(1)
        );
        assert_eq!(
            current_step(&Stage::Failed {
                message: "x".to_string()
            }),
            None
        );
    }
}
