// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Full-panel messages for the stages without an image.

use crate::models::wizard::SavedCrop;
use std::path::Path;

fn centered(ui: &mut egui::Ui, add_contents: impl FnOnce(&mut egui::Ui)) {
    ui.centered_and_justified(|ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(20.0);
            add_contents(ui);
        });
    });
}

/// Welcome message before anything has been picked.
pub fn welcome(ui: &mut egui::Ui, output_dir: &Path) {
    centered(ui, |ui| {
        ui.heading(
            egui::RichText::new("Dream Stack")
                .size(32.0)
                .color(egui::Color32::from_gray(200)),
        );
        ui.label(
            egui::RichText::new("Bangle background removal, rotation and crop")
                .size(14.0)
                .color(egui::Color32::from_gray(150)),
        );
        ui.add_space(20.0);
        ui.label(
            egui::RichText::new("Upload a bangle photo to begin")
                .color(egui::Color32::from_gray(180)),
        );
        ui.add_space(10.0);
        ui.label(
            egui::RichText::new(format!("Results are saved to {}", output_dir.display()))
                .weak()
                .color(egui::Color32::from_gray(130)),
        );
    });
}

/// Spinner while the worker removes the background.
pub fn processing(ui: &mut egui::Ui, input: &Path) {
    centered(ui, |ui| {
        ui.spinner();
        ui.add_space(10.0);
        ui.label(
            egui::RichText::new("Removing background...")
                .size(16.0)
                .color(egui::Color32::from_gray(200)),
        );
        ui.label(egui::RichText::new(input.display().to_string()).weak());
    });
}

pub fn done(ui: &mut egui::Ui, saved: &SavedCrop) {
    centered(ui, |ui| {
        ui.label(
            egui::RichText::new("✅ Cropped & saved successfully")
                .size(20.0)
                .color(egui::Color32::from_gray(220)),
        );
        ui.add_space(10.0);
        ui.label(format!("{} ({}×{})", saved.image_path.display(), saved.width, saved.height));
        ui.label(egui::RichText::new(saved.record_path.display().to_string()).weak());
    });
}

pub fn failed(ui: &mut egui::Ui, message: &str) {
    centered(ui, |ui| {
        ui.label(
            egui::RichText::new(format!("Failed: {}", message))
                .size(16.0)
                .color(egui::Color32::LIGHT_RED),
        );
    });
}
