// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Dream Stack - bangle photo background removal, rotation and crop
//!
//! A desktop application that removes the background from a jewelry photo,
//! lets the user straighten it and then crop it with a draggable rectangle.

mod app;
mod config;
mod io;
mod models;
mod processing;
mod ui;
mod util;

use anyhow::Result;
use app::DreamStackApp;
use config::Settings;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let app_dir = config::application_dir();
    let settings = Settings::load_or_default(&app_dir);

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1024.0, 768.0])
            .with_min_inner_size([640.0, 480.0])
            .with_title(config::APP_TITLE),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Dream Stack",
        options,
        Box::new(move |_cc| Ok(Box::new(DreamStackApp::new(settings, &app_dir)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
