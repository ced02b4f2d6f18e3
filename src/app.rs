// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module contains the main application structure that implements
//! the egui::App trait. It owns the wizard, the background task runner and
//! the displayed texture, and turns button presses into wizard events.

use crate::config::{Settings, INPUT_EXTENSIONS};
use crate::io::output::OutputDir;
use crate::models::crop::CropRegion;
use crate::models::session::SourceImage;
use crate::models::wizard::{CropDefaults, Event, Outcome, SavedCrop, Stage, Wizard};
use crate::processing::background::{self, BackgroundRemover};
use crate::processing::crop;
use crate::processing::task::{RemovalJob, TaskRunner};
use crate::ui::{canvas, controls, controls::ControlAction, status, toolbar};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Main application state.
pub struct DreamStackApp {
    settings: Settings,

    /// Folder results are written to
    output_root: PathBuf,

    /// Where the flow is
    wizard: Wizard,

    /// Worker for background removal
    runner: TaskRunner<SourceImage>,

    /// Engine handed to every removal job
    remover: Arc<dyn BackgroundRemover>,

    /// Texture of the image being rotated or cropped
    image_texture: Option<egui::TextureHandle>,

    /// The rendered image changed and the texture must be re-uploaded
    texture_dirty: bool,

    /// Where the crop screen drew the image last frame, in display coordinates
    crop_display: Option<CropRegion>,
}

impl DreamStackApp {
    /// Create a new application instance. Relative paths in `settings` are
    /// resolved against `app_dir`.
    pub fn new(settings: Settings, app_dir: &Path) -> Self {
        let output_root = settings.resolved_output_dir(app_dir);
        let remover: Arc<dyn BackgroundRemover> =
            Arc::from(background::from_settings(&settings, app_dir));
        log::info!(
            "Background removal engine: {}, output folder: {}",
            remover.name(),
            output_root.display()
        );

        let defaults = CropDefaults {
            region: settings.default_crop,
            handle_thickness: settings.handle_thickness,
        };

        Self {
            settings,
            output_root,
            wizard: Wizard::new(defaults),
            runner: TaskRunner::new(),
            remover,
            image_texture: None,
            texture_dirty: false,
            crop_display: None,
        }
    }

    /// Feed an event to the wizard and note whether the image changed.
    fn dispatch(&mut self, event: Event) -> Outcome {
        let changes_image = matches!(
            event,
            Event::RemovalFinished(_) | Event::Rotate(_)
        );
        let outcome = self.wizard.handle(event);
        if outcome == Outcome::Applied && changes_image {
            self.texture_dirty = true;
        }
        outcome
    }

    /// Ask for a photo and start background removal on it.
    fn pick_and_upload(&mut self, ctx: &egui::Context) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", &INPUT_EXTENSIONS)
            .pick_file()
        {
            self.start_removal(path, ctx);
        }
    }

    /// Start background removal of `path` on the worker (asynchronously).
    fn start_removal(&mut self, path: PathBuf, ctx: &egui::Context) {
        if self.runner.is_busy() {
            log::warn!("Ignoring {}: background removal already running", path.display());
            return;
        }
        if self.dispatch(Event::Upload(path.clone())) == Outcome::Ignored {
            return;
        }

        let output = match OutputDir::create(self.output_root.clone()) {
            Ok(output) => output,
            Err(e) => {
                log::error!("{:#}", e);
                self.dispatch(Event::RemovalFinished(Err(format!("{:#}", e))));
                return;
            }
        };

        let job = RemovalJob {
            input: path,
            max_size: self.settings.max_size,
            output,
            remover: Arc::clone(&self.remover),
        };
        let repaint = ctx.clone();
        if let Err(e) = self
            .runner
            .start(move || job.run(), move || repaint.request_repaint())
        {
            log::error!("Failed to start background removal: {:#}", e);
            self.dispatch(Event::RemovalFinished(Err(format!("{:#}", e))));
        }
    }

    /// Hand a finished worker result to the wizard.
    fn poll_worker(&mut self) {
        if let Some(result) = self.runner.poll() {
            match &result {
                Ok(image) => log::info!(
                    "Background removed: {} ({}x{})",
                    image.no_bg_path.display(),
                    image.rendered().width(),
                    image.rendered().height()
                ),
                Err(e) => log::error!("Background removal failed: {}", e),
            }
            self.dispatch(Event::RemovalFinished(result));
        }
    }

    /// Map the crop rectangle onto the rotated image and save the result.
    fn crop_and_save(&self) -> Result<SavedCrop> {
        let Stage::Cropping {
            image,
            crop: selection,
            ..
        } = self.wizard.stage()
        else {
            anyhow::bail!("nothing to crop");
        };
        let display = self
            .crop_display
            .context("the image has not been laid out yet")?;

        let output = OutputDir::create(self.output_root.clone())?;
        crop::save_crop(image, selection.region(), display, &output)
    }

    /// Upload the rendered image as a texture if it changed.
    fn refresh_texture(&mut self, ctx: &egui::Context) {
        if !self.texture_dirty {
            return;
        }
        self.texture_dirty = false;

        let image = match self.wizard.stage() {
            Stage::Rotating { image } | Stage::Cropping { image, .. } => image.rendered(),
            _ => {
                self.image_texture = None;
                return;
            }
        };

        let size = [image.width() as usize, image.height() as usize];
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, image.as_raw());
        match &mut self.image_texture {
            Some(texture) => texture.set(color_image, egui::TextureOptions::LINEAR),
            None => {
                self.image_texture =
                    Some(ctx.load_texture("source_image", color_image, egui::TextureOptions::LINEAR));
            }
        }
    }

    fn handle_action(&mut self, action: ControlAction, ctx: &egui::Context) {
        match action {
            ControlAction::None => {}
            ControlAction::Upload => self.pick_and_upload(ctx),
            ControlAction::Rotate(degrees) => {
                self.dispatch(Event::Rotate(degrees));
            }
            ControlAction::ConfirmRotation => {
                self.crop_display = None;
                self.dispatch(Event::ConfirmRotation);
            }
            ControlAction::Back => {
                self.dispatch(Event::Back);
            }
            ControlAction::CropAndSave => {
                let result = self.crop_and_save();
                if let Err(e) = &result {
                    log::error!("Crop failed: {:#}", e);
                }
                self.dispatch(Event::CropSaved(result.map_err(|e| format!("{:#}", e))));
            }
            ControlAction::Restart => {
                self.dispatch(Event::Restart);
                self.image_texture = None;
            }
        }
    }
}

impl eframe::App for DreamStackApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for completed background removal
        self.poll_worker();

        // Keyboard rotation
        if matches!(self.wizard.stage(), Stage::Rotating { .. }) && !ctx.wants_keyboard_input() {
            let step = self.settings.rotation_step;
            if ctx.input(|i| i.key_pressed(egui::Key::ArrowLeft)) {
                self.dispatch(Event::Rotate(-step));
            }
            if ctx.input(|i| i.key_pressed(egui::Key::ArrowRight)) {
                self.dispatch(Event::Rotate(step));
            }
        }

        self.refresh_texture(ctx);

        // Progress bar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            toolbar::show(ui, self.wizard.stage());
        });

        // Stage buttons
        let action = egui::TopBottomPanel::bottom("controls")
            .show(ctx, |ui| {
                ui.add_space(4.0);
                let action = controls::show(
                    ui,
                    self.wizard.stage(),
                    self.settings.rotation_step,
                    self.runner.is_busy(),
                );
                ui.add_space(4.0);
                action
            })
            .inner;

        // Main canvas (center)
        egui::CentralPanel::default().show(ctx, |ui| match self.wizard.stage_mut() {
            Stage::Idle => status::welcome(ui, &self.output_root),
            Stage::Processing { input } => status::processing(ui, input),
            Stage::Rotating { image } => {
                canvas::show_rotation(ui, self.image_texture.as_ref(), image.rendered().dimensions());
            }
            Stage::Cropping { image, crop, .. } => {
                let display = canvas::show_crop(
                    ui,
                    self.image_texture.as_ref(),
                    image.rendered().dimensions(),
                    crop,
                    self.crop_display.is_none(),
                );
                self.crop_display = Some(display);
            }
            Stage::Done { saved } => status::done(ui, saved),
            Stage::Failed { message } => status::failed(ui, message),
        });

        self.handle_action(action, ctx);
    }
}
