// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application settings and constants.
//!
//! Settings have defaults for everything and may be overridden by an
//! optional `dreamstack.yaml` placed next to the executable.

use crate::models::crop::CropRegion;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Window title.
pub const APP_TITLE: &str = "Dream Stack - Bangle Background Removal";

/// Name of the optional settings file next to the executable.
pub const SETTINGS_FILE: &str = "dreamstack.yaml";

/// File stem used when the picked file has none.
pub const DEFAULT_STEM: &str = "bangle";

/// Input formats offered by the file picker.
pub const INPUT_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Which engine removes the background.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RemoverKind {
    /// Salient-object segmentation model (U²-Net, ISNet) run in-process.
    Onnx {
        /// `.onnx` file. Relative paths are resolved against the
        /// executable's directory.
        #[serde(default = "default_model_path")]
        model_path: PathBuf,
        /// Side of the square model input.
        #[serde(default = "default_model_input_size")]
        input_size: u32,
        /// Per-channel normalisation applied to pixels scaled to `[0, 1]`.
        #[serde(default = "default_model_mean")]
        mean: [f32; 3],
        #[serde(default = "default_model_std")]
        std: [f32; 3],
    },
    /// Border colour keyer. A heuristic for plain backdrops only.
    BorderKey {
        /// Colour distance at which a pixel counts as fully foreground.
        #[serde(default = "default_key_tolerance")]
        tolerance: f32,
    },
    /// External `rembg` command line.
    Rembg {
        #[serde(default = "default_rembg_program")]
        program: String,
    },
}

fn default_model_path() -> PathBuf {
    PathBuf::from("models/u2net.onnx")
}

fn default_model_input_size() -> u32 {
    320
}

fn default_model_mean() -> [f32; 3] {
    [0.485, 0.456, 0.406]
}

fn default_model_std() -> [f32; 3] {
    [0.229, 0.224, 0.225]
}

pub(crate) fn default_key_tolerance() -> f32 {
    60.0
}

fn default_rembg_program() -> String {
    "rembg".to_string()
}

impl Default for RemoverKind {
    fn default() -> Self {
        RemoverKind::Onnx {
            model_path: default_model_path(),
            input_size: default_model_input_size(),
            mean: default_model_mean(),
            std: default_model_std(),
        }
    }
}

/// Alpha matting refinement of the background mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlphaMatting {
    pub enabled: bool,
    /// Mask values at or above this are certain foreground.
    pub foreground_threshold: u8,
    /// Mask values at or below this are certain background.
    pub background_threshold: u8,
    /// How far the certain regions are eroded into the unknown band.
    pub erode_size: u32,
}

impl Default for AlphaMatting {
    fn default() -> Self {
        Self {
            enabled: true,
            foreground_threshold: 240,
            background_threshold: 10,
            erode_size: 10,
        }
    }
}

/// User-tunable settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Where results are written. Relative paths are resolved against the
    /// executable's directory.
    pub output_dir: PathBuf,
    /// Images are shrunk to fit inside this box before background removal.
    pub max_size: (u32, u32),
    /// Degrees per rotate click.
    pub rotation_step: f64,
    /// Thickness of the crop rectangle's resize handles in display pixels.
    pub handle_thickness: f64,
    /// Crop rectangle shown when the crop screen opens.
    pub default_crop: CropRegion,
    pub remover: RemoverKind,
    pub alpha_matting: AlphaMatting,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("jewelry_box"),
            max_size: (800, 800),
            rotation_step: 1.0,
            handle_thickness: 20.0,
            default_crop: CropRegion::new(100.0, 100.0, 300.0, 300.0),
            remover: RemoverKind::default(),
            alpha_matting: AlphaMatting::default(),
        }
    }
}

impl Settings {
    /// Load settings from `dir/dreamstack.yaml`, falling back to defaults if
    /// the file is missing or malformed.
    pub fn load_or_default(dir: &Path) -> Self {
        let path = dir.join(SETTINGS_FILE);
        if !path.exists() {
            log::info!("No {} found, using default settings", SETTINGS_FILE);
            return Self::default();
        }

        match crate::io::serialization::import_settings(&path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::error!("Ignoring invalid settings file {}: {:#}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Output directory resolved against `base` when relative.
    pub fn resolved_output_dir(&self, base: &Path) -> PathBuf {
        resolve(base, &self.output_dir)
    }
}

/// `path` itself when absolute, otherwise `base/path`.
pub fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Directory holding the running executable, or the working directory if it
/// cannot be determined.
pub fn application_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}
