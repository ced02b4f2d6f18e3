// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Session state management.
//!
//! This module holds the image being worked on and the record written
//! alongside every saved crop.

use crate::models::crop::CropRegion;
use crate::processing::rotation;
use crate::util::geometry::SourceRect;
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The background-removed image and its accumulated rotation.
#[derive(Debug, Clone)]
pub struct SourceImage {
    /// File the user picked.
    pub input_path: PathBuf,
    /// Stem used to name every output of this session.
    pub stem: String,
    /// Where the background-removed PNG was written.
    pub no_bg_path: PathBuf,
    original: RgbaImage,
    angle: f64,
    rendered: RgbaImage,
}

impl SourceImage {
    pub fn new(input_path: PathBuf, stem: String, no_bg_path: PathBuf, image: RgbaImage) -> Self {
        Self {
            input_path,
            stem,
            no_bg_path,
            rendered: image.clone(),
            original: image,
            angle: 0.0,
        }
    }

    /// Accumulated rotation in degrees. Not wrapped.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// The image as it currently looks, rotation applied.
    pub fn rendered(&self) -> &RgbaImage {
        &self.rendered
    }

    #[cfg(test)]
    pub fn original(&self) -> &RgbaImage {
        &self.original
    }

    /// Add `degrees` to the rotation and re-render.
    pub fn rotate_by(&mut self, degrees: f64) {
        self.angle += degrees;
        self.rendered = rotation::render(&self.original, self.angle);
    }
}

/// How a saved crop was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropRecord {
    pub source: String,
    pub rotation_angle: f64,
    /// Crop rectangle in display coordinates at save time.
    pub display_region: CropRegion,
    /// The same rectangle mapped onto the rotated image.
    pub source_region: SourceRect,
    pub output_width: u32,
    pub output_height: u32,
}
