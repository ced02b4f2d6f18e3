// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Image file loading and saving.
//!
//! This module handles decoding picked photos into RGBA, shrinking them to
//! the processing size and writing PNG results.

use anyhow::{Context, Result};
use image::{imageops, ImageFormat, RgbaImage};
use std::path::Path;

/// Decode an image file into RGBA.
pub fn load_image(path: &Path) -> Result<RgbaImage> {
    let img = image::open(path)
        .with_context(|| format!("Failed to decode image {}", path.display()))?;
    Ok(img.to_rgba8())
}

/// Shrink `image` to fit inside `max_width` x `max_height`, keeping its
/// aspect ratio. Images that already fit are returned unchanged.
pub fn thumbnail(image: RgbaImage, max_width: u32, max_height: u32) -> RgbaImage {
    let (width, height) = image.dimensions();
    if width <= max_width && height <= max_height {
        return image;
    }

    let scale = f64::min(
        max_width as f64 / width as f64,
        max_height as f64 / height as f64,
    );
    let new_width = ((width as f64 * scale).round() as u32).clamp(1, max_width.max(1));
    let new_height = ((height as f64 * scale).round() as u32).clamp(1, max_height.max(1));

    log::debug!("Thumbnail {}x{} -> {}x{}", width, height, new_width, new_height);
    imageops::thumbnail(&image, new_width, new_height)
}

/// Write `image` as an RGBA PNG.
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<()> {
    image
        .save_with_format(path, ImageFormat::Png)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Saved {} ({}x{})", path.display(), image.width(), image.height());
    Ok(())
}
