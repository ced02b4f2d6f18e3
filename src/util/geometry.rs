// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module provides the coordinate transformations between the display
//! (where the image is drawn scaled to fit) and the source image pixels.

use crate::models::crop::CropRegion;
use serde::{Deserialize, Serialize};

/// Crop bounds in source pixels, measured from the bottom-left corner of the
/// image. Covers `[left, right) x [bottom, top)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRect {
    pub left: u32,
    pub bottom: u32,
    pub right: u32,
    pub top: u32,
}

impl SourceRect {
    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> u32 {
        self.top.saturating_sub(self.bottom)
    }

    /// True if the region holds no pixels.
    pub fn is_empty(&self) -> bool {
        self.right <= self.left || self.top <= self.bottom
    }
}

/// Size of an image of `img_width` x `img_height` scaled to fit inside the
/// available area while keeping its aspect ratio.
pub fn fit_within(img_width: u32, img_height: u32, available_w: f64, available_h: f64) -> (f64, f64) {
    if img_width == 0 || img_height == 0 || available_w <= 0.0 || available_h <= 0.0 {
        return (0.0, 0.0);
    }

    let img_aspect = img_width as f64 / img_height as f64;
    let available_aspect = available_w / available_h;

    if img_aspect > available_aspect {
        // Image is wider - fit to width
        (available_w, available_w / img_aspect)
    } else {
        // Image is taller - fit to height
        (available_h * img_aspect, available_h)
    }
}

/// Display rectangle of an image fitted and centred inside a canvas of
/// `canvas_w` x `canvas_h`, in the canvas' own coordinates.
pub fn centered_display_rect(img_width: u32, img_height: u32, canvas_w: f64, canvas_h: f64) -> CropRegion {
    let (width, height) = fit_within(img_width, img_height, canvas_w, canvas_h);
    CropRegion::new((canvas_w - width) / 2.0, (canvas_h - height) / 2.0, width, height)
}

/// Map a crop rectangle from display coordinates to source pixels.
///
/// `display` is where the image is drawn and `(img_width, img_height)` its
/// real size. The axes scale independently and every edge is truncated and
/// clamped to the image.
pub fn map_to_source(crop: CropRegion, display: CropRegion, img_width: u32, img_height: u32) -> SourceRect {
    if display.width <= 0.0 || display.height <= 0.0 {
        return SourceRect {
            left: 0,
            bottom: 0,
            right: 0,
            top: 0,
        };
    }

    let scale_x = img_width as f64 / display.width;
    let scale_y = img_height as f64 / display.height;

    let to_pixels = |value: f64, scale: f64, limit: u32| -> u32 {
        // `as` truncates toward zero and saturates out-of-range values.
        let pixels = (value * scale) as i64;
        pixels.clamp(0, limit as i64) as u32
    };

    SourceRect {
        left: to_pixels(crop.x - display.x, scale_x, img_width),
        bottom: to_pixels(crop.y - display.y, scale_y, img_height),
        right: to_pixels(crop.x + crop.width - display.x, scale_x, img_width),
        top: to_pixels(crop.y + crop.height - display.y, scale_y, img_height),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_to_end_mapping() {
        let display = CropRegion::new(0.0, 0.0, 400.0, 400.0);
        let crop = CropRegion::new(50.0, 50.0, 100.0, 100.0);

        let mapped = map_to_source(crop, display, 1000, 500);
        assert_eq!(
            mapped,
            SourceRect {
                left: 125,
                bottom: 62,
                right: 375,
                top: 187,
            }
        );
    }

    #[test]
    fn test_mapping_is_scale_invariant() {
        let small = map_to_source(
            CropRegion::new(30.0, 20.0, 60.0, 90.0),
            CropRegion::new(10.0, 5.0, 200.0, 150.0),
            800,
            600,
        );
        let large = map_to_source(
            CropRegion::new(60.0, 40.0, 120.0, 180.0),
            CropRegion::new(20.0, 10.0, 400.0, 300.0),
            800,
            600,
        );
        assert_eq!(small, large);
    }

    #[test]
    fn test_mapping_clamps_to_image() {
        let display = CropRegion::new(100.0, 100.0, 200.0, 100.0);
        let crop = CropRegion::new(50.0, 20.0, 500.0, 500.0);

        let mapped = map_to_source(crop, display, 800, 400);
        assert_eq!(
            mapped,
            SourceRect {
                left: 0,
                bottom: 0,
                right: 800,
                top: 400,
            }
        );
    }

    #[test]
    fn test_crop_outside_image_is_empty() {
        let display = CropRegion::new(0.0, 0.0, 100.0, 100.0);
        let crop = CropRegion::new(150.0, 10.0, 40.0, 40.0);

        let mapped = map_to_source(crop, display, 100, 100);
        assert!(mapped.is_empty());
        assert_eq!(mapped.width(), 0);
    }

    #[test]
    fn test_fit_within() {
        // Wider image fits to width
        assert_eq!(fit_within(1000, 500, 400.0, 400.0), (400.0, 200.0));
        // Taller image fits to height
        assert_eq!(fit_within(500, 1000, 400.0, 400.0), (200.0, 400.0));
        assert_eq!(fit_within(0, 10, 400.0, 400.0), (0.0, 0.0));
    }

    #[test]
    fn test_centered_display_rect() {
        let rect = centered_display_rect(1000, 500, 400.0, 400.0);
        assert_eq!(rect, CropRegion::new(0.0, 100.0, 400.0, 200.0));
    }
}
