// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Free rotation with canvas expansion.
//!
//! Positive angles turn the image counter-clockwise. The output canvas grows
//! to the bounding box of the rotated image so no pixel is clipped; the
//! corners it uncovers are fully transparent.

use image::{imageops, Rgba, RgbaImage};

/// Below this distance from a quarter turn the angle is treated as exact.
const ANGLE_EPSILON: f64 = 1e-9;

/// Normalize an angle in degrees into `[0, 360)`.
pub fn normalize_angle(angle: f64) -> f64 {
    let normalized = angle.rem_euclid(360.0);
    if (360.0 - normalized).abs() < ANGLE_EPSILON {
        0.0
    } else {
        normalized
    }
}

/// Size of the canvas that holds a `width` x `height` image rotated by
/// `angle` degrees.
pub fn compute_rotated_bounds(width: u32, height: u32, angle: f64) -> (u32, u32) {
    let radians = normalize_angle(angle).to_radians();
    let (sin, cos) = (radians.sin().abs(), radians.cos().abs());
    let (w, h) = (width as f64, height as f64);

    // Shave a hair off before rounding up so float noise on exact fits
    // does not add a pixel.
    let new_w = (w * cos + h * sin - 1e-6).ceil().max(1.0);
    let new_h = (w * sin + h * cos - 1e-6).ceil().max(1.0);
    (new_w as u32, new_h as u32)
}

/// Render `image` rotated by `angle` degrees.
pub fn render(image: &RgbaImage, angle: f64) -> RgbaImage {
    let angle = normalize_angle(angle);

    if angle.abs() < ANGLE_EPSILON {
        return image.clone();
    }
    // Quarter turns are lossless. imageops rotates clockwise.
    if (angle - 90.0).abs() < ANGLE_EPSILON {
        return imageops::rotate270(image);
    }
    if (angle - 180.0).abs() < ANGLE_EPSILON {
        return imageops::rotate180(image);
    }
    if (angle - 270.0).abs() < ANGLE_EPSILON {
        return imageops::rotate90(image);
    }

    let (src_w, src_h) = image.dimensions();
    if src_w == 0 || src_h == 0 {
        return image.clone();
    }

    let (out_w, out_h) = compute_rotated_bounds(src_w, src_h, angle);
    let radians = angle.to_radians();
    let (sin, cos) = radians.sin_cos();

    let src_cx = src_w as f64 / 2.0;
    let src_cy = src_h as f64 / 2.0;
    let out_cx = out_w as f64 / 2.0;
    let out_cy = out_h as f64 / 2.0;

    RgbaImage::from_fn(out_w, out_h, |ox, oy| {
        // Inverse mapping from the centre of the output pixel. Rows grow
        // downwards, so a counter-clockwise turn on screen maps back with
        // these signs.
        let dx = ox as f64 + 0.5 - out_cx;
        let dy = oy as f64 + 0.5 - out_cy;
        let sx = dx * cos - dy * sin + src_cx;
        let sy = dx * sin + dy * cos + src_cy;

        if sx < 0.0 || sy < 0.0 {
            return Rgba([0, 0, 0, 0]);
        }
        let (px, py) = (sx.floor() as u32, sy.floor() as u32);
        if px >= src_w || py >= src_h {
            return Rgba([0, 0, 0, 0]);
        }
        *image.get_pixel(px, py)
    })
}
