// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Crop extraction and saving.

use crate::io::{media, output::OutputDir, serialization};
use crate::models::crop::CropRegion;
use crate::models::session::{CropRecord, SourceImage};
use crate::models::wizard::SavedCrop;
use crate::util::geometry::{self, SourceRect};
use anyhow::{bail, Result};
use image::{imageops, RgbaImage};

/// Cut `region` out of `image`.
///
/// The region is measured from the bottom of the image, so rows are flipped
/// before reading the pixels. Empty regions are rejected.
pub fn extract(image: &RgbaImage, region: SourceRect) -> Result<RgbaImage> {
    let (width, height) = image.dimensions();
    let region = SourceRect {
        right: region.right.min(width),
        top: region.top.min(height),
        ..region
    };

    if region.is_empty() {
        bail!(
            "crop region is empty ({}x{} pixels); enlarge the selection over the image",
            region.width(),
            region.height()
        );
    }

    let row = height - region.top;
    let cropped = imageops::crop_imm(image, region.left, row, region.width(), region.height());
    Ok(cropped.to_image())
}

/// Crop the rotated rendering of `image` with the selection `crop`, drawn
/// over the image at `display`, and write `<stem>_cropped.png` plus its JSON
/// record. Nothing is written if the selection misses the image.
pub fn save_crop(
    image: &SourceImage,
    crop: CropRegion,
    display: CropRegion,
    output: &OutputDir,
) -> Result<SavedCrop> {
    let rendered = image.rendered();
    let source_region = geometry::map_to_source(crop, display, rendered.width(), rendered.height());
    log::info!("Crop {:?} -> {:?}", crop, source_region);

    let cropped = extract(rendered, source_region)?;

    let image_path = output.cropped_path(&image.stem);
    media::save_png(&cropped, &image_path)?;

    let record = CropRecord {
        source: image.input_path.display().to_string(),
        rotation_angle: image.angle(),
        display_region: crop,
        source_region,
        output_width: cropped.width(),
        output_height: cropped.height(),
    };
    let record_path = output.record_path(&image.stem);
    serialization::export_crop_record(&record, &record_path)?;

    Ok(SavedCrop {
        image_path,
        record_path,
        width: cropped.width(),
        height: cropped.height(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::path::PathBuf;

    #[test]
    fn test_extract_reads_rows_from_bottom() {
        // 4x4 image whose red channel is the row index.
        let img = RgbaImage::from_fn(4, 4, |_, y| Rgba([y as u8, 0, 0, 255]));
        let region = SourceRect {
            left: 1,
            bottom: 0,
            right: 3,
            top: 1,
        };

        let cropped = extract(&img, region).unwrap();
        assert_eq!(cropped.dimensions(), (2, 1));
        // The bottom-most row of the image is row 3.
        assert_eq!(cropped.get_pixel(0, 0)[0], 3);
    }

    #[test]
    fn test_extract_keeps_alpha() {
        let img = RgbaImage::from_pixel(10, 10, Rgba([10, 20, 30, 0]));
        let region = SourceRect {
            left: 2,
            bottom: 2,
            right: 8,
            top: 6,
        };

        let cropped = extract(&img, region).unwrap();
        assert_eq!(cropped.dimensions(), (6, 4));
        assert!(cropped.pixels().all(|p| *p == Rgba([10, 20, 30, 0])));
    }

    #[test]
    fn test_empty_region_is_rejected() {
        let img = RgbaImage::new(10, 10);
        let region = SourceRect {
            left: 5,
            bottom: 2,
            right: 5,
            top: 8,
        };

        let err = extract(&img, region).unwrap_err();
        assert!(err.to_string().contains("crop region is empty"));
    }

    /// Red channel is the column, green the row (from the top).
    fn session_image(width: u32, height: u32) -> SourceImage {
        SourceImage::new(
            PathBuf::from("/photos/gold.jpg"),
            "gold".to_string(),
            PathBuf::from("gold_no_bg.png"),
            RgbaImage::from_fn(width, height, |x, y| Rgba([x as u8, y as u8, 0, 255])),
        )
    }

    #[test]
    fn test_save_crop_with_centred_display() {
        let dir = tempfile::tempdir().unwrap();
        let output = OutputDir::create(dir.path().join("jewelry_box")).unwrap();
        let image = session_image(100, 50);

        // 100x50 fitted into a 400x300 canvas: 400x200 at (0, 50).
        let display = geometry::centered_display_rect(100, 50, 400.0, 300.0);
        assert_eq!(display, CropRegion::new(0.0, 50.0, 400.0, 200.0));
        let crop = CropRegion::new(100.0, 100.0, 200.0, 100.0);

        let saved = save_crop(&image, crop, display, &output).unwrap();
        assert_eq!(saved.image_path, output.cropped_path("gold"));
        assert_eq!((saved.width, saved.height), (50, 25));

        let png = media::load_image(&saved.image_path).unwrap();
        assert_eq!(png.dimensions(), (50, 25));
        // Bottom 12 rows are skipped, so the top-left pixel is row 50 - 37.
        assert_eq!(png.get_pixel(0, 0), &Rgba([25, 13, 0, 255]));
        assert_eq!(png.get_pixel(49, 24), &Rgba([74, 37, 0, 255]));

        let json = std::fs::read_to_string(&saved.record_path).unwrap();
        let record: CropRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(
            record.source_region,
            SourceRect {
                left: 25,
                bottom: 12,
                right: 75,
                top: 37,
            }
        );
        assert_eq!(record.display_region, crop);
        assert_eq!(record.source, "/photos/gold.jpg");
        assert_eq!((record.output_width, record.output_height), (50, 25));
    }

    #[test]
    fn test_save_crop_uses_rotated_rendering() {
        let dir = tempfile::tempdir().unwrap();
        let output = OutputDir::create(dir.path().to_path_buf()).unwrap();
        let mut image = session_image(20, 10);
        image.rotate_by(90.0);

        let display = CropRegion::new(0.0, 0.0, 10.0, 20.0);
        let saved = save_crop(&image, display, display, &output).unwrap();
        assert_eq!((saved.width, saved.height), (10, 20));

        let png = media::load_image(&saved.image_path).unwrap();
        assert_eq!(&png, image.rendered());

        let json = std::fs::read_to_string(&saved.record_path).unwrap();
        let record: CropRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record.rotation_angle, 90.0);
    }

    #[test]
    fn test_empty_selection_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let output = OutputDir::create(dir.path().to_path_buf()).unwrap();
        let image = session_image(100, 50);
        let display = CropRegion::new(0.0, 50.0, 400.0, 200.0);

        // Entirely left of the image.
        let crop = CropRegion::new(-300.0, 100.0, 200.0, 100.0);
        let err = save_crop(&image, crop, display, &output).unwrap_err();

        assert!(err.to_string().contains("crop region is empty"));
        assert!(!output.cropped_path("gold").exists());
        assert!(!output.record_path("gold").exists());
    }
}
