// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Background removal with a salient-object segmentation model.
//!
//! U²-Net style models take a square NCHW float tensor and return a single
//! channel saliency map of the same size. The map is stretched to `[0, 1]`,
//! scaled back to the image size and used as the alpha mask, refined with
//! the same trimap matting as the other engines.

use crate::config::AlphaMatting;
use crate::processing::background::{apply_mask, BackgroundRemover};
use anyhow::{anyhow, bail, Context, Result};
use image::{imageops, GrayImage, RgbaImage};
use ndarray::{Array4, ArrayView2};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::{Tensor, Value};
use std::path::Path;
use std::sync::Mutex;

/// How pixels are turned into model input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalization {
    pub input_size: u32,
    pub mean: [f32; 3],
    pub std: [f32; 3],
}

/// Segmentation model loaded into an ONNX Runtime session.
pub struct OnnxRemover {
    session: Mutex<Session>,
    output_name: String,
    normalization: Normalization,
    matting: AlphaMatting,
}

impl OnnxRemover {
    /// Load the model at `model_path`.
    pub fn load(model_path: &Path, normalization: Normalization, matting: AlphaMatting) -> Result<Self> {
        if normalization.input_size == 0 {
            bail!("model input size must be positive");
        }
        if normalization.std.iter().any(|s| *s <= 0.0) {
            bail!("normalisation std must be positive, got {:?}", normalization.std);
        }

        let model_bytes = std::fs::read(model_path)
            .with_context(|| format!("Failed to read model file {}", model_path.display()))?;

        let session = Session::builder()
            .map_err(|e| anyhow!("Failed to create session builder: {}", e))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| anyhow!("Failed to set optimization level: {}", e))?
            .commit_from_memory(&model_bytes)
            .map_err(|e| anyhow!("Failed to load ONNX model {}: {}", model_path.display(), e))?;

        let output_name = session
            .outputs
            .first()
            .map(|output| output.name.clone())
            .context("model has no outputs")?;

        log::info!(
            "Loaded segmentation model {} ({}x{} input)",
            model_path.display(),
            normalization.input_size,
            normalization.input_size
        );

        Ok(Self {
            session: Mutex::new(session),
            output_name,
            normalization,
            matting,
        })
    }

    fn run_inference(&self, input: Value) -> Result<(Vec<i64>, Vec<f32>)> {
        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow!("model session lock poisoned"))?;

        let outputs = session
            .run(ort::inputs![input])
            .map_err(|e| anyhow!("ONNX inference failed: {}", e))?;

        let output = outputs
            .get(self.output_name.as_str())
            .with_context(|| format!("Missing {} tensor", self.output_name))?;

        let (shape, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| anyhow!("Failed to extract tensor: {}", e))?;

        Ok((shape.iter().copied().collect(), data.to_vec()))
    }
}

impl BackgroundRemover for OnnxRemover {
    fn name(&self) -> &str {
        "onnx"
    }

    fn remove(&self, image: &RgbaImage) -> Result<RgbaImage> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            bail!("cannot remove the background of an empty image");
        }

        let size = self.normalization.input_size as usize;
        let input = preprocess(image, &self.normalization);
        let tensor = Tensor::from_array((vec![1usize, 3, size, size], input.into_raw_vec().into_boxed_slice()))
            .map(Value::from)
            .map_err(|e| anyhow!("Failed to create tensor: {}", e))?;

        let (shape, prediction) = self.run_inference(tensor)?;
        let (mask_h, mask_w) = prediction_size(&shape, prediction.len())?;
        log::debug!("Segmentation output {:?}", shape);

        let mask = saliency_to_mask(&prediction, mask_w, mask_h, width, height)?;
        Ok(apply_mask(image, &mask, &self.matting))
    }
}

/// Resize to the square model input and normalise into an NCHW tensor.
pub fn preprocess(image: &RgbaImage, normalization: &Normalization) -> Array4<f32> {
    let size = normalization.input_size;
    let resized = imageops::resize(image, size, size, imageops::FilterType::Triangle);

    let mut input = Array4::<f32>::zeros((1, 3, size as usize, size as usize));
    for (x, y, pixel) in resized.enumerate_pixels() {
        for c in 0..3 {
            let value = pixel[c] as f32 / 255.0;
            input[[0, c, y as usize, x as usize]] = (value - normalization.mean[c]) / normalization.std[c];
        }
    }
    input
}

/// Height and width of a `[1, 1, H, W]` (or `[1, H, W]`) prediction.
fn prediction_size(shape: &[i64], len: usize) -> Result<(usize, usize)> {
    let dims: Vec<usize> = shape
        .iter()
        .map(|d| usize::try_from(*d))
        .collect::<Result<_, _>>()
        .map_err(|_| anyhow!("dynamic dimension in output shape {:?}", shape))?;

    match dims.as_slice() {
        [.., h, w] if dims[..dims.len() - 2].iter().all(|d| *d == 1) && h * w == len => Ok((*h, *w)),
        _ => bail!("unexpected segmentation output shape {:?}", shape),
    }
}

/// Stretch a saliency map to `[0, 255]` and scale it to `width` x `height`.
pub fn saliency_to_mask(
    prediction: &[f32],
    mask_width: usize,
    mask_height: usize,
    width: u32,
    height: u32,
) -> Result<Vec<u8>> {
    let view = ArrayView2::from_shape((mask_height, mask_width), prediction)
        .context("prediction does not match its shape")?;

    let (min, max) = view
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
    let range = max - min;

    let pixels: Vec<u8> = view
        .iter()
        .map(|v| {
            if range > f32::EPSILON {
                ((v - min) / range * 255.0).round() as u8
            } else {
                0
            }
        })
        .collect();

    let small = GrayImage::from_raw(mask_width as u32, mask_height as u32, pixels)
        .context("mask buffer has the wrong size")?;
    let mask = imageops::resize(&small, width, height, imageops::FilterType::Triangle);
    Ok(mask.into_raw())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn imagenet(size: u32) -> Normalization {
        Normalization {
            input_size: size,
            mean: [0.485, 0.456, 0.406],
            std: [0.229, 0.224, 0.225],
        }
    }

    #[test]
    fn test_preprocess_layout_and_normalisation() {
        let img = RgbaImage::from_pixel(40, 20, Rgba([255, 0, 128, 255]));
        let input = preprocess(&img, &imagenet(8));

        assert_eq!(input.shape(), &[1, 3, 8, 8]);
        assert!((input[[0, 0, 3, 5]] - (1.0 - 0.485) / 0.229).abs() < 1e-4);
        assert!((input[[0, 1, 3, 5]] - (0.0 - 0.456) / 0.224).abs() < 1e-4);
        assert!((input[[0, 2, 7, 7]] - (128.0 / 255.0 - 0.406) / 0.225).abs() < 1e-4);
    }

    #[test]
    fn test_saliency_is_stretched_and_scaled() {
        // Left half background, right half subject, in a narrow value range.
        let prediction = [0.2, 0.2, 0.6, 0.6, 0.2, 0.2, 0.6, 0.6];
        let mask = saliency_to_mask(&prediction, 4, 2, 8, 4).unwrap();

        assert_eq!(mask.len(), 32);
        assert_eq!(mask[0], 0);
        assert_eq!(mask[7], 255);
        assert_eq!(mask[3 * 8 + 7], 255);
    }

    #[test]
    fn test_flat_saliency_is_background() {
        let mask = saliency_to_mask(&[0.5; 4], 2, 2, 3, 3).unwrap();
        assert!(mask.iter().all(|v| *v == 0));
    }

    #[test]
    fn test_prediction_shapes() {
        assert_eq!(prediction_size(&[1, 1, 320, 320], 320 * 320).unwrap(), (320, 320));
        assert_eq!(prediction_size(&[1, 4, 6], 24).unwrap(), (4, 6));
        assert!(prediction_size(&[1, 3, 4, 4], 48).is_err());
        assert!(prediction_size(&[1, 1, 4, 4], 15).is_err());
        assert!(prediction_size(&[1, 1, -1, 4], 16).is_err());
    }

    #[test]
    fn test_missing_model_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = OnnxRemover::load(
            &dir.path().join("u2net.onnx"),
            imagenet(320),
            AlphaMatting::default(),
        )
        .err()
        .unwrap();
        assert!(format!("{:#}", err).contains("Failed to read model file"));
    }

    #[test]
    fn test_invalid_model_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("u2net.onnx");
        std::fs::write(&path, b"not a model").unwrap();
        assert!(OnnxRemover::load(&path, imagenet(320), AlphaMatting::default()).is_err());
    }
}
