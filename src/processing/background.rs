// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Background removal engines.
//!
//! Engines take an RGBA image and return the same image with the background
//! made transparent. The default engine runs a segmentation model in-process
//! (see `segmentation`); the `rembg` engine hands the work to the external
//! `rembg` command line. The border keyer is a colour heuristic that only
//! works on plain backdrops and is used when no model can be loaded.

use crate::config::{self, AlphaMatting, RemoverKind, Settings};
use crate::processing::segmentation::{Normalization, OnnxRemover};
use anyhow::{bail, Context, Result};
use image::{Rgba, RgbaImage};
use std::path::Path;
use std::process::Command;

/// Something that can make the background of an image transparent.
pub trait BackgroundRemover: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Return `image` with its background made transparent.
    fn remove(&self, image: &RgbaImage) -> Result<RgbaImage>;
}

/// Build the engine selected in `settings`. Relative model paths are
/// resolved against `base_dir`. A model that cannot be loaded falls back to
/// the border-key heuristic.
pub fn from_settings(settings: &Settings, base_dir: &Path) -> Box<dyn BackgroundRemover> {
    match &settings.remover {
        RemoverKind::Onnx {
            model_path,
            input_size,
            mean,
            std,
        } => {
            let path = config::resolve(base_dir, model_path);
            let normalization = Normalization {
                input_size: *input_size,
                mean: *mean,
                std: *std,
            };
            match OnnxRemover::load(&path, normalization, settings.alpha_matting) {
                Ok(remover) => Box::new(remover),
                Err(e) => {
                    log::warn!(
                        "Segmentation model unavailable ({:#}); falling back to the border-key heuristic",
                        e
                    );
                    Box::new(BorderKeyRemover {
                        tolerance: config::default_key_tolerance(),
                        matting: settings.alpha_matting,
                    })
                }
            }
        }
        RemoverKind::BorderKey { tolerance } => Box::new(BorderKeyRemover {
            tolerance: *tolerance,
            matting: settings.alpha_matting,
        }),
        RemoverKind::Rembg { program } => Box::new(RembgCommand {
            program: program.clone(),
            matting: settings.alpha_matting,
        }),
    }
}

/// Use `mask` (one byte per pixel) as the alpha channel of `image`, after
/// trimap refinement when matting is enabled. Pixels that were already
/// transparent stay transparent.
pub(crate) fn apply_mask(image: &RgbaImage, mask: &[u8], matting: &AlphaMatting) -> RgbaImage {
    let (width, height) = image.dimensions();
    let alpha = if matting.enabled {
        refine_alpha(mask, width, height, matting)
    } else {
        mask.to_vec()
    };

    let mut out = image.clone();
    for (pixel, a) in out.pixels_mut().zip(alpha) {
        pixel[3] = ((a as u16 * pixel[3] as u16) / 255) as u8;
    }
    out
}

/// Heuristic: keys out the dominant border colour. Only reliable on plain,
/// evenly lit backdrops.
#[derive(Debug, Clone)]
pub struct BorderKeyRemover {
    /// Colour distance (0-441) at which a pixel is fully foreground.
    pub tolerance: f32,
    pub matting: AlphaMatting,
}

impl BackgroundRemover for BorderKeyRemover {
    fn name(&self) -> &str {
        "border-key heuristic"
    }

    fn remove(&self, image: &RgbaImage) -> Result<RgbaImage> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            bail!("cannot remove the background of an empty image");
        }
        if self.tolerance <= 0.0 {
            bail!("key tolerance must be positive, got {}", self.tolerance);
        }

        let background = border_color(image);
        log::debug!("Estimated background colour {:?}", background);

        let mask: Vec<u8> = image
            .pixels()
            .map(|pixel| {
                let distance = color_distance(pixel, &background);
                (distance / self.tolerance * 255.0).clamp(0.0, 255.0).round() as u8
            })
            .collect();

        Ok(apply_mask(image, &mask, &self.matting))
    }
}

/// Runs `rembg i` on scratch files.
#[derive(Debug, Clone)]
pub struct RembgCommand {
    pub program: String,
    pub matting: AlphaMatting,
}

impl RembgCommand {
    fn arguments(&self, input: &std::path::Path, output: &std::path::Path) -> Vec<String> {
        let mut args = vec!["i".to_string()];
        if self.matting.enabled {
            args.extend([
                "-a".to_string(),
                "-af".to_string(),
                self.matting.foreground_threshold.to_string(),
                "-ab".to_string(),
                self.matting.background_threshold.to_string(),
                "-ae".to_string(),
                self.matting.erode_size.to_string(),
            ]);
        }
        args.push(input.display().to_string());
        args.push(output.display().to_string());
        args
    }
}

impl BackgroundRemover for RembgCommand {
    fn name(&self) -> &str {
        "rembg"
    }

    fn remove(&self, image: &RgbaImage) -> Result<RgbaImage> {
        let scratch = tempfile::tempdir().context("Failed to create scratch folder")?;
        let input = scratch.path().join("input.png");
        let output = scratch.path().join("output.png");
        crate::io::media::save_png(image, &input)?;

        let result = Command::new(&self.program)
            .args(self.arguments(&input, &output))
            .output()
            .with_context(|| format!("Failed to run '{}'; is rembg installed?", self.program))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            bail!(
                "'{}' exited with {}: {}",
                self.program,
                result.status,
                stderr.trim()
            );
        }

        crate::io::media::load_image(&output)
    }
}

/// Per-channel median of the outermost ring of pixels.
fn border_color(image: &RgbaImage) -> [f32; 3] {
    let (width, height) = image.dimensions();
    let mut channels: [Vec<u8>; 3] = Default::default();

    let mut sample = |x: u32, y: u32| {
        let pixel = image.get_pixel(x, y);
        for (c, values) in channels.iter_mut().enumerate() {
            values.push(pixel[c]);
        }
    };
    for x in 0..width {
        sample(x, 0);
        sample(x, height - 1);
    }
    for y in 0..height {
        sample(0, y);
        sample(width - 1, y);
    }

    channels.map(|mut values| {
        values.sort_unstable();
        values[values.len() / 2] as f32
    })
}

fn color_distance(pixel: &Rgba<u8>, background: &[f32; 3]) -> f32 {
    (0..3)
        .map(|c| {
            let d = pixel[c] as f32 - background[c];
            d * d
        })
        .sum::<f32>()
        .sqrt()
}

/// Trimap refinement: certain foreground and background are eroded by the
/// erode size, and the band between them gets the local mean of the mask.
fn refine_alpha(mask: &[u8], width: u32, height: u32, matting: &AlphaMatting) -> Vec<u8> {
    let radius = matting.erode_size;
    let foreground = SummedArea::from_fn(width, height, |i| {
        u64::from(mask[i] >= matting.foreground_threshold)
    });
    let background = SummedArea::from_fn(width, height, |i| {
        u64::from(mask[i] <= matting.background_threshold)
    });
    let density = SummedArea::from_fn(width, height, |i| u64::from(mask[i]));

    let mut alpha = Vec::with_capacity(mask.len());
    for y in 0..height {
        for x in 0..width {
            let window = Window::around(x, y, radius, width, height);
            let area = window.area();
            if foreground.sum(&window) == area {
                alpha.push(255);
            } else if background.sum(&window) == area {
                alpha.push(0);
            } else {
                alpha.push((density.sum(&window) / area) as u8);
            }
        }
    }
    alpha
}

/// Square window clipped to the image, half-open on the far side.
struct Window {
    x0: u32,
    y0: u32,
    x1: u32,
    y1: u32,
}

impl Window {
    fn around(x: u32, y: u32, radius: u32, width: u32, height: u32) -> Self {
        Self {
            x0: x.saturating_sub(radius),
            y0: y.saturating_sub(radius),
            x1: (x + radius + 1).min(width),
            y1: (y + radius + 1).min(height),
        }
    }

    fn area(&self) -> u64 {
        u64::from(self.x1 - self.x0) * u64::from(self.y1 - self.y0)
    }
}

/// Summed-area table for constant-time window sums.
struct SummedArea {
    stride: usize,
    table: Vec<u64>,
}

impl SummedArea {
    fn from_fn(width: u32, height: u32, value: impl Fn(usize) -> u64) -> Self {
        let (w, h) = (width as usize, height as usize);
        let stride = w + 1;
        let mut table = vec![0u64; stride * (h + 1)];
        for y in 0..h {
            let mut row = 0u64;
            for x in 0..w {
                row += value(y * w + x);
                table[(y + 1) * stride + x + 1] = table[y * stride + x + 1] + row;
            }
        }
        Self { stride, table }
    }

    fn sum(&self, window: &Window) -> u64 {
        let at = |x: u32, y: u32| self.table[y as usize * self.stride + x as usize];
        at(window.x1, window.y1) + at(window.x0, window.y0)
            - at(window.x0, window.y1)
            - at(window.x1, window.y0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// White backdrop with a red 20x20 square in the middle.
    fn bangle_photo() -> RgbaImage {
        RgbaImage::from_fn(40, 40, |x, y| {
            if (10..30).contains(&x) && (10..30).contains(&y) {
                Rgba([200, 20, 20, 255])
            } else {
                Rgba([250, 250, 250, 255])
            }
        })
    }

    fn remover(enabled: bool, erode_size: u32) -> BorderKeyRemover {
        BorderKeyRemover {
            tolerance: 60.0,
            matting: AlphaMatting {
                enabled,
                erode_size,
                ..AlphaMatting::default()
            },
        }
    }

    #[test]
    fn test_border_key_removes_plain_backdrop() {
        let out = remover(false, 0).remove(&bangle_photo()).unwrap();
        assert_eq!(out.get_pixel(0, 0)[3], 0);
        assert_eq!(out.get_pixel(5, 35)[3], 0);
        assert_eq!(out.get_pixel(20, 20)[3], 255);
        // Colour is untouched.
        assert_eq!(out.get_pixel(20, 20)[0], 200);
    }

    #[test]
    fn test_matting_softens_edges_only() {
        let out = remover(true, 2).remove(&bangle_photo()).unwrap();
        assert_eq!(out.get_pixel(20, 20)[3], 255);
        assert_eq!(out.get_pixel(0, 0)[3], 0);

        // Just inside the square the alpha falls off.
        let edge = out.get_pixel(10, 20)[3];
        assert!(edge > 0 && edge < 255, "edge alpha {}", edge);
    }

    #[test]
    fn test_transparent_input_stays_transparent() {
        let mut img = bangle_photo();
        img.put_pixel(20, 20, Rgba([200, 20, 20, 0]));
        let out = remover(false, 0).remove(&img).unwrap();
        assert_eq!(out.get_pixel(20, 20)[3], 0);
    }

    #[test]
    fn test_summed_area_window() {
        let table = SummedArea::from_fn(4, 3, |_| 1);
        let window = Window::around(0, 0, 1, 4, 3);
        assert_eq!(window.area(), 4);
        assert_eq!(table.sum(&window), 4);

        let window = Window::around(2, 1, 1, 4, 3);
        assert_eq!(window.area(), 9);
        assert_eq!(table.sum(&window), 9);
    }

    #[test]
    fn test_rembg_arguments() {
        let command = RembgCommand {
            program: "rembg".to_string(),
            matting: AlphaMatting::default(),
        };
        let args = command.arguments(std::path::Path::new("in.png"), std::path::Path::new("out.png"));
        assert_eq!(
            args,
            ["i", "-a", "-af", "240", "-ab", "10", "-ae", "10", "in.png", "out.png"]
        );
    }

    #[test]
    fn test_missing_rembg_program_is_an_error() {
        let command = RembgCommand {
            program: "definitely-not-an-installed-rembg".to_string(),
            matting: AlphaMatting::default(),
        };
        let err = command.remove(&bangle_photo()).unwrap_err();
        assert!(format!("{:#}", err).contains("is rembg installed"));
    }

    #[test]
    fn test_engine_selection() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.remover = RemoverKind::BorderKey { tolerance: 30.0 };
        assert_eq!(from_settings(&settings, dir.path()).name(), "border-key heuristic");
        settings.remover = RemoverKind::Rembg {
            program: "rembg".to_string(),
        };
        assert_eq!(from_settings(&settings, dir.path()).name(), "rembg");
    }

    #[test]
    fn test_missing_model_falls_back_to_heuristic() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::default();
        let remover = from_settings(&settings, dir.path());
        assert_eq!(remover.name(), "border-key heuristic");
    }

    #[test]
    fn test_apply_mask_keeps_existing_transparency() {
        let img = RgbaImage::from_fn(2, 1, |x, _| Rgba([10, 20, 30, if x == 0 { 255 } else { 128 }]));
        let matting = AlphaMatting {
            enabled: false,
            ..AlphaMatting::default()
        };
        let out = apply_mask(&img, &[255, 255], &matting);
        assert_eq!(out.get_pixel(0, 0)[3], 255);
        assert_eq!(out.get_pixel(1, 0)[3], 128);

        let out = apply_mask(&img, &[0, 102], &matting);
        assert_eq!(out.get_pixel(0, 0)[3], 0);
        assert_eq!(out.get_pixel(1, 0)[3], 51);
    }
}
