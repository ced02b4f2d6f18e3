// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Settings and crop record serialization.
//!
//! Settings are read from YAML; every saved crop gets a JSON record next to
//! the PNG describing how it was produced.

use crate::config::Settings;
use crate::models::session::CropRecord;
use anyhow::{Context, Result};
use std::path::Path;

/// Import settings from YAML format.
pub fn import_settings(path: &Path) -> Result<Settings> {
    let yaml = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let settings = serde_yaml::from_str(&yaml)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(settings)
}

/// Export a crop record to JSON format.
pub fn export_crop_record(record: &CropRecord, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(record)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RemoverKind;
    use crate::models::crop::CropRegion;
    use crate::util::geometry::SourceRect;

    #[test]
    fn test_partial_settings_keep_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dreamstack.yaml");
        std::fs::write(
            &path,
            "rotation_step: 5.0\nremover:\n  kind: rembg\nalpha_matting:\n  erode_size: 4\n",
        )
        .unwrap();

        let settings = import_settings(&path).unwrap();
        assert_eq!(settings.rotation_step, 5.0);
        assert_eq!(settings.max_size, (800, 800));
        assert_eq!(
            settings.remover,
            RemoverKind::Rembg {
                program: "rembg".to_string()
            }
        );
        assert_eq!(settings.alpha_matting.erode_size, 4);
        assert_eq!(settings.alpha_matting.foreground_threshold, 240);
    }

    #[test]
    fn test_crop_record_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bangle_cropped.json");
        let record = CropRecord {
            source: "bangle.jpg".to_string(),
            rotation_angle: -3.0,
            display_region: CropRegion::new(50.0, 50.0, 100.0, 100.0),
            source_region: SourceRect {
                left: 125,
                bottom: 62,
                right: 375,
                top: 187,
            },
            output_width: 250,
            output_height: 125,
        };

        export_crop_record(&record, &path).unwrap();
        let json = std::fs::read_to_string(&path).unwrap();
        let parsed: CropRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
        assert!(json.contains("\"rotation_angle\": -3.0"));
    }
}
