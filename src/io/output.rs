// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Output folder and file naming.

use crate::config::DEFAULT_STEM;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Folder that receives every saved artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDir {
    root: PathBuf,
}

impl OutputDir {
    /// Use `root`, creating it if it does not exist yet.
    pub fn create(root: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create output folder {}", root.display()))?;
        Ok(Self { root })
    }

    /// `<stem>_no_bg.png`
    pub fn no_bg_path(&self, stem: &str) -> PathBuf {
        self.root.join(format!("{}_no_bg.png", stem))
    }

    /// `<stem>_cropped.png`
    pub fn cropped_path(&self, stem: &str) -> PathBuf {
        self.root.join(format!("{}_cropped.png", stem))
    }

    /// `<stem>_cropped.json`
    pub fn record_path(&self, stem: &str) -> PathBuf {
        self.root.join(format!("{}_cropped.json", stem))
    }
}

/// Stem used to name outputs derived from `input`.
pub fn output_stem(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_STEM.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_makes_missing_folder() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("jewelry_box");
        let out = OutputDir::create(root.clone()).unwrap();
        assert!(root.is_dir());
        // Creating again is fine.
        assert_eq!(OutputDir::create(root).unwrap(), out);
    }

    #[test]
    fn test_file_names() {
        let out = OutputDir {
            root: PathBuf::from("jewelry_box"),
        };
        assert_eq!(out.no_bg_path("ring"), PathBuf::from("jewelry_box/ring_no_bg.png"));
        assert_eq!(out.cropped_path("ring"), PathBuf::from("jewelry_box/ring_cropped.png"));
        assert_eq!(out.record_path("ring"), PathBuf::from("jewelry_box/ring_cropped.json"));
    }

    #[test]
    fn test_output_stem() {
        assert_eq!(output_stem(Path::new("/photos/gold bangle.JPG")), "gold bangle");
        assert_eq!(output_stem(Path::new("/photos/.png")), ".png");
        assert_eq!(output_stem(Path::new("/")), "bangle");
    }
}
