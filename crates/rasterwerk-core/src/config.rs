// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Engine configuration. Passed explicitly into every operation that needs
// it; nothing in the core reads process-wide state.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{RasterError, Result};

/// Where compressed scratch data lives while a sub-image is being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScratchBacking {
    /// Anonymous temporary file, removed when the store is dropped.
    File,
    /// Compressed bytes held in memory.
    Memory,
}

/// Settings shared by rendering, compositing and extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Backing for temporary stores.
    pub scratch_backing: ScratchBacking,
    /// Directory for file-backed scratch. `None` uses the OS temp dir.
    pub scratch_dir: Option<PathBuf>,
    /// Deflate level (0-9) for scratch streams.
    pub scratch_compression: u32,
    /// Render resolution in dots per inch.
    pub resolution: f64,
    /// Bits per sample for rendered separations (8 or 16).
    pub render_depth: u8,
    /// Page units per inch. Page content is expressed in 1/96 inch.
    pub page_units_per_inch: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scratch_backing: ScratchBacking::File,
            scratch_dir: None,
            scratch_compression: 1,
            resolution: 150.0,
            render_depth: 8,
            page_units_per_inch: 96.0,
        }
    }
}

impl EngineConfig {
    /// Load a JSON configuration file. Absent fields take their defaults.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        debug!(?config, "Engine configuration loaded");
        Ok(config)
    }

    /// Reject settings no operation can honour.
    pub fn validate(&self) -> Result<()> {
        if self.scratch_compression > 9 {
            return Err(RasterError::UnsupportedFormat(format!(
                "scratch compression level {} (expected 0-9)",
                self.scratch_compression
            )));
        }
        if !(self.resolution > 0.0) {
            return Err(RasterError::UnsupportedFormat(format!(
                "resolution {} dpi",
                self.resolution
            )));
        }
        if !(self.page_units_per_inch > 0.0) {
            return Err(RasterError::UnsupportedFormat(format!(
                "{} page units per inch",
                self.page_units_per_inch
            )));
        }
        if self.render_depth != 8 && self.render_depth != 16 {
            return Err(RasterError::UnsupportedFormat(format!(
                "render depth {} (expected 8 or 16)",
                self.render_depth
            )));
        }
        Ok(())
    }

    /// Convert a length in page units to whole pixels at the configured
    /// resolution.
    pub fn page_to_pixels(&self, length: f64) -> u32 {
        (length / self.page_units_per_inch * self.resolution)
            .round()
            .max(0.0) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn page_to_pixels_rounds() {
        let config = EngineConfig {
            resolution: 576.0,
            ..EngineConfig::default()
        };
        // 8.5in Letter width in 1/96 inch.
        assert_eq!(config.page_to_pixels(816.0), 4896);
        let config = EngineConfig::default();
        assert_eq!(config.page_to_pixels(1.0), 2);
    }

    #[test]
    fn load_partial_json_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "scratch_backing": "memory", "resolution": 300.0 }}"#).unwrap();

        let config = EngineConfig::load(file.path()).unwrap();
        assert_eq!(config.scratch_backing, ScratchBacking::Memory);
        assert_eq!(config.resolution, 300.0);
        assert_eq!(config.render_depth, 8);
    }

    #[test]
    fn invalid_compression_rejected() {
        let config = EngineConfig {
            scratch_compression: 12,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
