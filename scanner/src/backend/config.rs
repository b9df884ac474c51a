//! # Scanner Configuration
//!
//! Settings for the scan flow, read from a YAML file. Missing keys fall back
//! to their defaults and a missing file yields the default configuration.
//!
//! ## YAML Format
//!
//! ```yaml
//! surface_id: "qr-video"
//! log_filter: "info"
//! options:
//!   preferred_camera: environment
//!   highlight_scan_region: true
//!   highlight_code_outline: true
//!   max_scans_per_second: 25
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use shared::ScanOptions;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Id of the video surface the camera stream is drawn on
    pub surface_id: String,
    /// Default tracing filter when `RUST_LOG` is not set
    pub log_filter: String,
    pub options: ScanOptions,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            surface_id: "qr-video".to_string(),
            log_filter: "info".to_string(),
            options: ScanOptions::default(),
        }
    }
}

impl ScanConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: ScanConfig =
            serde_yaml::from_str(yaml).context("Failed to parse scanner config")?;
        Ok(config)
    }

    /// Load config from `path`, or the defaults if it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No scanner config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scanner config {:?}", path))?;
        let config = Self::from_yaml_str(&yaml)
            .with_context(|| format!("Invalid scanner config {:?}", path))?;
        debug!("Loaded scanner config from {:?}", path);
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize scanner config")
    }
}
