// SPDX-License-Identifier: GPL-3.0-only

use crate::constants::{http, pipeline};
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Image pipeline settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Integer upscale factor
    pub scale: u32,
    /// Brightness gain applied before colormapping
    pub alpha: f32,
    /// Box blur kernel size in pixels (0 or 1 disables blurring, even sizes round up)
    pub blur: u32,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            scale: pipeline::DEFAULT_SCALE,
            alpha: pipeline::DEFAULT_ALPHA,
            blur: pipeline::DEFAULT_BLUR,
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Listen port on all interfaces
    pub port: u16,
    /// Maximum simultaneous `/stream` clients (None = unlimited)
    pub max_clients: Option<usize>,
    /// JPEG quality (1-100)
    pub jpeg_quality: u8,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: http::DEFAULT_PORT,
            max_clients: None,
            jpeg_quality: pipeline::DEFAULT_JPEG_QUALITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Camera index, opened as `/dev/video<N>`
    pub device: u32,
    /// Run without the local display
    pub headless: bool,
    pub pipeline: PipelineSettings,
    pub server: ServerSettings,
}

impl Config {
    /// Load a config from a JSON file; missing fields take their defaults
    pub fn load(path: &Path) -> AppResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;
        let config: Config = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Device node path for the configured camera index
    pub fn device_path(&self) -> String {
        crate::backends::camera::v4l2_utils::device_path(self.device)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.pipeline.scale == 0 {
            return Err(AppError::Config("scale must be at least 1".into()));
        }
        if !(1..=100).contains(&self.server.jpeg_quality) {
            return Err(AppError::Config(format!(
                "jpeg quality must be 1-100, got {}",
                self.server.jpeg_quality
            )));
        }
        if !self.pipeline.alpha.is_finite() || self.pipeline.alpha < 0.0 {
            return Err(AppError::Config(format!(
                "alpha must be a non-negative number, got {}",
                self.pipeline.alpha
            )));
        }
        if self.server.max_clients == Some(0) {
            return Err(AppError::Config("max clients must be at least 1".into()));
        }
        Ok(())
    }
}
