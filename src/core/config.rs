//! Editing-session configuration.

use std::path::Path;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use crate::core::time::Millis;

/// Error type for configuration loading and validation
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("clip length must be positive, got {0} ms")]
    ClipLength(Millis),
    #[error("preview length must be positive, got {0} ms")]
    PreviewLength(Millis),
    #[error("poll interval must be positive")]
    PollInterval,
    #[error("initial volume must be within 0.0..=1.0, got {0}")]
    Volume(f32),
}

/// Parameters fixed for the lifetime of one editing session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Constant distance between the start and end markers
    pub clip_length_ms: Millis,
    /// Length of the 30-second store previews
    pub preview_length_ms: Millis,
    /// Position polling interval for engines without time-update events
    pub poll_interval_ms: u64,
    pub initial_volume: f32,
}

impl EditorConfig {
    /// Parse and validate a JSON configuration. Missing keys take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.clip_length_ms <= 0 {
            return Err(ConfigError::ClipLength(self.clip_length_ms));
        }
        if self.preview_length_ms <= 0 {
            return Err(ConfigError::PreviewLength(self.preview_length_ms));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::PollInterval);
        }
        if !(0.0..=1.0).contains(&self.initial_volume) {
            return Err(ConfigError::Volume(self.initial_volume));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            clip_length_ms: 30_000,
            preview_length_ms: 30_000,
            poll_interval_ms: 1_000,
            initial_volume: 0.5,
        }
    }
}
