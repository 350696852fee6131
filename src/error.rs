//! Crate-level error type.

use crate::core::config::ConfigError;
use crate::playback::engine::EngineError;

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}
