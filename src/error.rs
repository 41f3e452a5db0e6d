//! Crate-level error type for loading sheets and configuration

use thiserror::Error;

use crate::layout::LayoutError;

/// Errors surfaced when reading sheets or configuration from outside the engine
#[derive(Debug, Error)]
pub enum SheetError {
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse sheet JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to parse configuration TOML: {0}")]
    Config(#[from] toml::de::Error),

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),
}

impl SheetError {
    /// Create an invalid configuration error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}
