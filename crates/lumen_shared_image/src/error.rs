//! Shared image error types

use lumen_core::{SharedImageFormat, Size};
use thiserror::Error;

/// Shared image errors
#[derive(Debug, Error)]
pub enum SharedImageError {
    #[error("{format} not supported by this factory: {reason}")]
    Unsupported {
        format: SharedImageFormat,
        reason: String,
    },

    #[error("Format {0} has no texture support")]
    UnknownFormat(SharedImageFormat),

    #[error("Invalid texture size {size} (max {max})")]
    InvalidSize { size: Size, max: u32 },

    #[error("Initial data is {actual} bytes, expected {expected}")]
    InvalidPixelData { expected: usize, actual: usize },

    #[error("Texture driver error: {0}")]
    Driver(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

impl SharedImageError {
    pub(crate) fn unsupported(format: SharedImageFormat, reason: impl Into<String>) -> Self {
        Self::Unsupported {
            format,
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for SharedImageError {
    fn from(e: serde_json::Error) -> Self {
        SharedImageError::Parse(e.to_string())
    }
}

/// Result type for shared image operations
pub type SharedImageResult<T> = Result<T, SharedImageError>;
