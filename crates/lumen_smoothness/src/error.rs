//! Smoothness tracker error types

use thiserror::Error;

/// Errors raised while configuring a tracker.
///
/// Per-frame operations never fail; only construction from an explicit
/// configuration does.
#[derive(Debug, Error)]
pub enum SmoothnessError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for SmoothnessError {
    fn from(e: serde_json::Error) -> Self {
        SmoothnessError::Parse(e.to_string())
    }
}

/// Result type for smoothness configuration
pub type SmoothnessResult<T> = Result<T, SmoothnessError>;
