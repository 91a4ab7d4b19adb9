//! Error types for WorkPulse

use thiserror::Error;

/// Errors that can occur during computation
#[derive(Debug, Error)]
pub enum ComputeError {
    /// One or more time fields were out of range. Every violation is listed.
    #[error("Validation failed: {}", .0.join(", "))]
    InvalidTimeMetrics(Vec<String>),

    #[error("Total time cannot be zero")]
    ZeroTotalTime,

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Failed to parse input: {0}")]
    ParseError(String),

    #[error("Invalid classifier configuration: {0}")]
    InvalidConfig(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}

impl ComputeError {
    /// Individual violation messages for range-validation failures
    pub fn violations(&self) -> &[String] {
        match self {
            ComputeError::InvalidTimeMetrics(violations) => violations,
            _ => &[],
        }
    }
}
