//! Error types for the asset pipeline

use std::time::Duration;
use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Pipeline error types
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The foreign process did not answer within the time budget
    #[error("Foreign process didn't respond (timeout after {}s)", .elapsed.as_secs_f64())]
    Timeout { elapsed: Duration },

    /// Named entity is absent in the foreign scene
    #[error("Not found: {0}")]
    NotFound(String),

    /// Response text matched no expected shape, or could not be read
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Foreign process reported an explicit export error
    #[error("Export failed: {0}")]
    Export(String),

    /// Local filesystem error
    #[error("IO error: {0}")]
    Io(String),

    /// Sidecar (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Arguments rejected before anything was sent
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl PipelineError {
    /// Whether the caller may sensibly retry the same request
    pub fn is_retryable(&self) -> bool {
        matches!(self, PipelineError::Timeout { .. })
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message_names_duration() {
        let err = PipelineError::Timeout {
            elapsed: Duration::from_secs(30),
        };
        assert_eq!(
            err.to_string(),
            "Foreign process didn't respond (timeout after 30s)"
        );
        assert!(err.is_retryable());
    }

    #[test]
    fn test_export_message_is_verbatim() {
        let err = PipelineError::Export("ERROR: Object not found".into());
        assert_eq!(err.to_string(), "Export failed: ERROR: Object not found");
        assert!(!err.is_retryable());
    }
}
