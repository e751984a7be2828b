//! Error types for the HAL crate.

use thiserror::Error;

/// Errors that can occur in platform operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HalError {
    /// Platform is not reachable or not accepting work.
    #[error("Platform not available: {0}")]
    PlatformUnavailable(String),

    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The job description was rejected.
    #[error("Invalid job: {0}")]
    InvalidJob(String),

    /// Invalid number of shots.
    #[error("Invalid shots: {0}")]
    InvalidShots(String),

    /// Requested QPU does not exist on this platform.
    #[error("Unknown QPU {qpu_id}: platform has {available} QPU(s)")]
    UnknownQpu {
        /// The requested QPU index.
        qpu_id: usize,
        /// Number of QPUs the platform exposes.
        available: usize,
    },

    /// Job submission failed.
    #[error("Job submission failed: {0}")]
    SubmissionFailed(String),

    /// Job not found.
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// Network error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Generic platform error.
    #[error("Platform error: {0}")]
    Platform(String),
}

impl HalError {
    /// Whether retrying the same call later could succeed.
    ///
    /// Network hiccups and temporarily offline platforms are transient;
    /// rejected jobs and unknown identifiers are not.
    pub fn is_transient(&self) -> bool {
        matches!(self, HalError::Network(_) | HalError::PlatformUnavailable(_))
    }
}

/// Result type for HAL operations.
pub type HalResult<T> = Result<T, HalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(HalError::PlatformUnavailable("down".into()).is_transient());
        assert!(!HalError::JobNotFound("j1".into()).is_transient());
        assert!(!HalError::InvalidJob("empty".into()).is_transient());
    }

    #[test]
    fn test_unknown_qpu_display() {
        let err = HalError::UnknownQpu {
            qpu_id: 7,
            available: 4,
        };
        let msg = err.to_string();
        assert!(msg.contains('7'));
        assert!(msg.contains('4'));
    }
}
