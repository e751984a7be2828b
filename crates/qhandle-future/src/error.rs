//! Error types for future handles.

use std::path::PathBuf;

use qhandle_hal::{HalError, JobId};
use thiserror::Error;

/// Errors surfaced by submitting, retrieving or persisting a handle.
#[derive(Debug, Error)]
pub enum HandleError {
    /// The platform rejected the job at submission time.
    #[error("Job submission rejected: {0}")]
    Submission(#[source] HalError),

    /// The job failed, or its state could not be retrieved.
    #[error("Job {job_id} failed: {message}")]
    Execution {
        /// Job the failure belongs to.
        job_id: JobId,
        /// Diagnostic text reported by the platform.
        message: String,
        /// Whether a later `get` on the same handle may succeed.
        retryable: bool,
    },

    /// Serialized handle text is structurally invalid.
    #[error("Malformed handle: {0}")]
    MalformedHandle(String),

    /// The handle was issued by a different platform.
    #[error("Handle was issued by platform '{recorded}' but is being resumed on '{actual}'")]
    PlatformMismatch {
        /// Platform named in the serialized handle.
        recorded: String,
        /// Platform supplied when resuming.
        actual: String,
    },

    /// Reading or writing a handle file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Encoding a handle failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl HandleError {
    /// True if the error came from a job that will never produce a result.
    pub fn is_job_failure(&self) -> bool {
        matches!(
            self,
            HandleError::Execution {
                retryable: false,
                ..
            }
        )
    }
}

/// Result type for handle operations.
pub type HandleResult<T> = Result<T, HandleError>;
