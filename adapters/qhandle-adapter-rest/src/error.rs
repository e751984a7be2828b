//! Error types for the REST adapter.

use thiserror::Error;

/// Result type for REST operations.
pub type RestResult<T> = Result<T, RestError>;

/// Errors that can occur when talking to a job service.
#[derive(Debug, Error)]
pub enum RestError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No endpoint configured.
    #[error("Missing job service endpoint: set it in the config or QHANDLE_ENDPOINT")]
    MissingEndpoint,

    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    /// Job not found.
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// API error response.
    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },
}

impl From<RestError> for qhandle_hal::HalError {
    fn from(e: RestError) -> Self {
        use qhandle_hal::HalError;

        match e {
            RestError::Http(err) => HalError::Network(err),
            RestError::Json(err) => HalError::Serialization(err),
            RestError::MissingEndpoint => HalError::Configuration(e.to_string()),
            RestError::AuthFailed(_) => HalError::AuthenticationFailed(e.to_string()),
            RestError::JobNotFound(id) => HalError::JobNotFound(id),
            RestError::ApiError { status, message } => match status {
                400 | 422 => HalError::InvalidJob(message),
                500..=599 => HalError::PlatformUnavailable(format!("{status}: {message}")),
                _ => HalError::Platform(format!("API error ({status}): {message}")),
            },
        }
    }
}
