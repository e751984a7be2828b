//! Execution platform for HTTP job services.
//!
//! Connects future handles to any service that speaks the small job
//! protocol below. Jobs always run remotely, so handles created through
//! this platform are meant to be saved and resumed later.
//!
//! # Protocol
//!
//! ```text
//! POST {endpoint}/jobs        {"program", "num_measured", "shots", "qpu", "name"?}
//!                          →  {"job": "<id>"}
//! GET  {endpoint}/jobs/{id}
//!                          →  {"status": "queued|running|completed|failed|cancelled",
//!                              "results"?: {"<bits>": count}, "error"?: "..."}
//! ```
//!
//! # Authentication
//!
//! A bearer token is taken from the platform config, or from the
//! `QHANDLE_TOKEN` environment variable:
//!
//! ```bash
//! export QHANDLE_TOKEN="your-api-token"
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use qhandle_adapter_rest::RestPlatform;
//! use qhandle_future::Submitter;
//! use qhandle_hal::JobRequest;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let platform = RestPlatform::new("lab", "https://jobs.example.com/v1", None)?;
//!     let submitter = Submitter::new(Arc::new(platform));
//!
//!     let handle = submitter.submit(&JobRequest::new("h q[0]; cx q[0], q[1];", 2), 1000).await?;
//!     handle.save("bell.json").await?;
//!     Ok(())
//! }
//! ```

mod api;
mod error;
mod platform;

pub use api::{JobStatusResponse, RestClient, SubmitRequest, SubmitResponse};
pub use error::{RestError, RestResult};
pub use platform::{RestPlatform, TOKEN_ENV};
