//! Future result handles for asynchronously executed jobs.
//!
//! Submitting a job returns a [`FutureHandle`] immediately. The handle can be
//! awaited with [`FutureHandle::get`], or written to a file and resumed later,
//! possibly by another process, against the same platform.
//!
//! # Example: submit now, retrieve later
//!
//! ```ignore
//! use std::sync::Arc;
//! use qhandle_future::Submitter;
//! use qhandle_hal::JobRequest;
//!
//! let submitter = Submitter::new(Arc::clone(&platform));
//! let job = JobRequest::new(bell_program, 2);
//!
//! let handle = submitter.submit(&job, 1000).await?;
//! if submitter.is_remote() {
//!     handle.save("job.json").await?;
//!     // ... later, maybe in another process ...
//!     let handle = submitter.load("job.json").await?;
//!     println!("{}", handle.get().await?);
//! } else {
//!     println!("{}", handle.get().await?);
//! }
//! ```

pub mod error;
pub mod handle;
pub mod record;
pub mod submitter;

pub use error::{HandleError, HandleResult};
pub use handle::{DEFAULT_POLL_INTERVAL, FutureHandle};
pub use record::{HandleMetadata, HandleRecord, HandleState, HandleStatus};
pub use submitter::{Submitter, get_all};
