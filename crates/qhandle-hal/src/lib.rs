//! qhandle Hardware Abstraction Layer
//!
//! This crate defines the contract between asynchronous job handles and the
//! systems that actually execute jobs, whether an in-process mock or a remote
//! job service.
//!
//! # Overview
//!
//! - The [`ExecutionPlatform`] trait for submitting jobs and resolving them
//!   by identifier
//! - [`JobRequest`], [`JobId`] and [`JobStatus`] for the job lifecycle
//! - [`Counts`] and [`ExecutionResult`] for measurement histograms
//! - [`PlatformConfig`] and [`PlatformRegistry`] for building platforms
//!   from configuration instead of a process-wide default
//!
//! # Implementing a Platform
//!
//! ```ignore
//! use qhandle_hal::{ExecutionPlatform, HalResult, JobId, JobRequest, Resolution};
//! use async_trait::async_trait;
//!
//! struct MyPlatform;
//!
//! #[async_trait]
//! impl ExecutionPlatform for MyPlatform {
//!     fn name(&self) -> &str { "my_platform" }
//!
//!     fn is_remote(&self) -> bool { true }
//!
//!     async fn submit(&self, job: &JobRequest, shots: u32, qpu_id: usize) -> HalResult<JobId> {
//!         job.validate(shots)?;
//!         // Hand the program to the service, return its job id
//!         # todo!()
//!     }
//!
//!     async fn resolve(&self, job_id: &JobId) -> HalResult<Resolution> {
//!         // Ask the service what became of the job
//!         # todo!()
//!     }
//! }
//! ```

pub mod error;
pub mod job;
pub mod platform;
pub mod registry;
pub mod result;

pub use error::{HalError, HalResult};
pub use job::{Job, JobId, JobRequest, JobStatus, MAX_MEASURED};
pub use platform::{ExecutionPlatform, PlatformConfig, PlatformFactory, Resolution};
pub use registry::PlatformRegistry;
pub use result::{Counts, ExecutionResult};
