//! qhandle Mock Execution Platform
//!
//! An in-memory [`ExecutionPlatform`](qhandle_hal::ExecutionPlatform) for
//! tests, demos and local runs. It never interprets the submitted program.
//!
//! # Modes
//!
//! | Constructor | Remote | Resolution |
//! |-------------|--------|------------|
//! | [`MockPlatform::local`] | no | completes on the first `resolve` |
//! | [`MockPlatform::remote`] | yes | manual: `complete` / `fail` |
//!
//! Automatically completed jobs get a GHZ-shaped histogram: every shot is
//! either all zeros or all ones. Seed the sampler with
//! [`MockPlatform::with_seed`] for reproducible counts.
//!
//! # Example
//!
//! ```ignore
//! use qhandle_adapter_mock::MockPlatform;
//! use qhandle_hal::{Counts, ExecutionPlatform, JobRequest};
//!
//! let platform = MockPlatform::remote();
//! let job_id = platform.submit(&JobRequest::new(program, 2), 1000, 0).await?;
//!
//! // Later, decide the outcome on the platform side
//! platform.complete(&job_id, [("00", 500), ("11", 500)].into_iter().collect())?;
//! ```

mod platform;
mod sampler;

pub use platform::{MockPlatform, ResolveMode};
