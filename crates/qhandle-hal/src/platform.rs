//! Execution platform trait and configuration.
//!
//! The [`ExecutionPlatform`] trait is the seam between job handles and
//! whatever actually runs a job:
//!
//! ```text
//!   is_remote() ──→ submit() ──→ resolve() ──→ resolve() ──→ Ready | Failed
//!    (sync)          (async)      (async, polled until terminal)
//! ```
//!
//! ## Method table
//!
//! | Method | Kind | Required | Returns |
//! |--------|------|----------|---------|
//! | `name()` | sync | yes | `&str` |
//! | `is_remote()` | sync | yes | `bool` |
//! | `num_qpus()` | sync | provided | `usize` |
//! | `submit()` | async | yes | `HalResult<JobId>` |
//! | `resolve()` | async | yes | `HalResult<Resolution>` |

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::HalResult;
use crate::job::{JobId, JobRequest, JobStatus};
use crate::result::ExecutionResult;

/// Configuration for a platform instance.
#[derive(Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Name of the platform.
    pub name: String,
    /// API endpoint URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Authentication token.
    #[serde(skip_serializing)]
    pub token: Option<String>,
    /// Additional configuration.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl PlatformConfig {
    /// Create a new platform configuration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: None,
            token: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Set the endpoint URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the authentication token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Add extra configuration.
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Read an unsigned integer from the extras.
    pub fn extra_u64(&self, key: &str) -> Option<u64> {
        self.extra.get(key).and_then(serde_json::Value::as_u64)
    }

    /// Read a boolean from the extras.
    pub fn extra_bool(&self, key: &str) -> Option<bool> {
        self.extra.get(key).and_then(serde_json::Value::as_bool)
    }
}

impl fmt::Debug for PlatformConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformConfig")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint)
            .field("token", &"[REDACTED]")
            .field("extra", &self.extra)
            .finish()
    }
}

/// What a platform currently knows about a job.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Job has not finished yet; carries `Queued` or `Running`.
    Pending(JobStatus),
    /// Job finished and produced a result.
    Ready(ExecutionResult),
    /// Job finished without a result; carries the platform diagnostic.
    Failed(String),
}

impl Resolution {
    /// True while the job has not reached a terminal state.
    pub fn is_pending(&self) -> bool {
        matches!(self, Resolution::Pending(_))
    }

    /// The job status this resolution corresponds to.
    pub fn status(&self) -> JobStatus {
        match self {
            Resolution::Pending(status) => status.clone(),
            Resolution::Ready(_) => JobStatus::Completed,
            Resolution::Failed(msg) => JobStatus::Failed(msg.clone()),
        }
    }
}

/// A system that executes jobs and resolves them by identifier.
///
/// # Contract
///
/// - `submit()` MUST NOT wait for the job to finish.
/// - `submit()` MUST reject malformed requests up front rather than
///   accepting them and failing later.
/// - `resolve()` MUST be answerable from the identifier alone, so that a
///   handle resumed in another process can query it.
/// - Once `resolve()` reports `Ready` or `Failed` for an identifier it
///   keeps doing so.
#[async_trait]
pub trait ExecutionPlatform: Send + Sync {
    /// Get the name of this platform.
    fn name(&self) -> &str;

    /// Whether jobs execute out of process or out of host.
    ///
    /// Callers use this to decide between retrieving a result inline and
    /// persisting a handle to resume later.
    fn is_remote(&self) -> bool;

    /// Number of QPUs jobs can be routed to.
    fn num_qpus(&self) -> usize {
        1
    }

    /// Submit a job for execution on the QPU with index `qpu_id`.
    async fn submit(&self, job: &JobRequest, shots: u32, qpu_id: usize) -> HalResult<JobId>;

    /// Report the current state of a job.
    async fn resolve(&self, job_id: &JobId) -> HalResult<Resolution>;
}

/// Trait for creating platforms from configuration.
pub trait PlatformFactory: ExecutionPlatform + Sized {
    /// Create a platform from configuration.
    fn from_config(config: PlatformConfig) -> HalResult<Self>;
}
