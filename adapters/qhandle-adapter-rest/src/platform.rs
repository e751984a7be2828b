//! `ExecutionPlatform` implementation for HTTP job services.

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use qhandle_hal::{
    Counts, ExecutionPlatform, ExecutionResult, HalError, HalResult, JobId, JobRequest, JobStatus,
    PlatformConfig, PlatformFactory, Resolution,
};

use crate::api::{JobStatusResponse, RestClient, SubmitRequest};
use crate::error::RestError;

/// Environment variable consulted when the config carries no token.
pub const TOKEN_ENV: &str = "QHANDLE_TOKEN";

/// Maximum number of terminal resolutions kept in memory.
const MAX_CACHED_JOBS: usize = 10_000;

/// Platform backed by a remote job service.
///
/// Jobs are always remote: `submit` returns as soon as the service has
/// assigned an identifier, and `resolve` asks the service for the job's
/// current state. Terminal answers are cached so a resolved job is not
/// fetched twice.
pub struct RestPlatform {
    name: String,
    client: RestClient,
    num_qpus: usize,
    resolved: Mutex<FxHashMap<String, Resolution>>,
}

impl std::fmt::Debug for RestPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestPlatform")
            .field("name", &self.name)
            .field("client", &self.client)
            .field("num_qpus", &self.num_qpus)
            .finish_non_exhaustive()
    }
}

impl RestPlatform {
    /// Create a platform talking to the service at `endpoint`.
    pub fn new(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        token: Option<String>,
    ) -> Result<Self, RestError> {
        Ok(Self {
            name: name.into(),
            client: RestClient::new(endpoint, token)?,
            num_qpus: 1,
            resolved: Mutex::new(FxHashMap::default()),
        })
    }

    /// Set how many QPUs the service routes to.
    pub fn with_qpus(mut self, num_qpus: usize) -> Self {
        self.num_qpus = num_qpus.max(1);
        self
    }

    /// The underlying HTTP client.
    pub fn client(&self) -> &RestClient {
        &self.client
    }

    async fn remember(&self, job_id: &JobId, resolution: &Resolution) {
        let mut resolved = self.resolved.lock().await;
        if resolved.len() >= MAX_CACHED_JOBS {
            resolved.clear();
        }
        resolved.insert(job_id.0.clone(), resolution.clone());
    }
}

/// Translate a service status response into a [`Resolution`].
pub(crate) fn resolution_from_response(response: JobStatusResponse) -> Resolution {
    if response.is_completed() {
        match response.results {
            Some(results) => {
                let counts: Counts = results.into_iter().collect();
                match counts.checked_total() {
                    Some(total) => {
                        let shots = u32::try_from(total).unwrap_or(u32::MAX);
                        Resolution::Ready(ExecutionResult::new(counts, shots))
                    }
                    None => Resolution::Failed("completed job returned counts that overflow".into()),
                }
            }
            None => Resolution::Failed("completed job returned no results".into()),
        }
    } else if response.is_failed() {
        Resolution::Failed(
            response
                .error
                .unwrap_or_else(|| "job failed without a diagnostic".into()),
        )
    } else if response.is_cancelled() {
        Resolution::Failed("job was cancelled".into())
    } else if response.is_running() {
        Resolution::Pending(JobStatus::Running)
    } else {
        Resolution::Pending(JobStatus::Queued)
    }
}

#[async_trait]
impl ExecutionPlatform for RestPlatform {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_remote(&self) -> bool {
        true
    }

    fn num_qpus(&self) -> usize {
        self.num_qpus
    }

    #[instrument(skip(self, job))]
    async fn submit(&self, job: &JobRequest, shots: u32, qpu_id: usize) -> HalResult<JobId> {
        job.validate(shots)?;
        if qpu_id >= self.num_qpus {
            return Err(HalError::UnknownQpu {
                qpu_id,
                available: self.num_qpus,
            });
        }

        let req = SubmitRequest {
            program: job.program.clone(),
            num_measured: job.num_measured,
            shots,
            qpu: qpu_id,
            name: job.name.clone(),
        };

        let response = self.client.submit_job(&req).await.map_err(|e| match e {
            RestError::JobNotFound(_) => HalError::SubmissionFailed(format!(
                "no job service at {}",
                self.client.base_url()
            )),
            other => other.into(),
        })?;

        if response.job.is_empty() {
            return Err(HalError::SubmissionFailed(
                "service returned an empty job identifier".into(),
            ));
        }

        let job_id = JobId::new(response.job);
        info!("Job submitted to {}: {}", self.name, job_id);
        Ok(job_id)
    }

    #[instrument(skip(self))]
    async fn resolve(&self, job_id: &JobId) -> HalResult<Resolution> {
        if let Some(resolution) = self.resolved.lock().await.get(&job_id.0) {
            return Ok(resolution.clone());
        }

        let response = self.client.get_job(&job_id.0).await?;
        debug!("Job {} reported status {}", job_id, response.status);

        let resolution = resolution_from_response(response);
        if !resolution.is_pending() {
            self.remember(job_id, &resolution).await;
        }
        Ok(resolution)
    }
}

impl PlatformFactory for RestPlatform {
    fn from_config(config: PlatformConfig) -> HalResult<Self> {
        let endpoint = config
            .endpoint
            .clone()
            .ok_or_else(|| HalError::from(RestError::MissingEndpoint))?;
        let token = config
            .token
            .clone()
            .or_else(|| std::env::var(TOKEN_ENV).ok());
        let num_qpus = config
            .extra_u64("num_qpus")
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(1);

        Ok(Self::new(config.name, endpoint, token)?.with_qpus(num_qpus))
    }
}
