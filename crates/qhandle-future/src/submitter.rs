//! Job submission.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::try_join_all;
use tracing::{debug, info, instrument};

use qhandle_hal::{Counts, ExecutionPlatform, HalError, JobRequest};

use crate::error::{HandleError, HandleResult};
use crate::handle::{DEFAULT_POLL_INTERVAL, FutureHandle, read_handle_file};
use crate::record::{HandleMetadata, HandleRecord};

/// Submits jobs to one explicitly chosen platform and hands back handles.
///
/// There is no process-wide "current platform": every submitter owns the
/// platform it talks to, and handles it creates or resumes keep a reference
/// to that platform.
#[derive(Clone)]
pub struct Submitter {
    platform: Arc<dyn ExecutionPlatform>,
    poll_interval: Duration,
}

impl Submitter {
    /// Create a submitter for `platform`.
    pub fn new(platform: Arc<dyn ExecutionPlatform>) -> Self {
        Self {
            platform,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Set the poll interval inherited by handles.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// The platform jobs are submitted to.
    pub fn platform(&self) -> &Arc<dyn ExecutionPlatform> {
        &self.platform
    }

    /// Whether the platform executes jobs out of process.
    pub fn is_remote(&self) -> bool {
        self.platform.is_remote()
    }

    /// Submit `job` for `shots` repetitions on QPU 0.
    pub async fn submit(&self, job: &JobRequest, shots: u32) -> HandleResult<FutureHandle> {
        self.submit_on(job, shots, 0).await
    }

    /// Submit `job` for `shots` repetitions on QPU `qpu_id`.
    ///
    /// Returns as soon as the platform has accepted the job. A rejected
    /// request fails here with [`HandleError::Submission`]; it is never
    /// deferred into the handle.
    #[instrument(skip(self, job), fields(platform = %self.platform.name()))]
    pub async fn submit_on(
        &self,
        job: &JobRequest,
        shots: u32,
        qpu_id: usize,
    ) -> HandleResult<FutureHandle> {
        let available = self.platform.num_qpus();
        if qpu_id >= available {
            return Err(HandleError::Submission(HalError::UnknownQpu { qpu_id, available }));
        }
        job.validate(shots).map_err(HandleError::Submission)?;

        let id = self
            .platform
            .submit(job, shots, qpu_id)
            .await
            .map_err(HandleError::Submission)?;
        info!(
            "Submitted job {} to {} (qpu {}, {} shots)",
            id,
            self.platform.name(),
            qpu_id,
            shots
        );

        let metadata = HandleMetadata {
            platform: Some(self.platform.name().to_string()),
            shots: Some(shots),
            qpu: Some(qpu_id),
            submitted_at: Some(Utc::now()),
        };
        Ok(FutureHandle::pending(
            id,
            metadata,
            Arc::clone(&self.platform),
            self.poll_interval,
        ))
    }

    /// Submit several jobs, spreading them round-robin over all QPUs.
    ///
    /// Handles are returned in the order of `jobs`. The first rejection
    /// fails the whole batch.
    pub async fn submit_batch(
        &self,
        jobs: &[JobRequest],
        shots: u32,
    ) -> HandleResult<Vec<FutureHandle>> {
        let qpus = self.platform.num_qpus().max(1);
        debug!("Submitting batch of {} jobs over {} QPU(s)", jobs.len(), qpus);
        try_join_all(
            jobs.iter()
                .enumerate()
                .map(|(i, job)| self.submit_on(job, shots, i % qpus)),
        )
        .await
    }

    /// Rebuild a handle from serialized text against this submitter's
    /// platform.
    pub fn resume(&self, text: &str) -> HandleResult<FutureHandle> {
        let record = HandleRecord::decode(text)?;
        FutureHandle::from_record(record, Arc::clone(&self.platform), self.poll_interval)
    }

    /// Read a handle file and resume it.
    pub async fn load(&self, path: impl AsRef<Path>) -> HandleResult<FutureHandle> {
        let text = read_handle_file(path.as_ref()).await?;
        self.resume(&text)
    }
}

impl std::fmt::Debug for Submitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Submitter")
            .field("platform", &self.platform.name())
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}

/// Wait for every handle and return their payloads in order.
///
/// Handles are awaited concurrently; the first failure is returned.
pub async fn get_all(handles: &[FutureHandle]) -> HandleResult<Vec<Counts>> {
    try_join_all(handles.iter().map(|handle| handle.get())).await
}
