//! The future handle.

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, trace, warn};

use qhandle_hal::{Counts, ExecutionPlatform, JobId, Resolution};

use crate::error::{HandleError, HandleResult};
use crate::record::{HandleMetadata, HandleRecord, HandleState, HandleStatus};

/// Default interval between two `resolve` calls while a job is pending.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Terminal outcome stored in a handle's state cell.
#[derive(Debug, Clone)]
enum Outcome {
    Ready(Counts),
    Failed(String),
}

/// Handle to a job whose result may not exist yet.
///
/// A handle is created `Pending` by a submitter, or rebuilt from text by
/// [`FutureHandle::deserialize`]. [`get`](Self::get) waits for the job to
/// leave `Pending`. The transition is made at most once and is shared by all
/// clones of the handle: concurrent callers of `get` see a single poller and
/// receive the same payload.
#[derive(Clone)]
pub struct FutureHandle {
    id: JobId,
    metadata: HandleMetadata,
    outcome: Arc<OnceCell<Outcome>>,
    platform: Arc<dyn ExecutionPlatform>,
    poll_interval: Duration,
}

impl FutureHandle {
    pub(crate) fn pending(
        id: JobId,
        metadata: HandleMetadata,
        platform: Arc<dyn ExecutionPlatform>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            id,
            metadata,
            outcome: Arc::new(OnceCell::new()),
            platform,
            poll_interval,
        }
    }

    /// Bind a decoded record to the platform that will resolve it.
    ///
    /// Fails with [`HandleError::PlatformMismatch`] when the record names a
    /// different platform.
    pub fn from_record(
        record: HandleRecord,
        platform: Arc<dyn ExecutionPlatform>,
        poll_interval: Duration,
    ) -> HandleResult<Self> {
        if let Some(recorded) = &record.metadata.platform {
            if recorded != platform.name() {
                return Err(HandleError::PlatformMismatch {
                    recorded: recorded.clone(),
                    actual: platform.name().to_string(),
                });
            }
        }

        let outcome = match record.state {
            HandleState::Pending => OnceCell::new(),
            HandleState::Ready(counts) => OnceCell::new_with(Some(Outcome::Ready(counts))),
            HandleState::Failed(msg) => OnceCell::new_with(Some(Outcome::Failed(msg))),
        };

        Ok(Self {
            id: record.id,
            metadata: record.metadata,
            outcome: Arc::new(outcome),
            platform,
            poll_interval,
        })
    }

    /// Rebuild a handle from its serialized text.
    ///
    /// A pending handle rebuilt this way queries `platform` with its stored
    /// identifier when [`get`](Self::get) is called.
    pub fn deserialize(text: &str, platform: Arc<dyn ExecutionPlatform>) -> HandleResult<Self> {
        let record = HandleRecord::decode(text)?;
        Self::from_record(record, platform, DEFAULT_POLL_INTERVAL)
    }

    /// Read a handle file written by [`save`](Self::save).
    pub async fn load(
        path: impl AsRef<Path>,
        platform: Arc<dyn ExecutionPlatform>,
    ) -> HandleResult<Self> {
        let text = read_handle_file(path.as_ref()).await?;
        Self::deserialize(&text, platform)
    }

    /// Change the interval between polls of a pending job.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// The platform-issued job identifier.
    pub fn id(&self) -> &JobId {
        &self.id
    }

    /// Submission metadata.
    pub fn metadata(&self) -> &HandleMetadata {
        &self.metadata
    }

    /// The platform that resolves this handle.
    pub fn platform(&self) -> &Arc<dyn ExecutionPlatform> {
        &self.platform
    }

    /// Current status, without contacting the platform.
    pub fn status(&self) -> HandleStatus {
        match self.outcome.get() {
            None => HandleStatus::Pending,
            Some(Outcome::Ready(_)) => HandleStatus::Ready,
            Some(Outcome::Failed(_)) => HandleStatus::Failed,
        }
    }

    /// True once the payload is held locally.
    pub fn is_ready(&self) -> bool {
        self.status() == HandleStatus::Ready
    }

    /// Non-blocking peek: `None` while pending, otherwise what
    /// [`get`](Self::get) would return.
    pub fn try_result(&self) -> Option<HandleResult<Counts>> {
        self.outcome.get().map(|outcome| self.unpack(outcome))
    }

    /// Wait for the job to finish and return its payload.
    ///
    /// Returns immediately on a handle that is already resolved. While the
    /// job is pending the platform is polled every poll interval; there is
    /// no timeout, wrap the call in `tokio::time::timeout` to bound it.
    ///
    /// If the platform cannot be reached the error is reported as
    /// [`HandleError::Execution`] with `retryable` set when the failure is
    /// transient, and the handle stays `Pending`.
    #[instrument(skip(self), fields(job_id = %self.id))]
    pub async fn get(&self) -> HandleResult<Counts> {
        let outcome = self
            .outcome
            .get_or_try_init(|| self.poll_until_resolved())
            .await?;
        self.unpack(outcome)
    }

    /// Snapshot of the handle as a serializable record.
    pub fn record(&self) -> HandleRecord {
        let state = match self.outcome.get() {
            None => HandleState::Pending,
            Some(Outcome::Ready(counts)) => HandleState::Ready(counts.clone()),
            Some(Outcome::Failed(msg)) => HandleState::Failed(msg.clone()),
        };
        HandleRecord {
            id: self.id.clone(),
            state,
            metadata: self.metadata.clone(),
        }
    }

    /// Encode the handle as text. Works in every status.
    pub fn serialize(&self) -> HandleResult<String> {
        self.record().encode()
    }

    /// Write the serialized handle to `path`, replacing any existing file.
    pub async fn save(&self, path: impl AsRef<Path>) -> HandleResult<()> {
        let path = path.as_ref();
        let text = self.serialize()?;
        tokio::fs::write(path, text)
            .await
            .map_err(|source| HandleError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        debug!("Saved {} handle {} to {}", self.status(), self.id, path.display());
        Ok(())
    }

    fn unpack(&self, outcome: &Outcome) -> HandleResult<Counts> {
        match outcome {
            Outcome::Ready(counts) => Ok(counts.clone()),
            Outcome::Failed(msg) => Err(HandleError::Execution {
                job_id: self.id.clone(),
                message: msg.clone(),
                retryable: false,
            }),
        }
    }

    async fn poll_until_resolved(&self) -> HandleResult<Outcome> {
        let mut polls: u64 = 0;
        loop {
            let resolution = self.platform.resolve(&self.id).await.map_err(|e| {
                warn!("Resolving job {} on {} failed: {}", self.id, self.platform.name(), e);
                HandleError::Execution {
                    job_id: self.id.clone(),
                    retryable: e.is_transient(),
                    message: e.to_string(),
                }
            })?;
            polls += 1;
            trace!("Job {} is {} after {} poll(s)", self.id, resolution.status(), polls);

            match resolution {
                Resolution::Pending(_) => {
                    tokio::time::sleep(self.poll_interval).await;
                }
                Resolution::Ready(result) => {
                    let outcome = match self.check_payload(&result.counts) {
                        Ok(()) => {
                            info!("Job {} ready after {} poll(s)", self.id, polls);
                            Outcome::Ready(result.counts)
                        }
                        Err(reason) => {
                            warn!("Job {} returned an invalid payload: {}", self.id, reason);
                            Outcome::Failed(reason)
                        }
                    };
                    return Ok(outcome);
                }
                Resolution::Failed(msg) => {
                    info!("Job {} failed: {}", self.id, msg);
                    return Ok(Outcome::Failed(msg));
                }
            }
        }
    }

    fn check_payload(&self, counts: &Counts) -> Result<(), String> {
        if counts.is_empty() {
            return Err("platform returned an empty payload".to_string());
        }
        counts
            .validate()
            .map_err(|e| format!("platform returned an invalid payload: {e}"))?;
        let total = counts
            .checked_total()
            .ok_or_else(|| "platform returned counts that overflow".to_string())?;
        if let Some(shots) = self.metadata.shots {
            if total != u64::from(shots) {
                return Err(format!(
                    "platform returned {total} shots but {shots} were requested"
                ));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for FutureHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FutureHandle")
            .field("id", &self.id)
            .field("status", &self.status())
            .field("platform", &self.platform.name())
            .field("metadata", &self.metadata)
            .finish()
    }
}

pub(crate) async fn read_handle_file(path: &Path) -> HandleResult<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| HandleError::Io {
            path: path.to_path_buf(),
            source,
        })
}
