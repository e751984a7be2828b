//! Mock platform implementation.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rustc_hash::FxHashMap;
use tracing::{debug, instrument};
use uuid::Uuid;

use qhandle_hal::{
    Counts, ExecutionPlatform, ExecutionResult, HalError, HalResult, Job, JobId, JobRequest,
    JobStatus, PlatformConfig, PlatformFactory, Resolution,
};

use crate::sampler::sample_ghz;

/// How queued jobs reach a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveMode {
    /// Jobs stay queued until [`MockPlatform::complete`] or
    /// [`MockPlatform::fail`] is called.
    Manual,
    /// Jobs report `Pending` for `polls` resolve calls, then complete with a
    /// sampled histogram.
    Auto {
        /// Number of pending answers before the job completes.
        polls: u32,
    },
}

/// Job data held by the mock.
struct MockJob {
    job: Job,
    request: JobRequest,
    polls: u32,
    result: Option<ExecutionResult>,
}

/// State shared between clones of a [`MockPlatform`].
struct Shared {
    jobs: Mutex<FxHashMap<String, MockJob>>,
    rng: Mutex<StdRng>,
    reachable: AtomicBool,
    resolve_calls: AtomicU64,
}

/// In-memory execution platform.
///
/// Clones share the same job table, so a handle serialized against one
/// clone can be resumed against another, the way a second process would
/// resume against the same remote service.
#[derive(Clone)]
pub struct MockPlatform {
    config: PlatformConfig,
    remote: bool,
    num_qpus: usize,
    mode: ResolveMode,
    shared: Arc<Shared>,
}

impl MockPlatform {
    /// A local platform: not remote, jobs complete on the first resolve.
    pub fn local() -> Self {
        Self::build(PlatformConfig::new("mock"), false, 1, ResolveMode::Auto { polls: 0 }, None)
    }

    /// A remote-flavoured platform whose jobs are resolved manually.
    pub fn remote() -> Self {
        Self::build(PlatformConfig::new("mock"), true, 1, ResolveMode::Manual, None)
    }

    fn build(
        config: PlatformConfig,
        remote: bool,
        num_qpus: usize,
        mode: ResolveMode,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            remote,
            num_qpus,
            mode,
            shared: Arc::new(Shared {
                jobs: Mutex::new(FxHashMap::default()),
                rng: Mutex::new(rng),
                reachable: AtomicBool::new(true),
                resolve_calls: AtomicU64::new(0),
            }),
        }
    }

    /// Rename the platform.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Set the number of QPUs.
    pub fn with_qpus(mut self, num_qpus: usize) -> Self {
        self.num_qpus = num_qpus.max(1);
        self
    }

    /// Set how jobs are resolved.
    pub fn with_mode(mut self, mode: ResolveMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set whether the platform reports itself as remote.
    pub fn with_remote(mut self, remote: bool) -> Self {
        self.remote = remote;
        self
    }

    /// Reseed the sampler used by [`ResolveMode::Auto`].
    pub fn with_seed(self, seed: u64) -> Self {
        *lock(&self.shared.rng) = StdRng::seed_from_u64(seed);
        self
    }

    /// Make the platform reachable or unreachable. While unreachable every
    /// call fails with [`HalError::PlatformUnavailable`].
    pub fn set_reachable(&self, reachable: bool) {
        self.shared.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Number of `resolve` calls served so far, across all clones.
    pub fn resolve_calls(&self) -> u64 {
        self.shared.resolve_calls.load(Ordering::SeqCst)
    }

    /// Identifiers of all known jobs.
    pub fn job_ids(&self) -> Vec<JobId> {
        let mut ids: Vec<_> = lock(&self.shared.jobs)
            .values()
            .map(|j| j.job.id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Metadata of a job.
    pub fn job(&self, job_id: &JobId) -> Option<Job> {
        lock(&self.shared.jobs).get(&job_id.0).map(|j| j.job.clone())
    }

    /// Mark a queued job as running.
    pub fn start(&self, job_id: &JobId) -> HalResult<()> {
        self.transition(job_id, JobStatus::Running, None)
    }

    /// Finish a job with the given histogram. The histogram is recorded
    /// verbatim.
    pub fn complete(&self, job_id: &JobId, counts: Counts) -> HalResult<()> {
        let shots = u32::try_from(counts.total_shots()).unwrap_or(u32::MAX);
        let result = ExecutionResult::new(counts, shots);
        self.transition(job_id, JobStatus::Completed, Some(result))
    }

    /// Finish a job with a failure diagnostic.
    pub fn fail(&self, job_id: &JobId, message: impl Into<String>) -> HalResult<()> {
        self.transition(job_id, JobStatus::Failed(message.into()), None)
    }

    fn transition(
        &self,
        job_id: &JobId,
        status: JobStatus,
        result: Option<ExecutionResult>,
    ) -> HalResult<()> {
        let mut jobs = lock(&self.shared.jobs);
        let mock_job = jobs
            .get_mut(&job_id.0)
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))?;
        if mock_job.job.status.is_terminal() {
            return Err(HalError::Platform(format!(
                "Job {} is already {}",
                job_id, mock_job.job.status
            )));
        }
        debug!("Job {} -> {}", job_id, status);
        mock_job.job = mock_job.job.clone().with_status(status);
        mock_job.result = result;
        Ok(())
    }

    fn ensure_reachable(&self) -> HalResult<()> {
        if self.shared.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(HalError::PlatformUnavailable(format!(
                "{} is unreachable",
                self.config.name
            )))
        }
    }
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::local()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl ExecutionPlatform for MockPlatform {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn is_remote(&self) -> bool {
        self.remote
    }

    fn num_qpus(&self) -> usize {
        self.num_qpus
    }

    #[instrument(skip(self, job))]
    async fn submit(&self, job: &JobRequest, shots: u32, qpu_id: usize) -> HalResult<JobId> {
        self.ensure_reachable()?;
        job.validate(shots)?;
        if qpu_id >= self.num_qpus {
            return Err(HalError::UnknownQpu {
                qpu_id,
                available: self.num_qpus,
            });
        }

        let job_id = JobId::new(Uuid::new_v4().to_string());
        let tracked = Job::new(job_id.clone(), shots)
            .with_platform(self.config.name.clone())
            .on_qpu(qpu_id);

        lock(&self.shared.jobs).insert(
            job_id.0.clone(),
            MockJob {
                job: tracked,
                request: job.clone(),
                polls: 0,
                result: None,
            },
        );

        debug!("Submitted job: {}", job_id);
        Ok(job_id)
    }

    async fn resolve(&self, job_id: &JobId) -> HalResult<Resolution> {
        self.ensure_reachable()?;
        self.shared.resolve_calls.fetch_add(1, Ordering::SeqCst);

        let mut jobs = lock(&self.shared.jobs);
        let mock_job = jobs
            .get_mut(&job_id.0)
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))?;

        match &mock_job.job.status {
            JobStatus::Completed => {
                let result = mock_job.result.clone().ok_or_else(|| {
                    HalError::Platform(format!("Job {job_id} completed without a result"))
                })?;
                return Ok(Resolution::Ready(result));
            }
            JobStatus::Failed(msg) => return Ok(Resolution::Failed(msg.clone())),
            JobStatus::Cancelled => return Ok(Resolution::Failed("job was cancelled".into())),
            JobStatus::Queued | JobStatus::Running => {}
        }

        match self.mode {
            ResolveMode::Auto { polls } if mock_job.polls >= polls => {
                let counts = {
                    let mut rng = lock(&self.shared.rng);
                    sample_ghz(&mut rng, mock_job.request.num_measured, mock_job.job.shots)?
                };
                let result = ExecutionResult::new(counts, mock_job.job.shots);
                mock_job.job = mock_job.job.clone().with_status(JobStatus::Completed);
                mock_job.result = Some(result.clone());
                Ok(Resolution::Ready(result))
            }
            _ => {
                mock_job.polls += 1;
                Ok(Resolution::Pending(mock_job.job.status.clone()))
            }
        }
    }
}

impl PlatformFactory for MockPlatform {
    fn from_config(config: PlatformConfig) -> HalResult<Self> {
        let remote = config.extra_bool("remote").unwrap_or(false);
        let num_qpus = config.extra_u64("num_qpus").map_or(1, |v| v.max(1) as usize);
        let seed = config.extra_u64("seed");
        let mode = if config.extra_bool("manual").unwrap_or(false) {
            ResolveMode::Manual
        } else {
            let polls = config.extra_u64("auto_polls").unwrap_or(0);
            ResolveMode::Auto {
                polls: u32::try_from(polls).map_err(|_| {
                    HalError::Configuration(format!("auto_polls out of range: {polls}"))
                })?,
            }
        };

        Ok(Self::build(config, remote, num_qpus, mode, seed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bell_request() -> JobRequest {
        JobRequest::new("h q[0]; cx q[0], q[1];", 2)
    }

    #[tokio::test]
    async fn test_local_job_resolves_on_first_poll() {
        let platform = MockPlatform::local().with_seed(3);
        let job_id = platform.submit(&bell_request(), 1000, 0).await.unwrap();

        let Resolution::Ready(result) = platform.resolve(&job_id).await.unwrap() else {
            panic!("expected a ready resolution");
        };
        assert_eq!(result.shots, 1000);
        assert_eq!(result.counts.get("00") + result.counts.get("11"), 1000);
        assert!(!platform.is_remote());
    }

    #[tokio::test]
    async fn test_auto_mode_waits_for_polls() {
        let platform = MockPlatform::local().with_mode(ResolveMode::Auto { polls: 2 });
        let job_id = platform.submit(&bell_request(), 10, 0).await.unwrap();

        assert!(platform.resolve(&job_id).await.unwrap().is_pending());
        assert!(platform.resolve(&job_id).await.unwrap().is_pending());
        assert!(matches!(
            platform.resolve(&job_id).await.unwrap(),
            Resolution::Ready(_)
        ));
        assert_eq!(platform.resolve_calls(), 3);
    }

    #[tokio::test]
    async fn test_manual_completion() {
        let platform = MockPlatform::remote();
        let job_id = platform.submit(&bell_request(), 4, 0).await.unwrap();
        platform.start(&job_id).unwrap();

        assert_eq!(
            platform.resolve(&job_id).await.unwrap(),
            Resolution::Pending(JobStatus::Running)
        );

        let counts: Counts = [("00", 2), ("11", 2)].into_iter().collect();
        platform.complete(&job_id, counts.clone()).unwrap();

        let Resolution::Ready(result) = platform.resolve(&job_id).await.unwrap() else {
            panic!("expected a ready resolution");
        };
        assert_eq!(result.counts, counts);
        assert!(platform.fail(&job_id, "late").is_err());
    }

    #[tokio::test]
    async fn test_manual_failure() {
        let platform = MockPlatform::remote();
        let job_id = platform.submit(&bell_request(), 4, 0).await.unwrap();
        platform.fail(&job_id, "resource exhausted").unwrap();

        assert_eq!(
            platform.resolve(&job_id).await.unwrap(),
            Resolution::Failed("resource exhausted".into())
        );
    }

    #[tokio::test]
    async fn test_submit_rejections() {
        let platform = MockPlatform::local().with_qpus(2);

        assert!(matches!(
            platform.submit(&JobRequest::new("", 2), 10, 0).await,
            Err(HalError::InvalidJob(_))
        ));
        assert!(matches!(
            platform.submit(&bell_request(), 0, 0).await,
            Err(HalError::InvalidShots(_))
        ));
        assert!(matches!(
            platform.submit(&bell_request(), 10, 2).await,
            Err(HalError::UnknownQpu {
                qpu_id: 2,
                available: 2
            })
        ));
    }

    #[tokio::test]
    async fn test_unreachable_platform() {
        let platform = MockPlatform::remote();
        let job_id = platform.submit(&bell_request(), 4, 0).await.unwrap();

        platform.set_reachable(false);
        assert!(matches!(
            platform.submit(&bell_request(), 4, 0).await,
            Err(HalError::PlatformUnavailable(_))
        ));
        assert!(matches!(
            platform.resolve(&job_id).await,
            Err(HalError::PlatformUnavailable(_))
        ));

        platform.set_reachable(true);
        assert!(platform.resolve(&job_id).await.unwrap().is_pending());
    }

    #[tokio::test]
    async fn test_clones_share_jobs() {
        let platform = MockPlatform::remote();
        let other = platform.clone();
        let job_id = platform.submit(&bell_request(), 4, 0).await.unwrap();

        assert!(other.job(&job_id).is_some());
        assert_eq!(other.job_ids(), vec![job_id.clone()]);
        assert!(matches!(
            other.resolve(&JobId::new("missing")).await,
            Err(HalError::JobNotFound(_))
        ));
    }

    #[test]
    fn test_from_config() {
        let config = PlatformConfig::new("mqpu")
            .with_extra("remote", serde_json::json!(true))
            .with_extra("num_qpus", serde_json::json!(4))
            .with_extra("manual", serde_json::json!(true));
        let platform = MockPlatform::from_config(config).unwrap();

        assert_eq!(platform.name(), "mqpu");
        assert!(platform.is_remote());
        assert_eq!(platform.num_qpus(), 4);
        assert_eq!(platform.mode, ResolveMode::Manual);
    }
}
