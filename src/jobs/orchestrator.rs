// src/jobs/orchestrator.rs
//
// Job orchestrator: admits analysis jobs, runs them on the blocking pool and
// publishes their state machine through the job store.

use std::collections::HashSet;
use std::error::Error as StdError;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use futures::stream::{self, Stream};
use log::{debug, error, info, warn};
use tokio::sync::{mpsc, OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use uuid::Uuid;

use super::job::{AnalysisResult, JobRecord, JobState, JobStatus};
use super::store::{result_key, status_key, JobStore};
use crate::config::{AnalysisConfig, ServiceConfig};
use crate::core::media::MediaOpener;
use crate::core::{AnalysisReport, AnalysisStage, MediaAnalyzer};
use crate::error::{AnalysisError, JobError};

type AnalysisTask = JoinHandle<Result<AnalysisReport, AnalysisError>>;

struct Inner<S, O> {
    store: S,
    opener: O,
    analysis: AnalysisConfig,
    service: ServiceConfig,
    /// Job ids with an execution in progress
    claimed: Mutex<HashSet<String>>,
    permits: Arc<Semaphore>,
}

pub struct Orchestrator<S, O> {
    inner: Arc<Inner<S, O>>,
}

impl<S, O> Clone for Orchestrator<S, O> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, O> Orchestrator<S, O>
where
    S: JobStore + 'static,
    O: MediaOpener + 'static,
{
    pub fn new(store: S, opener: O, analysis: AnalysisConfig, service: ServiceConfig) -> Self {
        let permits = Arc::new(Semaphore::new(service.max_concurrent_jobs.max(1)));
        Self {
            inner: Arc::new(Inner {
                store,
                opener,
                analysis,
                service,
                claimed: Mutex::new(HashSet::new()),
                permits,
            }),
        }
    }

    pub fn store(&self) -> &S {
        &self.inner.store
    }

    pub fn service_config(&self) -> &ServiceConfig {
        &self.inner.service
    }

    /// Register a new QUEUED job without starting it
    pub async fn enqueue(&self, path: &Path) -> Result<String, JobError> {
        let job_id = Uuid::new_v4().to_string();
        self.save_record(&JobRecord::queued(&job_id)).await?;
        info!("Queued job {} for {}", job_id, path.display());
        Ok(job_id)
    }

    /// Queue a job and run it in the background
    pub async fn submit(&self, path: impl Into<PathBuf>) -> Result<String, JobError> {
        let path = path.into();
        let job_id = self.enqueue(&path).await?;

        let this = self.clone();
        let id = job_id.clone();
        tokio::spawn(async move {
            if let Err(e) = this.execute(&id, &path).await {
                error!("Job {} could not be executed: {}", id, e);
            }
        });

        Ok(job_id)
    }

    /// Run a job to a terminal state.
    ///
    /// Returns the terminal state reached. A second execution of the same id
    /// is rejected with [`JobError::AlreadyExecuted`]. The source is removed
    /// on every terminal outcome when deletion is enabled, even if the final
    /// record could not be written; that write failure is then returned.
    pub async fn execute(&self, job_id: &str, path: &Path) -> Result<JobState, JobError> {
        let _claim = self.claim(job_id)?;

        let mut record = match self.load_record(job_id).await {
            Ok(Some(record)) if record.state != JobState::Queued => {
                return Err(JobError::AlreadyExecuted(job_id.to_string()));
            }
            Ok(Some(record)) => record,
            Ok(None) => JobRecord::queued(job_id),
            Err(e) => {
                let record = JobRecord::queued(job_id);
                return self.finish(record, Err(e), path, None).await;
            }
        };

        let mut task = None;
        let outcome = self.run(&mut record, path, &mut task).await;
        self.finish(record, outcome, path, task).await
    }

    async fn run(
        &self,
        record: &mut JobRecord,
        path: &Path,
        task: &mut Option<AnalysisTask>,
    ) -> Result<(), JobError> {
        let permit = Arc::clone(&self.inner.permits)
            .acquire_owned()
            .await
            .map_err(|e| JobError::TaskAborted(e.to_string()))?;

        record.start()?;
        self.save_record(record).await?;
        info!("Job {} started on {}", record.job_id, path.display());

        let (tx, rx) = mpsc::unbounded_channel();
        let handle = task.insert(self.spawn_analysis(path, permit, tx));

        let report = match self.inner.service.job_time_limit() {
            Some(limit) => tokio::time::timeout(limit, self.follow(record, rx, handle))
                .await
                .map_err(|_| JobError::TimeLimit(limit.as_secs()))??,
            None => self.follow(record, rx, handle).await?,
        };

        let result = AnalysisResult::from_report(&record.job_id, path, report);
        let payload = serde_json::to_string(&result)?;
        self.inner
            .store
            .put(&result_key(&record.job_id), payload, self.inner.service.retention())
            .await?;

        record.complete()?;
        self.save_record(record).await?;
        Ok(())
    }

    /// Start the analysis on the blocking pool. The permit travels with the
    /// task so an abandoned analysis still occupies its slot.
    fn spawn_analysis(
        &self,
        path: &Path,
        permit: OwnedSemaphorePermit,
        stages: mpsc::UnboundedSender<AnalysisStage>,
    ) -> AnalysisTask {
        let inner = Arc::clone(&self.inner);
        let path = path.to_path_buf();

        tokio::task::spawn_blocking(move || -> Result<AnalysisReport, AnalysisError> {
            let _permit = permit;
            let mut source = inner.opener.open(&path)?;
            MediaAnalyzer::new(inner.analysis.clone())
                .analyze_with_progress(source.as_mut(), &mut |stage| {
                    let _ = stages.send(stage);
                })
        })
    }

    /// Persist checkpoints as they arrive, then collect the report
    async fn follow(
        &self,
        record: &mut JobRecord,
        mut stages: mpsc::UnboundedReceiver<AnalysisStage>,
        task: &mut AnalysisTask,
    ) -> Result<AnalysisReport, JobError> {
        while let Some(stage) = stages.recv().await {
            // DONE carries the final checkpoint
            if stage == AnalysisStage::Complete {
                continue;
            }
            record.advance(stage)?;
            self.save_record(record).await?;
            debug!("Job {}: {}% {}", record.job_id, record.progress, record.stage);
        }

        let report = task
            .await
            .map_err(|e| JobError::TaskAborted(e.to_string()))??;
        Ok(report)
    }

    /// Record the outcome and clean up the source
    async fn finish(
        &self,
        mut record: JobRecord,
        outcome: Result<(), JobError>,
        path: &Path,
        task: Option<AnalysisTask>,
    ) -> Result<JobState, JobError> {
        let state = match outcome {
            Ok(()) => {
                info!("Job {} finished", record.job_id);
                Ok(JobState::Done)
            }
            Err(e) => {
                warn!("Job {} failed: {}", record.job_id, e);
                self.record_failure(&mut record, &e)
                    .await
                    .map(|()| JobState::Error)
            }
        };

        if self.inner.service.delete_source {
            // An analysis cut off by the time limit may still be reading
            if let Some(task) = task.filter(|t| !t.is_finished()) {
                debug!("Job {}: waiting for abandoned analysis", record.job_id);
                if let Err(e) = task.await {
                    warn!("Abandoned analysis of job {} aborted: {}", record.job_id, e);
                }
            }
            remove_source(path).await;
        }

        state
    }

    async fn record_failure(&self, record: &mut JobRecord, e: &JobError) -> Result<(), JobError> {
        let saved = match record.fail(e.to_string(), Some(error_chain(e))) {
            Ok(()) => self.save_record(record).await,
            Err(transition) => Err(transition),
        };
        if let Err(ref persist) = saved {
            error!("Job {}: failure could not be recorded: {}", record.job_id, persist);
        }
        saved
    }

    pub async fn get_status(&self, job_id: &str) -> Result<JobStatus, JobError> {
        Ok(self
            .load_record(job_id)
            .await?
            .map(|r| r.status())
            .unwrap_or_else(|| JobStatus::not_found(job_id)))
    }

    /// Stored result; `None` for unknown, unfinished, failed or expired jobs
    pub async fn get_result(&self, job_id: &str) -> Result<Option<AnalysisResult>, JobError> {
        match self.inner.store.get(&result_key(job_id)).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Full error chain of a failed job
    pub async fn diagnostics(&self, job_id: &str) -> Result<Option<String>, JobError> {
        Ok(self
            .load_record(job_id)
            .await?
            .and_then(|r| r.error_detail))
    }

    /// Poll the job status until it is terminal, unknown, or the stream bound
    /// elapses; in the last case a synthesized "Timeout" ERROR is yielded.
    pub fn stream_status(&self, job_id: &str) -> impl Stream<Item = JobStatus> + Send + 'static {
        let cursor = StreamCursor {
            orchestrator: self.clone(),
            job_id: job_id.to_string(),
            deadline: Instant::now() + self.inner.service.stream_timeout(),
            last_progress: 0,
            first: true,
            finished: false,
        };

        stream::unfold(cursor, |mut cursor| async move {
            if cursor.finished {
                return None;
            }

            if !cursor.first {
                let wake = Instant::now() + cursor.orchestrator.inner.service.poll_interval();
                tokio::time::sleep_until(wake.min(cursor.deadline)).await;
            }
            cursor.first = false;

            if Instant::now() >= cursor.deadline {
                cursor.finished = true;
                let status = JobStatus::timed_out(&cursor.job_id, cursor.last_progress);
                return Some((status, cursor));
            }

            let status = match cursor.orchestrator.get_status(&cursor.job_id).await {
                Ok(status) => status,
                Err(e) => {
                    warn!("Status of job {} unavailable: {}", cursor.job_id, e);
                    let mut status = JobStatus::timed_out(&cursor.job_id, cursor.last_progress);
                    status.error = Some(e.to_string());
                    status
                }
            };

            cursor.last_progress = cursor.last_progress.max(status.progress);
            cursor.finished = status.state.is_terminal() || status.state == JobState::NotFound;
            Some((status, cursor))
        })
    }

    fn claim(&self, job_id: &str) -> Result<Claim<'_>, JobError> {
        let mut claimed = self
            .inner
            .claimed
            .lock()
            .map_err(|e| JobError::TaskAborted(e.to_string()))?;

        if !claimed.insert(job_id.to_string()) {
            return Err(JobError::AlreadyExecuted(job_id.to_string()));
        }
        Ok(Claim {
            claimed: &self.inner.claimed,
            job_id: job_id.to_string(),
        })
    }

    async fn load_record(&self, job_id: &str) -> Result<Option<JobRecord>, JobError> {
        match self.inner.store.get(&status_key(job_id)).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn save_record(&self, record: &JobRecord) -> Result<(), JobError> {
        let payload = serde_json::to_string(record)?;
        self.inner
            .store
            .put(&status_key(&record.job_id), payload, self.inner.service.retention())
            .await?;
        Ok(())
    }
}

/// Marks a job id as executing until dropped
struct Claim<'a> {
    claimed: &'a Mutex<HashSet<String>>,
    job_id: String,
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        if let Ok(mut claimed) = self.claimed.lock() {
            claimed.remove(&self.job_id);
        }
    }
}

struct StreamCursor<S, O> {
    orchestrator: Orchestrator<S, O>,
    job_id: String,
    deadline: Instant,
    last_progress: u8,
    first: bool,
    finished: bool,
}

/// Error message followed by every `source()` in the chain
fn error_chain(error: &dyn StdError) -> String {
    let mut chain = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        chain.push_str(": ");
        chain.push_str(&cause.to_string());
        source = cause.source();
    }
    chain
}

/// Best-effort removal of a processed source file or frame directory
async fn remove_source(path: &Path) {
    let removal = match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_dir() => tokio::fs::remove_dir_all(path).await,
        Ok(_) => tokio::fs::remove_file(path).await,
        Err(e) => Err(e),
    };

    match removal {
        Ok(()) => debug!("Removed source {}", path.display()),
        Err(e) => warn!("Could not remove source {}: {}", path.display(), e),
    }
}
