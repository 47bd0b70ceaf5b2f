//! Summarization job orchestrator.
//!
//! State machine for one `run_summarization` call:
//!
//! ```text
//! Submitting ──cache hit──────────────────────────▶ Completed
//!     │
//!     └──job id──▶ Polling ──completed──▶ Completed
//!                     │  ──failed─────▶ Failed
//!                     └──bound hit────▶ TimedOut
//! ```
//!
//! The orchestrator owns no persistent state. Each call is independent, and
//! communicates only through its return value and the progress observer.
//! Dropping the returned future stops the call at its next suspension
//! point; no progress event is delivered after that.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use notesum_core::{
    defaults, logging, AsyncJobStatus, Clock, Error, JobProgress, JobStage, JobStatus, Result,
    SummarizationRequest, SummaryJobApi, SummaryResult,
};

use crate::config::ClientConfig;

/// Polling cadence and bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(defaults::JOB_POLL_INTERVAL_MS),
            max_attempts: defaults::JOB_POLL_MAX_ATTEMPTS,
        }
    }
}

impl From<&ClientConfig> for PollConfig {
    fn from(config: &ClientConfig) -> Self {
        Self {
            interval: config.poll_interval(),
            max_attempts: config.poll_max_attempts,
        }
    }
}

/// Receives progress events. May be called zero or more times per run.
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, progress: &JobProgress);
}

impl<F> ProgressObserver for F
where
    F: Fn(&JobProgress) + Send + Sync,
{
    fn on_progress(&self, progress: &JobProgress) {
        self(progress)
    }
}

impl ProgressObserver for mpsc::UnboundedSender<JobProgress> {
    fn on_progress(&self, progress: &JobProgress) {
        // A closed receiver means nobody is listening any more
        let _ = self.send(progress.clone());
    }
}

/// Observer that ignores every event.
pub fn no_progress(_: &JobProgress) {}

/// Delivers events in order, dropping repeats of the last transition.
struct ProgressEmitter<'a> {
    observer: &'a dyn ProgressObserver,
    last: Option<JobProgress>,
}

impl<'a> ProgressEmitter<'a> {
    fn new(observer: &'a dyn ProgressObserver) -> Self {
        Self {
            observer,
            last: None,
        }
    }

    fn emit(&mut self, progress: JobProgress) {
        if let Some(ref last) = self.last {
            if last.same_transition(&progress) {
                return;
            }
        }

        let observer = self.observer;
        if catch_unwind(AssertUnwindSafe(|| observer.on_progress(&progress))).is_err() {
            warn!(
                component = logging::ORCHESTRATOR,
                "Progress observer panicked; continuing"
            );
        }
        self.last = Some(progress);
    }
}

fn poll_progress(status: &AsyncJobStatus) -> Option<JobProgress> {
    let percent = status.progress_percent;
    match status.status {
        JobStatus::Pending => Some(JobProgress::new(
            JobStage::Pending,
            percent,
            "Waiting in queue...",
        )),
        JobStatus::Processing => Some(JobProgress::new(
            JobStage::Processing,
            percent,
            format!("Generating summary... {}%", percent.round() as i64),
        )),
        JobStatus::Completed | JobStatus::Failed => None,
    }
}

/// Drives one summarization request to a terminal state.
pub struct JobOrchestrator {
    api: Arc<dyn SummaryJobApi>,
    clock: Arc<dyn Clock>,
    poll: PollConfig,
}

impl JobOrchestrator {
    pub fn new(api: Arc<dyn SummaryJobApi>, clock: Arc<dyn Clock>, poll: PollConfig) -> Self {
        Self { api, clock, poll }
    }

    pub fn poll_config(&self) -> &PollConfig {
        &self.poll
    }

    /// Submit `request` and wait for its summary.
    ///
    /// Fails with `Error::JobFailed` when the service reports failure,
    /// `Error::TimedOut` after `max_attempts` non-terminal polls, and
    /// `Error::Protocol` when the submission carries neither a cached
    /// result nor a job id. A transport or service error on any call ends
    /// the run immediately.
    #[instrument(skip(self, request, observer), fields(note_id = request.note_id))]
    pub async fn run_summarization(
        &self,
        request: &SummarizationRequest,
        observer: &dyn ProgressObserver,
    ) -> Result<SummaryResult> {
        request.validate()?;
        let mut progress = ProgressEmitter::new(observer);

        progress.emit(JobProgress::new(
            JobStage::Pending,
            0.0,
            "Starting summary job...",
        ));
        let submitted = self.api.submit_summary_job(request).await?;

        if submitted.cached {
            if let Some(payload) = submitted.result {
                let result = payload.with_request_defaults(request).normalize(
                    request.note_id,
                    defaults::CACHED_MODEL,
                    self.clock.now(),
                )?;
                progress.emit(JobProgress::new(
                    JobStage::Completed,
                    100.0,
                    "Using cached summary",
                ));
                info!(
                    component = logging::ORCHESTRATOR,
                    note_id = request.note_id,
                    "Served cached summary"
                );
                return Ok(result);
            }
        }

        let job_id = submitted
            .job_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::Protocol("No job ID returned".to_string()))?;

        debug!(
            component = logging::ORCHESTRATOR,
            job_id = %job_id,
            "Summary job submitted"
        );

        for attempt in 1..=self.poll.max_attempts {
            tokio::time::sleep(self.poll.interval).await;

            let status = self.api.job_status(&job_id).await?;
            debug!(
                component = logging::ORCHESTRATOR,
                job_id = %job_id,
                attempt,
                status = ?status.status,
                progress = status.progress_percent,
                "Polled summary job"
            );

            match status.status {
                JobStatus::Pending | JobStatus::Processing => {
                    if let Some(event) = poll_progress(&status) {
                        progress.emit(event);
                    }
                }
                JobStatus::Completed => {
                    let payload = status.result.ok_or_else(|| {
                        Error::Protocol("Job completed without a summary".to_string())
                    })?;
                    let result = payload.with_request_defaults(request).normalize(
                        request.note_id,
                        defaults::UNKNOWN_MODEL,
                        self.clock.now(),
                    )?;
                    progress.emit(JobProgress::new(
                        JobStage::Completed,
                        100.0,
                        "Summary complete",
                    ));
                    info!(
                        component = logging::ORCHESTRATOR,
                        job_id = %job_id,
                        attempt,
                        "Summary job completed"
                    );
                    return Ok(result);
                }
                JobStatus::Failed => {
                    let message = status
                        .error_message
                        .filter(|m| !m.is_empty())
                        .unwrap_or_else(|| "Summary generation failed".to_string());
                    warn!(
                        component = logging::ORCHESTRATOR,
                        job_id = %job_id,
                        error = %message,
                        "Summary job failed"
                    );
                    return Err(Error::JobFailed(message));
                }
            }
        }

        warn!(
            component = logging::ORCHESTRATOR,
            job_id = %job_id,
            attempts = self.poll.max_attempts,
            "Summary job timed out"
        );
        Err(Error::TimedOut)
    }
}
