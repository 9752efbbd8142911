//! Result poller
//!
//! Long-polls the status of a job and, once the job is ready, loads its
//! result fragment into the results panel. Each job gets its own task;
//! within a task a status request is only issued after the previous one
//! completed, failed or timed out.

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tripod_core::domain::job::{JobId, JobStatus, PollState};

use crate::config::{PollerConfig, STATUS_TIMEOUT};
use crate::panel::ResultsPanel;
use crate::source::{JobSource, ResultsLocation};

/// Polls jobs until their results are displayed
#[derive(Clone)]
pub struct ResultPoller {
    config: PollerConfig,
    source: Arc<dyn JobSource>,
    panel: Arc<dyn ResultsPanel>,
}

/// Handle to a running poll loop
///
/// Dropping the handle leaves the loop running; call [`PollHandle::cancel`]
/// to stop it.
pub struct PollHandle {
    job_id: JobId,
    cancel: CancellationToken,
    state: watch::Receiver<PollState>,
    task: JoinHandle<PollState>,
}

impl ResultPoller {
    /// Creates a new result poller
    pub fn new(
        config: PollerConfig,
        source: Arc<dyn JobSource>,
        panel: Arc<dyn ResultsPanel>,
    ) -> Self {
        Self {
            config,
            source,
            panel,
        }
    }

    pub fn config(&self) -> &PollerConfig {
        &self.config
    }

    /// Starts polling a job in a background task
    ///
    /// Calling this again for a job whose loop ended is an explicit retry.
    pub fn start_polling(&self, job_id: JobId) -> PollHandle {
        let cancel = CancellationToken::new();
        let (state_tx, state_rx) = watch::channel(PollState::Pending);

        let poller = self.clone();
        let task = tokio::spawn(poller.poll_loop(job_id.clone(), cancel.clone(), state_tx));

        PollHandle {
            job_id,
            cancel,
            state: state_rx,
            task,
        }
    }

    /// Fetches the job's result fragment and replaces the panel content
    ///
    /// # Arguments
    /// * `job_id` - The job whose results to show
    /// * `results_path` - Location named by the status response, if any
    pub async fn load_results(&self, job_id: &JobId, results_path: Option<&str>) -> Result<()> {
        let location = ResultsLocation::resolve(results_path, self.config.results_route);
        debug!("Loading results of job {} from {:?}", job_id, location);

        let fragment = self.source.results(job_id, &location).await?;

        self.panel
            .replace(job_id, fragment)
            .with_context(|| format!("Failed to display results of job {}", job_id))?;

        info!("Displayed results of job {}", job_id);
        Ok(())
    }

    async fn poll_loop(
        self,
        job_id: JobId,
        cancel: CancellationToken,
        state: watch::Sender<PollState>,
    ) -> PollState {
        info!(
            "Polling job {} (status timeout: {:?}, retry delay: {:?})",
            job_id, STATUS_TIMEOUT, self.config.retry_delay
        );

        let mut attempts: u32 = 0;
        let mut loaded = false;

        let final_state = loop {
            if let Some(max) = self.config.max_attempts {
                if attempts >= max {
                    if loaded {
                        break PollState::Ready;
                    }
                    warn!("Giving up on job {} after {} status requests", job_id, attempts);
                    break PollState::Failed {
                        reason: format!("job not ready after {} status requests", attempts),
                    };
                }
            }

            attempts += 1;
            debug!("Status request {} for job {}", attempts, job_id);

            let answer = tokio::select! {
                _ = cancel.cancelled() => break PollState::Stopped,
                answer = time::timeout(STATUS_TIMEOUT, self.source.status(&job_id)) => answer,
            };

            match answer {
                Err(_) => {
                    debug!(
                        "Status request for job {} unanswered after {:?}, asking again",
                        job_id, STATUS_TIMEOUT
                    );
                    continue;
                }
                Ok(Err(e)) => {
                    warn!("Status request for job {} failed: {:#}", job_id, e);
                }
                Ok(Ok(JobStatus::Pending)) => {
                    debug!("Job {} not ready yet", job_id);
                }
                Ok(Ok(JobStatus::Failed { reason })) => {
                    warn!("Job {} failed: {}", job_id, reason);
                    break PollState::Failed { reason };
                }
                Ok(Ok(JobStatus::Ready { results_path })) => {
                    let load = tokio::select! {
                        _ = cancel.cancelled() => break PollState::Stopped,
                        load = self.load_results(&job_id, results_path.as_deref()) => load,
                    };

                    match load {
                        Ok(()) => {
                            loaded = true;
                            state.send_replace(PollState::Ready);

                            if !self.config.follow {
                                break PollState::Ready;
                            }
                        }
                        Err(e) => {
                            error!(
                                "Job {} is ready but its results could not be loaded: {:#}",
                                job_id, e
                            );
                        }
                    }
                }
            }

            if !self.config.retry_delay.is_zero() {
                tokio::select! {
                    _ = cancel.cancelled() => break PollState::Stopped,
                    _ = time::sleep(self.config.retry_delay) => {}
                }
            }
        };

        info!("Stopped polling job {}: {}", job_id, final_state);
        state.send_replace(final_state.clone());
        final_state
    }
}

impl PollHandle {
    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    /// Stops the poll loop at its next suspend point
    ///
    /// An in-flight status request or result fetch is abandoned.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token that cancels this poll loop, for handing to teardown code
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Current state of the poll loop
    pub fn state(&self) -> PollState {
        self.state.borrow().clone()
    }

    /// Whether the poll loop has ended
    ///
    /// In follow mode the state reads `Ready` while the loop keeps polling,
    /// so this is the check for "no further requests".
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<PollState> {
        self.state.clone()
    }

    /// Waits for the poll loop to end and returns its terminal state
    pub async fn wait(self) -> PollState {
        match self.task.await {
            Ok(state) => state,
            Err(e) => {
                error!("Poll task for job {} panicked: {}", self.job_id, e);
                PollState::Failed {
                    reason: format!("poll task aborted: {}", e),
                }
            }
        }
    }
}
