//! Job command handlers
//!
//! Handles probing job status, fetching results and waiting for a job to
//! finish.

use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tripod_client::TripodClient;
use tripod_core::domain::job::{JobId, JobStatus, PollState};
use tripod_poller::{
    FilePanel, HttpJobSource, PollerConfig, ResultPoller, ResultsPanel, ResultsRoute,
    STATUS_TIMEOUT,
};

use crate::panel::StdoutPanel;

/// Flags controlling how `wait` and `run` poll
#[derive(Args, Debug, Clone, Default)]
pub struct WaitOptions {
    /// Write results to <DIR>/<job id>.html instead of printing them
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Keep polling after results are shown and reload them on every ready signal
    #[arg(long)]
    pub follow: bool,

    /// Give up after this many status requests
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Pause between quick "not ready" answers, in milliseconds
    #[arg(long)]
    pub retry_delay_ms: Option<u64>,

    /// Read results from the session-global /results route
    #[arg(long)]
    pub latest: bool,
}

impl WaitOptions {
    /// Environment configuration overridden by command-line flags
    pub fn poller_config(&self) -> Result<PollerConfig> {
        let mut config = PollerConfig::from_env();

        if self.follow {
            config = config.with_follow(true);
        }
        if let Some(max_attempts) = self.max_attempts {
            config = config.with_max_attempts(max_attempts);
        }
        if let Some(delay) = self.retry_delay_ms {
            config = config.with_retry_delay(Duration::from_millis(delay));
        }
        if self.latest {
            config = config.with_results_route(ResultsRoute::Latest);
        }

        config.validate()?;
        Ok(config)
    }
}

/// Probe a job's status once
pub async fn show_status(client: &TripodClient, id: &JobId) -> Result<()> {
    match tokio::time::timeout(STATUS_TIMEOUT, client.job_status(id)).await {
        Ok(status) => {
            let status = status.with_context(|| format!("Failed to query job {}", id))?;
            println!("Job {}: {}", id.to_string().cyan(), describe_status(&status));
        }
        Err(_) => {
            println!(
                "Job {}: {} (no answer within {}s)",
                id.to_string().cyan(),
                "pending".yellow(),
                STATUS_TIMEOUT.as_secs()
            );
        }
    }

    Ok(())
}

/// Fetch a job's results once and print them
pub async fn show_results(client: &TripodClient, id: &JobId, latest: bool) -> Result<()> {
    let fragment = if latest {
        client.latest_results().await
    } else {
        client.job_results(id).await
    };

    match fragment {
        Ok(fragment) => StdoutPanel.replace(id, fragment),
        Err(e) if e.is_not_found() => {
            eprintln!(
                "{}",
                format!("No results for job {} yet; try `tripod wait {}`", id, id).yellow()
            );
            Ok(())
        }
        Err(e) => Err(e).with_context(|| format!("Failed to fetch results of job {}", id)),
    }
}

/// Poll a job until its results are shown, it fails or the user hits Ctrl-C
pub async fn wait_for_job(
    client: Arc<TripodClient>,
    id: JobId,
    options: &WaitOptions,
) -> Result<()> {
    let config = options.poller_config()?;

    let panel: Arc<dyn ResultsPanel> = match &options.out {
        Some(dir) => Arc::new(FilePanel::new(dir)),
        None => Arc::new(StdoutPanel),
    };
    let source = Arc::new(HttpJobSource::new(client));
    let poller = ResultPoller::new(config, source, panel);

    eprintln!("{} {}", "Waiting for job".bold(), id.to_string().cyan());

    let handle = poller.start_polling(id.clone());
    let token = handle.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });

    match handle.wait().await {
        PollState::Ready => {
            if let Some(dir) = &options.out {
                let path = FilePanel::new(dir).path_for(&id);
                eprintln!("{} {}", "✓ Results written to".green(), path.display());
            }
            Ok(())
        }
        PollState::Stopped => {
            eprintln!("{}", format!("Stopped waiting for job {}", id).yellow());
            Ok(())
        }
        PollState::Failed { reason } => {
            anyhow::bail!("Job {} failed: {}", id, reason)
        }
        PollState::Pending => {
            anyhow::bail!("Poll loop for job {} ended without a result", id)
        }
    }
}

/// Colorize job status for display
fn describe_status(status: &JobStatus) -> ColoredString {
    match status {
        JobStatus::Pending => "pending".yellow(),
        JobStatus::Ready {
            results_path: Some(path),
        } => format!("ready ({})", path).green(),
        JobStatus::Ready { results_path: None } => "ready".green(),
        JobStatus::Failed { reason } => format!("failed: {}", reason).red(),
    }
}
