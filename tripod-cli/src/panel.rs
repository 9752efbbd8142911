//! Terminal results panel

use anyhow::{Context, Result};
use std::io::Write;
use tripod_core::domain::job::JobId;
use tripod_poller::ResultsPanel;

/// Panel that prints each loaded fragment to stdout
///
/// A terminal cannot take back what it printed, so every load is printed in
/// full; the latest block is the current content.
pub struct StdoutPanel;

impl ResultsPanel for StdoutPanel {
    fn replace(&self, job_id: &JobId, fragment: String) -> Result<()> {
        let mut stdout = std::io::stdout().lock();

        writeln!(stdout, "{}", fragment.trim_end())
            .and_then(|_| stdout.flush())
            .with_context(|| format!("Failed to print results of job {}", job_id))
    }
}
