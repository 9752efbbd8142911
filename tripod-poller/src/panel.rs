//! Results panels
//!
//! A results panel is the container a job's result fragment is shown in.
//! Panels are keyed by job id so several jobs can be displayed side by side.
//! Every load replaces the previous content; nothing is ever appended.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tripod_core::domain::job::JobId;

/// Container for displayed result fragments
pub trait ResultsPanel: Send + Sync {
    /// Replaces the content shown for `job_id` with `fragment`
    fn replace(&self, job_id: &JobId, fragment: String) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
struct PanelEntry {
    content: String,
    loads: usize,
}

/// In-memory implementation of ResultsPanel
#[derive(Debug, Clone, Default)]
pub struct InMemoryPanel {
    entries: Arc<Mutex<HashMap<JobId, PanelEntry>>>,
}

impl InMemoryPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Content currently shown for the job
    pub fn get(&self, job_id: &JobId) -> Option<String> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(job_id).map(|entry| entry.content.clone())
    }

    /// How many times the job's content was replaced
    pub fn loads(&self, job_id: &JobId) -> usize {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(job_id).map_or(0, |entry| entry.loads)
    }
}

impl ResultsPanel for InMemoryPanel {
    fn replace(&self, job_id: &JobId, fragment: String) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.entry(job_id.clone()).or_default();
        entry.content = fragment;
        entry.loads += 1;
        Ok(())
    }
}

/// Panel that keeps each job's fragment in `<dir>/<job id>.html`
#[derive(Debug, Clone)]
pub struct FilePanel {
    dir: PathBuf,
}

impl FilePanel {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding the job's fragment
    pub fn path_for(&self, job_id: &JobId) -> PathBuf {
        self.dir.join(format!("{}.html", job_id))
    }
}

impl ResultsPanel for FilePanel {
    fn replace(&self, job_id: &JobId, fragment: String) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;

        let path = self.path_for(job_id);
        let staging = self.dir.join(format!(".{}.html.partial", job_id));

        std::fs::write(&staging, fragment)
            .with_context(|| format!("Failed to write {}", staging.display()))?;
        std::fs::rename(&staging, &path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;

        tracing::debug!("Wrote results of job {} to {}", job_id, path.display());
        Ok(())
    }
}
