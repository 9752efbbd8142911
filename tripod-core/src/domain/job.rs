//! Job domain types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Opaque job identifier assigned by the server at submission time
///
/// The client never interprets the id; it only carries it back in
/// `/status/{id}` and `/results/{id}` requests, so it must be non-empty and
/// safe to place in a single URL path segment. `.` and `..` are rejected
/// because URL normalisation would turn them into a different path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JobId(String);

/// Rejected job identifier
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidJobId {
    #[error("job id cannot be empty")]
    Empty,

    #[error("job id {0:?} contains characters that cannot appear in a URL path segment")]
    IllegalCharacter(String),
}

impl JobId {
    /// Creates a job id, trimming surrounding whitespace
    pub fn new(id: impl Into<String>) -> Result<Self, InvalidJobId> {
        let id = id.into();
        let trimmed = id.trim();

        if trimmed.is_empty() {
            return Err(InvalidJobId::Empty);
        }

        if trimmed
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '/' | '?' | '#' | '%'))
        {
            return Err(InvalidJobId::IllegalCharacter(trimmed.to_string()));
        }

        if matches!(trimmed, "." | "..") {
            return Err(InvalidJobId::IllegalCharacter(trimmed.to_string()));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for JobId {
    type Err = InvalidJobId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for JobId {
    type Error = InvalidJobId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<JobId> for String {
    fn from(id: JobId) -> Self {
        id.0
    }
}

/// Job status as reported by `GET /status/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatus {
    /// Still running, or the server could not say yet
    Pending,
    /// Finished; results can be fetched
    Ready {
        /// Server-provided location of the result fragment, if any
        results_path: Option<String>,
    },
    /// The server gave up on the job
    Failed { reason: String },
}

impl JobStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }
}

/// State of a client-side poll loop for one job
///
/// Only `Pending` schedules another status request. `Ready`, `Failed` and
/// `Stopped` are terminal unless the caller starts a new poll, with one
/// exception: a loop in follow mode publishes `Ready` after each load and
/// keeps polling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PollState {
    Pending,
    Ready,
    Failed { reason: String },
    Stopped,
}

impl PollState {
    /// Whether this state ends a poll loop
    ///
    /// In follow mode `Ready` is reported while the loop is still running;
    /// use `PollHandle::is_finished` to learn whether the loop has ended.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for PollState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Ready => f.write_str("ready"),
            Self::Failed { reason } => write!(f, "failed: {}", reason),
            Self::Stopped => f.write_str("stopped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_id_trims_whitespace() {
        let id = JobId::new("  42 ").unwrap();
        assert_eq!(id.as_str(), "42");
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn test_job_id_rejects_empty() {
        assert_eq!(JobId::new(""), Err(InvalidJobId::Empty));
        assert_eq!(JobId::new("   "), Err(InvalidJobId::Empty));
    }

    #[test]
    fn test_job_id_rejects_path_characters() {
        assert!(JobId::new("a/b").is_err());
        assert!(JobId::new("a?b").is_err());
        assert!(JobId::new("a b").is_err());
        assert_eq!(
            JobId::new(".."),
            Err(InvalidJobId::IllegalCharacter("..".to_string()))
        );
        assert!(JobId::new(" . ").is_err());
        assert!(JobId::new("...").is_ok());
        assert!(JobId::new("v1.2").is_ok());
        assert!(JobId::new("4f1c9a2e-57b1-4b2e-9d7e-0c3a1b2c3d4e").is_ok());
    }

    #[test]
    fn test_job_id_serde_is_transparent() {
        let id: JobId = serde_json::from_str("\"abc123\"").unwrap();
        assert_eq!(id.as_str(), "abc123");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc123\"");
        assert!(serde_json::from_str::<JobId>("\"\"").is_err());
    }

    #[test]
    fn test_poll_state_terminality() {
        assert!(!PollState::Pending.is_terminal());
        assert!(PollState::Ready.is_terminal());
        assert!(PollState::Stopped.is_terminal());
        assert!(
            PollState::Failed {
                reason: "boom".to_string()
            }
            .is_terminal()
        );
    }

    #[test]
    fn test_job_status_is_ready() {
        assert!(JobStatus::Ready { results_path: None }.is_ready());
        assert!(!JobStatus::Pending.is_ready());
    }
}
