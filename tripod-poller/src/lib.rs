//! triPOD Result Poller
//!
//! Waits for a submitted triPOD job to finish and shows its results.
//!
//! Architecture:
//! - Configuration: retry pacing, attempt limits and follow mode
//! - Sources: where job status and result fragments come from (HTTP in production)
//! - Panels: where result fragments are displayed, keyed by job id
//! - Scheduler: the per-job long-poll loop and its cancellation handle
//!
//! Each job is polled by its own task with at most one status request in
//! flight. A status request that gets no answer within [`STATUS_TIMEOUT`] is
//! abandoned and issued again.

pub mod config;
pub mod panel;
pub mod scheduler;
pub mod source;

pub use config::{PollerConfig, ResultsRoute, STATUS_TIMEOUT};
pub use panel::{FilePanel, InMemoryPanel, ResultsPanel};
pub use scheduler::{PollHandle, ResultPoller};
pub use source::{HttpJobSource, JobSource, ResultsLocation};
