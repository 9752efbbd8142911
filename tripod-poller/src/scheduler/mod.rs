//! Scheduler layer
//!
//! Drives the long-poll loop for each job, from the first status request
//! until the results are displayed, the job fails or the caller cancels.

pub mod poller;

pub use poller::{PollHandle, ResultPoller};
