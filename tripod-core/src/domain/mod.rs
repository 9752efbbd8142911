//! Core domain types
//!
//! These types are shared between the HTTP client (which talks to the triPOD
//! web server), the result poller and the command-line interface.

pub mod job;
pub mod submission;
