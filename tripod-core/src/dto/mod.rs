//! Data Transfer Objects
//!
//! Lightweight representations of what the triPOD web server hands back to
//! the client.

pub mod job;
