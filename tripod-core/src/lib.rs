//! triPOD Core
//!
//! Core types shared by the triPOD client components.
//!
//! This crate contains:
//! - Domain types: job identifiers, server-reported job status, poll states
//!   and the upload form contract
//! - DTOs: data exchanged with the triPOD web server

pub mod domain;
pub mod dto;
