//! Configuration module
//!
//! Handles CLI configuration such as the triPOD server URL.

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the triPOD web server
    pub server_url: String,
}
