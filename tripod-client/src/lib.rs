//! triPOD HTTP Client
//!
//! A small, type-safe HTTP client for the triPOD web server: submitting the
//! upload form, probing job status and fetching result fragments.
//!
//! # Example
//!
//! ```no_run
//! use tripod_client::TripodClient;
//! use tripod_core::domain::submission::Submission;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), tripod_client::ClientError> {
//!     let client = TripodClient::new("http://localhost:5000")?;
//!
//!     let ticket = client.submit(&Submission::sample_data()).await?;
//!     let status = client.job_status(&ticket.id).await?;
//!
//!     println!("Job {} is {:?}", ticket.id, status);
//!     Ok(())
//! }
//! ```

pub mod error;
mod jobs;
mod upload;

pub use error::{ClientError, Result};
pub use jobs::classify_status;

use reqwest::Client;
use reqwest::redirect::Policy;

/// HTTP client for the triPOD web server
///
/// Redirects are never followed: the server answers a submission with a
/// redirect to the job's progress page, and bounces failed jobs back to the
/// upload form, so the redirect itself is the answer.
#[derive(Debug, Clone)]
pub struct TripodClient {
    /// Base URL of the server (e.g., "http://localhost:5000")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl TripodClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the triPOD server (e.g., "http://localhost:5000")
    ///
    /// # Errors
    /// Fails when the HTTP client cannot be built (e.g., no TLS backend)
    ///
    /// # Example
    /// ```
    /// use tripod_client::TripodClient;
    ///
    /// let client = TripodClient::new("http://localhost:5000").unwrap();
    /// ```
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder().redirect(Policy::none()).build()?;

        Ok(Self::with_client(base_url, client))
    }

    /// Create a new client with a custom HTTP client
    ///
    /// The client should be built with `redirect(Policy::none())`, otherwise
    /// submissions and failed status probes cannot be recognised.
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the triPOD server
    /// * `client` - A configured reqwest Client
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve a server-provided path against the base URL
    ///
    /// Always stays on the configured server; absolute URLs are treated as
    /// paths below it.
    fn resolve(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle a response whose body is text or markup
    ///
    /// Checks the status code and returns an error if the request failed,
    /// otherwise returns the body.
    async fn handle_text_response(&self, response: reqwest::Response) -> Result<String> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(
                status.as_u16(),
                error_message(&error_text),
            ));
        }

        Ok(response.text().await?)
    }
}

/// Pull a human-readable message out of an error body
///
/// Servers either answer with plain text or with `{"error": "..."}`.
pub(crate) fn error_message(body: &str) -> String {
    let body = body.trim();

    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(serde_json::Value::String(message)) = map.get("error") {
            return message.clone();
        }
    }

    if body.is_empty() {
        "no details".to_string()
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = TripodClient::new("http://localhost:5000").unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000");
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = TripodClient::new("http://localhost:5000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000");
    }

    #[test]
    fn test_resolve_paths() {
        let client = TripodClient::new("http://localhost:5000").unwrap();
        assert_eq!(
            client.resolve("/results/42"),
            "http://localhost:5000/results/42"
        );
        assert_eq!(client.resolve("results"), "http://localhost:5000/results");
        assert!(
            client
                .resolve("https://elsewhere.example.org/results/42")
                .starts_with("http://localhost:5000/")
        );
    }

    #[tokio::test]
    async fn test_new_client_does_not_follow_redirects() {
        let app = axum::Router::new().route(
            "/hop",
            axum::routing::get(|| async { axum::response::Redirect::to("/landing") }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = TripodClient::new(format!("http://{}", addr)).unwrap();
        let response = client
            .client
            .get(format!("{}/hop", client.base_url()))
            .send()
            .await
            .unwrap();

        assert!(response.status().is_redirection());
    }

    #[test]
    fn test_error_message_prefers_json_error_field() {
        assert_eq!(error_message(r#"{"error":"Job 7 not found"}"#), "Job 7 not found");
        assert_eq!(error_message("  plain text \n"), "plain text");
        assert_eq!(error_message(""), "no details");
    }
}
