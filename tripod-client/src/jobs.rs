//! Job status and result endpoints

use reqwest::StatusCode;
use reqwest::header::LOCATION;
use tripod_core::domain::job::{JobId, JobStatus};

use crate::TripodClient;
use crate::error::{ClientError, Result};
use crate::error_message;

impl TripodClient {
    // =============================================================================
    // Job Status
    // =============================================================================

    /// Probe the status of a job
    ///
    /// `GET /status/{id}` is a long-poll: the server may hold the request
    /// until the job finishes. Callers bound the wait themselves.
    ///
    /// # Arguments
    /// * `job_id` - The job to probe
    ///
    /// # Returns
    /// The classified status; transport failures, including a body that
    /// could not be read, are returned as errors
    pub async fn job_status(&self, job_id: &JobId) -> Result<JobStatus> {
        let url = format!("{}/status/{}", self.base_url, job_id);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;

        let job_status = classify_status(status, location.as_deref(), &body);
        tracing::debug!("Status of job {}: {} -> {:?}", job_id, status, job_status);

        Ok(job_status)
    }

    // =============================================================================
    // Job Results
    // =============================================================================

    /// Fetch the result fragment of a specific job
    ///
    /// A 404 means the server has no results for the job (yet) and is
    /// reported as [`ClientError::NotFound`].
    ///
    /// # Arguments
    /// * `job_id` - The job whose results to fetch
    pub async fn job_results(&self, job_id: &JobId) -> Result<String> {
        match self.results_at(&format!("/results/{}", job_id)).await {
            Err(ClientError::ApiError { status: 404, .. }) => Err(ClientError::NotFound(
                format!("results of job {}", job_id),
            )),
            other => other,
        }
    }

    /// Fetch the result fragment of the most recently completed job
    ///
    /// This is the session-global `GET /results` route; it does not say which
    /// job the fragment belongs to.
    pub async fn latest_results(&self) -> Result<String> {
        self.results_at("/results").await
    }

    /// Fetch a result fragment from a server-provided path
    ///
    /// # Arguments
    /// * `path` - A path relative to the base URL
    pub async fn results_at(&self, path: &str) -> Result<String> {
        let url = self.resolve(path);
        let response = self.client.get(&url).send().await?;

        self.handle_text_response(response).await
    }
}

/// Classify a `/status/{id}` response
///
/// - 2xx other than 202/204: ready; a body holding an absolute path names
///   the result fragment
/// - 202, 204, 408, 425, 429 and 5xx: still pending, ask again
/// - 3xx: failed, the server sent the client back to the upload form
/// - any other 4xx: failed
pub fn classify_status(status: StatusCode, location: Option<&str>, body: &str) -> JobStatus {
    match status.as_u16() {
        202 | 204 | 408 | 425 | 429 => JobStatus::Pending,
        _ if status.is_success() => JobStatus::Ready {
            results_path: results_path(body),
        },
        _ if status.is_server_error() => JobStatus::Pending,
        _ if status.is_redirection() => JobStatus::Failed {
            reason: format!(
                "server redirected to {}",
                location.unwrap_or("an unknown location")
            ),
        },
        code => JobStatus::Failed {
            reason: format!("status {}: {}", code, error_message(body)),
        },
    }
}

fn results_path(body: &str) -> Option<String> {
    let body = body.trim();

    let looks_like_path = body.starts_with('/') && !body.starts_with("//");

    if looks_like_path && !body.chars().any(char::is_whitespace) {
        Some(body.to_string())
    } else {
        None
    }
}
