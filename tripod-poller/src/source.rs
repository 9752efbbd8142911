//! Job sources
//!
//! A job source answers the two questions the poller asks: is the job ready,
//! and what does its result fragment look like.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tripod_client::TripodClient;
use tracing::debug;
use tripod_core::domain::job::{JobId, JobStatus};

use crate::config::ResultsRoute;

/// Where to fetch a result fragment from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultsLocation {
    /// A path (or URL) named by the status response
    Path(String),
    /// `GET /results/{id}`
    Keyed,
    /// `GET /results`
    Latest,
}

impl ResultsLocation {
    /// Pick the location for a ready job: the server's hint wins over the
    /// configured route
    pub fn resolve(hint: Option<&str>, route: ResultsRoute) -> Self {
        match (hint, route) {
            (Some(path), _) => Self::Path(path.to_string()),
            (None, ResultsRoute::Keyed) => Self::Keyed,
            (None, ResultsRoute::Latest) => Self::Latest,
        }
    }
}

/// Source of job status and result fragments
#[async_trait]
pub trait JobSource: Send + Sync {
    /// Issues one status request for the job
    ///
    /// May take as long as the server holds the request; the poller bounds it.
    async fn status(&self, job_id: &JobId) -> Result<JobStatus>;

    /// Fetches the result fragment of a ready job
    async fn results(&self, job_id: &JobId, location: &ResultsLocation) -> Result<String>;
}

/// HTTP implementation of JobSource
pub struct HttpJobSource {
    client: Arc<TripodClient>,
}

impl HttpJobSource {
    /// Creates a new HTTP job source
    ///
    /// # Arguments
    /// * `client` - Client for the triPOD web server
    pub fn new(client: Arc<TripodClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl JobSource for HttpJobSource {
    async fn status(&self, job_id: &JobId) -> Result<JobStatus> {
        self.client
            .job_status(job_id)
            .await
            .with_context(|| format!("Failed to query status of job {}", job_id))
    }

    async fn results(&self, job_id: &JobId, location: &ResultsLocation) -> Result<String> {
        let fragment = match location {
            ResultsLocation::Path(path) => self.client.results_at(path).await,
            ResultsLocation::Keyed => self.client.job_results(job_id).await,
            ResultsLocation::Latest => self.client.latest_results().await,
        };

        if let Err(e) = &fragment {
            if e.is_not_found() {
                debug!("Results of job {} not published yet at {:?}", job_id, location);
            }
        }

        fragment.with_context(|| format!("Failed to fetch results of job {}", job_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_wins_over_route() {
        assert_eq!(
            ResultsLocation::resolve(Some("/results/7"), ResultsRoute::Latest),
            ResultsLocation::Path("/results/7".to_string())
        );
    }

    #[test]
    fn test_route_used_without_hint() {
        assert_eq!(
            ResultsLocation::resolve(None, ResultsRoute::Keyed),
            ResultsLocation::Keyed
        );
        assert_eq!(
            ResultsLocation::resolve(None, ResultsRoute::Latest),
            ResultsLocation::Latest
        );
    }
}
