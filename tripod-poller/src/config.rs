//! Poller configuration
//!
//! Defines how the result poller paces retries, when it gives up and which
//! results route it reads from.

use std::str::FromStr;
use std::time::Duration;

/// How long a single status request may stay unanswered before it is
/// abandoned and issued again
pub const STATUS_TIMEOUT: Duration = Duration::from_millis(60_000);

/// Where result fragments are fetched from when the status response does not
/// name a location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultsRoute {
    /// `GET /results/{id}`
    #[default]
    Keyed,
    /// `GET /results`, the most recently completed job of the session
    Latest,
}

impl FromStr for ResultsRoute {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keyed" => Ok(Self::Keyed),
            "latest" => Ok(Self::Latest),
            other => anyhow::bail!("unknown results route: {} (expected keyed or latest)", other),
        }
    }
}

/// Poller configuration
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Pause before the next status request after a quick "not ready" answer
    /// or a transport error. A request that hit [`STATUS_TIMEOUT`] is
    /// re-issued without pausing.
    pub retry_delay: Duration,

    /// Give up after this many status requests (unbounded when `None`)
    pub max_attempts: Option<u32>,

    /// Keep polling after results were displayed, reloading them on every
    /// further ready signal
    pub follow: bool,

    /// Results route used when the server does not name one
    pub results_route: ResultsRoute,
}

impl PollerConfig {
    /// Creates configuration from environment variables
    ///
    /// Expected environment variables (all optional):
    /// - TRIPOD_RETRY_DELAY_MS (default: 2000)
    /// - TRIPOD_MAX_ATTEMPTS (default: unbounded)
    /// - TRIPOD_FOLLOW (true/false, default: false)
    /// - TRIPOD_RESULTS_ROUTE (keyed/latest, default: keyed)
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let retry_delay = var("TRIPOD_RETRY_DELAY_MS")
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.retry_delay);

        let max_attempts = var("TRIPOD_MAX_ATTEMPTS").and_then(|s| s.parse::<u32>().ok());

        let follow = var("TRIPOD_FOLLOW")
            .and_then(|s| s.parse::<bool>().ok())
            .unwrap_or(defaults.follow);

        let results_route = var("TRIPOD_RESULTS_ROUTE")
            .and_then(|s| s.parse::<ResultsRoute>().ok())
            .unwrap_or(defaults.results_route);

        Self {
            retry_delay,
            max_attempts,
            follow,
            results_route,
        }
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub fn with_follow(mut self, follow: bool) -> Self {
        self.follow = follow;
        self
    }

    pub fn with_results_route(mut self, results_route: ResultsRoute) -> Self {
        self.results_route = results_route;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_attempts == Some(0) {
            anyhow::bail!("max_attempts must be greater than 0");
        }

        Ok(())
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            retry_delay: Duration::from_secs(2),
            max_attempts: None,
            follow: false,
            results_route: ResultsRoute::Keyed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = PollerConfig::default();
        assert_eq!(config.retry_delay, Duration::from_secs(2));
        assert_eq!(config.max_attempts, None);
        assert!(!config.follow);
        assert_eq!(config.results_route, ResultsRoute::Keyed);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_status_timeout_is_one_minute() {
        assert_eq!(STATUS_TIMEOUT, Duration::from_secs(60));
    }

    #[test]
    fn test_from_vars() {
        let config = PollerConfig::from_vars(vars(&[
            ("TRIPOD_RETRY_DELAY_MS", "250"),
            ("TRIPOD_MAX_ATTEMPTS", "12"),
            ("TRIPOD_FOLLOW", "true"),
            ("TRIPOD_RESULTS_ROUTE", "latest"),
        ]));

        assert_eq!(config.retry_delay, Duration::from_millis(250));
        assert_eq!(config.max_attempts, Some(12));
        assert!(config.follow);
        assert_eq!(config.results_route, ResultsRoute::Latest);
    }

    #[test]
    fn test_from_vars_falls_back_on_garbage() {
        let config = PollerConfig::from_vars(vars(&[
            ("TRIPOD_RETRY_DELAY_MS", "soon"),
            ("TRIPOD_RESULTS_ROUTE", "sideways"),
        ]));

        assert_eq!(config.retry_delay, Duration::from_secs(2));
        assert_eq!(config.results_route, ResultsRoute::Keyed);
    }

    #[test]
    fn test_config_validation() {
        let config = PollerConfig::default().with_max_attempts(0);
        assert!(config.validate().is_err());

        let config = config.with_max_attempts(3);
        assert!(config.validate().is_ok());
    }
}
