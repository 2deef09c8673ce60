//! Configuration for the HTTP client and the task runner.

use std::time::Duration;

use crate::domain::ConductorError;

/// Environment variable holding the server API base URL.
pub const SERVER_URL_ENV: &str = "CONDUCTOR_SERVER_URL";

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080/api";

/// Connection settings for the queue service.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    /// Base API URL, e.g. `http://localhost:8080/api`. Stored without a
    /// trailing slash.
    pub server_api_url: String,

    /// Transport-level timeout for each request. `None` leaves it to reqwest.
    pub request_timeout: Option<Duration>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            server_api_url: DEFAULT_SERVER_URL.to_string(),
            request_timeout: None,
        }
    }
}

impl Configuration {
    pub fn new(server_api_url: impl Into<String>) -> Result<Self, ConductorError> {
        let url = server_api_url.into();
        let trimmed = url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(ConductorError::Config("server url is empty".to_string()));
        }
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(ConductorError::Config(format!(
                "server url must start with http:// or https://, got {trimmed}"
            )));
        }
        Ok(Self {
            server_api_url: trimmed.to_string(),
            request_timeout: None,
        })
    }

    /// Read `CONDUCTOR_SERVER_URL`, falling back to the local default.
    pub fn from_env() -> Result<Self, ConductorError> {
        match std::env::var(SERVER_URL_ENV) {
            Ok(url) => Self::new(url),
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}

/// Number of tasks requested per poll.
///
/// Fixed at one until the runner can tell how many local workers are free.
pub const AVAILABLE_WORKERS: usize = 1;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Settings held by one task runner for its whole lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRunnerConfig {
    /// Queue (task definition) name to poll.
    pub task_name: String,

    /// Idle wait after a cycle that found no work.
    pub poll_interval: Duration,

    /// Long-poll timeout for the poll call itself. Reserved: not sent to the
    /// server yet.
    pub poll_timeout: Duration,

    pub worker_id: Option<String>,

    pub domain: Option<String>,
}

impl TaskRunnerConfig {
    pub fn builder(task_name: impl Into<String>) -> TaskRunnerConfigBuilder {
        TaskRunnerConfigBuilder::new(task_name)
    }

    pub fn batch_size(&self) -> usize {
        AVAILABLE_WORKERS
    }
}

/// Builder for [`TaskRunnerConfig`].
#[derive(Debug, Clone)]
pub struct TaskRunnerConfigBuilder {
    task_name: String,
    poll_interval: Duration,
    poll_interval_secs: Option<f64>,
    poll_timeout: Option<Duration>,
    worker_id: Option<String>,
    domain: Option<String>,
}

impl TaskRunnerConfigBuilder {
    fn new(task_name: impl Into<String>) -> Self {
        Self {
            task_name: task_name.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            poll_interval_secs: None,
            poll_timeout: None,
            worker_id: None,
            domain: None,
        }
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self.poll_interval_secs = None;
        self
    }

    pub fn poll_interval_secs(mut self, secs: f64) -> Self {
        self.poll_interval_secs = Some(secs);
        self
    }

    pub fn poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = Some(timeout);
        self
    }

    pub fn worker_id(mut self, worker_id: impl Into<String>) -> Self {
        self.worker_id = Some(worker_id.into());
        self
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Validate and build.
    ///
    /// Empty `worker_id` / `domain` strings are treated as absent.
    pub fn build(self) -> Result<TaskRunnerConfig, ConductorError> {
        if self.task_name.trim().is_empty() {
            return Err(ConductorError::Config("task name is empty".to_string()));
        }
        let poll_interval = match self.poll_interval_secs {
            Some(secs) if !secs.is_finite() || secs < 0.0 => {
                return Err(ConductorError::Config(format!(
                    "poll interval must be a non-negative number of seconds, got {secs}"
                )));
            }
            Some(secs) => Duration::try_from_secs_f64(secs).map_err(|e| {
                ConductorError::Config(format!("poll interval of {secs} seconds: {e}"))
            })?,
            None => self.poll_interval,
        };
        Ok(TaskRunnerConfig {
            task_name: self.task_name,
            poll_interval,
            poll_timeout: self.poll_timeout.unwrap_or(poll_interval),
            worker_id: self.worker_id.filter(|s| !s.is_empty()),
            domain: self.domain.filter(|s| !s.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn builder_defaults() {
        let config = TaskRunnerConfig::builder("resize").build().unwrap();
        assert_eq!(config.task_name, "resize");
        assert_eq!(config.poll_interval, Duration::from_millis(100));
        assert_eq!(config.poll_timeout, config.poll_interval);
        assert_eq!(config.worker_id, None);
        assert_eq!(config.domain, None);
        assert_eq!(config.batch_size(), 1);
    }

    #[test]
    fn builder_sets_fields_and_drops_empty_strings() {
        let config = TaskRunnerConfig::builder("resize")
            .poll_interval_secs(2.5)
            .poll_timeout(Duration::from_secs(1))
            .worker_id("host-1")
            .domain("")
            .build()
            .unwrap();

        assert_eq!(config.poll_interval, Duration::from_millis(2500));
        assert_eq!(config.poll_timeout, Duration::from_secs(1));
        assert_eq!(config.worker_id.as_deref(), Some("host-1"));
        assert_eq!(config.domain, None);
    }

    #[rstest]
    #[case("", 1.0)]
    #[case("   ", 1.0)]
    #[case("resize", -1.0)]
    #[case("resize", f64::NAN)]
    #[case("resize", 1e30)]
    fn builder_rejects_invalid_values(#[case] name: &str, #[case] secs: f64) {
        let err = TaskRunnerConfig::builder(name)
            .poll_interval_secs(secs)
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), "ConfigError");
    }

    #[rstest]
    #[case("http://localhost:8080/api/", "http://localhost:8080/api")]
    #[case(" https://play.orkes.io/api ", "https://play.orkes.io/api")]
    fn configuration_normalizes_url(#[case] input: &str, #[case] expected: &str) {
        let config = Configuration::new(input).unwrap();
        assert_eq!(config.server_api_url, expected);
    }

    #[rstest]
    #[case("")]
    #[case("localhost:8080")]
    fn configuration_rejects_bad_urls(#[case] input: &str) {
        assert!(Configuration::new(input).is_err());
    }
}
