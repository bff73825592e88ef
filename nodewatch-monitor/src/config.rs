//! Monitor configuration
//!
//! Defines all tunable parameters of a monitoring session: the global
//! deadline, the polling cadence of each state, the per-state wait limits and
//! the per-call backend timeout.

use std::time::Duration;

use crate::error::{MonitorError, Result};

/// Monitor configuration
///
/// Passed to the monitor at construction, so independent sessions can run
/// side by side with different settings.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Overall deadline of a session, across all states
    pub timeout: Duration,

    /// How often to look for the task while it is not visible yet
    pub task_poll_interval: Duration,

    /// How often to look for the task's log stream
    pub stream_poll_interval: Duration,

    /// How often to read new records while streaming
    pub log_poll_interval: Duration,

    /// Longest time to wait for a matching task to appear
    pub task_wait_limit: Duration,

    /// Longest time to wait for the log stream once the task is known
    pub stream_wait_limit: Duration,

    /// Timeout of a single backend call
    pub call_timeout: Duration,

    /// Maximum records per log read
    pub page_limit: usize,

    /// Consecutive backend errors tolerated before the session gives up
    pub max_consecutive_errors: u32,

    /// First segment of cluster log stream names (`<prefix>/<family>/<task id>`)
    pub stream_prefix: String,
}

impl MonitorConfig {
    /// Creates a configuration with defaults and the given deadline
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            task_poll_interval: Duration::from_secs(10),
            stream_poll_interval: Duration::from_secs(5),
            log_poll_interval: Duration::from_secs(2),
            task_wait_limit: Duration::from_secs(300),
            stream_wait_limit: Duration::from_secs(300),
            call_timeout: Duration::from_secs(30),
            page_limit: 100,
            max_consecutive_errors: 3,
            stream_prefix: "ecs".to_string(),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Every variable is optional and falls back to the default:
    /// - NODEWATCH_TIMEOUT (seconds, default: 900)
    /// - NODEWATCH_TASK_POLL_INTERVAL (seconds, default: 10)
    /// - NODEWATCH_STREAM_POLL_INTERVAL (seconds, default: 5)
    /// - NODEWATCH_LOG_POLL_INTERVAL (seconds, default: 2)
    /// - NODEWATCH_TASK_WAIT_LIMIT (seconds, default: 300)
    /// - NODEWATCH_STREAM_WAIT_LIMIT (seconds, default: 300)
    /// - NODEWATCH_CALL_TIMEOUT (seconds, default: 30)
    /// - NODEWATCH_PAGE_LIMIT (default: 100)
    /// - NODEWATCH_MAX_ERRORS (default: 3)
    /// - NODEWATCH_STREAM_PREFIX (default: ecs)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let secs = |key: &str, default: Duration| {
            lookup(key)
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(default)
        };

        Self {
            timeout: secs("NODEWATCH_TIMEOUT", defaults.timeout),
            task_poll_interval: secs("NODEWATCH_TASK_POLL_INTERVAL", defaults.task_poll_interval),
            stream_poll_interval: secs(
                "NODEWATCH_STREAM_POLL_INTERVAL",
                defaults.stream_poll_interval,
            ),
            log_poll_interval: secs("NODEWATCH_LOG_POLL_INTERVAL", defaults.log_poll_interval),
            task_wait_limit: secs("NODEWATCH_TASK_WAIT_LIMIT", defaults.task_wait_limit),
            stream_wait_limit: secs("NODEWATCH_STREAM_WAIT_LIMIT", defaults.stream_wait_limit),
            call_timeout: secs("NODEWATCH_CALL_TIMEOUT", defaults.call_timeout),
            page_limit: lookup("NODEWATCH_PAGE_LIMIT")
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(defaults.page_limit),
            max_consecutive_errors: lookup("NODEWATCH_MAX_ERRORS")
                .and_then(|s| s.parse::<u32>().ok())
                .unwrap_or(defaults.max_consecutive_errors),
            stream_prefix: lookup("NODEWATCH_STREAM_PREFIX").unwrap_or(defaults.stream_prefix),
        }
    }

    pub fn with_page_limit(mut self, page_limit: usize) -> Self {
        self.page_limit = page_limit;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        let intervals = [
            ("task_poll_interval", self.task_poll_interval),
            ("stream_poll_interval", self.stream_poll_interval),
            ("log_poll_interval", self.log_poll_interval),
            ("call_timeout", self.call_timeout),
        ];

        if self.timeout.is_zero() {
            return Err(MonitorError::Config("timeout must be greater than 0".into()));
        }

        for (name, interval) in intervals {
            if interval.is_zero() {
                return Err(MonitorError::Config(format!("{} must be greater than 0", name)));
            }
            if interval > self.timeout {
                return Err(MonitorError::Config(format!(
                    "{} ({:?}) cannot exceed timeout ({:?})",
                    name, interval, self.timeout
                )));
            }
        }

        if self.page_limit == 0 {
            return Err(MonitorError::Config("page_limit must be greater than 0".into()));
        }

        if self.max_consecutive_errors == 0 {
            return Err(MonitorError::Config(
                "max_consecutive_errors must be greater than 0".into(),
            ));
        }

        if self.stream_prefix.is_empty() || self.stream_prefix.contains('/') {
            return Err(MonitorError::Config(
                "stream_prefix must be a single non-empty path segment".into(),
            ));
        }

        Ok(())
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self::new(Duration::from_secs(15 * 60))
    }
}
