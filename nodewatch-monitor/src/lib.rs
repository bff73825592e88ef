//! Nodewatch Monitor
//!
//! Follows one run of a prediction node from its webhook trigger to its
//! conclusion. Three views of the run evolve independently and none of them
//! says "done" on its own: the webhook acknowledgment, the scheduler's task
//! state and the log store. The monitor reconciles them.
//!
//! Architecture:
//! - Repositories: raw access to the webhook, the scheduler and the log store
//! - Correlator: fires the webhook and records the trigger id
//! - Locator + classifier: finds the run's task and its canonical state
//! - Reader: finds the task's log stream and reads it by cursor
//! - Monitor: the polling state machine tying them together

pub mod classifier;
pub mod config;
pub mod correlator;
pub mod error;
pub mod locator;
pub mod monitor;
pub mod reader;
pub mod reporter;
pub mod repository;

#[cfg(test)]
mod testing;

pub use config::MonitorConfig;
pub use error::{MonitorError, Result};
pub use monitor::Monitor;
pub use reporter::Reporter;

/// A deployed node as seen by the monitor
///
/// Tasks are looked up by `family`; their output lands in `log_group`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeTarget {
    pub family: String,
    pub log_group: String,
}

impl NodeTarget {
    /// Target whose log group is named after the family
    pub fn new(family: impl Into<String>) -> Self {
        let family = family.into();
        Self {
            log_group: family.clone(),
            family,
        }
    }

    pub fn with_log_group(mut self, log_group: impl Into<String>) -> Self {
        self.log_group = log_group.into();
        self
    }
}
