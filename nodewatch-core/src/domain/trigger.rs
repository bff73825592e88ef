//! Trigger domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A request to start one run of a node
///
/// `trigger_id` is absent when the backend does not correlate invocations
/// (e.g. cron-scheduled runs). Monitoring then follows the most recent task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    pub trigger_id: Option<String>,
    pub issued_at: DateTime<Utc>,
}

impl Trigger {
    pub fn new(trigger_id: Option<String>) -> Self {
        Self {
            trigger_id,
            issued_at: Utc::now(),
        }
    }

    /// Trigger without correlation, used to follow whatever ran last
    pub fn untracked() -> Self {
        Self::new(None)
    }

    pub fn is_correlated(&self) -> bool {
        self.trigger_id.is_some()
    }
}
