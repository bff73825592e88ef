//! Log store DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A log stream listed from a log group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogStreamDescription {
    pub log_stream_name: String,
    #[serde(default)]
    pub last_event_at: Option<DateTime<Utc>>,
}

/// A raw log event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    pub message: String,
}

/// One page of log events
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEventsPage {
    pub events: Vec<LogEvent>,
    #[serde(default)]
    pub next_forward_token: Option<String>,
}
