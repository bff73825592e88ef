//! Log domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An append-only sequence of log records written by one task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogStream {
    pub name: String,
    /// Log group the stream belongs to
    pub group: String,
}

/// A single line of task output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

/// Opaque continuation token returned by a log read
///
/// Passing it to the next read resumes right after the last record returned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of one bounded log read
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogPage {
    pub records: Vec<LogRecord>,
    /// Token to resume after the last record of this page
    pub next_cursor: Option<Cursor>,
    /// The read hit its limit, so more records may already exist
    pub more_available: bool,
}

impl LogPage {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
