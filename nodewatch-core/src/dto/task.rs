//! Task DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Task description as reported by the scheduler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDescription {
    pub task_id: String,
    pub family: String,
    /// Backend-specific status vocabulary (e.g. "PROVISIONING", "Terminated")
    pub last_status: String,
    #[serde(default)]
    pub environment: HashMap<String, String>,
    #[serde(default)]
    pub exit_code: Option<i32>,
    #[serde(default)]
    pub stopped_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Which side of the lifecycle a task listing should cover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DesiredStatus {
    /// Tasks the scheduler still wants running (pending and running)
    Running,
    Stopped,
}

impl DesiredStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DesiredStatus::Running => "RUNNING",
            DesiredStatus::Stopped => "STOPPED",
        }
    }
}
