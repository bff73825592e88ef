//! Task domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A scheduled execution of a node's container
///
/// Tasks are created by the external scheduler. Nodewatch only observes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub task_id: String,
    pub family: String,
    /// Status string exactly as the backend reported it
    pub raw_status: String,
    pub lifecycle_state: LifecycleState,
    pub environment: HashMap<String, String>,
    pub exit_code: Option<i32>,
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Whether any environment entry carries the given trigger id
    pub fn matches_trigger(&self, trigger_id: &str) -> bool {
        self.environment.values().any(|value| value == trigger_id)
    }

    pub fn is_stopped(&self) -> bool {
        self.lifecycle_state.is_terminal()
    }

    /// A stopped task succeeded only when its container reported exit code 0
    pub fn succeeded(&self) -> bool {
        self.is_stopped() && self.exit_code == Some(0)
    }
}

/// Canonical lifecycle of a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleState {
    /// Accepted by the scheduler, not running yet
    Pending,
    Running,
    /// Terminal
    Stopped,
}

impl LifecycleState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, LifecycleState::Stopped)
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleState::Pending => write!(f, "PENDING"),
            LifecycleState::Running => write!(f, "RUNNING"),
            LifecycleState::Stopped => write!(f, "STOPPED"),
        }
    }
}
