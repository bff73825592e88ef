//! Monitoring outcome types

use serde::{Deserialize, Serialize};

/// Final verdict of a monitoring session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Success,
    Failure(FailureReason),
    /// The deadline passed before the run concluded; its real result is unknown
    Timeout,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }
}

/// Why a run is known to have failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    /// The family has no task at all, running or stopped
    NeverScheduled { family: String },
    /// The task stopped without ever creating a log stream
    NoOutput {
        task_id: String,
        exit_code: Option<i32>,
        reason: Option<String>,
    },
    /// The task stopped with a non-zero or missing exit code
    TaskFailed {
        task_id: String,
        exit_code: Option<i32>,
        reason: Option<String>,
    },
}

impl FailureReason {
    /// Scheduler diagnostic text, unmodified
    pub fn scheduler_reason(&self) -> Option<&str> {
        match self {
            FailureReason::NeverScheduled { .. } => None,
            FailureReason::NoOutput { reason, .. } | FailureReason::TaskFailed { reason, .. } => {
                reason.as_deref()
            }
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::NeverScheduled { .. } => write!(f, "never scheduled"),
            FailureReason::NoOutput { .. } => write!(f, "no output produced"),
            FailureReason::TaskFailed { exit_code, .. } => match exit_code {
                Some(code) => write!(f, "exit code {}", code),
                None => write!(f, "no exit code"),
            },
        }
    }
}
