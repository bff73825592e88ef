//! Monitor states

use std::time::Duration;

use nodewatch_core::domain::log::LogStream;
use nodewatch_core::domain::outcome::Outcome;
use nodewatch_core::domain::task::Task;
use tokio::time::Instant;

use crate::config::MonitorConfig;

/// Where a monitoring session stands
///
/// `Done(Outcome::Timeout)` is the abandoned state: the deadline or a
/// per-state wait limit ran out before the run concluded.
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorState {
    /// No task matches the trigger yet
    AwaitingTask { since: Instant, polls: u32 },
    /// The task is known but has not created its log stream
    AwaitingStream {
        task: Task,
        since: Instant,
        polls: u32,
    },
    /// Reading the task's output
    Streaming { task: Task, stream: LogStream },
    Done(Outcome),
}

impl MonitorState {
    pub fn name(&self) -> &'static str {
        match self {
            MonitorState::AwaitingTask { .. } => "awaiting task",
            MonitorState::AwaitingStream { .. } => "awaiting stream",
            MonitorState::Streaming { .. } => "streaming",
            MonitorState::Done(_) => "done",
        }
    }

    /// Delay before the state is polled again after a failed poll
    pub fn idle_interval(&self, config: &MonitorConfig) -> Duration {
        match self {
            MonitorState::AwaitingTask { .. } => config.task_poll_interval,
            MonitorState::AwaitingStream { .. } => config.stream_poll_interval,
            MonitorState::Streaming { .. } => config.log_poll_interval,
            MonitorState::Done(_) => Duration::ZERO,
        }
    }
}

/// A transition and how long to wait before acting on the next state
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub next: MonitorState,
    pub delay: Duration,
}

impl Step {
    pub fn now(next: MonitorState) -> Self {
        Self::after(next, Duration::ZERO)
    }

    pub fn after(next: MonitorState, delay: Duration) -> Self {
        Self { next, delay }
    }
}
