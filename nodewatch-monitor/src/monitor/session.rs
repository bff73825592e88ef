//! Monitor session state

use std::time::Duration;

use nodewatch_core::domain::log::{Cursor, LogPage, LogStream};
use nodewatch_core::domain::task::Task;
use nodewatch_core::domain::trigger::Trigger;
use tokio::time::Instant;

use crate::NodeTarget;
use crate::reporter::Reporter;

/// Mutable state of one monitoring session
///
/// Owned by a single polling loop; sessions never share anything.
#[derive(Debug, Clone)]
pub struct MonitorSession {
    pub target: NodeTarget,
    pub trigger: Trigger,
    pub matched_task: Option<Task>,
    pub cursor: Option<Cursor>,
    pub events_seen: usize,
    pub deadline: Instant,
    pub(crate) consecutive_errors: u32,
}

impl MonitorSession {
    pub fn new(target: NodeTarget, trigger: Trigger, deadline: Instant) -> Self {
        Self {
            target,
            trigger,
            matched_task: None,
            cursor: None,
            events_seen: 0,
            deadline,
            consecutive_errors: 0,
        }
    }

    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.deadline
    }

    /// Emits a page's records and moves the cursor past them
    ///
    /// An empty page leaves the cursor where it was, so the next read asks
    /// again from the same place.
    pub fn absorb(&mut self, stream: &LogStream, page: LogPage, reporter: &mut dyn Reporter) {
        if page.records.is_empty() {
            return;
        }

        for record in &page.records {
            reporter.record(stream, record);
        }
        self.events_seen += page.records.len();
        if let Some(cursor) = page.next_cursor {
            self.cursor = Some(cursor);
        }
    }
}
