//! Task location
//!
//! Finds the scheduler task that corresponds to a trigger. Active tasks are
//! preferred, stopped ones are consulted next because a short run may have
//! finished before polling starts.

use std::sync::Arc;

use nodewatch_core::domain::task::Task;
use nodewatch_core::domain::trigger::Trigger;
use nodewatch_core::dto::task::{DesiredStatus, TaskDescription};
use tracing::debug;

use crate::classifier::StatusClassifier;
use crate::error::Result;
use crate::repository::TaskRepository;

/// Result of a task lookup
#[derive(Debug, Clone, PartialEq)]
pub enum TaskLookup {
    Matched(Task),
    /// The family has tasks but none belongs to the trigger yet
    NotYetMatched { candidates: usize },
    /// The family has no tasks at all, running or stopped
    NoTasks,
}

pub struct TaskLocator {
    repository: Arc<dyn TaskRepository>,
    classifier: Arc<dyn StatusClassifier>,
}

impl TaskLocator {
    pub fn new(
        repository: Arc<dyn TaskRepository>,
        classifier: Arc<dyn StatusClassifier>,
    ) -> Self {
        Self {
            repository,
            classifier,
        }
    }

    /// Finds the task of `family` that belongs to `trigger`
    ///
    /// With a trigger id, only tasks carrying it in their environment match.
    /// Without one, the most recently created task matches.
    pub async fn find_task(&self, family: &str, trigger: &Trigger) -> Result<TaskLookup> {
        let active = self
            .repository
            .list_tasks(family, DesiredStatus::Running)
            .await?;
        if let Some(task) = self.pick(active.iter(), trigger) {
            return Ok(TaskLookup::Matched(task));
        }

        let stopped = self
            .repository
            .list_tasks(family, DesiredStatus::Stopped)
            .await?;
        if let Some(task) = self.pick(stopped.iter(), trigger) {
            return Ok(TaskLookup::Matched(task));
        }

        let candidates = active.len() + stopped.len();
        debug!(
            "No task of {} matches trigger {:?} ({} candidate(s))",
            family, trigger.trigger_id, candidates
        );

        if candidates == 0 {
            Ok(TaskLookup::NoTasks)
        } else {
            Ok(TaskLookup::NotYetMatched { candidates })
        }
    }

    /// Re-reads a known task
    ///
    /// Returns `None` when the scheduler no longer reports it.
    pub async fn refresh(&self, task: &Task) -> Result<Option<Task>> {
        let description = self.repository.describe_task(&task.task_id).await?;
        Ok(description.map(|d| self.to_task(d)))
    }

    fn pick<'a>(
        &self,
        candidates: impl Iterator<Item = &'a TaskDescription>,
        trigger: &Trigger,
    ) -> Option<Task> {
        candidates
            .map(|d| self.to_task(d.clone()))
            .filter(|task| match &trigger.trigger_id {
                Some(id) => task.matches_trigger(id),
                None => true,
            })
            .max_by_key(|task| task.created_at)
    }

    fn to_task(&self, description: TaskDescription) -> Task {
        let lifecycle_state = self.classifier.classify(&description.last_status);
        Task {
            task_id: description.task_id,
            family: description.family,
            raw_status: description.last_status,
            lifecycle_state,
            environment: description.environment,
            exit_code: description.exit_code,
            failure_reason: description.stopped_reason,
            created_at: description.created_at,
        }
    }
}
