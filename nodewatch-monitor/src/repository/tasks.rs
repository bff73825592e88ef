//! Tasks repository
//!
//! Read-only access to the task scheduler:
//! - Listing tasks of a family by desired status
//! - Describing a single task

use anyhow::{Context, Result};
use async_trait::async_trait;
use nodewatch_client::GatewayClient;
use nodewatch_core::dto::task::{DesiredStatus, TaskDescription};

/// Repository trait for task scheduler queries
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Lists the tasks of a family
    ///
    /// # Arguments
    /// * `family` - The task family
    /// * `desired_status` - `Running` covers pending and running tasks, `Stopped` finished ones
    async fn list_tasks(
        &self,
        family: &str,
        desired_status: DesiredStatus,
    ) -> Result<Vec<TaskDescription>>;

    /// Describes a single task
    ///
    /// Returns `None` when the scheduler no longer knows the task.
    async fn describe_task(&self, task_id: &str) -> Result<Option<TaskDescription>>;
}

#[async_trait]
impl TaskRepository for GatewayClient {
    async fn list_tasks(
        &self,
        family: &str,
        desired_status: DesiredStatus,
    ) -> Result<Vec<TaskDescription>> {
        GatewayClient::list_tasks(self, family, desired_status)
            .await
            .with_context(|| format!("Failed to list {} tasks", desired_status.as_str()))
    }

    async fn describe_task(&self, task_id: &str) -> Result<Option<TaskDescription>> {
        match GatewayClient::describe_task(self, task_id).await {
            Ok(task) => Ok(Some(task)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e).context("Failed to describe task"),
        }
    }
}
