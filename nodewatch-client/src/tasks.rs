//! Task scheduler endpoints

use crate::GatewayClient;
use crate::error::Result;
use nodewatch_core::dto::task::{DesiredStatus, TaskDescription};
use serde::Serialize;

impl GatewayClient {
    // =============================================================================
    // Task Query
    // =============================================================================

    /// List tasks of a family
    ///
    /// # Arguments
    /// * `family` - The task family (deployed node name)
    /// * `desired_status` - Which side of the lifecycle to list
    ///
    /// # Returns
    /// Task descriptions, most recently created first
    pub async fn list_tasks(
        &self,
        family: &str,
        desired_status: DesiredStatus,
    ) -> Result<Vec<TaskDescription>> {
        let url = format!("{}/api/tasks", self.base_url);
        let response = self
            .authorize(self.client.get(&url))
            .query(&ListTasksQuery {
                family,
                desired_status: desired_status.as_str(),
            })
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Describe a single task
    ///
    /// # Arguments
    /// * `task_id` - The scheduler's task id
    ///
    /// # Returns
    /// The task description; a 404 surfaces as a not-found `ClientError`
    pub async fn describe_task(&self, task_id: &str) -> Result<TaskDescription> {
        let url = format!("{}/api/tasks/{}", self.base_url, task_id);
        let response = self.authorize(self.client.get(&url)).send().await?;

        self.handle_response(response).await
    }
}

#[derive(Debug, Serialize)]
struct ListTasksQuery<'a> {
    family: &'a str,
    desired_status: &'a str,
}
