//! Webhook trigger endpoint

use crate::GatewayClient;
use crate::error::Result;
use nodewatch_core::dto::trigger::{TriggerRequest, TriggerResponse};

impl GatewayClient {
    /// Fire a node's webhook
    ///
    /// # Arguments
    /// * `model_id` - The model whose node should run
    ///
    /// # Returns
    /// The acknowledgment, with a trigger id when the backend correlates runs
    pub async fn trigger_webhook(&self, model_id: &str) -> Result<TriggerResponse> {
        let url = format!("{}/api/triggers", self.base_url);
        tracing::debug!("Triggering webhook for model {}", model_id);

        let response = self
            .authorize(self.client.post(&url))
            .json(&TriggerRequest {
                model_id: model_id.to_string(),
            })
            .send()
            .await?;

        self.handle_response(response).await
    }
}
