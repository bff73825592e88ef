//! Triggers repository

use anyhow::Result;
use async_trait::async_trait;
use nodewatch_client::GatewayClient;
use nodewatch_core::dto::trigger::TriggerResponse;

/// Repository trait for firing a node's webhook
#[async_trait]
pub trait TriggerRepository: Send + Sync {
    /// Fires the webhook of the node serving `model_id`
    ///
    /// Errors keep the underlying `ClientError` so callers can inspect it.
    async fn trigger(&self, model_id: &str) -> Result<TriggerResponse>;
}

#[async_trait]
impl TriggerRepository for GatewayClient {
    async fn trigger(&self, model_id: &str) -> Result<TriggerResponse> {
        Ok(self.trigger_webhook(model_id).await?)
    }
}
