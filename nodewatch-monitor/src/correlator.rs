//! Trigger correlation
//!
//! Fires a node's webhook and records the correlation id the backend hands
//! back, if any, so the locator can tell this run's task from older ones.

use std::sync::Arc;

use nodewatch_client::ClientError;
use nodewatch_core::domain::trigger::Trigger;
use tracing::{debug, info};

use crate::error::{MonitorError, Result};
use crate::repository::TriggerRepository;

pub struct TriggerCorrelator {
    repository: Arc<dyn TriggerRepository>,
}

impl TriggerCorrelator {
    pub fn new(repository: Arc<dyn TriggerRepository>) -> Self {
        Self { repository }
    }

    /// Fires the webhook and returns the resulting trigger
    ///
    /// A rejected call becomes `MonitorError::Trigger` with the remote error
    /// text unmodified; `is_server_side()` tells whether the webhook handler
    /// itself broke, in which case its logs are worth dumping.
    pub async fn issue_trigger(&self, model_id: &str) -> Result<Trigger> {
        let response = self.repository.trigger(model_id).await.map_err(|e| {
            let client_error = e.downcast_ref::<ClientError>();
            let server_side = client_error.is_some_and(ClientError::is_server_error)
                || e.to_string().contains("Internal Server Error");
            let message = match client_error {
                Some(ClientError::ApiError { message, .. }) => message.clone(),
                _ => format!("{:#}", e),
            };
            MonitorError::Trigger {
                message,
                server_side,
            }
        })?;
        debug!("Webhook response: {:?}", response);

        match &response.trigger_id {
            Some(id) => info!("Webhook accepted, trigger id {}", id),
            None => debug!("Webhook accepted without a trigger id"),
        }

        Ok(Trigger::new(response.trigger_id))
    }
}
