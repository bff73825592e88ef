//! Trigger DTOs

use serde::{Deserialize, Serialize};

/// Request to fire a node's webhook
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerRequest {
    pub model_id: String,
}

/// Webhook acknowledgment
///
/// Backends that cannot correlate a run with its task leave `trigger_id` empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerResponse {
    #[serde(default)]
    pub trigger_id: Option<String>,
}
