//! Configuration module
//!
//! Settings shared by every command.

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the node gateway
    pub gateway_url: String,
    /// Bearer token sent with every gateway request
    pub token: Option<String>,
}
