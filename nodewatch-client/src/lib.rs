//! Nodewatch HTTP Client
//!
//! A typed HTTP client for the node gateway, the service that fronts a
//! prediction node's webhook, its task scheduler and its log store.
//!
//! # Example
//!
//! ```no_run
//! use nodewatch_client::GatewayClient;
//! use nodewatch_core::dto::task::DesiredStatus;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), nodewatch_client::ClientError> {
//!     let client = GatewayClient::new("http://localhost:8080");
//!
//!     let tasks = client.list_tasks("node-a", DesiredStatus::Running).await?;
//!     println!("{} active task(s)", tasks.len());
//!     Ok(())
//! }
//! ```

pub mod error;
mod logs;
mod tasks;
mod triggers;

// Re-export commonly used types
pub use error::{ClientError, Result};

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

/// HTTP client for the node gateway API
///
/// Endpoints are organized into three groups:
/// - Triggers (fire a node's webhook)
/// - Tasks (list and describe scheduled tasks)
/// - Logs (list streams, read events)
#[derive(Debug, Clone)]
pub struct GatewayClient {
    /// Base URL of the gateway (e.g., "http://localhost:8080")
    base_url: String,
    /// Optional bearer token sent with every request
    token: Option<String>,
    /// HTTP client instance
    client: Client,
}

impl GatewayClient {
    /// Create a new gateway client
    ///
    /// # Example
    /// ```
    /// use nodewatch_client::GatewayClient;
    ///
    /// let client = GatewayClient::new("http://localhost:8080");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new gateway client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use nodewatch_client::GatewayClient;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(30))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = GatewayClient::with_client("http://localhost:8080", http_client);
    /// ```
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            client,
        }
    }

    /// Attach a bearer token to every request
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Get the base URL of the gateway
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// Non-success responses become `ClientError::ApiError` carrying the body
    /// verbatim, so backend diagnostics reach the user unmodified.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}
