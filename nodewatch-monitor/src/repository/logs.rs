//! Logs repository
//!
//! Read-only access to the log store. Interpretation of pages (cursor
//! handling, missing-stream tolerance) lives in the log reader.

use anyhow::{Context, Result};
use async_trait::async_trait;
use nodewatch_client::GatewayClient;
use nodewatch_core::dto::log::{LogEventsPage, LogStreamDescription};

/// Repository trait for log store queries
#[async_trait]
pub trait LogRepository: Send + Sync {
    /// Lists the streams of a log group, most recently active first
    ///
    /// # Arguments
    /// * `group` - The log group
    /// * `prefix` - Optional stream name prefix
    async fn describe_streams(
        &self,
        group: &str,
        prefix: Option<&str>,
    ) -> Result<Vec<LogStreamDescription>>;

    /// Reads events from a stream
    ///
    /// Returns `None` when the backend reports that the stream does not exist.
    ///
    /// # Arguments
    /// * `group` - The log group
    /// * `stream` - The stream name
    /// * `token` - Continuation token of the previous read, `None` for the start
    /// * `limit` - Maximum number of events
    async fn read_events(
        &self,
        group: &str,
        stream: &str,
        token: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Option<LogEventsPage>>;

    /// Reads the newest `limit` events of a stream, oldest first
    ///
    /// Returns `None` when the backend reports that the stream does not exist.
    async fn read_latest_events(
        &self,
        group: &str,
        stream: &str,
        limit: usize,
    ) -> Result<Option<LogEventsPage>>;
}

#[async_trait]
impl LogRepository for GatewayClient {
    async fn describe_streams(
        &self,
        group: &str,
        prefix: Option<&str>,
    ) -> Result<Vec<LogStreamDescription>> {
        self.describe_log_streams(group, prefix)
            .await
            .with_context(|| format!("Failed to describe log streams of {}", group))
    }

    async fn read_events(
        &self,
        group: &str,
        stream: &str,
        token: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Option<LogEventsPage>> {
        match self.get_log_events(group, stream, token, limit).await {
            Ok(page) => Ok(Some(page)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read log stream {}", stream)),
        }
    }

    async fn read_latest_events(
        &self,
        group: &str,
        stream: &str,
        limit: usize,
    ) -> Result<Option<LogEventsPage>> {
        match self.get_latest_log_events(group, stream, limit).await {
            Ok(page) => Ok(Some(page)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read log stream {}", stream)),
        }
    }
}
