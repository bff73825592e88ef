//! Log store endpoints
//!
//! Group and stream names routinely contain slashes, so they travel as query
//! parameters rather than path segments.

use crate::GatewayClient;
use crate::error::Result;
use nodewatch_core::dto::log::{LogEventsPage, LogStreamDescription};
use serde::Serialize;

impl GatewayClient {
    // =============================================================================
    // Log Streams
    // =============================================================================

    /// Describe the streams of a log group
    ///
    /// # Arguments
    /// * `group` - The log group name
    /// * `prefix` - Only list streams whose name starts with this prefix
    ///
    /// # Returns
    /// Streams ordered by last event time, most recent first
    pub async fn describe_log_streams(
        &self,
        group: &str,
        prefix: Option<&str>,
    ) -> Result<Vec<LogStreamDescription>> {
        let url = format!("{}/api/logs/streams", self.base_url);
        let response = self
            .authorize(self.client.get(&url))
            .query(&StreamsQuery { group, prefix })
            .send()
            .await?;

        self.handle_response(response).await
    }

    // =============================================================================
    // Log Events
    // =============================================================================

    /// Read events from a log stream
    ///
    /// # Arguments
    /// * `group` - The log group name
    /// * `stream` - The log stream name
    /// * `next_token` - Continuation token from a previous read; `None` reads from the start
    /// * `limit` - Maximum number of events to return
    pub async fn get_log_events(
        &self,
        group: &str,
        stream: &str,
        next_token: Option<&str>,
        limit: Option<usize>,
    ) -> Result<LogEventsPage> {
        let url = format!("{}/api/logs/events", self.base_url);
        let response = self
            .authorize(self.client.get(&url))
            .query(&EventsQuery {
                group,
                stream,
                next_token,
                limit,
                start_from_head: None,
            })
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Read the most recent events of a log stream
    ///
    /// Returns at most `limit` events, oldest first, ending with the newest
    /// event of the stream.
    ///
    /// # Arguments
    /// * `group` - The log group name
    /// * `stream` - The log stream name
    /// * `limit` - Maximum number of events to return
    pub async fn get_latest_log_events(
        &self,
        group: &str,
        stream: &str,
        limit: usize,
    ) -> Result<LogEventsPage> {
        let url = format!("{}/api/logs/events", self.base_url);
        let response = self
            .authorize(self.client.get(&url))
            .query(&EventsQuery {
                group,
                stream,
                next_token: None,
                limit: Some(limit),
                start_from_head: Some(false),
            })
            .send()
            .await?;

        self.handle_response(response).await
    }
}

#[derive(Debug, Serialize)]
struct StreamsQuery<'a> {
    group: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    prefix: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct EventsQuery<'a> {
    group: &'a str,
    stream: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_token: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_from_head: Option<bool>,
}
