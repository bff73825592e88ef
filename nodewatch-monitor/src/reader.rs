//! Log stream reading
//!
//! Finds the stream a task writes to and reads it incrementally. Streams are
//! created lazily by the scheduler's runtime once a task emits its first
//! line, so "no stream yet" is an ordinary answer here, not an error.

use std::sync::Arc;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use nodewatch_core::domain::log::{Cursor, LogPage, LogRecord, LogStream};
use nodewatch_core::dto::log::LogEventsPage;
use tracing::debug;

use crate::error::{MonitorError, Result};
use crate::repository::LogRepository;

/// How a read treats a stream the backend does not know
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingStream {
    /// Return an empty page (waiting for the stream to be created)
    Tolerate,
    /// Fail with `MonitorError::StreamMissing`
    Fail,
}

pub struct LogReader {
    repository: Arc<dyn LogRepository>,
    stream_prefix: String,
}

impl LogReader {
    pub fn new(repository: Arc<dyn LogRepository>, stream_prefix: impl Into<String>) -> Self {
        Self {
            repository,
            stream_prefix: stream_prefix.into(),
        }
    }

    /// Finds the stream of a task
    ///
    /// Cluster streams are named `<prefix>/<family>/<task id>`.
    pub async fn find_stream(
        &self,
        log_group: &str,
        family: &str,
        task_id: &str,
    ) -> Result<Option<LogStream>> {
        let prefix = format!("{}/{}/{}", self.stream_prefix, family, task_id);
        let streams = self
            .repository
            .describe_streams(log_group, Some(&prefix))
            .await?;

        let stream = streams
            .into_iter()
            .find(|s| s.log_stream_name.ends_with(task_id))
            .map(|s| LogStream {
                name: s.log_stream_name,
                group: log_group.to_string(),
            });

        if stream.is_none() {
            debug!("No log stream for task {} yet", task_id);
        }
        Ok(stream)
    }

    /// The most recently active stream of a log group
    pub async fn latest_stream(&self, log_group: &str) -> Result<Option<LogStream>> {
        let streams = self.repository.describe_streams(log_group, None).await?;
        Ok(streams.into_iter().next().map(|s| LogStream {
            name: s.log_stream_name,
            group: log_group.to_string(),
        }))
    }

    /// Reads up to `limit` records after `cursor`
    ///
    /// `more_available` is set when the page is full. A non-empty page always
    /// carries the cursor to resume from.
    pub async fn read(
        &self,
        stream: &LogStream,
        cursor: Option<&Cursor>,
        limit: Option<usize>,
        missing: MissingStream,
    ) -> Result<LogPage> {
        let page = self
            .repository
            .read_events(
                &stream.group,
                &stream.name,
                cursor.map(Cursor::as_str),
                limit,
            )
            .await?;

        match page {
            Some(page) => to_page(stream, page, limit),
            None if missing == MissingStream::Tolerate => {
                debug!("Log stream {} not created yet", stream.name);
                Ok(LogPage::default())
            }
            None => Err(MonitorError::StreamMissing(stream.name.clone())),
        }
    }

    /// Reads the last `limit` records of a stream
    ///
    /// `more_available` is set when older records were left out.
    pub async fn tail(
        &self,
        stream: &LogStream,
        limit: usize,
        missing: MissingStream,
    ) -> Result<LogPage> {
        let page = self
            .repository
            .read_latest_events(&stream.group, &stream.name, limit)
            .await?;

        match page {
            Some(page) => to_page(stream, page, Some(limit)),
            None if missing == MissingStream::Tolerate => Ok(LogPage::default()),
            None => Err(MonitorError::StreamMissing(stream.name.clone())),
        }
    }
}

fn to_page(stream: &LogStream, page: LogEventsPage, limit: Option<usize>) -> Result<LogPage> {
    let more_available = limit.is_some_and(|l| page.events.len() >= l);

    if !page.events.is_empty() && page.next_forward_token.is_none() {
        return Err(MonitorError::Backend(anyhow!(
            "log store returned {} record(s) from {} without a continuation token",
            page.events.len(),
            stream.name
        )));
    }

    let records = page
        .events
        .into_iter()
        .map(|event| LogRecord {
            timestamp: DateTime::<Utc>::from_timestamp_millis(event.timestamp).unwrap_or_default(),
            message: event.message,
        })
        .collect();

    Ok(LogPage {
        records,
        next_cursor: page.next_forward_token.map(Cursor::new),
        more_available,
    })
}
