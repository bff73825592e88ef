//! Error types for monitoring

use std::time::Duration;
use thiserror::Error;

/// Result type alias for monitor operations
pub type Result<T> = std::result::Result<T, MonitorError>;

/// Errors that end or interrupt a monitoring session
///
/// Expected absences (no task yet, no stream yet, no new records) are not
/// errors; they are states of the monitor.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// A backend call failed (network, bad status, malformed response)
    #[error("backend request failed: {0:#}")]
    Backend(anyhow::Error),

    /// A single backend call exceeded its own timeout
    #[error("backend call timed out after {0:?}")]
    CallTimeout(Duration),

    /// A log stream that was expected to exist is gone
    #[error("log stream '{0}' not found")]
    StreamMissing(String),

    /// Too many backend errors in a row
    #[error("giving up after {attempts} consecutive backend errors: {last}")]
    TooManyErrors {
        attempts: u32,
        #[source]
        last: Box<MonitorError>,
    },

    /// The webhook call was rejected; `message` is the remote error verbatim
    #[error("there was a problem calling the webhook: {message}")]
    Trigger { message: String, server_side: bool },

    /// The session was interrupted by the user
    #[error("monitoring cancelled")]
    Cancelled,

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl MonitorError {
    /// Whether the error may clear up on the next poll
    pub fn is_transient(&self) -> bool {
        matches!(self, MonitorError::Backend(_) | MonitorError::CallTimeout(_))
    }

    /// Whether a trigger failure came from the webhook's own server side
    pub fn is_server_side(&self) -> bool {
        matches!(
            self,
            MonitorError::Trigger {
                server_side: true,
                ..
            }
        )
    }
}

impl From<anyhow::Error> for MonitorError {
    fn from(err: anyhow::Error) -> Self {
        MonitorError::Backend(err)
    }
}
