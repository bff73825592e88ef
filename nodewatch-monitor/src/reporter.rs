//! Reporting seam between the monitor and its consumer
//!
//! The monitor never prints. Everything a user should see (progress while
//! waiting, log records once streaming, task exit details) goes through a
//! `Reporter`, which the CLI renders to the console.

use nodewatch_core::domain::log::{LogRecord, LogStream};
use nodewatch_core::domain::task::Task;

pub trait Reporter: Send {
    /// Transient single-line progress, replaced by the next one
    fn progress(&mut self, message: &str);

    /// A state change worth a line of its own
    fn notice(&mut self, message: &str);

    /// A log record, in stream order, exactly once
    fn record(&mut self, stream: &LogStream, record: &LogRecord);

    /// The task reached its terminal state
    fn task_stopped(&mut self, task: &Task);
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn progress(&mut self, _message: &str) {}

    fn notice(&mut self, _message: &str) {}

    fn record(&mut self, _stream: &LogStream, _record: &LogRecord) {}

    fn task_stopped(&mut self, _task: &Task) {}
}
