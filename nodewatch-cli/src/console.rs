//! Console rendering of monitor events

use std::io::Write;

use chrono::Local;
use colored::*;
use nodewatch_core::domain::log::{LogRecord, LogStream};
use nodewatch_core::domain::task::Task;
use nodewatch_monitor::Reporter;

/// Prints monitor events to stdout
///
/// Progress lines overwrite each other in place until something else is
/// printed.
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    progress_open: bool,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self::default()
    }

    fn end_progress(&mut self) {
        if self.progress_open {
            println!();
            self.progress_open = false;
        }
    }
}

impl Reporter for ConsoleReporter {
    fn progress(&mut self, message: &str) {
        print!("\r\x1b[2K{}", message.yellow());
        let _ = std::io::stdout().flush();
        self.progress_open = true;
    }

    fn notice(&mut self, message: &str) {
        self.end_progress();
        println!("{}", message.green());
    }

    fn record(&mut self, stream: &LogStream, record: &LogRecord) {
        self.end_progress();
        println!("{}", format_record(stream, record));
    }

    fn task_stopped(&mut self, task: &Task) {
        self.end_progress();
        let exit_code = task
            .exit_code
            .map_or_else(|| "none".to_string(), |code| code.to_string());
        println!("{}", format!("Exit code: {}", exit_code).yellow());
        println!(
            "{}",
            format!("Reason: {}", task.failure_reason.as_deref().unwrap_or("none")).yellow()
        );
    }
}

/// `[<stream>] <local time>: <message>`
pub fn format_record(stream: &LogStream, record: &LogRecord) -> String {
    format!(
        "[{}] {}: {}",
        stream.name.dimmed(),
        record
            .timestamp
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S"),
        record.message
    )
}
