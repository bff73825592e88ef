//! In-memory scripted backend for tests
//!
//! Each query pops the next scripted answer; the last answer repeats once the
//! script runs out, so a script of one entry is a static backend.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use nodewatch_core::domain::log::LogStream;
use nodewatch_core::dto::log::{LogEvent, LogEventsPage, LogStreamDescription};
use nodewatch_core::dto::task::{DesiredStatus, TaskDescription};

use crate::repository::{LogRepository, TaskRepository};
use crate::reporter::Reporter;

struct Scripted<T> {
    answers: VecDeque<T>,
}

impl<T: Clone> Scripted<T> {
    fn new() -> Self {
        Self {
            answers: VecDeque::new(),
        }
    }

    fn set(&mut self, answers: Vec<T>) {
        self.answers = answers.into();
    }

    fn next(&mut self) -> Option<T> {
        if self.answers.len() > 1 {
            self.answers.pop_front()
        } else {
            self.answers.front().cloned()
        }
    }
}

/// A log read as seen by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadCall {
    pub token: Option<String>,
    pub limit: Option<usize>,
    pub returned: usize,
}

pub struct FakeBackend {
    active: Mutex<Scripted<Vec<TaskDescription>>>,
    stopped: Mutex<Vec<TaskDescription>>,
    describe: Mutex<Scripted<TaskDescription>>,
    streams: Mutex<Scripted<Vec<String>>>,
    events: Mutex<HashMap<String, Vec<LogEvent>>>,
    visible: Mutex<Scripted<usize>>,
    reads: Mutex<Vec<ReadCall>>,
    task_calls: AtomicU32,
    failing_task_calls: AtomicU32,
    stall_reads: AtomicBool,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            active: Mutex::new(Scripted::new()),
            stopped: Mutex::new(Vec::new()),
            describe: Mutex::new(Scripted::new()),
            streams: Mutex::new(Scripted::new()),
            events: Mutex::new(HashMap::new()),
            visible: Mutex::new(Scripted::new()),
            reads: Mutex::new(Vec::new()),
            task_calls: AtomicU32::new(0),
            failing_task_calls: AtomicU32::new(0),
            stall_reads: AtomicBool::new(false),
        }
    }

    /// Successive answers of the active task listing
    pub fn script_active(&self, answers: Vec<Vec<TaskDescription>>) {
        self.active.lock().unwrap().set(answers);
    }

    pub fn set_stopped(&self, tasks: Vec<TaskDescription>) {
        *self.stopped.lock().unwrap() = tasks;
    }

    /// Successive answers of `describe_task`
    pub fn script_describe(&self, answers: Vec<TaskDescription>) {
        self.describe.lock().unwrap().set(answers);
    }

    /// Successive stream listings
    pub fn script_streams(&self, answers: Vec<Vec<&str>>) {
        let answers = answers
            .into_iter()
            .map(|names| names.into_iter().map(str::to_string).collect())
            .collect();
        self.streams.lock().unwrap().set(answers);
    }

    pub fn set_events(&self, stream: &str, messages: usize) {
        let events = (0..messages)
            .map(|i| LogEvent {
                timestamp: 1_714_564_800_000 + i as i64 * 1000,
                message: format!("line {}", i),
            })
            .collect();
        self.events
            .lock()
            .unwrap()
            .insert(stream.to_string(), events);
    }

    /// Successive counts of events visible to reads; unscripted means all
    pub fn script_visible(&self, counts: Vec<usize>) {
        self.visible.lock().unwrap().set(counts);
    }

    /// Makes the next `n` task scheduler calls fail
    pub fn fail_task_calls(&self, n: u32) {
        self.failing_task_calls.store(n, Ordering::SeqCst);
    }

    /// Makes every log read hang
    pub fn stall_reads(&self) {
        self.stall_reads.store(true, Ordering::SeqCst);
    }

    pub fn reads(&self) -> Vec<ReadCall> {
        self.reads.lock().unwrap().clone()
    }

    pub fn task_calls(&self) -> u32 {
        self.task_calls.load(Ordering::SeqCst)
    }

    fn task_call(&self) -> Result<()> {
        self.task_calls.fetch_add(1, Ordering::SeqCst);
        let failing = self.failing_task_calls.load(Ordering::SeqCst);
        if failing > 0 {
            self.failing_task_calls.store(failing - 1, Ordering::SeqCst);
            anyhow::bail!("connection reset by peer");
        }
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for FakeBackend {
    async fn list_tasks(
        &self,
        _family: &str,
        desired_status: DesiredStatus,
    ) -> Result<Vec<TaskDescription>> {
        self.task_call()?;
        Ok(match desired_status {
            DesiredStatus::Running => self.active.lock().unwrap().next().unwrap_or_default(),
            DesiredStatus::Stopped => self.stopped.lock().unwrap().clone(),
        })
    }

    async fn describe_task(&self, task_id: &str) -> Result<Option<TaskDescription>> {
        self.task_call()?;
        Ok(self
            .describe
            .lock()
            .unwrap()
            .next()
            .filter(|d| d.task_id == task_id))
    }
}

#[async_trait]
impl LogRepository for FakeBackend {
    async fn describe_streams(
        &self,
        _group: &str,
        prefix: Option<&str>,
    ) -> Result<Vec<LogStreamDescription>> {
        let names = self.streams.lock().unwrap().next().unwrap_or_default();
        Ok(names
            .into_iter()
            .filter(|name| prefix.is_none_or(|p| name.starts_with(p)))
            .map(|name| LogStreamDescription {
                log_stream_name: name,
                last_event_at: None,
            })
            .collect())
    }

    async fn read_events(
        &self,
        _group: &str,
        stream: &str,
        token: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Option<LogEventsPage>> {
        if self.stall_reads.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_secs(24 * 3600)).await;
        }

        let Some(all) = self.events.lock().unwrap().get(stream).cloned() else {
            return Ok(None);
        };

        let visible = self
            .visible
            .lock()
            .unwrap()
            .next()
            .unwrap_or(all.len())
            .min(all.len());
        let start = token
            .and_then(|t| t.strip_prefix("f/"))
            .and_then(|i| i.parse::<usize>().ok())
            .unwrap_or(0)
            .min(visible);
        let end = limit.map_or(visible, |l| (start + l).min(visible));
        let events = all[start..end].to_vec();

        self.reads.lock().unwrap().push(ReadCall {
            token: token.map(str::to_string),
            limit,
            returned: events.len(),
        });

        Ok(Some(LogEventsPage {
            events,
            next_forward_token: Some(format!("f/{}", end)),
        }))
    }

    async fn read_latest_events(
        &self,
        _group: &str,
        stream: &str,
        limit: usize,
    ) -> Result<Option<LogEventsPage>> {
        let Some(all) = self.events.lock().unwrap().get(stream).cloned() else {
            return Ok(None);
        };

        let start = all.len().saturating_sub(limit);
        Ok(Some(LogEventsPage {
            events: all[start..].to_vec(),
            next_forward_token: Some(format!("f/{}", all.len())),
        }))
    }
}

/// Task description of family `node-a` created `created` seconds after a fixed origin
pub fn description(
    task_id: &str,
    status: &str,
    created: i64,
    trigger_id: Option<&str>,
) -> TaskDescription {
    TaskDescription {
        task_id: task_id.to_string(),
        family: "node-a".to_string(),
        last_status: status.to_string(),
        environment: trigger_id
            .map(|id| HashMap::from([("TRIGGER_ID".to_string(), id.to_string())]))
            .unwrap_or_default(),
        exit_code: None,
        stopped_reason: None,
        created_at: Utc.timestamp_opt(1_714_564_800 + created, 0).unwrap(),
    }
}

pub fn stopped(task_id: &str, exit_code: Option<i32>, reason: Option<&str>) -> TaskDescription {
    TaskDescription {
        exit_code,
        stopped_reason: reason.map(str::to_string),
        ..description(task_id, "STOPPED", 0, None)
    }
}

/// Everything a monitor reported, in order
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub records: Vec<String>,
    pub progress: Vec<String>,
    pub notices: Vec<String>,
    pub stopped: Vec<(Option<i32>, Option<String>)>,
}

impl Reporter for RecordingReporter {
    fn progress(&mut self, message: &str) {
        self.progress.push(message.to_string());
    }

    fn notice(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }

    fn record(&mut self, _stream: &LogStream, record: &nodewatch_core::domain::log::LogRecord) {
        self.records.push(record.message.clone());
    }

    fn task_stopped(&mut self, task: &nodewatch_core::domain::task::Task) {
        self.stopped
            .push((task.exit_code, task.failure_reason.clone()));
    }
}
