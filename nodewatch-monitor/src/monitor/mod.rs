//! Execution monitor
//!
//! Drives one session from trigger to outcome as an explicit state machine:
//! `AwaitingTask -> AwaitingStream -> Streaming -> Done`. Each state has its
//! own handler which performs the state's backend calls and returns the next
//! state together with the delay before acting on it.
//!
//! Every backend call is bounded by `call_timeout` and by the time left until
//! the session deadline. Transient failures are retried on the next poll; a
//! run of `max_consecutive_errors` ends the session with an error.

pub mod session;
pub mod state;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use nodewatch_core::domain::log::LogStream;
use nodewatch_core::domain::outcome::{FailureReason, Outcome};
use nodewatch_core::domain::task::Task;
use nodewatch_core::domain::trigger::Trigger;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::NodeTarget;
use crate::classifier::StatusClassifier;
use crate::config::MonitorConfig;
use crate::error::{MonitorError, Result};
use crate::locator::{TaskLocator, TaskLookup};
use crate::reader::{LogReader, MissingStream};
use crate::reporter::Reporter;
use crate::repository::{LogRepository, TaskRepository};

pub use session::MonitorSession;
pub use state::{MonitorState, Step};

pub struct Monitor {
    config: MonitorConfig,
    locator: TaskLocator,
    reader: LogReader,
    cancel: CancellationToken,
}

impl Monitor {
    /// Creates a monitor over the given backends
    ///
    /// Fails when the configuration is invalid.
    pub fn new(
        config: MonitorConfig,
        tasks: Arc<dyn TaskRepository>,
        logs: Arc<dyn LogRepository>,
        classifier: Arc<dyn StatusClassifier>,
    ) -> Result<Self> {
        config.validate()?;
        let reader = LogReader::new(logs, config.stream_prefix.clone());
        Ok(Self {
            locator: TaskLocator::new(tasks, classifier),
            reader,
            config,
            cancel: CancellationToken::new(),
        })
    }

    /// Stops every session of this monitor when `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn locator(&self) -> &TaskLocator {
        &self.locator
    }

    pub fn reader(&self) -> &LogReader {
        &self.reader
    }

    /// Monitors the run started by `trigger` until it concludes or the
    /// configured timeout elapses
    pub async fn monitor(
        &self,
        target: &NodeTarget,
        trigger: Trigger,
        reporter: &mut dyn Reporter,
    ) -> Result<Outcome> {
        let deadline = Instant::now() + self.config.timeout;
        self.monitor_until(target, trigger, deadline, reporter).await
    }

    /// Same as [`Monitor::monitor`] with an explicit deadline
    pub async fn monitor_until(
        &self,
        target: &NodeTarget,
        trigger: Trigger,
        deadline: Instant,
        reporter: &mut dyn Reporter,
    ) -> Result<Outcome> {
        info!(
            "Monitoring {} (trigger {:?}, timeout {:?})",
            target.family,
            trigger.trigger_id,
            deadline.saturating_duration_since(Instant::now())
        );

        let mut session = MonitorSession::new(target.clone(), trigger, deadline);
        let mut state = MonitorState::AwaitingTask {
            since: Instant::now(),
            polls: 0,
        };

        loop {
            if let MonitorState::Done(outcome) = &state {
                info!(
                    "Monitoring of {} finished: {:?} ({} record(s))",
                    target.family, outcome, session.events_seen
                );
                return Ok(outcome.clone());
            }

            if self.cancel.is_cancelled() {
                return Err(MonitorError::Cancelled);
            }

            if session.is_expired() {
                warn!(
                    "Deadline reached while {} for {}",
                    state.name(),
                    target.family
                );
                return Ok(Outcome::Timeout);
            }

            let step = match self.step(&mut session, &state, reporter).await {
                Ok(step) => {
                    session.consecutive_errors = 0;
                    step
                }
                Err(e) if e.is_transient() => {
                    session.consecutive_errors += 1;
                    warn!(
                        "Poll failed while {} ({}/{}): {}",
                        state.name(),
                        session.consecutive_errors,
                        self.config.max_consecutive_errors,
                        e
                    );

                    if session.is_expired() {
                        continue;
                    }
                    if session.consecutive_errors >= self.config.max_consecutive_errors {
                        return Err(MonitorError::TooManyErrors {
                            attempts: session.consecutive_errors,
                            last: Box::new(e),
                        });
                    }
                    Step::after(state.clone(), state.idle_interval(&self.config))
                }
                Err(e) => return Err(e),
            };

            if step.next.name() != state.name() {
                debug!("{} -> {}", state.name(), step.next.name());
            }
            state = step.next;
            self.pause(&session, step.delay).await?;
        }
    }

    async fn step(
        &self,
        session: &mut MonitorSession,
        state: &MonitorState,
        reporter: &mut dyn Reporter,
    ) -> Result<Step> {
        match state {
            MonitorState::AwaitingTask { since, polls } => {
                self.await_task(session, *since, *polls, reporter).await
            }
            MonitorState::AwaitingStream { task, since, polls } => {
                self.await_stream(session, task, *since, *polls, reporter)
                    .await
            }
            MonitorState::Streaming { task, stream } => {
                self.stream(session, task, stream, reporter).await
            }
            MonitorState::Done(outcome) => Ok(Step::now(MonitorState::Done(outcome.clone()))),
        }
    }

    async fn await_task(
        &self,
        session: &mut MonitorSession,
        since: Instant,
        polls: u32,
        reporter: &mut dyn Reporter,
    ) -> Result<Step> {
        let limit = self.call_limit(session);
        let lookup = self
            .call(
                limit,
                self.locator
                    .find_task(&session.target.family, &session.trigger),
            )
            .await?;

        match lookup {
            TaskLookup::Matched(task) => {
                info!(
                    "Found task {} of {} ({})",
                    task.task_id, task.family, task.raw_status
                );
                reporter.notice(&format!(
                    "Task {} found, status: {}",
                    task.task_id, task.raw_status
                ));
                session.matched_task = Some(task.clone());
                Ok(Step::now(MonitorState::AwaitingStream {
                    task,
                    since: Instant::now(),
                    polls: 0,
                }))
            }
            TaskLookup::NoTasks => {
                info!("No recent tasks of {}", session.target.family);
                reporter.notice("No recent tasks found...");
                Ok(Step::now(MonitorState::Done(Outcome::Failure(
                    FailureReason::NeverScheduled {
                        family: session.target.family.clone(),
                    },
                ))))
            }
            TaskLookup::NotYetMatched { candidates } => {
                if since.elapsed() >= self.config.task_wait_limit {
                    warn!(
                        "No task of {} picked up the trigger within {:?}",
                        session.target.family, self.config.task_wait_limit
                    );
                    reporter.notice("The trigger was not picked up by any task in time");
                    return Ok(Step::now(MonitorState::Done(Outcome::Timeout)));
                }

                debug!(
                    "{} task(s) of {} but none for this trigger yet",
                    candidates, session.target.family
                );
                reporter.progress(&format!(
                    "Waiting for task to be scheduled{}",
                    dots(polls)
                ));
                Ok(Step::after(
                    MonitorState::AwaitingTask {
                        since,
                        polls: polls + 1,
                    },
                    self.config.task_poll_interval,
                ))
            }
        }
    }

    async fn await_stream(
        &self,
        session: &mut MonitorSession,
        task: &Task,
        since: Instant,
        polls: u32,
        reporter: &mut dyn Reporter,
    ) -> Result<Step> {
        let limit = self.call_limit(session);
        let target = &session.target;
        let (stream, refreshed) = tokio::join!(
            self.call(
                limit,
                self.reader
                    .find_stream(&target.log_group, &target.family, &task.task_id)
            ),
            self.call(limit, self.locator.refresh(task)),
        );
        let stream = stream?;
        let task = refreshed?.unwrap_or_else(|| task.clone());
        session.matched_task = Some(task.clone());

        if let Some(stream) = stream {
            info!("Log stream {} created for task {}", stream.name, task.task_id);
            reporter.notice(&format!("Log file created: {}", stream.name));
            return Ok(Step::now(MonitorState::Streaming { task, stream }));
        }

        if task.is_stopped() {
            // The stream may appear just as the task stops
            let limit = self.call_limit(session);
            let target = &session.target;
            let last_look = self
                .call(
                    limit,
                    self.reader
                        .find_stream(&target.log_group, &target.family, &task.task_id),
                )
                .await?;
            if let Some(stream) = last_look {
                reporter.notice(&format!("Log file created: {}", stream.name));
                return Ok(Step::now(MonitorState::Streaming { task, stream }));
            }

            warn!("Task {} stopped without producing output", task.task_id);
            reporter.task_stopped(&task);
            return Ok(Step::now(MonitorState::Done(Outcome::Failure(
                FailureReason::NoOutput {
                    task_id: task.task_id.clone(),
                    exit_code: task.exit_code,
                    reason: task.failure_reason.clone(),
                },
            ))));
        }

        if since.elapsed() >= self.config.stream_wait_limit {
            warn!(
                "Task {} created no log stream within {:?}",
                task.task_id, self.config.stream_wait_limit
            );
            reporter.notice("The task did not create its log file in time");
            return Ok(Step::now(MonitorState::Done(Outcome::Timeout)));
        }

        reporter.progress(&format!(
            "Task status: {}. Waiting for log file to be created{}",
            task.raw_status,
            dots(polls)
        ));
        Ok(Step::after(
            MonitorState::AwaitingStream {
                task,
                since,
                polls: polls + 1,
            },
            self.config.stream_poll_interval,
        ))
    }

    async fn stream(
        &self,
        session: &mut MonitorSession,
        task: &Task,
        stream: &LogStream,
        reporter: &mut dyn Reporter,
    ) -> Result<Step> {
        let limit = self.call_limit(session);
        let (page, refreshed) = tokio::join!(
            self.call(
                limit,
                self.reader.read(
                    stream,
                    session.cursor.as_ref(),
                    Some(self.config.page_limit),
                    MissingStream::Fail,
                )
            ),
            self.call(limit, self.locator.refresh(task)),
        );
        let page = page?;
        let more_available = page.more_available;
        session.absorb(stream, page, reporter);

        let task = refreshed?.unwrap_or_else(|| task.clone());
        session.matched_task = Some(task.clone());

        if task.is_stopped() {
            info!(
                "Task {} stopped ({}), reading trailing records",
                task.task_id, task.raw_status
            );
            reporter.notice("Task is stopping...");
            self.flush(session, stream, reporter).await?;
            reporter.task_stopped(&task);

            let outcome = if task.succeeded() {
                Outcome::Success
            } else {
                Outcome::Failure(FailureReason::TaskFailed {
                    task_id: task.task_id.clone(),
                    exit_code: task.exit_code,
                    reason: task.failure_reason.clone(),
                })
            };
            return Ok(Step::now(MonitorState::Done(outcome)));
        }

        if session.events_seen == 0 {
            reporter.progress("Waiting for log events...");
        }

        let delay = if more_available {
            Duration::ZERO
        } else {
            self.config.log_poll_interval
        };
        Ok(Step::after(
            MonitorState::Streaming {
                task,
                stream: stream.clone(),
            },
            delay,
        ))
    }

    /// Reads what the stream holds past the cursor once the task stopped
    async fn flush(
        &self,
        session: &mut MonitorSession,
        stream: &LogStream,
        reporter: &mut dyn Reporter,
    ) -> Result<()> {
        loop {
            let limit = self.call_limit(session);
            let page = self
                .call(
                    limit,
                    self.reader.read(
                        stream,
                        session.cursor.as_ref(),
                        Some(self.config.page_limit),
                        MissingStream::Fail,
                    ),
                )
                .await?;
            let more_available = page.more_available;
            session.absorb(stream, page, reporter);

            if !more_available {
                return Ok(());
            }
        }
    }

    fn call_limit(&self, session: &MonitorSession) -> Duration {
        self.config.call_timeout.min(session.remaining())
    }

    async fn call<T>(&self, limit: Duration, call: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => Err(MonitorError::CallTimeout(limit)),
        }
    }

    async fn pause(&self, session: &MonitorSession, delay: Duration) -> Result<()> {
        if delay.is_zero() {
            return Ok(());
        }

        let wake = (Instant::now() + delay).min(session.deadline);
        tokio::select! {
            _ = self.cancel.cancelled() => Err(MonitorError::Cancelled),
            _ = tokio::time::sleep_until(wake) => Ok(()),
        }
    }
}

fn dots(polls: u32) -> String {
    ".".repeat(polls as usize % 10 + 1)
}
