//! Core domain types
//!
//! These types describe what the monitor observes about a prediction node:
//! the trigger that started a run, the scheduled task executing it, the log
//! stream it writes to, and the final verdict of a monitoring session.
//! None of them are created by nodewatch itself except `Trigger` and `Outcome`.

pub mod log;
pub mod outcome;
pub mod task;
pub mod trigger;
