//! Data Transfer Objects for the node gateway API
//!
//! The gateway fronts the three external systems a node depends on: the
//! webhook that triggers runs, the task scheduler and the log store. DTOs
//! mirror its JSON payloads; the monitor turns them into domain types.

pub mod log;
pub mod task;
pub mod trigger;
