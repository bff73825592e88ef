//! Repository layer
//!
//! Repositories are stateless adapters over the three external systems the
//! monitor observes: the webhook, the task scheduler and the log store. They
//! return raw backend payloads without any interpretation.
//!
//! All repositories are trait-based to enable testing and mocking; the node
//! gateway client implements all three.

mod logs;
mod tasks;
mod triggers;

// Re-export traits
pub use logs::LogRepository;
pub use tasks::TaskRepository;
pub use triggers::TriggerRepository;
