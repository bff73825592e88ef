//! Task state classification
//!
//! Schedulers describe task progress in their own vocabulary and at their own
//! granularity. Classifiers collapse it into the three canonical lifecycle
//! states so the monitor's decisions never depend on a backend's wording.
//! Supporting a new backend means adding a classifier here, nothing else.

use nodewatch_core::domain::task::LifecycleState;

/// Maps raw scheduler status strings to lifecycle states
pub trait StatusClassifier: Send + Sync {
    /// Short name of the backend vocabulary, for diagnostics
    fn name(&self) -> &'static str;

    /// Classifies a raw status string
    ///
    /// Unknown strings classify as `Pending`: the task exists but nothing
    /// proves it has started or finished, and the session deadline bounds
    /// how long that can last.
    fn classify(&self, raw_status: &str) -> LifecycleState;
}

/// ECS-style task statuses
///
/// Every status on the way down (`DEACTIVATING`, `STOPPING`,
/// `DEPROVISIONING`) already means the container is no longer running.
#[derive(Debug, Clone, Copy, Default)]
pub struct EcsClassifier;

impl StatusClassifier for EcsClassifier {
    fn name(&self) -> &'static str {
        "ecs"
    }

    fn classify(&self, raw_status: &str) -> LifecycleState {
        match raw_status.trim().to_ascii_uppercase().as_str() {
            "PROVISIONING" | "PENDING" | "ACTIVATING" => LifecycleState::Pending,
            "RUNNING" => LifecycleState::Running,
            "DEACTIVATING" | "STOPPING" | "DEPROVISIONING" | "STOPPED" | "DELETED" => {
                LifecycleState::Stopped
            }
            other => {
                tracing::warn!("Unknown ECS task status '{}', treating as pending", other);
                LifecycleState::Pending
            }
        }
    }
}

/// Container-group statuses (Azure container instances, Cloud Run jobs)
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainerGroupClassifier;

impl StatusClassifier for ContainerGroupClassifier {
    fn name(&self) -> &'static str {
        "container-group"
    }

    fn classify(&self, raw_status: &str) -> LifecycleState {
        match raw_status.trim().to_ascii_lowercase().as_str() {
            "pending" | "waiting" | "creating" | "accepted" | "queued" => LifecycleState::Pending,
            "running" | "repairing" => LifecycleState::Running,
            "succeeded" | "failed" | "terminated" | "stopped" | "cancelled" => {
                LifecycleState::Stopped
            }
            other => {
                tracing::warn!(
                    "Unknown container group status '{}', treating as pending",
                    other
                );
                LifecycleState::Pending
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ecs_vocabulary() {
        let classifier = EcsClassifier;
        assert_eq!(classifier.classify("PROVISIONING"), LifecycleState::Pending);
        assert_eq!(classifier.classify("PENDING"), LifecycleState::Pending);
        assert_eq!(classifier.classify("ACTIVATING"), LifecycleState::Pending);
        assert_eq!(classifier.classify("RUNNING"), LifecycleState::Running);
        assert_eq!(classifier.classify("STOPPED"), LifecycleState::Stopped);
    }

    #[test]
    fn test_ecs_transitional_stop_states_are_not_running() {
        let classifier = EcsClassifier;
        for raw in ["DEACTIVATING", "STOPPING", "DEPROVISIONING"] {
            assert_eq!(classifier.classify(raw), LifecycleState::Stopped, "{}", raw);
        }
    }

    #[test]
    fn test_container_group_vocabulary() {
        let classifier = ContainerGroupClassifier;
        assert_eq!(classifier.classify("Waiting"), LifecycleState::Pending);
        assert_eq!(classifier.classify("Running"), LifecycleState::Running);
        assert_eq!(classifier.classify("Succeeded"), LifecycleState::Stopped);
        assert_eq!(classifier.classify("Terminated"), LifecycleState::Stopped);
    }

    #[test]
    fn test_unknown_status_keeps_polling() {
        assert_eq!(EcsClassifier.classify("WHATEVER"), LifecycleState::Pending);
        assert_eq!(
            ContainerGroupClassifier.classify("Unknown"),
            LifecycleState::Pending
        );
    }
}
