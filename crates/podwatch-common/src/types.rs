//! Pod snapshot and change record types.
//!
//! The snapshot types are a flattened view of the fields of a cluster pod
//! object that status synthesis reads. Name, namespace, phase, and the
//! container status lists sit side by side at the top level, and conditions
//! are a map from condition type to a boolean. Field names are camelCase,
//! and container states keep the one-key-per-state form (`{"running": {}}`).

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coarse lifecycle stage reported by the control plane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PodPhase {
    /// Accepted but not all containers have been created.
    #[default]
    Pending,
    /// Bound to a node with at least one container running.
    Running,
    /// All containers terminated successfully.
    Succeeded,
    /// All containers terminated, at least one in failure.
    Failed,
    /// The pod state could not be obtained.
    Unknown,
}

impl PodPhase {
    /// Returns the phase name as reported by the control plane.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Running => "Running",
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
            Self::Unknown => "Unknown",
        }
    }

    /// Returns `true` for `Succeeded` and `Failed`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl fmt::Display for PodPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of a single container. Exactly one variant is populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContainerState {
    /// The container is not yet running.
    #[serde(rename_all = "camelCase")]
    Waiting {
        /// Why the container is waiting (e.g. `CrashLoopBackOff`).
        #[serde(default)]
        reason: Option<String>,
    },
    /// The container is executing.
    #[serde(rename_all = "camelCase")]
    Running {
        /// When the container last started.
        #[serde(default)]
        started_at: Option<DateTime<Utc>>,
    },
    /// The container exited.
    #[serde(rename_all = "camelCase")]
    Terminated {
        /// Exit status of the last termination.
        exit_code: i32,
        /// Short reason for the termination (e.g. `OOMKilled`).
        #[serde(default)]
        reason: Option<String>,
        /// Signal that killed the container, `0` if none.
        #[serde(default)]
        signal: i32,
    },
}

impl ContainerState {
    /// A waiting state with the given reason.
    #[must_use]
    pub fn waiting(reason: impl Into<String>) -> Self {
        Self::Waiting {
            reason: Some(reason.into()),
        }
    }

    /// A running state without a start time.
    #[must_use]
    pub const fn running() -> Self {
        Self::Running { started_at: None }
    }
}

/// Status of one container or init container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerStatus {
    /// Container name, unique within the pod.
    pub name: String,
    /// Whether the container passed its readiness probe.
    #[serde(default)]
    pub ready: bool,
    /// Number of times the container has been restarted.
    #[serde(default)]
    pub restart_count: u32,
    /// Current state.
    pub state: ContainerState,
}

impl ContainerStatus {
    /// Creates a not-ready status with zero restarts.
    #[must_use]
    pub fn new(name: impl Into<String>, state: ContainerState) -> Self {
        Self {
            name: name.into(),
            ready: false,
            restart_count: 0,
            state,
        }
    }

    /// Returns `true` if the container reports `Running`.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self.state, ContainerState::Running { .. })
    }
}

/// Full observed state of a pod at one instant.
///
/// Phase and container states may disagree with each other; consumers
/// must resolve that rather than reject the snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodSnapshot {
    /// Pod name.
    pub name: String,
    /// Namespace the pod lives in.
    pub namespace: String,
    /// Phase reported by the control plane.
    #[serde(default)]
    pub phase: PodPhase,
    /// Top-level reason (e.g. `Evicted`), if any.
    #[serde(default)]
    pub reason: Option<String>,
    /// Init container statuses, in declaration order.
    #[serde(default)]
    pub init_container_statuses: Vec<ContainerStatus>,
    /// Main container statuses, in declaration order.
    #[serde(default)]
    pub container_statuses: Vec<ContainerStatus>,
    /// Pod conditions, by type.
    #[serde(default)]
    pub conditions: BTreeMap<String, bool>,
    /// Set once the pod has been scheduled for removal.
    #[serde(default)]
    pub deletion_timestamp: Option<DateTime<Utc>>,
}

impl PodSnapshot {
    /// Creates an empty snapshot in the given phase.
    #[must_use]
    pub fn new(name: impl Into<String>, namespace: impl Into<String>, phase: PodPhase) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            phase,
            ..Self::default()
        }
    }

    /// Returns `true` if the named condition is present and true.
    #[must_use]
    pub fn has_condition(&self, condition: &str) -> bool {
        self.conditions.get(condition).copied().unwrap_or(false)
    }

    /// Returns `true` once deletion has been requested.
    #[must_use]
    pub const fn is_terminating(&self) -> bool {
        self.deletion_timestamp.is_some()
    }
}

/// Discriminant of an emitted change record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// The pod was created or, by default, updated.
    Add,
    /// The pod changed. Only emitted when explicitly configured.
    Update,
    /// The pod was removed.
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => write!(f, "add"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// The flat notification emitted downstream for each lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// What happened to the pod.
    pub action: Action,
    /// Pod name.
    pub name: String,
    /// Pod namespace.
    pub namespace: String,
    /// Synthesized status label.
    pub status: String,
}

impl ChangeRecord {
    /// Builds a record for the given pod identity.
    #[must_use]
    pub fn new(
        action: Action,
        name: impl Into<String>,
        namespace: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            action,
            name: name.into(),
            namespace: namespace.into(),
            status: status.into(),
        }
    }

    /// Encodes the record as the UTF-8 JSON payload handed to transports.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_payload(&self) -> crate::error::Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

impl fmt::Display for ChangeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}/{} {}",
            self.action, self.namespace, self.name, self.status
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_deserializes_from_flattened_json() {
        let json = r#"{
            "name": "web-0",
            "namespace": "prod",
            "phase": "Running",
            "initContainerStatuses": [
                {"name": "migrate", "restartCount": 1,
                 "state": {"terminated": {"exitCode": 0, "reason": "Completed"}}}
            ],
            "containerStatuses": [
                {"name": "app", "ready": true, "state": {"running": {}}},
                {"name": "sidecar", "state": {"waiting": {"reason": "ContainerCreating"}}}
            ],
            "conditions": {"Ready": false},
            "deletionTimestamp": "2024-05-01T10:00:00Z"
        }"#;

        let pod: PodSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(pod.phase, PodPhase::Running);
        assert_eq!(pod.init_container_statuses[0].restart_count, 1);
        assert_eq!(
            pod.init_container_statuses[0].state,
            ContainerState::Terminated {
                exit_code: 0,
                reason: Some("Completed".into()),
                signal: 0,
            }
        );
        assert!(pod.container_statuses[0].is_running());
        assert_eq!(
            pod.container_statuses[1].state,
            ContainerState::waiting("ContainerCreating")
        );
        assert!(!pod.has_condition("Ready"));
        assert!(pod.is_terminating());
    }

    #[test]
    fn snapshot_defaults_missing_collections() {
        let pod: PodSnapshot =
            serde_json::from_str(r#"{"name": "a", "namespace": "b"}"#).unwrap();
        assert_eq!(pod.phase, PodPhase::Pending);
        assert!(pod.container_statuses.is_empty());
        assert!(pod.conditions.is_empty());
        assert!(!pod.is_terminating());
    }

    #[test]
    fn container_state_with_two_keys_is_rejected() {
        let json = r#"{"name": "c", "state": {"running": {}, "waiting": {}}}"#;
        assert!(serde_json::from_str::<ContainerStatus>(json).is_err());
    }

    #[test]
    fn change_record_payload_is_flat_json() {
        let record = ChangeRecord::new(Action::Add, "web-0", "prod", "Running");
        let payload = record.to_payload().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&payload).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "action": "add",
                "name": "web-0",
                "namespace": "prod",
                "status": "Running",
            })
        );
    }

    #[test]
    fn phase_display_matches_api_name() {
        assert_eq!(PodPhase::Succeeded.to_string(), "Succeeded");
        assert!(PodPhase::Failed.is_terminal());
        assert!(!PodPhase::Unknown.is_terminal());
    }

    #[test]
    fn change_record_display_is_human_readable() {
        let record = ChangeRecord::new(Action::Delete, "web-0", "prod", "deleted");
        assert_eq!(record.to_string(), "delete prod/web-0 deleted");
    }
}
