//! Inbound pod lifecycle events.
//!
//! Each variant carries typed snapshots, so a handler can never be handed
//! something that is not a pod. Shape checks happen once, where raw input
//! is decoded (see [`crate::source`]).

use std::fmt;

use podwatch_common::types::PodSnapshot;
use serde::{Deserialize, Serialize};

/// A lifecycle event delivered by the snapshot source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PodEvent {
    /// A pod appeared.
    Add {
        /// The pod as first observed.
        object: PodSnapshot,
    },
    /// A pod changed.
    Update {
        /// The previously observed snapshot.
        old: PodSnapshot,
        /// The newly observed snapshot.
        new: PodSnapshot,
    },
    /// A pod was removed.
    Delete {
        /// The last observed snapshot.
        object: PodSnapshot,
    },
}

impl PodEvent {
    /// Returns the most recent snapshot carried by the event.
    #[must_use]
    pub const fn current(&self) -> &PodSnapshot {
        match self {
            Self::Add { object } | Self::Delete { object } => object,
            Self::Update { new, .. } => new,
        }
    }

    /// Returns the lowercase event kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
        }
    }
}

/// Which side of an event a snapshot came from, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotContext {
    /// The incoming snapshot.
    New,
    /// The replaced snapshot of an update.
    Old,
}

impl fmt::Display for SnapshotContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New => write!(f, "NEW"),
            Self::Old => write!(f, "OLD"),
        }
    }
}

#[cfg(test)]
mod tests {
    use podwatch_common::types::PodPhase;

    use super::*;

    #[test]
    fn update_current_is_new_snapshot() {
        let event = PodEvent::Update {
            old: PodSnapshot::new("a", "ns", PodPhase::Pending),
            new: PodSnapshot::new("a", "ns", PodPhase::Running),
        };
        assert_eq!(event.current().phase, PodPhase::Running);
        assert_eq!(event.kind(), "update");
    }

    #[test]
    fn event_json_is_tagged_by_type() {
        let event: PodEvent =
            serde_json::from_str(r#"{"type": "delete", "object": {"name": "a", "namespace": "ns"}}"#)
                .unwrap();
        assert_eq!(event.kind(), "delete");
        assert_eq!(event.current().name, "a");
    }
}
