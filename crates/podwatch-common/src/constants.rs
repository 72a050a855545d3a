//! System-wide constants: well-known status labels and defaults.

/// Binary name for the CLI.
pub const BIN_NAME: &str = "podwatch";

/// Waiting reason reported by init containers that are merely queued.
///
/// It carries no diagnostic value, so the synthesizer reports the
/// `Init:<index>/<total>` progress label instead.
pub const POD_INITIALIZING: &str = "PodInitializing";

/// Label a pod gets once its deletion has been requested.
pub const STATUS_TERMINATING: &str = "Terminating";

/// Reason reported by containers that exited cleanly.
pub const STATUS_COMPLETED: &str = "Completed";

/// Label for a pod with a running container and a true `Ready` condition.
pub const STATUS_RUNNING: &str = "Running";

/// Label for a pod with a running container but no true `Ready` condition.
pub const STATUS_NOT_READY: &str = "NotReady";

/// Fixed label carried by every delete notification.
pub const STATUS_DELETED: &str = "deleted";

/// Name of the pod readiness condition.
pub const CONDITION_READY: &str = "Ready";

/// Default number of pods tracked by the last-label cache.
pub const DEFAULT_DEDUP_CAPACITY: usize = 4096;
