//! Status synthesis: one pod snapshot in, one human-readable label out.
//!
//! The label answers "what is blocking this pod right now" rather than
//! "what phase does the control plane report". Resolution runs in a fixed
//! priority order:
//!
//! 1. Baseline: the top-level reason, or the phase name.
//! 2. Init containers, in declaration order. The first one that has not
//!    completed cleanly decides the label and stops the scan.
//! 3. Main containers, in reverse declaration order, only when no init
//!    container is blocking. Every container is visited, so the
//!    first-declared container with a waiting or terminated reason wins.
//! 4. Deletion always overrides everything else.
//!
//! Synthesis never fails: inconsistent snapshots (phase `Running` with a
//! terminated container, for instance) still resolve to a label.

use std::fmt;

use podwatch_common::constants::{
    CONDITION_READY, POD_INITIALIZING, STATUS_COMPLETED, STATUS_NOT_READY, STATUS_RUNNING,
    STATUS_TERMINATING,
};
use podwatch_common::types::{ContainerState, ContainerStatus, PodPhase, PodSnapshot};

/// Synthesized status of a pod, with the counters gathered on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSummary {
    /// The status label, never empty.
    pub label: String,
    /// Main containers that are ready and running.
    pub ready_containers: usize,
    /// Number of main container statuses in the snapshot.
    pub total_containers: usize,
    /// Restart count of the containers that decided the label.
    ///
    /// Holds the init container sum while initialization is blocked,
    /// otherwise the main container sum.
    pub restarts: u64,
}

impl fmt::Display for StatusSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}/{} {}",
            self.label, self.ready_containers, self.total_containers, self.restarts
        )
    }
}

/// Returns the status label for a pod snapshot.
#[must_use]
pub fn synthesize(pod: &PodSnapshot) -> String {
    summarize(pod).label
}

/// Runs status synthesis and returns the label along with its counters.
#[must_use]
pub fn summarize(pod: &PodSnapshot) -> StatusSummary {
    let mut label = baseline(pod);
    log_terminal_phase(pod.phase);

    let init = scan_init_containers(&pod.init_container_statuses);
    let mut restarts = init.restarts;
    let mut ready_containers = 0;

    if let Some(blocked) = init.blocked {
        label = blocked;
    } else {
        let main = scan_main_containers(&pod.container_statuses);
        restarts = main.restarts;
        ready_containers = main.ready;
        if let Some(decided) = main.label {
            label = decided;
        }
        if label == STATUS_COMPLETED && main.ready > 0 {
            label = if pod.has_condition(CONDITION_READY) {
                STATUS_RUNNING.to_string()
            } else {
                STATUS_NOT_READY.to_string()
            };
        }
    }

    if pod.is_terminating() {
        label = STATUS_TERMINATING.to_string();
    }

    StatusSummary {
        label,
        ready_containers,
        total_containers: pod.container_statuses.len(),
        restarts,
    }
}

fn baseline(pod: &PodSnapshot) -> String {
    non_empty(pod.reason.as_ref()).map_or_else(|| pod.phase.to_string(), str::to_string)
}

fn log_terminal_phase(phase: PodPhase) {
    match phase {
        PodPhase::Succeeded => tracing::debug!(
            reason = %phase,
            message = "The pod has completed successfully.",
            "pod completed"
        ),
        PodPhase::Failed => tracing::debug!(
            reason = %phase,
            message = "The pod failed.",
            "pod completed"
        ),
        PodPhase::Pending | PodPhase::Running | PodPhase::Unknown => {}
    }
}

fn non_empty(reason: Option<&String>) -> Option<&str> {
    reason.map(String::as_str).filter(|r| !r.is_empty())
}

// ── Init containers ──────────────────────────────────────────────────

/// Outcome of one init container rule.
enum InitVerdict {
    /// Completed cleanly, move on to the next init container.
    Completed,
    /// Initialization is blocked with this label; stop scanning.
    Blocked(String),
}

/// An init container rule: container, its index, and the init container count.
type InitRule = fn(&ContainerStatus, usize, usize) -> Option<InitVerdict>;

/// Evaluated in order; the first rule that matches decides.
const INIT_RULES: &[InitRule] = &[
    init_exited_cleanly,
    init_exited_with_error,
    init_waiting_with_reason,
    init_in_progress,
];

fn init_exited_cleanly(c: &ContainerStatus, _: usize, _: usize) -> Option<InitVerdict> {
    matches!(c.state, ContainerState::Terminated { exit_code: 0, .. })
        .then_some(InitVerdict::Completed)
}

fn init_exited_with_error(c: &ContainerStatus, _: usize, _: usize) -> Option<InitVerdict> {
    let ContainerState::Terminated {
        exit_code,
        reason,
        signal,
    } = &c.state
    else {
        return None;
    };
    let label = match non_empty(reason.as_ref()) {
        Some(reason) => format!("Init:{reason}"),
        None if *signal != 0 => format!("Init:Signal:{signal}"),
        None => format!("Init:ExitCode:{exit_code}"),
    };
    Some(InitVerdict::Blocked(label))
}

fn init_waiting_with_reason(c: &ContainerStatus, _: usize, _: usize) -> Option<InitVerdict> {
    let ContainerState::Waiting { reason } = &c.state else {
        return None;
    };
    non_empty(reason.as_ref())
        .filter(|r| *r != POD_INITIALIZING)
        .map(|r| InitVerdict::Blocked(format!("Init:{r}")))
}

fn init_in_progress(_: &ContainerStatus, index: usize, total: usize) -> Option<InitVerdict> {
    Some(InitVerdict::Blocked(format!("Init:{index}/{total}")))
}

struct InitScan {
    blocked: Option<String>,
    restarts: u64,
}

fn scan_init_containers(statuses: &[ContainerStatus]) -> InitScan {
    let total = statuses.len();
    let mut restarts = 0;
    for (index, container) in statuses.iter().enumerate() {
        restarts += u64::from(container.restart_count);
        let verdict = INIT_RULES
            .iter()
            .find_map(|rule| rule(container, index, total));
        if let Some(InitVerdict::Blocked(label)) = verdict {
            tracing::trace!(container = %container.name, %label, "init container blocking");
            return InitScan {
                blocked: Some(label),
                restarts,
            };
        }
    }
    InitScan {
        blocked: None,
        restarts,
    }
}

// ── Main containers ──────────────────────────────────────────────────

/// Outcome of one main container rule.
enum MainVerdict {
    /// The container proposes this label.
    Label(String),
    /// The container is ready and running; the label is left alone.
    ReadyRunning,
}

type MainRule = fn(&ContainerStatus) -> Option<MainVerdict>;

/// Evaluated in order per container; the first rule that matches decides.
const MAIN_RULES: &[MainRule] = &[
    main_waiting_with_reason,
    main_terminated_with_reason,
    main_terminated_without_reason,
    main_ready_running,
];

fn main_waiting_with_reason(c: &ContainerStatus) -> Option<MainVerdict> {
    let ContainerState::Waiting { reason } = &c.state else {
        return None;
    };
    non_empty(reason.as_ref()).map(|r| MainVerdict::Label(r.to_string()))
}

fn main_terminated_with_reason(c: &ContainerStatus) -> Option<MainVerdict> {
    let ContainerState::Terminated { reason, .. } = &c.state else {
        return None;
    };
    non_empty(reason.as_ref()).map(|r| MainVerdict::Label(r.to_string()))
}

fn main_terminated_without_reason(c: &ContainerStatus) -> Option<MainVerdict> {
    let ContainerState::Terminated {
        exit_code, signal, ..
    } = &c.state
    else {
        return None;
    };
    let label = if *signal != 0 {
        format!("Signal:{signal}")
    } else {
        format!("ExitCode:{exit_code}")
    };
    Some(MainVerdict::Label(label))
}

fn main_ready_running(c: &ContainerStatus) -> Option<MainVerdict> {
    (c.ready && c.is_running()).then_some(MainVerdict::ReadyRunning)
}

struct MainScan {
    label: Option<String>,
    ready: usize,
    restarts: u64,
}

fn scan_main_containers(statuses: &[ContainerStatus]) -> MainScan {
    let mut scan = MainScan {
        label: None,
        ready: 0,
        restarts: 0,
    };
    for container in statuses.iter().rev() {
        scan.restarts += u64::from(container.restart_count);
        match MAIN_RULES.iter().find_map(|rule| rule(container)) {
            Some(MainVerdict::Label(label)) => scan.label = Some(label),
            Some(MainVerdict::ReadyRunning) => scan.ready += 1,
            None => {}
        }
    }
    scan
}
