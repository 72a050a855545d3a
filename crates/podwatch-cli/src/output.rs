//! Formatted output helpers for CLI commands.

use podwatch_common::types::PodSnapshot;
use podwatch_core::status::StatusSummary;

/// Column header matching [`status_row`].
#[must_use]
pub fn status_header() -> String {
    format!(
        "{:<40} {:<20} {:<24} {:<7} {:<8}",
        "NAME", "NAMESPACE", "STATUS", "READY", "RESTARTS"
    )
}

/// Formats one pod as a table row.
#[must_use]
pub fn status_row(pod: &PodSnapshot, summary: &StatusSummary) -> String {
    let ready = format!("{}/{}", summary.ready_containers, summary.total_containers);
    format!(
        "{:<40} {:<20} {:<24} {:<7} {:<8}",
        pod.name, pod.namespace, summary.label, ready, summary.restarts
    )
}

#[cfg(test)]
mod tests {
    use podwatch_common::types::PodPhase;

    use super::*;

    #[test]
    fn status_row_aligns_with_header() {
        let pod = PodSnapshot::new("web-0", "prod", PodPhase::Running);
        let summary = StatusSummary {
            label: "CrashLoopBackOff".into(),
            ready_containers: 1,
            total_containers: 2,
            restarts: 7,
        };
        let row = status_row(&pod, &summary);
        let header = status_header();
        assert_eq!(row.find("CrashLoopBackOff"), header.find("STATUS"));
        assert_eq!(row.find("1/2"), header.find("READY"));
        assert!(row.trim_end().ends_with('7'));
    }
}
