//! Replay source for recorded pod events.
//!
//! Reads newline-delimited JSON, one event per line:
//!
//! ```text
//! {"type": "add", "object": {...}}
//! {"type": "update", "old": {...}, "new": {...}}
//! {"type": "delete", "object": {...}}
//! ```
//!
//! A line that does not decode into a [`PodEvent`] is a contract
//! violation. The caller decides whether that ends the replay.

use std::io::BufRead;

use podwatch_common::error::{PodwatchError, Result};

use crate::event::PodEvent;

/// Decodes one event line. `line_no` is 1-based and used for diagnostics.
///
/// # Errors
///
/// Returns [`PodwatchError::ContractViolation`] if the line is not a
/// well-formed pod event, including when it is not valid UTF-8.
pub fn parse_event_line(line_no: usize, line: impl AsRef<[u8]>) -> Result<PodEvent> {
    serde_json::from_slice(line.as_ref()).map_err(|e| PodwatchError::ContractViolation {
        context: format!("line {line_no}"),
        message: e.to_string(),
    })
}

/// Iterates over the events of a reader, skipping blank lines.
///
/// Lines are split on raw bytes so that undecodable content is reported
/// per line instead of ending the stream. Events are yielded in input order.
pub fn read_events<R: BufRead>(reader: R) -> impl Iterator<Item = Result<PodEvent>> {
    reader
        .split(b'\n')
        .enumerate()
        .filter_map(|(idx, line)| match line {
            Ok(line) if line.trim_ascii().is_empty() => None,
            Ok(line) => Some(parse_event_line(idx + 1, line.trim_ascii_end())),
            Err(e) => Some(Err(PodwatchError::Read {
                line: idx + 1,
                source: e,
            })),
        })
}
