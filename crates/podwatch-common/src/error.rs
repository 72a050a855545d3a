//! Unified error types for the podwatch workspace.
//!
//! None of these describe an ambiguous pod snapshot: status synthesis
//! never fails. They cover the boundaries around it, namely malformed
//! inbound events, payload encoding, and configuration loading.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum PodwatchError {
    /// An inbound event did not have the pod snapshot shape.
    ///
    /// This is a breach of the snapshot source contract. The hosting
    /// process decides whether to abort or skip the event, but it must
    /// never be retried.
    #[error("contract violation in {context}: {message}")]
    ContractViolation {
        /// Where the malformed event was observed (e.g. `line 3`).
        context: String,
        /// Description of the shape mismatch.
        message: String,
    },

    /// A change record could not be encoded.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },

    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Reading an event stream failed.
    #[error("read error at line {line}: {source}")]
    Read {
        /// 1-based line being read when the failure occurred.
        line: usize,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },
}

impl PodwatchError {
    /// Returns `true` if this error is an inbound contract violation.
    #[must_use]
    pub const fn is_contract_violation(&self) -> bool {
        matches!(self, Self::ContractViolation { .. })
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, PodwatchError>;
