//! Pod status synthesis and change notification.
//!
//! - [`status`]: maps a pod snapshot to a single status label.
//! - [`notifier`]: turns lifecycle events into change records and hands
//!   their JSON payloads to a [`transport::Transport`].
//! - [`source`]: replays recorded events from newline-delimited JSON.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod dedup;
pub mod event;
pub mod notifier;
pub mod source;
pub mod status;
pub mod transport;
