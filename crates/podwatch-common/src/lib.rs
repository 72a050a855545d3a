//! # podwatch-common
//!
//! Shared pod snapshot types, change records, error definitions,
//! configuration models, and constants used across the podwatch workspace.
//!
//! This crate is the leaf of the dependency graph: it depends on no other
//! internal crate and provides the data model that the status synthesizer
//! and change notifier operate on.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
