//! `podwatch status` — Show the synthesized status of one pod snapshot.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use podwatch_common::types::PodSnapshot;
use podwatch_core::status::summarize;

use crate::output;

/// Arguments for the `status` command.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Path to a JSON pod snapshot.
    pub file: PathBuf,

    /// Omit the column header.
    #[arg(long)]
    pub no_headers: bool,
}

/// Executes the `status` command.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be read or decoded.
pub fn execute(args: &StatusArgs) -> anyhow::Result<()> {
    let pod = load_snapshot(&args.file)?;
    let summary = summarize(&pod);

    if !args.no_headers {
        println!("{}", output::status_header());
    }
    println!("{}", output::status_row(&pod, &summary));
    Ok(())
}

fn load_snapshot(path: &Path) -> anyhow::Result<PodSnapshot> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read snapshot: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("{} is not a pod snapshot", path.display()))
}
