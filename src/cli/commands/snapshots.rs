//! snapshots command - List saved snapshots

use super::open_session;
use crate::cli::Context;
use crate::snapshot;
use crate::ui::output;
use anyhow::{Context as _, Result};

/// List snapshots, oldest first.
///
/// With `json`, prints a JSON array regardless of `--quiet`.
pub fn snapshots(ctx: &Context, json: bool) -> Result<()> {
    let verbosity = ctx.verbosity();
    let session = open_session(ctx)?;

    let found = snapshot::snapshots(session.repo.as_ref()).context("failed to list snapshots")?;
    output::debug(format!("{} snapshot(s)", found.len()), verbosity);

    if json {
        output::json(&found)?;
    } else if found.is_empty() {
        output::print("No snapshots.", verbosity);
    } else {
        output::print(output::format_list(&found, ""), verbosity);
    }

    Ok(())
}
