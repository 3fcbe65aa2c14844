//! save command - Snapshot the working directory

use super::open_session;
use crate::cli::Context;
use crate::snapshot;
use crate::ui::output;
use anyhow::{Context as _, Result};

/// Save a snapshot.
///
/// # Arguments
///
/// * `ctx` - Execution context
/// * `message` - Commit message; falls back to config, then the default
pub fn save(ctx: &Context, message: Option<&str>) -> Result<()> {
    let verbosity = ctx.verbosity();
    let session = open_session(ctx)?;

    let message = message.unwrap_or_else(|| session.config.snapshot_message());
    let saved = snapshot::save(session.repo.as_ref(), message)
        .context("failed to save snapshot")?;

    output::debug(
        format!("{} -> {}", saved.snapshot.refname, saved.commit),
        verbosity,
    );
    output::print("Snapshot saved.", verbosity);
    Ok(())
}
