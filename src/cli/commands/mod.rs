//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Opens the repository through [`open_session`], which applies config
//!    and the `--backend` override
//! 2. Calls into [`crate::snapshot`]
//! 3. Formats and displays output

mod help;
mod save;
mod snapshots;

pub use help::help;
pub use save::save;
pub use snapshots::snapshots;

use anyhow::{Context as _, Result};

use super::args::Command;
use super::Context;
use crate::core::config::Config;
use crate::git::{open_repository, Repository};
use crate::ui::output;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Save { message } => save(ctx, message.as_deref()),
        Command::Snapshots { json } => snapshots(ctx, json),
        Command::Help { subcommand } => help(subcommand.as_deref()),
    }
}

/// An open repository plus the fully layered configuration.
pub(crate) struct Session {
    pub repo: Box<dyn Repository>,
    pub config: Config,
}

/// Load config and open the repository containing the working directory.
///
/// Backend precedence: `--backend`, then the global `backend` key, then auto.
pub(crate) fn open_session(ctx: &Context) -> Result<Session> {
    let verbosity = ctx.verbosity();
    let cwd = ctx.cwd()?;

    let loaded = Config::load().context("failed to load configuration")?;
    for warning in &loaded.warnings {
        output::warn(
            format!("{} ({})", warning.message, warning.path.display()),
            verbosity,
        );
    }
    let config = loaded.config;
    if let Some(path) = config.global_config_loaded_from() {
        output::debug(format!("global config: {}", path.display()), verbosity);
    }

    let choice = ctx.backend.unwrap_or_else(|| config.backend_choice());
    output::debug(format!("backend choice: {}", choice), verbosity);

    let repo = open_repository(&cwd, choice, config.git_program())?;
    output::debug(
        format!(
            "opened {} with the {} backend",
            repo.work_dir().display(),
            repo.backend()
        ),
        verbosity,
    );

    let config = config
        .with_repo(repo.git_dir())
        .context("failed to load repository configuration")?;
    if let Some(path) = config.repo_config_loaded_from() {
        output::debug(format!("repo config: {}", path.display()), verbosity);
    }

    Ok(Session { repo, config })
}
