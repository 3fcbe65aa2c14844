//! cli
//!
//! Command-line interface layer for twit.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Build the execution [`Context`]
//! - Delegate to command handlers
//!
//! Handlers never talk to a backend type directly; they open a
//! [`crate::git::Repository`] through the factory and call the
//! [`crate::snapshot`] functions on it.

pub mod args;
pub mod commands;

pub use args::{BackendArg, Cli, Command};

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use thiserror::Error;

use crate::git::BackendChoice;
use crate::ui::output::Verbosity;

/// Execution context for commands.
///
/// Contains global settings derived from CLI flags.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Working directory override.
    pub cwd: Option<PathBuf>,
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
    /// Backend forced on the command line, overriding config.
    pub backend: Option<BackendChoice>,
}

impl Context {
    /// Output verbosity for this invocation.
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }

    /// The directory commands operate in.
    pub fn cwd(&self) -> Result<PathBuf> {
        match &self.cwd {
            Some(path) => Ok(path.clone()),
            None => std::env::current_dir().context("failed to determine current directory"),
        }
    }
}

/// A failure that has already been reported to the user.
///
/// `main` exits with the carried status without printing anything else.
#[derive(Debug, Error)]
#[error("exit status {0}")]
pub struct SilentExit(pub i32);

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let ctx = Context {
        cwd: cli.cwd.clone(),
        debug: cli.debug,
        quiet: cli.quiet,
        backend: cli.backend.map(BackendChoice::from),
    };

    commands::dispatch(cli.command, &ctx)
}
