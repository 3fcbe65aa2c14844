//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output
//! - `--backend <auto|exe|libgit2>`: Git backend (overrides config)

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::git::{Backend, BackendChoice};

/// twit - an easier Git frontend
///
/// Saves snapshots of the working directory under hidden refs, without
/// touching branches, the stage or the work tree.
#[derive(Parser, Debug)]
#[command(name = "twit")]
#[command(author, version, about, long_about = None)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// Run as if twit was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Git backend to use
    #[arg(long, global = true, value_enum)]
    pub backend: Option<BackendArg>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Save a snapshot of the working directory
    #[command(long_about = "Save a snapshot of the working directory.\n\n\
        Every change, including untracked files, is committed under \
        refs/hidden/heads/twit/<branch>/<timestamp>. The current branch, the \
        stage and the work tree are left as they were, except that anything \
        staged before is unstaged.")]
    Save {
        /// Snapshot commit message
        #[arg(short, long)]
        message: Option<String>,
    },

    /// List saved snapshots, oldest first
    Snapshots {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show help for twit or one of its commands
    Help {
        /// Command to show help for
        subcommand: Option<String>,
    },
}

/// Backend names accepted by `--backend`.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendArg {
    /// libgit2 if compiled in, else the git executable
    Auto,
    /// The git executable
    Exe,
    /// In-process libgit2
    Libgit2,
}

impl From<BackendArg> for BackendChoice {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Auto => BackendChoice::Auto,
            BackendArg::Exe => BackendChoice::Exact(Backend::Exe),
            BackendArg::Libgit2 => BackendChoice::Exact(Backend::LibGit2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn save_with_message() {
        let cli = Cli::try_parse_from(["twit", "save", "-m", "before refactor"]).unwrap();
        match cli.command {
            Command::Save { message } => assert_eq!(message.as_deref(), Some("before refactor")),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "twit",
            "snapshots",
            "--json",
            "--backend",
            "exe",
            "--cwd",
            "/tmp",
            "-q",
        ])
        .unwrap();

        assert!(cli.quiet);
        assert_eq!(cli.cwd, Some(PathBuf::from("/tmp")));
        assert_eq!(cli.backend, Some(BackendArg::Exe));
        assert!(matches!(cli.command, Command::Snapshots { json: true }));
    }

    #[test]
    fn unknown_backend_rejected() {
        assert!(Cli::try_parse_from(["twit", "--backend", "svn", "save"]).is_err());
    }

    #[test]
    fn help_takes_optional_subcommand() {
        let cli = Cli::try_parse_from(["twit", "help", "save"]).unwrap();
        assert!(matches!(cli.command, Command::Help { subcommand: Some(ref s) } if s == "save"));

        let cli = Cli::try_parse_from(["twit", "help"]).unwrap();
        assert!(matches!(cli.command, Command::Help { subcommand: None }));
    }

    #[test]
    fn backend_arg_converts() {
        assert_eq!(BackendChoice::from(BackendArg::Auto), BackendChoice::Auto);
        assert_eq!(
            BackendChoice::from(BackendArg::Libgit2),
            BackendChoice::Exact(Backend::LibGit2)
        );
    }
}
