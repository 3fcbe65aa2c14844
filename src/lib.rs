//! twit - an easier Git frontend
//!
//! twit saves snapshots of the working directory as commits under hidden
//! refs (`refs/hidden/heads/twit/<branch>/<timestamp>`), leaving branches,
//! the stage and the work tree alone.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, dispatches commands)
//! - [`snapshot`] - Snapshot naming, saving and listing
//! - [`git`] - The [`git::Repository`] interface and its two backends:
//!   the git executable and in-process libgit2
//! - [`core`] - Domain types and configuration
//! - [`ui`] - Output and verbosity
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use twit::git::{open_repository, BackendChoice, DEFAULT_PROGRAM};
//!
//! let repo = open_repository(Path::new("."), BackendChoice::Auto, DEFAULT_PROGRAM)?;
//! let saved = twit::snapshot::save(repo.as_ref(), twit::snapshot::DEFAULT_MESSAGE)?;
//! println!("{}", saved.snapshot.refname);
//! # Ok::<(), twit::git::GitError>(())
//! ```

pub mod cli;
pub mod core;
pub mod git;
pub mod snapshot;
pub mod ui;
