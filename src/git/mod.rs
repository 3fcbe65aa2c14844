//! git
//!
//! Single interface for all Git operations, with two interchangeable
//! backends.
//!
//! # Architecture
//!
//! This module is the only doorway to Git. The rest of twit programs against
//! the [`Repository`] trait; no other module spawns `git` or imports `git2`.
//!
//! - [`GitExe`] shells out to the git executable's plumbing commands
//! - [`LibGit`] talks to libgit2 in-process (cargo feature `libgit2`)
//! - [`open_repository`] picks one according to a [`BackendChoice`]
//!
//! # Invariants
//!
//! - Both backends report failures through the same [`GitError`] variants
//! - All names crossing the boundary are validated (`BranchName`, `RefName`, `Oid`)
//! - Nothing is cached: every call observes the repository as it is now
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use twit::git::{open_repository, BackendChoice, Repository, DEFAULT_PROGRAM};
//!
//! let repo = open_repository(Path::new("."), BackendChoice::Auto, DEFAULT_PROGRAM)?;
//! if repo.dirty()? {
//!     repo.stage_all()?;
//! }
//! # Ok::<(), twit::git::GitError>(())
//! ```

pub mod exe;
mod factory;
mod interface;
#[cfg(feature = "libgit2")]
mod libgit;

pub use exe::{GitExe, StatusEntry, DEFAULT_PROGRAM};
pub use factory::{open_repository, BackendChoice};
pub use interface::{Backend, GitError, Repository};
#[cfg(feature = "libgit2")]
pub use libgit::LibGit;
