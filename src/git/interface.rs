//! git::interface
//!
//! The repository capability shared by every backend.
//!
//! # Architecture
//!
//! [`Repository`] is the one interface the rest of twit programs against.
//! Each backend translates the same semantic operation into its own
//! primitives:
//!
//! - [`crate::git::GitExe`] runs `git` plumbing commands in a subprocess
//! - [`crate::git::LibGit`] calls into libgit2 through the `git2` crate
//!
//! # Error Handling
//!
//! Backend-specific failure signals (exit codes and stderr text for the
//! executable, `git2::ErrorCode` for the library) are normalized into
//! [`GitError`], so callers can match on the same variants whichever backend
//! is active:
//! - [`GitError::ToolNotFound`]: the git executable is missing
//! - [`GitError::NotARepo`]: not inside a Git repository
//! - [`GitError::DetachedHead`]: HEAD is not a symbolic reference
//! - [`GitError::DirtyWorktree`]: work tree has changes
//! - [`GitError::InvalidRef`]: a reference does not resolve
//! - [`GitError::CommandFailed`] / [`GitError::Internal`]: everything else

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::types::{BranchName, Oid, RefName, TypeError};

/// Errors from Git operations, shared by all backends.
#[derive(Debug, Error)]
pub enum GitError {
    /// The git executable could not be found.
    #[error("{program} executable not found")]
    ToolNotFound {
        /// The program that was looked up
        program: String,
    },

    /// Not inside a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// Repository is bare (no working directory).
    #[error("bare repository not supported")]
    BareRepo,

    /// HEAD points directly at a commit instead of a branch.
    #[error("HEAD is detached")]
    DetachedHead,

    /// Working tree has uncommitted changes.
    #[error("working tree is dirty: {details}")]
    DirtyWorktree {
        /// Description of what's dirty
        details: String,
    },

    /// A reference or revision does not resolve to a commit.
    #[error("invalid reference: {refname}")]
    InvalidRef {
        /// The name that failed to resolve
        refname: String,
    },

    /// No committer identity is configured.
    #[error("user has not configured name and email")]
    MissingIdentity,

    /// The requested backend is not compiled into this build.
    #[error("backend '{backend}' is not available in this build")]
    BackendUnavailable {
        /// Name of the requested backend
        backend: String,
    },

    /// The git executable exited unsuccessfully.
    #[error("`{command}` failed ({}): {stderr}", exit_label(.code))]
    CommandFailed {
        /// The command line that failed
        command: String,
        /// Exit code, if the process exited normally
        code: Option<i32>,
        /// Captured standard error
        stderr: String,
    },

    /// Filesystem error while touching the work tree.
    #[error("cannot access {path}: {source}")]
    Io {
        /// The path being accessed
        path: PathBuf,
        /// The underlying error
        source: std::io::Error,
    },

    /// Error reported by the git library or unexpected git output.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit {code}"),
        None => "killed by signal".to_string(),
    }
}

impl From<TypeError> for GitError {
    fn from(err: TypeError) -> Self {
        GitError::Internal {
            message: err.to_string(),
        }
    }
}

/// The available backend implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Shell out to the `git` executable
    Exe,
    /// In-process libgit2 via the `git2` crate
    LibGit2,
}

impl Backend {
    /// Backends compiled into this build, preferred first.
    ///
    /// # Example
    ///
    /// ```
    /// use twit::git::Backend;
    ///
    /// assert!(Backend::all().contains(&Backend::Exe));
    /// ```
    pub fn all() -> &'static [Backend] {
        &[
            #[cfg(feature = "libgit2")]
            Backend::LibGit2,
            Backend::Exe,
        ]
    }

    /// Get the backend name as used in configuration and on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Exe => "exe",
            Backend::LibGit2 => "libgit2",
        }
    }

    /// Parse a backend from its name.
    ///
    /// # Example
    ///
    /// ```
    /// use twit::git::Backend;
    ///
    /// assert_eq!(Backend::parse("exe"), Some(Backend::Exe));
    /// assert_eq!(Backend::parse("git2"), Some(Backend::LibGit2));
    /// assert_eq!(Backend::parse("svn"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "exe" | "git" => Some(Backend::Exe),
            "libgit2" | "git2" => Some(Backend::LibGit2),
            _ => None,
        }
    }

    /// Whether this backend is compiled into the current build.
    pub fn is_available(&self) -> bool {
        Self::all().contains(self)
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A Git repository with a work tree.
///
/// All operations are synchronous and act on the repository's state at call
/// time; nothing is cached between calls.
pub trait Repository {
    /// Which backend implements this handle.
    fn backend(&self) -> Backend;

    /// Absolute path of the `.git` directory.
    fn git_dir(&self) -> &Path;

    /// Absolute path of the work tree root.
    fn work_dir(&self) -> &Path;

    /// The branch HEAD symbolically points to.
    ///
    /// Works on an unborn branch.
    ///
    /// # Errors
    ///
    /// - [`GitError::DetachedHead`] if HEAD is not a symbolic reference
    fn current_branch(&self) -> Result<BranchName, GitError>;

    /// Every reference in the repository, sorted by name.
    fn refs(&self) -> Result<Vec<RefName>, GitError>;

    /// Local branches, sorted by name.
    fn branches(&self) -> Result<Vec<BranchName>, GitError> {
        Ok(self
            .refs()?
            .iter()
            .filter_map(RefName::branch_name)
            .collect())
    }

    /// Whether there are staged, unstaged or untracked changes.
    ///
    /// Ignored files do not count.
    fn dirty(&self) -> Result<bool, GitError>;

    /// Stage every change in the work tree, including deletions and new files.
    fn stage_all(&self) -> Result<(), GitError>;

    /// Reset the index to HEAD's tree (or empty it when HEAD is unborn).
    fn unstage_all(&self) -> Result<(), GitError>;

    /// Throw away every change, tracked or not.
    fn discard_all(&self) -> Result<(), GitError>;

    /// Check out `target` when the work tree is clean.
    ///
    /// A branch name attaches HEAD to that branch; any other revision
    /// detaches HEAD at its commit.
    ///
    /// # Errors
    ///
    /// - [`GitError::DirtyWorktree`] if [`Repository::dirty`] is true
    /// - [`GitError::InvalidRef`] if `target` does not resolve to a commit
    fn safe_checkout(&self, target: &str) -> Result<(), GitError>;

    /// Commit the index.
    ///
    /// The new commit's parent is HEAD's commit, if any. `refname` is
    /// pointed at the commit; without it the branch HEAD names is updated,
    /// and on a detached HEAD no ref moves.
    ///
    /// # Errors
    ///
    /// - [`GitError::MissingIdentity`] if no committer identity is configured
    fn commit(&self, message: &str, refname: Option<&RefName>) -> Result<Oid, GitError>;
}

impl std::fmt::Debug for dyn Repository + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("backend", &self.backend())
            .field("work_dir", &self.work_dir())
            .finish()
    }
}

/// Summarize dirty paths for [`GitError::DirtyWorktree`].
pub(crate) fn describe_dirty(paths: &[String]) -> String {
    const SHOWN: usize = 3;
    let mut details = paths
        .iter()
        .take(SHOWN)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");
    if paths.len() > SHOWN {
        details.push_str(&format!(" and {} more", paths.len() - SHOWN));
    }
    details
}

/// Delete a file from the work tree, then prune parent directories it leaves
/// empty (never the work tree root itself).
///
/// A file that is already gone is not an error.
pub(crate) fn remove_worktree_file(work_dir: &Path, relative: &Path) -> Result<(), GitError> {
    let path = work_dir.join(relative);
    match std::fs::remove_file(&path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(source) => return Err(GitError::Io { path, source }),
    }

    let mut dir = path.parent();
    while let Some(current) = dir {
        if current == work_dir || !current.starts_with(work_dir) {
            break;
        }
        // Stops at the first directory that still has entries.
        if std::fs::remove_dir(current).is_err() {
            break;
        }
        dir = current.parent();
    }
    Ok(())
}
