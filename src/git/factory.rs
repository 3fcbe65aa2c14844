//! git::factory
//!
//! Backend selection and repository opening.
//!
//! Commands call [`open_repository`] instead of naming a backend type, so the
//! choice between the executable and the library stays in one place.
//!
//! # Selection
//!
//! - [`BackendChoice::Auto`] picks libgit2 when it is compiled in (the default
//!   `libgit2` cargo feature) and falls back to the git executable otherwise.
//! - [`BackendChoice::Exact`] forces a backend; asking for one that is not
//!   compiled in is a [`GitError::BackendUnavailable`] error.

use std::path::Path;

use super::exe::GitExe;
use super::interface::{Backend, GitError, Repository};
#[cfg(feature = "libgit2")]
use super::libgit::LibGit;

/// Which backend to use when opening a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendChoice {
    /// Best backend available in this build
    #[default]
    Auto,
    /// A specific backend
    Exact(Backend),
}

impl BackendChoice {
    /// Parse `auto` or a backend name.
    ///
    /// # Example
    ///
    /// ```
    /// use twit::git::{Backend, BackendChoice};
    ///
    /// assert_eq!(BackendChoice::parse("auto"), Some(BackendChoice::Auto));
    /// assert_eq!(BackendChoice::parse("exe"), Some(BackendChoice::Exact(Backend::Exe)));
    /// assert_eq!(BackendChoice::parse("hg"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("auto") {
            Some(BackendChoice::Auto)
        } else {
            Backend::parse(s).map(BackendChoice::Exact)
        }
    }

    /// Resolve the choice to a concrete backend.
    ///
    /// # Errors
    ///
    /// - [`GitError::BackendUnavailable`] if an exact backend is not compiled in
    pub fn resolve(self) -> Result<Backend, GitError> {
        match self {
            BackendChoice::Auto => Ok(Backend::all()[0]),
            BackendChoice::Exact(backend) if backend.is_available() => Ok(backend),
            BackendChoice::Exact(backend) => Err(GitError::BackendUnavailable {
                backend: backend.name().to_string(),
            }),
        }
    }

    /// Names accepted by [`BackendChoice::parse`], for help and validation.
    pub fn valid_names() -> &'static [&'static str] {
        &["auto", "exe", "libgit2"]
    }
}

impl std::fmt::Display for BackendChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendChoice::Auto => write!(f, "auto"),
            BackendChoice::Exact(backend) => write!(f, "{}", backend),
        }
    }
}

/// Open the repository containing `path` with the chosen backend.
///
/// `program` is the git executable used by the exe backend.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use twit::git::{open_repository, BackendChoice, Repository, DEFAULT_PROGRAM};
///
/// let repo = open_repository(Path::new("."), BackendChoice::Auto, DEFAULT_PROGRAM)?;
/// println!("on {} via {}", repo.current_branch()?, repo.backend());
/// # Ok::<(), twit::git::GitError>(())
/// ```
pub fn open_repository(
    path: &Path,
    choice: BackendChoice,
    program: &str,
) -> Result<Box<dyn Repository>, GitError> {
    match choice.resolve()? {
        Backend::Exe => Ok(Box::new(GitExe::open_with_program(path, program)?)),
        #[cfg(feature = "libgit2")]
        Backend::LibGit2 => Ok(Box::new(LibGit::open(path)?)),
        #[cfg(not(feature = "libgit2"))]
        Backend::LibGit2 => Err(GitError::BackendUnavailable {
            backend: Backend::LibGit2.name().to_string(),
        }),
    }
}
