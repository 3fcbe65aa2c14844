//! git::exe
//!
//! Repository backend that drives the `git` executable.
//!
//! Every operation is a short sequence of plumbing commands run with the work
//! tree as the current directory. Output is decoded lossily and trailing
//! whitespace is trimmed. Failure signals are normalized as follows:
//!
//! - spawn fails with `NotFound` -> [`GitError::ToolNotFound`]
//! - stderr mentions "not a git repository" -> [`GitError::NotARepo`]
//! - stderr asks who you are -> [`GitError::MissingIdentity`]
//! - a `-q` query exits with status 1 -> the queried thing is absent
//! - any other non-zero exit -> [`GitError::CommandFailed`]

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use super::interface::{describe_dirty, remove_worktree_file, Backend, GitError, Repository};
use crate::core::types::{BranchName, Oid, RefName};

/// Default name of the git executable.
pub const DEFAULT_PROGRAM: &str = "git";

/// One entry of `git status --porcelain -z`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    /// Index (staged) status code
    pub index: char,
    /// Work tree status code
    pub worktree: char,
    /// Path relative to the work tree root
    pub path: String,
}

impl StatusEntry {
    /// Whether this entry is an ignored file (`!!`).
    pub fn is_ignored(&self) -> bool {
        self.index == '!' && self.worktree == '!'
    }
}

/// Parse the NUL-separated output of `git status --porcelain -z`.
///
/// Rename and copy entries are followed by an extra field holding the
/// source path; it is consumed and dropped.
///
/// # Example
///
/// ```
/// use twit::git::exe::parse_status_z;
///
/// let entries = parse_status_z(" M README\0?? new\0");
/// assert_eq!(entries.len(), 2);
/// assert_eq!(entries[0].worktree, 'M');
/// assert_eq!(entries[1].path, "new");
/// ```
pub fn parse_status_z(raw: &str) -> Vec<StatusEntry> {
    let mut entries = Vec::new();
    let mut fields = raw.split('\0').filter(|f| !f.is_empty());

    while let Some(field) = fields.next() {
        let mut chars = field.chars();
        let (Some(index), Some(worktree)) = (chars.next(), chars.next()) else {
            continue;
        };
        // "XY path": skip the separating space.
        let path = field.get(3..).unwrap_or_default().to_string();

        if matches!(index, 'R' | 'C') || matches!(worktree, 'R' | 'C') {
            fields.next();
        }

        entries.push(StatusEntry {
            index,
            worktree,
            path,
        });
    }

    entries
}

/// Git repository backed by the git executable.
#[derive(Debug, Clone)]
pub struct GitExe {
    program: String,
    git_dir: PathBuf,
    work_dir: PathBuf,
}

impl GitExe {
    /// Open the repository containing `path` using the default `git` program.
    ///
    /// # Errors
    ///
    /// - [`GitError::ToolNotFound`] if git is not installed
    /// - [`GitError::NotARepo`] if `path` is not inside a repository
    /// - [`GitError::BareRepo`] if the repository has no work tree
    pub fn open(path: &Path) -> Result<Self, GitError> {
        Self::open_with_program(path, DEFAULT_PROGRAM)
    }

    /// Open the repository containing `path`, invoking `program` for git.
    pub fn open_with_program(path: &Path, program: &str) -> Result<Self, GitError> {
        // A missing cwd would otherwise surface as a spawn NotFound.
        if !path.is_dir() {
            return Err(GitError::NotARepo {
                path: path.to_path_buf(),
            });
        }

        let unresolved = Self {
            program: program.to_string(),
            git_dir: PathBuf::new(),
            work_dir: path.to_path_buf(),
        };

        if unresolved.git(["rev-parse", "--is-bare-repository"])? == "true" {
            return Err(GitError::BareRepo);
        }
        let git_dir = PathBuf::from(unresolved.git(["rev-parse", "--absolute-git-dir"])?);
        let work_dir = PathBuf::from(unresolved.git(["rev-parse", "--show-toplevel"])?);

        Ok(Self {
            program: program.to_string(),
            git_dir,
            work_dir,
        })
    }

    /// The executable this handle invokes.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Spawn git and wait for it, normalizing spawn failures and the
    /// not-a-repository signal.
    fn run<I, S>(&self, args: I) -> Result<(String, Output), GitError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<S> = args.into_iter().collect();
        let command = std::iter::once(self.program.clone())
            .chain(args.iter().map(|a| a.as_ref().to_string_lossy().into_owned()))
            .collect::<Vec<_>>()
            .join(" ");

        let output = Command::new(&self.program)
            .args(&args)
            .current_dir(&self.work_dir)
            .output()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => GitError::ToolNotFound {
                    program: self.program.clone(),
                },
                _ => GitError::Internal {
                    message: format!("failed to run `{}`: {}", command, e),
                },
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.to_lowercase().contains("not a git repository") {
            return Err(GitError::NotARepo {
                path: self.work_dir.clone(),
            });
        }
        if stderr.contains("Please tell me who you are")
            || stderr.contains("unable to auto-detect email address")
        {
            return Err(GitError::MissingIdentity);
        }

        Ok((command, output))
    }

    /// Run git, requiring success. Returns stdout with trailing whitespace
    /// trimmed.
    fn git<I, S>(&self, args: I) -> Result<String, GitError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let (command, output) = self.run(args)?;
        if !output.status.success() {
            return Err(GitError::CommandFailed {
                command,
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
    }

    /// Run a quiet (`-q`) query. Exit status 1 means "absent" and yields
    /// `None`.
    fn git_query<I, S>(&self, args: I) -> Result<Option<String>, GitError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let (command, output) = self.run(args)?;
        match output.status.code() {
            Some(0) => {
                let stdout = String::from_utf8_lossy(&output.stdout).trim_end().to_string();
                Ok(Some(stdout).filter(|s| !s.is_empty()))
            }
            Some(1) => Ok(None),
            code => Err(GitError::CommandFailed {
                command,
                code,
                stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
            }),
        }
    }

    /// HEAD's commit, or `None` when HEAD is unborn.
    fn head_commit(&self) -> Result<Option<String>, GitError> {
        self.git_query(["rev-parse", "--verify", "-q", "HEAD"])
    }

    /// The full ref HEAD symbolically points to, or `None` when detached.
    fn head_symref(&self) -> Result<Option<String>, GitError> {
        self.git_query(["symbolic-ref", "-q", "HEAD"])
    }

    /// Parsed `git status` entries, ignored files excluded.
    ///
    /// Untracked files are always listed, whatever `status.showUntrackedFiles`
    /// says, so the result matches the libgit2 backend.
    pub fn status(&self) -> Result<Vec<StatusEntry>, GitError> {
        let raw = self.git(["status", "--porcelain", "-z", "--untracked-files=all"])?;
        Ok(parse_status_z(&raw)
            .into_iter()
            .filter(|entry| !entry.is_ignored())
            .collect())
    }
}

impl Repository for GitExe {
    fn backend(&self) -> Backend {
        Backend::Exe
    }

    fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    fn current_branch(&self) -> Result<BranchName, GitError> {
        let symref = self.head_symref()?.ok_or(GitError::DetachedHead)?;
        let name = symref
            .strip_prefix(RefName::HEADS_PREFIX)
            .unwrap_or(&symref);
        Ok(BranchName::existing(name)?)
    }

    fn refs(&self) -> Result<Vec<RefName>, GitError> {
        let raw = self.git(["for-each-ref", "--format=%(refname)"])?;
        let mut refs = raw
            .lines()
            .filter(|line| !line.is_empty())
            .map(RefName::new)
            .collect::<Result<Vec<_>, _>>()?;
        refs.sort();
        Ok(refs)
    }

    fn dirty(&self) -> Result<bool, GitError> {
        Ok(!self.status()?.is_empty())
    }

    fn stage_all(&self) -> Result<(), GitError> {
        self.git(["add", "--all", "."])?;
        Ok(())
    }

    fn unstage_all(&self) -> Result<(), GitError> {
        match self.head_commit()? {
            Some(head) => self.git(["read-tree", head.as_str()])?,
            None => self.git(["read-tree", "--empty"])?,
        };
        Ok(())
    }

    fn discard_all(&self) -> Result<(), GitError> {
        self.stage_all()?;
        match self.head_commit()? {
            Some(head) => {
                self.git(["reset", "-q", "--hard", head.as_str()])?;
            }
            None => {
                let listing = self.git(["ls-files", "-z"])?;
                for path in listing.split('\0').filter(|p| !p.is_empty()) {
                    remove_worktree_file(&self.work_dir, Path::new(path))?;
                }
                self.git(["read-tree", "--empty"])?;
            }
        }
        Ok(())
    }

    fn safe_checkout(&self, target: &str) -> Result<(), GitError> {
        let status = self.status()?;
        if !status.is_empty() {
            let paths: Vec<String> = status.into_iter().map(|e| e.path).collect();
            return Err(GitError::DirtyWorktree {
                details: describe_dirty(&paths),
            });
        }

        let peeled = format!("{}^{{commit}}", target);
        if self
            .git_query(["rev-parse", "--verify", "-q", peeled.as_str()])?
            .is_none()
        {
            return Err(GitError::InvalidRef {
                refname: target.to_string(),
            });
        }

        // `git checkout refs/heads/x` detaches; the short name attaches.
        let target = target.strip_prefix(RefName::HEADS_PREFIX).unwrap_or(target);
        self.git(["checkout", "-q", target, "--"])?;
        Ok(())
    }

    fn commit(&self, message: &str, refname: Option<&RefName>) -> Result<Oid, GitError> {
        let tree = self.git(["write-tree"])?;
        let parent = self.head_commit()?;
        let target_ref = match refname {
            Some(r) => Some(r.as_str().to_string()),
            None => self.head_symref()?,
        };

        let mut args = vec!["commit-tree", tree.as_str(), "-m", message];
        if let Some(parent) = parent.as_deref() {
            args.extend(["-p", parent]);
        }
        let commit = Oid::new(self.git(&args)?)?;

        if let Some(target_ref) = target_ref {
            let reflog = format!("twit: {}", message);
            self.git([
                "update-ref",
                "-m",
                reflog.as_str(),
                target_ref.as_str(),
                commit.as_str(),
            ])?;
        }

        Ok(commit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod parse_status {
        use super::*;

        #[test]
        fn empty_output() {
            assert!(parse_status_z("").is_empty());
        }

        #[test]
        fn simple_entries() {
            let entries = parse_status_z("M  staged\0 M unstaged\0?? untracked\0");
            assert_eq!(
                entries,
                vec![
                    StatusEntry {
                        index: 'M',
                        worktree: ' ',
                        path: "staged".into()
                    },
                    StatusEntry {
                        index: ' ',
                        worktree: 'M',
                        path: "unstaged".into()
                    },
                    StatusEntry {
                        index: '?',
                        worktree: '?',
                        path: "untracked".into()
                    },
                ]
            );
        }

        #[test]
        fn rename_consumes_source_path() {
            let entries = parse_status_z("R  new name\0old name\0 D gone\0");
            assert_eq!(entries.len(), 2);
            assert_eq!(entries[0].path, "new name");
            assert_eq!(entries[1].path, "gone");
            assert_eq!(entries[1].worktree, 'D');
        }

        #[test]
        fn paths_with_spaces_and_subdirs() {
            let entries = parse_status_z("?? sub dir/file one\0");
            assert_eq!(entries[0].path, "sub dir/file one");
        }

        #[test]
        fn ignored_entries_flagged() {
            let entries = parse_status_z("!! target/\0");
            assert!(entries[0].is_ignored());
        }
    }

    mod open {
        use super::*;

        #[test]
        fn missing_program_is_tool_not_found() {
            let temp = tempfile::TempDir::new().unwrap();
            let err = GitExe::open_with_program(temp.path(), "definitely-not-a-git-binary-xyz")
                .unwrap_err();
            assert!(matches!(err, GitError::ToolNotFound { ref program }
                if program == "definitely-not-a-git-binary-xyz"));
        }
    }
}
