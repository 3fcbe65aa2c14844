//! git::libgit
//!
//! Repository backend using libgit2 through the `git2` crate.
//!
//! Operations map one-to-one onto library calls against an in-process
//! repository handle. The index is force-reloaded from disk before each index
//! operation, so changes made by other processes (including the exe backend)
//! are always observed.

use std::path::{Path, PathBuf};

use git2::build::CheckoutBuilder;
use git2::{BranchType, ErrorCode, IndexAddOption, ResetType, Status, StatusOptions};

use super::interface::{describe_dirty, remove_worktree_file, Backend, GitError, Repository};
use crate::core::types::{BranchName, Oid, RefName};

impl GitError {
    /// Create a GitError from a git2::Error raised while resolving `context`.
    fn from_git2(err: git2::Error, context: &str) -> Self {
        match err.code() {
            ErrorCode::NotFound | ErrorCode::InvalidSpec | ErrorCode::Ambiguous => {
                GitError::InvalidRef {
                    refname: context.to_string(),
                }
            }
            _ => GitError::Internal {
                message: format!("{}: {}", context, err.message()),
            },
        }
    }
}

impl From<git2::Error> for GitError {
    fn from(err: git2::Error) -> Self {
        GitError::Internal {
            message: err.message().to_string(),
        }
    }
}

/// Git repository backed by libgit2.
pub struct LibGit {
    repo: git2::Repository,
    git_dir: PathBuf,
    work_dir: PathBuf,
}

impl std::fmt::Debug for LibGit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibGit")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl LibGit {
    /// Open the repository containing `path`.
    ///
    /// Uses `git2::Repository::discover`, so `path` can be any directory
    /// within the work tree.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if no repository is found
    /// - [`GitError::BareRepo`] if the repository has no working directory
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::discover(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;

        if repo.is_bare() {
            return Err(GitError::BareRepo);
        }

        let git_dir = repo.path().to_path_buf();
        let work_dir = repo.workdir().ok_or(GitError::BareRepo)?.to_path_buf();

        Ok(Self {
            repo,
            git_dir,
            work_dir,
        })
    }

    /// The repository index, freshly read from disk.
    fn index(&self) -> Result<git2::Index, GitError> {
        let mut index = self.repo.index()?;
        index.read(true)?;
        Ok(index)
    }

    /// HEAD's commit, or `None` when HEAD is unborn.
    fn head_commit(&self) -> Result<Option<git2::Commit<'_>>, GitError> {
        match self.repo.head() {
            Ok(head) => Ok(Some(head.peel_to_commit()?)),
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// The full ref HEAD symbolically points to, or `None` when detached.
    fn head_symref(&self) -> Result<Option<String>, GitError> {
        let head = self.repo.find_reference("HEAD")?;
        Ok(head.symbolic_target().map(String::from))
    }

    /// Paths with any status other than current, ignored files excluded.
    fn dirty_paths(&self) -> Result<Vec<String>, GitError> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false);

        let statuses = self.repo.statuses(Some(&mut opts))?;
        Ok(statuses
            .iter()
            .filter(|entry| {
                let status = entry.status();
                status != Status::CURRENT && !status.is_ignored()
            })
            .map(|entry| entry.path().unwrap_or("<non-utf8 path>").to_string())
            .collect())
    }

    /// Update the work tree to `commit` and point HEAD at it.
    ///
    /// With `branch`, HEAD becomes a symbolic ref to it; otherwise HEAD is
    /// detached.
    fn checkout_commit(
        &self,
        commit: &git2::Commit<'_>,
        branch: Option<&str>,
    ) -> Result<(), GitError> {
        let mut checkout = CheckoutBuilder::new();
        checkout.safe();
        self.repo
            .checkout_tree(commit.as_object(), Some(&mut checkout))?;

        match branch {
            Some(refname) => self.repo.set_head(refname)?,
            None => self.repo.set_head_detached(commit.id())?,
        }
        Ok(())
    }
}

impl Repository for LibGit {
    fn backend(&self) -> Backend {
        Backend::LibGit2
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
        let mut refs = Vec::new();
        for reference in self.repo.references()? {
            let reference = reference?;
            // Non-UTF8 names have no RefName form
            if let Some(name) = reference.name() {
                refs.push(RefName::new(name)?);
            }
        }
        refs.sort();
        Ok(refs)
    }

    fn branches(&self) -> Result<Vec<BranchName>, GitError> {
        let mut names = Vec::new();
        for branch in self.repo.branches(Some(BranchType::Local))? {
            let (branch, _) = branch?;
            if let Some(name) = branch.name().ok().flatten() {
                names.push(BranchName::existing(name)?);
            }
        }
        names.sort();
        Ok(names)
    }

    fn dirty(&self) -> Result<bool, GitError> {
        Ok(!self.dirty_paths()?.is_empty())
    }

    fn stage_all(&self) -> Result<(), GitError> {
        let mut index = self.index()?;
        index.add_all(["*"].iter(), IndexAddOption::DEFAULT, None)?;
        // add_all never drops entries whose files were deleted
        index.update_all(["*"].iter(), None)?;
        index.write()?;
        Ok(())
    }

    fn unstage_all(&self) -> Result<(), GitError> {
        let mut index = self.index()?;
        match self.head_commit()? {
            Some(commit) => index.read_tree(&commit.tree()?)?,
            None => index.clear()?,
        }
        index.write()?;
        Ok(())
    }

    fn discard_all(&self) -> Result<(), GitError> {
        self.stage_all()?;
        match self.head_commit()? {
            Some(commit) => {
                let mut checkout = CheckoutBuilder::new();
                checkout.force().remove_untracked(true);
                self.repo
                    .reset(commit.as_object(), ResetType::Hard, Some(&mut checkout))?;
            }
            None => {
                let mut index = self.index()?;
                let paths: Vec<PathBuf> = index
                    .iter()
                    .map(|entry| PathBuf::from(String::from_utf8_lossy(&entry.path).into_owned()))
                    .collect();
                for path in &paths {
                    remove_worktree_file(&self.work_dir, path)?;
                }
                index.clear()?;
                index.write()?;
            }
        }
        Ok(())
    }

    fn safe_checkout(&self, target: &str) -> Result<(), GitError> {
        let dirty = self.dirty_paths()?;
        if !dirty.is_empty() {
            return Err(GitError::DirtyWorktree {
                details: describe_dirty(&dirty),
            });
        }

        for prefix in ["", "refs/heads/", "refs/tags/"] {
            let candidate = format!("{}{}", prefix, target);
            let Ok(reference) = self.repo.find_reference(&candidate) else {
                continue;
            };
            let reference = reference
                .resolve()
                .map_err(|e| GitError::from_git2(e, target))?;
            let commit = reference
                .peel_to_commit()
                .map_err(|e| GitError::from_git2(e, target))?;
            let branch = if reference.is_branch() {
                reference.name()
            } else {
                None
            };
            return self.checkout_commit(&commit, branch);
        }

        let commit = self
            .repo
            .revparse_single(target)
            .and_then(|object| object.peel_to_commit())
            .map_err(|_| GitError::InvalidRef {
                refname: target.to_string(),
            })?;
        self.checkout_commit(&commit, None)
    }

    fn commit(&self, message: &str, refname: Option<&RefName>) -> Result<Oid, GitError> {
        let signature = self.repo.signature().map_err(|e| match e.code() {
            ErrorCode::NotFound => GitError::MissingIdentity,
            _ => e.into(),
        })?;

        let mut index = self.index()?;
        let tree = self.repo.find_tree(index.write_tree()?)?;
        let parent = self.head_commit()?;
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

        let target_ref = match refname {
            Some(r) => Some(r.as_str().to_string()),
            None => self.head_symref()?,
        };

        // Created detached from any ref, then pointed at: git2 refuses to
        // update a ref whose tip is not the first parent.
        let oid = self
            .repo
            .commit(None, &signature, &signature, message, &tree, &parents)?;

        if let Some(target_ref) = target_ref {
            self.repo
                .reference(&target_ref, oid, true, &format!("twit: {}", message))?;
        }

        Ok(Oid::new(oid.to_string())?)
    }
}
