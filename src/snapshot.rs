//! snapshot
//!
//! Snapshots: commits recorded under hidden refs that capture the whole work
//! tree without touching the visible branch history.
//!
//! # Layout
//!
//! Snapshot refs live at `refs/hidden/heads/twit/<branch>/<unix-seconds>`.
//! A detached HEAD files its snapshots under the `HEAD` bucket, which can
//! never collide with a branch since Git rejects `HEAD` as a branch name. A
//! second snapshot in the same second gets a `-1`, `-2`, ... suffix.
//!
//! # Design
//!
//! These are free functions over `&dyn Repository`, so they work identically
//! on every backend.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use twit::git::{open_repository, BackendChoice, DEFAULT_PROGRAM};
//! use twit::snapshot::{save, snapshots, DEFAULT_MESSAGE};
//!
//! let repo = open_repository(Path::new("."), BackendChoice::Auto, DEFAULT_PROGRAM)?;
//! let saved = save(repo.as_ref(), DEFAULT_MESSAGE)?;
//! println!("saved {} as {}", saved.commit.short(7), saved.snapshot.refname);
//! assert!(!snapshots(repo.as_ref())?.is_empty());
//! # Ok::<(), twit::git::GitError>(())
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::types::{BranchName, Oid, RefName, TypeError};
use crate::git::{GitError, Repository};

/// Ref namespace holding every snapshot.
pub const SNAPSHOT_NAMESPACE: &str = "refs/hidden/heads/twit/";

/// Bucket used in place of a branch name when HEAD is detached.
pub const DETACHED_BUCKET: &str = "HEAD";

/// Commit message used when none is configured.
pub const DEFAULT_MESSAGE: &str = "Snapshot taken via `twit save`.";

/// A snapshot, as recovered from its ref name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    /// The hidden ref pointing at the snapshot commit
    pub refname: RefName,
    /// Branch checked out when the snapshot was taken (`None` if detached)
    pub branch: Option<BranchName>,
    /// When the snapshot was taken, to the second
    pub taken_at: DateTime<Utc>,
}

impl std::fmt::Display for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let branch = self
            .branch
            .as_ref()
            .map_or("(detached)", BranchName::as_str);
        write!(
            f,
            "{}  {}  {}",
            self.taken_at.format("%Y-%m-%d %H:%M:%S UTC"),
            branch,
            self.refname
        )
    }
}

/// Result of [`save`].
#[derive(Debug, Clone)]
pub struct SaveOutcome {
    /// The recorded snapshot
    pub snapshot: Snapshot,
    /// The snapshot commit
    pub commit: Oid,
}

/// Build the snapshot ref for `branch` at `taken_at`, without uniqueness
/// suffix.
///
/// # Example
///
/// ```
/// use chrono::DateTime;
/// use twit::core::types::BranchName;
/// use twit::snapshot::snapshot_ref;
///
/// let main = BranchName::new("main").unwrap();
/// let at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
/// assert_eq!(
///     snapshot_ref(Some(&main), at).unwrap().as_str(),
///     "refs/hidden/heads/twit/main/1700000000"
/// );
/// assert_eq!(
///     snapshot_ref(None, at).unwrap().as_str(),
///     "refs/hidden/heads/twit/HEAD/1700000000"
/// );
/// ```
pub fn snapshot_ref(
    branch: Option<&BranchName>,
    taken_at: DateTime<Utc>,
) -> Result<RefName, TypeError> {
    RefName::new(format!(
        "{}{}/{}",
        SNAPSHOT_NAMESPACE,
        bucket(branch),
        taken_at.timestamp()
    ))
}

fn bucket(branch: Option<&BranchName>) -> &str {
    branch.map_or(DETACHED_BUCKET, BranchName::as_str)
}

/// Pick a snapshot ref for `branch` at `taken_at` that is not in `existing`.
pub fn unique_snapshot_ref(
    existing: &[RefName],
    branch: Option<&BranchName>,
    taken_at: DateTime<Utc>,
) -> Result<RefName, TypeError> {
    let base = snapshot_ref(branch, taken_at)?;
    if !existing.contains(&base) {
        return Ok(base);
    }

    let mut counter = 1u32;
    loop {
        let candidate = RefName::new(format!("{}-{}", base, counter))?;
        if !existing.contains(&candidate) {
            return Ok(candidate);
        }
        counter += 1;
    }
}

/// Recover a [`Snapshot`] from its ref name.
///
/// Returns `None` for refs outside the snapshot namespace or with a
/// malformed timestamp component.
///
/// # Example
///
/// ```
/// use twit::core::types::RefName;
/// use twit::snapshot::parse_snapshot_ref;
///
/// let refname = RefName::new("refs/hidden/heads/twit/feature/x/1700000000-2").unwrap();
/// let snapshot = parse_snapshot_ref(&refname).unwrap();
/// assert_eq!(snapshot.branch.unwrap().as_str(), "feature/x");
/// assert_eq!(snapshot.taken_at.timestamp(), 1_700_000_000);
///
/// let tag = RefName::new("refs/tags/v1.0").unwrap();
/// assert!(parse_snapshot_ref(&tag).is_none());
/// ```
pub fn parse_snapshot_ref(refname: &RefName) -> Option<Snapshot> {
    let rest = refname.strip_prefix(SNAPSHOT_NAMESPACE)?;
    let (bucket, stamp) = rest.rsplit_once('/')?;

    let seconds = match stamp.split_once('-') {
        Some((seconds, counter)) => {
            counter.parse::<u32>().ok()?;
            seconds
        }
        None => stamp,
    };
    let taken_at = DateTime::from_timestamp(seconds.parse::<i64>().ok()?, 0)?;

    let branch = if bucket == DETACHED_BUCKET {
        None
    } else {
        Some(BranchName::existing(bucket).ok()?)
    };

    Some(Snapshot {
        refname: refname.clone(),
        branch,
        taken_at,
    })
}

/// Save a snapshot of the working directory.
///
/// Stages everything, commits the index to a fresh snapshot ref, then
/// unstages everything. The unstage step runs even when staging or
/// committing fails, so the stage is always empty afterward; the first error
/// is returned.
///
/// # Errors
///
/// - [`GitError::MissingIdentity`] if no committer identity is configured
/// - any error from the backend
pub fn save(repo: &dyn Repository, message: &str) -> Result<SaveOutcome, GitError> {
    let branch = match repo.current_branch() {
        Ok(branch) => Some(branch),
        Err(GitError::DetachedHead) => None,
        Err(e) => return Err(e),
    };

    let recorded = repo
        .stage_all()
        .and_then(|()| record(repo, branch, message));
    let unstaged = repo.unstage_all();

    let outcome = recorded?;
    unstaged?;
    Ok(outcome)
}

fn record(
    repo: &dyn Repository,
    branch: Option<BranchName>,
    message: &str,
) -> Result<SaveOutcome, GitError> {
    let taken_at = Utc::now();
    let refname = unique_snapshot_ref(&repo.refs()?, branch.as_ref(), taken_at)?;
    let commit = repo.commit(message, Some(&refname))?;

    // Stored timestamps have second precision.
    let taken_at = DateTime::from_timestamp(taken_at.timestamp(), 0).unwrap_or(taken_at);

    Ok(SaveOutcome {
        snapshot: Snapshot {
            refname,
            branch,
            taken_at,
        },
        commit,
    })
}

/// All snapshots in the repository, oldest first.
pub fn snapshots(repo: &dyn Repository) -> Result<Vec<Snapshot>, GitError> {
    let mut found: Vec<Snapshot> = repo
        .refs()?
        .iter()
        .filter_map(parse_snapshot_ref)
        .collect();
    found.sort_by(|a, b| {
        a.taken_at
            .cmp(&b.taken_at)
            .then_with(|| a.refname.cmp(&b.refname))
    });
    Ok(found)
}
