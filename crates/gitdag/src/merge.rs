//! Merge classification and time-to-merge.

use chrono::{DateTime, Utc};
use git2::Oid;

use crate::commit::CommitInfo;
use crate::error::Result;
use crate::repo::GitRepo;

/// Seconds between a merge commit and the start of the topic branch it
/// merged in.
///
/// The topic branch is the history reachable from the merge's second parent
/// but not from its first; the earliest author timestamp among those
/// commits marks the branch start. Returns `None` for non-merges, for
/// merges with no private second-parent history (fast-forward-shaped), and
/// when the merge base cannot be determined (shallow or unrelated
/// histories) - an unanswerable question is a null, never a query failure.
///
/// Commit timestamps are wall clocks and can run backwards; the duration is
/// clamped at zero.
pub fn time_to_merge(repo: &GitRepo, merge: &CommitInfo) -> Option<f64> {
    if !merge.is_merge() {
        return None;
    }
    match branch_start(repo, merge.parents[0], merge.parents[1]) {
        Ok(Some(start)) => {
            let seconds = (merge.author_when - start).num_seconds();
            Some(seconds.max(0) as f64)
        }
        Ok(None) => None,
        Err(e) => {
            tracing::debug!("time_to_merge unavailable for {}: {}", merge.hash(), e);
            None
        }
    }
}

/// Earliest author timestamp reachable from `topic` but not from
/// `mainline`, or `None` when that set is empty.
fn branch_start(repo: &GitRepo, mainline: Oid, topic: Oid) -> Result<Option<DateTime<Utc>>> {
    let git = repo.inner();
    // No common ancestor means the "branch start" is not well defined.
    git.merge_base(mainline, topic)?;

    let mut walk = git.revwalk()?;
    walk.push(topic)?;
    walk.hide(mainline)?;

    let mut earliest: Option<DateTime<Utc>> = None;
    for id in walk {
        let commit = repo.find_commit(id?)?;
        if earliest.map_or(true, |e| commit.author_when < e) {
            earliest = Some(commit.author_when);
        }
    }
    Ok(earliest)
}
