//! Lazy commit-graph traversal.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use git2::Oid;

use crate::commit::CommitInfo;
use crate::error::Result;
use crate::repo::GitRepo;

/// A lazy walk over every commit reachable from a set of start points.
///
/// Commits are yielded committer-time descending among the discovered
/// frontier, with object ids breaking ties, so two walks over an unchanged
/// repository produce identical sequences. Each reachable commit is loaded
/// from the object store exactly once and yielded exactly once; a caller
/// that stops early (a satisfied `LIMIT`, an aborted query) never pays for
/// the rest of the history.
///
/// The walk holds no borrow of the repository: [`next_commit`] takes the
/// handle per call, so the caller can interleave diff and ancestry reads
/// between rows. Walks are single-use; start a fresh one rather than trying
/// to rewind.
///
/// [`next_commit`]: CommitWalk::next_commit
pub struct CommitWalk {
    pending: BinaryHeap<Pending>,
    seen: HashSet<Oid>,
}

impl CommitWalk {
    /// Walks from the resolved HEAD.
    pub fn from_head(repo: &GitRepo) -> Result<Self> {
        Ok(Self::seeded(vec![repo.head_commit()?]))
    }

    /// Walks from any revspec (hash, branch, tag, `HEAD~2`, ...).
    pub fn from_rev(repo: &GitRepo, rev: &str) -> Result<Self> {
        Ok(Self::seeded(vec![repo.resolve_rev(rev)?]))
    }

    /// Walks from every ref tip (`refs/*`), covering commits on branches
    /// not reachable from HEAD.
    pub fn from_all_refs(repo: &GitRepo) -> Result<Self> {
        let mut seeds = Vec::new();
        for reference in repo.inner().references_glob("refs/*")? {
            let reference = reference?;
            // Refs that do not peel to a commit (e.g. tags of blobs) carry
            // no history.
            if let Ok(commit) = reference.peel_to_commit() {
                seeds.push(CommitInfo::from(&commit));
            }
        }
        if seeds.is_empty() {
            return Self::from_head(repo);
        }
        Ok(Self::seeded(seeds))
    }

    fn seeded(seeds: Vec<CommitInfo>) -> Self {
        let mut walk = CommitWalk {
            pending: BinaryHeap::new(),
            seen: HashSet::new(),
        };
        for info in seeds {
            if walk.seen.insert(info.id) {
                walk.pending.push(Pending(info));
            }
        }
        walk
    }

    /// Yields the next commit, or `None` once every reachable commit has
    /// been produced.
    pub fn next_commit(&mut self, repo: &GitRepo) -> Option<Result<CommitInfo>> {
        let Pending(info) = self.pending.pop()?;
        for &parent in &info.parents {
            if self.seen.insert(parent) {
                match repo.find_commit(parent) {
                    Ok(parent) => self.pending.push(Pending(parent)),
                    Err(e) => return Some(Err(e)),
                }
            }
        }
        Some(Ok(info))
    }

    /// Adapts the walk to a standard iterator borrowing the repository.
    pub fn iter<'a>(
        &'a mut self,
        repo: &'a GitRepo,
    ) -> impl Iterator<Item = Result<CommitInfo>> + 'a {
        std::iter::from_fn(move || self.next_commit(repo))
    }
}

/// Frontier entry ordered by (committer time, id) so the heap pops the
/// newest discovered commit first, deterministically.
struct Pending(CommitInfo);

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.0.committer_when, self.0.id).cmp(&(other.0.committer_when, other.0.id))
    }
}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Pending {}
