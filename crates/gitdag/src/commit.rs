//! Owned commit snapshots.

use chrono::{DateTime, Utc};
use git2::{Commit, Oid};

/// An owned snapshot of a single commit.
///
/// Holds no borrow of the repository, so it can outlive any libgit2 object
/// and be carried across further object-store reads. Identity is the commit
/// hash; two snapshots of the same commit compare equal by `id`.
#[derive(Debug, Clone)]
pub struct CommitInfo {
    pub id: Oid,
    pub message: Option<String>,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub author_when: DateTime<Utc>,
    pub committer_name: Option<String>,
    pub committer_email: Option<String>,
    pub committer_when: DateTime<Utc>,
    /// Parent ids in commit order; the first parent is the mainline.
    pub parents: Vec<Oid>,
    pub tree_id: Oid,
}

impl CommitInfo {
    /// The full 40-character hex hash.
    pub fn hash(&self) -> String {
        self.id.to_string()
    }

    /// A commit with two or more parents is a merge.
    pub fn is_merge(&self) -> bool {
        self.parents.len() >= 2
    }
}

impl From<&Commit<'_>> for CommitInfo {
    fn from(c: &Commit<'_>) -> Self {
        CommitInfo {
            id: c.id(),
            message: c.message().map(str::to_string),
            author_name: c.author().name().map(str::to_string),
            author_email: c.author().email().map(str::to_string),
            author_when: timestamp(c.author().when().seconds()),
            committer_name: c.committer().name().map(str::to_string),
            committer_email: c.committer().email().map(str::to_string),
            committer_when: timestamp(c.time().seconds()),
            parents: c.parent_ids().collect(),
            tree_id: c.tree_id(),
        }
    }
}

fn timestamp(seconds: i64) -> DateTime<Utc> {
    // Out-of-range timestamps collapse to the epoch rather than failing the
    // whole walk.
    DateTime::from_timestamp(seconds, 0).unwrap_or_default()
}
