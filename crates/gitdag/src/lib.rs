//! # gitdag
//!
//! Lazy, read-only access to a Git repository's commit graph.
//!
//! gitdag wraps libgit2 with the handful of operations a history-analysis
//! tool actually needs: open and validate a repository, walk every reachable
//! commit exactly once without materializing the history, compute per-file
//! diff statistics for a single commit, and derive how long a merged topic
//! branch lived.
//!
//! ## Quick Start
//!
//! ```no_run
//! use gitdag::{CommitWalk, GitRepo, Result};
//!
//! fn main() -> Result<()> {
//!     let repo = GitRepo::open(".")?;
//!     let mut walk = CommitWalk::from_head(&repo)?;
//!
//!     while let Some(commit) = walk.next_commit(&repo) {
//!         let commit = commit?;
//!         println!("{} {}", commit.hash(), commit.committer_when);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! All values handed out are owned snapshots ([`CommitInfo`], [`FileStat`]);
//! nothing borrows the repository, so callers are free to interleave walks
//! with diff and ancestry lookups against the same handle.

pub mod commit;
pub mod diff;
pub mod error;
pub mod merge;
pub mod repo;
pub mod walk;

pub use commit::CommitInfo;
pub use diff::{commit_stats, FileStat};
pub use error::{Error, Result};
pub use merge::time_to_merge;
pub use repo::GitRepo;
pub use walk::CommitWalk;
