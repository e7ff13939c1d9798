//! Per-file diff statistics.

use std::cell::RefCell;
use std::collections::BTreeMap;

use git2::{DiffDelta, DiffLineType, DiffOptions};

use crate::commit::CommitInfo;
use crate::error::{Error, Result};
use crate::repo::GitRepo;

/// Added/removed line counts for one path in one commit.
///
/// `None` counts mean the content is binary and line counts are not
/// measurable. That is deliberately distinct from `Some(0)`: collapsing the
/// two would make aggregates like `SUM(additions)` silently wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStat {
    pub path: String,
    pub additions: Option<u64>,
    pub deletions: Option<u64>,
}

enum Counter {
    Lines(u64, u64),
    Binary,
}

/// Computes per-file statistics for `commit` against its comparison tree.
///
/// Root commits diff against the empty tree, so every file reports as fully
/// added. Commits with parents, merges included, diff against the first
/// parent's tree only; diffing every parent would double-count changes
/// already present on the other side of the merge.
///
/// Rows come back sorted by path. Any failure while loading trees or
/// walking the diff maps to [`Error::Diff`] carrying the commit hash, so
/// callers can decide whether one undiffable commit fails the whole
/// operation or just skips the commit.
pub fn commit_stats(repo: &GitRepo, commit: &CommitInfo) -> Result<Vec<FileStat>> {
    let git = repo.inner();
    let new_tree = git
        .find_tree(commit.tree_id)
        .map_err(|e| diff_error(commit, e))?;
    let old_tree = match commit.parents.first() {
        Some(&parent) => {
            let parent = git.find_commit(parent).map_err(|e| diff_error(commit, e))?;
            Some(parent.tree().map_err(|e| diff_error(commit, e))?)
        }
        None => None,
    };

    let mut options = DiffOptions::new();
    options.context_lines(0).ignore_submodules(true);

    let diff = git
        .diff_tree_to_tree(old_tree.as_ref(), Some(&new_tree), Some(&mut options))
        .map_err(|e| diff_error(commit, e))?;

    // The three callbacks below all touch the same per-path counters.
    let counters: RefCell<BTreeMap<String, Counter>> = RefCell::new(BTreeMap::new());
    diff.foreach(
        &mut |delta, _progress| {
            let mut counters = counters.borrow_mut();
            if delta.flags().is_binary() {
                counters.insert(delta_path(&delta), Counter::Binary);
            } else {
                counters
                    .entry(delta_path(&delta))
                    .or_insert(Counter::Lines(0, 0));
            }
            true
        },
        Some(&mut |delta, _binary| {
            counters
                .borrow_mut()
                .insert(delta_path(&delta), Counter::Binary);
            true
        }),
        None,
        Some(&mut |delta, _hunk, line| {
            let mut counters = counters.borrow_mut();
            let entry = counters
                .entry(delta_path(&delta))
                .or_insert(Counter::Lines(0, 0));
            if let Counter::Lines(additions, deletions) = entry {
                match line.origin_value() {
                    DiffLineType::Addition => *additions += 1,
                    DiffLineType::Deletion => *deletions += 1,
                    _ => {}
                }
            }
            true
        }),
    )
    .map_err(|e| diff_error(commit, e))?;

    Ok(counters
        .into_inner()
        .into_iter()
        .map(|(path, counter)| match counter {
            Counter::Lines(additions, deletions) => FileStat {
                path,
                additions: Some(additions),
                deletions: Some(deletions),
            },
            Counter::Binary => FileStat {
                path,
                additions: None,
                deletions: None,
            },
        })
        .collect())
}

fn delta_path(delta: &DiffDelta<'_>) -> String {
    // Deletions keep their old name; everything else reports the new one.
    delta
        .new_file()
        .path()
        .or_else(|| delta.old_file().path())
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn diff_error(commit: &CommitInfo, source: git2::Error) -> Error {
    Error::Diff {
        hash: commit.hash(),
        source,
    }
}
