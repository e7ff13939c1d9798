//! Virtual table modules implementing the cursor protocol.
//!
//! All three tables share one lifecycle: `filter` opens and validates the
//! repository handle, builds the row source (a lazy commit walk or a single
//! resolved commit), and positions on the first row; `next` advances;
//! `column` reads the current row repeatably; `rowid` is a per-cursor
//! monotonic counter (commit hashes are not numeric); cursor drop releases
//! everything, on aborts included.

pub(crate) mod commits;
pub(crate) mod merges;
pub(crate) mod stats;

use chrono::{DateTime, Utc};

use gitdag::{CommitInfo, CommitWalk, Error, GitRepo};

use crate::plan::PlanArgs;

/// How cursors react to per-row failures: missing point-lookup targets and
/// commits whose diff cannot be computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Strictness {
    /// Missing lookup targets yield zero rows (an equality constraint on a
    /// hash nobody has simply matches nothing) and undiffable commits are
    /// skipped with a debug log.
    #[default]
    Lenient,
    /// Every failure surfaces as a query error.
    Strict,
}

/// Options shared by the three table modules, passed to
/// [`register_tables_with`](crate::register_tables_with).
#[derive(Debug, Clone, Copy, Default)]
pub struct TableOptions {
    pub strictness: Strictness,
    /// Seed full scans from every ref tip instead of HEAD when no ref
    /// argument is given.
    pub all_refs: bool,
}

/// Errors cross the virtual-table boundary as module errors; SQLite hands
/// the display string back to the caller as a structured failure.
pub(crate) fn module_error(err: Error) -> rusqlite::Error {
    rusqlite::Error::ModuleError(err.to_string())
}

pub(crate) fn format_when(when: &DateTime<Utc>) -> String {
    when.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Builds the walker for a scan cursor: explicit rev argument first, then
/// the configured default start set.
pub(crate) fn open_walk(
    repo: &GitRepo,
    rev: Option<&str>,
    opts: &TableOptions,
) -> gitdag::Result<CommitWalk> {
    match rev {
        Some(rev) => CommitWalk::from_rev(repo, rev),
        None if opts.all_refs => CommitWalk::from_all_refs(repo),
        None => CommitWalk::from_head(repo),
    }
}

/// Applies the strictness policy to a point-lookup result: `Strict` turns a
/// miss into a query error, `Lenient` into "no such row".
pub(crate) fn resolve_lookup(
    table: &'static str,
    found: gitdag::Result<CommitInfo>,
    strictness: Strictness,
) -> rusqlite::Result<Option<CommitInfo>> {
    match found {
        Ok(commit) => Ok(Some(commit)),
        Err(e @ Error::ObjectNotFound(_)) if strictness == Strictness::Lenient => {
            tracing::debug!("{}: {}", table, e);
            Ok(None)
        }
        Err(e) => Err(module_error(e)),
    }
}

/// Resolves the point-lookup target for `commits` and `merges`: the hash
/// constraint picks the commit, and a ref argument (when present) further
/// requires the commit to be reachable from that ref, since the relation
/// only contains reachable commits.
pub(crate) fn lookup_commit(
    table: &'static str,
    repo: &GitRepo,
    args: &PlanArgs,
    strictness: Strictness,
) -> rusqlite::Result<Option<CommitInfo>> {
    let hash = match args.hash.as_deref() {
        Some(hash) => hash,
        None => return Ok(None),
    };
    let target = match resolve_lookup(table, repo.find_commit_by_hash(hash), strictness)? {
        Some(target) => target,
        None => return Ok(None),
    };
    if let Some(rev) = args.rev.as_deref() {
        let start = match resolve_lookup(table, repo.resolve_rev(rev), strictness)? {
            Some(start) => start,
            None => return Ok(None),
        };
        if !repo.in_history(start.id, target.id).map_err(module_error)? {
            return Ok(None);
        }
    }
    Ok(Some(target))
}
