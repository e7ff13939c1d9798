//! The `stats(path [, rev])` relation.
//!
//! One row per changed path per commit. A full scan nests the per-commit
//! file list inside the commit walk; a `rev` argument or a pushed-down
//! equality on `hash` (the usual join key against `commits`) narrows the
//! cursor to a single commit. Additions and deletions are null for binary
//! content.

use std::marker::PhantomData;
use std::os::raw::c_int;

use rusqlite::vtab::{
    sqlite3_vtab, sqlite3_vtab_cursor, Context, IndexInfo, VTab, VTabConnection, VTabCursor,
    Values,
};

use gitdag::{commit_stats, CommitInfo, CommitWalk, FileStat, GitRepo};

use crate::plan::{choose_plan, FilterColumns, PlanArgs};
use crate::schema::{self, stats_col as col};
use crate::tables::{module_error, open_walk, resolve_lookup, Strictness, TableOptions};

const FILTER_COLUMNS: FilterColumns = FilterColumns {
    repository: col::REPOSITORY,
    rev: Some(col::REV),
    hash: Some(col::HASH),
};

// A point lookup still yields one row per changed path.
const POINT_LOOKUP_ROWS: i64 = 16;

#[repr(C)]
pub struct StatsTable {
    base: sqlite3_vtab,
    opts: TableOptions,
}

unsafe impl<'vtab> VTab<'vtab> for StatsTable {
    type Aux = TableOptions;
    type Cursor = StatsCursor<'vtab>;

    fn connect(
        _db: &mut VTabConnection,
        aux: Option<&Self::Aux>,
        _args: &[&[u8]],
    ) -> rusqlite::Result<(String, Self)> {
        Ok((
            schema::STATS_SQL.to_owned(),
            StatsTable {
                base: sqlite3_vtab::default(),
                opts: aux.copied().unwrap_or_default(),
            },
        ))
    }

    fn best_index(&self, info: &mut IndexInfo) -> rusqlite::Result<()> {
        choose_plan("stats", &FILTER_COLUMNS, POINT_LOOKUP_ROWS, info)
    }

    fn open(&'vtab mut self) -> rusqlite::Result<Self::Cursor> {
        Ok(StatsCursor {
            base: sqlite3_vtab_cursor::default(),
            opts: self.opts,
            repo: None,
            opened_from: None,
            args: PlanArgs::default(),
            walk: None,
            hash: String::new(),
            files: Vec::new(),
            file: 0,
            row_id: 0,
            phantom: PhantomData,
        })
    }
}

#[repr(C)]
pub struct StatsCursor<'vtab> {
    base: sqlite3_vtab_cursor,
    opts: TableOptions,
    repo: Option<GitRepo>,
    opened_from: Option<String>,
    args: PlanArgs,
    /// `Some` while scanning all commits; `None` for single-commit cursors.
    walk: Option<CommitWalk>,
    /// Hash of the commit the current file list belongs to.
    hash: String,
    files: Vec<FileStat>,
    file: usize,
    row_id: i64,
    phantom: PhantomData<&'vtab StatsTable>,
}

impl StatsCursor<'_> {
    /// Pulls the walk until a commit with at least one changed path,
    /// loading its file list.
    fn advance(&mut self) -> rusqlite::Result<()> {
        let repo = match self.repo.as_ref() {
            Some(repo) => repo,
            None => return Ok(()),
        };
        let walk = match self.walk.as_mut() {
            Some(walk) => walk,
            None => {
                self.files = Vec::new();
                self.file = 0;
                return Ok(());
            }
        };
        loop {
            let commit = match walk.next_commit(repo) {
                Some(Ok(commit)) => commit,
                Some(Err(e)) => return Err(module_error(e)),
                None => {
                    self.files = Vec::new();
                    self.file = 0;
                    return Ok(());
                }
            };
            match commit_stats(repo, &commit) {
                Ok(files) if files.is_empty() => continue,
                Ok(files) => {
                    self.hash = commit.hash();
                    self.files = files;
                    self.file = 0;
                    self.row_id += 1;
                    return Ok(());
                }
                Err(e) if self.opts.strictness == Strictness::Lenient => {
                    tracing::debug!("stats: skipping {}: {}", commit.hash(), e);
                    continue;
                }
                Err(e) => return Err(module_error(e)),
            }
        }
    }
}

unsafe impl VTabCursor for StatsCursor<'_> {
    fn filter(
        &mut self,
        idx_num: c_int,
        _idx_str: Option<&str>,
        values: &Values<'_>,
    ) -> rusqlite::Result<()> {
        let args = PlanArgs::decode(idx_num, values)?;
        let repo = match self.repo.take() {
            Some(repo) if self.opened_from == args.repository => repo,
            _ => {
                let repo = GitRepo::open(args.repository_path()).map_err(module_error)?;
                self.opened_from = args.repository.clone();
                repo
            }
        };

        self.walk = None;
        self.hash = String::new();
        self.files = Vec::new();
        self.file = 0;
        self.row_id = 0;

        if args.hash.is_some() || args.rev.is_some() {
            if let Some(commit) = lookup_target(&repo, &args, self.opts.strictness)? {
                match commit_stats(&repo, &commit) {
                    Ok(files) => {
                        self.hash = commit.hash();
                        self.files = files;
                    }
                    Err(e) if self.opts.strictness == Strictness::Lenient => {
                        tracing::debug!("stats: skipping {}: {}", commit.hash(), e);
                    }
                    Err(e) => return Err(module_error(e)),
                }
            }
            if !self.files.is_empty() {
                self.row_id = 1;
            }
        } else {
            self.walk = Some(open_walk(&repo, None, &self.opts).map_err(module_error)?);
        }

        self.args = args;
        self.repo = Some(repo);
        if self.walk.is_some() {
            self.advance()?;
        }
        Ok(())
    }

    fn next(&mut self) -> rusqlite::Result<()> {
        self.file += 1;
        if self.file < self.files.len() {
            self.row_id += 1;
            return Ok(());
        }
        if self.walk.is_some() {
            self.advance()?;
        }
        Ok(())
    }

    fn eof(&self) -> bool {
        self.file >= self.files.len()
    }

    fn column(&self, ctx: &mut Context, i: c_int) -> rusqlite::Result<()> {
        let stat = match self.files.get(self.file) {
            Some(stat) => stat,
            None => return Ok(()),
        };
        match i {
            col::HASH => ctx.set_result(&self.hash),
            col::FILE_NAME => ctx.set_result(&stat.path),
            col::ADDITIONS => ctx.set_result(&stat.additions.map(|n| n as i64)),
            col::DELETIONS => ctx.set_result(&stat.deletions.map(|n| n as i64)),
            col::REPOSITORY => ctx.set_result(&self.args.repository),
            col::REV => ctx.set_result(&self.args.rev),
            _ => Ok(()),
        }
    }

    fn rowid(&self) -> rusqlite::Result<i64> {
        Ok(self.row_id)
    }
}

/// Resolves the single commit a narrowed stats cursor serves. The `rev`
/// argument and a pushed-down `hash` equality must agree when both are
/// present, since both were promised to SQLite as satisfied.
fn lookup_target(
    repo: &GitRepo,
    args: &PlanArgs,
    strictness: Strictness,
) -> rusqlite::Result<Option<CommitInfo>> {
    let by_hash = match args.hash.as_deref() {
        Some(hash) => match resolve_lookup("stats", repo.find_commit_by_hash(hash), strictness)? {
            Some(commit) => Some(commit),
            None => return Ok(None),
        },
        None => None,
    };
    let by_rev = match args.rev.as_deref() {
        Some(rev) => match resolve_lookup("stats", repo.resolve_rev(rev), strictness)? {
            Some(commit) => Some(commit),
            None => return Ok(None),
        },
        None => None,
    };
    Ok(match (by_hash, by_rev) {
        (Some(h), Some(r)) if h.id != r.id => None,
        (Some(h), _) => Some(h),
        (_, Some(r)) => Some(r),
        (None, None) => None,
    })
}
