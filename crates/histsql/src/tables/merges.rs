//! The `merges(path [, ref])` relation.
//!
//! A strict subset of `commits`: every row is a commit with two or more
//! parents, extended with `time_to_merge` in seconds (null when the topic
//! branch left no private history or the merge base is unknown).

use std::marker::PhantomData;
use std::os::raw::c_int;

use rusqlite::vtab::{
    sqlite3_vtab, sqlite3_vtab_cursor, Context, IndexInfo, VTab, VTabConnection, VTabCursor,
    Values,
};

use gitdag::{time_to_merge, CommitInfo, CommitWalk, GitRepo};

use crate::plan::{choose_plan, FilterColumns, PlanArgs};
use crate::schema::{self, merges_col as col};
use crate::tables::{format_when, lookup_commit, module_error, open_walk, TableOptions};

const FILTER_COLUMNS: FilterColumns = FilterColumns {
    repository: col::REPOSITORY,
    rev: Some(col::REF),
    hash: Some(col::HASH),
};

#[repr(C)]
pub struct MergesTable {
    base: sqlite3_vtab,
    opts: TableOptions,
}

unsafe impl<'vtab> VTab<'vtab> for MergesTable {
    type Aux = TableOptions;
    type Cursor = MergesCursor<'vtab>;

    fn connect(
        _db: &mut VTabConnection,
        aux: Option<&Self::Aux>,
        _args: &[&[u8]],
    ) -> rusqlite::Result<(String, Self)> {
        Ok((
            schema::MERGES_SQL.to_owned(),
            MergesTable {
                base: sqlite3_vtab::default(),
                opts: aux.copied().unwrap_or_default(),
            },
        ))
    }

    fn best_index(&self, info: &mut IndexInfo) -> rusqlite::Result<()> {
        choose_plan("merges", &FILTER_COLUMNS, 1, info)
    }

    fn open(&'vtab mut self) -> rusqlite::Result<Self::Cursor> {
        Ok(MergesCursor {
            base: sqlite3_vtab_cursor::default(),
            opts: self.opts,
            repo: None,
            opened_from: None,
            args: PlanArgs::default(),
            walk: None,
            current: None,
            row_id: 0,
            phantom: PhantomData,
        })
    }
}

struct MergeRow {
    commit: CommitInfo,
    time_to_merge: Option<f64>,
}

#[repr(C)]
pub struct MergesCursor<'vtab> {
    base: sqlite3_vtab_cursor,
    opts: TableOptions,
    repo: Option<GitRepo>,
    opened_from: Option<String>,
    args: PlanArgs,
    walk: Option<CommitWalk>,
    current: Option<MergeRow>,
    row_id: i64,
    phantom: PhantomData<&'vtab MergesTable>,
}

impl MergesCursor<'_> {
    /// Pulls the walk until the next merge commit, computing its
    /// time-to-merge once so `column` stays side-effect free.
    fn advance(&mut self) -> rusqlite::Result<()> {
        self.current = None;
        let repo = match self.repo.as_ref() {
            Some(repo) => repo,
            None => return Ok(()),
        };
        let walk = match self.walk.as_mut() {
            Some(walk) => walk,
            None => return Ok(()),
        };
        loop {
            match walk.next_commit(repo) {
                Some(Ok(commit)) => {
                    if !commit.is_merge() {
                        continue;
                    }
                    let time_to_merge = time_to_merge(repo, &commit);
                    self.current = Some(MergeRow {
                        commit,
                        time_to_merge,
                    });
                    self.row_id += 1;
                    return Ok(());
                }
                Some(Err(e)) => return Err(module_error(e)),
                None => return Ok(()),
            }
        }
    }
}

unsafe impl VTabCursor for MergesCursor<'_> {
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
        self.current = None;
        self.row_id = 0;

        if args.hash.is_some() {
            if let Some(commit) = lookup_commit("merges", &repo, &args, self.opts.strictness)? {
                if commit.is_merge() {
                    let time_to_merge = time_to_merge(&repo, &commit);
                    self.current = Some(MergeRow {
                        commit,
                        time_to_merge,
                    });
                    self.row_id = 1;
                }
            }
        } else {
            self.walk = Some(open_walk(&repo, args.rev.as_deref(), &self.opts).map_err(module_error)?);
        }

        self.args = args;
        self.repo = Some(repo);
        if self.walk.is_some() {
            self.advance()?;
        }
        Ok(())
    }

    fn next(&mut self) -> rusqlite::Result<()> {
        if self.walk.is_some() {
            self.advance()
        } else {
            self.current = None;
            Ok(())
        }
    }

    fn eof(&self) -> bool {
        self.current.is_none()
    }

    fn column(&self, ctx: &mut Context, i: c_int) -> rusqlite::Result<()> {
        let row = match &self.current {
            Some(row) => row,
            None => return Ok(()),
        };
        match i {
            col::HASH => ctx.set_result(&row.commit.hash()),
            col::MESSAGE => ctx.set_result(&row.commit.message),
            col::AUTHOR_NAME => ctx.set_result(&row.commit.author_name),
            col::AUTHOR_EMAIL => ctx.set_result(&row.commit.author_email),
            col::AUTHOR_WHEN => ctx.set_result(&format_when(&row.commit.author_when)),
            col::COMMITTER_NAME => ctx.set_result(&row.commit.committer_name),
            col::COMMITTER_EMAIL => ctx.set_result(&row.commit.committer_email),
            col::COMMITTER_WHEN => ctx.set_result(&format_when(&row.commit.committer_when)),
            col::TIME_TO_MERGE => ctx.set_result(&row.time_to_merge),
            col::REPOSITORY => ctx.set_result(&self.args.repository),
            col::REF => ctx.set_result(&self.args.rev),
            _ => Ok(()),
        }
    }

    fn rowid(&self) -> rusqlite::Result<i64> {
        Ok(self.row_id)
    }
}
