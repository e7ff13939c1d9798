//! The `commits(path [, ref])` relation.

use std::marker::PhantomData;
use std::os::raw::c_int;

use rusqlite::vtab::{
    sqlite3_vtab, sqlite3_vtab_cursor, Context, IndexInfo, VTab, VTabConnection, VTabCursor,
    Values,
};

use gitdag::{CommitInfo, CommitWalk, GitRepo};

use crate::plan::{choose_plan, FilterColumns, PlanArgs};
use crate::schema::{self, commits_col as col};
use crate::tables::{format_when, lookup_commit, module_error, open_walk, TableOptions};

const FILTER_COLUMNS: FilterColumns = FilterColumns {
    repository: col::REPOSITORY,
    rev: Some(col::REF),
    hash: Some(col::HASH),
};

#[repr(C)]
pub struct CommitsTable {
    base: sqlite3_vtab,
    opts: TableOptions,
}

unsafe impl<'vtab> VTab<'vtab> for CommitsTable {
    type Aux = TableOptions;
    type Cursor = CommitsCursor<'vtab>;

    fn connect(
        _db: &mut VTabConnection,
        aux: Option<&Self::Aux>,
        _args: &[&[u8]],
    ) -> rusqlite::Result<(String, Self)> {
        Ok((
            schema::COMMITS_SQL.to_owned(),
            CommitsTable {
                base: sqlite3_vtab::default(),
                opts: aux.copied().unwrap_or_default(),
            },
        ))
    }

    fn best_index(&self, info: &mut IndexInfo) -> rusqlite::Result<()> {
        choose_plan("commits", &FILTER_COLUMNS, 1, info)
    }

    fn open(&'vtab mut self) -> rusqlite::Result<Self::Cursor> {
        Ok(CommitsCursor {
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

#[repr(C)]
pub struct CommitsCursor<'vtab> {
    base: sqlite3_vtab_cursor,
    opts: TableOptions,
    repo: Option<GitRepo>,
    /// Raw repository argument `repo` was opened from, so joins that filter
    /// the same cursor repeatedly reuse the handle.
    opened_from: Option<String>,
    args: PlanArgs,
    walk: Option<CommitWalk>,
    current: Option<CommitInfo>,
    row_id: i64,
    phantom: PhantomData<&'vtab CommitsTable>,
}

impl CommitsCursor<'_> {
    fn advance(&mut self) -> rusqlite::Result<()> {
        let repo = match self.repo.as_ref() {
            Some(repo) => repo,
            None => return Ok(()),
        };
        let walk = match self.walk.as_mut() {
            Some(walk) => walk,
            None => return Ok(()),
        };
        match walk.next_commit(repo) {
            Some(Ok(commit)) => {
                self.current = Some(commit);
                self.row_id += 1;
            }
            Some(Err(e)) => return Err(module_error(e)),
            None => self.current = None,
        }
        Ok(())
    }
}

unsafe impl VTabCursor for CommitsCursor<'_> {
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
            self.current = lookup_commit("commits", &repo, &args, self.opts.strictness)?;
            if self.current.is_some() {
                self.row_id = 1;
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
        let commit = match &self.current {
            Some(commit) => commit,
            None => return Ok(()),
        };
        match i {
            col::HASH => ctx.set_result(&commit.hash()),
            col::MESSAGE => ctx.set_result(&commit.message),
            col::AUTHOR_NAME => ctx.set_result(&commit.author_name),
            col::AUTHOR_EMAIL => ctx.set_result(&commit.author_email),
            col::AUTHOR_WHEN => ctx.set_result(&format_when(&commit.author_when)),
            col::COMMITTER_NAME => ctx.set_result(&commit.committer_name),
            col::COMMITTER_EMAIL => ctx.set_result(&commit.committer_email),
            col::COMMITTER_WHEN => ctx.set_result(&format_when(&commit.committer_when)),
            col::REPOSITORY => ctx.set_result(&self.args.repository),
            col::REF => ctx.set_result(&self.args.rev),
            _ => Ok(()),
        }
    }

    fn rowid(&self) -> rusqlite::Result<i64> {
        Ok(self.row_id)
    }
}
