//! # histsql
//!
//! Query Git commit history with SQL.
//!
//! histsql registers three eponymous virtual tables on a rusqlite
//! [`Connection`]. SQLite plans and executes the queries - joins, grouping,
//! ordering, limits - while the tables stream rows straight out of the
//! repository's object store, one commit at a time. Nothing is copied into
//! SQLite up front, so `LIMIT 5` over a million-commit repository reads
//! five commits.
//!
//! ## Quick Start
//!
//! ```no_run
//! use rusqlite::Connection;
//!
//! fn main() -> rusqlite::Result<()> {
//!     let conn = Connection::open_in_memory()?;
//!     histsql::register_tables(&conn)?;
//!
//!     let mut stmt = conn.prepare(
//!         "SELECT hash, author_name FROM commits('.') ORDER BY author_when DESC LIMIT 5",
//!     )?;
//!     let mut rows = stmt.query([])?;
//!     while let Some(row) = rows.next()? {
//!         let hash: String = row.get(0)?;
//!         let author: Option<String> = row.get(1)?;
//!         println!("{hash} {}", author.unwrap_or_default());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Available Tables
//!
//! - `commits(path [, ref])` - every commit reachable from `ref` (default
//!   HEAD): hash, message, author/committer names, emails, and timestamps.
//! - `merges(path [, ref])` - the subset of commits with two or more
//!   parents, plus `time_to_merge` in seconds (nullable).
//! - `stats(path [, rev])` - per-file added/removed line counts, one row
//!   per changed path per commit; `rev` narrows to a single commit, and an
//!   equality constraint on `hash` (the usual join key against `commits`)
//!   does the same.
//!
//! See [`TABLES`] for the declared shapes.

mod plan;
pub mod schema;
pub mod tables;

pub use schema::{table_info, TableInfo, TABLES};
pub use tables::{Strictness, TableOptions};

use rusqlite::vtab::eponymous_only_module;
use rusqlite::Connection;

use tables::commits::CommitsTable;
use tables::merges::MergesTable;
use tables::stats::StatsTable;

/// Registers the `commits`, `merges`, and `stats` table-valued functions on
/// `conn` with default options.
pub fn register_tables(conn: &Connection) -> rusqlite::Result<()> {
    register_tables_with(conn, TableOptions::default())
}

/// Registers the tables with explicit [`TableOptions`].
pub fn register_tables_with(conn: &Connection, opts: TableOptions) -> rusqlite::Result<()> {
    conn.create_module("commits", eponymous_only_module::<CommitsTable>(), Some(opts))?;
    conn.create_module("merges", eponymous_only_module::<MergesTable>(), Some(opts))?;
    conn.create_module("stats", eponymous_only_module::<StatsTable>(), Some(opts))?;
    Ok(())
}
