//! Table shapes exposed to SQLite.

/// Declared shape of one virtual table.
#[derive(Debug, Clone, Copy)]
pub struct TableInfo {
    pub name: &'static str,
    /// DDL handed to SQLite at connect time. HIDDEN columns double as the
    /// table-valued-function arguments, in declaration order.
    pub create_sql: &'static str,
    /// Visible result columns, in declaration order.
    pub columns: &'static [&'static str],
}

pub(crate) const COMMITS_SQL: &str = "\
CREATE TABLE commits (
    hash            TEXT,
    message         TEXT,
    author_name     TEXT,
    author_email    TEXT,
    author_when     DATETIME,
    committer_name  TEXT,
    committer_email TEXT,
    committer_when  DATETIME,
    repository      TEXT HIDDEN,
    ref             TEXT HIDDEN
)";

pub(crate) const MERGES_SQL: &str = "\
CREATE TABLE merges (
    hash            TEXT,
    message         TEXT,
    author_name     TEXT,
    author_email    TEXT,
    author_when     DATETIME,
    committer_name  TEXT,
    committer_email TEXT,
    committer_when  DATETIME,
    time_to_merge   REAL,
    repository      TEXT HIDDEN,
    ref             TEXT HIDDEN
)";

pub(crate) const STATS_SQL: &str = "\
CREATE TABLE stats (
    hash       TEXT,
    file_name  TEXT,
    additions  INTEGER,
    deletions  INTEGER,
    repository TEXT HIDDEN,
    rev        TEXT HIDDEN
)";

const COMMIT_COLUMNS: &[&str] = &[
    "hash",
    "message",
    "author_name",
    "author_email",
    "author_when",
    "committer_name",
    "committer_email",
    "committer_when",
];

/// Every relation this crate registers.
pub const TABLES: &[TableInfo] = &[
    TableInfo {
        name: "commits",
        create_sql: COMMITS_SQL,
        columns: COMMIT_COLUMNS,
    },
    TableInfo {
        name: "merges",
        create_sql: MERGES_SQL,
        columns: &[
            "hash",
            "message",
            "author_name",
            "author_email",
            "author_when",
            "committer_name",
            "committer_email",
            "committer_when",
            "time_to_merge",
        ],
    },
    TableInfo {
        name: "stats",
        create_sql: STATS_SQL,
        columns: &["hash", "file_name", "additions", "deletions"],
    },
];

/// Looks up a table declaration by name.
pub fn table_info(name: &str) -> Option<&'static TableInfo> {
    TABLES.iter().find(|t| t.name == name)
}

/// Column indices for `commits`, matching [`COMMITS_SQL`].
pub(crate) mod commits_col {
    use std::os::raw::c_int;

    pub const HASH: c_int = 0;
    pub const MESSAGE: c_int = 1;
    pub const AUTHOR_NAME: c_int = 2;
    pub const AUTHOR_EMAIL: c_int = 3;
    pub const AUTHOR_WHEN: c_int = 4;
    pub const COMMITTER_NAME: c_int = 5;
    pub const COMMITTER_EMAIL: c_int = 6;
    pub const COMMITTER_WHEN: c_int = 7;
    pub const REPOSITORY: c_int = 8;
    pub const REF: c_int = 9;
}

/// Column indices for `merges`, matching [`MERGES_SQL`].
pub(crate) mod merges_col {
    use std::os::raw::c_int;

    pub const HASH: c_int = 0;
    pub const MESSAGE: c_int = 1;
    pub const AUTHOR_NAME: c_int = 2;
    pub const AUTHOR_EMAIL: c_int = 3;
    pub const AUTHOR_WHEN: c_int = 4;
    pub const COMMITTER_NAME: c_int = 5;
    pub const COMMITTER_EMAIL: c_int = 6;
    pub const COMMITTER_WHEN: c_int = 7;
    pub const TIME_TO_MERGE: c_int = 8;
    pub const REPOSITORY: c_int = 9;
    pub const REF: c_int = 10;
}

/// Column indices for `stats`, matching [`STATS_SQL`].
pub(crate) mod stats_col {
    use std::os::raw::c_int;

    pub const HASH: c_int = 0;
    pub const FILE_NAME: c_int = 1;
    pub const ADDITIONS: c_int = 2;
    pub const DELETIONS: c_int = 3;
    pub const REPOSITORY: c_int = 4;
    pub const REV: c_int = 5;
}
