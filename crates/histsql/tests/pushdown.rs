//! Constraint pushdown and cursor lifecycle behavior.

use std::path::Path;
use std::process::Command;

use histsql::{register_tables, register_tables_with, Strictness, TableOptions};
use rusqlite::Connection;
use tempfile::TempDir;

// Pinned commit timestamps (2024-03-01 10:00 UTC and onwards).
const T0: &str = "1709287200 +0000";
const T1: &str = "1709287800 +0000";
const T2: &str = "1709288400 +0000";
const T3: &str = "1709289000 +0000";

fn git(path: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(path)
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn git_at(path: &Path, when: &str, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .env("GIT_AUTHOR_DATE", when)
        .env("GIT_COMMITTER_DATE", when)
        .current_dir(path)
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn init_repo(path: &Path) {
    git(path, &["init", "-b", "main"]);
    git(path, &["config", "user.email", "test@example.com"]);
    git(path, &["config", "user.name", "Test User"]);
    git(path, &["config", "commit.gpgsign", "false"]);
}

fn commit_file(path: &Path, file: &str, content: &str, message: &str, when: &str) {
    std::fs::write(path.join(file), content).expect("write file");
    git(path, &["add", "."]);
    git_at(path, when, &["commit", "-m", message]);
}

fn linear_fixture() -> TempDir {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path();
    init_repo(path);
    commit_file(path, "a.txt", "alpha\n", "add a", T0);
    commit_file(path, "b.txt", "beta\nlines\n", "add b", T1);
    commit_file(path, "c.txt", "gamma\n", "add c", T2);
    temp
}

fn merge_fixture() -> TempDir {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path();
    init_repo(path);
    commit_file(path, "README.md", "# repo\n", "base", T0);
    git(path, &["checkout", "-b", "topic"]);
    commit_file(path, "topic.txt", "topic work\n", "topic work", T1);
    git(path, &["checkout", "main"]);
    commit_file(path, "main.txt", "mainline\n", "mainline work", T2);
    git_at(path, T3, &["merge", "--no-ff", "topic", "-m", "merge topic"]);
    temp
}

fn connect() -> Connection {
    let conn = Connection::open_in_memory().expect("open connection");
    register_tables(&conn).expect("register tables");
    conn
}

fn query_strings(conn: &Connection, sql: &str) -> Vec<String> {
    let mut stmt = conn.prepare(sql).expect("prepare");
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .expect("query");
    rows.collect::<Result<Vec<_>, _>>().expect("collect rows")
}

#[test]
fn hash_equality_resolves_a_single_commit() {
    let temp = linear_fixture();
    let conn = connect();
    let head = git(temp.path(), &["rev-parse", "HEAD"]);

    let message: String = conn
        .query_row(
            &format!(
                "SELECT message FROM commits('{}') WHERE hash = '{}'",
                temp.path().display(),
                head
            ),
            [],
            |row| row.get(0),
        )
        .expect("point lookup");
    assert_eq!(message, "add c\n");
}

#[test]
fn unknown_hash_matches_no_rows_by_default() {
    let temp = linear_fixture();
    let conn = connect();
    let bogus = "deadbeef".repeat(5);

    let rows = query_strings(
        &conn,
        &format!(
            "SELECT hash FROM commits('{}') WHERE hash = '{bogus}'",
            temp.path().display()
        ),
    );
    assert!(rows.is_empty());

    let rows = query_strings(
        &conn,
        &format!(
            "SELECT file_name FROM stats('{}', '{bogus}')",
            temp.path().display()
        ),
    );
    assert!(rows.is_empty());
}

#[test]
fn strict_mode_surfaces_missing_objects() {
    let temp = linear_fixture();
    let conn = Connection::open_in_memory().expect("open connection");
    register_tables_with(
        &conn,
        TableOptions {
            strictness: Strictness::Strict,
            ..TableOptions::default()
        },
    )
    .expect("register tables");
    let bogus = "deadbeef".repeat(5);

    let mut stmt = conn
        .prepare(&format!(
            "SELECT file_name FROM stats('{}', '{bogus}')",
            temp.path().display()
        ))
        .expect("prepare");
    let result: Result<Vec<String>, _> = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .expect("bind")
        .collect();
    let err = result.expect_err("strict lookup should fail").to_string();
    assert!(err.contains("object not found"), "got: {err}");
}

#[test]
fn joining_commits_and_stats_on_hash() {
    let temp = linear_fixture();
    let conn = connect();
    let path = temp.path().display().to_string();

    let mut stmt = conn
        .prepare(&format!(
            "SELECT s.file_name, s.additions
             FROM commits('{path}') c
             JOIN stats('{path}') s ON c.hash = s.hash
             ORDER BY s.file_name"
        ))
        .expect("prepare join");
    let rows: Vec<(String, i64)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .expect("query join")
        .collect::<Result<_, _>>()
        .expect("collect join rows");

    assert_eq!(
        rows,
        vec![
            ("a.txt".to_string(), 1),
            ("b.txt".to_string(), 2),
            ("c.txt".to_string(), 1),
        ]
    );
}

#[test]
fn merges_point_lookup_excludes_ordinary_commits() {
    let temp = merge_fixture();
    let conn = connect();
    let path = temp.path().display().to_string();
    let merge = git(temp.path(), &["rev-parse", "HEAD"]);
    let ordinary = git(temp.path(), &["rev-parse", "HEAD^1"]);

    let rows = query_strings(
        &conn,
        &format!("SELECT hash FROM merges('{path}') WHERE hash = '{merge}'"),
    );
    assert_eq!(rows, vec![merge]);

    let rows = query_strings(
        &conn,
        &format!("SELECT hash FROM merges('{path}') WHERE hash = '{ordinary}'"),
    );
    assert!(rows.is_empty());
}

#[test]
fn limit_returns_after_one_row() {
    let temp = linear_fixture();
    let conn = connect();

    let rows = query_strings(
        &conn,
        &format!(
            "SELECT hash FROM commits('{}') LIMIT 1",
            temp.path().display()
        ),
    );
    assert_eq!(rows, vec![git(temp.path(), &["rev-parse", "HEAD"])]);
}

#[test]
fn repeated_scans_yield_identical_row_order() {
    let temp = merge_fixture();
    let conn = connect();
    let sql = format!("SELECT hash FROM commits('{}')", temp.path().display());

    let first = query_strings(&conn, &sql);
    let second = query_strings(&conn, &sql);
    assert_eq!(first, second);
}

#[test]
fn rowids_increase_monotonically_per_cursor() {
    let temp = linear_fixture();
    let conn = connect();

    let mut stmt = conn
        .prepare(&format!(
            "SELECT rowid FROM commits('{}')",
            temp.path().display()
        ))
        .expect("prepare");
    let rowids: Vec<i64> = stmt
        .query_map([], |row| row.get(0))
        .expect("query")
        .collect::<Result<_, _>>()
        .expect("collect rowids");

    assert_eq!(rowids.len(), 3);
    assert!(rowids.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn all_refs_option_widens_the_scan() {
    let temp = merge_fixture();
    let path = temp.path();
    git(path, &["checkout", "-b", "wip"]);
    commit_file(path, "wip.txt", "in progress\n", "wip work", T3);
    git(path, &["checkout", "main"]);

    let sql = format!("SELECT count(*) FROM commits('{}')", path.display());

    let conn = connect();
    let head_only: i64 = conn.query_row(&sql, [], |r| r.get(0)).expect("head scan");
    assert_eq!(head_only, 4);

    let conn = Connection::open_in_memory().expect("open connection");
    register_tables_with(
        &conn,
        TableOptions {
            all_refs: true,
            ..TableOptions::default()
        },
    )
    .expect("register tables");
    let everything: i64 = conn.query_row(&sql, [], |r| r.get(0)).expect("all-refs scan");
    assert_eq!(everything, 5);
}
