//! Constraint pushdown planning shared by the table modules.
//!
//! SQLite describes the constraints a query makes available; the planner
//! consumes equality constraints on the closed set of filterable columns
//! (the hidden `repository` and `rev`/`ref` arguments, and the `hash`
//! column for point lookups), marks them `omit` so SQLite does not
//! re-filter, and encodes the consumed set in `idx_num` for the cursor's
//! filter to decode. Everything else is advisory: declined constraints are
//! left for SQLite to evaluate, and `ORDER BY` is never claimed because the
//! frontier walk is only locally time-ordered.

use std::os::raw::c_int;

use rusqlite::vtab::{IndexConstraintOp, IndexInfo, Values};

/// Which declared columns of a table can receive pushed-down equality
/// constraints.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FilterColumns {
    /// Hidden repository-path argument.
    pub repository: c_int,
    /// Hidden ref/rev argument, when the table has one.
    pub rev: Option<c_int>,
    /// Hash column usable for point lookup.
    pub hash: Option<c_int>,
}

/// Access path chosen for one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Access {
    /// Walk every commit reachable from the start point.
    FullScan,
    /// Resolve a single commit directly by hash.
    PointLookup,
}

const IDX_REPOSITORY: c_int = 1;
const IDX_REV: c_int = 2;
const IDX_HASH: c_int = 4;

// The repository is not open at plan time (the path itself arrives as a
// constraint), so scan cost cannot be proportional to the actual history
// size; these constants only have to rank the two access paths sanely.
const FULL_SCAN_COST: f64 = 100_000.0;
const FULL_SCAN_ROWS: i64 = 10_000;
const POINT_LOOKUP_COST: f64 = 10.0;

/// `best_index` body shared by all three tables: pick the access path, bind
/// argv slots in fixed (repository, rev, hash) order, report cost.
pub(crate) fn choose_plan(
    table: &'static str,
    columns: &FilterColumns,
    point_rows: i64,
    info: &mut IndexInfo,
) -> rusqlite::Result<()> {
    let mut repository = None;
    let mut rev = None;
    let mut hash = None;

    for (position, constraint) in info.constraints().enumerate() {
        if !constraint.is_usable() {
            continue;
        }
        if constraint.operator() != IndexConstraintOp::SQLITE_INDEX_CONSTRAINT_EQ {
            tracing::debug!(
                "{}: declining {:?} constraint on column {}",
                table,
                constraint.operator(),
                constraint.column()
            );
            continue;
        }
        let column = constraint.column();
        if column == columns.repository {
            repository = repository.or(Some(position));
        } else if Some(column) == columns.rev {
            rev = rev.or(Some(position));
        } else if Some(column) == columns.hash {
            hash = hash.or(Some(position));
        } else {
            tracing::debug!("{}: declining constraint on column {}", table, column);
        }
    }

    let mut idx_num = 0;
    let mut argv: c_int = 0;
    for (position, bit) in [
        (repository, IDX_REPOSITORY),
        (rev, IDX_REV),
        (hash, IDX_HASH),
    ] {
        if let Some(position) = position {
            argv += 1;
            let mut usage = info.constraint_usage(position);
            usage.set_argv_index(argv);
            usage.set_omit(true);
            idx_num |= bit;
        }
    }

    let access = if idx_num & IDX_HASH != 0 {
        Access::PointLookup
    } else {
        Access::FullScan
    };
    match access {
        Access::FullScan => {
            info.set_estimated_cost(FULL_SCAN_COST);
            info.set_estimated_rows(FULL_SCAN_ROWS);
        }
        Access::PointLookup => {
            info.set_estimated_cost(POINT_LOOKUP_COST);
            info.set_estimated_rows(point_rows);
        }
    }
    info.set_idx_num(idx_num);
    tracing::debug!("{}: {:?} idx_num={}", table, access, idx_num);
    Ok(())
}

/// Arguments delivered to a cursor's filter, decoded from `idx_num` and the
/// argv values bound by [`choose_plan`].
#[derive(Debug, Default)]
pub(crate) struct PlanArgs {
    pub repository: Option<String>,
    pub rev: Option<String>,
    pub hash: Option<String>,
}

impl PlanArgs {
    pub fn decode(idx_num: c_int, args: &Values<'_>) -> rusqlite::Result<Self> {
        let mut decoded = PlanArgs::default();
        let mut next = 0;
        for bit in [IDX_REPOSITORY, IDX_REV, IDX_HASH] {
            if idx_num & bit == 0 {
                continue;
            }
            let value: Option<String> = args.get(next)?;
            next += 1;
            match bit {
                IDX_REPOSITORY => decoded.repository = value,
                IDX_REV => decoded.rev = value,
                _ => decoded.hash = value,
            }
        }
        Ok(decoded)
    }

    /// Repository path, defaulting to the current directory when the
    /// argument is omitted.
    pub fn repository_path(&self) -> &str {
        self.repository.as_deref().unwrap_or(".")
    }
}
