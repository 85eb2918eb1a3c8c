//! Migration lifecycle for the roster tables.
//!
//! Provides [`Migration`] for applying pending additive migrations and
//! reporting the schema state. Pending migrations are applied within a
//! single transaction and recorded in `schema_migrations`.
//!
//! # Example
//!
//! ```no_run
//! use checkin_roster_sqlite::Migration;
//! use rusqlite::Connection;
//!
//! let conn = Connection::open("checkin.db").unwrap();
//! let mut migration = Migration::new(conn).unwrap();
//!
//! let report = migration.up().unwrap();
//! for column in &report.columns_added {
//!     println!("added column {column}");
//! }
//!
//! let status = migration.status().unwrap();
//! assert!(status.students_exists);
//! ```

use std::collections::BTreeSet;

use rusqlite::{Connection, params};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Result, SqliteError};
use crate::schema::{
    CHECKOUTS_TABLE, CREATE_MIGRATIONS_TABLE_SQL, MIGRATIONS, MIGRATIONS_TABLE, MigrationDef,
    STUDENTS_TABLE, Step, add_column_sql, validate_identifier,
};

/// Manages the schema of the roster database.
///
/// Migrations are additive only; there is no `down`. Running
/// [`up`](Self::up) repeatedly is safe.
pub struct Migration {
    conn: Connection,
}

impl Migration {
    /// Wraps a connection, enabling foreign key enforcement.
    pub fn new(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    /// Applies all pending migrations.
    ///
    /// Executes within a transaction for atomicity.
    pub fn up(&mut self) -> Result<MigrationReport> {
        let tx = self.conn.transaction()?;
        let report = apply_pending(&tx)?;
        tx.commit()?;
        Ok(report)
    }

    /// Returns the current schema state.
    pub fn status(&self) -> Result<MigrationStatus> {
        status(&self.conn)
    }

    /// Returns a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Consumes the migration and returns the underlying connection.
    pub fn into_connection(self) -> Connection {
        self.conn
    }
}

/// Outcome of applying migrations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    /// Names of migrations recorded by this run, in order.
    pub applied: Vec<String>,
    /// `table.column` entries actually added by this run.
    pub columns_added: Vec<String>,
}

impl MigrationReport {
    pub fn is_empty(&self) -> bool {
        self.applied.is_empty()
    }
}

/// Snapshot of the schema and row counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationStatus {
    /// Highest recorded migration version, `None` if none was recorded.
    pub schema_version: Option<u32>,
    /// Names of migrations not yet recorded.
    pub pending: Vec<String>,
    pub students_exists: bool,
    pub checkouts_exists: bool,
    pub student_count: usize,
    pub checkout_count: usize,
}

/// Applies every unrecorded migration on `conn`.
///
/// Steps of already recorded migrations are re-run as well. They are
/// idempotent, and this restores columns lost when another service
/// recreates a table after the version was recorded.
///
/// The caller owns the transaction, so the import pipeline can commit
/// schema changes together with the inserted rows.
pub(crate) fn apply_pending(conn: &Connection) -> Result<MigrationReport> {
    conn.execute_batch(CREATE_MIGRATIONS_TABLE_SQL)?;
    let recorded = recorded_versions(conn)?;
    let mut report = MigrationReport::default();

    for def in MIGRATIONS {
        apply_one(conn, def, &mut report)?;
        if recorded.contains(&def.version) {
            continue;
        }
        conn.execute(
            "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
            params![def.version, def.name],
        )?;
        info!(version = def.version, name = def.name, "applied migration");
        report.applied.push(def.name.to_string());
    }

    if report.is_empty() && report.columns_added.is_empty() {
        debug!("schema is up to date");
    }
    Ok(report)
}

fn apply_one(conn: &Connection, def: &MigrationDef, report: &mut MigrationReport) -> Result<()> {
    let fail = |e: rusqlite::Error| SqliteError::MigrationError(format!("{}: {e}", def.name));

    for step in def.steps {
        match *step {
            Step::Sql(sql) => conn.execute_batch(sql).map_err(fail)?,
            Step::AddColumn {
                table,
                column,
                decl,
            } => {
                if column_exists(conn, table, column)? {
                    debug!(table, column, "column already present");
                    continue;
                }
                conn.execute_batch(&add_column_sql(table, column, decl)?)
                    .map_err(fail)?;
                info!(table, column, "added column");
                report.columns_added.push(format!("{table}.{column}"));
            }
        }
    }
    Ok(())
}

fn recorded_versions(conn: &Connection) -> Result<BTreeSet<u32>> {
    let mut stmt = conn.prepare("SELECT version FROM schema_migrations")?;
    let versions = stmt
        .query_map([], |row| row.get::<_, u32>(0))?
        .collect::<std::result::Result<BTreeSet<_>, _>>()?;
    Ok(versions)
}

pub(crate) fn status(conn: &Connection) -> Result<MigrationStatus> {
    let recorded = if table_exists(conn, MIGRATIONS_TABLE)? {
        recorded_versions(conn)?
    } else {
        BTreeSet::new()
    };
    let students_exists = table_exists(conn, STUDENTS_TABLE)?;
    let checkouts_exists = table_exists(conn, CHECKOUTS_TABLE)?;

    Ok(MigrationStatus {
        schema_version: recorded.last().copied(),
        pending: MIGRATIONS
            .iter()
            .filter(|m| !recorded.contains(&m.version))
            .map(|m| m.name.to_string())
            .collect(),
        students_exists,
        checkouts_exists,
        student_count: if students_exists {
            count_rows(conn, STUDENTS_TABLE)?
        } else {
            0
        },
        checkout_count: if checkouts_exists {
            count_rows(conn, CHECKOUTS_TABLE)?
        } else {
            0
        },
    })
}

/// Checks whether a table exists.
pub(crate) fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
        [table],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Lists a table's column names in declaration order.
pub(crate) fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>> {
    validate_identifier(table)?;
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(columns)
}

fn column_exists(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    Ok(table_columns(conn, table)?.iter().any(|c| c == column))
}

fn count_rows(conn: &Connection, table: &str) -> Result<usize> {
    validate_identifier(table)?;
    let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
        row.get(0)
    })?;
    Ok(count as usize)
}
