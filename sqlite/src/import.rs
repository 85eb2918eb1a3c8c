//! The roster import pipeline.
//!
//! Runs five stages in order, aborting on the first failure:
//!
//! 1. load the CSV into memory,
//! 2. parse guardian rows and fan them out into students,
//! 3. apply pending schema migrations,
//! 4. append every student,
//! 5. commit.
//!
//! Stages 3–5 share one transaction, so a failed run leaves the database
//! exactly as it was. Imports always append: running the same roster twice
//! stores every student twice.

use std::path::Path;

use checkin_roster_core::{RosterLayout, RosterTable, StudentBatch, StudentRecord, build_students};
use rusqlite::Connection;
use serde::Serialize;
use tracing::info;

use crate::convert;
use crate::error::{Result, SqliteError};
use crate::migration::{MigrationReport, apply_pending};

/// Summary of one import run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    /// `true` if the store was not touched.
    pub dry_run: bool,
    pub rows_read: usize,
    /// Child slots with a name or a grade but not both.
    pub slots_skipped: usize,
    pub students_inserted: usize,
    pub migrations: MigrationReport,
    /// Students in (row, slot) order; ids are set once inserted.
    pub students: Vec<StudentRecord>,
}

/// Configured import pipeline.
///
/// # Examples
///
/// ```no_run
/// use checkin_roster_core::RosterLayout;
/// use checkin_roster_sqlite::Importer;
///
/// let report = Importer::new(RosterLayout::default())
///     .run("roster.csv", "checkin.db")
///     .unwrap();
/// println!("imported {} students", report.students_inserted);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Importer {
    layout: RosterLayout,
    dry_run: bool,
}

impl Importer {
    pub fn new(layout: RosterLayout) -> Self {
        Self {
            layout,
            dry_run: false,
        }
    }

    /// When enabled, stops after stage 2 without opening the store.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn layout(&self) -> &RosterLayout {
        &self.layout
    }

    /// Imports the roster at `source` into the database at `store`.
    ///
    /// # Errors
    ///
    /// - [`SqliteError::Roster`] if the roster cannot be read, is not CSV,
    ///   or lacks a required column.
    /// - [`SqliteError::OpenError`] if the database cannot be opened.
    /// - [`SqliteError::MigrationError`], [`SqliteError::DatabaseError`], or
    ///   [`SqliteError::InvalidStudent`] if any write fails; nothing is
    ///   committed in that case.
    pub fn run(&self, source: impl AsRef<Path>, store: impl AsRef<Path>) -> Result<ImportReport> {
        let table = RosterTable::from_path(source)?;
        let batch = build_students(&table, &self.layout)?;

        if self.dry_run {
            info!(students = batch.students.len(), "dry run, store not opened");
            return Ok(ImportReport {
                dry_run: true,
                rows_read: batch.rows_read,
                slots_skipped: batch.slots_skipped,
                students: batch.students,
                ..Default::default()
            });
        }

        let mut conn = open_store(store)?;
        import_batch(&mut conn, batch)
    }
}

/// Opens (creating if needed) the database file at `path`.
pub fn open_store(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();
    let conn = Connection::open(path).map_err(|source| SqliteError::OpenError {
        path: path.to_path_buf(),
        source,
    })?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    Ok(conn)
}

/// Runs stages 3–5 for an already-built batch.
pub fn import_batch(conn: &mut Connection, batch: StudentBatch) -> Result<ImportReport> {
    let tx = conn.transaction()?;
    let migrations = apply_pending(&tx)?;
    let ids = convert::insert_students(&tx, &batch.students)?;
    tx.commit()?;

    let students: Vec<StudentRecord> = batch
        .students
        .into_iter()
        .zip(ids)
        .map(|(student, id)| StudentRecord {
            id: Some(id),
            ..student
        })
        .collect();

    info!(
        rows = batch.rows_read,
        students = students.len(),
        migrations = migrations.applied.len(),
        "import committed"
    );

    Ok(ImportReport {
        dry_run: false,
        rows_read: batch.rows_read,
        slots_skipped: batch.slots_skipped,
        students_inserted: students.len(),
        migrations,
        students,
    })
}
