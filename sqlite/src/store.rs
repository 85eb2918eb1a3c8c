//! Read and append access to the `students` and `checkouts` tables.
//!
//! # Example
//!
//! ```no_run
//! use checkin_roster_core::StudentRecord;
//! use checkin_roster_sqlite::{Migration, StudentStore};
//! use rusqlite::Connection;
//!
//! let mut migration = Migration::new(Connection::open("checkin.db").unwrap()).unwrap();
//! migration.up().unwrap();
//!
//! let store = StudentStore::new(migration.connection());
//! let student = StudentRecord {
//!     name: "Tom".into(),
//!     grade: Some("7+".into()),
//!     ..Default::default()
//! };
//! let ids = store.insert_students(&[student]).unwrap();
//! assert_eq!(store.get_student(ids[0]).unwrap().unwrap().name, "Tom");
//! ```

use checkin_roster_core::{CheckoutRecord, StudentRecord};
use rusqlite::{Connection, OptionalExtension};
use tracing::warn;

use crate::convert::{
    self, CHECKOUT_COLUMNS, STUDENT_COLUMNS, checkout_from_row, student_from_row,
};
use crate::error::Result;

/// Query interface over a migrated roster database.
///
/// Only appends and reads; imported rows are never updated or deleted.
pub struct StudentStore<'a> {
    conn: &'a Connection,
}

impl<'a> StudentStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Appends students under a savepoint, returning their ids.
    ///
    /// Either every student is inserted or none is. The savepoint nests, so
    /// the store also works over a connection with an open transaction, in
    /// which case nothing is durable until the caller commits.
    pub fn insert_students(&self, students: &[StudentRecord]) -> Result<Vec<i64>> {
        self.conn.execute_batch("SAVEPOINT insert_students")?;
        match convert::insert_students(self.conn, students) {
            Ok(ids) => {
                self.conn.execute_batch("RELEASE insert_students")?;
                Ok(ids)
            }
            Err(err) => {
                if let Err(rollback) = self
                    .conn
                    .execute_batch("ROLLBACK TO insert_students; RELEASE insert_students")
                {
                    warn!(error = %rollback, "failed to roll back student insert");
                }
                Err(err)
            }
        }
    }

    pub fn get_student(&self, id: i64) -> Result<Option<StudentRecord>> {
        let student = self
            .conn
            .query_row(
                &format!("SELECT {STUDENT_COLUMNS} FROM students WHERE id = ?1"),
                [id],
                student_from_row,
            )
            .optional()?;
        Ok(student)
    }

    /// All students in insertion order.
    pub fn all_students(&self) -> Result<Vec<StudentRecord>> {
        self.query_students(
            &format!("SELECT {STUDENT_COLUMNS} FROM students ORDER BY id"),
            [],
        )
    }

    /// Students in one grade, ordered by name as the attendance report
    /// lists them.
    pub fn students_in_grade(&self, grade: &str) -> Result<Vec<StudentRecord>> {
        self.query_students(
            &format!("SELECT {STUDENT_COLUMNS} FROM students WHERE grade = ?1 ORDER BY name, id"),
            [grade],
        )
    }

    pub fn count_students(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM students", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Pickup events recorded for a student, oldest first.
    pub fn checkouts_for_student(&self, student_id: i64) -> Result<Vec<CheckoutRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CHECKOUT_COLUMNS} FROM checkouts WHERE student_id = ?1 ORDER BY time, id"
        ))?;
        let checkouts = stmt
            .query_map([student_id], checkout_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(checkouts)
    }

    fn query_students<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<StudentRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let students = stmt
            .query_map(params, student_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(students)
    }
}
