//! Conversion between roster records and SQLite rows.
//!
//! Functions here take a plain [`Connection`] so they work equally on a
//! connection or an open transaction (which derefs to one).

use checkin_roster_core::{CheckoutRecord, StudentRecord};
use rusqlite::{Connection, Row, params};

use crate::error::{Result, SqliteError};

/// Column list used by every `students` SELECT, in [`student_from_row`] order.
pub(crate) const STUDENT_COLUMNS: &str = "id, name, grade, father_name, mother_name, \
     phone_number, wechat_id, email, authorized_pickup_person";

/// Column list used by every `checkouts` SELECT, in [`checkout_from_row`] order.
pub(crate) const CHECKOUT_COLUMNS: &str =
    "id, student_id, time, checked_out_by, pickup_person_name";

const INSERT_STUDENT_SQL: &str = "INSERT INTO students (
    name, grade, father_name, mother_name, phone_number, wechat_id, email, authorized_pickup_person
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";

/// Inserts students in order, returning the assigned ids.
///
/// Any `id` already set on a record is ignored; ids are always assigned by
/// SQLite so re-imports append rather than overwrite.
pub(crate) fn insert_students(conn: &Connection, students: &[StudentRecord]) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare_cached(INSERT_STUDENT_SQL)?;
    let mut ids = Vec::with_capacity(students.len());

    for student in students {
        if student.name.trim().is_empty() {
            return Err(SqliteError::InvalidStudent(
                "name must not be blank".to_string(),
            ));
        }
        stmt.execute(params![
            student.name,
            student.grade,
            student.father_name,
            student.mother_name,
            student.phone_number,
            student.wechat_id,
            student.email,
            student.authorized_pickup_person,
        ])?;
        ids.push(conn.last_insert_rowid());
    }
    Ok(ids)
}

pub(crate) fn student_from_row(row: &Row<'_>) -> rusqlite::Result<StudentRecord> {
    Ok(StudentRecord {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        grade: row.get(2)?,
        father_name: row.get(3)?,
        mother_name: row.get(4)?,
        phone_number: row.get(5)?,
        wechat_id: row.get(6)?,
        email: row.get(7)?,
        authorized_pickup_person: row.get(8)?,
    })
}

pub(crate) fn checkout_from_row(row: &Row<'_>) -> rusqlite::Result<CheckoutRecord> {
    Ok(CheckoutRecord {
        id: row.get(0)?,
        student_id: row.get(1)?,
        time: row.get(2)?,
        checked_out_by: row.get(3)?,
        pickup_person_name: row.get(4)?,
    })
}
