//! Guardian row parsing and student fan-out.
//!
//! [`RowParser`] resolves a [`RosterLayout`] against a file's header row
//! once, then extracts a [`GuardianRecord`] from each data row by column
//! index. [`build_students`] drives the parser over a whole
//! [`RosterTable`].

use csv::StringRecord;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Result, RosterError};
use crate::layout::RosterLayout;
use crate::loader::RosterTable;
use crate::types::{ChildSlot, GuardianRecord, StudentRecord};

/// Trims a cell, mapping missing or blank values to `None`.
pub fn clean_cell(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Column indexes resolved from a header row. `None` means the header is
/// absent from the file.
#[derive(Debug, Clone, Default)]
struct ColumnIndex {
    father_name: Option<usize>,
    phone_number: Option<usize>,
    wechat_id: Option<usize>,
    email: Option<usize>,
    mother_name: Option<usize>,
    authorized_pickup_person: Option<usize>,
    /// (name, grade) column per slot, slot 1 first.
    children: Vec<(Option<usize>, Option<usize>)>,
}

/// Extracts [`GuardianRecord`]s from rows of a specific CSV file.
#[derive(Debug, Clone)]
pub struct RowParser {
    columns: ColumnIndex,
}

impl RowParser {
    /// Builds a parser for the given header row.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::InvalidLayout`] if the layout is invalid, or
    /// [`RosterError::MissingColumns`] listing every required header absent
    /// from `headers`.
    pub fn new(layout: &RosterLayout, headers: &[String]) -> Result<Self> {
        layout.validate()?;

        let missing: Vec<String> = layout
            .required_headers
            .iter()
            .filter(|required| !headers.iter().any(|h| h == *required))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(RosterError::MissingColumns(missing));
        }

        let find = |name: &str| headers.iter().position(|h| h == name);
        let g = &layout.guardian;
        let columns = ColumnIndex {
            father_name: find(g.primary_name.as_str()),
            phone_number: find(g.primary_phone.as_str()),
            wechat_id: find(g.primary_wechat.as_str()),
            email: find(g.primary_email.as_str()),
            mother_name: find(g.secondary_name.as_str()),
            authorized_pickup_person: find(g.authorized_pickup.as_str()),
            children: (1..=layout.max_children)
                .map(|slot| {
                    (
                        find(layout.child_name_header(slot).as_str()),
                        find(layout.child_grade_header(slot).as_str()),
                    )
                })
                .collect(),
        };

        Ok(Self { columns })
    }

    /// Parses one data row.
    pub fn parse(&self, record: &StringRecord) -> GuardianRecord {
        let cell = |index: Option<usize>| clean_cell(index.and_then(|i| record.get(i)));
        let c = &self.columns;

        GuardianRecord {
            father_name: cell(c.father_name),
            phone_number: cell(c.phone_number),
            wechat_id: cell(c.wechat_id),
            email: cell(c.email),
            mother_name: cell(c.mother_name),
            authorized_pickup_person: cell(c.authorized_pickup_person),
            children: c
                .children
                .iter()
                .enumerate()
                .map(|(i, (name, grade))| ChildSlot {
                    slot: i + 1,
                    name: cell(*name),
                    grade: cell(*grade),
                })
                .collect(),
        }
    }
}

/// Students produced from one roster, in (row, slot) order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StudentBatch {
    /// Number of guardian rows read.
    pub rows_read: usize,
    /// Child slots with a name or a grade but not both.
    pub slots_skipped: usize,
    pub students: Vec<StudentRecord>,
}

/// Parses every row of `table` and fans guardian rows out into students.
///
/// # Errors
///
/// Fails before any row is processed if the header row does not satisfy
/// `layout` (see [`RowParser::new`]).
pub fn build_students(table: &RosterTable, layout: &RosterLayout) -> Result<StudentBatch> {
    let parser = RowParser::new(layout, table.headers())?;
    let mut batch = StudentBatch::default();

    for (line, record) in table.rows().iter().enumerate() {
        let guardian = parser.parse(record);
        let students = guardian.students();
        debug!(row = line + 1, students = students.len(), "parsed guardian row");

        batch.rows_read += 1;
        batch.slots_skipped += guardian.incomplete_slots();
        batch.students.extend(students);
    }

    info!(
        rows = batch.rows_read,
        students = batch.students.len(),
        skipped = batch.slots_skipped,
        "built student batch"
    );
    Ok(batch)
}
