//! Core roster types and parsing for the student check-in system.
//!
//! This crate turns a registration-form CSV export into student records:
//!
//! - [`RosterTable`] — loads the CSV fully into memory.
//! - [`RosterLayout`] — names the guardian and per-slot child columns
//!   (YAML-configurable, defaults to the registration form export).
//! - [`RowParser`] — extracts a [`GuardianRecord`] from each row.
//! - [`normalize_grade`] / [`GradeBand`] — map free-form grade labels onto
//!   the canonical reporting bands.
//! - [`build_students`] — fans each guardian row out into
//!   [`StudentRecord`]s, one per complete child slot.
//!
//! Persistence lives in the `checkin-roster-sqlite` crate.
//!
//! # Example
//!
//! ```
//! use checkin_roster_core::{RosterLayout, RosterTable, build_students};
//!
//! let layout = RosterLayout::default();
//! let mut header = layout.guardian.fixed_headers();
//! header.push(layout.child_name_header(1));
//! header.push(layout.child_grade_header(1));
//! let csv = format!("{}\n张三,,,,,Tom,Grade 7\n", header.join(","));
//! let table = RosterTable::from_reader(csv.as_bytes()).unwrap();
//! let batch = build_students(&table, &layout).unwrap();
//!
//! assert_eq!(batch.students.len(), 1);
//! assert_eq!(batch.students[0].grade.as_deref(), Some("7+"));
//! ```

mod error;
mod grade;
mod layout;
mod loader;
mod parse;
mod types;

pub use error::{Result, RosterError};
pub use grade::{GradeBand, normalize_grade};
pub use layout::{DEFAULT_MAX_CHILDREN, GuardianColumns, RosterLayout, SLOT_PLACEHOLDER};
pub use loader::RosterTable;
pub use parse::{RowParser, StudentBatch, build_students, clean_cell};
pub use types::{CheckoutRecord, ChildSlot, GuardianRecord, StudentRecord};
