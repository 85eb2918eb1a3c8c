//! SQLite storage and import pipeline for student check-in rosters.
//!
//! This crate persists [`StudentRecord`](checkin_roster_core::StudentRecord)s
//! produced by `checkin-roster-core` into a single-file SQLite database
//! shared with the check-in service and the attendance report.
//!
//! # Architecture
//!
//! - **`schema`** — table DDL and the ordered list of additive migrations
//! - **`migration`** — applies pending migrations, reports status
//! - **`convert`** — record ↔ row transformations
//! - **`store`** — append and read access to `students` and `checkouts`
//! - **`import`** — the end-to-end CSV → database pipeline
//!
//! # Quick start
//!
//! ```no_run
//! use checkin_roster_core::RosterLayout;
//! use checkin_roster_sqlite::Importer;
//!
//! let report = Importer::new(RosterLayout::default())
//!     .run("roster.csv", "checkin.db")
//!     .unwrap();
//! println!(
//!     "{} rows -> {} students",
//!     report.rows_read, report.students_inserted
//! );
//! ```

mod convert;
mod error;
mod import;
mod migration;
mod schema;
mod store;

pub use error::{Result, SqliteError};
pub use import::{ImportReport, Importer, import_batch, open_store};
pub use migration::{Migration, MigrationReport, MigrationStatus};
pub use schema::{CHECKOUTS_TABLE, LATEST_SCHEMA_VERSION, MIGRATIONS_TABLE, STUDENTS_TABLE};
pub use store::StudentStore;
