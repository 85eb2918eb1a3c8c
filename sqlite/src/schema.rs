//! Table definitions and the ordered list of additive migrations.
//!
//! # Table structure
//!
//! - `students` — one row per imported child, read by the attendance
//!   report and the check-in service.
//! - `checkouts` — pickup events written by the check-out service.
//! - `schema_migrations` — versions of the migrations below that have been
//!   recorded against this database.
//!
//! Every migration is additive and idempotent: tables are created with
//! `IF NOT EXISTS` and columns are only added after probing
//! `PRAGMA table_info`. This lets the importer adopt databases created by
//! older tools that never recorded a migration version.

use crate::error::{Result, SqliteError};

pub const STUDENTS_TABLE: &str = "students";
pub const CHECKOUTS_TABLE: &str = "checkouts";
pub const MIGRATIONS_TABLE: &str = "schema_migrations";

pub(crate) const CREATE_MIGRATIONS_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

const CREATE_STUDENTS_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS students (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    grade TEXT,
    father_name TEXT,
    mother_name TEXT
);
"#;

const CREATE_CHECKOUTS_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS checkouts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    student_id INTEGER NOT NULL,
    time TEXT NOT NULL,
    checked_out_by TEXT,
    FOREIGN KEY (student_id) REFERENCES students(id)
);
"#;

const CREATE_INDEXES_SQL: &str = r#"
CREATE INDEX IF NOT EXISTS idx_students_grade_name ON students(grade, name);
CREATE INDEX IF NOT EXISTS idx_checkouts_student ON checkouts(student_id);
"#;

/// A single idempotent schema change.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Step {
    /// SQL that is safe to re-run (`IF NOT EXISTS` forms only).
    Sql(&'static str),
    /// `ALTER TABLE ... ADD COLUMN`, skipped when the column already exists.
    AddColumn {
        table: &'static str,
        column: &'static str,
        decl: &'static str,
    },
}

/// A versioned migration: a named group of steps applied in one go.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MigrationDef {
    pub version: u32,
    pub name: &'static str,
    pub steps: &'static [Step],
}

/// Migrations in application order. Versions are strictly increasing and
/// never reused; new changes are appended.
pub(crate) const MIGRATIONS: &[MigrationDef] = &[
    MigrationDef {
        version: 1,
        name: "create_students",
        steps: &[Step::Sql(CREATE_STUDENTS_SQL)],
    },
    MigrationDef {
        version: 2,
        name: "students_contact_columns",
        steps: &[
            Step::AddColumn {
                table: STUDENTS_TABLE,
                column: "phone_number",
                decl: "TEXT",
            },
            Step::AddColumn {
                table: STUDENTS_TABLE,
                column: "wechat_id",
                decl: "TEXT",
            },
            Step::AddColumn {
                table: STUDENTS_TABLE,
                column: "email",
                decl: "TEXT",
            },
        ],
    },
    MigrationDef {
        version: 3,
        name: "students_authorized_pickup_person",
        steps: &[Step::AddColumn {
            table: STUDENTS_TABLE,
            column: "authorized_pickup_person",
            decl: "TEXT",
        }],
    },
    MigrationDef {
        version: 4,
        name: "create_checkouts",
        steps: &[Step::Sql(CREATE_CHECKOUTS_SQL)],
    },
    MigrationDef {
        version: 5,
        name: "checkouts_pickup_person_name",
        steps: &[Step::AddColumn {
            table: CHECKOUTS_TABLE,
            column: "pickup_person_name",
            decl: "TEXT",
        }],
    },
    MigrationDef {
        version: 6,
        name: "roster_indexes",
        steps: &[Step::Sql(CREATE_INDEXES_SQL)],
    },
];

/// Highest migration version known to this build.
pub const LATEST_SCHEMA_VERSION: u32 = MIGRATIONS[MIGRATIONS.len() - 1].version;

/// Validates that an identifier contains only alphanumeric characters and
/// underscores, so it can be interpolated into DDL.
pub(crate) fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(SqliteError::InvalidIdentifier(name.to_string()));
    }
    Ok(())
}

/// Builds the `ALTER TABLE` statement for an [`Step::AddColumn`].
pub(crate) fn add_column_sql(table: &str, column: &str, decl: &str) -> Result<String> {
    validate_identifier(table)?;
    validate_identifier(column)?;
    Ok(format!("ALTER TABLE {table} ADD COLUMN {column} {decl}"))
}
