//! Error types for roster storage operations.
//!
//! Provides a unified error type covering database access, migrations,
//! record validation, and failures bubbled up from roster loading.

use std::path::PathBuf;

use checkin_roster_core::RosterError;
use thiserror::Error;

/// Errors that can occur during storage and import operations.
#[derive(Debug, Error)]
pub enum SqliteError {
    /// SQLite database operation failure.
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    /// The destination database cannot be opened or created.
    #[error("cannot open database '{}': {source}", .path.display())]
    OpenError {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// A schema migration step failed.
    #[error("migration error: {0}")]
    MigrationError(String),

    /// Table or column name contains invalid characters.
    #[error("invalid identifier '{0}': must contain only alphanumeric characters and underscores")]
    InvalidIdentifier(String),

    /// A student record violates a table constraint before it reaches SQLite.
    #[error("invalid student record: {0}")]
    InvalidStudent(String),

    /// The roster could not be loaded or parsed.
    #[error(transparent)]
    Roster(#[from] RosterError),
}

/// Convenience alias for results with [`SqliteError`].
pub type Result<T> = std::result::Result<T, SqliteError>;
