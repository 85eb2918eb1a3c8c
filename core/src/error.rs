//! Error types for roster loading and parsing.
//!
//! Covers every fatal condition raised before the destination store is
//! touched: unreadable source files, malformed CSV, header mismatches, and
//! invalid layout configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading or parsing a roster.
#[derive(Debug, Error)]
pub enum RosterError {
    /// The roster file does not exist or cannot be opened.
    #[error("cannot read roster file '{}': {source}", .path.display())]
    FileError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The roster cannot be parsed as CSV.
    #[error("roster is not valid CSV: {0}")]
    FormatError(String),

    /// One or more required columns are absent from the header row.
    #[error("roster header is missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// The roster layout configuration is unusable.
    #[error("invalid roster layout: {0}")]
    InvalidLayout(String),

    /// File I/O failure outside of roster loading (e.g. layout files).
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

impl From<csv::Error> for RosterError {
    fn from(err: csv::Error) -> Self {
        Self::FormatError(err.to_string())
    }
}

/// Convenience alias for results with [`RosterError`].
pub type Result<T> = std::result::Result<T, RosterError>;
