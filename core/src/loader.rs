//! CSV roster loading.
//!
//! Reads the whole roster into memory as a header row plus an ordered list
//! of records. Short rows are accepted; their trailing cells read as absent.

use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use crate::error::{Result, RosterError};

/// An in-memory roster: the header row and every data row in file order.
#[derive(Debug, Clone, Default)]
pub struct RosterTable {
    headers: Vec<String>,
    rows: Vec<StringRecord>,
}

impl RosterTable {
    /// Loads a roster from a CSV file.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::FileError`] if the file cannot be opened and
    /// [`RosterError::FormatError`] if its contents are not valid CSV.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| RosterError::FileError {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_reader(file)?;
        debug!(
            path = %path.display(),
            rows = table.rows.len(),
            "loaded roster"
        );
        Ok(table)
    }

    /// Loads a roster from any CSV byte stream.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);

        let headers = rdr.headers()?.iter().map(String::from).collect();
        let rows = rdr
            .records()
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self { headers, rows })
    }

    /// Header names, exactly as they appear in the file.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Data rows in file order.
    pub fn rows(&self) -> &[StringRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
