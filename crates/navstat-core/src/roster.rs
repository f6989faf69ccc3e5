//! Input roster loading.
//!
//! The roster is a headed CSV with at least an `isin` column. It is read
//! fully into memory before any security is processed. Unreadable files,
//! a missing `isin` column and blank ISIN cells abort the run; whether an
//! identifier is actually known upstream is left to the per-security fetch.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::{Isin, SecurityRecord, ValidationError};

pub const ISIN_COLUMN: &str = "isin";

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("failed to read roster {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("roster {} has no 'isin' column", path.display())]
    MissingIsinColumn { path: PathBuf },
    #[error("roster {} row {row} has a blank isin", path.display())]
    InvalidIsin {
        path: PathBuf,
        row: usize,
        #[source]
        source: ValidationError,
    },
}

/// Securities to analyze, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    columns: Vec<String>,
    records: Vec<SecurityRecord>,
}

impl Roster {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RosterError> {
        let path = path.as_ref();
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_path(path)
            .map_err(|source| RosterError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let roster = Self::from_reader(path, reader)?;
        info!(
            records = roster.len(),
            path = %path.display(),
            "loaded {} records from {}",
            roster.len(),
            path.display()
        );
        Ok(roster)
    }

    fn from_reader<R: std::io::Read>(
        path: &Path,
        mut reader: csv::Reader<R>,
    ) -> Result<Self, RosterError> {
        let read_error = |source| RosterError::Read {
            path: path.to_path_buf(),
            source,
        };

        let columns: Vec<String> = reader
            .headers()
            .map_err(read_error)?
            .iter()
            .map(str::to_owned)
            .collect();
        let isin_index = columns
            .iter()
            .position(|column| column == ISIN_COLUMN)
            .ok_or_else(|| RosterError::MissingIsinColumn {
                path: path.to_path_buf(),
            })?;

        let mut records = Vec::new();
        for (offset, row) in reader.records().enumerate() {
            // Row 1 is the header.
            let row_number = offset + 2;
            let row = row.map_err(read_error)?;

            let isin = Isin::parse(row.get(isin_index).unwrap_or_default()).map_err(|source| {
                RosterError::InvalidIsin {
                    path: path.to_path_buf(),
                    row: row_number,
                    source,
                }
            })?;

            let fields = columns
                .iter()
                .zip(row.iter())
                .map(|(column, value)| (column.clone(), value.to_owned()))
                .collect();
            records.push(SecurityRecord::new(isin, fields));
        }

        Ok(Self { columns, records })
    }

    /// Header columns in file order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[SecurityRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
