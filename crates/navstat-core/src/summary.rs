//! Consolidated end-of-run summary.

use std::path::{Path, PathBuf};

use thiserror::Error;
use time::Date;

use crate::statistics::{MetricSet, METRIC_NAMES};
use crate::SecurityRecord;

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("failed to write summary {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Roster fields of one security merged with its metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub record: SecurityRecord,
    pub metrics: MetricSet,
}

/// Rows for every security that made it through the pipeline, in roster order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchResult {
    rows: Vec<ResultRow>,
}

impl BatchResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: ResultRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write the batch as CSV: roster `columns`, then the metric columns.
    ///
    /// A roster column named like a metric keeps its position but holds the
    /// computed metric, so no column appears twice. An empty batch still
    /// produces a file holding just the header.
    pub fn write_csv(&self, columns: &[String], path: &Path) -> Result<(), SummaryError> {
        let write_error = |source| SummaryError::Write {
            path: path.to_path_buf(),
            source,
        };

        let appended: Vec<&str> = METRIC_NAMES
            .iter()
            .copied()
            .filter(|metric| !columns.iter().any(|column| column == metric))
            .collect();

        let mut writer = csv::Writer::from_path(path).map_err(write_error)?;

        let header = columns
            .iter()
            .map(String::as_str)
            .chain(appended.iter().copied());
        writer.write_record(header).map_err(write_error)?;

        for row in &self.rows {
            let metrics = row.metrics.named();
            let metric = |name: &str| {
                metrics
                    .iter()
                    .find(|(candidate, _)| *candidate == name)
                    .map(|(_, value)| value.to_string())
            };

            let line: Vec<String> = columns
                .iter()
                .map(|column| {
                    metric(column.as_str())
                        .unwrap_or_else(|| row.record.field(column).unwrap_or_default().to_owned())
                })
                .chain(appended.iter().filter_map(|name| metric(*name)))
                .collect();
            writer.write_record(&line).map_err(write_error)?;
        }

        writer
            .flush()
            .map_err(|e| write_error(csv::Error::from(e)))?;
        Ok(())
    }
}

/// Summary file name for a run on `date`.
pub fn summary_file_name(date: Date) -> String {
    format!("{date}_report.csv")
}
