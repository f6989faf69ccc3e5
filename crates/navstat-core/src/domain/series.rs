use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;
use time::Duration;

use crate::UtcDateTime;

/// Raw NAV rows that cannot be turned into a series.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SeriesError {
    #[error("nav data must be a JSON array of [timestamp, value] rows")]
    NotAnArray,
    #[error("nav row {index} is malformed: {reason}")]
    MalformedRow { index: usize, reason: String },
    #[error("nav row {index} has timestamp {value} outside the supported calendar range")]
    TimestampOutOfRange { index: usize, value: i64 },
}

/// Single NAV observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavPoint {
    pub at: UtcDateTime,
    pub value: f64,
}

/// NAV observations for one security in strictly increasing time order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NavSeries {
    points: Vec<NavPoint>,
}

impl NavSeries {
    /// Build a series from upstream `[[epoch_seconds, nav], ...]` rows.
    ///
    /// Rows are indexed by timestamp, so the result is chronological no
    /// matter how the payload is ordered. When a timestamp repeats, the
    /// row appearing last in the payload wins.
    pub fn from_raw_rows(rows: &Value) -> Result<Self, SeriesError> {
        let rows = rows.as_array().ok_or(SeriesError::NotAnArray)?;

        let mut indexed = BTreeMap::new();
        for (index, row) in rows.iter().enumerate() {
            let (seconds, value) = parse_row(index, row)?;
            let at = UtcDateTime::from_unix_seconds(seconds).map_err(|_| {
                SeriesError::TimestampOutOfRange {
                    index,
                    value: seconds,
                }
            })?;
            indexed.insert(at, value);
        }

        Ok(Self::from_indexed(indexed))
    }

    /// Build a series from already-parsed observations, same ordering rules.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (UtcDateTime, f64)>) -> Self {
        Self::from_indexed(pairs.into_iter().collect())
    }

    fn from_indexed(indexed: BTreeMap<UtcDateTime, f64>) -> Self {
        Self {
            points: indexed
                .into_iter()
                .map(|(at, value)| NavPoint { at, value })
                .collect(),
        }
    }

    pub fn points(&self) -> &[NavPoint] {
        &self.points
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|point| point.value).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&NavPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&NavPoint> {
        self.points.last()
    }

    /// Time covered from the first to the last observation.
    pub fn span(&self) -> Option<Duration> {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) => Some(last.at.since(first.at)),
            _ => None,
        }
    }
}

fn parse_row(index: usize, row: &Value) -> Result<(i64, f64), SeriesError> {
    let malformed = |reason: &str| SeriesError::MalformedRow {
        index,
        reason: reason.to_owned(),
    };

    let pair = row
        .as_array()
        .ok_or_else(|| malformed("expected a [timestamp, value] array"))?;
    if pair.len() != 2 {
        return Err(malformed(&format!("expected 2 elements, found {}", pair.len())));
    }

    let seconds = match (pair[0].as_i64(), pair[0].as_f64()) {
        (Some(seconds), _) => seconds,
        (None, Some(raw)) if raw.fract() == 0.0 && raw.abs() < i64::MAX as f64 => raw as i64,
        (None, Some(_)) => return Err(malformed("timestamp must be whole epoch seconds")),
        (None, None) => return Err(malformed("timestamp is not a number")),
    };
    let value = pair[1]
        .as_f64()
        .ok_or_else(|| malformed("nav value is not a number"))?;

    Ok((seconds, value))
}
