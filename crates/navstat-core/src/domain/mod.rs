//! # Domain Models
//!
//! Canonical types flowing through the NAV pipeline.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Isin`] | Validated security identifier |
//! | [`SecurityRecord`] | One roster row with its descriptive columns |
//! | [`NavPoint`] | Single `(timestamp, NAV)` observation |
//! | [`NavSeries`] | Chronologically ordered NAV observations |
//! | [`UtcDateTime`] | UTC instant derived from epoch seconds |
//!
//! All types enforce their invariants at construction time: an [`Isin`] is
//! always URL-safe and a [`NavSeries`] is always sorted by timestamp.

mod isin;
mod security;
mod series;
mod timestamp;

pub use isin::Isin;
pub use security::SecurityRecord;
pub use series::{NavPoint, NavSeries, SeriesError};
pub use timestamp::UtcDateTime;
