//! # Labeled time range export
//!
//! Builds the input tables of `smell-model` from a time series data source:
//! the sensor data of the time ranges labeled with a smell, averaged per minute,
//! and the table of the smell display names.

use std::path::PathBuf;

mod query;
mod serial;
mod source;
mod split;

pub use query::{Entity, SeriesQuery};
pub use serial::sort_serial_numbers;
pub use source::{CsvSource, DataSource, SeriesRow};
pub use split::{
    export_splits, parse_local, read_splits, validate, ExportConfig, LabelSplit, LabeledExport,
    SplitViolation, SplitsLoader, Window, LABELED_FILE, NAMES_FILE,
};

#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    #[error("failed to open {1:?}")]
    Io(#[source] std::io::Error, PathBuf),
    #[error("failed to read or write a CSV table")]
    Csv(#[from] csv::Error),
    #[error("invalid time {0:?}")]
    Time(String, #[source] chrono::ParseError),
    #[error("{0} does not exist or is ambiguous in the local time zone")]
    LocalTime(chrono::NaiveDateTime),
    #[error("invalid UTC offset: {0}s")]
    Offset(i32),
    #[error("invalid label splits: {}", .0.iter().map(|v| v.to_string()).collect::<Vec<_>>().join("; "))]
    Invalid(Vec<SplitViolation>),
    #[error("data source query failed: {0}")]
    Source(String),
    #[error("no data in any of the label splits")]
    NoData,
}
pub type Result<T> = std::result::Result<T, ExportError>;
