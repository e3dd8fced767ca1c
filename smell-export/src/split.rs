use crate::{DataSource, Entity, ExportError, Result, SeriesQuery};
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use smell_model::{
    dataset::{LABEL, TIME},
    names::NAME,
    table::{round_to, write_table},
    Channel,
};
use std::{
    fs::{self, File},
    io::{BufReader, Read},
    path::{Path, PathBuf},
};
use strum::IntoEnumIterator;

/// Labeled dataset file name
pub const LABELED_FILE: &str = "smell_label.csv";
/// Smell name table file name
pub const NAMES_FILE: &str = "smell_Name.csv";

const TIME_FORMAT: &str = "%d/%m/%Y  %H:%M:%S";

/// Export settings
#[derive(Debug, Clone, PartialEq)]
pub struct ExportConfig {
    /// offset of the local time zone east of UTC in seconds
    pub utc_offset: i32,
}
impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            utc_offset: 7 * 3600,
        }
    }
}
impl ExportConfig {
    pub fn utc_offset(self, utc_offset: i32) -> Self {
        Self { utc_offset }
    }
    /// Local time zone
    pub fn offset(&self) -> Result<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset).ok_or(ExportError::Offset(self.utc_offset))
    }
    fn to_utc(&self, local: &NaiveDateTime) -> Result<DateTime<Utc>> {
        self.offset()?
            .from_local_datetime(local)
            .single()
            .map(|t| t.with_timezone(&Utc))
            .ok_or(ExportError::LocalTime(*local))
    }
}

/// Local time range the splits must lie in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Time range labeled with a smell, in local time
#[derive(Debug, Clone, PartialEq)]
pub struct LabelSplit {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// smell label, e.g. `Smell1`
    pub label: String,
    /// smell display name
    pub name: String,
}

/// Invalid label split, splits are numbered from 1
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SplitViolation {
    #[error("split {0}: the smell name is blank")]
    BlankName(usize),
    #[error("split {0}: starts before the window")]
    BeforeWindow(usize),
    #[error("split {0}: ends after the window")]
    AfterWindow(usize),
    #[error("split {0}: does not start before its end")]
    EmptyRange(usize),
}

impl LabelSplit {
    /// Returns every rule the `i`th split (from 1) breaks
    pub fn violations(&self, i: usize, window: &Window) -> Vec<SplitViolation> {
        let mut violations = vec![];
        if self.name.trim().is_empty() {
            violations.push(SplitViolation::BlankName(i));
        }
        if self.start < window.start {
            violations.push(SplitViolation::BeforeWindow(i));
        }
        if self.end > window.end {
            violations.push(SplitViolation::AfterWindow(i));
        }
        if self.start >= self.end {
            violations.push(SplitViolation::EmptyRange(i));
        }
        violations
    }
}

/// Checks all the splits and reports all the violations at once
pub fn validate(splits: &[LabelSplit], window: &Window) -> Result<()> {
    let violations: Vec<_> = splits
        .iter()
        .enumerate()
        .flat_map(|(i, split)| split.violations(i + 1, window))
        .collect();
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ExportError::Invalid(violations))
    }
}

/// Parses a local time written `%Y-%m-%d %H:%M:%S` or `%Y-%m-%d %H:%M`
pub fn parse_local(time: &str) -> Result<NaiveDateTime> {
    let time = time.trim();
    NaiveDateTime::parse_from_str(time, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(time, "%Y-%m-%d %H:%M"))
        .map_err(|e| ExportError::Time(time.to_string(), e))
}

#[derive(Debug, Deserialize)]
struct SplitRecord {
    start: String,
    end: String,
    label: String,
    name: String,
}

/// Label splits loader
///
/// The splits are read from a CSV table with the columns `start,end,label,name`.
pub struct SplitsLoader {
    path: PathBuf,
}
impl Default for SplitsLoader {
    fn default() -> Self {
        Self {
            path: PathBuf::from("splits.csv"),
        }
    }
}
impl SplitsLoader {
    /// Sets the path to the splits CSV file
    pub fn data_path<P: AsRef<Path>>(self, data_path: P) -> Self {
        Self {
            path: data_path.as_ref().to_path_buf(),
        }
    }
    pub fn load(self) -> Result<Vec<LabelSplit>> {
        let file = File::open(&self.path).map_err(|e| ExportError::Io(e, self.path.clone()))?;
        log::info!("Loading {:?}...", self.path);
        let splits = read_splits(BufReader::new(file))?;
        log::info!("... {} label splits", splits.len());
        Ok(splits)
    }
}

/// Reads label splits from a CSV reader
pub fn read_splits<R: Read>(reader: R) -> Result<Vec<LabelSplit>> {
    csv::Reader::from_reader(reader)
        .deserialize::<SplitRecord>()
        .map(|record| {
            let record = record?;
            Ok(LabelSplit {
                start: parse_local(&record.start)?,
                end: parse_local(&record.end)?,
                label: record.label,
                name: record.name,
            })
        })
        .collect()
}

/// Labeled dataset and smell name table
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledExport {
    /// labeled dataset CSV table, with a byte order mark
    pub labeled: String,
    /// smell name CSV table
    pub names: String,
    /// number of records of the labeled dataset
    pub records: usize,
    /// number of splits with data
    pub splits: usize,
}
impl LabeledExport {
    /// Writes the 2 tables into `dir`
    pub fn write_to<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|e| ExportError::Io(e, dir.to_path_buf()))?;
        [(LABELED_FILE, &self.labeled), (NAMES_FILE, &self.names)]
            .into_iter()
            .map(|(file, contents)| {
                let path = dir.join(file);
                fs::write(&path, contents).map_err(|e| ExportError::Io(e, path.clone()))?;
                Ok(path)
            })
            .collect()
    }
}

/// Queries the data of each split and gathers them into the labeled dataset
///
/// Every record of a split is labeled with the split label.
/// The name of a label is the name of the last split with data with that label.
pub fn export_splits<S: DataSource>(
    source: &S,
    measurement: &str,
    entity: &Entity,
    window: &Window,
    splits: &[LabelSplit],
    config: &ExportConfig,
) -> Result<LabeledExport> {
    validate(splits, window)?;
    let offset = config.offset()?;
    let mut records: Vec<Vec<String>> = vec![];
    let mut names: Vec<(String, String)> = vec![];
    let mut n_splits = 0;
    for split in splits {
        let query = SeriesQuery {
            measurement: measurement.to_string(),
            entity: entity.clone(),
            start: config.to_utc(&split.start)?,
            end: config.to_utc(&split.end)?,
        };
        log::debug!("{}", query.to_influxql());
        let rows = source.query(&query)?;
        log::info!("{:?} [{} - {}]: {} rows", split.label, split.start, split.end, rows.len());
        if rows.is_empty() {
            continue;
        }
        n_splits += 1;
        records.extend(rows.iter().map(|row| {
            let mut record = vec![row
                .time
                .with_timezone(&offset)
                .format(TIME_FORMAT)
                .to_string()];
            record.extend(row.channels.iter().map(|value| {
                value.map_or_else(String::new, |x| format!("{}", round_to(x, 0) as i64))
            }));
            record.push(split.label.clone());
            record
        }));
        match names.iter_mut().find(|(label, _)| *label == split.label) {
            Some((_, name)) => *name = split.name.clone(),
            None => names.push((split.label.clone(), split.name.clone())),
        }
    }
    if records.is_empty() {
        return Err(ExportError::NoData);
    }
    let labeled = write_table(|wtr| {
        let mut headers = vec![TIME];
        headers.extend(Channel::iter().map(|c| c.header()));
        headers.push(LABEL);
        wtr.write_record(&headers)?;
        for record in &records {
            wtr.write_record(record)?;
        }
        Ok(())
    })?;
    let names_table = write_table(|wtr| {
        wtr.write_record([LABEL, NAME])?;
        for (label, name) in &names {
            wtr.write_record([label, name])?;
        }
        Ok(())
    })?;
    log::info!("{} records from {} splits", records.len(), n_splits);
    Ok(LabeledExport {
        labeled: format!("\u{feff}{}", labeled),
        names: names_table,
        records: records.len(),
        splits: n_splits,
    })
}
