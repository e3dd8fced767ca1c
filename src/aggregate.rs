//! Per-smell average sensor values

use crate::{
    channel::{Channel, CHANNELS},
    dataset::{LabeledData, LABEL},
    error::SchemaError,
    names::{NameMap, NAME},
    sorter::order_labels,
    table::{clean_headers, fmt_value, round_to, write_table},
};
use itertools::Itertools;
use serde::Deserialize;
use std::{fmt, io::Read};
use strum::IntoEnumIterator;

/// Average channel values of one smell label
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    pub label: String,
    /// display name: the mapped name or else the label
    pub name: String,
    /// channel means rounded to 2 decimals, `None` if the channel has no valid sample
    pub values: [Option<f64>; CHANNELS],
}
impl AggregateRow {
    /// Returns the mean of a channel
    pub fn value(&self, channel: Channel) -> Option<f64> {
        self.values[channel.index()]
    }
    /// Returns `true` if some channel means are missing
    pub fn has_missing(&self) -> bool {
        self.values.iter().any(|v| v.is_none())
    }
}
impl fmt::Display for AggregateRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<16} {:<24} [{}]",
            self.label,
            self.name,
            self.values
                .iter()
                .map(|v| v.map_or_else(|| "  ---  ".to_string(), |x| format!("{:7.2}", x)))
                .join(",")
        )
    }
}

/// Per-smell aggregate table, one row per label in label order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregates(Vec<AggregateRow>);
impl Aggregates {
    /// Averages the channels of the records of each label
    ///
    /// The rows follow the label order whatever the order of the records,
    /// the unlabeled records are ignored.
    pub fn from_labeled(data: &LabeledData, names: &NameMap) -> Self {
        let mut groups = data
            .iter()
            .filter(|r| r.is_labeled())
            .map(|r| (r.label.as_str(), r))
            .into_group_map();
        let aggregates: Self = order_labels(&data.labels())
            .into_iter()
            .filter_map(|label| groups.remove(label).map(|records| (label, records)))
            .map(|(label, records)| {
                let mut sums = [(0f64, 0usize); CHANNELS];
                for record in records {
                    sums.iter_mut()
                        .zip(record.channels.iter())
                        .for_each(|((sum, n), value)| {
                            if let Some(x) = value {
                                *sum += x;
                                *n += 1;
                            }
                        });
                }
                let mut values = [None; CHANNELS];
                values.iter_mut().zip(sums).for_each(|(value, (sum, n))| {
                    if n > 0 {
                        *value = Some(round_to(sum / n as f64, 2));
                    }
                });
                AggregateRow {
                    label: label.to_string(),
                    name: names.display_name(label).to_string(),
                    values,
                }
            })
            .collect::<Vec<_>>()
            .into();
        aggregates
            .iter()
            .filter(|row| row.has_missing())
            .for_each(|row| log::warn!("missing channel means for {:?}: {}", row.label, row));
        log::info!("{} smell labels averaged", aggregates.len());
        aggregates
    }
    /// Reads an aggregate table back from CSV
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, AggregatesReadError> {
        let mut rdr = csv::Reader::from_reader(reader);
        let headers = clean_headers(&mut rdr)?;
        let mut columns = vec![LABEL, NAME];
        columns.extend(Channel::iter().map(|c| c.header()));
        SchemaError::require("average sensor values", &headers, &columns)?;
        let mut rows = vec![];
        for result in rdr.deserialize() {
            let record: AggregateRecord = result?;
            rows.push(record.into());
        }
        Ok(Self(rows))
    }
    /// Writes the table with the columns `Smell,Name,s1,...,s8`
    pub fn to_csv(&self) -> Result<String, csv::Error> {
        write_table(|wtr| {
            let mut headers = vec![LABEL, NAME];
            headers.extend(Channel::iter().map(|c| c.header()));
            wtr.write_record(&headers)?;
            for row in self.iter() {
                let mut record = vec![row.label.clone(), row.name.clone()];
                record.extend(row.values.iter().map(|v| fmt_value(*v)));
                wtr.write_record(&record)?;
            }
            Ok(())
        })
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = &AggregateRow> {
        self.0.iter()
    }
    pub fn rows(&self) -> &[AggregateRow] {
        &self.0
    }
    /// Returns the display names in table order
    pub fn names(&self) -> Vec<&str> {
        self.iter().map(|row| row.name.as_str()).collect()
    }
}
impl From<Vec<AggregateRow>> for Aggregates {
    fn from(rows: Vec<AggregateRow>) -> Self {
        Self(rows)
    }
}
impl fmt::Display for Aggregates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.iter() {
            writeln!(f, "{}", row)?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct AggregateRecord {
    #[serde(rename = "Smell")]
    label: String,
    #[serde(rename = "Name")]
    name: String,
    #[serde(deserialize_with = "csv::invalid_option")]
    s1: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    s2: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    s3: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    s4: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    s5: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    s6: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    s7: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    s8: Option<f64>,
}
impl From<AggregateRecord> for AggregateRow {
    fn from(record: AggregateRecord) -> Self {
        Self {
            label: record.label,
            name: record.name,
            values: [
                record.s1, record.s2, record.s3, record.s4, record.s5, record.s6, record.s7,
                record.s8,
            ]
            .map(|v| v.filter(|x| x.is_finite())),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum AggregatesReadError {
    #[error("failed to read the average sensor values CSV table")]
    Csv(#[from] csv::Error),
    #[error("invalid average sensor values table")]
    Schema(#[from] SchemaError),
}
