//! Smell display names
//!
//! The name table maps each smell label to the name shown in the tables and charts.
//! It is a two-column CSV table: `Smell,Name`.

use crate::{dataset::LABEL, error::SchemaError, table::clean_headers};
use serde::Deserialize;
use std::{
    collections::HashMap,
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};

/// Name column header
pub const NAME: &str = "Name";

#[derive(thiserror::Error, Debug)]
pub enum NameMapError {
    #[error("failed to open the smell name file {1:?}")]
    Io(#[source] std::io::Error, PathBuf),
    #[error("failed to read the smell name CSV table")]
    Csv(#[from] csv::Error),
    #[error("invalid smell name table")]
    Schema(#[from] SchemaError),
}
type Result<T> = std::result::Result<T, NameMapError>;

#[derive(Debug, Deserialize)]
struct NameRecord {
    #[serde(rename = "Smell")]
    label: String,
    #[serde(rename = "Name")]
    name: String,
}

/// Label to display name mapping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NameMap(HashMap<String, String>);
impl NameMap {
    /// Reads the name table from a CSV reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::Reader::from_reader(reader);
        let headers = clean_headers(&mut rdr)?;
        SchemaError::require("smell name", &headers, &[LABEL, NAME])?;
        let mut names = HashMap::new();
        for result in rdr.deserialize::<NameRecord>() {
            let NameRecord { label, name } = result?;
            if label.trim().is_empty() || name.trim().is_empty() {
                continue;
            }
            if names.contains_key(&label) {
                log::warn!("duplicated smell label {:?} in the name table, ignored", label);
                continue;
            }
            names.insert(label, name);
        }
        Ok(Self(names))
    }
    /// Reads the name table from CSV text
    pub fn from_csv_str(contents: &str) -> Result<Self> {
        Self::from_reader(contents.as_bytes())
    }
    /// Returns the name mapped to a label
    pub fn get(&self, label: &str) -> Option<&str> {
        self.0.get(label).map(|s| s.as_str())
    }
    /// Returns the display name of a label: the mapped name or else the label itself
    pub fn display_name<'a>(&'a self, label: &'a str) -> &'a str {
        self.get(label).unwrap_or(label)
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for NameMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Smell name table loader
pub struct NameMapLoader {
    path: PathBuf,
}
impl Default for NameMapLoader {
    fn default() -> Self {
        Self {
            path: PathBuf::from("smell_Name.csv"),
        }
    }
}
impl NameMapLoader {
    /// Sets the path to the name CSV file
    pub fn data_path<P: AsRef<Path>>(self, data_path: P) -> Self {
        Self {
            path: data_path.as_ref().to_path_buf(),
        }
    }
    pub fn load(self) -> Result<NameMap> {
        let file = File::open(&self.path).map_err(|e| NameMapError::Io(e, self.path.clone()))?;
        log::info!("Loading {:?}...", self.path);
        let names = NameMap::from_reader(BufReader::new(file))?;
        log::info!("... {} smell names", names.len());
        Ok(names)
    }
}
