//! Labeled sensor dataset
//!
//! The labeled dataset is the CSV table exported after the time ranges have been tagged:
//! a `Time` column, the 8 sensor channels `s1` to `s8` and the `Smell` label column.
//! Rows with a blank label are unlabeled export rows.

use crate::{
    channel::{Channel, CHANNELS},
    error::SchemaError,
    table::{parse_value, write_table},
};
use flate2::read::GzDecoder;
use std::{
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
    time::Instant,
};
use strum::IntoEnumIterator;

#[derive(thiserror::Error, Debug)]
pub enum DatasetError {
    #[error("failed to open the labeled data file {1:?}")]
    Io(#[source] std::io::Error, PathBuf),
    #[error("failed to read the labeled CSV table")]
    Csv(#[from] csv::Error),
    #[error("invalid labeled CSV table")]
    Schema(#[from] SchemaError),
    #[error("no labeled record left after removing the rows with a blank `Smell` label")]
    Empty,
}
pub type Result<T> = std::result::Result<T, DatasetError>;

/// Time column header
pub const TIME: &str = "Time";
/// Label column header
pub const LABEL: &str = "Smell";

/// One timestamped observation
#[derive(Debug, Clone, PartialEq)]
pub struct SensorRecord {
    /// the time stamp, as written in the table
    pub time: String,
    /// the channel values, `None` for empty or non-numeric cells
    pub channels: [Option<f64>; CHANNELS],
    /// the smell label, empty if unlabeled
    pub label: String,
    // the table row, verbatim
    cells: Vec<String>,
}
impl SensorRecord {
    /// Returns `true` if the label is neither empty nor whitespace
    pub fn is_labeled(&self) -> bool {
        !self.label.trim().is_empty()
    }
    /// Returns the value of a channel
    pub fn channel(&self, channel: Channel) -> Option<f64> {
        self.channels[channel.index()]
    }
    /// Returns the table row, verbatim
    pub fn cells(&self) -> &[String] {
        &self.cells
    }
}

/// Positions of the required columns in the table
#[derive(Debug, Clone, Copy, PartialEq)]
struct Columns {
    time: usize,
    channels: [usize; CHANNELS],
    label: usize,
}
impl Columns {
    fn from_headers(headers: &[String]) -> std::result::Result<Self, SchemaError> {
        let position = |column: &str| {
            headers
                .iter()
                .position(|h| h.trim() == column)
                .ok_or_else(|| SchemaError::MissingColumn {
                    table: "labeled data",
                    column: column.to_string(),
                })
        };
        let time = position(TIME)?;
        let mut channels = [0usize; CHANNELS];
        for channel in Channel::iter() {
            channels[channel.index()] = position(channel.header())?;
        }
        let label = position(LABEL)?;
        Ok(Self {
            time,
            channels,
            label,
        })
    }
}

/// Labeled sensor dataset
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledData {
    headers: Vec<String>,
    columns: Columns,
    records: Vec<SensorRecord>,
}
impl LabeledData {
    /// Reads the labeled table from a CSV reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::Reader::from_reader(reader);
        let headers: Vec<String> = rdr
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').to_string())
            .collect();
        let columns = Columns::from_headers(&headers)?;
        let mut records = vec![];
        for result in rdr.records() {
            let record = result?;
            let cells: Vec<String> = record.iter().map(|c| c.to_string()).collect();
            let mut channels = [None; CHANNELS];
            channels
                .iter_mut()
                .zip(columns.channels)
                .for_each(|(value, k)| *value = parse_value(&cells[k]));
            records.push(SensorRecord {
                time: cells[columns.time].clone(),
                channels,
                label: cells[columns.label].clone(),
                cells,
            });
        }
        Ok(Self {
            headers,
            columns,
            records,
        })
    }
    /// Reads the labeled table from CSV text
    pub fn from_csv_str(contents: &str) -> Result<Self> {
        Self::from_reader(contents.as_bytes())
    }
    /// Returns a new dataset with the same schema and the given records
    pub(crate) fn with_records(&self, records: Vec<SensorRecord>) -> Self {
        Self {
            headers: self.headers.clone(),
            columns: self.columns,
            records,
        }
    }
    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
    /// Table headers
    pub fn headers(&self) -> &[String] {
        &self.headers
    }
    pub fn records(&self) -> &[SensorRecord] {
        &self.records
    }
    pub fn iter(&self) -> impl Iterator<Item = &SensorRecord> {
        self.records.iter()
    }
    /// Returns the distinct labels of the labeled records, in order of first appearance
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = vec![];
        self.iter()
            .filter(|r| r.is_labeled())
            .for_each(|r| {
                if !labels.contains(&r.label.as_str()) {
                    labels.push(r.label.as_str())
                }
            });
        labels
    }
    /// Writes the whole table, all the original columns included
    pub fn to_csv(&self) -> std::result::Result<String, csv::Error> {
        write_table(|wtr| {
            wtr.write_record(&self.headers)?;
            for record in self.iter() {
                wtr.write_record(record.cells())?;
            }
            Ok(())
        })
    }
    /// Writes the channels and label columns only
    pub fn to_dataset_csv(&self) -> std::result::Result<String, csv::Error> {
        write_table(|wtr| {
            let mut headers: Vec<&str> = Channel::iter().map(|c| c.header()).collect();
            headers.push(LABEL);
            wtr.write_record(&headers)?;
            for record in self.iter() {
                let cells = record.cells();
                wtr.write_record(
                    self.columns
                        .channels
                        .iter()
                        .chain(Some(&self.columns.label))
                        .map(|&k| cells[k].as_str()),
                )?;
            }
            Ok(())
        })
    }
}

/// Labeled dataset loader
///
/// Files with a `gz` extension are decompressed on the fly.
pub struct DatasetLoader {
    path: PathBuf,
}
impl Default for DatasetLoader {
    fn default() -> Self {
        Self {
            path: PathBuf::from("smell_label.csv"),
        }
    }
}
impl DatasetLoader {
    /// Sets the path to the labeled CSV file
    pub fn data_path<P: AsRef<Path>>(self, data_path: P) -> Self {
        Self {
            path: data_path.as_ref().to_path_buf(),
        }
    }
    pub fn load(self) -> Result<LabeledData> {
        let file = File::open(&self.path).map_err(|e| DatasetError::Io(e, self.path.clone()))?;
        log::info!("Loading {:?}...", self.path);
        let now = Instant::now();
        let buf = BufReader::new(file);
        let data = match self.path.extension().and_then(|e| e.to_str()) {
            Some("gz") => LabeledData::from_reader(GzDecoder::new(buf))?,
            _ => LabeledData::from_reader(buf)?,
        };
        log::info!(
            "... loaded {} records in {}ms",
            data.len(),
            now.elapsed().as_millis()
        );
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    const CSV: &str = "\
Time,s1,s2,s3,s4,s5,s6,s7,s8,Smell
01/06/2025  10:00:00,10,20,30,40,50,60,70,80,Air Zero
01/06/2025  10:01:00,,21,31,41,51,61,71,81,
01/06/2025  10:02:00,12,22,32,42,52,62,72,82,  ";

    #[test]
    fn load_labeled_csv() -> std::result::Result<(), Box<dyn Error>> {
        let data = LabeledData::from_csv_str(CSV)?;
        assert_eq!(data.len(), 3);
        let first = &data.records()[0];
        assert_eq!(first.time, "01/06/2025  10:00:00");
        assert_eq!(first.channel(Channel::S8), Some(80.0));
        assert!(first.is_labeled());
        assert_eq!(data.records()[1].channel(Channel::S1), None);
        assert!(!data.records()[1].is_labeled());
        assert!(!data.records()[2].is_labeled());
        assert_eq!(data.labels(), vec!["Air Zero"]);
        Ok(())
    }

    #[test]
    fn missing_column() {
        let csv = "Time,s1,s2,s3,s4,s5,s6,s7,Smell\nx,1,2,3,4,5,6,7,A\n";
        match LabeledData::from_csv_str(csv) {
            Err(DatasetError::Schema(SchemaError::MissingColumn { column, .. })) => {
                assert_eq!(column, "s8")
            }
            other => panic!("expected a schema error, got {:?}", other),
        }
    }

    #[test]
    fn byte_order_mark() -> std::result::Result<(), Box<dyn Error>> {
        let csv = format!("\u{feff}{}", CSV);
        let data = LabeledData::from_csv_str(&csv)?;
        assert_eq!(data.headers()[0], TIME);
        Ok(())
    }

    #[test]
    fn verbatim_tables() -> std::result::Result<(), Box<dyn Error>> {
        let csv = "Time,Station,s1,s2,s3,s4,s5,s6,s7,s8,Smell\nt0,บ้าน,1,2,3,4,5,6,7,,กาแฟ\n";
        let data = LabeledData::from_csv_str(csv)?;
        assert_eq!(data.to_csv()?, csv);
        assert_eq!(
            data.to_dataset_csv()?,
            "s1,s2,s3,s4,s5,s6,s7,s8,Smell\n1,2,3,4,5,6,7,,กาแฟ\n"
        );
        Ok(())
    }
    #[test]
    fn load_files() -> std::result::Result<(), Box<dyn Error>> {
        use flate2::{write::GzEncoder, Compression};
        use std::{fs, io::Write};

        let dir = std::env::temp_dir().join(format!("smell-model-dataset-{}", std::process::id()));
        fs::create_dir_all(&dir)?;
        let plain = dir.join("smell_label.csv");
        fs::write(&plain, CSV)?;
        let gzipped = dir.join("smell_label.csv.gz");
        let mut encoder = GzEncoder::new(fs::File::create(&gzipped)?, Compression::default());
        encoder.write_all(CSV.as_bytes())?;
        encoder.finish()?;

        let data = DatasetLoader::default().data_path(&plain).load()?;
        assert_eq!(data.len(), 3);
        let unzipped = DatasetLoader::default().data_path(&gzipped).load()?;
        assert_eq!(unzipped, data);
        assert!(matches!(
            DatasetLoader::default().data_path(dir.join("none.csv")).load(),
            Err(DatasetError::Io(..))
        ));
        fs::remove_dir_all(&dir)?;
        Ok(())
    }
}
