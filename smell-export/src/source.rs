use crate::{ExportError, Result, SeriesQuery};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use smell_model::CHANNELS;
use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

/// One-minute mean of the sensor channels
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesRow {
    /// start of the minute
    pub time: DateTime<Utc>,
    pub channels: [Option<f64>; CHANNELS],
}

/// Time series data source
pub trait DataSource {
    /// Returns the rows of the query in time order, minutes without samples are missing
    fn query(&self, query: &SeriesQuery) -> Result<Vec<SeriesRow>>;
}

#[derive(Debug, Deserialize)]
struct SampleRecord {
    time: String,
    #[serde(default)]
    measurement: Option<String>,
    #[serde(default)]
    sn: Option<String>,
    #[serde(default, rename = "sName")]
    station: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    s1: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    s2: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    s3: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    s4: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    s5: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    s6: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    s7: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    s8: Option<f64>,
}

#[derive(Debug, Clone)]
struct Sample {
    time: DateTime<Utc>,
    measurement: Option<String>,
    sn: Option<String>,
    station: Option<String>,
    channels: [Option<f64>; CHANNELS],
}
impl TryFrom<SampleRecord> for Sample {
    type Error = ExportError;
    fn try_from(record: SampleRecord) -> Result<Self> {
        let time = DateTime::parse_from_rfc3339(record.time.trim())
            .map_err(|e| ExportError::Time(record.time.clone(), e))?
            .with_timezone(&Utc);
        Ok(Self {
            time,
            measurement: record.measurement,
            sn: record.sn,
            station: record.station,
            channels: [
                record.s1, record.s2, record.s3, record.s4, record.s5, record.s6, record.s7,
                record.s8,
            ],
        })
    }
}
impl Sample {
    // A missing tag column matches any query
    fn matches(&self, query: &SeriesQuery) -> bool {
        let tag = match query.entity.tag() {
            "sn" => &self.sn,
            _ => &self.station,
        };
        self.measurement
            .as_ref()
            .map_or(true, |m| *m == query.measurement)
            && tag.as_ref().map_or(true, |t| t == query.entity.value())
            && self.time >= query.start
            && self.time <= query.end
    }
}

/// Data source backed by a CSV table of raw samples
///
/// The table has a `time` column (RFC 3339) and the channels `s1` to `s8`.
/// The optional `measurement`, `sn` and `sName` columns are matched against the queries.
#[derive(Debug, Clone, Default)]
pub struct CsvSource {
    samples: Vec<Sample>,
}
impl CsvSource {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::Reader::from_reader(reader);
        let samples = rdr
            .deserialize::<SampleRecord>()
            .map(|record| Sample::try_from(record?))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { samples })
    }
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| ExportError::Io(e, path.to_path_buf()))?;
        log::info!("Loading {:?}...", path);
        let source = Self::from_reader(BufReader::new(file))?;
        log::info!("... {} samples", source.len());
        Ok(source)
    }
    pub fn len(&self) -> usize {
        self.samples.len()
    }
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
impl DataSource for CsvSource {
    fn query(&self, query: &SeriesQuery) -> Result<Vec<SeriesRow>> {
        let mut minutes: BTreeMap<i64, [(f64, usize); CHANNELS]> = BTreeMap::new();
        for sample in self.samples.iter().filter(|s| s.matches(query)) {
            let sums = minutes
                .entry(sample.time.timestamp().div_euclid(60))
                .or_insert([(0f64, 0usize); CHANNELS]);
            sums.iter_mut()
                .zip(sample.channels)
                .for_each(|((sum, n), value)| {
                    if let Some(x) = value {
                        *sum += x;
                        *n += 1;
                    }
                });
        }
        minutes
            .into_iter()
            .map(|(minute, sums)| {
                let time = DateTime::from_timestamp(minute * 60, 0)
                    .ok_or_else(|| ExportError::Source(format!("minute {minute} out of range")))?;
                Ok(SeriesRow {
                    time,
                    channels: sums.map(|(sum, n)| (n > 0).then(|| sum / n as f64)),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Entity;
    use chrono::TimeZone;
    use std::error::Error;

    const SAMPLES: &str = "\
time,sn,s1,s2,s3,s4,s5,s6,s7,s8
2025-06-01T03:00:10Z,EN-1,10,20,30,40,50,60,70,80
2025-06-01T03:00:40Z,EN-1,20,,30,40,50,60,70,80
2025-06-01T03:00:50Z,EN-2,99,99,99,99,99,99,99,99
2025-06-01T03:02:00Z,EN-1,1,2,3,4,5,6,7,x
2025-06-01T10:02:00+07:00,EN-1,5,5,5,5,5,5,5,5
";

    fn query(sn: &str) -> SeriesQuery {
        SeriesQuery {
            measurement: "enose".into(),
            entity: Entity::Serial(sn.into()),
            start: Utc.with_ymd_and_hms(2025, 6, 1, 3, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2025, 6, 1, 3, 59, 0).unwrap(),
        }
    }

    #[test]
    fn minute_means() -> std::result::Result<(), Box<dyn Error>> {
        let source = CsvSource::from_reader(SAMPLES.as_bytes())?;
        assert_eq!(source.len(), 5);
        let rows = source.query(&query("EN-1"))?;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].time, Utc.with_ymd_and_hms(2025, 6, 1, 3, 0, 0).unwrap());
        assert_eq!(rows[0].channels[0], Some(15.));
        assert_eq!(rows[0].channels[1], Some(20.));
        // 03:01 has no sample
        assert_eq!(rows[1].time, Utc.with_ymd_and_hms(2025, 6, 1, 3, 2, 0).unwrap());
        assert_eq!(rows[1].channels[0], Some(3.));
        assert_eq!(rows[1].channels[7], Some(5.));
        Ok(())
    }

    #[test]
    fn entity_filter() -> std::result::Result<(), Box<dyn Error>> {
        let source = CsvSource::from_reader(SAMPLES.as_bytes())?;
        let rows = source.query(&query("EN-2"))?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].channels, [Some(99.); CHANNELS]);
        assert!(source.query(&query("EN-3"))?.is_empty());
        Ok(())
    }

    #[test]
    fn invalid_time() {
        let csv = "time,s1,s2,s3,s4,s5,s6,s7,s8\n01/06/2025 03:00,1,2,3,4,5,6,7,8\n";
        assert!(matches!(
            CsvSource::from_reader(csv.as_bytes()),
            Err(ExportError::Time(..))
        ));
    }
}
