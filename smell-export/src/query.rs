use chrono::{DateTime, Utc};
use smell_model::Channel;
use std::fmt;
use strum::IntoEnumIterator;

/// Tagged series of the time series database
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entity {
    /// device serial number, tag `sn`
    Serial(String),
    /// station name, tag `sName`
    Station(String),
}
impl Entity {
    pub fn tag(&self) -> &'static str {
        match self {
            Entity::Serial(_) => "sn",
            Entity::Station(_) => "sName",
        }
    }
    pub fn value(&self) -> &str {
        match self {
            Entity::Serial(value) | Entity::Station(value) => value,
        }
    }
}
impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.tag(), self.value())
    }
}

/// One-minute mean of the 8 sensor channels of an entity over a time range
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesQuery {
    pub measurement: String,
    pub entity: Entity,
    pub start: DateTime<Utc>,
    /// inclusive
    pub end: DateTime<Utc>,
}
impl SeriesQuery {
    /// InfluxQL rendering of the query
    ///
    /// The raw fields `a1` to `a8` are returned as `s1` to `s8`,
    /// minutes without samples are left out.
    pub fn to_influxql(&self) -> String {
        let fields = Channel::iter()
            .map(|c| format!(r#"mean("a{}") AS "{}""#, c.index() + 1, c))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            r#"SELECT {} FROM "{}" WHERE ("{}" =~ /^({})$/) AND time >= {}ms AND time <= {}ms GROUP BY time(1m) fill(none)"#,
            fields,
            self.measurement.replace('"', r#"\""#),
            self.entity.tag(),
            regex::escape(self.entity.value()).replace('/', r"\/"),
            self.start.timestamp_millis(),
            self.end.timestamp_millis()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn influxql() {
        let query = SeriesQuery {
            measurement: "enose".into(),
            entity: Entity::Serial("EN-0625-0001".into()),
            start: Utc.with_ymd_and_hms(2025, 6, 1, 3, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2025, 6, 1, 4, 0, 0).unwrap(),
        };
        let sql = query.to_influxql();
        assert!(sql.starts_with(r#"SELECT mean("a1") AS "s1", mean("a2") AS "s2","#));
        assert!(sql.contains(r#"mean("a8") AS "s8" FROM "enose""#));
        assert!(sql.contains(r#"WHERE ("sn" =~ /^(EN\-0625\-0001)$/)"#));
        assert!(sql.contains("time >= 1748746800000ms AND time <= 1748750400000ms"));
        assert!(sql.ends_with("GROUP BY time(1m) fill(none)"));
    }

    #[test]
    fn escaped_station() {
        let query = SeriesQuery {
            measurement: "enose".into(),
            entity: Entity::Station("Lab (1)/B.2|x".into()),
            start: Utc.with_ymd_and_hms(2025, 6, 1, 3, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2025, 6, 1, 4, 0, 0).unwrap(),
        };
        assert!(query
            .to_influxql()
            .contains(r#"("sName" =~ /^(Lab \(1\)\/B\.2\|x)$/)"#));
    }
}
