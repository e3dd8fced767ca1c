//! CSV table helpers shared by the pipeline stages

use std::io::Read;

/// Writes a CSV table into a [String]
pub fn write_table<F>(write: F) -> Result<String, csv::Error>
where
    F: FnOnce(&mut csv::Writer<Vec<u8>>) -> Result<(), csv::Error>,
{
    let mut wtr = csv::Writer::from_writer(vec![]);
    write(&mut wtr)?;
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Reads the headers of a CSV table and resets them without byte order mark nor surrounding spaces
pub fn clean_headers<R: Read>(rdr: &mut csv::Reader<R>) -> Result<csv::StringRecord, csv::Error> {
    let headers: csv::StringRecord = rdr
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim())
        .collect();
    rdr.set_headers(headers.clone());
    Ok(headers)
}

/// Rounds `value` to `decimals` decimal places, ties to even
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round_ties_even() / scale
}

/// Formats a number the way it is written in the output tables
///
/// Integral values keep a trailing `.0`, missing values are empty cells.
pub fn fmt_value(value: Option<f64>) -> String {
    match value {
        Some(x) if x == 0f64 => "0.0".to_string(),
        Some(x) => format!("{:?}", x),
        None => String::new(),
    }
}

/// Parses a table cell, empty or non-numeric cells are missing values
pub fn parse_value(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|x| x.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding() {
        assert_eq!(round_to(12.5, 2), 12.5);
        assert_eq!(round_to(1.0 / 3.0, 2), 0.33);
        assert_eq!(round_to(2.0 / 3.0, 3), 0.667);
        assert_eq!(round_to(0.125, 2), 0.12);
        assert_eq!(round_to(-1.2345, 1), -1.2);
    }

    #[test]
    fn formatting() {
        assert_eq!(fmt_value(Some(100.0)), "100.0");
        assert_eq!(fmt_value(Some(12.5)), "12.5");
        assert_eq!(fmt_value(Some(-0.0)), "0.0");
        assert_eq!(fmt_value(None), "");
    }

    #[test]
    fn parsing() {
        assert_eq!(parse_value(" 42 "), Some(42.0));
        assert_eq!(parse_value("12.75"), Some(12.75));
        assert_eq!(parse_value(""), None);
        assert_eq!(parse_value("n/a"), None);
        assert_eq!(parse_value("NaN"), None);
    }

    #[test]
    fn table_text() -> Result<(), csv::Error> {
        let text = write_table(|wtr| {
            wtr.write_record(["Smell", "Name"])?;
            wtr.write_record(["Air Zero", "กาแฟ, คั่วเข้ม"])?;
            Ok(())
        })?;
        assert_eq!(text, "Smell,Name\nAir Zero,\"กาแฟ, คั่วเข้ม\"\n");
        Ok(())
    }
}
