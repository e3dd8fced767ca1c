use std::collections::BTreeSet;

// Serial numbers read `XX-MMYY-...`: ordered by year, month and then as text
fn serial_key(sn: &str) -> (u32, u32, &str) {
    let parts: Vec<&str> = sn.split('-').collect();
    if parts.len() >= 3 {
        let month: String = parts[1].chars().take(2).collect();
        let year: String = parts[1].chars().skip(2).collect();
        if let (Ok(month), Ok(year)) = (month.parse(), year.parse()) {
            return (year, month, sn);
        }
    }
    (0, 0, sn)
}

/// Removes the duplicated serial numbers and sorts them by manufacturing date
///
/// Serial numbers without a date come first, in text order.
pub fn sort_serial_numbers<S: AsRef<str>>(serial_numbers: &[S]) -> Vec<String> {
    let unique: BTreeSet<&str> = serial_numbers.iter().map(|sn| sn.as_ref()).collect();
    let mut sorted: Vec<&str> = unique.into_iter().collect();
    sorted.sort_by(|a, b| serial_key(a).cmp(&serial_key(b)));
    sorted.into_iter().map(|sn| sn.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn by_date() {
        let sorted = sort_serial_numbers(&[
            "EN-0125-0002",
            "EN-1224-0001",
            "bench",
            "EN-0125-0001",
            "EN-1224-0001",
            "EN-0325-0001",
            "EN-XX25-0001",
        ]);
        assert_eq!(
            sorted,
            vec![
                "EN-XX25-0001",
                "bench",
                "EN-1224-0001",
                "EN-0125-0001",
                "EN-0125-0002",
                "EN-0325-0001",
            ]
        );
    }

    #[test]
    fn keys() {
        assert_eq!(serial_key("EN-0625-7"), (25, 6, "EN-0625-7"));
        assert_eq!(serial_key("EN-0625"), (0, 0, "EN-0625"));
        assert_eq!(serial_key("EN-06-1"), (0, 0, "EN-06-1"));
    }
}
