//! Label ordering
//!
//! The labels are ordered with `"Air Zero"` first, followed by the `Smell<N>` labels by
//! increasing `N`, and then by any other label.
//! Labels of equal rank keep the order in which they first appear in the dataset.

use crate::dataset::{DatasetError, LabeledData, Result};

/// Reference label of the clean air baseline
pub const AIR_ZERO: &str = "Air Zero";
/// Prefix of the numbered smell labels
pub const SMELL_PREFIX: &str = "Smell";

/// Sort rank of a label
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LabelRank {
    /// `"Air Zero"` ranks 0, `Smell<N>` ranks `N`
    Finite(u64),
    /// any other label
    Last,
}
impl LabelRank {
    pub fn of(label: &str) -> Self {
        if label == AIR_ZERO {
            return LabelRank::Finite(0);
        }
        let Some(rest) = label.strip_prefix(SMELL_PREFIX) else {
            return LabelRank::Last;
        };
        let mut digits = rest.chars().map_while(decimal_digit).peekable();
        if digits.peek().is_none() {
            return LabelRank::Last;
        }
        // saturates on overflow
        LabelRank::Finite(digits.fold(0u64, |n, d| {
            n.checked_mul(10)
                .and_then(|n| n.checked_add(d as u64))
                .unwrap_or(u64::MAX)
        }))
    }
}

// Zero of each supported decimal digit block
const ZERO_DIGITS: [char; 10] = [
    '0', '\u{0660}', '\u{06F0}', '\u{0966}', '\u{09E6}', '\u{0E50}', '\u{0ED0}', '\u{1040}',
    '\u{17E0}', '\u{FF10}',
];

/// Returns the value of a decimal digit of the Latin, Arabic-Indic, extended Arabic-Indic,
/// Devanagari, Bengali, Thai, Lao, Myanmar, Khmer or fullwidth digit blocks
pub fn decimal_digit(c: char) -> Option<u32> {
    ZERO_DIGITS.iter().find_map(|&zero| {
        (c as u32)
            .checked_sub(zero as u32)
            .filter(|&d| d < 10)
    })
}

/// Orders a set of distinct labels given in order of first appearance
pub fn order_labels<'a>(labels: &[&'a str]) -> Vec<&'a str> {
    let mut ordered = labels.to_vec();
    ordered.sort_by_key(|label| LabelRank::of(label));
    ordered
}

/// Removes the unlabeled records and sorts the others by label
///
/// Records are ordered by label rank, then by first appearance of their label,
/// then by their position in the dataset.
pub fn sort_by_label(data: &LabeledData) -> Result<LabeledData> {
    let labels = order_labels(&data.labels());
    if labels.is_empty() {
        return Err(DatasetError::Empty);
    }
    let dropped = data.len() - data.iter().filter(|r| r.is_labeled()).count();
    if dropped > 0 {
        log::info!("discarding {} unlabeled records", dropped);
    }
    log::debug!("label order: {:?}", labels);
    let mut records: Vec<_> = data
        .iter()
        .filter(|r| r.is_labeled())
        .filter_map(|r| {
            labels
                .iter()
                .position(|&l| l == r.label)
                .map(|key| (key, r.clone()))
        })
        .collect();
    records.sort_by_key(|(key, _)| *key);
    Ok(data.with_records(records.into_iter().map(|(_, r)| r).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::seq::SliceRandom;
    use std::error::Error;

    fn dataset(labels: &[&str]) -> std::result::Result<LabeledData, DatasetError> {
        let mut csv = String::from("Time,s1,s2,s3,s4,s5,s6,s7,s8,Smell\n");
        for (k, label) in labels.iter().enumerate() {
            csv.push_str(&format!("{k},{k},0,0,0,0,0,0,0,{label}\n"));
        }
        LabeledData::from_csv_str(&csv)
    }

    #[test]
    fn label_rank() {
        assert_eq!(LabelRank::of("Air Zero"), LabelRank::Finite(0));
        assert_eq!(LabelRank::of("Smell2"), LabelRank::Finite(2));
        assert_eq!(LabelRank::of("Smell10"), LabelRank::Finite(10));
        assert_eq!(LabelRank::of("Smell 1"), LabelRank::Last);
        assert_eq!(LabelRank::of("Smell7b"), LabelRank::Finite(7));
        assert_eq!(LabelRank::of("Smell"), LabelRank::Last);
        assert_eq!(LabelRank::of("coffee"), LabelRank::Last);
        assert_eq!(
            LabelRank::of("Smell99999999999999999999999"),
            LabelRank::Finite(u64::MAX)
        );
        assert_eq!(LabelRank::of("Smell๑๒"), LabelRank::Finite(12));
        assert_eq!(LabelRank::of("Smell１"), LabelRank::Finite(1));
        assert_eq!(LabelRank::of("Smell٣x"), LabelRank::Finite(3));
        assert_eq!(LabelRank::of("Smell½"), LabelRank::Last);
        assert!(LabelRank::of("Smell2") < LabelRank::of("Smell10"));
        assert!(LabelRank::of("Smell10") < LabelRank::of("air zero"));
    }

    #[test]
    fn digits() {
        assert_eq!(decimal_digit('7'), Some(7));
        assert_eq!(decimal_digit('๕'), Some(5));
        assert_eq!(decimal_digit('९'), Some(9));
        assert_eq!(decimal_digit('a'), None);
        assert_eq!(decimal_digit('²'), None);
        assert_eq!(decimal_digit('/'), None);
    }

    #[test]
    fn label_order() {
        let ordered = order_labels(&["tea", "Smell10", "coffee", "Smell2", "Air Zero"]);
        assert_eq!(ordered, vec!["Air Zero", "Smell2", "Smell10", "tea", "coffee"]);
    }

    #[test]
    fn air_zero_first_for_any_order() {
        let mut labels = vec!["Smell0", "Smell3", "Air Zero", "Smell1", "x", "Smell12"];
        let mut rng = rand::thread_rng();
        for _ in 0..20 {
            labels.shuffle(&mut rng);
            let ordered = order_labels(&labels);
            let air = ordered.iter().position(|&l| l == AIR_ZERO).unwrap();
            let smells: Vec<_> = ordered.iter().filter(|l| l.starts_with("Smell")).collect();
            assert!(air <= 1);
            assert_eq!(ordered.last(), Some(&"x"));
            assert_eq!(smells.len(), 4);
            let at = |label: &str| ordered.iter().position(|&l| l == label);
            assert!(at("Smell1") < at("Smell3"));
            assert!(at("Smell3") < at("Smell12"));
        }
    }

    #[test]
    fn stable_sort() -> std::result::Result<(), Box<dyn Error>> {
        let data = dataset(&["b", "Smell1", "", "a", "Smell1", "b", " ", "Air Zero", "a"])?;
        let sorted = sort_by_label(&data)?;
        let rows: Vec<_> = sorted
            .iter()
            .map(|r| (r.label.as_str(), r.time.as_str()))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("Air Zero", "7"),
                ("Smell1", "1"),
                ("Smell1", "4"),
                ("b", "0"),
                ("b", "5"),
                ("a", "3"),
                ("a", "8"),
            ]
        );
        Ok(())
    }

    #[test]
    fn all_blank() -> std::result::Result<(), Box<dyn Error>> {
        let data = dataset(&["", "  ", ""])?;
        assert!(matches!(sort_by_label(&data), Err(DatasetError::Empty)));
        Ok(())
    }
}
