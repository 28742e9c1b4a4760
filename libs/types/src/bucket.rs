//! Bucket labels and the threshold table that maps raw values onto them
//!
//! A bucket is the matching key: two requests can only pair when they land in
//! the same bucket. The table is ordered by descending threshold and its last
//! entry is a catch-all floor, so every input maps to some label.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::BucketTableError;

/// Textual label of a bucket, e.g. `"50"`
///
/// This is also the exact payload delivered to a client on a match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BucketLabel(String);

impl BucketLabel {
    pub fn new(label: impl AsRef<str>) -> Self {
        Self(label.as_ref().to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BucketLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BucketLabel {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// One row of the bucket table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketThreshold {
    pub threshold: i64,
    pub label: BucketLabel,
}

/// Ordered threshold table
///
/// Entries are kept sorted by descending threshold. Lookup returns the first
/// entry whose threshold is at or below the value; values below every
/// threshold fall through to the last (floor) entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketTable {
    entries: Vec<BucketThreshold>,
}

impl BucketTable {
    /// Build a table from `(threshold, label)` pairs in any order
    pub fn new<I, L>(entries: I) -> Result<Self, BucketTableError>
    where
        I: IntoIterator<Item = (i64, L)>,
        L: AsRef<str>,
    {
        let mut entries: Vec<BucketThreshold> = entries
            .into_iter()
            .map(|(threshold, label)| BucketThreshold {
                threshold,
                label: BucketLabel::new(label),
            })
            .collect();

        if entries.is_empty() {
            return Err(BucketTableError::Empty);
        }

        entries.sort_by(|a, b| b.threshold.cmp(&a.threshold));
        if let Some(pair) = entries.windows(2).find(|w| w[0].threshold == w[1].threshold) {
            return Err(BucketTableError::DuplicateThreshold {
                threshold: pair[0].threshold,
            });
        }

        Ok(Self { entries })
    }

    /// Map a raw client-supplied value to its bucket label
    ///
    /// Empty or non-integer input is treated as `0`. Never fails.
    pub fn bucket(&self, raw_value: &str) -> BucketLabel {
        let value = raw_value.trim().parse::<i64>().unwrap_or(0);
        self.bucket_for(value)
    }

    /// Map an already-parsed value to its bucket label
    pub fn bucket_for(&self, value: i64) -> BucketLabel {
        self.entries
            .iter()
            .find(|entry| value >= entry.threshold)
            .unwrap_or_else(|| self.floor())
            .label
            .clone()
    }

    /// Position of a label counted up from the floor (floor = 0)
    pub fn rank(&self, label: &BucketLabel) -> Option<usize> {
        self.entries
            .iter()
            .rev()
            .position(|entry| &entry.label == label)
    }

    /// All labels, highest threshold first
    pub fn labels(&self) -> impl Iterator<Item = &BucketLabel> {
        self.entries.iter().map(|entry| &entry.label)
    }

    fn floor(&self) -> &BucketThreshold {
        // Non-empty by construction
        &self.entries[self.entries.len() - 1]
    }
}

impl Default for BucketTable {
    fn default() -> Self {
        Self {
            entries: [(100, "100"), (50, "50"), (10, "10"), (1, "1")]
                .into_iter()
                .map(|(threshold, label)| BucketThreshold {
                    threshold,
                    label: BucketLabel::new(label),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_thresholds() {
        let table = BucketTable::default();
        assert_eq!(table.bucket("150").as_str(), "100");
        assert_eq!(table.bucket("100").as_str(), "100");
        assert_eq!(table.bucket("99").as_str(), "50");
        assert_eq!(table.bucket("50").as_str(), "50");
        assert_eq!(table.bucket("12").as_str(), "10");
        assert_eq!(table.bucket("10").as_str(), "10");
        assert_eq!(table.bucket("7").as_str(), "1");
        assert_eq!(table.bucket("1").as_str(), "1");
    }

    #[test]
    fn test_floor_is_catch_all() {
        let table = BucketTable::default();
        assert_eq!(table.bucket("0").as_str(), "1");
        assert_eq!(table.bucket("-40").as_str(), "1");
    }

    #[test]
    fn test_malformed_values_default_to_zero() {
        let table = BucketTable::default();
        let zero = table.bucket("0");
        assert_eq!(table.bucket(""), zero);
        assert_eq!(table.bucket("abc"), zero);
        // Fractional input is not an integer
        assert_eq!(table.bucket("10.0"), zero);
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        let table = BucketTable::default();
        assert_eq!(table.bucket(" 55 ").as_str(), "50");
    }

    #[test]
    fn test_custom_table_is_sorted() {
        let table = BucketTable::new([(0, "low"), (1000, "high"), (500, "mid")]).unwrap();
        let labels: Vec<&str> = table.labels().map(|l| l.as_str()).collect();
        assert_eq!(labels, vec!["high", "mid", "low"]);
        assert_eq!(table.bucket("750").as_str(), "mid");
    }

    #[test]
    fn test_empty_table_rejected() {
        let result = BucketTable::new(Vec::<(i64, &str)>::new());
        assert_eq!(result.unwrap_err(), BucketTableError::Empty);
    }

    #[test]
    fn test_duplicate_threshold_rejected() {
        let result = BucketTable::new([(10, "a"), (10, "b")]);
        assert_eq!(
            result.unwrap_err(),
            BucketTableError::DuplicateThreshold { threshold: 10 }
        );
    }

    #[test]
    fn test_rank() {
        let table = BucketTable::default();
        assert_eq!(table.rank(&"1".into()), Some(0));
        assert_eq!(table.rank(&"100".into()), Some(3));
        assert_eq!(table.rank(&"7".into()), None);
    }

    proptest! {
        #[test]
        fn prop_bucket_is_known_label(v in any::<i64>()) {
            let table = BucketTable::default();
            let label = table.bucket(&v.to_string());
            prop_assert!(["1", "10", "50", "100"].contains(&label.as_str()));
        }

        #[test]
        fn prop_bucket_is_monotonic(a in any::<i64>(), b in any::<i64>()) {
            let table = BucketTable::default();
            let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
            let hi_rank = table.rank(&table.bucket_for(hi)).unwrap();
            let lo_rank = table.rank(&table.bucket_for(lo)).unwrap();
            prop_assert!(hi_rank >= lo_rank);
        }

        #[test]
        fn prop_non_numeric_matches_zero(s in "[a-zA-Z_./ -]*") {
            let table = BucketTable::default();
            prop_assert_eq!(table.bucket(&s), table.bucket("0"));
        }
    }
}
