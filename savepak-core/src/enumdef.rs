//! Immutable name/integer lookup tables.
//!
//! An [`EnumDef`] is a bijection between string keys and distinct integer
//! values, used for stable on-disk encodings of game enumerations (game
//! modes, item kinds, quest states). Entries are ordered by value so two
//! definitions built from the same pairs serialize identically.

use std::collections::{HashMap, HashSet};

use crate::error::{CoreError, Result};

/// Smallest value accepted by [`EnumDef::compact`].
pub const COMPACT_MIN: i64 = -32;
/// Largest value accepted by [`EnumDef::compact`].
pub const COMPACT_MAX: i64 = 127;

/// An immutable, ordered name ↔ integer bijection.
///
/// The structure has no mutating methods; once built it can only be read.
///
/// # Example
///
/// ```rust
/// use savepak_core::enumdef::EnumDef;
///
/// let modes = EnumDef::new([("LOBBY", 0), ("ROUND", 1), ("SCORES", 2)]).unwrap();
/// assert_eq!(modes.by_key("ROUND").unwrap(), 1);
/// assert_eq!(modes.by_value(2).unwrap(), "SCORES");
/// ```
#[derive(Debug, Clone)]
pub struct EnumDef {
    /// Entries in sort order.
    entries: Vec<(String, i64)>,
    /// key → entry slot.
    key_index: HashMap<String, usize>,
    /// value → entry slot.
    value_index: HashMap<i64, usize>,
}

impl EnumDef {
    /// Build a definition sorted by value, ascending.
    pub fn new<K>(pairs: impl IntoIterator<Item = (K, i64)>) -> Result<Self>
    where
        K: Into<String>,
    {
        Self::build(pairs, i64::MIN, i64::MAX, false)
    }

    /// Build a definition sorted by value, descending.
    pub fn descending<K>(pairs: impl IntoIterator<Item = (K, i64)>) -> Result<Self>
    where
        K: Into<String>,
    {
        Self::build(pairs, i64::MIN, i64::MAX, true)
    }

    /// Build an ascending definition whose values are constrained to
    /// [`COMPACT_MIN`]..=[`COMPACT_MAX`], the range that fits a single
    /// MessagePack fixint byte.
    pub fn compact<K>(pairs: impl IntoIterator<Item = (K, i64)>) -> Result<Self>
    where
        K: Into<String>,
    {
        Self::build(pairs, COMPACT_MIN, COMPACT_MAX, false)
    }

    /// Build an ascending definition with a caller-declared value range.
    pub fn with_range<K>(
        pairs: impl IntoIterator<Item = (K, i64)>,
        min: i64,
        max: i64,
    ) -> Result<Self>
    where
        K: Into<String>,
    {
        Self::build(pairs, min, max, false)
    }

    /// Rebuild a definition from previously serialized parallel key/value
    /// listings, preserving their stored order.
    ///
    /// Validation is the same as for the other constructors; only the sort
    /// step is skipped, so a descending definition round-trips unchanged.
    pub fn from_ordered_pairs(keys: Vec<String>, values: Vec<i64>) -> Result<Self> {
        if keys.len() != values.len() {
            return Err(CoreError::invalid_argument(format!(
                "{} keys but {} values",
                keys.len(),
                values.len()
            )));
        }
        let entries: Vec<(String, i64)> = keys.into_iter().zip(values).collect();
        Self::assemble(entries)
    }

    fn build<K>(
        pairs: impl IntoIterator<Item = (K, i64)>,
        min: i64,
        max: i64,
        descending: bool,
    ) -> Result<Self>
    where
        K: Into<String>,
    {
        let mut entries: Vec<(String, i64)> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v))
            .collect();
        for (_, value) in &entries {
            if *value < min || *value > max {
                return Err(CoreError::invalid_argument(format!(
                    "value {value} outside declared range [{min}, {max}]"
                )));
            }
        }
        if descending {
            entries.sort_by(|a, b| b.1.cmp(&a.1));
        } else {
            entries.sort_by_key(|e| e.1);
        }
        Self::assemble(entries)
    }

    fn assemble(entries: Vec<(String, i64)>) -> Result<Self> {
        if entries.is_empty() {
            return Err(CoreError::invalid_argument("enum has no entries"));
        }
        let mut seen_values = HashSet::new();
        let mut key_index = HashMap::with_capacity(entries.len());
        let mut value_index = HashMap::with_capacity(entries.len());
        for (slot, (key, value)) in entries.iter().enumerate() {
            if key.is_empty() || key.parse::<f64>().is_ok() {
                return Err(CoreError::invalid_argument(format!(
                    "key {key:?} is not a non-numeric string"
                )));
            }
            if key_index.insert(key.clone(), slot).is_some() {
                return Err(CoreError::invalid_argument(format!(
                    "duplicate key {key:?}"
                )));
            }
            if !seen_values.insert(*value) {
                return Err(CoreError::invalid_argument(format!(
                    "duplicate value {value}"
                )));
            }
            value_index.insert(*value, slot);
        }
        Ok(Self {
            entries,
            key_index,
            value_index,
        })
    }

    /// Look up the value for `key`.
    pub fn by_key(&self, key: &str) -> Result<i64> {
        self.key_index
            .get(key)
            .map(|&slot| self.entries[slot].1)
            .ok_or_else(|| CoreError::not_found(key))
    }

    /// Look up the key for `value`.
    pub fn by_value(&self, value: i64) -> Result<&str> {
        self.value_index
            .get(&value)
            .map(|&slot| self.entries[slot].0.as_str())
            .ok_or_else(|| CoreError::not_found(value.to_string()))
    }

    /// Iterate `(key, value)` pairs in sort order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; empty definitions are rejected at construction.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The smallest value.
    pub fn min_value(&self) -> i64 {
        self.entries.iter().map(|e| e.1).min().expect("non-empty")
    }

    /// The largest value.
    pub fn max_value(&self) -> i64 {
        self.entries.iter().map(|e| e.1).max().expect("non-empty")
    }

    /// True iff `min` equals the smallest value and `max` is at least the
    /// largest.
    pub fn is_in(&self, min: i64, max: i64) -> bool {
        self.min_value() == min && self.max_value() <= max
    }
}

/// Compares entry listings only; the derived indexes always agree.
impl PartialEq for EnumDef {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for EnumDef {}

#[cfg(test)]
mod tests {
    use super::*;

    fn modes() -> EnumDef {
        EnumDef::new([("SCORES", 7), ("LOBBY", -2), ("ROUND", 3)]).unwrap()
    }

    #[test]
    fn test_lookup_both_ways() {
        let e = modes();
        assert_eq!(e.by_key("LOBBY").unwrap(), -2);
        assert_eq!(e.by_key("SCORES").unwrap(), 7);
        assert_eq!(e.by_value(3).unwrap(), "ROUND");
        assert!(e.by_key("FINALE").is_err());
        assert!(e.by_value(99).is_err());
    }

    #[test]
    fn test_ascending_order() {
        let order: Vec<_> = modes().iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(order, ["LOBBY", "ROUND", "SCORES"]);
    }

    #[test]
    fn test_descending_order() {
        let e = EnumDef::descending([("A", 1), ("B", 5), ("C", 3)]).unwrap();
        let values: Vec<_> = e.iter().map(|(_, v)| v).collect();
        assert_eq!(values, [5, 3, 1]);
    }

    #[test]
    fn test_rejects_bad_keys() {
        assert!(EnumDef::new([("", 0)]).is_err());
        assert!(EnumDef::new([("12", 0)]).is_err());
        assert!(EnumDef::new([("-3.5", 0)]).is_err());
        assert!(EnumDef::new([("x12", 0)]).is_ok());
    }

    #[test]
    fn test_rejects_duplicates() {
        assert!(EnumDef::new([("A", 0), ("A", 1)]).is_err());
        assert!(EnumDef::new([("A", 0), ("B", 0)]).is_err());
    }

    #[test]
    fn test_compact_range() {
        assert!(EnumDef::compact([("A", -32), ("B", 127)]).is_ok());
        assert!(EnumDef::compact([("A", -33)]).is_err());
        assert!(EnumDef::compact([("A", 128)]).is_err());
    }

    #[test]
    fn test_is_in() {
        let e = modes();
        assert!(e.is_in(-2, 7));
        assert!(e.is_in(-2, 100));
        assert!(!e.is_in(0, 7));
        assert!(!e.is_in(-2, 6));
    }

    #[test]
    fn test_empty_rejected() {
        let none: [(&str, i64); 0] = [];
        assert!(EnumDef::new(none).is_err());
    }

    #[test]
    fn test_from_ordered_pairs_preserves_order() {
        let e = EnumDef::descending([("A", 1), ("B", 5)]).unwrap();
        let keys: Vec<String> = e.iter().map(|(k, _)| k.to_string()).collect();
        let values: Vec<i64> = e.iter().map(|(_, v)| v).collect();
        let rebuilt = EnumDef::from_ordered_pairs(keys, values).unwrap();
        assert_eq!(e, rebuilt);
    }
}
