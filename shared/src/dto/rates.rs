//! # Rate Table
//!
//! Interest percentage per installment count. Keys are the installment counts
//! offered by the store (1 to 21); a missing key means no interest.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Smallest installment count offered.
pub const MIN_INSTALLMENTS: u8 = 1;
/// Largest installment count offered.
pub const MAX_INSTALLMENTS: u8 = 21;

/// Rates shipped with a fresh install, before the backend is ever reached.
const DEFAULT_RATES: [(u8, f64); 9] = [
    (1, 0.0),
    (2, 4.0),
    (3, 4.5),
    (4, 5.0),
    (5, 6.0),
    (6, 7.0),
    (10, 10.0),
    (12, 12.0),
    (18, 15.0),
];

/// Mapping from installment count to interest percentage.
///
/// Invariants:
/// - every key is within [`MIN_INSTALLMENTS`]..=[`MAX_INSTALLMENTS`]
/// - every value is finite and non-negative
///
/// Serializes as a JSON object with stringified integer keys, the same shape
/// stored in the backend `rates` column and the local cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RateTable(BTreeMap<u8, f64>);

impl RateTable {
    /// Empty table (every installment count reads as 0%).
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Default rates used when neither cache nor backend has a table.
    pub fn defaults() -> Self {
        Self(DEFAULT_RATES.iter().copied().collect())
    }

    /// Rate for `installments`, `0.0` when not configured.
    pub fn rate(&self, installments: u8) -> f64 {
        self.0.get(&installments).copied().unwrap_or(0.0)
    }

    /// Set the rate for one installment count, enforcing the table invariants.
    pub fn set(&mut self, installments: u8, rate: f64) -> Result<(), String> {
        if !(MIN_INSTALLMENTS..=MAX_INSTALLMENTS).contains(&installments) {
            return Err(format!(
                "Installment count must be between {} and {}, got {}",
                MIN_INSTALLMENTS, MAX_INSTALLMENTS, installments
            ));
        }
        if !rate.is_finite() || rate < 0.0 {
            return Err(format!("Rate must be a non-negative number, got {}", rate));
        }
        self.0.insert(installments, rate);
        Ok(())
    }

    /// Every offered slot (1..=21) with its effective rate.
    pub fn slots(&self) -> impl Iterator<Item = (u8, f64)> + '_ {
        (MIN_INSTALLMENTS..=MAX_INSTALLMENTS).map(move |n| (n, self.rate(n)))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Build a table from an arbitrary JSON value, keeping the valid entries.
    ///
    /// Returns the table plus a description of every rejected entry so the
    /// caller can log them. Non-object input yields an empty table.
    pub fn parse_lossy(value: &Value) -> (Self, Vec<String>) {
        let mut table = Self::new();
        let mut rejected = Vec::new();

        let Some(object) = value.as_object() else {
            rejected.push(format!("expected an object, got {}", value));
            return (table, rejected);
        };

        for (key, raw) in object {
            let installments = match key.trim().parse::<u8>() {
                Ok(n) => n,
                Err(_) => {
                    rejected.push(format!("invalid installment key {:?}", key));
                    continue;
                }
            };
            let Some(rate) = raw.as_f64() else {
                rejected.push(format!("rate for {} is not a number: {}", key, raw));
                continue;
            };
            if let Err(e) = table.set(installments, rate) {
                rejected.push(e);
            }
        }

        (table, rejected)
    }
}

impl<'de> Deserialize<'de> for RateTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::parse_lossy(&value).0)
    }
}

impl FromIterator<(u8, f64)> for RateTable {
    /// Collects entries, silently skipping those that violate the invariants.
    fn from_iter<I: IntoIterator<Item = (u8, f64)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (n, rate) in iter {
            let _ = table.set(n, rate);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let rates = RateTable::defaults();
        assert_eq!(rates.len(), 9);
        assert_eq!(rates.rate(1), 0.0);
        assert_eq!(rates.rate(3), 4.5);
        assert_eq!(rates.rate(18), 15.0);
        // Not configured
        assert_eq!(rates.rate(7), 0.0);
        assert_eq!(rates.rate(21), 0.0);
    }

    #[test]
    fn test_set_rejects_out_of_range() {
        let mut rates = RateTable::new();
        assert!(rates.set(0, 1.0).is_err());
        assert!(rates.set(22, 1.0).is_err());
        assert!(rates.set(3, -0.5).is_err());
        assert!(rates.set(3, f64::NAN).is_err());
        assert!(rates.set(21, 30.0).is_ok());
        assert_eq!(rates.len(), 1);
    }

    #[test]
    fn test_slots_cover_all_installments() {
        let rates = RateTable::defaults();
        let slots: Vec<(u8, f64)> = rates.slots().collect();
        assert_eq!(slots.len(), 21);
        assert_eq!(slots[0], (1, 0.0));
        assert_eq!(slots[20], (21, 0.0));
        assert_eq!(slots[9], (10, 10.0));
    }

    #[test]
    fn test_serializes_with_string_keys() {
        let mut rates = RateTable::new();
        rates.set(2, 4.0).unwrap();
        rates.set(10, 9.5).unwrap();
        let json = serde_json::to_string(&rates).unwrap();
        assert_eq!(json, r#"{"2":4.0,"10":9.5}"#);
    }

    #[test]
    fn test_deserializes_backend_shape() {
        let rates: RateTable = serde_json::from_value(json!({"1": 0, "2": 4, "3": 4.5})).unwrap();
        assert_eq!(rates.rate(2), 4.0);
        assert_eq!(rates.rate(3), 4.5);
        assert_eq!(rates.len(), 3);
    }

    #[test]
    fn test_parse_lossy_drops_invalid_entries() {
        let (rates, rejected) = RateTable::parse_lossy(&json!({
            "2": 4.0,
            "0": 1.0,
            "30": 2.0,
            "abc": 3.0,
            "5": -1.0,
            "6": "7"
        }));
        assert_eq!(rates.len(), 1);
        assert_eq!(rates.rate(2), 4.0);
        assert_eq!(rejected.len(), 5);
    }

    #[test]
    fn test_parse_lossy_non_object() {
        let (rates, rejected) = RateTable::parse_lossy(&json!([1, 2, 3]));
        assert!(rates.is_empty());
        assert_eq!(rejected.len(), 1);
    }
}
