//! Sparse per-level field overrides
//!
//! Archive tables describe each object as a flat list of override records,
//! one `(field, level, value)` triple per modified attribute. Most fields only
//! ever populate level 0; leveled abilities repeat a field once per level.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Value carried by an override record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Real(f64),
    Text(String),
}

impl FieldValue {
    /// Empty text counts as "not set"; numbers are always set.
    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Text(s) if s.trim().is_empty())
    }

    /// Empty text or numeric zero
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Int(i) => *i == 0,
            FieldValue::Real(r) => *r == 0.0,
            FieldValue::Text(s) => s.trim().is_empty(),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Int(i) => Some(*i as f64),
            FieldValue::Real(r) => Some(*r),
            FieldValue::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(i) => Some(*i),
            FieldValue::Real(r) => Some(r.trunc() as i64),
            FieldValue::Text(s) => {
                let s = s.trim();
                s.parse()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().map(|f| f.trunc() as i64))
            }
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Text form of the value, numbers included
    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Real(r) => write!(f, "{}", r),
            FieldValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Real(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

/// One field's value at one level of one object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideRecord {
    #[serde(rename = "id")]
    pub field_id: String,
    #[serde(default)]
    pub level: u32,
    pub value: FieldValue,
}

impl OverrideRecord {
    pub fn new(field_id: &str, level: u32, value: impl Into<FieldValue>) -> Self {
        Self {
            field_id: field_id.to_string(),
            level,
            value: value.into(),
        }
    }
}

/// Effective value of `field_id` at `level`.
///
/// Lookup order: exact level, then level 0, then the first record for the
/// field at any level (record order as given).
pub fn get_field<'a>(
    overrides: &'a [OverrideRecord],
    field_id: &str,
    level: u32,
) -> Option<&'a FieldValue> {
    let matching = || overrides.iter().filter(|r| r.field_id == field_id);
    matching()
        .find(|r| r.level == level)
        .or_else(|| matching().find(|r| r.level == 0))
        .or_else(|| matching().next())
        .map(|r| &r.value)
}

/// Every level at which `field_id` has a non-empty value.
///
/// When a level appears twice the first record wins.
pub fn get_all_levels<'a>(
    overrides: &'a [OverrideRecord],
    field_id: &str,
) -> BTreeMap<u32, &'a FieldValue> {
    let mut levels = BTreeMap::new();
    for record in overrides.iter().filter(|r| r.field_id == field_id) {
        if !record.value.is_empty() {
            levels.entry(record.level).or_insert(&record.value);
        }
    }
    levels
}

/// First of several alternative fields whose value is set (non-empty, non-zero)
pub fn first_field<'a>(
    overrides: &'a [OverrideRecord],
    field_ids: &[&str],
    level: u32,
) -> Option<&'a FieldValue> {
    field_ids
        .iter()
        .filter_map(|id| get_field(overrides, id, level))
        .find(|v| !v.is_blank())
}

/// Distinct levels present anywhere in the record list, ascending
pub fn levels_present(overrides: &[OverrideRecord]) -> Vec<u32> {
    let mut levels: Vec<u32> = overrides.iter().map(|r| r.level).collect();
    levels.sort_unstable();
    levels.dedup();
    levels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_field_level_zero_fallback() {
        let overrides = vec![OverrideRecord::new("X", 0, 5)];
        assert_eq!(get_field(&overrides, "X", 2), Some(&FieldValue::Int(5)));
    }

    #[test]
    fn test_get_field_any_level_fallback() {
        let overrides = vec![OverrideRecord::new("X", 1, 7)];
        assert_eq!(get_field(&overrides, "X", 1), Some(&FieldValue::Int(7)));
        assert_eq!(get_field(&overrides, "X", 2), Some(&FieldValue::Int(7)));
    }

    #[test]
    fn test_get_field_prefers_exact_level() {
        let overrides = vec![
            OverrideRecord::new("acdn", 0, 10),
            OverrideRecord::new("acdn", 2, 8),
            OverrideRecord::new("acdn", 3, 6),
        ];
        assert_eq!(get_field(&overrides, "acdn", 3), Some(&FieldValue::Int(6)));
        assert_eq!(get_field(&overrides, "acdn", 1), Some(&FieldValue::Int(10)));
        assert_eq!(get_field(&overrides, "amcs", 1), None);
    }

    #[test]
    fn test_get_field_any_level_uses_record_order() {
        let overrides = vec![
            OverrideRecord::new("X", 3, "third"),
            OverrideRecord::new("X", 2, "second"),
        ];
        assert_eq!(get_field(&overrides, "X", 5), Some(&FieldValue::from("third")));
    }

    #[test]
    fn test_get_all_levels_skips_empty() {
        let overrides = vec![
            OverrideRecord::new("acdn", 1, 45),
            OverrideRecord::new("acdn", 2, ""),
            OverrideRecord::new("acdn", 3, 35.5),
            OverrideRecord::new("amcs", 1, 20),
        ];
        let levels = get_all_levels(&overrides, "acdn");
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[&1], &FieldValue::Int(45));
        assert_eq!(levels[&3], &FieldValue::Real(35.5));
    }

    #[test]
    fn test_first_field_skips_blank_alternatives() {
        let overrides = vec![
            OverrideRecord::new("unam", 0, ""),
            OverrideRecord::new("inam", 0, "Iron Axe"),
        ];
        let name = first_field(&overrides, &["unam", "inam"], 0);
        assert_eq!(name.and_then(FieldValue::as_str), Some("Iron Axe"));
        assert_eq!(first_field(&overrides, &["ides"], 0), None);
    }

    #[test]
    fn test_record_deserializes_archive_shape() {
        let json = r#"[{"id":"igol","type":"int","level":0,"value":120},
                       {"id":"inam","value":"Iron Axe"},
                       {"id":"isca","level":0,"value":1.25}]"#;
        let records: Vec<OverrideRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(records[0].value, FieldValue::Int(120));
        assert_eq!(records[1].level, 0);
        assert_eq!(records[1].value.as_str(), Some("Iron Axe"));
        assert_eq!(records[2].value.as_f64(), Some(1.25));
    }

    #[test]
    fn test_value_conversions() {
        assert_eq!(FieldValue::from("12").as_i64(), Some(12));
        assert_eq!(FieldValue::from("2.5").as_f64(), Some(2.5));
        assert_eq!(FieldValue::Real(3.9).as_i64(), Some(3));
        assert!(FieldValue::Int(0).is_blank());
        assert!(!FieldValue::Int(0).is_empty());
        assert_eq!(FieldValue::Int(4).to_text(), "4");
    }
}
