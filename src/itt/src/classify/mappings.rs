//! Curated category mappings and classifier thresholds

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::report::Report;

/// Shortest curated key considered for substring matching
pub const DEFAULT_MIN_FUZZY_KEY_LEN: usize = 3;

/// Hand-maintained `category-mappings.json`
///
/// ```json
/// { "items": { "iron axe": "weapons" }, "abilities": { "ensnare": "hunter" } }
/// ```
///
/// Keys are lowercased on load; values are kept as written and normalised by
/// the classifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMappings {
    #[serde(default)]
    pub items: BTreeMap<String, String>,
    #[serde(default)]
    pub abilities: BTreeMap<String, String>,
}

impl CategoryMappings {
    /// Load the mapping file; a missing or corrupt file yields an empty mapping.
    pub fn load(path: &Path, report: &mut Report) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                report.missing_input(path, format!("cannot read category mappings: {}", e));
                return Self::default();
            }
        };
        match serde_json::from_str::<Self>(&content) {
            Ok(mappings) => {
                let mappings = mappings.lowercased();
                tracing::info!(
                    items = mappings.items.len(),
                    abilities = mappings.abilities.len(),
                    "loaded category mappings"
                );
                mappings
            }
            Err(e) => {
                report.missing_input(path, format!("corrupt category mappings: {}", e));
                Self::default()
            }
        }
    }

    fn lowercased(self) -> Self {
        let lower = |map: BTreeMap<String, String>| {
            map.into_iter()
                .map(|(k, v)| (k.trim().to_lowercase(), v))
                .collect()
        };
        Self {
            items: lower(self.items),
            abilities: lower(self.abilities),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.abilities.is_empty()
    }
}

/// Tunable classifier thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
    /// Curated keys (and slugs) shorter than this never take part in
    /// substring matching
    pub min_fuzzy_key_len: usize,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            min_fuzzy_key_len: DEFAULT_MIN_FUZZY_KEY_LEN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_lowercases_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"items": {{"Iron Axe": "weapons"}}, "abilities": {{"ENSNARE": "hunter"}}}}"#
        )
        .unwrap();

        let mut report = Report::new();
        let mappings = CategoryMappings::load(file.path(), &mut report);
        assert!(report.is_empty());
        assert_eq!(mappings.items.get("iron axe").map(String::as_str), Some("weapons"));
        assert_eq!(mappings.abilities.get("ensnare").map(String::as_str), Some("hunter"));
    }

    #[test]
    fn test_missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut report = Report::new();
        let mappings = CategoryMappings::load(&dir.path().join("nope.json"), &mut report);
        assert!(mappings.is_empty());
        assert_eq!(report.count(crate::report::IssueKind::MissingInput), 1);
    }

    #[test]
    fn test_settings_default() {
        let settings: ClassifierSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.min_fuzzy_key_len, DEFAULT_MIN_FUZZY_KEY_LEN);
    }
}
