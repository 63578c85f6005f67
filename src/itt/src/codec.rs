//! Packed object identifiers
//!
//! Every game object is keyed by a four character code such as `I00A` or
//! `hfoo`. Generated map scripts store the code packed into a 32-bit integer,
//! one byte per character, most significant byte first.
//!
//! The generated scripts also bind object codes to named constants through a
//! chain of temporaries:
//!
//! ```text
//! set receiver_12 = 1227894832
//! call int_registerObjectID(receiver_12, "Iron Axe", "...")
//! set LocalObjectIDs_ITEM_IRON_AXE = receiver_12
//! set ITEM_IRON_AXE = LocalObjectIDs_ITEM_IRON_AXE
//! ```
//!
//! [`LocalObjectTable`] collects those bindings and [`resolve_alias`] follows
//! the plain `set A = B` hops back to the registered constant.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

const CODE_LEN: usize = 4;

/// Decode a packed identifier into its four character code.
///
/// Non-finite input yields `None`. Other values are truncated and reduced
/// modulo 2^32 first, so any number a script literal can hold is accepted.
/// A code made only of whitespace is treated as absent.
pub fn decode_object_id(value: f64) -> Option<String> {
    if !value.is_finite() {
        return None;
    }
    let packed = value.trunc().rem_euclid(4_294_967_296.0) as u32;
    let code: String = packed.to_be_bytes().iter().map(|&b| char::from(b)).collect();
    if code.trim().is_empty() {
        None
    } else {
        Some(code)
    }
}

/// Pack a four character code back into its integer form.
///
/// Each character must fit in one byte.
pub fn encode_object_id(code: &str) -> Option<u32> {
    let mut bytes = [0u8; CODE_LEN];
    let mut count = 0;
    for c in code.chars() {
        if count == CODE_LEN {
            return None;
        }
        bytes[count] = u8::try_from(u32::from(c)).ok()?;
        count += 1;
    }
    if count != CODE_LEN {
        return None;
    }
    Some(u32::from_be_bytes(bytes))
}

/// Canonical form of an object id: the part before any `:` suffix, uppercased.
pub fn normalize_object_id(raw: &str) -> Option<String> {
    let base = raw.split(':').next().unwrap_or_default().trim();
    if base.is_empty() {
        None
    } else {
        Some(base.to_uppercase())
    }
}

/// Follow `name -> name` substitutions until a terminal name is reached.
///
/// Resolution stops at the first name seen twice, so cyclic alias chains
/// terminate instead of looping.
pub fn resolve_alias(name: &str, aliases: &HashMap<String, String>) -> String {
    let mut current = name;
    let mut visited = HashSet::new();
    while let Some(next) = aliases.get(current) {
        if !visited.insert(current) {
            break;
        }
        current = next;
    }
    current.to_string()
}

// ============================================================================
// Local object table
// ============================================================================

static RECEIVER_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*set\s+receiver_(\d+)\s*=\s*(-?\d+)").unwrap());
static RECEIVER_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*call\s+int_registerObjectID\s*\(\s*receiver_(\d+)\s*,\s*"([^"]+)""#).unwrap()
});
static CONST_BINDING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*set\s+(LocalObjectIDs_[A-Za-z0-9_]+)\s*=\s*receiver_(\d+)").unwrap()
});
static PLAIN_ALIAS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*set\s+([A-Za-z0-9_]+)\s*=\s*([A-Za-z0-9_]+)").unwrap());

/// Object registered under a `LocalObjectIDs_*` constant
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    /// Display name passed to the registration call
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Decoded four character code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
}

/// Constant bindings and alias chains parsed from generated map script
#[derive(Debug, Clone, Default)]
pub struct LocalObjectTable {
    pub objects: BTreeMap<String, ObjectRef>,
    pub aliases: HashMap<String, String>,
}

impl LocalObjectTable {
    pub fn parse<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        let mut receiver_values: HashMap<String, f64> = HashMap::new();
        let mut receiver_names: HashMap<String, String> = HashMap::new();
        let mut table = Self::default();

        for line in lines {
            if let Some(caps) = RECEIVER_VALUE.captures(line) {
                if let Ok(value) = caps[2].parse::<f64>() {
                    receiver_values.insert(caps[1].to_string(), value);
                }
                continue;
            }

            if let Some(caps) = RECEIVER_NAME.captures(line) {
                receiver_names.insert(caps[1].to_string(), caps[2].to_string());
                continue;
            }

            if let Some(caps) = CONST_BINDING.captures(line) {
                let receiver = &caps[2];
                table.objects.insert(
                    caps[1].to_string(),
                    ObjectRef {
                        name: receiver_names.get(receiver).cloned(),
                        object_id: receiver_values
                            .get(receiver)
                            .and_then(|v| decode_object_id(*v)),
                    },
                );
                continue;
            }

            if let Some(caps) = PLAIN_ALIAS.captures(line) {
                let (target, source) = (&caps[1], &caps[2]);
                if !target.starts_with("receiver") && !source.starts_with("receiver") {
                    table.aliases.insert(target.to_string(), source.to_string());
                }
            }
        }

        table
    }

    pub fn resolve(&self, name: &str) -> String {
        resolve_alias(name, &self.aliases)
    }

    pub fn get(&self, constant: &str) -> Option<&ObjectRef> {
        self.objects.get(constant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_known_code() {
        // 'I' 0x49, '0' 0x30, '0' 0x30, 'A' 0x41
        assert_eq!(decode_object_id(f64::from(0x4930_3041u32)), Some("I00A".into()));
        assert_eq!(encode_object_id("I00A"), Some(0x4930_3041));
    }

    #[test]
    fn test_decode_rejects_non_finite() {
        assert_eq!(decode_object_id(f64::NAN), None);
        assert_eq!(decode_object_id(f64::INFINITY), None);
    }

    #[test]
    fn test_decode_blank_code_is_none() {
        assert_eq!(decode_object_id(f64::from(0x2020_2020u32)), None);
    }

    #[test]
    fn test_decode_wraps_like_uint32() {
        let wrapped = 4_294_967_296.0 + f64::from(0x6866_6F6Fu32);
        assert_eq!(decode_object_id(wrapped), Some("hfoo".into()));
        assert_eq!(decode_object_id(-1.0), Some("\u{ff}\u{ff}\u{ff}\u{ff}".into()));
    }

    #[test]
    fn test_encode_decode_round_trip_samples() {
        let mut v: u64 = 0;
        while v < (1u64 << 32) {
            let value = v as u32;
            if let Some(code) = decode_object_id(f64::from(value)) {
                assert_eq!(encode_object_id(&code), Some(value), "value {value:#x}");
            }
            v += 0x0001_0F03;
        }
        for value in [0u32, 1, 0xFF, 0x4141_4141, u32::MAX] {
            if let Some(code) = decode_object_id(f64::from(value)) {
                assert_eq!(encode_object_id(&code), Some(value));
            }
        }
    }

    #[test]
    fn test_encode_rejects_bad_codes() {
        assert_eq!(encode_object_id("I00"), None);
        assert_eq!(encode_object_id("I00AB"), None);
        assert_eq!(encode_object_id("I0\u{263a}A"), None);
    }

    #[test]
    fn test_normalize_object_id() {
        assert_eq!(normalize_object_id("i00a:hslv"), Some("I00A".into()));
        assert_eq!(normalize_object_id("hfoo"), Some("HFOO".into()));
        assert_eq!(normalize_object_id(":x"), None);
        assert_eq!(normalize_object_id(""), None);
    }

    #[test]
    fn test_resolve_alias_chain() {
        let aliases: HashMap<String, String> = [("A", "B"), ("B", "C")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(resolve_alias("A", &aliases), "C");
        assert_eq!(resolve_alias("Z", &aliases), "Z");
    }

    #[test]
    fn test_resolve_alias_cycle_terminates() {
        let aliases: HashMap<String, String> = [("A", "B"), ("B", "C"), ("C", "A")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        // A -> B -> C -> A: stops when A repeats
        assert_eq!(resolve_alias("A", &aliases), "A");

        let self_loop: HashMap<String, String> =
            [("X".to_string(), "X".to_string())].into_iter().collect();
        assert_eq!(resolve_alias("X", &self_loop), "X");
    }

    #[test]
    fn test_local_object_table_parse() {
        let script = r#"
            set receiver_3 = 1227894832
            call int_registerObjectID(receiver_3, "Iron Axe", "stack")
            set LocalObjectIDs_ITEM_IRON_AXE = receiver_3
            set ITEM_IRON_AXE = LocalObjectIDs_ITEM_IRON_AXE
            set receiver_4 = receiver_3
        "#;
        let table = LocalObjectTable::parse(script.lines());

        let axe = table.get("LocalObjectIDs_ITEM_IRON_AXE").unwrap();
        assert_eq!(axe.name.as_deref(), Some("Iron Axe"));
        assert_eq!(axe.object_id.as_deref(), Some("I000"));
        assert_eq!(table.resolve("ITEM_IRON_AXE"), "LocalObjectIDs_ITEM_IRON_AXE");
        assert!(!table.aliases.contains_key("receiver_4"));
    }
}
