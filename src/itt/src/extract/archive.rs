//! Archive extractor
//!
//! Reads the per-kind object tables dumped from the map archive and applies a
//! fixed field-id mapping to each object. Every raw entity keeps its override
//! list so later stages can rebuild level tables.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::fields::{first_field, get_all_levels, get_field, levels_present, FieldValue, OverrideRecord};
use crate::model::{ItemFlags, LevelStats, RawAbility, RawBuilding, RawItem, RawUnit, UnitFlags};
use crate::report::Report;

/// Object table of one kind as dumped from the archive.
///
/// Objects are kept as raw JSON so one bad object does not poison the table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObjectTable {
    #[serde(default)]
    pub original: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub custom: BTreeMap<String, serde_json::Value>,
}

impl ObjectTable {
    /// Override lists keyed by object id, ascending.
    ///
    /// Custom objects replace original objects with the same id. Objects whose
    /// override list does not parse are reported and skipped.
    pub fn objects(&self, report: &mut Report) -> BTreeMap<String, Vec<OverrideRecord>> {
        let mut objects = BTreeMap::new();
        for (id, value) in self.original.iter().chain(self.custom.iter()) {
            match serde_json::from_value::<Vec<OverrideRecord>>(value.clone()) {
                Ok(records) => {
                    objects.insert(id.clone(), records);
                }
                Err(e) => report.malformed(id.as_str(), format!("unreadable override list: {}", e)),
            }
        }
        objects
    }

    pub fn is_empty(&self) -> bool {
        self.original.is_empty() && self.custom.is_empty()
    }
}

/// Load one object table; a missing or corrupt file is reported and read as absent.
pub fn load_object_table(path: &Path, report: &mut Report) -> Option<ObjectTable> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            report.missing_input(path, format!("cannot read object table: {}", e));
            return None;
        }
    };
    match serde_json::from_str(&content) {
        Ok(table) => Some(table),
        Err(e) => {
            report.missing_input(path, format!("corrupt object table: {}", e));
            None
        }
    }
}

// ============================================================================
// Field helpers
// ============================================================================

/// First non-blank text among alternative fields at `level`
fn text_at(records: &[OverrideRecord], ids: &[&str], level: u32) -> String {
    ids.iter()
        .filter_map(|id| get_field(records, id, level))
        .filter_map(FieldValue::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or_default()
        .to_string()
}

fn text(records: &[OverrideRecord], ids: &[&str]) -> String {
    text_at(records, ids, 0)
}

fn number(records: &[OverrideRecord], ids: &[&str]) -> Option<f64> {
    first_field(records, ids, 0).and_then(FieldValue::as_f64)
}

fn integer(records: &[OverrideRecord], id: &str) -> i64 {
    get_field(records, id, 0).and_then(FieldValue::as_i64).unwrap_or(0)
}

/// Set unless the field is present and zero
fn flag_unless_zero(records: &[OverrideRecord], id: &str) -> bool {
    match get_field(records, id, 0) {
        Some(value) => value.as_f64() != Some(0.0),
        None => true,
    }
}

/// Set only when the field is present and one
fn flag_if_one(records: &[OverrideRecord], id: &str) -> bool {
    get_field(records, id, 0).and_then(FieldValue::as_f64) == Some(1.0)
}

/// Comma separated object code list, order kept, duplicates dropped
fn code_list(records: &[OverrideRecord], ids: &[&str]) -> Vec<String> {
    let mut codes: Vec<String> = Vec::new();
    for id in ids {
        let Some(value) = get_field(records, id, 0) else {
            continue;
        };
        let Some(list) = value.as_str() else {
            continue;
        };
        for code in list.split(',').map(str::trim).filter(|c| !c.is_empty()) {
            if !codes.iter().any(|c| c == code) {
                codes.push(code.to_string());
            }
        }
    }
    codes
}

// ============================================================================
// Items
// ============================================================================

pub fn extract_items(table: &ObjectTable, report: &mut Report) -> Vec<RawItem> {
    let items: Vec<RawItem> = table
        .objects(report)
        .into_iter()
        .map(|(id, records)| item_from_records(id, records))
        .collect();
    tracing::info!(count = items.len(), "extracted items");
    items
}

fn item_from_records(id: String, records: Vec<OverrideRecord>) -> RawItem {
    let r = records.as_slice();
    RawItem {
        name: text(r, &["unam", "inam"]),
        description: text(r, &["ides"]),
        tooltip: text(r, &["utub", "ides"]),
        icon: text(r, &["iico", "uico"]),
        category: None,
        cost: integer(r, "igol"),
        lumber_cost: integer(r, "ilum"),
        stock_maximum: integer(r, "isto"),
        stock_replenish_interval: integer(r, "istr"),
        class: text(r, &["icla"]),
        level: integer(r, "ilev"),
        uses: integer(r, "iuse"),
        hit_points: integer(r, "ihpc"),
        max_stack: integer(r, "ista"),
        scaling_value: number(r, &["isca"]).unwrap_or(0.0),
        model_path: text(r, &["ifil"]),
        hotkey: text(r, &["uhot", "ihot"]),
        abilities: code_list(r, &["iabi"]),
        flags: ItemFlags {
            droppable: flag_unless_zero(r, "idrp"),
            pawnable: flag_unless_zero(r, "ipaw"),
            perishable: flag_unless_zero(r, "iper"),
            actively_used: flag_unless_zero(r, "iusa"),
            ignore_cooldown: flag_unless_zero(r, "iucd"),
        },
        id,
        raw: records,
    }
}

// ============================================================================
// Abilities
// ============================================================================

pub const MANA_COST: &[&str] = &["amcs", "amc1", "amc2"];
pub const COOLDOWN: &[&str] = &["acdn", "acd1", "acd2"];
pub const DURATION: &[&str] = &["adur", "ahdu"];
pub const RANGE: &[&str] = &["aran", "arng"];
pub const AREA_OF_EFFECT: &[&str] = &["aare"];
pub const DAMAGE: &[&str] = &["ahd1", "ahd2"];

pub fn extract_abilities(table: &ObjectTable, report: &mut Report) -> Vec<RawAbility> {
    let abilities: Vec<RawAbility> = table
        .objects(report)
        .into_iter()
        .map(|(id, records)| ability_from_records(id, records))
        .collect();
    tracing::info!(count = abilities.len(), "extracted abilities");
    abilities
}

fn ability_from_records(id: String, records: Vec<OverrideRecord>) -> RawAbility {
    let r = records.as_slice();

    let attachment_points = r
        .iter()
        .filter(|rec| {
            rec.field_id.starts_with("ata") && rec.field_id != "atar" && rec.field_id != "atat"
        })
        .filter(|rec| !rec.value.is_empty())
        .map(|rec| rec.value.to_text())
        .collect();

    RawAbility {
        name: text(r, &["anam", "unam"]),
        description: text(r, &["ades"]),
        // level 1 tooltips are usually the detailed ones
        tooltip: text_at(r, &["aub1", "aub2", "utub"], 1),
        icon: text(r, &["aart", "uico"]),
        category: None,
        hero: flag_if_one(r, "aher"),
        item: flag_if_one(r, "aite"),
        race: text(r, &["arac"]),
        area_of_effect: number(r, AREA_OF_EFFECT),
        max_targets: get_field(r, "acap", 0).and_then(FieldValue::as_i64),
        hotkey: get_field(r, "ahky", 0).map(FieldValue::to_text).unwrap_or_default(),
        targets_allowed: get_field(r, "atar", 0).map(FieldValue::to_text).unwrap_or_default(),
        cast_time: number(r, &["acat"]),
        attachment_points,
        attachment_target: get_field(r, "atat", 0).map(FieldValue::to_text).unwrap_or_default(),
        levels: level_table(r),
        id,
        raw: records,
    }
}

/// Value of the first alternative field that is set exactly at `level`
fn level_value(records: &[OverrideRecord], ids: &[&str], level: u32) -> Option<f64> {
    ids.iter()
        .find_map(|id| get_all_levels(records, id).get(&level).and_then(|v| v.as_f64()))
}

/// Level-indexed stats; empty when only level 0 is populated.
pub fn level_table(records: &[OverrideRecord]) -> BTreeMap<u32, LevelStats> {
    let present = levels_present(records);
    let mut levels = BTreeMap::new();
    if present.is_empty() || present == [0] {
        return levels;
    }

    for level in present {
        let stats = LevelStats {
            mana_cost: level_value(records, MANA_COST, level),
            cooldown: level_value(records, COOLDOWN, level),
            duration: level_value(records, DURATION, level),
            range: level_value(records, RANGE, level),
            area_of_effect: level_value(records, AREA_OF_EFFECT, level),
            damage: level_value(records, DAMAGE, level),
        };
        if !stats.is_empty() {
            levels.insert(level, stats);
        }
    }
    levels
}

/// Headline value of a leveled stat: level 1 if present, else the level 0 field.
pub fn headline_stat(
    levels: &BTreeMap<u32, LevelStats>,
    records: &[OverrideRecord],
    pick: impl Fn(&LevelStats) -> Option<f64>,
    ids: &[&str],
) -> Option<f64> {
    levels
        .get(&1)
        .and_then(&pick)
        .or_else(|| number(records, ids))
}

/// Ability name recovered from alternate text fields when `anam` is unset.
///
/// Falls back to the first non-empty tooltip line, then to the object id.
pub fn fallback_ability_name(ability: &RawAbility) -> Option<String> {
    let name = ability.name.trim();
    if !name.is_empty() {
        return Some(name.to_string());
    }
    let alt = text(
        &ability.raw,
        &["atp1", "atp2", "atp3", "aret", "arut", "aub1", "anam", "unam"],
    );
    if !alt.is_empty() {
        return Some(alt);
    }
    if let Some(line) = ability.tooltip.lines().map(str::trim).find(|l| !l.is_empty()) {
        return Some(line.to_string());
    }
    let id = ability.id.trim();
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

// ============================================================================
// Units
// ============================================================================

pub fn extract_units(table: &ObjectTable, report: &mut Report) -> Vec<RawUnit> {
    let units: Vec<RawUnit> = table
        .objects(report)
        .into_iter()
        .map(|(id, records)| unit_from_records(id, records))
        .collect();
    tracing::info!(count = units.len(), "extracted units");
    units
}

fn unit_from_records(id: String, records: Vec<OverrideRecord>) -> RawUnit {
    let r = records.as_slice();
    let damage_base = number(r, &["ua1b"]);
    RawUnit {
        name: text(r, &["unam"]),
        tooltip: text(r, &["utub", "utip"]),
        icon: text(r, &["uico"]),
        race: text(r, &["urac"]),
        classification: text(r, &["utyp"]),
        strength: number(r, &["ustr"]),
        agility: number(r, &["uagi"]),
        intelligence: number(r, &["uint"]),
        strength_per_level: number(r, &["ustg"]),
        agility_per_level: number(r, &["uagp"]),
        intelligence_per_level: number(r, &["uinp"]),
        hp: number(r, &["uhpm", "uhpr"]),
        mana: number(r, &["umpm", "umpr"]),
        armor: number(r, &["udef"]),
        damage_base,
        damage_dice: number(r, &["ua1d"]),
        attack_cooldown: number(r, &["ua1c"]),
        attack_range: number(r, &["ua1r"]),
        acquisition_range: number(r, &["uacq"]),
        attack_type: text(r, &["ua1t"]),
        defense_type: text(r, &["udty"]),
        move_speed: number(r, &["umvs"]),
        turn_rate: number(r, &["umvr"]),
        collision_size: number(r, &["ucol"]),
        sight_range_day: number(r, &["usid"]).map(f64::trunc),
        sight_range_night: number(r, &["usin"]).map(f64::trunc),
        gold_cost: number(r, &["ugol"]).map(f64::trunc),
        lumber_cost: number(r, &["ulum"]).map(f64::trunc),
        food_cost: number(r, &["ufoo"]),
        build_time: number(r, &["ubld"]),
        abilities: code_list(r, &["uabi", "uag1", "uag2", "uag3", "uag4", "uag5", "uag6"]),
        flags: UnitFlags {
            is_building: flag_if_one(r, "ubdg"),
            is_flyer: get_field(r, "umvt", 0)
                .and_then(FieldValue::as_str)
                .is_some_and(|t| t.eq_ignore_ascii_case("fly")),
            is_worker: flag_if_one(r, "uapw"),
            can_attack: damage_base.is_some_and(|d| d > 0.0),
            can_harvest: flag_if_one(r, "uhar"),
        },
        id,
        raw: records,
    }
}

// ============================================================================
// Buildings
// ============================================================================

pub fn extract_buildings(table: &ObjectTable, report: &mut Report) -> Vec<RawBuilding> {
    let buildings: Vec<RawBuilding> = table
        .objects(report)
        .into_iter()
        .map(|(id, records)| building_from_records(id, records))
        .collect();
    tracing::info!(count = buildings.len(), "extracted buildings");
    buildings
}

fn building_from_records(id: String, records: Vec<OverrideRecord>) -> RawBuilding {
    let r = records.as_slice();
    RawBuilding {
        name: text(r, &["bnam", "unam"]),
        description: text(r, &["bdes"]),
        tooltip: text(r, &["btub", "utub"]),
        icon: text(r, &["bico", "uico"]),
        hp: number(r, &["bhpm", "uhpm", "uhpr"]),
        armor: number(r, &["bdef", "udef"]),
        build_time: number(r, &["ubld"]),
        gold_cost: number(r, &["ugol"]),
        lumber_cost: number(r, &["ulum", "ulur"]),
        repair_cost: number(r, &["bprc"]),
        repair_time: number(r, &["bprt"]),
        supply_provided: number(r, &["ubsp"]),
        supply_used: number(r, &["ubsa", "ufoo"]),
        abilities: code_list(r, &["uabi"]),
        id,
        raw: records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn table(json: &str) -> ObjectTable {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_custom_replaces_original() {
        let t = table(
            r#"{"original": {"I001": [{"id":"inam","value":"Old"}]},
                "custom":   {"I001": [{"id":"inam","value":"New"}],
                             "I000": [{"id":"inam","value":"First"}]}}"#,
        );
        let mut report = Report::new();
        let items = extract_items(&t, &mut report);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "I000");
        assert_eq!(items[1].name, "New");
        assert!(report.is_empty());
    }

    #[test]
    fn test_bad_object_is_skipped() {
        let t = table(
            r#"{"custom": {"I000": "garbage", "I001": [{"id":"inam","value":"Axe"}]}}"#,
        );
        let mut report = Report::new();
        let items = extract_items(&t, &mut report);
        assert_eq!(items.len(), 1);
        assert_eq!(report.count(crate::report::IssueKind::MalformedRecord), 1);
    }

    #[test]
    fn test_item_field_mapping() {
        let t = table(
            r#"{"custom": {"I00A": [
                {"id":"inam","value":"Iron Axe"},
                {"id":"igol","value":120},
                {"id":"iuse","value":3},
                {"id":"iabi","value":"AIa1, AIa2,AIa1"},
                {"id":"idrp","value":0},
                {"id":"iico","value":"ReplaceableTextures\\CommandButtons\\BTNAxe.blp"}
            ]}}"#,
        );
        let mut report = Report::new();
        let item = extract_items(&t, &mut report).remove(0);
        assert_eq!(item.name, "Iron Axe");
        assert_eq!(item.cost, 120);
        assert_eq!(item.uses, 3);
        assert_eq!(item.abilities, vec!["AIa1", "AIa2"]);
        assert!(!item.flags.droppable);
        assert!(item.flags.pawnable);
        assert_eq!(item.raw.len(), 6);
    }

    #[test]
    fn test_ability_level_table() {
        let t = table(
            r#"{"custom": {"A001": [
                {"id":"anam","value":"Fire Bolt"},
                {"id":"acdn","level":1,"value":10},
                {"id":"acdn","level":2,"value":8},
                {"id":"amc1","level":1,"value":25},
                {"id":"aub1","level":1,"value":"Hurls a bolt"},
                {"id":"atat","value":"origin"},
                {"id":"ata0","value":"hand,left"}
            ]}}"#,
        );
        let mut report = Report::new();
        let ability = extract_abilities(&t, &mut report).remove(0);
        assert_eq!(ability.levels.len(), 2);
        assert_eq!(ability.levels[&1].cooldown, Some(10.0));
        assert_eq!(ability.levels[&1].mana_cost, Some(25.0));
        assert_eq!(ability.levels[&2].mana_cost, None);
        assert_eq!(ability.tooltip, "Hurls a bolt");
        assert_eq!(ability.attachment_points, vec!["hand,left"]);
        assert_eq!(ability.attachment_target, "origin");

        let cd = headline_stat(&ability.levels, &ability.raw, |l| l.cooldown, COOLDOWN);
        assert_eq!(cd, Some(10.0));
    }

    #[test]
    fn test_level_zero_only_has_no_table() {
        let records = vec![OverrideRecord::new("acdn", 0, 5)];
        assert!(level_table(&records).is_empty());
        let levels = BTreeMap::new();
        assert_eq!(headline_stat(&levels, &records, |l| l.cooldown, COOLDOWN), Some(5.0));
    }

    #[test]
    fn test_fallback_ability_name() {
        let mut ability = RawAbility {
            id: "A00X".into(),
            raw: vec![OverrideRecord::new("atp1", 1, "Learn Fire Bolt")],
            ..Default::default()
        };
        assert_eq!(fallback_ability_name(&ability).as_deref(), Some("Learn Fire Bolt"));

        ability.raw.clear();
        ability.tooltip = "\n  Bolt of fire\nmore".into();
        assert_eq!(fallback_ability_name(&ability).as_deref(), Some("Bolt of fire"));

        ability.tooltip.clear();
        assert_eq!(fallback_ability_name(&ability).as_deref(), Some("A00X"));
    }

    #[test]
    fn test_unit_fields() {
        let t = table(
            r#"{"custom": {"h000": [
                {"id":"unam","value":"Hunter"},
                {"id":"ua1b","value":11},
                {"id":"ua1d","value":3},
                {"id":"uabi","value":"Aabc"},
                {"id":"uag1","value":"Adef"},
                {"id":"usid","value":1400.7}
            ]}}"#,
        );
        let mut report = Report::new();
        let unit = extract_units(&t, &mut report).remove(0);
        assert_eq!(unit.abilities, vec!["Aabc", "Adef"]);
        assert_eq!(unit.sight_range_day, Some(1400.0));
        assert!(unit.flags.can_attack);
        assert!(!unit.flags.is_building);
    }

    #[test]
    fn test_load_missing_and_corrupt_tables() {
        let dir = tempfile::tempdir().unwrap();
        let mut report = Report::new();
        assert!(load_object_table(&dir.path().join("items.json"), &mut report).is_none());

        let corrupt = dir.path().join("units.json");
        let mut f = std::fs::File::create(&corrupt).unwrap();
        f.write_all(b"{not json").unwrap();
        assert!(load_object_table(&corrupt, &mut report).is_none());

        assert_eq!(report.count(crate::report::IssueKind::MissingInput), 2);
    }
}
