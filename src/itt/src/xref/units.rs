//! Unit and building records
//!
//! Unit types come from name keywords, race and classification; the checks
//! run in a fixed order and the first that applies decides.

use std::collections::{BTreeMap, HashMap};

use crate::model::{Building, DamageRange, RawBuilding, RawUnit, Unit, UnitType};
use crate::report::Report;
use crate::text::{convert_icon_path, normalize_name, SlugAllocator};

// ============================================================================
// Unit typing
// ============================================================================

const BUILDING_KEYWORDS: &[&str] = &[
    "hut", "totem", "fire", "beacon", "tower", "house", "lodge", "workshop", "armory", "forge",
    "tannery", "pot", "ward", "kit", "hatchery",
];

const BUILDING_CLASSIFICATIONS: &[&str] = &["townhall", "structure", "mechanical", "sapper"];

const ANIMAL_KEYWORDS: &[&str] = &[
    "deer", "bear", "wolf", "panther", "tiger", "elk", "boar", "bird", "snake", "fish", "beast",
    "creature", "animal", "fawn", "dragon", "hatchling", "tamed",
];

/// Troll forms whose names would otherwise read as animals
const ANIMAL_EXCLUSIONS: &[&str] = &["form", "trap", "beastmaster", "dire wolf", "dire bear"];

const HAWK_ANIMALS: &[&str] = &["hawk hatchling", "tamed hawk", "alpha hawk"];

const BOSS_KEYWORDS: &[&str] = &["boss", "ancient", "lord", "tyrant", "hydra", "alligator"];

const NON_TROLL_KEYWORDS: &[&str] = &[
    "merchant", "ship", "transport", "afterimage", "random", "repick", "picker",
];

const TROLL_CLASS_KEYWORDS: &[&str] = &[
    "hunter",
    "mage",
    "priest",
    "thief",
    "scout",
    "gatherer",
    "beastmaster",
    "warrior",
    "champion",
    "gurubashi",
    "tracker",
    "trapper",
    "spy",
    "elementalist",
    "hypnotist",
    "dreamwalker",
    "dementia",
    "booster",
    "healer",
    "sage",
    "druid",
    "rogue",
    "escape artist",
    "contortionist",
    "assassin",
    "herb master",
    "alchemist",
    "form",
    "dire wolf",
    "dire bear",
    "hawk",
    "jungle tyrant",
];

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

/// Coarse unit type from name, race and classification
pub fn determine_unit_type(name: &str, race: &str, classification: &str) -> UnitType {
    let name = name.to_lowercase();
    let race = race.to_lowercase();
    let classification = classification.to_lowercase();

    if name.contains("unit_dummy_item_reward") || name.starts_with("unit dummy item reward") {
        return UnitType::UnitDummyItemReward;
    }
    if name.contains("dummy") {
        return UnitType::Dummy;
    }

    let has_building_keyword = contains_any(&name, BUILDING_KEYWORDS);
    if !name.contains("living clay")
        && (contains_any(&classification, BUILDING_CLASSIFICATIONS)
            || contains_any(&name, &["indicator", "holder", "altar"])
            || has_building_keyword)
    {
        return UnitType::Building;
    }

    let hawk_animal = contains_any(&name, HAWK_ANIMALS);
    if !contains_any(&name, ANIMAL_EXCLUSIONS)
        && (contains_any(&name, ANIMAL_KEYWORDS) || race == "creeps" || hawk_animal)
    {
        return UnitType::Animal;
    }

    if name == "the one" {
        return UnitType::Boss;
    }
    if !contains_any(&name, &["beastmaster", "jungle tyrant"])
        && (contains_any(&name, BOSS_KEYWORDS) || classification.contains("ancient"))
    {
        return UnitType::Boss;
    }

    let non_troll = contains_any(&name, NON_TROLL_KEYWORDS);
    if non_troll {
        return UnitType::Other;
    }
    let trap = name.contains("trap") && !name.contains("trapper");
    if trap {
        return UnitType::Other;
    }

    if name.contains("troll") && !contains_any(&name, &["hut", "totem", "fire", "merchant", "ship"]) {
        return UnitType::Troll;
    }

    if (contains_any(&name, TROLL_CLASS_KEYWORDS) || race == "orc")
        && !hawk_animal
        && !name.contains("dire bear bee")
        && !has_building_keyword
    {
        return UnitType::Troll;
    }

    UnitType::Other
}

/// Units that only exist to drive map mechanics
fn is_gameplay_unit(name: &str) -> bool {
    let lower = name.to_lowercase();
    !contains_any(&lower, &["indicator", "holder", "recipe"])
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn damage_range(base: Option<f64>, dice: Option<f64>) -> Option<DamageRange> {
    if base.is_none() && dice.is_none() {
        return None;
    }
    let min = base.unwrap_or(0.0);
    Some(DamageRange {
        min,
        max: min + dice.unwrap_or(0.0),
    })
}

pub fn unit_from_raw(raw: &RawUnit, slug: String, name: String, unit_type: UnitType) -> Unit {
    Unit {
        slug,
        id: raw.id.clone(),
        name,
        unit_type: Some(unit_type),
        tooltip: non_empty(&raw.tooltip),
        icon_path: convert_icon_path(&raw.icon),
        race: non_empty(&raw.race),
        classification: non_empty(&raw.classification),
        strength: raw.strength,
        agility: raw.agility,
        intelligence: raw.intelligence,
        strength_per_level: raw.strength_per_level,
        agility_per_level: raw.agility_per_level,
        intelligence_per_level: raw.intelligence_per_level,
        hp: raw.hp,
        mana: raw.mana,
        armor: raw.armor,
        damage: damage_range(raw.damage_base, raw.damage_dice),
        attack_cooldown: raw.attack_cooldown,
        attack_range: raw.attack_range,
        acquisition_range: raw.acquisition_range,
        attack_type: non_empty(&raw.attack_type),
        defense_type: non_empty(&raw.defense_type),
        move_speed: raw.move_speed,
        turn_rate: raw.turn_rate,
        collision_size: raw.collision_size,
        sight_range_day: raw.sight_range_day,
        sight_range_night: raw.sight_range_night,
        gold_cost: raw.gold_cost,
        lumber_cost: raw.lumber_cost,
        food_cost: raw.food_cost,
        build_time: raw.build_time,
        abilities: Vec::new(),
        flags: raw.flags,
        base_class: None,
        craftable_items: Vec::new(),
    }
}

/// Building records keyed every way a unit may refer to one
fn buildings_by_key(buildings: &[Building]) -> HashMap<String, &Building> {
    let mut map = HashMap::new();
    for building in buildings {
        let keys = [
            building.unit_id.to_lowercase(),
            building.name.to_lowercase(),
            normalize_name(&building.name),
        ];
        for key in keys.into_iter().filter(|k| !k.is_empty()) {
            map.entry(key).or_insert(building);
        }
    }
    map
}

/// Build unit records in archive order.
///
/// Mechanic-only units (indicators, holders, recipe dummies) are left out.
/// Item reward dummies are renamed `UDIR_<n>`, numbered per distinct id in
/// encounter order. Building units pick up the craftable items of the
/// matching building record; class units pick up their base class from the
/// class table.
pub fn link_units(
    raw: &[RawUnit],
    buildings: &[Building],
    base_classes: &BTreeMap<String, String>,
    abilities_by_code: &BTreeMap<String, String>,
    report: &mut Report,
) -> Vec<Unit> {
    let building_keys = buildings_by_key(buildings);
    let mut slugs = SlugAllocator::new();
    let mut udir: HashMap<String, usize> = HashMap::new();
    let mut units = Vec::with_capacity(raw.len());

    for source in raw {
        let name = source.name.trim();
        if name.is_empty() {
            report.malformed(format!("units:{}", source.id), "unit without name");
            continue;
        }
        if !is_gameplay_unit(name) {
            continue;
        }

        let unit_type = determine_unit_type(name, &source.race, &source.classification);
        let name = if unit_type == UnitType::UnitDummyItemReward {
            let next = udir.len() + 1;
            let n = *udir.entry(source.id.clone()).or_insert(next);
            format!("UDIR_{}", n)
        } else {
            name.to_string()
        };

        let slug = slugs.allocate(&name);
        let mut unit = unit_from_raw(source, slug, name, unit_type);

        for code in &source.abilities {
            let code = crate::extract::script::raw_ability_id(code);
            if let Some(ability) = abilities_by_code.get(code) {
                if !unit.abilities.contains(ability) {
                    unit.abilities.push(ability.clone());
                }
            }
        }

        if unit_type == UnitType::Building {
            let matched = building_keys
                .get(&unit.id.to_lowercase())
                .or_else(|| building_keys.get(&normalize_name(&unit.name)));
            if let Some(building) = matched {
                unit.craftable_items = building.craftable_items.clone();
            }
        }

        unit.base_class = base_classes
            .get(&unit.name)
            .or_else(|| base_classes.get(&unit.name.to_lowercase()))
            .cloned();

        units.push(unit);
    }

    tracing::info!(count = units.len(), "linked units");
    units
}

// ============================================================================
// Buildings
// ============================================================================

pub fn building_from_raw(raw: &RawBuilding, slug: String) -> Building {
    Building {
        slug,
        unit_id: raw.id.clone(),
        name: raw.name.trim().to_string(),
        description: non_empty(&raw.description),
        tooltip: non_empty(&raw.tooltip),
        icon_path: convert_icon_path(&raw.icon),
        hp: raw.hp,
        armor: raw.armor,
        build_time: raw.build_time,
        gold_cost: raw.gold_cost,
        lumber_cost: raw.lumber_cost,
        repair_cost: raw.repair_cost,
        repair_time: raw.repair_time,
        supply_provided: raw.supply_provided,
        supply_used: raw.supply_used,
        abilities: Vec::new(),
        craftable_items: Vec::new(),
    }
}

pub fn link_buildings(
    raw: &[RawBuilding],
    abilities_by_code: &BTreeMap<String, String>,
    report: &mut Report,
) -> Vec<Building> {
    let mut slugs = SlugAllocator::new();
    let mut buildings = Vec::with_capacity(raw.len());
    for source in raw {
        if source.name.trim().is_empty() {
            report.malformed(format!("buildings:{}", source.id), "building without name");
            continue;
        }
        let slug = slugs.allocate(&source.name);
        let mut building = building_from_raw(source, slug);
        for code in &source.abilities {
            let code = crate::extract::script::raw_ability_id(code);
            if let Some(ability) = abilities_by_code.get(code) {
                if !building.abilities.contains(ability) {
                    building.abilities.push(ability.clone());
                }
            }
        }
        buildings.push(building);
    }
    tracing::info!(count = buildings.len(), "linked buildings");
    buildings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_types() {
        let cases = [
            ("Unit Dummy Item Reward", "", "", UnitType::UnitDummyItemReward),
            ("Dummy Caster", "", "", UnitType::Dummy),
            ("Mud Hut", "", "", UnitType::Building),
            ("Living Clay", "", "", UnitType::Other),
            ("Stone Block", "", "structure", UnitType::Building),
            ("Elk", "", "", UnitType::Animal),
            ("Hawk Hatchling", "", "", UnitType::Animal),
            ("Wild Thing", "creeps", "", UnitType::Animal),
            ("Dire Wolf", "", "", UnitType::Troll),
            ("The One", "", "", UnitType::Boss),
            ("Hydra", "", "", UnitType::Boss),
            ("Jungle Tyrant", "", "", UnitType::Troll),
            ("Trade Ship Captain", "", "", UnitType::Other),
            ("Bear Trap", "", "", UnitType::Other),
            ("Trapper", "", "", UnitType::Troll),
            ("Troll", "", "", UnitType::Troll),
            ("Somebody", "orc", "", UnitType::Troll),
            ("Somebody", "human", "", UnitType::Other),
        ];
        for (name, race, classification, expected) in cases {
            assert_eq!(
                determine_unit_type(name, race, classification),
                expected,
                "{}",
                name
            );
        }
    }

    fn raw_unit(id: &str, name: &str) -> RawUnit {
        RawUnit {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_udir_and_filters() {
        let raw = vec![
            raw_unit("u000", "Unit Dummy Item Reward"),
            raw_unit("u001", "unit_dummy_item_reward_2"),
            raw_unit("u000", "Unit Dummy Item Reward"),
            raw_unit("u002", "Fire Indicator"),
            raw_unit("u003", ""),
        ];
        let mut report = Report::new();
        let units = link_units(&raw, &[], &BTreeMap::new(), &BTreeMap::new(), &mut report);
        let names: Vec<_> = units.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["UDIR_1", "UDIR_2", "UDIR_1"]);
        let slugs: Vec<_> = units.iter().map(|u| u.slug.as_str()).collect();
        assert_eq!(slugs, vec!["udir-1", "udir-2", "udir-1-2"]);
        assert_eq!(report.count(crate::report::IssueKind::MalformedRecord), 1);
    }

    #[test]
    fn test_damage_craftables_base_class() {
        let mut hut = raw_unit("h001", "Workshop");
        hut.damage_base = Some(4.0);
        hut.damage_dice = Some(3.0);
        let hunter = raw_unit("H000", "Tracker");

        let buildings = vec![Building {
            slug: "workshop".into(),
            unit_id: "h001".into(),
            name: "Workshop".into(),
            craftable_items: vec!["iron-axe".into()],
            ..Default::default()
        }];
        let base_classes: BTreeMap<String, String> =
            [("Tracker".to_string(), "hunter".to_string())].into_iter().collect();

        let mut report = Report::new();
        let units = link_units(
            &[hut, hunter],
            &buildings,
            &base_classes,
            &BTreeMap::new(),
            &mut report,
        );

        assert_eq!(units[0].unit_type, Some(UnitType::Building));
        assert_eq!(units[0].damage, Some(DamageRange { min: 4.0, max: 7.0 }));
        assert_eq!(units[0].craftable_items, vec!["iron-axe"]);
        assert_eq!(units[1].damage, None);
        assert_eq!(units[1].base_class.as_deref(), Some("hunter"));
    }
}
