//! Merge and deduplication
//!
//! Merging folds a second record of the same logical entity into the first:
//! empty attributes are filled, lists are unioned and level tables are merged
//! key by key. Deduplication keeps the first record per composite key and
//! reports the rest.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use crate::model::{Ability, Building, Item, LevelStats, Unit, VisualEffects};
use crate::report::Report;

/// Fold another record of the same entity into `self`.
///
/// Values already present on `self` are never replaced.
pub trait Merge {
    fn merge_from(&mut self, other: Self);
}

fn fill<T>(target: &mut Option<T>, incoming: Option<T>) {
    if target.is_none() {
        *target = incoming;
    }
}

fn fill_text(target: &mut Option<String>, incoming: Option<String>) {
    let empty = target.as_deref().map(|s| s.trim().is_empty()).unwrap_or(true);
    if empty {
        if let Some(value) = incoming.filter(|s| !s.trim().is_empty()) {
            *target = Some(value);
        }
    }
}

fn fill_string(target: &mut String, incoming: String) {
    if target.trim().is_empty() && !incoming.trim().is_empty() {
        *target = incoming;
    }
}

/// Append values not yet present, keeping first-seen order
fn union<T: PartialEq>(target: &mut Vec<T>, incoming: Vec<T>) {
    for value in incoming {
        if !target.contains(&value) {
            target.push(value);
        }
    }
}

/// Add keys missing from `target`; existing keys are kept
fn merge_keys<K: Ord, V>(target: &mut BTreeMap<K, V>, incoming: BTreeMap<K, V>) {
    for (key, value) in incoming {
        target.entry(key).or_insert(value);
    }
}

impl Merge for LevelStats {
    fn merge_from(&mut self, other: Self) {
        fill(&mut self.mana_cost, other.mana_cost);
        fill(&mut self.cooldown, other.cooldown);
        fill(&mut self.duration, other.duration);
        fill(&mut self.range, other.range);
        fill(&mut self.area_of_effect, other.area_of_effect);
        fill(&mut self.damage, other.damage);
    }
}

impl Merge for VisualEffects {
    fn merge_from(&mut self, other: Self) {
        union(&mut self.attachment_points, other.attachment_points);
        fill_text(&mut self.attachment_target, other.attachment_target);
        merge_keys(&mut self.art, other.art);
    }
}

impl Merge for Ability {
    fn merge_from(&mut self, other: Self) {
        fill_string(&mut self.id, other.id);
        fill_string(&mut self.name, other.name);
        if self.category == Default::default() {
            self.category = other.category;
        }
        fill(&mut self.class_requirement, other.class_requirement);
        fill_text(&mut self.description, other.description);
        fill_text(&mut self.tooltip, other.tooltip);
        fill_text(&mut self.icon_path, other.icon_path);
        fill(&mut self.mana_cost, other.mana_cost);
        fill(&mut self.cooldown, other.cooldown);
        fill(&mut self.range, other.range);
        fill(&mut self.duration, other.duration);
        fill(&mut self.damage, other.damage);
        fill(&mut self.area_of_effect, other.area_of_effect);
        fill(&mut self.max_targets, other.max_targets);
        fill_text(&mut self.hotkey, other.hotkey);
        fill_text(&mut self.targets_allowed, other.targets_allowed);
        fill(&mut self.cast_time, other.cast_time);
        // shallow: a level already present keeps its whole stat block
        merge_keys(&mut self.levels, other.levels);
        self.visual_effects.merge_from(other.visual_effects);
        fill(&mut self.button_position, other.button_position);
        union(&mut self.available_to_classes, other.available_to_classes);
        fill(&mut self.spellbook, other.spellbook);
    }
}

impl Merge for Item {
    fn merge_from(&mut self, other: Self) {
        fill_string(&mut self.id, other.id);
        fill_string(&mut self.name, other.name);
        if self.category == Default::default() {
            self.category = other.category;
        }
        fill_text(&mut self.description, other.description);
        fill_text(&mut self.tooltip, other.tooltip);
        fill_text(&mut self.icon_path, other.icon_path);
        fill(&mut self.cost, other.cost);
        fill(&mut self.lumber_cost, other.lumber_cost);
        fill(&mut self.stock_maximum, other.stock_maximum);
        fill(&mut self.stock_replenish_interval, other.stock_replenish_interval);
        fill(&mut self.level, other.level);
        fill(&mut self.uses, other.uses);
        fill(&mut self.hit_points, other.hit_points);
        fill(&mut self.max_stack, other.max_stack);
        fill(&mut self.scaling_value, other.scaling_value);
        fill_text(&mut self.model_path, other.model_path);
        fill_text(&mut self.hotkey, other.hotkey);
        union(&mut self.abilities, other.abilities);
        merge_keys(&mut self.stat_bonuses, other.stat_bonuses);
        union(&mut self.recipe, other.recipe);
        fill_text(&mut self.crafted_at, other.crafted_at);
        fill(&mut self.mana_requirement, other.mana_requirement);
    }
}

impl Merge for Unit {
    fn merge_from(&mut self, other: Self) {
        fill_string(&mut self.id, other.id);
        fill_string(&mut self.name, other.name);
        fill(&mut self.unit_type, other.unit_type);
        fill_text(&mut self.tooltip, other.tooltip);
        fill_text(&mut self.icon_path, other.icon_path);
        fill_text(&mut self.race, other.race);
        fill_text(&mut self.classification, other.classification);
        fill(&mut self.strength, other.strength);
        fill(&mut self.agility, other.agility);
        fill(&mut self.intelligence, other.intelligence);
        fill(&mut self.strength_per_level, other.strength_per_level);
        fill(&mut self.agility_per_level, other.agility_per_level);
        fill(&mut self.intelligence_per_level, other.intelligence_per_level);
        fill(&mut self.hp, other.hp);
        fill(&mut self.mana, other.mana);
        fill(&mut self.armor, other.armor);
        fill(&mut self.damage, other.damage);
        fill(&mut self.attack_cooldown, other.attack_cooldown);
        fill(&mut self.attack_range, other.attack_range);
        fill(&mut self.acquisition_range, other.acquisition_range);
        fill_text(&mut self.attack_type, other.attack_type);
        fill_text(&mut self.defense_type, other.defense_type);
        fill(&mut self.move_speed, other.move_speed);
        fill(&mut self.turn_rate, other.turn_rate);
        fill(&mut self.collision_size, other.collision_size);
        fill(&mut self.sight_range_day, other.sight_range_day);
        fill(&mut self.sight_range_night, other.sight_range_night);
        fill(&mut self.gold_cost, other.gold_cost);
        fill(&mut self.lumber_cost, other.lumber_cost);
        fill(&mut self.food_cost, other.food_cost);
        fill(&mut self.build_time, other.build_time);
        union(&mut self.abilities, other.abilities);
        fill_text(&mut self.base_class, other.base_class);
        union(&mut self.craftable_items, other.craftable_items);
    }
}

impl Merge for Building {
    fn merge_from(&mut self, other: Self) {
        fill_string(&mut self.unit_id, other.unit_id);
        fill_string(&mut self.name, other.name);
        fill_text(&mut self.description, other.description);
        fill_text(&mut self.tooltip, other.tooltip);
        fill_text(&mut self.icon_path, other.icon_path);
        fill(&mut self.hp, other.hp);
        fill(&mut self.armor, other.armor);
        fill(&mut self.build_time, other.build_time);
        fill(&mut self.gold_cost, other.gold_cost);
        fill(&mut self.lumber_cost, other.lumber_cost);
        fill(&mut self.repair_cost, other.repair_cost);
        fill(&mut self.repair_time, other.repair_time);
        fill(&mut self.supply_provided, other.supply_provided);
        fill(&mut self.supply_used, other.supply_used);
        union(&mut self.abilities, other.abilities);
        union(&mut self.craftable_items, other.craftable_items);
    }
}

// ============================================================================
// Deduplication
// ============================================================================

/// Keep the first entity per key, in input order. Later ones are reported
/// as dropped duplicates under `collection`.
pub fn dedup_first_wins<T, K>(
    entities: Vec<T>,
    collection: &str,
    key: impl Fn(&T) -> K,
    describe: impl Fn(&T) -> String,
    report: &mut Report,
) -> Vec<T>
where
    K: Eq + Hash + std::fmt::Debug,
{
    let mut seen: HashMap<K, usize> = HashMap::new();
    let mut kept = Vec::with_capacity(entities.len());
    for entity in entities {
        let k = key(&entity);
        if seen.contains_key(&k) {
            report.duplicate_dropped(
                format!("{}:{}", collection, describe(&entity)),
                format!("same key {:?} as an earlier entry", k),
            );
            continue;
        }
        seen.insert(k, kept.len());
        kept.push(entity);
    }
    kept
}

/// Fold entities sharing a key into the first one, in input order.
pub fn merge_by_key<T, K>(entities: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T>
where
    T: Merge,
    K: Eq + Hash,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut merged: Vec<T> = Vec::with_capacity(entities.len());
    for entity in entities {
        let k = key(&entity);
        match index.get(&k) {
            Some(&i) => merged[i].merge_from(entity),
            None => {
                index.insert(k, merged.len());
                merged.push(entity);
            }
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AbilityCategory, UnitType};

    #[test]
    fn test_merge_fills_gaps_only() {
        let mut first = Ability {
            slug: "fire-bolt".into(),
            name: "Fire Bolt".into(),
            category: AbilityCategory::Mage,
            cooldown: Some(8.0),
            available_to_classes: vec!["mage".into()],
            ..Default::default()
        };
        first.levels.insert(
            1,
            LevelStats {
                cooldown: Some(8.0),
                ..Default::default()
            },
        );

        let mut second = Ability {
            slug: "fire-bolt".into(),
            name: "Firebolt".into(),
            category: AbilityCategory::Item,
            cooldown: Some(5.0),
            mana_cost: Some(20.0),
            hotkey: Some("F".into()),
            available_to_classes: vec!["elementalist".into(), "mage".into()],
            ..Default::default()
        };
        second.levels.insert(
            1,
            LevelStats {
                damage: Some(90.0),
                ..Default::default()
            },
        );
        second.levels.insert(2, LevelStats::default());

        first.merge_from(second);
        assert_eq!(first.name, "Fire Bolt");
        assert_eq!(first.category, AbilityCategory::Mage);
        assert_eq!(first.cooldown, Some(8.0));
        assert_eq!(first.mana_cost, Some(20.0));
        assert_eq!(first.hotkey.as_deref(), Some("F"));
        assert_eq!(first.available_to_classes, vec!["mage", "elementalist"]);
        assert_eq!(first.levels.len(), 2);
        assert_eq!(first.levels[&1].damage, None);
    }

    #[test]
    fn test_blank_text_is_filled() {
        let mut item = Item {
            description: Some("  ".into()),
            ..Default::default()
        };
        item.merge_from(Item {
            description: Some("Sharp.".into()),
            ..Default::default()
        });
        assert_eq!(item.description.as_deref(), Some("Sharp."));
    }

    #[test]
    fn test_dedup_first_wins() {
        let units = vec![
            Unit {
                slug: "wolf".into(),
                name: "Wolf".into(),
                unit_type: Some(UnitType::Animal),
                hp: Some(100.0),
                ..Default::default()
            },
            Unit {
                slug: "wolf-2".into(),
                name: "Wolf".into(),
                unit_type: Some(UnitType::Animal),
                hp: Some(250.0),
                ..Default::default()
            },
            Unit {
                slug: "wolf-3".into(),
                name: "Wolf".into(),
                unit_type: Some(UnitType::Troll),
                ..Default::default()
            },
        ];

        let mut report = Report::new();
        let kept = dedup_first_wins(
            units,
            "units",
            |u| (u.name.clone(), u.unit_type),
            |u| u.slug.clone(),
            &mut report,
        );
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].hp, Some(100.0));
        assert_eq!(kept[1].slug, "wolf-3");
        assert_eq!(report.count(crate::report::IssueKind::DuplicateDropped), 1);
    }

    #[test]
    fn test_merge_by_key_folds_into_first() {
        let abilities = vec![
            Ability {
                slug: "heal".into(),
                id: "A000".into(),
                ..Default::default()
            },
            Ability {
                slug: "bolt".into(),
                id: "A001".into(),
                ..Default::default()
            },
            Ability {
                slug: "heal".into(),
                id: "A002".into(),
                cooldown: Some(3.0),
                ..Default::default()
            },
        ];
        let merged = merge_by_key(abilities, |a| a.slug.clone());
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].id, "A000");
        assert_eq!(merged[0].cooldown, Some(3.0));
        assert_eq!(merged[1].slug, "bolt");
    }
}
