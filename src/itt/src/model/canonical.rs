//! Normalized output records.
//!
//! One canonical record exists per logical game object. `slug` is unique
//! within each collection. Attributes are sparse: anything the sources did
//! not provide stays `None`/empty and is omitted from the JSON.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::category::{AbilityCategory, ClassKind, ItemCategory, SpellType, UnitType};
use super::raw::{ButtonPosition, ItemFlags, LevelStats, UnitFlags};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Item {
    pub slug: String,
    /// Object code from the archive
    pub id: String,
    pub name: String,
    pub category: ItemCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lumber_cost: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_maximum: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_replenish_interval: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uses: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hit_points: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_stack: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scaling_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hotkey: Option<String>,
    pub flags: ItemFlags,
    /// Ability slugs referenced by the item's ability list or text
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub abilities: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub stat_bonuses: BTreeMap<String, f64>,
    /// Ingredient slugs of the recipe producing this item
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recipe: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crafted_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mana_requirement: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VisualEffects {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachment_points: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment_target: Option<String>,
    /// Art assignments scraped from DSL source (missileArt, artEffect, …)
    #[serde(flatten)]
    pub art: BTreeMap<String, String>,
}

impl VisualEffects {
    pub fn is_empty(&self) -> bool {
        self.attachment_points.is_empty() && self.attachment_target.is_none() && self.art.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Ability {
    pub slug: String,
    pub id: String,
    pub name: String,
    pub category: AbilityCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_requirement: Option<AbilityCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mana_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooldown: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_of_effect: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_targets: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hotkey: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub targets_allowed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cast_time: Option<f64>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub levels: BTreeMap<u32, LevelStats>,
    #[serde(skip_serializing_if = "VisualEffects::is_empty")]
    pub visual_effects: VisualEffects,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button_position: Option<ButtonPosition>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub available_to_classes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spellbook: Option<SpellType>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DamageRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Unit {
    pub slug: String,
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub unit_type: Option<UnitType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub race: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strength: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agility: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intelligence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strength_per_level: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agility_per_level: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intelligence_per_level: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hp: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mana: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub armor: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage: Option<DamageRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attack_cooldown: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attack_range: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acquisition_range: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attack_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defense_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub move_speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turn_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collision_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sight_range_day: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sight_range_night: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gold_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lumber_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub food_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_time: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub abilities: Vec<String>,
    pub flags: UnitFlags,
    /// Base class slug for class units (trolls, forms)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_class: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub craftable_items: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Building {
    pub slug: String,
    /// Unit code of the building
    pub unit_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hp: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub armor: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gold_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lumber_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repair_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repair_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supply_provided: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supply_used: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub abilities: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub craftable_items: Vec<String>,
}

/// Resolved crafting recipe
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Recipe {
    /// Slug of the crafted item
    pub output: String,
    /// Slugs of the ingredients that resolved, in recipe order
    pub ingredients: Vec<String>,
    /// Building slug when resolved, otherwise a readable label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crafted_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mana_requirement: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quick_make_ability: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Growth {
    pub strength: f64,
    pub agility: f64,
    pub intelligence: f64,
}

impl Default for Growth {
    fn default() -> Self {
        Self {
            strength: 1.0,
            agility: 1.0,
            intelligence: 1.0,
        }
    }
}

/// Playable troll class with its default stat block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrollClass {
    pub slug: String,
    pub unit_id: String,
    pub name: String,
    pub kind: ClassKind,
    pub summary: String,
    /// Base class this class derives from; `None` for base classes and for
    /// derived classes that could not be placed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subclasses: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub superclasses: Vec<String>,
    pub growth: Growth,
    pub base_hp: f64,
    pub base_mana: f64,
    pub base_move_speed: f64,
    pub base_attack_speed: f64,
}

/// Base classes and their derived classes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClassHierarchy {
    pub base: Vec<TrollClass>,
    pub derived: Vec<TrollClass>,
    /// Derived class slugs with no base class parent
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unresolved: Vec<String>,
}
