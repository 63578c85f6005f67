//! Intermediate records produced by the extractors.
//!
//! Raw entities are built once per extraction pass and never mutated
//! afterwards. Each keeps its full override list so later stages can
//! re-derive values (level tables in particular).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::fields::OverrideRecord;

/// Per-level numeric stats of an ability
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelStats {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mana_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooldown: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_of_effect: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage: Option<f64>,
}

impl LevelStats {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemFlags {
    pub droppable: bool,
    pub pawnable: bool,
    pub perishable: bool,
    pub actively_used: bool,
    pub ignore_cooldown: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub tooltip: String,
    pub icon: String,
    /// Explicit category tag. The archive carries none, so only callers that
    /// build raw records directly set it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub cost: i64,
    pub lumber_cost: i64,
    pub stock_maximum: i64,
    pub stock_replenish_interval: i64,
    pub class: String,
    pub level: i64,
    pub uses: i64,
    pub hit_points: i64,
    pub max_stack: i64,
    pub scaling_value: f64,
    pub model_path: String,
    pub hotkey: String,
    pub abilities: Vec<String>,
    pub flags: ItemFlags,
    #[serde(default)]
    pub raw: Vec<OverrideRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAbility {
    pub id: String,
    pub name: String,
    pub description: String,
    pub tooltip: String,
    pub icon: String,
    /// Explicit category tag; never set by the archive extractor, whose only
    /// tag source is the `item` flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub hero: bool,
    /// Ability belongs to an item rather than a unit
    pub item: bool,
    pub race: String,
    pub area_of_effect: Option<f64>,
    pub max_targets: Option<i64>,
    pub hotkey: String,
    pub targets_allowed: String,
    pub cast_time: Option<f64>,
    pub attachment_points: Vec<String>,
    pub attachment_target: String,
    /// Level table, empty when the ability only populates level 0
    pub levels: BTreeMap<u32, LevelStats>,
    #[serde(default)]
    pub raw: Vec<OverrideRecord>,
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitFlags {
    pub is_building: bool,
    pub is_flyer: bool,
    pub is_worker: bool,
    pub can_attack: bool,
    pub can_harvest: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUnit {
    pub id: String,
    pub name: String,
    pub tooltip: String,
    pub icon: String,
    pub race: String,
    pub classification: String,
    pub strength: Option<f64>,
    pub agility: Option<f64>,
    pub intelligence: Option<f64>,
    pub strength_per_level: Option<f64>,
    pub agility_per_level: Option<f64>,
    pub intelligence_per_level: Option<f64>,
    pub hp: Option<f64>,
    pub mana: Option<f64>,
    pub armor: Option<f64>,
    pub damage_base: Option<f64>,
    pub damage_dice: Option<f64>,
    pub attack_cooldown: Option<f64>,
    pub attack_range: Option<f64>,
    pub acquisition_range: Option<f64>,
    pub attack_type: String,
    pub defense_type: String,
    pub move_speed: Option<f64>,
    pub turn_rate: Option<f64>,
    pub collision_size: Option<f64>,
    pub sight_range_day: Option<f64>,
    pub sight_range_night: Option<f64>,
    pub gold_cost: Option<f64>,
    pub lumber_cost: Option<f64>,
    pub food_cost: Option<f64>,
    pub build_time: Option<f64>,
    pub abilities: Vec<String>,
    pub flags: UnitFlags,
    #[serde(default)]
    pub raw: Vec<OverrideRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBuilding {
    pub id: String,
    pub name: String,
    pub description: String,
    pub tooltip: String,
    pub icon: String,
    pub hp: Option<f64>,
    pub armor: Option<f64>,
    pub build_time: Option<f64>,
    pub gold_cost: Option<f64>,
    pub lumber_cost: Option<f64>,
    pub repair_cost: Option<f64>,
    pub repair_time: Option<f64>,
    pub supply_provided: Option<f64>,
    pub supply_used: Option<f64>,
    pub abilities: Vec<String>,
    #[serde(default)]
    pub raw: Vec<OverrideRecord>,
}

/// Recipe as scraped from generated script, before references are resolved
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecipe {
    /// `LocalObjectIDs_ITEM_*` constant of the crafted item
    pub item_const: String,
    pub item_object_id: Option<String>,
    pub item_name: Option<String>,
    /// Ingredient constants as they appeared, aliases resolved
    pub ingredients: Vec<RecipeRef>,
    pub crafted_at: Option<RecipeRef>,
    pub quick_make_ability: Option<String>,
    pub mana_requirement: Option<f64>,
}

/// Constant reference inside a recipe with whatever the object table knew about it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeRef {
    pub constant: String,
    pub name: Option<String>,
    pub object_id: Option<String>,
}

/// Ability detail block scraped from DSL source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbilityDetails {
    pub ability_id: String,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mana_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooldown: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_of_effect: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_targets: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cast_range: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hotkey: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_types: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub targets_allowed: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub visual_effects: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button_position: Option<ButtonPosition>,
}

impl AbilityDetails {
    /// Number of populated fields, the identifier included
    pub fn populated_fields(&self) -> usize {
        let optional = [
            self.damage.is_some(),
            self.mana_cost.is_some(),
            self.cooldown.is_some(),
            self.area_of_effect.is_some(),
            self.max_targets.is_some(),
            self.cast_range.is_some(),
            self.duration.is_some(),
            self.hotkey.is_some(),
            self.target_types.is_some(),
            self.targets_allowed.is_some(),
            !self.visual_effects.is_empty(),
            self.button_position.is_some(),
        ];
        let id = usize::from(!self.ability_id.is_empty());
        id + optional.iter().filter(|set| **set).count()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ButtonPosition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<i64>,
}

/// Item detail block scraped from DSL source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDetails {
    pub constant: String,
    pub raw_code: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub bonuses: BTreeMap<String, f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lumber_cost: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_maximum: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_replenish_interval: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scaling_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_path: Option<String>,
}

impl ItemDetails {
    pub fn has_details(&self) -> bool {
        !self.bonuses.is_empty()
            || self.lumber_cost.is_some()
            || self.stock_maximum.is_some()
            || self.stock_replenish_interval.is_some()
            || self.scaling_value.is_some()
            || self.model_path.is_some()
    }
}
