//! Cross-reference resolution
//!
//! Turns raw extractor output into canonical records and links them:
//! recipes to items and buildings, abilities to classes and spellbooks,
//! buildings and building units to craftable items, and class units into a
//! base/subclass/superclass hierarchy. Category assignment and duplicate
//! handling happen in later stages.

pub mod abilities;
pub mod classes;
pub mod items;
pub mod recipes;
pub mod units;

use std::collections::BTreeMap;

use crate::extract::Extraction;
use crate::model::{Building, ClassHierarchy, Recipe, Unit};
use crate::report::Report;

pub use abilities::{ability_slug_by_code, link_abilities, AbilityRecord};
pub use classes::{build_class_hierarchy, class_kind, derived_parent, CLASS_RELATIONSHIPS};
pub use items::{link_items, ItemRecord};
pub use recipes::{attach_craftables, link_recipes, SlugIndex};
pub use units::{determine_unit_type, link_buildings, link_units};

/// Canonical records with every reference resolved
#[derive(Debug, Clone, Default)]
pub struct Linked {
    pub items: Vec<ItemRecord>,
    pub abilities: Vec<AbilityRecord>,
    pub units: Vec<Unit>,
    pub buildings: Vec<Building>,
    pub recipes: Vec<Recipe>,
    pub classes: ClassHierarchy,
    /// Raw ability code -> ability slug
    pub abilities_by_code: BTreeMap<String, String>,
}

pub fn cross_reference(extraction: &Extraction, report: &mut Report) -> Linked {
    let abilities = link_abilities(
        &extraction.abilities,
        &extraction.ability_details,
        &extraction.spell_lists,
        report,
    );
    let abilities_by_code = ability_slug_by_code(&abilities);

    let mut items = link_items(
        &extraction.items,
        &extraction.item_details,
        &abilities_by_code,
        report,
    );
    let mut buildings = link_buildings(&extraction.buildings, &abilities_by_code, report);
    let recipes = link_recipes(
        &extraction.recipes,
        &mut items,
        &buildings,
        &extraction.ability_ids,
        report,
    );
    attach_craftables(&mut buildings, &recipes);

    let units = link_units(
        &extraction.units,
        &buildings,
        &extraction.base_classes,
        &abilities_by_code,
        report,
    );
    let classes = build_class_hierarchy(
        &extraction.units,
        &extraction.class_descriptions,
        &extraction.base_classes,
        report,
    );

    Linked {
        items,
        abilities,
        units,
        buildings,
        recipes,
        classes,
        abilities_by_code,
    }
}
