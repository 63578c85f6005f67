//! Recipe resolution
//!
//! Script recipes name items and buildings by constant. Each reference is
//! resolved by object code first and by normalized name second.

use std::collections::BTreeMap;

use crate::codec::normalize_object_id;
use crate::model::{Building, RawRecipe, Recipe, RecipeRef};
use crate::report::Report;
use crate::text::{constant_to_slug, format_const_name, normalize_name};

use super::items::ItemRecord;

const ABILITY_CONST_PREFIX: &str = "LocalObjectIDs_ABILITY_";

/// Slug lookup by object code and by normalized name, first entry wins
#[derive(Debug, Default)]
pub struct SlugIndex {
    by_code: BTreeMap<String, String>,
    by_name: BTreeMap<String, String>,
}

impl SlugIndex {
    pub fn insert(&mut self, code: &str, name: &str, slug: &str) {
        if let Some(code) = normalize_object_id(code) {
            self.by_code.entry(code).or_insert_with(|| slug.to_string());
        }
        let name = normalize_name(name);
        if !name.is_empty() {
            self.by_name.entry(name).or_insert_with(|| slug.to_string());
        }
    }

    pub fn by_code(&self, code: &str) -> Option<&str> {
        normalize_object_id(code)
            .and_then(|c| self.by_code.get(&c))
            .map(String::as_str)
    }

    pub fn by_name(&self, name: &str) -> Option<&str> {
        self.by_name.get(&normalize_name(name)).map(String::as_str)
    }

    /// Resolve a script reference: object code, then registered name,
    /// then the name spelled by its constant
    pub fn resolve(&self, reference: &RecipeRef) -> Option<&str> {
        reference
            .object_id
            .as_deref()
            .and_then(|code| self.by_code(code))
            .or_else(|| reference.name.as_deref().and_then(|n| self.by_name(n)))
            .or_else(|| self.by_name(&format_const_name(&reference.constant)))
    }
}

pub fn item_index(items: &[ItemRecord]) -> SlugIndex {
    let mut index = SlugIndex::default();
    for record in items {
        index.insert(&record.item.id, &record.item.name, &record.item.slug);
    }
    index
}

pub fn building_index(buildings: &[Building]) -> SlugIndex {
    let mut index = SlugIndex::default();
    for building in buildings {
        index.insert(&building.unit_id, &building.name, &building.slug);
    }
    index
}

fn quick_make_slug(constant: &str, ability_ids: &BTreeMap<String, String>) -> String {
    let body = constant.strip_prefix(ABILITY_CONST_PREFIX).unwrap_or(constant);
    ability_ids
        .get(body)
        .cloned()
        .unwrap_or_else(|| constant_to_slug(body, ""))
}

fn resolve_recipe(
    raw: &RawRecipe,
    items: &SlugIndex,
    buildings: &SlugIndex,
    ability_ids: &BTreeMap<String, String>,
    report: &mut Report,
) -> Option<Recipe> {
    let output = RecipeRef {
        constant: raw.item_const.clone(),
        name: raw.item_name.clone(),
        object_id: raw.item_object_id.clone(),
    };
    let Some(output) = items.resolve(&output).map(str::to_string) else {
        report.unresolved(
            format!("recipes:{}", raw.item_const),
            "crafted item not among extracted items; recipe dropped",
        );
        return None;
    };

    let mut ingredients = Vec::with_capacity(raw.ingredients.len());
    for ingredient in &raw.ingredients {
        match items.resolve(ingredient) {
            Some(slug) => ingredients.push(slug.to_string()),
            None => report.unresolved(
                format!("recipes:{}", output),
                format!("ingredient {} not among extracted items", ingredient.constant),
            ),
        }
    }
    if ingredients.is_empty() {
        report.unresolved(
            format!("recipes:{}", output),
            "no ingredient resolved; recipe dropped",
        );
        return None;
    }

    let crafted_at = raw.crafted_at.as_ref().map(|at| match buildings.resolve(at) {
        Some(slug) => slug.to_string(),
        None => {
            let label = at
                .name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| format_const_name(&at.constant));
            report.unresolved(
                format!("recipes:{}", output),
                format!("crafting building {} kept as label {:?}", at.constant, label),
            );
            label
        }
    });

    Some(Recipe {
        output,
        ingredients,
        crafted_at,
        mana_requirement: raw.mana_requirement,
        quick_make_ability: raw
            .quick_make_ability
            .as_deref()
            .map(|c| quick_make_slug(c, ability_ids)),
    })
}

/// Resolve script recipes against the item and building records and attach
/// each recipe to the item it produces. The first recipe per item is the one
/// attached.
pub fn link_recipes(
    raw: &[RawRecipe],
    items: &mut [ItemRecord],
    buildings: &[Building],
    ability_ids: &BTreeMap<String, String>,
    report: &mut Report,
) -> Vec<Recipe> {
    let item_slugs = item_index(items);
    let building_slugs = building_index(buildings);

    let recipes: Vec<Recipe> = raw
        .iter()
        .filter_map(|r| resolve_recipe(r, &item_slugs, &building_slugs, ability_ids, report))
        .collect();

    for recipe in &recipes {
        let Some(record) = items.iter_mut().find(|r| r.item.slug == recipe.output) else {
            continue;
        };
        let item = &mut record.item;
        if !item.recipe.is_empty() {
            continue;
        }
        item.recipe = recipe.ingredients.clone();
        item.crafted_at = recipe.crafted_at.clone();
        item.mana_requirement = recipe.mana_requirement;
    }

    tracing::info!(count = recipes.len(), "linked recipes");
    recipes
}

/// Set each building's craftable items from the recipes crafted there
pub fn attach_craftables(buildings: &mut [Building], recipes: &[Recipe]) {
    for building in buildings.iter_mut() {
        for recipe in recipes {
            if recipe.crafted_at.as_deref() == Some(building.slug.as_str())
                && !building.craftable_items.contains(&recipe.output)
            {
                building.craftable_items.push(recipe.output.clone());
            }
        }
    }
}
