//! Merge stage: duplicate handling and dataset assembly
//!
//! Abilities sharing a slug are folded into one record. Items and buildings
//! sharing a normalized name, and units sharing a normalized name and type,
//! keep the first record; references to a dropped item or building are rewritten to
//! the record that was kept.

use std::collections::{BTreeMap, HashMap};

use crate::extract::Extraction;
use crate::merge::{dedup_first_wins, merge_by_key};
use crate::model::{Ability, Building, ClassHierarchy, Item, Recipe, Unit, UnitType};
use crate::report::Report;
use crate::text::normalize_name;
use crate::xref::Linked;

use super::dataset::{Dataset, MetadataBundle};

/// Dropped slug -> kept slug for records that share a key
fn duplicate_remap<T, K>(
    entities: &[T],
    key: impl Fn(&T) -> K,
    slug: impl Fn(&T) -> &str,
) -> HashMap<String, String>
where
    K: Eq + std::hash::Hash,
{
    let mut first: HashMap<K, &str> = HashMap::new();
    let mut remap = HashMap::new();
    for entity in entities {
        match first.get(&key(entity)) {
            Some(kept) => {
                remap.insert(slug(entity).to_string(), kept.to_string());
            }
            None => {
                first.insert(key(entity), slug(entity));
            }
        }
    }
    remap
}

fn rewrite(slug: &mut String, remap: &HashMap<String, String>) {
    if let Some(kept) = remap.get(slug.as_str()) {
        *slug = kept.clone();
    }
}

fn rewrite_all(slugs: &mut Vec<String>, remap: &HashMap<String, String>) {
    for slug in slugs.iter_mut() {
        rewrite(slug, remap);
    }
    let mut seen = Vec::with_capacity(slugs.len());
    slugs.retain(|s| {
        if seen.contains(s) {
            false
        } else {
            seen.push(s.clone());
            true
        }
    });
}

fn item_key(item: &Item) -> String {
    normalize_name(&item.name)
}

fn building_key(building: &Building) -> String {
    normalize_name(&building.name)
}

fn unit_key(unit: &Unit) -> (String, Option<UnitType>) {
    (normalize_name(&unit.name), unit.unit_type)
}

fn metadata(
    items: &[Item],
    abilities: &[Ability],
    linked_classes: &ClassHierarchy,
    extraction: &Extraction,
) -> MetadataBundle {
    let mut class_hierarchy: BTreeMap<String, Vec<String>> = linked_classes
        .base
        .iter()
        .map(|c| (c.slug.clone(), Vec::new()))
        .collect();
    for class in &linked_classes.derived {
        if let Some(parent) = &class.parent {
            class_hierarchy
                .entry(parent.clone())
                .or_default()
                .push(class.slug.clone());
        }
    }

    MetadataBundle {
        item_categories: items.iter().map(|i| (i.slug.clone(), i.category)).collect(),
        ability_categories: abilities
            .iter()
            .map(|a| (a.slug.clone(), a.category))
            .collect(),
        class_hierarchy,
        item_names: extraction.item_names.clone(),
        ability_ids: extraction.ability_ids.clone(),
        base_classes: extraction.base_classes.clone(),
        spellbooks: extraction.spell_lists.spellbooks.clone(),
    }
}

pub fn assemble(linked: Linked, extraction: &Extraction, report: &mut Report) -> Dataset {
    let Linked {
        items,
        abilities,
        units,
        buildings,
        recipes,
        classes,
        ..
    } = linked;

    let abilities: Vec<Ability> = merge_by_key(
        abilities.into_iter().map(|r| r.ability).collect(),
        |a: &Ability| a.slug.clone(),
    );

    let items: Vec<Item> = items.into_iter().map(|r| r.item).collect();
    let item_remap = duplicate_remap(&items, item_key, |i| i.slug.as_str());
    let building_remap = duplicate_remap(&buildings, building_key, |b| b.slug.as_str());

    let mut items = dedup_first_wins(items, "items", item_key, |i| i.slug.clone(), report);
    let mut buildings = dedup_first_wins(
        buildings,
        "buildings",
        building_key,
        |b| b.slug.clone(),
        report,
    );
    let mut units = dedup_first_wins(units, "units", unit_key, |u| u.slug.clone(), report);

    let mut recipes: Vec<Recipe> = recipes;
    for recipe in &mut recipes {
        rewrite(&mut recipe.output, &item_remap);
        rewrite_all(&mut recipe.ingredients, &item_remap);
        if let Some(at) = recipe.crafted_at.as_mut() {
            rewrite(at, &building_remap);
        }
    }
    let recipes = dedup_first_wins(
        recipes,
        "recipes",
        |r| r.output.clone(),
        |r| r.output.clone(),
        report,
    );

    for item in &mut items {
        rewrite_all(&mut item.recipe, &item_remap);
        if let Some(at) = item.crafted_at.as_mut() {
            rewrite(at, &building_remap);
        }
    }
    for building in &mut buildings {
        rewrite_all(&mut building.craftable_items, &item_remap);
    }
    for unit in &mut units {
        rewrite_all(&mut unit.craftable_items, &item_remap);
    }

    let metadata = metadata(&items, &abilities, &classes, extraction);

    tracing::info!(
        items = items.len(),
        abilities = abilities.len(),
        units = units.len(),
        buildings = buildings.len(),
        recipes = recipes.len(),
        "assembled dataset"
    );

    Dataset {
        items,
        abilities,
        units,
        buildings,
        recipes,
        classes,
        metadata,
    }
}
