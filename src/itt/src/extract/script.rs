//! Generated map script (`war3map.j`) scanning
//!
//! Recipes, item names and ability constants all come from the registration
//! code the map compiler emits. Object references are resolved through a
//! [`LocalObjectTable`] built from the same script.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};

use crate::codec::LocalObjectTable;
use crate::model::{RawRecipe, RecipeRef};
use crate::text::{constant_to_slug, slugify};

const ITEM_PREFIX: &str = "LocalObjectIDs_ITEM_";
const UNIT_PREFIX: &str = "LocalObjectIDs_UNIT_";

static NEW_ITEM_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"new_CustomItemType_\d+\(\s*(LocalObjectIDs_ITEM_[A-Za-z0-9_]+)").unwrap()
});
static TRAILING_STRING: Lazy<Regex> = Lazy::new(|| Regex::new(r#",\s*".*$"#).unwrap());
static ITEM_GLOBAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"integer\s+LocalObjectIDs_ITEM_([A-Z0-9_]+)\s*=").unwrap());
static ABILITY_GLOBAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"integer\s+LocalObjectIDs_ABILITY_([A-Z0-9_]+)\s*=").unwrap());
static ABILITY_CODE_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<([A-Za-z0-9!{}|~$]{4}),[^>]+>").unwrap());

/// Parsed generated script
#[derive(Debug, Clone, Default)]
pub struct MapScript {
    pub table: LocalObjectTable,
    content: String,
}

impl MapScript {
    pub fn parse(content: &str) -> Self {
        Self {
            table: LocalObjectTable::parse(content.lines()),
            content: content.to_string(),
        }
    }

    fn object_ref(&self, constant: &str) -> Option<RecipeRef> {
        let object = self.table.get(constant)?;
        Some(RecipeRef {
            constant: constant.to_string(),
            name: object.name.clone(),
            object_id: object.object_id.clone(),
        })
    }

    /// Crafting recipes in order of first declaration.
    ///
    /// A `new_CustomItemType_N(LocalObjectIDs_ITEM_…)` line opens a block for
    /// that item; the `call` lines after it fill ingredients, the crafting
    /// building, the mixing pot mana requirement and the quick make ability.
    /// Recipes without ingredients are left out.
    pub fn recipes(&self) -> Vec<RawRecipe> {
        let mut order: Vec<String> = Vec::new();
        let mut recipes: BTreeMap<String, RawRecipe> = BTreeMap::new();
        let mut current: Option<String> = None;

        for line in self.content.lines() {
            if let Some(caps) = NEW_ITEM_TYPE.captures(line) {
                let resolved = self.table.resolve(&caps[1]);
                current = if resolved.starts_with(ITEM_PREFIX) {
                    if !recipes.contains_key(&resolved) {
                        let item = self.object_ref(&resolved);
                        recipes.insert(
                            resolved.clone(),
                            RawRecipe {
                                item_const: resolved.clone(),
                                item_object_id: item.as_ref().and_then(|i| i.object_id.clone()),
                                item_name: item.and_then(|i| i.name),
                                ..Default::default()
                            },
                        );
                        order.push(resolved.clone());
                    }
                    Some(resolved)
                } else {
                    None
                };
                continue;
            }

            let Some(item_const) = current.as_ref() else {
                continue;
            };
            if !line.contains("call") {
                continue;
            }
            let Some(recipe) = recipes.get_mut(item_const) else {
                continue;
            };

            let args = call_args(line);
            if args.len() <= 1 {
                continue;
            }

            if line.contains("setItemRecipe") {
                recipe.ingredients = args[1..]
                    .iter()
                    .map(|arg| self.table.resolve(arg))
                    .filter(|c| c.starts_with(ITEM_PREFIX))
                    .filter_map(|c| self.object_ref(&c))
                    .collect();
            } else if line.contains("setUnitRequirement") {
                let unit = self.table.resolve(&args[1]);
                if unit.starts_with(UNIT_PREFIX) {
                    recipe.crafted_at = self.object_ref(&unit);
                }
            } else if line.contains("setMixingPotManaRequirement") {
                if let Ok(mana) = args[1].parse::<f64>() {
                    recipe.mana_requirement = Some(mana);
                }
            } else if line.contains("setQuickMakeAbility") {
                recipe.quick_make_ability = Some(self.table.resolve(&args[1]));
            }
        }

        let recipes: Vec<RawRecipe> = order
            .into_iter()
            .filter_map(|c| recipes.remove(&c))
            .filter(|r| !r.ingredients.is_empty())
            .collect();
        tracing::info!(count = recipes.len(), "extracted recipes");
        recipes
    }

    /// Lookup keys for item names, each mapped to the lowercase registered name.
    ///
    /// Keys: the constant body in slug form, the lowercase name, and the name slug.
    pub fn item_name_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        for caps in ITEM_GLOBAL.captures_iter(&self.content) {
            let constant = format!("{}{}", ITEM_PREFIX, &caps[1]);
            let resolved = self.table.resolve(&constant);
            if !resolved.starts_with(ITEM_PREFIX) {
                continue;
            }
            let Some(name) = self.table.get(&resolved).and_then(|o| o.name.as_deref()) else {
                continue;
            };
            let lower = name.trim().to_lowercase();
            map.insert(constant_to_slug(&caps[1], ""), lower.clone());
            map.insert(slugify(name), lower.clone());
            map.insert(lower.clone(), lower);
        }
        map
    }

    /// `LocalObjectIDs_ABILITY_X` body -> ability slug
    pub fn ability_id_map(&self) -> BTreeMap<String, String> {
        ABILITY_GLOBAL
            .captures_iter(&self.content)
            .map(|caps| {
                let slug = constant_to_slug(&caps[1], "");
                let slug = slug.strip_prefix("ability-").unwrap_or(&slug).to_string();
                (caps[1].to_string(), slug)
            })
            .collect()
    }
}

/// Arguments of a dispatch call, trailing string arguments dropped
pub fn call_args(line: &str) -> Vec<String> {
    let line = TRAILING_STRING.replace(line, ")");
    let Some(open) = line.find('(') else {
        return Vec::new();
    };
    let close = line.rfind(')').filter(|c| *c > open).unwrap_or(line.len());
    line[open + 1..close]
        .split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(String::from)
        .collect()
}

/// Raw ability codes referenced from text (`<AIs3,DataC1>`), deduplicated
pub fn ability_codes_in_text(text: &str) -> BTreeSet<String> {
    ABILITY_CODE_REF
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// First four characters of an ability id before any `:` suffix
pub fn raw_ability_id(full: &str) -> &str {
    let base = full.split(':').next().unwrap_or_default();
    match base.char_indices().nth(4) {
        Some((idx, _)) => &base[..idx],
        None => base,
    }
}
