//! Final dataset and its on-disk form

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{
    Ability, AbilityCategory, Building, ClassHierarchy, Item, ItemCategory, Recipe, Unit,
};
use crate::report::Report;

/// Lookup tables handed to downstream generators alongside the collections
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataBundle {
    /// Item slug -> category
    pub item_categories: BTreeMap<String, ItemCategory>,
    /// Ability slug -> category
    pub ability_categories: BTreeMap<String, AbilityCategory>,
    /// Base class slug -> derived class slugs present in the dataset
    pub class_hierarchy: BTreeMap<String, Vec<String>>,
    /// Item lookup key -> canonical lowercase name
    pub item_names: BTreeMap<String, String>,
    /// Ability constant body -> ability slug
    pub ability_ids: BTreeMap<String, String>,
    /// Unit name -> base class slug
    pub base_classes: BTreeMap<String, String>,
    /// Spellbook ability slug -> classes carrying it
    pub spellbooks: BTreeMap<String, Vec<String>>,
}

/// Normalized, deduplicated, cross-referenced output of one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub items: Vec<Item>,
    pub abilities: Vec<Ability>,
    pub units: Vec<Unit>,
    pub buildings: Vec<Building>,
    pub recipes: Vec<Recipe>,
    pub classes: ClassHierarchy,
    pub metadata: MetadataBundle,
}

pub const ITEMS_OUTPUT: &str = "items.json";
pub const ABILITIES_OUTPUT: &str = "abilities.json";
pub const UNITS_OUTPUT: &str = "units.json";
pub const BUILDINGS_OUTPUT: &str = "buildings.json";
pub const RECIPES_OUTPUT: &str = "recipes.json";
pub const CLASSES_OUTPUT: &str = "classes.json";
pub const METADATA_OUTPUT: &str = "metadata.json";
pub const REPORT_OUTPUT: &str = "report.json";

fn write_json<T: Serialize + ?Sized>(dir: &Path, file: &str, value: &T) -> Result<()> {
    let path = dir.join(file);
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    fs::write(&path, json).map_err(|source| Error::Write { path, source })
}

impl Dataset {
    pub fn item(&self, slug: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.slug == slug)
    }

    pub fn ability(&self, slug: &str) -> Option<&Ability> {
        self.abilities.iter().find(|a| a.slug == slug)
    }

    pub fn building(&self, slug: &str) -> Option<&Building> {
        self.buildings.iter().find(|b| b.slug == slug)
    }

    /// Write one pretty JSON file per collection plus the report into `dir`.
    pub fn write(&self, dir: &Path, report: &Report) -> Result<()> {
        fs::create_dir_all(dir).map_err(|source| Error::Write {
            path: dir.to_path_buf(),
            source,
        })?;

        write_json(dir, ITEMS_OUTPUT, &self.items)?;
        write_json(dir, ABILITIES_OUTPUT, &self.abilities)?;
        write_json(dir, UNITS_OUTPUT, &self.units)?;
        write_json(dir, BUILDINGS_OUTPUT, &self.buildings)?;
        write_json(dir, RECIPES_OUTPUT, &self.recipes)?;
        write_json(dir, CLASSES_OUTPUT, &self.classes)?;
        write_json(dir, METADATA_OUTPUT, &self.metadata)?;
        write_json(dir, REPORT_OUTPUT, report)?;

        tracing::info!(
            dir = %dir.display(),
            items = self.items.len(),
            abilities = self.abilities.len(),
            units = self.units.len(),
            buildings = self.buildings.len(),
            recipes = self.recipes.len(),
            "wrote dataset"
        );
        Ok(())
    }
}
