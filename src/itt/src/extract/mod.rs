//! Source extractors
//!
//! Each extractor turns one kind of input into raw records and never fails
//! the run: missing or unreadable inputs are reported and read as empty.
//!
//! - [`archive`]: object tables dumped from the map archive
//! - [`dsl`]: ability and item blocks in `.wurst` source
//! - [`script`]: recipes and id tables in the generated `war3map.j`
//! - [`classes`]: spell lists, base class table and class tooltips

pub mod archive;
pub mod classes;
pub mod dsl;
pub mod script;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::model::{AbilityDetails, ItemDetails, RawAbility, RawBuilding, RawItem, RawRecipe, RawUnit};
use crate::report::Report;

pub use archive::{
    extract_abilities, extract_buildings, extract_items, extract_units, load_object_table,
    ObjectTable,
};
pub use classes::{
    scan_base_class_table, scan_class_descriptions, scan_spell_lists, AbilityRelation, SpellLists,
};
pub use dsl::{extract_ability_details, extract_item_details, load_sources, SourceFile};
pub use script::MapScript;

// Well-known input locations
pub const ITEMS_FILE: &str = "items.json";
pub const ABILITIES_FILE: &str = "abilities.json";
pub const UNITS_FILE: &str = "units.json";
pub const BUILDINGS_FILE: &str = "buildings.json";
pub const MAP_SCRIPT_FILE: &str = "war3map.j";
pub const UNIT_TEXT_FILE: &str = "objects/units/TrollUnitTextConstant.wurst";
pub const CLASSES_FILE: &str = "systems/core/Classes.wurst";
pub const ABILITIES_SOURCE_DIR: &str = "objects/abilities";

/// Everything the extractors produced in one pass
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub items: Vec<RawItem>,
    pub abilities: Vec<RawAbility>,
    pub units: Vec<RawUnit>,
    pub buildings: Vec<RawBuilding>,
    pub recipes: Vec<RawRecipe>,
    /// DSL ability blocks keyed by identifier
    pub ability_details: BTreeMap<String, AbilityDetails>,
    /// DSL item blocks keyed by normalized constant
    pub item_details: BTreeMap<String, ItemDetails>,
    pub spell_lists: SpellLists,
    /// Unit name -> base class slug
    pub base_classes: BTreeMap<String, String>,
    /// Class slug -> description
    pub class_descriptions: BTreeMap<String, String>,
    /// Item lookup key -> canonical lowercase name
    pub item_names: BTreeMap<String, String>,
    /// Ability constant body -> ability slug
    pub ability_ids: BTreeMap<String, String>,
}

fn read_optional(path: &Path, what: &str, report: &mut Report) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) => {
            report.missing_input(path, format!("cannot read {}: {}", what, e));
            None
        }
    }
}

fn object_table(dir: &Path, file: &str, report: &mut Report) -> ObjectTable {
    load_object_table(&dir.join(file), report).unwrap_or_default()
}

/// Run every extractor over the archive dump and the DSL source tree.
pub fn extract_all(archive_dir: &Path, source_dir: &Path, report: &mut Report) -> Extraction {
    let mut extraction = Extraction {
        items: extract_items(&object_table(archive_dir, ITEMS_FILE, report), report),
        abilities: extract_abilities(&object_table(archive_dir, ABILITIES_FILE, report), report),
        units: extract_units(&object_table(archive_dir, UNITS_FILE, report), report),
        buildings: extract_buildings(&object_table(archive_dir, BUILDINGS_FILE, report), report),
        ..Default::default()
    };

    if let Some(content) = read_optional(&archive_dir.join(MAP_SCRIPT_FILE), "map script", report) {
        let script = MapScript::parse(&content);
        extraction.recipes = script.recipes();
        extraction.item_names = script.item_name_map();
        extraction.ability_ids = script.ability_id_map();
    }

    let sources = load_sources(source_dir, report);
    let ability_sources: Vec<SourceFile> = sources
        .iter()
        .filter(|f| f.relative.starts_with(ABILITIES_SOURCE_DIR))
        .cloned()
        .collect();
    extraction.ability_details = extract_ability_details(&ability_sources);
    extraction.item_details = extract_item_details(&sources);

    if let Some(content) = read_optional(&source_dir.join(UNIT_TEXT_FILE), "unit text constants", report)
    {
        extraction.spell_lists = scan_spell_lists(&content);
        extraction.class_descriptions = scan_class_descriptions(&content);
    }
    if let Some(content) = read_optional(&source_dir.join(CLASSES_FILE), "class table", report) {
        extraction.base_classes = scan_base_class_table(&content);
    }

    extraction
}
