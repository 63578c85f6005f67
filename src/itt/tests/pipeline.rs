//! End-to-end pipeline runs over a small on-disk fixture

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use itt::pipeline::dataset::{
    ABILITIES_OUTPUT, BUILDINGS_OUTPUT, CLASSES_OUTPUT, ITEMS_OUTPUT, METADATA_OUTPUT,
    RECIPES_OUTPUT, REPORT_OUTPUT, UNITS_OUTPUT,
};
use itt::{ClassKind, IssueKind, Pipeline, PipelineInputs};
use tempfile::TempDir;

const ITEMS: &str = r#"{
  "original": {
    "I001": [{"id": "unam", "value": "Stick"}, {"id": "igol", "value": 1}],
    "I002": [{"id": "unam", "value": "Flint"}, {"id": "igol", "value": 2}]
  },
  "custom": {
    "I000": [
      {"id": "unam", "value": "Iron Axe"},
      {"id": "igol", "value": 14},
      {"id": "iabi", "value": "A000"},
      {"id": "ides", "value": "A sturdy axe."}
    ],
    "I003": [{"id": "unam", "value": "Iron  Axe"}, {"id": "igol", "value": 99}]
  }
}"#;

const ABILITIES: &str = r#"{
  "custom": {
    "A000": [
      {"id": "anam", "value": "Fire Bolt"},
      {"id": "acdn", "level": 1, "value": 8.0},
      {"id": "amcs", "level": 1, "value": 20}
    ],
    "A001": [{"id": "anam", "value": "Ensnare"}, {"id": "aher", "value": 1}]
  }
}"#;

const UNITS: &str = r#"{
  "custom": {
    "u000": [
      {"id": "unam", "value": "Hunter"},
      {"id": "uhpm", "value": 200},
      {"id": "ustr", "value": 2.0}
    ],
    "u001": [{"id": "unam", "value": "Tracker"}, {"id": "uhpm", "value": 220}],
    "u002": [{"id": "unam", "value": "Elk"}, {"id": "ua1b", "value": 4}]
  }
}"#;

const BUILDINGS: &str = r#"{
  "custom": {
    "h000": [{"id": "bnam", "value": "Workshop"}, {"id": "bhpm", "value": 500}]
  }
}"#;

// 'I000' = 1227894832, 'I001' = 1227894833, 'I002' = 1227894834,
// 'h000' = 1747988528
const MAP_SCRIPT: &str = r#"
function init takes nothing returns nothing
    set receiver_1 = 1227894832
    call int_registerObjectID(receiver_1, "Iron Axe", "stack")
    set LocalObjectIDs_ITEM_IRON_AXE = receiver_1
    set receiver_2 = 1227894833
    call int_registerObjectID(receiver_2, "Stick", "stack")
    set LocalObjectIDs_ITEM_STICK = receiver_2
    set receiver_3 = 1227894834
    call int_registerObjectID(receiver_3, "Flint", "stack")
    set LocalObjectIDs_ITEM_FLINT = receiver_3
    set receiver_4 = 1747988528
    call int_registerObjectID(receiver_4, "Workshop", "stack")
    set LocalObjectIDs_UNIT_WORKSHOP = receiver_4
    set axeType = new_CustomItemType_3(LocalObjectIDs_ITEM_IRON_AXE)
    call dispatch_CustomItemType_setItemRecipe(axeType, LocalObjectIDs_ITEM_STICK, LocalObjectIDs_ITEM_FLINT, "when calling setItemRecipe")
    call dispatch_CustomItemType_setUnitRequirement(axeType, LocalObjectIDs_UNIT_WORKSHOP, "when calling")
    set ghostType = new_CustomItemType_3(LocalObjectIDs_ITEM_GHOST)
    call dispatch_CustomItemType_setItemRecipe(ghostType, LocalObjectIDs_ITEM_STICK, "when calling setItemRecipe")
endfunction
"#;

const UNIT_TEXT: &str = r#"
public constant HERO_SPELLS_HUNTER = commaList(ABILITY_ENSNARE)
public constant TOOLTIP_HUNTER = "The Hunter tracks and kills prey."
"#;

const FIRE_BOLT: &str = r#"
let COOLDOWN = 12.
let MANACOST = 25
class FireBoltDefinition extends AbilityDefinitionFireBolt
    construct()
        this.setHotkeyNormal(1, "Q")
init
    new FireBoltDefinition(ABILITY_FIRE_BOLT)
"#;

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn fixture() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let archive = dir.path().join("raw");
    write(&archive.join("items.json"), ITEMS);
    write(&archive.join("abilities.json"), ABILITIES);
    write(&archive.join("units.json"), UNITS);
    write(&archive.join("buildings.json"), BUILDINGS);
    write(&archive.join("war3map.j"), MAP_SCRIPT);

    let source = dir.path().join("wurst");
    write(
        &source.join("objects/units/TrollUnitTextConstant.wurst"),
        UNIT_TEXT,
    );
    write(&source.join("objects/abilities/FireBolt.wurst"), FIRE_BOLT);
    dir
}

fn inputs(dir: &Path) -> PipelineInputs {
    PipelineInputs {
        archive_dir: dir.join("raw"),
        source_dir: dir.join("wurst"),
        ..Default::default()
    }
}

#[test]
fn test_full_run() {
    let dir = fixture();
    let (dataset, report) = Pipeline::new(inputs(dir.path())).run().unwrap();

    // "Iron  Axe" normalizes onto "Iron Axe"; the first one read is kept
    let slugs: Vec<_> = dataset.items.iter().map(|i| i.slug.as_str()).collect();
    assert_eq!(slugs, vec!["iron-axe", "stick", "flint"]);
    let axe = dataset.item("iron-axe").unwrap();
    assert_eq!(axe.id, "I000");
    assert_eq!(axe.cost, Some(14));
    assert_eq!(axe.abilities, vec!["fire-bolt"]);
    assert_eq!(axe.recipe, vec!["stick", "flint"]);
    assert_eq!(axe.crafted_at.as_deref(), Some("workshop"));
    assert!(report.count(IssueKind::DuplicateDropped) >= 1);

    assert_eq!(dataset.recipes.len(), 1);
    assert_eq!(dataset.recipes[0].output, "iron-axe");
    // the ghost recipe names an item that was never extracted
    assert!(report
        .of_kind(IssueKind::UnresolvedReference)
        .any(|i| i.subject.contains("ITEM_GHOST")));

    let workshop = dataset.building("workshop").unwrap();
    assert_eq!(workshop.craftable_items, vec!["iron-axe"]);

    let fire_bolt = dataset.ability("fire-bolt").unwrap();
    assert_eq!(fire_bolt.hotkey.as_deref(), Some("Q"));
    assert_eq!(fire_bolt.cooldown, Some(12.0));
    let ensnare = dataset.ability("ensnare").unwrap();
    assert_eq!(ensnare.available_to_classes, vec!["hunter"]);

    let hunter = dataset
        .classes
        .base
        .iter()
        .find(|c| c.slug == "hunter")
        .unwrap();
    assert_eq!(hunter.kind, ClassKind::Base);
    assert!(hunter.subclasses.contains(&"tracker".to_string()));
    assert_eq!(hunter.summary, "The Hunter tracks and kills prey.");
    let tracker = dataset
        .classes
        .derived
        .iter()
        .find(|c| c.slug == "tracker")
        .unwrap();
    assert_eq!(tracker.parent.as_deref(), Some("hunter"));
    assert_eq!(
        dataset.metadata.class_hierarchy.get("hunter"),
        Some(&vec!["tracker".to_string()])
    );

    // the class table file was not provided
    assert!(report.count(IssueKind::MissingInput) >= 1);
}

#[test]
fn test_references_resolve() {
    let dir = fixture();
    let (dataset, _) = Pipeline::new(inputs(dir.path())).run().unwrap();

    let items: BTreeSet<_> = dataset.items.iter().map(|i| i.slug.as_str()).collect();
    let buildings: BTreeSet<_> = dataset.buildings.iter().map(|b| b.slug.as_str()).collect();
    for recipe in &dataset.recipes {
        assert!(items.contains(recipe.output.as_str()), "{}", recipe.output);
        for ingredient in &recipe.ingredients {
            assert!(items.contains(ingredient.as_str()), "{}", ingredient);
        }
        if let Some(at) = &recipe.crafted_at {
            assert!(buildings.contains(at.as_str()), "{}", at);
        }
    }

    fn unique<'a>(slugs: impl Iterator<Item = &'a str>) -> bool {
        let mut seen = BTreeSet::new();
        slugs.into_iter().all(|s| seen.insert(s))
    }
    assert!(unique(dataset.items.iter().map(|i| i.slug.as_str())));
    assert!(unique(dataset.abilities.iter().map(|a| a.slug.as_str())));
    assert!(unique(dataset.units.iter().map(|u| u.slug.as_str())));
    assert!(unique(dataset.buildings.iter().map(|b| b.slug.as_str())));

    for slug in dataset.metadata.item_categories.keys() {
        assert!(items.contains(slug.as_str()));
    }
}

#[test]
fn test_runs_are_byte_identical() {
    let dir = fixture();
    let first = dir.path().join("out-1");
    let second = dir.path().join("out-2");

    let (dataset, report) = Pipeline::new(inputs(dir.path())).run().unwrap();
    dataset.write(&first, &report).unwrap();
    let (dataset, report) = Pipeline::new(inputs(dir.path())).run().unwrap();
    dataset.write(&second, &report).unwrap();

    for file in [
        ITEMS_OUTPUT,
        ABILITIES_OUTPUT,
        UNITS_OUTPUT,
        BUILDINGS_OUTPUT,
        RECIPES_OUTPUT,
        CLASSES_OUTPUT,
        METADATA_OUTPUT,
        REPORT_OUTPUT,
    ] {
        let a = fs::read(first.join(file)).unwrap();
        let b = fs::read(second.join(file)).unwrap();
        assert_eq!(a, b, "{} differs between runs", file);
    }
}
