//! DSL text extractor
//!
//! Best-effort scanning of `.wurst` source for ability and item definitions.
//! Nothing here is a parser: each recognised block yields an optional partial
//! record, and anything that does not match is simply skipped.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::model::{AbilityDetails, ButtonPosition, ItemDetails};
use crate::report::Report;
use crate::text::{constant_to_slug, kebab_case};

/// Blocks with fewer populated fields than this are noise
pub const MIN_DETAIL_FIELDS: usize = 2;

/// One `.wurst` file loaded into memory
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Path relative to the scanned root, `/` separated
    pub relative: String,
    pub content: String,
}

impl SourceFile {
    pub fn stem(&self) -> &str {
        self.path.file_stem().and_then(|s| s.to_str()).unwrap_or_default()
    }
}

/// Load every `.wurst` file under `dir`, sorted by path.
///
/// Hidden directories are skipped. A missing directory is reported and
/// yields nothing; unreadable files are reported individually.
pub fn load_sources(dir: &Path, report: &mut Report) -> Vec<SourceFile> {
    if !dir.is_dir() {
        report.missing_input(dir, "source directory not found");
        return Vec::new();
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().map(|ext| ext == "wurst").unwrap_or(false))
    {
        let path = entry.path();
        match fs::read_to_string(path) {
            Ok(content) => {
                let relative = path
                    .strip_prefix(dir)
                    .unwrap_or(path)
                    .to_string_lossy()
                    .replace('\\', "/");
                files.push(SourceFile {
                    path: path.to_path_buf(),
                    relative,
                    content,
                });
            }
            Err(e) => report.missing_input(path, format!("unreadable source file: {}", e)),
        }
    }
    tracing::debug!(dir = %dir.display(), count = files.len(), "loaded source files");
    files
}

// ============================================================================
// Literals
// ============================================================================

static FLOAT_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").unwrap());

/// Leading numeric literal of an expression, `10.5 * lvl` gives 10.5
pub fn parse_number_prefix(text: &str) -> Option<f64> {
    FLOAT_PREFIX
        .find(text.trim())
        .and_then(|m| m.as_str().parse().ok())
}

/// Literal with surrounding quotes removed
fn unquote(value: &str) -> &str {
    let value = value.trim();
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

// ============================================================================
// Ability details
// ============================================================================

static ABILITY_CONSTRUCTOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"new\s+\w+\s*\(\s*(ABILITY_\w+)").unwrap());
static CLASS_DECL: Lazy<Regex> = Lazy::new(|| Regex::new(r"class\s+(\w+)\s+extends").unwrap());

/// Numeric constants an ability block may declare
const DETAIL_CONSTANTS: &[&str] = &[
    "DAMAGE",
    "DAMAGE_PER_TARGET",
    "MANACOST",
    "MANA_COST",
    "COOLDOWN",
    "AREA_OF_EFFECT",
    "AOE",
    "MAX_TARGETS",
    "MAXIMUM_TARGETS",
    "CAST_RANGE",
    "RANGE",
    "DURATION",
    "TRACK_DURATION",
];

/// Per-level setters read from an ability block
const DETAIL_METHODS: &[&str] = &[
    "setAreaofEffect",
    "setMaximumNumberofTargets",
    "setHotkeyNormal",
    "setMissileArt",
    "setArtEffect",
    "setArtTarget",
    "setArtCaster",
    "setButtonPositionNormalX",
    "setButtonPositionNormalY",
];

/// Level lambda presets read from an ability block
const DETAIL_PRESETS: &[&str] = &[
    "presetAreaofEffect",
    "presetMaximumNumberofTargets",
    "presetHotkeyNormal",
    "presetTargetTypes",
    "presetTargetsAllowed",
];

fn pattern_table(names: &[&'static str], template: fn(&str) -> String) -> HashMap<&'static str, Regex> {
    names
        .iter()
        .map(|name| (*name, Regex::new(&template(&regex::escape(name))).unwrap()))
        .collect()
}

static CONSTANT_PATTERNS: Lazy<HashMap<&'static str, Regex>> = Lazy::new(|| {
    pattern_table(DETAIL_CONSTANTS, |name| {
        format!(r"(?i)(?:let|constant)\s+{}\s*=\s*([^;\n]+)", name)
    })
});

/// `this.setX(level, value)` or cascade `..setX(level, value)`
static METHOD_PATTERNS: Lazy<HashMap<&'static str, Regex>> = Lazy::new(|| {
    pattern_table(DETAIL_METHODS, |method| {
        format!(r"(?i)(?:this\.|\.\.){}\s*\([^,)]*,\s*([^)]+)\)", method)
    })
});

/// `this.presetX(lvl -> value)`
static PRESET_PATTERNS: Lazy<HashMap<&'static str, Regex>> = Lazy::new(|| {
    pattern_table(DETAIL_PRESETS, |method| {
        format!(r"(?i)(?:this\.|\.\.){}\s*\([^)]*->\s*([^)]+)\)", method)
    })
});

fn captured(patterns: &HashMap<&'static str, Regex>, key: &str, content: &str) -> Option<String> {
    patterns
        .get(key)?
        .captures(content)
        .map(|c| unquote(&c[1]).to_string())
}

fn constant_value(content: &str, name: &str) -> Option<String> {
    captured(&CONSTANT_PATTERNS, name, content)
}

fn method_value(content: &str, method: &str) -> Option<String> {
    captured(&METHOD_PATTERNS, method, content)
}

fn preset_value(content: &str, method: &str) -> Option<String> {
    captured(&PRESET_PATTERNS, method, content)
}

fn first_number(content: &str, names: &[&str]) -> Option<f64> {
    names
        .iter()
        .find_map(|n| constant_value(content, n).and_then(|v| parse_number_prefix(&v)))
}

fn method_or_preset(content: &str, method: &str, preset: &str) -> Option<String> {
    method_value(content, method).or_else(|| preset_value(content, preset))
}

/// Identifier of an ability definition: the `ABILITY_*` constant it
/// constructs, else its class name, else the file stem.
pub fn ability_identifier(content: &str, stem: &str) -> String {
    if let Some(caps) = ABILITY_CONSTRUCTOR.captures(content) {
        return constant_to_slug(&caps[1].to_uppercase(), "ABILITY_");
    }
    if let Some(caps) = CLASS_DECL.captures(content) {
        return kebab_case(&caps[1]);
    }
    stem.to_lowercase().replace('_', "-")
}

/// Scan one file for an ability definition block
pub fn scan_ability(file: &SourceFile) -> Option<AbilityDetails> {
    let content = file.content.as_str();
    if !content.contains("extends") && !content.contains("AbilityDefinition") {
        return None;
    }

    let number = |method: &str, preset: &str| {
        method_or_preset(content, method, preset).and_then(|v| parse_number_prefix(&v))
    };

    let mut visual_effects = BTreeMap::new();
    for (key, method) in [
        ("missileArt", "setMissileArt"),
        ("artEffect", "setArtEffect"),
        ("artTarget", "setArtTarget"),
        ("artCaster", "setArtCaster"),
    ] {
        if let Some(art) = method_value(content, method) {
            visual_effects.insert(key.to_string(), art);
        }
    }

    let button_x = method_value(content, "setButtonPositionNormalX")
        .and_then(|v| parse_number_prefix(&v))
        .map(|v| v as i64);
    let button_y = method_value(content, "setButtonPositionNormalY")
        .and_then(|v| parse_number_prefix(&v))
        .map(|v| v as i64);

    let details = AbilityDetails {
        ability_id: ability_identifier(content, file.stem()),
        source: file.relative.clone(),
        damage: first_number(content, &["DAMAGE", "DAMAGE_PER_TARGET"]),
        mana_cost: first_number(content, &["MANACOST", "MANA_COST"]),
        cooldown: first_number(content, &["COOLDOWN"]),
        area_of_effect: number("setAreaofEffect", "presetAreaofEffect")
            .or_else(|| first_number(content, &["AREA_OF_EFFECT", "AOE"])),
        max_targets: number("setMaximumNumberofTargets", "presetMaximumNumberofTargets")
            .or_else(|| first_number(content, &["MAX_TARGETS", "MAXIMUM_TARGETS"]))
            .map(|v| v as i64),
        cast_range: first_number(content, &["CAST_RANGE", "RANGE"]),
        duration: first_number(content, &["DURATION", "TRACK_DURATION"]),
        hotkey: method_or_preset(content, "setHotkeyNormal", "presetHotkeyNormal"),
        target_types: preset_value(content, "presetTargetTypes"),
        targets_allowed: preset_value(content, "presetTargetsAllowed"),
        visual_effects,
        button_position: (button_x.is_some() || button_y.is_some()).then_some(ButtonPosition {
            x: button_x,
            y: button_y,
        }),
    };

    if details.populated_fields() < MIN_DETAIL_FIELDS {
        tracing::trace!(file = %file.relative, "discarding ability block without details");
        return None;
    }
    Some(details)
}

/// Ability details keyed by identifier. Files are visited in path order and a
/// later file with the same identifier replaces an earlier one.
pub fn extract_ability_details(files: &[SourceFile]) -> BTreeMap<String, AbilityDetails> {
    let mut details = BTreeMap::new();
    for file in files {
        if let Some(block) = scan_ability(file) {
            details.insert(block.ability_id.clone(), block);
        }
    }
    tracing::info!(count = details.len(), "extracted ability details");
    details
}

// ============================================================================
// Item details
// ============================================================================

static ITEM_CONSTANT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:public\s+)?constant\s+(ITEM_[A-Z0-9_]+)\s*=\s*([^\n]+)").unwrap()
});
static LUMBER_COST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.\.setLumberCost\s*\(\s*(\d+)\s*\)").unwrap());
static STOCK_MAXIMUM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.\.setStockMaximum\s*\(\s*(\d+)\s*\)").unwrap());
static STOCK_REPLENISH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.\.setStockReplenishInterval\s*\(\s*(\d+)\s*\)").unwrap());
static SCALING_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.\.setScalingValue\s*\(\s*([\d.]+)\s*\)").unwrap());
static MODEL_USED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\.\.setModelUsed\s*\(\s*["']([^"']+)["']\s*\)"#).unwrap());

/// Stat name with its chained-adder, property and setter spellings
struct BonusPattern {
    stat: &'static str,
    adder: Regex,
    property: Regex,
    setter: Regex,
}

static BONUS_PATTERNS: Lazy<Vec<BonusPattern>> = Lazy::new(|| {
    [
        ("strength", "Strength", "strengthBonus", r"\d+"),
        ("agility", "Agility", "agilityBonus", r"\d+"),
        ("intelligence", "Intelligence", "intelligenceBonus", r"\d+"),
        ("armor", "Armor", "armorBonus", r"\d+"),
        ("damage", "Damage", "damageBonus", r"\d+"),
        ("attackSpeed", "AttackSpeed", "attackSpeedBonus", r"[\d.]+"),
        ("health", "Health", "hpBonus", r"\d+"),
        ("mana", "Mana", "mpBonus", r"\d+"),
    ]
    .into_iter()
    .map(|(stat, method, property, digits)| BonusPattern {
        stat,
        adder: Regex::new(&format!(r"(?i)\.\.addBonus{}\s*\(\s*([^)]+)\s*\)", method)).unwrap(),
        property: Regex::new(&format!(r"(?i){}\s*=\s*({})", property, digits)).unwrap(),
        setter: Regex::new(&format!(r"(?i)\.\.set{}Bonus\s*\(\s*([^)]+)\s*\)", method)).unwrap(),
    })
    .collect()
});

/// Last match of `re` in `text` parsed as a number
fn last_number(re: &Regex, text: &str) -> Option<f64> {
    re.captures_iter(text)
        .last()
        .and_then(|c| parse_number_prefix(&c[1]))
}

/// `ITEM_*` constant declared in DSL source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemConstant {
    pub constant: String,
    pub raw_code: String,
}

pub fn scan_item_constants(content: &str) -> Vec<ItemConstant> {
    ITEM_CONSTANT
        .captures_iter(content)
        .map(|caps| ItemConstant {
            constant: caps[1].to_string(),
            raw_code: caps[2].replace(['\'', '"'], "").trim().to_string(),
        })
        .collect()
}

/// Text of the block assigned to `<name>...= ... }`, or the whole file
fn item_block<'a>(content: &'a str, name: &str) -> &'a str {
    let pattern = format!(
        r"(?is)({}[^=]*=\s*(?:compiletime\s*)?[^}}]+\}})",
        regex::escape(name)
    );
    Regex::new(&pattern)
        .ok()
        .and_then(|re| re.find(content))
        .map(|m| m.as_str())
        .unwrap_or(content)
}

/// Non-zero stat bonuses for the item whose constant body is `bare`
/// (`IRON_AXE` for `ITEM_IRON_AXE`)
pub fn scan_item_bonuses(content: &str, bare: &str) -> BTreeMap<String, f64> {
    let block = item_block(content, bare);
    let mut bonuses: BTreeMap<&str, f64> = BTreeMap::new();

    for p in BONUS_PATTERNS.iter() {
        if let Some(v) = last_number(&p.adder, block) {
            bonuses.insert(p.stat, v);
        }
    }
    // property spelling only counts when no chained adder is used
    if bonuses.values().all(|v| *v == 0.0) {
        for p in BONUS_PATTERNS.iter() {
            if let Some(v) = last_number(&p.property, block) {
                bonuses.insert(p.stat, v);
            }
        }
    }
    for p in BONUS_PATTERNS.iter() {
        if let Some(v) = last_number(&p.setter, block) {
            bonuses.insert(p.stat, v);
        }
    }

    bonuses
        .into_iter()
        .filter(|(_, v)| *v != 0.0)
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

/// Definition properties from the `<bare>_DEFINITION` block
pub fn scan_item_properties(content: &str, bare: &str, details: &mut ItemDetails) {
    let block = item_block(content, &format!("{}_DEFINITION", bare));
    let int = |re: &Regex| re.captures(block).and_then(|c| c[1].parse::<i64>().ok());

    if let Some(v) = int(&LUMBER_COST) {
        details.lumber_cost = Some(v);
    }
    if let Some(v) = int(&STOCK_MAXIMUM) {
        details.stock_maximum = Some(v);
    }
    if let Some(v) = int(&STOCK_REPLENISH) {
        details.stock_replenish_interval = Some(v);
    }
    if let Some(v) = SCALING_VALUE
        .captures(block)
        .and_then(|c| parse_number_prefix(&c[1]))
    {
        details.scaling_value = Some(v);
    }
    if let Some(caps) = MODEL_USED.captures(block) {
        details.model_path = Some(caps[1].to_string());
    }
}

/// Item details keyed by normalized constant (`ITEM_IRON_AXE` -> `iron-axe`).
///
/// Constants are collected across all files first; details for each are then
/// gathered from every file mentioning the constant. Only items with at least
/// one bonus or property are kept.
pub fn extract_item_details(files: &[SourceFile]) -> BTreeMap<String, ItemDetails> {
    let mut constants: BTreeMap<String, ItemConstant> = BTreeMap::new();
    for file in files {
        for c in scan_item_constants(&file.content) {
            constants.insert(constant_to_slug(&c.constant.to_uppercase(), "ITEM_"), c);
        }
    }

    let mut details = BTreeMap::new();
    for (key, constant) in constants {
        let upper = constant.constant.to_uppercase();
        let bare = upper.strip_prefix("ITEM_").unwrap_or(&upper).to_string();
        let mut item = ItemDetails {
            constant: constant.constant.clone(),
            raw_code: constant.raw_code.clone(),
            ..Default::default()
        };

        for file in files
            .iter()
            .filter(|f| f.content.contains(&constant.constant) || f.content.contains(&bare))
        {
            item.bonuses.extend(scan_item_bonuses(&file.content, &bare));
            scan_item_properties(&file.content, &bare, &mut item);
        }

        if item.has_details() {
            details.insert(key, item);
        }
    }
    tracing::info!(count = details.len(), "extracted item details");
    details
}
