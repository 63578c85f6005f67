//! Item records: archive fields, DSL details and ability references

use std::collections::BTreeMap;

use crate::codec::normalize_object_id;
use crate::extract::script::{ability_codes_in_text, raw_ability_id};
use crate::model::{Item, ItemDetails, RawItem};
use crate::report::Report;
use crate::text::{convert_icon_path, SlugAllocator};

/// Canonical item paired with the raw record it came from
#[derive(Debug, Clone)]
pub struct ItemRecord {
    pub item: Item,
    pub source: RawItem,
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn non_zero(value: i64) -> Option<i64> {
    (value != 0).then_some(value)
}

pub fn item_from_raw(raw: &RawItem, slug: String) -> Item {
    Item {
        slug,
        id: raw.id.clone(),
        name: raw.name.trim().to_string(),
        description: non_empty(&raw.description),
        tooltip: non_empty(&raw.tooltip),
        icon_path: convert_icon_path(&raw.icon),
        cost: non_zero(raw.cost),
        lumber_cost: non_zero(raw.lumber_cost),
        stock_maximum: non_zero(raw.stock_maximum),
        stock_replenish_interval: non_zero(raw.stock_replenish_interval),
        level: non_zero(raw.level),
        uses: non_zero(raw.uses),
        hit_points: non_zero(raw.hit_points),
        max_stack: non_zero(raw.max_stack),
        scaling_value: (raw.scaling_value != 0.0).then_some(raw.scaling_value),
        model_path: non_empty(&raw.model_path),
        hotkey: non_empty(&raw.hotkey),
        flags: raw.flags,
        ..Default::default()
    }
}

/// Fill what the archive left empty from a DSL block; bonuses only exist there
fn apply_details(item: &mut Item, details: &ItemDetails) {
    item.lumber_cost = item.lumber_cost.or(details.lumber_cost);
    item.stock_maximum = item.stock_maximum.or(details.stock_maximum);
    item.stock_replenish_interval = item
        .stock_replenish_interval
        .or(details.stock_replenish_interval);
    item.scaling_value = item.scaling_value.or(details.scaling_value);
    if item.model_path.is_none() {
        item.model_path = details.model_path.clone();
    }
    item.stat_bonuses = details.bonuses.clone();
}

/// Ability slugs for the item's ability list, then for codes quoted in its text
fn ability_refs(
    raw: &RawItem,
    slug: &str,
    abilities_by_code: &BTreeMap<String, String>,
    report: &mut Report,
) -> Vec<String> {
    let mut refs: Vec<String> = Vec::new();
    let mut push = |ability: &String| {
        if !refs.contains(ability) {
            refs.push(ability.clone());
        }
    };

    for code in &raw.abilities {
        match abilities_by_code.get(raw_ability_id(code)) {
            Some(ability) => push(ability),
            None => report.unresolved(
                format!("items:{}", slug),
                format!("ability code {} not in the ability table", code),
            ),
        }
    }

    let text = format!("{}\n{}", raw.description, raw.tooltip);
    for code in ability_codes_in_text(&text) {
        if let Some(ability) = abilities_by_code.get(&code) {
            push(ability);
        }
    }
    refs
}

/// Build item records in archive order.
///
/// Slugs are allocated in input order so the first item with a given name
/// keeps the bare slug. DSL details attach by raw code, falling back to the
/// constant slug matching the item slug.
pub fn link_items(
    raw: &[RawItem],
    details: &BTreeMap<String, ItemDetails>,
    abilities_by_code: &BTreeMap<String, String>,
    report: &mut Report,
) -> Vec<ItemRecord> {
    let mut by_code: BTreeMap<String, &ItemDetails> = BTreeMap::new();
    for d in details.values() {
        if let Some(code) = normalize_object_id(&d.raw_code) {
            by_code.entry(code).or_insert(d);
        }
    }

    let mut slugs = SlugAllocator::new();
    let mut records = Vec::with_capacity(raw.len());

    for source in raw {
        if source.name.trim().is_empty() {
            report.malformed(format!("items:{}", source.id), "item without name");
            continue;
        }
        let slug = slugs.allocate(&source.name);
        let mut item = item_from_raw(source, slug);

        let block = normalize_object_id(&source.id)
            .and_then(|code| by_code.get(&code).copied())
            .or_else(|| details.get(&item.slug));
        if let Some(block) = block {
            apply_details(&mut item, block);
        }

        item.abilities = ability_refs(source, &item.slug, abilities_by_code, report);
        records.push(ItemRecord {
            item,
            source: source.clone(),
        });
    }

    tracing::info!(count = records.len(), "linked items");
    records
}
