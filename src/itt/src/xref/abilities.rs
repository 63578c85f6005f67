//! Ability records: names, DSL details and spell list membership

use std::collections::BTreeMap;

use crate::classify::is_garbage_ability_name;
use crate::extract::archive::{self, fallback_ability_name, headline_stat};
use crate::extract::SpellLists;
use crate::merge::Merge;
use crate::model::{Ability, AbilityDetails, RawAbility, VisualEffects};
use crate::report::Report;
use crate::text::{convert_icon_path, slugify, strip_color_codes};

/// Canonical ability paired with the raw record it came from
#[derive(Debug, Clone)]
pub struct AbilityRecord {
    pub ability: Ability,
    pub source: RawAbility,
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// DSL hotkeys that are really unexpanded expressions
fn is_placeholder_hotkey(value: &str) -> bool {
    value.contains("TOOLTIP") || value.contains("lvl") || value.chars().count() > 5
}

fn is_placeholder_targets(value: &str) -> bool {
    ["TARGET_ALLOWED", "DUMMY", "commaList", "TargetsAllowed"]
        .iter()
        .any(|p| value.contains(p))
}

/// Partial ability built from a DSL block; placeholder values are left out
pub fn ability_from_details(details: &AbilityDetails) -> Ability {
    Ability {
        damage: details.damage,
        mana_cost: details.mana_cost,
        cooldown: details.cooldown,
        area_of_effect: details.area_of_effect,
        max_targets: details.max_targets,
        range: details.cast_range,
        duration: details.duration,
        hotkey: details
            .hotkey
            .as_deref()
            .filter(|h| !is_placeholder_hotkey(h))
            .and_then(non_empty),
        targets_allowed: details
            .targets_allowed
            .as_deref()
            .filter(|t| !is_placeholder_targets(t))
            .and_then(non_empty),
        visual_effects: VisualEffects {
            art: details.visual_effects.clone(),
            ..Default::default()
        },
        button_position: details.button_position,
        ..Default::default()
    }
}

/// Canonical ability from archive fields alone
pub fn ability_from_raw(raw: &RawAbility, slug: String, name: String) -> Ability {
    let r = raw.raw.as_slice();
    let levels = raw.levels.clone();
    Ability {
        id: raw.id.clone(),
        name,
        description: non_empty(&raw.description),
        tooltip: non_empty(&raw.tooltip),
        icon_path: convert_icon_path(&raw.icon),
        mana_cost: headline_stat(&levels, r, |l| l.mana_cost, archive::MANA_COST),
        cooldown: headline_stat(&levels, r, |l| l.cooldown, archive::COOLDOWN),
        range: headline_stat(&levels, r, |l| l.range, archive::RANGE),
        duration: headline_stat(&levels, r, |l| l.duration, archive::DURATION),
        damage: headline_stat(&levels, r, |l| l.damage, archive::DAMAGE),
        area_of_effect: raw.area_of_effect,
        max_targets: raw.max_targets,
        hotkey: non_empty(&raw.hotkey),
        targets_allowed: non_empty(&raw.targets_allowed),
        cast_time: raw.cast_time,
        levels,
        visual_effects: VisualEffects {
            attachment_points: raw.attachment_points.clone(),
            attachment_target: non_empty(&raw.attachment_target),
            ..Default::default()
        },
        slug,
        ..Default::default()
    }
}

/// Keys a DSL or spell list table may use for this ability
fn lookup_keys(slug: &str, id: &str) -> Vec<String> {
    let mut keys = vec![slug.to_string()];
    if let Some(stripped) = slug.strip_prefix("ability-") {
        keys.push(stripped.to_string());
    }
    let id = id.trim().to_lowercase();
    if !id.is_empty() {
        keys.push(id);
    }
    keys
}

/// Build ability records in archive order.
///
/// Names fall back through alternate text fields; records whose name is
/// unusable are reported as malformed. DSL details take precedence over
/// archive values, spell lists supply the owning classes and spellbook tier.
pub fn link_abilities(
    raw: &[RawAbility],
    details: &BTreeMap<String, AbilityDetails>,
    spell_lists: &SpellLists,
    report: &mut Report,
) -> Vec<AbilityRecord> {
    let mut records = Vec::with_capacity(raw.len());

    for source in raw {
        let Some(name) = fallback_ability_name(source) else {
            report.malformed(source.id.as_str(), "ability without name or id");
            continue;
        };
        let name = strip_color_codes(&name);
        if is_garbage_ability_name(&name) {
            report.malformed(source.id.as_str(), format!("internal ability name {:?}", name));
            continue;
        }
        let slug = slugify(&name);
        if slug.is_empty() {
            report.malformed(source.id.as_str(), format!("ability name {:?} has no slug", name));
            continue;
        }

        let keys = lookup_keys(&slug, &source.id);
        let mut ability = ability_from_raw(source, slug, name);

        if let Some(block) = keys.iter().find_map(|k| details.get(k)) {
            let mut merged = ability_from_details(block);
            merged.slug = ability.slug.clone();
            merged.merge_from(ability);
            ability = merged;
        }

        if let Some(relation) = keys.iter().find_map(|k| spell_lists.relations.get(k)) {
            ability.available_to_classes = relation.classes.clone();
            ability.spellbook = relation.spellbook();
        }

        records.push(AbilityRecord {
            ability,
            source: source.clone(),
        });
    }

    tracing::info!(count = records.len(), "linked abilities");
    records
}

/// Raw four character ability code -> ability slug, first record wins
pub fn ability_slug_by_code(records: &[AbilityRecord]) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for record in records {
        let code = crate::extract::script::raw_ability_id(&record.source.id).to_string();
        map.entry(code).or_insert_with(|| record.ability.slug.clone());
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::scan_spell_lists;
    use crate::fields::OverrideRecord;
    use crate::model::{LevelStats, SpellType};

    fn raw_ability(id: &str, name: &str) -> RawAbility {
        RawAbility {
            id: id.into(),
            name: name.into(),
            hotkey: "E".into(),
            targets_allowed: "ground,enemy".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_names_and_garbage() {
        let mut nameless = raw_ability("A00X", "");
        nameless.raw = vec![OverrideRecord::new("atp1", 0, "|cffffcc00Learn|r Ensnare")];

        let raw = vec![
            raw_ability("A000", "|cff00ff00Fire Bolt|r"),
            raw_ability("A001", "AIlb:ANcl"),
            nameless,
        ];
        let mut report = Report::new();
        let records = link_abilities(&raw, &BTreeMap::new(), &SpellLists::default(), &mut report);

        let slugs: Vec<_> = records.iter().map(|r| r.ability.slug.as_str()).collect();
        assert_eq!(slugs, vec!["fire-bolt", "learn-ensnare"]);
        assert_eq!(records[0].ability.name, "Fire Bolt");
        assert_eq!(report.count(crate::report::IssueKind::MalformedRecord), 1);
    }

    #[test]
    fn test_dsl_details_take_precedence() {
        let mut source = raw_ability("A000", "Ensnare");
        source.levels.insert(
            1,
            LevelStats {
                cooldown: Some(30.0),
                mana_cost: Some(25.0),
                ..Default::default()
            },
        );

        let mut details = BTreeMap::new();
        details.insert(
            "ensnare".to_string(),
            AbilityDetails {
                ability_id: "ensnare".into(),
                cooldown: Some(20.0),
                hotkey: Some("TOOLTIP_HOTKEY".into()),
                targets_allowed: Some("TargetsAllowed.enemies".into()),
                ..Default::default()
            },
        );

        let mut report = Report::new();
        let records = link_abilities(&[source], &details, &SpellLists::default(), &mut report);
        let ability = &records[0].ability;
        assert_eq!(ability.cooldown, Some(20.0));
        assert_eq!(ability.mana_cost, Some(25.0));
        // placeholders fall back to archive values
        assert_eq!(ability.hotkey.as_deref(), Some("E"));
        assert_eq!(ability.targets_allowed.as_deref(), Some("ground,enemy"));
        assert_eq!(ability.id, "A000");
    }

    #[test]
    fn test_spell_list_membership() {
        let lists = scan_spell_lists(
            "HERO_SPELLS_HUNTER = commaList(ABILITY_ENSNARE)\nNORMAL_SPELLS_TRACKER = commaList(ABILITY_ENSNARE)",
        );
        let mut report = Report::new();
        let records = link_abilities(
            &[raw_ability("A000", "Ensnare")],
            &BTreeMap::new(),
            &lists,
            &mut report,
        );
        let ability = &records[0].ability;
        assert_eq!(ability.available_to_classes, vec!["hunter", "tracker"]);
        assert_eq!(ability.spellbook, Some(SpellType::Hero));
    }

    #[test]
    fn test_slug_by_code() {
        let mut report = Report::new();
        let records = link_abilities(
            &[raw_ability("A000:ANcl", "Cloak"), raw_ability("A000", "Cloak Two")],
            &BTreeMap::new(),
            &SpellLists::default(),
            &mut report,
        );
        let map = ability_slug_by_code(&records);
        assert_eq!(map.get("A000").map(String::as_str), Some("cloak"));
    }
}
