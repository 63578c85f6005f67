//! Troll class hierarchy
//!
//! Class units are picked out of the unit table by name. Base classes list
//! their derived classes from a fixed relation table; derived classes point
//! back at their base class through the same table.

use std::collections::BTreeMap;

use crate::model::{ClassHierarchy, ClassKind, Growth, RawUnit, TrollClass};
use crate::report::Report;
use crate::text::{collapse_whitespace, slugify, strip_color_codes};

/// Base class -> (subclasses, superclass)
pub const CLASS_RELATIONSHIPS: &[(&str, &[&str], &str)] = &[
    ("hunter", &["gurubashi-warrior", "tracker"], "gurubashi-champion"),
    ("mage", &["elementalist", "hypnotist", "dreamwalker"], "dementia-master"),
    ("priest", &["booster", "master-healer"], "sage"),
    (
        "beastmaster",
        &["druid", "shapeshifter", "dire-wolf", "dire-bear"],
        "jungle-tyrant",
    ),
    (
        "thief",
        &["rogue", "escape-artist", "contortionist", "telethief"],
        "assassin",
    ),
    ("scout", &["observer", "trapper", "hawk"], "spy"),
    (
        "gatherer",
        &["radar-gatherer", "herb-master", "alchemist"],
        "omni-gatherer",
    ),
];

const BASE_NAMES: &[&str] = &[
    "Hunter",
    "Mage",
    "Priest",
    "Beastmaster",
    "Thief",
    "Scout",
    "Gatherer",
];

const SUBCLASS_NAMES: &[&str] = &[
    "Warrior",
    "Tracker",
    "Elementalist",
    "Hypnotist",
    "Dreamwalker",
    "Booster",
    "Master Healer",
    "Druid",
    "Rogue",
    "Observer",
    "Trapper",
    "Radar Gatherer",
    "Herb Master",
    "Alchemist",
];

const SUPERCLASS_NAMES: &[&str] = &[
    "Juggernaut",
    "Gurubashi Champion",
    "Dementia Master",
    "Sage",
    "Jungle Tyrant",
    "Assassin",
    "Spy",
    "Omnigatherer",
    "Omni-Gatherer",
    "Omni Gatherer",
];

/// Units whose names look like classes but are not
const CLASS_EXCLUSIONS: &[&str] = &["Mage Fire", "Hawk Hatchling", "Tamed Hawk", "Alpha Hawk"];

const DEFAULT_HP: f64 = 192.0;
const DEFAULT_MANA: f64 = 192.0;
const DEFAULT_MOVE_SPEED: f64 = 290.0;
const DEFAULT_ATTACK_SPEED: f64 = 1.5;

/// Class kind from a unit name; exact names first, then prefix and substring matches
pub fn class_kind(name: &str) -> Option<ClassKind> {
    if CLASS_EXCLUSIONS.contains(&name) {
        return None;
    }
    if BASE_NAMES.contains(&name) {
        return Some(ClassKind::Base);
    }
    if SUBCLASS_NAMES.contains(&name) {
        return Some(ClassKind::Subclass);
    }
    if SUPERCLASS_NAMES.contains(&name) {
        return Some(ClassKind::Superclass);
    }

    let lower = name.to_lowercase();
    if BASE_NAMES.iter().map(|n| n.to_lowercase()).any(|n| {
        lower == n || lower.starts_with(&format!("{} ", n))
    }) {
        return Some(ClassKind::Base);
    }
    if SUBCLASS_NAMES
        .iter()
        .any(|n| lower.contains(&n.to_lowercase()))
    {
        return Some(ClassKind::Subclass);
    }
    if SUPERCLASS_NAMES
        .iter()
        .any(|n| lower.contains(&n.to_lowercase()))
    {
        return Some(ClassKind::Superclass);
    }
    None
}

/// Base class and kind for a derived class slug, from the relation table
pub fn derived_parent(slug: &str) -> Option<(&'static str, ClassKind)> {
    CLASS_RELATIONSHIPS.iter().find_map(|(base, subs, sup)| {
        if subs.contains(&slug) {
            Some((*base, ClassKind::Subclass))
        } else if *sup == slug {
            Some((*base, ClassKind::Superclass))
        } else {
            None
        }
    })
}

fn relations_of(base: &str) -> (Vec<String>, Vec<String>) {
    CLASS_RELATIONSHIPS
        .iter()
        .find(|(b, _, _)| *b == base)
        .map(|(_, subs, sup)| {
            (
                subs.iter().map(|s| s.to_string()).collect(),
                vec![sup.to_string()],
            )
        })
        .unwrap_or_default()
}

fn summary(name: &str, slug: &str, tooltip: &str, descriptions: &BTreeMap<String, String>) -> String {
    if let Some(description) = descriptions.get(slug) {
        return description.clone();
    }
    let cleaned = collapse_whitespace(&strip_color_codes(tooltip));
    if cleaned.is_empty() {
        format!("{} class description coming soon.", name)
    } else {
        cleaned
    }
}

fn class_from_unit(
    unit: &RawUnit,
    slug: String,
    kind: ClassKind,
    descriptions: &BTreeMap<String, String>,
) -> TrollClass {
    let name = unit.name.trim().to_string();
    TrollClass {
        summary: summary(&name, &slug, &unit.tooltip, descriptions),
        unit_id: unit.id.clone(),
        kind,
        parent: None,
        subclasses: Vec::new(),
        superclasses: Vec::new(),
        growth: Growth {
            strength: unit.strength.filter(|v| *v != 0.0).unwrap_or(1.0),
            agility: unit.agility.filter(|v| *v != 0.0).unwrap_or(1.0),
            intelligence: unit.intelligence.filter(|v| *v != 0.0).unwrap_or(1.0),
        },
        base_hp: unit.hp.filter(|v| *v != 0.0).unwrap_or(DEFAULT_HP),
        base_mana: unit.mana.filter(|v| *v != 0.0).unwrap_or(DEFAULT_MANA),
        base_move_speed: unit.move_speed.filter(|v| *v != 0.0).unwrap_or(DEFAULT_MOVE_SPEED),
        base_attack_speed: DEFAULT_ATTACK_SPEED,
        name,
        slug,
    }
}

/// Build the class hierarchy from the unit table.
///
/// The first unit per class slug wins. Derived classes resolve their parent
/// through [`CLASS_RELATIONSHIPS`], then through the unit to base class
/// table; those that resolve through neither are kept without a parent and
/// reported.
pub fn build_class_hierarchy(
    units: &[RawUnit],
    descriptions: &BTreeMap<String, String>,
    base_classes: &BTreeMap<String, String>,
    report: &mut Report,
) -> ClassHierarchy {
    let mut hierarchy = ClassHierarchy::default();
    let mut seen: Vec<String> = Vec::new();

    for unit in units {
        let name = unit.name.trim();
        let lower = name.to_lowercase();
        if name.is_empty() || ["indicator", "holder", "dummy"].iter().any(|k| lower.contains(k)) {
            continue;
        }
        let Some(kind) = class_kind(name) else {
            continue;
        };
        let slug = slugify(name);
        if slug.is_empty() || seen.contains(&slug) {
            continue;
        }
        seen.push(slug.clone());

        let mut class = class_from_unit(unit, slug, kind, descriptions);
        if kind == ClassKind::Base {
            let (subclasses, superclasses) = relations_of(&class.slug);
            class.subclasses = subclasses;
            class.superclasses = superclasses;
            hierarchy.base.push(class);
            continue;
        }

        let parent = derived_parent(&class.slug)
            .map(|(base, table_kind)| {
                class.kind = table_kind;
                base.to_string()
            })
            .or_else(|| {
                base_classes
                    .get(name)
                    .or_else(|| base_classes.get(&lower))
                    .cloned()
            });
        match parent {
            Some(parent) => class.parent = Some(parent),
            None => {
                report.unresolved(
                    format!("classes:{}", class.slug),
                    "derived class has no base class",
                );
                hierarchy.unresolved.push(class.slug.clone());
            }
        }
        hierarchy.derived.push(class);
    }

    tracing::info!(
        base = hierarchy.base.len(),
        derived = hierarchy.derived.len(),
        unresolved = hierarchy.unresolved.len(),
        "built class hierarchy"
    );
    hierarchy
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(id: &str, name: &str) -> RawUnit {
        RawUnit {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_class_kind() {
        assert_eq!(class_kind("Hunter"), Some(ClassKind::Base));
        assert_eq!(class_kind("Mage Apprentice"), Some(ClassKind::Base));
        assert_eq!(class_kind("Mage Fire"), None);
        assert_eq!(class_kind("Gurubashi Warrior"), Some(ClassKind::Subclass));
        assert_eq!(class_kind("Omni Gatherer"), Some(ClassKind::Superclass));
        assert_eq!(class_kind("Elk"), None);
    }

    #[test]
    fn test_derived_parent() {
        assert_eq!(derived_parent("tracker"), Some(("hunter", ClassKind::Subclass)));
        assert_eq!(derived_parent("spy"), Some(("scout", ClassKind::Superclass)));
        assert_eq!(derived_parent("juggernaut"), None);
    }

    #[test]
    fn test_hierarchy() {
        let mut hunter = unit("H000", "Hunter");
        hunter.hp = Some(250.0);
        hunter.tooltip = "|cffffcc00Tracks|r   prey".into();
        let units = vec![
            hunter,
            unit("H001", "Tracker"),
            unit("H002", "Juggernaut"),
            unit("H003", "Warrior"),
            unit("H004", "Hunter"),
            unit("H005", "Mage Fire"),
            unit("H006", "Hunter Dummy"),
        ];
        let descriptions: BTreeMap<String, String> =
            [("tracker".to_string(), "Follows tracks.".to_string())].into_iter().collect();
        let base_classes: BTreeMap<String, String> =
            [("Juggernaut".to_string(), "hunter".to_string())].into_iter().collect();

        let mut report = Report::new();
        let hierarchy = build_class_hierarchy(&units, &descriptions, &base_classes, &mut report);

        assert_eq!(hierarchy.base.len(), 1);
        let base = &hierarchy.base[0];
        assert_eq!(base.slug, "hunter");
        assert_eq!(base.base_hp, 250.0);
        assert_eq!(base.base_mana, 192.0);
        assert_eq!(base.summary, "Tracks prey");
        assert_eq!(base.subclasses, vec!["gurubashi-warrior", "tracker"]);
        assert_eq!(base.superclasses, vec!["gurubashi-champion"]);

        let derived: Vec<_> = hierarchy
            .derived
            .iter()
            .map(|c| (c.slug.as_str(), c.parent.as_deref()))
            .collect();
        assert_eq!(
            derived,
            vec![
                ("tracker", Some("hunter")),
                ("juggernaut", Some("hunter")),
                ("warrior", None),
            ]
        );
        assert_eq!(hierarchy.derived[0].summary, "Follows tracks.");
        assert_eq!(
            hierarchy.derived[2].summary,
            "Warrior class description coming soon."
        );
        assert_eq!(hierarchy.unresolved, vec!["warrior"]);
    }
}
