//! Name rules for abilities
//!
//! Ordered most specific first; the first rule that matches decides. Each
//! literal is tested against the lowercase name as written and against the
//! slug with spaces turned into hyphens.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::AbilityCategory;

/// Lowercase name and slug of the ability being classified
#[derive(Debug, Clone, Copy)]
pub struct Subject<'a> {
    pub name: &'a str,
    pub slug: &'a str,
}

impl Subject<'_> {
    fn contains(&self, pattern: &str) -> bool {
        self.name.contains(pattern) || self.slug.contains(&pattern.replace(' ', "-"))
    }

    fn starts_with(&self, prefix: &str) -> bool {
        self.name.starts_with(prefix) || self.slug.starts_with(&prefix.replace(' ', "-"))
    }

    fn contains_any(&self, patterns: &[&str]) -> bool {
        patterns.iter().any(|p| self.contains(p))
    }

    fn starts_with_any(&self, prefixes: &[&str]) -> bool {
        prefixes.iter().any(|p| self.starts_with(p))
    }
}

pub struct PatternRule {
    pub category: AbilityCategory,
    pub matches: fn(&Subject<'_>) -> bool,
}

static STAT_WITH_PLUS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(strength|agility|intelligence|all\s*stats).*[+\d]|[+\d].*(strength|agility|intelligence|all\s*stats)",
    )
    .unwrap()
});

const POTIONS: &[&str] = &[
    "anti-magic potion",
    "disease potion",
    "drunk's potion",
    "drunks potion",
    "fervor potion",
    "omnicure potion",
];

const MELTABLES: &[&str] = &["river root", "native herb", "exotic herb", "everything"];

const SCOUT: &[&str] = &[
    "reveal",
    "bird of prey",
    "bring down",
    "eagle sight",
    "dream vision",
    "advanced scout radar",
];

const MAGE: &[&str] = &["firebolt", "metronome", "reduce food", "flame spray", "depress"];

const PRIEST: &[&str] = &[
    "angelic elemental",
    "lightning shield",
    "spirit link",
    "self preservation",
    "open light gate",
    "maximum fervor",
    "anti-magic shield",
    "healing wave",
    "magic mist",
    "ranged heal",
    "pump up",
    "anchor soul",
    "anti-magic shell",
    "replenish energy",
    "reincarnation",
    "priest inherited spells",
    "replenish health",
];

const BEASTMASTER: &[&str] = &[
    "friend of the hive",
    "release pet",
    "omivore",
    "omnivore",
    "voracious bear",
    "hibernate",
    "pet sleep",
    "grow pet",
    "tame pet",
    "wolf life steal",
];

const BUFF: &[&str] = &[
    "armor bonus",
    "movement speed bonus",
    "attack speed increase",
    "attack speed reduction",
    "attack damage bonus",
];

pub const ABILITY_RULES: &[PatternRule] = &[
    PatternRule {
        category: AbilityCategory::AuraDummy,
        matches: |s| s.starts_with_any(&["aura dummy:", "aura-dummy:"]),
    },
    PatternRule {
        category: AbilityCategory::BonusHandler,
        matches: |s| s.starts_with("bonushandler"),
    },
    PatternRule {
        category: AbilityCategory::Building,
        matches: |s| s.starts_with("quick make") || s.slug.starts_with("qm-"),
    },
    PatternRule {
        category: AbilityCategory::Gatherer,
        matches: |s| s.starts_with("find "),
    },
    PatternRule {
        category: AbilityCategory::Item,
        matches: |s| {
            s.starts_with_any(&["scroll of", "restore"])
                || s.name == "full heal"
                || s.slug == "full-heal"
                || s.contains_any(POTIONS)
        },
    },
    PatternRule {
        category: AbilityCategory::Building,
        matches: |s| {
            s.contains_any(&["pack up", "mud hut", "resilience"])
                || (s.starts_with("melt ") && s.contains_any(MELTABLES))
        },
    },
    PatternRule {
        category: AbilityCategory::Scout,
        matches: |s| s.contains_any(SCOUT),
    },
    PatternRule {
        category: AbilityCategory::Mage,
        matches: |s| {
            s.contains_any(MAGE)
                || (s.name.contains("summon") && (s.name.contains("rune") || s.slug.contains("rune")))
        },
    },
    PatternRule {
        category: AbilityCategory::Priest,
        matches: |s| {
            s.contains_any(PRIEST)
                || (s.name.contains("mix ")
                    && ["energy", "heat", "health"].iter().any(|w| s.name.contains(w)))
                || ["mix-energy", "mix-heat", "mix-health"].iter().any(|w| s.slug.contains(w))
        },
    },
    PatternRule {
        category: AbilityCategory::Gatherer,
        matches: |s| {
            s.contains_any(&["gatherer salves", "item warp"])
                || (s.name.starts_with("recipe:") && s.name.contains("salve"))
                || (s.slug.starts_with("recipe-") && s.slug.contains("salve"))
        },
    },
    PatternRule {
        category: AbilityCategory::Beastmaster,
        matches: |s| {
            s.contains_any(BEASTMASTER)
                || (s.contains("transform")
                    && ["wolf", "bear", "panther", "tiger"]
                        .iter()
                        .any(|a| s.name.contains(a) || s.slug.contains(a)))
        },
    },
    PatternRule {
        category: AbilityCategory::Basic,
        matches: |s| s.contains_any(&["collect meat", "cook meat", "cook and collect meat"]),
    },
    PatternRule {
        category: AbilityCategory::Buff,
        matches: |s| {
            s.contains_any(BUFF) || STAT_WITH_PLUS.is_match(s.name) || STAT_WITH_PLUS.is_match(s.slug)
        },
    },
    PatternRule {
        category: AbilityCategory::Hunter,
        matches: |s| s.contains("sniff"),
    },
];

/// Category of the first rule matching `(slug, name)`
pub fn match_ability_rules(slug: &str, name: &str) -> Option<AbilityCategory> {
    let name = name.to_lowercase();
    let slug = slug.to_lowercase();
    let subject = Subject {
        name: &name,
        slug: &slug,
    };
    ABILITY_RULES
        .iter()
        .find(|rule| (rule.matches)(&subject))
        .map(|rule| rule.category)
}

static INTERNAL_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{2,}[A-Za-z0-9]*[:|][A-Za-z0-9]").unwrap());
static DOLLAR_IDENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\$[a-z]").unwrap());
static SHORT_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z0-9|:]{2,6}$").unwrap());

/// Names that are internal identifiers rather than player-facing text
pub fn is_garbage_ability_name(name: &str) -> bool {
    let trimmed = name.trim();
    trimmed.chars().count() <= 2
        || INTERNAL_CODE.is_match(trimmed)
        || DOLLAR_IDENT.is_match(trimmed)
        || SHORT_CODE.is_match(trimmed)
}
