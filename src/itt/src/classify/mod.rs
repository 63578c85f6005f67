//! Category classifier
//!
//! Layered decision over fixed tiers, first hit wins:
//!
//! 1. explicit tag on the record
//! 2. name rules ([`patterns`])
//! 3. exact curated lookup
//! 4. substring match against curated keys
//! 5. `unknown`, recorded as a classification miss
//!
//! All lookup tables are ordered maps, so results never depend on the order
//! in which entities are processed.

pub mod mappings;
pub mod patterns;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::{AbilityCategory, ItemCategory, RawAbility, RawItem};
use crate::report::Report;
use crate::text::slugify;

pub use mappings::{CategoryMappings, ClassifierSettings};
pub use patterns::{is_garbage_ability_name, match_ability_rules};

/// Tier that produced a classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tier {
    ExplicitTag,
    Pattern,
    Curated,
    Fuzzy,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification<C> {
    pub category: C,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_requirement: Option<AbilityCategory>,
    pub tier: Tier,
}

impl<C> Classification<C> {
    pub fn is_unknown(&self) -> bool {
        self.tier == Tier::Unknown
    }
}

impl Classification<AbilityCategory> {
    fn ability(category: AbilityCategory, tier: Tier) -> Self {
        Self {
            category,
            class_requirement: category.is_troll_class().then_some(category),
            tier,
        }
    }
}

impl Classification<ItemCategory> {
    fn item(category: ItemCategory, tier: Tier) -> Self {
        Self {
            category,
            class_requirement: None,
            tier,
        }
    }
}

/// Category assignment for items and abilities.
///
/// Built once from the curated mappings plus whatever the extractors learned
/// (spell list categories, item names), then used read-only.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    settings: ClassifierSettings,
    items: BTreeMap<String, ItemCategory>,
    abilities: BTreeMap<String, AbilityCategory>,
    /// Lookup key -> canonical lowercase item name
    item_names: BTreeMap<String, String>,
}

impl Classifier {
    pub fn new(mappings: &CategoryMappings, settings: ClassifierSettings) -> Self {
        let mut items = BTreeMap::new();
        for (key, value) in &mappings.items {
            match value.parse::<ItemCategory>() {
                Ok(category) => {
                    items.insert(key.to_lowercase(), category);
                }
                Err(e) => tracing::debug!(key = %key, "ignoring curated item entry: {}", e),
            }
        }

        let abilities = mappings
            .abilities
            .iter()
            .map(|(key, value)| (key.to_lowercase(), AbilityCategory::normalize(value)))
            .collect();

        Self {
            settings,
            items,
            abilities,
            item_names: BTreeMap::new(),
        }
    }

    /// Seed the ability table with spell list categories. Curated entries
    /// already present win on conflict.
    pub fn with_spell_categories(mut self, categories: &BTreeMap<String, AbilityCategory>) -> Self {
        for (key, category) in categories {
            self.abilities
                .entry(key.to_lowercase())
                .or_insert(*category);
        }
        self
    }

    /// Item name map from the generated script, used to canonicalise names
    pub fn with_item_names(mut self, names: BTreeMap<String, String>) -> Self {
        self.item_names = names
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v.to_lowercase()))
            .collect();
        self
    }

    pub fn settings(&self) -> ClassifierSettings {
        self.settings
    }

    fn fuzzy_eligible(&self, s: &str) -> bool {
        s.chars().count() >= self.settings.min_fuzzy_key_len
    }

    /// First curated key contained in `needle` or containing it
    fn fuzzy<'a, C: Copy>(&self, table: &'a BTreeMap<String, C>, needle: &str) -> Option<C> {
        if !self.fuzzy_eligible(needle) {
            return None;
        }
        table
            .iter()
            .filter(|(key, _)| self.fuzzy_eligible(key))
            .find(|(key, _)| needle.contains(key.as_str()) || key.contains(needle))
            .map(|(_, category)| *category)
    }

    // ========================================================================
    // Abilities
    // ========================================================================

    /// Classify by slug and display name (tiers 2 through 5).
    pub fn classify_ability(&self, slug: &str, name: &str) -> Classification<AbilityCategory> {
        let slug = slug.to_lowercase();
        if slug.is_empty() {
            return Classification::ability(AbilityCategory::Unknown, Tier::Unknown);
        }

        if let Some(category) = match_ability_rules(&slug, name) {
            return Classification::ability(category, Tier::Pattern);
        }

        let stripped = slug.strip_prefix("ability-");
        let prefixed = format!("ability-{}", slug);
        let curated = self
            .abilities
            .get(&slug)
            .or_else(|| stripped.and_then(|s| self.abilities.get(s)))
            .or_else(|| {
                if stripped.is_none() {
                    self.abilities.get(&prefixed)
                } else {
                    None
                }
            });
        if let Some(category) = curated {
            return Classification::ability(*category, Tier::Curated);
        }

        if let Some(category) = self.fuzzy(&self.abilities, &slug) {
            return Classification::ability(category, Tier::Fuzzy);
        }

        Classification::ability(AbilityCategory::Unknown, Tier::Unknown)
    }

    /// Classify an extracted ability under its resolved slug and name.
    ///
    /// An explicit tag or the item flag decides outright. A miss on the name
    /// slug is retried with the id slug before it is recorded.
    pub fn classify_raw_ability(
        &self,
        ability: &RawAbility,
        slug: &str,
        name: &str,
        report: &mut Report,
    ) -> Classification<AbilityCategory> {
        if let Some(tag) = ability.category.as_deref() {
            if let Ok(category) = tag.parse::<AbilityCategory>() {
                return Classification::ability(category, Tier::ExplicitTag);
            }
        }
        if ability.item {
            return Classification {
                category: AbilityCategory::Item,
                class_requirement: None,
                tier: Tier::ExplicitTag,
            };
        }

        let result = self.classify_ability(slug, name);
        if !result.is_unknown() {
            return result;
        }

        let id_slug = slugify(&ability.id);
        if !id_slug.is_empty() && id_slug != slug {
            let retry = self.classify_ability(&id_slug, name);
            if !retry.is_unknown() {
                return retry;
            }
        }

        report.classification_miss("abilities", slug);
        result
    }

    // ========================================================================
    // Items
    // ========================================================================

    /// Classify an item by name and object code.
    ///
    /// Curated lookup order: canonical name from the item name map, lowercase
    /// name, name slug, id slug. Items have no name rules.
    pub fn classify_item(&self, name: &str, id: &str) -> Classification<ItemCategory> {
        let lower = name.trim().to_lowercase();
        let name_slug = slugify(name);
        let id_slug = slugify(id);

        let canonical = [&id_slug, &name_slug, &lower]
            .into_iter()
            .filter(|k| !k.is_empty())
            .find_map(|k| self.item_names.get(k.as_str()))
            .cloned()
            .unwrap_or_else(|| lower.clone());

        let curated = [&canonical, &lower, &name_slug, &id_slug]
            .into_iter()
            .filter(|k| !k.is_empty())
            .find_map(|k| self.items.get(k.as_str()));
        if let Some(category) = curated {
            return Classification::item(*category, Tier::Curated);
        }

        if let Some(category) = self.fuzzy(&self.items, &lower) {
            return Classification::item(category, Tier::Fuzzy);
        }

        Classification::item(ItemCategory::Unknown, Tier::Unknown)
    }

    /// Classify an extracted item; an explicit tag in the allowed set wins.
    pub fn classify_raw_item(
        &self,
        item: &RawItem,
        slug: &str,
        report: &mut Report,
    ) -> Classification<ItemCategory> {
        if let Some(category) = item.category.as_deref().and_then(|t| t.parse().ok()) {
            return Classification::item(category, Tier::ExplicitTag);
        }
        let result = self.classify_item(&item.name, &item.id);
        if result.is_unknown() {
            report.classification_miss("items", slug);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> Classifier {
        let mut mappings = CategoryMappings::default();
        mappings.items.insert("iron axe".into(), "weapons".into());
        mappings.items.insert("tinder".into(), "raw-materials".into());
        mappings.items.insert("bogus".into(), "food".into());
        mappings.abilities.insert("ensnare".into(), "hunter".into());
        mappings.abilities.insert("ability-cloak".into(), "thief".into());
        mappings.abilities.insert("evolve".into(), "subclass".into());
        mappings.abilities.insert("track".into(), "scout".into());

        let mut spells = BTreeMap::new();
        spells.insert("track".to_string(), AbilityCategory::Hunter);
        spells.insert("blink".to_string(), AbilityCategory::Thief);

        let mut names = BTreeMap::new();
        names.insert("i001".to_string(), "iron axe".to_string());

        Classifier::new(&mappings, ClassifierSettings::default())
            .with_spell_categories(&spells)
            .with_item_names(names)
    }

    #[test]
    fn test_ability_tiers() {
        let c = classifier();

        let exact = c.classify_ability("ensnare", "Ensnare");
        assert_eq!(exact.category, AbilityCategory::Hunter);
        assert_eq!(exact.tier, Tier::Curated);
        assert_eq!(exact.class_requirement, Some(AbilityCategory::Hunter));

        let prefixed = c.classify_ability("cloak", "Cloak");
        assert_eq!(prefixed.category, AbilityCategory::Thief);
        assert_eq!(prefixed.tier, Tier::Curated);

        let fuzzy = c.classify_ability("greater-blink", "Greater Blink");
        assert_eq!(fuzzy.category, AbilityCategory::Thief);
        assert_eq!(fuzzy.tier, Tier::Fuzzy);

        let pattern = c.classify_ability("ensnare-sniff", "Ensnare Sniff");
        assert_eq!(pattern.tier, Tier::Pattern);

        let normalized = c.classify_ability("evolve", "Evolve");
        assert_eq!(normalized.category, AbilityCategory::Unknown);
        assert_eq!(normalized.tier, Tier::Curated);
        assert_eq!(normalized.class_requirement, None);
    }

    #[test]
    fn test_curated_file_beats_spell_lists() {
        let c = classifier();
        assert_eq!(c.classify_ability("track", "Track").category, AbilityCategory::Scout);
    }

    #[test]
    fn test_short_slugs_skip_fuzzy() {
        let c = classifier();
        assert!(c.classify_ability("bl", "Bl").is_unknown());
    }

    #[test]
    fn test_raw_ability_flags_and_retry() {
        let c = classifier();
        let mut report = Report::new();

        let item = RawAbility {
            id: "AIh1".into(),
            item: true,
            ..Default::default()
        };
        let result = c.classify_raw_ability(&item, "heal", "Heal", &mut report);
        assert_eq!(result.category, AbilityCategory::Item);
        assert_eq!(result.tier, Tier::ExplicitTag);

        // a direct tag beats both the item flag and the curated table
        let tagged = RawAbility {
            id: "A0EN".into(),
            category: Some("scout".into()),
            item: true,
            ..Default::default()
        };
        let result = c.classify_raw_ability(&tagged, "ensnare", "Ensnare", &mut report);
        assert_eq!(result.category, AbilityCategory::Scout);
        assert_eq!(result.tier, Tier::ExplicitTag);
        assert_eq!(result.class_requirement, Some(AbilityCategory::Scout));

        let by_id = RawAbility {
            id: "Ensnare".into(),
            ..Default::default()
        };
        let result = c.classify_raw_ability(&by_id, "mystery", "Mystery", &mut report);
        assert_eq!(result.category, AbilityCategory::Hunter);
        assert!(report.is_empty());

        let lost = RawAbility {
            id: "A0ZZ".into(),
            ..Default::default()
        };
        let result = c.classify_raw_ability(&lost, "zzz-ray", "Zzz Ray", &mut report);
        assert!(result.is_unknown());
        assert!(report.missing_categories("abilities").contains("zzz-ray"));
    }

    #[test]
    fn test_item_lookup_order() {
        let c = classifier();
        let mut report = Report::new();

        // canonical name through the id
        let renamed = RawItem {
            id: "I001".into(),
            name: "Axe (Iron)".into(),
            ..Default::default()
        };
        assert_eq!(
            c.classify_raw_item(&renamed, "axe-iron", &mut report).category,
            ItemCategory::Weapons
        );

        let tagged = RawItem {
            id: "I002".into(),
            name: "Whatever".into(),
            category: Some("Potions".into()),
            ..Default::default()
        };
        let result = c.classify_raw_item(&tagged, "whatever", &mut report);
        assert_eq!(result.category, ItemCategory::Potions);
        assert_eq!(result.tier, Tier::ExplicitTag);

        let fuzzy = c.classify_item("Tinder Box", "I003");
        assert_eq!(fuzzy.category, ItemCategory::RawMaterials);
        assert_eq!(fuzzy.tier, Tier::Fuzzy);

        // invalid curated values never match
        assert!(c.classify_item("Bogus", "I004").is_unknown());
        assert!(report.is_empty());
    }

    #[test]
    fn test_classification_is_deterministic() {
        let a = classifier();
        let b = classifier();
        for (slug, name) in [("greater-blink", "Greater Blink"), ("zzz", "Zzz"), ("track", "Track")] {
            assert_eq!(a.classify_ability(slug, name), b.classify_ability(slug, name));
            assert_eq!(a.classify_ability(slug, name), a.classify_ability(slug, name));
        }
    }
}
