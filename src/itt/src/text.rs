//! Name, slug and markup helpers shared by every stage

use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::collections::HashSet;

/// Longest slug emitted before truncation kicks in
pub const MAX_SLUG_LEN: usize = 100;

/// Hex digits of the digest appended to truncated slugs
const SLUG_HASH_LEN: usize = 8;

static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());
static COLOR_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\|[cC][0-9a-fA-F]{8}").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static CAMEL_BOUNDARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"([a-z0-9])([A-Z])").unwrap());

/// URL-safe identifier derived from a display name.
///
/// Lowercase, runs of anything outside `[a-z0-9]` become one hyphen, no
/// leading or trailing hyphens. Slugs over [`MAX_SLUG_LEN`] are cut and
/// suffixed with a digest of the full slug so distinct long names stay distinct.
pub fn slugify(name: &str) -> String {
    let lower = name.to_lowercase();
    let slug = NON_ALNUM.replace_all(&lower, "-");
    let slug = slug.trim_matches('-');

    if slug.len() <= MAX_SLUG_LEN {
        return slug.to_string();
    }

    let digest = hex::encode(Sha256::digest(slug.as_bytes()));
    // slug is pure ASCII at this point, byte slicing is safe
    let keep = MAX_SLUG_LEN - SLUG_HASH_LEN - 1;
    let truncated = slug[..keep].trim_end_matches('-');
    format!("{}-{}", truncated, &digest[..SLUG_HASH_LEN])
}

/// Remove in-game colour markup: `|cAARRGGBB`, `|r`, and `|n` line breaks.
pub fn strip_color_codes(text: &str) -> String {
    let stripped = COLOR_CODE.replace_all(text, "");
    stripped
        .replace("|r", "")
        .replace("|R", "")
        .replace("|n", " ")
        .replace("|N", " ")
        .trim()
        .to_string()
}

/// Collapse every whitespace run to one space and trim.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Icon asset name: file name only, `.blp` swapped for `.png`, lowercase.
pub fn convert_icon_path(path: &str) -> Option<String> {
    let path = path.trim();
    if path.is_empty() {
        return None;
    }
    let normalized = path.replace('\\', "/");
    let file = normalized.rsplit('/').next().unwrap_or_default();
    if file.is_empty() {
        return None;
    }
    let lower = file.to_lowercase();
    let converted = match lower.strip_suffix(".blp") {
        Some(stem) => format!("{}.png", stem),
        None => lower,
    };
    Some(converted)
}

/// Matching key for names that share no foreign key: lowercase, apostrophes
/// dropped, whitespace collapsed.
pub fn normalize_name(name: &str) -> String {
    collapse_whitespace(&name.to_lowercase().replace('\'', ""))
}

/// Human label for a generated constant:
/// `LocalObjectIDs_UNIT_MIXING_POT` becomes `Mixing Pot`.
pub fn format_const_name(constant: &str) -> String {
    let mut rest = constant.strip_prefix("LocalObjectIDs_").unwrap_or(constant);
    for prefix in ["UNIT_", "ITEM_", "ABILITY_"] {
        if let Some(stripped) = rest.strip_prefix(prefix) {
            rest = stripped;
            break;
        }
    }
    if rest.is_empty() {
        return constant.to_string();
    }

    rest.to_lowercase()
        .split('_')
        .filter(|s| !s.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// `ABILITY_FIRE_BOLT` -> `fire-bolt`, `WARRIOR` -> `warrior`
pub fn constant_to_slug(constant: &str, prefix: &str) -> String {
    constant
        .strip_prefix(prefix)
        .unwrap_or(constant)
        .to_lowercase()
        .replace('_', "-")
}

/// `ChainLightningDefinition` -> `chain-lightning-definition`
pub fn kebab_case(name: &str) -> String {
    CAMEL_BOUNDARY
        .replace_all(name, "$1-$2")
        .to_lowercase()
        .replace('_', "-")
}

/// Hands out slugs unique within one collection.
///
/// The first claimant of a slug keeps it; later ones get `-2`, `-3`, …
#[derive(Debug, Default)]
pub struct SlugAllocator {
    taken: HashSet<String>,
}

impl SlugAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self, name: &str) -> String {
        let base = slugify(name);
        let base = if base.is_empty() { "unnamed".to_string() } else { base };
        if self.taken.insert(base.clone()) {
            return base;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{}-{}", base, n);
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.taken.contains(slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Iron Axe"), "iron-axe");
        assert_eq!(slugify("  Drunk's Potion!! "), "drunk-s-potion");
        assert_eq!(slugify("Scroll of Fire Ball (Lv. 2)"), "scroll-of-fire-ball-lv-2");
        assert_eq!(slugify("---"), "");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn test_slugify_truncates_long_names() {
        let long = "word ".repeat(40);
        let slug = slugify(&long);
        assert!(slug.len() <= MAX_SLUG_LEN);
        assert!(slug.starts_with("word-word"));
        let (_, hash) = slug.rsplit_once('-').unwrap();
        assert_eq!(hash.len(), 8);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));

        // distinct long names keep distinct slugs
        let other = format!("{}x", long);
        assert_ne!(slugify(&other), slug);
        assert_eq!(slugify(&long), slug);
    }

    #[test]
    fn test_strip_color_codes() {
        assert_eq!(
            strip_color_codes("|cffff0000Hot|r stuff|nnext line"),
            "Hot stuff next line"
        );
        assert_eq!(strip_color_codes("  plain  "), "plain");
    }

    #[test]
    fn test_convert_icon_path() {
        assert_eq!(
            convert_icon_path("ReplaceableTextures\\CommandButtons\\BTNIronAxe.blp"),
            Some("btnironaxe.png".into())
        );
        assert_eq!(convert_icon_path("icons/Fire.PNG"), Some("fire.png".into()));
        assert_eq!(convert_icon_path(""), None);
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Witch  Doctor's   Hut"), "witch doctors hut");
        assert_eq!(normalize_name("MIXING POT"), "mixing pot");
    }

    #[test]
    fn test_format_const_name() {
        assert_eq!(format_const_name("LocalObjectIDs_UNIT_MIXING_POT"), "Mixing Pot");
        assert_eq!(format_const_name("ITEM_IRON_AXE"), "Iron Axe");
        assert_eq!(format_const_name("LocalObjectIDs_"), "LocalObjectIDs_");
    }

    #[test]
    fn test_constant_and_kebab() {
        assert_eq!(constant_to_slug("ABILITY_FIRE_BOLT", "ABILITY_"), "fire-bolt");
        assert_eq!(constant_to_slug("MASTER_HEALER", "ABILITY_"), "master-healer");
        assert_eq!(kebab_case("ChainLightningDefinition"), "chain-lightning-definition");
        assert_eq!(kebab_case("Spell2Book"), "spell2-book");
    }

    #[test]
    fn test_slug_allocator_disambiguates() {
        let mut slugs = SlugAllocator::new();
        assert_eq!(slugs.allocate("Fire!"), "fire");
        assert_eq!(slugs.allocate("Fire?"), "fire-2");
        assert_eq!(slugs.allocate("fire"), "fire-3");
        assert_eq!(slugs.allocate("!!!"), "unnamed");
        assert!(slugs.contains("fire-2"));
    }
}
