//! Closed vocabularies used across the dataset.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Invalid item category: {0}")]
    InvalidItemCategory(String),
    #[error("Invalid ability category: {0}")]
    InvalidAbilityCategory(String),
    #[error("Invalid unit type: {0}")]
    InvalidUnitType(String),
}

/// Content category of an item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemCategory {
    RawMaterials,
    Weapons,
    Armor,
    Potions,
    Scrolls,
    Buildings,
    #[default]
    Unknown,
}

impl ItemCategory {
    pub const ALL: &'static [ItemCategory] = &[
        Self::RawMaterials,
        Self::Weapons,
        Self::Armor,
        Self::Potions,
        Self::Scrolls,
        Self::Buildings,
        Self::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RawMaterials => "raw-materials",
            Self::Weapons => "weapons",
            Self::Armor => "armor",
            Self::Potions => "potions",
            Self::Scrolls => "scrolls",
            Self::Buildings => "buildings",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ItemCategory {
    type Err = ParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == lower)
            .ok_or_else(|| ParseError::InvalidItemCategory(s.to_string()))
    }
}

/// Content category of an ability
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbilityCategory {
    Basic,
    Hunter,
    Beastmaster,
    Mage,
    Priest,
    Thief,
    Scout,
    Gatherer,
    Item,
    Building,
    BonusHandler,
    Buff,
    AuraDummy,
    #[default]
    Unknown,
}

impl AbilityCategory {
    pub const ALL: &'static [AbilityCategory] = &[
        Self::Basic,
        Self::Hunter,
        Self::Beastmaster,
        Self::Mage,
        Self::Priest,
        Self::Thief,
        Self::Scout,
        Self::Gatherer,
        Self::Item,
        Self::Building,
        Self::BonusHandler,
        Self::Buff,
        Self::AuraDummy,
        Self::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Hunter => "hunter",
            Self::Beastmaster => "beastmaster",
            Self::Mage => "mage",
            Self::Priest => "priest",
            Self::Thief => "thief",
            Self::Scout => "scout",
            Self::Gatherer => "gatherer",
            Self::Item => "item",
            Self::Building => "building",
            Self::BonusHandler => "bonushandler",
            Self::Buff => "buff",
            Self::AuraDummy => "auradummy",
            Self::Unknown => "unknown",
        }
    }

    /// Categories named after a playable base class
    pub fn is_troll_class(&self) -> bool {
        matches!(
            self,
            Self::Hunter
                | Self::Beastmaster
                | Self::Mage
                | Self::Priest
                | Self::Thief
                | Self::Scout
                | Self::Gatherer
        )
    }

    /// Lenient parse for curated data: `subclass`, `superclass` and anything
    /// unrecognised collapse to `Unknown`.
    pub fn normalize(raw: &str) -> Self {
        raw.parse().unwrap_or(Self::Unknown)
    }
}

impl std::fmt::Display for AbilityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AbilityCategory {
    type Err = ParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == lower)
            .ok_or_else(|| ParseError::InvalidAbilityCategory(s.to_string()))
    }
}

/// Coarse role of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnitType {
    Troll,
    Animal,
    Boss,
    Building,
    Dummy,
    UnitDummyItemReward,
    Other,
}

impl std::fmt::Display for UnitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Troll => "troll",
            Self::Animal => "animal",
            Self::Boss => "boss",
            Self::Building => "building",
            Self::Dummy => "dummy",
            Self::UnitDummyItemReward => "unit-dummy-item-reward",
            Self::Other => "other",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for UnitType {
    type Err = ParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "troll" => Ok(Self::Troll),
            "animal" => Ok(Self::Animal),
            "boss" => Ok(Self::Boss),
            "building" => Ok(Self::Building),
            "dummy" => Ok(Self::Dummy),
            "unit-dummy-item-reward" => Ok(Self::UnitDummyItemReward),
            "other" => Ok(Self::Other),
            _ => Err(ParseError::InvalidUnitType(s.to_string())),
        }
    }
}

/// Tier of the spell list an ability was found in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpellType {
    Hero,
    Normal,
    Basic,
}

/// Position of a class in the hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    Base,
    Subclass,
    Superclass,
}
