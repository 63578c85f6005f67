//! Entity types
//!
//! `raw` holds what the extractors produce, `canonical` what the pipeline
//! emits, and `category` the closed vocabularies both share.

pub mod canonical;
pub mod category;
pub mod raw;

pub use canonical::{
    Ability, Building, ClassHierarchy, DamageRange, Growth, Item, Recipe, TrollClass, Unit,
    VisualEffects,
};
pub use category::{AbilityCategory, ClassKind, ItemCategory, ParseError, SpellType, UnitType};
pub use raw::{
    AbilityDetails, ButtonPosition, ItemDetails, ItemFlags, LevelStats, RawAbility, RawBuilding,
    RawItem, RawRecipe, RawUnit, RecipeRef, UnitFlags,
};
