//! # itt
//!
//! Island Troll Tribes object data extraction and normalization.
//!
//! This library turns the game's object data into a content dataset:
//! - Read per-object field overrides dumped from the map archive
//! - Scrape ability, item and class data from `.wurst` source
//! - Resolve recipes, spell lists and the class hierarchy
//! - Classify items and abilities into content categories
//! - Deduplicate and write one JSON collection per entity type
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let inputs = itt::PipelineInputs {
//!     archive_dir: "work/raw".into(),
//!     source_dir: "external/island-troll-tribes/wurst".into(),
//!     category_mappings: Some("config/category-mappings.json".into()),
//!     ..Default::default()
//! };
//!
//! let (dataset, report) = itt::Pipeline::new(inputs).run()?;
//! println!("{} items, {} abilities", dataset.items.len(), dataset.abilities.len());
//! println!("issues: {:?}", report.summary());
//!
//! dataset.write(Path::new("out"), &report)?;
//! # Ok(())
//! # }
//! ```

pub mod classify;
pub mod codec;
pub mod error;
pub mod extract;
pub mod fields;
pub mod merge;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod text;
pub mod xref;

#[doc(inline)]
pub use classify::{CategoryMappings, Classification, Classifier, ClassifierSettings, Tier};
#[doc(inline)]
pub use codec::{decode_object_id, encode_object_id, normalize_object_id, LocalObjectTable};
#[doc(inline)]
pub use error::{Error, Result};
#[doc(inline)]
pub use fields::{get_all_levels, get_field, FieldValue, OverrideRecord};
#[doc(inline)]
pub use model::{
    Ability, AbilityCategory, Building, ClassHierarchy, ClassKind, Item, ItemCategory, Recipe,
    SpellType, TrollClass, Unit, UnitType,
};
#[doc(inline)]
pub use pipeline::{Dataset, MetadataBundle, Pipeline, PipelineInputs, Stage};
#[doc(inline)]
pub use report::{Issue, IssueKind, Report};
#[doc(inline)]
pub use text::{normalize_name, slugify, strip_color_codes, SlugAllocator};
