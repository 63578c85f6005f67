//! One-shot lookups: id codec, slugs and classification

use std::path::Path;

use anyhow::{bail, Result};
use itt::{
    decode_object_id, encode_object_id, slugify, CategoryMappings, Classifier,
    ClassifierSettings, Report,
};

use crate::config::Config;

pub fn decode(value: f64) -> Result<()> {
    match decode_object_id(value) {
        Some(code) => println!("{}", code),
        None => bail!("{} does not decode to an object code", value),
    }
    Ok(())
}

pub fn encode(code: &str) -> Result<()> {
    match encode_object_id(code) {
        Some(value) => println!("{}", value),
        None => bail!("{:?} is not a four character object code", code),
    }
    Ok(())
}

pub fn slug(name: &str) {
    println!("{}", slugify(name));
}

fn classifier(mappings: Option<&Path>) -> Result<Classifier> {
    let config = Config::load()?;
    let mut settings = ClassifierSettings::default();
    if let Some(len) = config.min_fuzzy_key_len {
        settings.min_fuzzy_key_len = len;
    }

    let mut report = Report::new();
    let path = mappings.or(config.category_mappings.as_deref());
    let mappings = match path {
        Some(path) => CategoryMappings::load(path, &mut report),
        None => CategoryMappings::default(),
    };
    for issue in &report.issues {
        tracing::warn!(subject = %issue.subject, "{}", issue.detail);
    }
    Ok(Classifier::new(&mappings, settings))
}

pub fn classify_ability(name: &str, mappings: Option<&Path>) -> Result<()> {
    let result = classifier(mappings)?.classify_ability(&slugify(name), name);
    println!("{} ({:?})", result.category, result.tier);
    if let Some(class) = result.class_requirement {
        println!("class requirement: {}", class);
    }
    Ok(())
}

pub fn classify_item(name: &str, id: &str, mappings: Option<&Path>) -> Result<()> {
    let result = classifier(mappings)?.classify_item(name, id);
    println!("{} ({:?})", result.category, result.tier);
    Ok(())
}
