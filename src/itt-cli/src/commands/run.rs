//! Full pipeline run
//!
//! Resolves inputs from the command line, the environment and the config
//! file (in that order) and hands them to the library pipeline.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use itt::{ClassifierSettings, Pipeline, PipelineInputs, Report};

use crate::config::Config;

const DEFAULT_OUTPUT_DIR: &str = "out";

/// Command-line overrides for one run
#[derive(Debug, Default)]
pub struct RunArgs {
    pub archive_dir: Option<PathBuf>,
    pub source_dir: Option<PathBuf>,
    pub mappings: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub dry_run: bool,
}

fn pick(flag: Option<PathBuf>, configured: &Option<PathBuf>, what: &str) -> Result<PathBuf> {
    flag.or_else(|| configured.clone()).with_context(|| {
        format!(
            "No {} given; pass it on the command line or run `itt config set {} <path>`",
            what, what
        )
    })
}

/// Merge command-line arguments over the config file
pub fn resolve_inputs(args: &RunArgs, config: &Config) -> Result<(PipelineInputs, PathBuf)> {
    let mut settings = ClassifierSettings::default();
    if let Some(len) = config.min_fuzzy_key_len {
        settings.min_fuzzy_key_len = len;
    }

    let inputs = PipelineInputs {
        archive_dir: pick(args.archive_dir.clone(), &config.archive_dir, "archive_dir")?,
        source_dir: pick(args.source_dir.clone(), &config.source_dir, "source_dir")?,
        category_mappings: args
            .mappings
            .clone()
            .or_else(|| config.category_mappings.clone()),
        settings,
    };
    let output = args
        .output
        .clone()
        .or_else(|| config.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
    Ok((inputs, output))
}

fn print_summary(report: &Report) {
    if report.is_empty() {
        println!("No issues");
        return;
    }
    println!("Issues:");
    for (kind, count) in report.summary() {
        println!("  {:?}: {}", kind, count);
    }
    for collection in ["items", "abilities"] {
        let missing = report.missing_categories(collection);
        if !missing.is_empty() {
            println!("  unclassified {}: {}", collection, missing.len());
        }
    }
}

pub fn handle(args: RunArgs) -> Result<()> {
    let config = Config::load()?;
    let (inputs, output) = resolve_inputs(&args, &config)?;
    tracing::debug!(?inputs, output = %output.display(), "resolved inputs");

    let (dataset, report) = Pipeline::new(inputs).run().context("Pipeline failed")?;

    println!(
        "{} items, {} abilities, {} units, {} buildings, {} recipes, {} classes",
        dataset.items.len(),
        dataset.abilities.len(),
        dataset.units.len(),
        dataset.buildings.len(),
        dataset.recipes.len(),
        dataset.classes.base.len() + dataset.classes.derived.len(),
    );
    print_summary(&report);

    if args.dry_run {
        return Ok(());
    }
    write_outputs(&dataset, &report, &output)
}

fn write_outputs(dataset: &itt::Dataset, report: &Report, output: &Path) -> Result<()> {
    dataset
        .write(output, report)
        .with_context(|| format!("Failed to write dataset to {}", output.display()))?;
    println!("Wrote dataset to {}", output.display());
    Ok(())
}
