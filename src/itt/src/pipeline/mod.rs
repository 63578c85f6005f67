//! Staged pipeline
//!
//! Four stages run strictly in order: extract, cross-reference, classify,
//! merge. Each consumes the complete output of the previous one. Running a
//! stage early or twice is an error; everything else that goes wrong is
//! collected in the [`Report`].

pub mod assemble;
pub mod dataset;

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::classify::{CategoryMappings, Classifier, ClassifierSettings};
use crate::error::{Error, Result};
use crate::extract::{extract_all, Extraction};
use crate::report::Report;
use crate::xref::{cross_reference, Linked};

pub use dataset::{Dataset, MetadataBundle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Extract,
    CrossReference,
    Classify,
    Merge,
}

impl Stage {
    pub const ALL: &'static [Stage] = &[
        Stage::Extract,
        Stage::CrossReference,
        Stage::Classify,
        Stage::Merge,
    ];

    /// Stage that must have completed before this one may run
    pub fn requires(self) -> Option<Stage> {
        match self {
            Stage::Extract => None,
            Stage::CrossReference => Some(Stage::Extract),
            Stage::Classify => Some(Stage::CrossReference),
            Stage::Merge => Some(Stage::Classify),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Extract => "extract",
            Stage::CrossReference => "cross-reference",
            Stage::Classify => "classify",
            Stage::Merge => "merge",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the pipeline reads from
#[derive(Debug, Clone, Default)]
pub struct PipelineInputs {
    /// Object tables and `war3map.j`
    pub archive_dir: PathBuf,
    /// `.wurst` source tree
    pub source_dir: PathBuf,
    /// Curated `category-mappings.json`; `None` runs without curated data
    pub category_mappings: Option<PathBuf>,
    pub settings: ClassifierSettings,
}

/// One pipeline run
#[derive(Debug)]
pub struct Pipeline {
    inputs: PipelineInputs,
    report: Report,
    completed: Vec<Stage>,
    extraction: Option<Extraction>,
    linked: Option<Linked>,
    dataset: Option<Dataset>,
}

impl Pipeline {
    pub fn new(inputs: PipelineInputs) -> Self {
        Self {
            inputs,
            report: Report::new(),
            completed: Vec::new(),
            extraction: None,
            linked: None,
            dataset: None,
        }
    }

    pub fn report(&self) -> &Report {
        &self.report
    }

    pub fn completed(&self) -> &[Stage] {
        &self.completed
    }

    fn begin(&self, stage: Stage) -> Result<()> {
        if self.completed.contains(&stage) {
            return Err(Error::StageRepeated(stage));
        }
        if let Some(missing) = stage.requires() {
            if !self.completed.contains(&missing) {
                return Err(Error::StageOrder { stage, missing });
            }
        }
        tracing::info!(%stage, "starting stage");
        Ok(())
    }

    fn finish(&mut self, stage: Stage) {
        self.completed.push(stage);
    }

    /// Read every input. Fails only when there are no items or no abilities.
    pub fn extract(&mut self) -> Result<&Extraction> {
        self.begin(Stage::Extract)?;
        let extraction = extract_all(
            &self.inputs.archive_dir,
            &self.inputs.source_dir,
            &mut self.report,
        );
        if extraction.items.is_empty() {
            return Err(Error::MissingCoreData("item"));
        }
        if extraction.abilities.is_empty() {
            return Err(Error::MissingCoreData("ability"));
        }
        self.finish(Stage::Extract);
        Ok(self.extraction.insert(extraction))
    }

    pub fn cross_reference(&mut self) -> Result<&Linked> {
        self.begin(Stage::CrossReference)?;
        let Some(extraction) = self.extraction.as_ref() else {
            return Err(Error::StageOrder {
                stage: Stage::CrossReference,
                missing: Stage::Extract,
            });
        };
        let linked = cross_reference(extraction, &mut self.report);
        self.finish(Stage::CrossReference);
        Ok(self.linked.insert(linked))
    }

    /// Assign a category to every item and ability.
    pub fn classify(&mut self) -> Result<&Linked> {
        self.begin(Stage::Classify)?;
        let (Some(extraction), Some(linked)) = (self.extraction.as_ref(), self.linked.as_mut())
        else {
            return Err(Error::StageOrder {
                stage: Stage::Classify,
                missing: Stage::CrossReference,
            });
        };

        let mappings = match self.inputs.category_mappings.as_deref() {
            Some(path) => CategoryMappings::load(path, &mut self.report),
            None => CategoryMappings::default(),
        };
        let classifier = Classifier::new(&mappings, self.inputs.settings)
            .with_spell_categories(&extraction.spell_lists.category_map())
            .with_item_names(extraction.item_names.clone());

        for record in &mut linked.abilities {
            let ability = &mut record.ability;
            let result = classifier.classify_raw_ability(
                &record.source,
                &ability.slug,
                &ability.name,
                &mut self.report,
            );
            ability.category = result.category;
            ability.class_requirement = result.class_requirement;
        }
        for record in &mut linked.items {
            let result =
                classifier.classify_raw_item(&record.source, &record.item.slug, &mut self.report);
            record.item.category = result.category;
        }

        tracing::info!(
            items = self.report.missing_categories("items").len(),
            abilities = self.report.missing_categories("abilities").len(),
            "unclassified after classify stage"
        );
        self.finish(Stage::Classify);
        Ok(self.linked.get_or_insert_with(Linked::default))
    }

    /// Deduplicate and assemble the final dataset.
    pub fn merge(&mut self) -> Result<&Dataset> {
        self.begin(Stage::Merge)?;
        let (Some(extraction), Some(linked)) = (self.extraction.as_ref(), self.linked.take()) else {
            return Err(Error::StageOrder {
                stage: Stage::Merge,
                missing: Stage::Classify,
            });
        };
        let dataset = assemble::assemble(linked, extraction, &mut self.report);
        self.finish(Stage::Merge);
        Ok(self.dataset.insert(dataset))
    }

    /// Run every stage in order and hand back the dataset with its report.
    pub fn run(mut self) -> Result<(Dataset, Report)> {
        self.extract()?;
        self.cross_reference()?;
        self.classify()?;
        self.merge()?;
        let dataset = self.dataset.take().unwrap_or_default();
        tracing::info!(summary = ?self.report.summary(), "pipeline finished");
        Ok((dataset, self.report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_requirements() {
        assert_eq!(Stage::Extract.requires(), None);
        assert_eq!(Stage::Merge.requires(), Some(Stage::Classify));
        for pair in Stage::ALL.windows(2) {
            assert_eq!(pair[1].requires(), Some(pair[0]));
        }
        assert_eq!(Stage::CrossReference.to_string(), "cross-reference");
    }

    #[test]
    fn test_out_of_order_stage_rejected() {
        let mut pipeline = Pipeline::new(PipelineInputs::default());
        match pipeline.classify() {
            Err(Error::StageOrder { stage, missing }) => {
                assert_eq!(stage, Stage::Classify);
                assert_eq!(missing, Stage::CrossReference);
            }
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
        assert!(pipeline.completed().is_empty());
    }

    #[test]
    fn test_missing_core_data() {
        let dir = tempfile::tempdir().unwrap();
        let mut pipeline = Pipeline::new(PipelineInputs {
            archive_dir: dir.path().to_path_buf(),
            source_dir: dir.path().to_path_buf(),
            ..Default::default()
        });
        assert!(matches!(pipeline.extract(), Err(Error::MissingCoreData("item"))));
        assert!(pipeline.report().count(crate::report::IssueKind::MissingInput) > 0);
    }

    #[test]
    fn test_classify_marks_stage_complete() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("items.json"),
            r#"{"custom": {"I000": [{"id": "unam", "value": "Stick"}]}}"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("abilities.json"),
            r#"{"custom": {"A000": [{"id": "anam", "value": "Fire Bolt"}]}}"#,
        )
        .unwrap();

        let mut pipeline = Pipeline::new(PipelineInputs {
            archive_dir: dir.path().to_path_buf(),
            source_dir: dir.path().to_path_buf(),
            ..Default::default()
        });
        pipeline.extract().unwrap();
        pipeline.cross_reference().unwrap();
        let linked = pipeline.classify().unwrap();
        assert_eq!(linked.items.len(), 1);
        assert_eq!(
            pipeline.completed(),
            &[Stage::Extract, Stage::CrossReference, Stage::Classify]
        );
        assert!(matches!(
            pipeline.classify(),
            Err(Error::StageRepeated(Stage::Classify))
        ));
        assert!(pipeline.merge().is_ok());
    }
}
