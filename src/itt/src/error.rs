//! Fatal pipeline errors
//!
//! Only a handful of conditions stop a run. Everything recoverable
//! (missing files, unusable records, dangling references) is collected in
//! [`crate::report::Report`] instead.

use std::path::PathBuf;

use crate::pipeline::Stage;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("No {0} data found; refusing to build an empty dataset")]
    MissingCoreData(&'static str),

    #[error("Stage {stage} requires {missing} to complete first")]
    StageOrder { stage: Stage, missing: Stage },

    #[error("Stage {0} has already run")]
    StageRepeated(Stage),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
