//! Error types for fixture loading

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid filter case '{identifier}': {reason}")]
    InvalidCase { identifier: String, reason: String },

    #[error("Duplicate filter case identifier: {0}")]
    DuplicateIdentifier(String),

    #[error("Unknown sample file type: {0}")]
    UnknownSampleFile(String),
}

pub type FixtureResult<T> = Result<T, FixtureError>;
