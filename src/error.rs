//! Typed failures of each pipeline stage.
//!
//! Stages return these directly; the [runner](crate::run) wraps them into a
//! [`Report`](color_eyre::eyre::Report) that names the failed stage.

use std::path::PathBuf;
use thiserror::Error;

/// Failure of a collaborator that fetches remote workspace objects.
pub type FetchFailure = Box<dyn std::error::Error + Send + Sync>;

/// A job description that is malformed or inconsistent with itself.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// A field required by the chosen input source or dataset mode is absent or empty.
    #[error("Required job field is missing or empty: {0}")]
    MissingField(&'static str),

    /// A discriminator field holds a value outside its closed set.
    #[error("Invalid value for {field}: {value:?} (expected one of: {expected})")]
    InvalidEnumValue { field: &'static str, value: String, expected: String },

    /// A reference segment or segment list entry is not a catalog segment.
    #[error("Invalid segment: {0:?}")]
    InvalidSegment(String),

    /// The input source contradicts the dataset preparation mode.
    #[error(
        "Input source {source_name:?} cannot be used when prepare_dataset is {prepare_dataset}"
    )]
    IncompatibleInputSource { source_name: String, prepare_dataset: bool },
}

/// Failure to materialize, rewrite, or split an input FASTA file.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Input FASTA file does not exist: {0:?}")]
    NotFound(PathBuf),

    #[error("Input FASTA file is empty: {0:?}")]
    EmptyFile(PathBuf),

    #[error("Failed to read {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing a file failed. `what` names the content (input data, a segment, ...).
    #[error("Failed to write {what} to {path:?}")]
    Write {
        what: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to fetch workspace object {id:?} to {path:?}")]
    Fetch {
        id: String,
        path: PathBuf,
        #[source]
        source: FetchFailure,
    },
}

/// Failure of a delegated external process.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Failed to start {tool}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// The process ran and exited unsuccessfully. `code` is absent when killed by a signal.
    #[error("{tool} exited with status {}", exit_status(.code))]
    Failed { tool: String, code: Option<i32> },
}

fn exit_status(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "unknown (terminated by signal)".to_string(),
    }
}
