//src/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading tables or reference data.
///
/// The scoring stages themselves never fail; only the loaders return these.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("abundance table has no header row")]
    EmptyTable,

    #[error("no sample column found (columns: {})", columns.join(", "))]
    MissingSampleColumn { columns: Vec<String> },

    #[error("expected exactly one sample column, found {}: {}", columns.len(), columns.join(", "))]
    AmbiguousSampleColumns { columns: Vec<String> },

    #[error("line {line}: expected {expected} fields, found {found}")]
    MalformedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: invalid read count {value:?}")]
    InvalidCount { line: usize, value: String },

    #[error("line {line}: total read count exceeds {}", u64::MAX)]
    CountOverflow { line: usize },

    #[error("{}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid reference data: {0}")]
    InvalidReference(String),

    #[error("sample id {sample_id:?} cannot be used as a report file name")]
    InvalidSampleId { sample_id: String },

    #[error("sample id {sample_id:?} appears in more than one input")]
    DuplicateSampleId { sample_id: String },
}

pub type Result<T> = std::result::Result<T, ProfileError>;
