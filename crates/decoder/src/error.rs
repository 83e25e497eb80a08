use thiserror::Error;

use hclang_reference::ReferenceError;

/// Failures of a query as a whole. Finding nothing at a position is not one
/// of them; such queries return empty results instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecoderError {
    #[error("path not found: {0}")]
    PathNotFound(String),
    #[error("file not found: {0}")]
    FileNotFound(String),
    #[error("{filename}: position {byte} is out of range (file has {len} bytes)")]
    PosOutOfRange {
        filename: String,
        byte: usize,
        len: usize,
    },
    #[error("{0}: unknown file format")]
    UnknownFileFormat(String),
    #[error("no schema available")]
    NoSchema,
    #[error("no reference origin found")]
    NoOriginFound,
    #[error("no reference target found")]
    NoTargetFound,
    #[error("operation cancelled")]
    Cancelled,
    #[error("invalid decoder configuration: {0}")]
    InvalidConfig(String),
}

impl From<ReferenceError> for DecoderError {
    fn from(err: ReferenceError) -> Self {
        match err {
            ReferenceError::NoOriginFound => Self::NoOriginFound,
            ReferenceError::NoTargetFound => Self::NoTargetFound,
        }
    }
}
