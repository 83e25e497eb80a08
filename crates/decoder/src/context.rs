//! # Path Context
//!
//! The immutable snapshot every query runs against: schema, parsed files and
//! the reference index of one logical unit.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use hclang_reference::{Origins, Targets};
use hclang_schema::{BodySchema, FunctionSignature};
use hclang_syntax::File;
use indexmap::IndexMap;

use crate::error::DecoderError;

/// Identifies a logical unit, e.g. a directory of configuration files.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path {
    pub path: String,
    pub language_id: String,
}

impl Path {
    pub fn new(path: impl Into<String>, language_id: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            language_id: language_id.into(),
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.path, self.language_id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PathContext {
    pub schema: Option<BodySchema>,
    pub files: IndexMap<String, File>,
    pub reference_targets: Targets,
    pub reference_origins: Origins,
    pub functions: IndexMap<String, FunctionSignature>,
}

impl PathContext {
    pub fn new(schema: BodySchema) -> Self {
        Self {
            schema: Some(schema),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_file(mut self, file: File) -> Self {
        self.files.insert(file.filename().to_string(), file);
        self
    }

    #[must_use]
    pub fn with_targets(mut self, targets: Targets) -> Self {
        self.reference_targets = targets;
        self
    }

    #[must_use]
    pub fn with_origins(mut self, origins: Origins) -> Self {
        self.reference_origins = origins;
        self
    }

    #[must_use]
    pub fn with_function(mut self, name: impl Into<String>, signature: FunctionSignature) -> Self {
        self.functions.insert(name.into(), signature);
        self
    }

    pub fn file(&self, filename: &str) -> Result<&File, DecoderError> {
        self.files
            .get(filename)
            .ok_or_else(|| DecoderError::FileNotFound(filename.to_string()))
    }

    /// Filenames in a stable order.
    pub fn filenames(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.files.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Resolves paths to their contexts.
pub trait PathReader {
    fn path_context(&self, path: &Path) -> Result<Arc<PathContext>, DecoderError>;

    fn paths(&self) -> Vec<Path>;
}

impl PathReader for IndexMap<Path, Arc<PathContext>> {
    fn path_context(&self, path: &Path) -> Result<Arc<PathContext>, DecoderError> {
        self.get(path)
            .cloned()
            .ok_or_else(|| DecoderError::PathNotFound(path.to_string()))
    }

    fn paths(&self) -> Vec<Path> {
        self.keys().cloned().collect()
    }
}

/// Shared flag for aborting a running query from another thread.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub(crate) fn check(&self) -> Result<(), DecoderError> {
        if self.is_cancelled() {
            tracing::debug!("query cancelled");
            return Err(DecoderError::Cancelled);
        }
        Ok(())
    }
}
