use serde::{Deserialize, Serialize};

use crate::error::DecoderError;

/// Tunables of a decoder. Every field has a default so partial JSON
/// documents are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Insert required attributes into block snippets
    pub prefill_required_fields: bool,
    /// Upper bound on returned completion candidates
    pub max_candidates: usize,
    /// When disabled, snippets are replaced by their plain text
    pub enable_snippets: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            prefill_required_fields: false,
            max_candidates: 100,
            enable_snippets: true,
        }
    }
}

impl DecoderConfig {
    pub fn from_json(json: &str) -> Result<Self, DecoderError> {
        serde_json::from_str(json).map_err(|err| DecoderError::InvalidConfig(err.to_string()))
    }
}
