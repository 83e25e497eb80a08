//! # Decoder Tests
//!
//! - `semantic_tokens` - tokens for whole files, extensions included
//! - `hover` - hover content for bodies and expressions
//! - `completion` - candidates for bodies, labels and expressions
//! - `references` - collecting targets and origins, lookups and renames
//! - `paths` - resolving paths, configuration and cancellation

mod completion;
mod hover;
mod paths;
mod semantic_tokens;

use std::sync::Arc;

use hclang_decoder::{PathContext, PathDecoder};
use hclang_schema::{BodySchema, SemanticToken, SemanticTokenModifier, SemanticTokenType};
use hclang_syntax::{parse_config, LineIndex, Pos, Range};

pub const FILENAME: &str = "test.hcl";

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init()
        .ok(); // Ignore if already initialized
}

pub fn path_context(schema: BodySchema, config: &str) -> PathContext {
    PathContext::new(schema).with_file(parse_config(config.as_bytes(), FILENAME))
}

pub fn decoder(schema: BodySchema, config: &str) -> PathDecoder {
    init_tracing();
    PathDecoder::new(Arc::new(path_context(schema, config)))
}

/// A decoder whose reference index was collected from its own files.
pub fn indexed(decoder: PathDecoder) -> PathDecoder {
    let targets = decoder.collect_reference_targets().unwrap();
    let origins = decoder.collect_reference_origins().unwrap();
    let ctx = decoder.context().clone().with_targets(targets).with_origins(origins);
    PathDecoder::new(Arc::new(ctx))
}

pub fn pos(config: &str, byte: usize) -> Pos {
    LineIndex::new(config).pos_at(config, byte)
}

/// Byte offset of the first occurrence of `needle`.
pub fn offset(config: &str, needle: &str) -> usize {
    config
        .find(needle)
        .unwrap_or_else(|| panic!("`{needle}` not found in config"))
}

pub fn range(config: &str, start: usize, end: usize) -> Range {
    Range::new(FILENAME, pos(config, start), pos(config, end))
}

pub fn modifiers(names: &[&str]) -> Vec<SemanticTokenModifier> {
    names.iter().map(|name| SemanticTokenModifier::new(*name)).collect()
}

pub fn token(
    config: &str,
    token_type: SemanticTokenType,
    modifiers: Vec<SemanticTokenModifier>,
    start: usize,
    end: usize,
) -> SemanticToken {
    SemanticToken::new(token_type, modifiers, range(config, start, end))
}
