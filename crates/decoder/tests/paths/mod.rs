use std::sync::Arc;

use hclang_decoder::{CancellationToken, Decoder, DecoderConfig, DecoderError, Path, PathContext, PathReader};
use hclang_schema::{AttributeSchema, BlockSchema, BodySchema, Constraint, Type};
use indexmap::IndexMap;
use pretty_assertions::assert_eq;

use crate::{init_tracing, path_context, pos, FILENAME};

const CONFIG: &str = "network {\n  cidr = \"10.0.0.0/16\"\n}\n";

fn schema() -> BodySchema {
    BodySchema::new()
        .with_block(
            "network",
            BlockSchema::new(
                BodySchema::new().with_attribute("cidr", AttributeSchema::new(Constraint::literal_type(Type::String))),
            ),
        )
        .with_attribute("name", AttributeSchema::new(Constraint::literal_type(Type::String)))
        .with_attribute("zone", AttributeSchema::new(Constraint::literal_type(Type::String)))
}

fn reader() -> IndexMap<Path, Arc<PathContext>> {
    let mut paths = IndexMap::new();
    paths.insert(Path::new("infra", "hcl"), Arc::new(path_context(schema(), CONFIG)));
    paths
}

#[test]
fn test_reader_lists_paths() {
    assert_eq!(reader().paths(), vec![Path::new("infra", "hcl")]);
}

#[test]
fn test_unknown_path() {
    init_tracing();
    let decoder = Decoder::new(reader());
    let err = decoder.path(&Path::new("missing", "hcl")).unwrap_err();
    assert_eq!(err, DecoderError::PathNotFound("missing (hcl)".to_string()));
}

#[test]
fn test_config_is_passed_to_path_decoder() {
    init_tracing();
    let decoder = Decoder::new(reader()).with_config(DecoderConfig {
        max_candidates: 1,
        ..DecoderConfig::default()
    });
    let candidates = decoder
        .path(&Path::new("infra", "hcl"))
        .unwrap()
        .completion_at_pos(FILENAME, pos(CONFIG, CONFIG.len()))
        .unwrap();
    assert!(!candidates.is_complete);
    assert_eq!(candidates.labels(), vec!["name"]);
}

#[test]
fn test_unknown_file() {
    init_tracing();
    let decoder = Decoder::new(reader()).path(&Path::new("infra", "hcl")).unwrap();
    assert_eq!(
        decoder.hover_at_pos("other.hcl", pos(CONFIG, 0)),
        Err(DecoderError::FileNotFound("other.hcl".to_string()))
    );
}

#[test]
fn test_cancelled_queries() {
    init_tracing();
    let cancel = CancellationToken::new();
    let decoder = Decoder::new(reader())
        .path(&Path::new("infra", "hcl"))
        .unwrap()
        .with_cancellation(cancel.clone());
    assert!(decoder.semantic_tokens_in_file(FILENAME).is_ok());

    cancel.cancel();
    assert_eq!(decoder.semantic_tokens_in_file(FILENAME), Err(DecoderError::Cancelled));
    assert_eq!(decoder.collect_reference_targets(), Err(DecoderError::Cancelled));
    assert_eq!(
        decoder.completion_at_pos(FILENAME, pos(CONFIG, 12)),
        Err(DecoderError::Cancelled)
    );
}

#[test]
fn test_no_schema() {
    init_tracing();
    let ctx = PathContext {
        schema: None,
        ..path_context(schema(), CONFIG)
    };
    let mut paths = IndexMap::new();
    paths.insert(Path::new("infra", "hcl"), Arc::new(ctx));
    let decoder = Decoder::new(paths).path(&Path::new("infra", "hcl")).unwrap();
    assert_eq!(decoder.semantic_tokens_in_file(FILENAME), Err(DecoderError::NoSchema));
}

#[test]
fn test_rename_through_decoder() {
    init_tracing();
    let decoder = Decoder::new(reader());
    assert_eq!(
        decoder.rename_targets(&Path::new("infra", "hcl"), FILENAME, pos(CONFIG, 0)),
        Err(DecoderError::NoOriginFound)
    );
}
