use std::sync::Arc;

use hclang_decoder::{DecoderConfig, PathDecoder};
use hclang_reference::{Target, Targets};
use hclang_schema::{
    Address, AttributeSchema, BlockSchema, BodyExtensions, BodySchema, Candidate, CandidateKind, Candidates,
    Constraint, DependencyKeys, FunctionParameter, FunctionSignature, LabelSchema, MarkupContent, SchemaKey,
    TextEdit, Type,
};
use pretty_assertions::assert_eq;

use crate::{decoder, init_tracing, offset, path_context, pos, range, FILENAME};

fn schema() -> BodySchema {
    BodySchema::new()
        .with_attribute(
            "name",
            AttributeSchema::new(Constraint::literal_type(Type::String)).required(),
        )
        .with_attribute(
            "enabled",
            AttributeSchema::new(Constraint::literal_type(Type::Bool)).optional(),
        )
        .with_attribute(
            "id",
            AttributeSchema {
                is_computed: true,
                ..AttributeSchema::new(Constraint::literal_type(Type::String))
            },
        )
        .with_block(
            "resource",
            BlockSchema::new(BodySchema::new().with_extensions(BodyExtensions::COUNT))
                .with_labels(vec![
                    LabelSchema::new("type").dep_key().completable(),
                    LabelSchema::new("name"),
                ])
                .with_dependent_body(
                    SchemaKey::new(&DependencyKeys::label(0, "aws_instance")),
                    BodySchema::new()
                        .with_attribute(
                            "ami",
                            AttributeSchema::new(Constraint::literal_type(Type::String)).required(),
                        )
                        .with_attribute(
                            "instance_type",
                            AttributeSchema::new(Constraint::literal_type(Type::String)),
                        ),
                )
                .with_dependent_body(
                    SchemaKey::new(&DependencyKeys::label(0, "aws_eip")),
                    BodySchema {
                        description: MarkupContent::markdown("An elastic IP"),
                        ..BodySchema::new()
                    },
                ),
        )
        .with_block(
            "terraform",
            BlockSchema {
                max_items: 1,
                ..BlockSchema::new(BodySchema::new().with_attribute(
                    "required_version",
                    AttributeSchema::new(Constraint::literal_type(Type::String)).required(),
                ))
            },
        )
}

fn complete(config: &str, byte: usize) -> Candidates {
    decoder(schema(), config)
        .completion_at_pos(FILENAME, pos(config, byte))
        .unwrap()
}

#[allow(clippy::too_many_arguments)]
fn candidate(
    config: &str,
    label: &str,
    kind: CandidateKind,
    detail: &str,
    new_text: &str,
    snippet: &str,
    start: usize,
    end: usize,
) -> Candidate {
    Candidate {
        label: label.to_string(),
        description: MarkupContent::default(),
        detail: detail.to_string(),
        is_deprecated: false,
        text_edit: TextEdit {
            range: range(config, start, end),
            new_text: new_text.to_string(),
            snippet: snippet.to_string(),
        },
        kind,
        trigger_suggest: false,
    }
}

#[test]
fn test_root_body() {
    let config = "\n";
    let candidates = complete(config, 0);
    assert!(candidates.is_complete);
    assert_eq!(candidates.labels(), vec!["enabled", "name", "resource", "terraform"]);
    assert_eq!(
        candidates.list[1],
        candidate(
            config,
            "name",
            CandidateKind::Attribute,
            "required, string",
            "name = \"\"",
            "name = \"${1:value}\"",
            0,
            0
        )
    );
    assert_eq!(
        candidates.list[2],
        candidate(
            config,
            "resource",
            CandidateKind::Block,
            "Block",
            "resource \"type\" \"name\" {\n}",
            "resource \"${1:type}\" \"${2:name}\" {\n  ${3}\n}",
            0,
            0
        )
    );
    assert_eq!(candidates.list[3].detail, "Block, max: 1");
}

#[test]
fn test_prefix_filters_and_replaces() {
    let config = "na";
    let candidates = complete(config, 2);
    assert_eq!(candidates.labels(), vec!["name"]);
    assert_eq!(candidates.list[0].text_edit.range, range(config, 0, 2));
}

#[test]
fn test_block_at_max_items_is_not_offered() {
    let config = "terraform {\n}\n";
    let candidates = complete(config, config.len());
    assert_eq!(candidates.labels(), vec!["enabled", "name", "resource"]);
}

#[test]
fn test_prefill_required_fields() {
    let config = "\n";
    let decoder = decoder(schema(), config).with_config(DecoderConfig {
        prefill_required_fields: true,
        ..DecoderConfig::default()
    });
    let candidates = decoder.completion_at_pos(FILENAME, pos(config, 0)).unwrap();
    let terraform = &candidates.list[3];
    assert_eq!(terraform.text_edit.new_text, "terraform {\n  required_version = \"\"\n}");
    assert_eq!(
        terraform.text_edit.snippet,
        "terraform {\n  required_version = \"${1:value}\"\n  ${2}\n}"
    );
}

#[test]
fn test_snippets_disabled() {
    let config = "\n";
    let decoder = decoder(schema(), config).with_config(DecoderConfig {
        enable_snippets: false,
        ..DecoderConfig::default()
    });
    let candidates = decoder.completion_at_pos(FILENAME, pos(config, 0)).unwrap();
    for c in &candidates.list {
        assert_eq!(c.text_edit.snippet, c.text_edit.new_text);
    }
}

#[test]
fn test_max_candidates_marks_incomplete() {
    let config = "\n";
    let decoder = decoder(schema(), config).with_config(DecoderConfig {
        max_candidates: 2,
        ..DecoderConfig::default()
    });
    let candidates = decoder.completion_at_pos(FILENAME, pos(config, 0)).unwrap();
    assert!(!candidates.is_complete);
    assert_eq!(candidates.labels(), vec!["enabled", "name"]);
}

#[test]
fn test_attribute_value() {
    let config = "name = \n";
    let candidates = complete(config, 7);
    assert_eq!(
        candidates.list,
        vec![candidate(
            config,
            "string",
            CandidateKind::String,
            "string",
            "\"\"",
            "\"${1:value}\"",
            7,
            7
        )]
    );
}

#[test]
fn test_bool_value_prefix() {
    let config = "enabled = t";
    let candidates = complete(config, 11);
    assert_eq!(
        candidates.list,
        vec![candidate(config, "true", CandidateKind::Bool, "bool", "true", "true", 10, 11)]
    );
}

#[test]
fn test_dependency_key_label() {
    let config = "resource \"aws_\" \"x\" {\n}\n";
    let candidates = complete(config, 14);
    assert_eq!(candidates.labels(), vec!["aws_eip", "aws_instance"]);
    let mut eip = candidate(
        config,
        "aws_eip",
        CandidateKind::Label,
        "",
        "\"aws_eip\"",
        "\"aws_eip\"",
        9,
        15,
    );
    eip.description = MarkupContent::markdown("An elastic IP");
    assert_eq!(candidates.list[0], eip);
}

#[test]
fn test_block_body_with_dependent_schema() {
    let config = "resource \"aws_instance\" \"x\" {\n  \n}\n";
    let candidates = complete(config, 32);
    assert_eq!(candidates.labels(), vec!["ami", "count", "instance_type"]);
    let count = &candidates.list[1];
    assert_eq!(count.detail, "optional, number");
    assert_eq!(count.text_edit.new_text, "count = ");
    assert!(count.trigger_suggest);
}

#[test]
fn test_declared_attributes_are_skipped() {
    let config = "name = \"x\"\n\n";
    let candidates = complete(config, 11);
    assert_eq!(candidates.labels(), vec!["enabled", "resource", "terraform"]);
}

fn dynamic_schema() -> BodySchema {
    BodySchema::new().with_block(
        "myblock",
        BlockSchema::new(
            BodySchema::new()
                .with_extensions(BodyExtensions::DYNAMIC_BLOCKS)
                .with_block("setting", BlockSchema::new(BodySchema::new()))
                .with_block("rule", BlockSchema::new(BodySchema::new())),
        ),
    )
}

#[test]
fn test_dynamic_block_label() {
    let config = "myblock {\n  dynamic \"\" {\n  }\n}\n";
    let candidates = decoder(dynamic_schema(), config)
        .completion_at_pos(FILENAME, pos(config, 21))
        .unwrap();
    assert_eq!(candidates.labels(), vec!["rule", "setting"]);
}

#[test]
fn test_dynamic_block_body() {
    let config = "myblock {\n  dynamic \"setting\" {\n    \n  }\n}\n";
    let candidates = decoder(dynamic_schema(), config)
        .completion_at_pos(FILENAME, pos(config, 36))
        .unwrap();
    assert_eq!(candidates.labels(), vec!["for_each", "iterator", "labels", "content"]);
    assert_eq!(candidates.list[3].detail, "Block, min: 1, max: 1");
}

#[test]
fn test_references() {
    init_tracing();
    let schema =
        BodySchema::new().with_attribute("ref", AttributeSchema::new(Constraint::reference_of_type(Type::String)));
    let targets = Targets::new(vec![
        Target::new(Address::from_names("var", ["foo"]), Type::String),
        Target::new(Address::from_names("var", ["bar"]), Type::Number),
        Target::new(Address::from_names("var", ["baz"]), Type::String),
    ]);

    let config = "ref = \n";
    let ctx = path_context(schema.clone(), config).with_targets(targets.clone());
    let candidates = PathDecoder::new(Arc::new(ctx))
        .completion_at_pos(FILENAME, pos(config, 6))
        .unwrap();
    assert_eq!(candidates.labels(), vec!["var.foo", "var.baz"]);
    assert_eq!(candidates.list[0].detail, "string");
    assert_eq!(candidates.list[0].kind, CandidateKind::Reference);

    let config = "ref = var.b";
    let ctx = path_context(schema, config).with_targets(targets);
    let candidates = PathDecoder::new(Arc::new(ctx))
        .completion_at_pos(FILENAME, pos(config, config.len()))
        .unwrap();
    assert_eq!(candidates.labels(), vec!["var.baz"]);
    assert_eq!(candidates.list[0].text_edit.range, range(config, 6, 11));
}

#[test]
fn test_object_attributes() {
    let schema = BodySchema::new().with_attribute(
        "obj",
        AttributeSchema::new(Constraint::object([
            ("foo", AttributeSchema::new(Constraint::literal_type(Type::String))),
            ("bar", AttributeSchema::new(Constraint::literal_type(Type::Number))),
        ])),
    );
    let config = "obj = {\n  \n}\n";
    let candidates = decoder(schema, config)
        .completion_at_pos(FILENAME, pos(config, 10))
        .unwrap();
    assert_eq!(
        candidates.list,
        vec![
            candidate(config, "bar", CandidateKind::Attribute, "number", "bar = 0", "bar = ${1:0}", 10, 10),
            candidate(
                config,
                "foo",
                CandidateKind::Attribute,
                "string",
                "foo = \"\"",
                "foo = \"${1:value}\"",
                10,
                10
            ),
        ]
    );
}

#[test]
fn test_function_name() {
    init_tracing();
    let config = "val = up";
    let ctx = path_context(
        BodySchema::new().with_attribute("val", AttributeSchema::new(Constraint::any_expression(Type::String))),
        config,
    )
    .with_function(
        "upper",
        FunctionSignature {
            description: MarkupContent::default(),
            params: vec![FunctionParameter {
                name: "str".into(),
                description: MarkupContent::default(),
                ty: Type::String,
            }],
            variadic_param: None,
            return_type: Type::String,
        },
    )
    .with_function(
        "length",
        FunctionSignature {
            description: MarkupContent::default(),
            params: vec![],
            variadic_param: None,
            return_type: Type::Number,
        },
    );
    let candidates = PathDecoder::new(Arc::new(ctx))
        .completion_at_pos(FILENAME, pos(config, offset(config, "up") + 2))
        .unwrap();
    assert_eq!(
        candidates.list,
        vec![candidate(
            config,
            "upper",
            CandidateKind::Function,
            "upper(str string) string",
            "upper()",
            "upper(${0})",
            6,
            8
        )]
    );
}
