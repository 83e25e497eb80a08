use std::sync::Arc;

use hclang_decoder::{DecoderError, PathContext, PathDecoder};
use hclang_reference::{Origin, OriginConstraint, OriginConstraints, Origins, Target, Targets};
use hclang_schema::{
    Address, AttributeSchema, BlockSchema, BodyExtensions, BodySchema, Constraint, DependencyKeys, LabelSchema,
    SchemaKey, SemanticTokenModifier, SemanticTokenType as T, Type,
};
use hclang_syntax::{parse_config, parse_json, File};
use pretty_assertions::assert_eq;

use crate::{decoder, indexed, modifiers, offset, range, token, FILENAME};

fn dependent() -> Vec<SemanticTokenModifier> {
    vec![SemanticTokenModifier::DEPENDENT]
}

fn resource_labels() -> Vec<LabelSchema> {
    vec![
        LabelSchema::new("type")
            .dep_key()
            .with_modifiers(vec![SemanticTokenModifier::DEPENDENT]),
        LabelSchema::new("name"),
    ]
}

fn number_or_reference() -> Constraint {
    Constraint::one_of(vec![
        Constraint::reference_of_type(Type::Number),
        Constraint::literal_type(Type::Number),
    ])
}

#[test]
fn test_unknown_file_format() {
    let ctx = PathContext::new(BodySchema::new()).with_file(File::empty(FILENAME));
    let decoder = PathDecoder::new(Arc::new(ctx));
    assert_eq!(
        decoder.semantic_tokens_in_file(FILENAME),
        Err(DecoderError::UnknownFileFormat(FILENAME.to_string()))
    );
}

#[test]
fn test_json_file() {
    let json = "{\n  \"customblock\": {\n    \"label1\": {}\n  }\n}";
    let ctx = PathContext::new(BodySchema::new()).with_file(parse_json(json.as_bytes(), "test.hcl.json"));
    let decoder = PathDecoder::new(Arc::new(ctx));
    assert_eq!(
        decoder.semantic_tokens_in_file("test.hcl.json"),
        Err(DecoderError::UnknownFileFormat("test.hcl.json".to_string()))
    );
}

#[test]
fn test_zero_byte_file_without_schema() {
    let ctx = PathContext::default().with_file(parse_config(b"", FILENAME));
    let decoder = PathDecoder::new(Arc::new(ctx));
    assert_eq!(decoder.semantic_tokens_in_file(FILENAME), Ok(vec![]));
}

#[test]
fn test_missing_schema() {
    let ctx = PathContext::default().with_file(parse_config(b"attr = 1\n", FILENAME));
    let decoder = PathDecoder::new(Arc::new(ctx));
    assert_eq!(decoder.semantic_tokens_in_file(FILENAME), Err(DecoderError::NoSchema));
}

#[test]
fn test_file_not_found() {
    let decoder = decoder(BodySchema::new(), "");
    assert_eq!(
        decoder.semantic_tokens_in_file("foobar.hcl"),
        Err(DecoderError::FileNotFound("foobar.hcl".to_string()))
    );
}

#[test]
fn test_basic() {
    let schema = BodySchema::new()
        .with_block(
            "module",
            BlockSchema::new(
                BodySchema::new()
                    .with_attribute("count", AttributeSchema::new(Constraint::literal_type(Type::Number)))
                    .with_attribute(
                        "source",
                        AttributeSchema::new(Constraint::literal_type(Type::String))
                            .deprecated()
                            .with_modifiers(dependent()),
                    ),
            ),
        )
        .with_block(
            "resource",
            BlockSchema::default().with_labels(resource_labels()),
        );
    let config = r#"module "ref" {
  source = "./sub"
  count  = 1
}
resource "vault_auth_backend" "blah" {
  default_lease_ttl_seconds = 1
}
"#;

    let tokens = decoder(schema, config).semantic_tokens_in_file(FILENAME).unwrap();
    assert_eq!(
        tokens,
        vec![
            token(config, T::BlockType, vec![], 0, 6),
            token(config, T::AttrName, dependent(), 17, 23),
            token(config, T::String, vec![], 26, 33),
            token(config, T::AttrName, vec![], 36, 41),
            token(config, T::Number, vec![], 45, 46),
            token(config, T::BlockType, vec![], 49, 57),
            token(config, T::BlockLabel, dependent(), 58, 78),
            token(config, T::BlockLabel, vec![], 79, 85),
        ]
    );
}

#[test]
fn test_custom_modifiers() {
    let schema = BodySchema::new()
        .with_block(
            "module",
            BlockSchema::new(
                BodySchema::new()
                    .with_attribute("count", AttributeSchema::new(Constraint::literal_type(Type::Number)))
                    .with_attribute(
                        "source",
                        AttributeSchema::new(Constraint::literal_type(Type::String))
                            .deprecated()
                            .with_modifiers(dependent()),
                    ),
            )
            .with_modifiers(modifiers(&["module"]))
            .with_labels(vec![LabelSchema::new("name").with_modifiers(modifiers(&["name"]))]),
        )
        .with_block(
            "resource",
            BlockSchema::new(BodySchema::new().with_block(
                "provisioner",
                BlockSchema::default()
                    .with_modifiers(modifiers(&["provisioner"]))
                    .with_labels(vec![LabelSchema::new("type").with_modifiers(modifiers(&["type"]))]),
            ))
            .with_modifiers(modifiers(&["resource"]))
            .with_labels(vec![
                LabelSchema::new("type")
                    .dep_key()
                    .with_modifiers(vec![SemanticTokenModifier::new("type"), SemanticTokenModifier::DEPENDENT]),
                LabelSchema::new("name").with_modifiers(modifiers(&["name"])),
            ]),
        );
    let config = "module \"ref\" {\n  source = \"./sub\"\n  count  = 1\n}\nresource \"vault_auth_backend\" \"blah\" {\n  provisioner \"inner\" {\n  \ttest = 42\n  }\n}\n";

    let tokens = decoder(schema, config).semantic_tokens_in_file(FILENAME).unwrap();
    assert_eq!(
        tokens,
        vec![
            token(config, T::BlockType, modifiers(&["module"]), 0, 6),
            token(config, T::BlockLabel, modifiers(&["module", "name"]), 7, 12),
            token(config, T::AttrName, modifiers(&["module", "hcl-dependent"]), 17, 23),
            token(config, T::String, vec![], 26, 33),
            token(config, T::AttrName, modifiers(&["module"]), 36, 41),
            token(config, T::Number, vec![], 45, 46),
            token(config, T::BlockType, modifiers(&["resource"]), 49, 57),
            token(config, T::BlockLabel, modifiers(&["resource", "type", "hcl-dependent"]), 58, 78),
            token(config, T::BlockLabel, modifiers(&["resource", "name"]), 79, 85),
            token(config, T::BlockType, modifiers(&["resource", "provisioner"]), 90, 101),
            token(config, T::BlockLabel, modifiers(&["resource", "provisioner", "type"]), 102, 109),
        ]
    );
}

const COUNT_CONFIG: &str = r#"
resource "aws_instance" "app_server" {
  count          = 1
  cpu_core_count = count.index
}
"#;

#[test]
fn test_count_index_reference() {
    let schema = BodySchema::new().with_block(
        "resource",
        BlockSchema::new(
            BodySchema::new()
                .with_extensions(BodyExtensions::COUNT)
                .with_attribute("cpu_core_count", AttributeSchema::new(number_or_reference()).optional()),
        )
        .with_labels(resource_labels()),
    );
    let config = COUNT_CONFIG;

    let tokens = indexed(decoder(schema, config)).semantic_tokens_in_file(FILENAME).unwrap();
    assert_eq!(
        tokens,
        vec![
            token(config, T::BlockType, vec![], 1, 9),
            token(config, T::BlockLabel, dependent(), 10, 24),
            token(config, T::BlockLabel, vec![], 25, 37),
            token(config, T::AttrName, vec![], 42, 47),
            token(config, T::Number, vec![], 59, 60),
            token(config, T::AttrName, vec![], 63, 77),
            token(config, T::ReferenceStep, vec![], 80, 85),
            token(config, T::ReferenceStep, vec![], 86, 91),
        ]
    );
}

#[test]
fn test_count_in_dependent_body() {
    let schema = BodySchema::new().with_block(
        "resource",
        BlockSchema::new(BodySchema::new().with_extensions(BodyExtensions::COUNT))
            .with_labels(resource_labels())
            .with_dependent_body(
                SchemaKey::new(&DependencyKeys::label(0, "aws_instance")),
                BodySchema::new()
                    .with_attribute("cpu_core_count", AttributeSchema::new(number_or_reference()).optional()),
            ),
    );
    let config = COUNT_CONFIG;

    let tokens = indexed(decoder(schema, config)).semantic_tokens_in_file(FILENAME).unwrap();
    assert_eq!(tokens.len(), 8);
    assert_eq!(tokens[5], token(config, T::AttrName, vec![], 63, 77));
    assert_eq!(tokens[6], token(config, T::ReferenceStep, vec![], 80, 85));
    assert_eq!(tokens[7], token(config, T::ReferenceStep, vec![], 86, 91));
}

#[test]
fn test_count_index_without_count() {
    let schema = BodySchema::new().with_block(
        "resource",
        BlockSchema::new(
            BodySchema::new()
                .with_extensions(BodyExtensions::COUNT)
                .with_attribute("cpu_count", AttributeSchema::new(Constraint::literal_type(Type::Number))),
        )
        .with_labels(resource_labels()),
    );
    let config = r#"
resource "vault_auth_backend" "blah" {
  cpu_count = count.index
}
"#;

    let tokens = indexed(decoder(schema, config)).semantic_tokens_in_file(FILENAME).unwrap();
    assert_eq!(
        tokens,
        vec![
            token(config, T::BlockType, vec![], 1, 9),
            token(config, T::BlockLabel, dependent(), 10, 30),
            token(config, T::BlockLabel, vec![], 31, 37),
            token(config, T::AttrName, vec![], 42, 51),
        ]
    );
}

#[test]
fn test_count_index_in_nested_block() {
    let schema = BodySchema::new().with_block(
        "resource",
        BlockSchema::new(
            BodySchema::new()
                .with_extensions(BodyExtensions::COUNT)
                .with_attribute("count", AttributeSchema::new(Constraint::literal_type(Type::Number)))
                .with_block(
                    "block",
                    BlockSchema::new(BodySchema::new().with_attribute(
                        "attr",
                        AttributeSchema::new(Constraint::reference_of_type(Type::Number)),
                    )),
                ),
        )
        .with_labels(resource_labels()),
    );
    let config = "\nresource \"foobar\" \"name\" {\n\tcount = 1\n\tblock {\n\t\tattr = count.index\n\t}\n}\n";

    let tokens = indexed(decoder(schema.clone(), config)).semantic_tokens_in_file(FILENAME).unwrap();
    assert_eq!(
        tokens,
        vec![
            token(config, T::BlockType, vec![], 1, 9),
            token(config, T::BlockLabel, dependent(), 10, 18),
            token(config, T::BlockLabel, vec![], 19, 25),
            token(config, T::AttrName, vec![], 29, 34),
            token(config, T::Number, vec![], 37, 38),
            token(config, T::BlockType, vec![], 40, 45),
            token(config, T::AttrName, vec![], 50, 54),
            token(config, T::ReferenceStep, vec![], 57, 62),
            token(config, T::ReferenceStep, vec![], 63, 68),
        ]
    );
}

#[test]
fn test_for_each_references() {
    let schema = BodySchema::new().with_block(
        "resource",
        BlockSchema::new(
            BodySchema::new()
                .with_extensions(BodyExtensions::FOR_EACH)
                .with_attribute("thing", AttributeSchema::new(Constraint::reference_of_type(Type::String)))
                .with_attribute(
                    "thing_other",
                    AttributeSchema::new(Constraint::reference_of_type(Type::Dynamic)),
                ),
        )
        .with_labels(resource_labels()),
    );
    let config = "\nresource \"foobar\" \"name\" {\n\tfor_each = {\n\t\ta_group = \"eastus\"\n\t}\n\tthing = each.key\n\tthing_other = each.value\n}\n";

    let tokens = indexed(decoder(schema.clone(), config)).semantic_tokens_in_file(FILENAME).unwrap();
    assert_eq!(
        tokens,
        vec![
            token(config, T::BlockType, vec![], 1, 9),
            token(config, T::BlockLabel, dependent(), 10, 18),
            token(config, T::BlockLabel, vec![], 19, 25),
            token(config, T::AttrName, vec![], 29, 37),
            token(config, T::MapKey, vec![], 44, 51),
            token(config, T::String, vec![], 54, 62),
            token(config, T::AttrName, vec![], 67, 72),
            token(config, T::ReferenceStep, vec![], 75, 79),
            token(config, T::ReferenceStep, vec![], 80, 83),
            token(config, T::AttrName, vec![], 85, 96),
            token(config, T::ReferenceStep, vec![], 99, 103),
            token(config, T::ReferenceStep, vec![], 104, 109),
        ]
    );

    let body = range(config, offset(config, "{"), config.len() - 1);
    let each = |attr: &str, ty: Type| Target {
        local_addr: Some(Address::from_names("each", [attr])),
        targetable_from_range: Some(body.clone()),
        ty: Some(ty),
        ..Target::default()
    };
    let origin = |attr: &str, ty: Type| {
        let text = format!("each.{attr}");
        let start = offset(config, &text);
        Origin::new(Address::from_names("each", [attr]), range(config, start, start + text.len()))
            .with_constraints(OriginConstraints::new(vec![OriginConstraint::of_type(ty)]))
    };
    let ctx = decoder(schema, config)
        .context()
        .clone()
        .with_targets(Targets::new(vec![each("key", Type::String), each("value", Type::Dynamic)]))
        .with_origins(Origins::new(vec![origin("key", Type::String), origin("value", Type::Dynamic)]));
    let specified = PathDecoder::new(Arc::new(ctx)).semantic_tokens_in_file(FILENAME).unwrap();
    assert_eq!(specified, tokens);
}

fn dynamic_schema(dependent_blocks: BodySchema) -> BodySchema {
    BodySchema::new().with_block(
        "myblock",
        BlockSchema::new(BodySchema::new().with_extensions(BodyExtensions::DYNAMIC_BLOCKS))
            .with_labels(vec![
                LabelSchema::new("type")
                    .dep_key()
                    .completable()
                    .with_modifiers(vec![SemanticTokenModifier::DEPENDENT]),
                LabelSchema::new("name"),
            ])
            .with_dependent_body(SchemaKey::new(&DependencyKeys::label(0, "foo")), dependent_blocks),
    )
}

#[test]
fn test_dynamic_block() {
    let schema = dynamic_schema(BodySchema::new().with_block("setting", BlockSchema::new(BodySchema::new())));
    let config = r#"myblock "foo" "bar" {
  dynamic "setting" {
    content {}
  }
}
"#;

    let tokens = decoder(schema, config).semantic_tokens_in_file(FILENAME).unwrap();
    assert_eq!(
        tokens,
        vec![
            token(config, T::BlockType, vec![], 0, 7),
            token(config, T::BlockLabel, dependent(), 8, 13),
            token(config, T::BlockLabel, vec![], 14, 19),
            token(config, T::BlockType, vec![], 24, 31),
            token(config, T::BlockLabel, vec![], 32, 41),
            token(config, T::BlockType, vec![], 48, 55),
        ]
    );
}

#[test]
fn test_nested_dynamic_blocks() {
    let schema = dynamic_schema(BodySchema::new().with_block(
        "setting",
        BlockSchema::new(BodySchema::new().with_block("bar", BlockSchema::new(BodySchema::new()))),
    ));
    let config = r#"myblock "foo" "bar" {
  dynamic "setting" {
    content {
      dynamic "bar" {
        content {
        }
      }
    }
  }
}"#;

    let tokens = decoder(schema, config).semantic_tokens_in_file(FILENAME).unwrap();
    assert_eq!(
        tokens,
        vec![
            token(config, T::BlockType, vec![], 0, 7),
            token(config, T::BlockLabel, dependent(), 8, 13),
            token(config, T::BlockLabel, vec![], 14, 19),
            token(config, T::BlockType, vec![], 24, 31),
            token(config, T::BlockLabel, vec![], 32, 41),
            token(config, T::BlockType, vec![], 48, 55),
            token(config, T::BlockType, vec![], 64, 71),
            token(config, T::BlockLabel, vec![], 72, 77),
            token(config, T::BlockType, vec![], 88, 95),
        ]
    );
}

#[test]
fn test_dynamic_block_in_nested_static_blocks() {
    let schema = dynamic_schema(BodySchema::new().with_block(
        "setting",
        BlockSchema::new(BodySchema::new().with_block(
            "foo",
            BlockSchema::new(BodySchema::new().with_block("bar", BlockSchema::new(BodySchema::new()))),
        )),
    ));
    let config = "myblock \"foo\" \"bar\" {\n  setting {\n    foo {\n      dynamic \"bar\" {\n\n      }\n    }\n  }\n}";

    let tokens = decoder(schema, config).semantic_tokens_in_file(FILENAME).unwrap();
    assert_eq!(
        tokens,
        vec![
            token(config, T::BlockType, vec![], 0, 7),
            token(config, T::BlockLabel, dependent(), 8, 13),
            token(config, T::BlockLabel, vec![], 14, 19),
            token(config, T::BlockType, vec![], 24, 31),
            token(config, T::BlockType, vec![], 38, 41),
            token(config, T::BlockType, vec![], 50, 57),
            token(config, T::BlockLabel, vec![], 58, 63),
        ]
    );
}

#[test]
fn test_expression_tokens() {
    let schema = BodySchema::new()
        .with_attribute(
            "tags",
            AttributeSchema::new(Constraint::map(Constraint::literal_type(Type::String))),
        )
        .with_attribute(
            "settings",
            AttributeSchema::new(Constraint::object([
                ("enabled", AttributeSchema::new(Constraint::literal_type(Type::Bool))),
                ("size", AttributeSchema::new(Constraint::literal_type(Type::Number))),
            ])),
        )
        .with_attribute("mode", AttributeSchema::new(Constraint::keyword("auto")));
    let config = "tags = { env = \"prod\" }\nsettings = { enabled = true, size = 2 }\nmode = auto\n";

    let tokens = decoder(schema, config).semantic_tokens_in_file(FILENAME).unwrap();
    assert_eq!(
        tokens,
        vec![
            token(config, T::AttrName, vec![], 0, 4),
            token(config, T::MapKey, vec![], 9, 12),
            token(config, T::String, vec![], 15, 21),
            token(config, T::AttrName, vec![], 24, 32),
            token(config, T::ObjectKey, vec![], 37, 44),
            token(config, T::Bool, vec![], 47, 51),
            token(config, T::ObjectKey, vec![], 53, 57),
            token(config, T::Number, vec![], 60, 61),
            token(config, T::AttrName, vec![], 64, 68),
            token(config, T::Keyword, vec![], 71, 75),
        ]
    );
}
