use hclang_decoder::DecoderError;
use hclang_schema::{
    AddrStep, AttributeAddrSchema, AttributeSchema, BlockSchema, BodySchema, Constraint, DependencyKeys,
    FunctionParameter, FunctionSignature, HoverData, LabelSchema, MarkupContent, SchemaKey, Type,
};
use hclang_syntax::Pos;
use pretty_assertions::assert_eq;

use crate::{decoder, indexed, offset, pos, range, FILENAME};

const CONFIG: &str = r#"name = "demo"
settings = { enabled = true, size = 2 }
tags = { env = "prod" }
resource "aws_instance" "web" {
  instance_type = "t2.micro"
}
"#;

fn schema() -> BodySchema {
    let instance = BodySchema {
        description: MarkupContent::markdown("An EC2 instance"),
        ..BodySchema::new().with_attribute("instance_type", AttributeSchema::new(Constraint::literal_type(Type::String)))
    };
    BodySchema::new()
        .with_attribute(
            "name",
            AttributeSchema::new(Constraint::literal_type(Type::String))
                .required()
                .with_description(MarkupContent::markdown("Name of the thing")),
        )
        .with_attribute(
            "settings",
            AttributeSchema::new(Constraint::object([
                ("enabled", AttributeSchema::new(Constraint::literal_type(Type::Bool))),
                ("size", AttributeSchema::new(Constraint::literal_type(Type::Number))),
            ])),
        )
        .with_attribute(
            "tags",
            AttributeSchema::new(Constraint::map(Constraint::literal_type(Type::String))),
        )
        .with_block(
            "resource",
            BlockSchema::new(BodySchema::new())
                .with_description(MarkupContent::markdown("A managed resource"))
                .with_labels(vec![
                    LabelSchema::new("type").dep_key().completable(),
                    LabelSchema {
                        description: MarkupContent::plain_text("Name of the resource"),
                        ..LabelSchema::new("name")
                    },
                ])
                .with_dependent_body(SchemaKey::new(&DependencyKeys::label(0, "aws_instance")), instance),
        )
}

fn hover_at(config: &str, byte: usize) -> Option<HoverData> {
    decoder(schema(), config).hover_at_pos(FILENAME, pos(config, byte)).unwrap()
}

fn expected(config: &str, content: &str, start: usize, end: usize) -> Option<HoverData> {
    Some(HoverData {
        content: MarkupContent::markdown(content),
        range: range(config, start, end),
    })
}

#[test]
fn test_attribute_name() {
    assert_eq!(
        hover_at(CONFIG, 1),
        expected(CONFIG, "**name** _required, string_\n\nName of the thing", 0, 13)
    );
}

#[test]
fn test_literal_value() {
    assert_eq!(hover_at(CONFIG, 9), expected(CONFIG, "_string_", 7, 13));
}

#[test]
fn test_block_type() {
    assert_eq!(
        hover_at(CONFIG, 80),
        expected(CONFIG, "**resource** _Block_\n\nA managed resource", 78, 86)
    );
}

#[test]
fn test_dependency_key_label() {
    assert_eq!(
        hover_at(CONFIG, 90),
        expected(CONFIG, "`aws_instance`\n\nAn EC2 instance", 87, 101)
    );
}

#[test]
fn test_plain_label() {
    assert_eq!(
        hover_at(CONFIG, 104),
        expected(CONFIG, "\"web\"\n\nName of the resource", 102, 107)
    );
}

#[test]
fn test_attribute_from_dependent_body() {
    assert_eq!(
        hover_at(CONFIG, 115),
        expected(CONFIG, "**instance_type** _string_", 112, 138)
    );
}

#[test]
fn test_object_attribute_key() {
    assert_eq!(hover_at(CONFIG, 29), expected(CONFIG, "**enabled** _bool_", 27, 41));
}

#[test]
fn test_object_value() {
    assert_eq!(hover_at(CONFIG, 50), expected(CONFIG, "_number_", 50, 51));
}

#[test]
fn test_object_signature() {
    let hover = hover_at(CONFIG, 25).unwrap();
    assert_eq!(hover.range, range(CONFIG, 25, 53));
    insta::assert_snapshot!(hover.content.as_str(), @r"
```
{
  enabled = bool
  size = number
}
```
_object_
");
}

#[test]
fn test_map() {
    assert_eq!(hover_at(CONFIG, 61), expected(CONFIG, "_map of string_", 61, 77));
    assert_eq!(hover_at(CONFIG, 70), expected(CONFIG, "_string_", 69, 75));
}

#[test]
fn test_nothing_to_hover() {
    let config = "unknown = 1\n\nname = \"x\"\n";
    assert_eq!(hover_at(config, 2), None);
    assert_eq!(hover_at(config, 12), None);
}

#[test]
fn test_position_out_of_range() {
    let decoder = decoder(schema(), CONFIG);
    let err = decoder
        .hover_at_pos(FILENAME, Pos::new(20, 1, 500))
        .unwrap_err();
    assert_eq!(
        err,
        DecoderError::PosOutOfRange {
            filename: FILENAME.to_string(),
            byte: 500,
            len: CONFIG.len(),
        }
    );
}

#[test]
fn test_reference() {
    let schema = BodySchema::new()
        .with_block(
            "locals",
            BlockSchema::new(BodySchema::new().with_any_attribute(
                AttributeSchema::new(Constraint::literal_type(Type::String)).with_address(AttributeAddrSchema {
                    steps: vec![AddrStep::Static("local".into()), AddrStep::AttrName],
                    as_expr_type: true,
                    ..AttributeAddrSchema::default()
                }),
            )),
        )
        .with_attribute("ref", AttributeSchema::new(Constraint::reference_of_type(Type::String)));
    let config = "locals {\n  greeting = \"hello\"\n}\nref = local.greeting\n";

    let decoder = indexed(decoder(schema, config));
    let start = offset(config, "local.greeting");
    let hover = decoder.hover_at_pos(FILENAME, pos(config, start + 7)).unwrap();
    assert_eq!(
        hover,
        expected(config, "`local.greeting`\n_string_", start, start + 14)
    );
}

#[test]
fn test_function_name() {
    let ctx = crate::path_context(
        BodySchema::new().with_attribute("val", AttributeSchema::new(Constraint::any_expression(Type::String))),
        "val = upper(\"x\")\n",
    )
    .with_function(
        "upper",
        FunctionSignature {
            description: MarkupContent::markdown("Converts letters to uppercase."),
            params: vec![FunctionParameter {
                name: "str".into(),
                description: MarkupContent::default(),
                ty: Type::String,
            }],
            variadic_param: None,
            return_type: Type::String,
        },
    );
    let decoder = hclang_decoder::PathDecoder::new(std::sync::Arc::new(ctx));
    let config = "val = upper(\"x\")\n";

    let hover = decoder.hover_at_pos(FILENAME, pos(config, 7)).unwrap().unwrap();
    assert_eq!(hover.range, range(config, 6, 11));
    insta::assert_snapshot!(hover.content.as_str(), @r"
```
upper(str string) string
```

Converts letters to uppercase.
");
    assert_eq!(
        decoder.hover_at_pos(FILENAME, pos(config, 13)).unwrap(),
        expected(config, "_string_", 12, 15)
    );
}
