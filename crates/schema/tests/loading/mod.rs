use hclang_schema::{
    BodyExtensions, BodySchema, Constraint, MarkupKind, SemanticTokenModifier, Type,
};
use pretty_assertions::assert_eq;

const MODULE_SCHEMA: &str = r#"{
  "blocks": {
    "module": {
      "labels": [{ "name": "name" }],
      "description": { "kind": "markdown", "value": "A module call" },
      "body": {
        "attributes": {
          "source": {
            "is_required": true,
            "is_deprecated": true,
            "constraint": { "kind": "literal_type", "type": "string" },
            "semantic_token_modifiers": ["hcl-dependent"]
          },
          "count": {
            "is_optional": true,
            "constraint": { "kind": "literal_type", "type": "number" }
          }
        },
        "extensions": "COUNT | FOR_EACH"
      }
    }
  }
}"#;

#[test]
fn test_body_schema_from_json() {
    let schema: BodySchema = serde_json::from_str(MODULE_SCHEMA).expect("valid schema");
    let module = schema.block("module").expect("module block");
    assert_eq!(module.labels[0].name, "name");
    assert_eq!(module.description.kind, MarkupKind::Markdown);

    let body = module.body.as_ref().expect("module body");
    let names: Vec<&str> = body.attributes.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["source", "count"]);
    assert_eq!(
        body.attributes["source"].semantic_token_modifiers,
        vec![SemanticTokenModifier::DEPENDENT]
    );
    assert_eq!(
        body.attributes["count"].constraint,
        Constraint::literal_type(Type::Number)
    );
    assert_eq!(body.extensions, BodyExtensions::COUNT | BodyExtensions::FOR_EACH);
}

#[test]
fn test_constraint_serde_roundtrip_for_nested_containers() {
    let cons = Constraint::one_of(vec![
        Constraint::reference_of_scope("variable"),
        Constraint::list(Constraint::map(Constraint::literal_type(Type::Bool))),
    ]);
    let encoded = serde_json::to_string(&cons).expect("serializable");
    let decoded: Constraint = serde_json::from_str(&encoded).expect("deserializable");
    assert_eq!(decoded, cons);
    assert_eq!(decoded.friendly_name(), "reference or list of map of bool");
}
