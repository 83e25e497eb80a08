use hclang_syntax::{parse_config, parse_json, BodyItem, Expression, File, FileBody, Pos, TemplatePart};
use pretty_assertions::assert_eq;

use crate::parse_ok;

#[test]
fn test_ranges_of_nested_block() {
    let file = parse_ok("resource \"aws\" \"x\" {\n  tags = {\n    a = \"b\"\n  }\n}\n");
    let body = file.native_body().expect("native body");
    let block = body.blocks().next().expect("block");
    let tags = block.body.attribute("tags").expect("tags");

    let name_range = file.range(tags.name.span());
    assert_eq!(name_range.start, Pos::new(2, 3, 23));
    assert_eq!(name_range.end, Pos::new(2, 7, 27));
    assert_eq!(file.text(tags.expr.span()), "{\n    a = \"b\"\n  }");
}

#[test]
fn test_template_with_interpolation() {
    let file = parse_ok("name = \"pre-${var.env}\"\n");
    let body = file.native_body().expect("native body");
    let Expression::Template(template) = body.attribute("name").expect("name").expr.value() else {
        panic!("expected template");
    };
    assert_eq!(template.parts.len(), 2);
    let TemplatePart::Interpolation(expr) = &template.parts[1] else {
        panic!("expected interpolation");
    };
    assert_eq!(file.text(expr.span()), "var.env");
}

#[test]
fn test_heredoc_value() {
    let file = parse_ok("doc = <<EOT\nline one\nEOT\nnext = 1\n");
    let body = file.native_body().expect("native body");
    let Expression::Template(template) = body.attribute("doc").expect("doc").expr.value() else {
        panic!("expected template");
    };
    assert!(template.heredoc);
    assert_eq!(template.as_literal().as_deref(), Some("line one\n"));
    assert!(body.attribute("next").is_some());
}

#[test]
fn test_zero_byte_file_is_native_and_empty() {
    let file = parse_config(b"", "empty.hcl");
    assert!(matches!(file.body(), FileBody::Native(body) if body.is_empty()));
    assert!(!file.has_errors());
}

#[test]
fn test_unclassified_file() {
    let file = File::empty("placeholder.hcl");
    assert_eq!(file.body(), &FileBody::Unknown);
}

#[test]
fn test_json_variant() {
    let file = parse_json(br#"{"module": {"x": {"source": "./sub"}}}"#, "test.hcl.json");
    assert!(matches!(file.body(), FileBody::Json(value) if value.get("module").is_some()));
    assert!(file.native_body().is_none());

    let broken = parse_json(b"{", "broken.hcl.json");
    assert!(broken.has_errors());
}

#[test]
fn test_invalid_utf8() {
    let file = parse_config(&[b'a', 0xff, b'\n'], "bad.hcl");
    assert!(file.has_errors());
    assert_eq!(file.body(), &FileBody::Unknown);
}

#[test]
fn test_block_item_order_is_preserved() {
    let file = parse_ok("a = 1\nb {\n}\nc = 2\n");
    let body = file.native_body().expect("native body");
    let kinds: Vec<&str> = body
        .items
        .iter()
        .map(|item| match item {
            BodyItem::Attribute(_) => "attribute",
            BodyItem::Block(_) => "block",
        })
        .collect();
    assert_eq!(kinds, vec!["attribute", "block", "attribute"]);
}
