use hclang_syntax::{parse_config, Expression};

#[test]
fn test_cursor_after_equals_yields_empty_value() {
    let file = parse_config(b"module \"x\" {\n  source = \n}\n", "test.hcl");
    assert!(file.has_errors());
    let body = file.native_body().expect("native body");
    let block = body.blocks().next().expect("block");
    let source = block.body.attribute("source").expect("source");
    assert_eq!(source.expr.value(), &Expression::Empty);
    assert_eq!(source.expr.span().start, 23);
}

#[test]
fn test_reports_render_without_color() {
    let file = parse_config(b"attr = var.\n", "test.hcl");
    let reports = file.render_diagnostics(false);
    assert_eq!(reports.len(), 1);
    assert!(reports[0].contains("Invalid attribute name"));
}

#[test]
fn test_unterminated_string_keeps_other_blocks() {
    let file = parse_config(b"a = \"open\nb {\n  c = 1\n}\n", "test.hcl");
    assert!(file.has_errors());
    let body = file.native_body().expect("native body");
    assert!(body.blocks().any(|block| block.block_type.value() == "b"));
}
