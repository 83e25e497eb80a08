//! Maps written as `{ key = value }` with arbitrary keys.

use hclang_reference::{Origin, OriginConstraint, OriginConstraints};
use hclang_schema::constraint::Map;
use hclang_schema::{Candidate, CandidateKind, Constraint, HoverData, SemanticToken, SemanticTokenType, Type};
use hclang_syntax::ast::{ObjectCons, ObjectItem};
use hclang_syntax::{Expression, Span, Spanned};

use super::reference::traversal_address;
use super::{candidate, contains, contains_or_end, type_hover_text, unwrap_parens, ExprContext};

pub(super) fn object_of(expr: &Spanned<Expression>) -> Option<&ObjectCons> {
    match unwrap_parens(expr).value() {
        Expression::Object(object) => Some(object),
        _ => None,
    }
}

/// Whether `pos` is between the braces of `object`.
pub(super) const fn inside_braces(object: &ObjectCons, pos: usize) -> bool {
    object.open.end <= pos && pos <= object.close.start
}

/// Origin of a parenthesized key referring to something, e.g. `(var.key)`.
pub(super) fn key_origin(ctx: &ExprContext<'_>, item: &ObjectItem) -> Option<Origin> {
    let key = item.key.value();
    match &key.expr {
        Expression::Traversal(traversal) if key.force_non_literal => Some(
            Origin::new(traversal_address(traversal), ctx.range(item.key.span()))
                .with_constraints(OriginConstraints::new(vec![OriginConstraint::of_type(Type::String)])),
        ),
        _ => None,
    }
}

fn label_of(c: &Map) -> String {
    match &c.elem {
        Some(elem) => format!("{{ \"key\" = {} }}", elem.friendly_name()),
        None => "{ }".to_string(),
    }
}

pub(super) fn completion(
    ctx: &ExprContext<'_>,
    expr: &Spanned<Expression>,
    cons: &Constraint,
    c: &Map,
    pos: usize,
) -> Vec<Candidate> {
    if expr.value().is_empty() {
        let data = cons.empty_completion_data(1, 0);
        let mut entry = candidate(
            ctx,
            label_of(c),
            CandidateKind::Map,
            cons.friendly_name(),
            data.new_text,
            data.snippet,
            Span::from(pos..pos),
        );
        entry.description = c.description.clone();
        entry.trigger_suggest = data.trigger_suggest;
        return vec![entry];
    }
    let Some(object) = object_of(expr) else {
        return Vec::new();
    };
    if !inside_braces(object, pos) {
        return Vec::new();
    }
    let Some(elem) = c.elem.as_deref() else {
        return Vec::new();
    };
    for item in &object.items {
        if contains_or_end(item.value.span(), pos) && pos > item.key.span().end {
            return ctx.completion_at_pos(&item.value, elem, pos);
        }
        if contains_or_end(item.span, pos) {
            return Vec::new();
        }
    }

    let data = elem.empty_completion_data(2, 1);
    vec![candidate(
        ctx,
        format!("\"key\" = {}", elem.friendly_name()),
        CandidateKind::Map,
        elem.friendly_name(),
        format!("\"key\" = {}", data.new_text),
        format!("\"${{1:key}}\" = {}", data.snippet),
        Span::from(pos..pos),
    )]
}

pub(super) fn hover(
    ctx: &ExprContext<'_>,
    expr: &Spanned<Expression>,
    cons: &Constraint,
    c: &Map,
    pos: usize,
) -> Option<HoverData> {
    let object = object_of(expr)?;
    if let Some(elem) = c.elem.as_deref() {
        let value_hover = object
            .items
            .iter()
            .find(|item| contains(item.value.span(), pos))
            .and_then(|item| ctx.hover_at_pos(&item.value, elem, pos));
        if value_hover.is_some() {
            return value_hover;
        }
    }
    Some(ctx.hover(type_hover_text(&cons.friendly_name(), &c.description), expr.span()))
}

pub(super) fn tokens(ctx: &ExprContext<'_>, expr: &Spanned<Expression>, c: &Map) -> Vec<SemanticToken> {
    let Some(object) = object_of(expr) else {
        return Vec::new();
    };
    let mut tokens = Vec::new();
    for item in &object.items {
        if item.key.value().as_name().is_some() {
            tokens.push(ctx.token(SemanticTokenType::MapKey, item.key.span()));
        }
        if let Some(elem) = c.elem.as_deref() {
            tokens.extend(ctx.semantic_tokens(&item.value, elem));
        }
    }
    tokens
}

pub(super) fn origins(ctx: &ExprContext<'_>, expr: &Spanned<Expression>, c: &Map) -> Vec<Origin> {
    let Some(object) = object_of(expr) else {
        return Vec::new();
    };
    let mut origins = Vec::new();
    for item in &object.items {
        if c.allow_interpolated_keys {
            origins.extend(key_origin(ctx, item));
        }
        if let Some(elem) = c.elem.as_deref() {
            origins.extend(ctx.reference_origins(&item.value, elem));
        }
    }
    origins
}
