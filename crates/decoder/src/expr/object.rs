//! Objects with a fixed set of attributes.

use hclang_reference::Origin;
use hclang_schema::constraint::Object;
use hclang_schema::{Candidate, CandidateKind, Constraint, HoverData, SemanticToken, SemanticTokenType};
use hclang_syntax::{Expression, Span, Spanned};

use super::map::{inside_braces, key_origin, object_of};
use super::{candidate, contains, contains_or_end, with_description, ExprContext};

pub(super) fn completion(
    ctx: &ExprContext<'_>,
    expr: &Spanned<Expression>,
    cons: &Constraint,
    c: &Object,
    pos: usize,
) -> Vec<Candidate> {
    if expr.value().is_empty() {
        let data = cons.empty_completion_data(1, 0);
        let mut entry = candidate(
            ctx,
            "{ }",
            CandidateKind::Object,
            cons.friendly_name(),
            data.new_text,
            data.snippet,
            Span::from(pos..pos),
        );
        entry.description = c.description.clone();
        return vec![entry];
    }
    let Some(object) = object_of(expr) else {
        return Vec::new();
    };
    if !inside_braces(object, pos) {
        return Vec::new();
    }

    let mut prefix = "";
    let mut span = Span::from(pos..pos);
    for item in &object.items {
        let key = item.key.span();
        if item.value.value().is_empty() && item.key.value().is_bare() && contains_or_end(key, pos) {
            // A name typed without `=` yet
            prefix = ctx.text(Span::from(key.start..pos));
            span = key;
            break;
        }
        if pos > key.end && contains_or_end(item.value.span(), pos) {
            return item
                .key
                .value()
                .as_name()
                .and_then(|name| c.attributes.get(&name))
                .map(|attr| ctx.completion_at_pos(&item.value, &attr.constraint, pos))
                .unwrap_or_default();
        }
        if contains_or_end(item.span, pos) {
            return Vec::new();
        }
    }

    let declared: Vec<String> = object
        .items
        .iter()
        .filter(|item| !item.value.value().is_empty())
        .filter_map(|item| item.key.value().as_name())
        .collect();
    let mut names: Vec<&String> = c
        .attributes
        .keys()
        .filter(|name| name.starts_with(prefix) && !declared.contains(name))
        .collect();
    names.sort();
    names
        .into_iter()
        .filter_map(|name| {
            let attr = c.attributes.get(name)?;
            let data = attr.constraint.empty_completion_data(1, 1);
            let mut entry = candidate(
                ctx,
                name.as_str(),
                CandidateKind::Attribute,
                attr.detail(),
                format!("{name} = {}", data.new_text),
                format!("{name} = {}", data.snippet),
                span,
            );
            entry.description = attr.description.clone();
            entry.is_deprecated = attr.is_deprecated;
            entry.trigger_suggest = data.trigger_suggest;
            Some(entry)
        })
        .collect()
}

pub(super) fn hover(
    ctx: &ExprContext<'_>,
    expr: &Spanned<Expression>,
    cons: &Constraint,
    c: &Object,
    pos: usize,
) -> Option<HoverData> {
    let object = object_of(expr)?;
    for item in &object.items {
        let Some(name) = item.key.value().as_name() else {
            continue;
        };
        let Some(attr) = c.attributes.get(&name) else {
            continue;
        };
        if contains(item.key.span(), pos) {
            let content = with_description(format!("**{name}** _{}_", attr.detail()), &attr.description);
            return Some(ctx.hover(content, item.span));
        }
        if contains(item.value.span(), pos) {
            return ctx.hover_at_pos(&item.value, &attr.constraint, pos);
        }
    }
    let content = format!("```\n{}\n```\n_{}_", cons.signature(), cons.friendly_name());
    Some(ctx.hover(with_description(content, &c.description), expr.span()))
}

pub(super) fn tokens(ctx: &ExprContext<'_>, expr: &Spanned<Expression>, c: &Object) -> Vec<SemanticToken> {
    let Some(object) = object_of(expr) else {
        return Vec::new();
    };
    let mut tokens = Vec::new();
    for item in &object.items {
        let Some(attr) = item.key.value().as_name().and_then(|name| c.attributes.get(&name)) else {
            continue;
        };
        tokens.push(ctx.token(SemanticTokenType::ObjectKey, item.key.span()));
        tokens.extend(ctx.semantic_tokens(&item.value, &attr.constraint));
    }
    tokens
}

pub(super) fn origins(ctx: &ExprContext<'_>, expr: &Spanned<Expression>, c: &Object) -> Vec<Origin> {
    let Some(object) = object_of(expr) else {
        return Vec::new();
    };
    let mut origins = Vec::new();
    for item in &object.items {
        if c.allow_interpolated_keys {
            origins.extend(key_origin(ctx, item));
        }
        if let Some(attr) = item.key.value().as_name().and_then(|name| c.attributes.get(&name)) {
            origins.extend(ctx.reference_origins(&item.value, &attr.constraint));
        }
    }
    origins
}
