//! Literal types and exact literal values.

use hclang_schema::constraint::{self, LiteralValue};
use hclang_schema::{
    AttributeSchema, Candidate, CandidateKind, Constraint, HoverData, SemanticToken,
    SemanticTokenType, Type, Value,
};
use hclang_syntax::ast::UnaryOp;
use hclang_syntax::{Expression, Literal, Span, Spanned};

use super::{
    candidate, candidate_kind_for_type, prefix_at, type_hover_text, unwrap_parens, ExprContext,
};

/// The value of a literal expression without references, if it has one.
pub(crate) fn static_value(expr: &Expression) -> Option<Value> {
    match expr {
        Expression::Literal(Literal::Number(_)) => number_value(expr).map(Value::Number),
        Expression::Literal(Literal::Bool(b)) => Some(Value::Bool(*b)),
        Expression::Template(template) => template.as_literal().map(Value::String),
        Expression::Unary {
            op: UnaryOp::Negate, ..
        } => number_value(expr).map(Value::Number),
        Expression::Tuple(tuple) => tuple
            .exprs
            .iter()
            .map(|e| static_value(e.value()))
            .collect::<Option<Vec<_>>>()
            .map(Value::Tuple),
        Expression::Object(object) => object
            .items
            .iter()
            .map(|item| Some((item.key.value().as_name()?, static_value(item.value.value())?)))
            .collect::<Option<_>>()
            .map(Value::Object),
        Expression::Parenthesized(inner) => static_value(inner.value()),
        _ => None,
    }
}

fn number_value(expr: &Expression) -> Option<f64> {
    match expr {
        Expression::Literal(lit) => lit.as_f64(),
        Expression::Unary {
            op: UnaryOp::Negate,
            operand,
        } => number_value(operand.value()).map(|n| -n),
        _ => None,
    }
}

/// Whether `expr` is written as exactly `want`. Tuples stand for lists and
/// sets, objects for maps.
fn value_matches(want: &Value, expr: &Spanned<Expression>) -> bool {
    let expr = unwrap_parens(expr);
    match (want, expr.value()) {
        (Value::List(items) | Value::Set(items) | Value::Tuple(items), Expression::Tuple(tuple)) => {
            items.len() == tuple.exprs.len()
                && items.iter().zip(&tuple.exprs).all(|(v, e)| value_matches(v, e))
        }
        (Value::Map(fields) | Value::Object(fields), Expression::Object(object)) => {
            fields.len() == object.items.len()
                && object.items.iter().all(|item| {
                    item.key
                        .value()
                        .as_name()
                        .and_then(|key| fields.get(&key))
                        .is_some_and(|v| value_matches(v, &item.value))
                })
        }
        (Value::String(_) | Value::Number(_) | Value::Bool(_), other) => {
            static_value(other).as_ref() == Some(want)
        }
        _ => false,
    }
}

/// Whether `expr` is a literal of the primitive type `ty`.
fn primitive_matches(ty: &Type, expr: &Expression) -> bool {
    match (ty, expr) {
        (Type::String, Expression::Template(template)) => template.as_literal().is_some(),
        (Type::Number, _) => number_value(expr).is_some(),
        (Type::Bool, Expression::Literal(Literal::Bool(_))) => true,
        _ => false,
    }
}

const fn primitive_token(ty: &Type) -> Option<SemanticTokenType> {
    match ty {
        Type::String => Some(SemanticTokenType::String),
        Type::Number => Some(SemanticTokenType::Number),
        Type::Bool => Some(SemanticTokenType::Bool),
        _ => None,
    }
}

/// Container constraint equivalent to a container type, with elements
/// described by `elem`.
pub(super) fn container_constraint(ty: &Type, elem: impl Fn(&Type) -> Constraint) -> Option<Constraint> {
    let cons = match ty {
        Type::List(t) => Constraint::list(elem(t)),
        Type::Set(t) => Constraint::set(elem(t)),
        Type::Map(t) => Constraint::Map(constraint::Map {
            elem: Some(Box::new(elem(t))),
            allow_interpolated_keys: true,
            ..constraint::Map::default()
        }),
        Type::Tuple(elems) => Constraint::tuple(elems.iter().map(&elem).collect()),
        Type::Object(fields) => Constraint::Object(constraint::Object {
            attributes: fields
                .iter()
                .map(|(name, t)| (name.clone(), AttributeSchema::new(elem(t))))
                .collect(),
            allow_interpolated_keys: true,
            ..constraint::Object::default()
        }),
        Type::String | Type::Number | Type::Bool | Type::Dynamic => return None,
    };
    Some(cons)
}

/// Label of a candidate inserting a value of type `ty`.
fn label_for_type(ty: &Type) -> String {
    match ty {
        Type::List(elem) | Type::Set(elem) => format!("[ {} ]", label_for_type(elem)),
        Type::Map(elem) => format!("{{ \"key\" = {} }}", label_for_type(elem)),
        Type::Tuple(elems) => {
            let labels: Vec<String> = elems.iter().map(label_for_type).collect();
            format!("[ {} ]", labels.join(", "))
        }
        Type::Object(fields) => {
            let labels: Vec<String> = fields
                .iter()
                .map(|(name, t)| format!("{name} = {}", label_for_type(t)))
                .collect();
            format!("{{ {} }}", labels.join(", "))
        }
        _ => ty.friendly_name(),
    }
}

fn bool_candidates(ctx: &ExprContext<'_>, prefix: &str, span: Span) -> Vec<Candidate> {
    ["true", "false"]
        .into_iter()
        .filter(|word| word.starts_with(prefix))
        .map(|word| candidate(ctx, word, CandidateKind::Bool, "bool", word, word, span))
        .collect()
}

/// Span replaced when completing `expr` at `pos`.
fn edit_span(expr: &Spanned<Expression>, pos: usize) -> Span {
    if expr.value().is_empty() {
        Span::from(pos..pos)
    } else {
        expr.span()
    }
}

pub(super) fn type_completion(ctx: &ExprContext<'_>, expr: &Spanned<Expression>, ty: &Type, pos: usize) -> Vec<Candidate> {
    if expr.value().is_empty() {
        return match ty {
            Type::Bool => bool_candidates(ctx, "", edit_span(expr, pos)),
            Type::Dynamic => Vec::new(),
            _ => {
                let data = Constraint::literal_type(ty.clone()).empty_completion_data(1, 0);
                let mut c = candidate(
                    ctx,
                    label_for_type(ty),
                    candidate_kind_for_type(ty),
                    ty.friendly_name(),
                    data.new_text,
                    data.snippet,
                    edit_span(expr, pos),
                );
                c.trigger_suggest = data.trigger_suggest;
                vec![c]
            }
        };
    }
    if *ty == Type::Bool {
        return prefix_at(ctx, expr, pos)
            .map(|prefix| bool_candidates(ctx, &prefix, expr.span()))
            .unwrap_or_default();
    }
    container_constraint(ty, |t| Constraint::literal_type(t.clone()))
        .map(|cons| ctx.completion_at_pos(expr, &cons, pos))
        .unwrap_or_default()
}

pub(super) fn type_hover(ctx: &ExprContext<'_>, expr: &Spanned<Expression>, ty: &Type, pos: usize) -> Option<HoverData> {
    let inner = unwrap_parens(expr);
    match (ty, inner.value()) {
        (Type::String | Type::Number | Type::Bool, value) => primitive_matches(ty, value)
            .then(|| ctx.hover(format!("_{}_", ty.friendly_name()), expr.span())),
        (Type::Object(_), Expression::Object(_)) => Some(ctx.hover(
            format!("```\n{}\n```\n_object_", ty.type_signature()),
            expr.span(),
        )),
        _ => container_constraint(ty, |t| Constraint::literal_type(t.clone()))
            .and_then(|cons| ctx.hover_at_pos(expr, &cons, pos)),
    }
}

pub(super) fn type_tokens(ctx: &ExprContext<'_>, expr: &Spanned<Expression>, ty: &Type) -> Vec<SemanticToken> {
    if let Some(token_type) = primitive_token(ty) {
        if primitive_matches(ty, unwrap_parens(expr).value()) {
            return vec![ctx.token(token_type, expr.span())];
        }
        return Vec::new();
    }
    container_constraint(ty, |t| Constraint::literal_type(t.clone()))
        .map(|cons| ctx.semantic_tokens(expr, &cons))
        .unwrap_or_default()
}

pub(super) fn value_completion(
    ctx: &ExprContext<'_>,
    expr: &Spanned<Expression>,
    cons: &LiteralValue,
    pos: usize,
) -> Vec<Candidate> {
    let ty = cons.value.ty();
    let label = cons.value.literal_text().unwrap_or_else(|| label_for_type(&ty));
    let span = if expr.value().is_empty() {
        edit_span(expr, pos)
    } else {
        match (&cons.value, prefix_at(ctx, expr, pos)) {
            (Value::Bool(_), Some(prefix)) if label.starts_with(&prefix) => expr.span(),
            _ => return Vec::new(),
        }
    };
    let data = Constraint::LiteralValue(cons.clone()).empty_completion_data(1, 0);
    let mut c = candidate(
        ctx,
        label,
        candidate_kind_for_type(&ty),
        ty.friendly_name(),
        data.new_text,
        data.snippet,
        span,
    );
    c.description = cons.description.clone();
    c.is_deprecated = cons.is_deprecated;
    vec![c]
}

pub(super) fn value_hover(ctx: &ExprContext<'_>, expr: &Spanned<Expression>, cons: &LiteralValue) -> Option<HoverData> {
    if !value_matches(&cons.value, expr) {
        return None;
    }
    let ty = cons.value.ty();
    let content = match ty {
        Type::Object(_) => super::with_description(
            format!("```\n{}\n```\n_object_", ty.type_signature()),
            &cons.description,
        ),
        _ => type_hover_text(&ty.friendly_name(), &cons.description),
    };
    Some(ctx.hover(content, expr.span()))
}

pub(super) fn value_tokens(ctx: &ExprContext<'_>, expr: &Spanned<Expression>, cons: &LiteralValue) -> Vec<SemanticToken> {
    if !value_matches(&cons.value, expr) {
        return Vec::new();
    }
    let mut tokens = Vec::new();
    value_tokens_into(ctx, &cons.value, expr, &mut tokens);
    tokens
}

fn value_tokens_into(ctx: &ExprContext<'_>, value: &Value, expr: &Spanned<Expression>, out: &mut Vec<SemanticToken>) {
    let inner = unwrap_parens(expr);
    match (value, inner.value()) {
        (Value::List(items) | Value::Set(items) | Value::Tuple(items), Expression::Tuple(tuple)) => {
            for (item, elem) in items.iter().zip(&tuple.exprs) {
                value_tokens_into(ctx, item, elem, out);
            }
        }
        (Value::Map(fields) | Value::Object(fields), Expression::Object(object)) => {
            let key_type = if matches!(value, Value::Map(_)) {
                SemanticTokenType::MapKey
            } else {
                SemanticTokenType::ObjectKey
            };
            for item in &object.items {
                let Some(field) = item.key.value().as_name().and_then(|k| fields.get(&k)) else {
                    continue;
                };
                out.push(ctx.token(key_type, item.key.span()));
                value_tokens_into(ctx, field, &item.value, out);
            }
        }
        (primitive, _) => {
            if let Some(token_type) = primitive_token(&primitive.ty()) {
                out.push(ctx.token(token_type, expr.span()));
            }
        }
    }
}
