//! Arbitrary expressions producing a value of a given type: operators,
//! conditionals, templates, `for` expressions, references, function calls
//! and literals.

use hclang_reference::target::type_compatible;
use hclang_reference::{Origin, OriginConstraint, OriginConstraints};
use hclang_schema::constraint::Reference;
use hclang_schema::{
    Candidate, Constraint, HoverData, MarkupContent, SemanticToken, SemanticTokenType, Type,
};
use hclang_syntax::ast::{BinaryOp, UnaryOp};
use hclang_syntax::{Expression, Literal, Spanned};

use super::literal::container_constraint;
use super::reference::traversal_address;
use super::{contains, contains_or_end, function, literal, reference, type_hover_text, ExprContext};

fn any_of(ty: &Type) -> Constraint {
    Constraint::any_expression(ty.clone())
}

/// Type of a literal written directly in the source.
fn literal_type(expr: &Expression) -> Option<Type> {
    match expr {
        Expression::Literal(Literal::Number(_)) => Some(Type::Number),
        Expression::Literal(Literal::Bool(_)) => Some(Type::Bool),
        Expression::Template(template) if template.as_literal().is_some() => Some(Type::String),
        _ => None,
    }
}

/// Container constraint for `ty`, if `expr` is written with the matching
/// syntax.
fn container_for(expr: &Expression, ty: &Type) -> Option<Constraint> {
    match (expr, ty) {
        (Expression::Tuple(_), Type::List(_) | Type::Set(_) | Type::Tuple(_))
        | (Expression::Object(_), Type::Map(_) | Type::Object(_)) => container_constraint(ty, any_of),
        _ => None,
    }
}

/// Sub-expressions of `expr` paired with the type each is expected to
/// produce. Function arguments are handled by [`function`].
fn operands<'e>(expr: &'e Expression, ty: &Type) -> Vec<(&'e Spanned<Expression>, Type)> {
    match expr {
        Expression::Literal(_) | Expression::Traversal(_) | Expression::FunctionCall(_) | Expression::Empty => {
            Vec::new()
        }
        Expression::Template(template) => template.interpolations().map(|e| (e, Type::Dynamic)).collect(),
        Expression::RelativeTraversal { source, .. } => vec![(&**source, Type::Dynamic)],
        Expression::Tuple(tuple) => tuple
            .exprs
            .iter()
            .enumerate()
            .map(|(index, elem)| {
                let elem_ty = match ty {
                    Type::List(t) | Type::Set(t) => (**t).clone(),
                    Type::Tuple(types) => types.get(index).cloned().unwrap_or(Type::Dynamic),
                    _ => Type::Dynamic,
                };
                (elem, elem_ty)
            })
            .collect(),
        Expression::Object(object) => object
            .items
            .iter()
            .map(|item| {
                let value_ty = match ty {
                    Type::Map(t) => (**t).clone(),
                    Type::Object(fields) => item
                        .key
                        .value()
                        .as_name()
                        .and_then(|key| fields.get(&key).cloned())
                        .unwrap_or(Type::Dynamic),
                    _ => Type::Dynamic,
                };
                (&item.value, value_ty)
            })
            .collect(),
        Expression::Index { collection, key, .. } => vec![(&**collection, Type::Dynamic), (&**key, Type::Dynamic)],
        Expression::Unary { op, operand } => {
            let operand_ty = match op {
                UnaryOp::Negate => Type::Number,
                UnaryOp::Not => Type::Bool,
            };
            vec![(&**operand, operand_ty)]
        }
        Expression::Binary { op, lhs, rhs } => {
            let operand_ty = match op {
                BinaryOp::And | BinaryOp::Or => Type::Bool,
                BinaryOp::Eq | BinaryOp::NotEq => Type::Dynamic,
                _ => Type::Number,
            };
            vec![(&**lhs, operand_ty.clone()), (&**rhs, operand_ty)]
        }
        Expression::Conditional {
            condition,
            true_result,
            false_result,
        } => vec![
            (&**condition, Type::Bool),
            (&**true_result, ty.clone()),
            (&**false_result, ty.clone()),
        ],
        Expression::For(for_expr) => {
            let mut out = vec![(&for_expr.collection, Type::Dynamic)];
            if let Some(key) = &for_expr.key_expr {
                out.push((key, Type::String));
            }
            let value_ty = match ty {
                Type::List(t) | Type::Set(t) | Type::Map(t) => (**t).clone(),
                _ => Type::Dynamic,
            };
            out.push((&for_expr.value_expr, value_ty));
            if let Some(condition) = &for_expr.condition {
                out.push((condition, Type::Bool));
            }
            out
        }
        Expression::Parenthesized(inner) => vec![(&**inner, ty.clone())],
    }
}

pub(super) fn completion(ctx: &ExprContext<'_>, expr: &Spanned<Expression>, ty: &Type, pos: usize) -> Vec<Candidate> {
    let reference = Reference {
        of_type: Some(ty.clone()),
        ..Reference::default()
    };
    match expr.value() {
        Expression::Empty => {
            let mut candidates = if ty.is_dynamic() {
                Vec::new()
            } else {
                literal::type_completion(ctx, expr, ty, pos)
            };
            candidates.extend(reference::completion(ctx, expr, &reference, pos));
            candidates.extend(function::completion(ctx, expr, Some(ty), pos));
            candidates
        }
        Expression::Traversal(traversal) => {
            let mut candidates = Vec::new();
            if traversal.is_bare() && *ty == Type::Bool {
                candidates.extend(literal::type_completion(ctx, expr, ty, pos));
            }
            candidates.extend(reference::completion(ctx, expr, &reference, pos));
            if traversal.is_bare() {
                candidates.extend(function::completion(ctx, expr, Some(ty), pos));
            }
            candidates
        }
        Expression::FunctionCall(_) => function::completion(ctx, expr, Some(ty), pos),
        value => {
            if let Some(cons) = container_for(value, ty) {
                return ctx.completion_at_pos(expr, &cons, pos);
            }
            operands(value, ty)
                .into_iter()
                .find(|(child, _)| contains_or_end(child.span(), pos))
                .map(|(child, child_ty)| completion(ctx, child, &child_ty, pos))
                .unwrap_or_default()
        }
    }
}

pub(super) fn hover(ctx: &ExprContext<'_>, expr: &Spanned<Expression>, ty: &Type, pos: usize) -> Option<HoverData> {
    match expr.value() {
        Expression::Traversal(_) => reference::hover(ctx, expr, pos),
        Expression::FunctionCall(_) => function::hover(ctx, expr, Some(ty), pos),
        value => {
            if let Some(own) = literal_type(value) {
                return type_compatible(&own, ty)
                    .then(|| ctx.hover(type_hover_text(&own.friendly_name(), &MarkupContent::default()), expr.span()));
            }
            if let Some(cons) = container_for(value, ty) {
                return ctx.hover_at_pos(expr, &cons, pos);
            }
            operands(value, ty)
                .into_iter()
                .find(|(child, _)| contains(child.span(), pos))
                .and_then(|(child, child_ty)| hover(ctx, child, &child_ty, pos))
        }
    }
}

pub(super) fn tokens(ctx: &ExprContext<'_>, expr: &Spanned<Expression>, ty: &Type) -> Vec<SemanticToken> {
    match expr.value() {
        Expression::Traversal(_) => reference::tokens(ctx, expr),
        Expression::FunctionCall(_) => function::tokens(ctx, expr, Some(ty)),
        value => {
            if let Some(own) = literal_type(value) {
                if !type_compatible(&own, ty) {
                    return Vec::new();
                }
                let token_type = match own {
                    Type::Number => SemanticTokenType::Number,
                    Type::Bool => SemanticTokenType::Bool,
                    _ => SemanticTokenType::String,
                };
                return vec![ctx.token(token_type, expr.span())];
            }
            if let Some(cons) = container_for(value, ty) {
                return ctx.semantic_tokens(expr, &cons);
            }
            operands(value, ty)
                .into_iter()
                .flat_map(|(child, child_ty)| tokens(ctx, child, &child_ty))
                .collect()
        }
    }
}

pub(super) fn origins(ctx: &ExprContext<'_>, expr: &Spanned<Expression>, ty: &Type) -> Vec<Origin> {
    let mut out = Vec::new();
    origins_into(ctx, expr, ty, &[], &mut out);
    out
}

/// Collects origins of `expr`, skipping traversals rooted in one of the
/// `locals` introduced by enclosing `for` expressions.
pub(super) fn origins_into(
    ctx: &ExprContext<'_>,
    expr: &Spanned<Expression>,
    ty: &Type,
    locals: &[&str],
    out: &mut Vec<Origin>,
) {
    match expr.value() {
        Expression::Traversal(traversal) => {
            if locals.contains(&traversal.root.value().as_str()) {
                return;
            }
            out.push(
                Origin::new(traversal_address(traversal), ctx.range(expr.span()))
                    .with_constraints(OriginConstraints::new(vec![OriginConstraint::of_type(ty.clone())])),
            );
        }
        Expression::FunctionCall(call) => {
            for (arg, arg_ty) in function::arg_types(ctx, call) {
                origins_into(ctx, arg, &arg_ty, locals, out);
            }
        }
        Expression::For(for_expr) => {
            origins_into(ctx, &for_expr.collection, &Type::Dynamic, locals, out);
            let mut inner: Vec<&str> = locals.to_vec();
            inner.extend(for_expr.key_var.as_ref().map(|v| v.value().as_str()));
            inner.push(for_expr.value_var.value());
            for (child, child_ty) in operands(expr.value(), ty).into_iter().skip(1) {
                origins_into(ctx, child, &child_ty, &inner, out);
            }
        }
        Expression::Object(object) => {
            for item in &object.items {
                let key = item.key.value();
                if key.force_non_literal {
                    if let Expression::Traversal(traversal) = &key.expr {
                        if !locals.contains(&traversal.root.value().as_str()) {
                            out.push(
                                Origin::new(traversal_address(traversal), ctx.range(item.key.span()))
                                    .with_constraints(OriginConstraints::new(vec![OriginConstraint::of_type(
                                        Type::String,
                                    )])),
                            );
                        }
                    }
                }
            }
            for (child, child_ty) in operands(expr.value(), ty) {
                origins_into(ctx, child, &child_ty, locals, out);
            }
        }
        value => {
            for (child, child_ty) in operands(value, ty) {
                origins_into(ctx, child, &child_ty, locals, out);
            }
        }
    }
}
