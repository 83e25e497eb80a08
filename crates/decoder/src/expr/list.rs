//! Lists, sets and tuples, all written as `[ a, b ]`.

use hclang_reference::Origin;
use hclang_schema::{Candidate, CandidateKind, Constraint, HoverData, SemanticToken};
use hclang_syntax::ast::TupleCons;
use hclang_syntax::{Expression, Span, Spanned};

use super::{candidate, contains, element_at_pos, empty_expr_at, type_hover_text, unwrap_parens, ElementAt, ExprContext};

/// Constraint of the element at `index`.
fn elem_at(cons: &Constraint, index: usize) -> Option<&Constraint> {
    match cons {
        Constraint::List(c) => c.elem.as_deref(),
        Constraint::Set(c) => c.elem.as_deref(),
        Constraint::Tuple(c) => c.elems.get(index),
        _ => None,
    }
}

const fn kind_of(cons: &Constraint) -> CandidateKind {
    match cons {
        Constraint::Set(_) => CandidateKind::Set,
        Constraint::Tuple(_) => CandidateKind::Tuple,
        _ => CandidateKind::List,
    }
}

fn tuple_of(expr: &Spanned<Expression>) -> Option<&TupleCons> {
    match unwrap_parens(expr).value() {
        Expression::Tuple(tuple) => Some(tuple),
        _ => None,
    }
}

fn label_of(cons: &Constraint) -> String {
    match cons {
        Constraint::List(_) | Constraint::Set(_) => match elem_at(cons, 0) {
            Some(elem) => format!("[ {} ]", elem.friendly_name()),
            None => "[ ]".to_string(),
        },
        Constraint::Tuple(c) if !c.elems.is_empty() => {
            let names: Vec<String> = c.elems.iter().map(Constraint::friendly_name).collect();
            format!("[ {} ]", names.join(", "))
        }
        _ => "[ ]".to_string(),
    }
}

pub(super) fn completion(ctx: &ExprContext<'_>, expr: &Spanned<Expression>, cons: &Constraint, pos: usize) -> Vec<Candidate> {
    if expr.value().is_empty() {
        let data = cons.empty_completion_data(1, 0);
        let mut c = candidate(
            ctx,
            label_of(cons),
            kind_of(cons),
            cons.friendly_name(),
            data.new_text,
            data.snippet,
            Span::from(pos..pos),
        );
        c.description = cons.description();
        c.trigger_suggest = data.trigger_suggest;
        return vec![c];
    }
    let Some(tuple) = tuple_of(expr) else {
        return Vec::new();
    };
    if pos < tuple.open.end || pos > tuple.close.start {
        return Vec::new();
    }
    match element_at_pos(ctx, &tuple.exprs, pos) {
        ElementAt::Existing(index, elem) => elem_at(cons, index)
            .map(|elem_cons| ctx.completion_at_pos(elem, elem_cons, pos))
            .unwrap_or_default(),
        ElementAt::New(index) => elem_at(cons, index)
            .map(|elem_cons| ctx.completion_at_pos(&empty_expr_at(pos), elem_cons, pos))
            .unwrap_or_default(),
    }
}

pub(super) fn hover(ctx: &ExprContext<'_>, expr: &Spanned<Expression>, cons: &Constraint, pos: usize) -> Option<HoverData> {
    let tuple = tuple_of(expr)?;
    let elem_hover = tuple
        .exprs
        .iter()
        .enumerate()
        .find(|(_, elem)| contains(elem.span(), pos))
        .and_then(|(index, elem)| ctx.hover_at_pos(elem, elem_at(cons, index)?, pos));
    if elem_hover.is_some() {
        return elem_hover;
    }
    let content = type_hover_text(&cons.friendly_name(), &cons.description());
    Some(ctx.hover(content, expr.span()))
}

pub(super) fn tokens(ctx: &ExprContext<'_>, expr: &Spanned<Expression>, cons: &Constraint) -> Vec<SemanticToken> {
    let Some(tuple) = tuple_of(expr) else {
        return Vec::new();
    };
    tuple
        .exprs
        .iter()
        .enumerate()
        .filter_map(|(index, elem)| Some(ctx.semantic_tokens(elem, elem_at(cons, index)?)))
        .flatten()
        .collect()
}

pub(super) fn origins(ctx: &ExprContext<'_>, expr: &Spanned<Expression>, cons: &Constraint) -> Vec<Origin> {
    let Some(tuple) = tuple_of(expr) else {
        return Vec::new();
    };
    tuple
        .exprs
        .iter()
        .enumerate()
        .filter_map(|(index, elem)| Some(ctx.reference_origins(elem, elem_at(cons, index)?)))
        .flatten()
        .collect()
}
