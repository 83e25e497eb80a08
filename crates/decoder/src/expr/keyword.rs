use hclang_schema::constraint::Keyword;
use hclang_schema::{Candidate, CandidateKind, Constraint, HoverData, SemanticToken, SemanticTokenType};
use hclang_syntax::{Expression, Span, Spanned};

use super::{candidate, prefix_at, with_description, ExprContext};

/// The keyword written at `expr`, if it is a bare identifier.
fn keyword_text<'e>(expr: &'e Spanned<Expression>) -> Option<&'e str> {
    match expr.value() {
        Expression::Traversal(traversal) if traversal.is_bare() => Some(traversal.root.value()),
        _ => None,
    }
}

pub(super) fn completion(ctx: &ExprContext<'_>, expr: &Spanned<Expression>, cons: &Keyword, pos: usize) -> Vec<Candidate> {
    let Some(prefix) = prefix_at(ctx, expr, pos) else {
        return Vec::new();
    };
    if !cons.keyword.starts_with(&prefix) {
        return Vec::new();
    }
    let span = if expr.value().is_empty() {
        Span::from(pos..pos)
    } else {
        expr.span()
    };
    let data = Constraint::Keyword(cons.clone()).empty_completion_data(1, 0);
    let mut c = candidate(
        ctx,
        &cons.keyword,
        CandidateKind::Keyword,
        cons.name.clone().unwrap_or_else(|| "keyword".to_string()),
        data.new_text,
        data.snippet,
        span,
    );
    c.description = cons.description.clone();
    vec![c]
}

pub(super) fn hover(ctx: &ExprContext<'_>, expr: &Spanned<Expression>, cons: &Keyword) -> Option<HoverData> {
    if keyword_text(expr)? != cons.keyword {
        return None;
    }
    let name = cons.name.as_deref().unwrap_or("keyword");
    let content = with_description(format!("`{}` _{name}_", cons.keyword), &cons.description);
    Some(ctx.hover(content, expr.span()))
}

pub(super) fn tokens(ctx: &ExprContext<'_>, expr: &Spanned<Expression>, cons: &Keyword) -> Vec<SemanticToken> {
    match keyword_text(expr) {
        Some(word) if word == cons.keyword => vec![ctx.token(SemanticTokenType::Keyword, expr.span())],
        _ => Vec::new(),
    }
}
