//! References to targets of the reference index.

use hclang_reference::{Origin, OriginConstraint, OriginConstraints};
use hclang_schema::constraint::Reference;
use hclang_schema::{
    Address, AddressStep, Candidate, CandidateKind, HoverData, IndexKey, SemanticToken,
    SemanticTokenType,
};
use hclang_syntax::{Expression, Span, Spanned, Traversal, TraversalKey, TraversalStep};
use rustc_hash::FxHashSet;

use super::{candidate, contains_or_end, ExprContext};

/// Address a traversal refers to.
pub(crate) fn traversal_address(traversal: &Traversal) -> Address {
    let mut addr = Address::new(vec![AddressStep::Root(traversal.root.value().clone())]);
    for step in &traversal.steps {
        addr.push(match step {
            TraversalStep::Attr(name) => AddressStep::Attr(name.value().clone()),
            TraversalStep::Index(key) => AddressStep::Index(match key.value() {
                TraversalKey::String(s) => IndexKey::String(s.clone()),
                TraversalKey::Number(n) => IndexKey::Number(*n),
            }),
        });
    }
    addr
}

pub(crate) fn origin_constraint(cons: &Reference) -> OriginConstraint {
    OriginConstraint {
        of_scope_id: cons.of_scope_id.clone(),
        of_type: cons.of_type.clone(),
    }
}

pub(super) fn completion(ctx: &ExprContext<'_>, expr: &Spanned<Expression>, cons: &Reference, pos: usize) -> Vec<Candidate> {
    let span = match expr.value() {
        Expression::Empty => Span::from(pos..pos),
        Expression::Traversal(_) if contains_or_end(expr.span(), pos) => expr.span(),
        _ => return Vec::new(),
    };
    let prefix = ctx.text(Span::from(span.start..pos));
    let outermost = ctx.outermost_body.map(|body| ctx.range(body));
    let origin_range = ctx.range(span);

    let mut seen = FxHashSet::default();
    ctx.path
        .reference_targets
        .match_walk(&origin_constraint(cons), prefix, outermost.as_ref(), &origin_range)
        .into_iter()
        .filter_map(|target| {
            let addr = target.address()?.to_string();
            if !seen.insert(addr.clone()) {
                return None;
            }
            let mut c = candidate(
                ctx,
                addr.clone(),
                CandidateKind::Reference,
                target.friendly_name(),
                addr.clone(),
                addr,
                span,
            );
            c.description = target.description.clone();
            Some(c)
        })
        .collect()
}

fn origin_at<'a>(ctx: &ExprContext<'a>, pos: usize) -> Option<&'a Origin> {
    ctx.path
        .reference_origins
        .at_pos(ctx.file.filename(), ctx.file.pos_at(pos))
}

pub(super) fn hover(ctx: &ExprContext<'_>, expr: &Spanned<Expression>, pos: usize) -> Option<HoverData> {
    if !matches!(expr.value(), Expression::Traversal(_)) {
        return None;
    }
    let origin = origin_at(ctx, pos)?;
    let target = ctx.path.reference_targets.matching(origin).into_iter().next()?;

    let mut content = format!("`{}`", target.address()?);
    if target.ty.is_some() {
        content.push_str(&format!("\n_{}_", target.friendly_name()));
    } else if !target.name.is_empty() {
        content.push(' ');
        content.push_str(&target.name);
    }
    Some(ctx.hover(super::with_description(content, &target.description), expr.span()))
}

pub(super) fn tokens(ctx: &ExprContext<'_>, expr: &Spanned<Expression>) -> Vec<SemanticToken> {
    let Expression::Traversal(traversal) = expr.value() else {
        return Vec::new();
    };
    let Some(origin) = origin_at(ctx, expr.span().start) else {
        return Vec::new();
    };
    if ctx.path.reference_targets.matching(origin).is_empty() {
        return Vec::new();
    }
    traversal_tokens(ctx, traversal)
}

pub(crate) fn traversal_tokens(ctx: &ExprContext<'_>, traversal: &Traversal) -> Vec<SemanticToken> {
    let mut tokens = vec![ctx.token(SemanticTokenType::ReferenceStep, traversal.root.span())];
    for step in &traversal.steps {
        match step {
            TraversalStep::Attr(name) => {
                tokens.push(ctx.token(SemanticTokenType::ReferenceStep, name.span()));
            }
            TraversalStep::Index(key) => {
                let span = key.span();
                // `[key]` is tokenised without its brackets, `.0` as is
                let inner = if ctx.file.byte_at(span.start) == Some(b'[') {
                    Span::from(span.start + 1..span.end.saturating_sub(1).max(span.start + 1))
                } else {
                    span
                };
                let token_type = match key.value() {
                    TraversalKey::String(_) => SemanticTokenType::String,
                    TraversalKey::Number(_) => SemanticTokenType::Number,
                };
                tokens.push(ctx.token(token_type, inner));
            }
        }
    }
    tokens
}

pub(super) fn origins(ctx: &ExprContext<'_>, expr: &Spanned<Expression>, cons: &Reference) -> Vec<Origin> {
    match expr.value() {
        Expression::Traversal(traversal) => vec![Origin::new(traversal_address(traversal), ctx.range(expr.span()))
            .with_constraints(OriginConstraints::new(vec![origin_constraint(cons)]))],
        _ => Vec::new(),
    }
}
