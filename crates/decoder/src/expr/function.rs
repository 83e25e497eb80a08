//! Calls of functions declared in the path context.

use hclang_reference::target::type_compatible;
use hclang_reference::Origin;
use hclang_schema::{Candidate, CandidateKind, FunctionSignature, HoverData, SemanticToken, SemanticTokenType, Type};
use hclang_syntax::ast::FunctionCall;
use hclang_syntax::{Expression, Span, Spanned};

use super::{any, candidate, contains, contains_or_end, element_at_pos, empty_expr_at, with_description, ElementAt, ExprContext};

fn signature<'a>(ctx: &ExprContext<'a>, name: &str) -> Option<&'a FunctionSignature> {
    ctx.path.functions.get(name)
}

fn returns(sig: &FunctionSignature, want: Option<&Type>) -> bool {
    want.is_none_or(|want| type_compatible(&sig.return_type, want))
}

/// Arguments of `call` with the type the callee expects for each. Unknown
/// functions accept anything.
pub(super) fn arg_types<'e>(ctx: &ExprContext<'_>, call: &'e FunctionCall) -> Vec<(&'e Spanned<Expression>, Type)> {
    let sig = signature(ctx, call.name.value());
    call.args
        .iter()
        .enumerate()
        .map(|(index, arg)| {
            let ty = sig
                .and_then(|sig| sig.param_type(index))
                .cloned()
                .unwrap_or(Type::Dynamic);
            (arg, ty)
        })
        .collect()
}

pub(super) fn completion(ctx: &ExprContext<'_>, expr: &Spanned<Expression>, want: Option<&Type>, pos: usize) -> Vec<Candidate> {
    let (prefix, span) = match expr.value() {
        Expression::Empty => (String::new(), Span::from(pos..pos)),
        Expression::Traversal(traversal) if traversal.is_bare() && contains_or_end(expr.span(), pos) => {
            (ctx.text(Span::from(expr.span().start..pos)).to_string(), expr.span())
        }
        Expression::FunctionCall(call) => return arg_completion(ctx, call, pos),
        _ => return Vec::new(),
    };

    let mut names: Vec<(&String, &FunctionSignature)> = ctx
        .path
        .functions
        .iter()
        .filter(|(name, sig)| name.starts_with(&prefix) && returns(sig, want))
        .collect();
    names.sort_by(|a, b| a.0.cmp(b.0));
    names
        .into_iter()
        .map(|(name, sig)| {
            let mut c = candidate(
                ctx,
                name.as_str(),
                CandidateKind::Function,
                format!("{name}{}", sig.detail()),
                format!("{name}()"),
                format!("{name}(${{0}})"),
                span,
            );
            c.description = sig.description.clone();
            c
        })
        .collect()
}

fn arg_completion(ctx: &ExprContext<'_>, call: &FunctionCall, pos: usize) -> Vec<Candidate> {
    if pos < call.open_paren.end || pos > call.close_paren.start {
        return Vec::new();
    }
    let args = arg_types(ctx, call);
    match element_at_pos(ctx, &call.args, pos) {
        ElementAt::Existing(index, arg) => {
            let ty = args.get(index).map_or(Type::Dynamic, |(_, ty)| ty.clone());
            any::completion(ctx, arg, &ty, pos)
        }
        ElementAt::New(index) => {
            let ty = signature(ctx, call.name.value())
                .and_then(|sig| sig.param_type(index))
                .cloned()
                .unwrap_or(Type::Dynamic);
            any::completion(ctx, &empty_expr_at(pos), &ty, pos)
        }
    }
}

pub(super) fn hover(ctx: &ExprContext<'_>, expr: &Spanned<Expression>, want: Option<&Type>, pos: usize) -> Option<HoverData> {
    let Expression::FunctionCall(call) = expr.value() else {
        return None;
    };
    let sig = signature(ctx, call.name.value())?;
    if contains(call.name.span(), pos) {
        if !returns(sig, want) {
            return None;
        }
        let content = format!("```\n{}{}\n```", call.name.value(), sig.detail());
        return Some(ctx.hover(with_description(content, &sig.description), call.name.span()));
    }
    arg_types(ctx, call)
        .into_iter()
        .find(|(arg, _)| contains(arg.span(), pos))
        .and_then(|(arg, ty)| any::hover(ctx, arg, &ty, pos))
}

pub(super) fn tokens(ctx: &ExprContext<'_>, expr: &Spanned<Expression>, want: Option<&Type>) -> Vec<SemanticToken> {
    let Expression::FunctionCall(call) = expr.value() else {
        return Vec::new();
    };
    let Some(sig) = signature(ctx, call.name.value()) else {
        return Vec::new();
    };
    if !returns(sig, want) {
        return Vec::new();
    }
    let mut tokens = vec![ctx.token(SemanticTokenType::FunctionName, call.name.span())];
    for (arg, ty) in arg_types(ctx, call) {
        tokens.extend(any::tokens(ctx, arg, &ty));
    }
    tokens
}

pub(super) fn origins(ctx: &ExprContext<'_>, expr: &Spanned<Expression>) -> Vec<Origin> {
    let Expression::FunctionCall(call) = expr.value() else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for (arg, ty) in arg_types(ctx, call) {
        any::origins_into(ctx, arg, &ty, &[], &mut out);
    }
    out
}
