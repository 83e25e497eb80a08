//! # Expression Decoder
//!
//! Matches an expression against a [`Constraint`] to answer completion,
//! hover, semantic token and reference origin queries. Each constraint
//! variant has its own module; container variants recurse back into
//! [`ExprContext`] for their elements.
//!
//! Not finding anything is never an error here: queries return empty
//! lists or `None`.

mod any;
mod function;
mod keyword;
mod list;
mod literal;
mod map;
mod object;
mod reference;

use hclang_reference::Origin;
use hclang_schema::{
    Candidate, CandidateKind, Constraint, HoverData, MarkupContent, SemanticToken,
    SemanticTokenType, TextEdit, Type,
};
use hclang_syntax::{Expression, File, Range, Span, Spanned};

use crate::context::PathContext;

pub(crate) use literal::static_value;
pub(crate) use reference::traversal_address;

/// What the expression decoder needs to know about where an expression is.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ExprContext<'a> {
    pub path: &'a PathContext,
    pub file: &'a File,
    /// Body of the outermost block around the expression
    pub outermost_body: Option<Span>,
}

impl<'a> ExprContext<'a> {
    pub const fn new(path: &'a PathContext, file: &'a File) -> Self {
        Self {
            path,
            file,
            outermost_body: None,
        }
    }

    #[must_use]
    pub const fn with_outermost_body(mut self, body: Span) -> Self {
        if self.outermost_body.is_none() {
            self.outermost_body = Some(body);
        }
        self
    }

    pub fn range(&self, span: Span) -> Range {
        self.file.range(span)
    }

    pub fn text(&self, span: Span) -> &'a str {
        self.file.text(span)
    }

    pub fn token(&self, token_type: SemanticTokenType, span: Span) -> SemanticToken {
        SemanticToken::new(token_type, Vec::new(), self.range(span))
    }

    pub fn hover(&self, content: String, span: Span) -> HoverData {
        HoverData {
            content: MarkupContent::markdown(content),
            range: self.range(span),
        }
    }

    /// Candidates for `expr` at byte `pos`.
    pub fn completion_at_pos(&self, expr: &Spanned<Expression>, cons: &Constraint, pos: usize) -> Vec<Candidate> {
        match cons {
            Constraint::LiteralType(c) => literal::type_completion(self, expr, &c.ty, pos),
            Constraint::LiteralValue(c) => literal::value_completion(self, expr, c, pos),
            Constraint::Keyword(c) => keyword::completion(self, expr, c, pos),
            Constraint::Reference(c) => reference::completion(self, expr, c, pos),
            Constraint::AnyExpression(c) => any::completion(self, expr, &c.of_type, pos),
            Constraint::FunctionCall(c) => function::completion(self, expr, c.of_type.as_ref(), pos),
            Constraint::List(_) | Constraint::Set(_) | Constraint::Tuple(_) => {
                list::completion(self, expr, cons, pos)
            }
            Constraint::Map(c) => map::completion(self, expr, cons, c, pos),
            Constraint::Object(c) => object::completion(self, expr, cons, c, pos),
            Constraint::OneOf(c) => c
                .alternatives
                .iter()
                .flat_map(|alt| self.completion_at_pos(expr, alt, pos))
                .collect(),
        }
    }

    /// Hover content for `expr` at byte `pos`.
    pub fn hover_at_pos(&self, expr: &Spanned<Expression>, cons: &Constraint, pos: usize) -> Option<HoverData> {
        match cons {
            Constraint::LiteralType(c) => literal::type_hover(self, expr, &c.ty, pos),
            Constraint::LiteralValue(c) => literal::value_hover(self, expr, c),
            Constraint::Keyword(c) => keyword::hover(self, expr, c),
            Constraint::Reference(_) => reference::hover(self, expr, pos),
            Constraint::AnyExpression(c) => any::hover(self, expr, &c.of_type, pos),
            Constraint::FunctionCall(c) => function::hover(self, expr, c.of_type.as_ref(), pos),
            Constraint::List(_) | Constraint::Set(_) | Constraint::Tuple(_) => {
                list::hover(self, expr, cons, pos)
            }
            Constraint::Map(c) => map::hover(self, expr, cons, c, pos),
            Constraint::Object(c) => object::hover(self, expr, cons, c, pos),
            Constraint::OneOf(c) => c
                .alternatives
                .iter()
                .find_map(|alt| self.hover_at_pos(expr, alt, pos)),
        }
    }

    /// Semantic tokens of the whole `expr`.
    pub fn semantic_tokens(&self, expr: &Spanned<Expression>, cons: &Constraint) -> Vec<SemanticToken> {
        match cons {
            Constraint::LiteralType(c) => literal::type_tokens(self, expr, &c.ty),
            Constraint::LiteralValue(c) => literal::value_tokens(self, expr, c),
            Constraint::Keyword(c) => keyword::tokens(self, expr, c),
            Constraint::Reference(_) => reference::tokens(self, expr),
            Constraint::AnyExpression(c) => any::tokens(self, expr, &c.of_type),
            Constraint::FunctionCall(c) => function::tokens(self, expr, c.of_type.as_ref()),
            Constraint::List(_) | Constraint::Set(_) | Constraint::Tuple(_) => list::tokens(self, expr, cons),
            Constraint::Map(c) => map::tokens(self, expr, c),
            Constraint::Object(c) => object::tokens(self, expr, c),
            Constraint::OneOf(c) => c
                .alternatives
                .iter()
                .map(|alt| self.semantic_tokens(expr, alt))
                .find(|tokens| !tokens.is_empty())
                .unwrap_or_default(),
        }
    }

    /// Reference origins inside `expr`. Alternatives of a `OneOf` that
    /// accept the same traversal are merged into one origin.
    pub fn reference_origins(&self, expr: &Spanned<Expression>, cons: &Constraint) -> Vec<Origin> {
        match cons {
            Constraint::LiteralType(_) | Constraint::LiteralValue(_) | Constraint::Keyword(_) => Vec::new(),
            Constraint::Reference(c) => reference::origins(self, expr, c),
            Constraint::AnyExpression(c) => any::origins(self, expr, &c.of_type),
            Constraint::FunctionCall(_) => function::origins(self, expr),
            Constraint::List(_) | Constraint::Set(_) | Constraint::Tuple(_) => list::origins(self, expr, cons),
            Constraint::Map(c) => map::origins(self, expr, c),
            Constraint::Object(c) => object::origins(self, expr, c),
            Constraint::OneOf(c) => {
                let mut merged: Vec<Origin> = Vec::new();
                for origin in c.alternatives.iter().flat_map(|alt| self.reference_origins(expr, alt)) {
                    match merged
                        .iter_mut()
                        .find(|o| o.addr == origin.addr && o.range == origin.range)
                    {
                        Some(existing) => {
                            for cons in origin.constraints.iter() {
                                if !existing.constraints.iter().any(|c| c == cons) {
                                    existing.constraints.push(cons.clone());
                                }
                            }
                        }
                        None => merged.push(origin),
                    }
                }
                merged
            }
        }
    }
}

/// A zero-width placeholder expression at `pos`.
pub(crate) fn empty_expr_at(pos: usize) -> Spanned<Expression> {
    Spanned::new(Expression::Empty, Span::from(pos..pos))
}

/// Whether `pos` is inside `span` or right at its end.
pub(crate) const fn contains_or_end(span: Span, pos: usize) -> bool {
    span.start <= pos && pos <= span.end
}

/// Whether `pos` is inside `span`, end excluded.
pub(crate) const fn contains(span: Span, pos: usize) -> bool {
    span.start <= pos && pos < span.end
}

pub(crate) fn unwrap_parens(expr: &Spanned<Expression>) -> &Spanned<Expression> {
    match expr.value() {
        Expression::Parenthesized(inner) => unwrap_parens(inner),
        _ => expr,
    }
}

/// `_name_` followed by the description, if any.
pub(crate) fn type_hover_text(name: &str, description: &MarkupContent) -> String {
    with_description(format!("_{name}_"), description)
}

pub(crate) fn with_description(mut content: String, description: &MarkupContent) -> String {
    if !description.is_empty() {
        content.push_str("\n\n");
        content.push_str(description.as_str());
    }
    content
}

pub(crate) const fn candidate_kind_for_type(ty: &Type) -> CandidateKind {
    match ty {
        Type::String => CandidateKind::String,
        Type::Number => CandidateKind::Number,
        Type::Bool => CandidateKind::Bool,
        Type::List(_) => CandidateKind::List,
        Type::Set(_) => CandidateKind::Set,
        Type::Map(_) => CandidateKind::Map,
        Type::Object(_) => CandidateKind::Object,
        Type::Tuple(_) => CandidateKind::Tuple,
        Type::Dynamic => CandidateKind::Reference,
    }
}

/// Text of the identifier being typed at `pos`, with its start.
pub(crate) fn prefix_at(ctx: &ExprContext<'_>, expr: &Spanned<Expression>, pos: usize) -> Option<String> {
    let span = expr.span();
    match expr.value() {
        Expression::Empty => Some(String::new()),
        Expression::Traversal(_) if contains_or_end(span, pos) => {
            Some(ctx.text(Span::from(span.start..pos)).to_string())
        }
        Expression::Literal(_) if contains_or_end(span, pos) => {
            Some(ctx.text(Span::from(span.start..pos)).to_string())
        }
        _ => None,
    }
}

/// A candidate replacing `span` with `new_text`.
pub(crate) fn candidate(
    ctx: &ExprContext<'_>,
    label: impl Into<String>,
    kind: CandidateKind,
    detail: impl Into<String>,
    new_text: impl Into<String>,
    snippet: impl Into<String>,
    span: Span,
) -> Candidate {
    Candidate {
        label: label.into(),
        description: MarkupContent::default(),
        detail: detail.into(),
        is_deprecated: false,
        text_edit: TextEdit {
            range: ctx.range(span),
            new_text: new_text.into(),
            snippet: snippet.into(),
        },
        kind,
        trigger_suggest: false,
    }
}

/// Where `pos` falls among the elements of a bracketed list.
pub(crate) enum ElementAt<'e> {
    Existing(usize, &'e Spanned<Expression>),
    /// No element at `pos`; a new one would get this index
    New(usize),
}

/// Finds the element owning `pos`, looking one byte past an element for a
/// trailing `.` typed after it.
pub(crate) fn element_at_pos<'e>(
    ctx: &ExprContext<'_>,
    exprs: &'e [Spanned<Expression>],
    pos: usize,
) -> ElementAt<'e> {
    let mut before = 0;
    for (index, elem) in exprs.iter().enumerate() {
        let span = elem.span();
        // Spans of empty elements cannot be trusted
        if elem.value().is_empty() || span.start > pos {
            break;
        }
        if contains_or_end(span, pos) {
            return ElementAt::Existing(index, elem);
        }
        if pos == span.end + 1 && ctx.file.byte_at(span.end) == Some(b'.') {
            return ElementAt::Existing(index, elem);
        }
        before = index + 1;
    }
    ElementAt::New(before)
}
