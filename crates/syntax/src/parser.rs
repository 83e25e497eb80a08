//! # Parser
//!
//! This module implements the configuration-language parser using the
//! `chumsky` combinator library over the token stream produced by
//! [`crate::lexer`].
//!
//! The grammar is deliberately tolerant of the partial input an editor
//! produces while typing: an attribute with no value after `=` parses with an
//! [`Expression::Empty`] value, a traversal ending in `.` keeps the dot in its
//! span, and a lone identifier on its own line is reported and skipped. When
//! a body fails to parse as a whole, each top-level item is re-parsed on its
//! own so one broken item does not hide the rest of the file.

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::ast::{
    Attribute, BinaryOp, Block, Body, BodyItem, Expression, ForExpr, FunctionCall, Label, Literal,
    ObjectCons, ObjectItem, ObjectKey, Spanned, Traversal, TraversalKey, TraversalStep, TupleCons,
    UnaryOp,
};
use crate::lexer::{lex, Token};
use crate::pos::Span;
use crate::template::{parse_template, unquote};

type ParserExtra<'tokens, 'src> = extra::Err<Rich<'tokens, Token<'src>>>;

/// A syntax error with its location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDiagnostic {
    pub message: String,
    pub span: Span,
}

impl ParseDiagnostic {
    fn from_rich(err: &Rich<'_, Token<'_>>) -> Self {
        Self {
            message: err.to_string(),
            span: *err.span(),
        }
    }
}

/// Postfix steps applied left-to-right to an expression.
#[derive(Debug, Clone)]
enum PostfixOp {
    /// `.name`
    Attr(Spanned<String>),
    /// `.0`
    LegacyIndex(Spanned<u64>),
    /// `[key]`, spanned including brackets
    Index(Spanned<Expression>, Span),
    /// `.` with nothing valid after it
    DanglingDot(Span),
}

impl PostfixOp {
    const fn end(&self) -> usize {
        match self {
            Self::Attr(name) => name.span().end,
            Self::LegacyIndex(index) => index.span().end,
            Self::Index(_, brackets) => brackets.end,
            Self::DanglingDot(span) => span.end,
        }
    }
}

fn static_key(expr: &Expression) -> Option<TraversalKey> {
    match expr {
        Expression::Literal(Literal::Number(n)) => n.parse().ok().map(TraversalKey::Number),
        Expression::Template(template) if !template.heredoc => {
            template.as_literal().map(TraversalKey::String)
        }
        _ => None,
    }
}

fn push_step(value: Expression, span: Span, step: TraversalStep, new_span: Span) -> Spanned<Expression> {
    match value {
        Expression::Traversal(mut traversal) => {
            traversal.steps.push(step);
            Spanned::new(Expression::Traversal(traversal), new_span)
        }
        Expression::RelativeTraversal { source, mut steps } => {
            steps.push(step);
            Spanned::new(Expression::RelativeTraversal { source, steps }, new_span)
        }
        other => Spanned::new(
            Expression::RelativeTraversal {
                source: Box::new(Spanned::new(other, span)),
                steps: vec![step],
            },
            new_span,
        ),
    }
}

fn apply_postfix(expr: Spanned<Expression>, op: PostfixOp) -> Spanned<Expression> {
    let (value, span) = expr.into_parts();
    let new_span = SimpleSpan::from(span.start..op.end());
    match op {
        PostfixOp::Attr(name) => push_step(value, span, TraversalStep::Attr(name), new_span),
        PostfixOp::LegacyIndex(index) => {
            let (n, index_span) = index.into_parts();
            let step = TraversalStep::Index(Spanned::new(TraversalKey::Number(n), index_span));
            push_step(value, span, step, new_span)
        }
        PostfixOp::Index(key, brackets) => match static_key(key.value()) {
            Some(static_key) => {
                let step = TraversalStep::Index(Spanned::new(static_key, brackets));
                push_step(value, span, step, new_span)
            }
            None => Spanned::new(
                Expression::Index {
                    collection: Box::new(Spanned::new(value, span)),
                    key: Box::new(key),
                    open_bracket: SimpleSpan::from(brackets.start..brackets.start + 1),
                },
                new_span,
            ),
        },
        PostfixOp::DanglingDot(_) => Spanned::new(value, new_span),
    }
}

fn binary(lhs: Spanned<Expression>, op: BinaryOp, rhs: Spanned<Expression>) -> Spanned<Expression> {
    let span = SimpleSpan::from(lhs.span().start..rhs.span().end);
    Spanned::new(
        Expression::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        },
        span,
    )
}

fn template_expression(raw: &str, span: Span, heredoc: bool) -> (Expression, Vec<ParseDiagnostic>) {
    if heredoc {
        // Content starts after the opening line and ends before the marker line
        let content_start = raw.find('\n').map_or(raw.len(), |i| i + 1);
        let content_end = raw.rfind('\n').map_or(content_start, |i| i + 1).max(content_start);
        let (template, errors) = parse_template(
            &raw[content_start..content_end],
            span.start + content_start,
            true,
        );
        return (Expression::Template(template), errors);
    }
    let content = raw
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(raw);
    let (template, errors) = parse_template(content, span.start + 1, false);
    (Expression::Template(template), errors)
}

fn spanned_ident_parser<'tokens, 'src: 'tokens, I>(
) -> impl Parser<'tokens, I, Spanned<String>, ParserExtra<'tokens, 'src>> + Clone
where
    I: ValueInput<'tokens, Token = Token<'src>, Span = SimpleSpan>,
{
    select! { Token::Ident(s) => s.to_string() }
        .labelled("identifier")
        .map_with(|s, e| Spanned::new(s, e.span()))
}

fn keyword<'tokens, 'src: 'tokens, I>(
    word: &'static str,
) -> impl Parser<'tokens, I, (), ParserExtra<'tokens, 'src>> + Clone
where
    I: ValueInput<'tokens, Token = Token<'src>, Span = SimpleSpan>,
{
    just(Token::Ident(word)).ignored().labelled(word)
}

fn spanned_token<'tokens, 'src: 'tokens, I>(
    token: Token<'src>,
) -> impl Parser<'tokens, I, Span, ParserExtra<'tokens, 'src>> + Clone
where
    I: ValueInput<'tokens, Token = Token<'src>, Span = SimpleSpan>,
{
    just(token).map_with(|_, e| e.span())
}

fn expression_parser<'tokens, 'src: 'tokens, I>(
) -> impl Parser<'tokens, I, Spanned<Expression>, ParserExtra<'tokens, 'src>> + Clone
where
    I: ValueInput<'tokens, Token = Token<'src>, Span = SimpleSpan>,
{
    let spanned_ident = spanned_ident_parser();

    recursive(|expr| {
        let number = select! { Token::Number(n) => Expression::Literal(Literal::Number(n.to_string())) }
            .map_with(|lit, e| Spanned::new(lit, e.span()));

        // Quoted strings and heredocs, split into template parts
        let template = select! {
            Token::QuotedString(s) => (s, false),
            Token::Heredoc(s) => (s, true),
        }
        .validate(|(raw, heredoc), e, emitter| {
            let span: Span = e.span();
            let (expr, errors) = template_expression(raw, span, heredoc);
            for error in errors {
                emitter.emit(Rich::custom(error.span, error.message));
            }
            Spanned::new(expr, span)
        });

        let for_intro = keyword("for")
            .ignore_then(spanned_ident.clone())
            .then(just(Token::Comma).ignore_then(spanned_ident.clone()).or_not())
            .then_ignore(keyword("in"))
            .then(expr.clone())
            .then_ignore(just(Token::Colon))
            .map(|((first, second), collection)| match second {
                Some(value_var) => (Some(first), value_var, collection),
                None => (None, first, collection),
            });
        let for_condition = keyword("if").ignore_then(expr.clone()).or_not();

        let for_tuple = spanned_token(Token::LBrack)
            .then(for_intro.clone())
            .then(expr.clone())
            .then(for_condition.clone())
            .then(spanned_token(Token::RBrack))
            .map_with(
                |((((open, (key_var, value_var, collection)), value_expr), condition), close), e| {
                    Spanned::new(
                        Expression::For(Box::new(ForExpr {
                            key_var,
                            value_var,
                            collection,
                            key_expr: None,
                            value_expr,
                            condition,
                            grouped: false,
                            open,
                            close,
                        })),
                        e.span(),
                    )
                },
            );

        let for_object = spanned_token(Token::LBrace)
            .then(for_intro)
            .then(expr.clone())
            .then_ignore(just(Token::FatArrow))
            .then(expr.clone())
            .then(just(Token::Ellipsis).or_not())
            .then(for_condition)
            .then(spanned_token(Token::RBrace))
            .map_with(
                |((((((open, (key_var, value_var, collection)), key_expr), value_expr), grouped), condition), close),
                 e| {
                    Spanned::new(
                        Expression::For(Box::new(ForExpr {
                            key_var,
                            value_var,
                            collection,
                            key_expr: Some(key_expr),
                            value_expr,
                            condition,
                            grouped: grouped.is_some(),
                            open,
                            close,
                        })),
                        e.span(),
                    )
                },
            );

        let tuple = spanned_token(Token::LBrack)
            .then(
                expr.clone()
                    .separated_by(just(Token::Comma))
                    .allow_trailing()
                    .collect::<Vec<_>>(),
            )
            .then(spanned_token(Token::RBrack))
            .map_with(|((open, exprs), close), e| {
                Spanned::new(Expression::Tuple(TupleCons { exprs, open, close }), e.span())
            });

        // Object keys: `(expr)` forces evaluation, anything else may be a bare name
        let object_key = choice((
            expr.clone()
                .delimited_by(just(Token::LParen), just(Token::RParen))
                .map(|key: Spanned<Expression>| ObjectKey {
                    expr: key.into_parts().0,
                    force_non_literal: true,
                }),
            expr.clone().map(|key: Spanned<Expression>| ObjectKey {
                expr: key.into_parts().0,
                force_non_literal: false,
            }),
        ))
        .map_with(|key, e| Spanned::new(key, e.span()));

        let object_item = object_key
            .then(choice((spanned_token(Token::Eq), spanned_token(Token::Colon))))
            .then(expr.clone().or_not())
            .map_with(|((key, equals), value), e| {
                let value = value.unwrap_or_else(|| {
                    Spanned::new(Expression::Empty, SimpleSpan::from(equals.end..equals.end))
                });
                ObjectItem {
                    key,
                    value,
                    span: e.span(),
                }
            });

        let object = spanned_token(Token::LBrace)
            .then(
                object_item
                    .then_ignore(just(Token::Comma).or_not())
                    .repeated()
                    .collect::<Vec<_>>(),
            )
            .then(spanned_token(Token::RBrace))
            .map_with(|((open, items), close), e| {
                Spanned::new(Expression::Object(ObjectCons { items, open, close }), e.span())
            });

        let parenthesized = expr
            .clone()
            .delimited_by(just(Token::LParen), just(Token::RParen))
            .map_with(|inner, e| Spanned::new(Expression::Parenthesized(Box::new(inner)), e.span()));

        let function_call = spanned_ident
            .clone()
            .then(spanned_token(Token::LParen))
            .then(
                expr.clone()
                    .separated_by(just(Token::Comma))
                    .allow_trailing()
                    .collect::<Vec<_>>(),
            )
            .then(just(Token::Ellipsis).or_not())
            .then(spanned_token(Token::RParen))
            .map_with(|((((name, open_paren), args), ellipsis), close_paren), e| {
                Spanned::new(
                    Expression::FunctionCall(FunctionCall {
                        name,
                        args,
                        open_paren,
                        close_paren,
                        expand_final: ellipsis.is_some(),
                    }),
                    e.span(),
                )
            });

        // Variable roots, with `true`/`false`/`null` as literals
        let variable = spanned_ident.clone().map(|name| {
            let span = name.span();
            let expr = match name.value().as_str() {
                "true" => Expression::Literal(Literal::Bool(true)),
                "false" => Expression::Literal(Literal::Bool(false)),
                "null" => Expression::Literal(Literal::Null),
                _ => Expression::Traversal(Traversal {
                    root: name,
                    steps: vec![],
                }),
            };
            Spanned::new(expr, span)
        });

        let atom = choice((
            number,
            template,
            for_tuple,
            tuple,
            for_object,
            object,
            parenthesized,
            function_call,
            variable,
        ))
        .boxed();

        let dot = spanned_token(Token::Dot);
        let postfix_op = choice((
            dot.clone()
                .ignore_then(spanned_ident.clone())
                .map(PostfixOp::Attr),
            dot.clone()
                .ignore_then(select! { Token::Number(n) => n })
                .try_map(|n: &str, span| {
                    n.parse::<u64>()
                        .map(|index| PostfixOp::LegacyIndex(Spanned::new(index, span)))
                        .map_err(|_| Rich::custom(span, "Invalid index"))
                }),
            expr.clone()
                .delimited_by(just(Token::LBrack), just(Token::RBrack))
                .map_with(|key, e| PostfixOp::Index(key, e.span())),
            dot.validate(|span: Span, _e, emitter| {
                emitter.emit(Rich::custom(span, "Invalid attribute name"));
                PostfixOp::DanglingDot(span)
            }),
        ));

        let postfix = atom.foldl(postfix_op.repeated(), apply_postfix).boxed();

        let unary_op = choice((
            just(Token::Minus).to(UnaryOp::Negate),
            just(Token::Bang).to(UnaryOp::Not),
        ))
        .map_with(|op, e| (op, e.span()));

        let unary = unary_op
            .repeated()
            .foldr(postfix, |(op, op_span): (UnaryOp, Span), operand: Spanned<Expression>| {
                let span = SimpleSpan::from(op_span.start..operand.span().end);
                Spanned::new(
                    Expression::Unary {
                        op,
                        operand: Box::new(operand),
                    },
                    span,
                )
            })
            .boxed();

        let op = |token, op| just(token).to(op);

        let mul = unary.clone().foldl(
            choice((
                op(Token::Star, BinaryOp::Mul),
                op(Token::Slash, BinaryOp::Div),
                op(Token::Percent, BinaryOp::Mod),
            ))
            .then(unary.clone())
            .repeated(),
            |lhs, (op, rhs)| binary(lhs, op, rhs),
        );

        let add = mul.clone().foldl(
            choice((op(Token::Plus, BinaryOp::Add), op(Token::Minus, BinaryOp::Sub)))
                .then(mul.clone())
                .repeated(),
            |lhs, (op, rhs)| binary(lhs, op, rhs),
        );

        let cmp = add.clone().foldl(
            choice((
                op(Token::LtEq, BinaryOp::LtEq),
                op(Token::GtEq, BinaryOp::GtEq),
                op(Token::Lt, BinaryOp::Lt),
                op(Token::Gt, BinaryOp::Gt),
            ))
            .then(add.clone())
            .repeated(),
            |lhs, (op, rhs)| binary(lhs, op, rhs),
        );

        let eq = cmp.clone().foldl(
            choice((op(Token::EqEq, BinaryOp::Eq), op(Token::Neq, BinaryOp::NotEq)))
                .then(cmp.clone())
                .repeated(),
            |lhs, (op, rhs)| binary(lhs, op, rhs),
        );

        let and = eq.clone().foldl(
            op(Token::AndAnd, BinaryOp::And).then(eq.clone()).repeated(),
            |lhs, (op, rhs)| binary(lhs, op, rhs),
        );

        let or = and
            .clone()
            .foldl(
                op(Token::OrOr, BinaryOp::Or).then(and.clone()).repeated(),
                |lhs, (op, rhs)| binary(lhs, op, rhs),
            )
            .boxed();

        // Conditional: lowest precedence, right-associative
        or.then(
            just(Token::Question)
                .ignore_then(expr.clone())
                .then_ignore(just(Token::Colon))
                .then(expr.clone())
                .or_not(),
        )
        .map_with(|(condition, branches), e| match branches {
            None => condition,
            Some((true_result, false_result)) => Spanned::new(
                Expression::Conditional {
                    condition: Box::new(condition),
                    true_result: Box::new(true_result),
                    false_result: Box::new(false_result),
                },
                e.span(),
            ),
        })
    })
}

fn label_parser<'tokens, 'src: 'tokens, I>() -> impl Parser<'tokens, I, Label, ParserExtra<'tokens, 'src>> + Clone
where
    I: ValueInput<'tokens, Token = Token<'src>, Span = SimpleSpan>,
{
    select! {
        Token::QuotedString(s) => (s, true),
        Token::Ident(s) => (s, false),
    }
    .labelled("block label")
    .map_with(|(raw, quoted), e| {
        let span: Span = e.span();
        let value = if quoted {
            unquote(raw, span.start)
        } else {
            raw.to_string()
        };
        Label {
            value,
            span,
            quoted,
        }
    })
}

/// Creates the parser for a body: attributes and blocks separated by
/// newlines.
pub fn body_parser<'tokens, 'src: 'tokens, I>() -> impl Parser<'tokens, I, Body, ParserExtra<'tokens, 'src>> + Clone
where
    I: ValueInput<'tokens, Token = Token<'src>, Span = SimpleSpan>,
{
    let expr = expression_parser();

    recursive(|body| {
        let attribute = spanned_ident_parser()
            .then(spanned_token(Token::Eq))
            .then(expr.clone().or_not())
            .validate(|((name, equals), value), e, emitter| {
                let expr = value.unwrap_or_else(|| {
                    emitter.emit(Rich::custom(
                        SimpleSpan::from(equals.end..equals.end),
                        "Missing expression",
                    ));
                    Spanned::new(Expression::Empty, SimpleSpan::from(equals.end..equals.end))
                });
                Some(BodyItem::Attribute(Attribute {
                    name,
                    equals,
                    expr,
                    span: e.span(),
                }))
            });

        let block = spanned_ident_parser()
            .then(label_parser().repeated().collect::<Vec<_>>())
            .then(spanned_token(Token::LBrace))
            .then(body)
            .then(spanned_token(Token::RBrace))
            .map_with(|((((block_type, labels), open_brace), mut body), close_brace): ((((Spanned<String>, Vec<Label>), Span), Body), Span), e| {
                body.span = SimpleSpan::from(open_brace.end..close_brace.start);
                Some(BodyItem::Block(Block {
                    block_type,
                    labels,
                    open_brace,
                    close_brace,
                    body,
                    span: e.span(),
                }))
            });

        // A name being typed, not yet an attribute or a block
        let incomplete = spanned_ident_parser().validate(|name, _e, emitter| {
            emitter.emit(Rich::custom(
                name.span(),
                format!("Expected `=` or a block body after `{}`", name.value()),
            ));
            None::<BodyItem>
        });

        just(Token::Newline)
            .repeated()
            .ignore_then(
                choice((attribute, block, incomplete))
                    .separated_by(just(Token::Newline).repeated().at_least(1))
                    .allow_trailing()
                    .collect::<Vec<Option<BodyItem>>>(),
            )
            .map_with(|items, e| Body::new(items.into_iter().flatten().collect(), e.span()))
    })
}

fn parse_body_tokens(
    tokens: &[(Token<'_>, Span)],
    eoi: usize,
) -> (Option<Body>, Vec<ParseDiagnostic>) {
    let stream = Stream::from_iter(tokens.iter().copied())
        .map(SimpleSpan::from(eoi..eoi), |(t, s): (_, _)| (t, s));
    let (output, errors) = body_parser()
        .then_ignore(end())
        .parse(stream)
        .into_output_errors();
    let diagnostics = errors.iter().map(ParseDiagnostic::from_rich).collect();
    (output, diagnostics)
}

/// Splits tokens into top-level items at newlines outside any brackets.
fn top_level_chunks<'a, 'src>(tokens: &'a [(Token<'src>, Span)]) -> Vec<&'a [(Token<'src>, Span)]> {
    let mut chunks = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, (token, _)) in tokens.iter().enumerate() {
        match token {
            Token::LBrace | Token::LBrack | Token::LParen => depth += 1,
            Token::RBrace | Token::RBrack | Token::RParen => depth = depth.saturating_sub(1),
            Token::Newline if depth == 0 => {
                if i > start {
                    chunks.push(&tokens[start..i]);
                }
                start = i + 1;
            }
            _ => {}
        }
    }
    if start < tokens.len() {
        chunks.push(&tokens[start..]);
    }
    chunks
}

fn recover_items(tokens: &[(Token<'_>, Span)], eoi: usize, items: &mut Vec<BodyItem>) {
    for chunk in top_level_chunks(tokens) {
        match parse_body_tokens(chunk, eoi).0 {
            Some(body) => items.extend(body.items),
            None => items.extend(recover_block(chunk, eoi)),
        }
    }
}

/// Rebuilds a block whose body failed to parse, keeping the items that do.
fn recover_block(chunk: &[(Token<'_>, Span)], eoi: usize) -> Option<BodyItem> {
    let (&(first, type_span), rest) = chunk.split_first()?;
    let Token::Ident(block_type) = first else {
        return None;
    };
    let brace = rest.iter().position(|(t, _)| *t == Token::LBrace)?;
    let mut labels = Vec::new();
    for &(token, span) in &rest[..brace] {
        match token {
            Token::Ident(s) => labels.push(Label {
                value: s.to_string(),
                span,
                quoted: false,
            }),
            Token::QuotedString(s) => labels.push(Label {
                value: unquote(s, span.start),
                span,
                quoted: true,
            }),
            _ => return None,
        }
    }
    let open_brace = rest[brace].1;
    let inner = &rest[brace + 1..];
    let (inner, close_brace) = match inner.split_last() {
        Some((&(Token::RBrace, span), init)) => (init, span),
        _ => (inner, SimpleSpan::from(eoi..eoi)),
    };

    let mut items = Vec::new();
    recover_items(inner, eoi, &mut items);
    Some(BodyItem::Block(Block {
        block_type: Spanned::new(block_type.to_string(), type_span),
        labels,
        open_brace,
        close_brace,
        body: Body::new(items, SimpleSpan::from(open_brace.end..close_brace.start)),
        span: SimpleSpan::from(type_span.start..close_brace.end),
    }))
}

/// Parses a whole configuration file body.
pub fn parse_body(source: &str) -> (Body, Vec<ParseDiagnostic>) {
    let _span = tracing::trace_span!("parse_body", len = source.len()).entered();

    let (tokens, lex_errors) = lex(source, 0, false);
    let mut diagnostics: Vec<ParseDiagnostic> = lex_errors
        .into_iter()
        .map(|err| ParseDiagnostic {
            message: err.to_string(),
            span: err.span,
        })
        .collect();

    let full_span = SimpleSpan::from(0..source.len());
    let (output, errors) = parse_body_tokens(&tokens, source.len());
    diagnostics.extend(errors);
    if let Some(mut body) = output {
        body.span = full_span;
        return (body, diagnostics);
    }

    tracing::debug!(
        errors = diagnostics.len(),
        "body failed to parse, recovering item by item"
    );
    let mut items = Vec::new();
    recover_items(&tokens, source.len(), &mut items);
    (Body::new(items, full_span), diagnostics)
}

/// Parses a standalone expression whose first byte sits at `offset` in the
/// enclosing file. Returns `None` when the text holds no valid expression.
pub fn parse_expression(source: &str, offset: usize) -> (Option<Spanned<Expression>>, Vec<ParseDiagnostic>) {
    let (tokens, lex_errors) = lex(source, offset, true);
    let mut diagnostics: Vec<ParseDiagnostic> = lex_errors
        .into_iter()
        .map(|err| ParseDiagnostic {
            message: err.to_string(),
            span: err.span,
        })
        .collect();
    if tokens.is_empty() {
        return (None, diagnostics);
    }

    let eoi = offset + source.len();
    let stream = Stream::from_iter(tokens.iter().copied())
        .map(SimpleSpan::from(eoi..eoi), |(t, s): (_, _)| (t, s));
    let (output, errors) = expression_parser()
        .then_ignore(end())
        .parse(stream)
        .into_output_errors();
    diagnostics.extend(errors.iter().map(ParseDiagnostic::from_rich));
    (output, diagnostics)
}
