//! # Lexer
//!
//! Tokenizes configuration source with `logos`. Quoted strings and heredocs
//! are lexed as whole tokens, interpolations included; the parser splits them
//! into template parts afterwards.
//!
//! Newlines are significant at body level (they terminate attributes) and
//! insignificant inside brackets, so [`lex`] drops the newline tokens that
//! appear inside expression brackets before handing tokens to the parser.

use std::fmt;

use chumsky::span::SimpleSpan;
use logos::Logos;
use thiserror::Error;

use crate::pos::Span;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r]+")]
#[logos(skip r"#[^\n]*")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*([^*]|\*+[^*/])*\*+/")]
pub enum Token<'a> {
    #[token("\n")]
    Newline,
    #[regex(r"[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?")]
    Number(&'a str),
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_-]*")]
    Ident(&'a str),
    /// Whole quoted string, quotes included
    #[token("\"", lex_quoted)]
    QuotedString(&'a str),
    /// Whole heredoc, from `<<` to the closing marker
    #[regex(r"<<-?[a-zA-Z_][a-zA-Z0-9_-]*\r?\n", lex_heredoc)]
    Heredoc(&'a str),
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("==")]
    EqEq,
    #[token("!=")]
    Neq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("=>")]
    FatArrow,
    #[token("...")]
    Ellipsis,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("!")]
    Bang,
    #[token("?")]
    Question,
    #[token("=")]
    Eq,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBrack,
    #[token("]")]
    RBrack,
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Newline => write!(f, "newline"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Ident(s) => write!(f, "{s}"),
            Self::QuotedString(s) => write!(f, "{s}"),
            Self::Heredoc(_) => write!(f, "heredoc"),
            Self::AndAnd => write!(f, "&&"),
            Self::OrOr => write!(f, "||"),
            Self::EqEq => write!(f, "=="),
            Self::Neq => write!(f, "!="),
            Self::LtEq => write!(f, "<="),
            Self::GtEq => write!(f, ">="),
            Self::FatArrow => write!(f, "=>"),
            Self::Ellipsis => write!(f, "..."),
            Self::Lt => write!(f, "<"),
            Self::Gt => write!(f, ">"),
            Self::Plus => write!(f, "+"),
            Self::Minus => write!(f, "-"),
            Self::Star => write!(f, "*"),
            Self::Slash => write!(f, "/"),
            Self::Percent => write!(f, "%"),
            Self::Bang => write!(f, "!"),
            Self::Question => write!(f, "?"),
            Self::Eq => write!(f, "="),
            Self::Colon => write!(f, ":"),
            Self::Comma => write!(f, ","),
            Self::Dot => write!(f, "."),
            Self::LParen => write!(f, "("),
            Self::RParen => write!(f, ")"),
            Self::LBrace => write!(f, "{{"),
            Self::RBrace => write!(f, "}}"),
            Self::LBrack => write!(f, "["),
            Self::RBrack => write!(f, "]"),
        }
    }
}

fn lex_quoted<'a>(lex: &mut logos::Lexer<'a, Token<'a>>) -> Option<&'a str> {
    let len = scan_template(lex.remainder(), false)?;
    lex.bump(len);
    Some(lex.slice())
}

fn lex_heredoc<'a>(lex: &mut logos::Lexer<'a, Token<'a>>) -> Option<&'a str> {
    let marker = lex.slice().trim_start_matches("<<").trim_start_matches('-').trim();
    let rest = lex.remainder();
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let content = line.trim_end_matches(['\n', '\r']);
        if content.trim() == marker {
            lex.bump(offset + content.trim_end().len());
            return Some(lex.slice());
        }
        offset += line.len();
    }
    None
}

/// Scans template text and returns the length up to and including its
/// terminator.
///
/// When `in_interpolation` is false, `rest` starts right after an opening
/// quote and the terminator is the closing quote. Otherwise `rest` starts
/// right after `${` and the terminator is the matching `}`.
pub fn scan_template(rest: &str, in_interpolation: bool) -> Option<usize> {
    enum Mode {
        Literal,
        Interpolation(usize),
    }

    let bytes = rest.as_bytes();
    let mut stack = vec![if in_interpolation {
        Mode::Interpolation(0)
    } else {
        Mode::Literal
    }];
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match stack.last_mut()? {
            Mode::Literal => match b {
                b'\\' => i += 1,
                b'\n' => return None,
                b'"' => {
                    stack.pop();
                    if stack.is_empty() {
                        return Some(i + 1);
                    }
                }
                b'$' | b'%' if bytes.get(i + 1) == Some(&b) && bytes.get(i + 2) == Some(&b'{') => {
                    i += 2;
                }
                b'$' | b'%' if bytes.get(i + 1) == Some(&b'{') => {
                    stack.push(Mode::Interpolation(0));
                    i += 1;
                }
                _ => {}
            },
            Mode::Interpolation(depth) => match b {
                b'{' => *depth += 1,
                b'}' if *depth == 0 => {
                    stack.pop();
                    if stack.is_empty() {
                        return Some(i + 1);
                    }
                }
                b'}' => *depth -= 1,
                b'"' => stack.push(Mode::Literal),
                _ => {}
            },
        }
        i += 1;
    }
    None
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid character sequence")]
pub struct LexingError {
    pub span: Span,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Bracket {
    Block,
    Expression,
}

/// Tokenizes `source`, shifting every span by `offset`.
///
/// With `expression_only`, the source is treated as a standalone expression
/// (template interpolation) and all newlines are insignificant.
pub fn lex<'a>(
    source: &'a str,
    offset: usize,
    expression_only: bool,
) -> (Vec<(Token<'a>, Span)>, Vec<LexingError>) {
    let mut tokens: Vec<(Token<'a>, Span)> = Vec::new();
    let mut errors = Vec::new();
    let mut stack: Vec<Bracket> = Vec::new();
    if expression_only {
        stack.push(Bracket::Expression);
    }

    for (result, range) in Token::lexer(source).spanned() {
        let span = SimpleSpan::from(range.start + offset..range.end + offset);
        let token = match result {
            Ok(token) => token,
            Err(()) => {
                errors.push(LexingError { span });
                continue;
            }
        };
        match token {
            Token::Newline if stack.last() == Some(&Bracket::Expression) => continue,
            Token::LBrace => {
                let at_body_level = matches!(stack.last(), None | Some(Bracket::Block));
                let after_block_header = matches!(
                    tokens.iter().rev().find(|(t, _)| *t != Token::Newline),
                    Some((Token::Ident(_) | Token::QuotedString(_), _))
                );
                stack.push(if at_body_level && after_block_header {
                    Bracket::Block
                } else {
                    Bracket::Expression
                });
            }
            Token::LBrack | Token::LParen => stack.push(Bracket::Expression),
            Token::RBrace | Token::RBrack | Token::RParen => {
                stack.pop();
            }
            _ => {}
        }
        tokens.push((token, span));
    }
    (tokens, errors)
}
