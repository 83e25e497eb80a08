//! Splits quoted-string and heredoc bodies into literal and interpolation
//! parts. Interpolated expressions are parsed with spans relative to the
//! enclosing file.

use chumsky::span::SimpleSpan;

use crate::ast::{Expression, Spanned, Template, TemplatePart};
use crate::lexer::scan_template;
use crate::parser::{parse_expression, ParseDiagnostic};

/// Parses template text starting at byte `offset` of the file.
pub fn parse_template(raw: &str, offset: usize, heredoc: bool) -> (Template, Vec<ParseDiagnostic>) {
    let mut parts = Vec::new();
    let mut diagnostics = Vec::new();
    let mut literal = String::new();
    let mut literal_start = 0;
    let mut i = 0;

    while i < raw.len() {
        let rest = &raw[i..];
        if rest.starts_with("$${") || rest.starts_with("%%{") {
            literal.push_str(&rest[1..3]);
            i += 3;
            continue;
        }
        if rest.starts_with("${") || rest.starts_with("%{") {
            let Some(len) = scan_template(&rest[2..], true) else {
                literal.push_str(rest);
                break;
            };
            if rest.starts_with("%{") {
                // Directives are kept verbatim
                literal.push_str(&rest[..2 + len]);
                i += 2 + len;
                continue;
            }
            if !literal.is_empty() {
                let span = SimpleSpan::from(offset + literal_start..offset + i);
                parts.push(TemplatePart::Literal(Spanned::new(std::mem::take(&mut literal), span)));
            }

            let mut inner_start = i + 2;
            let mut inner_end = i + 2 + len - 1;
            if raw[inner_start..inner_end].starts_with('~') {
                inner_start += 1;
            }
            if inner_end > inner_start && raw[inner_start..inner_end].ends_with('~') {
                inner_end -= 1;
            }
            let inner = &raw[inner_start..inner_end];
            let (expr, errors) = parse_expression(inner, offset + inner_start);
            diagnostics.extend(errors);
            let expr = expr.unwrap_or_else(|| {
                let trimmed_start = inner_start + (inner.len() - inner.trim_start().len());
                let at = offset + trimmed_start;
                Spanned::new(Expression::Empty, SimpleSpan::from(at..at))
            });
            parts.push(TemplatePart::Interpolation(expr));

            i += 2 + len;
            literal_start = i;
            continue;
        }

        let Some(c) = rest.chars().next() else {
            break;
        };
        if c == '\\' && !heredoc {
            let (unescaped, consumed) = unescape(&rest[1..]);
            literal.push_str(&unescaped);
            i += 1 + consumed;
            continue;
        }
        literal.push(c);
        i += c.len_utf8();
    }

    if !literal.is_empty() {
        let span = SimpleSpan::from(offset + literal_start..offset + raw.len());
        parts.push(TemplatePart::Literal(Spanned::new(literal, span)));
    }
    (Template { parts, heredoc }, diagnostics)
}

/// Decodes the escape sequence following a backslash. Returns the decoded
/// text and the number of bytes consumed after the backslash.
fn unescape(rest: &str) -> (String, usize) {
    let Some(c) = rest.chars().next() else {
        return ("\\".to_string(), 0);
    };
    let simple = match c {
        'n' => Some('\n'),
        't' => Some('\t'),
        'r' => Some('\r'),
        '"' => Some('"'),
        '\\' => Some('\\'),
        _ => None,
    };
    if let Some(decoded) = simple {
        return (decoded.to_string(), 1);
    }
    let digits = match c {
        'u' => 4,
        'U' => 8,
        _ => return (format!("\\{c}"), c.len_utf8()),
    };
    let hex = rest.get(1..1 + digits);
    match hex
        .and_then(|h| u32::from_str_radix(h, 16).ok())
        .and_then(char::from_u32)
    {
        Some(decoded) => (decoded.to_string(), 1 + digits),
        None => (format!("\\{c}"), 1),
    }
}

/// Value of a quoted label or key, quotes included in `raw`.
pub fn unquote(raw: &str, offset: usize) -> String {
    let content = raw
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(raw);
    let (template, _) = parse_template(content, offset + 1, false);
    template.as_literal().unwrap_or_else(|| content.to_string())
}
