//! Parsed files, as handed to the analysis core.

use chumsky::span::SimpleSpan;

use crate::ast::Body;
use crate::error::{build_diagnostic_message, SyntaxError};
use crate::parser::{parse_body, ParseDiagnostic};
use crate::pos::{LineIndex, Pos, Range, Span};

/// The classified body of a file.
#[derive(Debug, Clone, PartialEq)]
pub enum FileBody {
    /// Native configuration syntax
    Native(Body),
    /// JSON variant of the language
    Json(serde_json::Value),
    /// Body that was never classified, e.g. a placeholder file
    Unknown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct File {
    filename: String,
    source: String,
    lines: LineIndex,
    body: FileBody,
    diagnostics: Vec<ParseDiagnostic>,
}

impl File {
    fn new(filename: &str, source: String, body: FileBody, diagnostics: Vec<ParseDiagnostic>) -> Self {
        Self {
            filename: filename.to_string(),
            lines: LineIndex::new(&source),
            source,
            body,
            diagnostics,
        }
    }

    /// A file whose body has not been classified.
    pub fn empty(filename: &str) -> Self {
        Self::new(filename, String::new(), FileBody::Unknown, vec![])
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn bytes(&self) -> &[u8] {
        self.source.as_bytes()
    }

    pub const fn body(&self) -> &FileBody {
        &self.body
    }

    /// The native body, if the file uses the native syntax.
    pub const fn native_body(&self) -> Option<&Body> {
        match &self.body {
            FileBody::Native(body) => Some(body),
            _ => None,
        }
    }

    pub fn diagnostics(&self) -> &[ParseDiagnostic] {
        &self.diagnostics
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub const fn len(&self) -> usize {
        self.lines.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn pos_at(&self, byte: usize) -> Pos {
        self.lines.pos_at(&self.source, byte)
    }

    /// Converts a byte span into a range of this file.
    pub fn range(&self, span: Span) -> Range {
        Range::new(
            self.filename.clone(),
            self.pos_at(span.start),
            self.pos_at(span.end),
        )
    }

    /// Source text covered by `span`, or an empty string for spans outside
    /// the file.
    pub fn text(&self, span: Span) -> &str {
        self.source.get(span.start..span.end).unwrap_or_default()
    }

    /// Byte at `offset`, if any.
    pub fn byte_at(&self, offset: usize) -> Option<u8> {
        self.source.as_bytes().get(offset).copied()
    }

    /// Renders every diagnostic into a report.
    pub fn render_diagnostics(&self, with_color: bool) -> Vec<String> {
        self.diagnostics
            .iter()
            .map(|diagnostic| build_diagnostic_message(&self.source, diagnostic, with_color))
            .collect()
    }
}

fn decode_utf8(bytes: &[u8]) -> Result<String, ParseDiagnostic> {
    String::from_utf8(bytes.to_vec()).map_err(|err| {
        let valid_up_to = err.utf8_error().valid_up_to();
        ParseDiagnostic {
            message: SyntaxError::InvalidUtf8 { valid_up_to }.to_string(),
            span: SimpleSpan::from(valid_up_to..valid_up_to),
        }
    })
}

/// Parses a file written in the native syntax.
pub fn parse_config(bytes: &[u8], filename: &str) -> File {
    let _span = tracing::trace_span!("parse_config", filename).entered();
    let source = match decode_utf8(bytes) {
        Ok(source) => source,
        Err(diagnostic) => {
            return File::new(filename, String::new(), FileBody::Unknown, vec![diagnostic]);
        }
    };
    let (body, diagnostics) = parse_body(&source);
    tracing::debug!(items = body.items.len(), errors = diagnostics.len(), "parsed config");
    File::new(filename, source, FileBody::Native(body), diagnostics)
}

/// Loads a file written in the JSON variant of the syntax.
pub fn parse_json(bytes: &[u8], filename: &str) -> File {
    let _span = tracing::trace_span!("parse_json", filename).entered();
    let source = match decode_utf8(bytes) {
        Ok(source) => source,
        Err(diagnostic) => {
            return File::new(filename, String::new(), FileBody::Unknown, vec![diagnostic]);
        }
    };
    match serde_json::from_str::<serde_json::Value>(&source) {
        Ok(value) => File::new(filename, source, FileBody::Json(value), vec![]),
        Err(err) => {
            let diagnostic = ParseDiagnostic {
                message: SyntaxError::Json(err.to_string()).to_string(),
                span: SimpleSpan::from(0..0),
            };
            File::new(filename, source, FileBody::Json(serde_json::Value::Null), vec![diagnostic])
        }
    }
}
