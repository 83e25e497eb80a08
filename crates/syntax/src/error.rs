//! # Error Reporting
//!
//! Syntax errors and their rendering into human-readable reports.

use ariadne::{Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::parser::ParseDiagnostic;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("File is not valid UTF-8 (valid up to byte {valid_up_to})")]
    InvalidUtf8 { valid_up_to: usize },
    #[error("Invalid JSON: {0}")]
    Json(String),
}

/// Build a formatted report for a parse diagnostic
pub fn build_diagnostic_message(
    source: &str,
    diagnostic: &ParseDiagnostic,
    with_color: bool,
) -> String {
    let mut write_buffer = Vec::new();
    let written = Report::build(ReportKind::Error, ((), diagnostic.span.into_range()))
        .with_config(
            ariadne::Config::new()
                .with_index_type(ariadne::IndexType::Byte)
                .with_color(with_color),
        )
        .with_message(&diagnostic.message)
        .with_label(Label::new(((), diagnostic.span.into_range())).with_message(&diagnostic.message))
        .finish()
        .write(Source::from(source), &mut write_buffer);
    match written {
        Ok(()) => String::from_utf8_lossy(&write_buffer).to_string(),
        Err(_) => diagnostic.message.clone(),
    }
}
