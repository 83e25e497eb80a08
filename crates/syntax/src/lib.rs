//! Lexer, parser and AST for the native configuration syntax, plus a loader
//! for its JSON variant.

pub mod ast;
pub mod error;
pub mod file;
pub mod lexer;
pub mod parser;
pub mod pos;
pub mod template;

pub use ast::{
    Attribute, Block, Body, BodyItem, Expression, Label, Literal, ObjectItem, Spanned, Template,
    TemplatePart, Traversal, TraversalKey, TraversalStep,
};
pub use error::SyntaxError;
pub use file::{parse_config, parse_json, File, FileBody};
pub use parser::ParseDiagnostic;
pub use pos::{LineIndex, Pos, Range, Span};
