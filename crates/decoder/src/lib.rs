//! # Decoder
//!
//! Answers editor queries (completion, hover, semantic tokens and reference
//! navigation) for parsed configuration files against a schema.
//!
//! A [`PathContext`] bundles the schema, the parsed files and the reference
//! index of one path. [`PathDecoder`] runs the queries against it; nothing
//! is cached or mutated between calls.
//!
//! ```text
//! PathDecoder::completion_at_pos
//!   -> body walk (completion/hover/semantic_tokens)
//!        -> body_schema: dependent bodies, extensions
//!        -> expr: constraint-directed expression decoding
//!             -> reference index (hclang-reference)
//! ```

mod body_schema;
mod collect;
mod completion;
pub mod config;
pub mod context;
mod decoder;
pub mod error;
mod expr;
mod hover;
mod semantic_tokens;

pub use config::DecoderConfig;
pub use context::{CancellationToken, Path, PathContext, PathReader};
pub use decoder::{Decoder, PathDecoder, RenameTargets};
pub use error::DecoderError;
