//! # Schema Model
//!
//! The types a configuration schema is made of, and the values the decoder
//! produces from it.
//!
//! - [`types`]: value types and literal values
//! - [`constraint`]: what an expression may contain
//! - [`schema`]: attribute, block and body schemas with their extensions
//! - [`dependency`]: keys selecting label- or attribute-dependent bodies
//! - [`lang`]: addresses, semantic tokens, completion candidates and hovers

pub mod constraint;
pub mod dependency;
pub mod function;
pub mod lang;
pub mod schema;
pub mod types;

pub use constraint::{CompletionData, Constraint};
pub use dependency::{AttributeDependent, DependencyKeys, ExpressionValue, LabelDependent, SchemaKey};
pub use function::{FunctionParameter, FunctionSignature};
pub use lang::{
    merge_modifiers, Address, AddressStep, Candidate, CandidateKind, Candidates, HoverData,
    IndexKey, MarkupContent, MarkupKind, ScopeId, SemanticToken, SemanticTokenModifier,
    SemanticTokenType, TextEdit,
};
pub use schema::{
    AddrStep, AttributeAddrSchema, AttributeSchema, BlockAddrSchema, BlockSchema, BodyExtensions,
    BodySchema, LabelSchema,
};
pub use types::{Type, Value};
