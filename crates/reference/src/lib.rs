//! # Reference Index
//!
//! Declared symbols ([`Target`]) and their usage sites ([`Origin`]), with the
//! compatibility rules that link one to the other.

pub mod error;
pub mod origin;
pub mod target;

pub use error::ReferenceError;
pub use origin::{Origin, OriginConstraint, OriginConstraints, Origins};
pub use target::{Target, Targets};
