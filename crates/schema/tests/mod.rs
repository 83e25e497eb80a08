//! # Schema Tests
//!
//! - `loading` - schemas described in JSON
//! - `dependent` - dependent body selection

mod loading;
