//! # Syntax Tests
//!
//! End-to-end tests for loading files: positions of parsed nodes, recovery
//! from incomplete input, the JSON variant and diagnostic rendering.
//!
//! - `files` - `parse_config` / `parse_json` / `File` accessors
//! - `recovery` - partial documents as typed in an editor

mod files;
mod recovery;

use hclang_syntax::{parse_config, File};

/// Parses `source` as `test.hcl`, asserting it has no diagnostics.
pub fn parse_ok(source: &str) -> File {
    let file = parse_config(source.as_bytes(), "test.hcl");
    assert!(
        !file.has_errors(),
        "unexpected diagnostics:\n{}",
        file.render_diagnostics(false).join("\n")
    );
    file
}
