//! # Language Output Types
//!
//! Addresses, semantic tokens, completion candidates and hover data: the
//! values the decoder hands back to its callers.

use std::borrow::Cow;
use std::fmt;

use hclang_syntax::Range;
use serde::{Deserialize, Serialize};

/// Key of an index step in an address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexKey {
    String(String),
    Number(u64),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressStep {
    Root(String),
    Attr(String),
    Index(IndexKey),
}

impl fmt::Display for AddressStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root(name) => write!(f, "{name}"),
            Self::Attr(name) => write!(f, ".{name}"),
            Self::Index(IndexKey::String(key)) => write!(f, "[{key:?}]"),
            Self::Index(IndexKey::Number(n)) => write!(f, "[{n}]"),
        }
    }
}

/// An ordered sequence of steps identifying a symbol, e.g. `var.foo["k"]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address(Vec<AddressStep>);

impl Address {
    pub const fn new(steps: Vec<AddressStep>) -> Self {
        Self(steps)
    }

    /// `root.attr1.attr2...`
    pub fn from_names<'a>(root: &str, attrs: impl IntoIterator<Item = &'a str>) -> Self {
        let mut steps = vec![AddressStep::Root(root.to_string())];
        steps.extend(attrs.into_iter().map(|a| AddressStep::Attr(a.to_string())));
        Self(steps)
    }

    pub fn steps(&self) -> &[AddressStep] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, step: AddressStep) {
        self.0.push(step);
    }

    #[must_use]
    pub fn with_step(&self, step: AddressStep) -> Self {
        let mut steps = self.0.clone();
        steps.push(step);
        Self(steps)
    }

    /// Whether `prefix` matches the first steps of this address.
    pub fn starts_with(&self, prefix: &Self) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// The address truncated to its first `n` steps.
    #[must_use]
    pub fn first_steps(&self, n: usize) -> Self {
        Self(self.0.iter().take(n).cloned().collect())
    }
}

impl FromIterator<AddressStep> for Address {
    fn from_iter<T: IntoIterator<Item = AddressStep>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.0 {
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

/// A named category a reference can be constrained to instead of a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScopeId(String);

impl ScopeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ScopeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkupKind {
    #[default]
    PlainText,
    Markdown,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarkupContent {
    pub kind: MarkupKind,
    pub value: String,
}

impl MarkupContent {
    pub fn plain_text(value: impl Into<String>) -> Self {
        Self {
            kind: MarkupKind::PlainText,
            value: value.into(),
        }
    }

    pub fn markdown(value: impl Into<String>) -> Self {
        Self {
            kind: MarkupKind::Markdown,
            value: value.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticTokenType {
    BlockType,
    BlockLabel,
    AttrName,
    Bool,
    String,
    Number,
    ObjectKey,
    MapKey,
    Keyword,
    ReferenceStep,
    TypePrimitive,
    TypeCapsule,
    FunctionName,
}

impl SemanticTokenType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BlockType => "hcl-blockType",
            Self::BlockLabel => "hcl-blockLabel",
            Self::AttrName => "hcl-attrName",
            Self::Bool => "hcl-bool",
            Self::String => "hcl-string",
            Self::Number => "hcl-number",
            Self::ObjectKey => "hcl-objectKey",
            Self::MapKey => "hcl-mapKey",
            Self::Keyword => "hcl-keyword",
            Self::ReferenceStep => "hcl-referenceStep",
            Self::TypePrimitive => "hcl-typePrimitive",
            Self::TypeCapsule => "hcl-typeCapsule",
            Self::FunctionName => "hcl-functionName",
        }
    }
}

/// A semantic token modifier. Schemas may declare their own.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SemanticTokenModifier(Cow<'static, str>);

impl SemanticTokenModifier {
    /// Carried by labels that select a dependent body
    pub const DEPENDENT: Self = Self(Cow::Borrowed("hcl-dependent"));

    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Appends `extra` to `base`, skipping modifiers already present.
pub fn merge_modifiers(
    base: &[SemanticTokenModifier],
    extra: &[SemanticTokenModifier],
) -> Vec<SemanticTokenModifier> {
    let mut merged = base.to_vec();
    for modifier in extra {
        if !merged.contains(modifier) {
            merged.push(modifier.clone());
        }
    }
    merged
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticToken {
    #[serde(rename = "type")]
    pub token_type: SemanticTokenType,
    pub modifiers: Vec<SemanticTokenModifier>,
    pub range: Range,
}

impl SemanticToken {
    pub const fn new(token_type: SemanticTokenType, modifiers: Vec<SemanticTokenModifier>, range: Range) -> Self {
        Self {
            token_type,
            modifiers,
            range,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateKind {
    Attribute,
    Block,
    Label,
    Bool,
    String,
    Number,
    Keyword,
    List,
    Set,
    Map,
    Object,
    Tuple,
    Reference,
    Function,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEdit {
    pub range: Range,
    pub new_text: String,
    /// Same edit with tab-stop placeholders
    pub snippet: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub label: String,
    pub description: MarkupContent,
    pub detail: String,
    pub is_deprecated: bool,
    pub text_edit: TextEdit,
    pub kind: CandidateKind,
    /// Client should ask for completion again after inserting
    pub trigger_suggest: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidates {
    pub list: Vec<Candidate>,
    pub is_complete: bool,
}

impl Candidates {
    pub const fn complete(list: Vec<Candidate>) -> Self {
        Self {
            list,
            is_complete: true,
        }
    }

    pub const fn incomplete(list: Vec<Candidate>) -> Self {
        Self {
            list,
            is_complete: false,
        }
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.list.iter().map(|c| c.label.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoverData {
    pub content: MarkupContent,
    pub range: Range,
}
