//! # Body, Block and Attribute Schemas

use bitflags::bitflags;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::constraint::Constraint;
use crate::dependency::SchemaKey;
use crate::lang::{MarkupContent, ScopeId, SemanticTokenModifier};

bitflags! {
    /// Opt-in language features of a body.
    #[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct BodyExtensions: u8 {
        /// `count` attribute and the `count.index` reference
        const COUNT = 1 << 0;
        /// `for_each` attribute and the `each.key`/`each.value` references
        const FOR_EACH = 1 << 1;
        /// `dynamic "<block type>"` blocks
        const DYNAMIC_BLOCKS = 1 << 2;
        /// `self.*` references to the enclosing block
        const SELF_REFS = 1 << 3;
    }
}

/// A step of an address declared by the schema for attributes and blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddrStep {
    /// Fixed name
    Static(String),
    /// Value of the label at the given index
    LabelValue(usize),
    /// Name of the attribute declaring the address
    AttrName,
    /// Static value of the named attribute in the block body
    AttrValue(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeAddrSchema {
    pub steps: Vec<AddrStep>,
    #[serde(default)]
    pub scope_id: Option<ScopeId>,
    /// Declare a target typed by the attribute's constraint
    #[serde(default)]
    pub as_expr_type: bool,
    /// Declare a scoped reference target
    #[serde(default)]
    pub as_reference: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockAddrSchema {
    pub steps: Vec<AddrStep>,
    #[serde(default)]
    pub scope_id: Option<ScopeId>,
    #[serde(default)]
    pub as_reference: bool,
    /// Declare the body as an object-typed target
    #[serde(default)]
    pub body_as_data: bool,
    /// Declare one nested target per attribute of the body
    #[serde(default)]
    pub infer_body: bool,
    /// Include attributes of the matched dependent body in the data
    #[serde(default)]
    pub dependent_body_as_data: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeSchema {
    #[serde(default)]
    pub description: MarkupContent,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub is_optional: bool,
    #[serde(default)]
    pub is_computed: bool,
    #[serde(default)]
    pub is_sensitive: bool,
    #[serde(default)]
    pub is_deprecated: bool,
    pub constraint: Constraint,
    #[serde(default)]
    pub address: Option<AttributeAddrSchema>,
    #[serde(default)]
    pub semantic_token_modifiers: Vec<SemanticTokenModifier>,
}

impl AttributeSchema {
    pub fn new(constraint: Constraint) -> Self {
        Self {
            description: MarkupContent::default(),
            is_required: false,
            is_optional: false,
            is_computed: false,
            is_sensitive: false,
            is_deprecated: false,
            constraint,
            address: None,
            semantic_token_modifiers: Vec::new(),
        }
    }

    #[must_use]
    pub const fn required(mut self) -> Self {
        self.is_required = true;
        self
    }

    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.is_optional = true;
        self
    }

    #[must_use]
    pub const fn deprecated(mut self) -> Self {
        self.is_deprecated = true;
        self
    }

    #[must_use]
    pub const fn sensitive(mut self) -> Self {
        self.is_sensitive = true;
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: MarkupContent) -> Self {
        self.description = description;
        self
    }

    #[must_use]
    pub fn with_address(mut self, address: AttributeAddrSchema) -> Self {
        self.address = Some(address);
        self
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Vec<SemanticTokenModifier>) -> Self {
        self.semantic_token_modifiers = modifiers;
        self
    }

    /// `required, string` / `optional, list of string, sensitive`
    pub fn detail(&self) -> String {
        let mut details = Vec::new();
        if self.is_required {
            details.push("required".to_string());
        } else if self.is_optional {
            details.push("optional".to_string());
        }
        let name = self.constraint.friendly_name();
        if !name.is_empty() {
            details.push(name);
        }
        if self.is_sensitive {
            details.push("sensitive".to_string());
        }
        details.join(", ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSchema {
    pub name: String,
    #[serde(default)]
    pub description: MarkupContent,
    /// Value selects a dependent body
    #[serde(default)]
    pub is_dep_key: bool,
    #[serde(default)]
    pub completable: bool,
    #[serde(default)]
    pub semantic_token_modifiers: Vec<SemanticTokenModifier>,
}

impl LabelSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn dep_key(mut self) -> Self {
        self.is_dep_key = true;
        self
    }

    #[must_use]
    pub const fn completable(mut self) -> Self {
        self.completable = true;
        self
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Vec<SemanticTokenModifier>) -> Self {
        self.semantic_token_modifiers = modifiers;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockSchema {
    #[serde(default)]
    pub labels: Vec<LabelSchema>,
    #[serde(default)]
    pub description: MarkupContent,
    #[serde(default)]
    pub is_deprecated: bool,
    #[serde(default)]
    pub min_items: u64,
    /// Zero means unlimited
    #[serde(default)]
    pub max_items: u64,
    #[serde(default)]
    pub body: Option<BodySchema>,
    #[serde(default)]
    pub dependent_body: IndexMap<SchemaKey, BodySchema>,
    #[serde(default)]
    pub address: Option<BlockAddrSchema>,
    #[serde(default)]
    pub semantic_token_modifiers: Vec<SemanticTokenModifier>,
}

impl BlockSchema {
    pub fn new(body: BodySchema) -> Self {
        Self {
            body: Some(body),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_labels(mut self, labels: Vec<LabelSchema>) -> Self {
        self.labels = labels;
        self
    }

    #[must_use]
    pub fn with_dependent_body(mut self, key: SchemaKey, body: BodySchema) -> Self {
        self.dependent_body.insert(key, body);
        self
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Vec<SemanticTokenModifier>) -> Self {
        self.semantic_token_modifiers = modifiers;
        self
    }

    #[must_use]
    pub fn with_address(mut self, address: BlockAddrSchema) -> Self {
        self.address = Some(address);
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: MarkupContent) -> Self {
        self.description = description;
        self
    }

    pub fn has_dep_keys(&self) -> bool {
        self.labels.iter().any(|label| label.is_dep_key)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BodySchema {
    #[serde(default)]
    pub attributes: IndexMap<String, AttributeSchema>,
    #[serde(default)]
    pub blocks: IndexMap<String, BlockSchema>,
    /// Schema for attributes of any name not declared in `attributes`
    #[serde(default)]
    pub any_attribute: Option<AttributeSchema>,
    #[serde(default)]
    pub extensions: BodyExtensions,
    #[serde(default)]
    pub description: MarkupContent,
    #[serde(default)]
    pub is_deprecated: bool,
}

impl BodySchema {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, attr: AttributeSchema) -> Self {
        self.attributes.insert(name.into(), attr);
        self
    }

    #[must_use]
    pub fn with_block(mut self, name: impl Into<String>, block: BlockSchema) -> Self {
        self.blocks.insert(name.into(), block);
        self
    }

    #[must_use]
    pub fn with_any_attribute(mut self, attr: AttributeSchema) -> Self {
        self.any_attribute = Some(attr);
        self
    }

    #[must_use]
    pub const fn with_extensions(mut self, extensions: BodyExtensions) -> Self {
        self.extensions = extensions;
        self
    }

    /// Declared schema for the attribute, falling back to `any_attribute`.
    pub fn attribute(&self, name: &str) -> Option<&AttributeSchema> {
        self.attributes.get(name).or(self.any_attribute.as_ref())
    }

    pub fn block(&self, name: &str) -> Option<&BlockSchema> {
        self.blocks.get(name)
    }

    /// Adds attributes and blocks from `other` that are not declared here.
    /// Declarations already present keep priority.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        let mut merged = self.clone();
        for (name, attr) in &other.attributes {
            merged
                .attributes
                .entry(name.clone())
                .or_insert_with(|| attr.clone());
        }
        for (name, block) in &other.blocks {
            merged
                .blocks
                .entry(name.clone())
                .or_insert_with(|| block.clone());
        }
        if merged.any_attribute.is_none() {
            merged.any_attribute.clone_from(&other.any_attribute);
        }
        merged.extensions |= other.extensions;
        if merged.description.is_empty() {
            merged.description.clone_from(&other.description);
        }
        merged
    }
}
