//! # Dependent Body Keys
//!
//! A [`SchemaKey`] selects a dependent body by the concrete label values and
//! attribute values of a block. Keys are canonicalised so that the same set
//! of dependencies always produces the same key.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::lang::Address;
use crate::types::Value;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LabelDependent {
    pub index: usize,
    pub value: String,
}

/// Value an attribute must have for a dependent body to apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpressionValue {
    Static(Value),
    Address(Address),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDependent {
    pub name: String,
    pub expr: ExpressionValue,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DependencyKeys {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<LabelDependent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<AttributeDependent>,
}

impl DependencyKeys {
    pub fn label(index: usize, value: impl Into<String>) -> Self {
        Self {
            labels: vec![LabelDependent {
                index,
                value: value.into(),
            }],
            attributes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_label(mut self, index: usize, value: impl Into<String>) -> Self {
        self.labels.push(LabelDependent {
            index,
            value: value.into(),
        });
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, expr: ExpressionValue) -> Self {
        self.attributes.push(AttributeDependent {
            name: name.into(),
            expr,
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() && self.attributes.is_empty()
    }

    /// Number of dependencies satisfied by the given block, or `None` when
    /// any dependency is not satisfied.
    pub fn match_count<'a>(
        &self,
        labels: &[&str],
        attribute: impl Fn(&str) -> Option<&'a ExpressionValue>,
    ) -> Option<usize> {
        for dep in &self.labels {
            if labels.get(dep.index) != Some(&dep.value.as_str()) {
                return None;
            }
        }
        for dep in &self.attributes {
            if attribute(&dep.name) != Some(&dep.expr) {
                return None;
            }
        }
        Some(self.labels.len() + self.attributes.len())
    }

    fn canonical(&self) -> Self {
        let mut keys = self.clone();
        keys.labels.sort();
        keys.attributes.sort_by(|a, b| a.name.cmp(&b.name));
        keys
    }
}

/// Canonical string form of [`DependencyKeys`], usable as a map key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaKey(String);

impl SchemaKey {
    pub fn new(keys: &DependencyKeys) -> Self {
        // Serialising plain data with string map keys cannot fail
        let encoded = serde_json::to_string(&keys.canonical()).unwrap_or_default();
        Self(encoded)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn dependency_keys(&self) -> Result<DependencyKeys, serde_json::Error> {
        serde_json::from_str(&self.0)
    }
}

impl From<&DependencyKeys> for SchemaKey {
    fn from(keys: &DependencyKeys) -> Self {
        Self::new(keys)
    }
}

impl fmt::Display for SchemaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
