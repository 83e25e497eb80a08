//! # Reference Origins
//!
//! An [`Origin`] is a place in the document referring to an address, along
//! with the type or scope requirements imposed by where it appears.

use hclang_schema::{Address, ScopeId, Type};
use hclang_syntax::{Pos, Range};
use serde::{Deserialize, Serialize};

use crate::target::Target;

/// One acceptable signature for the target of an origin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginConstraint {
    #[serde(default)]
    pub of_scope_id: Option<ScopeId>,
    #[serde(default)]
    pub of_type: Option<Type>,
}

impl OriginConstraint {
    pub const fn of_type(ty: Type) -> Self {
        Self {
            of_scope_id: None,
            of_type: Some(ty),
        }
    }

    pub fn of_scope(scope: impl Into<ScopeId>) -> Self {
        Self {
            of_scope_id: Some(scope.into()),
            of_type: None,
        }
    }
}

/// Alternatives; a target satisfying any one of them matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginConstraints(Vec<OriginConstraint>);

impl OriginConstraints {
    pub const fn new(constraints: Vec<OriginConstraint>) -> Self {
        Self(constraints)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OriginConstraint> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn push(&mut self, constraint: OriginConstraint) {
        self.0.push(constraint);
    }
}

impl FromIterator<OriginConstraint> for OriginConstraints {
    fn from_iter<T: IntoIterator<Item = OriginConstraint>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    pub addr: Address,
    pub range: Range,
    #[serde(default)]
    pub constraints: OriginConstraints,
}

impl Origin {
    pub fn new(addr: Address, range: Range) -> Self {
        Self {
            addr,
            range,
            constraints: OriginConstraints::default(),
        }
    }

    #[must_use]
    pub fn with_constraints(mut self, constraints: OriginConstraints) -> Self {
        self.constraints = constraints;
        self
    }
}

/// Ordered collection of origins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origins(Vec<Origin>);

impl Origins {
    pub const fn new(origins: Vec<Origin>) -> Self {
        Self(origins)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Origin> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, origin: Origin) {
        self.0.push(origin);
    }

    pub fn as_slice(&self) -> &[Origin] {
        &self.0
    }

    /// The origin whose range in `filename` contains `pos`.
    pub fn at_pos(&self, filename: &str, pos: Pos) -> Option<&Origin> {
        self.0
            .iter()
            .filter(|origin| origin.range.filename == filename)
            .find(|origin| origin.range.contains_pos(pos))
    }

    /// Origins referring to `target` or to any of its nested targets.
    pub fn targeting(&self, target: &Target) -> Self {
        let origins: Vec<Origin> = self
            .0
            .iter()
            .filter(|origin| target.is_targetable_by(origin))
            .cloned()
            .collect();
        tracing::trace!(
            target_addr = ?target.address().map(ToString::to_string),
            count = origins.len(),
            "origins targeting"
        );
        Self(origins)
    }
}

impl From<Vec<Origin>> for Origins {
    fn from(origins: Vec<Origin>) -> Self {
        Self(origins)
    }
}

impl FromIterator<Origin> for Origins {
    fn from_iter<T: IntoIterator<Item = Origin>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Origin> for Origins {
    fn extend<T: IntoIterator<Item = Origin>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

impl IntoIterator for Origins {
    type Item = Origin;
    type IntoIter = std::vec::IntoIter<Origin>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Origins {
    type Item = &'a Origin;
    type IntoIter = std::slice::Iter<'a, Origin>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
