//! # Reference Targets
//!
//! A [`Target`] is a symbol declared somewhere in the document, e.g. a
//! variable, a block turned into data or an implicit `count.index`.

use hclang_schema::{Address, MarkupContent, ScopeId, Type};
use hclang_syntax::{Pos, Range};
use serde::{Deserialize, Serialize};

use crate::origin::{Origin, OriginConstraint};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Absolute address, referenceable from anywhere in the path
    #[serde(default)]
    pub addr: Option<Address>,
    /// Address only valid inside `targetable_from_range`
    #[serde(default)]
    pub local_addr: Option<Address>,
    #[serde(default)]
    pub targetable_from_range: Option<Range>,
    #[serde(default)]
    pub scope_id: Option<ScopeId>,
    /// Whole declaration
    #[serde(default)]
    pub range: Option<Range>,
    /// Part of the declaration a definition jump lands on
    #[serde(default)]
    pub def_range: Option<Range>,
    #[serde(default, rename = "type")]
    pub ty: Option<Type>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: MarkupContent,
    #[serde(default)]
    pub nested_targets: Targets,
}

/// Whether a value of type `have` can stand where `want` is expected.
/// `Dynamic` on either side is a wildcard.
pub fn type_compatible(have: &Type, want: &Type) -> bool {
    match (have, want) {
        (Type::Dynamic, _) | (_, Type::Dynamic) => true,
        (Type::List(a), Type::List(b)) | (Type::Set(a), Type::Set(b)) | (Type::Map(a), Type::Map(b)) => {
            type_compatible(a, b)
        }
        (Type::Tuple(a), Type::Tuple(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(a, b)| type_compatible(a, b))
        }
        _ => have == want,
    }
}

impl Target {
    pub fn new(addr: Address, ty: Type) -> Self {
        Self {
            addr: Some(addr),
            ty: Some(ty),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_nested(mut self, nested: Targets) -> Self {
        self.nested_targets = nested;
        self
    }

    /// Absolute address, or the local one for local-only targets.
    pub fn address(&self) -> Option<&Address> {
        self.addr.as_ref().or(self.local_addr.as_ref())
    }

    pub fn friendly_name(&self) -> String {
        if !self.name.is_empty() {
            return self.name.clone();
        }
        self.ty
            .as_ref()
            .map_or_else(|| "reference".to_string(), Type::friendly_name)
    }

    pub fn has_signature(&self) -> bool {
        self.ty.is_some() || self.scope_id.is_some()
    }

    /// Whether the address of `origin` refers to this target (ignoring
    /// nested targets). A dynamically typed target also matches any longer
    /// address it is a prefix of.
    pub fn matches_address(&self, origin: &Origin) -> bool {
        if let Some(local) = &self.local_addr {
            if *local == origin.addr {
                return self
                    .targetable_from_range
                    .as_ref()
                    .is_none_or(|rng| rng.filename == origin.range.filename && rng.contains_pos(origin.range.start));
            }
        }
        let Some(addr) = &self.addr else {
            return false;
        };
        if origin.addr.len() < addr.len() {
            return false;
        }
        if matches!(self.ty, Some(Type::Dynamic)) {
            return origin.addr.starts_with(addr);
        }
        origin.addr == *addr
    }

    /// Lookup rule used for hover and go-to-definition.
    pub fn matches(&self, origin: &Origin) -> bool {
        if !self.has_signature() || !self.matches_address(origin) {
            return false;
        }
        origin.constraints.is_empty()
            || origin
                .constraints
                .iter()
                .any(|cons| self.satisfies(cons.of_scope_id.as_ref(), cons.of_type.as_ref()))
    }

    /// Whether this target may be offered for a reference accepting the
    /// given scope and/or type. Without either, anything goes.
    pub fn satisfies(&self, scope: Option<&ScopeId>, ty: Option<&Type>) -> bool {
        if let Some(scope) = scope {
            if self.scope_id.as_ref() != Some(scope) {
                return false;
            }
        }
        match ty {
            Some(want) => self.ty.as_ref().is_some_and(|have| type_compatible(have, want)),
            None => true,
        }
    }

    /// Lookup rule used when collecting the usages of this target,
    /// descending into nested targets.
    pub fn is_targetable_by(&self, origin: &Origin) -> bool {
        if self.nested_targets.iter().any(|nested| nested.is_targetable_by(origin)) {
            return true;
        }
        if !self.has_signature() || !self.matches_address(origin) {
            return false;
        }
        if origin.constraints.is_empty() {
            // Origins loaded from JSON carry no constraints
            return self.ty.is_some();
        }
        origin
            .constraints
            .iter()
            .any(|cons| self.is_targetable_under(cons))
    }

    fn is_targetable_under(&self, cons: &OriginConstraint) -> bool {
        if self.scope_id != cons.of_scope_id {
            return false;
        }
        match (&self.ty, &cons.of_type) {
            (Some(Type::Dynamic), _) => true,
            (Some(have), Some(want)) => have == want || want.is_dynamic(),
            _ => false,
        }
    }
}

/// Ordered collection of targets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Targets(Vec<Target>);

impl Targets {
    pub const fn new(targets: Vec<Target>) -> Self {
        Self(targets)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Target> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, target: Target) {
        self.0.push(target);
    }

    pub fn as_slice(&self) -> &[Target] {
        &self.0
    }

    /// Visits every target depth first, parents before children, until
    /// `f` returns `false`.
    pub fn deep_walk<'a>(&'a self, f: &mut impl FnMut(&'a Target) -> bool) -> bool {
        for target in &self.0 {
            if !f(target) || !target.nested_targets.deep_walk(f) {
                return false;
            }
        }
        true
    }

    /// All targets, nested ones included, that `origin` refers to.
    pub fn matching(&self, origin: &Origin) -> Vec<&Target> {
        let mut found = Vec::new();
        self.deep_walk(&mut |target| {
            if target.matches(origin) {
                found.push(target);
            }
            true
        });
        found
    }

    /// Targets declared around `pos`, preferring the innermost nested
    /// target unless `pos` is on the target's own definition.
    pub fn innermost_at_pos(&self, filename: &str, pos: Pos) -> Vec<&Target> {
        let mut innermost = Vec::new();
        for target in &self.0 {
            let Some(range) = &target.range else {
                continue;
            };
            if range.filename != filename || !range.contains_pos(pos) {
                continue;
            }
            let on_definition = target
                .def_range
                .as_ref()
                .is_some_and(|def| def.filename == filename && def.contains_pos(pos));
            if on_definition {
                innermost.push(target);
                continue;
            }
            let nested = target.nested_targets.innermost_at_pos(filename, pos);
            if nested.is_empty() {
                innermost.push(target);
            } else {
                innermost = nested;
            }
        }
        innermost
    }

    /// Targets whose address starts with `prefix`, usable from
    /// `origin_range` under the given constraint. Targets declared inside
    /// `outermost_body` are skipped so a block cannot reference itself.
    pub fn match_walk(
        &self,
        cons: &OriginConstraint,
        prefix: &str,
        outermost_body: Option<&Range>,
        origin_range: &Range,
    ) -> Vec<&Target> {
        let mut found = Vec::new();
        self.deep_walk(&mut |target| {
            let scope = cons.of_scope_id.as_ref();
            let ty = cons.of_type.as_ref();
            let local = target.local_addr.as_ref().is_some_and(|addr| {
                addr.to_string().starts_with(prefix)
                    && target
                        .targetable_from_range
                        .as_ref()
                        .is_none_or(|rng| rng.contains(origin_range))
            });
            let absolute = target.addr.as_ref().is_some_and(|addr| {
                let self_ref = match (outermost_body, &target.range) {
                    (Some(body), Some(range)) => body.contains(range),
                    _ => false,
                };
                addr.to_string().starts_with(prefix) && !self_ref
            });
            if (local || absolute) && target.satisfies(scope, ty) {
                found.push(target);
            }
            true
        });
        found
    }
}

impl From<Vec<Target>> for Targets {
    fn from(targets: Vec<Target>) -> Self {
        Self(targets)
    }
}

impl FromIterator<Target> for Targets {
    fn from_iter<T: IntoIterator<Item = Target>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Target> for Targets {
    fn extend<T: IntoIterator<Item = Target>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

impl IntoIterator for Targets {
    type Item = Target;
    type IntoIter = std::vec::IntoIter<Target>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Targets {
    type Item = &'a Target;
    type IntoIter = std::slice::Iter<'a, Target>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
