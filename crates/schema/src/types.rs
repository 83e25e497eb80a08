//! # Value Types
//!
//! The type descriptors used to describe attribute values, reference
//! targets and constraint element types, plus typed literal values.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A value type. "No type" is expressed as `Option<Type>::None` by callers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Type {
    String,
    Number,
    Bool,
    /// Unknown type, compatible with anything
    Dynamic,
    List(Box<Type>),
    Set(Box<Type>),
    Map(Box<Type>),
    Object(BTreeMap<String, Type>),
    Tuple(Vec<Type>),
}

impl Type {
    pub fn list(elem: Self) -> Self {
        Self::List(Box::new(elem))
    }

    pub fn set(elem: Self) -> Self {
        Self::Set(Box::new(elem))
    }

    pub fn map(elem: Self) -> Self {
        Self::Map(Box::new(elem))
    }

    pub fn object<'a>(fields: impl IntoIterator<Item = (&'a str, Self)>) -> Self {
        Self::Object(
            fields
                .into_iter()
                .map(|(name, ty)| (name.to_string(), ty))
                .collect(),
        )
    }

    pub const fn is_primitive(&self) -> bool {
        matches!(self, Self::String | Self::Number | Self::Bool)
    }

    pub const fn is_dynamic(&self) -> bool {
        matches!(self, Self::Dynamic)
    }

    /// Element type of a list, set or map.
    pub fn element_type(&self) -> Option<&Self> {
        match self {
            Self::List(elem) | Self::Set(elem) | Self::Map(elem) => Some(elem),
            _ => None,
        }
    }

    /// Short human-readable name, e.g. `list of string`.
    pub fn friendly_name(&self) -> String {
        match self {
            Self::String => "string".to_string(),
            Self::Number => "number".to_string(),
            Self::Bool => "bool".to_string(),
            Self::Dynamic => "dynamic".to_string(),
            Self::List(elem) => format!("list of {}", elem.friendly_name()),
            Self::Set(elem) => format!("set of {}", elem.friendly_name()),
            Self::Map(elem) => format!("map of {}", elem.friendly_name()),
            Self::Object(_) => "object".to_string(),
            Self::Tuple(_) => "tuple".to_string(),
        }
    }

    /// Type expression as it would be written in a type declaration.
    /// Objects span multiple lines, one attribute per line.
    pub fn type_signature(&self) -> String {
        let mut out = String::new();
        self.write_signature(&mut out, 0);
        out
    }

    pub(crate) fn write_signature(&self, out: &mut String, indent: usize) {
        match self {
            Self::String | Self::Number | Self::Bool => out.push_str(&self.friendly_name()),
            Self::Dynamic => out.push_str("any"),
            Self::List(elem) | Self::Set(elem) | Self::Map(elem) => {
                let keyword = match self {
                    Self::List(_) => "list",
                    Self::Set(_) => "set",
                    _ => "map",
                };
                out.push_str(keyword);
                out.push('(');
                elem.write_signature(out, indent);
                out.push(')');
            }
            Self::Tuple(elems) => {
                out.push_str("tuple([");
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    elem.write_signature(out, indent);
                }
                out.push_str("])");
            }
            Self::Object(fields) => write_object_signature(
                out,
                indent,
                fields.iter().map(|(name, ty)| (name.as_str(), ty)),
                |ty, out, indent| ty.write_signature(out, indent),
            ),
        }
    }
}

/// Writes `{ name = signature ... }` across lines, or `{}` when empty.
pub(crate) fn write_object_signature<'a, T: 'a>(
    out: &mut String,
    indent: usize,
    fields: impl IntoIterator<Item = (&'a str, &'a T)>,
    write_field: impl Fn(&T, &mut String, usize),
) {
    let mut fields = fields.into_iter().peekable();
    if fields.peek().is_none() {
        out.push_str("{}");
        return;
    }
    out.push_str("{\n");
    for (name, field) in fields {
        out.push_str(&"  ".repeat(indent + 1));
        out.push_str(name);
        out.push_str(" = ");
        write_field(field, out, indent + 1);
        out.push('\n');
    }
    out.push_str(&"  ".repeat(indent));
    out.push('}');
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_signature())
    }
}

/// A literal value of known type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    String(String),
    Number(f64),
    Bool(bool),
    List(Vec<Value>),
    Set(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Object(BTreeMap<String, Value>),
    Tuple(Vec<Value>),
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Self::String(s.into())
    }

    pub fn ty(&self) -> Type {
        let common = |values: &[Self]| values.first().map_or(Type::Dynamic, Self::ty);
        match self {
            Self::String(_) => Type::String,
            Self::Number(_) => Type::Number,
            Self::Bool(_) => Type::Bool,
            Self::List(values) => Type::list(common(values)),
            Self::Set(values) => Type::set(common(values)),
            Self::Map(values) => Type::map(values.values().next().map_or(Type::Dynamic, Self::ty)),
            Self::Object(fields) => Type::Object(
                fields
                    .iter()
                    .map(|(name, value)| (name.clone(), value.ty()))
                    .collect(),
            ),
            Self::Tuple(values) => Type::Tuple(values.iter().map(Self::ty).collect()),
        }
    }

    /// Source text of the value for primitive values.
    pub fn literal_text(&self) -> Option<String> {
        match self {
            Self::String(s) => Some(format!("{s:?}")),
            Self::Number(n) => Some(n.to_string()),
            Self::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}
