//! # Constraints
//!
//! A [`Constraint`] describes what an expression is allowed to contain.
//! Container variants nest further constraints for their elements.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::lang::{MarkupContent, ScopeId};
use crate::schema::AttributeSchema;
use crate::types::{write_object_signature, Type, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Constraint {
    LiteralType(LiteralType),
    LiteralValue(LiteralValue),
    Keyword(Keyword),
    Reference(Reference),
    AnyExpression(AnyExpression),
    FunctionCall(FunctionCall),
    List(List),
    Set(Set),
    Map(Map),
    Tuple(Tuple),
    Object(Object),
    OneOf(OneOf),
}

/// Any literal of the given type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralType {
    #[serde(rename = "type")]
    pub ty: Type,
}

/// One exact literal value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralValue {
    pub value: Value,
    #[serde(default)]
    pub description: MarkupContent,
    #[serde(default)]
    pub is_deprecated: bool,
}

/// A bare word such as `foobar`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    pub keyword: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: MarkupContent,
}

/// A traversal referring to a target of the given type and/or scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(default)]
    pub of_type: Option<Type>,
    #[serde(default)]
    pub of_scope_id: Option<ScopeId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: MarkupContent,
}

/// Any expression producing a value of the given type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnyExpression {
    pub of_type: Type,
}

/// A call of a function returning the given type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    #[serde(default)]
    pub of_type: Option<Type>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct List {
    #[serde(default)]
    pub elem: Option<Box<Constraint>>,
    #[serde(default)]
    pub description: MarkupContent,
    #[serde(default)]
    pub min_items: u64,
    #[serde(default)]
    pub max_items: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Set {
    #[serde(default)]
    pub elem: Option<Box<Constraint>>,
    #[serde(default)]
    pub description: MarkupContent,
    #[serde(default)]
    pub min_items: u64,
    #[serde(default)]
    pub max_items: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Map {
    #[serde(default)]
    pub elem: Option<Box<Constraint>>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: MarkupContent,
    #[serde(default)]
    pub allow_interpolated_keys: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tuple {
    pub elems: Vec<Constraint>,
    #[serde(default)]
    pub description: MarkupContent,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Object {
    pub attributes: IndexMap<String, AttributeSchema>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: MarkupContent,
    #[serde(default)]
    pub allow_interpolated_keys: bool,
}

/// Alternatives, tried in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OneOf {
    pub alternatives: Vec<Constraint>,
}

/// Text inserted when completing a value that does not exist yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionData {
    pub new_text: String,
    pub snippet: String,
    pub trigger_suggest: bool,
    /// Next free placeholder number after this snippet
    pub next_placeholder: u32,
}

impl CompletionData {
    fn trigger(next_placeholder: u32) -> Self {
        Self {
            trigger_suggest: true,
            next_placeholder,
            ..Self::default()
        }
    }

    fn placeholder(text: &str, placeholder: u32) -> Self {
        Self {
            new_text: text.to_string(),
            snippet: format!("${{{placeholder}:{text}}}"),
            trigger_suggest: false,
            next_placeholder: placeholder + 1,
        }
    }
}

fn indent(nesting: usize) -> String {
    "  ".repeat(nesting)
}

impl Constraint {
    pub fn literal_type(ty: Type) -> Self {
        Self::LiteralType(LiteralType { ty })
    }

    pub fn literal_value(value: Value) -> Self {
        Self::LiteralValue(LiteralValue {
            value,
            description: MarkupContent::default(),
            is_deprecated: false,
        })
    }

    pub fn keyword(keyword: impl Into<String>) -> Self {
        Self::Keyword(Keyword {
            keyword: keyword.into(),
            name: None,
            description: MarkupContent::default(),
        })
    }

    pub fn reference_of_type(ty: Type) -> Self {
        Self::Reference(Reference {
            of_type: Some(ty),
            ..Reference::default()
        })
    }

    pub fn reference_of_scope(scope: impl Into<ScopeId>) -> Self {
        Self::Reference(Reference {
            of_scope_id: Some(scope.into()),
            ..Reference::default()
        })
    }

    pub fn any_expression(of_type: Type) -> Self {
        Self::AnyExpression(AnyExpression { of_type })
    }

    pub fn list(elem: Self) -> Self {
        Self::List(List {
            elem: Some(Box::new(elem)),
            ..List::default()
        })
    }

    pub fn set(elem: Self) -> Self {
        Self::Set(Set {
            elem: Some(Box::new(elem)),
            ..Set::default()
        })
    }

    pub fn map(elem: Self) -> Self {
        Self::Map(Map {
            elem: Some(Box::new(elem)),
            ..Map::default()
        })
    }

    pub fn tuple(elems: Vec<Self>) -> Self {
        Self::Tuple(Tuple {
            elems,
            description: MarkupContent::default(),
        })
    }

    pub fn object<'a>(attributes: impl IntoIterator<Item = (&'a str, AttributeSchema)>) -> Self {
        Self::Object(Object {
            attributes: attributes
                .into_iter()
                .map(|(name, attr)| (name.to_string(), attr))
                .collect(),
            ..Object::default()
        })
    }

    pub const fn one_of(alternatives: Vec<Self>) -> Self {
        Self::OneOf(OneOf { alternatives })
    }

    /// Short name shown as candidate detail and in hovers.
    pub fn friendly_name(&self) -> String {
        match self {
            Self::LiteralType(c) => c.ty.friendly_name(),
            Self::LiteralValue(c) => c.value.ty().friendly_name(),
            Self::Keyword(c) => c.name.clone().unwrap_or_else(|| "keyword".to_string()),
            Self::Reference(c) => c.name.clone().unwrap_or_else(|| "reference".to_string()),
            Self::AnyExpression(c) => c.of_type.friendly_name(),
            Self::FunctionCall(_) => "function call".to_string(),
            Self::List(c) => container_name("list", c.elem.as_deref()),
            Self::Set(c) => container_name("set", c.elem.as_deref()),
            Self::Map(c) => c
                .name
                .clone()
                .unwrap_or_else(|| container_name("map", c.elem.as_deref())),
            Self::Tuple(_) => "tuple".to_string(),
            Self::Object(c) => c.name.clone().unwrap_or_else(|| "object".to_string()),
            Self::OneOf(OneOf { alternatives }) => {
                let mut names: Vec<String> = Vec::new();
                for name in alternatives.iter().map(Self::friendly_name) {
                    if !names.contains(&name) {
                        names.push(name);
                    }
                }
                names.join(" or ")
            }
        }
    }

    pub fn description(&self) -> MarkupContent {
        match self {
            Self::LiteralValue(c) => c.description.clone(),
            Self::Keyword(c) => c.description.clone(),
            Self::Reference(c) => c.description.clone(),
            Self::List(c) => c.description.clone(),
            Self::Set(c) => c.description.clone(),
            Self::Map(c) => c.description.clone(),
            Self::Tuple(c) => c.description.clone(),
            Self::Object(c) => c.description.clone(),
            Self::LiteralType(_) | Self::AnyExpression(_) | Self::FunctionCall(_) | Self::OneOf(_) => {
                MarkupContent::default()
            }
        }
    }

    /// The value type an expression satisfying this constraint evaluates to.
    pub fn infer_type(&self) -> Option<Type> {
        match self {
            Self::LiteralType(c) => Some(c.ty.clone()),
            Self::LiteralValue(c) => Some(c.value.ty()),
            Self::Keyword(_) => None,
            Self::Reference(c) => c.of_type.clone(),
            Self::AnyExpression(c) => Some(c.of_type.clone()),
            Self::FunctionCall(c) => c.of_type.clone(),
            Self::List(c) => Some(Type::list(elem_type(c.elem.as_deref()))),
            Self::Set(c) => Some(Type::set(elem_type(c.elem.as_deref()))),
            Self::Map(c) => Some(Type::map(elem_type(c.elem.as_deref()))),
            Self::Tuple(c) => Some(Type::Tuple(
                c.elems
                    .iter()
                    .map(|elem| elem.infer_type().unwrap_or(Type::Dynamic))
                    .collect(),
            )),
            Self::Object(c) => Some(Type::Object(
                c.attributes
                    .iter()
                    .map(|(name, attr)| {
                        (name.clone(), attr.constraint.infer_type().unwrap_or(Type::Dynamic))
                    })
                    .collect::<BTreeMap<_, _>>(),
            )),
            Self::OneOf(OneOf { alternatives }) => alternatives.iter().find_map(Self::infer_type),
        }
    }

    /// Multi-line signature used in hovers over container values.
    pub fn signature(&self) -> String {
        let mut out = String::new();
        self.write_signature(&mut out, 0);
        out
    }

    fn write_signature(&self, out: &mut String, indent: usize) {
        match self {
            Self::LiteralType(c) => c.ty.write_signature(out, indent),
            Self::AnyExpression(c) => c.of_type.write_signature(out, indent),
            Self::Object(c) => {
                let mut attrs: Vec<(&str, &AttributeSchema)> =
                    c.attributes.iter().map(|(name, attr)| (name.as_str(), attr)).collect();
                attrs.sort_by_key(|(name, _)| *name);
                write_object_signature(out, indent, attrs, |attr, out, indent| {
                    attr.constraint.write_signature(out, indent);
                });
            }
            _ => out.push_str(&self.friendly_name()),
        }
    }

    /// Text to insert for a value that does not exist yet.
    pub fn empty_completion_data(&self, next_placeholder: u32, nesting: usize) -> CompletionData {
        match self {
            Self::LiteralType(c) => type_completion_data(&c.ty, next_placeholder, nesting),
            Self::LiteralValue(c) => match c.value.literal_text() {
                Some(text) => CompletionData::placeholder(&text, next_placeholder),
                None => type_completion_data(&c.value.ty(), next_placeholder, nesting),
            },
            Self::Keyword(c) => CompletionData::placeholder(&c.keyword, next_placeholder),
            Self::Reference(_) | Self::AnyExpression(_) | Self::FunctionCall(_) | Self::OneOf(_) => {
                CompletionData::trigger(next_placeholder)
            }
            Self::List(List { elem, .. }) | Self::Set(Set { elem, .. }) => {
                let Some(elem) = elem else {
                    return CompletionData {
                        new_text: "[ ]".to_string(),
                        snippet: format!("[ ${{{next_placeholder}}} ]"),
                        trigger_suggest: false,
                        next_placeholder: next_placeholder + 1,
                    };
                };
                let data = elem.empty_completion_data(next_placeholder, nesting);
                if data.new_text.is_empty() || data.trigger_suggest {
                    return CompletionData {
                        new_text: "[ ]".to_string(),
                        snippet: format!("[ ${{{next_placeholder}}} ]"),
                        trigger_suggest: data.trigger_suggest,
                        next_placeholder: next_placeholder + 1,
                    };
                }
                CompletionData {
                    new_text: format!("[ {} ]", data.new_text),
                    snippet: format!("[ {} ]", data.snippet),
                    trigger_suggest: false,
                    next_placeholder: data.next_placeholder,
                }
            }
            Self::Map(c) => {
                let Some(elem) = &c.elem else {
                    return CompletionData {
                        new_text: "{}".to_string(),
                        snippet: format!("{{ ${{{next_placeholder}}} }}"),
                        trigger_suggest: false,
                        next_placeholder: next_placeholder + 1,
                    };
                };
                map_completion_data(next_placeholder, nesting, |placeholder| {
                    elem.empty_completion_data(placeholder, nesting + 1)
                })
            }
            Self::Tuple(c) => {
                let mut placeholder = next_placeholder;
                let mut texts = Vec::new();
                let mut snippets = Vec::new();
                for elem in &c.elems {
                    let data = elem.empty_completion_data(placeholder, nesting);
                    if data.new_text.is_empty() {
                        return CompletionData {
                            new_text: "[ ]".to_string(),
                            snippet: format!("[ ${{{next_placeholder}}} ]"),
                            trigger_suggest: data.trigger_suggest,
                            next_placeholder: next_placeholder + 1,
                        };
                    }
                    texts.push(data.new_text);
                    snippets.push(data.snippet);
                    placeholder = data.next_placeholder;
                }
                CompletionData {
                    new_text: format!("[ {} ]", texts.join(", ")),
                    snippet: format!("[ {} ]", snippets.join(", ")),
                    trigger_suggest: false,
                    next_placeholder: placeholder,
                }
            }
            Self::Object(c) => {
                let mut names: Vec<&String> = c.attributes.keys().collect();
                names.sort();
                object_completion_data(next_placeholder, nesting, names.into_iter().map(|name| {
                    let attr = &c.attributes[name.as_str()];
                    (name.as_str(), &attr.constraint)
                }))
            }
        }
    }
}

fn container_name(kind: &str, elem: Option<&Constraint>) -> String {
    match elem.map(Constraint::friendly_name) {
        Some(name) if !name.is_empty() => format!("{kind} of {name}"),
        _ => kind.to_string(),
    }
}

fn elem_type(elem: Option<&Constraint>) -> Type {
    elem.and_then(Constraint::infer_type).unwrap_or(Type::Dynamic)
}

fn type_completion_data(ty: &Type, next_placeholder: u32, nesting: usize) -> CompletionData {
    match ty {
        Type::String => CompletionData {
            new_text: "\"\"".to_string(),
            snippet: format!("\"${{{next_placeholder}:value}}\""),
            trigger_suggest: false,
            next_placeholder: next_placeholder + 1,
        },
        Type::Number => CompletionData::placeholder("0", next_placeholder),
        Type::Bool => CompletionData::placeholder("false", next_placeholder),
        Type::Dynamic => CompletionData::trigger(next_placeholder),
        Type::List(elem) | Type::Set(elem) => {
            let data = type_completion_data(elem, next_placeholder, nesting);
            if data.new_text.is_empty() {
                return CompletionData {
                    new_text: "[ ]".to_string(),
                    snippet: format!("[ ${{{next_placeholder}}} ]"),
                    trigger_suggest: data.trigger_suggest,
                    next_placeholder: next_placeholder + 1,
                };
            }
            CompletionData {
                new_text: format!("[ {} ]", data.new_text),
                snippet: format!("[ {} ]", data.snippet),
                trigger_suggest: false,
                next_placeholder: data.next_placeholder,
            }
        }
        Type::Map(elem) => map_completion_data(next_placeholder, nesting, |placeholder| {
            type_completion_data(elem, placeholder, nesting + 1)
        }),
        Type::Tuple(elems) => {
            let mut placeholder = next_placeholder;
            let mut texts = Vec::new();
            let mut snippets = Vec::new();
            for elem in elems {
                let data = type_completion_data(elem, placeholder, nesting);
                if data.new_text.is_empty() {
                    return CompletionData::trigger(next_placeholder);
                }
                texts.push(data.new_text);
                snippets.push(data.snippet);
                placeholder = data.next_placeholder;
            }
            CompletionData {
                new_text: format!("[ {} ]", texts.join(", ")),
                snippet: format!("[ {} ]", snippets.join(", ")),
                trigger_suggest: false,
                next_placeholder: placeholder,
            }
        }
        Type::Object(fields) => {
            let pad = indent(nesting + 1);
            let mut placeholder = next_placeholder;
            let mut text = String::from("{\n");
            let mut snippet = String::from("{\n");
            for (name, field) in fields {
                let data = type_completion_data(field, placeholder, nesting + 1);
                placeholder = data.next_placeholder;
                text.push_str(&format!("{pad}{name} = {}\n", data.new_text));
                snippet.push_str(&format!("{pad}{name} = {}\n", data.snippet));
            }
            text.push_str(&format!("{}}}", indent(nesting)));
            snippet.push_str(&format!("{}}}", indent(nesting)));
            CompletionData {
                new_text: text,
                snippet,
                trigger_suggest: false,
                next_placeholder: placeholder,
            }
        }
    }
}

fn map_completion_data(
    next_placeholder: u32,
    nesting: usize,
    elem: impl FnOnce(u32) -> CompletionData,
) -> CompletionData {
    let pad = indent(nesting + 1);
    let data = elem(next_placeholder + 1);
    let (value_text, value_snippet, next) = if data.new_text.is_empty() {
        (String::new(), format!("${{{}}}", next_placeholder + 1), next_placeholder + 2)
    } else {
        (data.new_text, data.snippet, data.next_placeholder)
    };
    CompletionData {
        new_text: format!("{{\n{pad}\"key\" = {value_text}\n{}}}", indent(nesting)),
        snippet: format!(
            "{{\n{pad}\"${{{next_placeholder}:key}}\" = {value_snippet}\n{}}}",
            indent(nesting)
        ),
        trigger_suggest: false,
        next_placeholder: next,
    }
}

fn object_completion_data<'a>(
    next_placeholder: u32,
    nesting: usize,
    attributes: impl IntoIterator<Item = (&'a str, &'a Constraint)>,
) -> CompletionData {
    let pad = indent(nesting + 1);
    let mut placeholder = next_placeholder;
    let mut text = String::from("{\n");
    let mut snippet = String::from("{\n");
    for (name, constraint) in attributes {
        let data = constraint.empty_completion_data(placeholder, nesting + 1);
        if data.new_text.is_empty() {
            text.push_str(&format!("{pad}{name} = \n"));
            snippet.push_str(&format!("{pad}{name} = ${{{placeholder}}}\n"));
            placeholder += 1;
        } else {
            text.push_str(&format!("{pad}{name} = {}\n", data.new_text));
            snippet.push_str(&format!("{pad}{name} = {}\n", data.snippet));
            placeholder = data.next_placeholder;
        }
    }
    text.push_str(&format!("{}}}", indent(nesting)));
    snippet.push_str(&format!("{}}}", indent(nesting)));
    CompletionData {
        new_text: text,
        snippet,
        trigger_suggest: false,
        next_placeholder: placeholder,
    }
}
