//! # Document AST
//!
//! Plain data types produced by the parser. Every node that the analysis
//! core needs to position against carries a byte [`Span`]; nothing here
//! knows about schemas.

use std::fmt;

use crate::pos::Span;

/// A value paired with the span it was parsed from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Spanned<T>(T, Span);

impl<T> Spanned<T> {
    /// Create a new spanned value
    pub const fn new(value: T, span: Span) -> Self {
        Self(value, span)
    }

    /// Get the inner value
    pub const fn value(&self) -> &T {
        &self.0
    }

    /// Get the span
    pub const fn span(&self) -> Span {
        self.1
    }

    /// Destructure into value and span
    pub fn into_parts(self) -> (T, Span) {
        (self.0, self.1)
    }
}

/// An ordered list of attributes and blocks.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Body {
    pub items: Vec<BodyItem>,
    pub span: Span,
}

impl Body {
    pub const fn new(items: Vec<BodyItem>, span: Span) -> Self {
        Self { items, span }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.items.iter().filter_map(|item| match item {
            BodyItem::Attribute(attr) => Some(attr),
            BodyItem::Block(_) => None,
        })
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.items.iter().filter_map(|item| match item {
            BodyItem::Block(block) => Some(block),
            BodyItem::Attribute(_) => None,
        })
    }

    /// First attribute with the given name.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes().find(|attr| attr.name.value() == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BodyItem {
    Attribute(Attribute),
    Block(Block),
}

impl BodyItem {
    pub const fn span(&self) -> Span {
        match self {
            Self::Attribute(attr) => attr.span,
            Self::Block(block) => block.span,
        }
    }
}

/// `name = expression`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Attribute {
    pub name: Spanned<String>,
    /// Span of the `=` sign
    pub equals: Span,
    pub expr: Spanned<Expression>,
    pub span: Span,
}

/// `type "label" label { body }`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Block {
    pub block_type: Spanned<String>,
    pub labels: Vec<Label>,
    pub open_brace: Span,
    pub close_brace: Span,
    pub body: Body,
    pub span: Span,
}

impl Block {
    pub fn label_values(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(|label| label.value.as_str())
    }
}

/// A block label. The span includes quotes when the label was quoted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Label {
    pub value: String,
    pub span: Span,
    pub quoted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `-x`
    Negate,
    /// `!x`
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Or => "||",
            Self::And => "&&",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::LtEq => "<=",
            Self::GtEq => ">=",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    /// Number as written in the source
    Number(String),
    Bool(bool),
    Null,
}

impl Literal {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.parse().ok(),
            _ => None,
        }
    }
}

/// A quoted string or heredoc.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Template {
    pub parts: Vec<TemplatePart>,
    pub heredoc: bool,
}

impl Template {
    /// The string value, if the template has no interpolations.
    pub fn as_literal(&self) -> Option<String> {
        let mut value = String::new();
        for part in &self.parts {
            match part {
                TemplatePart::Literal(lit) => value.push_str(lit.value()),
                TemplatePart::Interpolation(_) => return None,
            }
        }
        Some(value)
    }

    pub fn interpolations(&self) -> impl Iterator<Item = &Spanned<Expression>> {
        self.parts.iter().filter_map(|part| match part {
            TemplatePart::Interpolation(expr) => Some(expr),
            TemplatePart::Literal(_) => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TemplatePart {
    Literal(Spanned<String>),
    /// `${ expr }`, spanned by the inner expression
    Interpolation(Spanned<Expression>),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TraversalKey {
    String(String),
    Number(u64),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TraversalStep {
    /// `.name`
    Attr(Spanned<String>),
    /// `[0]` or `["key"]`, spanned including brackets
    Index(Spanned<TraversalKey>),
}

impl TraversalStep {
    pub const fn span(&self) -> Span {
        match self {
            Self::Attr(name) => name.span(),
            Self::Index(key) => key.span(),
        }
    }
}

/// A traversal rooted in a variable name, e.g. `var.foo[0].bar`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Traversal {
    pub root: Spanned<String>,
    pub steps: Vec<TraversalStep>,
}

impl Traversal {
    /// Whether the traversal is a bare identifier.
    pub fn is_bare(&self) -> bool {
        self.steps.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionCall {
    pub name: Spanned<String>,
    pub args: Vec<Spanned<Expression>>,
    pub open_paren: Span,
    pub close_paren: Span,
    /// Final argument is followed by `...`
    pub expand_final: bool,
}

/// `[ a, b ]`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TupleCons {
    pub exprs: Vec<Spanned<Expression>>,
    pub open: Span,
    pub close: Span,
}

/// `{ key = value }`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectCons {
    pub items: Vec<ObjectItem>,
    pub open: Span,
    pub close: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectItem {
    pub key: Spanned<ObjectKey>,
    pub value: Spanned<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey {
    pub expr: Expression,
    /// Key was wrapped in parentheses and must be evaluated
    pub force_non_literal: bool,
}

impl ObjectKey {
    /// The key as a static name: a bare identifier or a quoted string
    /// without interpolation.
    pub fn as_name(&self) -> Option<String> {
        if self.force_non_literal {
            return None;
        }
        match &self.expr {
            Expression::Traversal(traversal) if traversal.is_bare() => {
                Some(traversal.root.value().clone())
            }
            Expression::Template(template) if !template.heredoc => template.as_literal(),
            _ => None,
        }
    }

    pub const fn is_bare(&self) -> bool {
        matches!(&self.expr, Expression::Traversal(_)) && !self.force_non_literal
    }
}

/// `[for k, v in coll : v if cond]` or `{for k, v in coll : k => v}`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ForExpr {
    pub key_var: Option<Spanned<String>>,
    pub value_var: Spanned<String>,
    pub collection: Spanned<Expression>,
    pub key_expr: Option<Spanned<Expression>>,
    pub value_expr: Spanned<Expression>,
    pub condition: Option<Spanned<Expression>>,
    pub grouped: bool,
    pub open: Span,
    pub close: Span,
}

impl ForExpr {
    /// Whether the expression produces an object.
    pub const fn is_object(&self) -> bool {
        self.key_expr.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expression {
    Literal(Literal),
    Template(Template),
    Traversal(Traversal),
    /// Attribute or index steps applied to an arbitrary expression
    RelativeTraversal {
        source: Box<Spanned<Expression>>,
        steps: Vec<TraversalStep>,
    },
    FunctionCall(FunctionCall),
    Tuple(TupleCons),
    Object(ObjectCons),
    Index {
        collection: Box<Spanned<Expression>>,
        key: Box<Spanned<Expression>>,
        open_bracket: Span,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Spanned<Expression>>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Spanned<Expression>>,
        rhs: Box<Spanned<Expression>>,
    },
    Conditional {
        condition: Box<Spanned<Expression>>,
        true_result: Box<Spanned<Expression>>,
        false_result: Box<Spanned<Expression>>,
    },
    For(Box<ForExpr>),
    Parenthesized(Box<Spanned<Expression>>),
    /// Missing expression, either left out in the source or synthesized at
    /// a cursor position.
    Empty,
}

impl Expression {
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}
