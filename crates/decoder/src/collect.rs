//! # Reference Collection
//!
//! Full-document pass producing the [`Targets`] declared by address schemas
//! and extensions, and the [`Origins`] found in attribute values.

use hclang_reference::{Origin, Target, Targets};
use hclang_schema::{
    AddrStep, Address, AddressStep, AttributeSchema, BlockSchema, BodyExtensions, BodySchema,
    IndexKey, MarkupContent, Type, Value,
};
use hclang_syntax::{Attribute, Block, Body, BodyItem, Expression, Range, Span, Spanned};
use indexmap::IndexMap;

use crate::body_schema::{block_body_schema, block_schema, DYNAMIC_BLOCK};
use crate::context::CancellationToken;
use crate::error::DecoderError;
use crate::expr::{static_value, ExprContext};

/// Address built from `steps`, or `None` when a step cannot be resolved.
fn resolve_address(steps: &[AddrStep], block: Option<&Block>, body: &Body, attr_name: Option<&str>) -> Option<Address> {
    let mut addr = Address::default();
    for step in steps {
        let name = match step {
            AddrStep::Static(name) => name.clone(),
            AddrStep::LabelValue(index) => block?.labels.get(*index)?.value.clone(),
            AddrStep::AttrName => attr_name?.to_string(),
            AddrStep::AttrValue(attr) => match static_value(body.attribute(attr)?.expr.value())? {
                Value::String(s) => s,
                _ => return None,
            },
        };
        addr.push(if addr.is_empty() {
            AddressStep::Root(name)
        } else {
            AddressStep::Attr(name)
        });
    }
    (!addr.is_empty()).then_some(addr)
}

fn local_target(root: &str, attr: &str, ty: Type, range: Range, description: &str) -> Target {
    Target {
        local_addr: Some(Address::from_names(root, [attr])),
        targetable_from_range: Some(range),
        ty: Some(ty),
        description: MarkupContent::plain_text(description),
        ..Target::default()
    }
}

/// Element type of the collection `for_each` is declared to accept.
fn each_value_type(body_schema: &BodySchema) -> Type {
    let declared = body_schema
        .attributes
        .get("for_each")
        .and_then(|attr| attr.constraint.infer_type());
    match declared {
        Some(Type::Map(elem) | Type::Set(elem) | Type::List(elem)) => *elem,
        _ => Type::Dynamic,
    }
}

/// Span of the block type and labels.
fn block_def_span(block: &Block) -> Span {
    let end = block
        .labels
        .last()
        .map_or(block.block_type.span().end, |label| label.span.end);
    Span::from(block.block_type.span().start..end)
}

/// Span from the opening to the closing brace of `block`.
fn inner_span(block: &Block) -> Span {
    Span::from(block.open_brace.start..block.close_brace.end)
}

pub(crate) struct Collector<'a> {
    cancel: &'a CancellationToken,
    targets: Targets,
    origins: Vec<Origin>,
}

impl<'a> Collector<'a> {
    pub fn new(cancel: &'a CancellationToken) -> Self {
        Self {
            cancel,
            targets: Targets::default(),
            origins: Vec::new(),
        }
    }

    pub fn into_targets(self) -> Targets {
        self.targets
    }

    pub fn into_origins(self) -> Vec<Origin> {
        self.origins
    }

    pub fn collect_targets(
        &mut self,
        ctx: ExprContext<'_>,
        body: &Body,
        schema: &BodySchema,
        block: Option<&Block>,
    ) -> Result<(), DecoderError> {
        for item in &body.items {
            match item {
                BodyItem::Attribute(attr) => {
                    if let Some(attr_schema) = schema.attribute(attr.name.value()) {
                        self.targets.extend(attribute_target(ctx, attr, attr_schema, block, body));
                    }
                }
                BodyItem::Block(child) => {
                    self.cancel.check()?;
                    let Some(child_schema) = block_schema(schema, child) else {
                        continue;
                    };
                    let body_schema = block_body_schema(child, &child_schema, schema.extensions);
                    if let Some(target) = block_target(ctx, child, &child_schema, &body_schema) {
                        self.targets.push(target);
                    }
                    self.implicit_targets(ctx, child, &body_schema, schema);
                    self.collect_targets(ctx, &child.body, &body_schema, Some(child))?;
                }
            }
        }
        Ok(())
    }

    /// Targets the extensions declare inside the body of `block`.
    fn implicit_targets(&mut self, ctx: ExprContext<'_>, block: &Block, body_schema: &BodySchema, parent: &BodySchema) {
        let range = ctx.range(inner_span(block));
        let extensions = body_schema.extensions;

        if extensions.contains(BodyExtensions::COUNT) && block.body.attribute("count").is_some() {
            self.targets.push(local_target(
                "count",
                "index",
                Type::Number,
                range.clone(),
                "The distinct index number (starting with 0) corresponding to the instance",
            ));
        }
        if extensions.contains(BodyExtensions::FOR_EACH) && block.body.attribute("for_each").is_some() {
            self.targets.push(local_target(
                "each",
                "key",
                Type::String,
                range.clone(),
                "The map key (or set member) corresponding to this instance",
            ));
            self.targets.push(local_target(
                "each",
                "value",
                each_value_type(body_schema),
                range.clone(),
                "The map value corresponding to this instance. (If a set was provided, this is the same as `each.key`.)",
            ));
        }
        if extensions.contains(BodyExtensions::SELF_REFS) {
            for attr in block.body.attributes() {
                let Some(attr_schema) = body_schema.attribute(attr.name.value()) else {
                    continue;
                };
                self.targets.push(Target {
                    local_addr: Some(Address::from_names("self", [attr.name.value().as_str()])),
                    targetable_from_range: Some(range.clone()),
                    ty: Some(attr_schema.constraint.infer_type().unwrap_or(Type::Dynamic)),
                    range: Some(ctx.range(attr.span)),
                    def_range: Some(ctx.range(attr.name.span())),
                    description: attr_schema.description.clone(),
                    ..Target::default()
                });
            }
        }
        if block.block_type.value() == DYNAMIC_BLOCK && parent.extensions.contains(BodyExtensions::DYNAMIC_BLOCKS) {
            if let Some(iterator) = dynamic_iterator(block) {
                for step in ["key", "value"] {
                    self.targets
                        .push(local_target(&iterator, step, Type::Dynamic, range.clone(), ""));
                }
            }
        }
    }

    pub fn collect_origins(
        &mut self,
        ctx: ExprContext<'_>,
        body: &Body,
        schema: &BodySchema,
    ) -> Result<(), DecoderError> {
        for item in &body.items {
            match item {
                BodyItem::Attribute(attr) => {
                    if let Some(attr_schema) = schema.attribute(attr.name.value()) {
                        self.origins
                            .extend(ctx.reference_origins(&attr.expr, &attr_schema.constraint));
                    }
                }
                BodyItem::Block(block) => {
                    self.cancel.check()?;
                    let Some(block_schema) = block_schema(schema, block) else {
                        continue;
                    };
                    let body_schema = block_body_schema(block, &block_schema, schema.extensions);
                    let inner = ctx.with_outermost_body(inner_span(block));
                    self.collect_origins(inner, &block.body, &body_schema)?;
                }
            }
        }
        Ok(())
    }
}

/// Name of the iterator variable of a `dynamic` block.
fn dynamic_iterator(block: &Block) -> Option<String> {
    if let Some(attr) = block.body.attribute("iterator") {
        return match attr.expr.value() {
            Expression::Traversal(traversal) if traversal.is_bare() => Some(traversal.root.value().clone()),
            expr => match static_value(expr)? {
                Value::String(s) => Some(s),
                _ => None,
            },
        };
    }
    block.labels.first().map(|label| label.value.clone())
}

fn attribute_target(
    ctx: ExprContext<'_>,
    attr: &Attribute,
    schema: &AttributeSchema,
    block: Option<&Block>,
    body: &Body,
) -> Option<Target> {
    let addr_schema = schema.address.as_ref()?;
    if !addr_schema.as_reference && !addr_schema.as_expr_type {
        return None;
    }
    let addr = resolve_address(&addr_schema.steps, block, body, Some(attr.name.value()))?;
    let ty = if addr_schema.as_expr_type {
        schema.constraint.infer_type()
    } else {
        None
    };
    let nested_targets = match &ty {
        Some(ty) => nested_from_expr(ctx, &addr, ty, &attr.expr),
        None => Targets::default(),
    };
    Some(Target {
        addr: Some(addr),
        scope_id: addr_schema
            .as_reference
            .then(|| addr_schema.scope_id.clone())
            .flatten(),
        ty,
        range: Some(ctx.range(attr.span)),
        def_range: Some(ctx.range(attr.name.span())),
        description: schema.description.clone(),
        ..Target::default()
    }
    .with_nested(nested_targets))
}

/// Targets for the items of an object or map literal typed as `ty`.
fn nested_from_expr(ctx: ExprContext<'_>, addr: &Address, ty: &Type, expr: &Spanned<Expression>) -> Targets {
    let Expression::Object(object) = expr.value() else {
        return Targets::default();
    };
    object
        .items
        .iter()
        .filter_map(|item| {
            let key = item.key.value().as_name()?;
            let (step, item_ty) = match ty {
                Type::Object(fields) => (AddressStep::Attr(key.clone()), fields.get(&key)?.clone()),
                Type::Map(elem) => (AddressStep::Index(IndexKey::String(key)), (**elem).clone()),
                _ => return None,
            };
            let item_addr = addr.with_step(step);
            let nested = nested_from_expr(ctx, &item_addr, &item_ty, &item.value);
            Some(
                Target {
                    addr: Some(item_addr),
                    ty: Some(item_ty),
                    range: Some(ctx.range(item.span)),
                    def_range: Some(ctx.range(item.key.span())),
                    ..Target::default()
                }
                .with_nested(nested),
            )
        })
        .collect()
}

fn block_target(ctx: ExprContext<'_>, block: &Block, schema: &BlockSchema, body_schema: &BodySchema) -> Option<Target> {
    let addr_schema = schema.address.as_ref()?;
    let addr = resolve_address(&addr_schema.steps, Some(block), &block.body, None)?;

    let data_schema = if addr_schema.dependent_body_as_data {
        Some(body_schema)
    } else {
        schema.body.as_ref()
    };
    let mut ty = None;
    let mut nested = Targets::default();
    if addr_schema.body_as_data || addr_schema.infer_body {
        if let Some(data_schema) = data_schema {
            let mut fields: IndexMap<String, Type> = IndexMap::new();
            for (name, attr) in &data_schema.attributes {
                fields.insert(name.clone(), attr.constraint.infer_type().unwrap_or(Type::Dynamic));
            }
            for attr in block.body.attributes() {
                let Some(field_ty) = fields.get(attr.name.value()) else {
                    continue;
                };
                let attr_addr = addr.with_step(AddressStep::Attr(attr.name.value().clone()));
                let item_nested = nested_from_expr(ctx, &attr_addr, field_ty, &attr.expr);
                nested.push(
                    Target {
                        addr: Some(attr_addr),
                        ty: Some(field_ty.clone()),
                        range: Some(ctx.range(attr.span)),
                        def_range: Some(ctx.range(attr.name.span())),
                        description: data_schema
                            .attributes
                            .get(attr.name.value())
                            .map(|a| a.description.clone())
                            .unwrap_or_default(),
                        ..Target::default()
                    }
                    .with_nested(item_nested),
                );
            }
            if addr_schema.body_as_data {
                ty = Some(Type::Object(fields.into_iter().collect()));
            }
        }
    }
    if !addr_schema.as_reference && ty.is_none() && nested.is_empty() {
        return None;
    }
    Some(
        Target {
            addr: Some(addr),
            scope_id: addr_schema
                .as_reference
                .then(|| addr_schema.scope_id.clone())
                .flatten(),
            ty,
            range: Some(ctx.range(block.span)),
            def_range: Some(ctx.range(block_def_span(block))),
            description: schema.description.clone(),
            ..Target::default()
        }
        .with_nested(nested),
    )
}
