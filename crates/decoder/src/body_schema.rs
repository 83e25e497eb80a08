//! # Body Schema Resolution
//!
//! Narrows the declared schema of a block to the one that applies to a
//! concrete block instance: the matching dependent body is merged in and
//! the enabled extensions add their implicit attributes and blocks.

use std::borrow::Cow;

use hclang_schema::{
    AttributeSchema, BlockSchema, BodyExtensions, BodySchema, Constraint, DependencyKeys,
    ExpressionValue, LabelSchema, MarkupContent, SchemaKey, Type,
};
use hclang_syntax::{Block, Body, Expression};
use rustc_hash::FxHashMap;

use crate::expr::{static_value, traversal_address};

pub(crate) const DYNAMIC_BLOCK: &str = "dynamic";
pub(crate) const CONTENT_BLOCK: &str = "content";

/// Values of the attributes of `body` usable as dependency keys.
fn attribute_values(body: &Body) -> FxHashMap<&str, ExpressionValue> {
    body.attributes()
        .filter_map(|attr| {
            let value = match attr.expr.value() {
                Expression::Traversal(traversal) => ExpressionValue::Address(traversal_address(traversal)),
                expr => ExpressionValue::Static(static_value(expr)?),
            };
            Some((attr.name.value().as_str(), value))
        })
        .collect()
}

/// The dependent body matching the labels and attributes of `block`, with
/// its key. The most specific key wins.
pub(crate) fn dependent_body<'s>(block: &Block, schema: &'s BlockSchema) -> Option<(&'s SchemaKey, &'s BodySchema)> {
    if schema.dependent_body.is_empty() {
        return None;
    }
    let labels: Vec<&str> = block.label_values().collect();
    let attributes = attribute_values(&block.body);

    let mut best: Option<(usize, &SchemaKey, &BodySchema)> = None;
    for (key, body) in &schema.dependent_body {
        let keys: DependencyKeys = match key.dependency_keys() {
            Ok(keys) => keys,
            Err(err) => {
                tracing::debug!(%key, %err, "skipping malformed schema key");
                continue;
            }
        };
        let Some(count) = keys.match_count(&labels, |name| attributes.get(name)) else {
            continue;
        };
        if best.as_ref().is_none_or(|(best_count, ..)| count > *best_count) {
            best = Some((count, key, body));
        }
    }
    let (_, key, body) = best?;
    tracing::trace!(block_type = %block.block_type.value(), %key, "selected dependent body");
    Some((key, body))
}

/// Schema of the body of `block`, given the extensions inherited from the
/// enclosing body.
pub(crate) fn block_body_schema(block: &Block, schema: &BlockSchema, inherited: BodyExtensions) -> BodySchema {
    let mut body = schema.body.clone().unwrap_or_default();
    if let Some((_, dependent)) = dependent_body(block, schema) {
        body = body.merge(dependent);
    }
    // `dynamic` blocks only allow their `content` block to nest further
    if block.block_type.value() != DYNAMIC_BLOCK {
        body.extensions |= inherited & BodyExtensions::DYNAMIC_BLOCKS;
    }
    apply_extensions(body)
}

/// Adds the attributes and blocks implied by the enabled extensions.
/// Declared attributes and blocks of the same name are kept as they are.
pub(crate) fn apply_extensions(mut body: BodySchema) -> BodySchema {
    if body.extensions.contains(BodyExtensions::COUNT) {
        body.attributes
            .entry("count".to_string())
            .or_insert_with(count_attribute);
    }
    if body.extensions.contains(BodyExtensions::FOR_EACH) {
        body.attributes
            .entry("for_each".to_string())
            .or_insert_with(for_each_attribute);
    }
    if body.extensions.contains(BodyExtensions::DYNAMIC_BLOCKS) && !body.blocks.is_empty() {
        body.blocks
            .entry(DYNAMIC_BLOCK.to_string())
            .or_insert_with(|| dynamic_block_schema(None));
    }
    body
}

fn count_attribute() -> AttributeSchema {
    AttributeSchema::new(Constraint::any_expression(Type::Number))
        .optional()
        .with_description(MarkupContent::markdown(
            "Total number of instances of this block.\n\n**Note**: A given block cannot use both `count` and `for_each`.",
        ))
}

fn for_each_attribute() -> AttributeSchema {
    AttributeSchema::new(Constraint::one_of(vec![
        Constraint::any_expression(Type::map(Type::Dynamic)),
        Constraint::any_expression(Type::set(Type::String)),
    ]))
    .optional()
    .with_description(MarkupContent::markdown(
        "A meta-argument that accepts a map or a set of strings, and creates an instance for each item in that map or set.\n\n**Note**: A given block cannot use both `count` and `for_each`.",
    ))
}

/// Schema of a `dynamic` block. With a known target block it also declares
/// the `content` block and its label.
fn dynamic_block_schema(target: Option<&BlockSchema>) -> BlockSchema {
    let mut body = BodySchema::new()
        .with_attribute(
            "for_each",
            AttributeSchema::new(Constraint::one_of(vec![
                Constraint::any_expression(Type::map(Type::Dynamic)),
                Constraint::any_expression(Type::list(Type::Dynamic)),
                Constraint::any_expression(Type::set(Type::Dynamic)),
            ]))
            .required()
            .with_description(MarkupContent::markdown(
                "A meta-argument that accepts a list, set or map of values to repeat the block for.",
            )),
        )
        .with_attribute(
            "iterator",
            AttributeSchema::new(Constraint::literal_type(Type::String))
                .optional()
                .with_description(MarkupContent::markdown(
                    "The name of a temporary variable that represents the current element. Defaults to the label of the dynamic block.",
                )),
        )
        .with_attribute(
            "labels",
            AttributeSchema::new(Constraint::list(Constraint::any_expression(Type::String)))
                .optional()
                .with_description(MarkupContent::markdown("A list of strings that specifies the block labels.")),
        );

    let mut schema = BlockSchema::default().with_description(MarkupContent::markdown(
        "A dynamic block to produce blocks dynamically by iterating over a given complex value",
    ));
    if let Some(target) = target {
        let mut content = target.clone();
        content.labels.clear();
        content.address = None;
        content.semantic_token_modifiers.clear();
        content.min_items = 1;
        content.max_items = 1;
        let mut content_body = content.body.take().unwrap_or_default();
        content_body.extensions |= BodyExtensions::DYNAMIC_BLOCKS;
        content.body = Some(content_body);
        body = body.with_block(CONTENT_BLOCK, content);
        schema.labels = vec![LabelSchema::new("name").completable()];
    }
    schema.body = Some(body);
    schema
}

/// Schema of `block` declared in a body resolved as `parent`. A `dynamic`
/// block is specialised for the block type named by its label.
pub(crate) fn block_schema<'s>(parent: &'s BodySchema, block: &Block) -> Option<Cow<'s, BlockSchema>> {
    let block_type = block.block_type.value();
    let declared = parent.block(block_type);
    if block_type == DYNAMIC_BLOCK && parent.extensions.contains(BodyExtensions::DYNAMIC_BLOCKS) {
        let generic = declared.is_none_or(|schema| *schema == dynamic_block_schema(None));
        if generic {
            let target = block
                .labels
                .first()
                .filter(|label| label.value != DYNAMIC_BLOCK)
                .and_then(|label| parent.block(&label.value));
            return Some(Cow::Owned(dynamic_block_schema(target)));
        }
    }
    if declared.is_none() {
        tracing::trace!(%block_type, "no schema for block");
    }
    declared.map(Cow::Borrowed)
}

/// Block types a `dynamic` block in `parent` may generate.
pub(crate) fn dynamic_targets(parent: &BodySchema) -> Vec<&str> {
    if !parent.extensions.contains(BodyExtensions::DYNAMIC_BLOCKS) {
        return Vec::new();
    }
    let mut names: Vec<&str> = parent
        .blocks
        .keys()
        .map(String::as_str)
        .filter(|name| *name != DYNAMIC_BLOCK)
        .collect();
    names.sort_unstable();
    names
}
