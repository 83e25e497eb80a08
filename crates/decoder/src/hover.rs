//! # Body Hover

use hclang_schema::{BodySchema, HoverData};
use hclang_syntax::{Body, BodyItem, Span};

use crate::body_schema::{block_body_schema, block_schema, dependent_body};
use crate::context::CancellationToken;
use crate::error::DecoderError;
use crate::expr::{contains, with_description, ExprContext};

pub(crate) fn body_hover(
    ctx: ExprContext<'_>,
    body: &Body,
    schema: &BodySchema,
    pos: usize,
    cancel: &CancellationToken,
) -> Result<Option<HoverData>, DecoderError> {
    for item in &body.items {
        if !contains(item.span(), pos) {
            continue;
        }
        match item {
            BodyItem::Attribute(attr) => {
                let Some(attr_schema) = schema.attribute(attr.name.value()) else {
                    return Ok(None);
                };
                if contains(attr.name.span(), pos) {
                    let content = with_description(
                        format!("**{}** _{}_", attr.name.value(), attr_schema.detail()),
                        &attr_schema.description,
                    );
                    return Ok(Some(ctx.hover(content, attr.span)));
                }
                if contains(attr.expr.span(), pos) {
                    return Ok(ctx.hover_at_pos(&attr.expr, &attr_schema.constraint, pos));
                }
                return Ok(None);
            }
            BodyItem::Block(block) => {
                cancel.check()?;
                let Some(block_schema) = block_schema(schema, block) else {
                    return Ok(None);
                };
                if contains(block.block_type.span(), pos) {
                    let content = with_description(
                        format!("**{}** _Block_", block.block_type.value()),
                        &block_schema.description,
                    );
                    return Ok(Some(ctx.hover(content, block.block_type.span())));
                }
                for (label, label_schema) in block.labels.iter().zip(&block_schema.labels) {
                    if !contains(label.span, pos) {
                        continue;
                    }
                    if label_schema.is_dep_key {
                        let description = dependent_body(block, &block_schema)
                            .map(|(_, body)| body.description.clone())
                            .unwrap_or_default();
                        let content = with_description(format!("`{}`", label.value), &description);
                        return Ok(Some(ctx.hover(content, label.span)));
                    }
                    let content = with_description(format!("\"{}\"", label.value), &label_schema.description);
                    return Ok(Some(ctx.hover(content, label.span)));
                }
                if block.open_brace.end <= pos && pos < block.close_brace.start {
                    let body_schema = block_body_schema(block, &block_schema, schema.extensions);
                    let inner = ctx.with_outermost_body(Span::from(block.open_brace.start..block.close_brace.end));
                    return body_hover(inner, &block.body, &body_schema, pos, cancel);
                }
                return Ok(None);
            }
        }
    }
    Ok(None)
}
