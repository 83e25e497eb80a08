//! # Body Completion
//!
//! Finds what the cursor is in (attribute name or value, block type, label,
//! nested body or empty space) and collects the candidates for it.

use hclang_schema::{
    AttributeSchema, BlockSchema, BodySchema, Candidate, CandidateKind, MarkupContent,
};
use hclang_syntax::{Attribute, Block, Body, BodyItem, Span};

use crate::body_schema::{block_body_schema, block_schema, dynamic_targets, DYNAMIC_BLOCK};
use crate::config::DecoderConfig;
use crate::context::CancellationToken;
use crate::error::DecoderError;
use crate::expr::{candidate, contains, contains_or_end, empty_expr_at, ExprContext};

pub(crate) struct CompletionWalker<'a> {
    pub config: &'a DecoderConfig,
    pub cancel: &'a CancellationToken,
}

/// Whether `pos` is where the value of `attr` is or would be typed.
fn in_value(ctx: ExprContext<'_>, attr: &Attribute, pos: usize) -> bool {
    if pos < attr.equals.end {
        return false;
    }
    if attr.expr.value().is_empty() {
        return !ctx.text(Span::from(attr.equals.end..pos)).contains('\n');
    }
    contains_or_end(attr.expr.span(), pos)
}

const fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

impl CompletionWalker<'_> {
    pub fn body(
        &self,
        ctx: ExprContext<'_>,
        body: &Body,
        schema: &BodySchema,
        pos: usize,
    ) -> Result<Vec<Candidate>, DecoderError> {
        for item in &body.items {
            match item {
                BodyItem::Attribute(attr) => {
                    if contains_or_end(attr.name.span(), pos) {
                        let span = attr.name.span();
                        let prefix = ctx.text(Span::from(span.start..pos));
                        return Ok(self.body_candidates(ctx, body, schema, prefix, span));
                    }
                    if in_value(ctx, attr, pos) {
                        let Some(attr_schema) = schema.attribute(attr.name.value()) else {
                            tracing::trace!(attribute = %attr.name.value(), "no schema for attribute");
                            return Ok(Vec::new());
                        };
                        let candidates = if attr.expr.value().is_empty() {
                            ctx.completion_at_pos(&empty_expr_at(pos), &attr_schema.constraint, pos)
                        } else {
                            ctx.completion_at_pos(&attr.expr, &attr_schema.constraint, pos)
                        };
                        return Ok(candidates);
                    }
                    if contains(attr.span, pos) {
                        return Ok(Vec::new());
                    }
                }
                BodyItem::Block(block) => {
                    if !contains_or_end(block.span, pos) {
                        continue;
                    }
                    self.cancel.check()?;
                    return self.block(ctx, body, schema, block, pos);
                }
            }
        }

        let bytes = ctx.file.bytes();
        let mut start = pos.min(bytes.len());
        while start > body.span.start && bytes.get(start - 1).copied().is_some_and(is_ident_byte) {
            start -= 1;
        }
        let span = Span::from(start..pos);
        Ok(self.body_candidates(ctx, body, schema, ctx.text(span), span))
    }

    fn block(
        &self,
        ctx: ExprContext<'_>,
        parent_body: &Body,
        parent: &BodySchema,
        block: &Block,
        pos: usize,
    ) -> Result<Vec<Candidate>, DecoderError> {
        let type_span = block.block_type.span();
        if contains_or_end(type_span, pos) {
            let prefix = ctx.text(Span::from(type_span.start..pos));
            return Ok(self.body_candidates(ctx, parent_body, parent, prefix, type_span));
        }
        let Some(schema) = block_schema(parent, block) else {
            return Ok(Vec::new());
        };
        for (index, label) in block.labels.iter().enumerate() {
            if contains_or_end(label.span, pos) {
                return Ok(label_candidates(ctx, parent, block, &schema, index, pos));
            }
        }
        if block.open_brace.end <= pos && pos <= block.close_brace.start {
            let body_schema = block_body_schema(block, &schema, parent.extensions);
            let inner = ctx.with_outermost_body(Span::from(block.open_brace.start..block.close_brace.end));
            return self.body(inner, &block.body, &body_schema, pos);
        }
        Ok(Vec::new())
    }

    /// Attribute and block candidates for a body, replacing `span`.
    fn body_candidates(
        &self,
        ctx: ExprContext<'_>,
        body: &Body,
        schema: &BodySchema,
        prefix: &str,
        span: Span,
    ) -> Vec<Candidate> {
        let mut candidates = Vec::new();

        let mut attributes: Vec<(&String, &AttributeSchema)> = schema
            .attributes
            .iter()
            .filter(|(name, attr)| {
                name.starts_with(prefix)
                    && body.attribute(name).is_none()
                    && !(attr.is_computed && !attr.is_optional && !attr.is_required)
            })
            .collect();
        attributes.sort_by(|a, b| a.0.cmp(b.0));
        for (name, attr) in attributes {
            let data = attr.constraint.empty_completion_data(1, 0);
            let mut c = candidate(
                &ctx,
                name.as_str(),
                CandidateKind::Attribute,
                attr.detail(),
                format!("{name} = {}", data.new_text),
                format!("{name} = {}", data.snippet),
                span,
            );
            c.description = attr.description.clone();
            c.is_deprecated = attr.is_deprecated;
            c.trigger_suggest = data.trigger_suggest;
            candidates.push(c);
        }

        let mut blocks: Vec<(&String, &BlockSchema)> = schema
            .blocks
            .iter()
            .filter(|(name, block)| {
                let declared = body.blocks().filter(|b| b.block_type.value() == *name).count() as u64;
                name.starts_with(prefix) && (block.max_items == 0 || declared < block.max_items)
            })
            .collect();
        blocks.sort_by(|a, b| a.0.cmp(b.0));
        for (name, block) in blocks {
            let (new_text, snippet) = self.block_text(name, block);
            let mut c = candidate(&ctx, name.as_str(), CandidateKind::Block, block_detail(block), new_text, snippet, span);
            c.description = block.description.clone();
            c.is_deprecated = block.is_deprecated;
            candidates.push(c);
        }
        candidates
    }

    /// Plain text and snippet inserting a block of type `name`.
    fn block_text(&self, name: &str, block: &BlockSchema) -> (String, String) {
        let mut text = name.to_string();
        let mut snippet = name.to_string();
        let mut placeholder = 1;
        for label in &block.labels {
            text.push_str(&format!(" \"{}\"", label.name));
            snippet.push_str(&format!(" \"${{{placeholder}:{}}}\"", label.name));
            placeholder += 1;
        }
        text.push_str(" {\n");
        snippet.push_str(" {\n");

        if self.config.prefill_required_fields {
            if let Some(body) = &block.body {
                let mut required: Vec<(&String, &AttributeSchema)> =
                    body.attributes.iter().filter(|(_, attr)| attr.is_required).collect();
                required.sort_by(|a, b| a.0.cmp(b.0));
                for (attr_name, attr) in required {
                    let data = attr.constraint.empty_completion_data(placeholder, 1);
                    text.push_str(&format!("  {attr_name} = {}\n", data.new_text));
                    snippet.push_str(&format!("  {attr_name} = {}\n", data.snippet));
                    placeholder = data.next_placeholder;
                }
            }
        }
        text.push('}');
        snippet.push_str(&format!("  ${{{placeholder}}}\n}}"));
        (text, snippet)
    }
}

fn block_detail(block: &BlockSchema) -> String {
    let mut detail = "Block".to_string();
    if block.min_items > 0 {
        detail.push_str(&format!(", min: {}", block.min_items));
    }
    if block.max_items > 0 {
        detail.push_str(&format!(", max: {}", block.max_items));
    }
    detail
}

/// Values a label at `index` may take, with the description of what each
/// selects.
fn label_values(parent: &BodySchema, block: &Block, schema: &BlockSchema, index: usize) -> Vec<(String, MarkupContent)> {
    if block.block_type.value() == DYNAMIC_BLOCK && index == 0 {
        return dynamic_targets(parent)
            .into_iter()
            .map(|name| {
                let description = parent.block(name).map(|b| b.description.clone()).unwrap_or_default();
                (name.to_string(), description)
            })
            .collect();
    }
    let Some(label) = schema.labels.get(index) else {
        return Vec::new();
    };
    if !label.completable || !label.is_dep_key {
        return Vec::new();
    }
    let mut values: Vec<(String, MarkupContent)> = Vec::new();
    for (key, body) in &schema.dependent_body {
        let Ok(keys) = key.dependency_keys() else {
            continue;
        };
        for dep in keys.labels.iter().filter(|dep| dep.index == index) {
            if !values.iter().any(|(value, _)| *value == dep.value) {
                values.push((dep.value.clone(), body.description.clone()));
            }
        }
    }
    values.sort_by(|a, b| a.0.cmp(&b.0));
    values
}

fn label_candidates(
    ctx: ExprContext<'_>,
    parent: &BodySchema,
    block: &Block,
    schema: &BlockSchema,
    index: usize,
    pos: usize,
) -> Vec<Candidate> {
    let label = &block.labels[index];
    let text_start = if label.quoted { label.span.start + 1 } else { label.span.start };
    let prefix = ctx.text(Span::from(text_start.min(pos)..pos));
    label_values(parent, block, schema, index)
        .into_iter()
        .filter(|(value, _)| value.starts_with(prefix))
        .map(|(value, description)| {
            let text = format!("\"{value}\"");
            let mut c = candidate(&ctx, value.as_str(), CandidateKind::Label, "", text.clone(), text, label.span);
            c.description = description;
            c
        })
        .collect()
}
