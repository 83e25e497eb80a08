//! # Semantic Tokens
//!
//! Walks a native body in document order, emitting tokens for block types,
//! labels and attribute names known to the schema, and for the expressions
//! of known attributes. Modifiers of enclosing blocks are carried down.

use hclang_schema::{merge_modifiers, BodySchema, SemanticToken, SemanticTokenModifier, SemanticTokenType};
use hclang_syntax::{Body, BodyItem, Span};

use crate::body_schema::{block_body_schema, block_schema};
use crate::context::CancellationToken;
use crate::error::DecoderError;
use crate::expr::ExprContext;

pub(crate) struct TokenWalker<'a> {
    cancel: &'a CancellationToken,
    tokens: Vec<SemanticToken>,
}

impl<'a> TokenWalker<'a> {
    pub const fn new(cancel: &'a CancellationToken) -> Self {
        Self {
            cancel,
            tokens: Vec::new(),
        }
    }

    pub fn finish(self) -> Vec<SemanticToken> {
        self.tokens
    }

    pub fn walk_body(
        &mut self,
        ctx: ExprContext<'_>,
        body: &Body,
        schema: &BodySchema,
        modifiers: &[SemanticTokenModifier],
    ) -> Result<(), DecoderError> {
        for item in &body.items {
            match item {
                BodyItem::Attribute(attr) => {
                    let Some(attr_schema) = schema.attribute(attr.name.value()) else {
                        continue;
                    };
                    self.tokens.push(SemanticToken::new(
                        SemanticTokenType::AttrName,
                        merge_modifiers(modifiers, &attr_schema.semantic_token_modifiers),
                        ctx.range(attr.name.span()),
                    ));
                    self.tokens
                        .extend(ctx.semantic_tokens(&attr.expr, &attr_schema.constraint));
                }
                BodyItem::Block(block) => {
                    self.cancel.check()?;
                    let Some(block_schema) = block_schema(schema, block) else {
                        continue;
                    };
                    let block_modifiers = merge_modifiers(modifiers, &block_schema.semantic_token_modifiers);
                    self.tokens.push(SemanticToken::new(
                        SemanticTokenType::BlockType,
                        block_modifiers.clone(),
                        ctx.range(block.block_type.span()),
                    ));

                    for (label, label_schema) in block.labels.iter().zip(&block_schema.labels) {
                        let mut label_modifiers =
                            merge_modifiers(&block_modifiers, &label_schema.semantic_token_modifiers);
                        if label_schema.is_dep_key {
                            label_modifiers = merge_modifiers(&label_modifiers, &[SemanticTokenModifier::DEPENDENT]);
                        }
                        self.tokens.push(SemanticToken::new(
                            SemanticTokenType::BlockLabel,
                            label_modifiers,
                            ctx.range(label.span),
                        ));
                    }

                    let body_schema = block_body_schema(block, &block_schema, schema.extensions);
                    let inner = ctx.with_outermost_body(Span::from(block.open_brace.start..block.close_brace.end));
                    self.walk_body(inner, &block.body, &body_schema, &block_modifiers)?;
                }
            }
        }
        Ok(())
    }
}
