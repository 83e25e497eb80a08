//! # Query Entry Points
//!
//! [`Decoder`] resolves paths through a [`PathReader`]; [`PathDecoder`]
//! answers completion, hover, semantic token and reference queries against
//! one [`PathContext`].

use std::sync::Arc;

use hclang_reference::{Origin, Origins, ReferenceError, Target, Targets};
use hclang_schema::{BodySchema, Candidates, HoverData, SemanticToken};
use hclang_syntax::{Body, File, FileBody, Pos};

use crate::collect::Collector;
use crate::completion::CompletionWalker;
use crate::config::DecoderConfig;
use crate::context::{CancellationToken, Path, PathContext, PathReader};
use crate::error::DecoderError;
use crate::expr::ExprContext;
use crate::hover::body_hover;
use crate::semantic_tokens::TokenWalker;

/// Entry point over every path a [`PathReader`] knows.
#[derive(Debug, Clone)]
pub struct Decoder<R> {
    reader: R,
    config: DecoderConfig,
}

impl<R: PathReader> Decoder<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            config: DecoderConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: DecoderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn path(&self, path: &Path) -> Result<PathDecoder, DecoderError> {
        let ctx = self.reader.path_context(path)?;
        Ok(PathDecoder::new(ctx).with_config(self.config.clone()))
    }

    /// Targets and origins to rename for the reference at `pos`.
    pub fn rename_targets(&self, path: &Path, filename: &str, pos: Pos) -> Result<RenameTargets, DecoderError> {
        self.path(path)?.rename_targets(filename, pos)
    }
}

/// Everything renamed together with the reference under the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameTargets {
    pub target: Target,
    pub origins: Origins,
}

/// Answers queries for a single path.
#[derive(Debug, Clone)]
pub struct PathDecoder {
    ctx: Arc<PathContext>,
    config: DecoderConfig,
    cancel: CancellationToken,
}

impl PathDecoder {
    pub fn new(ctx: Arc<PathContext>) -> Self {
        Self {
            ctx,
            config: DecoderConfig::default(),
            cancel: CancellationToken::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: DecoderConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn context(&self) -> &PathContext {
        &self.ctx
    }

    /// File, native body and schema for a query. `None` when the file has
    /// no bytes, which every query answers with an empty result.
    fn prepare(&self, filename: &str) -> Result<Option<(&File, &Body, &BodySchema)>, DecoderError> {
        let file = self.ctx.file(filename)?;
        let body = match file.body() {
            FileBody::Native(body) => body,
            FileBody::Json(_) | FileBody::Unknown => {
                return Err(DecoderError::UnknownFileFormat(filename.to_string()));
            }
        };
        if file.is_empty() {
            return Ok(None);
        }
        let schema = self.ctx.schema.as_ref().ok_or(DecoderError::NoSchema)?;
        Ok(Some((file, body, schema)))
    }

    fn check_pos(file: &File, pos: Pos) -> Result<(), DecoderError> {
        if pos.byte > file.len() {
            return Err(DecoderError::PosOutOfRange {
                filename: file.filename().to_string(),
                byte: pos.byte,
                len: file.len(),
            });
        }
        Ok(())
    }

    pub fn completion_at_pos(&self, filename: &str, pos: Pos) -> Result<Candidates, DecoderError> {
        let _span = tracing::trace_span!("completion_at_pos", filename, byte = pos.byte).entered();
        let Some((file, body, schema)) = self.prepare(filename)? else {
            return Ok(Candidates::complete(Vec::new()));
        };
        Self::check_pos(file, pos)?;

        let walker = CompletionWalker {
            config: &self.config,
            cancel: &self.cancel,
        };
        let mut list = walker.body(ExprContext::new(&self.ctx, file), body, schema, pos.byte)?;
        if !self.config.enable_snippets {
            for candidate in &mut list {
                candidate.text_edit.snippet.clone_from(&candidate.text_edit.new_text);
            }
        }
        tracing::debug!(count = list.len(), "completion candidates");
        if list.len() > self.config.max_candidates {
            list.truncate(self.config.max_candidates);
            return Ok(Candidates::incomplete(list));
        }
        Ok(Candidates::complete(list))
    }

    pub fn hover_at_pos(&self, filename: &str, pos: Pos) -> Result<Option<HoverData>, DecoderError> {
        let _span = tracing::trace_span!("hover_at_pos", filename, byte = pos.byte).entered();
        let Some((file, body, schema)) = self.prepare(filename)? else {
            return Ok(None);
        };
        Self::check_pos(file, pos)?;
        body_hover(ExprContext::new(&self.ctx, file), body, schema, pos.byte, &self.cancel)
    }

    pub fn semantic_tokens_in_file(&self, filename: &str) -> Result<Vec<SemanticToken>, DecoderError> {
        let _span = tracing::trace_span!("semantic_tokens_in_file", filename).entered();
        let Some((file, body, schema)) = self.prepare(filename)? else {
            return Ok(Vec::new());
        };
        let mut walker = TokenWalker::new(&self.cancel);
        walker.walk_body(ExprContext::new(&self.ctx, file), body, schema, &[])?;
        let tokens = walker.finish();
        tracing::debug!(count = tokens.len(), "semantic tokens");
        Ok(tokens)
    }

    /// Targets declared across every file of the path.
    pub fn collect_reference_targets(&self) -> Result<Targets, DecoderError> {
        let _span = tracing::trace_span!("collect_reference_targets").entered();
        let mut collector = Collector::new(&self.cancel);
        for filename in self.ctx.filenames() {
            let Some((file, body, schema)) = self.collectable(filename)? else {
                continue;
            };
            collector.collect_targets(ExprContext::new(&self.ctx, file), body, schema, None)?;
        }
        Ok(collector.into_targets())
    }

    /// Origins found across every file of the path.
    pub fn collect_reference_origins(&self) -> Result<Origins, DecoderError> {
        let _span = tracing::trace_span!("collect_reference_origins").entered();
        let mut collector = Collector::new(&self.cancel);
        for filename in self.ctx.filenames() {
            let Some((file, body, schema)) = self.collectable(filename)? else {
                continue;
            };
            collector.collect_origins(ExprContext::new(&self.ctx, file), body, schema)?;
        }
        Ok(Origins::new(collector.into_origins()))
    }

    /// Like `prepare`, but files in other formats are skipped.
    fn collectable(&self, filename: &str) -> Result<Option<(&File, &Body, &BodySchema)>, DecoderError> {
        match self.prepare(filename) {
            Err(DecoderError::UnknownFileFormat(_)) => {
                tracing::debug!(filename, "skipping file in unsupported format");
                Ok(None)
            }
            other => other,
        }
    }

    /// Origins referring to the innermost targets declared at `pos`.
    pub fn reference_origins_targeting_pos(&self, filename: &str, pos: Pos) -> Result<Origins, DecoderError> {
        let _span = tracing::trace_span!("reference_origins_targeting_pos", filename, byte = pos.byte).entered();
        let file = self.ctx.file(filename)?;
        Self::check_pos(file, pos)?;

        let mut found: Vec<Origin> = Vec::new();
        for target in self.ctx.reference_targets.innermost_at_pos(filename, pos) {
            for origin in self.ctx.reference_origins.targeting(target) {
                if !found.contains(&origin) {
                    found.push(origin);
                }
            }
        }
        Ok(Origins::new(found))
    }

    /// Targets the reference at `pos` resolves to. No reference there is
    /// an empty result.
    pub fn reference_targets_for_origin_at_pos(&self, filename: &str, pos: Pos) -> Result<Targets, DecoderError> {
        let _span = tracing::trace_span!("reference_targets_for_origin_at_pos", filename, byte = pos.byte).entered();
        let file = self.ctx.file(filename)?;
        Self::check_pos(file, pos)?;

        let Some(origin) = self.ctx.reference_origins.at_pos(filename, pos) else {
            return Ok(Targets::default());
        };
        Ok(self
            .ctx
            .reference_targets
            .matching(origin)
            .into_iter()
            .cloned()
            .collect())
    }

    /// The target of the reference at `pos` and every origin referring to
    /// it, the one under the cursor included.
    pub fn rename_targets(&self, filename: &str, pos: Pos) -> Result<RenameTargets, DecoderError> {
        let _span = tracing::trace_span!("rename_targets", filename, byte = pos.byte).entered();
        let file = self.ctx.file(filename)?;
        Self::check_pos(file, pos)?;

        let origin = self
            .ctx
            .reference_origins
            .at_pos(filename, pos)
            .ok_or(ReferenceError::NoOriginFound)?;
        let target = self
            .ctx
            .reference_targets
            .matching(origin)
            .into_iter()
            .next()
            .ok_or(ReferenceError::NoTargetFound)?
            .clone();

        let mut origins = self.ctx.reference_origins.targeting(&target);
        if !origins.iter().any(|o| o == origin) {
            origins.push(origin.clone());
        }
        Ok(RenameTargets { target, origins })
    }
}
