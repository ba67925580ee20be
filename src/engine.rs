//! Engine facade
//!
//! Bundles the configuration tables with the pluggable collaborators
//! (ToC templates, number formatting, comment parsing) and exposes every
//! operation as buffer in, buffer (or typed value) out. The engine holds no
//! document state; one instance can serve any number of threads working on
//! different documents.

use std::collections::HashMap;

use crate::annotate::{self, Comment, CommentParser, PopupCommentParser};
use crate::config::EngineConfig;
use crate::edit::ops;
use crate::error::Result;
use crate::index::DocumentIndex;
use crate::process::{numbering, DefaultNumbering, NumberFormat, PassReport, PostProcessor};
use crate::toc::{self, DefaultTemplates, TocItem, TocTemplates};

type Templates = Box<dyn TocTemplates + Send + Sync>;
type Numbering = Box<dyn NumberFormat + Send + Sync>;
type Comments = Box<dyn CommentParser + Send + Sync>;

pub struct Engine {
    config: EngineConfig,
    templates: Templates,
    numbering: Numbering,
    comments: Comments,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let comments = Box::new(PopupCommentParser::new(config.comment_tag.clone()));
        Self {
            config,
            templates: Box::new(DefaultTemplates),
            numbering: Box::new(DefaultNumbering),
            comments,
        }
    }

    pub fn with_templates(mut self, templates: impl TocTemplates + Send + Sync + 'static) -> Self {
        self.templates = Box::new(templates);
        self
    }

    pub fn with_numbering(mut self, numbering: impl NumberFormat + Send + Sync + 'static) -> Self {
        self.numbering = Box::new(numbering);
        self
    }

    pub fn with_comment_parser(mut self, parser: impl CommentParser + Send + Sync + 'static) -> Self {
        self.comments = Box::new(parser);
        self
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline]
    fn post(&self) -> PostProcessor<'_> {
        PostProcessor::new(&self.config)
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Parse a buffer with the configured id attribute
    pub fn parse<'a>(&self, input: &'a [u8]) -> Result<DocumentIndex<'a>> {
        DocumentIndex::parse_with_id_attribute(input, &self.config.id_attribute)
    }

    /// Ids of the elements enclosing `id`, outermost first
    pub fn ancestors(&self, input: &[u8], id: &str) -> Result<Vec<String>> {
        self.parse(input)?.ancestors(id)
    }

    // ========================================================================
    // Localized edits
    // ========================================================================

    pub fn replace(&self, input: &[u8], tag: &str, id: Option<&str>, content: Option<&[u8]>) -> Result<Vec<u8>> {
        ops::replace(&self.parse(input)?, tag, id, content, &self.post())
    }

    pub fn delete(&self, input: &[u8], tag: &str, id: Option<&str>) -> Result<Vec<u8>> {
        ops::delete(&self.parse(input)?, tag, id)
    }

    pub fn insert(&self, input: &[u8], tag: &str, id: Option<&str>, template: &[u8], before: bool) -> Result<Vec<u8>> {
        ops::insert(&self.parse(input)?, tag, id, template, before)
    }

    pub fn append_child(&self, input: &[u8], parent_tag: &str, content: &[u8]) -> Result<Vec<u8>> {
        ops::append_child(&self.parse(input)?, parent_tag, content)
    }

    // ========================================================================
    // Post-processing and numbering
    // ========================================================================

    pub fn post_process(&self, input: &[u8]) -> Result<Vec<u8>> {
        self.post().run(input)
    }

    pub fn post_process_with_report(&self, input: &[u8]) -> Result<(Vec<u8>, PassReport)> {
        self.post().run_with_report(input)
    }

    pub fn renumber(&self, input: &[u8], tag: &str) -> Result<Vec<u8>> {
        numbering::renumber(input, tag, self.numbering.as_ref(), &self.post())
    }

    pub fn renumber_articles(&self, input: &[u8]) -> Result<Vec<u8>> {
        numbering::renumber_articles(input, self.numbering.as_ref(), &self.post())
    }

    pub fn renumber_recitals(&self, input: &[u8]) -> Result<Vec<u8>> {
        numbering::renumber_recitals(input, self.numbering.as_ref(), &self.post())
    }

    // ========================================================================
    // Table of contents
    // ========================================================================

    pub fn build_toc(&self, input: &[u8]) -> Result<Vec<TocItem>> {
        let doc = self.parse(input)?;
        toc::build_from(&doc, &self.config.toc_root_tag)
    }

    pub fn reconstruct_toc(&self, input: &[u8], items: &[TocItem]) -> Result<Vec<u8>> {
        toc::reconstruct(
            &self.parse(input)?,
            items,
            &self.config.toc_root_tag,
            self.templates.as_ref(),
            &self.post(),
        )
    }

    // ========================================================================
    // References and comments
    // ========================================================================

    pub fn update_references(&self, input: &[u8], references: &HashMap<String, String>) -> Result<Vec<u8>> {
        annotate::update_references(input, references)
    }

    pub fn insert_comment(&self, input: &[u8], element_id: &str, markup: &[u8], at_start: bool) -> Result<Vec<u8>> {
        annotate::insert_comment(
            &self.parse(input)?,
            element_id,
            markup,
            at_start,
            &self.config.comment_tag,
            &self.post(),
        )
    }

    pub fn extract_comments(&self, input: &[u8]) -> Result<Vec<Comment>> {
        annotate::extract_comments(&self.parse(input)?, &self.config.comment_tag, self.comments.as_ref())
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine").field("config", &self.config).finish_non_exhaustive()
    }
}
