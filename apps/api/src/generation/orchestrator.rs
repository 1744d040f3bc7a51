//! Content generation orchestrator: dispatches a request to the pipeline
//! registered for its content type.
//!
//! Blog post flow: create_brief → generate_outline → generate_sections (one
//! LLM call per outline section, strictly in order) → assemble_full_content →
//! persist sections and the final article.
//!
//! A failing stage aborts the run. Rows written by earlier stages (brief,
//! placeholder content, outline) are left in place.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::brief::create_brief;
use crate::generation::outline::{generate_outline, OutlineGenerator};
use crate::generation::section::{prompt_context, SectionGenerator, SectionRequest};
use crate::models::brief::{ContentBriefRow, NewContentBrief};
use crate::models::content::{NewContentSection, DEFAULT_CONTENT_TYPE};
use crate::models::outline::{ContentOutline, OutlineSection};
use crate::store::ContentStore;

/// Registry key of the blog post pipeline.
pub const BLOG_POST: &str = DEFAULT_CONTENT_TYPE;

/// Payload shared by all pipelines.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationRequest {
    /// Defaults to the brief's topic when absent.
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(alias = "brief_data")]
    pub brief: NewContentBrief,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedContent {
    pub content_brief: ContentBriefRow,
    pub outline: ContentOutline,
    pub sections: Vec<String>,
    pub full_content: String,
}

#[async_trait]
pub trait ContentPipeline: Send + Sync {
    async fn run(&self, request: GenerationRequest) -> Result<GeneratedContent, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Dispatch
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default, Clone)]
pub struct ContentOrchestrator {
    pipelines: BTreeMap<String, Arc<dyn ContentPipeline>>,
}

impl ContentOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, content_type: &str, pipeline: Arc<dyn ContentPipeline>) -> Self {
        self.pipelines
            .insert(normalize_content_type(content_type), pipeline);
        self
    }

    pub fn supported_types(&self) -> Vec<&str> {
        self.pipelines.keys().map(String::as_str).collect()
    }

    /// Looks up the pipeline before anything runs, so an unknown type has no
    /// side effects.
    pub async fn orchestrate(
        &self,
        content_type: &str,
        request: GenerationRequest,
    ) -> Result<GeneratedContent, AppError> {
        let key = normalize_content_type(content_type);
        let pipeline = self
            .pipelines
            .get(&key)
            .ok_or_else(|| AppError::UnsupportedContentType(content_type.to_string()))?;

        let run_id = Uuid::new_v4();
        let span = info_span!("generation", %run_id, content_type = %key);
        pipeline.run(request).instrument(span).await
    }
}

/// `"Blog Post"`, `"blog-post"` and `"blog_post"` all name the same pipeline.
fn normalize_content_type(content_type: &str) -> String {
    content_type
        .trim()
        .to_ascii_lowercase()
        .replace([' ', '-'], "_")
}

// ────────────────────────────────────────────────────────────────────────────
// Blog post pipeline
// ────────────────────────────────────────────────────────────────────────────

pub struct BlogPostPipeline {
    store: Arc<dyn ContentStore>,
    outlines: Arc<dyn OutlineGenerator>,
    sections: Arc<dyn SectionGenerator>,
}

impl BlogPostPipeline {
    pub fn new(
        store: Arc<dyn ContentStore>,
        outlines: Arc<dyn OutlineGenerator>,
        sections: Arc<dyn SectionGenerator>,
    ) -> Self {
        Self {
            store,
            outlines,
            sections,
        }
    }
}

#[async_trait]
impl ContentPipeline for BlogPostPipeline {
    async fn run(&self, request: GenerationRequest) -> Result<GeneratedContent, AppError> {
        let store = self.store.as_ref();

        // Step 1: Brief (creates the placeholder content if needed)
        let brief = create_brief(store, request.brief).await?;
        let content_id = brief.content_id.ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("Brief {} has no linked content", brief.id))
        })?;

        // Step 2: Outline
        let topic = request
            .topic
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| brief.topic().to_string());
        let outline = generate_outline(store, self.outlines.as_ref(), &topic, &brief, true).await?;

        // Step 3: Sections, one at a time
        let sections = generate_sections(self.sections.as_ref(), &brief, &outline.sections).await?;

        // Step 4: Assembly
        let full_content = assemble_full_content(&sections);

        // Step 5: Persist sections and article together, only once every section succeeded
        let rows: Vec<NewContentSection> = sections
            .iter()
            .enumerate()
            .map(|(index, text)| {
                let request = section_request(&brief, &outline.sections, &sections, index);
                NewContentSection {
                    content_id,
                    content_outline_section_id: outline.sections[index].id,
                    order: outline.sections[index].order,
                    text: text.clone(),
                    prompt_context: prompt_context(&request),
                }
            })
            .collect();
        store
            .save_generated_content(content_id, &brief.title, &full_content, &rows)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Content {content_id} not found")))?;

        info!(
            "Generated blog post for brief {} into content {}: {} sections, {} chars",
            brief.id,
            content_id,
            sections.len(),
            full_content.len()
        );

        Ok(GeneratedContent {
            content_brief: brief,
            outline,
            sections,
            full_content,
        })
    }
}

/// Calls the section stage once per outline section in ascending order.
/// Call `i` sees the text returned by call `i - 1` and outline section `i + 1`.
pub async fn generate_sections(
    generator: &dyn SectionGenerator,
    brief: &ContentBriefRow,
    outline: &[OutlineSection],
) -> Result<Vec<String>, AppError> {
    let mut texts: Vec<String> = Vec::with_capacity(outline.len());

    for index in 0..outline.len() {
        let request = section_request(brief, outline, &texts, index);
        let text = generator.generate_section(request).await?;
        texts.push(text);
    }

    Ok(texts)
}

fn section_request<'a>(
    brief: &'a ContentBriefRow,
    outline: &'a [OutlineSection],
    texts: &'a [String],
    index: usize,
) -> SectionRequest<'a> {
    SectionRequest {
        brief,
        current: &outline[index],
        previous: index
            .checked_sub(1)
            .and_then(|prev| texts.get(prev))
            .map(String::as_str),
        next: outline.get(index + 1),
    }
}

/// Joins section texts with one blank line between consecutive blocks.
pub fn assemble_full_content(sections: &[String]) -> String {
    sections.join("\n\n")
}
