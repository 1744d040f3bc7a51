//! Content Outline stage: turns a topic and brief into an ordered list of sections.
//!
//! The heading strategy is pluggable. `LlmOutlineGenerator` asks the model;
//! `FixtureOutlineGenerator` is deterministic and needs no network.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::generation::prompts::{OUTLINE_PROMPT_TEMPLATE, OUTLINE_SYSTEM};
use crate::llm_client::prompts::STRUCTURED_OUTPUT_INSTRUCTION;
use crate::llm_client::{
    generate_structured, LlmBackend, LlmError, OutputShape, RetryPolicy, StructuredOutput,
};
use crate::models::brief::ContentBriefRow;
use crate::models::outline::{
    ContentOutline, ContentOutlineSectionRow, NewContentOutline, OutlineSection,
    OutlineSectionDraft,
};
use crate::store::ContentStore;

#[async_trait]
pub trait OutlineGenerator: Send + Sync {
    async fn generate(
        &self,
        topic: &str,
        brief: &ContentBriefRow,
    ) -> Result<Vec<OutlineSectionDraft>, AppError>;

    /// Short backend label for logs.
    fn name(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// FixtureOutlineGenerator
// ────────────────────────────────────────────────────────────────────────────

/// Returns the configured headings, or three headings derived from the topic.
#[derive(Debug, Clone, Default)]
pub struct FixtureOutlineGenerator {
    headings: Option<Vec<String>>,
}

impl FixtureOutlineGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_headings<I, S>(headings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headings: Some(headings.into_iter().map(Into::into).collect()),
        }
    }
}

#[async_trait]
impl OutlineGenerator for FixtureOutlineGenerator {
    async fn generate(
        &self,
        topic: &str,
        _brief: &ContentBriefRow,
    ) -> Result<Vec<OutlineSectionDraft>, AppError> {
        let headings = match &self.headings {
            Some(headings) => headings.clone(),
            None => vec![
                format!("What is {topic}?"),
                format!("How {topic} works"),
                format!("Getting started with {topic}"),
            ],
        };
        Ok(numbered(headings))
    }

    fn name(&self) -> &'static str {
        "fixture"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// LlmOutlineGenerator
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct OutlineShape {
    pub sections: Vec<String>,
}

impl StructuredOutput for OutlineShape {
    fn shape() -> OutputShape {
        OutputShape {
            name: "content_outline",
            schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "sections": { "type": "array", "items": { "type": "string" } }
                },
                "required": ["sections"],
                "additionalProperties": false
            }),
        }
    }

    fn validate(&self) -> Result<(), LlmError> {
        if self.sections.iter().all(|s| s.trim().is_empty()) {
            return Err(LlmError::EmptyContent);
        }
        Ok(())
    }
}

pub struct LlmOutlineGenerator {
    llm: Arc<dyn LlmBackend>,
    policy: RetryPolicy,
}

impl LlmOutlineGenerator {
    pub fn new(llm: Arc<dyn LlmBackend>, policy: RetryPolicy) -> Self {
        Self { llm, policy }
    }
}

#[async_trait]
impl OutlineGenerator for LlmOutlineGenerator {
    async fn generate(
        &self,
        topic: &str,
        brief: &ContentBriefRow,
    ) -> Result<Vec<OutlineSectionDraft>, AppError> {
        let system = format!("{OUTLINE_SYSTEM} {STRUCTURED_OUTPUT_INSTRUCTION}");
        let prompt = build_outline_prompt(topic, brief);

        let outline: OutlineShape =
            generate_structured(self.llm.as_ref(), &system, &prompt, &self.policy)
                .await
                .map_err(|e| AppError::Generation(format!("Outline generation failed: {e}")))?;

        Ok(numbered(
            outline
                .sections
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        ))
    }

    fn name(&self) -> &'static str {
        "llm"
    }
}

fn build_outline_prompt(topic: &str, brief: &ContentBriefRow) -> String {
    let or_blank = |value: &Option<String>| value.clone().unwrap_or_default();

    OUTLINE_PROMPT_TEMPLATE
        .replace("{topic}", topic)
        .replace("{title}", &brief.title)
        .replace("{description}", &or_blank(&brief.description))
        .replace("{primary_keyword}", &or_blank(&brief.primary_keyword))
        .replace("{secondary_keywords}", &or_blank(&brief.secondary_keywords))
        .replace("{author_instructions}", &or_blank(&brief.author_instructions))
        .replace(
            "{suggested_word_count}",
            &brief
                .suggested_word_count
                .map(|n| n.to_string())
                .unwrap_or_default(),
        )
}

/// Assigns `order = 1..=n` in iteration order.
fn numbered<I: IntoIterator<Item = String>>(headings: I) -> Vec<OutlineSectionDraft> {
    headings
        .into_iter()
        .zip(1..)
        .map(|(text, order)| OutlineSectionDraft { text, order })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Stage
// ────────────────────────────────────────────────────────────────────────────

/// Runs the generator and returns the outline in ascending section order.
/// With `persist`, the outline is stored against the brief and its content.
pub async fn generate_outline(
    store: &dyn ContentStore,
    generator: &dyn OutlineGenerator,
    topic: &str,
    brief: &ContentBriefRow,
    persist: bool,
) -> Result<ContentOutline, AppError> {
    let drafts = generator.generate(topic, brief).await?;
    let drafts = order_sections(drafts)?;
    info!(
        "Outline for brief {} ({} generator): {} sections",
        brief.id,
        generator.name(),
        drafts.len()
    );

    if !persist {
        return Ok(ContentOutline {
            id: None,
            content_brief_id: brief.id,
            content_id: brief.content_id,
            title: topic.to_string(),
            sections: drafts.into_iter().map(OutlineSection::from).collect(),
        });
    }

    let (header, rows) = store
        .create_outline(
            NewContentOutline {
                user_id: brief.user_id,
                content_brief_id: brief.id,
                content_id: brief.content_id,
                title: topic.to_string(),
                description: brief.description.clone(),
            },
            &drafts,
        )
        .await?;

    Ok(ContentOutline {
        id: Some(header.id),
        content_brief_id: header.content_brief_id,
        content_id: header.content_id,
        title: header.title,
        sections: sorted_rows(rows),
    })
}

/// Sorts drafts by `order`. Empty outlines and duplicate orders are rejected
/// since previous/next adjacency would be undefined.
pub fn order_sections(
    mut drafts: Vec<OutlineSectionDraft>,
) -> Result<Vec<OutlineSectionDraft>, AppError> {
    if drafts.is_empty() {
        return Err(AppError::Generation(
            "Outline generator produced no sections".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    if let Some(dup) = drafts.iter().find(|d| !seen.insert(d.order)) {
        return Err(AppError::Generation(format!(
            "Outline has more than one section with order {}",
            dup.order
        )));
    }

    drafts.sort_by_key(|d| d.order);
    Ok(drafts)
}

pub async fn get_outline(store: &dyn ContentStore, id: i64) -> Result<ContentOutline, AppError> {
    let header = store
        .get_outline(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Content outline {id} not found")))?;
    let rows = store.list_outline_sections(id).await?;

    Ok(ContentOutline {
        id: Some(header.id),
        content_brief_id: header.content_brief_id,
        content_id: header.content_id,
        title: header.title,
        sections: sorted_rows(rows),
    })
}

pub async fn get_outline_section(
    store: &dyn ContentStore,
    id: i64,
) -> Result<ContentOutlineSectionRow, AppError> {
    store
        .get_outline_section(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Content outline section {id} not found")))
}

fn sorted_rows(mut rows: Vec<ContentOutlineSectionRow>) -> Vec<OutlineSection> {
    rows.sort_by_key(|r| (r.order, r.id));
    rows.into_iter().map(OutlineSection::from).collect()
}
