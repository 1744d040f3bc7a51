//! Content Section stage: writes one markdown block for one outline section.
//!
//! Each call sees the brief, the current outline section, the text produced for
//! the previous section and the outline of the next one, so consecutive
//! sections read as one article without overlapping.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::errors::AppError;
use crate::generation::prompts::SECTION_WRITER_SYSTEM;
use crate::llm_client::prompts::NOT_APPLICABLE;
use crate::llm_client::{
    generate_structured, LlmBackend, LlmError, OutputShape, RetryPolicy, StructuredOutput,
};
use crate::models::brief::ContentBriefRow;
use crate::models::outline::OutlineSection;

/// Everything one section call depends on.
#[derive(Debug, Clone, Copy)]
pub struct SectionRequest<'a> {
    pub brief: &'a ContentBriefRow,
    pub current: &'a OutlineSection,
    /// Literal text returned for the previous section; `None` for the first.
    pub previous: Option<&'a str>,
    /// `None` for the last section.
    pub next: Option<&'a OutlineSection>,
}

#[async_trait]
pub trait SectionGenerator: Send + Sync {
    async fn generate_section(&self, request: SectionRequest<'_>) -> Result<String, AppError>;
}

/// Structured answer of the section writer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentBlock {
    pub content_block: String,
}

impl StructuredOutput for ContentBlock {
    fn shape() -> OutputShape {
        OutputShape {
            name: "content_block",
            schema: json!({
                "type": "object",
                "properties": { "content_block": { "type": "string" } },
                "required": ["content_block"],
                "additionalProperties": false
            }),
        }
    }

    fn validate(&self) -> Result<(), LlmError> {
        if self.content_block.trim().is_empty() {
            return Err(LlmError::EmptyContent);
        }
        Ok(())
    }
}

/// LLM-backed section writer.
pub struct LlmSectionWriter {
    llm: Arc<dyn LlmBackend>,
    policy: RetryPolicy,
}

impl LlmSectionWriter {
    pub fn new(llm: Arc<dyn LlmBackend>, policy: RetryPolicy) -> Self {
        Self { llm, policy }
    }
}

#[async_trait]
impl SectionGenerator for LlmSectionWriter {
    async fn generate_section(&self, request: SectionRequest<'_>) -> Result<String, AppError> {
        let prompt = build_section_prompt(&request);

        let block: ContentBlock =
            generate_structured(self.llm.as_ref(), SECTION_WRITER_SYSTEM, &prompt, &self.policy)
                .await
                .map_err(|e| {
                    AppError::Generation(format!(
                        "Section generation failed for {:?}: {e}",
                        first_line(&request.current.text)
                    ))
                })?;

        info!(
            "Generated section {:?} ({} chars) for brief {}",
            first_line(&request.current.text),
            block.content_block.len(),
            request.brief.id
        );
        Ok(block.content_block)
    }
}

/// Builds the user prompt for one section call.
///
/// Block order is fixed: outline section, previous section (if any), writing
/// sample, next section's outline (if any), product description, negative words.
pub fn build_section_prompt(request: &SectionRequest<'_>) -> String {
    let brief = request.brief;
    let mut prompt = String::new();

    prompt.push_str("Outline section:\n");
    prompt.push_str(&render_outline_section(&request.current.text));

    if let Some(previous) = request.previous {
        prompt.push_str("\nPrevious section:\n");
        prompt.push_str(previous.trim_end());
        prompt.push('\n');
    }

    prompt.push_str("\nWriting Sample:\n");
    prompt.push_str(brief.writing_sample.as_deref().unwrap_or_default().trim());
    prompt.push('\n');

    if let Some(next) = request.next {
        prompt.push_str("\nNext section's outline:\n");
        prompt.push_str(&render_outline_section(&next.text));
    }

    prompt.push_str("\nProduct description:\n");
    prompt.push_str(brief.product_info.as_deref().unwrap_or_default().trim());
    prompt.push('\n');

    prompt.push_str("\nNegative words:\n");
    prompt.push_str(negative_words(brief));
    prompt.push('\n');

    prompt
}

/// Inputs recorded on the stored content section for later revisions.
pub fn prompt_context(request: &SectionRequest<'_>) -> Value {
    json!({
        "outline_section_id": request.current.id,
        "outline_section": request.current.text,
        "previous_section": request.previous,
        "next_outline_section": request.next.map(|n| n.text.as_str()),
        "negative_words": negative_words(request.brief),
    })
}

/// Renders section text as a `[section]` block with one bullet per line.
fn render_outline_section(text: &str) -> String {
    let mut block = String::from("[section]\n");
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let line = line.strip_prefix("- ").unwrap_or(line);
        block.push_str("    - ");
        block.push_str(line);
        block.push('\n');
    }
    block
}

fn negative_words(brief: &ContentBriefRow) -> &str {
    match brief.negative_words.as_deref().map(str::trim) {
        Some(words) if !words.is_empty() => words,
        _ => NOT_APPLICABLE,
    }
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default().trim()
}
