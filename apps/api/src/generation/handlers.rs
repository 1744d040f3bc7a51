//! Axum route handlers for the Generation API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::generation::brief::get_brief;
use crate::generation::orchestrator::{GeneratedContent, GenerationRequest};
use crate::generation::section::SectionRequest;
use crate::models::outline::OutlineSection;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub content_type: String,
    #[serde(flatten)]
    pub request: GenerationRequest,
}

#[derive(Debug, Deserialize)]
pub struct NewSectionRequest {
    pub content_brief_id: i64,
    /// Heading of the section to write; extra lines become outline bullets.
    pub outline_section: String,
    #[serde(default)]
    pub previous_section: Option<String>,
    #[serde(default)]
    pub next_outline_section: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NewSectionResponse {
    pub content_block: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/generate
///
/// Full pipeline for the requested content type: brief → outline → sections → article.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(body): Json<GenerateRequest>,
) -> Result<Json<GeneratedContent>, AppError> {
    let generated = state
        .orchestrator
        .orchestrate(&body.content_type, body.request)
        .await?;
    Ok(Json(generated))
}

/// POST /api/v1/content-sections/new
///
/// Writes a single section for a stored brief without touching any outline.
pub async fn handle_new_section(
    State(state): State<AppState>,
    Json(body): Json<NewSectionRequest>,
) -> Result<Json<NewSectionResponse>, AppError> {
    if body.outline_section.trim().is_empty() {
        return Err(AppError::Validation(
            "outline_section cannot be empty".to_string(),
        ));
    }

    let brief = get_brief(state.store.as_ref(), body.content_brief_id).await?;

    let current = OutlineSection {
        id: None,
        text: body.outline_section,
        order: 1,
    };
    let next = body
        .next_outline_section
        .filter(|text| !text.trim().is_empty())
        .map(|text| OutlineSection {
            id: None,
            text,
            order: 2,
        });

    let content_block = state
        .section_writer
        .generate_section(SectionRequest {
            brief: &brief,
            current: &current,
            previous: body.previous_section.as_deref(),
            next: next.as_ref(),
        })
        .await?;

    Ok(Json(NewSectionResponse { content_block }))
}
