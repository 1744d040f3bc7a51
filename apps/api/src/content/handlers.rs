use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::content::service::{
    create_content, create_series, get_content_detail, get_series, get_user_account,
    ContentDetail, UserAccount,
};
use crate::errors::AppError;
use crate::generation::brief::{create_brief, get_brief};
use crate::generation::outline::{get_outline, get_outline_section};
use crate::models::brief::{ContentBriefRow, NewContentBrief};
use crate::models::content::{ContentRow, ContentSeriesRow, NewContent, NewContentSeries};
use crate::models::outline::{ContentOutline, ContentOutlineSectionRow};
use crate::state::AppState;

/// POST /api/v1/content-briefs
pub async fn handle_create_brief(
    State(state): State<AppState>,
    Json(req): Json<NewContentBrief>,
) -> Result<(StatusCode, Json<ContentBriefRow>), AppError> {
    let brief = create_brief(state.store.as_ref(), req).await?;
    Ok((StatusCode::CREATED, Json(brief)))
}

/// GET /api/v1/content-briefs/:id
pub async fn handle_get_brief(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ContentBriefRow>, AppError> {
    Ok(Json(get_brief(state.store.as_ref(), id).await?))
}

/// POST /api/v1/contents
pub async fn handle_create_content(
    State(state): State<AppState>,
    Json(req): Json<NewContent>,
) -> Result<(StatusCode, Json<ContentRow>), AppError> {
    let content = create_content(state.store.as_ref(), req).await?;
    Ok((StatusCode::CREATED, Json(content)))
}

/// GET /api/v1/contents/:id
pub async fn handle_get_content(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ContentDetail>, AppError> {
    Ok(Json(get_content_detail(state.store.as_ref(), id).await?))
}

/// GET /api/v1/content-outlines/:id
pub async fn handle_get_outline(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ContentOutline>, AppError> {
    Ok(Json(get_outline(state.store.as_ref(), id).await?))
}

/// GET /api/v1/content-outline-sections/:id
pub async fn handle_get_outline_section(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ContentOutlineSectionRow>, AppError> {
    Ok(Json(get_outline_section(state.store.as_ref(), id).await?))
}

/// POST /api/v1/content-series
pub async fn handle_create_series(
    State(state): State<AppState>,
    Json(req): Json<NewContentSeries>,
) -> Result<(StatusCode, Json<ContentSeriesRow>), AppError> {
    let series = create_series(state.store.as_ref(), req).await?;
    Ok((StatusCode::CREATED, Json(series)))
}

/// GET /api/v1/content-series/:id
pub async fn handle_get_series(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ContentSeriesRow>, AppError> {
    Ok(Json(get_series(state.store.as_ref(), id).await?))
}

/// GET /api/v1/users/:id
pub async fn handle_get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<UserAccount>, AppError> {
    Ok(Json(get_user_account(state.store.as_ref(), id).await?))
}
