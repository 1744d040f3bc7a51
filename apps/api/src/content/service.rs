use serde::Serialize;

use crate::errors::AppError;
use crate::models::content::{
    ContentRow, ContentSectionRow, ContentSeriesRow, NewContent, NewContentSeries,
};
use crate::models::user::UserRow;
use crate::store::ContentStore;

/// A content with its generated sections in order.
#[derive(Debug, Serialize)]
pub struct ContentDetail {
    #[serde(flatten)]
    pub content: ContentRow,
    pub sections: Vec<ContentSectionRow>,
}

#[derive(Debug, Serialize)]
pub struct UserAccount {
    #[serde(flatten)]
    pub user: UserRow,
    pub has_premium_access: bool,
}

pub async fn create_content(
    store: &dyn ContentStore,
    content: NewContent,
) -> Result<ContentRow, AppError> {
    if content.content_type.trim().is_empty() {
        return Err(AppError::Validation("type cannot be empty".to_string()));
    }
    if let Some(series_id) = content.content_series_id {
        get_series(store, series_id).await?;
    }
    store.create_content(content).await
}

pub async fn get_content_detail(
    store: &dyn ContentStore,
    id: i64,
) -> Result<ContentDetail, AppError> {
    let content = store
        .get_content(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Content {id} not found")))?;
    let sections = store.list_content_sections(id).await?;
    Ok(ContentDetail { content, sections })
}

pub async fn create_series(
    store: &dyn ContentStore,
    series: NewContentSeries,
) -> Result<ContentSeriesRow, AppError> {
    if series.title.trim().is_empty() {
        return Err(AppError::Validation("title cannot be empty".to_string()));
    }
    store.create_series(series).await
}

pub async fn get_series(store: &dyn ContentStore, id: i64) -> Result<ContentSeriesRow, AppError> {
    store
        .get_series(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Content series {id} not found")))
}

pub async fn get_user_account(store: &dyn ContentStore, id: i64) -> Result<UserAccount, AppError> {
    let user = store
        .get_user(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))?;
    let has_premium_access = user.has_premium_access();
    Ok(UserAccount {
        user,
        has_premium_access,
    })
}
