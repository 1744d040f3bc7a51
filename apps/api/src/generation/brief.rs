//! Content Brief stage: persists a brief and guarantees it links to exactly one content.

use tracing::info;

use crate::errors::AppError;
use crate::models::brief::{ContentBriefRow, NewContentBrief};
use crate::models::content::NewContent;
use crate::store::ContentStore;

/// Column width of `primary_keyword` and `negative_words`.
pub const MAX_KEYWORD_CHARS: usize = 200;

/// Persists `brief`, first creating an empty `blog_post` content for it if it
/// does not reference one yet.
///
/// Not transactional: if the brief insert fails, the placeholder content stays.
pub async fn create_brief(
    store: &dyn ContentStore,
    mut brief: NewContentBrief,
) -> Result<ContentBriefRow, AppError> {
    validate_brief(&brief)?;

    let content_id = get_or_create_content_id(store, &brief).await?;
    brief.content_id = Some(content_id);

    let row = store.create_brief(&brief).await?;
    info!(
        "Created content brief {} (content {}) for user {}",
        row.id, content_id, row.user_id
    );
    Ok(row)
}

/// Returns the brief's existing content id, or creates an empty content owned
/// by the same user and returns its id.
pub async fn get_or_create_content_id(
    store: &dyn ContentStore,
    brief: &NewContentBrief,
) -> Result<i64, AppError> {
    if let Some(content_id) = brief.content_id {
        store
            .get_content(content_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Content {content_id} not found")))?;
        return Ok(content_id);
    }

    let content = store
        .create_content(NewContent::empty_for(brief.user_id))
        .await?;
    info!(
        "Created empty {} content {} for user {}",
        content.content_type, content.id, brief.user_id
    );
    Ok(content.id)
}

pub async fn get_brief(store: &dyn ContentStore, id: i64) -> Result<ContentBriefRow, AppError> {
    store
        .get_brief(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Content brief {id} not found")))
}

fn validate_brief(brief: &NewContentBrief) -> Result<(), AppError> {
    if brief.title.trim().is_empty() {
        return Err(AppError::Validation("title cannot be empty".to_string()));
    }
    for (field, value) in [
        ("primary_keyword", &brief.primary_keyword),
        ("negative_words", &brief.negative_words),
    ] {
        if let Some(value) = value {
            if value.chars().count() > MAX_KEYWORD_CHARS {
                return Err(AppError::Validation(format!(
                    "{field} must be at most {MAX_KEYWORD_CHARS} characters"
                )));
            }
        }
    }
    Ok(())
}
