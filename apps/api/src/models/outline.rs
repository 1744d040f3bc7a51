use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContentOutlineRow {
    pub id: i64,
    pub user_id: i64,
    pub content_brief_id: i64,
    pub content_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub custom_data: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContentOutlineSectionRow {
    pub id: i64,
    pub content_outline_id: i64,
    #[sqlx(rename = "position")]
    pub order: i32,
    pub parent_id: Option<i64>,
    pub text: String,
}

/// An outline entry before it is stored. `order` is the only sequencing signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineSectionDraft {
    pub text: String,
    pub order: i32,
}

/// One outline entry as the pipeline sees it, stored or transient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineSection {
    /// `None` for outlines that were never persisted.
    pub id: Option<i64>,
    pub text: String,
    pub order: i32,
}

impl From<ContentOutlineSectionRow> for OutlineSection {
    fn from(row: ContentOutlineSectionRow) -> Self {
        Self {
            id: Some(row.id),
            text: row.text,
            order: row.order,
        }
    }
}

impl From<OutlineSectionDraft> for OutlineSection {
    fn from(draft: OutlineSectionDraft) -> Self {
        Self {
            id: None,
            text: draft.text,
            order: draft.order,
        }
    }
}

/// Outline header plus its sections in ascending order.
#[derive(Debug, Clone, Serialize)]
pub struct ContentOutline {
    pub id: Option<i64>,
    pub content_brief_id: i64,
    pub content_id: Option<i64>,
    pub title: String,
    pub sections: Vec<OutlineSection>,
}

/// Insert payload for an outline header.
#[derive(Debug, Clone)]
pub struct NewContentOutline {
    pub user_id: i64,
    pub content_brief_id: i64,
    pub content_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
}
