use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// Type tag of implicitly created contents.
pub const DEFAULT_CONTENT_TYPE: &str = "blog_post";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContentRow {
    pub id: i64,
    pub user_id: i64,
    pub content_series_id: Option<i64>,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub content_type: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub text: Option<String>,
    pub custom_data: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewContent {
    pub user_id: i64,
    #[serde(rename = "type", default = "default_content_type")]
    pub content_type: String,
    #[serde(default)]
    pub content_series_id: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

fn default_content_type() -> String {
    DEFAULT_CONTENT_TYPE.to_string()
}

impl NewContent {
    /// The placeholder a brief links to before anything is generated.
    pub fn empty_for(user_id: i64) -> Self {
        Self {
            user_id,
            content_type: default_content_type(),
            content_series_id: None,
            title: None,
            description: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContentSectionRow {
    pub id: i64,
    pub content_id: i64,
    pub content_outline_section_id: Option<i64>,
    #[sqlx(rename = "position")]
    pub order: i32,
    pub text: String,
    /// Inputs the section was generated from, kept for later revisions.
    pub prompt_context: Value,
    pub custom_data: Value,
    /// Array of `{text, revised_at}` entries. Empty until a section is edited.
    pub revision_history: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevisionEntry {
    pub text: String,
    pub revised_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewContentSection {
    pub content_id: i64,
    pub content_outline_section_id: Option<i64>,
    pub order: i32,
    pub text: String,
    pub prompt_context: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContentSeriesRow {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub custom_data: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewContentSeries {
    pub user_id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub custom_data: Option<Value>,
}
