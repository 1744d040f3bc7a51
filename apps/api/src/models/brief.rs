use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContentBriefRow {
    pub id: i64,
    pub user_id: i64,
    /// Set once at creation and never re-pointed.
    pub content_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub primary_keyword: Option<String>,
    pub secondary_keywords: Option<String>,
    pub author_instructions: Option<String>,
    pub writing_sample: Option<String>,
    pub negative_words: Option<String>,
    pub suggested_word_count: Option<i32>,
    pub product_info: Option<String>,
    pub call_to_action: Option<String>,
    pub custom_data: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContentBriefRow {
    /// What the article is about: the primary keyword if the brief has one,
    /// otherwise its title.
    pub fn topic(&self) -> &str {
        match self.primary_keyword.as_deref().map(str::trim) {
            Some(keyword) if !keyword.is_empty() => keyword,
            _ => self.title.as_str(),
        }
    }
}

/// Brief payload as submitted by a client, before ids are assigned.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewContentBrief {
    pub user_id: i64,
    #[serde(default)]
    pub content_id: Option<i64>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub primary_keyword: Option<String>,
    #[serde(default)]
    pub secondary_keywords: Option<String>,
    #[serde(default)]
    pub author_instructions: Option<String>,
    #[serde(default)]
    pub writing_sample: Option<String>,
    #[serde(default)]
    pub negative_words: Option<String>,
    #[serde(default)]
    pub suggested_word_count: Option<i32>,
    #[serde(default)]
    pub product_info: Option<String>,
    #[serde(default)]
    pub call_to_action: Option<String>,
    #[serde(default)]
    pub custom_data: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_brief_accepts_minimal_payload() {
        let json = serde_json::json!({ "user_id": 7, "title": "IELTS writing" });
        let brief: NewContentBrief = serde_json::from_value(json).unwrap();
        assert_eq!(brief.user_id, 7);
        assert!(brief.content_id.is_none());
        assert!(brief.negative_words.is_none());
    }

    #[test]
    fn test_new_brief_requires_title() {
        let json = serde_json::json!({ "user_id": 7 });
        assert!(serde_json::from_value::<NewContentBrief>(json).is_err());
    }
}
