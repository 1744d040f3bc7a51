//! In-process `ContentStore` used by stage, pipeline and router tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;

use crate::errors::AppError;
use crate::models::brief::{ContentBriefRow, NewContentBrief};
use crate::models::content::{
    ContentRow, ContentSectionRow, ContentSeriesRow, NewContent, NewContentSection,
    NewContentSeries,
};
use crate::models::outline::{
    ContentOutlineRow, ContentOutlineSectionRow, NewContentOutline, OutlineSectionDraft,
};
use crate::models::user::UserRow;
use crate::store::ContentStore;

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: Vec<UserRow>,
    contents: Vec<ContentRow>,
    content_sections: Vec<ContentSectionRow>,
    briefs: Vec<ContentBriefRow>,
    outlines: Vec<ContentOutlineRow>,
    outline_sections: Vec<ContentOutlineSectionRow>,
    series: Vec<ContentSeriesRow>,
}

impl Tables {
    fn id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct InMemoryContentStore {
    tables: Mutex<Tables>,
    /// 1-based index of the section write in `save_generated_content` that fails.
    fail_section_write: Option<usize>,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose `save_generated_content` fails on the `n`th section row.
    pub fn failing_section_write(n: usize) -> Self {
        Self {
            fail_section_write: Some(n),
            ..Self::default()
        }
    }

    pub fn seed_user(&self, email: &str) -> UserRow {
        let mut t = self.tables.lock().unwrap();
        let user = UserRow {
            id: t.id(),
            email: email.to_string(),
            stripe_customer_id: None,
            stripe_subscription_id: None,
            subscription_status: None,
            subscription_end_date: None,
            lifetime_access: false,
            total_paid: 0.0,
            created_at: Utc::now(),
        };
        t.users.push(user.clone());
        user
    }

    pub fn contents(&self) -> Vec<ContentRow> {
        self.tables.lock().unwrap().contents.clone()
    }

    pub fn briefs(&self) -> Vec<ContentBriefRow> {
        self.tables.lock().unwrap().briefs.clone()
    }

    pub fn outline_count(&self) -> usize {
        self.tables.lock().unwrap().outlines.len()
    }

    pub fn content_section_count(&self) -> usize {
        self.tables.lock().unwrap().content_sections.len()
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn get_user(&self, id: i64) -> Result<Option<UserRow>, AppError> {
        let t = self.tables.lock().unwrap();
        Ok(t.users.iter().find(|u| u.id == id).cloned())
    }

    async fn create_content(&self, content: NewContent) -> Result<ContentRow, AppError> {
        let mut t = self.tables.lock().unwrap();
        let now = Utc::now();
        let row = ContentRow {
            id: t.id(),
            user_id: content.user_id,
            content_series_id: content.content_series_id,
            content_type: content.content_type,
            title: content.title,
            description: content.description,
            text: None,
            custom_data: json!({}),
            created_at: now,
            updated_at: now,
        };
        t.contents.push(row.clone());
        Ok(row)
    }

    async fn get_content(&self, id: i64) -> Result<Option<ContentRow>, AppError> {
        let t = self.tables.lock().unwrap();
        Ok(t.contents.iter().find(|c| c.id == id).cloned())
    }

    async fn save_generated_content(
        &self,
        id: i64,
        title: &str,
        text: &str,
        sections: &[NewContentSection],
    ) -> Result<Option<(ContentRow, Vec<ContentSectionRow>)>, AppError> {
        let mut t = self.tables.lock().unwrap();
        if !t.contents.iter().any(|c| c.id == id) {
            return Ok(None);
        }

        // Stage every row first; nothing is kept if one write fails.
        let now = Utc::now();
        let mut staged = Vec::with_capacity(sections.len());
        for (index, section) in sections.iter().enumerate() {
            if self.fail_section_write == Some(index + 1) {
                return Err(AppError::Database(sqlx::Error::Protocol(format!(
                    "content section write {} failed",
                    index + 1
                ))));
            }
            staged.push(ContentSectionRow {
                id: t.id(),
                content_id: id,
                content_outline_section_id: section.content_outline_section_id,
                order: section.order,
                text: section.text.clone(),
                prompt_context: section.prompt_context.clone(),
                custom_data: json!({}),
                revision_history: json!([]),
                created_at: now,
                updated_at: now,
            });
        }

        let Some(row) = t.contents.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        if row.title.is_none() {
            row.title = Some(title.to_string());
        }
        row.text = Some(text.to_string());
        row.updated_at = now;
        let content = row.clone();

        t.content_sections.extend(staged.iter().cloned());
        Ok(Some((content, staged)))
    }

    async fn create_content_section(
        &self,
        section: NewContentSection,
    ) -> Result<ContentSectionRow, AppError> {
        let mut t = self.tables.lock().unwrap();
        let now = Utc::now();
        let row = ContentSectionRow {
            id: t.id(),
            content_id: section.content_id,
            content_outline_section_id: section.content_outline_section_id,
            order: section.order,
            text: section.text,
            prompt_context: section.prompt_context,
            custom_data: json!({}),
            revision_history: json!([]),
            created_at: now,
            updated_at: now,
        };
        t.content_sections.push(row.clone());
        Ok(row)
    }

    async fn list_content_sections(
        &self,
        content_id: i64,
    ) -> Result<Vec<ContentSectionRow>, AppError> {
        let t = self.tables.lock().unwrap();
        let mut rows: Vec<_> = t
            .content_sections
            .iter()
            .filter(|s| s.content_id == content_id)
            .cloned()
            .collect();
        rows.sort_by_key(|s| (s.order, s.id));
        Ok(rows)
    }

    async fn create_brief(&self, brief: &NewContentBrief) -> Result<ContentBriefRow, AppError> {
        let mut t = self.tables.lock().unwrap();
        let now = Utc::now();
        let row = ContentBriefRow {
            id: t.id(),
            user_id: brief.user_id,
            content_id: brief.content_id,
            title: brief.title.clone(),
            description: brief.description.clone(),
            primary_keyword: brief.primary_keyword.clone(),
            secondary_keywords: brief.secondary_keywords.clone(),
            author_instructions: brief.author_instructions.clone(),
            writing_sample: brief.writing_sample.clone(),
            negative_words: brief.negative_words.clone(),
            suggested_word_count: brief.suggested_word_count,
            product_info: brief.product_info.clone(),
            call_to_action: brief.call_to_action.clone(),
            custom_data: brief.custom_data.clone().unwrap_or_else(|| json!({})),
            created_at: now,
            updated_at: now,
        };
        t.briefs.push(row.clone());
        Ok(row)
    }

    async fn get_brief(&self, id: i64) -> Result<Option<ContentBriefRow>, AppError> {
        let t = self.tables.lock().unwrap();
        Ok(t.briefs.iter().find(|b| b.id == id).cloned())
    }

    async fn create_outline(
        &self,
        outline: NewContentOutline,
        sections: &[OutlineSectionDraft],
    ) -> Result<(ContentOutlineRow, Vec<ContentOutlineSectionRow>), AppError> {
        let mut t = self.tables.lock().unwrap();
        let now = Utc::now();
        let header = ContentOutlineRow {
            id: t.id(),
            user_id: outline.user_id,
            content_brief_id: outline.content_brief_id,
            content_id: outline.content_id,
            title: outline.title,
            description: outline.description,
            custom_data: json!({}),
            created_at: now,
            updated_at: now,
        };
        let mut rows = Vec::with_capacity(sections.len());
        for draft in sections {
            rows.push(ContentOutlineSectionRow {
                id: t.id(),
                content_outline_id: header.id,
                order: draft.order,
                parent_id: None,
                text: draft.text.clone(),
            });
        }
        t.outlines.push(header.clone());
        t.outline_sections.extend(rows.iter().cloned());
        Ok((header, rows))
    }

    async fn get_outline(&self, id: i64) -> Result<Option<ContentOutlineRow>, AppError> {
        let t = self.tables.lock().unwrap();
        Ok(t.outlines.iter().find(|o| o.id == id).cloned())
    }

    async fn list_outline_sections(
        &self,
        outline_id: i64,
    ) -> Result<Vec<ContentOutlineSectionRow>, AppError> {
        let t = self.tables.lock().unwrap();
        let mut rows: Vec<_> = t
            .outline_sections
            .iter()
            .filter(|s| s.content_outline_id == outline_id)
            .cloned()
            .collect();
        rows.sort_by_key(|s| (s.order, s.id));
        Ok(rows)
    }

    async fn get_outline_section(
        &self,
        id: i64,
    ) -> Result<Option<ContentOutlineSectionRow>, AppError> {
        let t = self.tables.lock().unwrap();
        Ok(t.outline_sections.iter().find(|s| s.id == id).cloned())
    }

    async fn create_series(
        &self,
        series: NewContentSeries,
    ) -> Result<ContentSeriesRow, AppError> {
        let mut t = self.tables.lock().unwrap();
        let now = Utc::now();
        let row = ContentSeriesRow {
            id: t.id(),
            user_id: series.user_id,
            title: series.title,
            description: series.description,
            custom_data: series.custom_data.unwrap_or_else(|| json!({})),
            created_at: now,
            updated_at: now,
        };
        t.series.push(row.clone());
        Ok(row)
    }

    async fn get_series(&self, id: i64) -> Result<Option<ContentSeriesRow>, AppError> {
        let t = self.tables.lock().unwrap();
        Ok(t.series.iter().find(|s| s.id == id).cloned())
    }
}
