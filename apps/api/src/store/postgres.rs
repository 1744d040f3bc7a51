use async_trait::async_trait;
use serde_json::{json, Value};
use sqlx::PgPool;

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

#[derive(Clone)]
pub struct PgContentStore {
    pool: PgPool,
}

impl PgContentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn object_or_empty(value: &Option<Value>) -> Value {
    value.clone().unwrap_or_else(|| json!({}))
}

#[async_trait]
impl ContentStore for PgContentStore {
    async fn get_user(&self, id: i64) -> Result<Option<UserRow>, AppError> {
        let user = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn create_content(&self, content: NewContent) -> Result<ContentRow, AppError> {
        let row = sqlx::query_as::<_, ContentRow>(
            r#"
            INSERT INTO contents (user_id, content_series_id, type, title, description)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(content.user_id)
        .bind(content.content_series_id)
        .bind(&content.content_type)
        .bind(&content.title)
        .bind(&content.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get_content(&self, id: i64) -> Result<Option<ContentRow>, AppError> {
        let row = sqlx::query_as::<_, ContentRow>("SELECT * FROM contents WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn save_generated_content(
        &self,
        id: i64,
        title: &str,
        text: &str,
        sections: &[NewContentSection],
    ) -> Result<Option<(ContentRow, Vec<ContentSectionRow>)>, AppError> {
        let mut tx = self.pool.begin().await?;

        let Some(content) = sqlx::query_as::<_, ContentRow>(
            r#"
            UPDATE contents
            SET title = COALESCE(title, $2), text = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(text)
        .fetch_optional(&mut *tx)
        .await?
        else {
            tx.rollback().await?;
            return Ok(None);
        };

        let mut rows = Vec::with_capacity(sections.len());
        for section in sections {
            let row = sqlx::query_as::<_, ContentSectionRow>(
                r#"
                INSERT INTO content_sections
                    (content_id, content_outline_section_id, position, text, prompt_context)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING *
                "#,
            )
            .bind(id)
            .bind(section.content_outline_section_id)
            .bind(section.order)
            .bind(&section.text)
            .bind(&section.prompt_context)
            .fetch_one(&mut *tx)
            .await?;
            rows.push(row);
        }

        tx.commit().await?;
        Ok(Some((content, rows)))
    }

    async fn create_content_section(
        &self,
        section: NewContentSection,
    ) -> Result<ContentSectionRow, AppError> {
        let row = sqlx::query_as::<_, ContentSectionRow>(
            r#"
            INSERT INTO content_sections
                (content_id, content_outline_section_id, position, text, prompt_context)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(section.content_id)
        .bind(section.content_outline_section_id)
        .bind(section.order)
        .bind(&section.text)
        .bind(&section.prompt_context)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_content_sections(
        &self,
        content_id: i64,
    ) -> Result<Vec<ContentSectionRow>, AppError> {
        let rows = sqlx::query_as::<_, ContentSectionRow>(
            "SELECT * FROM content_sections WHERE content_id = $1 ORDER BY position, id",
        )
        .bind(content_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn create_brief(&self, brief: &NewContentBrief) -> Result<ContentBriefRow, AppError> {
        let row = sqlx::query_as::<_, ContentBriefRow>(
            r#"
            INSERT INTO content_briefs
                (user_id, content_id, title, description, primary_keyword,
                 secondary_keywords, author_instructions, writing_sample, negative_words,
                 suggested_word_count, product_info, call_to_action, custom_data)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(brief.user_id)
        .bind(brief.content_id)
        .bind(&brief.title)
        .bind(&brief.description)
        .bind(&brief.primary_keyword)
        .bind(&brief.secondary_keywords)
        .bind(&brief.author_instructions)
        .bind(&brief.writing_sample)
        .bind(&brief.negative_words)
        .bind(brief.suggested_word_count)
        .bind(&brief.product_info)
        .bind(&brief.call_to_action)
        .bind(object_or_empty(&brief.custom_data))
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get_brief(&self, id: i64) -> Result<Option<ContentBriefRow>, AppError> {
        let row =
            sqlx::query_as::<_, ContentBriefRow>("SELECT * FROM content_briefs WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row)
    }

    async fn create_outline(
        &self,
        outline: NewContentOutline,
        sections: &[OutlineSectionDraft],
    ) -> Result<(ContentOutlineRow, Vec<ContentOutlineSectionRow>), AppError> {
        let mut tx = self.pool.begin().await?;

        let header = sqlx::query_as::<_, ContentOutlineRow>(
            r#"
            INSERT INTO content_outlines
                (user_id, content_brief_id, content_id, title, description)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(outline.user_id)
        .bind(outline.content_brief_id)
        .bind(outline.content_id)
        .bind(&outline.title)
        .bind(&outline.description)
        .fetch_one(&mut *tx)
        .await?;

        let mut rows = Vec::with_capacity(sections.len());
        for draft in sections {
            let row = sqlx::query_as::<_, ContentOutlineSectionRow>(
                r#"
                INSERT INTO content_outline_sections (content_outline_id, position, text)
                VALUES ($1, $2, $3)
                RETURNING *
                "#,
            )
            .bind(header.id)
            .bind(draft.order)
            .bind(&draft.text)
            .fetch_one(&mut *tx)
            .await?;
            rows.push(row);
        }

        tx.commit().await?;
        Ok((header, rows))
    }

    async fn get_outline(&self, id: i64) -> Result<Option<ContentOutlineRow>, AppError> {
        let row = sqlx::query_as::<_, ContentOutlineRow>(
            "SELECT * FROM content_outlines WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_outline_sections(
        &self,
        outline_id: i64,
    ) -> Result<Vec<ContentOutlineSectionRow>, AppError> {
        let rows = sqlx::query_as::<_, ContentOutlineSectionRow>(
            r#"
            SELECT * FROM content_outline_sections
            WHERE content_outline_id = $1
            ORDER BY position, id
            "#,
        )
        .bind(outline_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_outline_section(
        &self,
        id: i64,
    ) -> Result<Option<ContentOutlineSectionRow>, AppError> {
        let row = sqlx::query_as::<_, ContentOutlineSectionRow>(
            "SELECT * FROM content_outline_sections WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn create_series(
        &self,
        series: NewContentSeries,
    ) -> Result<ContentSeriesRow, AppError> {
        let row = sqlx::query_as::<_, ContentSeriesRow>(
            r#"
            INSERT INTO content_series (user_id, title, description, custom_data)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(series.user_id)
        .bind(&series.title)
        .bind(&series.description)
        .bind(object_or_empty(&series.custom_data))
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get_series(&self, id: i64) -> Result<Option<ContentSeriesRow>, AppError> {
        let row =
            sqlx::query_as::<_, ContentSeriesRow>("SELECT * FROM content_series WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row)
    }
}
