//! Persistence contract for briefs, outlines, contents and their sections.
//!
//! Stages only see `dyn ContentStore`. `PgContentStore` is the production
//! backend; tests run against `memory::InMemoryContentStore`.

use async_trait::async_trait;

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

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgContentStore;

/// Lookups return `Ok(None)` for unknown ids; callers decide whether that is
/// a `NotFound`.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn get_user(&self, id: i64) -> Result<Option<UserRow>, AppError>;

    async fn create_content(&self, content: NewContent) -> Result<ContentRow, AppError>;
    async fn get_content(&self, id: i64) -> Result<Option<ContentRow>, AppError>;
    /// Writes the generated sections and the assembled article body in one
    /// transaction. The title is only filled if unset. Returns `Ok(None)`
    /// without writing anything when the content does not exist.
    async fn save_generated_content(
        &self,
        id: i64,
        title: &str,
        text: &str,
        sections: &[NewContentSection],
    ) -> Result<Option<(ContentRow, Vec<ContentSectionRow>)>, AppError>;

    async fn create_content_section(
        &self,
        section: NewContentSection,
    ) -> Result<ContentSectionRow, AppError>;
    /// Sections of one content in ascending order.
    async fn list_content_sections(
        &self,
        content_id: i64,
    ) -> Result<Vec<ContentSectionRow>, AppError>;

    /// Inserts the brief as given; `content_id` must already be resolved.
    async fn create_brief(&self, brief: &NewContentBrief) -> Result<ContentBriefRow, AppError>;
    async fn get_brief(&self, id: i64) -> Result<Option<ContentBriefRow>, AppError>;

    /// Inserts the outline header and all its sections atomically.
    async fn create_outline(
        &self,
        outline: NewContentOutline,
        sections: &[OutlineSectionDraft],
    ) -> Result<(ContentOutlineRow, Vec<ContentOutlineSectionRow>), AppError>;
    async fn get_outline(&self, id: i64) -> Result<Option<ContentOutlineRow>, AppError>;
    /// Sections of one outline in ascending order.
    async fn list_outline_sections(
        &self,
        outline_id: i64,
    ) -> Result<Vec<ContentOutlineSectionRow>, AppError>;
    async fn get_outline_section(
        &self,
        id: i64,
    ) -> Result<Option<ContentOutlineSectionRow>, AppError>;

    async fn create_series(&self, series: NewContentSeries)
        -> Result<ContentSeriesRow, AppError>;
    async fn get_series(&self, id: i64) -> Result<Option<ContentSeriesRow>, AppError>;
}
