use std::sync::Arc;

use crate::generation::orchestrator::ContentOrchestrator;
use crate::generation::section::SectionGenerator;
use crate::store::ContentStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ContentStore>,
    /// Registry of content-type pipelines. Only `blog_post` today.
    pub orchestrator: Arc<ContentOrchestrator>,
    /// Same writer the blog post pipeline uses, exposed for one-off sections.
    pub section_writer: Arc<dyn SectionGenerator>,
}
