pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::content::handlers;
use crate::generation::handlers as generation;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Stored entities
        .route("/api/v1/content-briefs", post(handlers::handle_create_brief))
        .route("/api/v1/content-briefs/:id", get(handlers::handle_get_brief))
        .route("/api/v1/contents", post(handlers::handle_create_content))
        .route("/api/v1/contents/:id", get(handlers::handle_get_content))
        .route(
            "/api/v1/content-outlines/:id",
            get(handlers::handle_get_outline),
        )
        .route(
            "/api/v1/content-outline-sections/:id",
            get(handlers::handle_get_outline_section),
        )
        .route("/api/v1/content-series", post(handlers::handle_create_series))
        .route(
            "/api/v1/content-series/:id",
            get(handlers::handle_get_series),
        )
        .route("/api/v1/users/:id", get(handlers::handle_get_user))
        // Generation
        .route("/api/v1/generate", post(generation::handle_generate))
        .route(
            "/api/v1/content-sections/new",
            post(generation::handle_new_section),
        )
        .with_state(state)
}
