mod config;
mod content;
mod db;
mod errors;
mod generation;
mod llm_client;
mod models;
mod routes;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, OutlineStrategy};
use crate::db::create_pool;
use crate::generation::orchestrator::{BlogPostPipeline, ContentOrchestrator, BLOG_POST};
use crate::generation::outline::{FixtureOutlineGenerator, LlmOutlineGenerator, OutlineGenerator};
use crate::generation::section::{LlmSectionWriter, SectionGenerator};
use crate::llm_client::{LlmBackend, LlmClient, RetryPolicy};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{ContentStore, PgContentStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Groucho API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url, config.db_max_connections).await?;
    let store: Arc<dyn ContentStore> = Arc::new(PgContentStore::new(db));

    // Initialize LLM client
    let client = LlmClient::new(
        config.openai_api_key.clone(),
        config.openai_model.clone(),
        config.llm_timeout,
    )
    .context("Failed to build LLM HTTP client")?;
    info!("LLM client initialized (model: {})", client.model());
    let llm: Arc<dyn LlmBackend> = Arc::new(client);
    let policy = RetryPolicy::new(config.llm_max_retries, config.llm_timeout);

    // Pipeline stages
    let outlines: Arc<dyn OutlineGenerator> = match config.outline_strategy {
        OutlineStrategy::Llm => Arc::new(LlmOutlineGenerator::new(llm.clone(), policy)),
        OutlineStrategy::Fixture => Arc::new(FixtureOutlineGenerator::new()),
    };
    let section_writer: Arc<dyn SectionGenerator> =
        Arc::new(LlmSectionWriter::new(llm.clone(), policy));
    info!(
        "Outline strategy: {}, LLM retries: {}, timeout: {}s",
        outlines.name(),
        policy.max_retries,
        policy.timeout.as_secs()
    );

    let orchestrator = ContentOrchestrator::new().register(
        BLOG_POST,
        Arc::new(BlogPostPipeline::new(
            store.clone(),
            outlines,
            section_writer.clone(),
        )),
    );
    info!("Registered content types: {:?}", orchestrator.supported_types());

    // Build app state
    let state = AppState {
        store,
        orchestrator: Arc::new(orchestrator),
        section_writer,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict to FRONTEND_URL once the web client is deployed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
