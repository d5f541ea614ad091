//! HTTP service wrapper.
//!
//! Two near-identical GET endpoints return the learning path with enriched
//! unit images. `/learning-path` may generate new images up to the configured
//! budget; `/learning-path-2` serves a second account cache-only (budget 0),
//! so it never pays for generation.

use std::sync::{Arc, Mutex};

use anyhow::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;
use tower_http::cors::{Any, CorsLayer};

use crate::cache::index::SqliteVecIndex;
use crate::config::VignetteConfig;
use crate::db;
use crate::embedding;
use crate::enrich::Enricher;
use crate::generate::TogetherImageGenerator;
use crate::learning_path::{attach_images, unit_titles, LearningPathClient};

struct AppState {
    enricher: Enricher,
    learning_path: LearningPathClient,
    config: VignetteConfig,
}

/// Open the database, build the embedding provider, and wire the pipeline.
fn setup_state(config: VignetteConfig) -> Result<Arc<AppState>> {
    let db_path = config.resolved_db_path();
    let conn = db::open_database(&db_path, &config.storage.collection)?;
    let conn = Arc::new(Mutex::new(conn));

    let provider = embedding::create_provider(&config.embedding)?;
    let embedder: Arc<dyn embedding::EmbeddingProvider> = Arc::from(provider);
    tracing::info!("embedding provider ready");

    let index = Arc::new(SqliteVecIndex::new(conn, &config.storage.collection));
    let generator = Arc::new(TogetherImageGenerator::new(&config.generation));

    let enricher = Enricher::new(
        embedder,
        index,
        generator,
        config.cache.similarity_threshold,
    );

    let learning_path = LearningPathClient::new(&config.learning_path.base_url);

    Ok(Arc::new(AppState {
        enricher,
        learning_path,
        config,
    }))
}

/// Start the HTTP server.
pub async fn serve(config: VignetteConfig) -> Result<()> {
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let state = setup_state(config)?;

    // The original callers are browser apps served from anywhere.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let router = Router::new()
        .route("/learning-path", get(learning_path_primary))
        .route("/learning-path-2", get(learning_path_secondary))
        .layer(cors)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "vignette listening at http://{bind_addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("failed to listen for ctrl-c");
            tracing::info!("shutting down");
        })
        .await?;

    Ok(())
}

/// Primary account: enrich with the configured generation budget.
async fn learning_path_primary(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let token = state.config.learning_path.session_token.clone();
    let budget = state.config.cache.max_generations;
    enrich_learning_path(&state, &token, budget).await
}

/// Secondary account: cache hits only, never generate.
async fn learning_path_secondary(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let token = state.config.learning_path.session_token_2.clone();
    enrich_learning_path(&state, &token, 0).await
}

async fn enrich_learning_path(
    state: &AppState,
    session_token: &str,
    max_generations: usize,
) -> Result<Json<Value>, (StatusCode, String)> {
    let doc = state
        .learning_path
        .fetch(session_token)
        .await
        .map_err(|err| {
            tracing::error!(error = %err, "learning-path fetch failed");
            (StatusCode::BAD_GATEWAY, err.to_string())
        })?;

    let titles = unit_titles(&doc, state.config.cache.unit_limit).map_err(|err| {
        tracing::error!(error = %err, "malformed learning-path document");
        (StatusCode::BAD_GATEWAY, err.to_string())
    })?;
    let enriched = state.enricher.enrich(&titles, max_generations).await;

    Ok(Json(attach_images(doc, &enriched)))
}
