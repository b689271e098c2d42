//! HTTP surface: application state, router, and handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Settings;
use crate::error::PipelineError;
use crate::identifiers::PrefixCache;
use crate::{openapi, pipeline};
use crate::trapi::Query;

/// Shared application state, one per process.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub client: reqwest::Client,
    pub prefix_cache: Arc<PrefixCache>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        // The default client carries no request timeout; downstream
        // reasoning calls are allowed to run unbounded.
        Self {
            settings: Arc::new(settings),
            client: reqwest::Client::new(),
            prefix_cache: Arc::new(PrefixCache::new()),
        }
    }
}

/// Build the service router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/query", post(query))
        .route("/openapi.json", get(openapi_document))
        .route("/health", get(health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn openapi_document(State(state): State<AppState>) -> Json<Value> {
    Json(openapi::document(&state.settings))
}

/// Look up answers to the question.
async fn query(
    State(state): State<AppState>,
    Json(request): Json<Query>,
) -> Result<Json<Value>, PipelineError> {
    let response = pipeline::answer_query(
        request,
        &state.client,
        &state.settings,
        &state.prefix_cache,
    )
    .await?;
    Ok(Json(response))
}
