pub mod error;
pub mod mongo;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use biblio_core::{distinct_values, search, Facet, QueryExecutor, ResultPage};
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use mongo::MongoExecutor;

#[derive(Clone)]
pub struct AppState {
    pub executor: Arc<dyn QueryExecutor>,
}

pub fn build_app(executor: Arc<dyn QueryExecutor>) -> Router {
    Router::new()
        .route("/", get(|| async { "API is running!" }))
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/get_sources", get(sources_handler))
        .route("/get_types", get(types_handler))
        .route("/get_publishers", get(publishers_handler))
        .route("/get_city", get(cities_handler))
        .with_state(AppState { executor })
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

// CORS_ALLOW_ORIGIN is a comma-separated origin list; unset or unparseable allows any.
fn cors_layer() -> CorsLayer {
    let origins: Vec<_> = std::env::var("CORS_ALLOW_ORIGIN")
        .map(|val| val.split(',').filter_map(|s| s.trim().parse().ok()).collect())
        .unwrap_or_default();
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(origins))
    }
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ResultPage>, ApiError> {
    tracing::debug!(?params, "search request");
    search(state.executor.as_ref(), &params).await.map(Json).map_err(ApiError::search)
}

async fn facet_values(state: &AppState, facet: Facet) -> Result<Json<Vec<String>>, ApiError> {
    distinct_values(state.executor.as_ref(), facet)
        .await
        .map(Json)
        .map_err(|err| ApiError::facet(facet, err))
}

pub async fn sources_handler(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    facet_values(&state, Facet::Source).await
}

pub async fn types_handler(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    facet_values(&state, Facet::Type).await
}

pub async fn publishers_handler(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    facet_values(&state, Facet::Publisher).await
}

pub async fn cities_handler(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    facet_values(&state, Facet::City).await
}
