//! API route definitions

use std::sync::Arc;
use axum::{
    http::{HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::{handlers, state::AppState, ServerConfig};

async fn handle_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Not found. Send passengers to POST /predict.",
        })),
    )
}

async fn handle_405() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({
            "error": "Method not allowed.",
        })),
    )
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origin = config
        .cors_origin
        .as_deref()
        .filter(|origin| *origin != "*")
        .and_then(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Invalid CORS_ORIGIN, allowing any origin");
                None
            }
        });

    let cors = match origin {
        Some(value) => CorsLayer::new().allow_origin(value),
        None => CorsLayer::new().allow_origin(Any),
    };

    cors.allow_methods(Any).allow_headers(Any)
}

/// Create the main application router
pub fn create_router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    Router::new()
        .route("/predict", post(handlers::predict))
        .route("/model", get(handlers::describe_model))
        .route("/health", get(handlers::health_check))
        .fallback(handle_404)
        .method_not_allowed_fallback(handle_405)
        .with_state(state)
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
}
