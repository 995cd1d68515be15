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
            "error": true,
            "message": "Not found. POST /predict-revenue or /predict-price, or GET /health.",
        })),
    )
}

async fn handle_405() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({
            "error": true,
            "message": "Method not allowed. Prediction endpoints accept POST only.",
        })),
    )
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origin = config
        .cors_origin
        .as_deref()
        .filter(|o| !o.is_empty() && *o != "*")
        .and_then(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %o, "Invalid CORS_ORIGIN, allowing any origin");
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
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/predict-revenue", post(handlers::predict_revenue))
        .route("/predict-revenue/trend", post(handlers::predict_revenue_trend))
        .route("/predict-price", post(handlers::predict_price))
        .route("/health", get(handlers::health_check))
        .fallback(handle_404)
        .method_not_allowed_fallback(handle_405)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
