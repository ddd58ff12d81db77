pub mod health;
pub mod predict;

use anyhow::{Context, Result};
use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::state::AppState;

/// Served routes, logged at startup.
pub const ENDPOINTS: &[(&str, &str)] = &[("GET", "/api/health"), ("POST", "/api/predict")];

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health::health_handler))
        .route("/api/predict", post(predict::predict_handler))
        .with_state(state)
}

/// Any origin when `allowed` is `None`, otherwise exactly the listed origins.
pub fn cors_layer(allowed: Option<&[String]>) -> Result<CorsLayer> {
    let Some(origins) = allowed else {
        return Ok(CorsLayer::permissive());
    };

    let origins = origins
        .iter()
        .map(|o| HeaderValue::from_str(o).with_context(|| format!("invalid CORS origin '{o}'")))
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any))
}
