use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub ready: bool,
    pub model_loaded: bool,
    pub vectorizer_loaded: bool,
}

/// GET /api/health
/// The process is up whenever this answers; `ready` says whether predictions can succeed.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let report = state.predictor.health();
    Json(HealthResponse {
        status: "healthy",
        ready: report.ready,
        model_loaded: report.model_loaded,
        vectorizer_loaded: report.vectorizer_loaded,
    })
}
