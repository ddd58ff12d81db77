use std::sync::Arc;

use crate::prediction::PredictionService;

/// Shared application state injected into all route handlers via Axum extractors.
/// Built once before the listener binds and never mutated afterwards.
#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<PredictionService>,
}

impl AppState {
    pub fn new(predictor: PredictionService) -> Self {
        Self {
            predictor: Arc::new(predictor),
        }
    }
}
