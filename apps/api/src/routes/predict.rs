use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::prediction::confidence::to_percent;
use crate::prediction::{ConfidenceLevel, JobPosting, Label, PredictionResult};
use crate::state::AppState;

/// Wire form of a prediction; probabilities are percentages with two decimals.
#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub prediction: Label,
    pub is_fake: bool,
    pub fraud_probability: f64,
    pub real_probability: f64,
    pub confidence: f64,
    pub confidence_level: ConfidenceLevel,
    pub message: &'static str,
}

impl From<PredictionResult> for PredictionResponse {
    fn from(result: PredictionResult) -> Self {
        Self {
            prediction: result.label,
            is_fake: result.is_fake(),
            fraud_probability: to_percent(result.fraud_probability),
            real_probability: to_percent(result.real_probability),
            confidence: to_percent(result.confidence),
            confidence_level: result.confidence_level,
            message: result.message,
        }
    }
}

/// POST /api/predict
pub async fn predict_handler(
    State(state): State<AppState>,
    body: Result<Json<JobPosting>, JsonRejection>,
) -> Result<Json<PredictionResponse>, AppError> {
    let Json(posting) = body?;
    let result = state.predictor.predict(&posting).await?;
    Ok(Json(result.into()))
}
