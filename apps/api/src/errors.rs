use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::prediction::PredictionError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// Every variant renders as `{"detail": "..."}`.
#[derive(Debug, Error)]
pub enum AppError {
    /// Artifacts were not loaded at startup.
    #[error("{0}")]
    ServiceUnavailable(String),

    /// Normalizing, vectorizing or scoring failed for this request.
    #[error("Prediction failed: {0}")]
    Processing(String),

    #[error("{0}")]
    Validation(String),
}

impl From<PredictionError> for AppError {
    fn from(err: PredictionError) -> Self {
        match err {
            PredictionError::ArtifactsMissing { .. } => AppError::ServiceUnavailable(err.to_string()),
            PredictionError::Model(_) | PredictionError::InvalidProbability(_) => {
                AppError::Processing(err.to_string())
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            AppError::ServiceUnavailable(msg) => {
                tracing::error!("Prediction refused: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
            AppError::Processing(_) => {
                tracing::error!("{self}");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            AppError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::ModelError;

    async fn detail(response: Response) -> (StatusCode, String) {
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        (status, body["detail"].as_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn test_missing_artifacts_map_to_500_with_detail() {
        let err = AppError::from(PredictionError::ArtifactsMissing {
            missing: vec!["model"],
        });
        let (status, detail) = detail(err.into_response()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(detail.starts_with("Model or Vectorizer not loaded"));
        assert!(detail.ends_with("Missing: model"));
    }

    #[tokio::test]
    async fn test_model_fault_is_processing_error() {
        let err = AppError::from(PredictionError::Model(ModelError::DimensionMismatch {
            expected: 5,
            actual: 3,
        }));
        assert!(matches!(err, AppError::Processing(_)));
        let (status, detail) = detail(err.into_response()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(detail.starts_with("Prediction failed:"));
        assert!(detail.contains("model expects 5"));
    }

    #[tokio::test]
    async fn test_validation_is_422() {
        let (status, detail) =
            detail(AppError::Validation("missing field `title`".to_string()).into_response()).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(detail, "missing field `title`");
    }
}
