//! Remote scoring model that posts feature vectors to a served model.
//!
//! Speaks the common REST prediction shape: `{"instances": [[...]]}` in,
//! `{"predictions": [[p]]}` (or `[p]`) out. Each request is a single attempt.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ArtifactError, FeatureVector, ModelError, ProbabilityModel};

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    instances: [&'a [f32]; 1],
}

#[derive(Debug, Deserialize)]
struct InferenceResponse {
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Prediction {
    Scalar(f64),
    Vector(Vec<f64>),
}

#[derive(Debug, Deserialize)]
struct InferenceError {
    error: String,
}

#[derive(Clone)]
pub struct RemoteModel {
    client: Client,
    endpoint: String,
}

impl RemoteModel {
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self, ArtifactError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl ProbabilityModel for RemoteModel {
    fn input_dimension(&self) -> Option<usize> {
        None
    }

    async fn predict_proba(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        let body = InferenceRequest {
            instances: [features.as_slice()],
        };

        let response = self.client.post(&self.endpoint).json(&body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<InferenceError>(&text)
                .map(|e| e.error)
                .unwrap_or(text);
            return Err(ModelError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: InferenceResponse = response.json().await?;
        let probability = match parsed.predictions.first() {
            Some(Prediction::Scalar(p)) => Some(*p),
            Some(Prediction::Vector(v)) => v.first().copied(),
            None => None,
        }
        .ok_or_else(|| ModelError::Response("no prediction in response".to_string()))?;

        debug!("Remote model at {} scored {probability:.4}", self.endpoint);
        Ok(probability)
    }

    fn backend(&self) -> &'static str {
        "remote"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    /// Serves `app` on an ephemeral port and returns its base URL.
    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn model(base: &str) -> RemoteModel {
        RemoteModel::new(format!("{base}/v1/predict"), Duration::from_secs(5))
            .unwrap()
    }

    #[tokio::test]
    async fn test_nested_prediction_shape() {
        let app = Router::new().route(
            "/v1/predict",
            post(|Json(body): Json<Value>| async move {
                // Echo back the first feature so the request shape is verified too.
                let first = body["instances"][0][0].as_f64().unwrap_or(-1.0);
                Json(json!({ "predictions": [[first]] }))
            }),
        );
        let base = serve(app).await;

        let p = model(&base)
            .predict_proba(&FeatureVector::new(vec![0.25, 0.0]))
            .await
            .unwrap();
        assert!((p - 0.25).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_flat_prediction_shape() {
        let app = Router::new().route(
            "/v1/predict",
            post(|| async { Json(json!({ "predictions": [0.9] })) }),
        );
        let base = serve(app).await;

        let p = model(&base)
            .predict_proba(&FeatureVector::new(vec![1.0]))
            .await
            .unwrap();
        assert!((p - 0.9).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_error_status_surfaces_message() {
        let app = Router::new().route(
            "/v1/predict",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": "instances has wrong shape" })),
                )
            }),
        );
        let base = serve(app).await;

        let err = model(&base)
            .predict_proba(&FeatureVector::new(vec![1.0]))
            .await
            .unwrap_err();
        match err {
            ModelError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "instances has wrong shape");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_empty_predictions_is_error() {
        let app = Router::new().route(
            "/v1/predict",
            post(|| async { Json(json!({ "predictions": [] })) }),
        );
        let base = serve(app).await;

        let err = model(&base)
            .predict_proba(&FeatureVector::new(vec![1.0]))
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::Response(_)));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_http_error() {
        // Bind then drop to obtain a port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = model(&format!("http://{addr}"))
            .predict_proba(&FeatureVector::new(vec![1.0]))
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::Http(_)));
    }
}
