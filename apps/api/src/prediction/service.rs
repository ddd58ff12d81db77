use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::artifacts::{LoadedArtifacts, ModelError, ProbabilityModel, Vectorizer};
use crate::normalizer::Normalizer;
use crate::prediction::confidence::PredictionResult;
use crate::prediction::posting::JobPosting;

#[derive(Debug, Error)]
pub enum PredictionError {
    #[error(
        "Model or Vectorizer not loaded. Please run the notebook to train and save the model. Missing: {}",
        missing.join(", ")
    )]
    ArtifactsMissing { missing: Vec<&'static str> },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("model returned an invalid probability: {0}")]
    InvalidProbability(f64),
}

/// Readiness as established at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub ready: bool,
    pub vectorizer_loaded: bool,
    pub model_loaded: bool,
}

/// Immutable scoring pipeline shared by all requests.
///
/// Either artifact may be absent; the service still constructs so health can be
/// reported, and every prediction fails with `ArtifactsMissing` until restart.
pub struct PredictionService {
    normalizer: Normalizer,
    vectorizer: Option<Arc<dyn Vectorizer>>,
    model: Option<Arc<dyn ProbabilityModel>>,
}

impl PredictionService {
    pub fn new(normalizer: Normalizer, artifacts: LoadedArtifacts) -> Self {
        Self {
            normalizer,
            vectorizer: artifacts.vectorizer,
            model: artifacts.model,
        }
    }

    pub fn health(&self) -> HealthReport {
        let vectorizer_loaded = self.vectorizer.is_some();
        let model_loaded = self.model.is_some();
        HealthReport {
            ready: vectorizer_loaded && model_loaded,
            vectorizer_loaded,
            model_loaded,
        }
    }

    /// Normalized token stream for a posting, exactly as the vectorizer sees it.
    pub fn normalized_text(&self, posting: &JobPosting) -> String {
        self.normalizer.normalize(&posting.combined_text())
    }

    pub async fn predict(&self, posting: &JobPosting) -> Result<PredictionResult, PredictionError> {
        let (Some(vectorizer), Some(model)) = (&self.vectorizer, &self.model) else {
            return Err(PredictionError::ArtifactsMissing {
                missing: self.missing_components(),
            });
        };

        let normalized = self.normalized_text(posting);
        let features = vectorizer.transform(&normalized);
        let fraud_probability = model.predict_proba(&features).await?;

        if !(0.0..=1.0).contains(&fraud_probability) {
            return Err(PredictionError::InvalidProbability(fraud_probability));
        }

        let result = PredictionResult::from_probability(fraud_probability);
        debug!(
            tokens = normalized.split_whitespace().count(),
            features = features.nonzero_count(),
            backend = model.backend(),
            "scored posting as {} ({fraud_probability:.4})",
            result.label
        );
        Ok(result)
    }

    fn missing_components(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.vectorizer.is_none() {
            missing.push("vectorizer");
        }
        if self.model.is_none() {
            missing.push("model");
        }
        missing
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::artifacts::network::DenseNetwork;
    use crate::artifacts::tfidf::{Norm, TfidfArtifact, TfidfVectorizer};
    use crate::artifacts::FeatureVector;
    use crate::prediction::confidence::{ConfidenceLevel, Label, FAKE_MESSAGE, REAL_MESSAGE};
    use async_trait::async_trait;

    /// Model that ignores its input and returns a fixed score.
    pub(crate) struct FixedModel(pub f64);

    #[async_trait]
    impl ProbabilityModel for FixedModel {
        fn input_dimension(&self) -> Option<usize> {
            None
        }

        async fn predict_proba(&self, _features: &FeatureVector) -> Result<f64, ModelError> {
            Ok(self.0)
        }

        fn backend(&self) -> &'static str {
            "fixed"
        }
    }

    /// Small fitted pair: fraud-flavoured terms push the score up, the logo pushes it down.
    pub(crate) fn fitted_artifacts() -> LoadedArtifacts {
        let terms = ["earn", "week", "experience", "needed", "remote", "logo", "yes", "engineer"];
        let vectorizer = TfidfVectorizer::try_from(TfidfArtifact {
            vocabulary: terms
                .iter()
                .enumerate()
                .map(|(i, t)| (t.to_string(), i))
                .collect(),
            idf: vec![1.0; terms.len()],
            ngram_range: (1, 1),
            sublinear_tf: false,
            norm: Some(Norm::L2),
        })
        .expect("fixture vectorizer is valid");
        let model = DenseNetwork::from_json(
            r#"{"layers": [{"kernel": [[3.0], [2.0], [1.0], [2.0], [1.0], [0.0], [-4.0], [-3.0]],
                            "bias": [-0.5], "activation": "sigmoid"}]}"#,
        )
        .expect("fixture network is valid");

        LoadedArtifacts {
            vectorizer: Some(Arc::new(vectorizer)),
            model: Some(Arc::new(model)),
        }
    }

    pub(crate) fn scam_posting(has_company_logo: i64) -> JobPosting {
        JobPosting {
            title: "Remote Data Entry".to_string(),
            description: "<p>Earn $5000/week, no experience needed!!!</p>".to_string(),
            company_profile: String::new(),
            requirements: String::new(),
            benefits: String::new(),
            location: "Remote".to_string(),
            has_company_logo,
        }
    }

    fn with_model(model: impl ProbabilityModel + 'static) -> PredictionService {
        let mut artifacts = fitted_artifacts();
        artifacts.model = Some(Arc::new(model));
        PredictionService::new(Normalizer::default(), artifacts)
    }

    #[test]
    fn test_health_reflects_loaded_artifacts() {
        let none = PredictionService::new(Normalizer::default(), LoadedArtifacts::default());
        assert_eq!(
            none.health(),
            HealthReport {
                ready: false,
                vectorizer_loaded: false,
                model_loaded: false
            }
        );

        let mut partial = fitted_artifacts();
        partial.model = None;
        let partial = PredictionService::new(Normalizer::default(), partial);
        assert!(!partial.health().ready);
        assert!(partial.health().vectorizer_loaded);

        let full = PredictionService::new(Normalizer::default(), fitted_artifacts());
        assert!(full.health().ready);
    }

    #[tokio::test]
    async fn test_missing_artifacts_named_in_error() {
        let service = PredictionService::new(Normalizer::default(), LoadedArtifacts::default());
        let err = service.predict(&scam_posting(0)).await.unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, PredictionError::ArtifactsMissing { .. }));
        assert!(message.contains("not loaded"));
        assert!(message.contains("vectorizer, model"));

        let mut only_vectorizer = fitted_artifacts();
        only_vectorizer.model = None;
        let service = PredictionService::new(Normalizer::default(), only_vectorizer);
        let err = service.predict(&scam_posting(0)).await.unwrap_err();
        assert!(err.to_string().ends_with("Missing: model"));
    }

    #[test]
    fn test_normalized_text_for_scam_posting() {
        let service = PredictionService::new(Normalizer::default(), LoadedArtifacts::default());
        let text = service.normalized_text(&scam_posting(0));
        assert_eq!(text, "remote data entry remote earn week experience needed company logo");
        assert!(text.chars().all(|c| c.is_ascii_lowercase() || c == ' '));
    }

    #[test]
    fn test_logo_flag_changes_normalized_text() {
        let service = PredictionService::new(Normalizer::default(), LoadedArtifacts::default());
        let without = service.normalized_text(&scam_posting(0));
        let with = service.normalized_text(&scam_posting(1));
        assert_ne!(without, with);
        assert!(with.ends_with("company logo yes"));
        assert!(without.ends_with("company logo"));
    }

    #[tokio::test]
    async fn test_scam_posting_scored_fake() {
        let service = PredictionService::new(Normalizer::default(), fitted_artifacts());
        let result = service.predict(&scam_posting(0)).await.unwrap();
        assert_eq!(result.label, Label::Fake);
        assert_eq!(result.message, FAKE_MESSAGE);
        assert!((result.fraud_probability + result.real_probability - 1.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_logo_can_change_prediction() {
        let service = PredictionService::new(Normalizer::default(), fitted_artifacts());
        let without = service.predict(&scam_posting(0)).await.unwrap();
        let with = service.predict(&scam_posting(1)).await.unwrap();
        assert!(with.fraud_probability < without.fraud_probability);
    }

    #[tokio::test]
    async fn test_legitimate_posting_scored_real() {
        let service = PredictionService::new(Normalizer::default(), fitted_artifacts());
        let posting = JobPosting {
            title: "Senior Engineer".to_string(),
            description: "Build <b>backend</b> services.".to_string(),
            company_profile: "Established company since 1998.".to_string(),
            requirements: "5 years as an engineer".to_string(),
            benefits: "Health insurance".to_string(),
            location: "Berlin".to_string(),
            has_company_logo: 1,
        };
        let result = service.predict(&posting).await.unwrap();
        assert_eq!(result.label, Label::Real);
        assert_eq!(result.message, REAL_MESSAGE);
    }

    #[tokio::test]
    async fn test_exact_half_is_real() {
        let result = with_model(FixedModel(0.5)).predict(&scam_posting(0)).await.unwrap();
        assert_eq!(result.label, Label::Real);
        assert_eq!(result.confidence_level, ConfidenceLevel::Low);
    }

    #[tokio::test]
    async fn test_out_of_range_probability_rejected() {
        let err = with_model(FixedModel(1.2)).predict(&scam_posting(0)).await.unwrap_err();
        assert!(matches!(err, PredictionError::InvalidProbability(_)));

        let err = with_model(FixedModel(f64::NAN)).predict(&scam_posting(0)).await.unwrap_err();
        assert!(matches!(err, PredictionError::InvalidProbability(_)));
    }

    #[tokio::test]
    async fn test_model_fault_propagates() {
        let mismatched = DenseNetwork::from_json(
            r#"{"layers": [{"kernel": [[1.0], [1.0]], "bias": [0.0], "activation": "sigmoid"}]}"#,
        )
        .unwrap();
        let err = with_model(mismatched).predict(&scam_posting(0)).await.unwrap_err();
        assert!(matches!(
            err,
            PredictionError::Model(ModelError::DimensionMismatch { .. })
        ));
        assert!(err.to_string().contains("model expects 2"));
    }
}
