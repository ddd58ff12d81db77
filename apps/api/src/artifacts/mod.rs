//! Pre-fitted artifacts: the vectorizer and scoring model the service wraps.
//!
//! Both are consumed through capability traits so a file-backed network, a
//! remote inference endpoint or a test double can stand in for one another.
//! Loading never aborts startup: a missing or unreadable artifact is logged and
//! left absent, and the prediction service reports it.

pub mod network;
pub mod remote;
pub mod tfidf;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::normalizer::lemmatizer::{parse_exceptions, parse_lexicon, Lemmatizer};
use crate::normalizer::Normalizer;

use self::network::DenseNetwork;
use self::remote::RemoteModel;
use self::tfidf::TfidfVectorizer;

/// Dense numeric representation of a normalized document.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f32>);

impl FeatureVector {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn nonzero_count(&self) -> usize {
        self.0.iter().filter(|v| **v != 0.0).count()
    }
}

/// Errors raised while loading or validating an artifact.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid artifact: {0}")]
    Invalid(String),

    #[error("failed to build inference client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Errors raised while scoring a feature vector.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("feature vector has {actual} dimensions, model expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("inference request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("inference endpoint returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("unexpected inference response: {0}")]
    Response(String),
}

/// Maps normalized text to a fixed-length feature vector.
/// Terms outside the fitted vocabulary contribute nothing.
pub trait Vectorizer: Send + Sync {
    fn dimension(&self) -> usize;

    fn transform(&self, text: &str) -> FeatureVector;
}

/// Maps a feature vector to the probability that the posting is fraudulent.
#[async_trait]
pub trait ProbabilityModel: Send + Sync {
    /// Input width the model was built for, if it is known locally.
    fn input_dimension(&self) -> Option<usize>;

    async fn predict_proba(&self, features: &FeatureVector) -> Result<f64, ModelError>;

    /// Short label for logs: "dense" | "remote".
    fn backend(&self) -> &'static str;
}

/// The artifacts that could be loaded at startup. Either may be absent.
#[derive(Clone, Default)]
pub struct LoadedArtifacts {
    pub vectorizer: Option<Arc<dyn Vectorizer>>,
    pub model: Option<Arc<dyn ProbabilityModel>>,
}

/// Loads both artifacts as configured. Problems are logged, never returned.
pub fn load_artifacts(config: &Config) -> LoadedArtifacts {
    let vectorizer = load_optional("vectorizer", &config.vectorizer_path, TfidfVectorizer::load)
        .map(|v| {
            info!(
                "Vectorizer ready: {} terms, ngram range {:?}",
                v.dimension(),
                v.ngram_range()
            );
            Arc::new(v) as Arc<dyn Vectorizer>
        });

    let model = match &config.model_endpoint {
        Some(endpoint) => match RemoteModel::new(endpoint.clone(), config.model_timeout) {
            Ok(remote) => {
                info!("Scoring model served remotely at {endpoint}");
                Some(Arc::new(remote) as Arc<dyn ProbabilityModel>)
            }
            Err(e) => {
                error!("Remote scoring model unavailable: {e}");
                None
            }
        },
        None => load_optional("model", &config.model_path, DenseNetwork::load).map(|m| {
            info!(
                "Scoring model ready: {} dense layers, input dimension {}",
                m.layer_count(),
                m.input_dim()
            );
            Arc::new(m) as Arc<dyn ProbabilityModel>
        }),
    };

    if let (Some(v), Some(m)) = (&vectorizer, &model) {
        if let Some(expected) = m.input_dimension() {
            if expected != v.dimension() {
                warn!(
                    "Vectorizer produces {} features but the model expects {expected}; predictions will fail",
                    v.dimension()
                );
            }
        }
    }

    LoadedArtifacts { vectorizer, model }
}

fn load_optional<T>(
    label: &str,
    path: &Path,
    load: impl FnOnce(&Path) -> Result<T, ArtifactError>,
) -> Option<T> {
    if !path.exists() {
        warn!("{label} file '{}' not found; starting without it", path.display());
        return None;
    }
    match load(path) {
        Ok(artifact) => {
            info!("{label} loaded from {}", path.display());
            Some(artifact)
        }
        Err(e) => {
            error!("{label} could not be loaded: {e}");
            None
        }
    }
}

/// Builds the normalizer, attaching whichever linguistic resources are configured.
/// A resource that cannot be read is skipped with a warning.
pub fn load_normalizer(config: &Config) -> Normalizer {
    let mut lemmatizer = Lemmatizer::default();

    if let Some(path) = &config.lemma_exceptions_path {
        match std::fs::read_to_string(path) {
            Ok(contents) => lemmatizer = lemmatizer.with_exceptions(parse_exceptions(&contents)),
            Err(e) => warn!("Lemma exceptions '{}' unreadable: {e}", path.display()),
        }
    }

    if let Some(path) = &config.lemma_lexicon_path {
        match std::fs::read_to_string(path) {
            Ok(contents) => lemmatizer = lemmatizer.with_lexicon(parse_lexicon(&contents)),
            Err(e) => warn!("Lemma lexicon '{}' unreadable: {e}", path.display()),
        }
    }

    if lemmatizer.has_lexicon() {
        info!(
            "Lemmatizer: {} lexicon entries, {} exceptions",
            lemmatizer.lexicon_len(),
            lemmatizer.exception_count()
        );
    } else {
        info!(
            "Lemmatizer: no lexicon configured, using suffix rules ({} exceptions)",
            lemmatizer.exception_count()
        );
    }

    Normalizer::new(lemmatizer)
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let bytes = std::fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    fn test_config(dir: &Path) -> Config {
        Config {
            port: 0,
            rust_log: "info".to_string(),
            vectorizer_path: dir.join("tfidf_vectorizer.json"),
            model_path: dir.join("fake_job_detector_model.json"),
            model_endpoint: None,
            model_timeout: Duration::from_secs(1),
            lemma_lexicon_path: None,
            lemma_exceptions_path: None,
            cors_allowed_origins: None,
        }
    }

    fn write(path: &Path, contents: &str) {
        let mut file = std::fs::File::create(path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
    }

    const VECTORIZER_JSON: &str = r#"{"vocabulary": {"remote": 0, "earn": 1}, "idf": [1.0, 2.0]}"#;
    const MODEL_JSON: &str = r#"{"layers": [{"kernel": [[0.5], [1.5]], "bias": [0.0], "activation": "sigmoid"}]}"#;

    #[test]
    fn test_missing_files_leave_artifacts_absent() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_artifacts(&test_config(dir.path()));
        assert!(loaded.vectorizer.is_none());
        assert!(loaded.model.is_none());
    }

    #[test]
    fn test_valid_files_are_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        write(&config.vectorizer_path, VECTORIZER_JSON);
        write(&config.model_path, MODEL_JSON);

        let loaded = load_artifacts(&config);
        assert_eq!(loaded.vectorizer.as_ref().map(|v| v.dimension()), Some(2));
        let model = loaded.model.expect("model should load");
        assert_eq!(model.input_dimension(), Some(2));
        assert_eq!(model.backend(), "dense");
    }

    #[test]
    fn test_malformed_file_is_treated_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        write(&config.vectorizer_path, "{ not json");
        write(&config.model_path, MODEL_JSON);

        let loaded = load_artifacts(&config);
        assert!(loaded.vectorizer.is_none());
        assert!(loaded.model.is_some());
    }

    #[tokio::test]
    async fn test_endpoint_selects_remote_model() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.model_endpoint = Some("http://127.0.0.1:9/v1/models/fake_job:predict".to_string());

        let loaded = load_artifacts(&config);
        let model = loaded.model.expect("remote model is configured");
        assert_eq!(model.backend(), "remote");
        assert_eq!(model.input_dimension(), None);
    }

    #[test]
    fn test_read_json_reports_path_on_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        write(&path, "[1, 2");
        let err = read_json::<Vec<u32>>(&path).unwrap_err();
        assert!(matches!(err, ArtifactError::Parse { .. }));
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn test_load_normalizer_with_lexicon() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        let lexicon = dir.path().join("nouns.txt");
        write(&lexicon, "job\nclass\n");
        config.lemma_lexicon_path = Some(lexicon);

        let normalizer = load_normalizer(&config);
        assert!(normalizer.lemmatizer().has_lexicon());
        assert_eq!(normalizer.normalize("Jobs classes glasses"), "job class glasses");
    }

    #[test]
    fn test_load_normalizer_unreadable_lexicon_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.lemma_lexicon_path = Some(dir.path().join("missing.txt"));

        let normalizer = load_normalizer(&config);
        assert!(!normalizer.lemmatizer().has_lexicon());
    }

    #[test]
    fn test_feature_vector_nonzero_count() {
        let v = FeatureVector::new(vec![0.0, 0.3, 0.0, 1.0]);
        assert_eq!(v.dimension(), 4);
        assert_eq!(v.nonzero_count(), 2);
    }
}
