use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable has a default, so a bare environment starts the service
/// (in degraded mode if the artifacts are not where the defaults point).
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub vectorizer_path: PathBuf,
    pub model_path: PathBuf,
    /// When set, the scoring model is served remotely and `model_path` is ignored.
    pub model_endpoint: Option<String>,
    pub model_timeout: Duration,
    pub lemma_lexicon_path: Option<PathBuf>,
    pub lemma_exceptions_path: Option<PathBuf>,
    /// `None` means any origin is allowed.
    pub cors_allowed_origins: Option<Vec<String>>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            vectorizer_path: env_path("VECTORIZER_PATH")
                .unwrap_or_else(|| PathBuf::from("tfidf_vectorizer.json")),
            model_path: env_path("MODEL_PATH")
                .unwrap_or_else(|| PathBuf::from("fake_job_detector_model.json")),
            model_endpoint: optional_env("MODEL_ENDPOINT"),
            model_timeout: Duration::from_secs(
                std::env::var("MODEL_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse::<u64>()
                    .context("MODEL_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            lemma_lexicon_path: env_path("LEMMA_LEXICON_PATH"),
            lemma_exceptions_path: env_path("LEMMA_EXCEPTIONS_PATH"),
            cors_allowed_origins: optional_env("CORS_ALLOWED_ORIGINS").map(|raw| parse_origins(&raw)),
        })
    }
}

/// Reads a variable, treating an empty or whitespace-only value as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_path(key: &str) -> Option<PathBuf> {
    optional_env(key).map(PathBuf::from)
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins_trims_and_skips_empty() {
        let origins = parse_origins(" https://a.example , ,https://b.example,");
        assert_eq!(origins, vec!["https://a.example", "https://b.example"]);
    }

    #[test]
    fn test_parse_origins_single() {
        assert_eq!(parse_origins("http://localhost:5173"), vec!["http://localhost:5173"]);
    }
}
