mod artifacts;
mod config;
mod errors;
mod normalizer;
mod prediction;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::artifacts::{load_artifacts, load_normalizer};
use crate::config::Config;
use crate::prediction::PredictionService;
use crate::routes::{build_router, cors_layer, ENDPOINTS};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={level},tower_http={level}",
                env!("CARGO_CRATE_NAME"),
                level = &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting fake job detector v{}", env!("CARGO_PKG_VERSION"));

    // Artifacts are loaded once; failures leave the service running degraded.
    let normalizer = load_normalizer(&config);
    let artifacts = load_artifacts(&config);
    let predictor = PredictionService::new(normalizer, artifacts);

    let health = predictor.health();
    if health.ready {
        info!("Model and vectorizer loaded; predictions enabled");
    } else {
        warn!(
            "Service degraded (vectorizer loaded: {}, model loaded: {}); predictions will fail",
            health.vectorizer_loaded, health.model_loaded
        );
    }

    let cors = cors_layer(config.cors_allowed_origins.as_deref())
        .context("CORS_ALLOWED_ORIGINS is invalid")?;
    if let Some(origins) = &config.cors_allowed_origins {
        info!("CORS restricted to: {}", origins.join(", "));
    }

    let app = build_router(AppState::new(predictor))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");
    for (method, path) in ENDPOINTS {
        info!("  {method:<4} {path}");
    }

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
