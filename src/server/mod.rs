//! Survival scoring server
//!
//! Trains the model once at startup, then serves `POST /predict` plus
//! health and model-description endpoints.

mod api;
mod error;
mod handlers;
mod state;

pub use api::create_router;
pub use error::ServerError;
pub use state::AppState;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::training::{Trainer, TrainingConfig};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// CSV the model is trained on at startup
    pub training_data: PathBuf,
    /// Allowed CORS origin; `None` or `*` allows any origin
    pub cors_origin: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            training_data: Self::resolve_training_data(),
            cors_origin: std::env::var("CORS_ORIGIN").ok().filter(|o| !o.is_empty()),
        }
    }
}

impl ServerConfig {
    /// Resolve the training CSV by checking `TRAINING_DATA`, then the working
    /// directory, then the crate directory.
    pub fn resolve_training_data() -> PathBuf {
        if let Ok(path) = std::env::var("TRAINING_DATA") {
            return PathBuf::from(path);
        }

        let candidates = [
            PathBuf::from("data/train.csv"),
            PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/train.csv"),
        ];

        for candidate in &candidates {
            if candidate.exists() {
                return candidate.clone();
            }
        }

        // Return default relative path as last resort
        PathBuf::from("data/train.csv")
    }
}

/// Train the model, then serve until ctrl+c
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    info!(training_data = %config.training_data.display(), "Training survival model");

    let training_data = config.training_data.clone();
    let predictor = tokio::task::spawn_blocking(move || {
        Trainer::new(TrainingConfig::default()).train_from_csv(&training_data)
    })
    .await??;

    let state = Arc::new(AppState::new(config.clone(), predictor));
    let start_time = state.started_at;
    let app = create_router(state, &config);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        address = %addr,
        pid = std::process::id(),
        started_at = %start_time.to_rfc3339(),
        "Server listening and ready to accept connections"
    );
    info!(url = %format!("http://{}/predict", addr), "Prediction endpoint available");

    let shutdown_signal = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for ctrl+c");
            std::future::pending::<()>().await;
        }
        let uptime = chrono::Utc::now().signed_duration_since(start_time);
        info!(
            uptime_secs = uptime.num_seconds(),
            "Shutdown signal received, stopping server gracefully"
        );
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        if std::env::var("API_PORT").is_err() {
            assert_eq!(config.port, 8080);
        }
        assert!(config.training_data.ends_with("train.csv") || std::env::var("TRAINING_DATA").is_ok());
    }
}
