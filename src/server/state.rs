//! Application state management

use chrono::{DateTime, Utc};

use crate::inference::SurvivalPredictor;

use super::ServerConfig;

/// Application state shared across handlers.
///
/// Everything here is fixed once the server starts; handlers only read it.
pub struct AppState {
    pub config: ServerConfig,
    pub predictor: SurvivalPredictor,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: ServerConfig, predictor: SurvivalPredictor) -> Self {
        Self {
            config,
            predictor,
            started_at: Utc::now(),
        }
    }

    pub fn uptime_secs(&self) -> i64 {
        Utc::now().signed_duration_since(self.started_at).num_seconds()
    }
}
