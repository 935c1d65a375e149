//! HTTP request handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::{json, Value};
use tracing::info;

use crate::features::missing_features;
use crate::inference::ModelDescription;

use super::error::{Result, ServerError};
use super::state::AppState;

/// Score one passenger.
///
/// The body must be a JSON object with every model feature; extra keys are
/// ignored.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(body) = payload?;

    let record = body.as_object().ok_or(ServerError::NotAnObject)?;

    let missing = missing_features(record);
    if !missing.is_empty() {
        return Err(ServerError::MissingFields { missing });
    }

    let percentage = state.predictor.survival_percentage(record)?;
    info!(survival_probability = %percentage, "Scored passenger");

    Ok(Json(json!({ "survival_probability": percentage })))
}

pub async fn describe_model(State(state): State<Arc<AppState>>) -> Json<ModelDescription> {
    Json(state.predictor.describe())
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": state.uptime_secs(),
    }))
}
