//! Error types for the server

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::error::SurvivalError;
use crate::features::FEATURES;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("{}", .0.body_text())]
    InvalidJson(#[from] JsonRejection),

    #[error("Request body must be a JSON object")]
    NotAnObject,

    #[error("Missing fields: {missing:?}")]
    MissingFields { missing: Vec<&'static str> },

    #[error("Error processing the data: {0}")]
    Processing(#[from] SurvivalError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ServerError::InvalidJson(rejection) => {
                (rejection.status(), json!({ "error": rejection.body_text() }))
            }
            ServerError::NotAnObject => (StatusCode::BAD_REQUEST, json!({ "error": self.to_string() })),
            ServerError::MissingFields { missing } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": self.to_string(),
                    "missing_features": missing,
                    "required_features": FEATURES,
                }),
            ),
            ServerError::Processing(e) => {
                tracing::warn!(detail = %e, "Failed to score passenger");
                (
                    StatusCode::BAD_REQUEST,
                    json!({
                        "error": "Error processing the data",
                        "details": e.to_string(),
                    }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
