//! Error types for the survival scoring service

use thiserror::Error;

/// Result type alias for survival model operations
pub type Result<T> = std::result::Result<T, SurvivalError>;

/// Main error type for training and scoring
#[derive(Error, Debug)]
pub enum SurvivalError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Encoding failed for column '{column}': unseen label '{value}'")]
    UnseenCategory { column: String, value: String },

    #[error("Invalid value for feature '{feature}': {reason}")]
    InvalidFeatureValue { feature: String, reason: String },

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<polars::error::PolarsError> for SurvivalError {
    fn from(err: polars::error::PolarsError) -> Self {
        SurvivalError::DataError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for SurvivalError {
    fn from(err: ndarray::ShapeError) -> Self {
        SurvivalError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
