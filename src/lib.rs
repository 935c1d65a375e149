//! Titanic Survival - logistic-regression survival scoring service
//!
//! This crate trains a logistic regression on the Kaggle Titanic passenger
//! list and serves single-passenger survival probabilities over HTTP:
//! - Loading the training CSV and checking its schema
//! - Median / most-frequent imputation and label encoding
//! - Regularized logistic regression with a seeded holdout split
//! - A `POST /predict` endpoint plus health and model introspection
//!
//! # Modules
//!
//! ## Core
//! - [`features`] - The seven model features and request-record parsing
//! - [`preprocessing`] - Imputation and categorical encoding
//! - [`training`] - Train/test split, logistic regression, training pipeline
//! - [`inference`] - The fitted predictor used to score requests
//!
//! ## Services
//! - [`server`] - HTTP server with the prediction API
//! - [`cli`] - Command-line interface
//!
//! ## Utilities
//! - [`utils`] - CSV loading

// Core error handling
pub mod error;

// Core ML modules
pub mod features;
pub mod preprocessing;
pub mod training;
pub mod inference;

// Services
pub mod server;
pub mod cli;

// Utilities
pub mod utils;

pub use error::{Result, SurvivalError};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Result, SurvivalError};
    pub use crate::features::{PassengerRecord, FEATURES};
    pub use crate::preprocessing::{CategoricalEncoders, ImputeStrategy, Imputer, LabelEncoder};
    pub use crate::training::{LogisticRegression, Trainer, TrainingConfig};
    pub use crate::inference::SurvivalPredictor;
    pub use crate::utils::DataLoader;
}
