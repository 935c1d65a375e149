//! Inference module
//!
//! Scores single passenger records against the model trained at startup.

mod predictor;

pub use predictor::{format_percentage, ModelDescription, SurvivalPredictor};
