//! Model training module
//!
//! Provides the startup training run for the survival model:
//! - Logistic regression (Newton and gradient-descent solvers)
//! - Seeded train/validation split
//! - The trainer tying imputation, encoding and fitting together

mod config;
pub mod linear_models;
pub mod split;
pub mod trainer;

pub use config::TrainingConfig;
pub use linear_models::{LogisticRegression, LogisticSolver};
pub use split::{train_test_split, TrainTestSplit};
pub use trainer::{Trainer, TrainingSummary};
