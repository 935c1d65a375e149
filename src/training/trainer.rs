//! Startup training run: load, impute, encode, split, fit

use std::path::Path;
use std::time::Instant;

use chrono::Utc;
use ndarray::{Array1, Array2, Axis};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, SurvivalError};
use crate::features::{CATEGORICAL_FEATURES, FEATURES, TARGET};
use crate::inference::SurvivalPredictor;
use crate::preprocessing::{CategoricalEncoders, ImputeStrategy, Imputer};
use crate::utils::DataLoader;

use super::{train_test_split, LogisticRegression, TrainingConfig};

/// Outcome of a training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub n_train: usize,
    pub n_validation: usize,
    pub train_accuracy: f64,
    pub validation_accuracy: f64,
    pub n_iter: usize,
    pub converged: bool,
    pub trained_at: String,
    pub training_time_ms: u64,
}

/// Builds a [`SurvivalPredictor`] from passenger data
pub struct Trainer {
    config: TrainingConfig,
}

impl Default for Trainer {
    fn default() -> Self {
        Self::new(TrainingConfig::default())
    }
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    /// Load the CSV at `path` and train on it
    pub fn train_from_csv(&self, path: &Path) -> Result<SurvivalPredictor> {
        let df = DataLoader::new().load_csv(path)?;
        self.train(&df)
    }

    /// Train on an in-memory frame holding the feature and target columns
    pub fn train(&self, df: &DataFrame) -> Result<SurvivalPredictor> {
        let start = Instant::now();

        let mut required: Vec<&str> = FEATURES.to_vec();
        required.push(TARGET);
        DataLoader::require_columns(df, &required)?;
        if df.height() < 2 {
            return Err(SurvivalError::TrainingError(format!(
                "need at least 2 passengers to train, got {}",
                df.height()
            )));
        }

        let mut age_imputer = Imputer::new(ImputeStrategy::Median);
        let df = age_imputer.fit_transform(df, &["Age"])?;
        let mut embarked_imputer = Imputer::new(ImputeStrategy::MostFrequent);
        let df = embarked_imputer.fit_transform(&df, &["Embarked"])?;

        let mut fill_values = age_imputer.fill_values().clone();
        fill_values.extend(embarked_imputer.fill_values().clone());
        info!(fill_values = ?fill_values, "Imputed missing values");

        let mut encoders = CategoricalEncoders::new();
        let df = encoders.fit_transform(&df, &CATEGORICAL_FEATURES)?;
        info!(classes = ?encoders.classes(), "Encoded categorical features");

        let x = feature_matrix(&df)?;
        let y = Array1::from(column_values(&df, TARGET)?);

        let split = train_test_split(x.nrows(), self.config.test_size, self.config.random_state)?;
        let x_train = x.select(Axis(0), &split.train_indices);
        let y_train = y.select(Axis(0), &split.train_indices);
        let x_val = x.select(Axis(0), &split.test_indices);
        let y_val = y.select(Axis(0), &split.test_indices);

        let mut model = LogisticRegression::new()
            .with_c(self.config.c)
            .with_max_iter(self.config.max_iter)
            .with_tol(self.config.tol);
        model.fit(&x_train, &y_train)?;

        let summary = TrainingSummary {
            n_train: x_train.nrows(),
            n_validation: x_val.nrows(),
            train_accuracy: model.score(&x_train, &y_train)?,
            validation_accuracy: model.score(&x_val, &y_val)?,
            n_iter: model.n_iter,
            converged: model.converged,
            trained_at: Utc::now().to_rfc3339(),
            training_time_ms: start.elapsed().as_millis() as u64,
        };

        info!(
            n_train = summary.n_train,
            n_validation = summary.n_validation,
            train_accuracy = summary.train_accuracy,
            validation_accuracy = summary.validation_accuracy,
            n_iter = summary.n_iter,
            converged = summary.converged,
            training_time_ms = summary.training_time_ms,
            "Trained survival model"
        );

        SurvivalPredictor::new(model, encoders, fill_values, summary)
    }
}

/// Feature columns as f64, in canonical order
fn feature_matrix(df: &DataFrame) -> Result<Array2<f64>> {
    let columns = FEATURES
        .iter()
        .map(|name| column_values(df, name))
        .collect::<Result<Vec<Vec<f64>>>>()?;

    let n_rows = df.height();
    if n_rows == 0 {
        return Err(SurvivalError::DataError("training data has no rows".to_string()));
    }

    Ok(Array2::from_shape_fn((n_rows, columns.len()), |(row, col)| columns[col][row]))
}

fn column_values(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = df
        .column(name)
        .map_err(|_| SurvivalError::FeatureNotFound(name.to_string()))?;
    let values = column.cast(&DataType::Float64)?;

    values
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            value.ok_or_else(|| {
                SurvivalError::DataError(format!("column '{}' has a missing value at row {}", name, row))
            })
        })
        .collect()
}
