//! Immutable scoring context built once by the trainer

use std::collections::BTreeMap;

use ndarray::Array1;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Result, SurvivalError};
use crate::features::{PassengerRecord, RawValue, FEATURES};
use crate::preprocessing::{CategoricalEncoders, ImputeValue};
use crate::training::{LogisticRegression, TrainingSummary};

/// Fitted model plus the encoders it was trained with.
///
/// Read-only after construction, so a single instance can be shared across
/// request handlers without locking.
#[derive(Debug, Clone)]
pub struct SurvivalPredictor {
    model: LogisticRegression,
    encoders: CategoricalEncoders,
    fill_values: BTreeMap<String, ImputeValue>,
    summary: TrainingSummary,
}

/// Serializable view of a trained predictor
#[derive(Debug, Clone, Serialize)]
pub struct ModelDescription {
    pub features: Vec<String>,
    pub coefficients: BTreeMap<String, f64>,
    pub intercept: f64,
    pub encoders: BTreeMap<String, Vec<String>>,
    pub imputation: BTreeMap<String, ImputeValue>,
    pub training: TrainingSummary,
}

impl SurvivalPredictor {
    pub fn new(
        model: LogisticRegression,
        encoders: CategoricalEncoders,
        fill_values: BTreeMap<String, ImputeValue>,
        summary: TrainingSummary,
    ) -> Result<Self> {
        if !model.is_fitted {
            return Err(SurvivalError::ModelNotFitted);
        }
        let n_coefficients = model.coefficients.as_ref().map_or(0, |c| c.len());
        if n_coefficients != FEATURES.len() {
            return Err(SurvivalError::ShapeError {
                expected: format!("{} coefficients", FEATURES.len()),
                actual: format!("{} coefficients", n_coefficients),
            });
        }

        Ok(Self {
            model,
            encoders,
            fill_values,
            summary,
        })
    }

    /// Encode a record into the model's feature vector
    pub fn encode(&self, record: &PassengerRecord) -> Result<Array1<f64>> {
        record
            .iter()
            .map(|(feature, value)| match value {
                RawValue::Numeric(v) => Ok(*v),
                RawValue::Category(label) => self.encoders.encode(feature, label),
            })
            .collect::<Result<Vec<f64>>>()
            .map(Array1::from)
    }

    /// Survival probability in `[0, 1]` for a JSON passenger object
    pub fn predict_proba(&self, record: &Map<String, Value>) -> Result<f64> {
        let record = PassengerRecord::from_json(record)?;
        let row = self.encode(&record)?;
        self.model.predict_proba_row(row.view())
    }

    /// Survival probability rendered as a percentage with three decimals
    pub fn survival_percentage(&self, record: &Map<String, Value>) -> Result<String> {
        self.predict_proba(record).map(format_percentage)
    }

    pub fn summary(&self) -> &TrainingSummary {
        &self.summary
    }

    pub fn describe(&self) -> ModelDescription {
        let coefficients = self
            .model
            .coefficients
            .as_ref()
            .map(|c| {
                FEATURES
                    .iter()
                    .zip(c.iter())
                    .map(|(name, w)| (name.to_string(), *w))
                    .collect()
            })
            .unwrap_or_default();

        ModelDescription {
            features: FEATURES.iter().map(|f| f.to_string()).collect(),
            coefficients,
            intercept: self.model.intercept.unwrap_or(0.0),
            encoders: self.encoders.classes(),
            imputation: self.fill_values.clone(),
            training: self.summary.clone(),
        }
    }
}

/// `0.73215` -> `"73.215%"`
pub fn format_percentage(probability: f64) -> String {
    format!("{:.3}%", probability * 100.0)
}
