//! Passenger feature schema and request record parsing

use serde_json::{Map, Value};

use crate::error::{Result, SurvivalError};

/// Model input features in canonical column order
pub const FEATURES: [&str; 7] = ["Pclass", "Sex", "Age", "SibSp", "Parch", "Fare", "Embarked"];

/// Features that go through a label encoder before scoring
pub const CATEGORICAL_FEATURES: [&str; 2] = ["Sex", "Embarked"];

/// Binary target column of the training data
pub const TARGET: &str = "Survived";

pub fn is_categorical(feature: &str) -> bool {
    CATEGORICAL_FEATURES.contains(&feature)
}

/// Required features absent from `record`, in canonical order
pub fn missing_features(record: &Map<String, Value>) -> Vec<&'static str> {
    FEATURES
        .iter()
        .copied()
        .filter(|f| !record.contains_key(*f))
        .collect()
}

/// A single feature value before categorical encoding
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Numeric(f64),
    Category(String),
}

/// One passenger to score, holding exactly the seven model features.
///
/// Keys outside [`FEATURES`] are dropped on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct PassengerRecord {
    values: Vec<RawValue>,
}

impl PassengerRecord {
    /// Build a record from a JSON object.
    ///
    /// Numeric features accept numbers, booleans and numeric strings such as
    /// `"29"` (what an HTML form submits). Categorical features are turned into
    /// their label text; whether that label is known is decided by the encoder.
    pub fn from_json(record: &Map<String, Value>) -> Result<Self> {
        let mut values = Vec::with_capacity(FEATURES.len());

        for feature in FEATURES {
            let value = record
                .get(feature)
                .ok_or_else(|| SurvivalError::FeatureNotFound(feature.to_string()))?;

            let raw = if is_categorical(feature) {
                RawValue::Category(category_label(value))
            } else {
                RawValue::Numeric(numeric_value(feature, value)?)
            };
            values.push(raw);
        }

        Ok(Self { values })
    }

    pub fn get(&self, feature: &str) -> Option<&RawValue> {
        FEATURES
            .iter()
            .position(|f| *f == feature)
            .and_then(|idx| self.values.get(idx))
    }

    /// Features paired with their values, in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &RawValue)> {
        FEATURES.iter().copied().zip(self.values.iter())
    }
}

fn numeric_value(feature: &str, value: &Value) -> Result<f64> {
    let invalid = |reason: String| SurvivalError::InvalidFeatureValue {
        feature: feature.to_string(),
        reason,
    };

    let parsed = match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| invalid(format!("number {} is not representable as f64", n)))?,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| invalid(format!("could not convert string to float: '{}'", s)))?,
        Value::Null => return Err(invalid("value is null".to_string())),
        Value::Array(_) => return Err(invalid("expected a number, got an array".to_string())),
        Value::Object(_) => return Err(invalid("expected a number, got an object".to_string())),
    };

    if !parsed.is_finite() {
        return Err(invalid(format!("value must be finite, got {}", parsed)));
    }

    Ok(parsed)
}

fn category_label(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Null => "None".to_string(),
        other => other.to_string(),
    }
}
