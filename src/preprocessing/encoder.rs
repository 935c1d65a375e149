//! Label encoding for categorical columns

use crate::error::{Result, SurvivalError};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Maps each distinct label of one column to an integer code.
///
/// Classes are kept sorted, so the code of a label is its rank among the
/// labels seen during fitting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
    mapping: HashMap<String, usize>,
    is_fitted: bool,
}

impl LabelEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit on an iterator of labels
    pub fn fit_labels<I, S>(&mut self, labels: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let distinct: BTreeSet<String> = labels
            .into_iter()
            .map(|label| label.as_ref().to_string())
            .collect();

        if distinct.is_empty() {
            return Err(SurvivalError::DataError(
                "cannot fit a label encoder on an empty column".to_string(),
            ));
        }

        self.classes = distinct.into_iter().collect();
        self.mapping = self
            .classes
            .iter()
            .enumerate()
            .map(|(code, class)| (class.clone(), code))
            .collect();
        self.is_fitted = true;

        Ok(self)
    }

    /// Fit on a string column. Nulls must be imputed beforehand.
    pub fn fit(&mut self, series: &Series) -> Result<&mut Self> {
        let labels = string_values(series)?;
        self.fit_labels(labels)
    }

    /// Encode a single label
    pub fn transform_label(&self, column: &str, label: &str) -> Result<usize> {
        if !self.is_fitted {
            return Err(SurvivalError::ModelNotFitted);
        }

        self.mapping
            .get(label)
            .copied()
            .ok_or_else(|| SurvivalError::UnseenCategory {
                column: column.to_string(),
                value: label.to_string(),
            })
    }

    /// Encode a string column into a Float64 column of the same name
    pub fn transform(&self, series: &Series) -> Result<Series> {
        let column = series.name().to_string();
        let codes = string_values(series)?
            .iter()
            .map(|label| self.transform_label(&column, label).map(|code| code as f64))
            .collect::<Result<Vec<f64>>>()?;

        Ok(Series::new(column.into(), codes))
    }

    pub fn fit_transform(&mut self, series: &Series) -> Result<Series> {
        self.fit(series)?;
        self.transform(series)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

/// One fitted [`LabelEncoder`] per categorical column
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoricalEncoders {
    encoders: BTreeMap<String, LabelEncoder>,
}

impl CategoricalEncoders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit an encoder for each of `columns` and replace them with their codes
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
        let mut result = df.clone();

        for col_name in columns {
            let column = df
                .column(col_name)
                .map_err(|_| SurvivalError::FeatureNotFound(col_name.to_string()))?;

            let mut encoder = LabelEncoder::new();
            let encoded = encoder.fit_transform(column.as_materialized_series())?;
            result.with_column(encoded)?;

            tracing::debug!(column = %col_name, classes = ?encoder.classes(), "Fitted label encoder");
            self.encoders.insert(col_name.to_string(), encoder);
        }

        Ok(result)
    }

    /// Encode `label` with the encoder fitted for `column`
    pub fn encode(&self, column: &str, label: &str) -> Result<f64> {
        let encoder = self
            .encoders
            .get(column)
            .ok_or_else(|| SurvivalError::FeatureNotFound(column.to_string()))?;
        encoder.transform_label(column, label).map(|code| code as f64)
    }

    /// Classes per encoded column
    pub fn classes(&self) -> BTreeMap<String, Vec<String>> {
        self.encoders
            .iter()
            .map(|(column, encoder)| (column.clone(), encoder.classes().to_vec()))
            .collect()
    }
}

fn string_values(series: &Series) -> Result<Vec<String>> {
    let column = series.name().to_string();
    let as_str = series.cast(&DataType::String)?;
    let ca = as_str.str()?;

    ca.into_iter()
        .map(|value| {
            value.map(str::to_string).ok_or_else(|| {
                SurvivalError::DataError(format!("column '{}' contains null values", column))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classes_are_sorted() {
        let mut encoder = LabelEncoder::new();
        encoder.fit_labels(["S", "C", "S", "Q", "C"]).unwrap();

        assert_eq!(encoder.classes(), &["C", "Q", "S"]);
        assert_eq!(encoder.transform_label("Embarked", "C").unwrap(), 0);
        assert_eq!(encoder.transform_label("Embarked", "S").unwrap(), 2);
    }

    #[test]
    fn test_unseen_label_is_rejected() {
        let mut encoder = LabelEncoder::new();
        encoder.fit_labels(["male", "female"]).unwrap();

        let err = encoder.transform_label("Sex", "alien").unwrap_err();
        assert!(matches!(err, SurvivalError::UnseenCategory { ref value, .. } if value == "alien"));
    }

    #[test]
    fn test_unfitted_encoder_errors() {
        let encoder = LabelEncoder::new();
        assert!(matches!(
            encoder.transform_label("Sex", "male"),
            Err(SurvivalError::ModelNotFitted)
        ));
    }

    #[test]
    fn test_fit_transform_series() {
        let series = Series::new("Sex".into(), &["male", "female", "female", "male"]);
        let mut encoder = LabelEncoder::new();
        let encoded = encoder.fit_transform(&series).unwrap();

        let codes: Vec<f64> = encoded.f64().unwrap().into_no_null_iter().collect();
        assert_eq!(codes, vec![1.0, 0.0, 0.0, 1.0]);
        assert_eq!(encoded.name().as_str(), "Sex");
    }

    #[test]
    fn test_encoders_replace_columns() {
        let df = df!(
            "Sex" => &["male", "female", "male"],
            "Embarked" => &["S", "C", "Q"],
            "Fare" => &[7.25, 71.28, 8.05],
        )
        .unwrap();

        let mut encoders = CategoricalEncoders::new();
        let encoded = encoders.fit_transform(&df, &["Sex", "Embarked"]).unwrap();

        let embarked: Vec<f64> = encoded
            .column("Embarked")
            .unwrap()
            .f64()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(embarked, vec![2.0, 0.0, 1.0]);
        assert_eq!(encoders.encode("Sex", "female").unwrap(), 0.0);
        assert!(encoders.classes().contains_key("Embarked"));
        assert!(encoders.encode("Cabin", "C85").is_err());
    }

    #[test]
    fn test_null_labels_are_rejected() {
        let series = Series::new("Embarked".into(), &[Some("S"), None]);
        let mut encoder = LabelEncoder::new();
        assert!(encoder.fit(&series).is_err());
    }
}
