//! Missing value imputation strategies

use crate::error::{Result, SurvivalError};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

/// Strategy for imputing missing values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ImputeStrategy {
    /// Replace with median (numeric only)
    Median,
    /// Replace with mode / most frequent value; ties go to the smallest value
    MostFrequent,
}

/// Value substituted for nulls in one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImputeValue {
    Numeric(f64),
    Label(String),
}

/// Imputer for handling missing values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Imputer {
    strategy: ImputeStrategy,
    fill_values: BTreeMap<String, ImputeValue>,
    is_fitted: bool,
}

impl Imputer {
    /// Create a new imputer with the specified strategy
    pub fn new(strategy: ImputeStrategy) -> Self {
        Self {
            strategy,
            fill_values: BTreeMap::new(),
            is_fitted: false,
        }
    }

    /// Fit the imputer to the data
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        for col_name in columns {
            let column = df
                .column(col_name)
                .map_err(|_| SurvivalError::FeatureNotFound(col_name.to_string()))?;

            let fill_value = self.compute_fill_value(column.as_materialized_series())?;
            self.fill_values.insert(col_name.to_string(), fill_value);
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Transform the data by imputing missing values
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(SurvivalError::ModelNotFitted);
        }

        let mut result = df.clone();

        for (col_name, fill_value) in &self.fill_values {
            if let Ok(column) = df.column(col_name) {
                let filled = fill_series(column.as_materialized_series(), fill_value)?;
                result.with_column(filled)?;
            }
        }

        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    pub fn fill_value(&self, column: &str) -> Option<&ImputeValue> {
        self.fill_values.get(column)
    }

    pub fn fill_values(&self) -> &BTreeMap<String, ImputeValue> {
        &self.fill_values
    }

    fn compute_fill_value(&self, series: &Series) -> Result<ImputeValue> {
        let column = series.name().to_string();
        let all_null = || SurvivalError::DataError(format!("column '{}' has no non-null values", column));

        match &self.strategy {
            ImputeStrategy::Median => {
                let values = series.cast(&DataType::Float64)?;
                let median = values.f64()?.median().ok_or_else(all_null)?;
                Ok(ImputeValue::Numeric(median))
            }
            ImputeStrategy::MostFrequent => {
                if series.dtype().is_primitive_numeric() {
                    let values = series.cast(&DataType::Float64)?;
                    let mode = numeric_mode(values.f64()?.into_iter().flatten()).ok_or_else(all_null)?;
                    Ok(ImputeValue::Numeric(mode))
                } else {
                    let values = series.cast(&DataType::String)?;
                    let mode = label_mode(values.str()?.into_iter().flatten()).ok_or_else(all_null)?;
                    Ok(ImputeValue::Label(mode))
                }
            }
        }
    }
}

fn fill_series(series: &Series, fill_value: &ImputeValue) -> Result<Series> {
    let name = series.name().clone();

    match fill_value {
        ImputeValue::Numeric(val) => {
            let values = series.cast(&DataType::Float64)?;
            let filled: Vec<f64> = values.f64()?.into_iter().map(|v| v.unwrap_or(*val)).collect();
            Ok(Series::new(name, filled))
        }
        ImputeValue::Label(val) => {
            let values = series.cast(&DataType::String)?;
            let filled: Vec<&str> = values
                .str()?
                .into_iter()
                .map(|v| v.unwrap_or(val.as_str()))
                .collect();
            Ok(Series::new(name, filled))
        }
    }
}

fn label_mode<'a>(values: impl Iterator<Item = &'a str>) -> Option<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .max_by(|(a, count_a), (b, count_b)| count_a.cmp(count_b).then_with(|| b.cmp(a)))
        .map(|(value, _)| value.to_string())
}

fn numeric_mode(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut sorted: Vec<f64> = values.collect();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mut best: Option<(f64, usize)> = None;
    let mut idx = 0;
    while idx < sorted.len() {
        let value = sorted[idx];
        let run = sorted[idx..]
            .iter()
            .take_while(|v| v.total_cmp(&value) == Ordering::Equal)
            .count();
        // strict comparison keeps the smallest value on ties
        if best.map_or(true, |(_, count)| run > count) {
            best = Some((value, run));
        }
        idx += run;
    }

    best.map(|(value, _)| value)
}
