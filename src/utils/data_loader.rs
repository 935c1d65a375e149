//! Data loading utilities

use crate::error::{Result, SurvivalError};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use std::time::Instant;

/// CSV loader for the training data
pub struct DataLoader {
    /// Rows scanned to infer column types
    infer_schema_length: Option<usize>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    /// Create a new data loader
    pub fn new() -> Self {
        Self {
            infer_schema_length: Some(1000),
        }
    }

    /// Load a CSV file with a header row
    pub fn load_csv(&self, path: &Path) -> Result<DataFrame> {
        let start = Instant::now();
        let file = File::open(path).map_err(|e| {
            SurvivalError::DataError(format!("cannot open {}: {}", path.display(), e))
        })?;

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(self.infer_schema_length)
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| {
                SurvivalError::DataError(format!("cannot parse {}: {}", path.display(), e))
            })?;

        tracing::info!(
            path = %path.display(),
            rows = df.height(),
            columns = df.width(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Loaded CSV"
        );

        Ok(df)
    }

    /// Fail with [`SurvivalError::FeatureNotFound`] for the first absent column
    pub fn require_columns(df: &DataFrame, columns: &[&str]) -> Result<()> {
        for column in columns {
            if df.column(column).is_err() {
                return Err(SurvivalError::FeatureNotFound(column.to_string()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_csv_with_nulls() {
        let file = write_temp_csv(
            "PassengerId,Survived,Name,Age,Embarked\n1,0,\"Braund, Mr. Owen Harris\",22,S\n2,1,\"Moran, Mr. James\",,\n",
        );

        let df = DataLoader::new().load_csv(file.path()).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 5);
        assert_eq!(df.column("Age").unwrap().null_count(), 1);
        assert_eq!(df.column("Embarked").unwrap().null_count(), 1);
    }

    #[test]
    fn test_missing_file_is_data_error() {
        let err = DataLoader::new()
            .load_csv(Path::new("/nonexistent/train.csv"))
            .unwrap_err();
        assert!(matches!(err, SurvivalError::DataError(_)));
    }

    #[test]
    fn test_require_columns() {
        let df = df!("Age" => &[1.0], "Fare" => &[2.0]).unwrap();
        assert!(DataLoader::require_columns(&df, &["Age", "Fare"]).is_ok());
        assert!(matches!(
            DataLoader::require_columns(&df, &["Age", "Sex"]),
            Err(SurvivalError::FeatureNotFound(ref c)) if c == "Sex"
        ));
    }
}
