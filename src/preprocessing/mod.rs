//! Data preprocessing module
//!
//! - Missing value imputation (median, most frequent)
//! - Label encoding of categorical columns

mod encoder;
mod imputer;

pub use encoder::{CategoricalEncoders, LabelEncoder};
pub use imputer::{ImputeStrategy, ImputeValue, Imputer};
