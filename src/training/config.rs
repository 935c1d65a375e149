//! Training configuration

use serde::{Deserialize, Serialize};

/// Configuration for the startup training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Fraction of rows held out for validation
    pub test_size: f64,

    /// Random seed for the train/validation shuffle
    pub random_state: u64,

    /// Optimizer iteration cap
    pub max_iter: usize,

    /// Inverse L2 regularization strength
    pub c: f64,

    /// Convergence tolerance on the gradient
    pub tol: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            random_state: 42,
            max_iter: 250,
            c: 1.0,
            tol: 1e-4,
        }
    }
}

impl TrainingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }
}
