//! Seeded train/validation splitting

use crate::error::{Result, SurvivalError};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Row indices of a single train/validation split
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainTestSplit {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
}

/// Shuffle `0..n_samples` and hold out `ceil(n_samples * test_size)` rows.
///
/// The same `random_state` always yields the same split.
pub fn train_test_split(n_samples: usize, test_size: f64, random_state: u64) -> Result<TrainTestSplit> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(SurvivalError::InvalidParameter {
            name: "test_size".to_string(),
            value: test_size.to_string(),
            reason: "must be in (0, 1)".to_string(),
        });
    }

    let n_test = (n_samples as f64 * test_size).ceil() as usize;
    if n_samples < 2 || n_test >= n_samples {
        return Err(SurvivalError::InvalidParameter {
            name: "n_samples".to_string(),
            value: n_samples.to_string(),
            reason: format!("too few samples to hold out {} for validation", n_test),
        });
    }

    let mut indices: Vec<usize> = (0..n_samples).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(random_state);
    indices.shuffle(&mut rng);

    let train_indices = indices.split_off(n_test);
    Ok(TrainTestSplit {
        train_indices,
        test_indices: indices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_split_sizes() {
        let split = train_test_split(891, 0.2, 42).unwrap();
        assert_eq!(split.test_indices.len(), 179);
        assert_eq!(split.train_indices.len(), 712);
    }

    #[test]
    fn test_split_is_a_partition() {
        let split = train_test_split(50, 0.2, 7).unwrap();
        let mut all: Vec<usize> = split
            .train_indices
            .iter()
            .chain(split.test_indices.iter())
            .copied()
            .collect();
        all.sort_unstable();
        assert_eq!(all, (0..50).collect::<Vec<_>>());

        let train: HashSet<_> = split.train_indices.iter().collect();
        assert!(split.test_indices.iter().all(|i| !train.contains(i)));
    }

    #[test]
    fn test_split_is_reproducible() {
        let a = train_test_split(100, 0.2, 42).unwrap();
        let b = train_test_split(100, 0.2, 42).unwrap();
        let c = train_test_split(100, 0.2, 43).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_split_rejects_bad_inputs() {
        assert!(train_test_split(100, 0.0, 42).is_err());
        assert!(train_test_split(100, 1.0, 42).is_err());
        assert!(train_test_split(1, 0.2, 42).is_err());
    }
}
