//! Logistic regression for binary classification

use crate::error::{Result, SurvivalError};
use ndarray::{s, Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

/// Solve symmetric positive-definite system Ax = b using Cholesky decomposition.
/// Retries once with a small ridge on the diagonal if the matrix is near-singular.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }

    if let Some(x) = cholesky_solve_inner(a, b) {
        return Some(x);
    }

    let mut a_reg = a.clone();
    let ridge = 1e-8 * a.diag().iter().map(|v| v.abs()).sum::<f64>() / n as f64;
    for k in 0..n {
        a_reg[[k, k]] += ridge.max(1e-12);
    }
    cholesky_solve_inner(&a_reg, b)
}

fn cholesky_solve_inner(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();

    // A = L * L^T
    let mut l = Array2::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }
            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= 0.0 || !diag.is_finite() {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // Forward substitution: L * y = b
    let mut y = Array1::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * y[j];
        }
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    // Backward substitution: L^T * x = y
    let mut x = Array1::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (y[i] - sum) / l[[i, i]];
    }

    Some(x)
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// log(1 + e^z) without overflow
fn softplus(z: f64) -> f64 {
    if z > 0.0 {
        z + (-z).exp().ln_1p()
    } else {
        z.exp().ln_1p()
    }
}

/// Optimizer used by [`LogisticRegression::fit`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LogisticSolver {
    /// Newton-Raphson with backtracking line search
    Newton,
    /// Full-batch gradient descent with a fixed step size
    GradientDescent { learning_rate: f64 },
}

/// Logistic regression for binary classification.
///
/// Minimises the summed log-loss plus `‖w‖² / (2C)`; the intercept is not
/// penalised. Features are used as given, without scaling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// Fitted coefficients
    pub coefficients: Option<Array1<f64>>,
    /// Fitted intercept
    pub intercept: Option<f64>,
    /// Whether to fit intercept
    pub fit_intercept: bool,
    /// Inverse of regularization strength (L2)
    pub c: f64,
    /// Maximum iterations
    pub max_iter: usize,
    /// Convergence tolerance on the largest gradient component
    pub tol: f64,
    pub solver: LogisticSolver,
    /// Iterations run by the last fit
    pub n_iter: usize,
    /// Whether the last fit reached `tol` before `max_iter`
    pub converged: bool,
    /// Whether model is fitted
    pub is_fitted: bool,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LogisticRegression {
    /// Create a new logistic regression model
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercept: None,
            fit_intercept: true,
            c: 1.0,
            max_iter: 100,
            tol: 1e-4,
            solver: LogisticSolver::Newton,
            n_iter: 0,
            converged: false,
            is_fitted: false,
        }
    }

    /// Set inverse regularization strength
    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    /// Set maximum iterations
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set convergence tolerance
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    pub fn with_solver(mut self, solver: LogisticSolver) -> Self {
        self.solver = solver;
        self
    }

    pub fn with_fit_intercept(mut self, fit_intercept: bool) -> Self {
        self.fit_intercept = fit_intercept;
        self
    }

    fn validate_params(&self) -> Result<()> {
        if !(self.c > 0.0) {
            return Err(SurvivalError::InvalidParameter {
                name: "c".to_string(),
                value: self.c.to_string(),
                reason: "must be positive".to_string(),
            });
        }
        if self.max_iter == 0 {
            return Err(SurvivalError::InvalidParameter {
                name: "max_iter".to_string(),
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if let LogisticSolver::GradientDescent { learning_rate } = self.solver {
            if !(learning_rate > 0.0) {
                return Err(SurvivalError::InvalidParameter {
                    name: "learning_rate".to_string(),
                    value: learning_rate.to_string(),
                    reason: "must be positive".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Design matrix with a trailing column of ones when fitting an intercept
    fn augment(&self, x: &Array2<f64>) -> Array2<f64> {
        if !self.fit_intercept {
            return x.clone();
        }
        let mut aug = Array2::ones((x.nrows(), x.ncols() + 1));
        aug.slice_mut(s![.., ..x.ncols()]).assign(x);
        aug
    }

    /// Per-parameter penalty weight: `1/C` for coefficients, 0 for the intercept
    fn penalty_mask(&self, n_params: usize) -> Array1<f64> {
        let mut mask = Array1::from_elem(n_params, 1.0 / self.c);
        if self.fit_intercept {
            mask[n_params - 1] = 0.0;
        }
        mask
    }

    fn objective(x: &Array2<f64>, y: &Array1<f64>, theta: &Array1<f64>, penalty: &Array1<f64>) -> f64 {
        let z = x.dot(theta);
        let loss: f64 = z
            .iter()
            .zip(y.iter())
            .map(|(zi, yi)| softplus(*zi) - yi * zi)
            .sum();
        let reg: f64 = theta
            .iter()
            .zip(penalty.iter())
            .map(|(t, p)| 0.5 * p * t * t)
            .sum();
        loss + reg
    }

    fn gradient_converged(&self, x: &Array2<f64>, y: &Array1<f64>, theta: &Array1<f64>, penalty: &Array1<f64>) -> bool {
        let (grad, _) = Self::gradient(x, y, theta, penalty);
        grad.iter().fold(0.0_f64, |m, g| m.max(g.abs())) < self.tol
    }

    fn gradient(x: &Array2<f64>, y: &Array1<f64>, theta: &Array1<f64>, penalty: &Array1<f64>) -> (Array1<f64>, Array1<f64>) {
        let p = x.dot(theta).mapv(sigmoid);
        let errors = &p - y;
        let grad = x.t().dot(&errors) + penalty * theta;
        (grad, p)
    }

    /// Fit the model
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        self.validate_params()?;

        let n_samples = x.nrows();
        if n_samples != y.len() {
            return Err(SurvivalError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(SurvivalError::TrainingError("no training samples".to_string()));
        }
        if y.iter().any(|v| *v != 0.0 && *v != 1.0) {
            return Err(SurvivalError::TrainingError("target must contain only 0 and 1".to_string()));
        }
        let positives = y.iter().filter(|v| **v == 1.0).count();
        if positives == 0 || positives == n_samples {
            return Err(SurvivalError::TrainingError(
                "target needs samples of both classes".to_string(),
            ));
        }

        let design = self.augment(x);
        let penalty = self.penalty_mask(design.ncols());
        let mut theta = Array1::zeros(design.ncols());

        let (n_iter, converged) = match self.solver {
            LogisticSolver::Newton => self.newton(&design, y, &penalty, &mut theta)?,
            LogisticSolver::GradientDescent { learning_rate } => {
                self.gradient_descent(&design, y, &penalty, &mut theta, learning_rate)
            }
        };

        if theta.iter().any(|v| !v.is_finite()) {
            return Err(SurvivalError::TrainingError("optimizer diverged".to_string()));
        }

        let n_features = x.ncols();
        self.coefficients = Some(theta.slice(s![..n_features]).to_owned());
        self.intercept = Some(if self.fit_intercept { theta[n_features] } else { 0.0 });
        self.n_iter = n_iter;
        self.converged = converged;
        self.is_fitted = true;

        if !converged {
            tracing::warn!(max_iter = self.max_iter, "Logistic regression did not converge");
        }

        Ok(self)
    }

    fn newton(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        penalty: &Array1<f64>,
        theta: &mut Array1<f64>,
    ) -> Result<(usize, bool)> {
        let mut current = Self::objective(x, y, theta, penalty);

        for iter in 0..self.max_iter {
            let (grad, p) = Self::gradient(x, y, theta, penalty);
            if grad.iter().fold(0.0_f64, |m, g| m.max(g.abs())) < self.tol {
                return Ok((iter, true));
            }

            // H = X^T diag(p(1-p)) X + diag(penalty)
            let weights = p.mapv(|pi| pi * (1.0 - pi));
            let weighted = x * &weights.view().insert_axis(Axis(1));
            let mut hessian = x.t().dot(&weighted);
            for (k, pk) in penalty.iter().enumerate() {
                hessian[[k, k]] += pk;
            }

            let step = cholesky_solve(&hessian, &grad).ok_or_else(|| {
                SurvivalError::TrainingError("Hessian is not positive definite".to_string())
            })?;

            let mut scale = 1.0;
            let mut accepted = false;
            for _ in 0..30 {
                let candidate = &*theta - &(scale * &step);
                let value = Self::objective(x, y, &candidate, penalty);
                if value.is_finite() && value <= current {
                    *theta = candidate;
                    current = value;
                    accepted = true;
                    break;
                }
                scale *= 0.5;
            }

            if !accepted {
                // stalled: no descent left along the Newton direction
                return Ok((iter + 1, self.gradient_converged(x, y, theta, penalty)));
            }
        }

        Ok((self.max_iter, self.gradient_converged(x, y, theta, penalty)))
    }

    fn gradient_descent(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        penalty: &Array1<f64>,
        theta: &mut Array1<f64>,
        lr: f64,
    ) -> (usize, bool) {
        let n_samples = x.nrows() as f64;

        for iter in 0..self.max_iter {
            let (grad, _) = Self::gradient(x, y, theta, penalty);
            let grad = grad / n_samples;

            let grad_norm = grad.mapv(|v| v * v).sum().sqrt();
            if grad_norm < self.tol {
                return (iter, true);
            }

            *theta = &*theta - &(lr * &grad);
        }

        (self.max_iter, false)
    }

    fn check_features(&self, n_features: usize) -> Result<(&Array1<f64>, f64)> {
        let coefficients = match (&self.coefficients, self.is_fitted) {
            (Some(coefficients), true) => coefficients,
            _ => return Err(SurvivalError::ModelNotFitted),
        };
        if coefficients.len() != n_features {
            return Err(SurvivalError::ShapeError {
                expected: format!("{} features", coefficients.len()),
                actual: format!("{} features", n_features),
            });
        }
        Ok((coefficients, self.intercept.unwrap_or(0.0)))
    }

    /// Raw linear scores `Xw + b`
    pub fn decision_function(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let (coefficients, intercept) = self.check_features(x.ncols())?;
        Ok(x.dot(coefficients) + intercept)
    }

    /// Positive-class probabilities
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(self.decision_function(x)?.mapv(sigmoid))
    }

    /// Positive-class probability for a single row
    pub fn predict_proba_row(&self, row: ArrayView1<f64>) -> Result<f64> {
        let (coefficients, intercept) = self.check_features(row.len())?;
        Ok(sigmoid(row.dot(coefficients) + intercept))
    }

    /// Predict class labels
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let proba = self.predict_proba(x)?;
        Ok(proba.mapv(|p| if p >= 0.5 { 1.0 } else { 0.0 }))
    }

    /// Get accuracy score
    pub fn score(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
        if y.is_empty() {
            return Err(SurvivalError::ShapeError {
                expected: "at least one sample".to_string(),
                actual: "0 samples".to_string(),
            });
        }
        let y_pred = self.predict(x)?;

        let correct = y_pred
            .iter()
            .zip(y.iter())
            .filter(|(pred, actual)| (*pred - *actual).abs() < 0.5)
            .count();

        Ok(correct as f64 / y.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn overlapping_data() -> (Array2<f64>, Array1<f64>) {
        let x = array![
            [1.0, 1.0],
            [1.5, 2.0],
            [2.0, 1.0],
            [3.0, 3.5],
            [4.0, 3.0],
            [2.5, 2.5],
            [5.0, 5.0],
            [5.5, 4.5],
            [6.0, 6.0],
            [3.5, 3.0],
        ];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0, 1.0, 0.0];
        (x, y)
    }

    #[test]
    fn test_cholesky_solve() {
        let a = array![[4.0, 2.0], [2.0, 3.0]];
        let b = array![2.0, 1.0];
        let x = cholesky_solve(&a, &b).unwrap();
        // 4x + 2y = 2, 2x + 3y = 1 -> x = 0.5, y = 0
        assert!((x[0] - 0.5).abs() < 1e-12);
        assert!(x[1].abs() < 1e-12);
    }

    #[test]
    fn test_cholesky_rejects_mismatched_shapes() {
        let a = array![[1.0, 0.0], [0.0, 1.0]];
        assert!(cholesky_solve(&a, &array![1.0]).is_none());
    }

    #[test]
    fn test_newton_fit_converges() {
        let (x, y) = overlapping_data();
        let mut model = LogisticRegression::new().with_max_iter(250);
        model.fit(&x, &y).unwrap();

        assert!(model.is_fitted);
        assert!(model.converged);
        assert!(model.n_iter <= 250);

        let accuracy = model.score(&x, &y).unwrap();
        assert!(accuracy >= 0.8, "Accuracy should be >= 0.8, got {}", accuracy);
    }

    #[test]
    fn test_unreachable_tolerance_is_not_converged() {
        let (x, y) = overlapping_data();
        let mut model = LogisticRegression::new().with_max_iter(250).with_tol(0.0);
        model.fit(&x, &y).unwrap();

        // the line search stalls at machine precision long before max_iter
        assert!(!model.converged);
        assert!(model.is_fitted);
    }

    #[test]
    fn test_without_intercept() {
        let (x, y) = overlapping_data();
        let mut model = LogisticRegression::new().with_fit_intercept(false);
        model.fit(&x, &y).unwrap();

        assert_eq!(model.intercept, Some(0.0));
        let z = model.decision_function(&array![[0.0, 0.0]]).unwrap();
        assert_eq!(z[0], 0.0);
    }

    #[test]
    fn test_separable_data_stays_finite() {
        let x = array![[1.0, 1.0], [1.5, 1.5], [2.0, 2.0], [5.0, 5.0], [5.5, 5.5], [6.0, 6.0]];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];

        let mut model = LogisticRegression::new().with_max_iter(250);
        model.fit(&x, &y).unwrap();

        let proba = model.predict_proba(&x).unwrap();
        assert!(proba.iter().all(|p| p.is_finite()));
        assert!(proba[0] < 0.5);
        assert!(proba[5] > 0.5);
    }

    #[test]
    fn test_gradient_descent_solver() {
        let (x, y) = overlapping_data();
        let mut model = LogisticRegression::new()
            .with_solver(LogisticSolver::GradientDescent { learning_rate: 0.1 })
            .with_max_iter(2000);
        model.fit(&x, &y).unwrap();

        let accuracy = model.score(&x, &y).unwrap();
        assert!(accuracy >= 0.7, "Accuracy should be >= 0.7, got {}", accuracy);
    }

    #[test]
    fn test_solvers_agree_on_direction() {
        let (x, y) = overlapping_data();
        let mut newton = LogisticRegression::new();
        newton.fit(&x, &y).unwrap();

        let mut gd = LogisticRegression::new()
            .with_solver(LogisticSolver::GradientDescent { learning_rate: 0.1 })
            .with_max_iter(5000);
        gd.fit(&x, &y).unwrap();

        let far = array![[6.0, 6.0]];
        assert!(newton.predict_proba(&far).unwrap()[0] > 0.5);
        assert!(gd.predict_proba(&far).unwrap()[0] > 0.5);
    }

    #[test]
    fn test_predict_proba_row_matches_batch() {
        let (x, y) = overlapping_data();
        let mut model = LogisticRegression::new();
        model.fit(&x, &y).unwrap();

        let batch = model.predict_proba(&x).unwrap();
        let single = model.predict_proba_row(x.row(3)).unwrap();
        assert!((batch[3] - single).abs() < 1e-12);
    }

    #[test]
    fn test_stronger_penalty_shrinks_coefficients() {
        let (x, y) = overlapping_data();
        let mut loose = LogisticRegression::new().with_c(100.0);
        loose.fit(&x, &y).unwrap();
        let mut tight = LogisticRegression::new().with_c(0.01);
        tight.fit(&x, &y).unwrap();

        let norm = |m: &LogisticRegression| m.coefficients.as_ref().unwrap().mapv(|v| v * v).sum();
        assert!(norm(&tight) < norm(&loose));
    }

    #[test]
    fn test_single_class_rejected() {
        let x = array![[1.0], [2.0]];
        let y = array![1.0, 1.0];
        let err = LogisticRegression::new().fit(&x, &y).unwrap_err();
        assert!(matches!(err, SurvivalError::TrainingError(_)));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let (x, y) = overlapping_data();
        assert!(matches!(
            LogisticRegression::new().with_c(0.0).fit(&x, &y),
            Err(SurvivalError::InvalidParameter { .. })
        ));
        assert!(matches!(
            LogisticRegression::new().with_max_iter(0).fit(&x, &y),
            Err(SurvivalError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_shape_mismatch() {
        let (x, y) = overlapping_data();
        let mut model = LogisticRegression::new();
        model.fit(&x, &y).unwrap();

        let wrong = array![[1.0, 2.0, 3.0]];
        assert!(matches!(model.predict_proba(&wrong), Err(SurvivalError::ShapeError { .. })));
        assert!(matches!(
            LogisticRegression::new().fit(&x, &array![0.0, 1.0]),
            Err(SurvivalError::ShapeError { .. })
        ));
    }

    #[test]
    fn test_unfitted_model() {
        let model = LogisticRegression::new();
        assert!(matches!(
            model.predict_proba(&array![[1.0, 2.0]]),
            Err(SurvivalError::ModelNotFitted)
        ));
    }
}
