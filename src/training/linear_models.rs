//! Ordinary least squares linear regression

use crate::error::{ForecastError, Result};
use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Relative pivot below which a column is treated as linearly dependent.
/// Pivots are measured on the equilibrated normal matrix, whose diagonal is 1.
const RANK_TOLERANCE: f64 = 1e-10;

/// Relative singular value below which a direction is treated as null.
const SINGULAR_TOLERANCE: f64 = 1e-12;

/// Solve the symmetric positive-definite system Ax = b using Cholesky decomposition.
///
/// Returns `None` when a pivot collapses below `RANK_TOLERANCE` relative to
/// its diagonal entry, i.e. the system is rank deficient.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }

    // A = L * L^T
    let mut l = Array2::<f64>::zeros((n, n));

    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }

            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= RANK_TOLERANCE * a[[i, i]].abs() || diag <= 0.0 {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // Forward substitution: L * y = b
    let mut y = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * y[j];
        }
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    // Backward substitution: L^T * x = y
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (y[i] - sum) / l[[i, i]];
    }

    Some(x)
}

/// Minimum-norm least squares through the SVD of `x`.
///
/// Singular values below `SINGULAR_TOLERANCE` times the largest one count as
/// zero. Dependent columns then share the weight along their common
/// direction instead of one of them being dropped.
fn min_norm_solve(x: &Array2<f64>, y: &Array1<f64>) -> Result<Array1<f64>> {
    let (n_samples, n_features) = x.dim();
    if n_features == 0 {
        return Ok(Array1::zeros(0));
    }

    let a = DMatrix::from_fn(n_samples, n_features, |r, c| x[[r, c]]);
    let b = DVector::from_iterator(n_samples, y.iter().copied());

    let svd = a.svd(true, true);
    let eps = svd.singular_values.max() * SINGULAR_TOLERANCE;
    let w = svd
        .solve(&b, eps)
        .map_err(|e| ForecastError::ComputationError(format!("SVD solve failed: {}", e)))?;

    Ok(w.iter().copied().collect())
}

/// Solve least squares via normal equations: (X^T X) w = X^T y
///
/// Columns are scaled to unit norm first so the rank test does not depend on
/// the units of each feature. A rank-deficient system falls back to the
/// minimum-norm solution on the unscaled columns.
fn solve_least_squares(x: &Array2<f64>, y: &Array1<f64>) -> Result<Array1<f64>> {
    let n_features = x.ncols();

    let scale: Array1<f64> = x
        .axis_iter(Axis(1))
        .map(|col| {
            let norm = col.dot(&col).sqrt();
            if norm > 0.0 {
                norm
            } else {
                1.0
            }
        })
        .collect();

    let xs = x / &scale.view().insert_axis(Axis(0));
    let xtx = xs.t().dot(&xs);
    let xty = xs.t().dot(y);

    match cholesky_solve(&xtx, &xty) {
        Some(z) => Ok(z / &scale),
        None => {
            tracing::debug!(n_features, "Normal matrix is rank deficient, using minimum-norm solution");
            min_norm_solve(x, y)
        }
    }
}

/// Linear regression model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegression {
    /// Fitted coefficients (weights)
    pub coefficients: Option<Array1<f64>>,
    /// Fitted intercept (bias)
    pub intercept: Option<f64>,
    /// Whether to fit intercept
    pub fit_intercept: bool,
    /// Whether model is fitted
    pub is_fitted: bool,
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearRegression {
    /// Create a new linear regression model
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercept: None,
            fit_intercept: true,
            is_fitted: false,
        }
    }

    /// Enable/disable fitting intercept
    pub fn with_fit_intercept(mut self, fit_intercept: bool) -> Self {
        self.fit_intercept = fit_intercept;
        self
    }

    /// Fit the model to training data
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();

        if n_samples != y.len() {
            return Err(ForecastError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(ForecastError::DataError(
                "Cannot fit on an empty dataset".to_string(),
            ));
        }
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(ForecastError::ComputationError(
                "Training data contains non-finite values".to_string(),
            ));
        }

        let (coefficients, intercept) = match (self.fit_intercept, x.mean_axis(Axis(0)), y.mean()) {
            (true, Some(x_mean), Some(y_mean)) => {
                let x_centered = x - &x_mean.view().insert_axis(Axis(0));
                let y_centered = y - y_mean;
                let coefficients = solve_least_squares(&x_centered, &y_centered)?;
                let intercept = y_mean - coefficients.dot(&x_mean);
                (coefficients, intercept)
            }
            _ => (solve_least_squares(x, y)?, 0.0),
        };

        self.coefficients = Some(coefficients);
        self.intercept = Some(intercept);
        self.is_fitted = true;

        Ok(self)
    }

    /// Make predictions
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let coefficients = match (&self.coefficients, self.is_fitted) {
            (Some(c), true) => c,
            _ => return Err(ForecastError::ModelNotFitted),
        };

        if x.ncols() != coefficients.len() {
            return Err(ForecastError::ShapeError {
                expected: format!("{} features", coefficients.len()),
                actual: format!("{} features", x.ncols()),
            });
        }

        Ok(x.dot(coefficients) + self.intercept.unwrap_or(0.0))
    }

    /// Predict a single row
    pub fn predict_one(&self, row: &[f64]) -> Result<f64> {
        let x = Array2::from_shape_vec((1, row.len()), row.to_vec())?;
        Ok(self.predict(&x)?[0])
    }

    /// Get R² score
    pub fn score(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
        let y_pred = self.predict(x)?;
        let y_mean = y.mean().unwrap_or(0.0);

        let ss_res: f64 = y.iter().zip(y_pred.iter()).map(|(t, p)| (t - p).powi(2)).sum();
        let ss_tot: f64 = y.iter().map(|t| (t - y_mean).powi(2)).sum();

        Ok(if ss_tot == 0.0 { 1.0 } else { 1.0 - ss_res / ss_tot })
    }

    pub fn n_features(&self) -> Option<usize> {
        self.coefficients.as_ref().map(|c| c.len())
    }
}
