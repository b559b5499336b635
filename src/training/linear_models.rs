//! Linear model implementations

use crate::error::{AutoSenseError, Result};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Solve symmetric positive-definite system Ax = b using Cholesky decomposition.
/// Retries once with a tiny diagonal jitter if the matrix is near-singular.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }
    cholesky_solve_inner(a, b).or_else(|| {
        let mut a_reg = a.clone();
        let jitter = 1e-8 * a.diag().iter().map(|v| v.abs()).sum::<f64>().max(1.0) / n.max(1) as f64;
        for k in 0..n {
            a_reg[[k, k]] += jitter;
        }
        cholesky_solve_inner(&a_reg, b)
    })
}

fn cholesky_solve_inner(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    let mut l = Array2::<f64>::zeros((n, n));

    for i in 0..n {
        for j in 0..=i {
            let sum: f64 = (0..j).map(|k| l[[i, k]] * l[[j, k]]).sum();
            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= 0.0 {
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
        let sum: f64 = (0..i).map(|j| l[[i, j]] * y[j]).sum();
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    // Backward substitution: L^T * x = y
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let sum: f64 = ((i + 1)..n).map(|j| l[[j, i]] * x[j]).sum();
        x[i] = (y[i] - sum) / l[[i, i]];
    }

    Some(x)
}

fn check_shapes(x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
    if x.nrows() != y.len() {
        return Err(AutoSenseError::ShapeError {
            expected: format!("y length = {}", x.nrows()),
            actual: format!("y length = {}", y.len()),
        });
    }
    if x.nrows() == 0 {
        return Err(AutoSenseError::TrainingError("cannot fit on zero samples".to_string()));
    }
    Ok(())
}

/// Column means and target mean used to fit the intercept
struct Centered {
    x: Array2<f64>,
    y: Array1<f64>,
    x_mean: Array1<f64>,
    y_mean: f64,
}

fn center(x: &Array2<f64>, y: &Array1<f64>, fit_intercept: bool) -> Result<Centered> {
    if !fit_intercept {
        return Ok(Centered {
            x: x.clone(),
            y: y.clone(),
            x_mean: Array1::zeros(x.ncols()),
            y_mean: 0.0,
        });
    }
    let x_mean = x
        .mean_axis(Axis(0))
        .ok_or_else(|| AutoSenseError::TrainingError("empty feature matrix".to_string()))?;
    let y_mean = y.mean().unwrap_or(0.0);
    Ok(Centered {
        x: x - &x_mean.view().insert_axis(Axis(0)),
        y: y - y_mean,
        x_mean,
        y_mean,
    })
}

/// Ridge Regression (L2-regularized linear regression)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RidgeRegression {
    pub coefficients: Option<Array1<f64>>,
    pub intercept: Option<f64>,
    pub fit_intercept: bool,
    /// L2 regularization strength
    pub alpha: f64,
    pub is_fitted: bool,
}

impl Default for RidgeRegression {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl RidgeRegression {
    pub fn new(alpha: f64) -> Self {
        Self {
            coefficients: None,
            intercept: None,
            fit_intercept: true,
            alpha,
            is_fitted: false,
        }
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_fit_intercept(mut self, fit_intercept: bool) -> Self {
        self.fit_intercept = fit_intercept;
        self
    }

    /// Closed-form solve of (XᵀX + αI) w = Xᵀy on centered data
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        check_shapes(x, y)?;
        let c = center(x, y, self.fit_intercept)?;

        let mut xtx = c.x.t().dot(&c.x);
        for i in 0..x.ncols() {
            xtx[[i, i]] += self.alpha;
        }
        let xty = c.x.t().dot(&c.y);

        let coefficients = cholesky_solve(&xtx, &xty)
            .ok_or_else(|| AutoSenseError::TrainingError("singular normal equations".to_string()))?;

        self.intercept = Some(c.y_mean - coefficients.dot(&c.x_mean));
        self.coefficients = Some(coefficients);
        self.is_fitted = true;
        Ok(self)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        linear_predict(x, self.coefficients.as_ref(), self.intercept)
    }
}

/// Lasso Regression (L1-regularized via coordinate descent)
///
/// Minimises `1/(2n) ||y - Xw||² + α ||w||₁`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LassoRegression {
    pub coefficients: Option<Array1<f64>>,
    pub intercept: Option<f64>,
    pub fit_intercept: bool,
    /// L1 regularization strength
    pub alpha: f64,
    pub max_iter: usize,
    pub tol: f64,
    pub is_fitted: bool,
    /// Sweeps run by the last fit
    pub n_iter: usize,
}

impl Default for LassoRegression {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl LassoRegression {
    pub fn new(alpha: f64) -> Self {
        Self {
            coefficients: None,
            intercept: None,
            fit_intercept: true,
            alpha,
            max_iter: 1000,
            tol: 1e-6,
            is_fitted: false,
            n_iter: 0,
        }
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter.max(1);
        self
    }

    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Soft-threshold operator for L1 proximal step
    fn soft_threshold(val: f64, threshold: f64) -> f64 {
        if val > threshold {
            val - threshold
        } else if val < -threshold {
            val + threshold
        } else {
            0.0
        }
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        check_shapes(x, y)?;
        if self.alpha < 0.0 {
            return Err(AutoSenseError::InvalidParameter {
                name: "alpha".to_string(),
                value: self.alpha.to_string(),
                reason: "must be non-negative".to_string(),
            });
        }

        let n_features = x.ncols();
        let c = center(x, y, self.fit_intercept)?;
        let col_norms: Vec<f64> = (0..n_features)
            .map(|j| c.x.column(j).mapv(|v| v * v).sum())
            .collect();

        let mut w = Array1::<f64>::zeros(n_features);
        let mut r = c.y.clone();
        let lambda = self.alpha * x.nrows() as f64;

        self.n_iter = 0;
        for _ in 0..self.max_iter {
            self.n_iter += 1;
            let mut max_change: f64 = 0.0;

            for j in 0..n_features {
                if col_norms[j] < 1e-15 {
                    continue;
                }
                let col = c.x.column(j);
                let old_wj = w[j];
                let rho = col.dot(&r) + col_norms[j] * old_wj;
                let new_wj = Self::soft_threshold(rho, lambda) / col_norms[j];
                if new_wj != old_wj {
                    r.scaled_add(old_wj - new_wj, &col);
                    w[j] = new_wj;
                    max_change = max_change.max((new_wj - old_wj).abs());
                }
            }

            if max_change < self.tol {
                break;
            }
        }

        self.intercept = Some(c.y_mean - w.dot(&c.x_mean));
        self.coefficients = Some(w);
        self.is_fitted = true;
        Ok(self)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        linear_predict(x, self.coefficients.as_ref(), self.intercept)
    }
}

fn linear_predict(x: &Array2<f64>, coefficients: Option<&Array1<f64>>, intercept: Option<f64>) -> Result<Array1<f64>> {
    let coefficients = coefficients.ok_or(AutoSenseError::ModelNotFitted)?;
    if x.ncols() != coefficients.len() {
        return Err(AutoSenseError::ShapeError {
            expected: format!("{} features", coefficients.len()),
            actual: format!("{} features", x.ncols()),
        });
    }
    Ok(x.dot(coefficients) + intercept.unwrap_or(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn r2(pred: &Array1<f64>, y: &Array1<f64>) -> f64 {
        let ym = y.mean().unwrap();
        let ss_res = (pred - y).mapv(|v| v * v).sum();
        let ss_tot = y.mapv(|v| (v - ym).powi(2)).sum();
        1.0 - ss_res / ss_tot
    }

    #[test]
    fn test_ridge_regression() {
        let x = array![[1.0, 1.0], [2.0, 2.0], [3.0, 3.0], [4.0, 4.0]];
        let y = array![2.0, 4.0, 6.0, 8.0];
        let mut model = RidgeRegression::new(0.1);
        model.fit(&x, &y).unwrap();
        assert!(model.is_fitted);
        let r2 = r2(&model.predict(&x).unwrap(), &y);
        assert!(r2 > 0.95, "Ridge R² = {}", r2);
    }

    #[test]
    fn test_ridge_shrinks_with_alpha() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = array![2.0, 4.0, 6.0, 8.0];
        let mut weak = RidgeRegression::new(0.0);
        let mut strong = RidgeRegression::new(100.0);
        weak.fit(&x, &y).unwrap();
        strong.fit(&x, &y).unwrap();
        let w_weak = weak.coefficients.as_ref().unwrap()[0];
        let w_strong = strong.coefficients.as_ref().unwrap()[0];
        assert!((w_weak - 2.0).abs() < 1e-6);
        assert!(w_strong < w_weak);
    }

    #[test]
    fn test_lasso_regression() {
        let x = array![[1.0, 0.0], [2.0, 0.0], [3.0, 0.0], [4.0, 0.0]];
        let y = array![2.0, 4.0, 6.0, 8.0];
        let mut model = LassoRegression::new(0.01);
        model.fit(&x, &y).unwrap();
        let preds = model.predict(&x).unwrap();
        assert_eq!(preds.len(), 4);
        let r2 = r2(&preds, &y);
        assert!(r2 > 0.9, "Lasso R² = {}", r2);
    }

    #[test]
    fn test_lasso_zeroes_irrelevant_feature() {
        let x = array![[1.0, 0.3], [2.0, -0.2], [3.0, 0.1], [4.0, -0.1], [5.0, 0.0]];
        let y = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let mut model = LassoRegression::new(0.5);
        model.fit(&x, &y).unwrap();
        let w = model.coefficients.as_ref().unwrap();
        assert_eq!(w[1], 0.0);
        assert!(w[0] > 0.5);
    }

    #[test]
    fn test_predict_before_fit() {
        let model = LassoRegression::new(0.1);
        assert!(matches!(
            model.predict(&array![[1.0]]).unwrap_err(),
            AutoSenseError::ModelNotFitted
        ));
    }
}
