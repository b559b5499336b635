//! Standard scaling

use super::numeric_values;
use crate::error::{AutoSenseError, Result};
use ndarray::Array2;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

/// Parameters for one fitted column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ScalerParams {
    name: String,
    mean: f64,
    /// Population standard deviation, 1.0 when the column is constant
    scale: f64,
}

/// Standard scaler: (x - mean) / std
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StandardScaler {
    params: Vec<ScalerParams>,
    is_fitted: bool,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit the scaler to the data
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        let mut params = Vec::with_capacity(columns.len());
        for &name in columns {
            let values = numeric_values(df, name)?;
            let n = values.len().max(1) as f64;
            let mean = values.iter().sum::<f64>() / n;
            let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            let std = var.sqrt();
            params.push(ScalerParams {
                name: name.to_string(),
                mean,
                scale: if std > 0.0 && std.is_finite() { std } else { 1.0 },
            });
        }
        self.params = params;
        self.is_fitted = true;
        Ok(self)
    }

    /// Scaled matrix, one column per fitted column
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(AutoSenseError::ModelNotFitted);
        }

        let mut out = Array2::zeros((df.height(), self.params.len()));
        for (j, p) in self.params.iter().enumerate() {
            let values = numeric_values(df, &p.name)?;
            for (i, v) in values.into_iter().enumerate() {
                out[[i, j]] = (v - p.mean) / p.scale;
            }
        }
        Ok(out)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<Array2<f64>> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    pub fn mean(&self, column: &str) -> Option<f64> {
        self.params.iter().find(|p| p.name == column).map(|p| p.mean)
    }

    pub fn scale(&self, column: &str) -> Option<f64> {
        self.params.iter().find(|p| p.name == column).map(|p| p.scale)
    }

    pub fn feature_names(&self) -> Vec<String> {
        self.params.iter().map(|p| p.name.clone()).collect()
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::df;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    #[test]
    fn test_population_std() {
        let df = df! { "x" => &[1.0, 2.0, 3.0, 4.0] }.unwrap();
        let mut scaler = StandardScaler::new();
        let out = scaler.fit_transform(&df, &["x"]).unwrap();

        assert_close(scaler.mean("x").unwrap(), 2.5);
        assert_close(scaler.scale("x").unwrap(), 1.25f64.sqrt());
        assert_close(out.column(0).sum(), 0.0);
    }

    #[test]
    fn test_constant_column_scales_by_one() {
        let df = df! { "x" => &[5.0, 5.0, 5.0] }.unwrap();
        let mut scaler = StandardScaler::new();
        let out = scaler.fit_transform(&df, &["x"]).unwrap();
        assert_eq!(scaler.scale("x"), Some(1.0));
        assert!(out.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_nulls_filled_with_zero() {
        let df = df! { "x" => &[Some(2.0), None] }.unwrap();
        let mut scaler = StandardScaler::new();
        scaler.fit(&df, &["x"]).unwrap();
        assert_close(scaler.mean("x").unwrap(), 1.0);
    }
}
