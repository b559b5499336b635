//! Column-wise preprocessing pipeline

use super::{OneHotEncoder, StandardScaler};
use crate::error::{AutoSenseError, Result};
use crate::utils::column_names;
use ndarray::{concatenate, Array2, Axis};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

/// Encoder for categorical columns followed by a scaler for numeric ones.
///
/// Output is the one-hot block in categorical column order, then the scaled
/// numeric columns. Any other frame column is dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnTransformer {
    categorical_columns: Vec<String>,
    numeric_columns: Vec<String>,
    encoder: OneHotEncoder,
    scaler: StandardScaler,
    is_fitted: bool,
}

impl ColumnTransformer {
    pub fn new(categorical_columns: Vec<String>, numeric_columns: Vec<String>) -> Self {
        Self {
            categorical_columns,
            numeric_columns,
            encoder: OneHotEncoder::new(),
            scaler: StandardScaler::new(),
            is_fitted: false,
        }
    }

    fn check_columns(&self, df: &DataFrame) -> Result<()> {
        let present = column_names(df);
        match self.input_columns().find(|c| !present.iter().any(|p| p == *c)) {
            Some(missing) => Err(AutoSenseError::FeatureNotFound(missing.to_string())),
            None => Ok(()),
        }
    }

    /// Fit encoder and scaler on `df` only
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        self.check_columns(df)?;
        let categorical: Vec<&str> = self.categorical_columns.iter().map(String::as_str).collect();
        let numeric: Vec<&str> = self.numeric_columns.iter().map(String::as_str).collect();

        self.encoder.fit(df, &categorical)?;
        self.scaler.fit(df, &numeric)?;
        self.is_fitted = true;

        tracing::debug!(
            n_features_out = self.n_features_out(),
            "Fitted column transformer"
        );
        Ok(self)
    }

    /// Dense feature matrix for `df`
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(AutoSenseError::ModelNotFitted);
        }
        self.check_columns(df)?;

        let encoded = self.encoder.transform(df)?;
        let scaled = self.scaler.transform(df)?;
        Ok(concatenate(Axis(1), &[encoded.view(), scaled.view()])?)
    }

    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<Array2<f64>> {
        self.fit(df)?;
        self.transform(df)
    }

    /// Columns read from the input frame, categorical first
    pub fn input_columns(&self) -> impl Iterator<Item = &String> {
        self.categorical_columns.iter().chain(self.numeric_columns.iter())
    }

    pub fn categorical_columns(&self) -> &[String] {
        &self.categorical_columns
    }

    pub fn numeric_columns(&self) -> &[String] {
        &self.numeric_columns
    }

    pub fn n_features_out(&self) -> usize {
        self.encoder.n_features_out() + self.numeric_columns.len()
    }

    /// Output column names, e.g. `make_toyota`, then `mileage`
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = self.encoder.feature_names();
        names.extend(self.numeric_columns.iter().cloned());
        names
    }

    pub fn encoder(&self) -> &OneHotEncoder {
        &self.encoder
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }
}
