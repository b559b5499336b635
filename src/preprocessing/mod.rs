//! Feature preprocessing
//!
//! Fitted transformers that turn a frame into a dense feature matrix:
//! - One-hot encoding with the first category dropped
//! - Standard scaling with train-only statistics
//! - A column transformer composing both

mod encoder;
mod pipeline;
mod scaler;

pub use encoder::OneHotEncoder;
pub use pipeline::ColumnTransformer;
pub use scaler::StandardScaler;

use crate::error::Result;
use crate::utils::{column_f64, column_str};
use polars::prelude::DataFrame;

/// Fill value for missing categorical entries
pub const CATEGORICAL_FILL: &str = "0";
/// Fill value for missing numeric entries
pub const NUMERIC_FILL: f64 = 0.0;

/// Categorical column with nulls replaced by [`CATEGORICAL_FILL`]
pub(crate) fn categorical_values(df: &DataFrame, column: &str) -> Result<Vec<String>> {
    Ok(column_str(df, column)?
        .into_iter()
        .map(|v| v.unwrap_or_else(|| CATEGORICAL_FILL.to_string()))
        .collect())
}

/// Numeric column with nulls and NaN replaced by [`NUMERIC_FILL`]
pub(crate) fn numeric_values(df: &DataFrame, column: &str) -> Result<Vec<f64>> {
    Ok(column_f64(df, column)?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()).unwrap_or(NUMERIC_FILL))
        .collect())
}
