//! One-hot encoding

use super::categorical_values;
use crate::error::{AutoSenseError, Result};
use ndarray::Array2;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

/// Categories learned for one column
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ColumnCategories {
    name: String,
    /// Sorted distinct train values
    categories: Vec<String>,
}

/// One-hot encoder
///
/// With `drop_first` the lexicographically first category of each column
/// gets no indicator. Values unseen during fit encode as an all-zero block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneHotEncoder {
    drop_first: bool,
    columns: Vec<ColumnCategories>,
    is_fitted: bool,
}

impl Default for OneHotEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl OneHotEncoder {
    pub fn new() -> Self {
        Self {
            drop_first: true,
            columns: Vec::new(),
            is_fitted: false,
        }
    }

    pub fn with_drop_first(mut self, drop_first: bool) -> Self {
        self.drop_first = drop_first;
        self
    }

    /// Learn the categories of each column
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        let mut fitted = Vec::with_capacity(columns.len());
        for &name in columns {
            let mut categories = categorical_values(df, name)?;
            categories.sort_unstable();
            categories.dedup();
            fitted.push(ColumnCategories {
                name: name.to_string(),
                categories,
            });
        }
        self.columns = fitted;
        self.is_fitted = true;
        Ok(self)
    }

    fn encoded<'a>(&self, column: &'a ColumnCategories) -> impl Iterator<Item = &'a String> + 'a {
        let skip = usize::from(self.drop_first && !column.categories.is_empty());
        column.categories.iter().skip(skip)
    }

    /// Width of the output matrix
    pub fn n_features_out(&self) -> usize {
        self.columns.iter().map(|c| self.encoded(c).count()).sum()
    }

    /// Indicator matrix, one block per fitted column
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(AutoSenseError::ModelNotFitted);
        }

        let n_rows = df.height();
        let mut out = Array2::zeros((n_rows, self.n_features_out()));
        let mut offset = 0;

        for column in &self.columns {
            let values = categorical_values(df, &column.name)?;
            let encoded: Vec<&String> = self.encoded(column).collect();
            for (row, value) in values.iter().enumerate() {
                if let Some(pos) = encoded.iter().position(|c| *c == value) {
                    out[[row, offset + pos]] = 1.0;
                }
            }
            offset += encoded.len();
        }

        Ok(out)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<Array2<f64>> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    /// Learned categories of a column, including the dropped one
    pub fn categories(&self, column: &str) -> Option<&[String]> {
        self.columns
            .iter()
            .find(|c| c.name == column)
            .map(|c| c.categories.as_slice())
    }

    /// Output names as `<column>_<category>`
    pub fn feature_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .flat_map(|c| self.encoded(c).map(move |cat| format!("{}_{}", c.name, cat)))
            .collect()
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use polars::prelude::df;

    #[test]
    fn test_drop_first_and_sorted_categories() {
        let train = df! { "fuel" => &["petrol", "diesel", "electric", "diesel"] }.unwrap();
        let mut enc = OneHotEncoder::new();
        let out = enc.fit_transform(&train, &["fuel"]).unwrap();

        assert_eq!(enc.categories("fuel").unwrap(), &["diesel", "electric", "petrol"]);
        assert_eq!(enc.feature_names(), vec!["fuel_electric", "fuel_petrol"]);
        assert_eq!(out, array![[0.0, 1.0], [0.0, 0.0], [1.0, 0.0], [0.0, 0.0]]);
    }

    #[test]
    fn test_unknown_category_is_all_zero() {
        let train = df! { "make" => &["audi", "ford", "kia"] }.unwrap();
        let test = df! { "make" => &["tesla", "kia"] }.unwrap();
        let mut enc = OneHotEncoder::new();
        enc.fit(&train, &["make"]).unwrap();

        let out = enc.transform(&test).unwrap();
        assert_eq!(out, array![[0.0, 0.0], [0.0, 1.0]]);
    }

    #[test]
    fn test_nulls_encode_as_fill_category() {
        let train = df! { "body" => &[Some("suv"), None, Some("sedan")] }.unwrap();
        let mut enc = OneHotEncoder::new().with_drop_first(false);
        enc.fit(&train, &["body"]).unwrap();
        assert_eq!(enc.categories("body").unwrap(), &["0", "sedan", "suv"]);
        assert_eq!(enc.n_features_out(), 3);
    }

    #[test]
    fn test_transform_before_fit() {
        let df = df! { "a" => &["x"] }.unwrap();
        assert!(matches!(
            OneHotEncoder::new().transform(&df).unwrap_err(),
            AutoSenseError::ModelNotFitted
        ));
    }
}
