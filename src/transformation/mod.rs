//! Data transformation stage
//!
//! Fits a [`ColumnTransformer`] on the validated train split, applies it to
//! both splits and writes dense arrays whose last column is the target.

use crate::config::TransformationConfig;
use crate::error::{AutoSenseError, Result, Stage};
use crate::preprocessing::ColumnTransformer;
use crate::utils::{column_f64, save_array, save_object, ArtifactKind, DataLoader};
use crate::validation::ValidationArtifact;
use ndarray::{concatenate, Array1, Array2, Axis};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{error, info};

/// Paths written by transformation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformationArtifact {
    pub transformed_train_path: PathBuf,
    pub transformed_test_path: PathBuf,
    /// Fitted [`ColumnTransformer`]
    pub transformed_object_path: PathBuf,
    /// Fitted numeric scaler alone
    pub scaler_object_path: PathBuf,
}

/// Transformation stage
pub struct DataTransformation {
    config: TransformationConfig,
    validation: ValidationArtifact,
}

impl DataTransformation {
    pub fn new(config: TransformationConfig, validation: ValidationArtifact) -> Self {
        Self { config, validation }
    }

    /// Unfitted transformer for the configured column partition
    pub fn get_data_transformer_object(&self) -> ColumnTransformer {
        ColumnTransformer::new(
            self.config.categorical_columns.clone(),
            self.config.numeric_columns.clone(),
        )
    }

    /// Split a frame into features and the target column
    pub fn split_target(&self, df: &DataFrame) -> Result<(DataFrame, Array1<f64>)> {
        let target = &self.config.target_column;
        let values = column_f64(df, target)?;
        let nulls = values.iter().filter(|v| v.is_none()).count();
        if nulls > 0 {
            return Err(AutoSenseError::DataError(format!(
                "target column '{}' has {} missing values",
                target, nulls
            )));
        }
        let y = Array1::from_iter(values.into_iter().flatten());
        let features = df.drop(target)?;
        Ok((features, y))
    }

    /// Fit on train, apply to both, append the target as the last column
    pub fn transform_splits(
        &self,
        train: &DataFrame,
        test: &DataFrame,
    ) -> Result<(ColumnTransformer, Array2<f64>, Array2<f64>)> {
        let (train_x, train_y) = self.split_target(train)?;
        let (test_x, test_y) = self.split_target(test)?;

        let mut transformer = self.get_data_transformer_object();
        let train_features = transformer.fit_transform(&train_x)?;
        let test_features = transformer.transform(&test_x)?;

        let train_arr = append_target(&train_features, &train_y)?;
        let test_arr = append_target(&test_features, &test_y)?;
        Ok((transformer, train_arr, test_arr))
    }

    fn run(&self) -> Result<TransformationArtifact> {
        let loader = DataLoader::new();
        let train = loader.load_csv(&self.validation.valid_train_path)?;
        let test = loader.load_csv(&self.validation.valid_test_path)?;

        let (transformer, train_arr, test_arr) = self.transform_splits(&train, &test)?;
        info!(
            train_shape = ?train_arr.dim(),
            test_shape = ?test_arr.dim(),
            features = ?transformer.feature_names(),
            "Transformed splits"
        );

        save_array(&self.config.transformed_train_path, &train_arr)?;
        save_array(&self.config.transformed_test_path, &test_arr)?;
        save_object(&self.config.transformed_object_path, ArtifactKind::Transformer, &transformer)?;
        save_object(&self.config.scaler_object_path, ArtifactKind::Scaler, transformer.scaler())?;

        Ok(TransformationArtifact {
            transformed_train_path: self.config.transformed_train_path.clone(),
            transformed_test_path: self.config.transformed_test_path.clone(),
            transformed_object_path: self.config.transformed_object_path.clone(),
            scaler_object_path: self.config.scaler_object_path.clone(),
        })
    }

    /// Run the whole stage
    pub fn initiate_data_transformation(&self) -> Result<TransformationArtifact> {
        info!("Starting data transformation");
        self.run().map_err(|e| {
            error!(error = %e, "Data transformation failed");
            AutoSenseError::stage(Stage::Transformation, e)
        })
    }
}

fn append_target(features: &Array2<f64>, target: &Array1<f64>) -> Result<Array2<f64>> {
    let target = target.view().insert_axis(Axis(1));
    Ok(concatenate(Axis(1), &[features.view(), target])?)
}
