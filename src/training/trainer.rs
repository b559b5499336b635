//! Model trainer stage

use super::{default_candidates, RegressionMetrics, TrainedModel};
use crate::config::TrainerConfig;
use crate::error::{AutoSenseError, Result, Stage};
use crate::tracking::{CandidateRecord, ExperimentTracker};
use crate::transformation::TransformationArtifact;
use crate::utils::{load_array, save_object, ArtifactKind};
use ndarray::{s, Array1, Array2};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info, warn};

/// Winning model and its scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelTrainerArtifact {
    pub model_name: String,
    pub trained_model_path: PathBuf,
    pub train_metrics: RegressionMetrics,
    pub test_metrics: RegressionMetrics,
}

/// Split an array into features and its last column
pub fn split_features_target(arr: &Array2<f64>) -> Result<(Array2<f64>, Array1<f64>)> {
    let n_cols = arr.ncols();
    if n_cols < 2 {
        return Err(AutoSenseError::ShapeError {
            expected: "at least one feature column plus the target".to_string(),
            actual: format!("{} columns", n_cols),
        });
    }
    let x = arr.slice(s![.., ..n_cols - 1]).to_owned();
    let y = arr.column(n_cols - 1).to_owned();
    Ok((x, y))
}

/// Fits every candidate and keeps the one with the best test R²
pub struct ModelTrainer<'a> {
    config: TrainerConfig,
    transformation: TransformationArtifact,
    candidates: Vec<TrainedModel>,
    tracker: &'a dyn ExperimentTracker,
}

impl<'a> ModelTrainer<'a> {
    pub fn new(
        config: TrainerConfig,
        transformation: TransformationArtifact,
        tracker: &'a dyn ExperimentTracker,
    ) -> Self {
        Self {
            config,
            transformation,
            candidates: default_candidates(),
            tracker,
        }
    }

    /// Replace the candidate set; evaluation follows the given order
    pub fn with_candidates(mut self, candidates: Vec<TrainedModel>) -> Self {
        self.candidates = candidates;
        self
    }

    pub fn candidates(&self) -> &[TrainedModel] {
        &self.candidates
    }

    /// Evaluate candidates in order. Any fit or scoring failure aborts.
    pub fn train_and_select(
        &self,
        train: &Array2<f64>,
        test: &Array2<f64>,
    ) -> Result<(TrainedModel, RegressionMetrics, RegressionMetrics)> {
        let (x_train, y_train) = split_features_target(train)?;
        let (x_test, y_test) = split_features_target(test)?;
        if x_train.ncols() != x_test.ncols() {
            return Err(AutoSenseError::ShapeError {
                expected: format!("{} test features", x_train.ncols()),
                actual: format!("{} test features", x_test.ncols()),
            });
        }

        let mut best: Option<(TrainedModel, RegressionMetrics, RegressionMetrics)> = None;

        for candidate in &self.candidates {
            let start = Instant::now();
            let mut fitted = candidate.clone();
            fitted.model.fit(&x_train, &y_train).map_err(|e| {
                AutoSenseError::TrainingError(format!("{} failed to fit: {}", fitted.name, e))
            })?;

            let train_metrics = RegressionMetrics::compute(&y_train, &fitted.predict(&x_train)?)?;
            let test_metrics = RegressionMetrics::compute(&y_test, &fitted.predict(&x_test)?)?;
            info!(
                candidate = %fitted.name,
                train_r2 = train_metrics.r2,
                test_r2 = test_metrics.r2,
                test_rmse = test_metrics.rmse,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Evaluated candidate"
            );

            let record = CandidateRecord {
                name: fitted.name.clone(),
                params: fitted.model.params(),
                train_metrics,
                test_metrics,
            };
            if let Err(e) = self.tracker.log_candidate(&record, &fitted) {
                warn!(tracker = self.tracker.name(), candidate = %fitted.name, error = %e, "Experiment tracking failed");
            }

            let improves = best
                .as_ref()
                .map_or(true, |(_, _, best_test)| test_metrics.r2 > best_test.r2);
            if improves {
                best = Some((fitted, train_metrics, test_metrics));
            }
        }

        best.ok_or_else(|| AutoSenseError::TrainingError("no candidate models configured".to_string()))
    }

    fn check_fit_quality(&self, name: &str, train: &RegressionMetrics, test: &RegressionMetrics) {
        if test.r2 < self.config.expected_score {
            warn!(
                model = name,
                test_r2 = test.r2,
                expected = self.config.expected_score,
                "Best model is below the expected score"
            );
        }
        let gap = (train.r2 - test.r2).abs();
        if gap > self.config.fitting_threshold {
            warn!(
                model = name,
                gap,
                threshold = self.config.fitting_threshold,
                "Train/test R² gap suggests over or under fitting"
            );
        }
    }

    fn run(&self) -> Result<ModelTrainerArtifact> {
        let train = load_array(&self.transformation.transformed_train_path)?;
        let test = load_array(&self.transformation.transformed_test_path)?;

        let (best, train_metrics, test_metrics) = self.train_and_select(&train, &test)?;
        self.check_fit_quality(&best.name, &train_metrics, &test_metrics);

        save_object(&self.config.trained_model_path, ArtifactKind::Model, &best)?;
        info!(
            model = %best.name,
            test_r2 = test_metrics.r2,
            path = %self.config.trained_model_path.display(),
            "Saved best model"
        );

        Ok(ModelTrainerArtifact {
            model_name: best.name,
            trained_model_path: self.config.trained_model_path.clone(),
            train_metrics,
            test_metrics,
        })
    }

    /// Run the whole stage
    pub fn initiate_model_trainer(&self) -> Result<ModelTrainerArtifact> {
        info!(candidates = self.candidates.len(), "Starting model training");
        self.run().map_err(|e| {
            error!(error = %e, "Model training failed");
            AutoSenseError::stage(Stage::Training, e)
        })
    }
}
