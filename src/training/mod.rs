//! Model training module
//!
//! Candidate regressors and the training stage that selects among them:
//! - Random forest of regression trees
//! - Least-squares gradient boosting
//! - Lasso and Ridge linear models

pub mod decision_tree;
pub mod gradient_boosting;
pub mod linear_models;
mod metrics;
pub mod random_forest;
mod trainer;

pub use decision_tree::{DecisionTree, TreeNode};
pub use gradient_boosting::{GradientBoostingConfig, GradientBoostingRegressor};
pub use linear_models::{LassoRegression, RidgeRegression};
pub use metrics::RegressionMetrics;
pub use random_forest::{MaxFeatures, RandomForest};
pub use trainer::{split_features_target, ModelTrainer, ModelTrainerArtifact};

use crate::error::Result;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// A fitted or unfitted candidate model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Regressor {
    RandomForest(RandomForest),
    GradientBoosting(GradientBoostingRegressor),
    Lasso(LassoRegression),
    Ridge(RidgeRegression),
}

impl Regressor {
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        match self {
            Regressor::RandomForest(m) => m.fit(x, y).map(|_| ()),
            Regressor::GradientBoosting(m) => m.fit(x, y).map(|_| ()),
            Regressor::Lasso(m) => m.fit(x, y).map(|_| ()),
            Regressor::Ridge(m) => m.fit(x, y).map(|_| ()),
        }
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        match self {
            Regressor::RandomForest(m) => m.predict(x),
            Regressor::GradientBoosting(m) => m.predict(x),
            Regressor::Lasso(m) => m.predict(x),
            Regressor::Ridge(m) => m.predict(x),
        }
    }

    /// Hyperparameters as name/value pairs
    pub fn params(&self) -> Vec<(String, String)> {
        let pairs: Vec<(&str, String)> = match self {
            Regressor::RandomForest(m) => vec![
                ("n_estimators", m.n_estimators.to_string()),
                ("max_depth", opt(m.max_depth)),
                ("min_samples_split", m.min_samples_split.to_string()),
                ("min_samples_leaf", m.min_samples_leaf.to_string()),
                ("max_features", format!("{:?}", m.max_features)),
                ("bootstrap", m.bootstrap.to_string()),
                ("random_state", opt(m.random_state)),
            ],
            Regressor::GradientBoosting(m) => {
                let c = m.config();
                vec![
                    ("n_estimators", c.n_estimators.to_string()),
                    ("learning_rate", c.learning_rate.to_string()),
                    ("max_depth", c.max_depth.to_string()),
                    ("min_samples_leaf", c.min_samples_leaf.to_string()),
                    ("subsample", c.subsample.to_string()),
                    ("colsample_bytree", c.colsample_bytree.to_string()),
                    ("random_state", opt(c.random_state)),
                ]
            }
            Regressor::Lasso(m) => vec![
                ("alpha", m.alpha.to_string()),
                ("max_iter", m.max_iter.to_string()),
                ("tol", m.tol.to_string()),
                ("fit_intercept", m.fit_intercept.to_string()),
            ],
            Regressor::Ridge(m) => vec![
                ("alpha", m.alpha.to_string()),
                ("fit_intercept", m.fit_intercept.to_string()),
            ],
        };
        pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "none".to_string(), |v| v.to_string())
}

/// Named model, the unit persisted by training and loaded by serving
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModel {
    pub name: String,
    pub model: Regressor,
}

impl TrainedModel {
    pub fn new(name: impl Into<String>, model: Regressor) -> Self {
        Self {
            name: name.into(),
            model,
        }
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.model.predict(x)
    }
}

/// The candidate set, in evaluation order
pub fn default_candidates() -> Vec<TrainedModel> {
    vec![
        TrainedModel::new(
            "Random Forest",
            Regressor::RandomForest(
                RandomForest::new_regressor(50)
                    .with_max_depth(12)
                    .with_random_state(42),
            ),
        ),
        TrainedModel::new(
            "Gradient Boosting",
            Regressor::GradientBoosting(GradientBoostingRegressor::new(GradientBoostingConfig {
                n_estimators: 50,
                learning_rate: 0.1,
                max_depth: 6,
                random_state: Some(42),
                ..Default::default()
            })),
        ),
        TrainedModel::new("Lasso", Regressor::Lasso(LassoRegression::new(0.001))),
        TrainedModel::new("Ridge", Regressor::Ridge(RidgeRegression::new(1.0))),
    ]
}
