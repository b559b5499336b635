//! Prediction serving
//!
//! Loads the promoted transformer and model and prices a single record.

use crate::error::{AutoSenseError, Result};
use crate::ingestion::documents_to_frame;
use crate::pipeline::PromotedModel;
use crate::preprocessing::ColumnTransformer;
use crate::store::Document;
use crate::training::TrainedModel;
use crate::utils::{load_object, ArtifactKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, warn};

/// Reply for one prediction request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PredictionResponse {
    Prediction { prediction: f64 },
    Error { error: String },
}

pub struct Predictor {
    model: TrainedModel,
    transformer: ColumnTransformer,
}

impl Predictor {
    pub fn new(model: TrainedModel, transformer: ColumnTransformer) -> Result<Self> {
        if !transformer.is_fitted() {
            return Err(AutoSenseError::ModelNotFitted);
        }
        Ok(Self { model, transformer })
    }

    pub fn load(model_path: impl AsRef<Path>, transformer_path: impl AsRef<Path>) -> Result<Self> {
        let model: TrainedModel = load_object(model_path, ArtifactKind::Model)?;
        let transformer: ColumnTransformer = load_object(transformer_path, ArtifactKind::Transformer)?;
        debug!(model = %model.name, features = transformer.n_features_out(), "Loaded predictor");
        Self::new(model, transformer)
    }

    /// Load from a promotion directory such as `final_model/`
    pub fn from_model_dir(model_dir: impl AsRef<Path>) -> Result<Self> {
        let layout = PromotedModel::layout(model_dir);
        Self::load(&layout.model_path, &layout.transformer_path)
    }

    pub fn model_name(&self) -> &str {
        &self.model.name
    }

    /// Columns read from a record; anything else is ignored
    pub fn feature_columns(&self) -> Vec<&str> {
        self.transformer.input_columns().map(String::as_str).collect()
    }

    /// Value used for a feature the record does not carry.
    ///
    /// Numeric columns take their fitted train mean so they scale to zero.
    /// Categorical columns become null, which encodes as an all-zero block.
    fn absent_value(&self, column: &str) -> Value {
        self.transformer
            .scaler()
            .mean(column)
            .map_or(Value::Null, Value::from)
    }

    /// Predicted price, rounded to 2 decimals
    pub fn predict(&self, record: &Document) -> Result<f64> {
        let mut absent = Vec::new();
        let row: Document = self
            .transformer
            .input_columns()
            .map(|c| match record.get(c) {
                Some(value) => (c.clone(), value.clone()),
                None => {
                    absent.push(c.as_str());
                    (c.clone(), self.absent_value(c))
                }
            })
            .collect();
        if !absent.is_empty() {
            debug!(?absent, "Record lacks features, using train defaults");
        }
        let frame = documents_to_frame(std::slice::from_ref(&row))?;
        let features = self.transformer.transform(&frame)?;
        let prediction = self.model.predict(&features)?;
        let value = prediction
            .first()
            .copied()
            .ok_or_else(|| AutoSenseError::DataError("model returned no prediction".to_string()))?;
        Ok(round2(value))
    }

    /// Like [`predict`](Self::predict) but never fails
    pub fn respond(&self, record: &Document) -> PredictionResponse {
        match self.predict(record) {
            Ok(prediction) => PredictionResponse::Prediction { prediction },
            Err(e) => {
                warn!(error = %e, "Prediction failed");
                PredictionResponse::Error { error: e.to_string() }
            }
        }
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
