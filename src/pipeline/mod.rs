//! Training pipeline orchestrator
//!
//! Runs ingestion, validation, transformation and training in sequence on
//! the calling thread. The first failing stage ends the run; its error is
//! already tagged with the stage name. After every stage succeeded the
//! winning model and the fitted transformer can be promoted to the
//! serving directory.

use crate::config::constants::{
    DATA_TRANSFORMATION_TRANSFORMED_OBJECT_DIR, MODEL_FILE_NAME, PIPELINE_SUMMARY_FILE_NAME,
    PREPROCESSING_OBJECT_FILE_NAME,
};
use crate::config::{
    IngestionConfig, RunContext, Schema, TrainerConfig, TransformationConfig, ValidationConfig,
};
use crate::error::{AutoSenseError, Result, Stage};
use crate::ingestion::{DataIngestion, IngestionArtifact};
use crate::store::DocumentStore;
use crate::tracking::ExperimentTracker;
use crate::training::{ModelTrainer, ModelTrainerArtifact, TrainedModel};
use crate::transformation::{DataTransformation, TransformationArtifact};
use crate::validation::{DataValidation, ValidationArtifact};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, warn};

/// Files copied into the serving directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotedModel {
    pub model_path: PathBuf,
    pub transformer_path: PathBuf,
}

impl PromotedModel {
    /// Serving layout under `model_dir`
    pub fn layout(model_dir: impl AsRef<Path>) -> Self {
        let dir = model_dir.as_ref();
        Self {
            model_path: dir.join(MODEL_FILE_NAME),
            transformer_path: dir
                .join(DATA_TRANSFORMATION_TRANSFORMED_OBJECT_DIR)
                .join(PREPROCESSING_OBJECT_FILE_NAME),
        }
    }
}

/// Every artifact of a completed run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutcome {
    pub run: RunContext,
    pub ingestion: IngestionArtifact,
    pub validation: ValidationArtifact,
    pub transformation: TransformationArtifact,
    pub trainer: ModelTrainerArtifact,
    pub promoted: Option<PromotedModel>,
    pub elapsed_secs: f64,
}

pub struct TrainingPipeline<'a> {
    ctx: RunContext,
    store: &'a dyn DocumentStore,
    tracker: &'a dyn ExperimentTracker,
    schema: Option<Schema>,
    source: Option<(String, String)>,
    transformation_columns: Option<(Vec<String>, Vec<String>)>,
    candidates: Option<Vec<TrainedModel>>,
    promote: bool,
}

impl<'a> TrainingPipeline<'a> {
    pub fn new(ctx: RunContext, store: &'a dyn DocumentStore, tracker: &'a dyn ExperimentTracker) -> Self {
        Self {
            ctx,
            store,
            tracker,
            schema: None,
            source: None,
            transformation_columns: None,
            candidates: None,
            promote: false,
        }
    }

    /// Database and collection to ingest from
    pub fn with_source(mut self, database: impl Into<String>, collection: impl Into<String>) -> Self {
        self.source = Some((database.into(), collection.into()));
        self
    }

    /// Schema used for validation, defaults to the bundled one
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn with_columns(mut self, categorical: Vec<String>, numeric: Vec<String>) -> Self {
        self.transformation_columns = Some((categorical, numeric));
        self
    }

    pub fn with_candidates(mut self, candidates: Vec<TrainedModel>) -> Self {
        self.candidates = Some(candidates);
        self
    }

    /// Copy the winner to `ctx.model_dir` after a successful run
    pub fn with_promotion(mut self, promote: bool) -> Self {
        self.promote = promote;
        self
    }

    pub fn context(&self) -> &RunContext {
        &self.ctx
    }

    fn start_data_ingestion(&self) -> Result<IngestionArtifact> {
        let mut config = IngestionConfig::from_context(&self.ctx);
        if let Some((db, coll)) = &self.source {
            config = config.with_source(db.as_str(), coll.as_str());
        }
        DataIngestion::new(config, self.store).initiate_data_ingestion()
    }

    fn start_data_validation(&self, ingestion: IngestionArtifact) -> Result<ValidationArtifact> {
        let schema = match &self.schema {
            Some(schema) => schema.clone(),
            None => Schema::load_default().map_err(|e| AutoSenseError::stage(Stage::Validation, e))?,
        };
        let config = ValidationConfig::from_context(&self.ctx);
        DataValidation::new(config, ingestion, schema).initiate_data_validation()
    }

    fn start_data_transformation(&self, validation: ValidationArtifact) -> Result<TransformationArtifact> {
        let mut config = TransformationConfig::from_context(&self.ctx);
        if let Some((categorical, numeric)) = &self.transformation_columns {
            config = config.with_columns(categorical.clone(), numeric.clone());
        }
        DataTransformation::new(config, validation).initiate_data_transformation()
    }

    fn start_model_trainer(&self, transformation: TransformationArtifact) -> Result<ModelTrainerArtifact> {
        let config = TrainerConfig::from_context(&self.ctx);
        let mut trainer = ModelTrainer::new(config, transformation, self.tracker);
        if let Some(candidates) = &self.candidates {
            trainer = trainer.with_candidates(candidates.clone());
        }
        trainer.initiate_model_trainer()
    }

    fn promote_model(
        &self,
        transformation: &TransformationArtifact,
        trainer: &ModelTrainerArtifact,
    ) -> Result<PromotedModel> {
        let promoted = PromotedModel::layout(&self.ctx.model_dir);
        copy_file(&trainer.trained_model_path, &promoted.model_path)?;
        copy_file(&transformation.transformed_object_path, &promoted.transformer_path)?;
        info!(
            model = %trainer.model_name,
            dir = %self.ctx.model_dir.display(),
            "Promoted model for serving"
        );
        Ok(promoted)
    }

    /// Execute all stages in order
    pub fn run(&self) -> Result<PipelineOutcome> {
        let start = Instant::now();
        info!(
            pipeline = %self.ctx.pipeline_name,
            run_dir = %self.ctx.artifact_dir.display(),
            store = self.store.name(),
            tracker = self.tracker.name(),
            "Starting training pipeline"
        );
        self.ctx.prepare()?;

        let ingestion = self.start_data_ingestion()?;
        let validation = self.start_data_validation(ingestion.clone())?;
        if !validation.status {
            warn!(
                report = %validation.drift_report_path.display(),
                "Dataset drift detected, continuing with transformation"
            );
        }
        let transformation = self.start_data_transformation(validation.clone())?;
        let trainer = self.start_model_trainer(transformation.clone())?;

        let promoted = if self.promote {
            let promoted = self.promote_model(&transformation, &trainer).map_err(|e| {
                error!(error = %e, "Model promotion failed");
                AutoSenseError::stage(Stage::Promotion, e)
            })?;
            Some(promoted)
        } else {
            None
        };

        let outcome = PipelineOutcome {
            run: self.ctx.clone(),
            ingestion,
            validation,
            transformation,
            trainer,
            promoted,
            elapsed_secs: start.elapsed().as_secs_f64(),
        };
        write_summary(&self.ctx, &outcome).map_err(|e| AutoSenseError::stage(Stage::RunContext, e))?;

        info!(
            model = %outcome.trainer.model_name,
            test_r2 = outcome.trainer.test_metrics.r2,
            elapsed_secs = outcome.elapsed_secs,
            "Training pipeline completed"
        );
        Ok(outcome)
    }
}

fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(from, to)?;
    Ok(())
}

fn write_summary(ctx: &RunContext, outcome: &PipelineOutcome) -> Result<()> {
    let path = ctx.artifact_dir.join(PIPELINE_SUMMARY_FILE_NAME);
    fs::write(&path, serde_json::to_string_pretty(outcome)?)?;
    Ok(())
}
