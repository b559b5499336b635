//! AutoSense CLI
//!
//! Command-line interface for training, prediction and the new-data check.

mod new_data;

pub use new_data::{check_new_data, read_previous_count, NewDataStatus};

use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::constants::FINAL_MODEL_DIR;
use crate::config::{EnvConfig, RunContext, TrainerConfig};
use crate::pipeline::TrainingPipeline;
use crate::serving::{PredictionResponse, Predictor};
use crate::store::{self, Document};
use crate::tracking::{ExperimentTracker, LocalTracker, NoopTracker};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString    { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn kv(key: &str, val: &str) {
    println!("  {:<18} {}", muted(key), val.white());
}

fn step_run(msg: &str) {
    println!("  {} {}...", accent("›"), msg);
}

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "autosense")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Vehicle price model training pipeline")]
#[command(long_about = None)]
pub struct Cli {
    /// Document store URL (mongodb://..., file://<dir> or a directory); overrides MONGODB_URL
    #[arg(long, global = true)]
    pub store_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full training pipeline
    Train {
        /// Root directory for run artifacts
        #[arg(long)]
        artifact_root: Option<PathBuf>,

        /// Destination of the promoted model
        #[arg(long, default_value = FINAL_MODEL_DIR)]
        model_dir: PathBuf,

        /// Keep the winner inside the run directory only
        #[arg(long)]
        no_promote: bool,

        /// Do not record candidate runs
        #[arg(long)]
        no_tracking: bool,
    },

    /// Price a single record with the promoted model
    Predict {
        /// Record as a JSON object
        #[arg(short, long)]
        record: String,

        /// Directory holding the promoted model
        #[arg(long, default_value = FINAL_MODEL_DIR)]
        model_dir: PathBuf,
    },

    /// Exit 0 when the collection grew by more than the threshold
    CheckNewData {
        #[arg(long, default_value = "10000")]
        threshold: u64,

        /// File holding the last detected document count
        #[arg(long, default_value = "last_count.txt")]
        state_file: PathBuf,
    },
}

/// Environment config with the CLI store URL taking precedence
pub fn load_env(store_url: Option<&str>) -> anyhow::Result<EnvConfig> {
    Ok(EnvConfig::from_env(store_url)?)
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_train(
    env_config: &EnvConfig,
    artifact_root: Option<&Path>,
    model_dir: &Path,
    promote: bool,
    tracking: bool,
) -> anyhow::Result<()> {
    section("Train");

    let root = artifact_root.unwrap_or(&env_config.artifact_root);
    let ctx = RunContext::with_artifact_root(root, chrono::Local::now()).with_model_dir(model_dir);
    kv("Run", &ctx.artifact_dir.display().to_string());
    kv("Source", &format!("{}/{}", env_config.database_name, env_config.collection_name));

    step_run("Connecting to store");
    let store = store::connect(&env_config.store_url)?;
    step_ok(store.name());

    let local_tracker;
    let tracker: &dyn ExperimentTracker = if tracking {
        local_tracker = LocalTracker::from_config(&TrainerConfig::from_context(&ctx), ctx.timestamp.clone());
        &local_tracker
    } else {
        &NoopTracker
    };

    step_run("Running pipeline");
    let start = Instant::now();
    let outcome = TrainingPipeline::new(ctx, store.as_ref(), tracker)
        .with_source(env_config.database_name.as_str(), env_config.collection_name.as_str())
        .with_promotion(promote)
        .run()?;
    step_ok(&format!("finished in {:.1?}", start.elapsed()));

    let trainer = &outcome.trainer;
    println!();
    kv("Best model", &trainer.model_name);
    kv("Train R²", &format!("{:.4}", trainer.train_metrics.r2));
    kv("Test R²", &format!("{:.4}", trainer.test_metrics.r2));
    kv("Test RMSE", &format!("{:.2}", trainer.test_metrics.rmse));
    kv("Drift free", &outcome.validation.status.to_string());
    match &outcome.promoted {
        Some(p) => kv("Promoted", &p.model_path.display().to_string()),
        None => kv("Model", &trainer.trained_model_path.display().to_string()),
    }
    println!();
    Ok(())
}

/// Prints the JSON response; a failed prediction is reported, not raised
pub fn cmd_predict(record: &str, model_dir: &Path) -> anyhow::Result<()> {
    let response = match parse_record(record) {
        Ok(doc) => Predictor::from_model_dir(model_dir)
            .map(|p| p.respond(&doc))
            .unwrap_or_else(|e| PredictionResponse::Error { error: e.to_string() }),
        Err(e) => PredictionResponse::Error { error: e.to_string() },
    };
    println!("{}", serde_json::to_string(&response)?);
    Ok(())
}

fn parse_record(record: &str) -> anyhow::Result<Document> {
    match serde_json::from_str(record)? {
        serde_json::Value::Object(map) => Ok(map),
        other => anyhow::bail!("record must be a JSON object, got {}", other),
    }
}

/// Returns whether new data was detected
pub fn cmd_check_new_data(env_config: &EnvConfig, threshold: u64, state_file: &Path) -> anyhow::Result<bool> {
    let store = store::connect(&env_config.store_url)?;
    let status = check_new_data(
        store.as_ref(),
        &env_config.database_name,
        &env_config.collection_name,
        state_file,
        threshold,
    )?;
    println!("Previous count: {}, Current count: {}", status.previous, status.current);
    if status.detected {
        println!("{}", ok("New data detected, count updated"));
    } else {
        println!("{}", muted("No new data found, skipping pipeline"));
    }
    Ok(status.detected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_train_defaults() {
        let cli = Cli::try_parse_from(["autosense", "train"]).unwrap();
        match cli.command {
            Commands::Train { model_dir, no_promote, .. } => {
                assert_eq!(model_dir, PathBuf::from("final_model"));
                assert!(!no_promote);
            }
            _ => panic!("expected train"),
        }
    }

    #[test]
    fn test_parse_check_new_data() {
        let cli = Cli::try_parse_from(["autosense", "check-new-data", "--threshold", "5", "--store-url", "/tmp/s"]).unwrap();
        assert_eq!(cli.store_url.as_deref(), Some("/tmp/s"));
        assert!(matches!(cli.command, Commands::CheckNewData { threshold: 5, .. }));
    }

    #[test]
    fn test_parse_record() {
        assert!(parse_record(r#"{"make": "kia"}"#).is_ok());
        assert!(parse_record("[1, 2]").is_err());
        assert!(parse_record("not json").is_err());
    }

    #[test]
    fn test_store_url_flag_wins() {
        let cfg = load_env(Some("file:///tmp/flag")).unwrap();
        assert_eq!(cfg.store_url, "file:///tmp/flag");
    }
}
