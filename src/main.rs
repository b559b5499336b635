//! AutoSense - Main Entry Point

use autosense::cli::{cmd_check_new_data, cmd_predict, cmd_train, load_env, Cli, Commands};
use clap::Parser;
use std::process::ExitCode;

fn main() -> anyhow::Result<ExitCode> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "autosense=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train { artifact_root, model_dir, no_promote, no_tracking } => {
            let env_config = load_env(cli.store_url.as_deref())?;
            cmd_train(&env_config, artifact_root.as_deref(), &model_dir, !no_promote, !no_tracking)?;
        }
        Commands::Predict { record, model_dir } => {
            cmd_predict(&record, &model_dir)?;
        }
        Commands::CheckNewData { threshold, state_file } => {
            let env_config = load_env(cli.store_url.as_deref())?;
            if !cmd_check_new_data(&env_config, threshold, &state_file)? {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
