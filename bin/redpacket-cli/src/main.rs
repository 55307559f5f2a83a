mod args;
mod commands;
mod config;

use std::path::PathBuf;

use args::Args;
use blockchain_utils::{init_logger, InitLoggerError, ProviderSetupError};
use clap::Parser;
use config::{ConfigError, Settings};
use redpacket_models::deployment::DeploymentError;
use snafu::prelude::*;

#[derive(Debug, Snafu)]
pub enum CliError {
    #[snafu(display("Failed to load env file {}: {source}", path.display()))]
    EnvFile {
        path: PathBuf,
        source: dotenvy::Error,
    },

    #[snafu(display("{source}"))]
    Logger { source: InitLoggerError },

    #[snafu(display("{source}"))]
    Config { source: ConfigError },

    #[snafu(display("Failed to set up provider: {source}"))]
    Provider { source: ProviderSetupError },

    #[snafu(display("{source}"))]
    Chain { source: redpacket_chains::Error },

    #[snafu(display("Indexer query failed: {source}"))]
    Graph { source: graph_client::Error },

    #[snafu(display("{source}"))]
    Deployment { source: DeploymentError },

    #[snafu(display("Failed to render output: {source}"))]
    Render { source: serde_json::Error },

    #[snafu(display("{message}"))]
    ActionFailed { message: String },

    #[snafu(display("Background task failed: {message}"))]
    Background { message: String },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    // Parse once for the env file location, then again so values from the
    // file are picked up.
    let args = Args::parse();
    match &args.env_file {
        Some(path) => {
            dotenvy::from_path(path).context(EnvFileSnafu { path })?;
        }
        None => {
            let _ = dotenvy::dotenv();
        }
    }
    let args = Args::parse();

    init_logger(&args.log_level).context(LoggerSnafu)?;

    let settings = Settings::from_args(&args).context(ConfigSnafu)?;
    settings
        .require(args.command.requirements())
        .context(ConfigSnafu)?;

    commands::run(args.command, &settings).await
}
