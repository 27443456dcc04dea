//! Feedback Sentiment Server
//!
//! Loads the sentiment model once, then serves `/analyze` until shutdown.
//! A model that fails to load stops the process before the port is bound.

use anyhow::Result;
use clap::Parser;
use feedback_sentiment_server::telemetry::{init_metrics, init_tracing};
use feedback_sentiment_server::{run_server, AppState, Cli, ServerConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    info!("Starting feedback sentiment server");

    let config = ServerConfig::load(&cli.config, &cli)?;
    info!("Configuration loaded successfully");
    info!("Classifier backend: {}", config.classifier.backend);
    info!("Model: {}", config.classifier.model.display_name());
    info!("Allowed origins: {:?}", config.cors.allowed_origins);

    init_metrics(&config.metrics)?;

    info!("Initializing classifier...");
    let state = AppState::from_config(&config.classifier).await?;

    run_server(config, state).await
}
