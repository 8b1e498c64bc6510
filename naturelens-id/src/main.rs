//! naturelens-id - Image Identification Microservice
//!
//! Identifies plants, animals and landmarks in local images by routing each
//! request through external recognition providers and an encyclopedia
//! enricher. Serves HTTP on the configured bind address (default
//! 127.0.0.1:5780).

use anyhow::{Context, Result};
use clap::Parser;
use naturelens_common::config::{load_toml_config, resolve_config_path};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use naturelens_id::config::ProviderSettings;
use naturelens_id::services::DetectionOrchestrator;
use naturelens_id::AppState;

/// Command-line arguments
#[derive(Debug, Parser)]
#[command(name = "naturelens-id", version, about = "NatureLens identification service")]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overrides `bind_address` from the config file
    #[arg(short, long, env = "NATURELENS_BIND")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is read before logging starts so its level can seed the filter
    let config_path = resolve_config_path(args.config.as_deref());
    let config = load_toml_config(config_path.as_deref())
        .context("Failed to load configuration")?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting naturelens-id (Identification) microservice");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    if let Some(path) = &config_path {
        info!("Config: {}", path.display());
    }

    let settings = ProviderSettings::from_toml(&config);
    let orchestrator = DetectionOrchestrator::from_settings(&settings)
        .context("Failed to initialize identification providers")?;
    info!(
        fauna_min_confidence = settings.fauna_min_confidence,
        "Identification providers initialized"
    );

    let app = naturelens_id::build_router(AppState::new(orchestrator));

    let bind = args.bind.unwrap_or(config.bind_address);
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!("Listening on http://{}", bind);
    info!("Health check: http://{}/health", bind);

    axum::serve(listener, app).await?;

    Ok(())
}
