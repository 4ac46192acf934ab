//! moodlens-ai - Photo analysis service
//!
//! Pulls a user's album photos from the social network, stages each one, annotates it with
//! a vision service and stores the result. Stored results are served grouped by dominant
//! emotion and by theme.

use anyhow::{Context, Result};
use clap::Parser;
use moodlens_common::config::{
    ensure_directory, load_toml_config_or_default, CompiledDefaults, RootFolderInitializer,
    RootFolderResolver,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use moodlens_ai::config::ServiceConfig;
use moodlens_ai::services::{
    CloudVisionClient, GraphAlbumClient, ImageStager, LocalObjectStore, PhotoPipeline,
};
use moodlens_ai::AppState;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "moodlens-ai")]
#[command(about = "Photo emotion and theme analysis service", long_about = None)]
struct Args {
    /// Port to listen on (default 3001)
    #[arg(short, long, env = "MOODLENS_PORT")]
    port: Option<u16>,

    /// Root folder for the database, transient downloads and staged photos
    #[arg(short, long, env = "MOODLENS_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// TOML config file (defaults to ~/.config/moodlens/config.toml)
    #[arg(short, long, env = "MOODLENS_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let defaults = CompiledDefaults::for_current_platform();

    // Config is read first so the [logging] level can seed the default filter
    let toml_config = load_toml_config_or_default(args.config.as_deref())
        .context("Failed to load TOML config")?;

    let default_filter = format!(
        "moodlens_ai={level},tower_http={level}",
        level = toml_config.log_level(&defaults)
    );
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env("MOODLENS_LOG")
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting moodlens-ai (Photo Analysis) service");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Step 1: Resolve root folder
    let root_folder = RootFolderResolver::new("moodlens-ai")
        .with_cli_arg(args.root_folder.clone())
        .with_toml_config(&toml_config)
        .resolve();

    // Step 2: Create root folder layout
    let initializer = RootFolderInitializer::new(root_folder.clone());
    initializer
        .ensure_directory_exists()
        .context("Failed to initialize root folder")?;

    let port = args.port.unwrap_or(defaults.port);
    let config = ServiceConfig::resolve(root_folder, port, &toml_config)
        .context("Failed to resolve service configuration")?;
    ensure_directory(&config.temp_dir).context("Failed to create transient directory")?;
    ensure_directory(&config.media_dir).context("Failed to create media directory")?;

    // Step 3: Open or create database
    info!("Database: {}", config.database_path.display());
    let db_pool = moodlens_ai::db::init_database_pool(&config.database_path).await?;
    info!("Database connection established");

    // Step 4: Wire the pipeline
    let store = Arc::new(LocalObjectStore::new(
        config.media_dir.clone(),
        config.public_base_url.clone(),
    ));
    let stager = ImageStager::new(config.temp_dir.clone(), store, config.http_timeout)
        .context("Failed to create image stager")?;
    let vision = Arc::new(
        CloudVisionClient::new(
            config.vision_endpoint.clone(),
            config.vision_api_key.clone(),
            config.http_timeout,
        )
        .context("Failed to create vision client")?,
    );
    let album_source = Arc::new(
        GraphAlbumClient::new(config.graph_api_base_url.clone(), config.http_timeout)
            .context("Failed to create album client")?,
    );

    info!(
        "Thematic categories: {}",
        config
            .thematic
            .categories()
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let pipeline = Arc::new(
        PhotoPipeline::new(db_pool.clone(), stager, vision, config.thematic.clone())
            .with_max_concurrent_photos(config.max_concurrent_photos),
    );
    info!("Max concurrent photos per batch: {}", pipeline.max_concurrent_photos());

    let state = AppState::new(db_pool, album_source, pipeline)
        .with_media_dir(config.media_dir.clone());
    let app = moodlens_ai::build_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
