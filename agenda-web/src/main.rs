//! agenda-web - contact manager web server
//!
//! Opens (or creates) the database under the root folder, seeds the admin
//! account when one is configured and serves the contact pages.

use agenda_common::config::{resolve_root_folder, RootFolderInitializer, TomlConfig};
use agenda_common::db::{ensure_admin_account, init_database};
use agenda_web::{build_router, AppState, PhotoStore, WebSettings};
use anyhow::{Context, Result};
use clap::Parser;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Command-line arguments for agenda-web
#[derive(Parser, Debug)]
#[command(name = "agenda-web")]
#[command(about = "Contact manager web server")]
#[command(version)]
struct Args {
    /// Bootstrap TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Root folder holding agenda.db and uploads/
    #[arg(short, long, env = "AGENDA_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "AGENDA_PORT")]
    port: Option<u16>,
}

fn init_tracing(config: &TomlConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.level.as_str().into());

    let file_layer = match &config.logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let (config, config_source) = TomlConfig::load_or_default(args.config.as_deref());

    init_tracing(&config)?;

    // Build identification first, before any database work
    info!(
        "Starting Agenda (agenda-web) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    config_source.log();

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), &config);
    let initializer = RootFolderInitializer::new(root_folder);
    initializer
        .ensure_directory_exists()
        .context("Failed to create root folder")?;
    info!("Root folder: {}", initializer.root_folder().display());

    let db_path = initializer.database_path();
    info!("Database path: {}", db_path.display());
    let pool = init_database(&db_path)
        .await
        .context("Failed to initialize database")?;

    if let Some(admin) = config.admin_account() {
        match ensure_admin_account(&pool, &admin).await {
            Ok(true) => info!("✓ Admin account {} created", admin.email),
            Ok(false) => info!("Admin account {} already present", admin.email),
            Err(e) => error!("Could not create admin account {}: {}", admin.email, e),
        }
    }

    let settings = WebSettings {
        max_upload_bytes: config.max_upload_bytes,
        session_timeout_minutes: config.session_timeout_minutes,
        secure_cookies: config.secure_cookies,
    };
    let photos = PhotoStore::new(initializer.uploads_path());
    let state = AppState::new(pool, photos, settings);
    let app = build_router(state);

    let port = args.port.unwrap_or(config.port);
    let addr = format!("{}:{}", config.bind_address, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("agenda-web listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
