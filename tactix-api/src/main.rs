//! tactix-api - chess puzzle trainer service
//!
//! Stores puzzles, validates their solutions at creation, and serves them in
//! a browse order and a category-diverse practice order.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tactix_common::config::{load_config, resolve_config_path, CONFIG_ENV_VAR};
use tactix_common::db::{self, sessions};
use tactix_api::{build_router, AppState};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for tactix-api
///
/// Explicit flags override the config file.
#[derive(Parser, Debug)]
#[command(name = "tactix-api")]
#[command(about = "Chess puzzle trainer HTTP service")]
#[command(version)]
struct Args {
    /// Path to TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "TACTIX_PORT")]
    port: Option<u16>,

    /// SQLite database file
    #[arg(short, long, env = "TACTIX_DATABASE")]
    database: Option<PathBuf>,

    /// Maximum entries per returned sequence
    #[arg(long)]
    sequence_cap: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = resolve_config_path(args.config.as_deref(), CONFIG_ENV_VAR);
    let (mut config, config_source) =
        load_config(config_path.as_deref()).context("Failed to load configuration")?;

    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(database) = args.database {
        config.database_path = Some(database);
    }
    if let Some(cap) = args.sequence_cap {
        config.sequence.cap = cap;
    }

    // RUST_LOG wins over the configured level
    let level = &config.logging.level;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("tactix_api={level},tactix_common={level},tower_http=info").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting Tactix API (tactix-api) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    // Loading ran before the subscriber existed; report it now
    config_source.log();
    config.validate().context("Invalid configuration")?;

    let db_path = config.database_path();
    info!("Database path: {}", db_path.display());

    let pool = match db::init_database(&db_path).await {
        Ok(pool) => {
            info!("✓ Connected to database");
            pool
        }
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return Err(e.into());
        }
    };

    match sessions::purge_expired_sessions(&pool).await {
        Ok(0) => {}
        Ok(n) => info!("Purged {} expired sessions", n),
        Err(e) => warn!("Could not purge expired sessions: {}", e),
    }

    if config.sequence.seed.is_some() {
        warn!("sequence.seed is set: every request returns the same random order");
    }
    info!("Sequence cap: {}", config.sequence.cap);

    let state = AppState::from_config(pool, &config);
    let app = build_router(state);

    let addr = format!("{}:{}", config.bind_addr, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("tactix-api listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
