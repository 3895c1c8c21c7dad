//! mixwheel-web - Harmonic playlist organizer
//!
//! Serves the account connection and playlist flow pages, and writes
//! organized sequences back to the user's Spotify library.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use mixwheel_common::config::{CliOverrides, Settings};
use mixwheel_web::catalog::SpotifyClient;
use mixwheel_web::{build_router, AppState};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for mixwheel-web
#[derive(Parser, Debug)]
#[command(name = "mixwheel-web")]
#[command(about = "Harmonic mixing playlist organizer")]
#[command(version)]
struct Args {
    /// TOML config file (default: <config dir>/mixwheel/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind the HTTP listener to
    #[arg(short, long)]
    bind: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// OAuth client id registered with Spotify
    #[arg(long)]
    client_id: Option<String>,

    /// OAuth redirect URI (must route to /auth/callback)
    #[arg(long)]
    redirect_uri: Option<String>,
}

impl From<Args> for CliOverrides {
    fn from(args: Args) -> Self {
        Self {
            config_path: args.config,
            bind_address: args.bind,
            port: args.port,
            client_id: args.client_id,
            redirect_uri: args.redirect_uri,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG wins; otherwise start at info and switch to the configured
    // level once settings are resolved
    let env_filter = EnvFilter::try_from_default_env().ok();
    let from_env = env_filter.is_some();
    let (filter, filter_handle) =
        reload::Layer::new(env_filter.unwrap_or_else(|| EnvFilter::new("info")));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting MixWheel (mixwheel-web) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let cli = CliOverrides::from(Args::parse());
    let settings = Settings::resolve(&cli).context("Failed to resolve configuration")?;

    if !from_env {
        let level = EnvFilter::try_new(&settings.log_level)
            .with_context(|| format!("Invalid log level: {}", settings.log_level))?;
        filter_handle
            .reload(level)
            .context("Failed to apply configured log level")?;
    }

    info!("Catalog API: {}", settings.api_base_url);
    info!("OAuth redirect URI: {}", settings.redirect_uri);
    info!("Session TTL: {} minutes", settings.session_ttl_minutes);

    let catalog = SpotifyClient::new(&settings.api_base_url)
        .context("Failed to create catalog client")?;

    let listen_addr = settings.listen_addr();
    let state = AppState::new(Arc::new(catalog), settings);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", listen_addr))?;
    info!("mixwheel-web listening on http://{}", listen_addr);
    info!("Health check: http://{}/health", listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM
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
            Ok(mut sigterm) => {
                sigterm.recv().await;
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
