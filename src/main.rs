//! To-do board server.
//!
//! # Environment Variables
//!
//! - `STORAGE_MODE`: `in_memory` (default) | `mongodb` | `postgres`
//! - `MONGODB_URI`: `MongoDB` connection string (required when `STORAGE_MODE=mongodb`)
//! - `MONGODB_DATABASE`: `MongoDB` database name (default: `todo_app`)
//! - `DATABASE_URL`: `PostgreSQL` connection URL (required when `STORAGE_MODE=postgres`)
//! - `RUST_LOG`: Logging level (e.g., `debug`, `info`, `todo_board=debug`)
//! - `LOG_FORMAT`: `pretty` (default) | `json`
//! - `HOST`: Server host address (default: `0.0.0.0`)
//! - `PORT`: Server port (default: `3000`)
//! - `LISTING_CACHE_CAPACITY`: cached listing pages, `0` disables (default: `64`)

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use todo_board::api::{AppState, create_router};
use todo_board::domain::SystemClock;
use todo_board::infrastructure::{AppConfig, LogFormat, RepositoryFactory};

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "todo_board=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            init_tracing(LogFormat::default());
            tracing::error!("Configuration error: {}", error);
            std::process::exit(1);
        }
    };
    init_tracing(config.log_format);

    tracing::info!("Starting to-do board");

    let factory = match RepositoryFactory::from_env() {
        Ok(factory) => factory,
        Err(error) => {
            tracing::error!("Configuration error: {}", error);
            std::process::exit(1);
        }
    };

    tracing::info!(
        storage_mode = factory.config().storage_mode.as_str(),
        listing_cache_capacity = config.listing_cache_capacity,
        "Configuration loaded"
    );

    let repositories = match factory.open().await {
        Ok(repositories) => repositories,
        Err(error) => {
            tracing::error!("Failed to open the store: {}", error);
            std::process::exit(1);
        }
    };

    let state = match AppState::from_repositories(
        repositories.clone(),
        Arc::new(SystemClock),
        config.listing_cache_capacity,
    ) {
        Ok(state) => state,
        Err(error) => {
            tracing::error!(error = ?error, "Failed to compile templates");
            std::process::exit(1);
        }
    };

    let service = state.service.clone();
    let application = create_router(state);

    let address = config.socket_address();
    let listener = match TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(error) => {
            tracing::error!(%error, "Failed to bind to address {}", address);
            std::process::exit(1);
        }
    };

    match listener.local_addr() {
        Ok(address) => tracing::info!("Listening on {}", address),
        Err(error) => tracing::warn!(%error, "Could not determine local address"),
    }

    if let Err(error) = axum::serve(listener, application)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(%error, "Server error");
        repositories.shutdown().await;
        std::process::exit(1);
    }

    if let Some(stats) = service.cache_stats() {
        tracing::info!(
            hits = stats.hits,
            misses = stats.misses,
            "Listing cache statistics"
        );
    }
    repositories.shutdown().await;
    tracing::info!("Server shutdown complete");
}

/// Completes on SIGINT (Ctrl+C), or on SIGTERM where supported.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::warn!(%error, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::warn!(%error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
