//! Virtual storage server.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use vstore_api::{AppState, build_app};
use vstore_core::config::{AppConfig, CatalogProvider};
use vstore_core::error::AppError;
use vstore_database::{Catalog, DatabasePool};
use vstore_storage::LocalDiskStore;

#[tokio::main]
async fn main() {
    let env = std::env::var("VSTORE_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!(
        "Starting {} v{}",
        config.service_name,
        env!("CARGO_PKG_VERSION")
    );

    // ── Step 1: Catalog ──────────────────────────────────────────
    let catalog = connect_catalog(&config).await?;
    tracing::info!(backend = catalog.backend(), "Catalog ready");

    // ── Step 2: Storage root ─────────────────────────────────────
    let disk = LocalDiskStore::new(&config.storage.root_path).await?;
    tracing::info!(
        root = %config.storage.root_path,
        virtual_base = %config.storage.virtual_base,
        "Storage root ready"
    );

    // ── Step 3: Build and start HTTP server ──────────────────────
    let addr = config.server.bind_address();
    let state = AppState::new(config, catalog.clone(), Arc::new(disk));
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("Listening on {}", addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")));

    tracing::info!("Shutting down");
    catalog.close().await;

    served
}

/// Build the catalog for the configured provider.
async fn connect_catalog(config: &AppConfig) -> Result<Catalog, AppError> {
    match config.database.provider {
        CatalogProvider::Postgres => {
            tracing::info!("Connecting to database...");
            let pool = DatabasePool::connect(&config.database).await?;

            if config.database.run_migrations {
                tracing::info!("Running database migrations...");
                vstore_database::migration::run_migrations(pool.pool()).await?;
                tracing::info!("Database migrations complete");
            }

            Ok(Catalog::postgres(pool))
        }
        CatalogProvider::Memory => {
            tracing::warn!("Using the in-memory catalog; metadata is lost on restart");
            Ok(Catalog::memory())
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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
}
