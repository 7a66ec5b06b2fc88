//! DocVault server entry point.
//!
//! Bootstraps the state stores, access gate, and manifest, then starts the
//! Axum HTTP server with graceful shutdown. A failed manifest load is a
//! display-only condition — the server starts with an empty library and the
//! gate keeps working.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};

use docvault_core::gate::AccessGate;
use docvault_core::manifest::Manifest;
use docvault_storage::{MemoryBackend, StateStore};

use docvault_server::config::{ServerConfig, StorageBackendType};
use docvault_server::routes;
use docvault_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env()?;

    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    info!(storage = ?config.storage_backend, "DocVault starting");

    let state = build_app_state(&config)?;
    let app = routes::api_router(Arc::clone(&state));

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, "DocVault server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("DocVault server stopped");
    Ok(())
}

/// Build the shared application state.
fn build_app_state(config: &ServerConfig) -> anyhow::Result<Arc<AppState>> {
    // Durable scope: attempt counters and lockout survive restarts when a
    // persistent backend is configured.
    let durable: Arc<dyn StateStore> = match &config.storage_backend {
        StorageBackendType::Memory => {
            info!("using in-memory state (counters reset on restart)");
            Arc::new(MemoryBackend::new())
        }
        #[cfg(feature = "redb-backend")]
        StorageBackendType::Redb { path } => {
            info!(path = %path, "using redb state");
            std::fs::create_dir_all(path)
                .with_context(|| format!("failed to create state directory {path}"))?;
            let file = std::path::Path::new(path).join("gate.redb");
            Arc::new(docvault_storage::RedbBackend::open(&file).context("failed to open redb state")?)
        }
        #[cfg(not(feature = "redb-backend"))]
        StorageBackendType::Redb { .. } => {
            anyhow::bail!("redb backend requested but the redb-backend feature is disabled")
        }
    };

    // Session scope: markers live for the server process, like the
    // original's per-tab session storage.
    let session: Arc<dyn StateStore> = Arc::new(MemoryBackend::new());

    let gate = Arc::new(AccessGate::new(config.gate.clone(), durable, session));

    let manifest = match Manifest::load(&config.manifest_path) {
        Ok(manifest) => {
            info!(records = manifest.len(), "manifest loaded");
            manifest
        }
        Err(err) => {
            warn!(path = %config.manifest_path.display(), error = %err,
                "manifest load failed, starting with an empty library");
            Manifest::default()
        }
    };

    Ok(Arc::new(AppState {
        gate,
        manifest,
        docs_dir: config.docs_dir.clone(),
    }))
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => warn!(error = %err, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received Ctrl+C, shutting down"),
        () = terminate => info!("received SIGTERM, shutting down"),
    }
}
