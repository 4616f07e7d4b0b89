// src/main.rs

use anyhow::Context;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio_stream::wrappers::TcpListenerStream;
use tracing_subscriber::EnvFilter;

use ledger::actuator::actuator_router;
use ledger::config::{LedgerConfig, LogFormat};
use ledger::server::{LedgerService, grpc_router};
use ledger::store::{LedgerStore, SqliteLedgerStore};

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ==============================================================================
    // 1. Configuration & Telemetry
    // ==============================================================================

    let config = LedgerConfig::load().context("Invalid configuration")?;
    init_tracing(config.log_format);

    // ==============================================================================
    // 2. Persistence
    // ==============================================================================

    let store: Arc<dyn LedgerStore> = Arc::new(
        SqliteLedgerStore::connect(config.database_url(), config.db_max_connections)
            .await
            .context("Failed to open ledger database")?,
    );

    // ==============================================================================
    // 3. Listeners & Service Start
    // ==============================================================================

    let grpc_listener = TcpListener::bind(config.grpc_addr)
        .await
        .with_context(|| format!("Failed to bind gRPC listener on {}", config.grpc_addr))?;
    let http_listener = TcpListener::bind(config.http_addr)
        .await
        .with_context(|| format!("Failed to bind actuator listener on {}", config.http_addr))?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown requested, draining connections");
        let _ = shutdown_tx.send(true);
    });

    let service = Arc::new(LedgerService::new(store.clone(), config.max_post_attempts));

    let mut grpc_shutdown = shutdown_rx.clone();
    let grpc = grpc_router(service).serve_with_incoming_shutdown(
        TcpListenerStream::new(grpc_listener),
        async move {
            let _ = grpc_shutdown.changed().await;
        },
    );

    let mut http_shutdown = shutdown_rx;
    let http = axum::serve(http_listener, actuator_router(store)).with_graceful_shutdown(async move {
        let _ = http_shutdown.changed().await;
    });

    tracing::info!(
        grpc = %config.grpc_addr,
        http = %config.http_addr,
        "Ledger service starting"
    );

    tokio::try_join!(
        async { grpc.await.context("gRPC server failed") },
        async { http.await.context("Actuator server failed") },
    )?;

    tracing::info!("Ledger service stopped");
    Ok(())
}
