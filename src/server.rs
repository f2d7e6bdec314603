//! Server runtime
//!
//! Logging setup, the listener loop with graceful shutdown, and the
//! development reload watcher.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::TokenSigner;
use crate::config::{paths::FinTrackPaths, settings::Settings};
use crate::error::{FinTrackError, FinTrackResult};
use crate::http::{build_router, AppState};
use crate::storage::{reload::DataFileWatcher, Storage};

/// Install the global subscriber: `RUST_LOG` filter (default `info`), JSON or plain output
pub fn init_tracing(log_json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    let result = if log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };
    if result.is_err() {
        warn!("tracing subscriber already installed");
    }
}

/// Open storage and serve the API until SIGINT or SIGTERM
pub async fn run(settings: Settings, paths: FinTrackPaths) -> FinTrackResult<()> {
    if settings.uses_default_secret() {
        warn!("SECRET_KEY is not set; tokens are signed with the development default");
    }

    let storage = Arc::new(Storage::open(paths)?);
    let state = AppState::new(Arc::clone(&storage), TokenSigner::from_settings(&settings));
    let app = build_router(state);

    let bind_addr = settings.bind_addr()?;
    let listener = TcpListener::bind(bind_addr)
        .await
        .map_err(|e| FinTrackError::Io(format!("failed to bind {bind_addr}: {e}")))?;

    let reload_task = settings.reload.then(|| {
        info!(
            interval_ms = settings.reload_interval_ms,
            "reload enabled: watching data files"
        );
        tokio::spawn(watch_data_files(storage, settings.reload_interval()))
    });

    info!("fintrack listening on {bind_addr}");
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .map_err(|e| FinTrackError::Io(format!("server failed: {e}")));

    if let Some(task) = reload_task {
        task.abort();
    }
    info!("fintrack stopped");
    served
}

/// Reload every repository whenever a data file changes on disk
///
/// Runs until the task is aborted. `run` spawns it when `--reload` is set.
pub async fn watch_data_files(storage: Arc<Storage>, interval: std::time::Duration) {
    let mut watcher = DataFileWatcher::new(storage.paths().data_files());
    let mut ticker = tokio::time::interval(interval);

    loop {
        ticker.tick().await;
        let changed = watcher.poll();
        if changed.is_empty() {
            continue;
        }

        let storage = Arc::clone(&storage);
        match tokio::task::spawn_blocking(move || storage.reload()).await {
            Ok(Ok(())) => info!(files = ?changed, "data reloaded"),
            Ok(Err(e)) => warn!(error = %e, "reload failed; keeping previous data"),
            Err(e) => warn!(error = %e, "reload task failed"),
        }
    }
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = sigint.recv() => {}
                }
            }
            _ => {
                warn!("could not register signal handlers; falling back to ctrl-c");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    info!("shutdown signal received");
}
