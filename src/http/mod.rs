//! HTTP API
//!
//! An axum router over the shared [`Storage`]. Handlers extract the caller,
//! run the synchronous service call on the blocking pool and serialize the
//! result as JSON.

pub mod error;
pub mod extract;
pub mod request_tracing;
mod routes;

use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::middleware;
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use serde_json::{json, Value};

use crate::auth::TokenSigner;
use crate::error::FinTrackResult;
use crate::storage::Storage;

pub use error::{ApiError, ApiResult};
pub use extract::CurrentUser;

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<Storage>,
    pub signer: Arc<TokenSigner>,
    pub(crate) request_id_seed: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(storage: Arc<Storage>, signer: TokenSigner) -> Self {
        Self {
            storage,
            signer: Arc::new(signer),
            request_id_seed: Arc::new(AtomicU64::new(1)),
        }
    }
}

/// Build the full application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(routes::auth::router())
        .merge(routes::users::router())
        .merge(routes::categories::router())
        .merge(routes::transactions::router())
        .merge(routes::budgets::router())
        .merge(routes::reports::router())
        .merge(routes::metrics::router())
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            request_tracing::request_tracing_middleware,
        ))
        .with_state(state)
}

/// Run a storage-bound closure on the blocking pool
pub(crate) async fn run_blocking<T, F>(state: &AppState, f: F) -> ApiResult<T>
where
    F: FnOnce(&Storage) -> FinTrackResult<T> + Send + 'static,
    T: Send + 'static,
{
    let storage = Arc::clone(&state.storage);
    tokio::task::spawn_blocking(move || f(&storage))
        .await
        .map_err(|e| ApiError::internal(format!("blocking task failed: {e}")))?
        .map_err(ApiError::from)
}

/// The local calendar date used for every named window
pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "FinTrack API running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "service": "fintrack" }))
}

async fn not_found() -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "not_found", "Not Found")
}
