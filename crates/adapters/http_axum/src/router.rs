//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use homegraph_app::ports::{RegistryLoader, SnapshotSource};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Serves API routes under `/api` and a liveness probe at `/health`.
/// Includes a [`TraceLayer`] that logs each HTTP request/response at the
/// `DEBUG` level using the `tracing` ecosystem.
pub fn build<S, L>(state: AppState<S, L>) -> Router
where
    S: SnapshotSource + 'static,
    L: RegistryLoader + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
