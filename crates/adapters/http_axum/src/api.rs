//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod registry;
#[allow(clippy::missing_errors_doc)]
pub mod search;
#[allow(clippy::missing_errors_doc)]
pub mod target;

use axum::Router;
use axum::routing::{get, post};

use homegraph_app::ports::{RegistryLoader, SnapshotSource};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<S, L>() -> Router<AppState<S, L>>
where
    S: SnapshotSource + 'static,
    L: RegistryLoader + Send + Sync + 'static,
{
    Router::new()
        // Targets
        .route("/target/extract", post(target::extract::<S, L>))
        .route("/target/tree", post(target::tree::<S, L>))
        // Picker
        .route("/search", get(search::search::<S, L>))
        // Registry
        .route("/registry", get(registry::status::<S, L>))
        .route("/registry/reload", post(registry::reload::<S, L>))
        .route("/registry/entities/{id}", get(registry::entity::<S, L>))
}
