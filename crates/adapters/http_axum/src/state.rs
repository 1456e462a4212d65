//! Shared application state for axum handlers.

use std::sync::Arc;

use homegraph_app::ports::{RegistryLoader, SnapshotSource};
use homegraph_app::services::registry_sync::RegistrySync;
use homegraph_app::services::target_service::TargetService;

/// Application state shared across all axum handlers.
///
/// Generic over the snapshot source and the registry loader to avoid
/// dynamic dispatch. `Clone` is implemented manually so the underlying
/// types themselves do not need to be `Clone`; only the `Arc` wrappers are
/// cloned.
pub struct AppState<S, L> {
    /// Extraction, display trees and picker search.
    pub target_service: Arc<TargetService<S>>,
    /// Reloads the registry snapshot on demand.
    pub registry_sync: Arc<RegistrySync<L>>,
}

impl<S, L> Clone for AppState<S, L> {
    fn clone(&self) -> Self {
        Self {
            target_service: Arc::clone(&self.target_service),
            registry_sync: Arc::clone(&self.registry_sync),
        }
    }
}

impl<S, L> AppState<S, L>
where
    S: SnapshotSource + 'static,
    L: RegistryLoader + Send + Sync + 'static,
{
    /// Create a new application state from service instances.
    pub fn new(target_service: TargetService<S>, registry_sync: RegistrySync<L>) -> Self {
        Self::from_arcs(Arc::new(target_service), Arc::new(registry_sync))
    }

    /// Create a new application state from pre-wrapped `Arc` services.
    ///
    /// Use this when services need to be shared with background tasks
    /// before constructing the HTTP state.
    pub fn from_arcs(
        target_service: Arc<TargetService<S>>,
        registry_sync: Arc<RegistrySync<L>>,
    ) -> Self {
        Self {
            target_service,
            registry_sync,
        }
    }
}
