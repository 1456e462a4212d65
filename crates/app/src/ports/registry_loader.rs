//! Registry loader port — fetch the upstream registries in one piece.

use std::future::Future;

use homegraph_domain::error::HomeGraphError;
use homegraph_domain::registry::RegistrySnapshot;

/// Produces a complete [`RegistrySnapshot`] from an upstream source.
///
/// Every call returns a whole snapshot; there is no incremental update.
pub trait RegistryLoader {
    /// Load every registry and the live states.
    fn load(&self) -> impl Future<Output = Result<RegistrySnapshot, HomeGraphError>> + Send;
}

impl<T: RegistryLoader + Send + Sync> RegistryLoader for std::sync::Arc<T> {
    fn load(&self) -> impl Future<Output = Result<RegistrySnapshot, HomeGraphError>> + Send {
        (**self).load()
    }
}
