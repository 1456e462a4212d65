//! Snapshot source port.

use std::sync::Arc;

use homegraph_domain::registry::RegistrySnapshot;

/// Hands out the registry snapshot currently in effect.
pub trait SnapshotSource: Send + Sync {
    fn current(&self) -> Arc<RegistrySnapshot>;
}

impl<T: SnapshotSource> SnapshotSource for Arc<T> {
    fn current(&self) -> Arc<RegistrySnapshot> {
        (**self).current()
    }
}
