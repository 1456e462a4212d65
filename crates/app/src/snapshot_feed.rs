//! In-process snapshot feed backed by a tokio watch channel.

use std::sync::Arc;

use tokio::sync::watch;

use homegraph_domain::registry::RegistrySnapshot;

use crate::ports::SnapshotSource;

/// Holds the current [`RegistrySnapshot`].
///
/// Snapshots are swapped whole, so a reader never observes a partially
/// updated registry.
#[derive(Debug)]
pub struct SnapshotFeed {
    sender: watch::Sender<Arc<RegistrySnapshot>>,
}

impl Default for SnapshotFeed {
    fn default() -> Self {
        Self::new(RegistrySnapshot::default())
    }
}

impl SnapshotFeed {
    /// Create a feed starting with `initial`.
    #[must_use]
    pub fn new(initial: RegistrySnapshot) -> Self {
        let (sender, _) = watch::channel(Arc::new(initial));
        Self { sender }
    }

    /// Publish a new snapshot, returning it.
    pub fn replace(&self, snapshot: RegistrySnapshot) -> Arc<RegistrySnapshot> {
        let snapshot = Arc::new(snapshot);
        let stats = snapshot.stats();
        self.sender.send_replace(Arc::clone(&snapshot));
        tracing::info!(
            floors = stats.floors,
            areas = stats.areas,
            devices = stats.devices,
            entities = stats.entities,
            labels = stats.labels,
            states = stats.states,
            "registry snapshot replaced"
        );
        snapshot
    }
}

impl SnapshotSource for SnapshotFeed {
    fn current(&self) -> Arc<RegistrySnapshot> {
        Arc::clone(&self.sender.borrow())
    }
}
