//! Registry sync — load a complete registry dump and publish it.

use std::sync::Arc;

use homegraph_domain::error::HomeGraphError;
use homegraph_domain::registry::SnapshotStats;

use crate::ports::RegistryLoader;
use crate::snapshot_feed::SnapshotFeed;

/// Replaces the feed's snapshot with whatever the loader returns.
pub struct RegistrySync<L> {
    loader: L,
    feed: Arc<SnapshotFeed>,
}

impl<L: RegistryLoader> RegistrySync<L> {
    /// Create a new sync publishing into `feed`.
    pub fn new(loader: L, feed: Arc<SnapshotFeed>) -> Self {
        Self { loader, feed }
    }

    /// Load a fresh snapshot and make it current.
    ///
    /// On failure the current snapshot stays in effect.
    ///
    /// # Errors
    ///
    /// Returns the loader's error, typically [`HomeGraphError::Registry`]
    /// or [`HomeGraphError::Validation`].
    pub async fn reload(&self) -> Result<SnapshotStats, HomeGraphError> {
        let snapshot = self.loader.load().await?;
        let stats = snapshot.stats();
        self.feed.replace(snapshot);
        Ok(stats)
    }

    #[must_use]
    pub fn feed(&self) -> &Arc<SnapshotFeed> {
        &self.feed
    }
}
