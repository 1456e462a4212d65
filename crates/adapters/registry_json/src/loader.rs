//! File-backed [`RegistryLoader`].

use std::future::Future;
use std::path::{Path, PathBuf};

use homegraph_app::ports::RegistryLoader;
use homegraph_domain::error::HomeGraphError;
use homegraph_domain::registry::RegistrySnapshot;

use crate::document::RegistryDocument;
use crate::error::LoaderError;

/// Configuration for the JSON registry loader.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the registry dump.
    pub path: PathBuf,
    /// Reject records referencing floors, areas or devices missing from the dump.
    pub strict: bool,
}

impl Config {
    /// Build a [`JsonRegistryLoader`] from this configuration.
    #[must_use]
    pub fn build(self) -> JsonRegistryLoader {
        JsonRegistryLoader { config: self }
    }
}

/// Reads the whole dump on every load.
#[derive(Debug, Clone)]
pub struct JsonRegistryLoader {
    config: Config,
}

impl JsonRegistryLoader {
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    async fn read(&self) -> Result<RegistryDocument, LoaderError> {
        let path = &self.config.path;
        let bytes = tokio::fs::read(path).await.map_err(|source| LoaderError::Io {
            path: path.clone(),
            source,
        })?;
        RegistryDocument::from_slice(&bytes)
    }
}

impl RegistryLoader for JsonRegistryLoader {
    fn load(&self) -> impl Future<Output = Result<RegistrySnapshot, HomeGraphError>> + Send {
        async move {
            let document = self.read().await?;
            tracing::debug!(
                path = %self.config.path.display(),
                areas = document.areas.len(),
                devices = document.devices.len(),
                entities = document.entities.len(),
                "read registry dump"
            );
            document.into_snapshot(self.config.strict)
        }
    }
}
