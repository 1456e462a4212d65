//! # homegraph-adapter-registry-json
//!
//! Registry loader reading a JSON dump of the upstream registries.
//!
//! ## Responsibilities
//! - Implement the `RegistryLoader` port defined in `homegraph-app::ports`
//! - Parse the dump format (floors, areas, devices, entities, labels, states)
//! - Map the dump into a validated `RegistrySnapshot`
//!
//! ## Dependency rule
//! Depends on `homegraph-app` (for port traits) and `homegraph-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

pub mod document;
pub mod error;
pub mod loader;

pub use document::RegistryDocument;
pub use error::LoaderError;
pub use loader::{Config, JsonRegistryLoader};
