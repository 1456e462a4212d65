//! On-disk shape of a registry dump.

use serde::{Deserialize, Serialize};

use homegraph_domain::area::Area;
use homegraph_domain::device::Device;
use homegraph_domain::entity::{Entity, LiveState};
use homegraph_domain::error::HomeGraphError;
use homegraph_domain::floor::Floor;
use homegraph_domain::label::Label;
use homegraph_domain::registry::{RegistrySnapshot, RegistrySnapshotBuilder};

use crate::error::LoaderError;

/// A complete registry dump. Every section may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryDocument {
    pub floors: Vec<Floor>,
    pub areas: Vec<Area>,
    pub devices: Vec<Device>,
    pub entities: Vec<Entity>,
    pub labels: Vec<Label>,
    pub states: Vec<LiveState>,
}

impl RegistryDocument {
    /// Parse a dump from JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::Json`] when the bytes are not a valid dump.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, LoaderError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Build a snapshot from the dump.
    ///
    /// With `strict`, references to records missing from the dump are
    /// rejected instead of tolerated.
    ///
    /// # Errors
    ///
    /// Returns [`HomeGraphError::Validation`] when a record is invalid.
    pub fn into_snapshot(self, strict: bool) -> Result<RegistrySnapshot, HomeGraphError> {
        let builder: RegistrySnapshotBuilder = RegistrySnapshot::builder()
            .floors(self.floors)
            .areas(self.areas)
            .devices(self.devices)
            .entities(self.entities)
            .labels(self.labels)
            .states(self.states);
        if strict {
            builder.build_strict()
        } else {
            builder.build()
        }
    }
}
