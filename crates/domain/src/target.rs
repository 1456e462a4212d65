//! Target selections and their resolved form.

use serde::{Deserialize, Serialize};

use crate::id::{AreaId, DeviceId, EntityId, FloorId, LabelId};

/// A compound user selection. Any subset of the id lists may be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_ids: Option<Vec<AreaId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_ids: Option<Vec<DeviceId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_ids: Option<Vec<EntityId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floor_ids: Option<Vec<FloorId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_ids: Option<Vec<LabelId>>,
}

impl TargetSpec {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn area(mut self, id: impl Into<AreaId>) -> Self {
        self.area_ids.get_or_insert_with(Vec::new).push(id.into());
        self
    }

    #[must_use]
    pub fn device(mut self, id: impl Into<DeviceId>) -> Self {
        self.device_ids.get_or_insert_with(Vec::new).push(id.into());
        self
    }

    #[must_use]
    pub fn entity(mut self, id: impl Into<EntityId>) -> Self {
        self.entity_ids.get_or_insert_with(Vec::new).push(id.into());
        self
    }

    #[must_use]
    pub fn floor(mut self, id: impl Into<FloorId>) -> Self {
        self.floor_ids.get_or_insert_with(Vec::new).push(id.into());
        self
    }

    #[must_use]
    pub fn label(mut self, id: impl Into<LabelId>) -> Self {
        self.label_ids.get_or_insert_with(Vec::new).push(id.into());
        self
    }

    /// Whether the selection names nothing at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        fn blank<T>(ids: Option<&Vec<T>>) -> bool {
            ids.is_none_or(Vec::is_empty)
        }

        blank(self.area_ids.as_ref())
            && blank(self.device_ids.as_ref())
            && blank(self.entity_ids.as_ref())
            && blank(self.floor_ids.as_ref())
            && blank(self.label_ids.as_ref())
    }
}

/// The concrete, filter-compliant records a [`TargetSpec`] implies.
///
/// Every list keeps first-seen order and holds each id once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub referenced_areas: Vec<AreaId>,
    pub referenced_devices: Vec<DeviceId>,
    pub referenced_entities: Vec<EntityId>,
    pub missing_areas: Vec<AreaId>,
    pub missing_devices: Vec<DeviceId>,
    pub missing_floors: Vec<FloorId>,
    pub missing_labels: Vec<LabelId>,
    #[serde(default)]
    pub missing_entities: Vec<EntityId>,
}

impl ExtractionResult {
    /// Whether nothing was referenced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.referenced_areas.is_empty()
            && self.referenced_devices.is_empty()
            && self.referenced_entities.is_empty()
    }

    /// Whether any requested id was unknown.
    #[must_use]
    pub fn has_missing(&self) -> bool {
        !(self.missing_areas.is_empty()
            && self.missing_devices.is_empty()
            && self.missing_floors.is_empty()
            && self.missing_labels.is_empty()
            && self.missing_entities.is_empty())
    }

    #[must_use]
    pub fn missing_count(&self) -> usize {
        self.missing_areas.len()
            + self.missing_devices.len()
            + self.missing_floors.len()
            + self.missing_labels.len()
            + self.missing_entities.len()
    }
}

/// Reference to any registry record, tagged with its kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum TargetRef {
    Floor(FloorId),
    Area(AreaId),
    Device(DeviceId),
    Entity(EntityId),
    Label(LabelId),
}

impl TargetRef {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Floor(id) => id.as_str(),
            Self::Area(id) => id.as_str(),
            Self::Device(id) => id.as_str(),
            Self::Entity(id) => id.as_str(),
            Self::Label(id) => id.as_str(),
        }
    }
}
