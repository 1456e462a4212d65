//! Entity — a single observable/controllable aspect of a device.
//!
//! The registry record (this module) carries placement and visibility; the
//! current value lives in a [`LiveState`] keyed by the same id.

mod attribute_value;
mod state;

pub use attribute_value::AttributeValue;
pub use state::LiveState;

use serde::{Deserialize, Serialize};

use crate::error::{HomeGraphError, ValidationError};
use crate::id::{AreaId, DeviceId, EntityId, LabelId};

/// Marks an entity as secondary (not part of default area/device membership).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityCategory {
    Config,
    Diagnostic,
}

/// An entity registry record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub device_id: Option<DeviceId>,
    /// Overrides the device's area when set.
    #[serde(default)]
    pub area_id: Option<AreaId>,
    #[serde(default)]
    pub labels: Vec<LabelId>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub entity_category: Option<EntityCategory>,
}

impl Entity {
    /// Create a builder for constructing an [`Entity`].
    #[must_use]
    pub fn builder() -> EntityBuilder {
        EntityBuilder::default()
    }

    /// The entity domain, e.g. `light`.
    #[must_use]
    pub fn domain(&self) -> &str {
        self.id.domain()
    }

    /// Whether the entity is a config or diagnostic entity.
    #[must_use]
    pub fn is_secondary(&self) -> bool {
        self.entity_category.is_some()
    }

    /// Whether the entity carries `label`.
    #[must_use]
    pub fn has_label(&self, label: &LabelId) -> bool {
        self.labels.contains(label)
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`HomeGraphError::Validation`] when the id is empty or not of
    /// the form `domain.object_id`.
    pub fn validate(&self) -> Result<(), HomeGraphError> {
        if self.id.is_empty() {
            return Err(ValidationError::EmptyId.into());
        }
        if !self.id.is_well_formed() {
            return Err(ValidationError::MalformedEntityId(self.id.to_string()).into());
        }
        Ok(())
    }
}

/// Step-by-step builder for [`Entity`].
#[derive(Debug, Default)]
pub struct EntityBuilder {
    id: Option<EntityId>,
    name: Option<String>,
    device_id: Option<DeviceId>,
    area_id: Option<AreaId>,
    labels: Vec<LabelId>,
    hidden: bool,
    entity_category: Option<EntityCategory>,
}

impl EntityBuilder {
    #[must_use]
    pub fn id(mut self, id: impl Into<EntityId>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn device_id(mut self, device_id: impl Into<DeviceId>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }

    #[must_use]
    pub fn area_id(mut self, area_id: impl Into<AreaId>) -> Self {
        self.area_id = Some(area_id.into());
        self
    }

    #[must_use]
    pub fn label(mut self, label: impl Into<LabelId>) -> Self {
        self.labels.push(label.into());
        self
    }

    #[must_use]
    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    #[must_use]
    pub fn entity_category(mut self, category: EntityCategory) -> Self {
        self.entity_category = Some(category);
        self
    }

    /// Consume the builder, validate, and return an [`Entity`].
    ///
    /// # Errors
    ///
    /// Returns [`HomeGraphError::Validation`] if the id is missing or malformed.
    pub fn build(self) -> Result<Entity, HomeGraphError> {
        let entity = Entity {
            id: self.id.unwrap_or_else(|| EntityId::new("")),
            name: self.name,
            device_id: self.device_id,
            area_id: self.area_id,
            labels: self.labels,
            hidden: self.hidden,
            entity_category: self.entity_category,
        };
        entity.validate()?;
        Ok(entity)
    }
}
