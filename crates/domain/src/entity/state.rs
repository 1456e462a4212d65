//! Live state — the current value and attributes of an entity.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::AttributeValue;
use crate::id::EntityId;

/// Current state of an entity as reported by the live state store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveState {
    pub entity_id: EntityId,
    /// Raw state value, e.g. `"on"` or `"21.5"`.
    pub state: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeValue>,
    #[serde(default = "Utc::now")]
    pub last_updated: DateTime<Utc>,
}

impl LiveState {
    /// Create a state without attributes, stamped with the current time.
    #[must_use]
    pub fn new(entity_id: impl Into<EntityId>, state: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            state: state.into(),
            attributes: BTreeMap::new(),
            last_updated: Utc::now(),
        }
    }

    /// Attach an attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// The `device_class` attribute, if it is a string.
    #[must_use]
    pub fn device_class(&self) -> Option<&str> {
        self.attributes.get("device_class").and_then(AttributeValue::as_str)
    }

    /// The `friendly_name` attribute, if it is a string.
    #[must_use]
    pub fn friendly_name(&self) -> Option<&str> {
        self.attributes.get("friendly_name").and_then(AttributeValue::as_str)
    }

    /// Whether the entity is reachable.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.state != "unavailable"
    }
}
