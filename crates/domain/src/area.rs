//! Area — a room or zone that groups devices and entities, optionally on a floor.

use serde::{Deserialize, Serialize};

use crate::error::{HomeGraphError, ValidationError};
use crate::id::{AreaId, FloorId, LabelId};

/// A room or zone such as "Living Room".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    pub id: AreaId,
    pub name: String,
    #[serde(default)]
    pub floor_id: Option<FloorId>,
    #[serde(default)]
    pub labels: Vec<LabelId>,
    /// Alternative names, used by search.
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl Area {
    /// Create a builder for constructing an [`Area`].
    #[must_use]
    pub fn builder() -> AreaBuilder {
        AreaBuilder::default()
    }

    /// Whether the area carries `label`.
    #[must_use]
    pub fn has_label(&self, label: &LabelId) -> bool {
        self.labels.contains(label)
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`HomeGraphError::Validation`] when `id` or `name` is empty.
    pub fn validate(&self) -> Result<(), HomeGraphError> {
        if self.id.is_empty() {
            return Err(ValidationError::EmptyId.into());
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(())
    }
}

/// Step-by-step builder for [`Area`].
#[derive(Debug, Default)]
pub struct AreaBuilder {
    id: Option<AreaId>,
    name: Option<String>,
    floor_id: Option<FloorId>,
    labels: Vec<LabelId>,
    aliases: Vec<String>,
}

impl AreaBuilder {
    #[must_use]
    pub fn id(mut self, id: impl Into<AreaId>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn floor_id(mut self, floor_id: impl Into<FloorId>) -> Self {
        self.floor_id = Some(floor_id.into());
        self
    }

    #[must_use]
    pub fn label(mut self, label: impl Into<LabelId>) -> Self {
        self.labels.push(label.into());
        self
    }

    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Consume the builder, validate, and return an [`Area`].
    ///
    /// # Errors
    ///
    /// Returns [`HomeGraphError::Validation`] if `id` or `name` is missing or empty.
    pub fn build(self) -> Result<Area, HomeGraphError> {
        let area = Area {
            id: self.id.unwrap_or_else(|| AreaId::new("")),
            name: self.name.unwrap_or_default(),
            floor_id: self.floor_id,
            labels: self.labels,
            aliases: self.aliases,
        };
        area.validate()?;
        Ok(area)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_build_valid_area_when_id_and_name_provided() {
        let area = Area::builder()
            .id("living_room")
            .name("Living Room")
            .build()
            .unwrap();
        assert_eq!(area.name, "Living Room");
        assert!(area.floor_id.is_none());
    }

    #[test]
    fn should_return_validation_error_when_name_is_empty() {
        let result = Area::builder().id("attic").build();
        assert!(matches!(
            result,
            Err(HomeGraphError::Validation(ValidationError::EmptyName))
        ));
    }

    #[test]
    fn should_return_validation_error_when_id_missing() {
        let result = Area::builder().name("Attic").build();
        assert!(matches!(
            result,
            Err(HomeGraphError::Validation(ValidationError::EmptyId))
        ));
    }

    #[test]
    fn should_build_area_on_floor_with_labels() {
        let area = Area::builder()
            .id("bedroom")
            .name("Bedroom")
            .floor_id("upstairs")
            .label("quiet")
            .alias("Master")
            .build()
            .unwrap();

        assert_eq!(area.floor_id, Some(FloorId::new("upstairs")));
        assert!(area.has_label(&LabelId::new("quiet")));
        assert_eq!(area.aliases, vec!["Master".to_string()]);
    }

    #[test]
    fn should_default_optional_fields_when_deserializing() {
        let area: Area =
            serde_json::from_value(serde_json::json!({"id": "hall", "name": "Hall"})).unwrap();
        assert!(area.labels.is_empty());
        assert!(area.aliases.is_empty());
        assert!(area.floor_id.is_none());
    }
}
