//! Device — a physical or virtual thing that exposes one or more entities.

use serde::{Deserialize, Serialize};

use crate::error::{HomeGraphError, ValidationError};
use crate::id::{AreaId, DeviceId, LabelId};

/// A device registry record.
///
/// Entities point at their device through `device_id`; the device itself
/// does not list them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    #[serde(default)]
    pub name: Option<String>,
    /// Name set by the user, preferred over `name` for display.
    #[serde(default)]
    pub name_by_user: Option<String>,
    #[serde(default)]
    pub area_id: Option<AreaId>,
    #[serde(default)]
    pub labels: Vec<LabelId>,
}

impl Device {
    /// Create a builder for constructing a [`Device`].
    #[must_use]
    pub fn builder() -> DeviceBuilder {
        DeviceBuilder::default()
    }

    /// Name shown to users: `name_by_user`, then `name`, then the id.
    #[must_use]
    pub fn display_name(&self) -> &str {
        [self.name_by_user.as_deref(), self.name.as_deref()]
            .into_iter()
            .flatten()
            .find(|name| !name.is_empty())
            .unwrap_or(self.id.as_str())
    }

    /// Whether the device carries `label`.
    #[must_use]
    pub fn has_label(&self, label: &LabelId) -> bool {
        self.labels.contains(label)
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`HomeGraphError::Validation`] when `id` is empty.
    pub fn validate(&self) -> Result<(), HomeGraphError> {
        if self.id.is_empty() {
            return Err(ValidationError::EmptyId.into());
        }
        Ok(())
    }
}

/// Step-by-step builder for [`Device`].
#[derive(Debug, Default)]
pub struct DeviceBuilder {
    id: Option<DeviceId>,
    name: Option<String>,
    name_by_user: Option<String>,
    area_id: Option<AreaId>,
    labels: Vec<LabelId>,
}

impl DeviceBuilder {
    #[must_use]
    pub fn id(mut self, id: impl Into<DeviceId>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn name_by_user(mut self, name: impl Into<String>) -> Self {
        self.name_by_user = Some(name.into());
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

    /// Consume the builder, validate, and return a [`Device`].
    ///
    /// # Errors
    ///
    /// Returns [`HomeGraphError::Validation`] if `id` is missing or empty.
    pub fn build(self) -> Result<Device, HomeGraphError> {
        let device = Device {
            id: self.id.unwrap_or_else(|| DeviceId::new("")),
            name: self.name,
            name_by_user: self.name_by_user,
            area_id: self.area_id,
            labels: self.labels,
        };
        device.validate()?;
        Ok(device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_prefer_user_name_for_display() {
        let device = Device::builder()
            .id("hue_bridge")
            .name("Hue Bridge")
            .name_by_user("Living room bridge")
            .build()
            .unwrap();
        assert_eq!(device.display_name(), "Living room bridge");
    }

    #[test]
    fn should_fall_back_to_id_when_unnamed() {
        let device = Device::builder().id("0xdeadbeef").build().unwrap();
        assert_eq!(device.display_name(), "0xdeadbeef");
    }

    #[test]
    fn should_reject_device_without_id() {
        let result = Device::builder().name("Orphan").build();
        assert!(matches!(
            result,
            Err(HomeGraphError::Validation(ValidationError::EmptyId))
        ));
    }

    #[test]
    fn should_build_device_in_area_with_label() {
        let device = Device::builder()
            .id("thermostat")
            .area_id("hall")
            .label("climate")
            .build()
            .unwrap();
        assert_eq!(device.area_id, Some(AreaId::new("hall")));
        assert!(device.has_label(&LabelId::new("climate")));
    }
}
