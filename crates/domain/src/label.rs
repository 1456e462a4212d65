//! Label — a cross-cutting tag attached to areas, devices and entities.
//!
//! Labels are not containers: membership lives on the tagged records and is
//! inverted into a lookup index by the [`registry`](crate::registry).

use serde::{Deserialize, Serialize};

use crate::error::{HomeGraphError, ValidationError};
use crate::id::LabelId;

/// A user-defined tag such as "Christmas lights".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: LabelId,
    pub name: String,
}

impl Label {
    /// Create a label after validating it.
    ///
    /// # Errors
    ///
    /// Returns [`HomeGraphError::Validation`] when `id` or `name` is empty.
    pub fn new(id: impl Into<LabelId>, name: impl Into<String>) -> Result<Self, HomeGraphError> {
        let label = Self {
            id: id.into(),
            name: name.into(),
        };
        label.validate()?;
        Ok(label)
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
