//! Floor — a level of the building that contains areas.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::{HomeGraphError, ValidationError};
use crate::id::FloorId;

/// A building level such as "Ground floor".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Floor {
    pub id: FloorId,
    pub name: String,
    /// Ordering key; `None` sorts after every numbered level.
    #[serde(default)]
    pub level: Option<i32>,
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl Floor {
    /// Create a builder for constructing a [`Floor`].
    #[must_use]
    pub fn builder() -> FloorBuilder {
        FloorBuilder::default()
    }

    /// Display ordering: `level` ascending with unset levels last, then name.
    #[must_use]
    pub fn display_cmp(&self, other: &Self) -> Ordering {
        let by_level = match (self.level, other.level) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_level.then_with(|| self.name.cmp(&other.name))
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

/// Step-by-step builder for [`Floor`].
#[derive(Debug, Default)]
pub struct FloorBuilder {
    id: Option<FloorId>,
    name: Option<String>,
    level: Option<i32>,
    aliases: Vec<String>,
}

impl FloorBuilder {
    #[must_use]
    pub fn id(mut self, id: impl Into<FloorId>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn level(mut self, level: i32) -> Self {
        self.level = Some(level);
        self
    }

    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Consume the builder, validate, and return a [`Floor`].
    ///
    /// # Errors
    ///
    /// Returns [`HomeGraphError::Validation`] if `id` or `name` is missing or empty.
    pub fn build(self) -> Result<Floor, HomeGraphError> {
        let floor = Floor {
            id: self.id.unwrap_or_else(|| FloorId::new("")),
            name: self.name.unwrap_or_default(),
            level: self.level,
            aliases: self.aliases,
        };
        floor.validate()?;
        Ok(floor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor(id: &str, name: &str, level: Option<i32>) -> Floor {
        let builder = Floor::builder().id(id).name(name);
        match level {
            Some(level) => builder.level(level).build().unwrap(),
            None => builder.build().unwrap(),
        }
    }

    #[test]
    fn should_order_by_level_then_name() {
        let mut floors = vec![
            floor("attic", "Attic", Some(2)),
            floor("ground", "Ground", Some(0)),
            floor("basement", "Basement", Some(-1)),
            floor("annex", "Annex", Some(0)),
        ];
        floors.sort_by(Floor::display_cmp);
        let names: Vec<&str> = floors.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Basement", "Annex", "Ground", "Attic"]);
    }

    #[test]
    fn should_order_unset_levels_last() {
        let mut floors = vec![
            floor("garden", "Garden", None),
            floor("top", "Top", Some(9)),
        ];
        floors.sort_by(Floor::display_cmp);
        assert_eq!(floors[0].name, "Top");
        assert_eq!(floors[1].name, "Garden");
    }

    #[test]
    fn should_reject_floor_without_name() {
        let result = Floor::builder().id("ground").build();
        assert!(matches!(
            result,
            Err(HomeGraphError::Validation(ValidationError::EmptyName))
        ));
    }
}
