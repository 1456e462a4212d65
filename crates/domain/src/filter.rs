//! Filter predicate composer.
//!
//! [`FilterCriteria`] describes what a picker or a resolution call accepts;
//! [`TargetFilter`] binds it to a snapshot and answers the same question at
//! every level of the hierarchy (entity, device, area, label). Every caller
//! goes through these predicates so a node and its children can never
//! disagree about what passes.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::area::Area;
use crate::device::Device;
use crate::entity::{Entity, LiveState};
use crate::id::LabelId;
use crate::registry::RegistrySnapshot;

/// Custom predicate over an entity's live state.
pub type EntityPredicate = Arc<dyn Fn(&LiveState) -> bool + Send + Sync>;

/// Custom predicate over a device record.
pub type DevicePredicate = Arc<dyn Fn(&Device) -> bool + Send + Sync>;

/// Whether config/diagnostic entities count as members of areas, devices and labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecondaryEntities {
    #[default]
    Exclude,
    Include,
}

impl SecondaryEntities {
    #[must_use]
    pub fn included(self) -> bool {
        matches!(self, Self::Include)
    }
}

/// Declarative allow/deny lists plus optional custom predicates.
///
/// The lists travel over the wire; the predicates only exist in-process and
/// compare by identity.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    pub include_domains: Option<BTreeSet<String>>,
    pub exclude_domains: Option<BTreeSet<String>>,
    pub include_device_classes: Option<BTreeSet<String>>,
    #[serde(skip)]
    pub device_filter: Option<DevicePredicate>,
    #[serde(skip)]
    pub entity_filter: Option<EntityPredicate>,
}

impl FilterCriteria {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn include_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_domains = Some(domains.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn exclude_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_domains = Some(domains.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn include_device_classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_device_classes = Some(classes.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn device_filter(mut self, predicate: impl Fn(&Device) -> bool + Send + Sync + 'static) -> Self {
        self.device_filter = Some(Arc::new(predicate));
        self
    }

    #[must_use]
    pub fn entity_filter(
        mut self,
        predicate: impl Fn(&LiveState) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.entity_filter = Some(Arc::new(predicate));
        self
    }

    /// Whether no constraint at all is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.include_domains.is_none()
            && self.exclude_domains.is_none()
            && self.include_device_classes.is_none()
            && self.device_filter.is_none()
            && self.entity_filter.is_none()
    }
}

impl PartialEq for FilterCriteria {
    fn eq(&self, other: &Self) -> bool {
        fn same<T: ?Sized>(a: Option<&Arc<T>>, b: Option<&Arc<T>>) -> bool {
            match (a, b) {
                (None, None) => true,
                (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                _ => false,
            }
        }

        self.include_domains == other.include_domains
            && self.exclude_domains == other.exclude_domains
            && self.include_device_classes == other.include_device_classes
            && same(self.device_filter.as_ref(), other.device_filter.as_ref())
            && same(self.entity_filter.as_ref(), other.entity_filter.as_ref())
    }
}

impl fmt::Debug for FilterCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterCriteria")
            .field("include_domains", &self.include_domains)
            .field("exclude_domains", &self.exclude_domains)
            .field("include_device_classes", &self.include_device_classes)
            .field("device_filter", &self.device_filter.is_some())
            .field("entity_filter", &self.entity_filter.is_some())
            .finish()
    }
}

/// [`FilterCriteria`] bound to a snapshot.
#[derive(Debug, Clone, Copy)]
pub struct TargetFilter<'a> {
    snapshot: &'a RegistrySnapshot,
    criteria: &'a FilterCriteria,
    secondary: SecondaryEntities,
}

impl<'a> TargetFilter<'a> {
    #[must_use]
    pub fn new(snapshot: &'a RegistrySnapshot, criteria: &'a FilterCriteria) -> Self {
        Self {
            snapshot,
            criteria,
            secondary: SecondaryEntities::default(),
        }
    }

    #[must_use]
    pub fn with_secondary(mut self, secondary: SecondaryEntities) -> Self {
        self.secondary = secondary;
        self
    }

    #[must_use]
    pub fn snapshot(&self) -> &'a RegistrySnapshot {
        self.snapshot
    }

    #[must_use]
    pub fn criteria(&self) -> &'a FilterCriteria {
        self.criteria
    }

    #[must_use]
    pub fn secondary(&self) -> SecondaryEntities {
        self.secondary
    }

    /// Whether a single entity passes the criteria.
    ///
    /// Hidden entities never pass. Secondary entities pass only when
    /// `include_secondary` is set. A missing live state fails any
    /// device-class or custom entity filter.
    #[must_use]
    pub fn entity_meets_filter(&self, entity: &Entity, include_secondary: bool) -> bool {
        if entity.hidden {
            return false;
        }
        if entity.is_secondary() && !include_secondary {
            return false;
        }

        let domain = entity.domain();
        if let Some(domains) = &self.criteria.include_domains
            && !domains.contains(domain)
        {
            return false;
        }
        if let Some(domains) = &self.criteria.exclude_domains
            && domains.contains(domain)
        {
            return false;
        }

        let state = self.snapshot.state(&entity.id);
        if let Some(classes) = &self.criteria.include_device_classes {
            let Some(class) = state.and_then(LiveState::device_class) else {
                return false;
            };
            if !classes.contains(class) {
                return false;
            }
        }
        if let Some(predicate) = &self.criteria.entity_filter {
            let Some(state) = state else {
                return false;
            };
            if !predicate(state) {
                return false;
            }
        }
        true
    }

    /// [`entity_meets_filter`](Self::entity_meets_filter) under this filter's secondary policy.
    #[must_use]
    pub fn entity_passes(&self, entity: &Entity) -> bool {
        self.entity_meets_filter(entity, self.secondary.included())
    }

    /// A device passes when one of its entities passes and the custom
    /// device predicate (if any) accepts it.
    #[must_use]
    pub fn device_meets_filter(&self, device: &Device) -> bool {
        let has_member = self
            .snapshot
            .entities_of_device(&device.id)
            .iter()
            .filter_map(|id| self.snapshot.entity(id))
            .any(|entity| self.entity_passes(entity));
        if !has_member {
            return false;
        }
        self.criteria
            .device_filter
            .as_ref()
            .is_none_or(|predicate| predicate(device))
    }

    /// An area passes when one of its devices or one of its directly
    /// assigned entities passes.
    #[must_use]
    pub fn area_meets_filter(&self, area: &Area) -> bool {
        let device_passes = self
            .snapshot
            .devices_in_area(&area.id)
            .iter()
            .filter_map(|id| self.snapshot.device(id))
            .any(|device| self.device_meets_filter(device));

        device_passes
            || self
                .snapshot
                .entities_in_area(&area.id)
                .iter()
                .filter_map(|id| self.snapshot.entity(id))
                .any(|entity| self.entity_passes(entity))
    }

    /// A label passes when any record it tags passes at its own level.
    #[must_use]
    pub fn label_meets_filter(&self, label: &LabelId) -> bool {
        let members = self.snapshot.label_members(label);
        members
            .areas
            .iter()
            .filter_map(|id| self.snapshot.area(id))
            .any(|area| self.area_meets_filter(area))
            || members
                .devices
                .iter()
                .filter_map(|id| self.snapshot.device(id))
                .any(|device| self.device_meets_filter(device))
            || members
                .entities
                .iter()
                .filter_map(|id| self.snapshot.entity(id))
                .any(|entity| self.entity_passes(entity))
    }
}
