//! Registry snapshot — an immutable, fully indexed view of the registries.
//!
//! A snapshot is built once from a complete registry dump and replaced
//! wholesale on every upstream change. Nothing in the crate mutates it.
//! Maps are ordered by id, which is the "snapshot iteration order" used by
//! the display tree and the picker candidate lists.

mod index;

pub use index::LabelMembers;

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::area::Area;
use crate::device::Device;
use crate::entity::{Entity, LiveState};
use crate::error::{HomeGraphError, ValidationError};
use crate::floor::Floor;
use crate::id::{AreaId, DeviceId, EntityId, FloorId, LabelId};
use crate::label::Label;

use index::MembershipIndex;

/// Immutable registry snapshot plus the live state store.
#[derive(Debug)]
pub struct RegistrySnapshot {
    floors: BTreeMap<FloorId, Floor>,
    areas: BTreeMap<AreaId, Area>,
    devices: BTreeMap<DeviceId, Device>,
    entities: BTreeMap<EntityId, Entity>,
    labels: BTreeMap<LabelId, Label>,
    states: BTreeMap<EntityId, LiveState>,
    index: MembershipIndex,
    loaded_at: DateTime<Utc>,
}

/// Record counts of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SnapshotStats {
    pub floors: usize,
    pub areas: usize,
    pub devices: usize,
    pub entities: usize,
    pub labels: usize,
    pub states: usize,
}

impl Default for RegistrySnapshot {
    fn default() -> Self {
        Self {
            floors: BTreeMap::new(),
            areas: BTreeMap::new(),
            devices: BTreeMap::new(),
            entities: BTreeMap::new(),
            labels: BTreeMap::new(),
            states: BTreeMap::new(),
            index: MembershipIndex::default(),
            loaded_at: Utc::now(),
        }
    }
}

impl RegistrySnapshot {
    /// Create a builder for constructing a [`RegistrySnapshot`].
    #[must_use]
    pub fn builder() -> RegistrySnapshotBuilder {
        RegistrySnapshotBuilder::default()
    }

    #[must_use]
    pub fn floor(&self, id: &FloorId) -> Option<&Floor> {
        self.floors.get(id)
    }

    #[must_use]
    pub fn area(&self, id: &AreaId) -> Option<&Area> {
        self.areas.get(id)
    }

    #[must_use]
    pub fn device(&self, id: &DeviceId) -> Option<&Device> {
        self.devices.get(id)
    }

    #[must_use]
    pub fn entity(&self, id: &EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    #[must_use]
    pub fn label(&self, id: &LabelId) -> Option<&Label> {
        self.labels.get(id)
    }

    /// Live state of an entity, if the state store has one.
    #[must_use]
    pub fn state(&self, id: &EntityId) -> Option<&LiveState> {
        self.states.get(id)
    }

    pub fn floors(&self) -> impl Iterator<Item = &Floor> {
        self.floors.values()
    }

    pub fn areas(&self) -> impl Iterator<Item = &Area> {
        self.areas.values()
    }

    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.devices.values()
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.labels.values()
    }

    /// A label is known when it is registered or tags at least one record.
    #[must_use]
    pub fn has_label(&self, id: &LabelId) -> bool {
        self.labels.contains_key(id) || self.index.labels.contains(id)
    }

    /// Registered labels plus labels only referenced by records, in id order.
    #[must_use]
    pub fn known_labels(&self) -> BTreeSet<&LabelId> {
        self.labels.keys().chain(self.index.labels.ids()).collect()
    }

    /// Areas whose `floor_id` is `floor`.
    #[must_use]
    pub fn areas_on_floor(&self, floor: &FloorId) -> &[AreaId] {
        lookup(&self.index.areas_by_floor, floor)
    }

    /// Devices whose `area_id` is `area`.
    #[must_use]
    pub fn devices_in_area(&self, area: &AreaId) -> &[DeviceId] {
        lookup(&self.index.devices_by_area, area)
    }

    /// Entities whose `device_id` is `device`.
    #[must_use]
    pub fn entities_of_device(&self, device: &DeviceId) -> &[EntityId] {
        lookup(&self.index.entities_by_device, device)
    }

    /// Entities whose own `area_id` is `area` (not inherited from a device).
    #[must_use]
    pub fn entities_in_area(&self, area: &AreaId) -> &[EntityId] {
        lookup(&self.index.entities_by_area, area)
    }

    /// Areas, devices and entities carrying `label`.
    #[must_use]
    pub fn label_members(&self, label: &LabelId) -> LabelMembers<'_> {
        self.index.labels.members(label)
    }

    /// The area an entity physically sits in: its own, else its device's.
    #[must_use]
    pub fn effective_area<'a>(&'a self, entity: &'a Entity) -> Option<&'a AreaId> {
        entity.area_id.as_ref().or_else(|| {
            entity
                .device_id
                .as_ref()
                .and_then(|device_id| self.devices.get(device_id))
                .and_then(|device| device.area_id.as_ref())
        })
    }

    /// Name shown for an entity: registry name, then `friendly_name`, then the id.
    #[must_use]
    pub fn entity_display_name<'a>(&'a self, entity: &'a Entity) -> &'a str {
        entity
            .name
            .as_deref()
            .filter(|name| !name.is_empty())
            .or_else(|| self.state(&entity.id).and_then(LiveState::friendly_name))
            .unwrap_or(entity.id.as_str())
    }

    /// When the snapshot was assembled.
    #[must_use]
    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    #[must_use]
    pub fn stats(&self) -> SnapshotStats {
        SnapshotStats {
            floors: self.floors.len(),
            areas: self.areas.len(),
            devices: self.devices.len(),
            entities: self.entities.len(),
            labels: self.labels.len(),
            states: self.states.len(),
        }
    }
}

fn lookup<'a, K, V>(map: &'a std::collections::HashMap<K, Vec<V>>, key: &K) -> &'a [V]
where
    K: Eq + std::hash::Hash,
{
    map.get(key).map(Vec::as_slice).unwrap_or_default()
}

/// Collects registry records and builds an indexed [`RegistrySnapshot`].
///
/// Records with a duplicate id replace the earlier one.
#[derive(Debug, Default)]
pub struct RegistrySnapshotBuilder {
    floors: Vec<Floor>,
    areas: Vec<Area>,
    devices: Vec<Device>,
    entities: Vec<Entity>,
    labels: Vec<Label>,
    states: Vec<LiveState>,
}

impl RegistrySnapshotBuilder {
    #[must_use]
    pub fn floor(mut self, floor: Floor) -> Self {
        self.floors.push(floor);
        self
    }

    #[must_use]
    pub fn area(mut self, area: Area) -> Self {
        self.areas.push(area);
        self
    }

    #[must_use]
    pub fn device(mut self, device: Device) -> Self {
        self.devices.push(device);
        self
    }

    #[must_use]
    pub fn entity(mut self, entity: Entity) -> Self {
        self.entities.push(entity);
        self
    }

    #[must_use]
    pub fn label(mut self, label: Label) -> Self {
        self.labels.push(label);
        self
    }

    #[must_use]
    pub fn state(mut self, state: LiveState) -> Self {
        self.states.push(state);
        self
    }

    #[must_use]
    pub fn floors(mut self, floors: impl IntoIterator<Item = Floor>) -> Self {
        self.floors.extend(floors);
        self
    }

    #[must_use]
    pub fn areas(mut self, areas: impl IntoIterator<Item = Area>) -> Self {
        self.areas.extend(areas);
        self
    }

    #[must_use]
    pub fn devices(mut self, devices: impl IntoIterator<Item = Device>) -> Self {
        self.devices.extend(devices);
        self
    }

    #[must_use]
    pub fn entities(mut self, entities: impl IntoIterator<Item = Entity>) -> Self {
        self.entities.extend(entities);
        self
    }

    #[must_use]
    pub fn labels(mut self, labels: impl IntoIterator<Item = Label>) -> Self {
        self.labels.extend(labels);
        self
    }

    #[must_use]
    pub fn states(mut self, states: impl IntoIterator<Item = LiveState>) -> Self {
        self.states.extend(states);
        self
    }

    /// Validate every record and build the snapshot.
    ///
    /// References to records that do not exist (an entity pointing at a
    /// removed device, …) are tolerated: the upstream registry is not
    /// transactional, and resolution treats them as absent.
    ///
    /// # Errors
    ///
    /// Returns [`HomeGraphError::Validation`] when a record fails its own
    /// invariants.
    pub fn build(self) -> Result<RegistrySnapshot, HomeGraphError> {
        self.validate_records()?;
        Ok(self.assemble())
    }

    /// Like [`build`](Self::build), but also rejects dangling references.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::DanglingReference`] for the first record
    /// pointing at a floor, area or device missing from the dump.
    pub fn build_strict(self) -> Result<RegistrySnapshot, HomeGraphError> {
        self.validate_records()?;
        let snapshot = self.assemble();
        check_references(&snapshot)?;
        Ok(snapshot)
    }

    fn validate_records(&self) -> Result<(), HomeGraphError> {
        self.floors.iter().try_for_each(Floor::validate)?;
        self.areas.iter().try_for_each(Area::validate)?;
        self.devices.iter().try_for_each(Device::validate)?;
        self.entities.iter().try_for_each(Entity::validate)?;
        self.labels.iter().try_for_each(Label::validate)?;
        Ok(())
    }

    fn assemble(self) -> RegistrySnapshot {
        let floors = keyed(self.floors, |floor| floor.id.clone());
        let areas = keyed(self.areas, |area| area.id.clone());
        let devices = keyed(self.devices, |device| device.id.clone());
        let entities = keyed(self.entities, |entity| entity.id.clone());
        let labels = keyed(self.labels, |label| label.id.clone());
        let states = keyed(self.states, |state| state.entity_id.clone());
        let index = MembershipIndex::build(&areas, &devices, &entities);

        RegistrySnapshot {
            floors,
            areas,
            devices,
            entities,
            labels,
            states,
            index,
            loaded_at: Utc::now(),
        }
    }
}

fn keyed<K: Ord, V>(records: Vec<V>, key: impl Fn(&V) -> K) -> BTreeMap<K, V> {
    records
        .into_iter()
        .map(|record| (key(&record), record))
        .collect()
}

fn check_references(snapshot: &RegistrySnapshot) -> Result<(), ValidationError> {
    let dangling = |kind, id: &str, target, target_id: &str| ValidationError::DanglingReference {
        kind,
        id: id.to_string(),
        target,
        target_id: target_id.to_string(),
    };

    for area in snapshot.areas() {
        if let Some(floor_id) = &area.floor_id
            && snapshot.floor(floor_id).is_none()
        {
            return Err(dangling("area", area.id.as_str(), "floor", floor_id.as_str()));
        }
    }
    for device in snapshot.devices() {
        if let Some(area_id) = &device.area_id
            && snapshot.area(area_id).is_none()
        {
            return Err(dangling("device", device.id.as_str(), "area", area_id.as_str()));
        }
    }
    for entity in snapshot.entities() {
        if let Some(device_id) = &entity.device_id
            && snapshot.device(device_id).is_none()
        {
            return Err(dangling(
                "entity",
                entity.id.as_str(),
                "device",
                device_id.as_str(),
            ));
        }
        if let Some(area_id) = &entity.area_id
            && snapshot.area(area_id).is_none()
        {
            return Err(dangling("entity", entity.id.as_str(), "area", area_id.as_str()));
        }
    }
    Ok(())
}
