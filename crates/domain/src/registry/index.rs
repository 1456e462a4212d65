//! Reverse membership lookups derived once per snapshot.
//!
//! Every list is filled while walking the registry maps in id order, so the
//! member order is the snapshot iteration order.

use std::collections::{BTreeMap, HashMap};

use crate::area::Area;
use crate::device::Device;
use crate::entity::Entity;
use crate::id::{AreaId, DeviceId, EntityId, FloorId, LabelId};

/// Members of a single label, grouped by record kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelMembers<'a> {
    pub areas: &'a [AreaId],
    pub devices: &'a [DeviceId],
    pub entities: &'a [EntityId],
}

impl LabelMembers<'_> {
    /// Whether the label tags nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.areas.is_empty() && self.devices.is_empty() && self.entities.is_empty()
    }
}

/// label → tagged areas, devices and entities.
#[derive(Debug, Default)]
pub(crate) struct LabelIndex {
    areas: HashMap<LabelId, Vec<AreaId>>,
    devices: HashMap<LabelId, Vec<DeviceId>>,
    entities: HashMap<LabelId, Vec<EntityId>>,
}

impl LabelIndex {
    pub(crate) fn members(&self, label: &LabelId) -> LabelMembers<'_> {
        LabelMembers {
            areas: self.areas.get(label).map(Vec::as_slice).unwrap_or_default(),
            devices: self.devices.get(label).map(Vec::as_slice).unwrap_or_default(),
            entities: self.entities.get(label).map(Vec::as_slice).unwrap_or_default(),
        }
    }

    /// Every label tagging at least one record. May repeat ids.
    pub(crate) fn ids(&self) -> impl Iterator<Item = &LabelId> {
        self.areas
            .keys()
            .chain(self.devices.keys())
            .chain(self.entities.keys())
    }

    pub(crate) fn contains(&self, label: &LabelId) -> bool {
        self.areas.contains_key(label)
            || self.devices.contains_key(label)
            || self.entities.contains_key(label)
    }
}

/// All containment and label lookups of a snapshot.
#[derive(Debug, Default)]
pub(crate) struct MembershipIndex {
    pub(crate) areas_by_floor: HashMap<FloorId, Vec<AreaId>>,
    pub(crate) devices_by_area: HashMap<AreaId, Vec<DeviceId>>,
    pub(crate) entities_by_device: HashMap<DeviceId, Vec<EntityId>>,
    /// Entities whose own `area_id` points at the area.
    pub(crate) entities_by_area: HashMap<AreaId, Vec<EntityId>>,
    pub(crate) labels: LabelIndex,
}

impl MembershipIndex {
    pub(crate) fn build(
        areas: &BTreeMap<AreaId, Area>,
        devices: &BTreeMap<DeviceId, Device>,
        entities: &BTreeMap<EntityId, Entity>,
    ) -> Self {
        let mut index = Self::default();

        for area in areas.values() {
            if let Some(floor_id) = &area.floor_id {
                push(&mut index.areas_by_floor, floor_id, &area.id);
            }
            for label in &area.labels {
                push(&mut index.labels.areas, label, &area.id);
            }
        }

        for device in devices.values() {
            if let Some(area_id) = &device.area_id {
                push(&mut index.devices_by_area, area_id, &device.id);
            }
            for label in &device.labels {
                push(&mut index.labels.devices, label, &device.id);
            }
        }

        for entity in entities.values() {
            if let Some(device_id) = &entity.device_id {
                push(&mut index.entities_by_device, device_id, &entity.id);
            }
            if let Some(area_id) = &entity.area_id {
                push(&mut index.entities_by_area, area_id, &entity.id);
            }
            for label in &entity.labels {
                push(&mut index.labels.entities, label, &entity.id);
            }
        }

        index
    }
}

fn push<K, V>(map: &mut HashMap<K, Vec<V>>, key: &K, value: &V)
where
    K: Clone + Eq + std::hash::Hash,
    V: Clone + PartialEq,
{
    let members = map.entry(key.clone()).or_default();
    // Records may repeat a label in their own list.
    if !members.contains(value) {
        members.push(value.clone());
    }
}
