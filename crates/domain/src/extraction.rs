//! Target extraction: from a compound [`TargetSpec`] to the concrete
//! areas, devices and entities it implies.
//!
//! Resolution never fails. Ids absent from the snapshot are reported in the
//! `missing_*` lists of the [`ExtractionResult`] and otherwise ignored.

use std::collections::HashSet;
use std::hash::Hash;

use crate::area::Area;
use crate::device::Device;
use crate::filter::{FilterCriteria, SecondaryEntities, TargetFilter};
use crate::id::{AreaId, DeviceId, EntityId, FloorId, LabelId};
use crate::registry::RegistrySnapshot;
use crate::target::{ExtractionResult, TargetSpec};

/// Resolve `spec` against `snapshot` with secondary entities excluded from
/// area, device and label expansion.
#[must_use]
pub fn extract_from_target(
    spec: &TargetSpec,
    snapshot: &RegistrySnapshot,
    criteria: &FilterCriteria,
) -> ExtractionResult {
    TargetResolver::new(snapshot, criteria).resolve(spec)
}

/// Target resolver with an explicit secondary-entity policy.
#[derive(Debug, Clone, Copy)]
pub struct TargetResolver<'a> {
    filter: TargetFilter<'a>,
}

impl<'a> TargetResolver<'a> {
    #[must_use]
    pub fn new(snapshot: &'a RegistrySnapshot, criteria: &'a FilterCriteria) -> Self {
        Self {
            filter: TargetFilter::new(snapshot, criteria),
        }
    }

    /// Set whether config/diagnostic entities are pulled in when expanding
    /// areas, devices and labels. Explicitly named entities always are.
    #[must_use]
    pub fn with_secondary(mut self, secondary: SecondaryEntities) -> Self {
        self.filter = self.filter.with_secondary(secondary);
        self
    }

    #[must_use]
    pub fn filter(&self) -> TargetFilter<'a> {
        self.filter
    }

    #[must_use]
    pub fn resolve(&self, spec: &TargetSpec) -> ExtractionResult {
        let snapshot = self.filter.snapshot();
        let mut out = Accumulator::default();

        let mut areas = OrderedSet::default();
        let mut devices = OrderedSet::default();
        let mut label_entities = OrderedSet::default();

        for id in ids(spec.area_ids.as_ref()) {
            if snapshot.area(id).is_some() {
                areas.insert(id);
            } else {
                out.missing_areas.insert(id);
            }
        }

        for id in ids(spec.floor_ids.as_ref()) {
            let members = snapshot.areas_on_floor(id);
            if snapshot.floor(id).is_none() && members.is_empty() {
                out.missing_floors.insert(id);
                continue;
            }
            for area_id in members {
                areas.insert(area_id);
            }
        }

        for id in ids(spec.device_ids.as_ref()) {
            if snapshot.device(id).is_some() {
                devices.insert(id);
            } else {
                out.missing_devices.insert(id);
            }
        }

        for id in ids(spec.label_ids.as_ref()) {
            if !snapshot.has_label(id) {
                out.missing_labels.insert(id);
                continue;
            }
            let members = snapshot.label_members(id);
            for area_id in members.areas {
                areas.insert(area_id);
            }
            for device_id in members.devices {
                devices.insert(device_id);
            }
            for entity_id in members.entities {
                label_entities.insert(entity_id);
            }
        }

        for id in areas.iter() {
            if let Some(area) = snapshot.area(id) {
                self.visit_area(area, &mut out);
            }
        }

        for id in devices.iter() {
            if let Some(device) = snapshot.device(id) {
                self.visit_device(device, &mut out);
            }
        }

        for id in label_entities.iter() {
            if let Some(entity) = snapshot.entity(id)
                && self.filter.entity_passes(entity)
            {
                out.entities.insert(id);
            }
        }

        for id in ids(spec.entity_ids.as_ref()) {
            match snapshot.entity(id) {
                Some(entity) => {
                    if self.filter.entity_meets_filter(entity, true) {
                        out.entities.insert(id);
                    }
                }
                None => {
                    out.missing_entities.insert(id);
                }
            }
        }

        out.finish()
    }

    fn visit_area(&self, area: &Area, out: &mut Accumulator) {
        if !self.filter.area_meets_filter(area) {
            return;
        }
        let snapshot = self.filter.snapshot();
        out.areas.insert(&area.id);

        for device_id in snapshot.devices_in_area(&area.id) {
            if let Some(device) = snapshot.device(device_id) {
                self.visit_device(device, out);
            }
        }

        for entity_id in snapshot.entities_in_area(&area.id) {
            if let Some(entity) = snapshot.entity(entity_id)
                && self.filter.entity_passes(entity)
            {
                out.entities.insert(entity_id);
            }
        }
    }

    /// A retained device contributes every owned entity that passes, wherever
    /// the entity itself is assigned. This keeps it in step with
    /// [`TargetFilter::device_meets_filter`].
    fn visit_device(&self, device: &Device, out: &mut Accumulator) {
        if !self.filter.device_meets_filter(device) {
            return;
        }
        let snapshot = self.filter.snapshot();
        out.devices.insert(&device.id);

        for entity_id in snapshot.entities_of_device(&device.id) {
            if let Some(entity) = snapshot.entity(entity_id)
                && self.filter.entity_passes(entity)
            {
                out.entities.insert(entity_id);
            }
        }
    }
}

fn ids<T>(list: Option<&Vec<T>>) -> impl Iterator<Item = &T> {
    list.into_iter().flatten()
}

/// Insertion-ordered set of ids.
#[derive(Debug)]
struct OrderedSet<T> {
    seen: HashSet<T>,
    items: Vec<T>,
}

impl<T> Default for OrderedSet<T> {
    fn default() -> Self {
        Self {
            seen: HashSet::new(),
            items: Vec::new(),
        }
    }
}

impl<T: Clone + Eq + Hash> OrderedSet<T> {
    fn insert(&mut self, item: &T) -> bool {
        if self.seen.contains(item) {
            return false;
        }
        self.seen.insert(item.clone());
        self.items.push(item.clone());
        true
    }

    fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    fn into_vec(self) -> Vec<T> {
        self.items
    }
}

#[derive(Debug, Default)]
struct Accumulator {
    areas: OrderedSet<AreaId>,
    devices: OrderedSet<DeviceId>,
    entities: OrderedSet<EntityId>,
    missing_areas: OrderedSet<AreaId>,
    missing_devices: OrderedSet<DeviceId>,
    missing_floors: OrderedSet<FloorId>,
    missing_labels: OrderedSet<LabelId>,
    missing_entities: OrderedSet<EntityId>,
}

impl Accumulator {
    fn finish(self) -> ExtractionResult {
        ExtractionResult {
            referenced_areas: self.areas.into_vec(),
            referenced_devices: self.devices.into_vec(),
            referenced_entities: self.entities.into_vec(),
            missing_areas: self.missing_areas.into_vec(),
            missing_devices: self.missing_devices.into_vec(),
            missing_floors: self.missing_floors.into_vec(),
            missing_labels: self.missing_labels.into_vec(),
            missing_entities: self.missing_entities.into_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::entity::{AttributeValue, Entity, EntityCategory, LiveState};
    use crate::floor::Floor;
    use crate::label::Label;

    fn entity(id: &str) -> crate::entity::EntityBuilder {
        Entity::builder().id(id)
    }

    fn house() -> RegistrySnapshot {
        RegistrySnapshot::builder()
            .floor(Floor::builder().id("ground").name("Ground").level(0).build().unwrap())
            .area(
                Area::builder()
                    .id("living_room")
                    .name("Living Room")
                    .floor_id("ground")
                    .build()
                    .unwrap(),
            )
            .area(
                Area::builder()
                    .id("kitchen")
                    .name("Kitchen")
                    .floor_id("ground")
                    .label("cosy")
                    .build()
                    .unwrap(),
            )
            .area(Area::builder().id("garage").name("Garage").build().unwrap())
            .device(
                Device::builder()
                    .id("tv")
                    .name("TV")
                    .area_id("living_room")
                    .label("media")
                    .build()
                    .unwrap(),
            )
            .device(
                Device::builder()
                    .id("hub")
                    .name("Hub")
                    .area_id("living_room")
                    .build()
                    .unwrap(),
            )
            .entity(entity("media_player.tv").device_id("tv").build().unwrap())
            .entity(entity("sensor.tv_power").device_id("tv").build().unwrap())
            .entity(
                entity("sensor.tv_signal")
                    .device_id("tv")
                    .entity_category(EntityCategory::Diagnostic)
                    .build()
                    .unwrap(),
            )
            // Hub lives in the living room, but its light is in the kitchen.
            .entity(
                entity("light.hub_kitchen")
                    .device_id("hub")
                    .area_id("kitchen")
                    .build()
                    .unwrap(),
            )
            .entity(entity("light.ceiling").area_id("living_room").label("cosy").build().unwrap())
            .entity(entity("light.garage").area_id("garage").hidden(true).build().unwrap())
            .entity(entity("switch.fan").label("media").build().unwrap())
            .label(Label::new("media", "Media").unwrap())
            .state(LiveState::new("media_player.tv", "playing").with_attribute(
                "device_class",
                AttributeValue::String("tv".to_string()),
            ))
            .state(LiveState::new("sensor.tv_power", "120").with_attribute(
                "device_class",
                AttributeValue::String("power".to_string()),
            ))
            .build()
            .unwrap()
    }

    fn assert_unique<T: Eq + Hash + std::fmt::Debug>(items: &[T]) {
        let set: HashSet<&T> = items.iter().collect();
        assert_eq!(set.len(), items.len(), "duplicates in {items:?}");
    }

    #[test]
    fn should_return_empty_result_when_spec_is_empty() {
        let snapshot = house();
        let result = extract_from_target(&TargetSpec::new(), &snapshot, &FilterCriteria::new());
        assert_eq!(result, ExtractionResult::default());
    }

    #[test]
    fn should_report_unknown_area_as_missing() {
        let snapshot = house();
        let spec = TargetSpec::new().area("nonexistent");
        let result = extract_from_target(&spec, &snapshot, &FilterCriteria::new());
        assert_eq!(result.missing_areas, vec![AreaId::new("nonexistent")]);
        assert!(result.is_empty());
    }

    #[test]
    fn should_report_every_kind_of_unknown_id() {
        let snapshot = house();
        let spec = TargetSpec::new()
            .device("ghost")
            .floor("attic")
            .label("nothing")
            .entity("light.nowhere");
        let result = extract_from_target(&spec, &snapshot, &FilterCriteria::new());
        assert_eq!(result.missing_devices, vec![DeviceId::new("ghost")]);
        assert_eq!(result.missing_floors, vec![FloorId::new("attic")]);
        assert_eq!(result.missing_labels, vec![LabelId::new("nothing")]);
        assert_eq!(result.missing_entities, vec![EntityId::new("light.nowhere")]);
    }

    #[test]
    fn should_expand_floor_down_to_passing_entities_when_filtered() {
        let snapshot = house();
        let criteria = FilterCriteria::new().include_device_classes(["tv"]);
        let spec = TargetSpec::new().floor("ground");
        let result = extract_from_target(&spec, &snapshot, &criteria);

        assert!(result.referenced_areas.contains(&AreaId::new("living_room")));
        assert!(result.referenced_devices.contains(&DeviceId::new("tv")));
        assert!(result.referenced_entities.contains(&EntityId::new("media_player.tv")));
        assert!(!result.referenced_entities.contains(&EntityId::new("sensor.tv_power")));
        // Nothing in the kitchen carries a live device class.
        assert!(!result.referenced_areas.contains(&AreaId::new("kitchen")));
        assert!(!result.referenced_devices.contains(&DeviceId::new("hub")));
    }

    #[test]
    fn should_take_device_entities_assigned_to_another_area() {
        let snapshot = house();
        let spec = TargetSpec::new().area("living_room");
        let result = extract_from_target(&spec, &snapshot, &FilterCriteria::new());

        assert!(result.referenced_devices.contains(&DeviceId::new("hub")));
        assert!(result.referenced_entities.contains(&EntityId::new("light.hub_kitchen")));

        let kitchen = extract_from_target(
            &TargetSpec::new().area("kitchen"),
            &snapshot,
            &FilterCriteria::new(),
        );
        assert_eq!(kitchen.referenced_entities, vec![EntityId::new("light.hub_kitchen")]);
        assert!(kitchen.referenced_devices.is_empty());
    }

    #[test]
    fn should_never_reference_area_or_device_without_entities() {
        let snapshot = house();
        let specs = [
            TargetSpec::new().area("living_room"),
            TargetSpec::new().area("kitchen").area("garage"),
            TargetSpec::new().floor("ground"),
            TargetSpec::new().label("media").label("cosy"),
            TargetSpec::new().device("hub").device("tv"),
        ];
        let filters = [
            FilterCriteria::new(),
            FilterCriteria::new().include_domains(["light"]),
            FilterCriteria::new().include_device_classes(["tv"]),
            FilterCriteria::new().exclude_domains(["light", "switch"]),
        ];

        for spec in &specs {
            for criteria in &filters {
                let result = extract_from_target(spec, &snapshot, criteria);
                let entities: HashSet<&EntityId> = result.referenced_entities.iter().collect();
                let device_has_entity = |id: &DeviceId| {
                    snapshot
                        .entities_of_device(id)
                        .iter()
                        .any(|entity| entities.contains(entity))
                };

                for id in &result.referenced_devices {
                    assert!(device_has_entity(id), "{id} has no entity in {spec:?}");
                }
                for id in &result.referenced_areas {
                    let reachable = snapshot.devices_in_area(id).iter().any(&device_has_entity)
                        || snapshot
                            .entities_in_area(id)
                            .iter()
                            .any(|entity| entities.contains(entity));
                    assert!(reachable, "{id} has no entity in {spec:?}");
                }
            }
        }
    }

    #[test]
    fn should_include_all_entities_when_device_named_explicitly() {
        let snapshot = house();
        let spec = TargetSpec::new().device("hub");
        let result = extract_from_target(&spec, &snapshot, &FilterCriteria::new());
        assert_eq!(result.referenced_entities, vec![EntityId::new("light.hub_kitchen")]);
    }

    #[test]
    fn should_skip_secondary_entities_when_expanding_by_default() {
        let snapshot = house();
        let spec = TargetSpec::new().device("tv");
        let result = extract_from_target(&spec, &snapshot, &FilterCriteria::new());
        assert!(!result.referenced_entities.contains(&EntityId::new("sensor.tv_signal")));

        let including = TargetResolver::new(&snapshot, &FilterCriteria::new())
            .with_secondary(SecondaryEntities::Include)
            .resolve(&spec);
        assert!(including.referenced_entities.contains(&EntityId::new("sensor.tv_signal")));
    }

    #[test]
    fn should_include_secondary_entity_when_named_explicitly() {
        let snapshot = house();
        let spec = TargetSpec::new().entity("sensor.tv_signal");
        let result = extract_from_target(&spec, &snapshot, &FilterCriteria::new());
        assert_eq!(result.referenced_entities, vec![EntityId::new("sensor.tv_signal")]);
    }

    #[test]
    fn should_exclude_hidden_entity_even_when_named() {
        let snapshot = house();
        let spec = TargetSpec::new().entity("light.garage").area("garage");
        let result = extract_from_target(&spec, &snapshot, &FilterCriteria::new());
        assert!(result.is_empty());
        assert!(!result.has_missing());
    }

    #[test]
    fn should_expand_label_across_all_record_kinds() {
        let snapshot = house();
        let spec = TargetSpec::new().label("media").label("cosy");
        let result = extract_from_target(&spec, &snapshot, &FilterCriteria::new());

        assert_eq!(result.referenced_areas, vec![AreaId::new("kitchen")]);
        assert!(result.referenced_devices.contains(&DeviceId::new("tv")));
        assert!(result.referenced_entities.contains(&EntityId::new("switch.fan")));
        assert!(result.referenced_entities.contains(&EntityId::new("light.ceiling")));
        assert!(result.missing_labels.is_empty());
    }

    #[test]
    fn should_not_duplicate_ids_reached_through_several_paths() {
        let snapshot = house();
        let spec = TargetSpec::new()
            .floor("ground")
            .area("living_room")
            .area("living_room")
            .device("tv")
            .label("media")
            .label("cosy")
            .entity("media_player.tv")
            .entity("light.ceiling");
        let result = extract_from_target(&spec, &snapshot, &FilterCriteria::new());

        assert_unique(&result.referenced_areas);
        assert_unique(&result.referenced_devices);
        assert_unique(&result.referenced_entities);
        assert_eq!(
            result
                .referenced_entities
                .iter()
                .filter(|id| id.as_str() == "media_player.tv")
                .count(),
            1
        );
    }

    #[test]
    fn should_only_reference_entities_that_pass_filter() {
        let snapshot = house();
        let criteria = FilterCriteria::new().exclude_domains(["sensor"]);
        let spec = TargetSpec::new()
            .floor("ground")
            .label("media")
            .entity("sensor.tv_signal");
        let result = extract_from_target(&spec, &snapshot, &criteria);
        let filter = TargetFilter::new(&snapshot, &criteria);

        for id in &result.referenced_entities {
            let entity = snapshot.entity(id).unwrap();
            assert!(filter.entity_meets_filter(entity, true), "{id} should pass");
        }
        for id in &result.referenced_devices {
            assert!(filter.device_meets_filter(snapshot.device(id).unwrap()));
        }
        for id in &result.referenced_areas {
            assert!(filter.area_meets_filter(snapshot.area(id).unwrap()));
        }
    }

    #[test]
    fn should_keep_first_seen_order() {
        let snapshot = house();
        let spec = TargetSpec::new().entity("switch.fan").entity("media_player.tv");
        let result = extract_from_target(&spec, &snapshot, &FilterCriteria::new());
        assert_eq!(
            result.referenced_entities,
            vec![EntityId::new("switch.fan"), EntityId::new("media_player.tv")]
        );
    }
}
