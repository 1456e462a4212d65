//! Target service — resolution, display trees and picker search over the
//! current registry snapshot.

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;

use homegraph_domain::entity::{Entity, LiveState};
use homegraph_domain::error::{HomeGraphError, NotFoundError};
use homegraph_domain::extraction::TargetResolver;
use homegraph_domain::filter::{FilterCriteria, SecondaryEntities};
use homegraph_domain::id::{AreaId, EntityId, FloorId};
use homegraph_domain::picker::{CandidatePicker, PickerKind, SearchOutcome};
use homegraph_domain::registry::RegistrySnapshot;
use homegraph_domain::search::SearchOptions;
use homegraph_domain::target::{ExtractionResult, TargetSpec};
use homegraph_domain::tree::{DisplayTreeBuilder, RootType, Row};

use crate::ports::SnapshotSource;

/// A picker search.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub kind: PickerKind,
    pub query: String,
    pub criteria: FilterCriteria,
    /// Overrides the service's secondary-entity policy.
    pub secondary: Option<SecondaryEntities>,
    pub exclude_areas: Vec<AreaId>,
    pub exclude_floors: Vec<FloorId>,
}

impl SearchRequest {
    #[must_use]
    pub fn new(kind: PickerKind, query: impl Into<String>) -> Self {
        Self {
            kind,
            query: query.into(),
            criteria: FilterCriteria::default(),
            secondary: None,
            exclude_areas: Vec::new(),
            exclude_floors: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_criteria(mut self, criteria: FilterCriteria) -> Self {
        self.criteria = criteria;
        self
    }
}

/// An entity record with its resolved display name, area and live state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityDetails {
    pub entity: Entity,
    pub name: String,
    pub area_id: Option<AreaId>,
    pub state: Option<LiveState>,
}

/// Inputs and output of the last extraction.
#[derive(Debug)]
struct Memo {
    snapshot: Arc<RegistrySnapshot>,
    spec: TargetSpec,
    criteria: FilterCriteria,
    secondary: SecondaryEntities,
    result: Arc<ExtractionResult>,
}

impl Memo {
    fn matches(
        &self,
        snapshot: &Arc<RegistrySnapshot>,
        spec: &TargetSpec,
        criteria: &FilterCriteria,
        secondary: SecondaryEntities,
    ) -> bool {
        Arc::ptr_eq(&self.snapshot, snapshot)
            && self.secondary == secondary
            && self.spec == *spec
            && self.criteria == *criteria
    }
}

/// Application service for target resolution.
///
/// The last extraction is memoized by input identity: the same snapshot
/// (by pointer), the same spec, the same secondary policy and equal
/// criteria (custom predicates by pointer) return the cached result.
pub struct TargetService<S> {
    source: S,
    secondary: SecondaryEntities,
    search_options: SearchOptions,
    memo: Mutex<Option<Memo>>,
}

impl<S: SnapshotSource> TargetService<S> {
    /// Create a new service reading snapshots from `source`.
    pub fn new(source: S) -> Self {
        Self {
            source,
            secondary: SecondaryEntities::default(),
            search_options: SearchOptions::default(),
            memo: Mutex::new(None),
        }
    }

    /// Set the secondary-entity policy used when expanding areas, devices and labels.
    #[must_use]
    pub fn with_secondary(mut self, secondary: SecondaryEntities) -> Self {
        self.secondary = secondary;
        self
    }

    #[must_use]
    pub fn with_search_options(mut self, options: SearchOptions) -> Self {
        self.search_options = options;
        self
    }

    #[must_use]
    pub fn default_secondary(&self) -> SecondaryEntities {
        self.secondary
    }

    /// The snapshot currently in effect.
    pub fn snapshot(&self) -> Arc<RegistrySnapshot> {
        self.source.current()
    }

    /// Resolve `spec` against the current snapshot.
    pub fn extract(&self, spec: &TargetSpec, criteria: &FilterCriteria) -> Arc<ExtractionResult> {
        self.extract_with(spec, criteria, self.secondary)
    }

    /// Like [`extract`](Self::extract), with an explicit secondary-entity policy.
    pub fn extract_with(
        &self,
        spec: &TargetSpec,
        criteria: &FilterCriteria,
        secondary: SecondaryEntities,
    ) -> Arc<ExtractionResult> {
        let snapshot = self.source.current();
        self.extract_on(&snapshot, spec, criteria, secondary)
    }

    /// Resolve `spec` and project it into a display forest rooted at `root`.
    pub fn tree(&self, spec: &TargetSpec, criteria: &FilterCriteria, root: RootType) -> Vec<Row> {
        self.tree_with(
            spec,
            criteria,
            root,
            self.secondary,
            &DisplayTreeBuilder::default(),
        )
    }

    /// Like [`tree`](Self::tree), with an explicit policy and orderings.
    pub fn tree_with(
        &self,
        spec: &TargetSpec,
        criteria: &FilterCriteria,
        root: RootType,
        secondary: SecondaryEntities,
        builder: &DisplayTreeBuilder,
    ) -> Vec<Row> {
        let snapshot = self.source.current();
        let result = self.extract_on(&snapshot, spec, criteria, secondary);
        let rows = builder.build(&result, root, &snapshot);
        tracing::debug!(%root, rows = rows.len(), "built display tree");
        rows
    }

    /// Search picker candidates.
    pub fn search(&self, request: &SearchRequest) -> SearchOutcome {
        let snapshot = self.source.current();
        let outcome = CandidatePicker::new(&snapshot, &request.criteria)
            .with_secondary(request.secondary.unwrap_or(self.secondary))
            .exclude_areas(request.exclude_areas.iter().cloned())
            .exclude_floors(request.exclude_floors.iter().cloned())
            .with_options(self.search_options)
            .search(request.kind, &request.query);
        tracing::debug!(
            kind = %request.kind,
            filtered = outcome.filtered,
            items = outcome.items.len(),
            "searched picker candidates"
        );
        outcome
    }

    /// Look up a single entity.
    ///
    /// # Errors
    ///
    /// Returns [`HomeGraphError::NotFound`] when the entity is not registered.
    pub fn entity(&self, id: &EntityId) -> Result<EntityDetails, HomeGraphError> {
        let snapshot = self.source.current();
        let entity = snapshot.entity(id).ok_or_else(|| NotFoundError {
            entity: "entity",
            id: id.to_string(),
        })?;
        Ok(EntityDetails {
            name: snapshot.entity_display_name(entity).to_string(),
            area_id: snapshot.effective_area(entity).cloned(),
            state: snapshot.state(id).cloned(),
            entity: entity.clone(),
        })
    }

    fn extract_on(
        &self,
        snapshot: &Arc<RegistrySnapshot>,
        spec: &TargetSpec,
        criteria: &FilterCriteria,
        secondary: SecondaryEntities,
    ) -> Arc<ExtractionResult> {
        let mut memo = self.memo.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(last) = memo.as_ref()
            && last.matches(snapshot, spec, criteria, secondary)
        {
            tracing::debug!("reusing memoized extraction");
            return Arc::clone(&last.result);
        }

        let result = Arc::new(
            TargetResolver::new(snapshot, criteria)
                .with_secondary(secondary)
                .resolve(spec),
        );
        tracing::debug!(
            areas = result.referenced_areas.len(),
            devices = result.referenced_devices.len(),
            entities = result.referenced_entities.len(),
            "resolved target"
        );
        if result.has_missing() {
            tracing::warn!(
                missing_areas = ?result.missing_areas,
                missing_devices = ?result.missing_devices,
                missing_floors = ?result.missing_floors,
                missing_labels = ?result.missing_labels,
                missing_entities = ?result.missing_entities,
                "target references unknown ids"
            );
        }

        *memo = Some(Memo {
            snapshot: Arc::clone(snapshot),
            spec: spec.clone(),
            criteria: criteria.clone(),
            secondary,
            result: Arc::clone(&result),
        });
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot_feed::SnapshotFeed;
    use homegraph_domain::area::Area;
    use homegraph_domain::device::Device;
    use homegraph_domain::entity::{Entity, EntityCategory};
    use homegraph_domain::id::EntityId;

    fn snapshot() -> RegistrySnapshot {
        RegistrySnapshot::builder()
            .area(Area::builder().id("office").name("Office").build().unwrap())
            .area(Area::builder().id("den").name("Den").build().unwrap())
            .device(
                Device::builder()
                    .id("desk")
                    .name("Desk")
                    .area_id("office")
                    .build()
                    .unwrap(),
            )
            .entity(
                Entity::builder()
                    .id("light.desk")
                    .device_id("desk")
                    .build()
                    .unwrap(),
            )
            .entity(
                Entity::builder()
                    .id("sensor.desk_rssi")
                    .device_id("desk")
                    .entity_category(EntityCategory::Diagnostic)
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap()
    }

    fn service() -> (Arc<SnapshotFeed>, TargetService<Arc<SnapshotFeed>>) {
        let feed = Arc::new(SnapshotFeed::new(snapshot()));
        let service = TargetService::new(Arc::clone(&feed));
        (feed, service)
    }

    #[test]
    fn should_resolve_target_against_current_snapshot() {
        let (_feed, service) = service();
        let result = service.extract(&TargetSpec::new().area("office"), &FilterCriteria::new());
        assert_eq!(result.referenced_entities, vec![EntityId::new("light.desk")]);
    }

    #[test]
    fn should_reuse_result_when_inputs_unchanged() {
        let (_feed, service) = service();
        let spec = TargetSpec::new().area("office");
        let criteria = FilterCriteria::new().entity_filter(|_| true);

        let first = service.extract(&spec, &criteria);
        let second = service.extract(&spec, &criteria.clone());
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn should_recompute_when_snapshot_replaced() {
        let (feed, service) = service();
        let spec = TargetSpec::new().area("office");

        let first = service.extract(&spec, &FilterCriteria::new());
        feed.replace(snapshot());
        let second = service.extract(&spec, &FilterCriteria::new());

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first, second);
    }

    #[test]
    fn should_recompute_when_predicate_identity_changes() {
        let (_feed, service) = service();
        let spec = TargetSpec::new().area("office");

        let first = service.extract(&spec, &FilterCriteria::new().entity_filter(|_| true));
        let second = service.extract(&spec, &FilterCriteria::new().entity_filter(|_| true));
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn should_include_secondary_entities_when_configured() {
        let (_feed, service) = service();
        let service = service.with_secondary(SecondaryEntities::Include);
        let result = service.extract(&TargetSpec::new().device("desk"), &FilterCriteria::new());
        assert_eq!(result.referenced_entities.len(), 2);
    }

    #[test]
    fn should_recompute_when_secondary_policy_differs() {
        let (_feed, service) = service();
        let spec = TargetSpec::new().device("desk");
        let criteria = FilterCriteria::new();

        let excluded = service.extract(&spec, &criteria);
        let included = service.extract_with(&spec, &criteria, SecondaryEntities::Include);
        assert_eq!(excluded.referenced_entities.len(), 1);
        assert_eq!(included.referenced_entities.len(), 2);
    }

    #[test]
    fn should_describe_entity_with_inherited_area() {
        let (_feed, service) = service();
        let details = service.entity(&EntityId::new("light.desk")).unwrap();
        assert_eq!(details.area_id, Some(AreaId::new("office")));
        assert!(details.state.is_none());
    }

    #[test]
    fn should_return_not_found_when_entity_unknown() {
        let (_feed, service) = service();
        let result = service.entity(&EntityId::new("light.ghost"));
        assert!(matches!(result, Err(HomeGraphError::NotFound(_))));
    }

    #[test]
    fn should_build_pruned_tree() {
        let (_feed, service) = service();
        let spec = TargetSpec::new().area("office").area("den");
        let rows = service.tree(&spec, &FilterCriteria::new(), RootType::Area);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name(), "Office");
    }

    #[test]
    fn should_search_candidates_of_requested_kind() {
        let (_feed, service) = service();
        let outcome = service.search(&SearchRequest::new(PickerKind::AreaFloor, "off"));
        assert!(outcome.filtered);
        assert_eq!(outcome.items.len(), 1);
        assert_eq!(outcome.items[0].primary, "Office");
    }

    #[test]
    fn should_honour_configured_min_term_length() {
        let (_feed, service) = service();
        let service = service.with_search_options(SearchOptions {
            min_term_length: 4,
            ..SearchOptions::default()
        });
        let outcome = service.search(&SearchRequest::new(PickerKind::AreaFloor, "off"));
        assert!(!outcome.filtered);
        assert_eq!(outcome.items.len(), 2);
    }
}
