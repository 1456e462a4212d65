//! Picker candidates: the lists a target picker offers, pre-filtered with
//! the same predicates as extraction and narrowed by a search query.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::area::Area;
use crate::error::ValidationError;
use crate::filter::{FilterCriteria, SecondaryEntities, TargetFilter};
use crate::floor::Floor;
use crate::id::{AreaId, FloorId};
use crate::registry::RegistrySnapshot;
use crate::search::{SearchIndex, SearchOptions, Searchable};
use crate::target::TargetRef;

/// Which list a picker shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickerKind {
    AreaFloor,
    Device,
    Entity,
    Label,
}

impl PickerKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AreaFloor => "area_floor",
            Self::Device => "device",
            Self::Entity => "entity",
            Self::Label => "label",
        }
    }
}

impl fmt::Display for PickerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PickerKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "area_floor" => Ok(Self::AreaFloor),
            "device" => Ok(Self::Device),
            "entity" => Ok(Self::Entity),
            "label" => Ok(Self::Label),
            other => Err(ValidationError::UnknownPickerKind(other.to_string())),
        }
    }
}

/// One selectable row of a picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickerItem {
    pub id: TargetRef,
    pub primary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary: Option<String>,
    /// Extra texts the search matches against (ids, aliases, context names).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub search_labels: Vec<String>,
}

impl Searchable for PickerItem {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = Vec::with_capacity(2 + self.search_labels.len());
        fields.push(self.primary.as_str());
        fields.extend(self.secondary.as_deref());
        fields.extend(self.search_labels.iter().map(String::as_str));
        fields
    }
}

/// Candidates after searching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchOutcome {
    /// `false` when the query was too short to filter anything.
    pub filtered: bool,
    pub items: Vec<PickerItem>,
}

/// Candidates of `kind` matching `query`, or all candidates when the query
/// filters nothing.
#[must_use]
pub fn search_candidates(
    snapshot: &RegistrySnapshot,
    criteria: &FilterCriteria,
    kind: PickerKind,
    query: &str,
) -> Vec<PickerItem> {
    CandidatePicker::new(snapshot, criteria)
        .search(kind, query)
        .items
}

/// Candidate lists for the target pickers.
#[derive(Debug, Clone)]
pub struct CandidatePicker<'a> {
    filter: TargetFilter<'a>,
    exclude_areas: HashSet<AreaId>,
    exclude_floors: HashSet<FloorId>,
    options: SearchOptions,
}

impl<'a> CandidatePicker<'a> {
    #[must_use]
    pub fn new(snapshot: &'a RegistrySnapshot, criteria: &'a FilterCriteria) -> Self {
        Self {
            filter: TargetFilter::new(snapshot, criteria),
            exclude_areas: HashSet::new(),
            exclude_floors: HashSet::new(),
            options: SearchOptions::default(),
        }
    }

    #[must_use]
    pub fn with_secondary(mut self, secondary: SecondaryEntities) -> Self {
        self.filter = self.filter.with_secondary(secondary);
        self
    }

    #[must_use]
    pub fn exclude_areas(mut self, areas: impl IntoIterator<Item = AreaId>) -> Self {
        self.exclude_areas.extend(areas);
        self
    }

    #[must_use]
    pub fn exclude_floors(mut self, floors: impl IntoIterator<Item = FloorId>) -> Self {
        self.exclude_floors.extend(floors);
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    /// Search the candidates of `kind`.
    #[must_use]
    pub fn search(&self, kind: PickerKind, query: &str) -> SearchOutcome {
        let candidates = self.candidates(kind);
        let index = SearchIndex::with_options(&candidates, self.options);
        match index.multi_terms_search(query) {
            Some(matches) => SearchOutcome {
                filtered: true,
                items: matches.into_iter().map(|found| found.item.clone()).collect(),
            },
            None => SearchOutcome {
                filtered: false,
                items: candidates.clone(),
            },
        }
    }

    /// Every candidate of `kind`, in display order.
    #[must_use]
    pub fn candidates(&self, kind: PickerKind) -> Vec<PickerItem> {
        match kind {
            PickerKind::AreaFloor => self.area_floor_candidates(),
            PickerKind::Device => self.device_candidates(),
            PickerKind::Entity => self.entity_candidates(),
            PickerKind::Label => self.label_candidates(),
        }
    }

    /// Criteria only narrow the lists when they constrain something.
    fn filtering(&self) -> bool {
        !self.filter.criteria().is_empty()
    }

    fn area_allowed(&self, area: &Area) -> bool {
        !self.exclude_areas.contains(&area.id)
            && (!self.filtering() || self.filter.area_meets_filter(area))
    }

    fn area_floor_candidates(&self) -> Vec<PickerItem> {
        let snapshot = self.filter.snapshot();

        let mut floors: Vec<&Floor> = snapshot.floors().collect();
        floors.sort_by(|a, b| a.display_cmp(b).then_with(|| a.id.cmp(&b.id)));

        let mut items = Vec::new();
        let mut placed: HashSet<&AreaId> = HashSet::new();

        for floor in floors {
            let areas = self.sorted_areas(snapshot.areas_on_floor(&floor.id).iter());
            placed.extend(snapshot.areas_on_floor(&floor.id));

            let floor_listed = !self.exclude_floors.contains(&floor.id)
                && (!self.filtering() || !areas.is_empty());
            if floor_listed {
                let mut search_labels = vec![floor.id.to_string()];
                search_labels.extend(floor.aliases.iter().cloned());
                for area in &areas {
                    search_labels.push(area.name.clone());
                    search_labels.extend(area.aliases.iter().cloned());
                }
                items.push(PickerItem {
                    id: TargetRef::Floor(floor.id.clone()),
                    primary: floor.name.clone(),
                    secondary: None,
                    search_labels,
                });
            }
            items.extend(areas.into_iter().map(|area| area_item(area, Some(floor))));
        }

        let floorless = snapshot
            .areas()
            .filter(|area| !placed.contains(&area.id))
            .map(|area| &area.id);
        items.extend(
            self.sorted_areas(floorless)
                .into_iter()
                .map(|area| area_item(area, None)),
        );
        items
    }

    fn sorted_areas<'i>(&self, ids: impl Iterator<Item = &'i AreaId>) -> Vec<&'a Area> {
        let snapshot = self.filter.snapshot();
        let mut areas: Vec<&Area> = ids
            .filter_map(|id| snapshot.area(id))
            .filter(|area| self.area_allowed(area))
            .collect();
        areas.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        areas
    }

    fn device_candidates(&self) -> Vec<PickerItem> {
        let snapshot = self.filter.snapshot();
        snapshot
            .devices()
            .filter(|device| !self.filtering() || self.filter.device_meets_filter(device))
            .map(|device| {
                let area = device.area_id.as_ref().and_then(|id| snapshot.area(id));
                let mut search_labels = vec![device.id.to_string()];
                if let Some(name) = device.name.as_ref()
                    && name != device.display_name()
                {
                    search_labels.push(name.clone());
                }
                PickerItem {
                    id: TargetRef::Device(device.id.clone()),
                    primary: device.display_name().to_string(),
                    secondary: area.map(|area| area.name.clone()),
                    search_labels,
                }
            })
            .collect()
    }

    fn entity_candidates(&self) -> Vec<PickerItem> {
        let snapshot = self.filter.snapshot();
        snapshot
            .entities()
            .filter(|entity| !self.filtering() || self.filter.entity_passes(entity))
            .map(|entity| {
                let device = entity.device_id.as_ref().and_then(|id| snapshot.device(id));
                let area = snapshot.effective_area(entity).and_then(|id| snapshot.area(id));
                let mut search_labels = vec![entity.id.to_string()];
                search_labels.extend(area.map(|area| area.name.clone()));
                PickerItem {
                    id: TargetRef::Entity(entity.id.clone()),
                    primary: snapshot.entity_display_name(entity).to_string(),
                    secondary: device
                        .map(|device| device.display_name().to_string())
                        .or_else(|| area.map(|area| area.name.clone())),
                    search_labels,
                }
            })
            .collect()
    }

    fn label_candidates(&self) -> Vec<PickerItem> {
        let snapshot = self.filter.snapshot();
        let mut items: Vec<PickerItem> = snapshot
            .known_labels()
            .into_iter()
            .filter(|id| !self.filtering() || self.filter.label_meets_filter(id))
            .map(|id| PickerItem {
                id: TargetRef::Label(id.clone()),
                primary: snapshot
                    .label(id)
                    .map_or_else(|| id.to_string(), |label| label.name.clone()),
                secondary: None,
                search_labels: vec![id.to_string()],
            })
            .collect();
        items.sort_by(|a, b| a.primary.cmp(&b.primary));
        items
    }
}

fn area_item(area: &Area, floor: Option<&Floor>) -> PickerItem {
    let mut search_labels = vec![area.id.to_string()];
    search_labels.extend(area.aliases.iter().cloned());
    PickerItem {
        id: TargetRef::Area(area.id.clone()),
        primary: area.name.clone(),
        secondary: floor.map(|floor| floor.name.clone()),
        search_labels,
    }
}
