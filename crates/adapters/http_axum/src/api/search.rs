//! JSON REST handler for picker search.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use homegraph_app::ports::{RegistryLoader, SnapshotSource};
use homegraph_app::services::target_service::SearchRequest;
use homegraph_domain::filter::{FilterCriteria, SecondaryEntities};
use homegraph_domain::id::{AreaId, FloorId};
use homegraph_domain::picker::{PickerKind, SearchOutcome};

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for the search endpoint.
///
/// List parameters are comma separated, e.g. `include_domains=light,switch`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchQuery {
    pub kind: String,
    pub q: String,
    pub include_domains: Option<String>,
    pub exclude_domains: Option<String>,
    pub include_device_classes: Option<String>,
    pub exclude_areas: Option<String>,
    pub exclude_floors: Option<String>,
    pub secondary: Option<SecondaryEntities>,
}

impl SearchQuery {
    fn criteria(&self) -> FilterCriteria {
        let mut criteria = FilterCriteria::new();
        if let Some(domains) = self.include_domains.as_deref() {
            criteria = criteria.include_domains(split_list(domains));
        }
        if let Some(domains) = self.exclude_domains.as_deref() {
            criteria = criteria.exclude_domains(split_list(domains));
        }
        if let Some(classes) = self.include_device_classes.as_deref() {
            criteria = criteria.include_device_classes(split_list(classes));
        }
        criteria
    }

    fn into_request(self) -> Result<SearchRequest, ApiError> {
        let kind = PickerKind::from_str(&self.kind)?;
        let criteria = self.criteria();
        let mut request = SearchRequest::new(kind, self.q).with_criteria(criteria);
        request.secondary = self.secondary;
        request.exclude_areas = self
            .exclude_areas
            .as_deref()
            .map(|ids| split_list(ids).map(AreaId::new).collect())
            .unwrap_or_default();
        request.exclude_floors = self
            .exclude_floors
            .as_deref()
            .map(|ids| split_list(ids).map(FloorId::new).collect())
            .unwrap_or_default();
        Ok(request)
    }
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|item| !item.is_empty())
}

/// Possible responses from the search endpoint.
pub enum SearchResponse {
    Ok(Json<SearchOutcome>),
}

impl IntoResponse for SearchResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/search?kind=...&q=...`
pub async fn search<S, L>(
    State(state): State<AppState<S, L>>,
    Query(params): Query<SearchQuery>,
) -> Result<SearchResponse, ApiError>
where
    S: SnapshotSource + 'static,
    L: RegistryLoader + Send + Sync + 'static,
{
    let request = params.into_request()?;
    let outcome = state.target_service.search(&request);
    Ok(SearchResponse::Ok(Json(outcome)))
}
