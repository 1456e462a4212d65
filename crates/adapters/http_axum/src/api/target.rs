//! JSON REST handlers for target extraction and display trees.

use std::str::FromStr;
use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use homegraph_app::ports::{RegistryLoader, SnapshotSource};
use homegraph_domain::filter::{FilterCriteria, SecondaryEntities};
use homegraph_domain::id::{AreaId, DeviceId, EntityId};
use homegraph_domain::target::{ExtractionResult, TargetSpec};
use homegraph_domain::tree::{DisplayTreeBuilder, RootType, Row};

use crate::error::ApiError;
use crate::state::AppState;

/// Filter options shared by the target endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FilterBody {
    #[serde(flatten)]
    pub criteria: FilterCriteria,
    /// Overrides the server's secondary-entity policy.
    pub secondary: Option<SecondaryEntities>,
}

/// Request body for the extract endpoint: the target ids plus an optional filter.
#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    #[serde(flatten)]
    pub target: TargetSpec,
    #[serde(default)]
    pub filter: FilterBody,
}

/// Request body for the tree endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TreeRequest {
    pub target: TargetSpec,
    pub root: Option<String>,
    pub filter: FilterBody,
    pub area_order: Vec<AreaId>,
    pub device_order: Vec<DeviceId>,
    pub entity_order: Vec<EntityId>,
}

/// Possible responses from the extract endpoint.
pub enum ExtractResponse {
    Ok(Json<ExtractionResult>),
}

impl IntoResponse for ExtractResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the tree endpoint.
pub enum TreeResponse {
    Ok(Json<Vec<Row>>),
}

impl IntoResponse for TreeResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `POST /api/target/extract`
pub async fn extract<S, L>(
    State(state): State<AppState<S, L>>,
    Json(req): Json<ExtractRequest>,
) -> Result<ExtractResponse, ApiError>
where
    S: SnapshotSource + 'static,
    L: RegistryLoader + Send + Sync + 'static,
{
    let service = &state.target_service;
    let secondary = req
        .filter
        .secondary
        .unwrap_or_else(|| service.default_secondary());
    let result = service.extract_with(&req.target, &req.filter.criteria, secondary);
    Ok(ExtractResponse::Ok(Json(Arc::unwrap_or_clone(result))))
}

/// `POST /api/target/tree`
pub async fn tree<S, L>(
    State(state): State<AppState<S, L>>,
    Json(req): Json<TreeRequest>,
) -> Result<TreeResponse, ApiError>
where
    S: SnapshotSource + 'static,
    L: RegistryLoader + Send + Sync + 'static,
{
    let root = req
        .root
        .as_deref()
        .map(RootType::from_str)
        .transpose()?
        .unwrap_or_default();

    let service = &state.target_service;
    let secondary = req
        .filter
        .secondary
        .unwrap_or_else(|| service.default_secondary());
    let builder = DisplayTreeBuilder::new()
        .area_order(req.area_order)
        .device_order(req.device_order)
        .entity_order(req.entity_order);
    let rows = service.tree_with(&req.target, &req.filter.criteria, root, secondary, &builder);
    Ok(TreeResponse::Ok(Json(rows)))
}
