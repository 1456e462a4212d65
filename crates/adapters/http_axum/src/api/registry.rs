//! JSON REST handlers for the registry snapshot.

use axum::Json;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::Serialize;

use homegraph_app::ports::{RegistryLoader, SnapshotSource};
use homegraph_app::services::target_service::EntityDetails;
use homegraph_domain::error::ValidationError;
use homegraph_domain::id::EntityId;
use homegraph_domain::registry::SnapshotStats;

use crate::error::ApiError;
use crate::state::AppState;

/// Snapshot currently in effect.
#[derive(Debug, Serialize)]
pub struct RegistryStatus {
    pub loaded_at: DateTime<Utc>,
    pub stats: SnapshotStats,
}

/// Possible responses from the status endpoint.
pub enum StatusResponse {
    Ok(Json<RegistryStatus>),
}

impl IntoResponse for StatusResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the reload endpoint.
pub enum ReloadResponse {
    Ok(Json<SnapshotStats>),
}

impl IntoResponse for ReloadResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the entity endpoint.
pub enum EntityResponse {
    Ok(Json<EntityDetails>),
}

impl IntoResponse for EntityResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/registry`
pub async fn status<S, L>(
    State(state): State<AppState<S, L>>,
) -> Result<StatusResponse, ApiError>
where
    S: SnapshotSource + 'static,
    L: RegistryLoader + Send + Sync + 'static,
{
    let snapshot = state.target_service.snapshot();
    Ok(StatusResponse::Ok(Json(RegistryStatus {
        loaded_at: snapshot.loaded_at(),
        stats: snapshot.stats(),
    })))
}

/// `POST /api/registry/reload`
pub async fn reload<S, L>(
    State(state): State<AppState<S, L>>,
) -> Result<ReloadResponse, ApiError>
where
    S: SnapshotSource + 'static,
    L: RegistryLoader + Send + Sync + 'static,
{
    let stats = state.registry_sync.reload().await?;
    Ok(ReloadResponse::Ok(Json(stats)))
}

/// `GET /api/registry/entities/{id}`
pub async fn entity<S, L>(
    State(state): State<AppState<S, L>>,
    Path(id): Path<String>,
) -> Result<EntityResponse, ApiError>
where
    S: SnapshotSource + 'static,
    L: RegistryLoader + Send + Sync + 'static,
{
    let entity_id = EntityId::new(id);
    if !entity_id.is_well_formed() {
        return Err(ValidationError::MalformedEntityId(entity_id.to_string()).into());
    }
    let details = state.target_service.entity(&entity_id)?;
    Ok(EntityResponse::Ok(Json(details)))
}
