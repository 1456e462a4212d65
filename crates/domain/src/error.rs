//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`HomeGraphError`] via `From`. Data-consistency problems inside a
//! resolution call are never errors: they are reported through the
//! `missing_*` fields of an extraction result instead.

/// Top-level error for homegraph operations.
#[derive(Debug, thiserror::Error)]
pub enum HomeGraphError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    #[error("registry error")]
    Registry(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A record or request violates a domain invariant.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("id must not be empty")]
    EmptyId,

    #[error("entity id {0:?} is not of the form domain.object_id")]
    MalformedEntityId(String),

    #[error("{kind} {id:?} references unknown {target} {target_id:?}")]
    DanglingReference {
        kind: &'static str,
        id: String,
        target: &'static str,
        target_id: String,
    },

    #[error("unknown root type {0:?}, expected one of floor, area, device, label")]
    UnknownRootType(String),

    #[error("unknown picker kind {0:?}, expected one of area_floor, device, entity, label")]
    UnknownPickerKind(String),
}

/// A lookup by id found nothing.
#[derive(Debug, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}
