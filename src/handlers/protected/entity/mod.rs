// Generic CRUD handlers, instantiated once per entity type by `app::entity_routes`
mod collection;
mod record;

pub use collection::{create, list, ListQuery};
pub use record::{delete, get_by_id, patch, update};

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path},
    Json,
};
use tracing::warn;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::Store;
use crate::entities::Entity;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::types::Entitlement;

/// Rejects callers whose claims lack `entitlement` on `T`
fn authorize<T: Entity, S: Store>(state: &AppState<S>, user: &AuthUser, entitlement: Entitlement) -> Result<(), ApiError> {
    let entity = T::schema().name;
    if state.policy.is_entitled(&user.claims, entity, entitlement) {
        return Ok(());
    }

    warn!("{} is not entitled to {} {}", user.subject, entitlement, entity);
    Err(ApiError::unauthorized(format!("Missing {} entitlement for {}", entitlement, entity)))
}

fn path_id(path: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, ApiError> {
    path.map(|Path(id)| id)
        .map_err(|e| ApiError::bad_request(e.body_text()))
}

fn json_body<B>(body: Result<Json<B>, JsonRejection>) -> Result<B, ApiError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(JsonRejection::JsonSyntaxError(e)) => Err(ApiError::invalid_json(e.body_text())),
        Err(e) => Err(ApiError::bad_request(e.body_text())),
    }
}
