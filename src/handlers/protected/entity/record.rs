use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    Extension, Json,
};
use json_patch::Patch;

use crate::app::AppState;
use crate::database::Store;
use crate::entities::{Entity, Record};
use crate::error::ApiError;
use crate::handlers::response::StatusResponse;
use crate::middleware::AuthUser;
use crate::services::{EntityService, ServiceError};
use crate::types::Entitlement;

use super::{authorize, json_body, path_id};

/// GET /api/{entity}/:id - the entity with its relations expanded
pub async fn get_by_id<T: Entity, S: Store>(
    State(state): State<AppState<S>>,
    Extension(user): Extension<AuthUser>,
    path: Result<Path<uuid::Uuid>, PathRejection>,
) -> Result<Json<Record<T>>, ApiError> {
    authorize::<T, S>(&state, &user, Entitlement::Read)?;
    let id = path_id(path)?;

    let mut session = state.store.begin().await?;
    match EntityService::<T, S::Session>::new(&mut session).get_by_id(id).await? {
        Some(record) => Ok(Json(record)),
        None => Err(ServiceError::not_found(T::schema().name, id).into()),
    }
}

/// PUT /api/{entity}/:id - full replacement; the body id must match the path
pub async fn update<T: Entity, S: Store>(
    State(state): State<AppState<S>>,
    Extension(user): Extension<AuthUser>,
    path: Result<Path<uuid::Uuid>, PathRejection>,
    body: Result<Json<T>, JsonRejection>,
) -> Result<Json<StatusResponse>, ApiError> {
    authorize::<T, S>(&state, &user, Entitlement::Update)?;
    let id = path_id(path)?;
    let entity = json_body(body)?;

    if entity.id() != id {
        return Err(ApiError::bad_request("Mismatched Id"));
    }

    let mut session = state.store.begin().await?;
    EntityService::<T, S::Session>::new(&mut session).update(id, entity).await?;
    Ok(Json(StatusResponse::ok()))
}

/// PATCH /api/{entity}/:id - RFC 6902 operations; a `null` body is rejected
pub async fn patch<T: Entity, S: Store>(
    State(state): State<AppState<S>>,
    Extension(user): Extension<AuthUser>,
    path: Result<Path<uuid::Uuid>, PathRejection>,
    body: Result<Json<Option<Patch>>, JsonRejection>,
) -> Result<Json<StatusResponse>, ApiError> {
    authorize::<T, S>(&state, &user, Entitlement::Update)?;
    let id = path_id(path)?;
    let operations = json_body(body)?;

    let mut session = state.store.begin().await?;
    EntityService::<T, S::Session>::new(&mut session).patch(id, operations).await?;
    Ok(Json(StatusResponse::ok()))
}

/// DELETE /api/{entity}/:id
pub async fn delete<T: Entity, S: Store>(
    State(state): State<AppState<S>>,
    Extension(user): Extension<AuthUser>,
    path: Result<Path<uuid::Uuid>, PathRejection>,
) -> Result<Json<StatusResponse>, ApiError> {
    authorize::<T, S>(&state, &user, Entitlement::Delete)?;
    let id = path_id(path)?;

    let mut session = state.store.begin().await?;
    EntityService::<T, S::Session>::new(&mut session).delete(id).await?;
    Ok(Json(StatusResponse::ok()))
}
