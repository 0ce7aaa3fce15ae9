use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::app::AppState;
use crate::database::Store;
use crate::entities::{Entity, Record};
use crate::error::ApiError;
use crate::filter::{FilterCriteria, Pagination};
use crate::handlers::response::IdResponse;
use crate::middleware::AuthUser;
use crate::services::{EntityService, ListRequest};
use crate::types::Entitlement;

use super::{authorize, json_body};

/// Query string of the list endpoint. `filters` is a JSON array of criteria.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub filters: Option<String>,
    pub search_term: Option<String>,
    pub page_number: Option<i64>,
    pub page_size: Option<i64>,
    pub sort_field: Option<String>,
    pub sort_order: Option<String>,
}

/// GET /api/{entity}
pub async fn list<T: Entity, S: Store>(
    State(state): State<AppState<S>>,
    Extension(user): Extension<AuthUser>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<Record<T>>>, ApiError> {
    authorize::<T, S>(&state, &user, Entitlement::Read)?;
    let Query(query) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let name = T::schema().name;

    let pagination = Pagination::new(
        query.page_number.unwrap_or(1),
        query.page_size.unwrap_or(state.config.pagination.default_page_size),
    )?;
    let (pagination, capped) = pagination.capped(state.config.pagination.max_page_size);
    if capped {
        warn!(
            "{}: page size capped at {} for {}",
            name,
            pagination.page_size(),
            user.subject
        );
    }

    let filters = match query.filters.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => FilterCriteria::parse_list(raw)?,
        _ => vec![],
    };

    let request = ListRequest {
        filters,
        search_term: query.search_term,
        page_number: pagination.page_number() as i64,
        page_size: pagination.page_size() as i64,
        sort_field: query.sort_field.filter(|f| !f.trim().is_empty()),
        sort_order: query.sort_order,
    };
    debug!("{} list by {}: {:?}", name, user.subject, request);

    let mut session = state.store.begin().await?;
    let rows = EntityService::<T, S::Session>::new(&mut session).get(&request).await?;
    Ok(Json(rows))
}

/// POST /api/{entity}
pub async fn create<T: Entity, S: Store>(
    State(state): State<AppState<S>>,
    Extension(user): Extension<AuthUser>,
    body: Result<Json<T>, JsonRejection>,
) -> Result<Json<IdResponse>, ApiError> {
    authorize::<T, S>(&state, &user, Entitlement::Create)?;
    let model = json_body(body)?;

    let mut session = state.store.begin().await?;
    let id = EntityService::<T, S::Session>::new(&mut session).create(model).await?;
    Ok(Json(IdResponse { id }))
}
