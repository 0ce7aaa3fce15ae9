// handlers/public/mod.rs - endpoints that need no token
use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::database::Store;
use crate::entities::schemas;
use crate::error::ApiError;

/// GET / - service description and the entity routes it serves
pub async fn root<S: Store>(State(state): State<AppState<S>>) -> Json<Value> {
    let entities: Vec<Value> = schemas()
        .iter()
        .map(|schema| {
            json!({
                "name": schema.name,
                "route": format!("/api/{}", schema.route),
                "relations": schema.relations.iter().map(|r| r.name).collect::<Vec<_>>(),
            })
        })
        .collect();

    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "description": env!("CARGO_PKG_DESCRIPTION"),
        "backend": state.store.backend(),
        "entities": entities,
    }))
}

/// GET /health - 200 when the store answers, 503 otherwise
pub async fn health<S: Store>(State(state): State<AppState<S>>) -> Result<(StatusCode, Json<Value>), ApiError> {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(()) => Ok((
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "backend": state.store.backend(),
            })),
        )),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            Err(ApiError::service_unavailable("Database unavailable"))
        }
    }
}
