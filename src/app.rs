use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::auth::{ClaimsPolicy, EntitlementPolicy};
use crate::config::AppConfig;
use crate::database::Store;
use crate::entities::{
    Entity, FinanceSetting, InvoiceLine, Medication, Notification, PatientHospitalisationHistory, Requisition,
    VisitVitalTemplateParameter,
};
use crate::handlers::{protected::entity, public};
use crate::middleware::jwt_auth_middleware;

/// Shared by every handler: the store, the entitlement policy and the config
pub struct AppState<S: Store> {
    pub store: Arc<S>,
    pub policy: Arc<dyn EntitlementPolicy>,
    pub config: Arc<AppConfig>,
}

impl<S: Store> AppState<S> {
    pub fn new(store: S, config: AppConfig) -> Self {
        Self {
            store: Arc::new(store),
            policy: Arc::new(ClaimsPolicy),
            config: Arc::new(config),
        }
    }

    pub fn with_policy(mut self, policy: impl EntitlementPolicy) -> Self {
        self.policy = Arc::new(policy);
        self
    }
}

impl<S: Store> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            policy: Arc::clone(&self.policy),
            config: Arc::clone(&self.config),
        }
    }
}

pub fn app<S: Store>(state: AppState<S>) -> Router {
    let config = Arc::clone(&state.config);

    let api = Router::new()
        .merge(entity_routes::<FinanceSetting, S>())
        .merge(entity_routes::<InvoiceLine, S>())
        .merge(entity_routes::<Medication, S>())
        .merge(entity_routes::<Notification, S>())
        .merge(entity_routes::<PatientHospitalisationHistory, S>())
        .merge(entity_routes::<VisitVitalTemplateParameter, S>())
        .merge(entity_routes::<Requisition, S>())
        .route_layer(middleware::from_fn_with_state(Arc::clone(&config), jwt_auth_middleware));

    let router = Router::new()
        // Public
        .route("/", get(public::root::<S>))
        .route("/health", get(public::health::<S>))
        // Protected entity API
        .merge(api)
        .layer(
            ServiceBuilder::new()
                .layer(DefaultBodyLimit::disable())
                .layer(RequestBodyLimitLayer::new(config.api.max_request_size_bytes))
                .layer(cors_layer(&config)),
        )
        .with_state(state);

    if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// The six CRUD routes for one entity under `/api/{route}`
fn entity_routes<T: Entity, S: Store>() -> Router<AppState<S>> {
    let collection = format!("/api/{}", T::schema().route);
    let record = format!("{}/:id", collection);

    Router::new()
        .route(&collection, get(entity::list::<T, S>).post(entity::create::<T, S>))
        .route(
            &record,
            get(entity::get_by_id::<T, S>)
                .put(entity::update::<T, S>)
                .patch(entity::patch::<T, S>)
                .delete(entity::delete::<T, S>),
        )
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if config.is_development() {
        return CorsLayer::permissive();
    }
    if !config.security.enable_cors {
        return CorsLayer::new();
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
