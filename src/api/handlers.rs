use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::board::{ReconcileOutcome, Reconciler, ServiceCatalog, StatusPatch};
use crate::http::{ApiError, JsonBody, PathParam, QueryParams};
use crate::model::{Dependency, Service, ServiceUpdate};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub catalog: ServiceCatalog,
    pub reconciler: Reconciler,
}

impl AppState {
    pub fn new(catalog: ServiceCatalog) -> Self {
        let reconciler = Reconciler::new(catalog.services());
        Self { catalog, reconciler }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    /// `summary` drops health checks from every service.
    #[serde(default)]
    pub view: Option<String>,
}

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct PatchResponse {
    pub message: &'static str,
    #[serde(flatten)]
    pub outcome: ReconcileOutcome,
}

pub async fn get_health() -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "ok",
    })
}

pub async fn list_services(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<ListParams>,
) -> Result<Json<Vec<Service>>, ApiError> {
    let services = state.catalog.all().await?;
    let services = match params.view.as_deref() {
        Some("summary") => services.iter().map(Service::summary).collect(),
        _ => services,
    };
    Ok(Json(services))
}

/// Board view: every service without its checks.
pub async fn get_board(State(state): State<AppState>) -> Result<Json<Vec<Service>>, ApiError> {
    let services = state.catalog.all().await?;
    Ok(Json(services.iter().map(Service::summary).collect()))
}

pub async fn create_service(
    State(state): State<AppState>,
    JsonBody(service): JsonBody<Service>,
) -> Result<impl IntoResponse, ApiError> {
    let id = state.catalog.create(service).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id.to_string() }))))
}

pub async fn get_service(
    State(state): State<AppState>,
    PathParam(name): PathParam<String>,
) -> Result<Json<Service>, ApiError> {
    Ok(Json(state.catalog.get(&name).await?))
}

pub async fn update_service(
    State(state): State<AppState>,
    PathParam(name): PathParam<String>,
    JsonBody(update): JsonBody<ServiceUpdate>,
) -> Result<Json<Value>, ApiError> {
    if !state.catalog.update(&name, update).await? {
        return Err(ApiError::NotFound(format!("Service with title {} doesn't exist", name)));
    }
    Ok(Json(json!({ "updated": true })))
}

pub async fn delete_service(
    State(state): State<AppState>,
    PathParam(name): PathParam<String>,
) -> Result<Json<Value>, ApiError> {
    if !state.catalog.delete(&name).await? {
        return Err(ApiError::NotFound(format!("Service with title {} doesn't exist", name)));
    }
    Ok(Json(json!({ "deleted": true })))
}

/// Apply check statuses. Unmatched titles are reported, not rejected.
pub async fn patch_checks(
    State(state): State<AppState>,
    JsonBody(patch): JsonBody<StatusPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state.reconciler.reconcile(&patch.name, &patch).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(PatchResponse {
            message: "Updated service check successfully",
            outcome,
        }),
    ))
}

pub async fn list_dependencies(
    State(state): State<AppState>,
    PathParam(name): PathParam<String>,
) -> Result<Json<Vec<Dependency>>, ApiError> {
    Ok(Json(state.catalog.dependencies(&name).await?))
}

pub async fn create_dependency(
    State(state): State<AppState>,
    JsonBody(dependency): JsonBody<Dependency>,
) -> Result<impl IntoResponse, ApiError> {
    let id = state.catalog.add_dependency(dependency).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id.to_string() }))))
}

pub async fn delete_dependency(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<Value>, ApiError> {
    if !state.catalog.remove_dependency(id).await? {
        return Err(ApiError::NotFound(format!("Dependency {} doesn't exist", id)));
    }
    Ok(Json(json!({ "deleted": true })))
}
