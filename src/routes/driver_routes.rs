use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use uuid::Uuid;

use crate::dto::common_dto::{ApiResponse, SetActiveRequest};
use crate::dto::list_dto::DriverListParams;
use crate::models::auth::Actor;
use crate::models::driver::{CreateDriverRequest, Driver, LicenseType, UpdateDriverRequest};
use crate::services::resource_catalog::{DriverListing, DriverStats};
use crate::services::search_paginator::{ListQuery, ListResult};
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub fn create_driver_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_drivers).post(create_driver))
        .route("/:id", get(get_driver).put(update_driver).delete(delete_driver))
        .route("/:id/status", patch(set_driver_status))
}

async fn create_driver(
    State(state): State<AppState>,
    actor: Actor,
    payload: Result<Json<CreateDriverRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ApiResponse<Driver>>)> {
    let Json(request) = payload?;
    let driver = state.catalog.create_driver(&actor, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(driver, "Conductor creado exitosamente")),
    ))
}

async fn list_drivers(
    State(state): State<AppState>,
    _actor: Actor,
    params: Result<Query<DriverListParams>, QueryRejection>,
) -> AppResult<Json<ApiResponse<ListResult<DriverListing, DriverStats>>>> {
    let Query(params) = params?;
    let query: ListQuery<LicenseType> = params.into();
    let result = state.catalog.list_drivers(&query).await?;
    Ok(Json(ApiResponse::success(result)))
}

async fn get_driver(
    State(state): State<AppState>,
    _actor: Actor,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<ApiResponse<Driver>>> {
    let Path(id) = id?;
    let driver = state.catalog.get_driver(id).await?;
    Ok(Json(ApiResponse::success(driver)))
}

async fn update_driver(
    State(state): State<AppState>,
    actor: Actor,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateDriverRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<Driver>>> {
    let Path(id) = id?;
    let Json(request) = payload?;
    let driver = state.catalog.update_driver(&actor, id, request).await?;
    Ok(Json(ApiResponse::success_with_message(driver, "Conductor actualizado exitosamente")))
}

async fn set_driver_status(
    State(state): State<AppState>,
    actor: Actor,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<SetActiveRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<Driver>>> {
    let Path(id) = id?;
    let Json(request) = payload?;
    let driver = state.catalog.set_driver_active(&actor, id, request.active).await?;
    Ok(Json(ApiResponse::success_with_message(driver, "Estado del conductor actualizado")))
}

async fn delete_driver(
    State(state): State<AppState>,
    actor: Actor,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<ApiResponse<Uuid>>> {
    let Path(id) = id?;
    state.catalog.delete_driver(&actor, id).await?;
    Ok(Json(ApiResponse::success_with_message(id, "Conductor eliminado exitosamente")))
}
