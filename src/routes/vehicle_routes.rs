use std::convert::Infallible;

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
use crate::dto::list_dto::VehicleListParams;
use crate::models::auth::Actor;
use crate::models::vehicle::{CreateVehicleRequest, UpdateVehicleRequest, Vehicle};
use crate::services::resource_catalog::{VehicleListing, VehicleStats};
use crate::services::search_paginator::{ListQuery, ListResult};
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub fn create_vehicle_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_vehicles).post(create_vehicle))
        .route("/:id", get(get_vehicle).put(update_vehicle).delete(delete_vehicle))
        .route("/:id/status", patch(set_vehicle_status))
}

async fn create_vehicle(
    State(state): State<AppState>,
    actor: Actor,
    payload: Result<Json<CreateVehicleRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ApiResponse<Vehicle>>)> {
    let Json(request) = payload?;
    let vehicle = state.catalog.create_vehicle(&actor, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(vehicle, "Vehículo creado exitosamente")),
    ))
}

async fn list_vehicles(
    State(state): State<AppState>,
    _actor: Actor,
    params: Result<Query<VehicleListParams>, QueryRejection>,
) -> AppResult<Json<ApiResponse<ListResult<VehicleListing, VehicleStats>>>> {
    let Query(params) = params?;
    let query: ListQuery<Infallible> = params.into();
    let result = state.catalog.list_vehicles(&query).await?;
    Ok(Json(ApiResponse::success(result)))
}

async fn get_vehicle(
    State(state): State<AppState>,
    _actor: Actor,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<ApiResponse<Vehicle>>> {
    let Path(id) = id?;
    let vehicle = state.catalog.get_vehicle(id).await?;
    Ok(Json(ApiResponse::success(vehicle)))
}

async fn update_vehicle(
    State(state): State<AppState>,
    actor: Actor,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateVehicleRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<Vehicle>>> {
    let Path(id) = id?;
    let Json(request) = payload?;
    let vehicle = state.catalog.update_vehicle(&actor, id, request).await?;
    Ok(Json(ApiResponse::success_with_message(vehicle, "Vehículo actualizado exitosamente")))
}

async fn set_vehicle_status(
    State(state): State<AppState>,
    actor: Actor,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<SetActiveRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<Vehicle>>> {
    let Path(id) = id?;
    let Json(request) = payload?;
    let vehicle = state.catalog.set_vehicle_active(&actor, id, request.active).await?;
    Ok(Json(ApiResponse::success_with_message(vehicle, "Estado del vehículo actualizado")))
}

async fn delete_vehicle(
    State(state): State<AppState>,
    actor: Actor,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<ApiResponse<Uuid>>> {
    let Path(id) = id?;
    state.catalog.delete_vehicle(&actor, id).await?;
    Ok(Json(ApiResponse::success_with_message(id, "Vehículo eliminado exitosamente")))
}
