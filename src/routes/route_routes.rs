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
use crate::dto::list_dto::{AvailabilityParams, RouteListParams};
use crate::models::assignment::AvailableResources;
use crate::models::auth::Actor;
use crate::models::route::{ProductGroup, Route, RouteListing, RouteRequest};
use crate::services::route_registry::RouteList;
use crate::services::search_paginator::ListQuery;
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub fn create_route_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_routes).post(create_route))
        .route("/availability", get(get_availability))
        .route("/:id", get(get_route).put(update_route).delete(delete_route))
        .route("/:id/status", patch(set_route_status))
}

async fn create_route(
    State(state): State<AppState>,
    actor: Actor,
    payload: Result<Json<RouteRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ApiResponse<Route>>)> {
    let Json(request) = payload?;
    let route = state.routes.create(&actor, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(route, "Ruta creada exitosamente")),
    ))
}

async fn list_routes(
    State(state): State<AppState>,
    _actor: Actor,
    params: Result<Query<RouteListParams>, QueryRejection>,
) -> AppResult<Json<ApiResponse<RouteList>>> {
    let Query(params) = params?;
    let query: ListQuery<ProductGroup> = params.into();
    let result = state.routes.list(&query).await?;
    Ok(Json(ApiResponse::success(result)))
}

/// Recursos que puede ofrecer el formulario de una ruta nueva o en edición
async fn get_availability(
    State(state): State<AppState>,
    _actor: Actor,
    params: Result<Query<AvailabilityParams>, QueryRejection>,
) -> AppResult<Json<ApiResponse<AvailableResources>>> {
    let Query(params) = params?;
    let resources = state.availability.resolve(params.exclude_route_id).await?;
    Ok(Json(ApiResponse::success(resources)))
}

async fn get_route(
    State(state): State<AppState>,
    _actor: Actor,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<ApiResponse<RouteListing>>> {
    let Path(id) = id?;
    let route = state.routes.get(id).await?;
    Ok(Json(ApiResponse::success(route)))
}

async fn update_route(
    State(state): State<AppState>,
    actor: Actor,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<RouteRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<Route>>> {
    let Path(id) = id?;
    let Json(request) = payload?;
    let route = state.routes.update(&actor, id, request).await?;
    Ok(Json(ApiResponse::success_with_message(route, "Ruta actualizada exitosamente")))
}

async fn set_route_status(
    State(state): State<AppState>,
    actor: Actor,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<SetActiveRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<Route>>> {
    let Path(id) = id?;
    let Json(request) = payload?;
    let route = state.routes.set_active(&actor, id, request.active).await?;
    Ok(Json(ApiResponse::success_with_message(route, "Estado de la ruta actualizado")))
}

async fn delete_route(
    State(state): State<AppState>,
    actor: Actor,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<ApiResponse<Route>>> {
    let Path(id) = id?;
    let route = state.routes.delete(&actor, id).await?;
    Ok(Json(ApiResponse::success_with_message(route, "Ruta eliminada, recursos liberados")))
}
