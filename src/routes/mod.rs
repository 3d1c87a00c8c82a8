//! Router HTTP
//!
//! Monta los routers por entidad bajo `/api` con las capas comunes.

pub mod driver_routes;
pub mod route_routes;
pub mod vehicle_routes;

use axum::{extract::State, response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower::{limit::ConcurrencyLimitLayer, ServiceBuilder};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::middleware::cors_layer;
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);
    let max_concurrent = state.config.max_concurrent_requests.max(1);

    Router::new()
        .route("/health", get(health))
        .nest("/api/vehicles", vehicle_routes::create_vehicle_router())
        .nest("/api/drivers", driver_routes::create_driver_router())
        .nest("/api/routes", route_routes::create_route_router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(CompressionLayer::new())
                .layer(ConcurrencyLimitLayer::new(max_concurrent)),
        )
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "environment": state.config.environment,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
