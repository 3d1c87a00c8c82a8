use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use fleet_dispatch::{
    config::EnvironmentConfig,
    create_app,
    models::auth::UserRole,
    repositories::MemoryFleetStore,
    utils::jwt::{generate_token, JwtConfig},
    AppState,
};

const SECRET: &str = "secreto-de-pruebas";

struct TestApp {
    router: Router,
    admin: String,
    dispatcher: String,
}

fn create_test_app() -> TestApp {
    let config = EnvironmentConfig::for_tests(SECRET);
    let jwt = JwtConfig::from(&config);
    TestApp {
        router: create_app(AppState::new(config, Arc::new(MemoryFleetStore::new()))),
        admin: generate_token("admin", UserRole::Administrator, &jwt).unwrap(),
        dispatcher: generate_token("despacho", UserRole::Dispatcher, &jwt).unwrap(),
    }
}

impl TestApp {
    async fn call(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(value) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = self.router.clone().oneshot(request.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, value)
    }

    async fn create(&self, uri: &str, body: Value) -> String {
        let (status, body) = self.call(Method::POST, uri, Some(&self.admin), Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["data"]["id"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app();
    let (status, body) = app.call(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = create_test_app();
    let (status, body) = app.call(Method::GET, "/api/vehicles", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_dispatcher_can_read_but_not_write() {
    let app = create_test_app();
    let (status, _) = app.call(Method::GET, "/api/vehicles", Some(&app.dispatcher), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .call(Method::POST, "/api/vehicles", Some(&app.dispatcher), Some(json!({ "plate": "P001" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_invalid_driver_lists_offending_fields() {
    let app = create_test_app();
    let (status, body) = app
        .call(
            Method::POST,
            "/api/drivers",
            Some(&app.admin),
            Some(json!({
                "full_name": "J",
                "national_id": "123",
                "license_number": "L1234",
                "license_type": "Heavy",
                "phone": "77778888"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["details"]["full_name"].is_array());
    assert!(body["details"]["national_id"].is_array());
    assert!(body["details"]["phone"].is_array());
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let app = create_test_app();
    let (status, body) = app
        .call(Method::POST, "/api/routes", Some(&app.admin), Some(json!({ "route_number": 5 })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_route_lifecycle_over_http() {
    let app = create_test_app();
    let vehicle_id = app.create("/api/vehicles", json!({ "plate": "p001-2024", "active": true })).await;
    let driver_id = app
        .create(
            "/api/drivers",
            json!({
                "full_name": "Juan Perez",
                "national_id": "12345678-9",
                "license_number": "L1234",
                "license_type": "Heavy"
            }),
        )
        .await;

    let route = json!({
        "route_number": "R001",
        "travel_description": "San Salvador - Santa Ana",
        "product_group": "BigCola",
        "vehicle_id": vehicle_id,
        "driver_id": driver_id
    });
    let route_id = app.create("/api/routes", route.clone()).await;

    // segundo intento con los mismos recursos
    let (status, body) = app.call(Method::POST, "/api/routes", Some(&app.admin), Some(route)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["details"]["conflicts"][0]["resource"], "vehicle");
    assert_eq!(body["details"]["conflicts"][0]["route_id"], route_id.as_str());

    let (status, body) = app.call(Method::GET, "/api/routes", Some(&app.dispatcher), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"][0]["vehicle_plate"], "P001-2024");
    assert_eq!(body["data"]["items"][0]["driver_name"], "Juan Perez");
    assert_eq!(body["data"]["pagination"]["total_records"], 1);
    assert_eq!(body["data"]["available_resources"]["vehicles"], json!([]));

    let uri = format!("/api/routes/availability?exclude_route_id={}", route_id);
    let (status, body) = app.call(Method::GET, &uri, Some(&app.dispatcher), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["vehicles"][0]["availability"], "current_assignment");

    let (status, body) = app
        .call(Method::DELETE, &format!("/api/vehicles/{}", vehicle_id), Some(&app.admin), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");

    let (status, _) = app
        .call(Method::DELETE, &format!("/api/routes/{}", route_id), Some(&app.admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.call(Method::GET, "/api/routes/availability", Some(&app.dispatcher), None).await;
    assert_eq!(body["data"]["vehicles"][0]["id"], vehicle_id.as_str());
    assert_eq!(body["data"]["vehicles"][0]["availability"], "available");
}

#[tokio::test]
async fn test_vehicle_status_and_filters() {
    let app = create_test_app();
    let id = app.create("/api/vehicles", json!({ "plate": "A100" })).await;
    app.create("/api/vehicles", json!({ "plate": "B200" })).await;

    let (status, body) = app
        .call(
            Method::PATCH,
            &format!("/api/vehicles/{}/status", id),
            Some(&app.admin),
            Some(json!({ "active": false })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["active"], false);

    let (_, body) = app
        .call(Method::GET, "/api/vehicles?status=inactive&page_size=5", Some(&app.admin), None)
        .await;
    assert_eq!(body["data"]["items"][0]["plate"], "A100");
    assert_eq!(body["data"]["pagination"]["page_size"], 5);
    assert_eq!(body["data"]["stats"]["total"], 2);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = create_test_app();
    let uri = format!("/api/routes/{}", uuid::Uuid::new_v4());
    let (status, body) = app.call(Method::GET, &uri, Some(&app.admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}
