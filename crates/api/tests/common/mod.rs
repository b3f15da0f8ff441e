#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use ephany_api::config::{ApiClientKey, ApiKeyConfig, ServerConfig};
use ephany_api::router::build_app_router;
use ephany_api::state::AppState;
use ephany_core::attributes::{AttributeDefinition, AttributeSchema, DataType, MeasureKind};
use http_body_util::BodyExt;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default),
/// a 30-second request timeout and the API key check disabled.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        api_keys: ApiKeyConfig::default(),
    }
}

/// Attribute schema most tests run against.
///
/// - `door_quantity`: integer, no unit
/// - `finish`: string, no unit
/// - `shelf_depth`: float, length (Autodesk spec id)
/// - `shipping_weight`: float, mass
/// - `panel_area`: float, area
pub fn test_schema() -> AttributeSchema {
    AttributeSchema::from_definitions([
        AttributeDefinition::new("door_quantity", DataType::Integer, None).unwrap(),
        AttributeDefinition::new("finish", DataType::String, None).unwrap(),
        AttributeDefinition::new(
            "shelf_depth",
            DataType::Float,
            Some("autodesk.spec.aec:length-2.0.0".parse::<MeasureKind>().unwrap()),
        )
        .unwrap(),
        AttributeDefinition::new("shipping_weight", DataType::Float, Some(MeasureKind::Mass)).unwrap(),
        AttributeDefinition::new("panel_area", DataType::Float, Some(MeasureKind::Area)).unwrap(),
    ])
    .unwrap()
}

/// Build the full application router with all middleware layers over fresh
/// in-memory stores.
///
/// The returned router is cheap to clone; clones share the same state, so a
/// test can create a record with one clone and read it back with another.
pub fn build_test_app(schema: AttributeSchema) -> Router {
    build_app_with_config(test_config(), schema)
}

/// Same as [`build_test_app`], with the API key check enabled for the given
/// `(name, key)` clients.
pub fn build_test_app_with_keys(schema: AttributeSchema, clients: &[(&str, &str)]) -> Router {
    let mut config = test_config();
    config.api_keys = ApiKeyConfig {
        enabled: true,
        clients: clients
            .iter()
            .map(|(name, key)| ApiClientKey::new(*name, key))
            .collect(),
        ..ApiKeyConfig::default()
    };
    build_app_with_config(config, schema)
}

fn build_app_with_config(config: ServerConfig, schema: AttributeSchema) -> Router {
    let state = AppState::new(config.clone(), schema);
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn get_with_key(app: &Router, uri: &str, key: &str) -> Response<Body> {
    let request = Request::get(uri)
        .header("x-api-key", key)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn json_request(
    app: &Router,
    method: Method,
    uri: &str,
    body: serde_json::Value,
    key: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(key) = key {
        builder = builder.header("x-api-key", key);
    }
    send(app, builder.body(Body::from(body.to_string())).unwrap()).await
}

pub async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    json_request(app, Method::POST, uri, body, None).await
}

pub async fn patch_json(app: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    json_request(app, Method::PATCH, uri, body, None).await
}

pub async fn put_json(app: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    json_request(app, Method::PUT, uri, body, None).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert a JSON number is within floating point noise of `expected`.
pub fn assert_close(actual: &serde_json::Value, expected: f64) {
    let actual = actual
        .as_f64()
        .unwrap_or_else(|| panic!("expected a number, got {actual}"));
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
