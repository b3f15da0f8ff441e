//! Integration tests for the `X-API-Key` check.

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, get, get_with_key, json_request};
use serde_json::json;

const CLIENTS: &[(&str, &str)] = &[("revit-sync", "k-revit"), ("web", "k-web")];

// ---------------------------------------------------------------------------
// Test: missing and unknown keys
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_key_returns_401() {
    let app = common::build_test_app_with_keys(common::test_schema(), CLIENTS);
    let response = get(&app, "/api/v1/attributes").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "API key required.");
}

#[tokio::test]
async fn unknown_key_returns_403() {
    let app = common::build_test_app_with_keys(common::test_schema(), CLIENTS);
    let response = get_with_key(&app, "/api/v1/attributes", "nope").await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        body_json(response).await["error"],
        "Invalid or inactive API key."
    );
}

#[tokio::test]
async fn empty_key_counts_as_missing() {
    let app = common::build_test_app_with_keys(common::test_schema(), CLIENTS);
    let response = get_with_key(&app, "/api/v1/attributes", "").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Test: accepted keys
// ---------------------------------------------------------------------------

#[tokio::test]
async fn header_key_is_accepted() {
    let app = common::build_test_app_with_keys(common::test_schema(), CLIENTS);
    let response = get_with_key(&app, "/api/v1/attributes", "k-revit").await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn query_parameter_key_is_accepted() {
    let app = common::build_test_app_with_keys(common::test_schema(), CLIENTS);
    let response = get(&app, "/api/v1/attributes?api_key=k-web").await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn empty_header_falls_back_to_query_parameter() {
    let app = common::build_test_app_with_keys(common::test_schema(), CLIENTS);
    let response = get_with_key(&app, "/api/v1/attributes?api_key=k-web", "").await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn health_is_not_protected() {
    let app = common::build_test_app_with_keys(common::test_schema(), CLIENTS);
    let response = get(&app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Test: unit settings are kept per client
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unit_settings_are_scoped_to_the_calling_client() {
    let app = common::build_test_app_with_keys(common::test_schema(), CLIENTS);
    let response = json_request(
        &app,
        Method::PUT,
        "/api/v1/settings/units",
        json!({"length": "ft"}),
        Some("k-revit"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let revit = body_json(get_with_key(&app, "/api/v1/settings/units", "k-revit").await).await;
    let web = body_json(get_with_key(&app, "/api/v1/settings/units", "k-web").await).await;
    assert_eq!(revit["data"]["length"], "ft");
    assert_eq!(web["data"]["length"], "mm");
}
