//! HTTP-level integration tests for per-client unit settings.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, put_json};
use ephany_core::attributes::AttributeSchema;
use serde_json::json;

#[tokio::test]
async fn test_settings_default_to_storage_units() {
    let app = common::build_test_app(AttributeSchema::default());
    let response = get(&app, "/api/v1/settings/units").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["data"],
        json!({"length": "mm", "area": "sq_m", "volume": "cu_m", "mass": "kg"})
    );
}

#[tokio::test]
async fn test_partial_update_keeps_other_categories() {
    let app = common::build_test_app(AttributeSchema::default());
    put_json(&app, "/api/v1/settings/units", json!({"length": "ft"})).await;
    let response = put_json(&app, "/api/v1/settings/units", json!({"volume": "cu_ft"})).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["data"],
        json!({"length": "ft", "area": "sq_m", "volume": "cu_ft", "mass": "kg"})
    );
}

#[tokio::test]
async fn test_unit_from_another_category_is_rejected() {
    let app = common::build_test_app(AttributeSchema::default());
    let response = put_json(&app, "/api/v1/settings/units", json!({"length": "kg"})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(
        json["error"],
        "Invalid unit 'kg' for category 'length'. Valid options: mm, cm, m, in, ft"
    );

    let json = body_json(get(&app, "/api/v1/settings/units").await).await;
    assert_eq!(json["data"]["length"], "mm");
}
