//! Integration tests for price-rule create, update, and delete.

use axum::http::StatusCode;
use serde_json::json;

use storelink_integration_tests::{app, percentage_rule, send};

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn test_create_rule_returns_sequential_ids() {
    let app = app();

    let (status, body) = send(&app, "POST", "/rules", Some(percentage_rule("Spring Sale"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": 1}));

    let (status, body) = send(&app, "POST", "/rules", Some(percentage_rule("Summer Sale"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": 2}));
}

#[tokio::test]
async fn test_create_rule_with_conditions() {
    let app = app();
    let payload = json!({
        "name": "Category promo",
        "type": "fixed-per-item",
        "value": 5,
        "website_id": 1,
        "min_purchase_amount": 50,
        "rule_categories": [7, 9],
        "action_products": [101, 102],
    });

    let (status, body) = send(&app, "POST", "/rules", Some(payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": 1}));
}

#[tokio::test]
async fn test_create_rule_reports_all_validation_errors() {
    let app = app();
    let payload = json!({
        "value": 10,
        "website_id": 1,
    });

    let (status, body) = send(&app, "POST", "/rules", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["error"].as_str().expect("error body");
    assert!(message.contains("name is required"));
    assert!(message.contains("type is required"));
}

#[tokio::test]
async fn test_create_rule_rejects_percentage_over_hundred() {
    let app = app();
    let mut payload = percentage_rule("Too generous");
    payload["value"] = json!(150);

    let (status, body) = send(&app, "POST", "/rules", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["error"].as_str().expect("error body");
    assert!(message.contains("percentage value cannot exceed 100"));
}

#[tokio::test]
async fn test_create_rule_rejects_unknown_type() {
    let app = app();
    let mut payload = percentage_rule("Mystery");
    payload["type"] = json!("half-price-tuesdays");

    let (status, body) = send(&app, "POST", "/rules", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_create_rule_rejects_malformed_field() {
    let app = app();
    let mut payload = percentage_rule("Broken");
    payload["value"] = json!({"amount": 10});

    let (status, body) = send(&app, "POST", "/rules", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_create_rule_rejects_mixed_condition_kinds() {
    let app = app();
    let mut payload = percentage_rule("Mixed");
    payload["rule_categories"] = json!([7]);
    payload["rule_products"] = json!([101]);

    let (status, body) = send(&app, "POST", "/rules", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["error"].as_str().expect("error body");
    assert!(message.contains("mutually exclusive"));
}

// ============================================================================
// Update
// ============================================================================

#[tokio::test]
async fn test_update_rule_keeps_its_id() {
    let app = app();
    let (_, created) = send(&app, "POST", "/rules", Some(percentage_rule("Original"))).await;
    assert_eq!(created, json!({"id": 1}));

    let mut payload = percentage_rule("Renamed");
    payload["value"] = json!(25);
    let (status, body) = send(&app, "PUT", "/rules/1", Some(payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": 1}));
}

#[tokio::test]
async fn test_update_unknown_rule_is_not_found() {
    let app = app();

    let (status, body) = send(&app, "PUT", "/rules/42", Some(percentage_rule("Ghost"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_update_validates_before_loading() {
    let app = app();

    // Unknown rule id, but the payload is rejected first.
    let (status, body) = send(&app, "PUT", "/rules/42", Some(json!({"value": 10}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

// ============================================================================
// Delete
// ============================================================================

#[tokio::test]
async fn test_delete_rule_is_idempotent() {
    let app = app();
    send(&app, "POST", "/rules", Some(percentage_rule("Doomed"))).await;

    let (status, body) = send(&app, "DELETE", "/rules/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    // A second delete of the same rule still succeeds.
    let (status, _) = send(&app, "DELETE", "/rules/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // And so does deleting a rule that never existed.
    let (status, _) = send(&app, "DELETE", "/rules/999", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // The rule really is gone.
    let (status, _) = send(&app, "PUT", "/rules/1", Some(percentage_rule("Doomed"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let (status, _) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
}
