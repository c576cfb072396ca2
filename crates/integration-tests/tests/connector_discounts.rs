//! Integration tests for coupon issuing.

use axum::http::StatusCode;
use serde_json::json;

use storelink_integration_tests::{app, percentage_rule, send};

/// Generated codes are 12 characters after the caller's prefix.
const GENERATED_CODE_LENGTH: usize = 12;

// ============================================================================
// Shared codes
// ============================================================================

#[tokio::test]
async fn test_shared_code_is_created_once() {
    let app = app();
    send(&app, "POST", "/rules", Some(percentage_rule("Welcome promo"))).await;

    let request = json!({"rule_id": 1, "code": "WELCOME10"});
    let (status, body) = send(&app, "POST", "/discounts", Some(request.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"rule_id": 1, "code": "WELCOME10"}));

    // Asking again for the same code returns the same primary coupon.
    let (status, body) = send(&app, "POST", "/discounts", Some(request)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"rule_id": 1, "code": "WELCOME10"}));
}

#[tokio::test]
async fn test_shared_code_update_replaces_primary() {
    let app = app();
    send(&app, "POST", "/rules", Some(percentage_rule("Welcome promo"))).await;
    send(
        &app,
        "POST",
        "/discounts",
        Some(json!({"rule_id": 1, "code": "WELCOME10"})),
    )
    .await;

    // A different code moves the single primary coupon to the new value.
    let (status, body) = send(
        &app,
        "POST",
        "/discounts",
        Some(json!({"rule_id": 1, "code": "WELCOME15"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"rule_id": 1, "code": "WELCOME15"}));

    // The old code is free again for another rule.
    send(&app, "POST", "/rules", Some(percentage_rule("Second promo"))).await;
    let (status, body) = send(
        &app,
        "POST",
        "/discounts",
        Some(json!({"rule_id": 2, "code": "WELCOME10"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"rule_id": 2, "code": "WELCOME10"}));
}

#[tokio::test]
async fn test_duplicate_code_across_rules_conflicts() {
    let app = app();
    send(&app, "POST", "/rules", Some(percentage_rule("First"))).await;
    send(&app, "POST", "/rules", Some(percentage_rule("Second"))).await;
    send(
        &app,
        "POST",
        "/discounts",
        Some(json!({"rule_id": 1, "code": "TAKEN"})),
    )
    .await;

    let (status, body) = send(
        &app,
        "POST",
        "/discounts",
        Some(json!({"rule_id": 2, "code": "TAKEN"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    let message = body["error"].as_str().expect("error body");
    assert!(message.contains("duplicate coupon code TAKEN"));
}

#[tokio::test]
async fn test_shared_code_cannot_be_empty() {
    let app = app();
    send(&app, "POST", "/rules", Some(percentage_rule("Promo"))).await;

    let (status, body) = send(
        &app,
        "POST",
        "/discounts",
        Some(json!({"rule_id": 1, "code": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["error"].as_str().expect("error body");
    assert!(message.contains("coupon code cannot be empty"));
}

// ============================================================================
// Generated codes
// ============================================================================

#[tokio::test]
async fn test_unique_rule_generates_prefixed_codes() {
    let app = app();
    let mut rule = percentage_rule("Unique codes");
    rule["is_unique"] = json!(true);
    send(&app, "POST", "/rules", Some(rule)).await;

    let request = json!({"rule_id": 1, "code": "SUMMER-"});
    let (status, first) = send(&app, "POST", "/discounts", Some(request.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["rule_id"], json!(1));
    let first_code = first["code"].as_str().expect("generated code");
    assert!(first_code.starts_with("SUMMER-"));
    assert_eq!(first_code.len(), "SUMMER-".len() + GENERATED_CODE_LENGTH);
    assert!(
        first_code["SUMMER-".len()..]
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
    );

    // Every redemption gets its own code.
    let (status, second) = send(&app, "POST", "/discounts", Some(request)).await;
    assert_eq!(status, StatusCode::OK);
    assert_ne!(second["code"], first["code"]);
}

// ============================================================================
// Failure modes
// ============================================================================

#[tokio::test]
async fn test_discount_for_unknown_rule_is_not_found() {
    let app = app();

    let (status, body) = send(
        &app,
        "POST",
        "/discounts",
        Some(json!({"rule_id": 7, "code": "NOPE"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_discount_requires_positive_rule_id() {
    let app = app();

    let (status, body) = send(
        &app,
        "POST",
        "/discounts",
        Some(json!({"rule_id": 0, "code": "X"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["error"].as_str().expect("error body");
    assert!(message.contains("rule_id must be positive"));
}
