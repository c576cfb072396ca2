//! Integration tests for the storelink connector.
//!
//! Tests drive the full axum router in process against the in-memory
//! platform, so they need no running server or database.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p storelink-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `connector_rules` - Price-rule create/update/delete
//! - `connector_discounts` - Coupon issuing
//! - `connector_scopes` - Configuration-scope resolution

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use storelink_connector::platform::memory::MemoryPlatform;
use storelink_connector::routes;
use storelink_connector::state::AppState;
use storelink_core::ScopeType;

/// Build the connector app on a seeded in-memory platform.
///
/// The fixture has two websites; website 1 is explicitly connected and has
/// stores 11 (inherits the website key) and 12 (its own key). Website 2 and
/// its store 21 are not connected. Catalog data covers categories 7 and 9
/// and two products with SKUs.
#[must_use]
pub fn app() -> Router {
    let platform = Arc::new(
        MemoryPlatform::builder()
            .website(1, "base", "Main Website", "https://shop.example.com/")
            .website(2, "outlet", "Outlet", "https://outlet.example.com/")
            .store(11, 1, "en", "English", "https://shop.example.com/en/")
            .store(12, 1, "de", "German", "https://shop.example.com/de/")
            .store(21, 2, "outlet_en", "Outlet English", "https://outlet.example.com/en/")
            .scope_settings(ScopeType::Website, 1, "key-main", true)
            .scope_settings(ScopeType::Store, 11, "key-main", true)
            .scope_settings(ScopeType::Store, 12, "key-german", true)
            .customer_group(0)
            .customer_group(1)
            .customer_group(3)
            .category(7)
            .category(9)
            .product(101, "SKU-A")
            .product(102, "SKU-B")
            .build(),
    );
    routes::router(AppState::new(platform))
}

/// Send one request through the router and decode the JSON response.
///
/// Empty bodies come back as `Value::Null`.
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            builder
                .body(Body::from(json.to_string()))
                .expect("build request")
        }
        None => builder.body(Body::empty()).expect("build request"),
    };

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router never fails");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

/// A minimal valid percentage-rule payload for website 1.
#[must_use]
pub fn percentage_rule(name: &str) -> Value {
    serde_json::json!({
        "name": name,
        "type": "percentage",
        "value": 10,
        "website_id": 1,
    })
}
