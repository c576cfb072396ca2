//! HTTP route handlers for the connector.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health          - Health check
//!
//! # Price rules
//! POST   /rules           - Create a price rule
//! PUT    /rules/{id}      - Update a price rule
//! DELETE /rules/{id}      - Delete a price rule (idempotent)
//!
//! # Coupons
//! POST   /discounts       - Issue a coupon for a rule
//!
//! # Configuration scopes (read-only)
//! GET    /scopes          - Scopes that are explicitly connected
//! GET    /scopes/current  - Scope for the current request parameters
//! ```

pub mod discounts;
pub mod rules;
pub mod scopes;

use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::state::AppState;

/// Assemble the connector router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/rules", post(rules::create))
        .route("/rules/{id}", put(rules::update).delete(rules::remove))
        .route("/discounts", post(discounts::create))
        .route("/scopes", get(scopes::active))
        .route("/scopes/current", get(scopes::current))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

/// Decode a JSON body into a DTO, reporting malformed payloads as
/// validation failures rather than generic 4xx rejections.
pub(crate) fn decode<T: serde::de::DeserializeOwned>(
    body: serde_json::Value,
) -> Result<T, ApiError> {
    serde_json::from_value(body).map_err(|e| ApiError::Validation(vec![e.to_string()]))
}
