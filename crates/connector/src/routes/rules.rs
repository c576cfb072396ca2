//! Price-rule endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;

use storelink_core::RuleId;

use crate::error::ApiError;
use crate::models::{PriceRule, PriceRuleResponse};
use crate::state::AppState;

/// `POST /rules` - create a cart price rule from the marketing payload.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<PriceRuleResponse>, ApiError> {
    let rule: PriceRule = super::decode(body)?;
    let response = state.discounts().create_price_rule(&rule).await?;
    Ok(Json(response))
}

/// `PUT /rules/{id}` - update an existing cart price rule.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<PriceRuleResponse>, ApiError> {
    let rule: PriceRule = super::decode(body)?;
    let response = state
        .discounts()
        .update_price_rule(RuleId::new(id), &rule)
        .await?;
    Ok(Json(response))
}

/// `DELETE /rules/{id}` - delete a cart price rule.
///
/// Deleting a rule that does not exist is a success; the caller retries
/// deletions and only cares that the rule is gone.
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    state.discounts().delete_price_rule(RuleId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
