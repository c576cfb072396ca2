//! Coupon issuing endpoint.

use axum::extract::State;
use axum::response::Json;

use crate::error::ApiError;
use crate::models::Discount;
use crate::state::AppState;

/// `POST /discounts` - issue or fetch a coupon code for a price rule.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<Discount>, ApiError> {
    let discount: Discount = super::decode(body)?;
    let response = state.discounts().create_discount(&discount).await?;
    Ok(Json(response))
}
