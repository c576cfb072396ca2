//! Configuration-scope endpoints.

use axum::extract::{Query, State};
use axum::response::Json;
use serde::Deserialize;

use crate::models::ConfigScope;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ScopeQuery {
    pub website: Option<i32>,
    pub store: Option<i32>,
}

/// `GET /scopes` - every explicitly connected scope.
pub async fn active(State(state): State<AppState>) -> Json<Vec<ConfigScope>> {
    Json(state.scopes().active_scopes().await)
}

/// `GET /scopes/current` - the scope the given parameters resolve to.
///
/// The website parameter wins when both are present. Unknown ids resolve
/// to the empty scope rather than an error.
pub async fn current(
    State(state): State<AppState>,
    Query(query): Query<ScopeQuery>,
) -> Json<ConfigScope> {
    Json(state.scopes().current_scope(query.website, query.store).await)
}
