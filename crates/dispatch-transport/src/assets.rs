//! Worker bootstrap asset endpoints (§4.6, §6): `/packages`, `/`, and static
//! files, none of which are involved in dispatch itself.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::response::Redirect;

use crate::state::AppState;

/// `GET /packages` -- the configured package name list, informational only.
pub async fn packages(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.config.packages.clone())
}

/// `GET /` -- redirect to the bootstrap page, matching the distilled
/// source's `StaticFiles` + index redirect behavior.
pub async fn index_redirect() -> Redirect {
    Redirect::to("/index.html")
}
