//! Full-state read endpoint.

use axum::extract::State;

use super::{success, ApiResult};
use crate::AppState;

/// GET /api/state - Full canonical snapshot of every slice.
pub async fn get_state(State(app): State<AppState>) -> ApiResult {
    success("state", &app.store.snapshot().await)
}
