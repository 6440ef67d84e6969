//! Per-slice read and conflict-checked mutation endpoints.
//!
//! Every mutation takes a partial payload plus an optional `updatedAt`
//! carrying the client's last-known timestamp, delegates to the store's
//! compare-and-swap, and on conflict answers 409 with the authoritative
//! current value. Field-level validation lives entirely in the sanitisers;
//! nothing here inspects payload fields.

use axum::{extract::State, Json};
use serde_json::Value;

use super::{client_timestamp, commit, success, ApiResult};
use crate::errors::AppError;
use crate::models::SliceName;
use crate::store::WriteOutcome;
use crate::AppState;

/// GET /api/ticker - Current ticker slice.
pub async fn get_ticker(State(app): State<AppState>) -> ApiResult {
    success("ticker", &app.store.ticker().await)
}

/// PUT /api/ticker - Conflict-checked ticker mutation.
pub async fn update_ticker(State(app): State<AppState>, Json(body): Json<Value>) -> ApiResult {
    match app.store.propose_ticker(&body, client_timestamp(&body)).await {
        WriteOutcome::Applied(slice) => commit(&app, SliceName::Ticker, &slice).await,
        WriteOutcome::Conflict(current) => Err(AppError::conflict(SliceName::Ticker, &current)),
    }
}

/// GET /api/overlay - Current overlay slice.
pub async fn get_overlay(State(app): State<AppState>) -> ApiResult {
    success("overlay", &app.store.overlay().await)
}

/// PUT /api/overlay - Conflict-checked overlay mutation.
pub async fn update_overlay(State(app): State<AppState>, Json(body): Json<Value>) -> ApiResult {
    match app.store.propose_overlay(&body, client_timestamp(&body)).await {
        WriteOutcome::Applied(slice) => commit(&app, SliceName::Overlay, &slice).await,
        WriteOutcome::Conflict(current) => Err(AppError::conflict(SliceName::Overlay, &current)),
    }
}

/// GET /api/popup - Current popup slice.
pub async fn get_popup(State(app): State<AppState>) -> ApiResult {
    success("popup", &app.store.popup().await)
}

/// PUT /api/popup - Conflict-checked popup mutation.
pub async fn update_popup(State(app): State<AppState>, Json(body): Json<Value>) -> ApiResult {
    match app.store.propose_popup(&body, client_timestamp(&body)).await {
        WriteOutcome::Applied(slice) => commit(&app, SliceName::Popup, &slice).await,
        WriteOutcome::Conflict(current) => Err(AppError::conflict(SliceName::Popup, &current)),
    }
}

/// GET /api/slate - Current slate slice.
pub async fn get_slate(State(app): State<AppState>) -> ApiResult {
    success("slate", &app.store.slate().await)
}

/// PUT /api/slate - Conflict-checked slate mutation.
pub async fn update_slate(State(app): State<AppState>, Json(body): Json<Value>) -> ApiResult {
    match app.store.propose_slate(&body, client_timestamp(&body)).await {
        WriteOutcome::Applied(slice) => commit(&app, SliceName::Slate, &slice).await,
        WriteOutcome::Conflict(current) => Err(AppError::conflict(SliceName::Slate, &current)),
    }
}

/// GET /api/brb - Current BRB slice.
pub async fn get_brb(State(app): State<AppState>) -> ApiResult {
    success("brb", &app.store.brb().await)
}

/// PUT /api/brb - Conflict-checked BRB mutation.
pub async fn update_brb(State(app): State<AppState>, Json(body): Json<Value>) -> ApiResult {
    match app.store.propose_brb(&body, client_timestamp(&body)).await {
        WriteOutcome::Applied(slice) => commit(&app, SliceName::Brb, &slice).await,
        WriteOutcome::Conflict(current) => Err(AppError::conflict(SliceName::Brb, &current)),
    }
}

/// GET /api/presets - Current preset library.
pub async fn get_presets(State(app): State<AppState>) -> ApiResult {
    success("presets", &app.store.presets().await)
}

/// PUT /api/presets - Conflict-checked preset library replacement.
pub async fn update_presets(State(app): State<AppState>, Json(body): Json<Value>) -> ApiResult {
    match app.store.propose_presets(&body, client_timestamp(&body)).await {
        WriteOutcome::Applied(slice) => commit(&app, SliceName::Presets, &slice).await,
        WriteOutcome::Conflict(current) => Err(AppError::conflict(SliceName::Presets, &current)),
    }
}

/// GET /api/scenes - Current scene library.
pub async fn get_scenes(State(app): State<AppState>) -> ApiResult {
    success("scenes", &app.store.scenes().await)
}

/// PUT /api/scenes - Conflict-checked scene library replacement. The one
/// mutation that can fail structurally: an empty scene rejects the whole
/// request with a human-readable reason.
pub async fn update_scenes(State(app): State<AppState>, Json(body): Json<Value>) -> ApiResult {
    match app.store.propose_scenes(&body, client_timestamp(&body)).await {
        Ok(WriteOutcome::Applied(slice)) => commit(&app, SliceName::Scenes, &slice).await,
        Ok(WriteOutcome::Conflict(current)) => {
            Err(AppError::conflict(SliceName::Scenes, &current))
        }
        Err(reason) => Err(AppError::Validation(reason)),
    }
}
