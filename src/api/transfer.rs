//! Bulk export/import and explicit reset.
//!
//! Import is a deliberate full-state replace: it bypasses per-slice
//! conflict checks, then persists and broadcasts every slice so connected
//! overlays repaint from the imported state.

use axum::{extract::State, Json};
use serde_json::Value;

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{ExportDocument, SliceName, Snapshot};
use crate::AppState;

/// GET /api/export - The full current snapshot as a single document.
pub async fn export_state(State(app): State<AppState>) -> Json<ExportDocument> {
    Json(ExportDocument::new(app.store.snapshot().await))
}

/// POST /api/import - Apply an exported document (or a bare snapshot
/// object), slice by slice.
pub async fn import_state(State(app): State<AppState>, Json(body): Json<Value>) -> ApiResult {
    // Accept the wrapped export document or its inner state object.
    let doc = match body.get("state") {
        Some(inner) if inner.is_object() => inner,
        _ => &body,
    };
    if !doc.is_object() {
        return Err(AppError::BadRequest(
            "Import payload must be a state object".to_string(),
        ));
    }

    let snapshot = app
        .store
        .replace_all(doc)
        .await
        .map_err(AppError::Validation)?;

    finish_bulk(&app, &snapshot).await?;
    success("state", &snapshot)
}

/// POST /api/reset - Rebuild every slice from process defaults.
pub async fn reset_state(State(app): State<AppState>) -> ApiResult {
    let snapshot = app.store.reset().await;
    tracing::info!("state reset to defaults");
    finish_bulk(&app, &snapshot).await?;
    success("state", &snapshot)
}

/// Persist and broadcast after a whole-snapshot change.
async fn finish_bulk(app: &AppState, snapshot: &Snapshot) -> Result<(), AppError> {
    app.persister.schedule(snapshot.clone());

    let pairs: [(SliceName, Value); 7] = [
        (SliceName::Ticker, serde_json::to_value(&snapshot.ticker)?),
        (SliceName::Overlay, serde_json::to_value(&snapshot.overlay)?),
        (SliceName::Popup, serde_json::to_value(&snapshot.popup)?),
        (SliceName::Slate, serde_json::to_value(&snapshot.slate)?),
        (SliceName::Brb, serde_json::to_value(&snapshot.brb)?),
        (SliceName::Presets, serde_json::to_value(&snapshot.presets)?),
        (SliceName::Scenes, serde_json::to_value(&snapshot.scenes)?),
    ];
    for (slice, value) in pairs {
        app.broadcaster.publish(slice, value);
    }
    Ok(())
}
