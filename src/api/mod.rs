//! HTTP API module.
//!
//! Contains all routes and handlers following the dashboard contract:
//! success responses are `{ "ok": true, "<slice>": <canonical value> }` so
//! the client can reconcile any server-side clamping it didn't anticipate.

mod events;
mod slices;
mod state;
mod transfer;

pub use events::*;
pub use slices::*;
pub use state::*;
pub use transfer::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::errors::AppError;
use crate::models::SliceName;
use crate::AppState;

/// Response type for all handlers; errors render through [`AppError`].
pub type ApiResult = Result<Response, AppError>;

/// Build a success envelope with the payload under `key`.
pub fn success<T: Serialize>(key: &str, value: &T) -> ApiResult {
    let mut body = serde_json::Map::new();
    body.insert("ok".to_string(), Value::Bool(true));
    body.insert(key.to_string(), serde_json::to_value(value)?);
    Ok((StatusCode::OK, Json(Value::Object(body))).into_response())
}

/// The client's last-known slice timestamp, if it sent one. Lossy JSON
/// serialisers emit large integers as floats; those still participate in
/// the conflict check rather than skipping it.
pub(crate) fn client_timestamp(body: &Value) -> Option<i64> {
    match body.get("updatedAt") {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        _ => None,
    }
}

/// Post-apply side effects shared by every mutation handler: broadcast the
/// new canonical value to subscribers, queue a debounced persistence pass,
/// and answer the caller. The caller's response is the authoritative ack;
/// the broadcast is for everyone else.
pub(crate) async fn commit<T: Serialize>(
    app: &AppState,
    slice: SliceName,
    value: &T,
) -> ApiResult {
    let canonical = serde_json::to_value(value)?;
    app.broadcaster.publish(slice, canonical.clone());
    app.persister.schedule(app.store.snapshot().await);

    let mut body = serde_json::Map::new();
    body.insert("ok".to_string(), Value::Bool(true));
    body.insert(slice.as_str().to_string(), canonical);
    Ok((StatusCode::OK, Json(Value::Object(body))).into_response())
}
