//! SSE subscription endpoint for overlays and dashboards.
//!
//! On connect the subscriber gets one `snapshot` event with every slice;
//! thereafter one event per applied mutation, named after the slice and
//! carrying the new canonical value. A lagged receiver skips missed events
//! and keeps going, which is safe because every event is a full slice value.

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{self, Stream, StreamExt};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;

use crate::models::Snapshot;
use crate::AppState;

/// GET /events - Subscribe to state changes.
pub async fn subscribe(
    State(app): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let snapshot = app.store.snapshot().await;
    let receiver = app.broadcaster.subscribe();
    tracing::debug!(
        subscribers = app.broadcaster.subscriber_count(),
        "subscriber connected"
    );

    let hello = stream::iter([Ok::<Event, Infallible>(snapshot_event(&snapshot))]);
    let updates = BroadcastStream::new(receiver).filter_map(|received| async move {
        match received {
            Ok(event) => Some(Ok(Event::default()
                .event(event.slice.as_str())
                .data(event.value.to_string()))),
            Err(BroadcastStreamRecvError::Lagged(missed)) => {
                tracing::warn!(missed, "subscriber lagged, skipping missed events");
                None
            }
        }
    });

    Sse::new(hello.chain(updates)).keep_alive(KeepAlive::default())
}

fn snapshot_event(snapshot: &Snapshot) -> Event {
    let data = serde_json::to_string(snapshot).unwrap_or_else(|_| "{}".to_string());
    Event::default().event("snapshot").data(data)
}
