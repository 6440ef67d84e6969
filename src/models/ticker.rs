//! Ticker slice: the rotating lower-third message queue.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::sanitize;

pub const MAX_MESSAGES: usize = 50;
pub const MAX_MESSAGE_CHARS: usize = 280;
pub const DISPLAY_SECONDS_RANGE: (i64, i64) = (2, 90);
pub const INTERVAL_SECONDS_RANGE: (i64, i64) = (0, 3600);

/// The ticker message queue and its playback pacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickerSlice {
    pub messages: Vec<String>,
    pub active: bool,
    pub display_seconds: i64,
    pub interval_seconds: i64,
    pub updated_at: i64,
}

impl Default for TickerSlice {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            active: false,
            display_seconds: 8,
            interval_seconds: 0,
            updated_at: 0,
        }
    }
}

impl TickerSlice {
    /// Build the canonical next value from a partial raw payload. Absent
    /// fields keep the previous value; present fields are coerced and
    /// clamped. A ticker with no messages can never be active.
    pub fn sanitize(raw: &Value, prev: &Self) -> Self {
        let messages = match raw.get("messages") {
            Some(v) => sanitize::string_list(v, MAX_MESSAGES, MAX_MESSAGE_CHARS),
            None => prev.messages.clone(),
        };

        let requested_active = raw
            .get("active")
            .map(|v| sanitize::flag(v, prev.active))
            .unwrap_or(prev.active);

        let display_seconds = raw
            .get("displaySeconds")
            .map(|v| {
                sanitize::int_seconds(
                    v,
                    DISPLAY_SECONDS_RANGE.0,
                    DISPLAY_SECONDS_RANGE.1,
                    prev.display_seconds,
                )
            })
            .unwrap_or(prev.display_seconds)
            .clamp(DISPLAY_SECONDS_RANGE.0, DISPLAY_SECONDS_RANGE.1);

        let interval_seconds = raw
            .get("intervalSeconds")
            .map(|v| {
                sanitize::int_seconds(
                    v,
                    INTERVAL_SECONDS_RANGE.0,
                    INTERVAL_SECONDS_RANGE.1,
                    prev.interval_seconds,
                )
            })
            .unwrap_or(prev.interval_seconds)
            .clamp(INTERVAL_SECONDS_RANGE.0, INTERVAL_SECONDS_RANGE.1);

        Self {
            active: requested_active && !messages.is_empty(),
            messages,
            display_seconds,
            interval_seconds,
            updated_at: prev.updated_at,
        }
    }
}
