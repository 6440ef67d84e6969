//! Popup slice: a one-off announcement card with optional auto-hide and
//! countdown.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::sanitize;

pub const MAX_POPUP_TEXT_CHARS: usize = 500;
pub const DURATION_SECONDS_RANGE: (i64, i64) = (1, 3600);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopupSlice {
    pub text: String,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub countdown_target: Option<i64>,
    pub countdown_enabled: bool,
    pub updated_at: i64,
}

impl Default for PopupSlice {
    fn default() -> Self {
        Self {
            text: String::new(),
            active: false,
            duration_seconds: None,
            countdown_target: None,
            countdown_enabled: false,
            updated_at: 0,
        }
    }
}

impl PopupSlice {
    pub fn sanitize(raw: &Value, prev: &Self) -> Self {
        let text = match raw.get("text") {
            Some(v) => sanitize::text(v, MAX_POPUP_TEXT_CHARS),
            None => prev.text.clone(),
        };

        let requested_active = raw
            .get("active")
            .map(|v| sanitize::flag(v, prev.active))
            .unwrap_or(prev.active);

        // Explicit null clears the auto-hide; a bad value keeps the previous,
        // including a previous of "no auto-hide".
        let duration_seconds = match raw.get("durationSeconds") {
            Some(Value::Null) => None,
            Some(v) => {
                sanitize::opt_int_seconds(v, DURATION_SECONDS_RANGE.0, DURATION_SECONDS_RANGE.1)
                    .or(prev.duration_seconds)
            }
            None => prev.duration_seconds,
        };

        let countdown_target = match raw.get("countdownTarget") {
            Some(v) => sanitize::timestamp_ms(v, prev.countdown_target),
            None => prev.countdown_target,
        };
        let requested_countdown = raw
            .get("countdownEnabled")
            .map(|v| sanitize::flag(v, prev.countdown_enabled))
            .unwrap_or(prev.countdown_enabled);

        // Countdown fields travel together: no target means not enabled,
        // and disabling drops the target.
        let countdown_enabled = requested_countdown && countdown_target.is_some();
        let countdown_target = if countdown_enabled {
            countdown_target
        } else {
            None
        };

        Self {
            active: requested_active && !text.is_empty(),
            text,
            duration_seconds,
            countdown_target,
            countdown_enabled,
            updated_at: prev.updated_at,
        }
    }
}
