//! Slate slice: the rotating "up next / sponsor / notes" card.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::sanitize;

pub const MAX_FIELD_CHARS: usize = 120;
pub const MAX_NOTES: usize = 6;
pub const MAX_NOTE_CHARS: usize = 200;
pub const ROTATION_SECONDS_RANGE: (i64, i64) = (4, 900);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlateSlice {
    pub enabled: bool,
    pub rotation_seconds: i64,
    pub show_clock: bool,
    pub clock_label: String,
    pub next_label: String,
    pub next_text: String,
    pub sponsor_label: String,
    pub sponsor_text: String,
    pub notes: Vec<String>,
    pub updated_at: i64,
}

impl Default for SlateSlice {
    fn default() -> Self {
        Self {
            enabled: false,
            rotation_seconds: 10,
            show_clock: true,
            clock_label: "Local time".to_string(),
            next_label: "Up next".to_string(),
            next_text: String::new(),
            sponsor_label: "Supported by".to_string(),
            sponsor_text: String::new(),
            notes: Vec::new(),
            updated_at: 0,
        }
    }
}

impl SlateSlice {
    pub fn sanitize(raw: &Value, prev: &Self) -> Self {
        let text_field = |key: &str, prev_value: &str| match raw.get(key) {
            Some(v) => sanitize::text(v, MAX_FIELD_CHARS),
            None => prev_value.to_string(),
        };

        let enabled = raw
            .get("enabled")
            .map(|v| sanitize::flag(v, prev.enabled))
            .unwrap_or(prev.enabled);
        let show_clock = raw
            .get("showClock")
            .map(|v| sanitize::flag(v, prev.show_clock))
            .unwrap_or(prev.show_clock);
        let rotation_seconds = raw
            .get("rotationSeconds")
            .map(|v| {
                sanitize::int_seconds(
                    v,
                    ROTATION_SECONDS_RANGE.0,
                    ROTATION_SECONDS_RANGE.1,
                    prev.rotation_seconds,
                )
            })
            .unwrap_or(prev.rotation_seconds)
            .clamp(ROTATION_SECONDS_RANGE.0, ROTATION_SECONDS_RANGE.1);
        let notes = match raw.get("notes") {
            Some(v) => sanitize::string_list(v, MAX_NOTES, MAX_NOTE_CHARS),
            None => prev.notes.clone(),
        };

        Self {
            enabled,
            rotation_seconds,
            show_clock,
            clock_label: text_field("clockLabel", &prev.clock_label),
            next_label: text_field("nextLabel", &prev.next_label),
            next_text: text_field("nextText", &prev.next_text),
            sponsor_label: text_field("sponsorLabel", &prev.sponsor_label),
            sponsor_text: text_field("sponsorText", &prev.sponsor_text),
            notes,
            updated_at: prev.updated_at,
        }
    }
}
