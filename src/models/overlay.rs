//! Overlay slice: styling and layout knobs for the browser-source overlay.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::sanitize;

pub const MAX_LABEL_CHARS: usize = 48;
pub const MAX_HIGHLIGHTS_CHARS: usize = 512;
pub const SCALE_RANGE: (f64, f64) = (0.75, 2.5);
pub const POPUP_SCALE_RANGE: (f64, f64) = (0.6, 1.5);

pub const POSITIONS: [&str; 2] = ["top", "bottom"];
pub const MODES: [&str; 3] = ["auto", "marquee", "chunk"];
pub const THEMES: [&str; 6] = ["midnight", "sunset", "ocean", "forest", "crimson", "mono"];

pub const DEFAULT_POSITION: &str = "bottom";
pub const DEFAULT_MODE: &str = "auto";
pub const DEFAULT_THEME: &str = "midnight";

/// Visual configuration shared by every overlay view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlaySlice {
    pub label: String,
    pub accent_color: String,
    pub accent_color2: String,
    pub highlights: String,
    pub scale: f64,
    pub popup_scale: f64,
    pub position: String,
    pub mode: String,
    pub theme: String,
    pub accent_anim: bool,
    pub sparkle: bool,
    pub updated_at: i64,
}

impl Default for OverlaySlice {
    fn default() -> Self {
        Self {
            label: String::new(),
            accent_color: String::new(),
            accent_color2: String::new(),
            highlights: String::new(),
            scale: 1.0,
            popup_scale: 1.0,
            position: DEFAULT_POSITION.to_string(),
            mode: DEFAULT_MODE.to_string(),
            theme: DEFAULT_THEME.to_string(),
            accent_anim: true,
            sparkle: false,
            updated_at: 0,
        }
    }
}

impl OverlaySlice {
    pub fn sanitize(raw: &Value, prev: &Self) -> Self {
        let label = match raw.get("label") {
            Some(v) => sanitize::text(v, MAX_LABEL_CHARS),
            None => prev.label.clone(),
        };
        let accent_color = match raw.get("accentColor") {
            Some(v) => sanitize::color(v),
            None => prev.accent_color.clone(),
        };
        let accent_color2 = match raw.get("accentColor2") {
            Some(v) => sanitize::color(v),
            None => prev.accent_color2.clone(),
        };
        let highlights = match raw.get("highlights") {
            Some(v) => sanitize::comma_list(v, MAX_HIGHLIGHTS_CHARS),
            None => prev.highlights.clone(),
        };
        let scale = raw
            .get("scale")
            .map(|v| sanitize::number(v, SCALE_RANGE.0, SCALE_RANGE.1, prev.scale))
            .unwrap_or(prev.scale)
            .clamp(SCALE_RANGE.0, SCALE_RANGE.1);
        let popup_scale = raw
            .get("popupScale")
            .map(|v| sanitize::number(v, POPUP_SCALE_RANGE.0, POPUP_SCALE_RANGE.1, prev.popup_scale))
            .unwrap_or(prev.popup_scale)
            .clamp(POPUP_SCALE_RANGE.0, POPUP_SCALE_RANGE.1);

        // Enums fall back to their fixed default on garbage, never to the
        // previous value. Absent keeps the previous value.
        let position = match raw.get("position") {
            Some(v) => sanitize::enum_or_default(v, &POSITIONS, DEFAULT_POSITION),
            None => prev.position.clone(),
        };
        let mode = match raw.get("mode") {
            Some(v) => sanitize::enum_or_default(v, &MODES, DEFAULT_MODE),
            None => prev.mode.clone(),
        };
        let theme = match raw.get("theme") {
            Some(v) => sanitize::enum_or_default(v, &THEMES, DEFAULT_THEME),
            None => prev.theme.clone(),
        };

        let accent_anim = raw
            .get("accentAnim")
            .map(|v| sanitize::flag(v, prev.accent_anim))
            .unwrap_or(prev.accent_anim);
        let sparkle = raw
            .get("sparkle")
            .map(|v| sanitize::flag(v, prev.sparkle))
            .unwrap_or(prev.sparkle);

        Self {
            label,
            accent_color,
            accent_color2,
            highlights,
            scale,
            popup_scale,
            position,
            mode,
            theme,
            accent_anim,
            sparkle,
            updated_at: prev.updated_at,
        }
    }
}
