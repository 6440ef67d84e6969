//! Preset and scene library slices.
//!
//! Presets are saved ticker message lists; scenes capture a whole look
//! (ticker + popup + overlay styling subset + slate) for one-click recall.
//! Both are list slices: the wire payload replaces the entire list.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::sanitize;

use super::ticker::{MAX_MESSAGES, MAX_MESSAGE_CHARS};
use super::{now_ms, OverlaySlice, SlateSlice};

pub const MAX_NAME_CHARS: usize = 80;
pub const MAX_PRESETS: usize = 100;
pub const MAX_SCENES: usize = 50;

/// A saved ticker message list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    pub id: String,
    pub name: String,
    pub messages: Vec<String>,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetsSlice {
    pub entries: Vec<Preset>,
    pub updated_at: i64,
}

impl PresetsSlice {
    /// Entries with no name or no messages are dropped silently; ids are
    /// generated when absent so the dashboard can submit unsaved drafts.
    pub fn sanitize(raw: &Value, prev: &Self) -> Self {
        let entries = match raw.get("entries") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(sanitize_preset)
                .take(MAX_PRESETS)
                .collect(),
            Some(_) => Vec::new(),
            None => prev.entries.clone(),
        };

        Self {
            entries,
            updated_at: prev.updated_at,
        }
    }
}

fn sanitize_preset(raw: &Value) -> Option<Preset> {
    let name = sanitize::text(raw.get("name").unwrap_or(&Value::Null), MAX_NAME_CHARS);
    if name.is_empty() {
        return None;
    }
    let messages = sanitize::string_list(
        raw.get("messages").unwrap_or(&Value::Null),
        MAX_MESSAGES,
        MAX_MESSAGE_CHARS,
    );
    if messages.is_empty() {
        return None;
    }

    Some(Preset {
        id: entry_id(raw),
        name,
        messages,
        updated_at: entry_updated_at(raw),
    })
}

/// The overlay styling subset a scene captures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneLook {
    pub label: String,
    pub accent_color: String,
    pub accent_color2: String,
    pub theme: String,
}

/// The slate subset a scene captures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneSlate {
    pub enabled: bool,
    pub next_text: String,
    pub sponsor_text: String,
    pub notes: Vec<String>,
}

/// A saved scene: everything needed to restore one on-air look.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneEntry {
    pub id: String,
    pub name: String,
    pub messages: Vec<String>,
    pub popup_text: String,
    pub overlay: SceneLook,
    pub slate: SceneSlate,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenesSlice {
    pub entries: Vec<SceneEntry>,
    pub updated_at: i64,
}

impl ScenesSlice {
    /// Unlike presets, a structurally empty scene is a hard rejection: the
    /// whole request fails and nothing is stored.
    pub fn sanitize(raw: &Value, prev: &Self) -> Result<Self, String> {
        let entries = match raw.get("entries") {
            Some(Value::Array(items)) => items
                .iter()
                .take(MAX_SCENES)
                .map(sanitize_scene)
                .collect::<Result<Vec<_>, String>>()?,
            Some(_) => Vec::new(),
            None => prev.entries.clone(),
        };

        Ok(Self {
            entries,
            updated_at: prev.updated_at,
        })
    }
}

fn sanitize_scene(raw: &Value) -> Result<SceneEntry, String> {
    let name = sanitize::text(raw.get("name").unwrap_or(&Value::Null), MAX_NAME_CHARS);
    if name.is_empty() {
        return Err("Scene requires a name".to_string());
    }

    let messages = sanitize::string_list(
        raw.get("messages").unwrap_or(&Value::Null),
        MAX_MESSAGES,
        MAX_MESSAGE_CHARS,
    );
    let popup_text = sanitize::text(
        raw.get("popupText").unwrap_or(&Value::Null),
        super::popup::MAX_POPUP_TEXT_CHARS,
    );
    if messages.is_empty() && popup_text.is_empty() {
        return Err(format!(
            "Scene '{}' has neither ticker messages nor popup text",
            name
        ));
    }

    let overlay_defaults = OverlaySlice::default();
    let overlay_raw = raw.get("overlay").cloned().unwrap_or(Value::Null);
    let overlay_sanitised = OverlaySlice::sanitize(&overlay_raw, &overlay_defaults);
    let overlay = SceneLook {
        label: overlay_sanitised.label,
        accent_color: overlay_sanitised.accent_color,
        accent_color2: overlay_sanitised.accent_color2,
        theme: overlay_sanitised.theme,
    };

    let slate_defaults = SlateSlice::default();
    let slate_raw = raw.get("slate").cloned().unwrap_or(Value::Null);
    let slate_sanitised = SlateSlice::sanitize(&slate_raw, &slate_defaults);
    let slate = SceneSlate {
        enabled: slate_sanitised.enabled,
        next_text: slate_sanitised.next_text,
        sponsor_text: slate_sanitised.sponsor_text,
        notes: slate_sanitised.notes,
    };

    Ok(SceneEntry {
        id: entry_id(raw),
        name,
        messages,
        popup_text,
        overlay,
        slate,
        updated_at: entry_updated_at(raw),
    })
}

fn entry_id(raw: &Value) -> String {
    match raw.get("id").and_then(Value::as_str) {
        Some(id) if !id.trim().is_empty() => id.trim().to_string(),
        _ => uuid::Uuid::new_v4().to_string(),
    }
}

fn entry_updated_at(raw: &Value) -> i64 {
    raw.get("updatedAt")
        .and_then(Value::as_i64)
        .filter(|ts| *ts > 0)
        .unwrap_or_else(now_ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_presets_drop_nameless_and_empty_entries() {
        let prev = PresetsSlice::default();
        let out = PresetsSlice::sanitize(
            &json!({"entries": [
                {"name": "Intro", "messages": ["welcome"]},
                {"name": "", "messages": ["orphan"]},
                {"name": "Empty", "messages": []},
            ]}),
            &prev,
        );
        assert_eq!(out.entries.len(), 1);
        assert_eq!(out.entries[0].name, "Intro");
        assert!(!out.entries[0].id.is_empty());
    }

    #[test]
    fn test_preset_keeps_supplied_id_and_timestamp() {
        let prev = PresetsSlice::default();
        let out = PresetsSlice::sanitize(
            &json!({"entries": [
                {"id": "p-1", "name": "Intro", "messages": ["hi"], "updatedAt": 1234}
            ]}),
            &prev,
        );
        assert_eq!(out.entries[0].id, "p-1");
        assert_eq!(out.entries[0].updated_at, 1234);
    }

    #[test]
    fn test_presets_sanitize_idempotent() {
        let prev = PresetsSlice::default();
        let once = PresetsSlice::sanitize(
            &json!({"entries": [{"name": " Show open ", "messages": [" a ", ""]}]}),
            &prev,
        );
        let raw = serde_json::to_value(&once).unwrap();
        assert_eq!(PresetsSlice::sanitize(&raw, &once), once);
    }

    #[test]
    fn test_empty_scene_rejected() {
        let prev = ScenesSlice::default();
        let err = ScenesSlice::sanitize(
            &json!({"entries": [{"name": "Blank", "messages": [], "popupText": ""}]}),
            &prev,
        )
        .unwrap_err();
        assert!(err.contains("Blank"));

        let err = ScenesSlice::sanitize(&json!({"entries": [{"messages": ["x"]}]}), &prev)
            .unwrap_err();
        assert!(err.contains("name"));
    }

    #[test]
    fn test_scene_with_popup_text_only_is_valid() {
        let prev = ScenesSlice::default();
        let out = ScenesSlice::sanitize(
            &json!({"entries": [{"name": "Countdown", "popupText": "Starting soon"}]}),
            &prev,
        )
        .unwrap();
        assert_eq!(out.entries.len(), 1);
        assert!(out.entries[0].messages.is_empty());
    }

    #[test]
    fn test_scenes_sanitize_idempotent() {
        let prev = ScenesSlice::default();
        let once = ScenesSlice::sanitize(
            &json!({"entries": [{
                "name": "Main",
                "messages": ["  live now  "],
                "popupText": "",
                "overlay": {"label": "Main look", "accentColor": "#0f0", "theme": "OCEAN"},
                "slate": {"enabled": true, "nextText": "Q&A"}
            }]}),
            &prev,
        )
        .unwrap();
        let raw = serde_json::to_value(&once).unwrap();
        assert_eq!(ScenesSlice::sanitize(&raw, &once).unwrap(), once);
        assert_eq!(once.entries[0].overlay.theme, "ocean");
    }
}
