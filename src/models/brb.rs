//! BRB slice: the full-screen "Be Right Back" takeover.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::sanitize;

pub const MAX_BRB_TEXT_CHARS: usize = 280;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrbSlice {
    pub text: String,
    pub active: bool,
    pub updated_at: i64,
}

impl BrbSlice {
    pub fn sanitize(raw: &Value, prev: &Self) -> Self {
        let text = match raw.get("text") {
            Some(v) => sanitize::text(v, MAX_BRB_TEXT_CHARS),
            None => prev.text.clone(),
        };
        let requested_active = raw
            .get("active")
            .map(|v| sanitize::flag(v, prev.active))
            .unwrap_or(prev.active);

        Self {
            active: requested_active && !text.is_empty(),
            text,
            updated_at: prev.updated_at,
        }
    }
}
