//! Full-state snapshot: every slice in one document.
//!
//! This is the shape written to the state file, sent to subscribers on
//! connect, and wrapped by the export/import endpoints.

use serde::{Deserialize, Serialize};

use super::{
    BrbSlice, OverlaySlice, PopupSlice, PresetsSlice, ScenesSlice, SlateSlice, TickerSlice,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    pub ticker: TickerSlice,
    pub overlay: OverlaySlice,
    pub popup: PopupSlice,
    pub slate: SlateSlice,
    pub brb: BrbSlice,
    pub presets: PresetsSlice,
    pub scenes: ScenesSlice,
}

/// Export document: a snapshot plus provenance, accepted back verbatim by
/// the import endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub version: i32,
    pub exported_at: i64,
    pub state: Snapshot,
}

pub const EXPORT_VERSION: i32 = 1;

impl ExportDocument {
    pub fn new(state: Snapshot) -> Self {
        Self {
            version: EXPORT_VERSION,
            exported_at: super::now_ms(),
            state,
        }
    }
}
