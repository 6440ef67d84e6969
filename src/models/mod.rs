//! State-slice models for the CastDeck overlay panel.
//!
//! These match the dashboard's wire shapes exactly (camelCase) for seamless
//! interoperability. Each slice carries its own `updatedAt` timestamp in
//! milliseconds since epoch; the store is the only writer of that field.

mod brb;
mod library;
mod overlay;
mod popup;
mod slate;
mod snapshot;
mod ticker;

pub use brb::*;
pub use library::*;
pub use overlay::*;
pub use popup::*;
pub use slate::*;
pub use snapshot::*;
pub use ticker::*;

/// Current wall-clock time in milliseconds since epoch, the unit every
/// `updatedAt` field uses.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// The independently-versioned portions of application state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceName {
    Ticker,
    Overlay,
    Popup,
    Slate,
    Brb,
    Presets,
    Scenes,
}

impl SliceName {
    pub fn as_str(&self) -> &'static str {
        match self {
            SliceName::Ticker => "ticker",
            SliceName::Overlay => "overlay",
            SliceName::Popup => "popup",
            SliceName::Slate => "slate",
            SliceName::Brb => "brb",
            SliceName::Presets => "presets",
            SliceName::Scenes => "scenes",
        }
    }
}

impl std::fmt::Display for SliceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Access to a slice's `updatedAt` stamp, used by the store's generic
/// compare-and-swap and by bulk import restamping.
pub trait Stamped {
    fn updated_at(&self) -> i64;
    fn set_updated_at(&mut self, ts: i64);
}

macro_rules! impl_stamped {
    ($($ty:ty),* $(,)?) => {
        $(impl Stamped for $ty {
            fn updated_at(&self) -> i64 {
                self.updated_at
            }
            fn set_updated_at(&mut self, ts: i64) {
                self.updated_at = ts;
            }
        })*
    };
}

impl_stamped!(
    TickerSlice,
    OverlaySlice,
    PopupSlice,
    SlateSlice,
    BrbSlice,
    PresetsSlice,
    ScenesSlice,
);
