//! In-process canonical state store.
//!
//! Holds the single authoritative copy of every slice and provides
//! per-slice compare-and-swap on the `updatedAt` timestamp. Each slice has
//! its own lock, so writes to the same slice serialize while writes to
//! different slices proceed independently. The store is the only component
//! that ever mutates a slice.

use serde_json::Value;
use tokio::sync::RwLock;

use crate::models::{
    now_ms, BrbSlice, OverlaySlice, PopupSlice, PresetsSlice, ScenesSlice, SlateSlice, Snapshot,
    Stamped, TickerSlice,
};

/// Outcome of a conflict-checked write proposal. Both variants carry the
/// canonical value: the newly-applied one, or the current one the stale
/// caller must reconcile against.
#[derive(Debug, Clone)]
pub enum WriteOutcome<T> {
    Applied(T),
    Conflict(T),
}

pub struct StateStore {
    ticker: RwLock<TickerSlice>,
    overlay: RwLock<OverlaySlice>,
    popup: RwLock<PopupSlice>,
    slate: RwLock<SlateSlice>,
    brb: RwLock<BrbSlice>,
    presets: RwLock<PresetsSlice>,
    scenes: RwLock<ScenesSlice>,
}

impl StateStore {
    pub fn new(initial: Snapshot) -> Self {
        Self {
            ticker: RwLock::new(initial.ticker),
            overlay: RwLock::new(initial.overlay),
            popup: RwLock::new(initial.popup),
            slate: RwLock::new(initial.slate),
            brb: RwLock::new(initial.brb),
            presets: RwLock::new(initial.presets),
            scenes: RwLock::new(initial.scenes),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(Snapshot::default())
    }

    /// Full canonical snapshot. Never fails; uninitialised slices are their
    /// process defaults.
    pub async fn snapshot(&self) -> Snapshot {
        Snapshot {
            ticker: self.ticker.read().await.clone(),
            overlay: self.overlay.read().await.clone(),
            popup: self.popup.read().await.clone(),
            slate: self.slate.read().await.clone(),
            brb: self.brb.read().await.clone(),
            presets: self.presets.read().await.clone(),
            scenes: self.scenes.read().await.clone(),
        }
    }

    pub async fn ticker(&self) -> TickerSlice {
        self.ticker.read().await.clone()
    }

    pub async fn overlay(&self) -> OverlaySlice {
        self.overlay.read().await.clone()
    }

    pub async fn popup(&self) -> PopupSlice {
        self.popup.read().await.clone()
    }

    pub async fn slate(&self) -> SlateSlice {
        self.slate.read().await.clone()
    }

    pub async fn brb(&self) -> BrbSlice {
        self.brb.read().await.clone()
    }

    pub async fn presets(&self) -> PresetsSlice {
        self.presets.read().await.clone()
    }

    pub async fn scenes(&self) -> ScenesSlice {
        self.scenes.read().await.clone()
    }

    pub async fn propose_ticker(
        &self,
        raw: &Value,
        client_ts: Option<i64>,
    ) -> WriteOutcome<TickerSlice> {
        propose(&self.ticker, raw, client_ts, TickerSlice::sanitize).await
    }

    pub async fn propose_overlay(
        &self,
        raw: &Value,
        client_ts: Option<i64>,
    ) -> WriteOutcome<OverlaySlice> {
        propose(&self.overlay, raw, client_ts, OverlaySlice::sanitize).await
    }

    pub async fn propose_popup(
        &self,
        raw: &Value,
        client_ts: Option<i64>,
    ) -> WriteOutcome<PopupSlice> {
        propose(&self.popup, raw, client_ts, PopupSlice::sanitize).await
    }

    pub async fn propose_slate(
        &self,
        raw: &Value,
        client_ts: Option<i64>,
    ) -> WriteOutcome<SlateSlice> {
        propose(&self.slate, raw, client_ts, SlateSlice::sanitize).await
    }

    pub async fn propose_brb(&self, raw: &Value, client_ts: Option<i64>) -> WriteOutcome<BrbSlice> {
        propose(&self.brb, raw, client_ts, BrbSlice::sanitize).await
    }

    pub async fn propose_presets(
        &self,
        raw: &Value,
        client_ts: Option<i64>,
    ) -> WriteOutcome<PresetsSlice> {
        propose(&self.presets, raw, client_ts, PresetsSlice::sanitize).await
    }

    /// Fallible: a structurally invalid scene rejects the whole proposal
    /// with the store untouched.
    pub async fn propose_scenes(
        &self,
        raw: &Value,
        client_ts: Option<i64>,
    ) -> Result<WriteOutcome<ScenesSlice>, String> {
        try_propose(&self.scenes, raw, client_ts, ScenesSlice::sanitize).await
    }

    /// Bulk import: replace every slice from a snapshot document, bypassing
    /// conflict checks. Each slice is re-sanitised against process defaults
    /// (full replace, so absent fields mean "default", not "keep current")
    /// and keeps the document's `updatedAt` when present, so a round-tripped
    /// export reproduces identical canonical values. Everything is validated
    /// before any lock is taken; a bad document leaves the store untouched.
    pub async fn replace_all(&self, raw: &Value) -> Result<Snapshot, String> {
        let base = Snapshot::default();
        let now = now_ms();
        let null = Value::Null;

        let mut ticker = TickerSlice::sanitize(slice_raw(raw, "ticker", &null), &base.ticker);
        let mut overlay = OverlaySlice::sanitize(slice_raw(raw, "overlay", &null), &base.overlay);
        let mut popup = PopupSlice::sanitize(slice_raw(raw, "popup", &null), &base.popup);
        let mut slate = SlateSlice::sanitize(slice_raw(raw, "slate", &null), &base.slate);
        let mut brb = BrbSlice::sanitize(slice_raw(raw, "brb", &null), &base.brb);
        let mut presets = PresetsSlice::sanitize(slice_raw(raw, "presets", &null), &base.presets);
        let mut scenes = ScenesSlice::sanitize(slice_raw(raw, "scenes", &null), &base.scenes)?;

        restamp(&mut ticker, raw.get("ticker"), now);
        restamp(&mut overlay, raw.get("overlay"), now);
        restamp(&mut popup, raw.get("popup"), now);
        restamp(&mut slate, raw.get("slate"), now);
        restamp(&mut brb, raw.get("brb"), now);
        restamp(&mut presets, raw.get("presets"), now);
        restamp(&mut scenes, raw.get("scenes"), now);

        let next = Snapshot {
            ticker,
            overlay,
            popup,
            slate,
            brb,
            presets,
            scenes,
        };

        self.install(next.clone()).await;
        Ok(next)
    }

    /// Rebuild every slice from process defaults, stamped as a fresh write.
    pub async fn reset(&self) -> Snapshot {
        let now = now_ms();
        let mut next = Snapshot::default();
        next.ticker.set_updated_at(now);
        next.overlay.set_updated_at(now);
        next.popup.set_updated_at(now);
        next.slate.set_updated_at(now);
        next.brb.set_updated_at(now);
        next.presets.set_updated_at(now);
        next.scenes.set_updated_at(now);

        self.install(next.clone()).await;
        next
    }

    /// Swap in a whole snapshot. Lock order matches field order everywhere.
    async fn install(&self, next: Snapshot) {
        *self.ticker.write().await = next.ticker;
        *self.overlay.write().await = next.overlay;
        *self.popup.write().await = next.popup;
        *self.slate.write().await = next.slate;
        *self.brb.write().await = next.brb;
        *self.presets.write().await = next.presets;
        *self.scenes.write().await = next.scenes;
    }
}

fn slice_raw<'a>(raw: &'a Value, key: &str, null: &'a Value) -> &'a Value {
    raw.get(key).unwrap_or(null)
}

fn restamp<T: Stamped>(slice: &mut T, raw: Option<&Value>, now: i64) {
    // Zero is the never-written stamp and round-trips as-is.
    let ts = raw
        .and_then(|r| r.get("updatedAt"))
        .and_then(Value::as_i64)
        .filter(|t| *t >= 0);
    slice.set_updated_at(ts.unwrap_or(now));
}

/// Compare-and-swap under the slice's write lock. A proposal applies when
/// the client's last-known timestamp is absent or equals the current one;
/// otherwise the current value comes back untouched. Applied values are
/// stamped `max(now, prev + 1)` so the timestamp strictly advances even
/// under a coarse clock.
async fn propose<T, F>(
    lock: &RwLock<T>,
    raw: &Value,
    client_ts: Option<i64>,
    sanitize: F,
) -> WriteOutcome<T>
where
    T: Clone + Stamped,
    F: FnOnce(&Value, &T) -> T,
{
    let mut guard = lock.write().await;
    if let Some(ts) = client_ts {
        if ts != guard.updated_at() {
            return WriteOutcome::Conflict(guard.clone());
        }
    }
    let mut next = sanitize(raw, &guard);
    next.set_updated_at(now_ms().max(guard.updated_at() + 1));
    *guard = next.clone();
    WriteOutcome::Applied(next)
}

/// [`propose`] for slices whose sanitiser can reject structurally.
async fn try_propose<T, F>(
    lock: &RwLock<T>,
    raw: &Value,
    client_ts: Option<i64>,
    sanitize: F,
) -> Result<WriteOutcome<T>, String>
where
    T: Clone + Stamped,
    F: FnOnce(&Value, &T) -> Result<T, String>,
{
    let mut guard = lock.write().await;
    if let Some(ts) = client_ts {
        if ts != guard.updated_at() {
            return Ok(WriteOutcome::Conflict(guard.clone()));
        }
    }
    let mut next = sanitize(raw, &guard)?;
    next.set_updated_at(now_ms().max(guard.updated_at() + 1));
    *guard = next.clone();
    Ok(WriteOutcome::Applied(next))
}
