//! Debounced JSON-file persistence.
//!
//! The store stays authoritative in memory; this module only mirrors it to
//! disk. Rapid successive writes coalesce: each scheduled snapshot replaces
//! the pending one and resets the quiet-period deadline, and a single
//! background task flushes once the deadline passes. Write failures are
//! logged and never surface to the mutation caller. Durability across a
//! crash inside the debounce window is explicitly not guaranteed.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::sync::mpsc;

use crate::models::Snapshot;

pub struct Persister {
    tx: mpsc::UnboundedSender<Snapshot>,
}

impl Persister {
    /// Spawn the background flush task. `debounce` is the quiet period a
    /// burst of writes must observe before the snapshot hits disk.
    pub fn spawn(path: PathBuf, debounce: Duration) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Snapshot>();

        tokio::spawn(async move {
            let mut pending: Option<Snapshot> = None;
            loop {
                tokio::select! {
                    received = rx.recv() => match received {
                        // Latest snapshot wins; the deadline restarts.
                        Some(snapshot) => pending = Some(snapshot),
                        None => {
                            if let Some(snapshot) = pending.take() {
                                flush(&path, &snapshot).await;
                            }
                            break;
                        }
                    },
                    _ = tokio::time::sleep(debounce), if pending.is_some() => {
                        if let Some(snapshot) = pending.take() {
                            flush(&path, &snapshot).await;
                        }
                    }
                }
            }
        });

        Self { tx }
    }

    /// Queue the snapshot for the next flush. Infallible from the caller's
    /// point of view; a closed channel only happens at shutdown.
    pub fn schedule(&self, snapshot: Snapshot) {
        let _ = self.tx.send(snapshot);
    }
}

async fn flush(path: &Path, snapshot: &Snapshot) {
    match write_snapshot(path, snapshot).await {
        Ok(()) => tracing::debug!(path = %path.display(), "state snapshot persisted"),
        Err(err) => {
            tracing::error!(path = %path.display(), error = %err, "failed to persist state snapshot");
        }
    }
}

/// Write the snapshot to a sibling temp file, then rename it into place so
/// readers never observe a half-written file.
async fn write_snapshot(path: &Path, snapshot: &Snapshot) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let body = serde_json::to_vec_pretty(snapshot)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, &body).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

/// Load the last snapshot at startup. Any problem (missing file, bad JSON)
/// logs and yields `None` so the process starts from defaults instead of
/// refusing to boot.
pub async fn load(path: &Path) -> Option<Snapshot> {
    let body = match tokio::fs::read(path).await {
        Ok(body) => body,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "no state file, starting from defaults");
            return None;
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "could not read state file");
            return None;
        }
    };

    match serde_json::from_slice(&body) {
        Ok(snapshot) => Some(snapshot),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "state file is not valid JSON, starting from defaults");
            None
        }
    }
}
