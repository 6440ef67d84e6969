//! Integration tests for the CastDeck backend.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use reqwest::Client;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::broadcast::Broadcaster;
use crate::config::Config;
use crate::persist::Persister;
use crate::store::StateStore;
use crate::{create_router, AppState};

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    state_path: PathBuf,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        Self::with_psk(Some("test-api-key".to_string())).await
    }

    async fn with_psk(psk: Option<String>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let state_path = temp_dir.path().join("state.json");

        let config = Config {
            api_psk: psk.clone(),
            state_path: state_path.clone(),
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "warn".to_string(),
            persist_debounce: Duration::from_millis(50),
        };

        let state = AppState {
            store: Arc::new(StateStore::with_defaults()),
            broadcaster: Broadcaster::new(),
            persister: Arc::new(Persister::spawn(
                state_path.clone(),
                config.persist_debounce,
            )),
            config: Arc::new(config),
        };

        let app = create_router(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        // Spawn server
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(Duration::from_millis(100)).await;

        let mut client_builder = Client::builder();
        if let Some(key) = psk {
            let mut headers = reqwest::header::HeaderMap::new();
            headers.insert("x-api-key", key.parse().unwrap());
            client_builder = client_builder.default_headers(headers);
        }

        TestFixture {
            client: client_builder.build().unwrap(),
            base_url,
            state_path,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn put(&self, path: &str, body: Value) -> reqwest::Response {
        self.client
            .put(self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    async fn get_json(&self, path: &str) -> Value {
        self.client
            .get(self.url(path))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_auth_missing_psk() {
    let fixture = TestFixture::with_psk(Some("secret-key".to_string())).await;

    // Request without API key
    let client = Client::new();
    let resp = client
        .get(fixture.url("/api/state"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["ok"], false);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_auth_invalid_psk() {
    let fixture = TestFixture::with_psk(Some("correct-key".to_string())).await;

    let client = Client::new();
    let resp = client
        .get(fixture.url("/api/state"))
        .header("x-api-key", "wrong-key")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_auth_valid_psk_and_bearer() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/state"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // Bearer token works too
    let client = Client::new();
    let resp = client
        .get(fixture.url("/api/state"))
        .header("authorization", "Bearer test-api-key")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_state_defaults_on_first_read() {
    let fixture = TestFixture::new().await;

    let body = fixture.get_json("/api/state").await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["state"]["ticker"]["active"], false);
    assert_eq!(body["state"]["ticker"]["messages"], json!([]));
    assert_eq!(body["state"]["overlay"]["theme"], "midnight");
    assert_eq!(body["state"]["slate"]["rotationSeconds"], 10);

    let ticker = fixture.get_json("/api/ticker").await;
    assert_eq!(ticker["ok"], true);
    assert_eq!(ticker["ticker"]["updatedAt"], 0);
}

#[tokio::test]
async fn test_ticker_update_clamps_and_couples_active() {
    let fixture = TestFixture::new().await;

    // Out-of-range duration gets clamped, not rejected.
    let resp = fixture
        .put(
            "/api/ticker",
            json!({"messages": ["  hello  ", ""], "active": true, "displaySeconds": 999}),
        )
        .await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["ok"], true);
    assert_eq!(body["ticker"]["messages"], json!(["hello"]));
    assert_eq!(body["ticker"]["displaySeconds"], 90);
    assert_eq!(body["ticker"]["active"], true);
    assert!(body["ticker"]["updatedAt"].as_i64().unwrap() > 0);

    // Emptying the messages while leaving active alone drops the flag.
    let resp = fixture.put("/api/ticker", json!({"messages": []})).await;
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["ticker"]["active"], false);
}

#[tokio::test]
async fn test_stale_write_conflicts_with_current_value() {
    let fixture = TestFixture::new().await;

    // Client A's base version.
    let resp = fixture.put("/api/ticker", json!({"messages": ["v1"]})).await;
    let base: Value = resp.json().await.unwrap();
    let base_ts = base["ticker"]["updatedAt"].as_i64().unwrap();

    // Client B writes against the same base and wins.
    let resp = fixture
        .put(
            "/api/ticker",
            json!({"messages": ["v2"], "updatedAt": base_ts}),
        )
        .await;
    assert_eq!(resp.status(), 200);
    let b: Value = resp.json().await.unwrap();
    let b_ts = b["ticker"]["updatedAt"].as_i64().unwrap();
    assert!(b_ts > base_ts);

    // Client A's edit against the stale base conflicts; the 409 carries the
    // authoritative current value for reconciliation.
    let resp = fixture
        .put(
            "/api/ticker",
            json!({"messages": ["v1-edited"], "updatedAt": base_ts}),
        )
        .await;
    assert_eq!(resp.status(), 409);
    let conflict: Value = resp.json().await.unwrap();
    assert_eq!(conflict["ok"], false);
    assert_eq!(conflict["error"]["code"], "CONFLICT");
    assert_eq!(conflict["ticker"]["messages"], json!(["v2"]));
    assert_eq!(conflict["ticker"]["updatedAt"].as_i64().unwrap(), b_ts);

    // Store remains at B's write.
    let ticker = fixture.get_json("/api/ticker").await;
    assert_eq!(ticker["ticker"]["messages"], json!(["v2"]));
}

#[tokio::test]
async fn test_matching_timestamp_applies() {
    let fixture = TestFixture::new().await;

    let resp = fixture.put("/api/brb", json!({"text": "away"})).await;
    let body: Value = resp.json().await.unwrap();
    let ts = body["brb"]["updatedAt"].as_i64().unwrap();

    let resp = fixture
        .put("/api/brb", json!({"text": "back soon", "updatedAt": ts}))
        .await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["brb"]["text"], "back soon");
    assert!(body["brb"]["updatedAt"].as_i64().unwrap() > ts);
}

#[tokio::test]
async fn test_overlay_normalisation() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .put(
            "/api/overlay",
            json!({
                "theme": "vaporwave",
                "position": "TOP",
                "scale": 9.9,
                "accentColor": "javascript:alert(1)",
                "accentColor2": "#ff00aa",
                "highlights": "Alpha, Beta,, ,Gamma"
            }),
        )
        .await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let overlay = &body["overlay"];
    assert_eq!(overlay["theme"], "midnight"); // unknown enum -> fixed default
    assert_eq!(overlay["position"], "top"); // case-insensitive match
    assert_eq!(overlay["scale"], 2.5);
    assert_eq!(overlay["accentColor"], "");
    assert_eq!(overlay["accentColor2"], "#ff00aa");
    assert_eq!(overlay["highlights"], "Alpha, Beta, Gamma");
}

#[tokio::test]
async fn test_popup_countdown_coupling() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .put(
            "/api/popup",
            json!({"text": "Starting soon", "active": true, "countdownEnabled": true}),
        )
        .await;
    let body: Value = resp.json().await.unwrap();
    // Enabled without a target: both cleared.
    assert_eq!(body["popup"]["countdownEnabled"], false);
    assert!(body["popup"]["countdownTarget"].is_null());
    assert_eq!(body["popup"]["active"], true);
}

#[tokio::test]
async fn test_empty_scene_rejected() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .put(
            "/api/scenes",
            json!({"entries": [{"name": "Blank", "messages": [], "popupText": ""}]}),
        )
        .await;
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["ok"], false);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["message"].as_str().unwrap().contains("Blank"));

    // Nothing was stored.
    let scenes = fixture.get_json("/api/scenes").await;
    assert_eq!(scenes["scenes"]["entries"], json!([]));
}

#[tokio::test]
async fn test_presets_drop_invalid_entries() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .put(
            "/api/presets",
            json!({"entries": [
                {"name": "Intro", "messages": ["welcome"]},
                {"name": "", "messages": ["nameless"]},
                {"name": "No messages", "messages": []},
            ]}),
        )
        .await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let entries = body["presets"]["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["name"], "Intro");
    assert!(!entries[0]["id"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_body_rejected_before_store() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .put(fixture.url("/api/ticker"))
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // The store was never touched.
    let ticker = fixture.get_json("/api/ticker").await;
    assert_eq!(ticker["ticker"]["updatedAt"], 0);
}

#[tokio::test]
async fn test_export_import_round_trip() {
    let fixture = TestFixture::new().await;

    // Mutate every slice.
    fixture
        .put("/api/ticker", json!({"messages": ["a", "b"], "active": true}))
        .await;
    fixture
        .put("/api/overlay", json!({"label": "Show", "theme": "ocean"}))
        .await;
    fixture
        .put("/api/popup", json!({"text": "Hi", "active": true}))
        .await;
    fixture
        .put("/api/slate", json!({"enabled": true, "nextText": "Q&A"}))
        .await;
    fixture.put("/api/brb", json!({"text": "brb", "active": true})).await;
    fixture
        .put(
            "/api/presets",
            json!({"entries": [{"name": "P", "messages": ["m"]}]}),
        )
        .await;
    fixture
        .put(
            "/api/scenes",
            json!({"entries": [{"name": "S", "messages": ["m"]}]}),
        )
        .await;

    // Export, then mutate again.
    let export = fixture.get_json("/api/export").await;
    assert_eq!(export["version"], 1);

    fixture
        .put("/api/ticker", json!({"messages": ["changed"]}))
        .await;
    fixture.put("/api/brb", json!({"text": "changed"})).await;

    // Import the export; every slice must equal the exported canonical value.
    let resp = fixture
        .client
        .post(fixture.url("/api/import"))
        .json(&export)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let state = fixture.get_json("/api/state").await;
    assert_eq!(state["state"], export["state"]);
}

#[tokio::test]
async fn test_reset_restores_defaults() {
    let fixture = TestFixture::new().await;

    fixture
        .put("/api/ticker", json!({"messages": ["x"], "active": true}))
        .await;

    let resp = fixture
        .client
        .post(fixture.url("/api/reset"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["state"]["ticker"]["messages"], json!([]));
    assert_eq!(body["state"]["ticker"]["active"], false);
    assert!(body["state"]["ticker"]["updatedAt"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn test_applied_write_persists_to_state_file() {
    let fixture = TestFixture::new().await;

    fixture
        .put("/api/brb", json!({"text": "persisted", "active": true}))
        .await;

    // Wait out the debounce window.
    tokio::time::sleep(Duration::from_millis(300)).await;

    let body = tokio::fs::read(&fixture.state_path).await.unwrap();
    let snapshot: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(snapshot["brb"]["text"], "persisted");
    assert_eq!(snapshot["brb"]["active"], true);
}

#[tokio::test]
async fn test_events_snapshot_then_deltas() {
    let fixture = TestFixture::new().await;

    // Subscribe without auth headers: the events endpoint is open.
    let resp = Client::new()
        .get(fixture.url("/events"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let mut stream = resp.bytes_stream();

    // First event is the full snapshot.
    let first = tokio::time::timeout(Duration::from_secs(5), stream.next())
        .await
        .expect("snapshot event timed out")
        .unwrap()
        .unwrap();
    let first = String::from_utf8_lossy(&first).to_string();
    assert!(first.contains("event: snapshot"));
    assert!(first.contains("\"ticker\""));

    // An applied mutation arrives as a slice-named delta.
    fixture
        .put("/api/brb", json!({"text": "live update", "active": true}))
        .await;

    let mut collected = String::new();
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !collected.contains("event: brb") {
        let chunk = tokio::time::timeout_at(deadline, stream.next())
            .await
            .expect("brb event timed out")
            .unwrap()
            .unwrap();
        collected.push_str(&String::from_utf8_lossy(&chunk));
    }
    assert!(collected.contains("live update"));
}
