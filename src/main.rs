//! CastDeck Backend
//!
//! Canonical state server for the CastDeck broadcast-overlay control panel:
//! conflict-checked mutation API for the dashboard, SSE fan-out to overlay
//! browser sources, debounced JSON-file persistence.

mod api;
mod auth;
mod broadcast;
mod config;
mod errors;
mod models;
mod persist;
mod sanitize;
mod store;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use broadcast::Broadcaster;
use config::Config;
use persist::Persister;
use store::StateStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<StateStore>,
    pub broadcaster: Broadcaster,
    pub persister: Arc<Persister>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting CastDeck Backend");
    tracing::info!("State file: {:?}", config.state_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Warn if PSK is not configured
    if config.api_psk.is_none() {
        tracing::warn!("No API PSK configured (CASTDECK_API_PSK). Authentication is disabled!");
    }

    // Load the last persisted snapshot, or start from defaults
    let initial = persist::load(&config.state_path).await.unwrap_or_default();
    let store = Arc::new(StateStore::new(initial));

    let broadcaster = Broadcaster::new();
    let persister = Arc::new(Persister::spawn(
        config.state_path.clone(),
        config.persist_debounce,
    ));

    // Create application state
    let state = AppState {
        store,
        broadcaster,
        persister,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Clone PSK for the auth layer
    let psk = state.config.api_psk.clone();

    // Dashboard API routes (PSK-guarded)
    let api_routes = Router::new()
        .route("/state", get(api::get_state))
        .route("/ticker", get(api::get_ticker).put(api::update_ticker))
        .route("/overlay", get(api::get_overlay).put(api::update_overlay))
        .route("/popup", get(api::get_popup).put(api::update_popup))
        .route("/slate", get(api::get_slate).put(api::update_slate))
        .route("/brb", get(api::get_brb).put(api::update_brb))
        .route("/presets", get(api::get_presets).put(api::update_presets))
        .route("/scenes", get(api::get_scenes).put(api::update_scenes))
        .route("/export", get(api::export_state))
        .route("/import", post(api::import_state))
        .route("/reset", post(api::reset_state))
        .layer(middleware::from_fn(move |req, next| {
            auth::psk_auth_layer(psk.clone(), req, next)
        }));

    // Overlay subscription and health check: outside the auth boundary,
    // since browser sources cannot attach headers.
    let open_routes = Router::new()
        .route("/health", get(health_check))
        .route("/events", get(api::subscribe));

    Router::new()
        .nest("/api", api_routes)
        .merge(open_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;
