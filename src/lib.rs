pub mod api;
pub mod config;
pub mod discord;
pub mod error;
pub mod event;
pub mod logging;
pub mod notifier;
pub mod translate;

use axum::{Router, extract::DefaultBodyLimit, routing};
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use config::RelayConfig;
pub use error::{RelayError, Result};
pub use notifier::DiscordNotifier;

/// Read-only state shared by every request
pub struct AppState {
    pub config: RelayConfig,
    pub notifier: DiscordNotifier,
}

impl AppState {
    pub fn new(config: RelayConfig) -> Result<Self> {
        let notifier = DiscordNotifier::new(&config.discord_webhook_url, config.delivery_timeout)?;
        Ok(Self { config, notifier })
    }
}

pub type SharedState = Arc<AppState>;

/// Builds the HTTP router with request logging, panic recovery and CORS
pub fn app(state: SharedState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.config.max_body_bytes);

    Router::new()
        .route("/webhook/jenkins", routing::post(api::handle_jenkins_webhook))
        .route("/webhook/print", routing::post(api::print_request_body))
        .route("/health", routing::get(api::health))
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(api::handle_panic))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
