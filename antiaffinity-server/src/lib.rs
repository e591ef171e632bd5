//! Anti-Affinity Server
//!
//! Provides:
//! - REST API for anti-rules, scores and leader locations
//! - Background check daemon feeding regions to the anti-rule checker
//! - Prometheus metrics and structured logging setup

pub mod daemon;
pub mod rules_api;
pub mod state;
pub mod telemetry;

pub use daemon::CheckDaemon;
pub use rules_api::{ApiError, LeaderLocationResponse, ScoresResponse, SetAntiRuleRequest};
pub use state::AppState;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

async fn health() -> &'static str {
    "OK"
}

async fn version() -> &'static str {
    concat!("antiaffinity-server/", env!("CARGO_PKG_VERSION"))
}

/// Build the HTTP router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
        .nest("/api/v1", rules_api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
