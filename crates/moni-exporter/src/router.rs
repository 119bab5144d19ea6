//! Axum router wiring.
//!
//! - `/metrics` : exposition text for the scraper
//! - `/healthz` : liveness

use axum::{routing::get, Router};

use crate::{app_state::AppState, ops};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/metrics", get(ops::metrics))
        .route("/healthz", get(ops::healthz))
        .with_state(state)
}
