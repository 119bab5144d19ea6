//! Operational HTTP endpoints.
//!
//! `/metrics` refreshes the snapshot cache when the current minute window has
//! moved on, then renders whatever the cache holds. Refresh failures, refreshes
//! outliving the request timeout, and waits behind another request's refresh
//! all fall back to the previous snapshot with a 200.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use moni_core::{render, window_floor, Refresh};

use crate::app_state::AppState;

const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn metrics(
    State(state): State<AppState>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
) -> Response {
    tracing::info!(%remote, "receive metrics request");

    let now = state.now_millis();
    let cache = state.cache();
    if window_floor(now) > cache.current_as_of() {
        refresh(&state, now, remote).await;
    }

    let body = render(&cache.view(), state.host());
    (StatusCode::OK, [(header::CONTENT_TYPE, CONTENT_TYPE)], body).into_response()
}

async fn refresh(state: &AppState, now: u64, remote: SocketAddr) {
    let cache = state.cache();
    let gate = state.refresh_gate();
    let job = async move {
        let permit = gate.lock_owned().await;
        // Enumeration is synchronous; keep it off the async workers. The permit
        // is held until the walk returns, even if this request gives up.
        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            cache.refresh_if_stale(now)
        })
        .await
    };

    match tokio::time::timeout(state.request_timeout(), job).await {
        Ok(Ok(Ok(Refresh::Refreshed { as_of_millis, attrs }))) => {
            tracing::debug!(as_of_millis, attrs, "cache refreshed for request");
        }
        Ok(Ok(Ok(Refresh::Fresh))) => {}
        Ok(Ok(Err(e))) => {
            tracing::warn!(error = %e, kind = e.kind(), "refresh failed, serving previous snapshot");
        }
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "refresh task aborted, serving previous snapshot");
        }
        Err(_) => {
            tracing::warn!(
                %remote,
                timeout_ms = state.request_timeout().as_millis() as u64,
                "refresh still running, serving previous snapshot"
            );
        }
    }
}