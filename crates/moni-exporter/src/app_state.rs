//! Shared application state for the exporter.
//!
//! Owns the snapshot cache and the host identity. Cloned into every handler;
//! the cache is the only mutable state and it publishes snapshots atomically.
//!
//! `refresh_gate` admits one refreshing request at a time. Other requests wait
//! on it asynchronously, so a hung source pins a single blocking thread.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::sync::Mutex;

use moni_core::{AttributeSource, SnapshotCache};

use crate::config::ExporterConfig;

/// Wall-clock source in milliseconds since the epoch.
pub type Clock = fn() -> u64;

pub fn system_clock() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    cache: Arc<SnapshotCache>,
    refresh_gate: Arc<Mutex<()>>,
}

struct AppStateInner {
    cfg: ExporterConfig,
    host: String,
    clock: Clock,
}

impl AppState {
    pub fn new(cfg: ExporterConfig, host: String, source: Arc<dyn AttributeSource>) -> Self {
        Self::with_clock(cfg, host, source, system_clock)
    }

    pub fn with_clock(
        cfg: ExporterConfig,
        host: String,
        source: Arc<dyn AttributeSource>,
        clock: Clock,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner { cfg, host, clock }),
            cache: Arc::new(SnapshotCache::new(source)),
            refresh_gate: Arc::new(Mutex::new(())),
        }
    }

    pub fn cfg(&self) -> &ExporterConfig {
        &self.inner.cfg
    }

    pub fn host(&self) -> &str {
        &self.inner.host
    }

    pub fn now_millis(&self) -> u64 {
        (self.inner.clock)()
    }

    pub fn request_timeout(&self) -> Duration {
        self.inner.cfg.exporter.request_timeout()
    }

    pub fn cache(&self) -> Arc<SnapshotCache> {
        Arc::clone(&self.cache)
    }

    pub fn refresh_gate(&self) -> Arc<Mutex<()>> {
        Arc::clone(&self.refresh_gate)
    }
}
