//! Minute-windowed snapshot cache.
//!
//! The cache holds one immutable `Snapshot` behind an `Arc`. A refresh walks
//! the source, builds a complete new snapshot off to the side, and publishes it
//! with a single handle swap. Readers clone the handle and iterate without
//! holding any lock, so they observe either the old snapshot or the new one in
//! full.
//!
//! Refreshes are serialized and re-check staleness once they hold the refresh
//! lock: callers racing into a new window enumerate the source exactly once.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::attr::Attribute;
use crate::error::Result;
use crate::source::{walk, AttributeSource};

/// Length of one refresh window.
pub const WINDOW_MILLIS: u64 = 60_000;

/// Start of the window containing `now_millis`.
pub fn window_floor(now_millis: u64) -> u64 {
    now_millis - now_millis % WINDOW_MILLIS
}

/// All attributes as of one window. Iterates in ascending id order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub as_of_millis: u64,
    pub attrs: BTreeMap<u64, Attribute>,
}

impl Snapshot {
    pub fn new(as_of_millis: u64, attrs: impl IntoIterator<Item = Attribute>) -> Self {
        Self {
            as_of_millis,
            attrs: attrs.into_iter().map(|a| (a.id, a)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.attrs.values()
    }
}

/// Outcome of `SnapshotCache::refresh_if_stale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    /// The published snapshot already covers the window.
    Fresh,
    /// A new snapshot was published.
    Refreshed { as_of_millis: u64, attrs: usize },
}

pub struct SnapshotCache {
    source: Arc<dyn AttributeSource>,
    current: RwLock<Arc<Snapshot>>,
    refresh_lock: Mutex<()>,
    enumerations: AtomicU64,
}

impl SnapshotCache {
    /// Empty cache (`as_of = 0`); the first refresh always runs.
    pub fn new(source: Arc<dyn AttributeSource>) -> Self {
        Self {
            source,
            current: RwLock::new(Arc::new(Snapshot::default())),
            refresh_lock: Mutex::new(()),
            enumerations: AtomicU64::new(0),
        }
    }

    pub fn current_as_of(&self) -> u64 {
        self.view().as_of_millis
    }

    /// Handle to the published snapshot.
    pub fn view(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Number of source enumerations performed so far.
    pub fn enumerations(&self) -> u64 {
        self.enumerations.load(Ordering::Relaxed)
    }

    /// Re-enumerate the source if `now_millis` falls in a newer window than the
    /// published snapshot.
    ///
    /// On enumeration failure the published snapshot is left untouched and the
    /// error is returned; the next call retries.
    pub fn refresh_if_stale(&self, now_millis: u64) -> Result<Refresh> {
        let as_of = window_floor(now_millis);
        if as_of <= self.current_as_of() {
            return Ok(Refresh::Fresh);
        }

        let _guard = self.refresh_lock.lock().unwrap_or_else(PoisonError::into_inner);
        // Someone else may have refreshed while we waited.
        if as_of <= self.current_as_of() {
            return Ok(Refresh::Fresh);
        }

        self.enumerations.fetch_add(1, Ordering::Relaxed);
        let attrs = walk(self.source.as_ref())?;
        let next = Arc::new(Snapshot::new(as_of, attrs));
        let count = next.len();

        *self.current.write().unwrap_or_else(PoisonError::into_inner) = next;
        tracing::debug!(as_of_millis = as_of, attrs = count, "snapshot refreshed");

        Ok(Refresh::Refreshed { as_of_millis: as_of, attrs: count })
    }
}
