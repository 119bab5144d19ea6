//! moni core: attribute model, snapshot cache, and exposition rendering.
//!
//! This crate holds the metrics pipeline shared by the exporter binary and
//! tests. It carries no transport or async runtime dependencies; the HTTP
//! surface lives in `moni-exporter`.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Every fallible path
//! surfaces as `MoniError`/`Result` so a misbehaving attribute source cannot
//! take the exporter down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod attr;
pub mod cache;
pub mod error;
pub mod render;
pub mod source;

/// Shared result type.
pub use error::{MoniError, Result};

pub use attr::{AttrKind, Attribute, RawCell};
pub use cache::{window_floor, Refresh, Snapshot, SnapshotCache, WINDOW_MILLIS};
pub use render::render;
pub use source::{walk, AttributeSource, GridBounds, MemoryGrid};
