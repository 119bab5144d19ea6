//! moni exporter library entry.
//!
//! Wires config, host identity, the snapshot cache and the HTTP surface into
//! the exporter service. Consumed by the binary (`main.rs`) and by integration
//! tests.

pub mod app_state;
pub mod config;
pub mod host;
pub mod monitor;
pub mod ops;
pub mod router;
pub mod shutdown;
