//! Top-level facade crate for moni.
//!
//! Re-exports the core pipeline and the exporter library so users can depend on a single crate.

pub mod core {
    pub use moni_core::*;
}

pub mod exporter {
    pub use moni_exporter::*;
}
