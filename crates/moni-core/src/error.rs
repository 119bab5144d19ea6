//! Shared error type across moni crates.

use thiserror::Error;

/// Shared result type.
pub type Result<T> = std::result::Result<T, MoniError>;

/// Unified error type used by core and exporter.
#[derive(Debug, Error)]
pub enum MoniError {
    /// Missing or invalid startup parameter. Fatal at boot.
    #[error("config: {0}")]
    Config(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    /// The attribute source could not be read during a refresh.
    #[error("enumeration failed: {0}")]
    Enumeration(String),
    #[error("invalid report: {0}")]
    InvalidReport(String),
    #[error("attribute grid full (row {row})")]
    GridFull { row: usize },
    #[error("internal: {0}")]
    Internal(String),
}

impl MoniError {
    /// Stable short code, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            MoniError::Config(_) => "CONFIG",
            MoniError::UnsupportedVersion => "UNSUPPORTED_VERSION",
            MoniError::Enumeration(_) => "ENUMERATION",
            MoniError::InvalidReport(_) => "INVALID_REPORT",
            MoniError::GridFull { .. } => "GRID_FULL",
            MoniError::Internal(_) => "INTERNAL",
        }
    }
}
