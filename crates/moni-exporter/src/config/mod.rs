//! Exporter config loader (strict parsing).

pub mod schema;

use std::fs;

use moni_core::error::{MoniError, Result};

pub use schema::{
    ExporterConfig, ExporterSection, GridSection, HostSection, LogSection, MonitorSection, MAX_GRID_CELLS,
};

/// Used when no path is given on the command line.
pub const DEFAULT_PATH: &str = "moni-exporter.yaml";

pub fn load_from_file(path: &str) -> Result<ExporterConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| MoniError::Config(format!("read config {path} failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ExporterConfig> {
    let cfg: ExporterConfig = serde_yaml::from_str(s)
        .map_err(|e| MoniError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
