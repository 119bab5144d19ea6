use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use serde::Deserialize;
use moni_core::error::{MoniError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterConfig {
    pub version: u32,

    #[serde(default)]
    pub exporter: ExporterSection,

    #[serde(default)]
    pub host: HostSection,

    #[serde(default)]
    pub grid: GridSection,

    #[serde(default)]
    pub monitor: MonitorSection,

    #[serde(default)]
    pub log: LogSection,
}

impl ExporterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(MoniError::UnsupportedVersion);
        }
        self.exporter.validate()?;
        self.host.validate()?;
        self.grid.validate()?;
        self.monitor.validate()?;
        if self.log.level.trim().is_empty() {
            return Err(MoniError::Config("log.level must not be empty".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Upper bound on one `/metrics` request, including a snapshot refresh.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for ExporterSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl ExporterSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        if !(100..=60_000).contains(&self.request_timeout_ms) {
            return Err(MoniError::Config(
                "exporter.request_timeout_ms must be between 100 and 60000".into(),
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen
            .parse()
            .map_err(|e| MoniError::Config(format!("exporter.listen {:?}: {e}", self.listen)))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn default_listen() -> String {
    "0.0.0.0:9108".into()
}
fn default_request_timeout_ms() -> u64 {
    10_000
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostSection {
    /// Fixed host identity. Skips LAN address discovery when set.
    #[serde(default)]
    pub ip: Option<String>,

    #[serde(default = "default_lan_prefixes")]
    pub lan_prefixes: Vec<String>,
}

impl Default for HostSection {
    fn default() -> Self {
        Self {
            ip: None,
            lan_prefixes: default_lan_prefixes(),
        }
    }
}

impl HostSection {
    pub fn validate(&self) -> Result<()> {
        if let Some(ip) = &self.ip {
            ip.parse::<IpAddr>()
                .map_err(|e| MoniError::Config(format!("host.ip {ip:?}: {e}")))?;
        } else if self.lan_prefixes.iter().all(|p| p.is_empty()) {
            return Err(MoniError::Config(
                "host.lan_prefixes must not be empty when host.ip is unset".into(),
            ));
        }
        Ok(())
    }
}

fn default_lan_prefixes() -> Vec<String> {
    ["9.", "10.", "100.", "172.", "192."].iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridSection {
    #[serde(default = "default_rows")]
    pub rows: usize,
    #[serde(default = "default_cols")]
    pub cols: usize,
}

impl Default for GridSection {
    fn default() -> Self {
        Self {
            rows: default_rows(),
            cols: default_cols(),
        }
    }
}

impl GridSection {
    pub fn validate(&self) -> Result<()> {
        match self.rows.checked_mul(self.cols) {
            Some(cells) if cells <= MAX_GRID_CELLS => Ok(()),
            _ => Err(MoniError::Config(format!(
                "grid.rows * grid.cols must be at most {MAX_GRID_CELLS}"
            ))),
        }
    }
}

/// Upper bound on `rows * cols`; every cell is allocated up front.
pub const MAX_GRID_CELLS: usize = 262_144;

fn default_rows() -> usize {
    64
}
fn default_cols() -> usize {
    16
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonitorSection {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    #[serde(default = "default_interpreter")]
    pub interpreter: String,

    #[serde(default = "default_script")]
    pub script: String,
}

impl Default for MonitorSection {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_secs: default_interval_secs(),
            interpreter: default_interpreter(),
            script: default_script(),
        }
    }
}

impl MonitorSection {
    pub fn validate(&self) -> Result<()> {
        if !(1..=3600).contains(&self.interval_secs) {
            return Err(MoniError::Config(
                "monitor.interval_secs must be between 1 and 3600".into(),
            ));
        }
        if self.enabled && (self.script.is_empty() || self.interpreter.is_empty()) {
            return Err(MoniError::Config(
                "monitor.script and monitor.interpreter are required when monitor is enabled".into(),
            ));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

fn default_interval_secs() -> u64 {
    60
}
fn default_interpreter() -> String {
    "python".into()
}
fn default_script() -> String {
    "../tools/svrmonitor.py".into()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogSection {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

fn default_log_level() -> String {
    "info".into()
}
