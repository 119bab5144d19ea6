//! Periodic host-monitor script runner.
//!
//! Runs `/usr/bin/env <interpreter> <script>` once per interval, aligned to
//! wall-clock boundaries. The script reports values on stdout, one per line:
//! - `<id> <value>` or `counter <id> <value>` adds to a counter
//! - `gauge <id> <value>` sets a gauge
//!
//! Reports land in the in-process attribute grid. The runner never touches the
//! snapshot cache and stops when the shutdown signal fires.

use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use tokio::process::Command;
use tokio::sync::watch;

use moni_core::MemoryGrid;

use crate::app_state::system_clock;
use crate::config::MonitorSection;

/// One parsed stdout line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    Add { id: i64, value: i64 },
    Set { id: i64, value: i64 },
}

impl Report {
    pub fn apply(self, grid: &MemoryGrid) -> moni_core::Result<()> {
        match self {
            Report::Add { id, value } => grid.add(id, value),
            Report::Set { id, value } => grid.set(id, value),
        }
    }
}

/// Parse a report line. Blank lines and `#` comments yield `None`.
pub fn parse_report_line(line: &str) -> Option<Result<Report, String>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let parts: Vec<&str> = line.split_whitespace().collect();
    let (gauge, id, value) = match parts.as_slice() {
        [id, value] => (false, *id, *value),
        ["counter", id, value] => (false, *id, *value),
        ["gauge", id, value] => (true, *id, *value),
        _ => return Some(Err(format!("unrecognized report line: {line}"))),
    };
    let parsed = id
        .parse::<i64>()
        .and_then(|id| value.parse::<i64>().map(|value| (id, value)));
    Some(match parsed {
        Ok((id, value)) if gauge => Ok(Report::Set { id, value }),
        Ok((id, value)) => Ok(Report::Add { id, value }),
        Err(e) => Err(format!("bad number in report line {line:?}: {e}")),
    })
}

/// Apply every report line of `stdout`; returns how many were applied.
pub fn apply_output(grid: &MemoryGrid, stdout: &str) -> usize {
    let mut applied = 0;
    for parsed in stdout.lines().filter_map(parse_report_line) {
        match parsed.and_then(|r| r.apply(grid).map_err(|e| e.to_string())) {
            Ok(()) => applied += 1,
            Err(e) => tracing::warn!(error = %e, "skip monitor report"),
        }
    }
    applied
}

/// Time left until the next multiple of `interval` since the epoch.
pub fn until_next_tick(now_millis: u64, interval: Duration) -> Duration {
    let step = (interval.as_millis() as u64).max(1);
    Duration::from_millis(step - now_millis % step)
}

pub async fn run(cfg: MonitorSection, grid: Arc<MemoryGrid>, mut shutdown: watch::Receiver<bool>) {
    tracing::info!(script = %cfg.script, interval_secs = cfg.interval_secs, "host monitor started");
    loop {
        let wait = until_next_tick(system_clock(), cfg.interval());
        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = shutdown.changed() => break,
        }
        if *shutdown.borrow() {
            break;
        }

        // A slow script must not delay the next tick.
        let cfg = cfg.clone();
        let grid = Arc::clone(&grid);
        tokio::spawn(async move { run_once(&cfg, &grid).await });
    }
    tracing::info!("host monitor stopped");
}

async fn run_once(cfg: &MonitorSection, grid: &MemoryGrid) {
    let child = Command::new("/usr/bin/env")
        .arg(&cfg.interpreter)
        .arg(&cfg.script)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .output();

    let output = match tokio::time::timeout(cfg.interval(), child).await {
        Ok(Ok(out)) => out,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, script = %cfg.script, "cmd exec failed");
            return;
        }
        Err(_) => {
            tracing::warn!(script = %cfg.script, "cmd exceeded interval, killed");
            return;
        }
    };
    if !output.status.success() {
        tracing::warn!(status = %output.status, script = %cfg.script, "cmd exited unsuccessfully");
    }
    let applied = apply_output(grid, &String::from_utf8_lossy(&output.stdout));
    tracing::debug!(applied, "monitor reports applied");
}
