//! Exposition text rendering.
//!
//! Output layout:
//! - host block: `monitor_0_value{host="..."} 1`, no timestamp
//! - one HELP/TYPE/sample block per attribute, in ascending id order, each
//!   sample stamped with the snapshot's window timestamp (millis)

use std::fmt::Write;

use crate::cache::Snapshot;

const HOST_METRIC: &str = "monitor_0_value";
const HELP_TEXT: &str = "n/a";

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

/// Render `snapshot` for the host identified by `host`.
pub fn render(snapshot: &Snapshot, host: &str) -> String {
    let host = escape_label(host);
    let mut out = String::with_capacity(64 * (snapshot.len() + 1) * 3);

    let _ = writeln!(out, "# HELP {HOST_METRIC} {HELP_TEXT}");
    let _ = writeln!(out, "# TYPE {HOST_METRIC} gauge");
    let _ = writeln!(out, "{HOST_METRIC}{{host=\"{host}\"}} 1");

    for attr in snapshot.iter() {
        let name = attr.metric_name();
        let _ = writeln!(out, "# HELP {name} {HELP_TEXT}");
        let _ = writeln!(out, "# TYPE {name} {}", attr.kind.type_name());
        let _ = writeln!(
            out,
            "{name}{{host=\"{host}\"}} {} {}",
            attr.value, snapshot.as_of_millis
        );
    }
    out
}
