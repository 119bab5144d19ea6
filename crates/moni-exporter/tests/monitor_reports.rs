#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::time::Duration;

use moni_core::{walk, AttrKind, MemoryGrid};
use moni_exporter::monitor::{apply_output, parse_report_line, until_next_tick, Report};

#[test]
fn parses_report_lines() {
    assert_eq!(parse_report_line("12 5"), Some(Ok(Report::Add { id: 12, value: 5 })));
    assert_eq!(parse_report_line("counter 12 5"), Some(Ok(Report::Add { id: 12, value: 5 })));
    assert_eq!(parse_report_line("  gauge 3 40 "), Some(Ok(Report::Set { id: 3, value: 40 })));
    assert_eq!(parse_report_line(""), None);
    assert_eq!(parse_report_line("# cpu"), None);
    assert!(matches!(parse_report_line("gauge x 1"), Some(Err(_))));
    assert!(matches!(parse_report_line("histogram 1 2"), Some(Err(_))));
    assert!(matches!(parse_report_line("1 2 3 4"), Some(Err(_))));
}

#[test]
fn applies_script_output_to_grid() {
    let grid = MemoryGrid::new(4, 4);
    let stdout = "# host monitor\n101 3\n101 4\ngauge 102 55\nbogus\n-1 5\n";
    assert_eq!(apply_output(&grid, stdout), 3);

    let mut attrs = walk(&grid).unwrap();
    attrs.sort_by_key(|a| a.id);
    assert_eq!((attrs[0].id, attrs[0].kind, attrs[0].value), (101, AttrKind::Counter, 7));
    assert_eq!((attrs[1].id, attrs[1].kind, attrs[1].value), (102, AttrKind::Gauge, 55));
}

#[test]
fn ticks_align_to_interval() {
    let minute = Duration::from_secs(60);
    assert_eq!(until_next_tick(1_699_999_980_000, minute), minute);
    assert_eq!(until_next_tick(1_700_000_000_000, minute), Duration::from_secs(40));
    assert_eq!(until_next_tick(59_999, minute), Duration::from_millis(1));
}
