#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::net::IpAddr;

use moni_exporter::config::HostSection;
use moni_exporter::host;

fn prefixes() -> Vec<String> {
    HostSection::default().lan_prefixes
}

fn ips(list: &[&str]) -> Vec<IpAddr> {
    list.iter().map(|s| s.parse().unwrap()).collect()
}

#[test]
fn configured_ip_wins() {
    let cfg = HostSection {
        ip: Some("192.168.7.7".into()),
        lan_prefixes: vec![],
    };
    assert_eq!(host::resolve(&cfg).unwrap(), "192.168.7.7");
}

#[test]
fn picks_first_lan_ipv4() {
    let candidates = ips(&["127.0.0.1", "::1", "203.0.113.9", "10.2.3.4", "192.168.1.2"]);
    assert_eq!(host::pick_lan_ip(&candidates, &prefixes()).as_deref(), Some("10.2.3.4"));
}

#[test]
fn no_match_yields_none() {
    let candidates = ips(&["127.0.0.1", "fe80::1"]);
    assert_eq!(host::pick_lan_ip(&candidates, &prefixes()), None);
    assert_eq!(host::pick_lan_ip(&[], &prefixes()), None);
}

#[test]
fn prefix_is_textual() {
    let p = vec!["10.".to_string()];
    assert!(host::matches_lan_prefix("10.0.0.1", &p));
    assert!(!host::matches_lan_prefix("110.0.0.1", &p));
    assert!(!host::matches_lan_prefix("10.0.0.1", &[String::new()]));
}

#[test]
fn interface_lan_address_beats_public_route() {
    // Default route leaves through a public NIC; the LAN address sits on a second NIC.
    let interfaces = ips(&["127.0.0.1", "203.0.113.5", "10.9.8.7"]);
    let route = Some("203.0.113.5".parse().unwrap());
    let named = ips(&["198.51.100.2", "10.9.8.7"]);

    let candidates = host::merge_candidates(interfaces, route, named);
    assert_eq!(candidates, ips(&["127.0.0.1", "203.0.113.5", "10.9.8.7", "198.51.100.2"]));
    assert_eq!(host::pick_lan_ip(&candidates, &prefixes()).as_deref(), Some("10.9.8.7"));
}

#[test]
fn fallbacks_used_without_interfaces() {
    let candidates = host::merge_candidates(vec![], Some("192.168.0.9".parse().unwrap()), vec![]);
    assert_eq!(host::pick_lan_ip(&candidates, &prefixes()).as_deref(), Some("192.168.0.9"));
}

#[cfg(unix)]
#[test]
fn interfaces_include_loopback() {
    let addrs = host::interface_addrs().unwrap();
    assert!(addrs.iter().all(|ip| ip.is_ipv4()));
    assert!(addrs.contains(&"127.0.0.1".parse().unwrap()));
}
