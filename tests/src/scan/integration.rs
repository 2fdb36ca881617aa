#![cfg(test)]
use std::net::{IpAddr, Ipv6Addr};
use std::str::FromStr;
use std::time::{Duration, Instant};

use portsweep_common::config::ScanConfig;
use portsweep_common::network::target::{self, Target};
use portsweep_common::ports::PortSet;
use portsweep_common::ScanError;
use portsweep_core::{perform_scan, ScanReport};

use crate::utils::{as_spec, closed_ports, Listeners, LOOPBACK};

fn quick_config() -> ScanConfig {
    ScanConfig {
        timeout_ms: 500,
        max_workers: 32,
    }
}

/// Open listeners on loopback must all be reported, and nothing else.
#[test]
fn scan_finds_exactly_the_listening_ports() {
    let listeners = Listeners::bind(LOOPBACK, 3).expect("loopback bind");
    let open = listeners.ports();
    let closed = closed_ports(5);

    let spec = format!("{},{}", as_spec(&open), as_spec(&closed));
    let ports = PortSet::from_str(&spec).unwrap();

    let report: ScanReport = perform_scan(&[LOOPBACK], &ports, &quick_config(), None).unwrap();

    let found: Vec<u16> = report.results.iter().map(|r| r.port).collect();
    assert_eq!(found, open);
    assert!(report.results.iter().all(|r| r.addr == LOOPBACK));
    assert_eq!(report.probed, ports.len());
    assert_eq!(report.dropped, 0);
}

#[test]
fn scan_of_closed_ports_is_empty_and_bounded_in_time() {
    let closed = closed_ports(8);
    let ports = PortSet::from_str(&as_spec(&closed)).unwrap();
    let cfg = ScanConfig {
        timeout_ms: 200,
        max_workers: 2,
    };

    let start = Instant::now();
    let report = perform_scan(&[LOOPBACK], &ports, &cfg, None).unwrap();

    assert!(report.is_empty());
    assert_eq!(report.probed, 8);
    // At worst one worker per round, each round bounded by the timeout.
    assert!(start.elapsed() < Duration::from_millis(8 * 200 + 1_000));
}

#[test]
fn repeated_scans_report_the_same_sequence() {
    let listeners = Listeners::bind(LOOPBACK, 4).expect("loopback bind");
    let ports = PortSet::from_str(&as_spec(&listeners.ports())).unwrap();

    let first = perform_scan(&[LOOPBACK], &ports, &quick_config(), None).unwrap();
    let second = perform_scan(&[LOOPBACK], &ports, &quick_config(), None).unwrap();

    assert_eq!(first.results, second.results);
}

#[test]
fn ipv6_results_follow_ipv4_results() {
    let v6_loopback = IpAddr::V6(Ipv6Addr::LOCALHOST);
    let Some(v6_listener) = Listeners::bind(v6_loopback, 1) else {
        eprintln!("Skipping IPv6 ordering test: no IPv6 loopback.");
        return;
    };
    let v4_listener = Listeners::bind(LOOPBACK, 1).expect("loopback bind");

    let spec = format!("{},{}", as_spec(&v6_listener.ports()), as_spec(&v4_listener.ports()));
    let ports = PortSet::from_str(&spec).unwrap();

    let report = perform_scan(&[v6_loopback, LOOPBACK], &ports, &quick_config(), None).unwrap();

    assert!(report.results.len() >= 2);
    assert_eq!(report.results[0].addr, LOOPBACK);
    assert_eq!(report.results.last().map(|r| r.addr), Some(v6_loopback));
}

#[test]
fn invalid_inputs_fail_before_scanning() {
    assert_eq!(
        PortSet::from_str("100-50"),
        Err(ScanError::InvalidPortRange { start: 100, end: 50 })
    );

    let ports = PortSet::from_str("80").unwrap();
    assert_eq!(
        perform_scan(&[], &ports, &quick_config(), None),
        Err(ScanError::NoAddresses)
    );
}

#[tokio::test]
async fn resolved_literals_feed_the_scanner() {
    let listeners = Listeners::bind(LOOPBACK, 1).expect("loopback bind");
    let ports = PortSet::from_str(&as_spec(&listeners.ports())).unwrap();

    let targets = vec![Target::from_str("127.0.0.1, 127.0.0.1").unwrap()];
    let addresses = target::to_addresses(&targets).await;
    assert_eq!(addresses, vec![LOOPBACK]);

    let report = tokio::task::spawn_blocking(move || {
        perform_scan(&addresses, &ports, &quick_config(), None)
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(report.results.len(), 1);
}
