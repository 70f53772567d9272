#![cfg(test)]
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use seekr_common::event::NullSink;
use seekr_common::network::target::{PortRange, ScanTarget};
use seekr_core::network::tcp::TcpConnector;
use seekr_core::scanner::PortScanner;

use crate::loopback::{closed_port, keep_accepting, open_port, LOCALHOST};

fn scanner(concurrency: usize) -> PortScanner {
    PortScanner::new(
        Arc::new(TcpConnector),
        Arc::new(NullSink),
        concurrency,
        Duration::from_millis(300),
    )
    .unwrap()
}

#[tokio::test]
async fn scan_single_open_port() {
    let (listener, port) = open_port().await;
    keep_accepting(listener);

    let target = ScanTarget::new(LOCALHOST, PortRange::single(port).unwrap());
    let report = scanner(4).scan(target).await.unwrap();

    assert_eq!(report.open_ports, BTreeSet::from([port]));
    assert!(!report.is_degraded());
}

#[tokio::test]
async fn scan_finds_every_listener_in_range() {
    let mut ports = BTreeSet::new();
    for _ in 0..3 {
        let (listener, port) = open_port().await;
        keep_accepting(listener);
        ports.insert(port);
    }

    let low = *ports.first().unwrap();
    let high = *ports.last().unwrap();
    let target = ScanTarget::new(LOCALHOST, PortRange::new(low, high).unwrap());
    let report = scanner(256).scan(target).await.unwrap();

    // Other services on this machine may sit in the same range.
    assert!(
        ports.is_subset(&report.open_ports),
        "expected {ports:?} within {:?}",
        report.open_ports
    );
    assert!(report.open_ports.iter().all(|p| (low..=high).contains(p)));
}

#[tokio::test]
async fn released_port_is_not_reported() {
    let port = closed_port().await;
    let target = ScanTarget::new(LOCALHOST, PortRange::single(port).unwrap());
    let report = scanner(1).scan(target).await.unwrap();
    assert!(report.open_ports.is_empty());
}

#[tokio::test]
async fn pool_size_does_not_change_the_result() {
    let (listener, port) = open_port().await;
    keep_accepting(listener);

    let low = port.saturating_sub(20).max(1);
    let high = port.saturating_add(20);
    let target = ScanTarget::new(LOCALHOST, PortRange::new(low, high).unwrap());

    let narrow = scanner(1).scan(target).await.unwrap();
    let wide = scanner(64).scan(target).await.unwrap();
    assert!(narrow.open_ports.contains(&port));
    assert_eq!(narrow.open_ports, wide.open_ports);
}
