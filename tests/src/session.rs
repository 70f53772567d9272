#![cfg(test)]
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use seekr_common::config::Config;
use seekr_common::error::ScanError;
use seekr_common::event::NullSink;
use seekr_common::network::target::PortRange;
use seekr_core::coordinator::{ScanCoordinator, SessionState};
use seekr_core::network::channel::RawLink;
use seekr_core::network::tcp::TcpConnector;
use seekr_core::network::NetworkProber;

use crate::loopback::{http_responder, keep_accepting, open_port, LoopbackSystem, LOCALHOST};

fn loopback_session() -> ScanCoordinator {
    let config = Config {
        connect_timeout: Duration::from_millis(300),
        probe_timeout: Duration::from_secs(2),
        ..Config::default()
    };
    ScanCoordinator::with_components(
        config,
        Arc::new(NullSink),
        Arc::new(LoopbackSystem),
        Arc::new(RawLink),
        Arc::new(TcpConnector),
        Arc::new(NetworkProber),
    )
    .unwrap()
}

#[tokio::test]
async fn scanning_before_identify_is_rejected() {
    let mut session = loopback_session();
    let result = session.scan_host(LOCALHOST, None).await;
    assert!(matches!(result, Err(ScanError::InvalidState { .. })));
}

#[tokio::test]
async fn scan_then_analyze_loopback_host() {
    let mut session = loopback_session();
    let ctx = session.identify().unwrap();
    assert_eq!(ctx.local_ip, LOCALHOST);

    let web = http_responder("Server: seekr-test/1.0\r\n").await;
    let (listener, silent) = open_port().await;
    keep_accepting(listener);

    let low = web.min(silent);
    let high = web.max(silent);
    let report = session
        .scan_host(LOCALHOST, Some(PortRange::new(low, high).unwrap()))
        .await
        .unwrap();
    assert!(report.open_ports.contains(&web));
    assert!(report.open_ports.contains(&silent));
    assert_eq!(session.state(), SessionState::HostScanned(LOCALHOST));

    let ports = BTreeSet::from([web, silent]);
    let analyses = session.analyze_host(LOCALHOST, &ports).await.unwrap();
    assert_eq!(analyses.len(), 2);
    assert_eq!(session.state(), SessionState::HostAnalyzed(LOCALHOST));

    // Ephemeral ports carry no well-known service, so nothing is probed.
    for analysis in &analyses {
        assert!(analysis.tls.is_none() && analysis.http.is_none());
    }
}
