#![cfg(test)]
use std::time::Duration;

use seekr_core::network::{NetworkProber, ServiceProber};

use crate::loopback::{closed_port, http_responder, open_port, tls_responder, LOCALHOST};

const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

#[tokio::test]
async fn http_probe_reads_status_and_headers() {
    let port = http_responder("Server: seekr-test/1.0\r\nContent-Type: text/plain\r\n").await;

    let info = NetworkProber
        .probe_http(LOCALHOST, port, PROBE_TIMEOUT)
        .await
        .unwrap();

    assert_eq!(info.status_code, 200);
    assert_eq!(info.server(), "seekr-test/1.0");
    assert_eq!(info.content_type(), "text/plain");
}

#[tokio::test]
async fn http_probe_reports_missing_headers_as_unknown() {
    let port = http_responder("").await;

    let info = NetworkProber
        .probe_http(LOCALHOST, port, PROBE_TIMEOUT)
        .await
        .unwrap();

    assert_eq!(info.server_header, None);
    assert_eq!(info.server(), "Unknown");
}

#[tokio::test]
async fn http_probe_of_closed_port_fails() {
    let port = closed_port().await;
    let result = NetworkProber.probe_http(LOCALHOST, port, PROBE_TIMEOUT).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn tls_probe_reads_self_signed_certificate() {
    let port = tls_responder("nas.seekr.test", vec![0x5e, 0xed]).await;

    let info = NetworkProber
        .probe_tls(LOCALHOST, port, PROBE_TIMEOUT)
        .await
        .unwrap();

    assert_eq!(info.subject_common_name(), Some("nas.seekr.test"));
    assert_eq!(info.issuer_common_name(), Some("nas.seekr.test"));
    assert_eq!(
        info.subject.get("organizationName").map(String::as_str),
        Some("Seekr Test Lab")
    );
    assert_eq!(info.protocol_version, "TLSv1.3");
    assert_eq!(info.serial_number, "5EED");
}

#[tokio::test]
async fn tls_probe_of_plain_listener_times_out_or_fails() {
    // Accepts but never answers the ClientHello.
    let (listener, port) = open_port().await;
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });

    let result = NetworkProber
        .probe_tls(LOCALHOST, port, Duration::from_millis(300))
        .await;
    let err = result.unwrap_err();
    assert!(err.cause.contains("timed out"), "unexpected cause: {}", err.cause);
}
