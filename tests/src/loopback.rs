#![cfg(test)]
use std::net::Ipv4Addr;
use std::sync::Arc;

use pnet::datalink::NetworkInterface;
use seekr_common::error::ScanError;
use seekr_common::network::interface::NetworkContext;
use seekr_common::network::range;
use seekr_common::system::SystemRepository;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

pub const LOCALHOST: Ipv4Addr = Ipv4Addr::LOCALHOST;

/// Reports the loopback address as the local identity.
pub struct LoopbackSystem;

impl SystemRepository for LoopbackSystem {
    fn resolve_identity(&self, prefix: u8) -> Result<NetworkContext, ScanError> {
        Ok(NetworkContext {
            local_ip: LOCALHOST,
            interface_name: Some("lo".to_string()),
            cidr_range: range::subnet_for(LOCALHOST, prefix)?,
        })
    }

    fn interface_by_name(&self, _name: &str) -> Option<NetworkInterface> {
        None
    }
}

/// Binds a listener that accepts and immediately drops connections.
pub async fn open_port() -> (TcpListener, u16) {
    let listener = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

pub fn keep_accepting(listener: TcpListener) {
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            drop(stream);
        }
    });
}

/// A port that nothing listens on, found by binding and releasing it.
pub async fn closed_port() -> u16 {
    let (listener, port) = open_port().await;
    drop(listener);
    port
}

/// Answers every request with a fixed HTTP/1.1 response.
pub async fn http_responder(headers: &'static str) -> u16 {
    let (listener, port) = open_port().await;
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 2048];
                let _ = stream.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 200 OK\r\n{headers}Content-Length: 2\r\nConnection: close\r\n\r\nok"
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            });
        }
    });
    port
}

/// Serves TLS with a self-signed certificate for `common_name`.
pub async fn tls_responder(common_name: &str, serial: Vec<u8>) -> u16 {
    use rcgen::{CertificateParams, DistinguishedName, DnType, KeyPair, SerialNumber};
    use rustls::pki_types::{PrivateKeyDer, PrivatePkcs8KeyDer};
    use tokio_rustls::TlsAcceptor;

    let mut params = CertificateParams::new(vec![common_name.to_string()]).unwrap();
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, common_name);
    dn.push(DnType::OrganizationName, "Seekr Test Lab");
    params.distinguished_name = dn;
    params.serial_number = Some(SerialNumber::from(serial));

    let key = KeyPair::generate().unwrap();
    let cert = params.self_signed(&key).unwrap();
    let key_der = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key.serialize_der()));

    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let config = rustls::ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .unwrap()
        .with_no_client_auth()
        .with_single_cert(vec![cert.der().clone()], key_der)
        .unwrap();
    let acceptor = TlsAcceptor::from(Arc::new(config));

    let (listener, port) = open_port().await;
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let acceptor = acceptor.clone();
            tokio::spawn(async move {
                if let Ok(mut tls) = acceptor.accept(stream).await {
                    let mut buf = [0u8; 1];
                    let _ = tls.read(&mut buf).await;
                }
            });
        }
    });
    port
}
