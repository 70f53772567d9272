//! One-shot TLS handshakes that read the server's leaf certificate.
//!
//! The certificate is read without chain validation: self-signed and
//! expired certificates are the common case on a LAN, and they are reported
//! rather than rejected.

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{CryptoProvider, ring, verify_tls12_signature, verify_tls13_signature};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, ProtocolVersion, SignatureScheme};
use seekr_common::analysis::TlsInfo;
use seekr_common::error::TlsError;
use seekr_protocols::x509;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::TlsConnector;
use tracing::debug;

/// Accepts any certificate chain but still checks handshake signatures, so
/// the peer must hold the key of the certificate it presents.
#[derive(Debug)]
struct AcceptAnyCert(Arc<CryptoProvider>);

impl ServerCertVerifier for AcceptAnyCert {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(message, cert, dss, &self.0.signature_verification_algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(message, cert, dss, &self.0.signature_verification_algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.0.signature_verification_algorithms.supported_schemes()
    }
}

fn client_config() -> Result<Arc<ClientConfig>, rustls::Error> {
    let provider = Arc::new(ring::default_provider());
    let config = ClientConfig::builder_with_provider(Arc::clone(&provider))
        .with_safe_default_protocol_versions()?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(AcceptAnyCert(provider)))
        .with_no_client_auth();
    Ok(Arc::new(config))
}

/// Connects, completes a handshake presenting `ip` as the server name and
/// summarises the leaf certificate. The whole exchange is bounded by
/// `probe_timeout`.
pub async fn probe_tls(ip: Ipv4Addr, port: u16, probe_timeout: Duration) -> Result<TlsInfo, TlsError> {
    match timeout(probe_timeout, handshake(ip, port)).await {
        Ok(result) => result,
        Err(_) => Err(TlsError::new(format!(
            "handshake with {ip}:{port} timed out after {}ms",
            probe_timeout.as_millis()
        ))),
    }
}

async fn handshake(ip: Ipv4Addr, port: u16) -> Result<TlsInfo, TlsError> {
    let config = client_config().map_err(|e| TlsError::new(format!("cannot build TLS client: {e}")))?;

    let stream = TcpStream::connect((ip, port))
        .await
        .map_err(|e| TlsError::new(format!("connection to {ip}:{port} failed: {e}")))?;

    let server_name = ServerName::from(IpAddr::V4(ip));
    let tls_stream = TlsConnector::from(config)
        .connect(server_name, stream)
        .await
        .map_err(|e| TlsError::new(format!("handshake with {ip}:{port} failed: {e}")))?;

    let (_, session) = tls_stream.get_ref();
    let protocol_version = session
        .protocol_version()
        .map(version_label)
        .unwrap_or_else(|| "unknown".to_string());

    let leaf = session
        .peer_certificates()
        .and_then(|certs| certs.first())
        .ok_or_else(|| TlsError::new("server presented no certificate"))?;

    let fields = x509::extract_fields(leaf.as_ref()).map_err(|e| TlsError::new(format!("{e:#}")))?;
    debug!("{ip}:{port} negotiated {protocol_version}");

    Ok(TlsInfo {
        issuer: fields.issuer,
        subject: fields.subject,
        protocol_version,
        serial_number: fields.serial_number,
    })
}

fn version_label(version: ProtocolVersion) -> String {
    match version {
        ProtocolVersion::TLSv1_3 => "TLSv1.3".to_string(),
        ProtocolVersion::TLSv1_2 => "TLSv1.2".to_string(),
        ProtocolVersion::TLSv1_1 => "TLSv1.1".to_string(),
        ProtocolVersion::TLSv1_0 => "TLSv1".to_string(),
        ProtocolVersion::SSLv3 => "SSLv3".to_string(),
        other => format!("{other:?}"),
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
