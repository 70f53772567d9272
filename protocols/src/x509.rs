//! Field extraction from DER-encoded X.509 certificates.

use std::collections::BTreeMap;
use std::fmt::Write;

use anyhow::anyhow;
use x509_parser::prelude::{FromDer, X509Certificate, X509Name};
use x509_parser::objects::{oid2sn, oid_registry};

/// Issuer, subject and serial of a certificate, keyed for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateFields {
    pub issuer: BTreeMap<String, String>,
    pub subject: BTreeMap<String, String>,
    pub serial_number: String,
}

pub fn extract_fields(der: &[u8]) -> anyhow::Result<CertificateFields> {
    let (_, cert) = X509Certificate::from_der(der)
        .map_err(|e| anyhow!("failed to parse certificate: {e}"))?;

    Ok(CertificateFields {
        issuer: name_to_map(cert.issuer()),
        subject: name_to_map(cert.subject()),
        serial_number: serial_to_hex(cert.raw_serial()),
    })
}

/// Attributes keyed by short name (`commonName`, `organizationName`).
/// Unregistered OIDs fall back to their dotted form. Values that are not
/// strings are skipped.
fn name_to_map(name: &X509Name) -> BTreeMap<String, String> {
    let registry = oid_registry();
    name.iter_attributes()
        .filter_map(|attr| {
            let value = attr.as_str().ok()?;
            let key = oid2sn(attr.attr_type(), registry)
                .map(str::to_string)
                .unwrap_or_else(|_| attr.attr_type().to_id_string());
            Some((key, value.to_string()))
        })
        .collect()
}

/// Upper-case hex, leading zero bytes dropped.
fn serial_to_hex(raw: &[u8]) -> String {
    let start = raw
        .iter()
        .position(|b| *b != 0)
        .unwrap_or(raw.len().saturating_sub(1));
    raw[start..].iter().fold(String::new(), |mut out, b| {
        let _ = write!(out, "{b:02X}");
        out
    })
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
