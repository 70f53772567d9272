use colored::*;
use pnet::util::MacAddr;

use seekr_common::analysis::{HttpInfo, PortAnalysis, TlsInfo};
use seekr_common::network::device::Device;
use seekr_common::network::interface::NetworkContext;
use seekr_common::network::mac;

use crate::terminal::colors;

pub type Detail = (String, ColoredString);

pub fn context_to_details(ctx: &NetworkContext) -> Vec<Detail> {
    let interface = ctx.interface_name.as_deref().unwrap_or("unknown");
    vec![
        ("IPv4".to_string(), ctx.local_ip.to_string().color(colors::IPV4_ADDR)),
        ("Iface".to_string(), interface.color(colors::TEXT_DEFAULT)),
        ("Range".to_string(), cidr_colored(&ctx.cidr_range.to_string())),
    ]
}

fn cidr_colored(cidr: &str) -> ColoredString {
    match cidr.split_once('/') {
        Some((addr, prefix)) => format!(
            "{}{}",
            addr.color(colors::IPV4_ADDR),
            format!("/{prefix}").color(colors::IPV4_PREFIX)
        )
        .normal(),
        None => cidr.color(colors::IPV4_ADDR),
    }
}

pub fn device_to_details(device: &Device) -> Vec<Detail> {
    let mut details: Vec<Detail> = vec![
        ("IPv4".to_string(), device.ip.to_string().color(colors::IPV4_ADDR)),
        mac_to_detail(&device.mac),
    ];
    if let Some(vendor) = mac::vendor_for(device.mac) {
        details.push(("Vendor".to_string(), vendor.color(colors::VENDOR)));
    }
    details
}

fn mac_to_detail(mac: &MacAddr) -> Detail {
    ("MAC".to_string(), mac.to_string().color(colors::MAC_ADDR))
}

/// Heading of one port entry, e.g. `443/https`.
pub fn port_title(analysis: &PortAnalysis) -> String {
    format!(
        "{}{}{}",
        analysis.port.to_string().color(colors::PORT),
        "/".color(colors::SEPARATOR),
        analysis.service.color(colors::SERVICE)
    )
}

pub fn analysis_to_details(analysis: &PortAnalysis) -> Vec<Detail> {
    let mut details: Vec<Detail> = Vec::new();

    match &analysis.tls {
        Some(Ok(tls)) => details.extend(tls_to_details(tls)),
        Some(Err(e)) => details.push(failure("TLS", &e.cause)),
        None => {}
    }

    match &analysis.http {
        Some(Ok(http)) => details.extend(http_to_details(http)),
        Some(Err(e)) => details.push(failure("HTTP", &e.cause)),
        None => {}
    }

    details
}

fn tls_to_details(tls: &TlsInfo) -> Vec<Detail> {
    let subject = tls.subject_common_name().unwrap_or("-");
    let issuer = tls.issuer_common_name().unwrap_or("-");
    vec![
        ("TLS".to_string(), tls.protocol_version.color(colors::TLS)),
        ("Subject".to_string(), subject.color(colors::TEXT_DEFAULT)),
        ("Issuer".to_string(), issuer.color(colors::TEXT_DEFAULT)),
        ("Serial".to_string(), tls.serial_number.color(colors::TEXT_DEFAULT)),
    ]
}

fn http_to_details(http: &HttpInfo) -> Vec<Detail> {
    vec![
        ("HTTP".to_string(), http.status_code.to_string().color(colors::HTTP)),
        ("Server".to_string(), http.server().color(colors::TEXT_DEFAULT)),
        ("Type".to_string(), http.content_type().color(colors::TEXT_DEFAULT)),
    ]
}

fn failure(key: &str, cause: &str) -> Detail {
    (key.to_string(), cause.color(colors::FAILURE))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
