//! OS-facing adapters. Everything that touches a socket or a raw link sits
//! behind one of the traits defined here so the engine can be driven by
//! in-memory doubles.

pub mod channel;
pub mod http;
pub mod tcp;
pub mod tls;

use std::net::Ipv4Addr;
use std::time::Duration;

use async_trait::async_trait;
use seekr_common::analysis::{HttpInfo, TlsInfo};
use seekr_common::error::{HttpError, TlsError};

/// Application-layer probes run against open ports.
#[async_trait]
pub trait ServiceProber: Send + Sync {
    async fn probe_tls(&self, ip: Ipv4Addr, port: u16, timeout: Duration)
        -> Result<TlsInfo, TlsError>;

    async fn probe_http(&self, ip: Ipv4Addr, port: u16, timeout: Duration)
        -> Result<HttpInfo, HttpError>;
}

/// Probes real services over the network.
#[derive(Debug, Default, Clone, Copy)]
pub struct NetworkProber;

#[async_trait]
impl ServiceProber for NetworkProber {
    async fn probe_tls(
        &self,
        ip: Ipv4Addr,
        port: u16,
        timeout: Duration,
    ) -> Result<TlsInfo, TlsError> {
        tls::probe_tls(ip, port, timeout).await
    }

    async fn probe_http(
        &self,
        ip: Ipv4Addr,
        port: u16,
        timeout: Duration,
    ) -> Result<HttpInfo, HttpError> {
        http::probe_http(ip, port, timeout).await
    }
}
