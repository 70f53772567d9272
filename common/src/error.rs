//! Error taxonomy of the reconnaissance core.
//!
//! [`ScanError`] covers failures that abort an operation. Failures that are
//! recovered per port ([`TlsError`], [`HttpError`]) or per scan
//! ([`ScanDegraded`]) are plain values folded into the results instead.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    /// Malformed input or out-of-bounds setting. Raised before any I/O.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The process cannot open a raw link-layer channel.
    #[error("link-layer access denied: {0}")]
    Privilege(String),

    /// The local network identity cannot be determined.
    #[error("cannot determine local network identity: {0}")]
    NoRoute(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The selected interface cannot be used for an address-resolution sweep.
    #[error("interface {name} is unusable: {reason}")]
    Interface { name: String, reason: String },

    #[error("link-layer channel on {interface} failed")]
    Link {
        interface: String,
        #[source]
        source: io::Error,
    },

    #[error("{operation} is not allowed while the session is {state}")]
    InvalidState {
        operation: &'static str,
        state: String,
    },

    #[error("a discovery sweep is already in progress")]
    DiscoveryInProgress,

    #[error("worker task failed: {0}")]
    Worker(String),
}

impl ScanError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// `true` for errors after which nothing else in the session can run.
    pub fn is_session_fatal(&self) -> bool {
        matches!(self, Self::NoRoute(_))
    }
}

/// A TLS probe failed. The cause is kept as readable text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("TLS error: {cause}")]
pub struct TlsError {
    pub cause: String,
}

impl TlsError {
    pub fn new(cause: impl Into<String>) -> Self {
        Self {
            cause: cause.into(),
        }
    }
}

/// An HTTP probe failed. The cause is kept as readable text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("HTTP error: {cause}")]
pub struct HttpError {
    pub cause: String,
}

impl HttpError {
    pub fn new(cause: impl Into<String>) -> Self {
        Self {
            cause: cause.into(),
        }
    }
}

/// Warning attached to a port scan whose connect attempts ran into
/// operating-system resource limits (socket table, file descriptors).
///
/// Ports affected by it were counted as not open, so the open set of such a
/// report may be incomplete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("scan degraded: {failed_attempts} connect attempt(s) hit resource limits ({cause})")]
pub struct ScanDegraded {
    pub failed_attempts: usize,
    pub cause: String,
}
