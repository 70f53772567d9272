use std::io;
use std::net::{SocketAddr, SocketAddrV4};
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::time::timeout;

/// ENFILE, EMFILE and the platform's ENOBUFS.
#[cfg(target_os = "linux")]
const EXHAUSTION_CODES: &[i32] = &[23, 24, 105];
#[cfg(all(unix, not(target_os = "linux")))]
const EXHAUSTION_CODES: &[i32] = &[23, 24, 55];
/// WSAEMFILE, WSAENOBUFS.
#[cfg(windows)]
const EXHAUSTION_CODES: &[i32] = &[10024, 10055];
#[cfg(not(any(unix, windows)))]
const EXHAUSTION_CODES: &[i32] = &[];

/// What a single connect attempt says about a port.
#[derive(Debug)]
pub enum ConnectOutcome {
    Open,
    /// Refused, timed out or unreachable. These are not told apart.
    NotOpen,
    /// The attempt never reached the network because the OS ran out of
    /// sockets, descriptors or buffers.
    Exhausted(io::Error),
}

#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, addr: SocketAddrV4, connect_timeout: Duration) -> ConnectOutcome;
}

/// Full TCP handshakes through the OS stack.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpConnector;

#[async_trait]
impl Connector for TcpConnector {
    async fn connect(&self, addr: SocketAddrV4, connect_timeout: Duration) -> ConnectOutcome {
        match timeout(connect_timeout, TcpStream::connect(SocketAddr::V4(addr))).await {
            Ok(Ok(_stream)) => ConnectOutcome::Open,
            Ok(Err(e)) if is_resource_exhaustion(&e) => ConnectOutcome::Exhausted(e),
            Ok(Err(_)) | Err(_) => ConnectOutcome::NotOpen,
        }
    }
}

pub fn is_resource_exhaustion(e: &io::Error) -> bool {
    if e.kind() == io::ErrorKind::OutOfMemory {
        return true;
    }
    e.raw_os_error()
        .is_some_and(|code| EXHAUSTION_CODES.contains(&code))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use tokio::net::TcpListener;

    const CONNECT_TIMEOUT: Duration = Duration::from_millis(500);

    #[tokio::test]
    async fn listening_port_is_open() {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let outcome = TcpConnector
            .connect(SocketAddrV4::new(Ipv4Addr::LOCALHOST, port), CONNECT_TIMEOUT)
            .await;
        assert!(matches!(outcome, ConnectOutcome::Open), "{outcome:?}");
    }

    #[tokio::test]
    async fn released_port_is_not_open() {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let outcome = TcpConnector
            .connect(SocketAddrV4::new(Ipv4Addr::LOCALHOST, port), CONNECT_TIMEOUT)
            .await;
        assert!(matches!(outcome, ConnectOutcome::NotOpen), "{outcome:?}");
    }

    #[test]
    fn refusals_are_not_exhaustion() {
        let refused = io::Error::from(io::ErrorKind::ConnectionRefused);
        assert!(!is_resource_exhaustion(&refused));
        assert!(is_resource_exhaustion(&io::Error::from(io::ErrorKind::OutOfMemory)));
    }

    #[cfg(unix)]
    #[test]
    fn descriptor_limits_are_exhaustion() {
        assert!(is_resource_exhaustion(&io::Error::from_raw_os_error(24)));
        assert!(is_resource_exhaustion(&io::Error::from_raw_os_error(23)));
        // ECONNREFUSED
        assert!(!is_resource_exhaustion(&io::Error::from_raw_os_error(111)));
    }
}
