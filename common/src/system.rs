//! Access to the host operating system's view of the network.

use pnet::datalink::NetworkInterface;

use crate::error::ScanError;
use crate::network::interface::NetworkContext;

pub trait SystemRepository: Send + Sync {
    /// Resolves the local address, its interface and the block of the given
    /// prefix around it.
    fn resolve_identity(&self, prefix: u8) -> Result<NetworkContext, ScanError>;

    fn interface_by_name(&self, name: &str) -> Option<NetworkInterface>;
}
