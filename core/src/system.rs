use pnet::datalink::NetworkInterface;

use seekr_common::error::ScanError;
use seekr_common::network::interface::{self, NetworkContext};
use seekr_common::system::SystemRepository;

/// Reads the network identity from the running operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRepo;

impl SystemRepository for SystemRepo {
    fn resolve_identity(&self, prefix: u8) -> Result<NetworkContext, ScanError> {
        interface::resolve_local_identity(prefix)
    }

    fn interface_by_name(&self, name: &str) -> Option<NetworkInterface> {
        interface::interface_by_name(name)
    }
}
