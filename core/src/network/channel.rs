use std::io;
use std::time::Duration;

use pnet::datalink::{self, Channel, Config, DataLinkReceiver, DataLinkSender, NetworkInterface};

/// Read timeout of the receive side. Bounds how late a sweep notices its
/// deadline on a quiet network.
const READ_TIMEOUT: Duration = Duration::from_millis(50);

pub type EthernetChannel = (Box<dyn DataLinkSender>, Box<dyn DataLinkReceiver>);

/// Raw link-layer access.
pub trait LinkLayer: Send + Sync {
    /// Whether the process may open raw channels at all.
    fn has_privilege(&self) -> bool;

    fn open(&self, intf: &NetworkInterface) -> io::Result<EthernetChannel>;
}

/// Ethernet channels opened through the OS packet interface. Needs root on
/// Unix and an elevated process on Windows.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawLink;

impl LinkLayer for RawLink {
    fn has_privilege(&self) -> bool {
        is_root::is_root()
    }

    fn open(&self, intf: &NetworkInterface) -> io::Result<EthernetChannel> {
        open_eth_channel(intf, &get_config(), datalink::channel)
    }
}

fn open_eth_channel<F>(intf: &NetworkInterface, cfg: &Config, channel_opener: F) -> io::Result<EthernetChannel>
where
    F: FnOnce(&NetworkInterface, Config) -> io::Result<Channel>,
{
    match channel_opener(intf, *cfg)? {
        Channel::Ethernet(tx, rx) => Ok((tx, rx)),
        _ => Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!("non-ethernet channel for {}", intf.name),
        )),
    }
}

fn get_config() -> Config {
    Config {
        read_timeout: Some(READ_TIMEOUT),
        ..Default::default()
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
