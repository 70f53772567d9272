//! Wire formats and lookup tables used by the scanners.

pub mod arp;
pub mod ethernet;
pub mod services;
pub mod x509;

pub const ETH_HDR_LEN: usize = 14;
pub const ARP_LEN: usize = 28;
pub const MIN_ETH_FRAME_NO_FCS: usize = 60;
