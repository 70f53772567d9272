//! Reconnaissance engine: ARP sweeps, TCP connect scans and service probes,
//! sequenced by [`coordinator::ScanCoordinator`].

pub mod analyzer;
pub mod coordinator;
pub mod discovery;
pub mod network;
pub mod pool;
pub mod scanner;
pub mod system;

#[cfg(test)]
mod testing;
