pub mod analysis;
pub mod config;
pub mod error;
pub mod event;
pub mod logging;
pub mod network;
pub mod system;
