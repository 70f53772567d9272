//! Logging shorthands shared by every crate in the workspace.
//!
//! They forward to `tracing`, so whichever subscriber the binary installs
//! decides how (and whether) the output is rendered.

/// Target used for events that announce a completed step.
pub const SUCCESS_TARGET: &str = "seekr::success";

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        ::tracing::info!($($arg)*)
    };
}

/// Logs at INFO level under [`SUCCESS_TARGET`] so formatters can highlight it.
#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        ::tracing::info!(target: "seekr::success", $($arg)*)
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        ::tracing::warn!($($arg)*)
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        ::tracing::error!($($arg)*)
    };
}
