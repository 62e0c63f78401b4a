//! Wi-Fi connectivity collaborator.
//!
//! Connection management lives outside this crate; the capability registry
//! only forwards to it.

use std::time::Duration;

/// Network connectivity provided by the runtime
pub trait Connectivity: Send + Sync {
    /// Whether the internet is reachable within `timeout`.
    fn test_internet_connection(&self, timeout: Duration) -> bool;

    /// Bring Wi-Fi up. Returns `true` once connected.
    fn enable_wifi_connection(&self) -> bool;

    fn disable_wifi_connection(&self);
}

/// Stand-in for devices or hosts without networking
#[derive(Debug, Default, Clone, Copy)]
pub struct NoConnectivity;

impl Connectivity for NoConnectivity {
    fn test_internet_connection(&self, _timeout: Duration) -> bool {
        false
    }

    fn enable_wifi_connection(&self) -> bool {
        log::info!("Wi-Fi not available");
        false
    }

    fn disable_wifi_connection(&self) {}
}
