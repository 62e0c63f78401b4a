//! Late-bound hardware operations keyed by stable identifiers.
//!
//! Application code looks an operation up by name at call time and treats a
//! missing entry as "unsupported on this device":
//!
//! ```
//! use kobo_platform::capability::{ids, Capability, CapabilityRegistry};
//!
//! let mut registry = CapabilityRegistry::new();
//! registry
//!     .register(Capability::GetBatteryLevel(Box::new(|| 42)))
//!     .unwrap();
//!
//! match registry.resolve(ids::GET_BATTERY_LEVEL) {
//!     Some(Capability::GetBatteryLevel(level)) => assert_eq!(level(), 42),
//!     _ => unreachable!(),
//! }
//! assert!(registry.resolve("not-a-real-capability").is_none());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use embedded_graphics::primitives::Rectangle;

use crate::device::DeviceDescriptor;
use crate::error::RegistryError;
use crate::refresh::RefreshMode;

/// Stable capability identifiers
pub mod ids {
    pub const SET_FRONTLIGHT_LEVEL: &str = "set-frontlight-level";
    pub const GET_BATTERY_LEVEL: &str = "get-battery-level";
    pub const IS_BATTERY_CHARGING: &str = "is-battery-charging";
    pub const SET_PARTIAL_REFRESH_MODE: &str = "set-partial-refresh-mode";
    pub const DO_MANUAL_REFRESH: &str = "do-manual-refresh";
    pub const GET_DEVICE_DESCRIPTOR: &str = "get-device-descriptor";
    pub const TEST_INTERNET_CONNECTION: &str = "test-internet-connection";
    pub const ENABLE_WIFI_CONNECTION: &str = "enable-wifi-connection";
    pub const DISABLE_WIFI_CONNECTION: &str = "disable-wifi-connection";

    /// Every identifier the integration registers
    pub const ALL: [&str; 9] = [
        SET_FRONTLIGHT_LEVEL,
        GET_BATTERY_LEVEL,
        IS_BATTERY_CHARGING,
        SET_PARTIAL_REFRESH_MODE,
        DO_MANUAL_REFRESH,
        GET_DEVICE_DESCRIPTOR,
        TEST_INTERNET_CONNECTION,
        ENABLE_WIFI_CONNECTION,
        DISABLE_WIFI_CONNECTION,
    ];
}

pub type SetFrontlightLevelFn = Box<dyn Fn(i32, i32) + Send + Sync>;
pub type GetBatteryLevelFn = Box<dyn Fn() -> u8 + Send + Sync>;
pub type IsBatteryChargingFn = Box<dyn Fn() -> bool + Send + Sync>;
pub type SetPartialRefreshModeFn = Box<dyn Fn(RefreshMode) + Send + Sync>;
pub type DoManualRefreshFn = Box<dyn Fn(Rectangle) + Send + Sync>;
pub type GetDeviceDescriptorFn = Box<dyn Fn() -> DeviceDescriptor + Send + Sync>;
pub type TestInternetConnectionFn = Box<dyn Fn(Duration) -> bool + Send + Sync>;
pub type EnableWifiConnectionFn = Box<dyn Fn() -> bool + Send + Sync>;
pub type DisableWifiConnectionFn = Box<dyn Fn() + Send + Sync>;

/// A bound hardware operation
///
/// Each variant fixes the call signature for one identifier.
pub enum Capability {
    /// `(level, color_temperature)`, both clamped to hardware limits
    SetFrontlightLevel(SetFrontlightLevelFn),
    /// Percentage 0-100, last known value on sensor failure
    GetBatteryLevel(GetBatteryLevelFn),
    /// `false` when indeterminate
    IsBatteryCharging(IsBatteryChargingFn),
    /// Applies from the next paint
    SetPartialRefreshMode(SetPartialRefreshModeFn),
    /// No-op without an initialised screen
    DoManualRefresh(DoManualRefreshFn),
    /// Copy of the current descriptor
    GetDeviceDescriptor(GetDeviceDescriptorFn),
    TestInternetConnection(TestInternetConnectionFn),
    EnableWifiConnection(EnableWifiConnectionFn),
    DisableWifiConnection(DisableWifiConnectionFn),
}

impl Capability {
    /// Identifier this operation is registered under
    pub fn identifier(&self) -> &'static str {
        match self {
            Capability::SetFrontlightLevel(_) => ids::SET_FRONTLIGHT_LEVEL,
            Capability::GetBatteryLevel(_) => ids::GET_BATTERY_LEVEL,
            Capability::IsBatteryCharging(_) => ids::IS_BATTERY_CHARGING,
            Capability::SetPartialRefreshMode(_) => ids::SET_PARTIAL_REFRESH_MODE,
            Capability::DoManualRefresh(_) => ids::DO_MANUAL_REFRESH,
            Capability::GetDeviceDescriptor(_) => ids::GET_DEVICE_DESCRIPTOR,
            Capability::TestInternetConnection(_) => ids::TEST_INTERNET_CONNECTION,
            Capability::EnableWifiConnection(_) => ids::ENABLE_WIFI_CONNECTION,
            Capability::DisableWifiConnection(_) => ids::DISABLE_WIFI_CONNECTION,
        }
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Capability").field(&self.identifier()).finish()
    }
}

/// Identifier to operation map
///
/// Filled once during boot; lookups afterwards are read-only.
#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    entries: HashMap<&'static str, Capability>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `capability` under its identifier.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Duplicate` if the identifier is taken; the
    /// existing binding is kept.
    pub fn register(&mut self, capability: Capability) -> Result<(), RegistryError> {
        let identifier = capability.identifier();
        if self.entries.contains_key(identifier) {
            return Err(RegistryError::Duplicate(identifier));
        }
        self.entries.insert(identifier, capability);
        Ok(())
    }

    /// Exact, case-sensitive lookup. `None` means unsupported.
    pub fn resolve(&self, identifier: &str) -> Option<&Capability> {
        self.entries.get(identifier)
    }

    /// Registered identifiers in no particular order
    pub fn identifiers(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every binding, releasing the state the closures hold.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
