//! Device integration layer for Kobo e-readers.
//!
//! Binds a windowing runtime to the hardware: touch calibration, e-ink
//! refresh modes, frontlight and battery. The runtime supplies the screen,
//! input managers and connectivity; this crate detects the device,
//! configures those collaborators and exposes hardware operations through a
//! [`CapabilityRegistry`].

#![forbid(unsafe_code)]
#![cfg_attr(
    not(test),
    deny(
        clippy::expect_used,
        clippy::panic,
        clippy::todo,
        clippy::unimplemented,
        clippy::unreachable,
        clippy::unwrap_used
    )
)]

pub mod capability;
pub mod connectivity;
pub mod device;
pub mod error;
pub mod input;
pub mod integration;
pub mod mock_sysfs;
pub mod params;
pub mod power;
pub mod refresh;
pub mod screen;
pub mod sysfs;
pub mod touch_config;

pub use capability::{ids, Capability, CapabilityRegistry};
pub use connectivity::{Connectivity, NoConnectivity};
pub use device::{
    detect_device, detect_device_with, DeviceDescriptor, FrontlightProfile, Model, ModelProfile,
    Rotation, ScreenGeometry, SharedDescriptor, TouchscreenTransform,
};
pub use error::{BuilderError, IntegrationError, RegistryError, SysFsError};
pub use input::{InputFactory, InputHandler};
pub use integration::{Collaborator, IntegrationBuilder, KoboIntegration, PlatformCapability};
pub use mock_sysfs::MockSysFs;
pub use params::PlatformParams;
pub use power::PowerManager;
pub use refresh::{RefreshController, RefreshMode};
pub use screen::Screen;
pub use sysfs::{HostSysFs, SysFs};
pub use touch_config::{parse_touch_config, TouchConfig, TouchKey, TouchTransformConfig};

/// Re-exported so callers can build refresh regions
pub use embedded_graphics::prelude::{Point, Size};
pub use embedded_graphics::primitives::Rectangle;
