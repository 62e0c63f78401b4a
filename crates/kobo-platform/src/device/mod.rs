//! Device identity and detection.
//!
//! A [`DeviceDescriptor`] is built once at boot from the model table and the
//! parsed touch configuration, then shared read-only with the capability
//! operations through [`SharedDescriptor`].

mod models;

use std::sync::{PoisonError, RwLock};

use embedded_graphics::geometry::Size;
use embedded_graphics::primitives::Rectangle;

use crate::sysfs::{HostSysFs, SysFs};

pub use models::{GENERIC, MODELS};

/// Firmware version file; its last field ends in the three-digit device code.
pub const VERSION_FILE: &str = "/mnt/onboard/.kobo/version";
/// Device-tree model string, used when the version file is unusable.
pub const DEVICE_TREE_MODEL: &str = "/proc/device-tree/model";

/// Known hardware models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Model {
    Generic,
    TouchAB,
    TouchC,
    Glo,
    Mini,
    AuraHD,
    Aura,
    AuraH2O,
    GloHD,
    Touch2,
    AuraOne,
    AuraH2O2,
    Aura2,
    ClaraHD,
    Forma,
    Nia,
    Sage,
    LibraH2O,
    Clara2E,
    Elipsa,
    Libra2,
}

/// Touch rotation relative to the panel's native orientation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Rotation {
    /// No rotation
    #[default]
    Rotate0,
    /// Rotate 90 degrees clockwise
    Rotate90,
    /// Rotate 180 degrees
    Rotate180,
    /// Rotate 270 degrees clockwise
    Rotate270,
}

impl Rotation {
    /// Map a degree value; only exact quarter turns are accepted.
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        match degrees {
            0 => Some(Rotation::Rotate0),
            90 => Some(Rotation::Rotate90),
            180 => Some(Rotation::Rotate180),
            270 => Some(Rotation::Rotate270),
            _ => None,
        }
    }

    pub fn degrees(self) -> u16 {
        match self {
            Rotation::Rotate0 => 0,
            Rotation::Rotate90 => 90,
            Rotation::Rotate180 => 180,
            Rotation::Rotate270 => 270,
        }
    }
}

/// Panel geometry in native orientation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScreenGeometry {
    pub width: u32,
    pub height: u32,
    pub dpi: u32,
}

impl ScreenGeometry {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Rectangle covering the whole panel
    pub fn bounds(&self) -> Rectangle {
        Rectangle::new(embedded_graphics::geometry::Point::zero(), self.size())
    }
}

/// Mapping from raw touch coordinates to the displayed orientation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TouchscreenTransform {
    pub rotation: Rotation,
    pub invert_x: bool,
    pub invert_y: bool,
    /// evdev node the touch manager reads from
    pub source_path: String,
}

impl TouchscreenTransform {
    /// Flat argument string for the evdev touch manager.
    ///
    /// Device path first, then rotation, then the inversion flags that are set:
    /// `/dev/input/event5:rotate=90:inverty`.
    pub fn to_evdev_spec(&self) -> String {
        let mut spec = format!("{}:rotate={}", self.source_path, self.rotation.degrees());
        if self.invert_x {
            spec.push_str(":invertx");
        }
        if self.invert_y {
            spec.push_str(":inverty");
        }
        spec
    }
}

/// Frontlight control files of a model
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrontlightProfile {
    pub brightness_path: &'static str,
    /// Highest value accepted by the brightness file
    pub max_brightness: u32,
    /// Colour temperature file, present on natural-light models
    pub color_path: Option<&'static str>,
    /// Highest value accepted by the colour file
    pub color_max: u32,
}

/// Touch defaults baked into a model profile
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TouchDefaults {
    pub rotation: Rotation,
    pub invert_x: bool,
    pub invert_y: bool,
    pub device: &'static str,
}

/// Static description of one hardware model
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModelProfile {
    pub model: Model,
    pub code: u16,
    pub name: &'static str,
    pub screen: ScreenGeometry,
    pub touch: TouchDefaults,
    pub buttons_device: &'static str,
    pub frontlight: Option<FrontlightProfile>,
    /// Directory name under `/sys/class/power_supply`
    pub battery_supply: &'static str,
}

impl ModelProfile {
    /// Look up a model by device code.
    pub fn by_code(code: u16) -> Option<&'static ModelProfile> {
        MODELS.iter().find(|profile| profile.code == code)
    }

    /// Find a model whose name appears in a free-form model string.
    ///
    /// The longest matching name wins so "Kobo Aura H2O Edition 2" is not
    /// reported as "Kobo Aura".
    pub fn by_name(model_string: &str) -> Option<&'static ModelProfile> {
        let haystack = model_string.to_ascii_lowercase();
        MODELS
            .iter()
            .filter(|profile| haystack.contains(&profile.name.to_ascii_lowercase()))
            .max_by_key(|profile| profile.name.len())
    }
}

/// Device identity plus derived hardware parameters
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceDescriptor {
    pub model: Model,
    pub code: u16,
    pub name: &'static str,
    pub screen: ScreenGeometry,
    pub touchscreen_transform: TouchscreenTransform,
    pub buttons_device: &'static str,
    pub frontlight: Option<FrontlightProfile>,
    pub battery_supply: &'static str,
}

impl DeviceDescriptor {
    /// Descriptor carrying a model's intrinsic defaults
    pub fn from_profile(profile: &ModelProfile) -> Self {
        Self {
            model: profile.model,
            code: profile.code,
            name: profile.name,
            screen: profile.screen,
            touchscreen_transform: TouchscreenTransform {
                rotation: profile.touch.rotation,
                invert_x: profile.touch.invert_x,
                invert_y: profile.touch.invert_y,
                source_path: profile.touch.device.to_string(),
            },
            buttons_device: profile.buttons_device,
            frontlight: profile.frontlight,
            battery_supply: profile.battery_supply,
        }
    }

    /// The documented fallback profile
    pub fn generic() -> Self {
        Self::from_profile(&GENERIC)
    }

    /// Copy with a different touch transform
    pub fn with_transform(mut self, transform: TouchscreenTransform) -> Self {
        self.touchscreen_transform = transform;
        self
    }

    pub fn has_natural_light(&self) -> bool {
        self.frontlight
            .map(|light| light.color_path.is_some())
            .unwrap_or(false)
    }
}

impl Default for DeviceDescriptor {
    fn default() -> Self {
        Self::generic()
    }
}

/// Probe the running device.
pub fn detect_device() -> DeviceDescriptor {
    detect_device_with(&HostSysFs::device())
}

/// Probe a device through `fs`.
///
/// Never fails: an unidentifiable device gets [`GENERIC`].
pub fn detect_device_with(fs: &dyn SysFs) -> DeviceDescriptor {
    match fs.read_to_string(VERSION_FILE) {
        Ok(version) => match device_code_from_version(&version) {
            Some(code) => match ModelProfile::by_code(code) {
                Some(profile) => {
                    log::info!("Detected {} (device code {})", profile.name, code);
                    return DeviceDescriptor::from_profile(profile);
                }
                None => log::warn!("Unknown device code {} in {}", code, VERSION_FILE),
            },
            None => log::warn!("Malformed version file {}", VERSION_FILE),
        },
        Err(err) => log::debug!("No version file: {}", err),
    }

    match fs.read_to_string(DEVICE_TREE_MODEL) {
        Ok(model) => {
            // device-tree strings are NUL terminated
            let model = model.trim_end_matches('\0').trim();
            if let Some(profile) = ModelProfile::by_name(model) {
                log::info!("Detected {} from device tree", profile.name);
                return DeviceDescriptor::from_profile(profile);
            }
            log::warn!("Unsupported device model: '{}'", model);
        }
        Err(err) => log::debug!("No device-tree model: {}", err),
    }

    log::warn!("Could not identify device, using {} profile", GENERIC.name);
    DeviceDescriptor::generic()
}

/// Extract the device code from a version file.
///
/// The last comma separated field ends in three digits, e.g.
/// `...,00000000-0000-0000-0000-000000000384` is code 384.
pub fn device_code_from_version(version: &str) -> Option<u16> {
    let field = version.trim().rsplit(',').next()?.trim();
    let start = field.len().checked_sub(3)?;
    let digits = field.get(start..)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Descriptor shared between the owning thread and capability callers.
///
/// Updates replace the whole value under the write lock, so readers see
/// either the old or the new descriptor, never a mix.
#[derive(Debug, Default)]
pub struct SharedDescriptor {
    inner: RwLock<DeviceDescriptor>,
}

impl SharedDescriptor {
    pub fn new(descriptor: DeviceDescriptor) -> Self {
        Self {
            inner: RwLock::new(descriptor),
        }
    }

    /// Copy of the current descriptor
    pub fn snapshot(&self) -> DeviceDescriptor {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Swap in a new touch transform as a single replace.
    pub fn replace_transform(&self, transform: TouchscreenTransform) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.touchscreen_transform = transform;
    }
}
