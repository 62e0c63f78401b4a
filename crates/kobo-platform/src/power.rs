//! Frontlight and battery access through sysfs.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use crate::device::{DeviceDescriptor, FrontlightProfile};
use crate::sysfs::SysFs;

/// Upper bound of the frontlight level and colour temperature inputs
pub const LEVEL_MAX: i32 = 100;

/// Power supply and frontlight of one device
pub struct PowerManager {
    fs: Arc<dyn SysFs>,
    battery_supply: &'static str,
    frontlight: Option<FrontlightProfile>,
    last_battery_percent: AtomicU8,
}

impl PowerManager {
    pub fn new(fs: Arc<dyn SysFs>, descriptor: &DeviceDescriptor) -> Self {
        Self {
            fs,
            battery_supply: descriptor.battery_supply,
            frontlight: descriptor.frontlight,
            last_battery_percent: AtomicU8::new(0),
        }
    }

    /// Apply frontlight intensity and warmth, both in `0..=100`.
    ///
    /// Out-of-range inputs are clamped. Devices without natural light ignore
    /// the colour temperature; devices without a frontlight ignore both.
    pub fn set_frontlight_level(&self, level: i32, color_temperature: i32) {
        let Some(light) = self.frontlight else {
            log::debug!("No frontlight on this device");
            return;
        };

        let level = level.clamp(0, LEVEL_MAX);
        let brightness = scale(level, light.max_brightness);
        if let Err(err) = self.fs.write(light.brightness_path, &brightness.to_string()) {
            log::warn!("Failed to set frontlight level: {}", err);
        }

        if let Some(color_path) = light.color_path {
            let warmth = scale(color_temperature.clamp(0, LEVEL_MAX), light.color_max);
            if let Err(err) = self.fs.write(color_path, &warmth.to_string()) {
                log::warn!("Failed to set frontlight colour: {}", err);
            }
        }
    }

    /// Battery charge in percent.
    ///
    /// Falls back to the last successful reading (0 before the first one).
    pub fn battery_level(&self) -> u8 {
        let path = self.supply_path("capacity");
        let reading = self
            .fs
            .read_trimmed(&path)
            .map_err(|err| err.to_string())
            .and_then(|raw| raw.parse::<i32>().map_err(|err| format!("{path}: {err}")));

        match reading {
            Ok(percent) => {
                let percent = percent.clamp(0, 100) as u8;
                self.last_battery_percent.store(percent, Ordering::Relaxed);
                percent
            }
            Err(err) => {
                let last = self.last_battery_percent.load(Ordering::Relaxed);
                log::warn!("Battery read failed ({}), reporting {}%", err, last);
                last
            }
        }
    }

    /// Whether the supply reports `Charging`; `false` when unknown.
    pub fn is_battery_charging(&self) -> bool {
        match self.fs.read_trimmed(&self.supply_path("status")) {
            Ok(status) => status == "Charging",
            Err(err) => {
                log::debug!("Battery status unavailable: {}", err);
                false
            }
        }
    }

    fn supply_path(&self, attribute: &str) -> String {
        format!("/sys/class/power_supply/{}/{}", self.battery_supply, attribute)
    }
}

fn scale(value: i32, max: u32) -> u32 {
    // value is already clamped to 0..=LEVEL_MAX
    (value as u32 * max + (LEVEL_MAX as u32 / 2)) / LEVEL_MAX as u32
}
