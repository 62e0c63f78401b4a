//! Touch calibration from startup tokens.
//!
//! Tokens look like `touchscreen_rotate=90`. They are matched with a small
//! substring matcher, recorded in order and then applied on top of the
//! device defaults:
//!
//! - `touchscreen_device=<path>` replaces the source path outright
//! - `touchscreen_rotate=<deg>` applies only for 0, 90, 180 or 270
//! - `touchscreen_invert_x=<n>` / `touchscreen_invert_y=<n>` set the flag
//!   when `n > 0`; nothing here ever clears a flag
//! - any token containing `debug` turns on debug mode
//!
//! Everything else is ignored.

use crate::device::{DeviceDescriptor, Rotation, TouchscreenTransform};

/// Recognised configuration keys, in matching order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TouchKey {
    Device,
    Rotate,
    InvertX,
    InvertY,
}

impl TouchKey {
    pub const ALL: [TouchKey; 4] = [
        TouchKey::Device,
        TouchKey::Rotate,
        TouchKey::InvertX,
        TouchKey::InvertY,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TouchKey::Device => "touchscreen_device",
            TouchKey::Rotate => "touchscreen_rotate",
            TouchKey::InvertX => "touchscreen_invert_x",
            TouchKey::InvertY => "touchscreen_invert_y",
        }
    }

    fn pattern(self) -> &'static str {
        match self {
            TouchKey::Device => "touchscreen_device=",
            TouchKey::Rotate => "touchscreen_rotate=",
            TouchKey::InvertX => "touchscreen_invert_x=",
            TouchKey::InvertY => "touchscreen_invert_y=",
        }
    }
}

/// One recognised `key=value` token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TouchSetting {
    pub key: TouchKey,
    /// Everything after `key=` in the token
    pub value: String,
}

/// Raw touch settings in token order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TouchTransformConfig {
    entries: Vec<TouchSetting>,
    debug: bool,
}

impl TouchTransformConfig {
    /// Scan tokens once, in order.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut config = Self::default();
        for token in tokens {
            let token = token.as_ref();
            if token.contains("debug") {
                config.debug = true;
            }
            match match_token(token) {
                Some(setting) => {
                    log::debug!("touch config: {}={}", setting.key.name(), setting.value);
                    config.entries.push(setting);
                }
                None => log::trace!("touch config: ignoring '{}'", token),
            }
        }
        config
    }

    pub fn entries(&self) -> &[TouchSetting] {
        &self.entries
    }

    /// Raw value of the last token that set `key`
    pub fn last(&self, key: TouchKey) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|setting| setting.key == key)
            .map(|setting| setting.value.as_str())
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Apply the settings, in order, on top of `defaults`.
    pub fn resolve(&self, defaults: &TouchscreenTransform) -> TouchscreenTransform {
        let mut transform = defaults.clone();
        for setting in &self.entries {
            match setting.key {
                TouchKey::Device => transform.source_path = setting.value.clone(),
                TouchKey::Rotate => match parse_int(&setting.value).and_then(Rotation::from_degrees) {
                    Some(rotation) => transform.rotation = rotation,
                    None => log::warn!(
                        "Ignoring touchscreen rotation '{}', keeping {}",
                        setting.value,
                        transform.rotation.degrees()
                    ),
                },
                TouchKey::InvertX => {
                    if parse_int(&setting.value).is_some_and(|value| value > 0) {
                        transform.invert_x = true;
                    }
                }
                TouchKey::InvertY => {
                    if parse_int(&setting.value).is_some_and(|value| value > 0) {
                        transform.invert_y = true;
                    }
                }
            }
        }
        transform
    }
}

/// Resolved touch configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TouchConfig {
    pub transform: TouchscreenTransform,
    pub debug: bool,
    pub raw: TouchTransformConfig,
}

impl TouchConfig {
    /// Argument string for the evdev touch manager
    pub fn evdev_spec(&self) -> String {
        self.transform.to_evdev_spec()
    }
}

/// Parse startup tokens against a device's touch defaults.
pub fn parse_touch_config<I, S>(tokens: I, defaults: &DeviceDescriptor) -> TouchConfig
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let raw = TouchTransformConfig::from_tokens(tokens);
    let transform = raw.resolve(&defaults.touchscreen_transform);
    TouchConfig {
        transform,
        debug: raw.debug(),
        raw,
    }
}

fn match_token(token: &str) -> Option<TouchSetting> {
    TouchKey::ALL.iter().find_map(|&key| {
        let pattern = key.pattern();
        token.find(pattern).map(|at| TouchSetting {
            key,
            value: token[at + pattern.len()..].to_string(),
        })
    })
}

fn parse_int(value: &str) -> Option<i32> {
    value.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn defaults() -> DeviceDescriptor {
        DeviceDescriptor::generic().with_transform(TouchscreenTransform {
            rotation: Rotation::Rotate0,
            invert_x: false,
            invert_y: false,
            source_path: String::from("/dev/input/event1"),
        })
    }

    #[test]
    fn device_rotate_and_invert_y() {
        let config = parse_touch_config(
            [
                "touchscreen_device=/dev/input/event5",
                "touchscreen_rotate=90",
                "touchscreen_invert_y=1",
            ],
            &defaults(),
        );
        assert_eq!(
            config.transform,
            TouchscreenTransform {
                rotation: Rotation::Rotate90,
                invert_x: false,
                invert_y: true,
                source_path: String::from("/dev/input/event5"),
            }
        );
        assert_eq!(config.evdev_spec(), "/dev/input/event5:rotate=90:inverty");
        assert!(!config.debug);
    }

    #[test]
    fn no_tokens_keeps_defaults() {
        let config = parse_touch_config(Vec::<String>::new(), &defaults());
        assert_eq!(config.transform, defaults().touchscreen_transform);
        assert_eq!(config.evdev_spec(), "/dev/input/event1:rotate=0");
    }

    #[test]
    fn invert_flag_is_never_cleared() {
        let config = parse_touch_config(
            ["touchscreen_invert_x=1", "touchscreen_invert_x=0"],
            &defaults(),
        );
        assert!(config.transform.invert_x);
        // the raw view still reports the last writer
        assert_eq!(config.raw.last(TouchKey::InvertX), Some("0"));
    }

    #[test]
    fn invert_flag_needs_positive_integer() {
        for value in ["0", "-1", "yes", "", " "] {
            let token = format!("touchscreen_invert_y={value}");
            let config = parse_touch_config([token.as_str()], &defaults());
            assert!(!config.transform.invert_y, "value {value:?}");
        }
        let config = parse_touch_config(["touchscreen_invert_y=7"], &defaults());
        assert!(config.transform.invert_y);
    }

    #[test]
    fn default_flags_survive_zero() {
        let mut base = defaults();
        base.touchscreen_transform.invert_x = true;
        let config = parse_touch_config(["touchscreen_invert_x=0"], &base);
        assert!(config.transform.invert_x);
    }

    #[test]
    fn bad_rotation_keeps_prior_value() {
        let config = parse_touch_config(
            ["touchscreen_rotate=180", "touchscreen_rotate=abc", "touchscreen_rotate=45"],
            &defaults(),
        );
        assert_eq!(config.transform.rotation, Rotation::Rotate180);
    }

    #[test]
    fn device_path_is_replaced_not_merged() {
        let config = parse_touch_config(
            ["touchscreen_device=/dev/input/event5", "touchscreen_device=/dev/input/event9"],
            &defaults(),
        );
        assert_eq!(config.transform.source_path, "/dev/input/event9");
    }

    #[test]
    fn debug_anywhere_in_token() {
        let config = parse_touch_config(["debug=anything"], &defaults());
        assert!(config.debug);

        let config = parse_touch_config(["touchscreen_device=/dev/debug0"], &defaults());
        assert!(config.debug);
        assert_eq!(config.transform.source_path, "/dev/debug0");
    }

    #[test]
    fn token_sets_at_most_one_key() {
        let raw = TouchTransformConfig::from_tokens(["touchscreen_device=touchscreen_rotate=90"]);
        assert_eq!(raw.entries().len(), 1);
        assert_eq!(raw.entries()[0].key, TouchKey::Device);
        assert_eq!(raw.last(TouchKey::Rotate), None);
    }

    #[test]
    fn unrecognised_tokens_are_ignored() {
        let raw = TouchTransformConfig::from_tokens(["mouse_speed=2", "touchscreen_driver=foo", "x"]);
        assert!(raw.entries().is_empty());
        assert!(!raw.debug());
    }

    #[test]
    fn key_may_appear_after_prefix() {
        let raw = TouchTransformConfig::from_tokens(["evdev:touchscreen_rotate=270"]);
        assert_eq!(raw.last(TouchKey::Rotate), Some("270"));
    }

    proptest! {
        #[test]
        fn quarter_turns_are_applied(degrees in prop::sample::select(vec![0, 90, 180, 270])) {
            let token = format!("touchscreen_rotate={degrees}");
            let config = parse_touch_config([token], &defaults());
            prop_assert_eq!(i32::from(config.transform.rotation.degrees()), degrees);
        }

        #[test]
        fn other_rotations_keep_default(degrees in any::<i32>()) {
            prop_assume!(![0, 90, 180, 270].contains(&degrees));
            let mut base = defaults();
            base.touchscreen_transform.rotation = Rotation::Rotate270;
            let token = format!("touchscreen_rotate={degrees}");
            let config = parse_touch_config([token], &base);
            prop_assert_eq!(config.transform.rotation, Rotation::Rotate270);
        }

        #[test]
        fn invert_flags_are_monotonic(values in prop::collection::vec(any::<i32>(), 1..8)) {
            let tokens: Vec<String> = values
                .iter()
                .map(|value| format!("touchscreen_invert_x={value}"))
                .collect();
            let config = parse_touch_config(&tokens, &defaults());
            prop_assert_eq!(config.transform.invert_x, values.iter().any(|&v| v > 0));
        }
    }
}
