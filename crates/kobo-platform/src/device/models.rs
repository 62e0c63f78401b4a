use super::{FrontlightProfile, Model, ModelProfile, Rotation, ScreenGeometry, TouchDefaults};

const TOUCH_DEVICE: &str = "/dev/input/event1";
const BUTTONS_DEVICE: &str = "/dev/input/event0";

// Older boards report the panel in landscape; Mk7 and later mirror X instead.
const TOUCH_LEGACY: TouchDefaults = TouchDefaults {
    rotation: Rotation::Rotate90,
    invert_x: false,
    invert_y: false,
    device: TOUCH_DEVICE,
};
const TOUCH_MIRRORED: TouchDefaults = TouchDefaults {
    rotation: Rotation::Rotate0,
    invert_x: true,
    invert_y: false,
    device: TOUCH_DEVICE,
};
const TOUCH_PLAIN: TouchDefaults = TouchDefaults {
    rotation: Rotation::Rotate0,
    invert_x: false,
    invert_y: false,
    device: TOUCH_DEVICE,
};

const WHITE_LIGHT: Option<FrontlightProfile> = Some(FrontlightProfile {
    brightness_path: "/sys/class/backlight/mxc_msp430.0/brightness",
    max_brightness: 100,
    color_path: None,
    color_max: 0,
});
const NATURAL_LIGHT: Option<FrontlightProfile> = Some(FrontlightProfile {
    brightness_path: "/sys/class/backlight/mxc_msp430.0/brightness",
    max_brightness: 100,
    color_path: Some("/sys/class/backlight/lm3630a_led/color"),
    color_max: 10,
});

const BATTERY_LEGACY: &str = "mc13892_bat";
const BATTERY_MK8: &str = "battery";

const fn screen(width: u32, height: u32, dpi: u32) -> ScreenGeometry {
    ScreenGeometry { width, height, dpi }
}

const fn kobo(
    model: Model,
    code: u16,
    name: &'static str,
    screen: ScreenGeometry,
    touch: TouchDefaults,
    frontlight: Option<FrontlightProfile>,
    battery_supply: &'static str,
) -> ModelProfile {
    ModelProfile {
        model,
        code,
        name,
        screen,
        touch,
        buttons_device: BUTTONS_DEVICE,
        frontlight,
        battery_supply,
    }
}

/// Fallback when the model cannot be identified.
pub const GENERIC: ModelProfile = kobo(
    Model::Generic,
    0,
    "Generic Kobo",
    screen(800, 600, 167),
    TOUCH_PLAIN,
    None,
    BATTERY_MK8,
);

/// Known models keyed by the device code at the end of the version file.
pub const MODELS: &[ModelProfile] = &[
    kobo(Model::TouchAB, 310, "Kobo Touch A/B", screen(800, 600, 167), TOUCH_LEGACY, None, BATTERY_LEGACY),
    kobo(Model::TouchC, 320, "Kobo Touch C", screen(800, 600, 167), TOUCH_LEGACY, None, BATTERY_LEGACY),
    kobo(Model::Glo, 330, "Kobo Glo", screen(1024, 758, 212), TOUCH_LEGACY, WHITE_LIGHT, BATTERY_LEGACY),
    kobo(Model::Mini, 340, "Kobo Mini", screen(800, 600, 200), TOUCH_LEGACY, None, BATTERY_LEGACY),
    kobo(Model::AuraHD, 350, "Kobo Aura HD", screen(1440, 1080, 265), TOUCH_LEGACY, WHITE_LIGHT, BATTERY_LEGACY),
    kobo(Model::Aura, 360, "Kobo Aura", screen(1024, 758, 212), TOUCH_LEGACY, WHITE_LIGHT, BATTERY_LEGACY),
    kobo(Model::AuraH2O, 370, "Kobo Aura H2O", screen(1440, 1080, 265), TOUCH_LEGACY, WHITE_LIGHT, BATTERY_LEGACY),
    kobo(Model::GloHD, 371, "Kobo Glo HD", screen(1448, 1072, 300), TOUCH_LEGACY, WHITE_LIGHT, BATTERY_LEGACY),
    kobo(Model::Touch2, 372, "Kobo Touch 2.0", screen(800, 600, 167), TOUCH_LEGACY, None, BATTERY_LEGACY),
    kobo(Model::AuraOne, 373, "Kobo Aura ONE", screen(1872, 1404, 300), TOUCH_LEGACY, NATURAL_LIGHT, BATTERY_LEGACY),
    kobo(Model::AuraH2O2, 374, "Kobo Aura H2O Edition 2", screen(1440, 1080, 265), TOUCH_LEGACY, WHITE_LIGHT, BATTERY_LEGACY),
    kobo(Model::Aura2, 375, "Kobo Aura Edition 2", screen(1024, 758, 212), TOUCH_LEGACY, WHITE_LIGHT, BATTERY_LEGACY),
    kobo(Model::ClaraHD, 376, "Kobo Clara HD", screen(1448, 1072, 300), TOUCH_MIRRORED, NATURAL_LIGHT, BATTERY_LEGACY),
    kobo(Model::Forma, 377, "Kobo Forma", screen(1920, 1440, 300), TOUCH_MIRRORED, NATURAL_LIGHT, BATTERY_LEGACY),
    kobo(Model::AuraH2O2, 378, "Kobo Aura H2O Edition 2", screen(1440, 1080, 265), TOUCH_LEGACY, WHITE_LIGHT, BATTERY_LEGACY),
    kobo(Model::Aura2, 379, "Kobo Aura Edition 2", screen(1024, 758, 212), TOUCH_LEGACY, WHITE_LIGHT, BATTERY_LEGACY),
    kobo(Model::Forma, 380, "Kobo Forma 32GB", screen(1920, 1440, 300), TOUCH_MIRRORED, NATURAL_LIGHT, BATTERY_LEGACY),
    kobo(Model::Nia, 382, "Kobo Nia", screen(1024, 758, 212), TOUCH_MIRRORED, WHITE_LIGHT, BATTERY_LEGACY),
    kobo(Model::Sage, 383, "Kobo Sage", screen(1680, 1264, 300), TOUCH_MIRRORED, NATURAL_LIGHT, BATTERY_MK8),
    kobo(Model::LibraH2O, 384, "Kobo Libra H2O", screen(1680, 1264, 300), TOUCH_MIRRORED, NATURAL_LIGHT, BATTERY_LEGACY),
    kobo(Model::Clara2E, 386, "Kobo Clara 2E", screen(1448, 1072, 300), TOUCH_MIRRORED, NATURAL_LIGHT, BATTERY_MK8),
    kobo(Model::Elipsa, 387, "Kobo Elipsa", screen(1872, 1404, 227), TOUCH_MIRRORED, NATURAL_LIGHT, BATTERY_MK8),
    kobo(Model::Libra2, 388, "Kobo Libra 2", screen(1680, 1264, 300), TOUCH_MIRRORED, NATURAL_LIGHT, BATTERY_MK8),
];
