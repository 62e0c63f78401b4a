use std::time::Duration;

use kobo_platform::ids;
use kobo_scenario_harness::{ScenarioConfig, ScenarioHarness};

const CAPACITY: &str = "/sys/class/power_supply/mc13892_bat/capacity";
const STATUS: &str = "/sys/class/power_supply/mc13892_bat/status";
const BRIGHTNESS: &str = "/sys/class/backlight/mxc_msp430.0/brightness";
const COLOR: &str = "/sys/class/backlight/lm3630a_led/color";

#[test]
fn every_identifier_resolves_after_boot() {
    let harness = ScenarioHarness::boot_with_tokens(&[]);
    for identifier in ids::ALL {
        let capability = harness
            .integration()
            .resolve(identifier)
            .unwrap_or_else(|| panic!("{identifier} missing"));
        assert_eq!(capability.identifier(), identifier);
    }
    assert_eq!(harness.integration().registry().len(), ids::ALL.len());
}

#[test]
fn unknown_identifier_is_absent() {
    let harness = ScenarioHarness::boot_with_tokens(&[]);
    assert!(harness.integration().resolve("set-frontlight-level").is_some());
    assert!(harness.integration().resolve("not-a-real-capability").is_none());
    assert!(harness.integration().resolve("Set-Frontlight-Level").is_none());
}

#[test]
fn frontlight_is_clamped_to_hardware_limits() {
    let harness = ScenarioHarness::boot_with_tokens(&[]);
    assert!(harness.set_frontlight_level(250, 400));
    assert_eq!(harness.sysfs().contents(BRIGHTNESS).as_deref(), Some("100"));
    assert_eq!(harness.sysfs().contents(COLOR).as_deref(), Some("10"));

    assert!(harness.set_frontlight_level(-5, 30));
    assert_eq!(harness.sysfs().contents(BRIGHTNESS).as_deref(), Some("0"));
    assert_eq!(harness.sysfs().contents(COLOR).as_deref(), Some("3"));
}

#[test]
fn battery_level_survives_sensor_failure() {
    let harness = ScenarioHarness::boot_with_tokens(&[]);
    harness.sysfs().add_file(CAPACITY, "73\n");
    assert_eq!(harness.battery_level(), Some(73));

    harness.sysfs().remove_file(CAPACITY);
    assert_eq!(harness.battery_level(), Some(73));
}

#[test]
fn battery_queries_from_polling_thread() {
    let harness = ScenarioHarness::boot_with_tokens(&[]);
    harness.sysfs().add_file(CAPACITY, "55");
    harness.sysfs().add_file(STATUS, "Charging");

    std::thread::scope(|scope| {
        let poller = scope.spawn(|| (harness.battery_level(), harness.is_battery_charging()));
        let (level, charging) = poller.join().expect("poller thread");
        assert_eq!(level, Some(55));
        assert_eq!(charging, Some(true));
    });
}

#[test]
fn charging_is_false_when_indeterminate() {
    let harness = ScenarioHarness::boot_with_tokens(&[]);
    assert_eq!(harness.is_battery_charging(), Some(false));
    harness.sysfs().add_file(STATUS, "Unknown");
    assert_eq!(harness.is_battery_charging(), Some(false));
}

#[test]
fn connectivity_is_forwarded_unchanged() {
    let harness = ScenarioHarness::boot(ScenarioConfig {
        online: false,
        ..ScenarioConfig::default()
    })
    .expect("boot");

    assert_eq!(
        harness.test_internet_connection(Duration::from_millis(1500)),
        Some(false)
    );
    assert_eq!(harness.enable_wifi_connection(), Some(false));
    assert!(harness.disable_wifi_connection());

    let events = harness.journal().events();
    let net: Vec<_> = events.iter().filter(|e| e.starts_with("net:")).collect();
    assert_eq!(net, ["net:test:1500ms", "net:enable", "net:disable"]);
}

#[test]
fn device_descriptor_is_a_copy() {
    let harness = ScenarioHarness::boot_with_tokens(&[]);
    let mut copy = harness.device_descriptor().expect("descriptor");
    copy.touchscreen_transform.source_path = String::from("/dev/null");
    assert_eq!(
        harness
            .integration()
            .device_descriptor()
            .touchscreen_transform
            .source_path,
        "/dev/input/event1"
    );
}
