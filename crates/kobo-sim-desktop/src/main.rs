//! Desktop simulator for the Kobo platform integration.
//!
//! Boots the integration against an in-memory (or on-disk) sysfs with
//! logging stand-ins for the screen and input managers, then walks every
//! capability once.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use kobo_platform::{
    ids, Capability, HostSysFs, InputFactory, InputHandler, KoboIntegration, MockSysFs,
    PlatformParams, Point, Rectangle, RefreshMode, Screen, Size, SysFs,
};

#[derive(Parser, Debug)]
#[command(name = "kobo-sim", about = "Boot the Kobo platform integration on a desktop")]
struct Args {
    /// Platform string, e.g. `kobo:touchscreen_rotate=90:debug`
    #[arg(long, default_value = "kobo")]
    platform: String,

    /// Device code written to the simulated version file
    #[arg(long, default_value_t = 384)]
    device_code: u16,

    /// Read sysfs from this directory instead of an in-memory tree
    #[arg(long)]
    sysroot: Option<String>,

    /// Make the screen fail to initialize
    #[arg(long)]
    fail_screen: bool,

    /// Simulated battery capacity in percent
    #[arg(long, default_value_t = 80)]
    battery: u8,

    /// Report the battery as charging
    #[arg(long)]
    charging: bool,
}

struct LogScreen {
    fail: bool,
}

impl Screen for LogScreen {
    fn initialize(&mut self) -> bool {
        log::info!("screen: initialize");
        !self.fail
    }

    fn set_partial_refresh_mode(&self, mode: RefreshMode) {
        log::info!("screen: refresh mode {}", mode.as_str());
    }

    fn do_manual_refresh(&self, region: Rectangle) {
        log::info!("screen: manual refresh {:?}", region);
    }

    fn shutdown(&self) {
        log::info!("screen: shutdown");
    }
}

struct LogHandler(&'static str);

impl InputHandler for LogHandler {
    fn name(&self) -> &str {
        self.0
    }
}

impl Drop for LogHandler {
    fn drop(&mut self) {
        log::info!("input: {} closed", self.0);
    }
}

struct LogInput;

impl InputFactory for LogInput {
    fn create_touch_manager(&mut self, spec: &str) -> Box<dyn InputHandler> {
        log::info!("input: touch {}", spec);
        Box::new(LogHandler("EvdevTouch"))
    }

    fn create_button_manager(&mut self, device: &str, debug: bool) -> Box<dyn InputHandler> {
        log::info!("input: buttons {} (debug: {})", device, debug);
        Box::new(LogHandler("KoboButtons"))
    }
}

fn simulated_sysfs(args: &Args) -> Arc<dyn SysFs> {
    if let Some(root) = &args.sysroot {
        return Arc::new(HostSysFs::new(root));
    }

    let fs = MockSysFs::with_device_code(args.device_code);
    for supply in ["mc13892_bat", "battery"] {
        fs.add_file(
            &format!("/sys/class/power_supply/{supply}/capacity"),
            &args.battery.to_string(),
        );
        let status = if args.charging { "Charging" } else { "Discharging" };
        fs.add_file(&format!("/sys/class/power_supply/{supply}/status"), status);
    }
    Arc::new(fs)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let params = PlatformParams::from_spec(&args.platform);

    let default_filter = if params.tokens().iter().any(|t| t.contains("debug")) {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let integration = KoboIntegration::builder(params)
        .screen(Box::new(LogScreen {
            fail: args.fail_screen,
        }))
        .input(Box::new(LogInput))
        .sysfs(simulated_sysfs(&args))
        .build()?;

    let descriptor = integration.device_descriptor();
    println!("Kobo Platform Simulator");
    println!("  Device:   {} (code {})", descriptor.name, descriptor.code);
    println!(
        "  Screen:   {}x{} @ {} dpi",
        descriptor.screen.width, descriptor.screen.height, descriptor.screen.dpi
    );
    println!("  Touch:    {}", integration.evdev_touch_spec());
    println!("  Buttons:  {}", descriptor.buttons_device);
    println!("  Screen up: {}", integration.has_screen());

    exercise(&integration);
    Ok(())
}

fn exercise(integration: &KoboIntegration) {
    for identifier in ids::ALL {
        match integration.resolve(identifier) {
            Some(Capability::SetFrontlightLevel(op)) => op(60, 40),
            Some(Capability::GetBatteryLevel(op)) => println!("  Battery:  {}%", op()),
            Some(Capability::IsBatteryCharging(op)) => println!("  Charging: {}", op()),
            Some(Capability::SetPartialRefreshMode(op)) => op(RefreshMode::Partial),
            Some(Capability::DoManualRefresh(op)) => {
                op(Rectangle::new(Point::new(0, 0), Size::new(200, 100)))
            }
            Some(Capability::GetDeviceDescriptor(op)) => {
                log::debug!("descriptor: {:?}", op());
            }
            Some(Capability::TestInternetConnection(op)) => {
                println!("  Online:   {}", op(Duration::from_secs(2)));
            }
            Some(Capability::EnableWifiConnection(op)) => {
                println!("  Wi-Fi:    {}", op());
            }
            Some(Capability::DisableWifiConnection(op)) => op(),
            None => log::warn!("capability {} not registered", identifier),
        }
    }
}
