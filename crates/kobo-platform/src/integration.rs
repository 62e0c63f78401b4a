//! Platform integration lifecycle.
//!
//! [`KoboIntegration`] owns everything device specific: the descriptor, the
//! refresh controller, the power manager, the input managers and the
//! capability registry. The windowing runtime reaches hardware only through
//! [`KoboIntegration::resolve`].

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use crate::capability::{Capability, CapabilityRegistry};
use crate::connectivity::{Connectivity, NoConnectivity};
use crate::device::{detect_device_with, DeviceDescriptor, SharedDescriptor, TouchscreenTransform};
use crate::error::{BuilderError, IntegrationError, RegistryError};
use crate::input::{InputFactory, InputHandler};
use crate::params::PlatformParams;
use crate::power::PowerManager;
use crate::refresh::{RefreshController, RefreshMode};
use crate::screen::Screen;
use crate::sysfs::{HostSysFs, SysFs};
use crate::touch_config::parse_touch_config;

/// Generic runtime features the platform may or may not offer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformCapability {
    /// Pixmaps may be used off the UI thread
    ThreadedPixmaps,
    /// Windows can be moved, resized and decorated
    WindowManagement,
    OpenGL,
    MultipleWindows,
}

/// Runtime-owned collaborator the integration keeps alive but never calls,
/// such as the font database or the desktop services.
pub type Collaborator = Box<dyn Any + Send + Sync>;

/// Builder for [`KoboIntegration`]
///
/// # Example
///
/// ```no_run
/// # use kobo_platform::{InputFactory, KoboIntegration, PlatformParams, Screen};
/// # fn boot(screen: Box<dyn Screen>, input: Box<dyn InputFactory>) {
/// let integration = KoboIntegration::builder(PlatformParams::from_env())
///     .screen(screen)
///     .input(input)
///     .build()
///     .expect("capability table is consistent");
/// # }
/// ```
pub struct IntegrationBuilder {
    params: PlatformParams,
    screen: Option<Box<dyn Screen>>,
    input: Option<Box<dyn InputFactory>>,
    connectivity: Arc<dyn Connectivity>,
    sysfs: Arc<dyn SysFs>,
    font_database: Option<Collaborator>,
    services: Option<Collaborator>,
}

impl IntegrationBuilder {
    fn new(params: PlatformParams) -> Self {
        Self {
            params,
            screen: None,
            input: None,
            connectivity: Arc::new(NoConnectivity),
            sysfs: Arc::new(HostSysFs::device()),
            font_database: None,
            services: None,
        }
    }

    /// Set the framebuffer screen (required)
    pub fn screen(mut self, screen: Box<dyn Screen>) -> Self {
        self.screen = Some(screen);
        self
    }

    /// Set the input manager factory (required)
    pub fn input(mut self, input: Box<dyn InputFactory>) -> Self {
        self.input = Some(input);
        self
    }

    /// Set the Wi-Fi collaborator; defaults to [`NoConnectivity`]
    pub fn connectivity(mut self, connectivity: Arc<dyn Connectivity>) -> Self {
        self.connectivity = connectivity;
        self
    }

    /// Set where device files are read from; defaults to the live device
    pub fn sysfs(mut self, sysfs: Arc<dyn SysFs>) -> Self {
        self.sysfs = sysfs;
        self
    }

    /// Hand over the font database for the integration to own
    pub fn font_database(mut self, font_database: Collaborator) -> Self {
        self.font_database = Some(font_database);
        self
    }

    /// Hand over the desktop services for the integration to own
    pub fn services(mut self, services: Collaborator) -> Self {
        self.services = Some(services);
        self
    }

    /// Detect the device and bring the integration up.
    ///
    /// A screen that fails to initialise is logged and left out; the
    /// integration still boots.
    ///
    /// # Errors
    ///
    /// Returns `IntegrationError::Builder` if a required collaborator is
    /// missing and `IntegrationError::Registry` if a capability identifier is
    /// bound twice.
    pub fn build(self) -> Result<KoboIntegration, IntegrationError> {
        let IntegrationBuilder {
            params,
            screen,
            input,
            connectivity,
            sysfs,
            font_database,
            services,
        } = self;
        let mut screen = screen.ok_or(BuilderError::MissingScreen)?;
        let mut input = input.ok_or(BuilderError::MissingInput)?;

        let defaults = detect_device_with(sysfs.as_ref());
        let touch = parse_touch_config(params.tokens(), &defaults);
        let descriptor = Arc::new(SharedDescriptor::new(
            defaults.clone().with_transform(touch.transform.clone()),
        ));
        if touch.debug {
            log::info!("Platform parameters: {:?}", params.tokens());
            log::info!("Device: {:?}", descriptor.snapshot());
        }

        let screen: Option<Arc<dyn Screen>> = if screen.initialize() {
            log::info!("Screen initialised ({}x{})", defaults.screen.width, defaults.screen.height);
            Some(Arc::from(screen))
        } else {
            log::warn!("kobofb: Failed to initialize screen");
            None
        };
        let refresh = Arc::new(RefreshController::new(defaults.screen, screen.clone()));

        let touch_spec = touch.evdev_spec();
        log::info!("Touch input: {}", touch_spec);
        let touch_manager = input.create_touch_manager(&touch_spec);
        let button_manager = input.create_button_manager(defaults.buttons_device, touch.debug);

        let power = Arc::new(PowerManager::new(sysfs, &defaults));
        let registry = build_registry(&descriptor, &refresh, &power, &connectivity)?;
        log::info!("Registered {} platform capabilities", registry.len());

        Ok(KoboIntegration {
            descriptor,
            refresh,
            screen,
            input_handlers: vec![touch_manager, button_manager],
            registry,
            debug: touch.debug,
            touch_spec,
            font_database,
            services,
        })
    }
}

fn build_registry(
    descriptor: &Arc<SharedDescriptor>,
    refresh: &Arc<RefreshController>,
    power: &Arc<PowerManager>,
    connectivity: &Arc<dyn Connectivity>,
) -> Result<CapabilityRegistry, RegistryError> {
    let mut registry = CapabilityRegistry::new();

    let light = power.clone();
    registry.register(Capability::SetFrontlightLevel(Box::new(move |level, temperature| {
        light.set_frontlight_level(level, temperature)
    })))?;

    let battery = power.clone();
    registry.register(Capability::GetBatteryLevel(Box::new(move || battery.battery_level())))?;

    let charger = power.clone();
    registry.register(Capability::IsBatteryCharging(Box::new(move || {
        charger.is_battery_charging()
    })))?;

    let mode = refresh.clone();
    registry.register(Capability::SetPartialRefreshMode(Box::new(move |value| {
        mode.set_partial_refresh_mode(value)
    })))?;

    let manual = refresh.clone();
    registry.register(Capability::DoManualRefresh(Box::new(move |region| {
        manual.do_manual_refresh(region)
    })))?;

    let device = descriptor.clone();
    registry.register(Capability::GetDeviceDescriptor(Box::new(move || device.snapshot())))?;

    let net = connectivity.clone();
    registry.register(Capability::TestInternetConnection(Box::new(move |timeout: Duration| {
        net.test_internet_connection(timeout)
    })))?;

    let net = connectivity.clone();
    registry.register(Capability::EnableWifiConnection(Box::new(move || {
        net.enable_wifi_connection()
    })))?;

    let net = connectivity.clone();
    registry.register(Capability::DisableWifiConnection(Box::new(move || {
        net.disable_wifi_connection()
    })))?;

    Ok(registry)
}

/// The running platform integration
pub struct KoboIntegration {
    descriptor: Arc<SharedDescriptor>,
    refresh: Arc<RefreshController>,
    screen: Option<Arc<dyn Screen>>,
    // construction order: touch, then buttons
    input_handlers: Vec<Box<dyn InputHandler>>,
    registry: CapabilityRegistry,
    debug: bool,
    touch_spec: String,
    font_database: Option<Collaborator>,
    services: Option<Collaborator>,
}

impl KoboIntegration {
    pub fn builder(params: PlatformParams) -> IntegrationBuilder {
        IntegrationBuilder::new(params)
    }

    /// Look up a hardware operation. `None` means unsupported.
    pub fn resolve(&self, identifier: &str) -> Option<&Capability> {
        self.registry.resolve(identifier)
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    /// Copy of the current device descriptor
    pub fn device_descriptor(&self) -> DeviceDescriptor {
        self.descriptor.snapshot()
    }

    /// Replace the touch transform as a single update.
    ///
    /// Input managers already running keep the spec they were created with.
    pub fn update_touchscreen_transform(&self, transform: TouchscreenTransform) {
        self.descriptor.replace_transform(transform);
    }

    pub fn refresh_mode(&self) -> RefreshMode {
        self.refresh.mode()
    }

    pub fn has_screen(&self) -> bool {
        self.screen.is_some()
    }

    /// Whether `debug` was among the startup parameters
    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// The spec the touch manager was created with
    pub fn evdev_touch_spec(&self) -> &str {
        &self.touch_spec
    }

    pub fn input_handlers(&self) -> impl Iterator<Item = &str> + '_ {
        self.input_handlers.iter().map(|handler| handler.name())
    }

    pub fn font_database(&self) -> Option<&(dyn Any + Send + Sync)> {
        self.font_database.as_deref()
    }

    pub fn services(&self) -> Option<&(dyn Any + Send + Sync)> {
        self.services.as_deref()
    }

    pub fn has_capability(&self, capability: PlatformCapability) -> bool {
        match capability {
            PlatformCapability::ThreadedPixmaps => true,
            PlatformCapability::WindowManagement => false,
            PlatformCapability::OpenGL | PlatformCapability::MultipleWindows => false,
        }
    }
}

impl Drop for KoboIntegration {
    fn drop(&mut self) {
        self.registry.clear();
        while let Some(handler) = self.input_handlers.pop() {
            log::debug!("Stopping input handler {}", handler.name());
            drop(handler);
        }
        self.refresh.detach_screen();
        if let Some(screen) = self.screen.take() {
            screen.shutdown();
            log::info!("Screen removed");
        }
        drop(self.services.take());
        drop(self.font_database.take());
    }
}
