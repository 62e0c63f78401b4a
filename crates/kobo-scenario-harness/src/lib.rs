//! Host-side scenario harness for scripted boot and capability flows.
//!
//! Couples a [`KoboIntegration`] with recording collaborators and an
//! in-memory sysfs so tests can drive it exactly as the windowing runtime
//! would: by identifier, through the capability registry.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use kobo_platform::{
    ids, Capability, Connectivity, DeviceDescriptor, InputFactory, InputHandler,
    IntegrationError, KoboIntegration, MockSysFs, PlatformParams, Rectangle, RefreshMode, Screen,
};

/// Ordered record of collaborator events shared by all recording fakes.
#[derive(Clone, Default)]
pub struct Journal {
    events: Arc<Mutex<Vec<String>>>,
}

impl Journal {
    pub fn record(&self, event: impl Into<String>) {
        lock(&self.events).push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        lock(&self.events).clone()
    }

    /// Position of the first event equal to `event`
    pub fn position(&self, event: &str) -> Option<usize> {
        lock(&self.events).iter().position(|e| e == event)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One completed paint cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paint {
    pub mode: RefreshMode,
    /// `Some` for a manual refresh, `None` for a regular full-screen paint
    pub region: Option<Rectangle>,
    /// Framebuffer generation that was put on the panel
    pub generation: u64,
}

#[derive(Default)]
struct PanelState {
    initialized: bool,
    shut_down: bool,
    active_mode: RefreshMode,
    requested_mode: Option<RefreshMode>,
    committed_generation: u64,
    paints: Vec<Paint>,
}

/// Handle onto the state of a [`RecordingScreen`] that outlives the box
/// handed to the integration.
#[derive(Clone, Default)]
pub struct PanelHandle {
    state: Arc<Mutex<PanelState>>,
}

impl PanelHandle {
    /// Commit new framebuffer content, as the backing store would.
    pub fn commit_frame(&self) -> u64 {
        let mut state = lock(&self.state);
        state.committed_generation += 1;
        state.committed_generation
    }

    /// Run one regular paint cycle. A requested mode change applies here.
    pub fn paint(&self) -> Paint {
        let mut state = lock(&self.state);
        if let Some(mode) = state.requested_mode.take() {
            state.active_mode = mode;
        }
        let paint = Paint {
            mode: state.active_mode,
            region: None,
            generation: state.committed_generation,
        };
        state.paints.push(paint);
        paint
    }

    pub fn paints(&self) -> Vec<Paint> {
        lock(&self.state).paints.clone()
    }

    /// Mode the panel is currently painting with
    pub fn active_mode(&self) -> RefreshMode {
        lock(&self.state).active_mode
    }

    pub fn is_initialized(&self) -> bool {
        lock(&self.state).initialized
    }

    pub fn is_shut_down(&self) -> bool {
        lock(&self.state).shut_down
    }
}

/// Screen fake modelling deferred mode changes and immediate manual refresh
pub struct RecordingScreen {
    panel: PanelHandle,
    journal: Journal,
    fail_initialize: bool,
}

impl RecordingScreen {
    pub fn new(panel: PanelHandle, journal: Journal) -> Self {
        Self {
            panel,
            journal,
            fail_initialize: false,
        }
    }

    /// A screen whose framebuffer cannot be opened
    pub fn failing(panel: PanelHandle, journal: Journal) -> Self {
        Self {
            fail_initialize: true,
            ..Self::new(panel, journal)
        }
    }
}

impl Screen for RecordingScreen {
    fn initialize(&mut self) -> bool {
        self.journal.record("screen:initialize");
        if self.fail_initialize {
            return false;
        }
        lock(&self.panel.state).initialized = true;
        true
    }

    fn set_partial_refresh_mode(&self, mode: RefreshMode) {
        self.journal.record(format!("screen:mode:{}", mode.as_str()));
        lock(&self.panel.state).requested_mode = Some(mode);
    }

    fn do_manual_refresh(&self, region: Rectangle) {
        self.journal.record("screen:manual-refresh");
        let mut state = lock(&self.panel.state);
        let paint = Paint {
            mode: state.active_mode,
            region: Some(region),
            generation: state.committed_generation,
        };
        state.paints.push(paint);
    }

    fn shutdown(&self) {
        self.journal.record("screen:shutdown");
        lock(&self.panel.state).shut_down = true;
    }
}

/// Input manager fake that journals its own teardown
pub struct RecordingInputHandler {
    name: String,
    journal: Journal,
}

impl InputHandler for RecordingInputHandler {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for RecordingInputHandler {
    fn drop(&mut self) {
        self.journal.record(format!("input:drop:{}", self.name));
    }
}

/// Input factory fake recording the arguments it was given
pub struct RecordingInput {
    journal: Journal,
}

impl RecordingInput {
    pub fn new(journal: Journal) -> Self {
        Self { journal }
    }
}

impl InputFactory for RecordingInput {
    fn create_touch_manager(&mut self, spec: &str) -> Box<dyn InputHandler> {
        self.journal.record(format!("input:touch:{spec}"));
        Box::new(RecordingInputHandler {
            name: String::from("EvdevTouch"),
            journal: self.journal.clone(),
        })
    }

    fn create_button_manager(&mut self, device: &str, debug: bool) -> Box<dyn InputHandler> {
        self.journal
            .record(format!("input:buttons:{device}:debug={debug}"));
        Box::new(RecordingInputHandler {
            name: String::from("KoboButtons"),
            journal: self.journal.clone(),
        })
    }
}

/// Owned runtime collaborator (font database, services) that journals its
/// own teardown
pub struct RecordingCollaborator {
    pub name: &'static str,
    journal: Journal,
}

impl RecordingCollaborator {
    pub fn new(name: &'static str, journal: Journal) -> Self {
        Self { name, journal }
    }
}

impl Drop for RecordingCollaborator {
    fn drop(&mut self) {
        self.journal.record(format!("collaborator:drop:{}", self.name));
    }
}

/// Connectivity fake with a scripted reachability answer
pub struct RecordingConnectivity {
    journal: Journal,
    online: bool,
}

impl RecordingConnectivity {
    pub fn new(journal: Journal, online: bool) -> Self {
        Self { journal, online }
    }
}

impl Connectivity for RecordingConnectivity {
    fn test_internet_connection(&self, timeout: Duration) -> bool {
        self.journal
            .record(format!("net:test:{}ms", timeout.as_millis()));
        self.online
    }

    fn enable_wifi_connection(&self) -> bool {
        self.journal.record("net:enable");
        self.online
    }

    fn disable_wifi_connection(&self) {
        self.journal.record("net:disable");
    }
}

/// Scenario configuration
pub struct ScenarioConfig {
    pub params: PlatformParams,
    /// Device code written to the mock version file; `None` leaves it out
    pub device_code: Option<u16>,
    pub screen_fails: bool,
    pub online: bool,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            params: PlatformParams::default(),
            device_code: Some(384),
            screen_fails: false,
            online: true,
        }
    }
}

/// Small helper that couples the integration, mock sysfs and recording fakes.
pub struct ScenarioHarness {
    integration: KoboIntegration,
    sysfs: Arc<MockSysFs>,
    panel: PanelHandle,
    journal: Journal,
}

impl ScenarioHarness {
    /// Boot an integration for `config`.
    pub fn boot(config: ScenarioConfig) -> Result<Self, IntegrationError> {
        let journal = Journal::default();
        let panel = PanelHandle::default();
        let sysfs = Arc::new(MockSysFs::new());
        if let Some(code) = config.device_code {
            sysfs.set_device_code(code);
        }

        let screen = if config.screen_fails {
            RecordingScreen::failing(panel.clone(), journal.clone())
        } else {
            RecordingScreen::new(panel.clone(), journal.clone())
        };

        let integration = KoboIntegration::builder(config.params)
            .screen(Box::new(screen))
            .input(Box::new(RecordingInput::new(journal.clone())))
            .connectivity(Arc::new(RecordingConnectivity::new(
                journal.clone(),
                config.online,
            )))
            .sysfs(sysfs.clone())
            .font_database(Box::new(RecordingCollaborator::new(
                "fonts",
                journal.clone(),
            )))
            .services(Box::new(RecordingCollaborator::new(
                "services",
                journal.clone(),
            )))
            .build()?;
        log::debug!("Scenario booted: {:?}", integration.device_descriptor().model);

        Ok(Self {
            integration,
            sysfs,
            panel,
            journal,
        })
    }

    /// Boot with default config and the given startup tokens.
    pub fn boot_with_tokens(tokens: &[&str]) -> Self {
        Self::boot(ScenarioConfig {
            params: PlatformParams::new(tokens.iter().copied()),
            ..ScenarioConfig::default()
        })
        .expect("scenario boot should succeed")
    }

    pub fn integration(&self) -> &KoboIntegration {
        &self.integration
    }

    pub fn sysfs(&self) -> &MockSysFs {
        &self.sysfs
    }

    pub fn panel(&self) -> &PanelHandle {
        &self.panel
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Tear the integration down and return the journal.
    pub fn shutdown(self) -> Journal {
        let ScenarioHarness {
            integration,
            journal,
            ..
        } = self;
        drop(integration);
        journal
    }

    fn resolve(&self, identifier: &str) -> Option<&Capability> {
        self.integration.resolve(identifier)
    }

    /// `set-frontlight-level`; `false` if unsupported.
    pub fn set_frontlight_level(&self, level: i32, temperature: i32) -> bool {
        match self.resolve(ids::SET_FRONTLIGHT_LEVEL) {
            Some(Capability::SetFrontlightLevel(op)) => {
                op(level, temperature);
                true
            }
            _ => false,
        }
    }

    /// `get-battery-level`
    pub fn battery_level(&self) -> Option<u8> {
        match self.resolve(ids::GET_BATTERY_LEVEL) {
            Some(Capability::GetBatteryLevel(op)) => Some(op()),
            _ => None,
        }
    }

    /// `is-battery-charging`
    pub fn is_battery_charging(&self) -> Option<bool> {
        match self.resolve(ids::IS_BATTERY_CHARGING) {
            Some(Capability::IsBatteryCharging(op)) => Some(op()),
            _ => None,
        }
    }

    /// `set-partial-refresh-mode`
    pub fn set_partial_refresh_mode(&self, mode: RefreshMode) -> bool {
        match self.resolve(ids::SET_PARTIAL_REFRESH_MODE) {
            Some(Capability::SetPartialRefreshMode(op)) => {
                op(mode);
                true
            }
            _ => false,
        }
    }

    /// `do-manual-refresh`
    pub fn do_manual_refresh(&self, region: Rectangle) -> bool {
        match self.resolve(ids::DO_MANUAL_REFRESH) {
            Some(Capability::DoManualRefresh(op)) => {
                op(region);
                true
            }
            _ => false,
        }
    }

    /// `get-device-descriptor`
    pub fn device_descriptor(&self) -> Option<DeviceDescriptor> {
        match self.resolve(ids::GET_DEVICE_DESCRIPTOR) {
            Some(Capability::GetDeviceDescriptor(op)) => Some(op()),
            _ => None,
        }
    }

    /// `test-internet-connection`
    pub fn test_internet_connection(&self, timeout: Duration) -> Option<bool> {
        match self.resolve(ids::TEST_INTERNET_CONNECTION) {
            Some(Capability::TestInternetConnection(op)) => Some(op(timeout)),
            _ => None,
        }
    }

    /// `enable-wifi-connection`
    pub fn enable_wifi_connection(&self) -> Option<bool> {
        match self.resolve(ids::ENABLE_WIFI_CONNECTION) {
            Some(Capability::EnableWifiConnection(op)) => Some(op()),
            _ => None,
        }
    }

    /// `disable-wifi-connection`
    pub fn disable_wifi_connection(&self) -> bool {
        match self.resolve(ids::DISABLE_WIFI_CONNECTION) {
            Some(Capability::DisableWifiConnection(op)) => {
                op();
                true
            }
            _ => false,
        }
    }
}
