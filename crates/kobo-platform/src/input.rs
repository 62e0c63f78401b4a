//! Input manager collaborators.
//!
//! The evdev touch and button managers are provided by the runtime; the
//! integration creates them with the calibrated arguments and owns them
//! until shutdown.

/// A running input manager. Dropping it stops the manager.
pub trait InputHandler: Send + Sync {
    fn name(&self) -> &str;
}

/// Creates the runtime's input managers
pub trait InputFactory {
    /// Touch manager reading the flat evdev spec, e.g.
    /// `/dev/input/event1:rotate=90:invertx`.
    fn create_touch_manager(&mut self, spec: &str) -> Box<dyn InputHandler>;

    /// Hardware button manager on `device`.
    fn create_button_manager(&mut self, device: &str, debug: bool) -> Box<dyn InputHandler>;
}
