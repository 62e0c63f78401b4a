//! Screen subsystem contract.
//!
//! The framebuffer screen belongs to the windowing runtime. This crate only
//! initialises it, forwards refresh requests to it and shuts it down.

use embedded_graphics::primitives::Rectangle;

use crate::refresh::RefreshMode;

/// E-ink screen implemented by the windowing runtime
///
/// After [`initialize()`](Screen::initialize) the screen is shared with the
/// capability operations, which may call it from any thread.
pub trait Screen: Send + Sync {
    /// Open the framebuffer. Returns `false` if the screen is unusable.
    fn initialize(&mut self) -> bool;

    /// Select the refresh mode used from the next paint cycle on.
    fn set_partial_refresh_mode(&self, mode: RefreshMode);

    /// Repaint `region` from the committed framebuffer content now.
    fn do_manual_refresh(&self, region: Rectangle);

    /// Called once when the integration is torn down.
    fn shutdown(&self) {}
}
