//! E-ink refresh mode control.
//!
//! Two sticky states, [`RefreshMode::Full`] and [`RefreshMode::Partial`],
//! changed only by [`RefreshController::set_partial_refresh_mode`]. A manual
//! refresh is orthogonal: it repaints a region immediately (typically to clear
//! partial-refresh ghosting) and leaves the mode alone.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use embedded_graphics::geometry::{Point, Size};
use embedded_graphics::primitives::Rectangle;

use crate::device::ScreenGeometry;
use crate::screen::Screen;

/// Display refresh mode for subsequent paints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshMode {
    /// Complete panel repaint, clears ghosting
    #[default]
    Full,
    /// Repaint changed pixels only
    Partial,
}

impl RefreshMode {
    fn to_raw(self) -> u8 {
        match self {
            RefreshMode::Full => 0,
            RefreshMode::Partial => 1,
        }
    }

    fn from_raw(raw: u8) -> Self {
        match raw {
            1 => RefreshMode::Partial,
            _ => RefreshMode::Full,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RefreshMode::Full => "full",
            RefreshMode::Partial => "partial",
        }
    }
}

/// Refresh state shared by the integration and its capability operations
pub struct RefreshController {
    mode: AtomicU8,
    geometry: ScreenGeometry,
    screen: RwLock<Option<Arc<dyn Screen>>>,
}

impl RefreshController {
    /// Controller for a panel of `geometry`, starting in [`RefreshMode::Full`].
    ///
    /// `screen` is `None` when initialisation failed; every screen operation
    /// is then a no-op.
    pub fn new(geometry: ScreenGeometry, screen: Option<Arc<dyn Screen>>) -> Self {
        Self {
            mode: AtomicU8::new(RefreshMode::default().to_raw()),
            geometry,
            screen: RwLock::new(screen),
        }
    }

    pub fn mode(&self) -> RefreshMode {
        RefreshMode::from_raw(self.mode.load(Ordering::Acquire))
    }

    pub fn has_screen(&self) -> bool {
        self.screen().is_some()
    }

    /// Select the mode for subsequent paints. Never fails.
    pub fn set_partial_refresh_mode(&self, mode: RefreshMode) {
        let previous = RefreshMode::from_raw(self.mode.swap(mode.to_raw(), Ordering::AcqRel));
        if previous != mode {
            log::debug!("Refresh mode {} -> {}", previous.as_str(), mode.as_str());
        }
        if let Some(screen) = self.screen() {
            screen.set_partial_refresh_mode(mode);
        }
    }

    /// Repaint `region` now, whatever the mode.
    ///
    /// The region is clipped to the panel; an empty result or a missing
    /// screen makes this a no-op.
    pub fn do_manual_refresh(&self, region: Rectangle) {
        let Some(screen) = self.screen() else {
            log::debug!("Manual refresh ignored: no screen");
            return;
        };
        let Some(clipped) = clip_to(&region, &self.geometry.bounds()) else {
            log::debug!("Manual refresh ignored: {:?} is off screen", region);
            return;
        };
        screen.do_manual_refresh(clipped);
    }

    /// Drop the screen handle; later refresh requests become no-ops.
    pub fn detach_screen(&self) -> Option<Arc<dyn Screen>> {
        self.screen
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    fn screen(&self) -> Option<Arc<dyn Screen>> {
        self.screen
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

// Far corners are computed in i64; `Rectangle::intersection` overflows on
// regions reaching past i32::MAX.
fn clip_to(region: &Rectangle, panel: &Rectangle) -> Option<Rectangle> {
    let edges = |r: &Rectangle| {
        let left = i64::from(r.top_left.x);
        let top = i64::from(r.top_left.y);
        (
            left,
            top,
            left + i64::from(r.size.width),
            top + i64::from(r.size.height),
        )
    };
    let (left, top, right, bottom) = edges(region);
    let (panel_left, panel_top, panel_right, panel_bottom) = edges(panel);

    let left = left.max(panel_left);
    let top = top.max(panel_top);
    let right = right.min(panel_right);
    let bottom = bottom.min(panel_bottom);
    if right <= left || bottom <= top {
        return None;
    }

    Some(Rectangle::new(
        Point::new(i32::try_from(left).ok()?, i32::try_from(top).ok()?),
        Size::new(
            u32::try_from(right - left).ok()?,
            u32::try_from(bottom - top).ok()?,
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Calls {
        modes: Mutex<Vec<RefreshMode>>,
        regions: Mutex<Vec<Rectangle>>,
    }

    struct FakeScreen(Arc<Calls>);

    impl Screen for FakeScreen {
        fn initialize(&mut self) -> bool {
            true
        }

        fn set_partial_refresh_mode(&self, mode: RefreshMode) {
            self.0.modes.lock().unwrap().push(mode);
        }

        fn do_manual_refresh(&self, region: Rectangle) {
            self.0.regions.lock().unwrap().push(region);
        }
    }

    const GEOMETRY: ScreenGeometry = ScreenGeometry {
        width: 800,
        height: 600,
        dpi: 167,
    };

    fn controller() -> (RefreshController, Arc<Calls>) {
        let calls = Arc::new(Calls::default());
        let screen: Arc<dyn Screen> = Arc::new(FakeScreen(calls.clone()));
        (RefreshController::new(GEOMETRY, Some(screen)), calls)
    }

    #[test]
    fn starts_in_full_mode() {
        let (controller, _) = controller();
        assert_eq!(controller.mode(), RefreshMode::Full);
    }

    #[test]
    fn mode_is_sticky_and_forwarded() {
        let (controller, calls) = controller();
        controller.set_partial_refresh_mode(RefreshMode::Partial);
        assert_eq!(controller.mode(), RefreshMode::Partial);
        assert_eq!(controller.mode(), RefreshMode::Partial);
        assert_eq!(*calls.modes.lock().unwrap(), vec![RefreshMode::Partial]);
    }

    #[test]
    fn manual_refresh_keeps_mode() {
        let (controller, calls) = controller();
        controller.set_partial_refresh_mode(RefreshMode::Partial);
        let region = Rectangle::new(Point::new(10, 20), Size::new(100, 50));
        controller.do_manual_refresh(region);
        assert_eq!(controller.mode(), RefreshMode::Partial);
        assert_eq!(*calls.regions.lock().unwrap(), vec![region]);
    }

    #[test]
    fn manual_refresh_is_clipped_to_panel() {
        let (controller, calls) = controller();
        controller.do_manual_refresh(Rectangle::new(Point::new(700, 500), Size::new(400, 400)));
        assert_eq!(
            *calls.regions.lock().unwrap(),
            vec![Rectangle::new(Point::new(700, 500), Size::new(100, 100))]
        );
    }

    #[test]
    fn oversized_region_is_clipped_without_overflow() {
        let (controller, calls) = controller();
        controller.do_manual_refresh(Rectangle::new(
            Point::new(10, 10),
            Size::new(u32::MAX, u32::MAX),
        ));
        controller.do_manual_refresh(Rectangle::new(
            Point::new(i32::MIN, i32::MIN),
            Size::new(u32::MAX, u32::MAX),
        ));
        assert_eq!(
            *calls.regions.lock().unwrap(),
            vec![
                Rectangle::new(Point::new(10, 10), Size::new(790, 590)),
                Rectangle::new(Point::new(0, 0), Size::new(800, 600)),
            ]
        );
    }

    #[test]
    fn region_near_i32_max_is_off_screen() {
        let (controller, calls) = controller();
        controller.do_manual_refresh(Rectangle::new(
            Point::new(i32::MAX - 5, 0),
            Size::new(100, 100),
        ));
        assert!(calls.regions.lock().unwrap().is_empty());
    }

    #[test]
    fn off_screen_refresh_is_dropped() {
        let (controller, calls) = controller();
        controller.do_manual_refresh(Rectangle::new(Point::new(-50, -50), Size::new(10, 10)));
        assert!(calls.regions.lock().unwrap().is_empty());
    }

    #[test]
    fn without_screen_everything_is_a_no_op() {
        let controller = RefreshController::new(GEOMETRY, None);
        controller.set_partial_refresh_mode(RefreshMode::Partial);
        controller.do_manual_refresh(GEOMETRY.bounds());
        assert_eq!(controller.mode(), RefreshMode::Partial);
        assert!(!controller.has_screen());
    }

    #[test]
    fn detached_screen_gets_no_more_calls() {
        let (controller, calls) = controller();
        assert!(controller.detach_screen().is_some());
        controller.do_manual_refresh(GEOMETRY.bounds());
        assert!(calls.regions.lock().unwrap().is_empty());
    }
}
