use kobo_platform::{PlatformCapability, Point, Rectangle, RefreshMode, Size};
use kobo_scenario_harness::{RecordingCollaborator, ScenarioConfig, ScenarioHarness};

fn region() -> Rectangle {
    Rectangle::new(Point::new(100, 200), Size::new(300, 150))
}

#[test]
fn manual_refresh_does_not_change_mode() {
    let harness = ScenarioHarness::boot_with_tokens(&[]);
    assert_eq!(harness.integration().refresh_mode(), RefreshMode::Full);

    assert!(harness.set_partial_refresh_mode(RefreshMode::Partial));
    assert!(harness.do_manual_refresh(region()));
    assert_eq!(harness.integration().refresh_mode(), RefreshMode::Partial);
}

#[test]
fn mode_change_applies_on_next_paint() {
    let harness = ScenarioHarness::boot_with_tokens(&[]);
    let panel = harness.panel();

    panel.commit_frame();
    assert_eq!(panel.paint().mode, RefreshMode::Full);

    harness.set_partial_refresh_mode(RefreshMode::Partial);
    // nothing repainted retroactively
    assert_eq!(panel.paints().len(), 1);
    assert_eq!(panel.active_mode(), RefreshMode::Full);

    assert_eq!(panel.paint().mode, RefreshMode::Partial);
    assert_eq!(panel.paint().mode, RefreshMode::Partial);
}

#[test]
fn manual_refresh_repaints_committed_frame_immediately() {
    let harness = ScenarioHarness::boot_with_tokens(&[]);
    let panel = harness.panel();

    let generation = panel.commit_frame();
    harness.do_manual_refresh(region());

    let paints = panel.paints();
    assert_eq!(paints.len(), 1);
    assert_eq!(paints[0].region, Some(region()));
    assert_eq!(paints[0].generation, generation);
}

#[test]
fn manual_refresh_is_clipped_to_the_panel() {
    // Libra H2O panel: 1680x1264
    let harness = ScenarioHarness::boot_with_tokens(&[]);
    harness.do_manual_refresh(Rectangle::new(Point::new(1600, 1200), Size::new(500, 500)));
    assert_eq!(
        harness.panel().paints()[0].region,
        Some(Rectangle::new(Point::new(1600, 1200), Size::new(80, 64)))
    );
}

#[test]
fn oversized_manual_refresh_is_clipped_not_fatal() {
    let harness = ScenarioHarness::boot_with_tokens(&[]);
    assert!(harness.do_manual_refresh(Rectangle::new(
        Point::new(10, 10),
        Size::new(u32::MAX, u32::MAX)
    )));
    assert!(harness.do_manual_refresh(Rectangle::new(
        Point::new(i32::MAX - 5, 0),
        Size::new(100, 100)
    )));
    assert_eq!(
        harness.panel().paints()[..],
        [kobo_scenario_harness::Paint {
            mode: RefreshMode::Full,
            region: Some(Rectangle::new(Point::new(10, 10), Size::new(1670, 1254))),
            generation: 0,
        }]
    );
}

#[test]
fn failed_screen_still_boots_and_refresh_is_a_no_op() {
    let harness = ScenarioHarness::boot(ScenarioConfig {
        screen_fails: true,
        ..ScenarioConfig::default()
    })
    .expect("boot continues without a screen");

    assert!(!harness.integration().has_screen());
    assert!(!harness.panel().is_initialized());

    assert!(harness.do_manual_refresh(region()));
    assert!(harness.set_partial_refresh_mode(RefreshMode::Partial));
    assert!(harness.panel().paints().is_empty());
    assert_eq!(harness.integration().refresh_mode(), RefreshMode::Partial);

    // input managers were still created
    assert_eq!(harness.integration().input_handlers().count(), 2);
}

#[test]
fn teardown_runs_in_reverse_order() {
    let harness = ScenarioHarness::boot_with_tokens(&[]);
    let panel = harness.panel().clone();
    let journal = harness.shutdown();

    let buttons = journal.position("input:drop:KoboButtons").expect("buttons dropped");
    let touch = journal.position("input:drop:EvdevTouch").expect("touch dropped");
    let screen = journal.position("screen:shutdown").expect("screen shut down");
    let services = journal
        .position("collaborator:drop:services")
        .expect("services dropped");
    let fonts = journal
        .position("collaborator:drop:fonts")
        .expect("font database dropped");
    assert!(buttons < touch);
    assert!(touch < screen);
    assert!(screen < services);
    assert!(services < fonts);
    assert!(panel.is_shut_down());
}

#[test]
fn owned_collaborators_are_reachable_until_shutdown() {
    let harness = ScenarioHarness::boot_with_tokens(&[]);
    let fonts = harness
        .integration()
        .font_database()
        .and_then(|db| db.downcast_ref::<RecordingCollaborator>())
        .expect("font database handed over");
    assert_eq!(fonts.name, "fonts");
    assert!(harness.integration().services().is_some());
    assert!(harness.journal().position("collaborator:drop:fonts").is_none());
}

#[test]
fn platform_capabilities() {
    let harness = ScenarioHarness::boot_with_tokens(&[]);
    let integration = harness.integration();
    assert!(integration.has_capability(PlatformCapability::ThreadedPixmaps));
    assert!(!integration.has_capability(PlatformCapability::WindowManagement));
}
