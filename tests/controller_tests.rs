use std::cell::RefCell;
use std::rc::Rc;

use buildlamp::ci::{BuildState, CiError, EventKind, Subscription};
use buildlamp::{Controller, ControllerError, Indicators, LampColor, Uid};
use buildlamp_testing::{build, event, repository, FakeCi, VirtualBrickBus, VirtualLcd, VirtualRelay};

const RELAY: Uid = Uid(100);
const LCD: Uid = Uid(200);
const SLUG: &str = "octo/lamp";

fn virtual_bus() -> Rc<RefCell<VirtualBrickBus>> {
    Rc::new(RefCell::new(VirtualBrickBus::new(
        vec![VirtualRelay::new(RELAY)],
        vec![VirtualLcd::new(LCD)],
    )))
}

fn controller(ci: FakeCi) -> (Rc<RefCell<VirtualBrickBus>>, Controller<FakeCi>) {
    let bus = virtual_bus();
    let indicators = Indicators::new(bus.clone(), RELAY, LCD);
    (bus.clone(), Controller::new(ci, indicators, repository(SLUG), "master"))
}

fn lamp(bus: &Rc<RefCell<VirtualBrickBus>>) -> (bool, bool) {
    bus.borrow().relay(0).state()
}

fn footer(bus: &Rc<RefCell<VirtualBrickBus>>) -> String {
    bus.borrow().lcd(0).line(3)
}

#[test]
fn sync_failed_branch_is_red() {
    let ci = FakeCi::new(repository(SLUG)).with_builds(vec![
        build(3, BuildState::Failed, "master"),
        build(2, BuildState::Passed, "master"),
    ]);
    let (bus, controller) = controller(ci);

    controller.sync().unwrap();

    assert_eq!(LampColor::Red.relay_states(), lamp(&bus));
    assert_eq!("====== FAILED ======", footer(&bus));
    assert!(bus.borrow().lcd(0).line(2).starts_with("Build #3 at"));
}

#[test]
fn sync_passed_branch_is_green() {
    let ci = FakeCi::new(repository(SLUG)).with_builds(vec![
        build(2, BuildState::Passed, "master"),
        build(1, BuildState::Failed, "master"),
    ]);
    let (bus, controller) = controller(ci);

    controller.sync().unwrap();

    assert_eq!(LampColor::Green.relay_states(), lamp(&bus));
    assert_eq!("====== PASSED ======", footer(&bus));
}

#[test]
fn sync_running_after_pass_keeps_green() {
    let ci = FakeCi::new(repository(SLUG)).with_builds(vec![
        build(4, BuildState::Started, "master"),
        build(3, BuildState::Passed, "master"),
    ]);
    let (bus, controller) = controller(ci);

    controller.sync().unwrap();

    assert_eq!(LampColor::Green.relay_states(), lamp(&bus));
    assert_eq!("*** IN PROGRESS ****", footer(&bus));
}

#[test]
fn sync_running_after_failure_follows_running_build() {
    let ci = FakeCi::new(repository(SLUG)).with_builds(vec![
        build(4, BuildState::Started, "master"),
        build(3, BuildState::Failed, "master"),
    ]);
    let (bus, controller) = controller(ci);

    controller.sync().unwrap();

    assert_eq!(LampColor::Yellow.relay_states(), lamp(&bus));
}

#[test]
fn sync_skips_queued_builds_and_other_branches() {
    let ci = FakeCi::new(repository(SLUG)).with_builds(vec![
        build(9, BuildState::Failed, "feature"),
        build(8, BuildState::Queued, "master"),
        build(7, BuildState::Passed, "master"),
    ]);
    let (bus, controller) = controller(ci);

    controller.sync().unwrap();

    assert!(bus.borrow().lcd(0).line(2).starts_with("Build #7 at"));
    assert_eq!(LampColor::Green.relay_states(), lamp(&bus));
}

#[test]
fn sync_without_finished_build_uses_current() {
    let ci = FakeCi::new(repository(SLUG)).with_builds(vec![build(1, BuildState::Started, "master")]);
    let (bus, controller) = controller(ci);

    controller.sync().unwrap();

    assert_eq!(LampColor::Yellow.relay_states(), lamp(&bus));
}

#[test]
fn sync_without_builds_fails() {
    let ci = FakeCi::new(repository(SLUG)).with_builds(vec![build(1, BuildState::Created, "master")]);
    let (bus, controller) = controller(ci);

    let error = controller.sync().unwrap_err();

    assert!(matches!(error, ControllerError::NoBuilds { ref branch } if branch == "master"));
    assert_eq!(0, bus.borrow().request_count());
}

#[test]
fn event_for_other_branch_ignored() {
    let feature = build(5, BuildState::Passed, "feature");
    let ci = FakeCi::new(repository(SLUG)).with_builds(vec![feature.clone(), build(4, BuildState::Failed, "master")]);
    let (bus, controller) = controller(ci);

    controller
        .handle_event(&event(EventKind::BuildFinished, SLUG, feature))
        .unwrap();

    assert_eq!(0, bus.borrow().request_count());
    assert_eq!(0, bus.borrow().lcd(0).clear_count());
}

#[test]
fn finished_event_wins_over_red_history() {
    let passed = build(2, BuildState::Passed, "master");
    let ci = FakeCi::new(repository(SLUG)).with_builds(vec![build(3, BuildState::Failed, "master"), passed.clone()]);
    let (bus, controller) = controller(ci);

    controller
        .handle_event(&event(EventKind::BuildFinished, SLUG, passed))
        .unwrap();

    assert_eq!(LampColor::Green.relay_states(), lamp(&bus));
    assert_eq!("====== PASSED ======", footer(&bus));
}

#[test]
fn started_event_keeps_green_history() {
    let running = build(4, BuildState::Started, "master");
    let ci = FakeCi::new(repository(SLUG)).with_builds(vec![running.clone(), build(3, BuildState::Passed, "master")]);
    let (bus, controller) = controller(ci);

    controller
        .handle_event(&event(EventKind::BuildStarted, SLUG, running))
        .unwrap();

    assert_eq!(LampColor::Green.relay_states(), lamp(&bus));
    assert_eq!("*** IN PROGRESS ****", footer(&bus));
}

#[test]
fn started_event_after_failure_follows_event_build() {
    let running = build(4, BuildState::Started, "master");
    let ci = FakeCi::new(repository(SLUG)).with_builds(vec![running.clone(), build(3, BuildState::Failed, "master")]);
    let (bus, controller) = controller(ci);

    controller
        .handle_event(&event(EventKind::BuildStarted, SLUG, running))
        .unwrap();

    assert_eq!(LampColor::Yellow.relay_states(), lamp(&bus));
}

#[test]
fn started_event_without_history() {
    let running = build(1, BuildState::Started, "master");
    let ci = FakeCi::new(repository(SLUG)).with_builds(vec![running.clone(), build(2, BuildState::Passed, "feature")]);
    let (bus, controller) = controller(ci);

    controller
        .handle_event(&event(EventKind::BuildStarted, SLUG, running))
        .unwrap();

    assert_eq!(LampColor::Yellow.relay_states(), lamp(&bus));
    assert_eq!("*** IN PROGRESS ****", footer(&bus));
}

#[test]
fn event_build_is_refetched() {
    let stale = build(6, BuildState::Started, "master");
    let ci = FakeCi::new(repository(SLUG)).with_builds(vec![build(6, BuildState::Failed, "master")]);
    let (bus, controller) = controller(ci);

    controller
        .handle_event(&event(EventKind::BuildStarted, SLUG, stale))
        .unwrap();

    assert_eq!("====== FAILED ======", footer(&bus));
    assert_eq!(LampColor::Red.relay_states(), lamp(&bus));
}

#[test]
fn event_for_unknown_build_fails() {
    let ci = FakeCi::new(repository(SLUG));
    let (_bus, controller) = controller(ci);

    let error = controller
        .handle_event(&event(EventKind::BuildFinished, SLUG, build(1, BuildState::Passed, "master")))
        .unwrap_err();

    assert!(matches!(error, ControllerError::Ci { source: CiError::BuildNotFound { .. } }));
}

#[test]
fn stream_failure_shuts_down() {
    let ci = FakeCi::new(repository(SLUG))
        .with_builds(vec![build(2, BuildState::Passed, "master")])
        .with_stream_error(CiError::Unauthorized);
    let (bus, mut controller) = controller(ci);

    let error = controller.run(Subscription::new()).unwrap_err();

    assert!(matches!(error, ControllerError::Ci { source: CiError::Unauthorized }));
    assert!(controller.indicators().is_shut_down());

    let bus = bus.borrow();
    assert_eq!(" Client not running ", bus.lcd(0).line(0));
    assert!(bus.lcd(0).lines()[1..].iter().all(|line| line.trim().is_empty()));
    assert_eq!(LampColor::Off.relay_states(), bus.relay(0).state());
    assert!(!bus.is_connected());
}

#[test]
fn subscribe_failure_shuts_down() {
    let ci = FakeCi::new(repository(SLUG))
        .with_builds(vec![build(2, BuildState::Passed, "master")])
        .with_subscribe_error(CiError::Unauthorized);
    let (bus, mut controller) = controller(ci);

    let error = controller.run(Subscription::new()).unwrap_err();

    assert!(matches!(error, ControllerError::Ci { source: CiError::Unauthorized }));
    assert!(!bus.borrow().is_connected());
}

#[test]
fn bootstrap_failure_shuts_down() {
    let ci = FakeCi::new(repository(SLUG));
    let (bus, mut controller) = controller(ci);

    let error = controller.run(Subscription::new()).unwrap_err();

    assert!(matches!(error, ControllerError::NoBuilds { .. }));
    assert_eq!(" Client not running ", bus.borrow().lcd(0).line(0));
    assert!(!bus.borrow().is_connected());
}

#[test]
fn events_handled_in_order_until_stream_closes() {
    let ci = FakeCi::new(repository(SLUG))
        .with_builds(vec![
            build(4, BuildState::Passed, "master"),
            build(3, BuildState::Failed, "master"),
        ])
        .with_event(event(EventKind::BuildStarted, SLUG, build(4, BuildState::Started, "master")))
        .with_event(event(EventKind::BuildFinished, SLUG, build(4, BuildState::Passed, "master")));
    let (bus, mut controller) = controller(ci);

    let error = controller.run(Subscription::new()).unwrap_err();

    assert!(matches!(error, ControllerError::Ci { source: CiError::StreamClosed }));
    // Sync, two events, then the disconnected message.
    assert_eq!(4, bus.borrow().lcd(0).clear_count());
}

#[test]
fn interrupt_shuts_down() {
    let ci = FakeCi::new(repository(SLUG))
        .with_builds(vec![build(2, BuildState::Passed, "master")])
        .with_event(event(EventKind::BuildFinished, SLUG, build(2, BuildState::Passed, "master")));
    let (bus, mut controller) = controller(ci);

    let subscription = Subscription::new();
    subscription.interrupter().interrupt();
    let error = controller.run(subscription).unwrap_err();

    assert!(matches!(error, ControllerError::Ci { source: CiError::Interrupted }));
    // Nothing was synced or subscribed; only the disconnected message and the lamp went out.
    assert_eq!(3, bus.borrow().request_count());
    assert_eq!(1, bus.borrow().lcd(0).clear_count());
    assert_eq!(" Client not running ", bus.borrow().lcd(0).line(0));
    assert!(controller.ci().subscribed_kinds().is_empty());
    assert!(!bus.borrow().is_connected());
}

#[test]
fn subscribes_to_both_event_kinds() {
    let ci = FakeCi::new(repository(SLUG)).with_builds(vec![build(2, BuildState::Passed, "master")]);
    let (_bus, mut controller) = controller(ci);

    let _ = controller.run(Subscription::new());

    assert_eq!(EventKind::ALL.to_vec(), controller.ci().subscribed_kinds());
}

#[test]
fn dropping_indicators_shuts_down() {
    let bus = virtual_bus();
    {
        let indicators = Indicators::new(bus.clone(), RELAY, LCD);
        indicators.lamp().set_green().unwrap();
    }

    let bus = bus.borrow();
    assert_eq!(LampColor::Off.relay_states(), bus.relay(0).state());
    assert_eq!(" Client not running ", bus.lcd(0).line(0));
    assert!(!bus.is_connected());
}

#[test]
fn shut_down_is_best_effort_and_once() {
    // No LCD on the bus, so the disconnected message fails.
    let bus = Rc::new(RefCell::new(VirtualBrickBus::new(vec![VirtualRelay::new(RELAY)], vec![])));
    let mut indicators = Indicators::new(bus.clone(), RELAY, LCD);

    indicators.shut_down();
    indicators.shut_down();

    assert_eq!(LampColor::Off.relay_states(), bus.borrow().relay(0).state());
    assert!(!bus.borrow().is_connected());
    assert_eq!(1, bus.borrow().request_count());
}
