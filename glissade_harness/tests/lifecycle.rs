// Copyright 2026 the Glissade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ready, navigation, visibility and teardown scenarios.

use kurbo::Rect;

use glissade_core::count_up::CountUpConfig;
use glissade_core::host::{ElementId, Host, ListenTarget, Listener};
use glissade_core::lifecycle::{HostSignal, LifecyclePhase, SignalKind};
use glissade_core::observe::ObserveOptions;
use glissade_core::parallax::ParallaxConfig;
use glissade_core::scroll::{ControllerState, ScrollTarget, ScrollToOptions};
use glissade_core::tilt::TiltConfig;
use glissade_core::trace::{ClockTransition, ScrollAction};
use glissade_harness::{Capabilities, EventLog, SimHost, Simulation};

const CARD: ElementId = ElementId(1);
const HERO: ElementId = ElementId(2);

fn sim() -> Simulation<EventLog> {
    let mut host = SimHost::new();
    host.set_rect(CARD, Rect::new(0.0, 0.0, 200.0, 200.0));
    host.set_rect(HERO, Rect::new(0.0, 600.0, 1280.0, 800.0));
    Simulation::with_sink(host, EventLog::new())
}

fn position(sim: &Simulation<EventLog>) -> f64 {
    sim.engine()
        .scroll_controller()
        .map(|c| c.virtual_position())
        .unwrap()
}

fn assert_released(sim: &Simulation<EventLog>) {
    assert_eq!(sim.engine().clock().subscriber_count(), 0, "no frame subscriptions");
    assert_eq!(sim.host().pending_frames(), 0, "no frame requests outstanding");
    assert_eq!(sim.host().listener_count(), 0, "no listeners");
    assert_eq!(sim.host().observation_count(), 0, "no observations");
    assert!(sim.engine().scroll_controller().is_none(), "scroll controller gone");
}

#[test]
fn ready_brings_everything_up() {
    let mut sim = sim();
    sim.ready("/");

    assert_eq!(sim.engine().lifecycle().phase(), LifecyclePhase::Active, "active");
    assert_eq!(
        sim.sink().lifecycle,
        [(LifecyclePhase::Idle, LifecyclePhase::Active, SignalKind::Ready)],
        "one transition"
    );
    assert!(sim.host().manual_restoration(), "scroll restoration taken over");
    for (target, listener) in [
        (ListenTarget::Window, Listener::Wheel),
        (ListenTarget::Document, Listener::AnchorClick),
        (ListenTarget::Document, Listener::VisibilityChange),
        (ListenTarget::Window, Listener::ReducedMotionChange),
    ] {
        assert!(sim.host().is_listening(target, listener), "{listener:?} attached");
    }
    assert_eq!(sim.host().listener_count(), 4, "nothing else");
    assert!(sim.engine().clock().is_running(), "clock running");
    assert_eq!(sim.sink().clock_starts(), 1, "started once");
    assert_eq!(sim.host().scroll_offset(), 0.0, "starts at the top");
}

#[test]
fn second_ready_is_ignored() {
    let mut sim = sim();
    sim.ready("/");
    sim.run(3);
    sim.ready("/again");

    assert_eq!(sim.sink().lifecycle.len(), 1, "no second transition");
    assert_eq!(sim.host().listener_count(), 4, "listeners not duplicated");
    assert_eq!(sim.engine().clock().subscriber_count(), 1, "one scroll subscription");
    assert_eq!(sim.sink().clock_starts(), 1, "clock started once");
    assert_eq!(sim.host().pending_frames(), 1, "a single frame loop");
}

#[test]
fn signals_before_ready_are_ignored() {
    let mut sim = sim();
    sim.signal(HostSignal::NavigationStart);
    sim.signal(HostSignal::NavigationFinish { url: "/about" });
    sim.signal(HostSignal::Teardown);
    sim.set_hidden(true);
    sim.set_hidden(false);

    assert_eq!(sim.engine().lifecycle().phase(), LifecyclePhase::Idle, "still idle");
    assert!(sim.sink().lifecycle.is_empty(), "nothing happened");
    assert_eq!(sim.host().frames_requested(), 0, "no frames");
    assert_eq!(sim.host().listener_count(), 0, "no listeners");
}

#[test]
fn navigation_cancels_scroll_and_resets_to_top() {
    let mut sim = sim();
    sim.ready("/");
    sim.engine_mut()
        .scroll_to(ScrollTarget::Position(500.0), ScrollToOptions::immediate());
    sim.engine_mut()
        .scroll_to(ScrollTarget::Position(2000.0), ScrollToOptions::default());
    sim.run(3);
    let mid = position(&sim);
    assert!(mid > 500.0 && mid < 2000.0, "in flight at {mid}");

    sim.signal(HostSignal::NavigationStart);
    assert_eq!(sim.engine().lifecycle().phase(), LifecyclePhase::Suspended, "suspended");
    assert_eq!(
        sim.engine().scroll_controller().unwrap().state(),
        ControllerState::Paused,
        "scrolling frozen"
    );
    assert!(sim.engine().clock().is_running(), "effects keep their clock");
    let ticks = sim.engine().clock().frame_count();
    sim.run(5);
    assert_eq!(sim.engine().clock().frame_count(), ticks + 5, "clock still ticking");
    assert_eq!(position(&sim), mid, "no scroll progress while suspended");

    sim.signal(HostSignal::NavigationFinish { url: "/about" });
    assert_eq!(sim.engine().lifecycle().phase(), LifecyclePhase::Active, "active again");
    assert_eq!(position(&sim), 0.0, "virtual position reset");
    assert_eq!(sim.engine().scroll_controller().unwrap().target(), None, "target dropped");
    assert_eq!(sim.host().scroll_offset(), 0.0, "native offset reset");

    sim.run(10);
    assert_eq!(sim.host().scroll_offset(), 0.0, "old scroll never resumes");
    assert_eq!(position(&sim), 0.0, "still at the top");
    assert_eq!(
        sim.sink().lifecycle[1..],
        [
            (LifecyclePhase::Active, LifecyclePhase::Suspended, SignalKind::NavigationStart),
            (LifecyclePhase::Suspended, LifecyclePhase::Active, SignalKind::NavigationFinish),
        ],
        "suspend and resume recorded"
    );
}

#[test]
fn navigation_to_a_fragment_keeps_the_browser_position() {
    let mut sim = sim();
    sim.ready("/");
    sim.engine_mut()
        .scroll_to(ScrollTarget::Position(2000.0), ScrollToOptions::default());
    sim.run(3);

    sim.signal(HostSignal::NavigationStart);
    sim.host_mut().user_scroll_to(1500.0);
    let writes = sim.host().scroll_writes().len();
    sim.signal(HostSignal::NavigationFinish { url: "/docs#api" });

    assert_eq!(position(&sim), 1500.0, "adopted the native offset");
    assert_eq!(sim.engine().scroll_controller().unwrap().target(), None, "target dropped");
    sim.run(10);
    assert_eq!(sim.host().scroll_writes().len(), writes, "nothing written");
    assert_eq!(sim.host().scroll_offset(), 1500.0, "browser position kept");
}

#[test]
fn finish_without_start_still_positions() {
    let mut sim = sim();
    sim.ready("/");
    sim.engine_mut()
        .scroll_to(ScrollTarget::Position(900.0), ScrollToOptions::immediate());
    sim.signal(HostSignal::NavigationFinish { url: "/pricing" });
    assert_eq!(sim.engine().lifecycle().phase(), LifecyclePhase::Active, "stays active");
    assert_eq!(sim.host().scroll_offset(), 0.0, "reset to the top");
    assert_eq!(sim.sink().scroll.last(), Some(&(ScrollAction::Jump, 0.0)), "as a jump");
}

#[test]
fn hidden_tab_stops_and_restarts_the_clock() {
    let mut sim = sim();
    sim.ready("/");
    sim.run(2);

    sim.set_hidden(true);
    assert!(!sim.engine().clock().is_running(), "stopped");
    assert_eq!(sim.host().pending_frames(), 0, "request cancelled");
    assert_eq!(
        sim.engine().scroll_controller().unwrap().state(),
        ControllerState::Paused,
        "scroll paused"
    );
    let ticks = sim.engine().clock().frame_count();
    sim.run(10);
    assert_eq!(sim.engine().clock().frame_count(), ticks, "no ticks while hidden");

    sim.set_hidden(false);
    assert!(sim.engine().clock().is_running(), "restarted");
    assert_eq!(
        sim.engine().scroll_controller().unwrap().state(),
        ControllerState::Active,
        "scroll resumed"
    );
    assert_eq!(sim.step(), 1, "ticking again");
    assert_eq!(sim.sink().clock_starts(), 2, "two starts");
    assert_eq!(sim.sink().clock_stops(), 1, "one stop");
}

#[test]
fn suspended_engine_never_starts_the_clock() {
    let mut sim = sim();
    sim.ready("/");
    sim.signal(HostSignal::NavigationStart);
    sim.set_hidden(true);
    assert!(!sim.engine().clock().is_running(), "hidden stops it");

    sim.set_hidden(false);
    assert!(
        !sim.engine().clock().is_running(),
        "visible again, but navigation is still in flight"
    );
    assert_eq!(sim.host().pending_frames(), 0, "nothing requested");

    sim.signal(HostSignal::NavigationFinish { url: "/next" });
    assert!(sim.engine().clock().is_running(), "restarted on completion");
    assert_eq!(
        sim.engine().scroll_controller().unwrap().state(),
        ControllerState::Active,
        "scroll resumed"
    );
}

#[test]
fn clock_refused_a_frame_restarts_after_navigation() {
    let mut sim = sim();
    sim.ready("/");
    sim.host_mut().set_capabilities(Capabilities {
        frames: false,
        ..Capabilities::FULL
    });
    sim.step();
    assert!(!sim.engine().clock().is_running(), "no next frame to wait on");
    assert_eq!(sim.sink().clock_stops(), 1, "the stop is reported");
    assert!(!sim.engine().lifecycle().wants_clock(), "coordinator knows");

    sim.host_mut().set_capabilities(Capabilities::FULL);
    sim.signal(HostSignal::NavigationStart);
    sim.signal(HostSignal::NavigationFinish { url: "/next" });
    assert!(sim.engine().clock().is_running(), "restarted on completion");
    assert_eq!(sim.sink().clock_starts(), 2, "started again");
    assert_eq!(sim.host().pending_frames(), 1, "a single frame loop");
}

#[test]
fn reduced_motion_keeps_the_clock_stopped() {
    let mut host = SimHost::new();
    host.set_prefers_reduced_motion(true);
    let mut sim = Simulation::with_sink(host, EventLog::new());
    sim.ready("/");

    assert!(sim.engine().reduced_motion(), "preference read at ready");
    assert!(!sim.engine().clock().is_running(), "no animation loop");
    assert!(
        sim.engine_mut()
            .scroll_to(ScrollTarget::Position(700.0), ScrollToOptions::default()),
        "programmatic scroll still works"
    );
    assert_eq!(sim.host().scroll_offset(), 700.0, "applied at once");
    assert_eq!(sim.sink().scroll.last(), Some(&(ScrollAction::Jump, 700.0)), "as a jump");

    sim.set_reduced_motion(false);
    assert!(sim.engine().clock().is_running(), "animation allowed again");
}

#[test]
fn reduced_motion_lands_a_scroll_in_flight() {
    let mut sim = sim();
    sim.ready("/");
    sim.engine_mut()
        .scroll_to(ScrollTarget::Position(1600.0), ScrollToOptions::default());
    sim.run(4);
    sim.set_reduced_motion(true);
    assert_eq!(sim.host().scroll_offset(), 1600.0, "landed on the target");
    assert_eq!(sim.engine().scroll_controller().unwrap().target(), None, "following");
}

#[test]
fn teardown_releases_everything() {
    let mut sim = sim();
    sim.ready("/");
    sim.run(5);
    sim.signal(HostSignal::Teardown);

    assert_eq!(sim.engine().lifecycle().phase(), LifecyclePhase::Destroyed, "destroyed");
    assert_released(&sim);
    assert_eq!(sim.sink().clock_stops(), 1, "clock stopped");
    assert_eq!(sim.step(), 0, "nothing left to deliver");

    let log = sim.sink().lifecycle.len();
    sim.signal(HostSignal::Teardown);
    assert_eq!(sim.sink().lifecycle.len(), log, "second teardown is a no-op");
}

#[test]
fn repeated_ready_teardown_cycles_do_not_leak() {
    let mut sim = sim();
    for cycle in 0..3 {
        sim.ready("/");
        assert_eq!(
            sim.host().listeners_of(Listener::Wheel),
            1,
            "cycle {cycle}: one wheel listener"
        );
        assert_eq!(
            sim.engine().clock().subscriber_count(),
            1,
            "cycle {cycle}: one scroll subscription"
        );
        assert_eq!(sim.host().pending_frames(), 1, "cycle {cycle}: one frame loop");
        sim.run(3);
        sim.signal(HostSignal::Teardown);
        assert_released(&sim);
    }
    assert_eq!(sim.sink().clock_starts(), 3, "one start per cycle");
    assert_eq!(sim.sink().clock_stops(), 3, "one stop per cycle");
}

#[test]
fn unbind_all_after_teardown_leaves_nothing_behind() {
    let mut sim = sim();
    sim.ready("/");
    sim.engine_mut().bind_tilt(CARD, TiltConfig::default());
    sim.engine_mut()
        .bind_parallax(HERO, ParallaxConfig::default());
    sim.engine_mut().observe(Some(HERO), ObserveOptions::new());
    let count = sim
        .engine_mut()
        .bind_count_up(HERO, 10, CountUpConfig::default());
    sim.engine_mut().start_count_up(count);
    sim.run(3);

    sim.signal(HostSignal::Teardown);
    assert!(sim.engine().clock().subscriber_count() > 0, "effects outlive the page runtime");

    sim.engine_mut().unbind_all();
    assert_released(&sim);
    assert!(sim.engine().tilts().is_empty(), "tilts gone");
    assert!(sim.engine().parallax().is_empty(), "parallax gone");
    assert!(sim.engine().counters().is_empty(), "count-ups gone");
    assert!(sim.engine().observers().is_empty(), "bindings gone");
}

#[test]
fn missing_primitives_degrade_quietly() {
    let mut sim = Simulation::with_sink(
        SimHost::with_capabilities(Capabilities::NONE),
        EventLog::new(),
    );
    sim.ready("/");

    assert_eq!(sim.engine().lifecycle().phase(), LifecyclePhase::Active, "still active");
    assert_eq!(
        sim.sink().clock,
        [ClockTransition::Unavailable],
        "clock could not start"
    );
    assert!(!sim.engine().clock().is_running(), "not running");
    assert_eq!(sim.host().listener_count(), 0, "nothing attached");
    assert!(
        sim.engine_mut()
            .scroll_to(ScrollTarget::Position(300.0), ScrollToOptions::immediate()),
        "immediate scrolls still land"
    );
    assert_eq!(sim.host().scroll_offset(), 300.0, "written");

    sim.signal(HostSignal::Teardown);
    assert_released(&sim);
}
