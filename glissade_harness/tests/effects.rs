// Copyright 2026 the Glissade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tilt, parallax, reveal, count-up and viewport-binding scenarios.

use std::cell::Cell;
use std::rc::Rc;

use kurbo::{Point, Rect, Vec2};

use glissade_core::count_up::{CountPhase, CountUpConfig};
use glissade_core::host::{ElementId, IntersectionEntry, ListenTarget, Listener};
use glissade_core::observe::{BindingPhase, ObserveOptions};
use glissade_core::parallax::{ParallaxAxis, ParallaxConfig};
use glissade_core::reveal::RevealConfig;
use glissade_core::smoothing::SmoothingFactor;
use glissade_core::tilt::{TiltConfig, TiltPhase};
use glissade_core::time::Duration;
use glissade_core::trace::{EffectKind, EffectOutcome, ObserverTransition, SkipReason};
use glissade_harness::{Capabilities, EventLog, SimHost, Simulation};

const CARD: ElementId = ElementId(1);
const HERO: ElementId = ElementId(2);
const STAT: ElementId = ElementId(3);

fn page() -> Simulation<EventLog> {
    let mut host = SimHost::new();
    host.set_rect(CARD, Rect::new(0.0, 0.0, 200.0, 200.0));
    host.set_rect(HERO, Rect::new(0.0, 600.0, 1280.0, 800.0));
    host.set_rect(STAT, Rect::new(0.0, 1200.0, 300.0, 1300.0));
    Simulation::with_sink(host, EventLog::new())
}

fn live_page() -> Simulation<EventLog> {
    let mut sim = page();
    sim.ready("/");
    sim
}

fn assert_offset(sim: &Simulation<EventLog>, element: ElementId, expected: f64) {
    let (axis, offset) = sim.host().parallax(element).expect("offset presented");
    assert_eq!(axis, ParallaxAxis::Y, "vertical by default");
    assert!((offset - expected).abs() < 1e-9, "offset {offset}, expected {expected}");
}

fn counter() -> (Rc<Cell<u32>>, impl FnMut(ElementId) + 'static) {
    let count = Rc::new(Cell::new(0));
    let inner = Rc::clone(&count);
    (count, move |_| inner.set(inner.get() + 1))
}

// -- Tilt -----------------------------------------------------------------

#[test]
fn tilt_converges_monotonically_without_overshoot() {
    for damping in [0.05, 0.18, 0.5, 0.9] {
        let mut sim = live_page();
        let config = TiltConfig::default()
            .with_max_angle(10.0)
            .with_damping(SmoothingFactor::new(damping));
        let tilt = sim.engine_mut().bind_tilt(CARD, config);
        sim.engine_mut()
            .pointer_move(CARD, Point::new(100.0, 0.0));
        assert_eq!(
            sim.engine().tilts().target(tilt),
            Some(Vec2::new(10.0, 0.0)),
            "top edge centre tilts fully about x"
        );

        let mut previous = 0.0;
        let taken = sim.run_until(400, |e| {
            let angle = e.tilts().angles(tilt).unwrap().x;
            assert!(angle >= previous, "damping {damping}: {angle} < {previous}");
            assert!(angle <= 10.0, "damping {damping}: overshoot to {angle}");
            previous = angle;
            angle == 10.0
        });
        assert!(taken.is_some(), "damping {damping} never converged");
    }
}

#[test]
fn tilt_settles_in_expected_frames_and_returns_to_neutral() {
    let mut sim = live_page();
    let tilt = sim
        .engine_mut()
        .bind_tilt(CARD, TiltConfig::default().with_max_angle(10.0));
    sim.engine_mut()
        .pointer_move(CARD, Point::new(100.0, 0.0));

    // 10 · 0.82ⁿ < 0.001 needs n ≥ 47.
    let taken = sim
        .run_until(200, |e| e.tilts().angles(tilt) == Some(Vec2::new(10.0, 0.0)))
        .unwrap();
    assert!((46..=48).contains(&taken), "took {taken} frames");
    let presented = sim.host().tilt(CARD).unwrap();
    assert_eq!(presented.rotate_x, 10.0, "presenter saw the settled angle");
    assert_eq!(presented.perspective, 900.0, "default perspective");

    sim.engine_mut().pointer_leave(CARD);
    sim.run_until(200, |e| e.tilts().angles(tilt) == Some(Vec2::ZERO))
        .expect("leave returns to neutral");
    let writes = sim.host().tilt_writes();
    sim.run(5);
    assert_eq!(sim.host().tilt_writes(), writes, "settled tilts stop writing");
}

#[test]
fn hidden_tab_freezes_tilt_mid_flight() {
    let mut sim = live_page();
    let tilt = sim
        .engine_mut()
        .bind_tilt(CARD, TiltConfig::default().with_max_angle(10.0));
    sim.engine_mut()
        .pointer_move(CARD, Point::new(100.0, 0.0));
    sim.run(2);
    let frozen = sim.engine().tilts().angles(tilt).unwrap().x;
    assert!((frozen - 3.276).abs() < 1e-9, "two damped frames: {frozen}");

    sim.set_hidden(true);
    assert!(!sim.engine().clock().is_running(), "clock stops when hidden");
    assert_eq!(sim.host().pending_frames(), 0, "no frame outstanding");
    assert_eq!(sim.step(), 0, "nothing delivered while hidden");
    sim.run(10);
    assert_eq!(
        sim.engine().tilts().angles(tilt).unwrap().x,
        frozen,
        "no effect advances while hidden"
    );

    sim.set_hidden(false);
    sim.step();
    let resumed = sim.engine().tilts().angles(tilt).unwrap().x;
    let expected = frozen + (10.0 - frozen) * 0.18;
    assert!(
        (resumed - expected).abs() < 1e-9,
        "resumes from the frozen angle: {resumed} vs {expected}"
    );
}

#[test]
fn reduced_motion_mounts_tilt_static() {
    let mut host = SimHost::new();
    host.set_rect(CARD, Rect::new(0.0, 0.0, 200.0, 200.0));
    host.set_prefers_reduced_motion(true);
    let mut sim = Simulation::with_sink(host, EventLog::new());
    sim.ready("/");

    let tilt = sim
        .engine_mut()
        .bind_tilt(CARD, TiltConfig::default().with_max_angle(10.0));
    assert_eq!(
        sim.engine().tilts().phase(tilt),
        Some(TiltPhase::Static(SkipReason::ReducedMotion)),
        "parked"
    );
    assert_eq!(sim.host().listeners_of(Listener::PointerMove), 0, "no pointer listener");

    sim.engine_mut()
        .pointer_move(CARD, Point::new(100.0, 0.0));
    sim.run(20);
    assert_eq!(sim.engine().tilts().angles(tilt), Some(Vec2::ZERO), "stays neutral");
    assert_eq!(sim.host().tilt(CARD), None, "nothing presented");
    assert_eq!(
        sim.sink().outcomes(EffectKind::Tilt).last(),
        Some(EffectOutcome::Skipped(SkipReason::ReducedMotion)),
        "skip reported"
    );
}

#[test]
fn reduced_motion_toggle_parks_and_restores_tilt() {
    let mut sim = live_page();
    let tilt = sim
        .engine_mut()
        .bind_tilt(CARD, TiltConfig::default().with_max_angle(10.0));
    sim.engine_mut()
        .pointer_move(CARD, Point::new(100.0, 0.0));
    sim.run(5);

    sim.set_reduced_motion(true);
    assert_eq!(
        sim.engine().tilts().phase(tilt),
        Some(TiltPhase::Static(SkipReason::ReducedMotion)),
        "parked on preference change"
    );
    assert_eq!(sim.host().tilt(CARD), None, "transform cleared");
    assert!(!sim.engine().clock().is_running(), "clock stops for reduced motion");
    assert!(
        !sim.host()
            .is_listening(ListenTarget::Element(CARD), Listener::PointerMove),
        "pointer listener released"
    );

    sim.set_reduced_motion(false);
    assert_eq!(sim.engine().tilts().phase(tilt), Some(TiltPhase::Tracking), "re-attached");
    assert!(
        sim.host()
            .is_listening(ListenTarget::Element(CARD), Listener::PointerMove),
        "pointer listener back"
    );
    assert!(sim.engine().clock().is_running(), "clock back");
}

#[test]
fn tilt_without_geometry_or_listeners_degrades() {
    let mut sim = live_page();
    let missing = sim
        .engine_mut()
        .bind_tilt(ElementId(99), TiltConfig::default());
    assert_eq!(
        sim.engine().tilts().phase(missing),
        Some(TiltPhase::Static(SkipReason::InvalidTarget)),
        "no element, no tilt"
    );

    let mut host = SimHost::with_capabilities(Capabilities::NONE);
    host.set_rect(CARD, Rect::new(0.0, 0.0, 200.0, 200.0));
    let mut sim = Simulation::with_sink(host, EventLog::new());
    sim.ready("/");
    let tilt = sim.engine_mut().bind_tilt(CARD, TiltConfig::default());
    assert_eq!(
        sim.engine().tilts().phase(tilt),
        Some(TiltPhase::Static(SkipReason::Unavailable)),
        "no event primitive"
    );
    assert_eq!(sim.engine().clock().subscriber_count(), 1, "only the scroll controller");
}

#[test]
fn rebinding_tilt_moves_listeners() {
    let mut sim = live_page();
    sim.host_mut()
        .set_rect(ElementId(7), Rect::new(300.0, 0.0, 500.0, 200.0));
    let tilt = sim.engine_mut().bind_tilt(CARD, TiltConfig::default());
    sim.engine_mut().rebind_tilt(tilt, ElementId(7));

    assert!(
        !sim.host()
            .is_listening(ListenTarget::Element(CARD), Listener::PointerMove),
        "old element released"
    );
    assert!(
        sim.host()
            .is_listening(ListenTarget::Element(ElementId(7)), Listener::PointerMove),
        "new element listened"
    );
    assert_eq!(sim.engine().tilts().element(tilt), Some(ElementId(7)), "moved");
    assert_eq!(sim.engine().clock().subscriber_count(), 2, "one tilt subscription");
}

#[test]
fn tilts_sharing_an_element_keep_listening_after_one_unbinds() {
    let mut sim = live_page();
    let config = TiltConfig::default().with_max_angle(10.0);
    let first = sim.engine_mut().bind_tilt(CARD, config);
    let second = sim.engine_mut().bind_tilt(CARD, config);
    let pointer = ListenTarget::Element(CARD);
    assert_eq!(
        sim.host().registrations(pointer, Listener::PointerMove),
        2,
        "both instances hold the pointer listener"
    );

    sim.engine_mut().unbind_tilt(first);
    assert!(
        sim.host().is_listening(pointer, Listener::PointerMove),
        "survivor still hears pointer moves"
    );
    assert!(
        sim.host().is_listening(pointer, Listener::PointerLeave),
        "survivor still hears pointer leaves"
    );

    sim.engine_mut()
        .pointer_move(CARD, Point::new(100.0, 0.0));
    assert_eq!(
        sim.engine().tilts().target(second),
        Some(Vec2::new(10.0, 0.0)),
        "survivor retargets"
    );
    sim.engine_mut().pointer_leave(CARD);
    assert_eq!(
        sim.engine().tilts().target(second),
        Some(Vec2::ZERO),
        "survivor returns to neutral"
    );

    sim.engine_mut().unbind_tilt(second);
    assert!(
        !sim.host().is_listening(pointer, Listener::PointerMove),
        "released with the last instance"
    );
    assert!(
        !sim.host().is_listening(pointer, Listener::PointerLeave),
        "leave listener released too"
    );
}

// -- Parallax -------------------------------------------------------------

#[test]
fn parallax_flushes_once_without_the_clock() {
    let mut sim = page();
    let handle = sim
        .engine_mut()
        .bind_parallax(HERO, ParallaxConfig::default());
    assert!(!sim.engine().clock().is_running(), "not ready yet");
    assert_eq!(sim.host().pending_frames(), 1, "one-shot flush requested");
    assert_eq!(sim.host().parallax(HERO), None, "nothing before the frame");

    sim.step();
    // Centre at 700 of an 800 px viewport: (0.875 - 0.5) · 0.2 · 100.
    assert_offset(&sim, HERO, 7.5);
    assert_eq!(
        sim.engine().parallax().offset(handle),
        sim.host().parallax(HERO).map(|(_, o)| o),
        "stored"
    );
    assert_eq!(sim.host().pending_frames(), 0, "one-shot does not repeat");

    sim.host_mut()
        .set_rect(HERO, Rect::new(0.0, 200.0, 1280.0, 400.0));
    sim.user_scroll(400.0);
    sim.user_scroll(410.0);
    assert_eq!(sim.host().pending_frames(), 1, "scroll bursts coalesce into one flush");
    sim.step();
    assert_offset(&sim, HERO, -2.5);
}

#[test]
fn parallax_rides_the_running_clock() {
    let mut sim = live_page();
    sim.engine_mut()
        .bind_parallax(HERO, ParallaxConfig::default().with_intensity(0.4));
    assert_eq!(sim.host().pending_frames(), 1, "no second loop beside the clock");
    sim.step();
    assert_offset(&sim, HERO, 15.0);

    let writes = sim.host().parallax_writes();
    sim.user_scroll(10.0);
    sim.step();
    assert_eq!(sim.host().parallax_writes(), writes, "unchanged offsets are not rewritten");
}

#[test]
fn parallax_offsets_are_clamped() {
    let mut sim = live_page();
    sim.host_mut()
        .set_rect(HERO, Rect::new(0.0, 3000.0, 1280.0, 3200.0));
    sim.engine_mut()
        .bind_parallax(HERO, ParallaxConfig::default());
    sim.step();
    // Clamped to intensity · 100.
    assert_offset(&sim, HERO, 20.0);
}

#[test]
fn parallax_shares_one_pair_of_window_listeners() {
    let mut sim = live_page();
    let a = sim.engine_mut().bind_parallax(HERO, ParallaxConfig::default());
    let b = sim.engine_mut().bind_parallax(STAT, ParallaxConfig::default());
    assert_eq!(sim.host().listeners_of(Listener::Scroll), 1, "one scroll listener");
    assert_eq!(sim.host().listeners_of(Listener::Resize), 1, "one resize listener");

    sim.engine_mut().unbind_parallax(a);
    assert_eq!(sim.host().listeners_of(Listener::Scroll), 1, "still tracking one");
    sim.engine_mut().unbind_parallax(b);
    assert_eq!(sim.host().listeners_of(Listener::Scroll), 0, "released with the last");
    assert_eq!(sim.host().parallax(STAT), None, "offset cleared");
}

// -- Reveal ---------------------------------------------------------------

#[test]
fn reveal_waits_for_its_threshold() {
    let mut sim = live_page();
    let reveal = sim.engine_mut().bind_reveal(STAT, RevealConfig::default());
    assert!(sim.host().prepared(STAT).is_some(), "pre-reveal state applied");
    assert_eq!(sim.engine().is_revealed(reveal), Some(false), "hidden");

    assert_eq!(sim.intersect(STAT, 0.1), 1, "observed");
    assert_eq!(sim.engine().is_revealed(reveal), Some(false), "below 15%");

    sim.intersect(STAT, 0.2);
    assert_eq!(sim.engine().is_revealed(reveal), Some(true), "revealed");
    assert!(sim.host().is_revealed(STAT), "presenter revealed");
    assert_eq!(sim.host().observation_count(), 0, "observation released");

    assert_eq!(sim.intersect(STAT, 1.0), 0, "no longer observed");
}

#[test]
fn reveal_is_immediate_under_reduced_motion_or_without_observers() {
    let mut host = SimHost::new();
    host.set_rect(STAT, Rect::new(0.0, 1200.0, 300.0, 1300.0));
    host.set_prefers_reduced_motion(true);
    let mut sim = Simulation::with_sink(host, EventLog::new());
    sim.ready("/");
    let reveal = sim.engine_mut().bind_reveal(STAT, RevealConfig::default());
    assert_eq!(sim.engine().is_revealed(reveal), Some(true), "reduced motion shows content");
    assert_eq!(sim.host().observation_count(), 0, "never observed");

    let mut host = SimHost::with_capabilities(Capabilities {
        intersection: false,
        ..Capabilities::FULL
    });
    host.set_rect(STAT, Rect::new(0.0, 1200.0, 300.0, 1300.0));
    let mut sim = Simulation::with_sink(host, EventLog::new());
    sim.ready("/");
    let reveal = sim.engine_mut().bind_reveal(STAT, RevealConfig::default());
    assert_eq!(sim.engine().is_revealed(reveal), Some(true), "content never stuck hidden");
    assert_eq!(
        sim.sink().outcomes(EffectKind::Reveal).last(),
        Some(EffectOutcome::Skipped(SkipReason::Unavailable)),
        "degradation reported"
    );
}

// -- Count-up -------------------------------------------------------------

#[test]
fn count_up_lands_exactly_on_target() {
    let mut sim = live_page();
    let handle = sim.engine_mut().bind_count_up(
        STAT,
        1234,
        CountUpConfig {
            duration: Duration::from_millis(1000),
        },
    );
    sim.engine_mut().start_count_up(handle);
    assert_eq!(sim.host().count(STAT), Some(0), "starts at zero");
    assert_eq!(sim.engine().clock().subscriber_count(), 2, "subscribed");

    let mut previous = 0;
    sim.run_until(200, |e| {
        let value = e.counters().value(handle).unwrap();
        assert!(value >= previous, "count went backwards");
        previous = value;
        e.counters().phase(handle) == Some(CountPhase::Finished)
    })
    .expect("count-up finishes");
    assert_eq!(sim.host().count(STAT), Some(1234), "exact target");
    assert_eq!(sim.engine().clock().subscriber_count(), 1, "subscription dropped");
}

#[test]
fn stopped_count_up_keeps_its_value() {
    let mut sim = live_page();
    let handle = sim
        .engine_mut()
        .bind_count_up(STAT, 500, CountUpConfig::default());
    sim.engine_mut().start_count_up(handle);
    sim.run(30);
    sim.engine_mut().stop_count_up(handle);
    let held = sim.engine().counters().value(handle).unwrap();
    assert!(held > 0 && held < 500, "mid-way at {held}");
    sim.run(30);
    assert_eq!(sim.engine().counters().value(handle), Some(held), "held");
    assert_eq!(sim.engine().counters().phase(handle), Some(CountPhase::Stopped), "stopped");
}

#[test]
fn reduced_motion_lands_running_count_ups() {
    let mut sim = live_page();
    let handle = sim
        .engine_mut()
        .bind_count_up(STAT, 80, CountUpConfig::default());
    sim.engine_mut().start_count_up(handle);
    sim.run(3);
    sim.set_reduced_motion(true);
    assert_eq!(sim.host().count(STAT), Some(80), "landed");
    assert_eq!(sim.engine().counters().phase(handle), Some(CountPhase::Finished), "finished");
}

// -- Viewport bindings ----------------------------------------------------

#[test]
fn once_binding_fires_exactly_once() {
    let mut sim = live_page();
    let (entered, on_enter) = counter();
    let handle = sim.engine_mut().observe(
        Some(HERO),
        ObserveOptions::new().threshold(0.5).on_enter(on_enter),
    );
    assert_eq!(sim.host().observation_count(), 1, "observed");

    sim.intersect(HERO, 0.3);
    assert_eq!(entered.get(), 0, "below threshold");
    sim.intersect(HERO, 0.8);
    assert_eq!(entered.get(), 1, "entered");
    assert_eq!(sim.engine().observers().phase(handle), Some(BindingPhase::Retired), "retired");
    assert_eq!(sim.host().observation_count(), 0, "host observation released");

    for ratio in [0.0, 0.9, 0.0, 1.0] {
        sim.intersect(HERO, ratio);
    }
    let stale = IntersectionEntry {
        key: handle,
        element: HERO,
        ratio: 1.0,
        is_intersecting: true,
    };
    sim.engine_mut().intersections(&[stale]);
    assert_eq!(entered.get(), 1, "never again");
    assert_eq!(sim.sink().observer_count(ObserverTransition::Retire), 1, "one retirement");
}

#[test]
fn repeatable_binding_alternates() {
    let mut sim = live_page();
    let (entered, on_enter) = counter();
    let (left, on_leave) = counter();
    sim.engine_mut().observe(
        Some(HERO),
        ObserveOptions::new()
            .once(false)
            .threshold(0.5)
            .on_enter(on_enter)
            .on_leave(on_leave),
    );

    for ratio in [0.8, 0.9, 0.1, 0.0, 0.6, 0.2, 0.7] {
        sim.intersect(HERO, ratio);
    }
    assert_eq!(entered.get(), 3, "three entries");
    assert_eq!(left.get(), 2, "two exits between them");
    assert_eq!(sim.host().observation_count(), 1, "still observed");
}

#[test]
fn missing_element_binding_is_inert_until_rebound() {
    let mut sim = live_page();
    let (entered, on_enter) = counter();
    let handle = sim
        .engine_mut()
        .observe(None, ObserveOptions::new().on_enter(on_enter));
    assert_eq!(sim.engine().observers().phase(handle), Some(BindingPhase::Detached), "inert");
    assert_eq!(
        sim.sink().outcomes(EffectKind::Observer).last(),
        Some(EffectOutcome::Skipped(SkipReason::InvalidTarget)),
        "reported"
    );

    let phase = sim.engine_mut().rebind_observer(handle, Some(HERO));
    assert_eq!(phase, Some(BindingPhase::Pending), "live after rebind");
    sim.intersect(HERO, 1.0);
    assert_eq!(entered.get(), 1, "fires for the new element");
}

#[test]
fn unobserve_is_idempotent() {
    let mut sim = live_page();
    let handle = sim.engine_mut().observe(Some(HERO), ObserveOptions::new());
    assert!(sim.engine_mut().unobserve(handle), "released");
    assert!(!sim.engine_mut().unobserve(handle), "second release is a no-op");
    assert_eq!(sim.host().observation_count(), 0, "nothing left");
    assert_eq!(sim.engine().observers().live_observations(), 0, "registry empty");
}

#[test]
fn destroying_each_effect_releases_everything() {
    let mut sim = live_page();
    let baseline_listeners = sim.host().listener_count();
    assert_eq!(sim.engine().clock().subscriber_count(), 1, "scroll only");

    let tilt = sim.engine_mut().bind_tilt(CARD, TiltConfig::default());
    let parallax = sim
        .engine_mut()
        .bind_parallax(HERO, ParallaxConfig::default());
    let reveal = sim.engine_mut().bind_reveal(STAT, RevealConfig::default());
    let observer = sim.engine_mut().observe(Some(HERO), ObserveOptions::new());
    let count = sim
        .engine_mut()
        .bind_count_up(STAT, 10, CountUpConfig::default());
    sim.engine_mut().start_count_up(count);
    sim.run(3);
    assert!(sim.host().listener_count() > baseline_listeners, "effects listened");
    assert_eq!(sim.host().observation_count(), 2, "reveal and observer");
    assert_eq!(sim.engine().clock().subscriber_count(), 3, "tilt and count-up");

    sim.engine_mut().unbind_tilt(tilt);
    sim.engine_mut().unbind_parallax(parallax);
    sim.engine_mut().unbind_reveal(reveal);
    sim.engine_mut().unobserve(observer);
    sim.engine_mut().unbind_count_up(count);

    assert_eq!(sim.engine().clock().subscriber_count(), 1, "back to scroll only");
    assert_eq!(sim.host().observation_count(), 0, "no observations");
    assert_eq!(sim.host().listener_count(), baseline_listeners, "no element listeners");
    assert_eq!(sim.host().tilt(CARD), None, "tilt cleared");
    assert_eq!(sim.host().prepared(STAT), None, "reveal styling removed");
    assert_eq!(
        sim.sink()
            .effects
            .iter()
            .filter(|(_, o)| *o == EffectOutcome::Destroyed)
            .count(),
        5,
        "each teardown reported"
    );

    // Stale handles are no-ops.
    sim.engine_mut().unbind_tilt(tilt);
    sim.engine_mut().unbind_parallax(parallax);
    sim.engine_mut().unbind_reveal(reveal);
    sim.engine_mut().unbind_count_up(count);
    assert_eq!(sim.engine().tilts().len(), 0, "nothing mounted");
}
