// Copyright 2026 the Glissade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Smooth scrolling.
//!
//! [`SmoothScrollController`] keeps a *virtual* scroll position that is
//! distinct from the browser's instantaneous *native* offset. Each frame it
//! moves the virtual position according to its current [`Motion`]:
//!
//! - **Follow**: no programmatic scroll is in flight. The virtual position
//!   eases toward the native offset (so progress indicators glide) and the
//!   controller writes nothing; the user's own scrolling is authoritative.
//! - **Lerp**: exponential approach toward a target:
//!   `virtual += (target − virtual) × factor`, written to the viewport every
//!   frame, arriving when within [`SCROLL_EPSILON`].
//! - **Timed**: an eased sweep from a start position to a target over a
//!   fixed duration.
//!
//! Arrival returns the controller to `Follow`. A new target always replaces
//! the one in flight (last caller wins); nothing is queued.
//!
//! # Run state
//!
//! ```text
//!   Active ◄──► Paused
//!     │           │
//!     └──► Destroyed ◄┘   (terminal: no ticks, no writes)
//! ```
//!
//! Pausing freezes the virtual position and the elapsed time of a timed
//! sweep; resuming continues from the frozen state.
//!
//! Under reduced motion every programmatic scroll is immediate and the
//! virtual position tracks the native offset exactly.

use alloc::vec::Vec;

use crate::host::{ElementId, Host, ListenTarget, Listener};
use crate::smoothing::{Easing, SCROLL_EPSILON, SmoothingFactor, approach, progress};
use crate::time::{Duration, HostTime};
use crate::trace::ScrollAction;

/// Smooth-scroll configuration.
///
/// Two presets are provided; neither is privileged. [`ScrollConfig::lerp`]
/// is pure exponential smoothing, [`ScrollConfig::expo`] runs timed
/// ease-out-expo sweeps.
#[derive(Clone, Copy, Debug)]
pub struct ScrollConfig {
    /// Per-frame interpolation factor for untimed motion.
    pub lerp: SmoothingFactor,
    /// Duration of programmatic and wheel-driven scrolls. `None` means use
    /// [`lerp`](Self::lerp) instead.
    pub duration: Option<Duration>,
    /// Easing curve for timed scrolls.
    pub easing: Easing,
    /// Consume wheel input and animate it.
    pub smooth_wheel: bool,
    /// Consume touch-move input and animate it.
    pub smooth_touch: bool,
    /// Scale applied to wheel deltas.
    pub wheel_multiplier: f64,
    /// Scale applied to touch deltas.
    pub touch_multiplier: f64,
    /// Take over clicks on intra-page anchor links.
    pub intercept_anchors: bool,
    /// Offset added to anchor destinations (e.g. a fixed header height, negated).
    pub anchor_offset: f64,
    /// Duration of anchor scrolls; `None` uses the general motion settings.
    pub anchor_duration: Option<Duration>,
}

impl ScrollConfig {
    /// Exponential smoothing at factor 0.1 for everything.
    #[must_use]
    pub const fn lerp() -> Self {
        Self {
            lerp: SmoothingFactor::new(0.1),
            duration: None,
            easing: Easing::EaseOutExpo,
            smooth_wheel: true,
            smooth_touch: false,
            wheel_multiplier: 1.0,
            touch_multiplier: 2.0,
            intercept_anchors: false,
            anchor_offset: 0.0,
            anchor_duration: None,
        }
    }

    /// 1.2 s ease-out-expo sweeps, with anchor links intercepted and landing
    /// 80 px above their target over 1.5 s.
    #[must_use]
    pub const fn expo() -> Self {
        Self {
            lerp: SmoothingFactor::new(0.1),
            duration: Some(Duration::from_millis(1200)),
            easing: Easing::EaseOutExpo,
            smooth_wheel: true,
            smooth_touch: false,
            wheel_multiplier: 1.0,
            touch_multiplier: 2.0,
            intercept_anchors: true,
            anchor_offset: -80.0,
            anchor_duration: Some(Duration::from_millis(1500)),
        }
    }
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self::expo()
    }
}

/// Where a programmatic scroll should go.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScrollTarget<'a> {
    /// An absolute offset in CSS pixels.
    Position(f64),
    /// The top edge of an element.
    Element(ElementId),
    /// The first element matching a CSS selector.
    Selector(&'a str),
}

/// Per-call overrides for [`SmoothScrollController::scroll_to`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ScrollToOptions {
    /// Added to the resolved destination.
    pub offset: f64,
    /// Sweep duration; overrides the configured one.
    pub duration: Option<Duration>,
    /// Sweep easing; overrides the configured one.
    pub easing: Option<Easing>,
    /// Jump without interpolation.
    pub immediate: bool,
    /// Untimed smoothing factor; takes precedence over any duration.
    pub lerp: Option<SmoothingFactor>,
}

impl ScrollToOptions {
    /// Options for an immediate jump.
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            immediate: true,
            ..Self::default()
        }
    }
}

/// Controller run state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ControllerState {
    /// Consuming frames.
    Active,
    /// Frozen; ticks are ignored.
    Paused,
    /// Terminal; ticks and writes are ignored.
    Destroyed,
}

/// What the virtual position is doing.
#[derive(Clone, Copy, Debug)]
pub enum Motion {
    /// Tracking the native offset without writing.
    Follow,
    /// Exponential approach toward `target`.
    Lerp {
        /// Destination.
        target: f64,
        /// Per-frame factor.
        factor: SmoothingFactor,
    },
    /// Eased sweep from `from` to `target`.
    Timed {
        /// Start position.
        from: f64,
        /// Destination.
        target: f64,
        /// Time spent sweeping so far (excludes pauses).
        elapsed: Duration,
        /// Total sweep time.
        duration: Duration,
        /// Curve.
        easing: Easing,
    },
}

impl Motion {
    /// Pending destination, `None` while following.
    #[must_use]
    pub fn target(&self) -> Option<f64> {
        match *self {
            Self::Follow => None,
            Self::Lerp { target, .. } | Self::Timed { target, .. } => Some(target),
        }
    }
}

/// One observable controller action, reported to the trace sink.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollStep {
    /// What happened.
    pub action: ScrollAction,
    /// Virtual position afterwards.
    pub position: f64,
    /// Pending destination afterwards.
    pub target: Option<f64>,
}

/// Whether an input event was taken over by the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputDisposition {
    /// The controller animates it; the host should suppress native handling.
    Consumed,
    /// Leave it to native scrolling.
    PassThrough,
}

/// The smooth-scroll controller.
#[derive(Debug)]
pub struct SmoothScrollController {
    config: ScrollConfig,
    state: ControllerState,
    virtual_position: f64,
    motion: Motion,
    reduced_motion: bool,
    last_tick: Option<HostTime>,
    listeners: Vec<(ListenTarget, Listener)>,
}

impl SmoothScrollController {
    /// Creates a controller positioned at the current native offset and
    /// attaches the input listeners `config` asks for.
    pub fn initialize<H: Host + ?Sized>(host: &mut H, config: ScrollConfig) -> Self {
        let mut listeners = Vec::new();
        let wanted = [
            (config.smooth_wheel, ListenTarget::Window, Listener::Wheel),
            (config.smooth_touch, ListenTarget::Window, Listener::Touch),
            (config.intercept_anchors, ListenTarget::Document, Listener::AnchorClick),
        ];
        for (enabled, target, listener) in wanted {
            if enabled && host.listen(target, listener) {
                listeners.push((target, listener));
            }
        }
        Self {
            config,
            state: ControllerState::Active,
            virtual_position: host.scroll_offset(),
            motion: Motion::Follow,
            reduced_motion: false,
            last_tick: None,
            listeners,
        }
    }

    /// Advances one frame.
    ///
    /// Returns the write performed, if any.
    pub fn tick<H: Host + ?Sized>(&mut self, host: &mut H, now: HostTime) -> Option<ScrollStep> {
        if self.state != ControllerState::Active {
            return None;
        }
        let dt = self
            .last_tick
            .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
        self.last_tick = Some(now);

        if self.reduced_motion {
            self.motion = Motion::Follow;
            self.virtual_position = host.scroll_offset();
            return None;
        }

        match self.motion {
            Motion::Follow => {
                let native = host.scroll_offset();
                let (next, _) =
                    approach(self.virtual_position, native, self.config.lerp, SCROLL_EPSILON);
                self.virtual_position = next;
                None
            }
            Motion::Lerp { target, factor } => {
                let (next, arrived) =
                    approach(self.virtual_position, target, factor, SCROLL_EPSILON);
                Some(self.write(host, next, arrived))
            }
            Motion::Timed {
                from,
                target,
                elapsed,
                duration,
                easing,
            } => {
                let elapsed = elapsed + dt;
                let p = progress(elapsed.micros(), duration.micros());
                let arrived = p >= 1.0;
                let next = if arrived {
                    target
                } else {
                    from + (target - from) * easing.apply(p)
                };
                if !arrived {
                    self.motion = Motion::Timed {
                        from,
                        target,
                        elapsed,
                        duration,
                        easing,
                    };
                }
                Some(self.write(host, next, arrived))
            }
        }
    }

    /// Starts a programmatic scroll, replacing any in flight.
    ///
    /// Unresolvable element and selector targets are ignored. Destinations
    /// are clamped to the scrollable range.
    pub fn scroll_to<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        target: ScrollTarget<'_>,
        options: ScrollToOptions,
    ) -> Option<ScrollStep> {
        if self.state == ControllerState::Destroyed {
            return None;
        }
        let destination = Self::resolve(host, target)? + options.offset;
        let destination = clamp_scroll(destination, host.max_scroll());
        self.adopt_native_if_following(host);

        if options.immediate || self.reduced_motion {
            self.motion = Motion::Follow;
            self.virtual_position = destination;
            host.set_scroll_offset(destination);
            return Some(self.step(ScrollAction::Jump));
        }

        self.motion = if let Some(factor) = options.lerp {
            Motion::Lerp {
                target: destination,
                factor,
            }
        } else if let Some(duration) = options.duration.or(self.config.duration) {
            Motion::Timed {
                from: self.virtual_position,
                target: destination,
                elapsed: Duration::ZERO,
                duration,
                easing: options.easing.unwrap_or(self.config.easing),
            }
        } else {
            Motion::Lerp {
                target: destination,
                factor: self.config.lerp,
            }
        };
        Some(self.step(ScrollAction::Retarget))
    }

    /// Handles vertical wheel input of `delta` CSS pixels that originated at
    /// `origin`.
    pub fn wheel<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        delta: f64,
        origin: Option<ElementId>,
    ) -> (InputDisposition, Option<ScrollStep>) {
        if !self.config.smooth_wheel {
            return (InputDisposition::PassThrough, None);
        }
        self.nudge(host, delta * self.config.wheel_multiplier, origin)
    }

    /// Handles vertical touch-move input of `delta` CSS pixels.
    pub fn touch<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        delta: f64,
        origin: Option<ElementId>,
    ) -> (InputDisposition, Option<ScrollStep>) {
        if !self.config.smooth_touch {
            return (InputDisposition::PassThrough, None);
        }
        self.nudge(host, delta * self.config.touch_multiplier, origin)
    }

    /// Handles a click on a link with the given `href`.
    ///
    /// Only `#fragment` links are taken over, and only when the fragment
    /// resolves to an element.
    pub fn anchor_click<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        href: &str,
    ) -> (InputDisposition, Option<ScrollStep>) {
        if !self.config.intercept_anchors
            || self.state != ControllerState::Active
            || !href.starts_with('#')
            || href.len() < 2
        {
            return (InputDisposition::PassThrough, None);
        }
        let Some(element) = host.query_selector(href) else {
            return (InputDisposition::PassThrough, None);
        };
        let options = ScrollToOptions {
            offset: self.config.anchor_offset,
            duration: self.config.anchor_duration,
            easing: Some(self.config.easing),
            ..ScrollToOptions::default()
        };
        let step = self.scroll_to(host, ScrollTarget::Element(element), options);
        (InputDisposition::Consumed, step)
    }

    /// Freezes the controller. No-op unless active.
    pub fn pause(&mut self) {
        if self.state == ControllerState::Active {
            self.state = ControllerState::Paused;
            self.last_tick = None;
        }
    }

    /// Unfreezes the controller. No-op unless paused.
    pub fn resume(&mut self) {
        if self.state == ControllerState::Paused {
            self.state = ControllerState::Active;
            self.last_tick = None;
        }
    }

    /// Releases listeners and makes the controller inert. Idempotent.
    pub fn destroy<H: Host + ?Sized>(&mut self, host: &mut H) {
        if self.state == ControllerState::Destroyed {
            return;
        }
        for (target, listener) in self.listeners.drain(..) {
            host.unlisten(target, listener);
        }
        self.motion = Motion::Follow;
        self.state = ControllerState::Destroyed;
    }

    /// Cancels any scroll in flight and jumps to the top.
    pub fn reset_to_top<H: Host + ?Sized>(&mut self, host: &mut H) -> Option<ScrollStep> {
        if self.state == ControllerState::Destroyed {
            return None;
        }
        self.motion = Motion::Follow;
        self.virtual_position = 0.0;
        host.set_scroll_offset(0.0);
        Some(self.step(ScrollAction::Jump))
    }

    /// Cancels any scroll in flight and adopts the native offset, leaving
    /// the browser's own positioning (e.g. fragment navigation) in place.
    pub fn sync_to_native<H: Host + ?Sized>(&mut self, host: &H) {
        if self.state == ControllerState::Destroyed {
            return;
        }
        self.motion = Motion::Follow;
        self.virtual_position = host.scroll_offset();
    }

    /// Applies a reduced-motion preference. Enabling it lands any scroll in
    /// flight on its target immediately.
    pub fn set_reduced_motion<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        reduce: bool,
    ) -> Option<ScrollStep> {
        self.reduced_motion = reduce;
        if !reduce || self.state == ControllerState::Destroyed {
            return None;
        }
        let step = self.motion.target().map(|target| {
            host.set_scroll_offset(target);
            self.virtual_position = target;
            self.motion = Motion::Follow;
            self.step(ScrollAction::Jump)
        });
        if step.is_none() {
            self.virtual_position = host.scroll_offset();
        }
        step
    }

    /// Scroll progress through the page in `[0, 1]`; 0 when nothing can
    /// scroll.
    #[must_use]
    pub fn progress<H: Host + ?Sized>(&self, host: &H) -> f64 {
        let max = host.max_scroll();
        if max <= 0.0 {
            return 0.0;
        }
        (self.virtual_position / max).clamp(0.0, 1.0)
    }

    /// The interpolated scroll offset.
    #[must_use]
    pub fn virtual_position(&self) -> f64 {
        self.virtual_position
    }

    /// Pending programmatic destination; `None` while following.
    #[must_use]
    pub fn target(&self) -> Option<f64> {
        self.motion.target()
    }

    /// Current motion.
    #[must_use]
    pub fn motion(&self) -> Motion {
        self.motion
    }

    /// Run state.
    #[must_use]
    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &ScrollConfig {
        &self.config
    }

    /// Number of host listeners held.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn resolve<H: Host + ?Sized>(host: &mut H, target: ScrollTarget<'_>) -> Option<f64> {
        let element = match target {
            ScrollTarget::Position(y) => return y.is_finite().then_some(y),
            ScrollTarget::Element(element) => element,
            ScrollTarget::Selector(selector) => host.query_selector(selector)?,
        };
        let rect = host.element_rect(element)?;
        Some(host.scroll_offset() + rect.y0)
    }

    fn nudge<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        delta: f64,
        origin: Option<ElementId>,
    ) -> (InputDisposition, Option<ScrollStep>) {
        if self.state != ControllerState::Active
            || self.reduced_motion
            || !delta.is_finite()
            || origin.is_some_and(|e| host.prevents_smooth_scroll(e))
        {
            return (InputDisposition::PassThrough, None);
        }
        self.adopt_native_if_following(host);
        let base = self.motion.target().unwrap_or(self.virtual_position);
        let step = self.scroll_to(
            host,
            ScrollTarget::Position(base + delta),
            ScrollToOptions::default(),
        );
        (InputDisposition::Consumed, step)
    }

    /// While following, the virtual position trails the native offset; a
    /// new motion starts from where the page actually is.
    fn adopt_native_if_following<H: Host + ?Sized>(&mut self, host: &H) {
        if matches!(self.motion, Motion::Follow) {
            self.virtual_position = host.scroll_offset();
        }
    }

    fn write<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        position: f64,
        arrived: bool,
    ) -> ScrollStep {
        self.virtual_position = position;
        host.set_scroll_offset(position);
        if arrived {
            self.motion = Motion::Follow;
            self.step(ScrollAction::Arrived)
        } else {
            self.step(ScrollAction::Step)
        }
    }

    fn step(&self, action: ScrollAction) -> ScrollStep {
        ScrollStep {
            action,
            position: self.virtual_position,
            target: self.motion.target(),
        }
    }
}

fn clamp_scroll(position: f64, max: f64) -> f64 {
    position.clamp(0.0, max.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Rect;

    struct Page {
        offset: f64,
        max: f64,
        writes: Vec<f64>,
        listeners: Vec<(ListenTarget, Listener)>,
    }

    impl Default for Page {
        fn default() -> Self {
            Self {
                offset: 0.0,
                max: 5000.0,
                writes: Vec::new(),
                listeners: Vec::new(),
            }
        }
    }

    impl Host for Page {
        fn scroll_offset(&self) -> f64 {
            self.offset
        }

        fn set_scroll_offset(&mut self, offset: f64) {
            self.offset = offset;
            self.writes.push(offset);
        }

        fn max_scroll(&self) -> f64 {
            self.max
        }

        fn element_rect(&self, element: ElementId) -> Option<Rect> {
            (element == ElementId(7)).then(|| {
                let top = 1200.0 - self.offset;
                Rect::new(0.0, top, 100.0, top + 50.0)
            })
        }

        fn query_selector(&mut self, selector: &str) -> Option<ElementId> {
            (selector == "#pricing").then_some(ElementId(7))
        }

        fn prevents_smooth_scroll(&self, element: ElementId) -> bool {
            element == ElementId(99)
        }

        fn listen(&mut self, target: ListenTarget, listener: Listener) -> bool {
            self.listeners.push((target, listener));
            true
        }

        fn unlisten(&mut self, target: ListenTarget, listener: Listener) {
            self.listeners.retain(|l| *l != (target, listener));
        }
    }

    fn frames(ctl: &mut SmoothScrollController, host: &mut Page, n: usize) {
        for i in 0..n {
            let t = HostTime(i as u64 * 16_667);
            ctl.tick(host, t);
        }
    }

    #[test]
    fn presets_differ_only_in_configuration() {
        let lerp = ScrollConfig::lerp();
        let expo = ScrollConfig::expo();
        assert!(lerp.duration.is_none());
        assert_eq!(expo.duration, Some(Duration::from_millis(1200)));
        assert_eq!(expo.anchor_offset, -80.0);
    }

    #[test]
    fn immediate_scroll_writes_before_any_tick() {
        let mut host = Page::default();
        let mut ctl = SmoothScrollController::initialize(&mut host, ScrollConfig::lerp());
        let step = ctl.scroll_to(
            &mut host,
            ScrollTarget::Position(900.0),
            ScrollToOptions::immediate(),
        );
        assert_eq!(step.map(|s| s.action), Some(ScrollAction::Jump));
        assert_eq!(host.offset, 900.0);
        assert_eq!(host.writes, alloc::vec![900.0], "zero intermediate frames");
        assert_eq!(ctl.target(), None);
    }

    #[test]
    fn lerp_converges_within_bounded_ticks() {
        let mut host = Page::default();
        let mut ctl = SmoothScrollController::initialize(&mut host, ScrollConfig::lerp());
        ctl.scroll_to(&mut host, ScrollTarget::Position(2000.0), ScrollToOptions::default());
        let mut ticks = 0;
        while ctl.target().is_some() {
            ctl.tick(&mut host, HostTime(ticks * 16_667));
            ticks += 1;
            assert!(ticks < 200, "factor 0.1 must arrive well within 200 ticks");
        }
        assert_eq!(host.offset, 2000.0, "arrival is exact");
        assert_eq!(ctl.virtual_position(), 2000.0);
    }

    #[test]
    fn second_scroll_replaces_the_first() {
        let mut host = Page::default();
        let mut ctl = SmoothScrollController::initialize(&mut host, ScrollConfig::lerp());
        ctl.scroll_to(&mut host, ScrollTarget::Position(2000.0), ScrollToOptions::default());
        frames(&mut ctl, &mut host, 5);
        ctl.scroll_to(&mut host, ScrollTarget::Position(100.0), ScrollToOptions::default());
        assert_eq!(ctl.target(), Some(100.0), "last caller wins");
        for i in 0..300 {
            ctl.tick(&mut host, HostTime(i * 16_667));
        }
        assert_eq!(host.offset, 100.0, "no averaging with the abandoned target");
    }

    #[test]
    fn destinations_are_clamped() {
        let mut host = Page::default();
        let mut ctl = SmoothScrollController::initialize(&mut host, ScrollConfig::lerp());
        ctl.scroll_to(&mut host, ScrollTarget::Position(99_999.0), ScrollToOptions::immediate());
        assert_eq!(host.offset, 5000.0);
        ctl.scroll_to(&mut host, ScrollTarget::Position(-50.0), ScrollToOptions::immediate());
        assert_eq!(host.offset, 0.0);
    }

    #[test]
    fn timed_scroll_lands_on_duration() {
        let mut host = Page::default();
        let mut ctl = SmoothScrollController::initialize(&mut host, ScrollConfig::expo());
        ctl.scroll_to(&mut host, ScrollTarget::Position(1000.0), ScrollToOptions::default());
        ctl.tick(&mut host, HostTime(0));
        ctl.tick(&mut host, HostTime(600_000));
        assert!(host.offset > 900.0 && host.offset < 1000.0, "expo is front-loaded");
        let step = ctl.tick(&mut host, HostTime(1_200_000));
        assert_eq!(step.map(|s| s.action), Some(ScrollAction::Arrived));
        assert_eq!(host.offset, 1000.0);
    }

    #[test]
    fn pause_freezes_and_resume_continues() {
        let mut host = Page::default();
        let mut ctl = SmoothScrollController::initialize(&mut host, ScrollConfig::expo());
        ctl.scroll_to(&mut host, ScrollTarget::Position(1000.0), ScrollToOptions::default());
        ctl.tick(&mut host, HostTime(0));
        ctl.tick(&mut host, HostTime(100_000));
        let frozen = host.offset;
        ctl.pause();
        assert!(ctl.tick(&mut host, HostTime(200_000)).is_none());
        assert_eq!(host.offset, frozen);
        ctl.resume();
        // The first tick after resuming contributes no elapsed time.
        ctl.tick(&mut host, HostTime(9_000_000));
        assert_eq!(host.offset, frozen, "resume does not snap");
        ctl.tick(&mut host, HostTime(9_016_667));
        assert!(host.offset > frozen);
    }

    #[test]
    fn destroyed_controller_is_inert() {
        let mut host = Page::default();
        let mut ctl = SmoothScrollController::initialize(&mut host, ScrollConfig::expo());
        assert_eq!(host.listeners.len(), 2, "wheel + anchor");
        ctl.destroy(&mut host);
        ctl.destroy(&mut host);
        assert!(host.listeners.is_empty());
        let step = ctl.scroll_to(
            &mut host,
            ScrollTarget::Position(10.0),
            ScrollToOptions::immediate(),
        );
        assert!(step.is_none(), "destroyed controller ignores scroll requests");
        assert!(ctl.tick(&mut host, HostTime(0)).is_none());
        assert!(host.writes.is_empty(), "no DOM writes after destroy");
    }

    #[test]
    fn wheel_accumulates_onto_pending_target() {
        let mut host = Page::default();
        let mut ctl = SmoothScrollController::initialize(&mut host, ScrollConfig::lerp());
        let (d, _) = ctl.wheel(&mut host, 100.0, None);
        assert_eq!(d, InputDisposition::Consumed);
        ctl.wheel(&mut host, 100.0, None);
        assert_eq!(ctl.target(), Some(200.0));
        let (d, _) = ctl.wheel(&mut host, 100.0, Some(ElementId(99)));
        assert_eq!(d, InputDisposition::PassThrough, "nested scroller keeps native wheel");
    }

    #[test]
    fn anchor_click_lands_offset_above_target() {
        let mut host = Page::default();
        let mut ctl = SmoothScrollController::initialize(&mut host, ScrollConfig::expo());
        let (d, _) = ctl.anchor_click(&mut host, "#pricing");
        assert_eq!(d, InputDisposition::Consumed);
        assert_eq!(ctl.target(), Some(1120.0));
        assert_eq!(ctl.anchor_click(&mut host, "#").0, InputDisposition::PassThrough);
        assert_eq!(ctl.anchor_click(&mut host, "#missing").0, InputDisposition::PassThrough);
        assert_eq!(ctl.anchor_click(&mut host, "/about").0, InputDisposition::PassThrough);
    }

    #[test]
    fn reduced_motion_forces_immediate_and_tracks_native() {
        let mut host = Page::default();
        let mut ctl = SmoothScrollController::initialize(&mut host, ScrollConfig::lerp());
        ctl.scroll_to(&mut host, ScrollTarget::Position(1500.0), ScrollToOptions::default());
        ctl.set_reduced_motion(&mut host, true);
        assert_eq!(host.offset, 1500.0, "in-flight scroll lands immediately");
        ctl.scroll_to(&mut host, ScrollTarget::Position(300.0), ScrollToOptions::default());
        assert_eq!(host.offset, 300.0);
        host.offset = 777.0;
        ctl.tick(&mut host, HostTime(0));
        assert_eq!(ctl.virtual_position(), 777.0, "snaps to native every tick");
        assert_eq!(ctl.wheel(&mut host, 50.0, None).0, InputDisposition::PassThrough);
    }

    #[test]
    fn follow_mode_never_writes() {
        let mut host = Page::default();
        let mut ctl = SmoothScrollController::initialize(&mut host, ScrollConfig::lerp());
        host.offset = 400.0;
        frames(&mut ctl, &mut host, 100);
        assert!(host.writes.is_empty());
        assert_eq!(ctl.virtual_position(), 400.0, "virtual catches up with native");
        assert!((ctl.progress(&host) - 0.08).abs() < 1e-12);
    }

    #[test]
    fn new_motion_starts_from_the_native_offset() {
        let mut host = Page::default();
        let mut ctl = SmoothScrollController::initialize(&mut host, ScrollConfig::expo());
        host.offset = 3000.0;
        frames(&mut ctl, &mut host, 3);
        assert!(ctl.virtual_position() < 3000.0, "virtual still trailing");

        ctl.wheel(&mut host, 100.0, None);
        assert_eq!(ctl.target(), Some(3100.0), "delta applies to where the page is");

        let mut host = Page::default();
        let mut ctl = SmoothScrollController::initialize(&mut host, ScrollConfig::expo());
        host.offset = 3000.0;
        frames(&mut ctl, &mut host, 3);
        ctl.scroll_to(&mut host, ScrollTarget::Position(3500.0), ScrollToOptions::default());
        ctl.tick(&mut host, HostTime(100_000));
        ctl.tick(&mut host, HostTime(116_667));
        assert!(
            host.writes.iter().all(|w| *w >= 3000.0),
            "timed scroll never moves backwards: {:?}",
            host.writes
        );
    }
}
