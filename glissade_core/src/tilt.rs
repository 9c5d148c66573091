// Copyright 2026 the Glissade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer-reactive tilt.
//!
//! Each bound element tracks the pointer while it hovers, converts the
//! pointer's offset from the element center into a target rotation, and
//! damps its current rotation toward that target on every frame-clock tick.
//! Leaving the element resets the target to neutral, so the element eases
//! back instead of snapping.
//!
//! Rotation around the horizontal axis (`rotateX`) is driven by vertical
//! pointer offset and vice versa: moving the pointer toward the top edge
//! tilts the top edge away from the viewer.
//!
//! ```text
//!          Static ◄──── reduced motion on ────┐
//!            │                                │
//!            └──── reduced motion off ───► Tracking ──► (tick) damp current → target
//! ```

use core::fmt;

use kurbo::{Point, Rect, Vec2};

use crate::clock::{FrameClock, Subscriber, SubscriptionId};
use crate::host::{ElementId, Host, ListenTarget, Listener, Presenter};
use crate::slots::{SlotId, Slots};
use crate::smoothing::{SmoothingFactor, TILT_EPSILON, approach};
use crate::trace::{EffectOutcome, SkipReason};

/// Which rotation axes respond to the pointer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TiltAxis {
    /// Only `rotateX` (vertical pointer offset).
    X,
    /// Only `rotateY` (horizontal pointer offset).
    Y,
    /// Both axes.
    #[default]
    Both,
}

impl TiltAxis {
    /// Parses `"x"`, `"y"`, or `"both"`, ignoring ASCII case.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("x") {
            Some(Self::X)
        } else if name.eq_ignore_ascii_case("y") {
            Some(Self::Y)
        } else if name.eq_ignore_ascii_case("both") {
            Some(Self::Both)
        } else {
            None
        }
    }
}

/// Tilt parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TiltConfig {
    /// Largest rotation in degrees, reached at the element's edge.
    pub max_angle: f64,
    /// CSS perspective depth in pixels.
    pub perspective: f64,
    /// Responding axes.
    pub axis: TiltAxis,
    /// Fraction of the remaining rotation closed per frame.
    pub damping: SmoothingFactor,
}

impl Default for TiltConfig {
    fn default() -> Self {
        Self {
            max_angle: 7.0,
            perspective: 900.0,
            axis: TiltAxis::Both,
            damping: SmoothingFactor::new(0.18),
        }
    }
}

impl TiltConfig {
    /// Sets the maximum angle. Negative or non-finite values become 0.
    #[must_use]
    pub fn with_max_angle(mut self, degrees: f64) -> Self {
        self.max_angle = if degrees.is_finite() { degrees.max(0.0) } else { 0.0 };
        self
    }

    /// Sets the perspective depth.
    #[must_use]
    pub fn with_perspective(mut self, px: f64) -> Self {
        if px.is_finite() && px > 0.0 {
            self.perspective = px;
        }
        self
    }

    /// Sets the responding axes.
    #[must_use]
    pub fn with_axis(mut self, axis: TiltAxis) -> Self {
        self.axis = axis;
        self
    }

    /// Sets the damping factor.
    #[must_use]
    pub fn with_damping(mut self, damping: SmoothingFactor) -> Self {
        self.damping = damping;
        self
    }

    /// Target rotation for a pointer at `pointer` over an element at `rect`
    /// (both in viewport coordinates). `None` for an empty rect.
    #[must_use]
    pub fn target_for(&self, rect: Rect, pointer: Point) -> Option<Vec2> {
        let cx = rect.width() / 2.0;
        let cy = rect.height() / 2.0;
        if cx <= 0.0 || cy <= 0.0 {
            return None;
        }
        let ox = pointer.x - rect.x0;
        let oy = pointer.y - rect.y0;
        let max = if self.max_angle.is_finite() {
            self.max_angle.abs()
        } else {
            0.0
        };
        let x = if self.axis == TiltAxis::Y {
            0.0
        } else {
            ((cy - oy) / cy * max).clamp(-max, max)
        };
        let y = if self.axis == TiltAxis::X {
            0.0
        } else {
            ((ox - cx) / cx * max).clamp(-max, max)
        };
        Some(Vec2::new(x, y))
    }
}

/// The rotation the presenter applies to a tilted element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TiltTransform {
    /// Rotation around the horizontal axis, in degrees.
    pub rotate_x: f64,
    /// Rotation around the vertical axis, in degrees.
    pub rotate_y: f64,
    /// Perspective depth in pixels.
    pub perspective: f64,
}

impl fmt::Display for TiltTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "perspective({}px) rotateX({:.3}deg) rotateY({:.3}deg)",
            self.perspective, self.rotate_x, self.rotate_y
        )
    }
}

/// Handle to a tilt effect instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TiltHandle(pub(crate) SlotId);

/// Whether a tilt instance is reacting to the pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TiltPhase {
    /// Listeners attached and subscribed to the frame clock.
    Tracking,
    /// Mounted inert; nothing is attached.
    Static(SkipReason),
}

#[derive(Debug)]
struct Tilt {
    element: ElementId,
    config: TiltConfig,
    phase: TiltPhase,
    current: Vec2,
    target: Vec2,
    subscription: Option<SubscriptionId>,
    settled: bool,
}

/// Arena of tilt instances.
#[derive(Debug, Default)]
pub struct TiltStore {
    tilts: Slots<Tilt>,
}

impl TiltStore {
    /// Creates an empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self { tilts: Slots::new() }
    }

    /// Mounts a tilt on `element`.
    ///
    /// Under reduced motion, or if the element has no geometry or cannot be
    /// listened to, the instance is mounted [`Static`](TiltPhase::Static).
    pub fn bind<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        clock: &mut FrameClock,
        element: ElementId,
        config: TiltConfig,
        reduced_motion: bool,
    ) -> (TiltHandle, EffectOutcome) {
        let handle = TiltHandle(self.tilts.insert(Tilt {
            element,
            config,
            phase: TiltPhase::Static(SkipReason::InvalidTarget),
            current: Vec2::ZERO,
            target: Vec2::ZERO,
            subscription: None,
            settled: true,
        }));
        let outcome = if reduced_motion {
            self.park(handle, SkipReason::ReducedMotion);
            EffectOutcome::Skipped(SkipReason::ReducedMotion)
        } else {
            self.attach(host, clock, handle)
        };
        (handle, outcome)
    }

    /// Destroys a tilt instance: detaches listeners, drops its frame
    /// subscription, and clears its output. Stale handles are a no-op.
    pub fn unbind<H: Host + Presenter + ?Sized>(
        &mut self,
        host: &mut H,
        clock: &mut FrameClock,
        handle: TiltHandle,
    ) -> Option<ElementId> {
        self.detach(host, clock, handle);
        let tilt = self.tilts.remove(handle.0)?;
        host.clear_tilt(tilt.element);
        Some(tilt.element)
    }

    /// Moves a tilt instance to another element, tearing down the old
    /// binding first. Angles restart from neutral.
    pub fn rebind<H: Host + Presenter + ?Sized>(
        &mut self,
        host: &mut H,
        clock: &mut FrameClock,
        handle: TiltHandle,
        element: ElementId,
        reduced_motion: bool,
    ) -> Option<EffectOutcome> {
        self.detach(host, clock, handle);
        let tilt = self.tilts.get_mut(handle.0)?;
        host.clear_tilt(tilt.element);
        tilt.element = element;
        tilt.current = Vec2::ZERO;
        tilt.target = Vec2::ZERO;
        tilt.settled = true;
        if reduced_motion {
            self.park(handle, SkipReason::ReducedMotion);
            Some(EffectOutcome::Skipped(SkipReason::ReducedMotion))
        } else {
            Some(self.attach(host, clock, handle))
        }
    }

    /// Applies a reduced-motion preference change to every instance.
    ///
    /// Enabling parks tracking instances at neutral; disabling re-attaches
    /// instances that were parked for reduced motion.
    pub fn set_reduced_motion<H: Host + Presenter + ?Sized>(
        &mut self,
        host: &mut H,
        clock: &mut FrameClock,
        reduce: bool,
    ) {
        for id in self.tilts.ids() {
            let handle = TiltHandle(id);
            let Some(phase) = self.phase(handle) else {
                continue;
            };
            match (reduce, phase) {
                (true, TiltPhase::Tracking) => {
                    self.detach(host, clock, handle);
                    if let Some(tilt) = self.tilts.get_mut(id) {
                        tilt.current = Vec2::ZERO;
                        tilt.target = Vec2::ZERO;
                        tilt.settled = true;
                        host.clear_tilt(tilt.element);
                    }
                    self.park(handle, SkipReason::ReducedMotion);
                }
                (false, TiltPhase::Static(SkipReason::ReducedMotion)) => {
                    self.attach(host, clock, handle);
                }
                _ => {}
            }
        }
    }

    /// Retargets every tracking instance on `element` from a pointer
    /// position in viewport coordinates.
    pub fn pointer_move<H: Host + ?Sized>(&mut self, host: &H, element: ElementId, pointer: Point) {
        let Some(rect) = host.element_rect(element) else {
            return;
        };
        for (_, tilt) in self.tilts.iter_mut() {
            if tilt.element != element || tilt.phase != TiltPhase::Tracking {
                continue;
            }
            if let Some(target) = tilt.config.target_for(rect, pointer) {
                tilt.target = target;
                tilt.settled = false;
            }
        }
    }

    /// Resets the target of every tracking instance on `element` to neutral.
    pub fn pointer_leave(&mut self, element: ElementId) {
        for (_, tilt) in self.tilts.iter_mut() {
            if tilt.element == element && tilt.phase == TiltPhase::Tracking {
                tilt.target = Vec2::ZERO;
                tilt.settled = false;
            }
        }
    }

    /// Advances one instance by one frame and presents the result.
    ///
    /// Returns `false` if nothing changed (settled, static, or stale).
    pub fn tick<P: Presenter + ?Sized>(&mut self, presenter: &mut P, handle: TiltHandle) -> bool {
        let Some(tilt) = self.tilts.get_mut(handle.0) else {
            return false;
        };
        if tilt.phase != TiltPhase::Tracking || tilt.settled {
            return false;
        }
        let damping = tilt.config.damping;
        let (x, x_done) = approach(tilt.current.x, tilt.target.x, damping, TILT_EPSILON);
        let (y, y_done) = approach(tilt.current.y, tilt.target.y, damping, TILT_EPSILON);
        tilt.current = Vec2::new(x, y);
        tilt.settled = x_done && y_done;
        presenter.apply_tilt(
            tilt.element,
            &TiltTransform {
                rotate_x: x,
                rotate_y: y,
                perspective: tilt.config.perspective,
            },
        );
        true
    }

    /// Destroys every instance.
    pub fn clear<H: Host + Presenter + ?Sized>(&mut self, host: &mut H, clock: &mut FrameClock) {
        for id in self.tilts.ids() {
            self.unbind(host, clock, TiltHandle(id));
        }
    }

    /// Current rotation (`x` = `rotateX`, `y` = `rotateY`).
    #[must_use]
    pub fn angles(&self, handle: TiltHandle) -> Option<Vec2> {
        self.tilts.get(handle.0).map(|t| t.current)
    }

    /// Target rotation.
    #[must_use]
    pub fn target(&self, handle: TiltHandle) -> Option<Vec2> {
        self.tilts.get(handle.0).map(|t| t.target)
    }

    /// Phase of an instance; `None` for stale handles.
    #[must_use]
    pub fn phase(&self, handle: TiltHandle) -> Option<TiltPhase> {
        self.tilts.get(handle.0).map(|t| t.phase)
    }

    /// Element an instance decorates.
    #[must_use]
    pub fn element(&self, handle: TiltHandle) -> Option<ElementId> {
        self.tilts.get(handle.0).map(|t| t.element)
    }

    /// Number of mounted instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tilts.len()
    }

    /// Whether no instances are mounted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tilts.is_empty()
    }

    fn attach<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        clock: &mut FrameClock,
        handle: TiltHandle,
    ) -> EffectOutcome {
        let Some(tilt) = self.tilts.get_mut(handle.0) else {
            return EffectOutcome::Skipped(SkipReason::InvalidTarget);
        };
        if host.element_rect(tilt.element).is_none() {
            tilt.phase = TiltPhase::Static(SkipReason::InvalidTarget);
            return EffectOutcome::Skipped(SkipReason::InvalidTarget);
        }
        let target = ListenTarget::Element(tilt.element);
        if !host.listen(target, Listener::PointerMove) {
            tilt.phase = TiltPhase::Static(SkipReason::Unavailable);
            return EffectOutcome::Skipped(SkipReason::Unavailable);
        }
        if !host.listen(target, Listener::PointerLeave) {
            host.unlisten(target, Listener::PointerMove);
            tilt.phase = TiltPhase::Static(SkipReason::Unavailable);
            return EffectOutcome::Skipped(SkipReason::Unavailable);
        }
        tilt.phase = TiltPhase::Tracking;
        tilt.subscription = Some(clock.subscribe(Subscriber::Tilt(handle)));
        EffectOutcome::Bound
    }

    fn detach<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        clock: &mut FrameClock,
        handle: TiltHandle,
    ) {
        let Some(tilt) = self.tilts.get_mut(handle.0) else {
            return;
        };
        if tilt.phase == TiltPhase::Tracking {
            let target = ListenTarget::Element(tilt.element);
            host.unlisten(target, Listener::PointerMove);
            host.unlisten(target, Listener::PointerLeave);
        }
        if let Some(sub) = tilt.subscription.take() {
            clock.unsubscribe(sub);
        }
        tilt.phase = TiltPhase::Static(SkipReason::InvalidTarget);
    }

    fn park(&mut self, handle: TiltHandle, reason: SkipReason) {
        if let Some(tilt) = self.tilts.get_mut(handle.0) {
            tilt.phase = TiltPhase::Static(reason);
        }
    }
}
