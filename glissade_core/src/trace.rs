// Copyright 2026 the Glissade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the animation engine.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! [`Engine`](crate::engine::Engine) calls as it runs. All method bodies
//! default to no-ops, so implementing only the events you care about is fine.
//!
//! The engine is generic over its sink and defaults to [`NoopSink`], so an
//! un-instrumented engine monomorphizes every call away.
//!
//! Events are stamped with the most recent host time the engine has seen
//! (the last frame timestamp). Events raised before the first frame carry
//! `HostTime(0)`.

use crate::host::ElementId;
use crate::lifecycle::{LifecyclePhase, SignalKind};
use crate::observe::ObserverHandle;
use crate::time::HostTime;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Why the frame clock changed run state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClockTransition {
    /// A frame callback was registered.
    Started,
    /// The pending frame callback was cancelled.
    Stopped,
    /// A start was requested but the host has no frame scheduler.
    Unavailable,
}

/// What the smooth-scroll controller did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScrollAction {
    /// A per-frame interpolation step wrote a new position.
    Step,
    /// A programmatic scroll converged on its target.
    Arrived,
    /// A position was written without interpolation.
    Jump,
    /// A new programmatic target replaced the previous one.
    Retarget,
}

/// A viewport-binding state transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObserverTransition {
    /// The element entered the viewport; `on_enter` fired.
    Enter,
    /// The element left the viewport; `on_leave` fired.
    Leave,
    /// A once-binding stopped observing after its first enter.
    Retire,
    /// The binding was moved to a new element.
    Rebind,
    /// The binding was released by its owner.
    Unobserve,
}

/// Which effect an [`EffectEvent`] concerns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectKind {
    /// Viewport-entry binding.
    Observer,
    /// Pointer tilt.
    Tilt,
    /// Scroll parallax.
    Parallax,
    /// Scroll reveal.
    Reveal,
    /// Numeric count-up.
    CountUp,
}

/// Why an effect was mounted inert.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// The user prefers reduced motion.
    ReducedMotion,
    /// The element is unknown or detached.
    InvalidTarget,
    /// The host lacks the primitive the effect needs.
    Unavailable,
}

/// What happened to an effect instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectOutcome {
    /// The effect attached to its element.
    Bound,
    /// The effect was mounted without attaching anything.
    Skipped(SkipReason),
    /// The effect released its element.
    Destroyed,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when the frame clock delivers a tick.
#[derive(Clone, Copy, Debug)]
pub struct FrameEvent {
    /// Monotonic frame counter.
    pub frame_index: u64,
    /// Host time of the frame.
    pub now: HostTime,
    /// How many subscribers the tick fans out to.
    pub subscribers: usize,
}

/// Emitted when the frame clock starts or stops.
#[derive(Clone, Copy, Debug)]
pub struct ClockEvent {
    /// Most recent host time seen by the engine.
    pub at: HostTime,
    /// What happened.
    pub transition: ClockTransition,
}

/// Emitted when the smooth-scroll controller writes or retargets.
#[derive(Clone, Copy, Debug)]
pub struct ScrollEvent {
    /// Most recent host time seen by the engine.
    pub at: HostTime,
    /// What the controller did.
    pub action: ScrollAction,
    /// Virtual position after the action.
    pub position: f64,
    /// Pending destination, if a programmatic scroll is in flight.
    pub target: Option<f64>,
}

/// Emitted on every lifecycle state change.
#[derive(Clone, Copy, Debug)]
pub struct LifecycleEvent {
    /// Most recent host time seen by the engine.
    pub at: HostTime,
    /// State before the signal.
    pub from: LifecyclePhase,
    /// State after the signal.
    pub to: LifecyclePhase,
    /// Which host signal caused the change.
    pub signal: SignalKind,
}

/// Emitted on viewport-binding transitions.
#[derive(Clone, Copy, Debug)]
pub struct ObserverEvent {
    /// Most recent host time seen by the engine.
    pub at: HostTime,
    /// The binding.
    pub handle: ObserverHandle,
    /// The element observed at the time of the transition.
    pub element: Option<ElementId>,
    /// What happened.
    pub transition: ObserverTransition,
}

/// Emitted when an effect instance is mounted or destroyed.
#[derive(Clone, Copy, Debug)]
pub struct EffectEvent {
    /// Most recent host time seen by the engine.
    pub at: HostTime,
    /// Which effect.
    pub kind: EffectKind,
    /// The decorated element, if any.
    pub element: Option<ElementId>,
    /// What happened.
    pub outcome: EffectOutcome,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the engine.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called for every frame-clock tick.
    fn on_frame(&mut self, e: &FrameEvent) {
        _ = e;
    }

    /// Called when the frame clock starts or stops.
    fn on_clock(&mut self, e: &ClockEvent) {
        _ = e;
    }

    /// Called when the scroll controller writes or retargets.
    fn on_scroll(&mut self, e: &ScrollEvent) {
        _ = e;
    }

    /// Called on lifecycle transitions.
    fn on_lifecycle(&mut self, e: &LifecycleEvent) {
        _ = e;
    }

    /// Called on viewport-binding transitions.
    fn on_observer(&mut self, e: &ObserverEvent) {
        _ = e;
    }

    /// Called when effects are mounted or destroyed.
    fn on_effect(&mut self, e: &EffectEvent) {
        _ = e;
    }
}

impl<S: TraceSink + ?Sized> TraceSink for &mut S {
    fn on_frame(&mut self, e: &FrameEvent) {
        (**self).on_frame(e);
    }

    fn on_clock(&mut self, e: &ClockEvent) {
        (**self).on_clock(e);
    }

    fn on_scroll(&mut self, e: &ScrollEvent) {
        (**self).on_scroll(e);
    }

    fn on_lifecycle(&mut self, e: &LifecycleEvent) {
        (**self).on_lifecycle(e);
    }

    fn on_observer(&mut self, e: &ObserverEvent) {
        (**self).on_observer(e);
    }

    fn on_effect(&mut self, e: &EffectEvent) {
        (**self).on_effect(e);
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
