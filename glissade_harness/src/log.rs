// Copyright 2026 the Glissade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A [`TraceSink`] that keeps what scenario assertions need.

use alloc::vec::Vec;

use glissade_core::lifecycle::{LifecyclePhase, SignalKind};
use glissade_core::trace::{
    ClockEvent, ClockTransition, EffectEvent, EffectKind, EffectOutcome, FrameEvent,
    LifecycleEvent, ObserverEvent, ObserverTransition, ScrollAction, ScrollEvent, TraceSink,
};

/// Counts and short histories of engine events.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    /// Ticks delivered.
    pub frames: u64,
    /// Clock transitions, in order.
    pub clock: Vec<ClockTransition>,
    /// Scroll actions with the position after each, in order.
    pub scroll: Vec<(ScrollAction, f64)>,
    /// Lifecycle transitions, in order.
    pub lifecycle: Vec<(LifecyclePhase, LifecyclePhase, SignalKind)>,
    /// Observer transitions, in order.
    pub observer: Vec<ObserverTransition>,
    /// Effect mounts and teardowns, in order.
    pub effects: Vec<(EffectKind, EffectOutcome)>,
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times the clock started.
    #[must_use]
    pub fn clock_starts(&self) -> usize {
        self.count_clock(ClockTransition::Started)
    }

    /// How many times the clock stopped.
    #[must_use]
    pub fn clock_stops(&self) -> usize {
        self.count_clock(ClockTransition::Stopped)
    }

    /// How many observer transitions of `kind` were seen.
    #[must_use]
    pub fn observer_count(&self, kind: ObserverTransition) -> usize {
        self.observer.iter().filter(|t| **t == kind).count()
    }

    /// Outcomes reported for one effect kind.
    pub fn outcomes(&self, kind: EffectKind) -> impl Iterator<Item = EffectOutcome> + '_ {
        self.effects
            .iter()
            .filter(move |(k, _)| *k == kind)
            .map(|(_, o)| *o)
    }

    /// Forgets everything recorded so far.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn count_clock(&self, transition: ClockTransition) -> usize {
        self.clock.iter().filter(|t| **t == transition).count()
    }
}

impl TraceSink for EventLog {
    fn on_frame(&mut self, _e: &FrameEvent) {
        self.frames += 1;
    }

    fn on_clock(&mut self, e: &ClockEvent) {
        self.clock.push(e.transition);
    }

    fn on_scroll(&mut self, e: &ScrollEvent) {
        self.scroll.push((e.action, e.position));
    }

    fn on_lifecycle(&mut self, e: &LifecycleEvent) {
        self.lifecycle.push((e.from, e.to, e.signal));
    }

    fn on_observer(&mut self, e: &ObserverEvent) {
        self.observer.push(e.transition);
    }

    fn on_effect(&mut self, e: &EffectEvent) {
        self.effects.push((e.kind, e.outcome));
    }
}
