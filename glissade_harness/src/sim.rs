// Copyright 2026 the Glissade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A simulated frame timeline around an [`Engine`].

use alloc::vec::Vec;

use glissade_core::engine::Engine;
use glissade_core::host::{ElementId, IntersectionEntry};
use glissade_core::lifecycle::{HostSignal, NavigationType};
use glissade_core::time::{Duration, HostTime};
use glissade_core::trace::{NoopSink, TraceSink};

use crate::host::SimHost;

/// Spacing of simulated frames (60 Hz).
pub const FRAME_INTERVAL: Duration = Duration(16_667);

/// Drives an [`Engine<SimHost, S>`] one simulated frame at a time.
///
/// Each [`step`](Self::step) advances the clock by [`FRAME_INTERVAL`] and
/// delivers every frame request that was outstanding at the start of the
/// step. Requests made during delivery wait for the next step, which is how
/// `requestAnimationFrame` behaves.
#[derive(Debug)]
pub struct Simulation<S: TraceSink = NoopSink> {
    engine: Engine<SimHost, S>,
    now: HostTime,
}

impl Simulation {
    /// Wraps a fresh engine over `host`.
    #[must_use]
    pub fn new(host: SimHost) -> Self {
        Self::from_engine(Engine::new(host))
    }
}

impl<S: TraceSink> Simulation<S> {
    /// Wraps a fresh engine over `host` that reports to `sink`.
    #[must_use]
    pub fn with_sink(host: SimHost, sink: S) -> Self {
        Self::from_engine(Engine::with_sink(host, sink))
    }

    /// Wraps an existing engine. Time starts at 1 s so that the first
    /// frame timestamp is never zero.
    #[must_use]
    pub fn from_engine(engine: Engine<SimHost, S>) -> Self {
        Self {
            engine,
            now: HostTime(1_000_000),
        }
    }

    /// The engine.
    pub fn engine(&self) -> &Engine<SimHost, S> {
        &self.engine
    }

    /// The engine, mutably.
    pub fn engine_mut(&mut self) -> &mut Engine<SimHost, S> {
        &mut self.engine
    }

    /// The simulated host.
    pub fn host(&self) -> &SimHost {
        self.engine.host()
    }

    /// The simulated host, mutably.
    pub fn host_mut(&mut self) -> &mut SimHost {
        self.engine.host_mut()
    }

    /// The trace sink.
    pub fn sink(&self) -> &S {
        self.engine.sink()
    }

    /// Current simulated time.
    #[must_use]
    pub fn now(&self) -> HostTime {
        self.now
    }

    /// Consumes the simulation, returning the engine.
    pub fn into_engine(self) -> Engine<SimHost, S> {
        self.engine
    }

    // -- Time -------------------------------------------------------------

    /// Advances one frame. Returns how many frame callbacks were delivered.
    pub fn step(&mut self) -> usize {
        self.now = self.now + FRAME_INTERVAL;
        let due = self.engine.host_mut().take_frames();
        for request in &due {
            self.engine.frame(*request, self.now);
        }
        due.len()
    }

    /// Advances `frames` frames.
    pub fn run(&mut self, frames: usize) {
        for _ in 0..frames {
            self.step();
        }
    }

    /// Steps until `done` holds, up to `max_frames`. Returns the number of
    /// frames taken, or `None` if the condition never held.
    pub fn run_until(
        &mut self,
        max_frames: usize,
        mut done: impl FnMut(&Engine<SimHost, S>) -> bool,
    ) -> Option<usize> {
        for taken in 0..=max_frames {
            if done(&self.engine) {
                return Some(taken);
            }
            if taken < max_frames {
                self.step();
            }
        }
        None
    }

    // -- Host events --------------------------------------------------------

    /// Sends a ready signal for a first load of `url`.
    pub fn ready(&mut self, url: &str) {
        self.engine.ready(NavigationType::Navigate, url);
    }

    /// Sends a lifecycle signal.
    pub fn signal(&mut self, signal: HostSignal<'_>) {
        self.engine.signal(signal);
    }

    /// Changes document visibility on the host and signals it.
    pub fn set_hidden(&mut self, hidden: bool) {
        self.engine.host_mut().set_hidden(hidden);
        self.engine.signal(HostSignal::VisibilityChanged { hidden });
    }

    /// Changes the reduced-motion preference on the host and signals it.
    pub fn set_reduced_motion(&mut self, reduce: bool) {
        self.engine.host_mut().set_prefers_reduced_motion(reduce);
        self.engine
            .signal(HostSignal::ReducedMotionChanged { reduce });
    }

    /// The user scrolled natively to `offset`.
    pub fn user_scroll(&mut self, offset: f64) {
        self.engine.host_mut().user_scroll_to(offset);
        self.engine.scroll();
    }

    /// Reports that `element` is now `ratio` visible to every observation
    /// on it. Returns how many entries were delivered.
    pub fn intersect(&mut self, element: ElementId, ratio: f64) -> usize {
        let entries: Vec<IntersectionEntry> = self
            .engine
            .host()
            .observations()
            .iter()
            .filter(|o| o.element == element)
            .map(|o| IntersectionEntry {
                key: o.key,
                element,
                ratio,
                is_intersecting: ratio > 0.0,
            })
            .collect();
        self.engine.intersections(&entries);
        entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_delivers_only_outstanding_requests() {
        let mut sim = Simulation::new(SimHost::new());
        sim.ready("/");
        assert!(sim.engine().clock().is_running(), "ready starts the clock");
        assert_eq!(sim.step(), 1, "one clock request");
        assert_eq!(sim.host().pending_frames(), 1, "clock re-registered");
        assert_eq!(sim.engine().clock().frame_count(), 1, "one tick");
    }

    #[test]
    fn run_until_reports_frames_taken() {
        let mut sim = Simulation::new(SimHost::new());
        sim.ready("/");
        let taken = sim.run_until(10, |e| e.clock().frame_count() >= 3);
        assert_eq!(taken, Some(3), "three frames to reach three ticks");
        assert_eq!(
            sim.run_until(0, |e| e.clock().frame_count() > 100),
            None,
            "never satisfied"
        );
    }
}
