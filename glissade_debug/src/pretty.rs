// Copyright 2026 the Glissade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Host times
//! are printed in milliseconds, the unit browsers use.

use std::io::Write;

use glissade_core::host::ElementId;
use glissade_core::trace::{
    ClockEvent, EffectEvent, EffectOutcome, FrameEvent, LifecycleEvent, ObserverEvent,
    ScrollEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    frames_only: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("frames_only", &self.frames_only)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self {
            writer,
            frames_only: false,
        }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            frames_only: false,
        }
    }

    /// Suppresses everything except frame ticks and clock transitions.
    #[must_use]
    pub fn frames_only(mut self, frames_only: bool) -> Self {
        self.frames_only = frames_only;
        self
    }

    /// Consumes the sink and returns its writer.
    pub fn into_writer(self) -> W {
        self.writer
    }
}

fn element(e: Option<ElementId>) -> String {
    e.map_or_else(|| "-".to_owned(), |e| e.0.to_string())
}

fn outcome(o: EffectOutcome) -> String {
    match o {
        EffectOutcome::Bound => "bound".to_owned(),
        EffectOutcome::Skipped(reason) => format!("skipped({reason:?})"),
        EffectOutcome::Destroyed => "destroyed".to_owned(),
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_frame(&mut self, e: &FrameEvent) {
        let _ = writeln!(
            self.writer,
            "[frame] frame={} now={:.3}ms subs={}",
            e.frame_index,
            e.now.as_millis_f64(),
            e.subscribers,
        );
    }

    fn on_clock(&mut self, e: &ClockEvent) {
        let _ = writeln!(
            self.writer,
            "[clock] {:?} at {:.3}ms",
            e.transition,
            e.at.as_millis_f64(),
        );
    }

    fn on_scroll(&mut self, e: &ScrollEvent) {
        if self.frames_only {
            return;
        }
        let target = e
            .target
            .map_or_else(|| "-".to_owned(), |t| format!("{t:.1}"));
        let _ = writeln!(
            self.writer,
            "[scroll] {:?} position={:.1} target={target} at {:.3}ms",
            e.action,
            e.position,
            e.at.as_millis_f64(),
        );
    }

    fn on_lifecycle(&mut self, e: &LifecycleEvent) {
        if self.frames_only {
            return;
        }
        let _ = writeln!(
            self.writer,
            "[lifecycle] {:?} -> {:?} on {:?} at {:.3}ms",
            e.from,
            e.to,
            e.signal,
            e.at.as_millis_f64(),
        );
    }

    fn on_observer(&mut self, e: &ObserverEvent) {
        if self.frames_only {
            return;
        }
        let slot = e.handle.slot();
        let _ = writeln!(
            self.writer,
            "[observer] {:?} binding={}@{} element={} at {:.3}ms",
            e.transition,
            slot.index(),
            slot.generation(),
            element(e.element),
            e.at.as_millis_f64(),
        );
    }

    fn on_effect(&mut self, e: &EffectEvent) {
        if self.frames_only {
            return;
        }
        let _ = writeln!(
            self.writer,
            "[effect] {:?} {} element={} at {:.3}ms",
            e.kind,
            outcome(e.outcome),
            element(e.element),
            e.at.as_millis_f64(),
        );
    }
}
