// Copyright 2026 the Glissade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].
//!
//! Observer handles are opaque outside the engine, so observer events are
//! decoded into [`RecordedObserver`], which keeps the handle's raw slot
//! index and generation.

use glissade_core::host::ElementId;
use glissade_core::lifecycle::{LifecyclePhase, SignalKind};
use glissade_core::time::HostTime;
use glissade_core::trace::{
    ClockEvent, ClockTransition, EffectEvent, EffectKind, EffectOutcome, FrameEvent,
    LifecycleEvent, ObserverEvent, ObserverTransition, ScrollAction, ScrollEvent, SkipReason,
    TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_FRAME: u8 = 1;
const TAG_CLOCK: u8 = 2;
const TAG_SCROLL: u8 = 3;
const TAG_LIFECYCLE: u8 = 4;
const TAG_OBSERVER: u8 = 5;
const TAG_EFFECT: u8 = 6;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Discards everything recorded so far.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_option_f64(&mut self, v: Option<f64>) {
        match v {
            Some(val) => {
                self.write_u8(1);
                self.write_f64(val);
            }
            None => {
                self.write_u8(0);
                self.write_f64(0.0);
            }
        }
    }

    fn write_element(&mut self, v: Option<ElementId>) {
        match v {
            Some(ElementId(id)) => {
                self.write_u8(1);
                self.write_u32(id);
            }
            None => {
                self.write_u8(0);
                self.write_u32(0);
            }
        }
    }

    fn write_phase(&mut self, p: LifecyclePhase) {
        self.write_u8(match p {
            LifecyclePhase::Idle => 0,
            LifecyclePhase::Active => 1,
            LifecyclePhase::Suspended => 2,
            LifecyclePhase::Destroyed => 3,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_frame(&mut self, e: &FrameEvent) {
        self.write_u8(TAG_FRAME);
        self.write_u64(e.frame_index);
        self.write_u64(e.now.micros());
        #[expect(
            clippy::cast_possible_truncation,
            reason = "subscriber count capped at u32::MAX for recording"
        )]
        self.write_u32(e.subscribers.min(u32::MAX as usize) as u32);
    }

    fn on_clock(&mut self, e: &ClockEvent) {
        self.write_u8(TAG_CLOCK);
        self.write_u64(e.at.micros());
        self.write_u8(match e.transition {
            ClockTransition::Started => 0,
            ClockTransition::Stopped => 1,
            ClockTransition::Unavailable => 2,
        });
    }

    fn on_scroll(&mut self, e: &ScrollEvent) {
        self.write_u8(TAG_SCROLL);
        self.write_u64(e.at.micros());
        self.write_u8(match e.action {
            ScrollAction::Step => 0,
            ScrollAction::Arrived => 1,
            ScrollAction::Jump => 2,
            ScrollAction::Retarget => 3,
        });
        self.write_f64(e.position);
        self.write_option_f64(e.target);
    }

    fn on_lifecycle(&mut self, e: &LifecycleEvent) {
        self.write_u8(TAG_LIFECYCLE);
        self.write_u64(e.at.micros());
        self.write_phase(e.from);
        self.write_phase(e.to);
        self.write_u8(match e.signal {
            SignalKind::Ready => 0,
            SignalKind::NavigationStart => 1,
            SignalKind::NavigationFinish => 2,
            SignalKind::VisibilityChanged => 3,
            SignalKind::ReducedMotionChanged => 4,
            SignalKind::Teardown => 5,
        });
    }

    fn on_observer(&mut self, e: &ObserverEvent) {
        self.write_u8(TAG_OBSERVER);
        self.write_u64(e.at.micros());
        let slot = e.handle.slot();
        self.write_u32(slot.index());
        self.write_u32(slot.generation());
        self.write_element(e.element);
        self.write_u8(match e.transition {
            ObserverTransition::Enter => 0,
            ObserverTransition::Leave => 1,
            ObserverTransition::Retire => 2,
            ObserverTransition::Rebind => 3,
            ObserverTransition::Unobserve => 4,
        });
    }

    fn on_effect(&mut self, e: &EffectEvent) {
        self.write_u8(TAG_EFFECT);
        self.write_u64(e.at.micros());
        self.write_u8(match e.kind {
            EffectKind::Observer => 0,
            EffectKind::Tilt => 1,
            EffectKind::Parallax => 2,
            EffectKind::Reveal => 3,
            EffectKind::CountUp => 4,
        });
        self.write_element(e.element);
        self.write_u8(match e.outcome {
            EffectOutcome::Bound => 0,
            EffectOutcome::Destroyed => 1,
            EffectOutcome::Skipped(SkipReason::ReducedMotion) => 2,
            EffectOutcome::Skipped(SkipReason::InvalidTarget) => 3,
            EffectOutcome::Skipped(SkipReason::Unavailable) => 4,
        });
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded viewport-binding transition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RecordedObserver {
    /// Most recent host time seen by the engine.
    pub at: HostTime,
    /// Slot index of the binding's handle.
    pub slot: u32,
    /// Generation of the binding's handle.
    pub generation: u32,
    /// The element observed at the time of the transition.
    pub element: Option<ElementId>,
    /// What happened.
    pub transition: ObserverTransition,
}

/// A decoded event from a binary recording.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// A [`FrameEvent`].
    Frame(FrameEvent),
    /// A [`ClockEvent`].
    Clock(ClockEvent),
    /// A [`ScrollEvent`].
    Scroll(ScrollEvent),
    /// A [`LifecycleEvent`].
    Lifecycle(LifecycleEvent),
    /// An [`ObserverEvent`].
    Observer(RecordedObserver),
    /// An [`EffectEvent`].
    Effect(EffectEvent),
}

impl RecordedEvent {
    /// The event's timestamp.
    #[must_use]
    pub fn at(&self) -> HostTime {
        match self {
            Self::Frame(e) => e.now,
            Self::Clock(e) => e.at,
            Self::Scroll(e) => e.at,
            Self::Lifecycle(e) => e.at,
            Self::Observer(e) => e.at,
            Self::Effect(e) => e.at,
        }
    }
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_u8(&mut self) -> Option<u8> {
        if self.remaining() < 1 {
            return None;
        }
        let v = self.data[self.pos];
        self.pos += 1;
        Some(v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        if self.remaining() < 4 {
            return None;
        }
        let v = u32::from_le_bytes(self.data[self.pos..self.pos + 4].try_into().ok()?);
        self.pos += 4;
        Some(v)
    }

    fn read_u64(&mut self) -> Option<u64> {
        if self.remaining() < 8 {
            return None;
        }
        let v = u64::from_le_bytes(self.data[self.pos..self.pos + 8].try_into().ok()?);
        self.pos += 8;
        Some(v)
    }

    fn read_f64(&mut self) -> Option<f64> {
        self.read_u64().map(f64::from_bits)
    }

    fn read_time(&mut self) -> Option<HostTime> {
        self.read_u64().map(HostTime)
    }

    fn read_option_f64(&mut self) -> Option<Option<f64>> {
        let present = self.read_u8()?;
        let val = self.read_f64()?;
        Some(if present != 0 { Some(val) } else { None })
    }

    fn read_element(&mut self) -> Option<Option<ElementId>> {
        let present = self.read_u8()?;
        let id = self.read_u32()?;
        Some(if present != 0 { Some(ElementId(id)) } else { None })
    }

    fn read_phase(&mut self) -> Option<LifecyclePhase> {
        Some(match self.read_u8()? {
            0 => LifecyclePhase::Idle,
            1 => LifecyclePhase::Active,
            2 => LifecyclePhase::Suspended,
            _ => LifecyclePhase::Destroyed,
        })
    }

    fn decode_frame(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Frame(FrameEvent {
            frame_index: self.read_u64()?,
            now: self.read_time()?,
            subscribers: usize::try_from(self.read_u32()?).ok()?,
        }))
    }

    fn decode_clock(&mut self) -> Option<RecordedEvent> {
        let at = self.read_time()?;
        let transition = match self.read_u8()? {
            0 => ClockTransition::Started,
            1 => ClockTransition::Stopped,
            _ => ClockTransition::Unavailable,
        };
        Some(RecordedEvent::Clock(ClockEvent { at, transition }))
    }

    fn decode_scroll(&mut self) -> Option<RecordedEvent> {
        let at = self.read_time()?;
        let action = match self.read_u8()? {
            0 => ScrollAction::Step,
            1 => ScrollAction::Arrived,
            2 => ScrollAction::Jump,
            _ => ScrollAction::Retarget,
        };
        Some(RecordedEvent::Scroll(ScrollEvent {
            at,
            action,
            position: self.read_f64()?,
            target: self.read_option_f64()?,
        }))
    }

    fn decode_lifecycle(&mut self) -> Option<RecordedEvent> {
        let at = self.read_time()?;
        let from = self.read_phase()?;
        let to = self.read_phase()?;
        let signal = match self.read_u8()? {
            0 => SignalKind::Ready,
            1 => SignalKind::NavigationStart,
            2 => SignalKind::NavigationFinish,
            3 => SignalKind::VisibilityChanged,
            4 => SignalKind::ReducedMotionChanged,
            _ => SignalKind::Teardown,
        };
        Some(RecordedEvent::Lifecycle(LifecycleEvent {
            at,
            from,
            to,
            signal,
        }))
    }

    fn decode_observer(&mut self) -> Option<RecordedEvent> {
        let at = self.read_time()?;
        let slot = self.read_u32()?;
        let generation = self.read_u32()?;
        let element = self.read_element()?;
        let transition = match self.read_u8()? {
            0 => ObserverTransition::Enter,
            1 => ObserverTransition::Leave,
            2 => ObserverTransition::Retire,
            3 => ObserverTransition::Rebind,
            _ => ObserverTransition::Unobserve,
        };
        Some(RecordedEvent::Observer(RecordedObserver {
            at,
            slot,
            generation,
            element,
            transition,
        }))
    }

    fn decode_effect(&mut self) -> Option<RecordedEvent> {
        let at = self.read_time()?;
        let kind = match self.read_u8()? {
            0 => EffectKind::Observer,
            1 => EffectKind::Tilt,
            2 => EffectKind::Parallax,
            3 => EffectKind::Reveal,
            _ => EffectKind::CountUp,
        };
        let element = self.read_element()?;
        let outcome = match self.read_u8()? {
            0 => EffectOutcome::Bound,
            1 => EffectOutcome::Destroyed,
            2 => EffectOutcome::Skipped(SkipReason::ReducedMotion),
            3 => EffectOutcome::Skipped(SkipReason::InvalidTarget),
            _ => EffectOutcome::Skipped(SkipReason::Unavailable),
        };
        Some(RecordedEvent::Effect(EffectEvent {
            at,
            kind,
            element,
            outcome,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_FRAME => self.decode_frame(),
            TAG_CLOCK => self.decode_clock(),
            TAG_SCROLL => self.decode_scroll(),
            TAG_LIFECYCLE => self.decode_lifecycle(),
            TAG_OBSERVER => self.decode_observer(),
            TAG_EFFECT => self.decode_effect(),
            _ => None, // unknown tag: stop
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
