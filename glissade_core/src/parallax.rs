// Copyright 2026 the Glissade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll-position-driven parallax.
//!
//! A parallax offset is a pure function of the element's current bounding
//! rect and the viewport height:
//!
//! ```text
//! progress = (rect.top + rect.height / 2) / viewport_height - 0.5   // −0.5 … +0.5 on screen
//! offset   = progress × intensity × 100                             // CSS px
//! ```
//!
//! clamped to `±intensity × 100` when `clamp` is set. Nothing is integrated
//! over time, so parallax does not subscribe to the frame clock. Scroll and
//! resize events only mark elements dirty on the [`PARALLAX`] channel; the
//! dirty set is drained once on the next frame. When the frame clock is
//! running that is its next tick; otherwise the store registers a single
//! one-shot frame callback of its own.
//!
//! All parallax instances share one window scroll listener and one resize
//! listener, attached while at least one instance is tracking.

use alloc::vec::Vec;

use kurbo::Rect;
use understory_dirty::{CycleHandling, DirtyTracker};

use crate::dirty::PARALLAX;
use crate::host::{ElementId, FrameRequest, Host, ListenTarget, Listener, Presenter};
use crate::slots::{SlotId, Slots};
use crate::trace::{EffectOutcome, SkipReason};

/// Axis along which the offset is applied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ParallaxAxis {
    /// Horizontal translation.
    X,
    /// Vertical translation.
    #[default]
    Y,
}

impl ParallaxAxis {
    /// Parses `"x"` or `"y"`, ignoring ASCII case.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("x") {
            Some(Self::X)
        } else if name.eq_ignore_ascii_case("y") {
            Some(Self::Y)
        } else {
            None
        }
    }
}

/// Parallax parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParallaxConfig {
    /// Offset scale; the offset spans `±intensity × 50` px across the
    /// viewport.
    pub intensity: f64,
    /// Axis the offset is applied along.
    pub axis: ParallaxAxis,
    /// Clamp the offset to `±intensity × 100` px.
    pub clamp: bool,
}

impl Default for ParallaxConfig {
    fn default() -> Self {
        Self {
            intensity: 0.2,
            axis: ParallaxAxis::Y,
            clamp: true,
        }
    }
}

impl ParallaxConfig {
    /// Sets the intensity. Negative or non-finite values become 0.
    #[must_use]
    pub fn with_intensity(mut self, intensity: f64) -> Self {
        self.intensity = if intensity.is_finite() { intensity.max(0.0) } else { 0.0 };
        self
    }

    /// Sets the axis.
    #[must_use]
    pub fn with_axis(mut self, axis: ParallaxAxis) -> Self {
        self.axis = axis;
        self
    }

    /// Enables or disables clamping.
    #[must_use]
    pub fn with_clamp(mut self, clamp: bool) -> Self {
        self.clamp = clamp;
        self
    }

    /// Offset in CSS pixels for an element at `rect` in a viewport of the
    /// given height. A zero (or negative) height is treated as 1.
    #[must_use]
    pub fn offset(&self, rect: Rect, viewport_height: f64) -> f64 {
        let vh = if viewport_height > 0.0 { viewport_height } else { 1.0 };
        let progress = (rect.y0 + rect.height() / 2.0) / vh - 0.5;
        let offset = progress * self.intensity * 100.0;
        if self.clamp {
            let limit = self.intensity.abs() * 100.0;
            offset.clamp(-limit, limit)
        } else {
            offset
        }
    }
}

/// Handle to a parallax instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ParallaxHandle(pub(crate) SlotId);

/// Whether a parallax instance reacts to scrolling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParallaxPhase {
    /// Recomputed on scroll and resize.
    Tracking,
    /// Mounted inert.
    Static(SkipReason),
}

#[derive(Debug)]
struct Parallax {
    element: ElementId,
    config: ParallaxConfig,
    phase: ParallaxPhase,
    offset: Option<f64>,
}

/// Arena of parallax instances plus the shared listener and flush state.
pub struct ParallaxStore {
    items: Slots<Parallax>,
    dirty: DirtyTracker<u32>,
    pending: bool,
    listening: bool,
    flush: Option<FrameRequest>,
}

impl core::fmt::Debug for ParallaxStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ParallaxStore")
            .field("items", &self.items)
            .field("pending", &self.pending)
            .field("listening", &self.listening)
            .field("flush", &self.flush)
            .finish_non_exhaustive()
    }
}

impl Default for ParallaxStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ParallaxStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Slots::new(),
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            pending: false,
            listening: false,
            flush: None,
        }
    }

    /// Mounts a parallax instance on `element` and marks it for its first
    /// computation.
    pub fn bind<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        element: ElementId,
        config: ParallaxConfig,
        reduced_motion: bool,
    ) -> (ParallaxHandle, EffectOutcome) {
        let handle = ParallaxHandle(self.items.insert(Parallax {
            element,
            config,
            phase: ParallaxPhase::Static(SkipReason::ReducedMotion),
            offset: None,
        }));
        if reduced_motion {
            return (handle, EffectOutcome::Skipped(SkipReason::ReducedMotion));
        }
        let outcome = self.attach(host, handle);
        (handle, outcome)
    }

    /// Destroys an instance and clears its output. Releases the shared
    /// listeners when the last tracking instance goes away.
    pub fn unbind<H: Host + Presenter + ?Sized>(
        &mut self,
        host: &mut H,
        handle: ParallaxHandle,
    ) -> Option<ElementId> {
        let item = self.items.remove(handle.0)?;
        self.dirty.remove_key(handle.0.index());
        host.clear_parallax(item.element);
        self.release_if_idle(host);
        Some(item.element)
    }

    /// Applies a reduced-motion preference change to every instance.
    pub fn set_reduced_motion<H: Host + Presenter + ?Sized>(&mut self, host: &mut H, reduce: bool) {
        for id in self.items.ids() {
            let handle = ParallaxHandle(id);
            let Some(item) = self.items.get_mut(id) else {
                continue;
            };
            match (reduce, item.phase) {
                (true, ParallaxPhase::Tracking) => {
                    item.phase = ParallaxPhase::Static(SkipReason::ReducedMotion);
                    item.offset = None;
                    host.clear_parallax(item.element);
                    self.dirty.remove_key(id.index());
                }
                (false, ParallaxPhase::Static(SkipReason::ReducedMotion)) => {
                    self.attach(host, handle);
                }
                _ => {}
            }
        }
        self.release_if_idle(host);
    }

    /// Destroys every instance and releases the shared listeners.
    pub fn clear<H: Host + Presenter + ?Sized>(&mut self, host: &mut H) {
        for id in self.items.ids() {
            self.unbind(host, ParallaxHandle(id));
        }
        self.release_if_idle(host);
    }

    /// Marks every tracking instance dirty (a scroll or resize happened).
    pub fn invalidate_all(&mut self) {
        for (id, item) in self.items.iter() {
            if item.phase == ParallaxPhase::Tracking {
                self.dirty.mark(id.index(), PARALLAX);
                self.pending = true;
            }
        }
    }

    /// Arranges for pending work to be flushed on the next frame.
    ///
    /// With the frame clock running the engine flushes on its next tick;
    /// otherwise a single one-shot frame callback is registered.
    pub fn schedule<H: Host + ?Sized>(&mut self, host: &mut H, clock_running: bool) {
        if !self.pending || clock_running || self.flush.is_some() {
            return;
        }
        self.flush = host.request_frame();
    }

    /// Whether `request` is this store's one-shot flush callback.
    #[must_use]
    pub fn owns_request(&self, request: FrameRequest) -> bool {
        self.flush == Some(request)
    }

    /// Handles this store's one-shot frame callback.
    pub fn on_flush_frame<H: Host + Presenter + ?Sized>(
        &mut self,
        host: &mut H,
        request: FrameRequest,
    ) {
        if self.flush != Some(request) {
            return;
        }
        self.flush = None;
        self.recompute(host);
    }

    /// Flushes from a frame-clock tick, cancelling any one-shot callback.
    pub fn flush_on_tick<H: Host + Presenter + ?Sized>(&mut self, host: &mut H) {
        if let Some(request) = self.flush.take() {
            host.cancel_frame(request);
        }
        self.recompute(host);
    }

    /// Last presented offset of an instance.
    #[must_use]
    pub fn offset(&self, handle: ParallaxHandle) -> Option<f64> {
        self.items.get(handle.0).and_then(|p| p.offset)
    }

    /// Phase of an instance; `None` for stale handles.
    #[must_use]
    pub fn phase(&self, handle: ParallaxHandle) -> Option<ParallaxPhase> {
        self.items.get(handle.0).map(|p| p.phase)
    }

    /// Whether the shared scroll/resize listeners are attached.
    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Whether a one-shot flush callback is outstanding.
    #[must_use]
    pub fn has_pending_flush(&self) -> bool {
        self.flush.is_some()
    }

    /// Number of mounted instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no instances are mounted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn attach<H: Host + ?Sized>(&mut self, host: &mut H, handle: ParallaxHandle) -> EffectOutcome {
        let Some(item) = self.items.get(handle.0) else {
            return EffectOutcome::Skipped(SkipReason::InvalidTarget);
        };
        let element = item.element;
        let reason = if host.element_rect(element).is_none() {
            Some(SkipReason::InvalidTarget)
        } else if !self.ensure_listening(host) {
            Some(SkipReason::Unavailable)
        } else {
            None
        };
        let Some(item) = self.items.get_mut(handle.0) else {
            return EffectOutcome::Skipped(SkipReason::InvalidTarget);
        };
        if let Some(reason) = reason {
            item.phase = ParallaxPhase::Static(reason);
            return EffectOutcome::Skipped(reason);
        }
        item.phase = ParallaxPhase::Tracking;
        self.dirty.mark(handle.0.index(), PARALLAX);
        self.pending = true;
        EffectOutcome::Bound
    }

    fn ensure_listening<H: Host + ?Sized>(&mut self, host: &mut H) -> bool {
        if self.listening {
            return true;
        }
        if !host.listen(ListenTarget::Window, Listener::Scroll) {
            return false;
        }
        if !host.listen(ListenTarget::Window, Listener::Resize) {
            host.unlisten(ListenTarget::Window, Listener::Scroll);
            return false;
        }
        self.listening = true;
        true
    }

    fn release_if_idle<H: Host + ?Sized>(&mut self, host: &mut H) {
        let tracking = self
            .items
            .iter()
            .any(|(_, p)| p.phase == ParallaxPhase::Tracking);
        if tracking {
            return;
        }
        if self.listening {
            host.unlisten(ListenTarget::Window, Listener::Scroll);
            host.unlisten(ListenTarget::Window, Listener::Resize);
            self.listening = false;
        }
        if let Some(request) = self.flush.take() {
            host.cancel_frame(request);
        }
        self.pending = false;
    }

    fn recompute<H: Host + Presenter + ?Sized>(&mut self, host: &mut H) {
        if !self.pending {
            return;
        }
        self.pending = false;
        let keys: Vec<u32> = self
            .dirty
            .drain(PARALLAX)
            .deterministic()
            .run()
            .collect();
        if keys.is_empty() {
            return;
        }
        let viewport_height = host.viewport_size().height;
        for idx in keys {
            let Some((id, item)) = self.items.get_at(idx) else {
                continue;
            };
            if item.phase != ParallaxPhase::Tracking {
                continue;
            }
            let Some(rect) = host.element_rect(item.element) else {
                continue;
            };
            let offset = item.config.offset(rect, viewport_height);
            let (element, axis) = (item.element, item.config.axis);
            if let Some(item) = self.items.get_mut(id) {
                if item.offset != Some(offset) {
                    item.offset = Some(offset);
                    host.apply_parallax(element, axis, offset);
                }
            }
        }
    }
}
