// Copyright 2026 the Glissade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An in-memory [`Host`] / [`Presenter`].

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Rect, Size};

use glissade_core::host::{ElementId, FrameRequest, Host, ListenTarget, Listener, Presenter};
use glissade_core::observe::ObserverHandle;
use glissade_core::parallax::ParallaxAxis;
use glissade_core::reveal::RevealStyle;
use glissade_core::tilt::TiltTransform;

/// One live intersection observation.
#[derive(Clone, Debug, PartialEq)]
pub struct Observation {
    /// The binding the observation reports to.
    pub key: ObserverHandle,
    /// The observed element.
    pub element: ElementId,
    /// Requested threshold.
    pub threshold: f64,
    /// Requested root margin.
    pub root_margin: String,
}

/// Which primitives a [`SimHost`] pretends to have.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    /// Frame callbacks can be requested.
    pub frames: bool,
    /// Event listeners can be attached.
    pub events: bool,
    /// Intersection observation is available.
    pub intersection: bool,
}

impl Capabilities {
    /// Everything available, like a modern browser.
    pub const FULL: Self = Self {
        frames: true,
        events: true,
        intersection: true,
    };

    /// Nothing available, like a server-side render.
    pub const NONE: Self = Self {
        frames: false,
        events: false,
        intersection: false,
    };
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::FULL
    }
}

/// A deterministic host with instrumentation counters.
///
/// Frame requests are queued until the driver delivers them (see
/// [`Simulation`](crate::Simulation)). Elements exist once they are given a
/// rect. Native scroll writes are clamped to `[0, max_scroll]` like a real
/// viewport, and every write is recorded.
#[derive(Debug)]
pub struct SimHost {
    capabilities: Capabilities,
    next_frame: u32,
    pending_frames: Vec<FrameRequest>,
    frames_requested: usize,
    frames_cancelled: usize,
    scroll_offset: f64,
    max_scroll: f64,
    viewport: Size,
    scroll_writes: Vec<f64>,
    manual_restoration: bool,
    rects: BTreeMap<ElementId, Rect>,
    selectors: Vec<(String, ElementId)>,
    prevented: Vec<ElementId>,
    /// Attached listeners with their registration counts.
    listeners: Vec<(ListenTarget, Listener, usize)>,
    observations: Vec<Observation>,
    reduced_motion: bool,
    hidden: bool,
    tilts: BTreeMap<ElementId, TiltTransform>,
    tilt_writes: usize,
    parallax: BTreeMap<ElementId, (ParallaxAxis, f64)>,
    parallax_writes: usize,
    prepared: BTreeMap<ElementId, RevealStyle>,
    revealed: Vec<ElementId>,
    counts: BTreeMap<ElementId, u64>,
    count_writes: usize,
    progress: Option<f64>,
}

impl Default for SimHost {
    fn default() -> Self {
        Self::new()
    }
}

impl SimHost {
    /// A fully capable host with a 1280×800 viewport over a page that can
    /// scroll 4000 px.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capabilities(Capabilities::FULL)
    }

    /// A host with the given primitives.
    #[must_use]
    pub fn with_capabilities(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            next_frame: 0,
            pending_frames: Vec::new(),
            frames_requested: 0,
            frames_cancelled: 0,
            scroll_offset: 0.0,
            max_scroll: 4000.0,
            viewport: Size::new(1280.0, 800.0),
            scroll_writes: Vec::new(),
            manual_restoration: false,
            rects: BTreeMap::new(),
            selectors: Vec::new(),
            prevented: Vec::new(),
            listeners: Vec::new(),
            observations: Vec::new(),
            reduced_motion: false,
            hidden: false,
            tilts: BTreeMap::new(),
            tilt_writes: 0,
            parallax: BTreeMap::new(),
            parallax_writes: 0,
            prepared: BTreeMap::new(),
            revealed: Vec::new(),
            counts: BTreeMap::new(),
            count_writes: 0,
            progress: None,
        }
    }

    // -- Setup ------------------------------------------------------------

    /// Adds (or moves) an element at a viewport-relative rect.
    pub fn set_rect(&mut self, element: ElementId, rect: Rect) {
        self.rects.insert(element, rect);
    }

    /// Removes an element from the document.
    pub fn detach(&mut self, element: ElementId) {
        self.rects.remove(&element);
    }

    /// Makes `selector` resolve to `element`.
    pub fn set_selector(&mut self, selector: impl Into<String>, element: ElementId) {
        let selector = selector.into();
        self.selectors.retain(|(s, _)| *s != selector);
        self.selectors.push((selector, element));
    }

    /// Marks `element` as a nested scroll container.
    pub fn prevent_smooth_scroll(&mut self, element: ElementId) {
        if !self.prevented.contains(&element) {
            self.prevented.push(element);
        }
    }

    /// Sets the viewport size.
    pub fn set_viewport(&mut self, size: Size) {
        self.viewport = size;
    }

    /// Sets the largest reachable scroll offset.
    pub fn set_max_scroll(&mut self, max: f64) {
        self.max_scroll = max.max(0.0);
        self.scroll_offset = self.scroll_offset.clamp(0.0, self.max_scroll);
    }

    /// Moves the native scroll offset as the user would, without recording a
    /// controller write.
    pub fn user_scroll_to(&mut self, offset: f64) {
        self.scroll_offset = offset.clamp(0.0, self.max_scroll);
    }

    /// Changes which primitives are available from now on. Frames and
    /// listeners already handed out stay live.
    pub fn set_capabilities(&mut self, capabilities: Capabilities) {
        self.capabilities = capabilities;
    }

    /// Sets the reduced-motion preference the host reports.
    pub fn set_prefers_reduced_motion(&mut self, reduce: bool) {
        self.reduced_motion = reduce;
    }

    /// Sets the document visibility the host reports.
    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    // -- Frames -----------------------------------------------------------

    /// Takes every outstanding frame request, oldest first.
    pub fn take_frames(&mut self) -> Vec<FrameRequest> {
        core::mem::take(&mut self.pending_frames)
    }

    /// Outstanding frame requests.
    #[must_use]
    pub fn pending_frames(&self) -> usize {
        self.pending_frames.len()
    }

    /// Frame requests ever issued.
    #[must_use]
    pub fn frames_requested(&self) -> usize {
        self.frames_requested
    }

    /// Frame requests cancelled before delivery.
    #[must_use]
    pub fn frames_cancelled(&self) -> usize {
        self.frames_cancelled
    }

    // -- Listeners and observations -------------------------------------

    /// Attached listeners. Repeated registrations of the same pair share
    /// one attachment.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Attached listeners of one kind, on any target.
    #[must_use]
    pub fn listeners_of(&self, listener: Listener) -> usize {
        self.listeners
            .iter()
            .filter(|(_, l, _)| *l == listener)
            .count()
    }

    /// Whether `listener` is attached to `target`.
    #[must_use]
    pub fn is_listening(&self, target: ListenTarget, listener: Listener) -> bool {
        self.registrations(target, listener) > 0
    }

    /// Outstanding `listen` calls for `listener` on `target`.
    #[must_use]
    pub fn registrations(&self, target: ListenTarget, listener: Listener) -> usize {
        self.listeners
            .iter()
            .find(|(t, l, _)| (*t, *l) == (target, listener))
            .map_or(0, |(_, _, count)| *count)
    }

    /// Live intersection observations.
    #[must_use]
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Number of live intersection observations.
    #[must_use]
    pub fn observation_count(&self) -> usize {
        self.observations.len()
    }

    // -- Scroll -----------------------------------------------------------

    /// Every native offset the engine wrote, in order.
    #[must_use]
    pub fn scroll_writes(&self) -> &[f64] {
        &self.scroll_writes
    }

    /// Whether manual scroll restoration was requested.
    #[must_use]
    pub fn manual_restoration(&self) -> bool {
        self.manual_restoration
    }

    /// Last published scroll progress.
    #[must_use]
    pub fn progress(&self) -> Option<f64> {
        self.progress
    }

    // -- Presentation -----------------------------------------------------

    /// The tilt currently shown on `element`, if any.
    #[must_use]
    pub fn tilt(&self, element: ElementId) -> Option<TiltTransform> {
        self.tilts.get(&element).copied()
    }

    /// Number of tilt writes.
    #[must_use]
    pub fn tilt_writes(&self) -> usize {
        self.tilt_writes
    }

    /// The parallax offset currently shown on `element`, if any.
    #[must_use]
    pub fn parallax(&self, element: ElementId) -> Option<(ParallaxAxis, f64)> {
        self.parallax.get(&element).copied()
    }

    /// Number of parallax writes.
    #[must_use]
    pub fn parallax_writes(&self) -> usize {
        self.parallax_writes
    }

    /// The pre-reveal style currently applied to `element`, if any.
    #[must_use]
    pub fn prepared(&self, element: ElementId) -> Option<RevealStyle> {
        self.prepared.get(&element).copied()
    }

    /// Whether `element` has been revealed (and not cleared since).
    #[must_use]
    pub fn is_revealed(&self, element: ElementId) -> bool {
        self.revealed.contains(&element)
    }

    /// The counter value shown on `element`, if any.
    #[must_use]
    pub fn count(&self, element: ElementId) -> Option<u64> {
        self.counts.get(&element).copied()
    }

    /// Number of counter writes.
    #[must_use]
    pub fn count_writes(&self) -> usize {
        self.count_writes
    }
}

impl Host for SimHost {
    fn request_frame(&mut self) -> Option<FrameRequest> {
        if !self.capabilities.frames {
            return None;
        }
        let request = FrameRequest(self.next_frame);
        self.next_frame = self.next_frame.wrapping_add(1);
        self.pending_frames.push(request);
        self.frames_requested += 1;
        Some(request)
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        let before = self.pending_frames.len();
        self.pending_frames.retain(|r| *r != request);
        self.frames_cancelled += before - self.pending_frames.len();
    }

    fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    fn set_scroll_offset(&mut self, offset: f64) {
        self.scroll_offset = offset.clamp(0.0, self.max_scroll);
        self.scroll_writes.push(self.scroll_offset);
    }

    fn viewport_size(&self) -> Size {
        self.viewport
    }

    fn max_scroll(&self) -> f64 {
        self.max_scroll
    }

    fn set_manual_scroll_restoration(&mut self) {
        self.manual_restoration = true;
    }

    fn element_rect(&self, element: ElementId) -> Option<Rect> {
        self.rects.get(&element).copied()
    }

    fn query_selector(&mut self, selector: &str) -> Option<ElementId> {
        self.selectors
            .iter()
            .find(|(s, _)| s == selector)
            .map(|(_, e)| *e)
            .filter(|e| self.rects.contains_key(e))
    }

    fn prevents_smooth_scroll(&self, element: ElementId) -> bool {
        self.prevented.contains(&element)
    }

    fn listen(&mut self, target: ListenTarget, listener: Listener) -> bool {
        if !self.capabilities.events {
            return false;
        }
        if let ListenTarget::Element(element) = target
            && !self.rects.contains_key(&element)
        {
            return false;
        }
        match self
            .listeners
            .iter_mut()
            .find(|(t, l, _)| (*t, *l) == (target, listener))
        {
            Some((_, _, count)) => *count += 1,
            None => self.listeners.push((target, listener, 1)),
        }
        true
    }

    fn unlisten(&mut self, target: ListenTarget, listener: Listener) {
        let Some(i) = self
            .listeners
            .iter()
            .position(|(t, l, _)| (*t, *l) == (target, listener))
        else {
            return;
        };
        self.listeners[i].2 -= 1;
        if self.listeners[i].2 == 0 {
            self.listeners.remove(i);
        }
    }

    fn observe_intersection(
        &mut self,
        key: ObserverHandle,
        element: ElementId,
        threshold: f64,
        root_margin: &str,
    ) -> bool {
        if !self.capabilities.intersection || !self.rects.contains_key(&element) {
            return false;
        }
        self.observations.retain(|o| o.key != key);
        self.observations.push(Observation {
            key,
            element,
            threshold,
            root_margin: root_margin.into(),
        });
        true
    }

    fn unobserve_intersection(&mut self, key: ObserverHandle) {
        self.observations.retain(|o| o.key != key);
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    fn is_document_hidden(&self) -> bool {
        self.hidden
    }
}

impl Presenter for SimHost {
    fn apply_tilt(&mut self, element: ElementId, transform: &TiltTransform) {
        self.tilts.insert(element, *transform);
        self.tilt_writes += 1;
    }

    fn clear_tilt(&mut self, element: ElementId) {
        self.tilts.remove(&element);
    }

    fn apply_parallax(&mut self, element: ElementId, axis: ParallaxAxis, offset: f64) {
        self.parallax.insert(element, (axis, offset));
        self.parallax_writes += 1;
    }

    fn clear_parallax(&mut self, element: ElementId) {
        self.parallax.remove(&element);
    }

    fn prepare_reveal(&mut self, element: ElementId, style: &RevealStyle) {
        self.prepared.insert(element, *style);
        self.revealed.retain(|e| *e != element);
    }

    fn reveal(&mut self, element: ElementId) {
        if !self.revealed.contains(&element) {
            self.revealed.push(element);
        }
    }

    fn clear_reveal(&mut self, element: ElementId) {
        self.prepared.remove(&element);
        self.revealed.retain(|e| *e != element);
    }

    fn apply_count(&mut self, element: ElementId, value: u64) {
        self.counts.insert(element, value);
        self.count_writes += 1;
    }

    fn apply_scroll_progress(&mut self, progress: f64) {
        self.progress = Some(progress);
    }
}
