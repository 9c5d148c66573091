// Copyright 2026 the Glissade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host contract for platform integrations.
//!
//! The engine never talks to a browser directly. Everything it needs from the
//! environment goes through two traits:
//!
//! - [`Host`]: environment primitives such as frame callbacks, scroll position,
//!   element geometry, listener bookkeeping, intersection observation, and
//!   accessibility/visibility queries.
//! - [`Presenter`]: the visual side, writing tilt transforms, parallax
//!   offsets, reveal classes, and counter values onto elements.
//!
//! Every method has a default that degrades to "unavailable": frame requests
//! return `None`, observations return `false`, geometry is absent, writes do
//! nothing. [`NullHost`] is exactly those defaults, which is what a
//! non-interactive (server-side) context looks like. Building an
//! [`Engine`](crate::engine::Engine) over a `NullHost` and driving it through
//! every entry point never panics and never animates.
//!
//! # Crate boundaries
//!
//! `glissade_core` owns the state machines and math. Backend crates (e.g.
//! `glissade_backend_web`) implement these traits against a real platform
//! and forward platform events into the engine's entry points.

use core::fmt;

use kurbo::{Rect, Size};

use crate::observe::ObserverHandle;
use crate::parallax::ParallaxAxis;
use crate::reveal::RevealStyle;
use crate::tilt::TiltTransform;

/// A stable, host-assigned identity for a DOM element (or any decorated
/// node).
///
/// The engine never owns element lifetime; it only refers to elements by
/// this key.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(pub u32);

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ElementId({})", self.0)
    }
}

/// A host-issued id for one pending frame callback.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequest(pub u32);

impl fmt::Debug for FrameRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FrameRequest({})", self.0)
    }
}

/// Where an event listener is attached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListenTarget {
    /// The global window.
    Window,
    /// The document.
    Document,
    /// A specific element.
    Element(ElementId),
}

/// Which event a listener receives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Listener {
    /// Wheel input (non-passive; smooth scrolling may consume it).
    Wheel,
    /// Touch-move input.
    Touch,
    /// Passive scroll notifications.
    Scroll,
    /// Viewport resize notifications.
    Resize,
    /// Pointer movement over an element.
    PointerMove,
    /// Pointer leaving an element.
    PointerLeave,
    /// Clicks on intra-page (`href="#..."`) anchors.
    AnchorClick,
    /// Document visibility changes.
    VisibilityChange,
    /// Reduced-motion media preference changes.
    ReducedMotionChange,
}

/// One intersection report for an observed element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntersectionEntry {
    /// The binding the host observation was registered for.
    pub key: ObserverHandle,
    /// The element the observation is attached to.
    pub element: ElementId,
    /// Visible fraction of the element, in `[0, 1]`.
    pub ratio: f64,
    /// Whether the host considers the element intersecting the root.
    pub is_intersecting: bool,
}

/// Environment primitives the engine consumes.
///
/// All methods default to "unavailable". Implementations override what the
/// platform actually provides.
pub trait Host {
    /// Registers a one-shot frame callback. Returns `None` when no frame
    /// scheduler exists.
    fn request_frame(&mut self) -> Option<FrameRequest> {
        None
    }

    /// Cancels a pending frame callback.
    fn cancel_frame(&mut self, request: FrameRequest) {
        _ = request;
    }

    /// The browser's instantaneous (native) scroll offset.
    fn scroll_offset(&self) -> f64 {
        0.0
    }

    /// Writes the native scroll offset.
    fn set_scroll_offset(&mut self, offset: f64) {
        _ = offset;
    }

    /// The viewport size in CSS pixels.
    fn viewport_size(&self) -> Size {
        Size::ZERO
    }

    /// The largest reachable scroll offset.
    fn max_scroll(&self) -> f64 {
        0.0
    }

    /// Switches history scroll restoration to manual.
    fn set_manual_scroll_restoration(&mut self) {}

    /// Viewport-relative bounding rectangle of an element, or `None` if the
    /// element is unknown or detached.
    fn element_rect(&self, element: ElementId) -> Option<Rect> {
        _ = element;
        None
    }

    /// Resolves a CSS selector to an element.
    fn query_selector(&mut self, selector: &str) -> Option<ElementId> {
        _ = selector;
        None
    }

    /// Whether scroll input inside `element` must be left to native
    /// scrolling (nested scroll containers).
    fn prevents_smooth_scroll(&self, element: ElementId) -> bool {
        _ = element;
        false
    }

    /// Attaches a listener. Returns `false` if the target cannot be listened
    /// to (unknown element, no event system).
    ///
    /// Registrations are counted per `(target, listener)` pair: repeated
    /// calls share one attachment, and it stays live until a matching number
    /// of [`unlisten`](Self::unlisten) calls.
    fn listen(&mut self, target: ListenTarget, listener: Listener) -> bool {
        _ = (target, listener);
        false
    }

    /// Releases one registration, detaching the listener with the last.
    /// Detaching a listener that is not attached is a no-op.
    fn unlisten(&mut self, target: ListenTarget, listener: Listener) {
        _ = (target, listener);
    }

    /// Starts observing `element` for viewport intersection. Entries must be
    /// reported back tagged with `key`. Returns `false` if no intersection
    /// primitive exists or the element is detached.
    fn observe_intersection(
        &mut self,
        key: ObserverHandle,
        element: ElementId,
        threshold: f64,
        root_margin: &str,
    ) -> bool {
        _ = (key, element, threshold, root_margin);
        false
    }

    /// Stops an observation started with
    /// [`observe_intersection`](Self::observe_intersection).
    fn unobserve_intersection(&mut self, key: ObserverHandle) {
        _ = key;
    }

    /// Current `prefers-reduced-motion: reduce` state.
    fn prefers_reduced_motion(&self) -> bool {
        false
    }

    /// Whether the document is currently hidden (background tab).
    fn is_document_hidden(&self) -> bool {
        false
    }
}

/// Applies effect output to the host's presentation layer.
///
/// Both the DOM presenter and test doubles implement this trait.
pub trait Presenter {
    /// Writes the current tilt rotation of an element.
    fn apply_tilt(&mut self, element: ElementId, transform: &TiltTransform) {
        _ = (element, transform);
    }

    /// Removes all tilt output from an element.
    fn clear_tilt(&mut self, element: ElementId) {
        _ = element;
    }

    /// Writes a parallax offset in CSS pixels along `axis`.
    fn apply_parallax(&mut self, element: ElementId, axis: ParallaxAxis, offset: f64) {
        _ = (element, axis, offset);
    }

    /// Removes all parallax output from an element.
    fn clear_parallax(&mut self, element: ElementId) {
        _ = element;
    }

    /// Puts an element into its pre-reveal state.
    fn prepare_reveal(&mut self, element: ElementId, style: &RevealStyle) {
        _ = (element, style);
    }

    /// Transitions an element into its revealed state.
    fn reveal(&mut self, element: ElementId) {
        _ = element;
    }

    /// Removes reveal styling from an element.
    fn clear_reveal(&mut self, element: ElementId) {
        _ = element;
    }

    /// Writes the current value of a count-up animation.
    fn apply_count(&mut self, element: ElementId, value: u64) {
        _ = (element, value);
    }

    /// Publishes the smoothed page scroll progress in `[0, 1]`.
    fn apply_scroll_progress(&mut self, progress: f64) {
        _ = progress;
    }
}

/// A host with no capabilities at all.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullHost;

impl Host for NullHost {}

impl Presenter for NullHost {}
