// Copyright 2026 the Glissade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The browser [`Host`] and [`Presenter`].
//!
//! [`WebHost`] keeps a registry of decorated DOM elements (indexed by
//! [`ElementId`]), owns every JS closure it hands to the browser, and writes
//! effect output as CSS custom properties and classes:
//!
//! | Effect   | Output |
//! |----------|--------|
//! | tilt     | `--tilt-rotate-x`, `--tilt-rotate-y`, `--tilt-transform` |
//! | parallax | `--parallax-offset-x` or `--parallax-offset-y` |
//! | reveal   | `--sr-transform`, `--sr-duration`, `--sr-delay`, classes `sr-base` / `sr-visible` |
//! | count-up | element text |
//! | progress | `--scroll-progress` on the root element |
//!
//! Closures whose listener or observer is released are parked until the
//! next animation frame before being dropped, since the release may happen
//! inside the closure's own invocation.

use alloc::boxed::Box;
use alloc::format;
use alloc::rc::{Rc, Weak};
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::RefCell;

use kurbo::{Point, Rect, Size};
use wasm_bindgen::JsCast as _;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, Document, Element, Event, EventTarget, HtmlElement,
    IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit, MediaQueryList,
    MouseEvent, ScrollRestoration, TouchEvent, WheelEvent, Window,
};

use glissade_core::engine::Engine;
use glissade_core::host::{
    ElementId, FrameRequest, Host, IntersectionEntry, ListenTarget, Listener, Presenter,
};
use glissade_core::lifecycle::HostSignal;
use glissade_core::observe::ObserverHandle;
use glissade_core::parallax::ParallaxAxis;
use glissade_core::reveal::RevealStyle;
use glissade_core::scroll::InputDisposition;
use glissade_core::tilt::TiltTransform;
use glissade_core::time::Duration;

use crate::raf::FrameQueue;

pub(crate) type WeakEngine = Weak<RefCell<Engine<WebHost>>>;

type EventClosure = Closure<dyn FnMut(Event)>;
type ObserverClosure = Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>;

/// Selector for containers whose wheel input stays native.
const PREVENT_WHEEL: &str = "[data-lenis-prevent], [data-lenis-prevent-wheel]";
/// Selector for containers whose touch input stays native.
const PREVENT_TOUCH: &str = "[data-lenis-prevent], [data-lenis-prevent-touch]";

const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

/// Runs `f` against the engine if it is still alive and not already
/// borrowed (re-entrant browser callbacks are dropped).
pub(crate) fn with_engine<R>(
    engine: &WeakEngine,
    f: impl FnOnce(&mut Engine<WebHost>) -> R,
) -> Option<R> {
    let shared = engine.upgrade()?;
    let mut guard = shared.try_borrow_mut().ok()?;
    Some(f(&mut guard))
}

/// Converts a `WheelEvent` delta to CSS pixels.
///
/// `mode` is `WheelEvent.deltaMode`: 0 pixels, 1 lines, 2 pages.
#[must_use]
pub fn wheel_delta_px(delta: f64, mode: u32, viewport_height: f64) -> f64 {
    match mode {
        1 => delta * 16.0,
        2 => delta * viewport_height,
        _ => delta,
    }
}

struct DomListener {
    target: ListenTarget,
    listener: Listener,
    node: EventTarget,
    closure: EventClosure,
    /// Outstanding `listen` calls sharing this attachment.
    holders: usize,
}

struct DomObserver {
    key: ObserverHandle,
    observer: IntersectionObserver,
    closure: ObserverClosure,
}

/// Browser-backed [`Host`] and [`Presenter`].
pub struct WebHost {
    window: Window,
    document: Document,
    reduced_motion: Option<MediaQueryList>,
    elements: Vec<Option<Element>>,
    listeners: Vec<DomListener>,
    observers: Vec<DomObserver>,
    spent_events: Vec<EventClosure>,
    spent_observers: Vec<ObserverClosure>,
    frames: Rc<FrameQueue>,
    engine: WeakEngine,
}

impl core::fmt::Debug for WebHost {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WebHost")
            .field("elements", &self.elements.iter().filter(|e| e.is_some()).count())
            .field("listeners", &self.listeners.len())
            .field("observers", &self.observers.len())
            .field("spent", &(self.spent_events.len() + self.spent_observers.len()))
            .field("frames", &self.frames)
            .finish_non_exhaustive()
    }
}

impl WebHost {
    pub(crate) fn new(window: Window, document: Document, frames: Rc<FrameQueue>) -> Self {
        let reduced_motion = window.match_media(REDUCED_MOTION_QUERY).ok().flatten();
        Self {
            window,
            document,
            reduced_motion,
            elements: Vec::new(),
            listeners: Vec::new(),
            observers: Vec::new(),
            spent_events: Vec::new(),
            spent_observers: Vec::new(),
            frames,
            engine: Weak::new(),
        }
    }

    pub(crate) fn attach(&mut self, engine: WeakEngine) {
        self.engine = engine;
    }

    /// Adds an element to the registry, or returns its existing id.
    pub fn register_element(&mut self, element: Element) -> ElementId {
        let node: &web_sys::Node = &element;
        let existing = self
            .elements
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|e| e.is_same_node(Some(node))));
        let idx = existing.unwrap_or_else(|| {
            self.elements.push(Some(element));
            self.elements.len() - 1
        });
        #[expect(
            clippy::cast_possible_truncation,
            reason = "element registries stay far below u32::MAX entries"
        )]
        ElementId(idx as u32)
    }

    /// Removes an element from the registry. Ids are not reused.
    pub fn unregister_element(&mut self, id: ElementId) -> Option<Element> {
        self.elements.get_mut(id.0 as usize)?.take()
    }

    /// The registered element for `id`.
    #[must_use]
    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.0 as usize).and_then(|slot| slot.as_ref())
    }

    /// Number of attached DOM listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Number of live `IntersectionObserver`s.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Drops closures released since the last frame.
    pub(crate) fn collect_garbage(&mut self) {
        self.spent_events.clear();
        self.spent_observers.clear();
    }

    /// Releases every listener and observer.
    pub(crate) fn release_all(&mut self) {
        for l in self.listeners.drain(..) {
            for name in event_names(l.listener) {
                _ = l
                    .node
                    .remove_event_listener_with_callback(name, l.closure.as_ref().unchecked_ref());
            }
            self.spent_events.push(l.closure);
        }
        for o in self.observers.drain(..) {
            o.observer.disconnect();
            self.spent_observers.push(o.closure);
        }
    }

    fn style(&self, id: ElementId) -> Option<web_sys::CssStyleDeclaration> {
        self.element(id)
            .and_then(|e| e.dyn_ref::<HtmlElement>())
            .map(HtmlElement::style)
    }

    fn event_target(&self, target: ListenTarget, listener: Listener) -> Option<EventTarget> {
        match (target, listener) {
            (ListenTarget::Window, Listener::ReducedMotionChange) => {
                self.reduced_motion.clone().map(Into::into)
            }
            (ListenTarget::Window, _) => Some(self.window.clone().into()),
            (ListenTarget::Document, _) => Some(self.document.clone().into()),
            (ListenTarget::Element(id), _) => self.element(id).cloned().map(Into::into),
        }
    }

    fn handler(&self, target: ListenTarget, listener: Listener) -> EventClosure {
        let engine = self.engine.clone();
        let element = match target {
            ListenTarget::Element(id) => Some(id),
            ListenTarget::Window | ListenTarget::Document => None,
        };
        let mut last_touch: Option<f64> = None;
        Closure::wrap(Box::new(move |event: Event| match listener {
            Listener::Wheel => on_wheel(&engine, &event),
            Listener::Touch => on_touch(&engine, &event, &mut last_touch),
            Listener::Scroll => {
                with_engine(&engine, Engine::scroll);
            }
            Listener::Resize => {
                with_engine(&engine, Engine::resize);
            }
            Listener::PointerMove => {
                if let (Some(id), Some(mouse)) = (element, event.dyn_ref::<MouseEvent>()) {
                    let pointer =
                        Point::new(f64::from(mouse.client_x()), f64::from(mouse.client_y()));
                    with_engine(&engine, |e| e.pointer_move(id, pointer));
                }
            }
            Listener::PointerLeave => {
                if let Some(id) = element {
                    with_engine(&engine, |e| e.pointer_leave(id));
                }
            }
            Listener::AnchorClick => on_anchor_click(&engine, &event),
            Listener::VisibilityChange => {
                with_engine(&engine, |e| {
                    let hidden = e.host().is_document_hidden();
                    e.signal(HostSignal::VisibilityChanged { hidden });
                });
            }
            Listener::ReducedMotionChange => {
                with_engine(&engine, |e| {
                    let reduce = e.host().prefers_reduced_motion();
                    e.signal(HostSignal::ReducedMotionChanged { reduce });
                });
            }
        }) as Box<dyn FnMut(Event)>)
    }
}

fn event_names(listener: Listener) -> &'static [&'static str] {
    match listener {
        Listener::Wheel => &["wheel"],
        Listener::Touch => &["touchstart", "touchmove"],
        Listener::Scroll => &["scroll"],
        Listener::Resize => &["resize"],
        Listener::PointerMove => &["pointermove"],
        Listener::PointerLeave => &["pointerleave"],
        Listener::AnchorClick => &["click"],
        Listener::VisibilityChange => &["visibilitychange"],
        Listener::ReducedMotionChange => &["change"],
    }
}

/// Wheel and touch listeners cancel native scrolling, so they cannot be
/// passive.
fn is_passive(listener: Listener) -> bool {
    !matches!(listener, Listener::Wheel | Listener::Touch | Listener::AnchorClick)
}

fn event_element(event: &Event) -> Option<Element> {
    event.target().and_then(|t| t.dyn_into::<Element>().ok())
}

fn inside(event: &Event, selector: &str) -> bool {
    event_element(event).is_some_and(|e| e.closest(selector).ok().flatten().is_some())
}

fn on_wheel(engine: &WeakEngine, event: &Event) {
    let Some(wheel) = event.dyn_ref::<WheelEvent>() else {
        return;
    };
    if inside(event, PREVENT_WHEEL) {
        return;
    }
    let disposition = with_engine(engine, |e| {
        let page = e.host().viewport_size().height;
        let delta = wheel_delta_px(wheel.delta_y(), wheel.delta_mode(), page);
        e.wheel(delta, None)
    });
    if disposition == Some(InputDisposition::Consumed) {
        event.prevent_default();
    }
}

fn on_touch(engine: &WeakEngine, event: &Event, last: &mut Option<f64>) {
    let Some(touch) = event.dyn_ref::<TouchEvent>() else {
        return;
    };
    let Some(point) = touch.touches().get(0) else {
        *last = None;
        return;
    };
    let y = f64::from(point.client_y());
    if event.type_() == "touchstart" {
        *last = Some(y);
        return;
    }
    let Some(previous) = last.replace(y) else {
        return;
    };
    if inside(event, PREVENT_TOUCH) {
        return;
    }
    let disposition = with_engine(engine, |e| e.touch(previous - y, None));
    if disposition == Some(InputDisposition::Consumed) {
        event.prevent_default();
    }
}

fn on_anchor_click(engine: &WeakEngine, event: &Event) {
    let Some(anchor) =
        event_element(event).and_then(|e| e.closest("a[href^='#']").ok().flatten())
    else {
        return;
    };
    let Some(href) = anchor.get_attribute("href") else {
        return;
    };
    let disposition = with_engine(engine, |e| e.anchor_click(&href));
    if disposition == Some(InputDisposition::Consumed) {
        event.prevent_default();
    }
}

fn observer_callback(
    engine: WeakEngine,
    key: ObserverHandle,
    element: ElementId,
) -> ObserverClosure {
    Closure::wrap(Box::new(move |entries: js_sys::Array, _observer: IntersectionObserver| {
        let batch: Vec<IntersectionEntry> = entries
            .iter()
            .map(|entry| {
                let entry: IntersectionObserverEntry = entry.unchecked_into();
                IntersectionEntry {
                    key,
                    element,
                    ratio: entry.intersection_ratio(),
                    is_intersecting: entry.is_intersecting(),
                }
            })
            .collect();
        with_engine(&engine, |e| e.intersections(&batch));
    }) as Box<dyn FnMut(js_sys::Array, IntersectionObserver)>)
}

fn millis(d: Duration) -> String {
    format!("{}ms", d.as_millis_f64())
}

impl Host for WebHost {
    fn request_frame(&mut self) -> Option<FrameRequest> {
        self.frames.request()
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        self.frames.cancel(request);
    }

    fn scroll_offset(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn set_scroll_offset(&mut self, offset: f64) {
        self.window.scroll_to_with_x_and_y(0.0, offset);
    }

    fn viewport_size(&self) -> Size {
        let w = self.window.inner_width().ok().and_then(|v| v.as_f64());
        let h = self.window.inner_height().ok().and_then(|v| v.as_f64());
        Size::new(w.unwrap_or(0.0), h.unwrap_or(0.0))
    }

    fn max_scroll(&self) -> f64 {
        self.document.document_element().map_or(0.0, |root| {
            f64::from(root.scroll_height() - root.client_height()).max(0.0)
        })
    }

    fn set_manual_scroll_restoration(&mut self) {
        if let Ok(history) = self.window.history() {
            _ = history.set_scroll_restoration(ScrollRestoration::Manual);
        }
    }

    fn element_rect(&self, element: ElementId) -> Option<Rect> {
        let r = self.element(element)?.get_bounding_client_rect();
        Some(Rect::new(r.left(), r.top(), r.right(), r.bottom()))
    }

    fn query_selector(&mut self, selector: &str) -> Option<ElementId> {
        let element = self.document.query_selector(selector).ok().flatten()?;
        Some(self.register_element(element))
    }

    fn prevents_smooth_scroll(&self, element: ElementId) -> bool {
        self.element(element)
            .is_some_and(|e| e.closest(PREVENT_WHEEL).ok().flatten().is_some())
    }

    fn listen(&mut self, target: ListenTarget, listener: Listener) -> bool {
        if let Some(shared) = self
            .listeners
            .iter_mut()
            .find(|l| l.target == target && l.listener == listener)
        {
            shared.holders += 1;
            return true;
        }
        let Some(node) = self.event_target(target, listener) else {
            return false;
        };
        let closure = self.handler(target, listener);
        let options = AddEventListenerOptions::new();
        options.set_passive(is_passive(listener));
        for name in event_names(listener) {
            let added = node.add_event_listener_with_callback_and_add_event_listener_options(
                name,
                closure.as_ref().unchecked_ref(),
                &options,
            );
            if added.is_err() {
                return false;
            }
        }
        self.listeners.push(DomListener {
            target,
            listener,
            node,
            closure,
            holders: 1,
        });
        true
    }

    fn unlisten(&mut self, target: ListenTarget, listener: Listener) {
        let Some(pos) = self
            .listeners
            .iter()
            .position(|l| l.target == target && l.listener == listener)
        else {
            return;
        };
        self.listeners[pos].holders -= 1;
        if self.listeners[pos].holders > 0 {
            return;
        }
        let l = self.listeners.swap_remove(pos);
        for name in event_names(listener) {
            _ = l
                .node
                .remove_event_listener_with_callback(name, l.closure.as_ref().unchecked_ref());
        }
        self.spent_events.push(l.closure);
    }

    fn observe_intersection(
        &mut self,
        key: ObserverHandle,
        element: ElementId,
        threshold: f64,
        root_margin: &str,
    ) -> bool {
        let Some(node) = self.element(element).cloned() else {
            return false;
        };
        let closure = observer_callback(self.engine.clone(), key, element);
        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(threshold));
        init.set_root_margin(root_margin);
        let Ok(observer) =
            IntersectionObserver::new_with_options(closure.as_ref().unchecked_ref(), &init)
        else {
            return false;
        };
        observer.observe(&node);
        self.observers.push(DomObserver {
            key,
            observer,
            closure,
        });
        true
    }

    fn unobserve_intersection(&mut self, key: ObserverHandle) {
        let Some(pos) = self.observers.iter().position(|o| o.key == key) else {
            return;
        };
        let o = self.observers.swap_remove(pos);
        o.observer.disconnect();
        self.spent_observers.push(o.closure);
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.reduced_motion.as_ref().is_some_and(MediaQueryList::matches)
    }

    fn is_document_hidden(&self) -> bool {
        self.document.hidden()
    }
}

impl Presenter for WebHost {
    fn apply_tilt(&mut self, element: ElementId, transform: &TiltTransform) {
        if let Some(s) = self.style(element) {
            _ = s.set_property("--tilt-rotate-x", &format!("{:.3}deg", transform.rotate_x));
            _ = s.set_property("--tilt-rotate-y", &format!("{:.3}deg", transform.rotate_y));
            _ = s.set_property("--tilt-transform", &transform.to_string());
        }
    }

    fn clear_tilt(&mut self, element: ElementId) {
        if let Some(s) = self.style(element) {
            _ = s.remove_property("--tilt-rotate-x");
            _ = s.remove_property("--tilt-rotate-y");
            _ = s.remove_property("--tilt-transform");
        }
    }

    fn apply_parallax(&mut self, element: ElementId, axis: ParallaxAxis, offset: f64) {
        let name = match axis {
            ParallaxAxis::X => "--parallax-offset-x",
            ParallaxAxis::Y => "--parallax-offset-y",
        };
        if let Some(s) = self.style(element) {
            _ = s.set_property(name, &format!("{offset:.2}px"));
        }
    }

    fn clear_parallax(&mut self, element: ElementId) {
        if let Some(s) = self.style(element) {
            _ = s.remove_property("--parallax-offset-x");
            _ = s.remove_property("--parallax-offset-y");
        }
    }

    fn prepare_reveal(&mut self, element: ElementId, style: &RevealStyle) {
        if let Some(s) = self.style(element) {
            _ = s.set_property("--sr-transform", &style.transform().to_string());
            _ = s.set_property("--sr-duration", &millis(style.duration));
            if style.delay != Duration::ZERO {
                _ = s.set_property("--sr-delay", &millis(style.delay));
                _ = s.set_property("transition-delay", &millis(style.delay));
            }
        }
        if let Some(e) = self.element(element) {
            _ = e.class_list().add_1("sr-base");
        }
    }

    fn reveal(&mut self, element: ElementId) {
        if let Some(e) = self.element(element) {
            _ = e.class_list().add_1("sr-visible");
        }
    }

    fn clear_reveal(&mut self, element: ElementId) {
        if let Some(s) = self.style(element) {
            for name in ["--sr-transform", "--sr-duration", "--sr-delay", "transition-delay"] {
                _ = s.remove_property(name);
            }
        }
        if let Some(e) = self.element(element) {
            _ = e.class_list().remove_2("sr-base", "sr-visible");
        }
    }

    fn apply_count(&mut self, element: ElementId, value: u64) {
        if let Some(e) = self.element(element) {
            e.set_text_content(Some(&value.to_string()));
        }
    }

    fn apply_scroll_progress(&mut self, progress: f64) {
        let root = self
            .document
            .document_element()
            .and_then(|e| e.dyn_into::<HtmlElement>().ok());
        if let Some(root) = root {
            _ = root
                .style()
                .set_property("--scroll-progress", &format!("{progress:.4}"));
        }
    }
}
