// Copyright 2026 the Glissade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `requestAnimationFrame` multiplexing.
//!
//! The engine may hold more than one logical frame request at a time (the
//! frame clock's and a parallax one-shot flush). [`FrameQueue`] maps all of
//! them onto a single browser registration backed by one long-lived JS
//! closure: requests issued before the next paint share that paint, and the
//! callback delivers each of them to the engine in issue order. Requests
//! issued *during* delivery land on the following paint.
//!
//! Each callback receives a [`DOMHighResTimeStamp`][mdn] (milliseconds from
//! `performance.now()`), converted to microsecond [`HostTime`].
//!
//! [mdn]: https://developer.mozilla.org/en-US/docs/Web/API/DOMHighResTimeStamp

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::mem;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use glissade_core::host::FrameRequest;
use glissade_core::time::HostTime;

use crate::host::{WeakEngine, with_engine};

// Direct global bindings instead of `web_sys::Window` methods: avoids
// fetching (and unwrapping) the Window/Performance objects on every frame.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = performance, js_name = "now")]
    pub(crate) fn performance_now() -> f64;

    #[wasm_bindgen(js_name = "requestAnimationFrame")]
    fn request_animation_frame(callback: &JsValue) -> i32;

    #[wasm_bindgen(js_name = "cancelAnimationFrame")]
    fn cancel_animation_frame(id: i32);
}

type RafClosure = Closure<dyn FnMut(f64)>;

/// Logical frame requests multiplexed onto one `requestAnimationFrame`
/// registration.
pub(crate) struct FrameQueue {
    /// The JS closure registered with `requestAnimationFrame`. Set once by
    /// [`install`](Self::install).
    closure: RefCell<Option<RafClosure>>,

    /// The browser id of the outstanding registration, if any.
    raf_id: Cell<Option<i32>>,

    /// Logical requests waiting for the next paint, in issue order.
    pending: RefCell<Vec<FrameRequest>>,

    /// Next logical request id.
    next: Cell<u32>,
}

impl core::fmt::Debug for FrameQueue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FrameQueue")
            .field("installed", &self.closure.borrow().is_some())
            .field("raf_id", &self.raf_id.get())
            .field("pending", &self.pending.borrow().len())
            .field("next", &self.next.get())
            .finish()
    }
}

impl FrameQueue {
    pub(crate) fn new() -> Self {
        Self {
            closure: RefCell::new(None),
            raf_id: Cell::new(None),
            pending: RefCell::new(Vec::new()),
            next: Cell::new(0),
        }
    }

    /// Creates the delivery closure. Until this is called every request
    /// fails, which the engine treats as "no frame scheduler".
    pub(crate) fn install(self: &Rc<Self>, engine: WeakEngine) {
        let queue: Weak<Self> = Rc::downgrade(self);
        let closure = Closure::wrap(Box::new(move |timestamp_ms: f64| {
            let Some(queue) = queue.upgrade() else {
                return;
            };
            let now = HostTime::from_millis(timestamp_ms);
            let due = queue.take_due();
            with_engine(&engine, |e| e.host_mut().collect_garbage());
            for request in due {
                with_engine(&engine, |e| e.frame(request, now));
            }
        }) as Box<dyn FnMut(f64)>);
        *self.closure.borrow_mut() = Some(closure);
    }

    /// Cancels the browser registration and drops the delivery closure.
    pub(crate) fn uninstall(&self) {
        if let Some(id) = self.raf_id.take() {
            cancel_animation_frame(id);
        }
        self.pending.borrow_mut().clear();
        self.closure.borrow_mut().take();
    }

    pub(crate) fn request(&self) -> Option<FrameRequest> {
        let closure = self.closure.borrow();
        let closure = closure.as_ref()?;
        let request = FrameRequest(self.next.get());
        self.next.set(self.next.get().wrapping_add(1));
        self.pending.borrow_mut().push(request);
        if self.raf_id.get().is_none() {
            let id = request_animation_frame(closure.as_ref().unchecked_ref());
            self.raf_id.set(Some(id));
        }
        Some(request)
    }

    pub(crate) fn cancel(&self, request: FrameRequest) {
        let mut pending = self.pending.borrow_mut();
        pending.retain(|r| *r != request);
        if pending.is_empty()
            && let Some(id) = self.raf_id.take()
        {
            cancel_animation_frame(id);
        }
    }

    /// Claims every request due on this paint. The browser registration has
    /// fired, so new requests will register again.
    fn take_due(&self) -> Vec<FrameRequest> {
        self.raf_id.set(None);
        mem::take(&mut *self.pending.borrow_mut())
    }
}
