// Copyright 2026 the Glissade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared ownership of an [`Engine`] in the browser.

use alloc::rc::Rc;
use core::cell::RefCell;

use wasm_bindgen::JsValue;
use web_sys::Element;

use glissade_core::engine::Engine;
use glissade_core::host::ElementId;
use glissade_core::lifecycle::{HostSignal, NavigationType};
use glissade_core::scroll::ScrollConfig;

use crate::host::WebHost;
use crate::raf::FrameQueue;

/// An [`Engine`] wired to the current page.
///
/// Browser callbacks hold only weak references, so dropping the
/// `WebEngine` tears everything down: the lifecycle is ended, every effect
/// is unbound, and all listeners, observers, and frame callbacks are
/// released.
pub struct WebEngine {
    inner: Rc<RefCell<Engine<WebHost>>>,
    frames: Rc<FrameQueue>,
}

impl core::fmt::Debug for WebEngine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WebEngine")
            .field("engine", &self.inner.try_borrow().ok())
            .field("frames", &self.frames)
            .finish()
    }
}

impl WebEngine {
    /// Creates an idle engine for the current window.
    ///
    /// # Errors
    ///
    /// Fails outside a browser window context.
    pub fn new(config: ScrollConfig) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let frames = Rc::new(FrameQueue::new());
        let host = WebHost::new(window, document, Rc::clone(&frames));
        let inner = Rc::new(RefCell::new(Engine::new(host).with_scroll_config(config)));
        inner.borrow_mut().host_mut().attach(Rc::downgrade(&inner));
        frames.install(Rc::downgrade(&inner));
        Ok(Self { inner, frames })
    }

    /// Runs `f` with exclusive access to the engine.
    ///
    /// Must not be called from inside another `with` call.
    pub fn with<R>(&self, f: impl FnOnce(&mut Engine<WebHost>) -> R) -> R {
        f(&mut self.inner.borrow_mut())
    }

    /// Registers an element for use as an effect target.
    pub fn register_element(&self, element: Element) -> ElementId {
        self.with(|e| e.host_mut().register_element(element))
    }

    /// The application is ready. Navigation type is read from the
    /// performance timeline.
    pub fn ready(&self) {
        let url = web_sys::window()
            .and_then(|w| w.location().href().ok())
            .unwrap_or_default();
        let navigation = crate::navigation_type();
        self.with(|e| e.ready(navigation, &url));
    }

    /// Signals a ready event with explicit navigation type and URL.
    pub fn ready_with(&self, navigation: NavigationType, url: &str) {
        self.with(|e| e.ready(navigation, url));
    }

    /// A client-side navigation began.
    pub fn navigation_start(&self) {
        self.with(|e| e.signal(HostSignal::NavigationStart));
    }

    /// A client-side navigation completed at `url`.
    pub fn navigation_finish(&self, url: &str) {
        self.with(|e| e.signal(HostSignal::NavigationFinish { url }));
    }

    /// Ends the lifecycle without dropping effects.
    pub fn teardown(&self) {
        self.with(|e| e.signal(HostSignal::Teardown));
    }
}

impl Drop for WebEngine {
    fn drop(&mut self) {
        if let Ok(mut engine) = self.inner.try_borrow_mut() {
            engine.signal(HostSignal::Teardown);
            engine.unbind_all();
            engine.host_mut().release_all();
            engine.host_mut().collect_garbage();
        }
        self.frames.uninstall();
    }
}
