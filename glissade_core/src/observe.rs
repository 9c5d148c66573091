// Copyright 2026 the Glissade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Viewport-entry observation.
//!
//! [`ViewportObserverRegistry`] wraps the host's intersection primitive and
//! turns raw intersection reports into enter/leave callbacks per binding.
//! It is independent of the frame clock: everything is driven by
//! [`dispatch`](ViewportObserverRegistry::dispatch) calls from the host.
//!
//! Each binding runs a small state machine:
//!
//! ```text
//!              enter (on_enter)
//!   Pending ────────────────────► Intersecting
//!      ▲                              │
//!      └──────── leave (on_leave) ────┤ repeatable
//!                                     │
//!                        Retired ◄────┘ once
//! ```
//!
//! `Retired` and `Detached` bindings hold no live host observation. A
//! binding mounted on a missing element starts `Detached`; it can be brought
//! to life by [`rebind`](ViewportObserverRegistry::rebind)ing it to a real
//! element.
//!
//! Intersection entries are tagged with the binding's handle *and* the
//! element they were produced for. An entry whose handle is stale, or whose
//! element no longer matches the binding, is dropped, so a replaced or
//! released element never fires a late callback.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::host::{ElementId, Host, IntersectionEntry};
use crate::slots::{SlotId, Slots};
use crate::trace::ObserverTransition;

/// Callback invoked with the element that entered or left the viewport.
pub type ViewportCallback = Box<dyn FnMut(ElementId)>;

/// Handle to a viewport binding.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverHandle(pub(crate) SlotId);

impl ObserverHandle {
    /// The underlying slot id, for hosts that key observations by it.
    #[must_use]
    pub const fn slot(self) -> SlotId {
        self.0
    }
}

impl fmt::Debug for ObserverHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObserverHandle({}@gen{})", self.0.index(), self.0.generation())
    }
}

/// Binding options.
pub struct ObserveOptions {
    /// Retire after the first enter.
    pub once: bool,
    /// Visible fraction that counts as "entered", in `[0, 1]`.
    pub threshold: f64,
    /// CSS margin applied to the root (viewport) box.
    pub root_margin: String,
    on_enter: Option<ViewportCallback>,
    on_leave: Option<ViewportCallback>,
}

impl fmt::Debug for ObserveOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserveOptions")
            .field("once", &self.once)
            .field("threshold", &self.threshold)
            .field("root_margin", &self.root_margin)
            .field("on_enter", &self.on_enter.is_some())
            .field("on_leave", &self.on_leave.is_some())
            .finish()
    }
}

impl Default for ObserveOptions {
    fn default() -> Self {
        Self {
            once: true,
            threshold: 0.2,
            root_margin: String::from("0px"),
            on_enter: None,
            on_leave: None,
        }
    }
}

impl ObserveOptions {
    /// Default options: once, threshold 0.2, margin `0px`, no callbacks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets once-only triggering.
    #[must_use]
    pub fn once(mut self, once: bool) -> Self {
        self.once = once;
        self
    }

    /// Sets the threshold, clamped to `[0, 1]`. Non-finite input keeps the
    /// current value.
    #[must_use]
    pub fn threshold(mut self, threshold: f64) -> Self {
        if threshold.is_finite() {
            self.threshold = threshold.clamp(0.0, 1.0);
        }
        self
    }

    /// Sets the root margin.
    #[must_use]
    pub fn root_margin(mut self, margin: impl Into<String>) -> Self {
        self.root_margin = margin.into();
        self
    }

    /// Sets the enter callback.
    #[must_use]
    pub fn on_enter(mut self, f: impl FnMut(ElementId) + 'static) -> Self {
        self.on_enter = Some(Box::new(f));
        self
    }

    /// Sets the leave callback.
    #[must_use]
    pub fn on_leave(mut self, f: impl FnMut(ElementId) + 'static) -> Self {
        self.on_leave = Some(Box::new(f));
        self
    }
}

/// Binding state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BindingPhase {
    /// Observed, not currently intersecting.
    Pending,
    /// Observed and intersecting.
    Intersecting,
    /// A once-binding that has fired; no longer observed.
    Retired,
    /// No element could be observed; inert.
    Detached,
}

impl BindingPhase {
    /// Whether the binding holds a live host observation.
    #[must_use]
    pub const fn is_live(self) -> bool {
        matches!(self, Self::Pending | Self::Intersecting)
    }
}

struct Binding {
    element: Option<ElementId>,
    options: ObserveOptions,
    phase: BindingPhase,
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("element", &self.element)
            .field("options", &self.options)
            .field("phase", &self.phase)
            .finish()
    }
}

/// A transition produced by [`ViewportObserverRegistry::dispatch`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    /// The binding.
    pub handle: ObserverHandle,
    /// The element the entry was for.
    pub element: ElementId,
    /// What happened.
    pub kind: ObserverTransition,
}

/// Registry of viewport bindings.
#[derive(Debug, Default)]
pub struct ViewportObserverRegistry {
    bindings: Slots<Binding>,
}

impl ViewportObserverRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bindings: Slots::new(),
        }
    }

    /// Registers a binding.
    ///
    /// A missing element, or a host without an intersection primitive,
    /// yields a `Detached` binding; the handle is valid either way.
    pub fn observe<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        element: Option<ElementId>,
        options: ObserveOptions,
    ) -> ObserverHandle {
        let handle = ObserverHandle(self.bindings.insert(Binding {
            element: None,
            options,
            phase: BindingPhase::Detached,
        }));
        self.attach(host, handle, element);
        handle
    }

    /// Releases a binding. Safe to call repeatedly and on retired bindings.
    /// Returns whether the handle was live.
    pub fn unobserve<H: Host + ?Sized>(&mut self, host: &mut H, handle: ObserverHandle) -> bool {
        let Some(binding) = self.bindings.remove(handle.0) else {
            return false;
        };
        if binding.phase.is_live() {
            host.unobserve_intersection(handle);
        }
        true
    }

    /// Points a binding at a new element, dropping the old observation
    /// first. The binding restarts from `Pending`.
    pub fn rebind<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        handle: ObserverHandle,
        element: Option<ElementId>,
    ) -> Option<BindingPhase> {
        let binding = self.bindings.get_mut(handle.0)?;
        if binding.phase.is_live() {
            host.unobserve_intersection(handle);
        }
        binding.phase = BindingPhase::Detached;
        binding.element = None;
        self.attach(host, handle, element);
        self.phase(handle)
    }

    /// Routes host intersection entries to their bindings, firing callbacks
    /// and returning the transitions that happened, in entry order.
    pub fn dispatch<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        entries: &[IntersectionEntry],
    ) -> Vec<Transition> {
        let mut out = Vec::new();
        for entry in entries {
            let handle = entry.key;
            let Some(binding) = self.bindings.get_mut(handle.0) else {
                continue;
            };
            if binding.element != Some(entry.element) {
                continue;
            }
            let entered = entry.is_intersecting && entry.ratio >= binding.options.threshold;
            match (binding.phase, entered) {
                (BindingPhase::Pending, true) => {
                    binding.phase = BindingPhase::Intersecting;
                    if let Some(f) = binding.options.on_enter.as_mut() {
                        f(entry.element);
                    }
                    out.push(Transition {
                        handle,
                        element: entry.element,
                        kind: ObserverTransition::Enter,
                    });
                    if binding.options.once {
                        binding.phase = BindingPhase::Retired;
                        host.unobserve_intersection(handle);
                        out.push(Transition {
                            handle,
                            element: entry.element,
                            kind: ObserverTransition::Retire,
                        });
                    }
                }
                (BindingPhase::Intersecting, false) => {
                    binding.phase = BindingPhase::Pending;
                    if let Some(f) = binding.options.on_leave.as_mut() {
                        f(entry.element);
                    }
                    out.push(Transition {
                        handle,
                        element: entry.element,
                        kind: ObserverTransition::Leave,
                    });
                }
                _ => {}
            }
        }
        out
    }

    /// Releases every binding.
    pub fn clear<H: Host + ?Sized>(&mut self, host: &mut H) {
        for id in self.bindings.ids() {
            self.unobserve(host, ObserverHandle(id));
        }
    }

    /// Phase of a binding; `None` for released handles.
    #[must_use]
    pub fn phase(&self, handle: ObserverHandle) -> Option<BindingPhase> {
        self.bindings.get(handle.0).map(|b| b.phase)
    }

    /// Element a binding currently observes.
    #[must_use]
    pub fn element(&self, handle: ObserverHandle) -> Option<ElementId> {
        self.bindings.get(handle.0).and_then(|b| b.element)
    }

    /// Number of bindings holding a live host observation.
    #[must_use]
    pub fn live_observations(&self) -> usize {
        self.bindings
            .iter()
            .filter(|(_, b)| b.phase.is_live())
            .count()
    }

    /// Number of registered bindings, live or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether no bindings are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    fn attach<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        handle: ObserverHandle,
        element: Option<ElementId>,
    ) {
        let Some(binding) = self.bindings.get_mut(handle.0) else {
            return;
        };
        let Some(element) = element else {
            return;
        };
        binding.element = Some(element);
        let ok = host.observe_intersection(
            handle,
            element,
            binding.options.threshold,
            &binding.options.root_margin,
        );
        binding.phase = if ok {
            BindingPhase::Pending
        } else {
            BindingPhase::Detached
        };
    }
}
