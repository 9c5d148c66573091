// Copyright 2026 the Glissade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The engine: one owner for the clock, the scroll controller, and every
//! effect.
//!
//! [`Engine`] is what a backend holds. Platform events come in through its
//! methods, lifecycle signals are turned into [`Command`]s by the
//! [`LifecycleCoordinator`] and executed here, and frame callbacks are fanned
//! out to the clock's subscribers in registration order.
//!
//! ```text
//!   HostSignal ──► LifecycleCoordinator ──► [Command] ──► FrameClock / SmoothScrollController
//!
//!   frame(req) ──► FrameClock::on_frame ──► for each Subscriber:
//!                                             SmoothScroll → controller.tick
//!                                             Tilt(h)      → tilts.tick
//!                                             CountUp(h)   → counters.tick
//!                                           then parallax flush
//!
//!   scroll / resize ──► parallax dirty ──► next tick (or one-shot frame)
//!   intersections   ──► observer registry ──► reveal bookkeeping
//! ```

use alloc::vec::Vec;
use core::fmt;
use core::mem;

use kurbo::Point;

use crate::clock::{FrameClock, Subscriber, SubscriptionId};
use crate::count_up::{CountUpConfig, CountUpHandle, CountUpStore};
use crate::host::{
    ElementId, FrameRequest, Host, IntersectionEntry, ListenTarget, Listener, Presenter,
};
use crate::lifecycle::{Command, HostSignal, LifecycleCoordinator, NavigationType};
use crate::observe::{BindingPhase, ObserveOptions, ObserverHandle, ViewportObserverRegistry};
use crate::parallax::{ParallaxConfig, ParallaxHandle, ParallaxStore};
use crate::reveal::{REVEAL_THRESHOLD, Reveal, RevealConfig, RevealHandle};
use crate::scroll::{
    InputDisposition, ScrollConfig, ScrollStep, ScrollTarget, ScrollToOptions,
    SmoothScrollController,
};
use crate::slots::Slots;
use crate::tilt::{TiltConfig, TiltHandle, TiltStore};
use crate::time::HostTime;
use crate::trace::{
    ClockEvent, ClockTransition, EffectEvent, EffectKind, EffectOutcome, FrameEvent, LifecycleEvent,
    NoopSink, ObserverEvent, ObserverTransition, ScrollEvent, SkipReason, TraceSink,
};

/// The animation engine for one document.
pub struct Engine<H: Host + Presenter, S: TraceSink = NoopSink> {
    host: H,
    sink: S,
    lifecycle: LifecycleCoordinator,
    clock: FrameClock,
    scroll: Option<SmoothScrollController>,
    scroll_subscription: Option<SubscriptionId>,
    scroll_config: ScrollConfig,
    last_progress: Option<f64>,
    observers: ViewportObserverRegistry,
    tilts: TiltStore,
    parallax: ParallaxStore,
    reveals: Slots<Reveal>,
    counters: CountUpStore,
    reduced_motion: bool,
    host_listeners: bool,
    last_time: HostTime,
    tick_buffer: Vec<Subscriber>,
}

impl<H: Host + Presenter, S: TraceSink> fmt::Debug for Engine<H, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("lifecycle", &self.lifecycle)
            .field("clock", &self.clock)
            .field("scroll", &self.scroll)
            .field("observers", &self.observers)
            .field("tilts", &self.tilts)
            .field("parallax", &self.parallax)
            .field("reveals", &self.reveals)
            .field("counters", &self.counters)
            .field("reduced_motion", &self.reduced_motion)
            .field("last_time", &self.last_time)
            .finish_non_exhaustive()
    }
}

impl<H: Host + Presenter> Engine<H> {
    /// Creates an idle engine without tracing.
    pub fn new(host: H) -> Self {
        Self::with_sink(host, NoopSink)
    }
}

impl<H: Host + Presenter, S: TraceSink> Engine<H, S> {
    /// Creates an idle engine that reports to `sink`.
    ///
    /// The reduced-motion preference is read from the host up front so that
    /// effects bound before the ready signal already honor it.
    pub fn with_sink(host: H, sink: S) -> Self {
        let reduced_motion = host.prefers_reduced_motion();
        Self {
            host,
            sink,
            lifecycle: LifecycleCoordinator::new(),
            clock: FrameClock::new(),
            scroll: None,
            scroll_subscription: None,
            scroll_config: ScrollConfig::default(),
            last_progress: None,
            observers: ViewportObserverRegistry::new(),
            tilts: TiltStore::new(),
            parallax: ParallaxStore::new(),
            reveals: Slots::new(),
            counters: CountUpStore::new(),
            reduced_motion,
            host_listeners: false,
            last_time: HostTime(0),
            tick_buffer: Vec::new(),
        }
    }

    /// Sets the configuration used the next time the scroll controller is
    /// created.
    #[must_use]
    pub fn with_scroll_config(mut self, config: ScrollConfig) -> Self {
        self.scroll_config = config;
        self
    }

    // -- Lifecycle ----------------------------------------------------------

    /// Feeds a lifecycle signal and executes the resulting commands.
    pub fn signal(&mut self, signal: HostSignal<'_>) {
        let from = self.lifecycle.phase();
        let commands = self.lifecycle.handle(signal);
        let to = self.lifecycle.phase();
        if from != to || !commands.is_empty() {
            self.sink.on_lifecycle(&LifecycleEvent {
                at: self.last_time,
                from,
                to,
                signal: signal.kind(),
            });
        }
        for command in commands {
            self.execute(command);
        }
    }

    /// Sends a ready signal, reading visibility and reduced motion from the
    /// host.
    pub fn ready(&mut self, navigation: NavigationType, url: &str) {
        let hidden = self.host.is_document_hidden();
        let reduced_motion = self.host.prefers_reduced_motion();
        self.signal(HostSignal::Ready {
            navigation,
            url,
            hidden,
            reduced_motion,
        });
    }

    fn execute(&mut self, command: Command) {
        match command {
            Command::ManualScrollRestoration => self.host.set_manual_scroll_restoration(),
            Command::AttachHostListeners => {
                if !self.host_listeners {
                    self.host.listen(ListenTarget::Document, Listener::VisibilityChange);
                    self.host.listen(ListenTarget::Window, Listener::ReducedMotionChange);
                    self.host_listeners = true;
                }
            }
            Command::DetachHostListeners => {
                if self.host_listeners {
                    self.host.unlisten(ListenTarget::Document, Listener::VisibilityChange);
                    self.host.unlisten(ListenTarget::Window, Listener::ReducedMotionChange);
                    self.host_listeners = false;
                }
            }
            Command::InitScroll => {
                self.destroy_scroll();
                self.scroll = Some(SmoothScrollController::initialize(
                    &mut self.host,
                    self.scroll_config,
                ));
                self.scroll_subscription = Some(self.clock.subscribe(Subscriber::SmoothScroll));
            }
            Command::DestroyScroll => self.destroy_scroll(),
            Command::StartClock => {
                let transition = if self.clock.start(&mut self.host) {
                    ClockTransition::Started
                } else {
                    ClockTransition::Unavailable
                };
                self.sink.on_clock(&ClockEvent {
                    at: self.last_time,
                    transition,
                });
            }
            Command::StopClock => {
                if self.clock.is_running() {
                    self.clock.stop(&mut self.host);
                    self.sink.on_clock(&ClockEvent {
                        at: self.last_time,
                        transition: ClockTransition::Stopped,
                    });
                }
                self.parallax.schedule(&mut self.host, false);
            }
            Command::PauseScroll => {
                if let Some(scroll) = self.scroll.as_mut() {
                    scroll.pause();
                }
            }
            Command::ResumeScroll => {
                if let Some(scroll) = self.scroll.as_mut() {
                    scroll.resume();
                }
            }
            Command::ResetToTop => {
                let step = self.scroll.as_mut().and_then(|s| s.reset_to_top(&mut self.host));
                self.record_scroll(step);
            }
            Command::SyncToNative => {
                if let Some(scroll) = self.scroll.as_mut() {
                    scroll.sync_to_native(&self.host);
                }
            }
            Command::SetReducedMotion(reduce) => self.apply_reduced_motion(reduce),
        }
    }

    fn destroy_scroll(&mut self) {
        if let Some(mut scroll) = self.scroll.take() {
            scroll.destroy(&mut self.host);
        }
        if let Some(sub) = self.scroll_subscription.take() {
            self.clock.unsubscribe(sub);
        }
        self.last_progress = None;
    }

    fn apply_reduced_motion(&mut self, reduce: bool) {
        let step = self
            .scroll
            .as_mut()
            .and_then(|s| s.set_reduced_motion(&mut self.host, reduce));
        self.record_scroll(step);
        if reduce == self.reduced_motion {
            return;
        }
        self.reduced_motion = reduce;
        self.tilts.set_reduced_motion(&mut self.host, &mut self.clock, reduce);
        self.parallax.set_reduced_motion(&mut self.host, reduce);
        self.parallax.schedule(&mut self.host, self.clock.is_running());
        self.counters.set_reduced_motion(&mut self.host, &mut self.clock, reduce);
        if reduce {
            for id in self.reveals.ids() {
                self.reveal_now(RevealHandle(id));
            }
        }
    }

    // -- Frames -------------------------------------------------------------

    /// Delivers a host frame callback.
    ///
    /// The parallax one-shot flush and the clock's own callback are told
    /// apart by request id; anything else is stale and ignored.
    pub fn frame(&mut self, request: FrameRequest, now: HostTime) {
        if self.parallax.owns_request(request) {
            self.last_time = now;
            self.parallax.on_flush_frame(&mut self.host, request);
            return;
        }
        let Some(tick) = self.clock.on_frame(&mut self.host, request, now) else {
            return;
        };
        self.last_time = now;
        if !self.clock.is_running() {
            // The host refused the next frame; this tick is the last one.
            self.lifecycle.clock_lost();
            self.sink.on_clock(&ClockEvent {
                at: now,
                transition: ClockTransition::Stopped,
            });
        }
        self.sink.on_frame(&FrameEvent {
            frame_index: tick.frame_index,
            now,
            subscribers: self.clock.subscriber_count(),
        });

        let mut subscribers = mem::take(&mut self.tick_buffer);
        subscribers.clear();
        subscribers.extend(self.clock.subscribers());
        for subscriber in &subscribers {
            match *subscriber {
                Subscriber::SmoothScroll => self.tick_scroll(now),
                Subscriber::Tilt(handle) => {
                    self.tilts.tick(&mut self.host, handle);
                }
                Subscriber::CountUp(handle) => {
                    self.counters.tick(&mut self.host, &mut self.clock, handle, now);
                }
            }
        }
        self.tick_buffer = subscribers;

        self.parallax.flush_on_tick(&mut self.host);
    }

    fn tick_scroll(&mut self, now: HostTime) {
        let Some(scroll) = self.scroll.as_mut() else {
            return;
        };
        let step = scroll.tick(&mut self.host, now);
        let progress = scroll.progress(&self.host);
        if self.last_progress != Some(progress) {
            self.last_progress = Some(progress);
            self.host.apply_scroll_progress(progress);
        }
        self.record_scroll(step);
    }

    fn record_scroll(&mut self, step: Option<ScrollStep>) {
        let Some(step) = step else {
            return;
        };
        self.sink.on_scroll(&ScrollEvent {
            at: self.last_time,
            action: step.action,
            position: step.position,
            target: step.target,
        });
        self.parallax.invalidate_all();
        self.parallax.schedule(&mut self.host, self.clock.is_running());
    }

    // -- Input --------------------------------------------------------------

    /// Wheel input of `delta` CSS pixels from inside `origin`.
    ///
    /// [`Consumed`](InputDisposition::Consumed) means the backend must
    /// prevent the native scroll.
    pub fn wheel(&mut self, delta: f64, origin: Option<ElementId>) -> InputDisposition {
        let Some(scroll) = self.scroll.as_mut() else {
            return InputDisposition::PassThrough;
        };
        let (disposition, step) = scroll.wheel(&mut self.host, delta, origin);
        self.record_scroll(step);
        disposition
    }

    /// Touch-move input of `delta` CSS pixels from inside `origin`.
    pub fn touch(&mut self, delta: f64, origin: Option<ElementId>) -> InputDisposition {
        let Some(scroll) = self.scroll.as_mut() else {
            return InputDisposition::PassThrough;
        };
        let (disposition, step) = scroll.touch(&mut self.host, delta, origin);
        self.record_scroll(step);
        disposition
    }

    /// A click on a link with `href`.
    pub fn anchor_click(&mut self, href: &str) -> InputDisposition {
        let Some(scroll) = self.scroll.as_mut() else {
            return InputDisposition::PassThrough;
        };
        let (disposition, step) = scroll.anchor_click(&mut self.host, href);
        self.record_scroll(step);
        disposition
    }

    /// Programmatic scroll. Returns `false` if there is no controller or the
    /// target could not be resolved.
    pub fn scroll_to(&mut self, target: ScrollTarget<'_>, options: ScrollToOptions) -> bool {
        let Some(scroll) = self.scroll.as_mut() else {
            return false;
        };
        let step = scroll.scroll_to(&mut self.host, target, options);
        let moved = step.is_some();
        self.record_scroll(step);
        moved
    }

    /// Pointer moved to `pointer` (viewport coordinates) over `element`.
    pub fn pointer_move(&mut self, element: ElementId, pointer: Point) {
        self.tilts.pointer_move(&self.host, element, pointer);
    }

    /// Pointer left `element`.
    pub fn pointer_leave(&mut self, element: ElementId) {
        self.tilts.pointer_leave(element);
    }

    /// The native scroll offset changed.
    pub fn scroll(&mut self) {
        self.parallax.invalidate_all();
        self.parallax.schedule(&mut self.host, self.clock.is_running());
    }

    /// The viewport was resized.
    pub fn resize(&mut self) {
        self.scroll();
    }

    /// Delivers a batch of intersection reports.
    pub fn intersections(&mut self, entries: &[IntersectionEntry]) {
        let transitions = self.observers.dispatch(&mut self.host, entries);
        for t in transitions {
            self.sink.on_observer(&ObserverEvent {
                at: self.last_time,
                handle: t.handle,
                element: Some(t.element),
                transition: t.kind,
            });
            if t.kind != ObserverTransition::Enter {
                continue;
            }
            let revealed = self
                .reveals
                .iter()
                .find(|(_, r)| r.binding == Some(t.handle))
                .map(|(id, _)| RevealHandle(id));
            if let Some(handle) = revealed {
                self.reveal_now(handle);
            }
        }
    }

    // -- Viewport bindings --------------------------------------------------

    /// Registers a viewport binding. A missing element yields an inert
    /// binding that [`rebind_observer`](Self::rebind_observer) can revive.
    pub fn observe(
        &mut self,
        element: Option<ElementId>,
        options: ObserveOptions,
    ) -> ObserverHandle {
        let handle = self.observers.observe(&mut self.host, element, options);
        let outcome = match (self.observers.phase(handle), self.observers.element(handle)) {
            (Some(BindingPhase::Detached), None) => {
                EffectOutcome::Skipped(SkipReason::InvalidTarget)
            }
            (Some(BindingPhase::Detached), Some(_)) => {
                EffectOutcome::Skipped(SkipReason::Unavailable)
            }
            _ => EffectOutcome::Bound,
        };
        self.effect(EffectKind::Observer, element, outcome);
        handle
    }

    /// Releases a viewport binding. Idempotent.
    pub fn unobserve(&mut self, handle: ObserverHandle) -> bool {
        let element = self.observers.element(handle);
        if !self.observers.unobserve(&mut self.host, handle) {
            return false;
        }
        self.sink.on_observer(&ObserverEvent {
            at: self.last_time,
            handle,
            element,
            transition: ObserverTransition::Unobserve,
        });
        self.effect(EffectKind::Observer, element, EffectOutcome::Destroyed);
        true
    }

    /// Points a binding at a replacement element.
    pub fn rebind_observer(
        &mut self,
        handle: ObserverHandle,
        element: Option<ElementId>,
    ) -> Option<BindingPhase> {
        let phase = self.observers.rebind(&mut self.host, handle, element)?;
        self.sink.on_observer(&ObserverEvent {
            at: self.last_time,
            handle,
            element,
            transition: ObserverTransition::Rebind,
        });
        Some(phase)
    }

    // -- Tilt ---------------------------------------------------------------

    /// Mounts a pointer tilt on `element`.
    pub fn bind_tilt(&mut self, element: ElementId, config: TiltConfig) -> TiltHandle {
        let (handle, outcome) =
            self.tilts
                .bind(&mut self.host, &mut self.clock, element, config, self.reduced_motion);
        self.effect(EffectKind::Tilt, Some(element), outcome);
        handle
    }

    /// Destroys a tilt. Stale handles are a no-op.
    pub fn unbind_tilt(&mut self, handle: TiltHandle) {
        if let Some(element) = self.tilts.unbind(&mut self.host, &mut self.clock, handle) {
            self.effect(EffectKind::Tilt, Some(element), EffectOutcome::Destroyed);
        }
    }

    /// Moves a tilt to a replacement element.
    pub fn rebind_tilt(&mut self, handle: TiltHandle, element: ElementId) {
        let outcome = self.tilts.rebind(
            &mut self.host,
            &mut self.clock,
            handle,
            element,
            self.reduced_motion,
        );
        if let Some(outcome) = outcome {
            self.effect(EffectKind::Tilt, Some(element), outcome);
        }
    }

    // -- Parallax -----------------------------------------------------------

    /// Mounts a parallax effect on `element`; the first offset is written on
    /// the next frame.
    pub fn bind_parallax(&mut self, element: ElementId, config: ParallaxConfig) -> ParallaxHandle {
        let (handle, outcome) = self
            .parallax
            .bind(&mut self.host, element, config, self.reduced_motion);
        self.parallax.schedule(&mut self.host, self.clock.is_running());
        self.effect(EffectKind::Parallax, Some(element), outcome);
        handle
    }

    /// Destroys a parallax effect. Stale handles are a no-op.
    pub fn unbind_parallax(&mut self, handle: ParallaxHandle) {
        if let Some(element) = self.parallax.unbind(&mut self.host, handle) {
            self.effect(EffectKind::Parallax, Some(element), EffectOutcome::Destroyed);
        }
    }

    // -- Reveal -------------------------------------------------------------

    /// Mounts a scroll reveal on `element`.
    ///
    /// The element is put into its pre-reveal state and revealed on first
    /// viewport entry. Under reduced motion, or without an intersection
    /// primitive, it is revealed immediately so content is never stuck
    /// hidden.
    pub fn bind_reveal(&mut self, element: ElementId, config: RevealConfig) -> RevealHandle {
        let handle = RevealHandle(self.reveals.insert(Reveal {
            element,
            binding: None,
            revealed: false,
        }));
        if self.reduced_motion {
            self.reveal_now(handle);
            self.effect(
                EffectKind::Reveal,
                Some(element),
                EffectOutcome::Skipped(SkipReason::ReducedMotion),
            );
            return handle;
        }
        self.host.prepare_reveal(element, &config.style());
        let binding = self.observers.observe(
            &mut self.host,
            Some(element),
            ObserveOptions::new().once(true).threshold(REVEAL_THRESHOLD),
        );
        if let Some(reveal) = self.reveals.get_mut(handle.0) {
            reveal.binding = Some(binding);
        }
        let outcome = if self.observers.phase(binding) == Some(BindingPhase::Pending) {
            EffectOutcome::Bound
        } else {
            self.reveal_now(handle);
            EffectOutcome::Skipped(SkipReason::Unavailable)
        };
        self.effect(EffectKind::Reveal, Some(element), outcome);
        handle
    }

    /// Destroys a reveal and removes its styling. Stale handles are a no-op.
    pub fn unbind_reveal(&mut self, handle: RevealHandle) {
        let Some(reveal) = self.reveals.remove(handle.0) else {
            return;
        };
        if let Some(binding) = reveal.binding {
            self.observers.unobserve(&mut self.host, binding);
        }
        self.host.clear_reveal(reveal.element);
        self.effect(EffectKind::Reveal, Some(reveal.element), EffectOutcome::Destroyed);
    }

    /// Whether a reveal has been shown; `None` for stale handles.
    #[must_use]
    pub fn is_revealed(&self, handle: RevealHandle) -> Option<bool> {
        self.reveals.get(handle.0).map(|r| r.revealed)
    }

    fn reveal_now(&mut self, handle: RevealHandle) {
        let Some(reveal) = self.reveals.get_mut(handle.0) else {
            return;
        };
        if reveal.revealed {
            return;
        }
        reveal.revealed = true;
        let element = reveal.element;
        if let Some(binding) = reveal.binding.take() {
            self.observers.unobserve(&mut self.host, binding);
        }
        self.host.reveal(element);
    }

    // -- Count-up -----------------------------------------------------------

    /// Mounts an idle count-up on `element`.
    pub fn bind_count_up(
        &mut self,
        element: ElementId,
        target: u64,
        config: CountUpConfig,
    ) -> CountUpHandle {
        let handle = self.counters.bind(element, target, config);
        self.effect(EffectKind::CountUp, Some(element), EffectOutcome::Bound);
        handle
    }

    /// Starts (or restarts from 0) a count-up.
    pub fn start_count_up(&mut self, handle: CountUpHandle) {
        self.counters
            .start(&mut self.host, &mut self.clock, handle, self.reduced_motion);
    }

    /// Stops a count-up at its current value.
    pub fn stop_count_up(&mut self, handle: CountUpHandle) {
        self.counters.stop(&mut self.clock, handle);
    }

    /// Destroys a count-up. Stale handles are a no-op.
    pub fn unbind_count_up(&mut self, handle: CountUpHandle) {
        if let Some(element) = self.counters.unbind(&mut self.clock, handle) {
            self.effect(EffectKind::CountUp, Some(element), EffectOutcome::Destroyed);
        }
    }

    /// Destroys every effect and viewport binding.
    ///
    /// Used on hot reload, where the decorated elements go away together
    /// with the module that mounted them.
    pub fn unbind_all(&mut self) {
        for id in self.reveals.ids() {
            self.unbind_reveal(RevealHandle(id));
        }
        self.observers.clear(&mut self.host);
        self.tilts.clear(&mut self.host, &mut self.clock);
        self.parallax.clear(&mut self.host);
        self.counters.clear(&mut self.clock);
    }

    fn effect(&mut self, kind: EffectKind, element: Option<ElementId>, outcome: EffectOutcome) {
        self.sink.on_effect(&EffectEvent {
            at: self.last_time,
            kind,
            element,
            outcome,
        });
    }

    // -- Accessors ----------------------------------------------------------

    /// The host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The host, mutably.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The trace sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// The trace sink, mutably.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Consumes the engine, returning the host and sink.
    pub fn into_parts(self) -> (H, S) {
        (self.host, self.sink)
    }

    /// The lifecycle coordinator.
    pub fn lifecycle(&self) -> &LifecycleCoordinator {
        &self.lifecycle
    }

    /// The frame clock.
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// The smooth-scroll controller, if initialized.
    pub fn scroll_controller(&self) -> Option<&SmoothScrollController> {
        self.scroll.as_ref()
    }

    /// The viewport observer registry.
    pub fn observers(&self) -> &ViewportObserverRegistry {
        &self.observers
    }

    /// Tilt instances.
    pub fn tilts(&self) -> &TiltStore {
        &self.tilts
    }

    /// Parallax instances.
    pub fn parallax(&self) -> &ParallaxStore {
        &self.parallax
    }

    /// Count-ups.
    pub fn counters(&self) -> &CountUpStore {
        &self.counters
    }

    /// Whether reduced motion is in effect.
    pub fn reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    /// Timestamp of the last frame the engine processed.
    pub fn last_time(&self) -> HostTime {
        self.last_time
    }
}
