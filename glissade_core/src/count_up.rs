// Copyright 2026 the Glissade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame-clock-driven numeric counters.
//!
//! A count-up animates an integer from 0 to its target over a fixed
//! duration with an ease-out-cubic curve, floored to whole numbers, and
//! lands exactly on the target at the end. The first tick after
//! [`start`](CountUpStore::start) pins the animation's start time.

use crate::clock::{FrameClock, Subscriber, SubscriptionId};
use crate::host::{ElementId, Presenter};
use crate::slots::{SlotId, Slots};
use crate::smoothing::{Easing, progress};
use crate::time::{Duration, HostTime};

/// Count-up parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CountUpConfig {
    /// Time from 0 to the target.
    pub duration: Duration,
}

impl Default for CountUpConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(2000),
        }
    }
}

/// Displayed value at progress `p` in `[0, 1]`.
#[must_use]
pub fn count_value(target: u64, p: f64) -> u64 {
    if p >= 1.0 {
        return target;
    }
    let eased = Easing::EaseOutCubic.apply(p);
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "eased is in [0, 1), so the product is in [0, target)"
    )]
    let value = libm::floor(eased * target as f64) as u64;
    value.min(target)
}

/// Handle to a count-up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CountUpHandle(pub(crate) SlotId);

/// Where a count-up is in its run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountPhase {
    /// Mounted, not started.
    Idle,
    /// Subscribed to the frame clock.
    Running,
    /// Stopped before reaching the target.
    Stopped,
    /// Reached the target.
    Finished,
}

#[derive(Debug)]
struct CountUp {
    element: ElementId,
    target: u64,
    config: CountUpConfig,
    phase: CountPhase,
    started: Option<HostTime>,
    value: u64,
    subscription: Option<SubscriptionId>,
}

/// Arena of count-ups.
#[derive(Debug, Default)]
pub struct CountUpStore {
    counters: Slots<CountUp>,
}

impl CountUpStore {
    /// Creates an empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            counters: Slots::new(),
        }
    }

    /// Mounts an idle count-up on `element`.
    pub fn bind(
        &mut self,
        element: ElementId,
        target: u64,
        config: CountUpConfig,
    ) -> CountUpHandle {
        CountUpHandle(self.counters.insert(CountUp {
            element,
            target,
            config,
            phase: CountPhase::Idle,
            started: None,
            value: 0,
            subscription: None,
        }))
    }

    /// Starts (or restarts) a count-up from 0.
    ///
    /// Under reduced motion the target is presented immediately.
    pub fn start<P: Presenter + ?Sized>(
        &mut self,
        presenter: &mut P,
        clock: &mut FrameClock,
        handle: CountUpHandle,
        reduced_motion: bool,
    ) {
        let Some(counter) = self.counters.get_mut(handle.0) else {
            return;
        };
        counter.started = None;
        if reduced_motion {
            if let Some(sub) = counter.subscription.take() {
                clock.unsubscribe(sub);
            }
            counter.value = counter.target;
            counter.phase = CountPhase::Finished;
            presenter.apply_count(counter.element, counter.value);
            return;
        }
        counter.value = 0;
        counter.phase = CountPhase::Running;
        if counter.subscription.is_none() {
            counter.subscription = Some(clock.subscribe(Subscriber::CountUp(handle)));
        }
        presenter.apply_count(counter.element, 0);
    }

    /// Stops a running count-up at its current value.
    pub fn stop(&mut self, clock: &mut FrameClock, handle: CountUpHandle) {
        let Some(counter) = self.counters.get_mut(handle.0) else {
            return;
        };
        if let Some(sub) = counter.subscription.take() {
            clock.unsubscribe(sub);
        }
        if counter.phase == CountPhase::Running {
            counter.phase = CountPhase::Stopped;
        }
    }

    /// Destroys a count-up.
    pub fn unbind(&mut self, clock: &mut FrameClock, handle: CountUpHandle) -> Option<ElementId> {
        self.stop(clock, handle);
        self.counters.remove(handle.0).map(|c| c.element)
    }

    /// Advances a running count-up. Returns `true` when it just finished and
    /// its subscription was dropped.
    pub fn tick<P: Presenter + ?Sized>(
        &mut self,
        presenter: &mut P,
        clock: &mut FrameClock,
        handle: CountUpHandle,
        now: HostTime,
    ) -> bool {
        let Some(counter) = self.counters.get_mut(handle.0) else {
            return false;
        };
        if counter.phase != CountPhase::Running {
            return false;
        }
        let started = *counter.started.get_or_insert(now);
        let p = progress(
            now.saturating_duration_since(started).micros(),
            counter.config.duration.micros(),
        );
        let value = count_value(counter.target, p);
        if value != counter.value {
            counter.value = value;
            presenter.apply_count(counter.element, value);
        }
        if p < 1.0 {
            return false;
        }
        counter.phase = CountPhase::Finished;
        if let Some(sub) = counter.subscription.take() {
            clock.unsubscribe(sub);
        }
        true
    }

    /// Applies a reduced-motion preference. Enabling it lands every running
    /// count-up on its target.
    pub fn set_reduced_motion<P: Presenter + ?Sized>(
        &mut self,
        presenter: &mut P,
        clock: &mut FrameClock,
        reduce: bool,
    ) {
        if !reduce {
            return;
        }
        for (_, counter) in self.counters.iter_mut() {
            if counter.phase != CountPhase::Running {
                continue;
            }
            if let Some(sub) = counter.subscription.take() {
                clock.unsubscribe(sub);
            }
            counter.phase = CountPhase::Finished;
            if counter.value != counter.target {
                counter.value = counter.target;
                presenter.apply_count(counter.element, counter.target);
            }
        }
    }

    /// Destroys every count-up.
    pub fn clear(&mut self, clock: &mut FrameClock) {
        for id in self.counters.ids() {
            self.unbind(clock, CountUpHandle(id));
        }
    }

    /// Current displayed value.
    #[must_use]
    pub fn value(&self, handle: CountUpHandle) -> Option<u64> {
        self.counters.get(handle.0).map(|c| c.value)
    }

    /// Phase of a count-up; `None` for stale handles.
    #[must_use]
    pub fn phase(&self, handle: CountUpHandle) -> Option<CountPhase> {
        self.counters.get(handle.0).map(|c| c.phase)
    }

    /// Number of mounted count-ups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counters.len()
    }

    /// Whether no count-ups are mounted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}
