// Copyright 2026 the Glissade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The shared frame clock.
//!
//! [`FrameClock`] is the single per-document driver for every continuous
//! effect. It keeps at most one frame callback registered with the host at
//! any time, turns each delivered callback into a [`FrameTick`], and holds the
//! ordered list of [`Subscriber`]s that the owning
//! [`Engine`](crate::engine::Engine) fans the tick out to.
//!
//! The clock does not call subscribers itself: subscribers are entries in the
//! engine's effect arenas, so the engine walks [`FrameClock::subscribers`]
//! in registration order and dispatches to each.
//!
//! Ticks carry only the current timestamp. Subscribers that need elapsed
//! time track their own previous timestamp.

use alloc::vec::Vec;

use crate::count_up::CountUpHandle;
use crate::host::{FrameRequest, Host};
use crate::tilt::TiltHandle;
use crate::time::HostTime;

/// One frame opportunity delivered to subscribers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameTick {
    /// Host timestamp of the frame.
    pub now: HostTime,
    /// Monotonically increasing frame counter (not reset by stop/start).
    pub frame_index: u64,
}

/// Something that wants a callback on every frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Subscriber {
    /// The smooth-scroll controller.
    SmoothScroll,
    /// A pointer-tilt effect instance.
    Tilt(TiltHandle),
    /// A count-up animation.
    CountUp(CountUpHandle),
}

/// Identifies one subscription on a [`FrameClock`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ClockState {
    Stopped,
    Running { pending: FrameRequest },
}

/// A start/stop-able frame loop with an explicit subscriber list.
///
/// # Invariants
///
/// - At most one host frame registration is outstanding
///   ([`pending_requests`](Self::pending_requests) is 0 or 1).
/// - [`start`](Self::start) while running and [`stop`](Self::stop) while
///   stopped are no-ops.
/// - A callback that arrives after [`stop`](Self::stop) (or for a request the
///   clock no longer holds) produces no tick.
#[derive(Debug)]
pub struct FrameClock {
    state: ClockState,
    last_timestamp: Option<HostTime>,
    frame_counter: u64,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    /// Creates a stopped clock with no subscribers.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: ClockState::Stopped,
            last_timestamp: None,
            frame_counter: 0,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Starts the clock by registering the first frame callback.
    ///
    /// If already running this is a no-op. If the host has no frame
    /// scheduler the clock stays stopped. Returns whether the clock is
    /// running afterwards.
    pub fn start<H: Host + ?Sized>(&mut self, host: &mut H) -> bool {
        if let ClockState::Running { .. } = self.state {
            return true;
        }
        match host.request_frame() {
            Some(pending) => {
                self.state = ClockState::Running { pending };
                true
            }
            None => false,
        }
    }

    /// Stops the clock and cancels the pending frame callback.
    ///
    /// If already stopped this is a no-op.
    pub fn stop<H: Host + ?Sized>(&mut self, host: &mut H) {
        if let ClockState::Running { pending } = self.state {
            host.cancel_frame(pending);
            self.state = ClockState::Stopped;
            self.last_timestamp = None;
        }
    }

    /// Handles a delivered frame callback.
    ///
    /// Returns a tick if `request` is the callback this clock is waiting
    /// for, after re-registering for the next frame. Stale or foreign
    /// requests return `None`.
    pub fn on_frame<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        request: FrameRequest,
        now: HostTime,
    ) -> Option<FrameTick> {
        let ClockState::Running { pending } = self.state else {
            return None;
        };
        if pending != request {
            return None;
        }

        self.state = match host.request_frame() {
            Some(next) => ClockState::Running { pending: next },
            None => ClockState::Stopped,
        };

        let frame_index = self.frame_counter;
        self.frame_counter += 1;
        self.last_timestamp = Some(now);
        Some(FrameTick { now, frame_index })
    }

    /// Whether the given host request is the one this clock is waiting on.
    #[must_use]
    pub fn owns_request(&self, request: FrameRequest) -> bool {
        matches!(self.state, ClockState::Running { pending } if pending == request)
    }

    /// Returns `true` while the clock is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self.state, ClockState::Running { .. })
    }

    /// Number of outstanding host frame registrations (0 or 1).
    #[must_use]
    pub fn pending_requests(&self) -> usize {
        usize::from(self.is_running())
    }

    /// Timestamp of the most recent tick since the clock last started.
    #[must_use]
    pub fn last_timestamp(&self) -> Option<HostTime> {
        self.last_timestamp
    }

    /// Total ticks delivered over the clock's lifetime.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_counter
    }

    /// Appends a subscriber. Subscribers are visited in registration order.
    pub fn subscribe(&mut self, subscriber: Subscriber) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription = self.next_subscription.wrapping_add(1);
        self.subscribers.push((id, subscriber));
        id
    }

    /// Removes a subscription. Returns whether it was present; removing an
    /// unknown subscription is a no-op.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Iterates subscribers in registration order.
    pub fn subscribers(&self) -> impl Iterator<Item = Subscriber> + '_ {
        self.subscribers.iter().map(|(_, s)| *s)
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Drops every subscription.
    pub fn clear_subscribers(&mut self) {
        self.subscribers.clear();
    }
}
