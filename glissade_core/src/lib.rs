// Copyright 2026 the Glissade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame clock, smooth scrolling, and viewport-driven effects for a single
//! shared animation loop.
//!
//! `glissade_core` is the host-agnostic heart of a client-side animation
//! engine. It is `no_std` compatible (with `alloc`) and performs no I/O:
//! everything it needs from the platform goes through the [`Host`] and
//! [`Presenter`] traits, and everything the platform reports comes back in
//! through [`Engine`] methods.
//!
//! # Architecture
//!
//! ```text
//!   host signals ──► LifecycleCoordinator ──► Command ──┐
//!                                                       ▼
//!   frame(req) ────────────────────────────────► FrameClock ──► subscribers, in order
//!                                                       │         ├─ SmoothScrollController
//!                                                       │         ├─ tilt instances
//!                                                       │         └─ count-ups
//!                                                       └──► parallax flush (dirty set)
//!
//!   intersections ──► ViewportObserverRegistry ──► enter / leave / retire ──► reveals
//! ```
//!
//! **[`lifecycle`]**: page-level state machine (`Idle → Active ⇄ Suspended
//! → Destroyed`) that owns the decision of when the clock runs and when
//! scrolling is paused or reset.
//!
//! **[`clock`]**: the one frame loop. At most one host frame callback is
//! outstanding; subscribers are an explicit ordered list.
//!
//! **[`scroll`]**: virtual scroll position with exponential or timed eased
//! approach, wheel/touch smoothing, and anchor interception.
//!
//! **[`observe`]**: once-only or repeatable enter/leave bindings over the
//! host's intersection primitive.
//!
//! **[`tilt`]**, **[`parallax`]**, **[`reveal`]**, **[`count_up`]**: the
//! per-element effects, stored in generational arenas ([`slots`]).
//!
//! **[`smoothing`]**: damping and easing math. **[`trace`]**: the
//! [`TraceSink`](trace::TraceSink) hook the engine reports to.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//!
//! [`Host`]: host::Host
//! [`Presenter`]: host::Presenter
//! [`Engine`]: engine::Engine

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod clock;
pub mod count_up;
pub mod dirty;
pub mod engine;
pub mod host;
pub mod lifecycle;
pub mod observe;
pub mod parallax;
pub mod reveal;
pub mod scroll;
pub mod slots;
pub mod smoothing;
pub mod tilt;
pub mod time;
pub mod trace;
