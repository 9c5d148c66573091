// Copyright 2026 the Glissade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web backend for glissade.
//!
//! This crate provides integration with browser APIs:
//!
//! - [`WebHost`]: the [`Host`] / [`Presenter`] implementation over `web-sys`
//!   (`requestAnimationFrame`, `IntersectionObserver`, `matchMedia`, DOM
//!   listeners, CSS custom properties)
//! - [`WebEngine`]: shared ownership of an engine whose browser callbacks
//!   hold only weak references
//!
//! [`Host`]: glissade_core::host::Host
//! [`Presenter`]: glissade_core::host::Presenter

#![no_std]
#![cfg_attr(
    not(target_arch = "wasm32"),
    allow(dead_code, reason = "this crate only runs in the browser")
)]

extern crate alloc;

mod engine;
mod host;
mod raf;

pub use engine::WebEngine;
pub use host::{WebHost, wheel_delta_px};

use glissade_core::lifecycle::NavigationType;
use glissade_core::time::HostTime;

/// Returns the current host time from `performance.now()`.
#[must_use]
pub fn now() -> HostTime {
    HostTime::from_millis(raf::performance_now())
}

/// Maps a `PerformanceNavigationTiming.type` string.
#[must_use]
pub fn parse_navigation_type(kind: &str) -> NavigationType {
    match kind {
        "reload" => NavigationType::Reload,
        "back_forward" => NavigationType::BackForward,
        _ => NavigationType::Navigate,
    }
}

/// How the current document was loaded, from the performance timeline.
#[must_use]
pub fn navigation_type() -> NavigationType {
    let kind = web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.get_entries_by_type("navigation").get(0))
        .and_then(|entry| js_sys::Reflect::get(&entry, &"type".into()).ok())
        .and_then(|v| v.as_string());
    kind.as_deref().map_or(NavigationType::Navigate, parse_navigation_type)
}
