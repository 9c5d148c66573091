// Copyright 2026 the Glissade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll-reveal styling.
//!
//! A reveal is a one-shot transition from an offset, hidden pre-state to the
//! element's natural position, triggered the first time the element crosses
//! [`REVEAL_THRESHOLD`] of the viewport. The visual transition itself is a
//! CSS transition; the engine only decides *when* to flip the element into
//! its revealed state.
//!
//! [`RevealStyle`] carries the pre-state (a `translate3d` offset plus
//! transition timing). For server-rendered markup, where no engine exists
//! yet, [`RevealStyle::inline_style`] produces the equivalent inline style
//! declaration so the first paint already shows the pre-state.

use alloc::string::String;
use core::fmt::{self, Write as _};

use kurbo::Vec2;

use crate::host::ElementId;
use crate::observe::ObserverHandle;
use crate::time::Duration;

/// Visible fraction at which a reveal fires.
pub const REVEAL_THRESHOLD: f64 = 0.15;

/// Which way an element travels while revealing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RevealDirection {
    /// Rises into place from below.
    #[default]
    Up,
    /// Drops into place from above.
    Down,
    /// Slides in from the left.
    Left,
    /// Slides in from the right.
    Right,
}

impl RevealDirection {
    /// Parses a direction name, ignoring ASCII case. Unknown names fall back
    /// to [`Up`](Self::Up).
    #[must_use]
    pub fn parse(name: &str) -> Self {
        if name.eq_ignore_ascii_case("down") {
            Self::Down
        } else if name.eq_ignore_ascii_case("left") {
            Self::Left
        } else if name.eq_ignore_ascii_case("right") {
            Self::Right
        } else {
            Self::Up
        }
    }
}

/// Reveal parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RevealConfig {
    /// Travel distance in CSS pixels.
    pub distance: f64,
    /// Transition duration.
    pub duration: Duration,
    /// Transition delay.
    pub delay: Duration,
    /// Travel direction.
    pub direction: RevealDirection,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            distance: 48.0,
            duration: Duration::from_millis(600),
            delay: Duration::ZERO,
            direction: RevealDirection::Up,
        }
    }
}

impl RevealConfig {
    /// Sets the travel distance. Non-finite values keep the default.
    #[must_use]
    pub fn with_distance(mut self, distance: f64) -> Self {
        self.distance = if distance.is_finite() { distance } else { 48.0 };
        self
    }

    /// Sets the transition duration.
    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Sets the transition delay.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sets the travel direction.
    #[must_use]
    pub fn with_direction(mut self, direction: RevealDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Resolves the pre-reveal style.
    #[must_use]
    pub fn style(&self) -> RevealStyle {
        let d = self.distance;
        let offset = match self.direction {
            RevealDirection::Up => Vec2::new(0.0, d),
            RevealDirection::Down => Vec2::new(0.0, -d),
            RevealDirection::Left => Vec2::new(-d, 0.0),
            RevealDirection::Right => Vec2::new(d, 0.0),
        };
        RevealStyle {
            offset,
            duration: self.duration,
            delay: self.delay,
        }
    }
}

/// The hidden pre-state of a revealing element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RevealStyle {
    /// Starting translation in CSS pixels.
    pub offset: Vec2,
    /// Transition duration.
    pub duration: Duration,
    /// Transition delay; zero means none.
    pub delay: Duration,
}

impl RevealStyle {
    /// The starting transform as a CSS value.
    #[must_use]
    pub fn transform(&self) -> RevealTransform {
        RevealTransform(self.offset)
    }

    /// Inline style declarations for markup rendered before the engine runs.
    #[must_use]
    pub fn inline_style(&self) -> String {
        let mut out = String::new();
        _ = write!(
            out,
            "--sr-transform:{};--sr-duration:{}ms",
            self.transform(),
            self.duration.as_millis_f64()
        );
        if self.delay != Duration::ZERO {
            let delay = self.delay.as_millis_f64();
            _ = write!(out, ";--sr-delay:{delay}ms;transition-delay:{delay}ms");
        }
        out
    }
}

/// `translate3d(...)` formatting for a reveal offset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RevealTransform(Vec2);

impl fmt::Display for RevealTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Vec2 { x, y } = self.0;
        let px = |v: f64| -> (f64, &'static str) { if v == 0.0 { (0.0, "") } else { (v, "px") } };
        let (x, xu) = px(x);
        let (y, yu) = px(y);
        write!(f, "translate3d({x}{xu}, {y}{yu}, 0)")
    }
}

/// Handle to a mounted reveal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RevealHandle(pub(crate) crate::slots::SlotId);

/// A mounted reveal: the element and the viewport binding watching it.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Reveal {
    pub(crate) element: ElementId,
    pub(crate) binding: Option<ObserverHandle>,
    pub(crate) revealed: bool,
}
