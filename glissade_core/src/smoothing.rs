// Copyright 2026 the Glissade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Damping and easing math shared by every continuous effect.
//!
//! All continuous motion in the engine is one of two shapes:
//!
//! - **Exponential approach**: each tick closes a fixed fraction of the
//!   remaining distance, `current += (target - current) * factor`. With
//!   `factor` in `(0, 1]` this never overshoots, and the number of ticks to
//!   settle grows with `1 / factor`. [`approach`] snaps onto the target once
//!   the remainder falls under an epsilon so that "arrived" is exact.
//! - **Timed easing**: a normalized progress `t` in `[0, 1]` derived from
//!   elapsed time, shaped by an [`Easing`] curve.

use core::fmt;

/// Distance in CSS pixels under which a scroll animation is considered
/// arrived.
pub const SCROLL_EPSILON: f64 = 0.5;

/// Angle in degrees under which a tilt animation snaps onto its target.
pub const TILT_EPSILON: f64 = 0.001;

/// A fraction of the remaining distance closed per tick, in `(0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct SmoothingFactor(f64);

impl SmoothingFactor {
    /// Closes the whole distance in one tick.
    pub const INSTANT: Self = Self(1.0);

    /// Creates a smoothing factor.
    ///
    /// # Panics
    ///
    /// Panics if `factor` is not in `(0, 1]`.
    #[must_use]
    pub const fn new(factor: f64) -> Self {
        assert!(
            factor > 0.0 && factor <= 1.0,
            "smoothing factor must be in (0, 1]"
        );
        Self(factor)
    }

    /// Creates a smoothing factor, clamping out-of-range input into
    /// `[0.01, 1]`. Non-finite input becomes [`INSTANT`](Self::INSTANT).
    #[must_use]
    pub fn saturating(factor: f64) -> Self {
        if !factor.is_finite() {
            return Self::INSTANT;
        }
        Self(factor.clamp(0.01, 1.0))
    }

    /// Returns the raw factor.
    #[inline]
    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }
}

/// One exponential-approach step without snapping.
#[inline]
#[must_use]
pub fn damp(current: f64, target: f64, factor: SmoothingFactor) -> f64 {
    current + (target - current) * factor.0
}

/// One exponential-approach step that lands exactly on `target` once within
/// `epsilon`.
///
/// Returns the new value and whether it now equals `target`.
#[inline]
#[must_use]
pub fn approach(current: f64, target: f64, factor: SmoothingFactor, epsilon: f64) -> (f64, bool) {
    let next = damp(current, target, factor);
    if (target - next).abs() < epsilon {
        (target, true)
    } else {
        (next, false)
    }
}

/// Normalized progress of a timed animation, clamped to `[0, 1]`.
///
/// A zero duration is treated as already complete.
#[must_use]
pub fn progress(elapsed_us: u64, duration_us: u64) -> f64 {
    if duration_us == 0 {
        return 1.0;
    }
    (elapsed_us as f64 / duration_us as f64).clamp(0.0, 1.0)
}

/// An easing curve mapping progress `t` in `[0, 1]` to eased progress.
#[derive(Clone, Copy)]
pub enum Easing {
    /// `t`.
    Linear,
    /// `min(1, 1.001 - 2^(-10t))`. Fast start, long soft landing.
    EaseOutExpo,
    /// `1 - (1 - t)^3`.
    EaseOutCubic,
    /// Cubic ease-in for the first half, ease-out for the second.
    EaseInOutCubic,
    /// A caller-supplied curve. It should map 0 to 0 and 1 to 1.
    Custom(fn(f64) -> f64),
}

impl Easing {
    /// Applies the curve. Input is clamped to `[0, 1]`.
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseOutExpo => (1.001 - libm::pow(2.0, -10.0 * t)).min(1.0),
            Self::EaseOutCubic => {
                let inv = 1.0 - t;
                1.0 - inv * inv * inv
            }
            Self::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let u = -2.0 * t + 2.0;
                    1.0 - u * u * u / 2.0
                }
            }
            Self::Custom(f) => f(t),
        }
    }
}

impl fmt::Debug for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => f.write_str("Linear"),
            Self::EaseOutExpo => f.write_str("EaseOutExpo"),
            Self::EaseOutCubic => f.write_str("EaseOutCubic"),
            Self::EaseInOutCubic => f.write_str("EaseInOutCubic"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
