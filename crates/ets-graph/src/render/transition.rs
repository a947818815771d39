//! Time-driven interpolation between two visual states.
//!
//! Transitions are plain data. The host samples them against its own
//! rendering clock, so an `update` never waits for an animation to finish.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::layout::{ConnectorPath, ScreenPoint};

/// Easing function for transitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    Linear,
    QuadIn,
    QuadOut,
    QuadInOut,
    #[default]
    CubicInOut,
}

impl Easing {
    /// Apply easing to progress (0.0 to 1.0).
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::QuadIn => t * t,
            Self::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Self::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Self::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

/// Values that can be blended between two endpoints.
pub trait Interpolate: Copy {
    /// Value at eased progress `t` (0.0 = `self`, 1.0 = `to`).
    #[must_use]
    fn lerp(self, to: Self, t: f64) -> Self;
}

impl Interpolate for f64 {
    fn lerp(self, to: Self, t: f64) -> Self {
        self + (to - self) * t
    }
}

impl Interpolate for ScreenPoint {
    fn lerp(self, to: Self, t: f64) -> Self {
        Self {
            x: self.x.lerp(to.x, t),
            y: self.y.lerp(to.y, t),
        }
    }
}

impl Interpolate for ConnectorPath {
    fn lerp(self, to: Self, t: f64) -> Self {
        Self {
            start: self.start.lerp(to.start, t),
            control_start: self.control_start.lerp(to.control_start, t),
            control_end: self.control_end.lerp(to.control_end, t),
            end: self.end.lerp(to.end, t),
        }
    }
}

/// One animated property moving from `from` to `to`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition<T> {
    pub from: T,
    pub to: T,
    /// Host clock reading when the transition starts.
    pub start: Duration,
    pub duration: Duration,
    pub easing: Easing,
}

impl<T: Interpolate> Transition<T> {
    #[must_use]
    pub const fn new(from: T, to: T, start: Duration, duration: Duration, easing: Easing) -> Self {
        Self {
            from,
            to,
            start,
            duration,
            easing,
        }
    }

    /// A transition that is already at rest on `value`.
    #[must_use]
    pub const fn settled(value: T, start: Duration) -> Self {
        Self::new(value, value, start, Duration::ZERO, Easing::Linear)
    }

    /// Linear progress at `now`, 0.0 to 1.0.
    #[must_use]
    pub fn progress(&self, now: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.start);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    /// Interpolated value at `now`.
    #[must_use]
    pub fn sample(&self, now: Duration) -> T {
        self.from.lerp(self.to, self.easing.apply(self.progress(now)))
    }

    #[must_use]
    pub fn is_finished(&self, now: Duration) -> bool {
        now >= self.start.saturating_add(self.duration)
    }

    /// Restarts from the value currently shown, heading to `to` with `easing`.
    #[must_use]
    pub fn retarget(&self, to: T, now: Duration, duration: Duration, easing: Easing) -> Self {
        Self::new(self.sample(now), to, now, duration, easing)
    }
}
