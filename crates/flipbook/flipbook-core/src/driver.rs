//! Animation driver: time-stepped easing of the settle phase.
//!
//! A settle over distance `d` lasts `d * flip_duration_ms`. Every tick delta is
//! clamped into `[min_tick_ms, max_tick_ms]`, which bounds the tick count at
//! `ceil(flip_duration_ms / min_tick_ms)` and keeps a stalled frame from
//! jumping the page.

use serde::{Deserialize, Serialize};

use crate::config::Config;

/// Monotonic easing curves on `[0, 1]`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    #[default]
    EaseInOut,
    EaseOut,
}

impl Easing {
    #[inline]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Easing::EaseOut => {
                let inv = 1.0 - t;
                1.0 - inv * inv * inv
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct AnimationDriver {
    easing: Easing,
    duration_ms: f32,
    min_tick_ms: f32,
    max_tick_ms: f32,
}

impl AnimationDriver {
    pub fn new(cfg: &Config) -> Self {
        Self {
            easing: cfg.easing,
            duration_ms: cfg.flip_duration_ms,
            min_tick_ms: cfg.min_tick_ms,
            max_tick_ms: cfg.max_tick_ms,
        }
    }

    /// Delta actually applied for a reported `dt_ms`. Garbage deltas count as the minimum step.
    #[inline]
    pub fn clamp_dt(&self, dt_ms: f32) -> f32 {
        if dt_ms.is_finite() {
            dt_ms.clamp(self.min_tick_ms, self.max_tick_ms)
        } else {
            self.min_tick_ms
        }
    }

    /// Upper bound on ticks for any settle.
    pub fn max_ticks(&self) -> u32 {
        (self.duration_ms / self.min_tick_ms).ceil() as u32 + 1
    }

    /// Advance `elapsed_ms` by one tick and return the eased progress between
    /// `from` and `target`. Lands exactly on `target` once the span is used up.
    pub fn step(&self, from: f32, target: f32, elapsed_ms: &mut f32, dt_ms: f32) -> f32 {
        *elapsed_ms += self.clamp_dt(dt_ms);
        if !from.is_finite() {
            return target;
        }
        let distance = target - from;
        let span = distance.abs() * self.duration_ms;
        if span <= 0.0 || *elapsed_ms >= span {
            return target;
        }
        let eased = from + distance * self.easing.apply(*elapsed_ms / span);
        if distance > 0.0 {
            eased.clamp(from, target)
        } else {
            eased.clamp(target, from)
        }
    }
}
