//! Engine configuration.
//!
//! Every field has a default, so hosts may pass a partial JSON object. The two
//! knobs most hosts touch also accept their camelCase names.

use serde::{Deserialize, Serialize};

use crate::driver::Easing;
use crate::error::FlipError;
use crate::state::Reading;

/// How pages are grouped into spreads.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// One page per spread.
    #[default]
    Single,
    /// Cover on its own, then facing pairs.
    Double,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Release velocity (page widths per second, toward completion) that commits
    /// a flip regardless of progress.
    #[serde(alias = "flickVelocityThreshold")]
    pub flick_velocity_threshold: f32,
    /// Width of the flip-initiating band along an outer page edge, as a
    /// fraction of the page width.
    #[serde(alias = "dragHotzoneWidth")]
    pub drag_hotzone_width: f32,
    /// Horizontal pixels a pointer must travel before a press counts as a drag.
    pub tap_threshold_px: f32,
    /// Samples older than this at release carry no velocity.
    pub flick_window_ms: f32,
    /// Time to settle across the full 0..1 range.
    pub flip_duration_ms: f32,
    pub min_tick_ms: f32,
    pub max_tick_ms: f32,
    pub easing: Easing,
    pub layout: Layout,
    pub reading: Reading,
    /// Ordinal of the page to open at.
    pub start_page: usize,
    /// Perspective distance in pixels.
    pub perspective: f32,
    /// Vertical strips the turning page is cut into.
    pub strips: u32,
    /// Total bend across the strips at mid-flip, in radians.
    pub curl: f32,
    pub ambient: f32,
    pub gloss: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            flick_velocity_threshold: 2.0,
            drag_hotzone_width: 0.25,
            tap_threshold_px: 3.0,
            flick_window_ms: 100.0,
            flip_duration_ms: 1000.0,
            min_tick_ms: 4.0,
            max_tick_ms: 50.0,
            easing: Easing::default(),
            layout: Layout::default(),
            reading: Reading::default(),
            start_page: 0,
            perspective: 2400.0,
            strips: 10,
            curl: 0.6,
            ambient: 0.4,
            gloss: 0.6,
        }
    }
}

impl Config {
    pub fn from_json(raw: &str) -> Result<Self, FlipError> {
        let cfg: Config = serde_json::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), FlipError> {
        let invalid = |reason: String| Err(FlipError::InvalidConfig { reason });

        if !(self.drag_hotzone_width > 0.0 && self.drag_hotzone_width <= 1.0) {
            return invalid(format!(
                "drag_hotzone_width must be in (0, 1], got {}",
                self.drag_hotzone_width
            ));
        }
        if !self.flick_velocity_threshold.is_finite() || self.flick_velocity_threshold < 0.0 {
            return invalid(format!(
                "flick_velocity_threshold must be a non-negative number, got {}",
                self.flick_velocity_threshold
            ));
        }
        if !(self.flip_duration_ms.is_finite() && self.flip_duration_ms > 0.0) {
            return invalid(format!(
                "flip_duration_ms must be positive, got {}",
                self.flip_duration_ms
            ));
        }
        if !(self.min_tick_ms > 0.0 && self.min_tick_ms <= self.max_tick_ms) {
            return invalid(format!(
                "tick clamp must satisfy 0 < min_tick_ms <= max_tick_ms, got {}..{}",
                self.min_tick_ms, self.max_tick_ms
            ));
        }
        if self.tap_threshold_px < 0.0 || self.flick_window_ms < 0.0 {
            return invalid("thresholds must not be negative".to_string());
        }
        if self.strips == 0 {
            return invalid("strips must be at least 1".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn partial_json_overrides_named_fields() {
        let cfg =
            Config::from_json(r#"{"flickVelocityThreshold": 3.5, "layout": "double"}"#).unwrap();
        assert_eq!(cfg.flick_velocity_threshold, 3.5);
        assert_eq!(cfg.layout, Layout::Double);
        assert_eq!(cfg.drag_hotzone_width, 0.25);
        assert_eq!(cfg.reading, Reading::LeftToRight);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            Config::from_json(r#"{"drag_hotzone_width": 0}"#),
            Err(FlipError::InvalidConfig { .. })
        ));
        assert!(matches!(
            Config::from_json(r#"{"min_tick_ms": 80}"#),
            Err(FlipError::InvalidConfig { .. })
        ));
        assert!(matches!(
            Config::from_json("{"),
            Err(FlipError::Parse { .. })
        ));
    }
}
