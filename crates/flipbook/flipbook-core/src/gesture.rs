//! Gesture tracking: raw pointer input to book-local drag samples.
//!
//! Only the primary contact is followed. A second pointer pressing down while a
//! gesture is live cancels it.

use log::trace;
use serde::{Deserialize, Serialize};

use crate::config::{Config, Layout};
use crate::error::FlipError;
use crate::geometry::{compose, invert, project, ScreenPoint, TransformMatrix};
use crate::state::{Direction, Reading, Stack};

/// Book rectangle in host pixels.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BookBounds {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for BookBounds {
    fn default() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width: 1.0,
            height: 1.0,
        }
    }
}

fn default_primary() -> bool {
    true
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub pointer_id: i32,
    pub x: f32,
    pub y: f32,
    pub timestamp_ms: f64,
    #[serde(default = "default_primary")]
    pub is_primary: bool,
}

impl PointerEvent {
    /// Hosts can hand over NaN coordinates (detached targets, synthetic events).
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.timestamp_ms.is_finite()
    }
}

/// Point in book-local space: spine at `x = 0`, x in page widths, y in page heights.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalPoint {
    pub x: f32,
    pub y: f32,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GestureSample {
    pub start: LocalPoint,
    pub current: LocalPoint,
    pub elapsed_ms: f32,
    /// Horizontal velocity in page widths per second, +x to the right.
    pub velocity: f32,
    /// Horizontal travel in host pixels since the press.
    pub displacement_px: f32,
    /// Travel has passed the tap threshold at least once.
    pub is_drag: bool,
}

impl GestureSample {
    pub fn dx(&self) -> f32 {
        self.current.x - self.start.x
    }

    /// Flip direction implied by the sign of the horizontal travel.
    pub fn direction(&self, reading: Reading) -> Option<Direction> {
        let along = self.dx() * reading.travel_sign(Direction::Forward);
        if along > 0.0 {
            Some(Direction::Forward)
        } else if along < 0.0 {
            Some(Direction::Backward)
        } else {
            None
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum GestureSignal {
    Sample(GestureSample),
    Cancel,
    Ignored,
}

#[derive(Clone, Debug)]
struct Active {
    pointer_id: i32,
    start_px: f32,
    last_px: f32,
    start: LocalPoint,
    start_ms: f64,
    last: LocalPoint,
    last_ms: f64,
    velocity: f32,
    is_drag: bool,
}

#[derive(Debug)]
pub struct GestureTracker {
    bounds: BookBounds,
    layout: Layout,
    reading: Reading,
    hotzone: f32,
    tap_threshold_px: f32,
    flick_window_ms: f32,
    to_screen: TransformMatrix,
    to_local: TransformMatrix,
    active: Option<Active>,
}

impl GestureTracker {
    /// Starts on unit bounds: one page is one pixel square, so the mapping
    /// is a plain shift of the spine.
    pub fn new(cfg: &Config) -> Self {
        let spine_x = match (cfg.layout, cfg.reading) {
            (Layout::Single, Reading::LeftToRight) => 0.0,
            (Layout::Single, Reading::RightToLeft) => 1.0,
            (Layout::Double, _) => 0.5,
        };
        let page_w = match cfg.layout {
            Layout::Single => 1.0,
            Layout::Double => 0.5,
        };
        Self {
            bounds: BookBounds::default(),
            layout: cfg.layout,
            reading: cfg.reading,
            hotzone: cfg.drag_hotzone_width,
            tap_threshold_px: cfg.tap_threshold_px,
            flick_window_ms: cfg.flick_window_ms,
            to_screen: compose(
                &TransformMatrix::translate(spine_x, 0.0, 0.0),
                &TransformMatrix::scale(page_w, 1.0, page_w),
            ),
            to_local: compose(
                &TransformMatrix::scale(1.0 / page_w, 1.0, 1.0 / page_w),
                &TransformMatrix::translate(-spine_x, 0.0, 0.0),
            ),
            active: None,
        }
    }

    pub fn bounds(&self) -> BookBounds {
        self.bounds
    }

    /// Book-local to host pixels.
    pub fn to_screen(&self) -> &TransformMatrix {
        &self.to_screen
    }

    pub fn page_width_px(&self) -> f32 {
        match self.layout {
            Layout::Single => self.bounds.width,
            Layout::Double => self.bounds.width / 2.0,
        }
    }

    /// Rebuild the screen mapping. Degenerate bounds leave the previous mapping in place.
    pub fn set_bounds(&mut self, bounds: BookBounds) -> Result<(), FlipError> {
        let page_w = match self.layout {
            Layout::Single => bounds.width,
            Layout::Double => bounds.width / 2.0,
        };
        let spine_x = match (self.layout, self.reading) {
            (Layout::Double, _) => bounds.left + page_w,
            (Layout::Single, Reading::LeftToRight) => bounds.left,
            (Layout::Single, Reading::RightToLeft) => bounds.left + page_w,
        };
        let to_screen = compose(
            &TransformMatrix::translate(spine_x, bounds.top, 0.0),
            &TransformMatrix::scale(page_w, bounds.height, page_w),
        );
        let to_local = invert(&to_screen)?;
        self.bounds = bounds;
        self.to_screen = to_screen;
        self.to_local = to_local;
        Ok(())
    }

    pub fn to_local(&self, x: f32, y: f32) -> LocalPoint {
        let p = project(ScreenPoint { x, y, z: 0.0 }, &self.to_local);
        LocalPoint { x: p.x, y: p.y }
    }

    /// Direction of the flip a press at `point` would start, if it lands in a hotzone.
    pub fn hotzone(&self, point: LocalPoint) -> Option<Direction> {
        if !(0.0..=1.0).contains(&point.y) {
            return None;
        }
        [Direction::Forward, Direction::Backward]
            .into_iter()
            .find(|&direction| self.in_band(direction, point.x))
    }

    fn in_band(&self, direction: Direction, x: f32) -> bool {
        let hz = self.hotzone;
        let source = self.reading.source_stack(direction);
        let visible = match (self.layout, self.reading) {
            (Layout::Double, _) => None,
            (Layout::Single, Reading::LeftToRight) => Some(Stack::Right),
            (Layout::Single, Reading::RightToLeft) => Some(Stack::Left),
        };
        match (source, visible) {
            // Outer edge of a shown stack.
            (Stack::Right, None) | (Stack::Right, Some(Stack::Right)) => {
                (1.0 - hz..=1.0).contains(&x)
            }
            (Stack::Left, None) | (Stack::Left, Some(Stack::Left)) => {
                (-1.0..=-1.0 + hz).contains(&x)
            }
            // Single page: the off-screen stack is reached from the spine.
            (Stack::Left, Some(Stack::Right)) => (0.0..=hz).contains(&x),
            (Stack::Right, Some(Stack::Left)) => (-hz..=0.0).contains(&x),
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.active.is_some()
    }

    pub fn tracked_pointer(&self) -> Option<i32> {
        self.active.as_ref().map(|a| a.pointer_id)
    }

    /// Pointer pressed. Starts tracking, or cancels when another contact interrupts.
    pub fn begin(&mut self, ev: &PointerEvent) -> GestureSignal {
        if !ev.is_finite() {
            return GestureSignal::Ignored;
        }
        if let Some(active) = &self.active {
            if active.pointer_id == ev.pointer_id {
                return GestureSignal::Ignored;
            }
            trace!("pointer {} interrupted gesture", ev.pointer_id);
            self.active = None;
            return GestureSignal::Cancel;
        }
        if !ev.is_primary {
            return GestureSignal::Ignored;
        }
        let start = self.to_local(ev.x, ev.y);
        let active = Active {
            pointer_id: ev.pointer_id,
            start_px: ev.x,
            last_px: ev.x,
            start,
            start_ms: ev.timestamp_ms,
            last: start,
            last_ms: ev.timestamp_ms,
            velocity: 0.0,
            is_drag: false,
        };
        let sample = Self::sample(&active);
        self.active = Some(active);
        GestureSignal::Sample(sample)
    }

    pub fn update(&mut self, ev: &PointerEvent) -> GestureSignal {
        if !ev.is_finite() {
            return GestureSignal::Ignored;
        }
        let threshold = self.tap_threshold_px;
        let current = self.to_local(ev.x, ev.y);
        let Some(active) = self.active.as_mut() else {
            return GestureSignal::Ignored;
        };
        if active.pointer_id != ev.pointer_id {
            return GestureSignal::Ignored;
        }
        let dt_ms = ev.timestamp_ms - active.last_ms;
        if dt_ms > 0.0 {
            active.velocity = (current.x - active.last.x) / (dt_ms as f32 / 1000.0);
            active.last_ms = ev.timestamp_ms;
        }
        active.last = current;
        active.last_px = ev.x;
        if (ev.x - active.start_px).abs() >= threshold {
            active.is_drag = true;
        }
        GestureSignal::Sample(Self::sample(active))
    }

    /// Pointer released. Velocity older than the flick window is dropped.
    pub fn end(&mut self, ev: &PointerEvent) -> GestureSignal {
        if !ev.is_finite() || self.tracked_pointer() != Some(ev.pointer_id) {
            return GestureSignal::Ignored;
        }
        let moved = self
            .active
            .as_ref()
            .map(|a| self.to_local(ev.x, ev.y) != a.last)
            .unwrap_or(false);
        if moved {
            self.update(ev);
        }
        let window = self.flick_window_ms as f64;
        let Some(mut active) = self.active.take() else {
            return GestureSignal::Ignored;
        };
        if ev.timestamp_ms - active.last_ms > window {
            active.velocity = 0.0;
        }
        GestureSignal::Sample(Self::sample(&active))
    }

    pub fn cancel(&mut self) {
        self.active = None;
    }

    fn sample(active: &Active) -> GestureSample {
        GestureSample {
            start: active.start,
            current: active.last,
            elapsed_ms: (active.last_ms - active.start_ms) as f32,
            velocity: active.velocity,
            displacement_px: active.last_px - active.start_px,
            is_drag: active.is_drag,
        }
    }
}
