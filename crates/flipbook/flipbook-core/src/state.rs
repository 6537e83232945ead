//! Flip state and the small enums shared across the engine.

use serde::{Deserialize, Serialize};

/// Direction of a flip relative to reading order.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Backward => "backward",
        }
    }
}

/// Reading order of the book. Right-to-left books turn forward pages to the right.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reading {
    #[default]
    LeftToRight,
    RightToLeft,
}

impl Reading {
    /// Stack a page leaves when flipped in `direction`.
    pub fn source_stack(self, direction: Direction) -> Stack {
        match (self, direction) {
            (Reading::LeftToRight, Direction::Forward) => Stack::Right,
            (Reading::LeftToRight, Direction::Backward) => Stack::Left,
            (Reading::RightToLeft, Direction::Forward) => Stack::Left,
            (Reading::RightToLeft, Direction::Backward) => Stack::Right,
        }
    }

    /// Sign of the horizontal pointer travel that advances a flip in `direction`.
    pub fn travel_sign(self, direction: Direction) -> f32 {
        match self.source_stack(direction) {
            Stack::Right => -1.0,
            Stack::Left => 1.0,
        }
    }
}

/// Physical side of the spine.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stack {
    Left,
    Right,
}

/// Face of a page currently turned toward the reader.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[default]
    Front,
    Back,
}

/// Lifecycle of the single in-flight flip.
///
/// `progress` is 0 for a flat page on its source stack and 1 once it lies on the
/// opposite stack.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FlipState {
    #[default]
    Idle,
    Dragging {
        direction: Direction,
        progress: f32,
    },
    Settling {
        direction: Direction,
        progress: f32,
        target: f32,
        /// Progress when the settle began.
        from: f32,
        elapsed_ms: f32,
    },
    Committed {
        from_index: usize,
        to_index: usize,
    },
}

impl FlipState {
    pub fn tag(&self) -> StateTag {
        match self {
            Self::Idle => StateTag::Idle,
            Self::Dragging { .. } => StateTag::Dragging,
            Self::Settling { .. } => StateTag::Settling,
            Self::Committed { .. } => StateTag::Committed,
        }
    }

    pub fn direction(&self) -> Option<Direction> {
        match self {
            Self::Dragging { direction, .. } | Self::Settling { direction, .. } => {
                Some(*direction)
            }
            _ => None,
        }
    }

    pub fn progress(&self) -> f32 {
        match self {
            Self::Dragging { progress, .. } | Self::Settling { progress, .. } => *progress,
            Self::Idle | Self::Committed { .. } => 0.0,
        }
    }

    pub fn is_turning(&self) -> bool {
        matches!(self, Self::Dragging { .. } | Self::Settling { .. })
    }
}

/// Payload-free view of [`FlipState`] for logs and snapshots.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateTag {
    #[default]
    Idle,
    Dragging,
    Settling,
    Committed,
}

impl StateTag {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Dragging => "dragging",
            Self::Settling => "settling",
            Self::Committed => "committed",
        }
    }
}

/// Release policy: strictly more than half turned, or flicked hard enough.
///
/// Exactly 0.5 cancels. `velocity` is measured toward completion, in page widths per second.
#[inline]
pub fn commit_policy(progress: f32, velocity: f32, flick_threshold: f32) -> bool {
    progress > 0.5 || velocity > flick_threshold
}
