//! Output contracts from the core engine.
//!
//! Outputs carry a render snapshot for this frame and the list of semantic
//! events raised since the previous one. Hosts paint the snapshot however they
//! like (CSS, canvas, GPU) and forward events as page-change notifications.

use serde::{Deserialize, Serialize};

use crate::geometry::TransformMatrix;
use crate::ids::PageId;
use crate::pages::Spread;
use crate::state::{Direction, Side, StateTag};

/// One vertical slice of the turning page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Strip {
    pub index: u32,
    /// Maps strip-local `[0, 1/strips] x [0, 1]` to host pixels.
    pub matrix: TransformMatrix,
    /// Diffuse factor in `[ambient, 1]`.
    pub lighting: f32,
    pub gloss: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurningPage {
    pub direction: Direction,
    pub leaving: Option<PageId>,
    pub arriving: Option<PageId>,
    /// Face of the turning leaf the reader currently sees.
    pub visible_side: Side,
    /// Hinge angle in radians.
    pub angle: f32,
    /// Maps page-local `[0, 1] x [0, 1]` to host pixels.
    pub matrix: TransformMatrix,
    pub strips: Vec<Strip>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub state: StateTag,
    pub progress: f32,
    /// Committed spread; unchanged until a flip commits.
    pub spread: Spread,
    /// Spread uncovered underneath while a flip is in flight.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revealed: Option<Spread>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turning_page_id: Option<PageId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turning: Option<TurningPage>,
    /// Flat placement for pages still to be read.
    pub front_stack: TransformMatrix,
    /// Flat placement for pages already turned.
    pub back_stack: TransformMatrix,
}

/// Discrete signals raised while handling input and ticks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
#[non_exhaustive]
pub enum FlipEvent {
    FlipStarted { direction: Direction },
    Committed { from_index: usize, to_index: usize },
    Reverted { direction: Direction },
    GestureCancelled,
}

/// Outputs returned by Engine::update().
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    pub snapshot: Snapshot,
    #[serde(default)]
    pub events: Vec<FlipEvent>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn committed(&self) -> Option<(usize, usize)> {
        self.events.iter().find_map(|e| match e {
            FlipEvent::Committed {
                from_index,
                to_index,
            } => Some((*from_index, *to_index)),
            _ => None,
        })
    }
}
