//! Input contracts for the core engine.
//!
//! Hosts forward pointer events and book commands, either one at a time through
//! `Engine::handle` / `Engine::command` or batched into `Engine::update` each frame.

use serde::{Deserialize, Serialize};

use crate::gesture::{BookBounds, PointerEvent};
use crate::state::Direction;

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Inputs {
    /// Book-level commands applied before pointer events.
    #[serde(default)]
    pub commands: Vec<BookCommand>,
    /// Pointer events in delivery order.
    #[serde(default)]
    pub events: Vec<InputEvent>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    PointerDown(PointerEvent),
    PointerMove(PointerEvent),
    PointerUp(PointerEvent),
    /// The host's input layer aborted the contact.
    PointerCancel,
    /// The pointer left the tracked surface.
    PointerLeave,
    /// The window lost focus.
    Blur,
}

impl InputEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::PointerDown(_) => "pointer-down",
            Self::PointerMove(_) => "pointer-move",
            Self::PointerUp(_) => "pointer-up",
            Self::PointerCancel => "pointer-cancel",
            Self::PointerLeave => "pointer-leave",
            Self::Blur => "blur",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum BookCommand {
    /// Animate a whole flip without a gesture.
    Flip { direction: Direction },
    /// Jump to a spread without animating.
    GoTo { spread: usize },
    SetBounds(BookBounds),
}
