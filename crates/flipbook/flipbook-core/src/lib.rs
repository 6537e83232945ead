//! Flipbook Core (engine-agnostic)
//!
//! Page-turn engine for paginated content: a page model, a pointer gesture
//! tracker, the flip state machine and the 3D transforms hosts paint with.
//! Hosts drive it with pointer events and frame ticks and read back a
//! [`Snapshot`] per frame; nothing here touches a DOM or a renderer.

pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod ids;
pub mod inputs;
pub mod outputs;
pub mod pages;
pub mod state;

// Re-exports for consumers (adapters)
pub use config::{Config, Layout};
pub use driver::{AnimationDriver, Easing};
pub use engine::Engine;
pub use error::FlipError;
pub use geometry::{EdgeAxis, ScreenPoint, TransformMatrix};
pub use gesture::{BookBounds, GestureSample, GestureTracker, LocalPoint, PointerEvent};
pub use ids::PageId;
pub use inputs::{BookCommand, InputEvent, Inputs};
pub use outputs::{FlipEvent, Outputs, Snapshot, Strip, TurningPage};
pub use pages::{Page, PageModel, Spread};
pub use state::{commit_policy, Direction, FlipState, Reading, Side, Stack, StateTag};

pub type Result<T> = core::result::Result<T, FlipError>;
