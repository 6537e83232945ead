//! Engine: owns one book's page model and flip state and drives both from
//! pointer events and animation ticks.
//!
//! Methods:
//! - new, initialize, handle (pointer events), command (flip/go-to/bounds), tick (settle)
//! - update (commands → events → tick → snapshot), snapshot
//!
//! Events that do not fit the current state are dropped; out-of-order delivery
//! from the host's input layer never leaves the book in a broken state.

use std::f32::consts::PI;

use log::{debug, trace, warn};

use crate::config::Config;
use crate::driver::AnimationDriver;
use crate::error::FlipError;
use crate::geometry::{
    backface_hidden, bend_strips, compose, compose_all, flat_matrix, rotate_around_edge,
    rotation_about_y, strip_lighting, turn_angle, EdgeAxis, TransformMatrix,
};
use crate::gesture::{BookBounds, GestureSample, GestureSignal, GestureTracker, PointerEvent};
use crate::ids::PageId;
use crate::inputs::{BookCommand, InputEvent, Inputs};
use crate::outputs::{FlipEvent, Outputs, Snapshot, Strip, TurningPage};
use crate::pages::{PageModel, Spread};
use crate::state::{commit_policy, Direction, FlipState, Reading, Side, Stack};

#[derive(Debug)]
pub struct Engine {
    cfg: Config,
    pages: PageModel,
    tracker: GestureTracker,
    driver: AnimationDriver,
    state: FlipState,

    // Raised since the last update/drain
    events: Vec<FlipEvent>,
    outputs: Outputs,
}

impl Engine {
    /// Create an engine with no pages. Call [`Engine::initialize`] before use.
    pub fn new(cfg: Config) -> Result<Self, FlipError> {
        cfg.validate()?;
        Ok(Self {
            pages: PageModel::new(),
            tracker: GestureTracker::new(&cfg),
            driver: AnimationDriver::new(&cfg),
            cfg,
            state: FlipState::Idle,
            events: Vec::new(),
            outputs: Outputs::default(),
        })
    }

    /// Load page content (in reading order), dropping any flip in progress.
    pub fn initialize<I>(&mut self, contents: I) -> Result<(), FlipError>
    where
        I: IntoIterator<Item = Option<String>>,
    {
        self.pages.initialize(
            contents,
            self.cfg.layout,
            self.cfg.reading,
            self.cfg.start_page,
        )?;
        self.tracker.cancel();
        self.set_state(FlipState::Idle);
        self.events.clear();
        debug!(
            "book initialized: {} pages, {} spreads",
            self.pages.pages().len(),
            self.pages.spread_count()
        );
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn state(&self) -> &FlipState {
        &self.state
    }

    pub fn pages(&self) -> &PageModel {
        &self.pages
    }

    pub fn tracker(&self) -> &GestureTracker {
        &self.tracker
    }

    pub fn current_spread(&self) -> Spread {
        self.pages.current_spread()
    }

    pub fn can_flip(&self, direction: Direction) -> bool {
        self.pages.can_flip(direction)
    }

    pub fn set_bounds(&mut self, bounds: BookBounds) -> Result<(), FlipError> {
        self.tracker.set_bounds(bounds).inspect_err(|e| {
            warn!("ignoring book bounds {bounds:?}: {e}");
        })
    }

    /// Events raised by `handle`/`command`/`tick` since the last call.
    pub fn drain_events(&mut self) -> Vec<FlipEvent> {
        std::mem::take(&mut self.events)
    }

    // ----- inbound: pointer events -----

    pub fn handle(&mut self, event: InputEvent) {
        let applies = match &event {
            InputEvent::PointerDown(ev) => self.pointer_down(ev),
            InputEvent::PointerMove(ev) => self.pointer_move(ev),
            InputEvent::PointerUp(ev) => self.pointer_up(ev),
            InputEvent::PointerCancel | InputEvent::PointerLeave | InputEvent::Blur => {
                self.cancel_gesture();
                true
            }
        };
        if !applies {
            self.ignore(event.name());
        }
    }

    /// Returns false when the press does not apply to the current state.
    fn pointer_down(&mut self, ev: &PointerEvent) -> bool {
        if self.tracker.is_tracking() {
            if self.tracker.begin(ev) == GestureSignal::Cancel {
                self.cancel_gesture();
            }
            return true;
        }
        if !matches!(self.state, FlipState::Idle) || self.pages.is_empty() {
            return false;
        }
        let local = self.tracker.to_local(ev.x, ev.y);
        let Some(direction) = self.tracker.hotzone(local) else {
            trace!("press at ({:.3}, {:.3}) outside hotzones", local.x, local.y);
            return true;
        };
        if !self.pages.can_flip(direction) {
            trace!(
                "no {} flip from spread {}",
                direction.as_str(),
                self.pages.index()
            );
            return true;
        }
        if let GestureSignal::Sample(_) = self.tracker.begin(ev) {
            self.set_state(FlipState::Dragging {
                direction,
                progress: 0.0,
            });
            self.events.push(FlipEvent::FlipStarted { direction });
        }
        true
    }

    fn pointer_move(&mut self, ev: &PointerEvent) -> bool {
        let FlipState::Dragging { direction, .. } = self.state else {
            return false;
        };
        if let GestureSignal::Sample(sample) = self.tracker.update(ev) {
            if sample.is_drag {
                if sample.direction(self.cfg.reading) != Some(direction) {
                    trace!(
                        "{} drag pulled back ({:.1}px after {:.0}ms)",
                        direction.as_str(),
                        sample.displacement_px,
                        sample.elapsed_ms
                    );
                }
                self.state = FlipState::Dragging {
                    direction,
                    progress: self.drag_progress(direction, &sample),
                };
            }
        }
        true
    }

    fn pointer_up(&mut self, ev: &PointerEvent) -> bool {
        let FlipState::Dragging {
            direction,
            mut progress,
        } = self.state
        else {
            return false;
        };
        let GestureSignal::Sample(sample) = self.tracker.end(ev) else {
            return true;
        };
        // A tap never flicks.
        let velocity = if sample.is_drag {
            progress = self.drag_progress(direction, &sample);
            sample.velocity * self.cfg.reading.travel_sign(direction)
        } else {
            0.0
        };
        let commit = commit_policy(progress, velocity, self.cfg.flick_velocity_threshold);
        debug!(
            "release at progress {progress:.3}, velocity {velocity:.3} -> {}",
            if commit { "commit" } else { "cancel" }
        );
        self.settle(direction, progress, if commit { 1.0 } else { 0.0 });
        true
    }

    /// Travel toward completion, in page widths, clamped to `[0, 1]`.
    fn drag_progress(&self, direction: Direction, sample: &GestureSample) -> f32 {
        (sample.dx() * self.cfg.reading.travel_sign(direction)).clamp(0.0, 1.0)
    }

    /// Roll back whatever flip is in flight. Safe from any state.
    pub fn cancel_gesture(&mut self) {
        self.tracker.cancel();
        match self.state {
            FlipState::Dragging {
                direction,
                progress,
            } => {
                self.events.push(FlipEvent::GestureCancelled);
                self.settle(direction, progress, 0.0);
            }
            FlipState::Settling {
                direction,
                progress,
                target,
                ..
            } if target > 0.0 => {
                self.events.push(FlipEvent::GestureCancelled);
                self.settle(direction, progress, 0.0);
            }
            _ => {}
        }
    }

    // ----- inbound: commands -----

    pub fn command(&mut self, command: BookCommand) -> Result<(), FlipError> {
        match command {
            BookCommand::Flip { direction } => self.flip(direction),
            BookCommand::GoTo { spread } => self.go_to(spread),
            BookCommand::SetBounds(bounds) => self.set_bounds(bounds),
        }
    }

    /// Animate a full flip without a gesture.
    pub fn flip(&mut self, direction: Direction) -> Result<(), FlipError> {
        if !matches!(self.state, FlipState::Idle) {
            self.ignore("flip");
            return Ok(());
        }
        if !self.pages.can_flip(direction) {
            return Err(FlipError::OutOfRange {
                index: self.pages.index(),
                direction,
                spreads: self.pages.spread_count(),
            });
        }
        self.events.push(FlipEvent::FlipStarted { direction });
        self.settle(direction, 0.0, 1.0);
        Ok(())
    }

    /// Jump to `spread` without animation. Ignored while a flip is in flight.
    pub fn go_to(&mut self, spread: usize) -> Result<(), FlipError> {
        if !matches!(self.state, FlipState::Idle) {
            self.ignore("go-to");
            return Ok(());
        }
        let outcome = self.pages.go_to(spread)?;
        if outcome.from_index != outcome.to_index {
            self.events.push(FlipEvent::Committed {
                from_index: outcome.from_index,
                to_index: outcome.to_index,
            });
        }
        Ok(())
    }

    // ----- inbound: animation ticks -----

    /// Advance a settle by `dt_ms`. A no-op outside `Settling`.
    pub fn tick(&mut self, dt_ms: f32) {
        let FlipState::Settling {
            direction,
            target,
            from,
            mut elapsed_ms,
            ..
        } = self.state
        else {
            return;
        };
        let progress = self.driver.step(from, target, &mut elapsed_ms, dt_ms);
        self.state = FlipState::Settling {
            direction,
            progress,
            target,
            from,
            elapsed_ms,
        };
        self.finish_if_settled();
    }

    /// Apply commands, then pointer events, then one tick, and build this frame's outputs.
    pub fn update(&mut self, dt_ms: f32, inputs: Inputs) -> &Outputs {
        self.outputs.clear();
        for command in inputs.commands {
            if let Err(e) = self.command(command) {
                warn!("{} command failed: {e}", e.category());
            }
        }
        for event in inputs.events {
            self.handle(event);
        }
        self.tick(dt_ms);
        self.outputs.snapshot = self.snapshot();
        self.outputs.events = self.drain_events();
        &self.outputs
    }

    fn settle(&mut self, direction: Direction, progress: f32, target: f32) {
        self.set_state(FlipState::Settling {
            direction,
            progress,
            target,
            from: progress,
            elapsed_ms: 0.0,
        });
        self.finish_if_settled();
    }

    /// `reachedTarget` edge: commit exactly once on arrival at 1, revert at 0.
    fn finish_if_settled(&mut self) {
        let FlipState::Settling {
            direction,
            progress,
            target,
            ..
        } = self.state
        else {
            return;
        };
        if progress != target {
            return;
        }
        if target >= 1.0 {
            match self.pages.commit_flip(direction) {
                Ok(outcome) => {
                    self.set_state(FlipState::Committed {
                        from_index: outcome.from_index,
                        to_index: outcome.to_index,
                    });
                    self.events.push(FlipEvent::Committed {
                        from_index: outcome.from_index,
                        to_index: outcome.to_index,
                    });
                }
                Err(e) => warn!("flip finished without a commit: {e}"),
            }
        } else {
            self.events.push(FlipEvent::Reverted { direction });
        }
        self.set_state(FlipState::Idle);
    }

    fn set_state(&mut self, next: FlipState) {
        if self.state.tag() != next.tag() {
            match next.direction() {
                Some(direction) => debug!(
                    "{} -> {}({})",
                    self.state.tag().name(),
                    next.tag().name(),
                    direction.as_str()
                ),
                None => debug!("{} -> {}", self.state.tag().name(), next.tag().name()),
            }
        }
        self.state = next;
    }

    fn ignore(&self, event: &str) {
        let err = FlipError::InvalidTransition {
            state: self.state.tag().name().to_string(),
            event: event.to_string(),
        };
        trace!("{err}");
    }

    // ----- outbound -----

    /// Right-to-left pages are laid out mirrored, so their front is the local back face.
    fn shows_back(&self, matrix: &TransformMatrix) -> bool {
        backface_hidden(matrix) != (self.cfg.reading == Reading::RightToLeft)
    }

    /// Render state for the current instant.
    pub fn snapshot(&self) -> Snapshot {
        let to_screen = *self.tracker.to_screen();
        let reading = self.cfg.reading;
        let unread = reading.source_stack(Direction::Forward);
        let read = reading.source_stack(Direction::Backward);

        let mut snapshot = Snapshot {
            state: self.state.tag(),
            progress: self.state.progress(),
            spread: self.pages.current_spread(),
            front_stack: compose(&to_screen, &flat_matrix(unread)),
            back_stack: compose(&to_screen, &flat_matrix(read)),
            ..Snapshot::default()
        };

        if let Some(direction) = self.state.direction() {
            let turning = self.pages.turning_pages(direction);
            snapshot.revealed = self
                .pages
                .neighbour(direction)
                .and_then(|i| self.pages.spread(i));
            snapshot.turning_page_id = turning.leaving.or(turning.arriving);
            snapshot.turning = Some(self.turning_page(
                direction,
                turning.leaving,
                turning.arriving,
                &to_screen,
            ));
        }
        snapshot
    }

    fn turning_page(
        &self,
        direction: Direction,
        leaving: Option<PageId>,
        arriving: Option<PageId>,
        to_screen: &TransformMatrix,
    ) -> TurningPage {
        let progress = self.state.progress();
        let source = self.cfg.reading.source_stack(direction);
        let angle = turn_angle(source, progress);
        let hinge = rotate_around_edge(angle, EdgeAxis::SPINE);

        // Perspective is centred on the spine at mid-height, in page-width units.
        let page_w = self.tracker.page_width_px().max(f32::EPSILON);
        let view = compose_all(&[
            *to_screen,
            TransformMatrix::translate(0.0, 0.5, 0.0),
            TransformMatrix::perspective(self.cfg.perspective / page_w),
            TransformMatrix::translate(0.0, -0.5, 0.0),
        ]);
        let matrix = compose(&view, &hinge);

        let bend_sign = match source {
            Stack::Right => -1.0,
            Stack::Left => 1.0,
        };
        let bend = bend_sign * self.cfg.curl * (PI * progress).sin();
        let strips = bend_strips(&hinge, self.cfg.strips, bend)
            .into_iter()
            .enumerate()
            .map(|(i, local)| {
                let (lighting, gloss) =
                    strip_lighting(rotation_about_y(&local), self.cfg.ambient, self.cfg.gloss);
                Strip {
                    index: i as u32,
                    matrix: compose(&view, &local),
                    lighting,
                    gloss,
                }
            })
            .collect();

        TurningPage {
            direction,
            leaving,
            arriving,
            visible_side: if self.shows_back(&matrix) {
                Side::Back
            } else {
                Side::Front
            },
            angle,
            matrix,
            strips,
        }
    }
}
