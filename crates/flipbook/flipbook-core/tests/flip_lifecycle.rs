use flipbook_core::{
    commit_policy, AnimationDriver, BookBounds, BookCommand, Config, Direction, Engine,
    FlipError, FlipEvent, FlipState, InputEvent, Inputs, Layout, PointerEvent, Reading,
    StateTag,
};

const WIDTH: f32 = 500.0;
const HEIGHT: f32 = 700.0;
/// Press point inside the forward hotzone of a single left-to-right page.
const GRAB_X: f32 = 480.0;

fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn book_with(cfg: Config, pages: usize) -> Engine {
    let mut engine = Engine::new(cfg).unwrap();
    engine
        .initialize((0..pages).map(|i| Some(format!("page-{i}.png"))))
        .unwrap();
    engine
        .set_bounds(BookBounds {
            left: 0.0,
            top: 0.0,
            width: WIDTH,
            height: HEIGHT,
        })
        .unwrap();
    engine
}

fn book(pages: usize) -> Engine {
    book_with(Config::default(), pages)
}

fn ptr(x: f32, t: f64) -> PointerEvent {
    PointerEvent {
        pointer_id: 1,
        x,
        y: HEIGHT / 2.0,
        timestamp_ms: t,
        is_primary: true,
    }
}

fn down(engine: &mut Engine, x: f32, t: f64) {
    engine.handle(InputEvent::PointerDown(ptr(x, t)));
}

fn mv(engine: &mut Engine, x: f32, t: f64) {
    engine.handle(InputEvent::PointerMove(ptr(x, t)));
}

fn up(engine: &mut Engine, x: f32, t: f64) {
    engine.handle(InputEvent::PointerUp(ptr(x, t)));
}

/// Drag a forward flip to `progress` slowly (well under the flick threshold) and hold.
fn drag_slow(engine: &mut Engine, progress: f32) -> f32 {
    let x = GRAB_X - progress * WIDTH;
    down(engine, GRAB_X, 0.0);
    mv(engine, x, 1000.0);
    x
}

/// Tick until idle and return every progress value seen on the way.
fn settle(engine: &mut Engine) -> Vec<f32> {
    let limit = AnimationDriver::new(engine.config()).max_ticks();
    let mut seen = Vec::new();
    for _ in 0..limit {
        if !engine.state().is_turning() {
            return seen;
        }
        engine.tick(16.0);
        seen.push(engine.snapshot().progress);
    }
    assert!(
        !engine.state().is_turning(),
        "still {:?} after {limit} ticks",
        engine.state()
    );
    seen
}

fn committed(events: &[FlipEvent]) -> Vec<(usize, usize)> {
    events
        .iter()
        .filter_map(|e| match e {
            FlipEvent::Committed {
                from_index,
                to_index,
            } => Some((*from_index, *to_index)),
            _ => None,
        })
        .collect()
}

/// it should commit a release past the halfway mark
#[test]
fn drag_past_half_commits_once() {
    let mut engine = book(5);
    let x = drag_slow(&mut engine, 0.6);
    match engine.state() {
        FlipState::Dragging {
            direction,
            progress,
        } => {
            assert_eq!(*direction, Direction::Forward);
            approx(*progress, 0.6, 1e-5);
        }
        other => panic!("expected dragging, got {other:?}"),
    }
    up(&mut engine, x, 1010.0);
    assert_eq!(engine.state().tag(), StateTag::Settling);

    let trace = settle(&mut engine);
    assert!(!trace.is_empty());
    assert_eq!(engine.state(), &FlipState::Idle);
    assert_eq!(engine.pages().index(), 1);
    assert_eq!(committed(&engine.drain_events()), vec![(0, 1)]);
}

/// it should settle back when released before halfway
#[test]
fn drag_short_of_half_reverts() {
    let mut engine = book(5);
    let x = drag_slow(&mut engine, 0.3);
    up(&mut engine, x, 1010.0);
    settle(&mut engine);
    assert_eq!(engine.state(), &FlipState::Idle);
    assert_eq!(engine.pages().index(), 0);
    let events = engine.drain_events();
    assert!(committed(&events).is_empty());
    assert_eq!(
        events.last(),
        Some(&FlipEvent::Reverted {
            direction: Direction::Forward
        })
    );
}

/// it should not start a forward flip from the last spread
#[test]
fn last_spread_ignores_forward_drag() {
    let mut engine = book(5);
    engine.go_to(4).unwrap();
    engine.drain_events();
    let x = drag_slow(&mut engine, 0.8);
    up(&mut engine, x, 1010.0);
    settle(&mut engine);
    assert_eq!(engine.state(), &FlipState::Idle);
    assert_eq!(engine.pages().index(), 4);
    assert!(engine.drain_events().is_empty());
}

/// it should follow the release policy at and around the halfway mark
#[test]
fn release_policy_grid() {
    let threshold = Config::default().flick_velocity_threshold;
    for progress in [0.0_f32, 0.49, 0.5, 0.51, 1.0] {
        for velocity in [threshold - 0.5, threshold + 0.5] {
            let expect = progress > 0.5 || velocity > threshold;
            assert_eq!(
                commit_policy(progress, velocity, threshold),
                expect,
                "progress={progress} velocity={velocity}"
            );
        }
    }

    // Through the engine, with the flick carried by the last two samples.
    for progress in [0.0_f32, 0.49, 0.51, 1.0] {
        for fast in [false, true] {
            let mut engine = book(5);
            let target_x = GRAB_X - progress * WIDTH;
            down(&mut engine, GRAB_X, 0.0);
            if fast {
                // 25px toward completion in 5ms is 10 page widths per second.
                mv(&mut engine, target_x + 25.0, 1000.0);
                mv(&mut engine, target_x, 1005.0);
                up(&mut engine, target_x, 1010.0);
            } else {
                mv(&mut engine, GRAB_X + 25.0, 500.0);
                mv(&mut engine, target_x, 1500.0);
                up(&mut engine, target_x, 1510.0);
            }
            settle(&mut engine);
            let expect = progress > 0.5 || fast;
            assert_eq!(
                engine.pages().index(),
                usize::from(expect),
                "progress={progress} fast={fast}"
            );
        }
    }
}

/// it should call commit exactly once however many extra ticks arrive
#[test]
fn extra_ticks_after_commit_are_noops() {
    let mut engine = book(3);
    engine.flip(Direction::Forward).unwrap();
    for _ in 0..2000 {
        engine.tick(16.0);
    }
    assert_eq!(engine.pages().index(), 1);
    assert_eq!(committed(&engine.drain_events()), vec![(0, 1)]);
}

/// it should approach the target monotonically and land on it exactly
#[test]
fn settle_is_monotonic_and_bounded() {
    let mut engine = book(5);
    let x = drag_slow(&mut engine, 0.7);
    up(&mut engine, x, 1010.0);
    let mut prev = 0.7;
    let trace = settle(&mut engine);
    // The final tick commits and drops back to idle.
    for p in &trace[..trace.len() - 1] {
        assert!(*p >= prev - 1e-6 && *p <= 1.0, "went {prev} -> {p}");
        prev = *p;
    }

    let mut engine = book(5);
    let x = drag_slow(&mut engine, 0.4);
    up(&mut engine, x, 1010.0);
    let mut prev = 0.4;
    for p in settle(&mut engine) {
        assert!(p <= prev + 1e-6 && p >= 0.0, "went {prev} -> {p}");
        prev = p;
    }
    assert_eq!(engine.pages().index(), 0);
}

/// it should clamp hostile tick deltas into the configured range
#[test]
fn tick_deltas_are_clamped() {
    let cfg = Config {
        easing: flipbook_core::Easing::Linear,
        ..Config::default()
    };
    let mut engine = book_with(cfg.clone(), 3);
    engine.flip(Direction::Forward).unwrap();
    engine.tick(1.0e9);
    approx(engine.snapshot().progress, cfg.max_tick_ms / cfg.flip_duration_ms, 1e-5);
    engine.tick(f32::NAN);
    approx(
        engine.snapshot().progress,
        (cfg.max_tick_ms + cfg.min_tick_ms) / cfg.flip_duration_ms,
        1e-5,
    );
    engine.tick(-30.0);
    approx(
        engine.snapshot().progress,
        (cfg.max_tick_ms + 2.0 * cfg.min_tick_ms) / cfg.flip_duration_ms,
        1e-5,
    );
}

/// it should keep progress in [0, 1] when the pointer leaves the book
#[test]
fn progress_clamps_outside_the_book() {
    let mut engine = book(5);
    down(&mut engine, GRAB_X, 0.0);
    mv(&mut engine, -4000.0, 500.0);
    assert_eq!(engine.snapshot().progress, 1.0);
    mv(&mut engine, 4000.0, 1000.0);
    assert_eq!(engine.snapshot().progress, 0.0);
    mv(&mut engine, GRAB_X - 100.0, 1500.0);
    approx(engine.snapshot().progress, 0.2, 1e-5);
}

/// it should roll back a drag when the window loses focus
#[test]
fn blur_mid_drag_reverts() {
    let mut engine = book(5);
    drag_slow(&mut engine, 0.8);
    engine.handle(InputEvent::Blur);
    assert_eq!(engine.state().tag(), StateTag::Settling);
    settle(&mut engine);
    assert_eq!(engine.pages().index(), 0);
    let events = engine.drain_events();
    assert!(events.contains(&FlipEvent::GestureCancelled));
    assert!(committed(&events).is_empty());

    // Cancelling at rest is a no-op.
    engine.handle(InputEvent::PointerCancel);
    engine.handle(InputEvent::PointerLeave);
    assert_eq!(engine.state(), &FlipState::Idle);
    assert!(engine.drain_events().is_empty());
}

/// it should ignore non-finite pointer coordinates and still settle cleanly
#[test]
fn non_finite_pointer_is_ignored() {
    let mut engine = book(5);
    down(&mut engine, f32::NAN, 0.0);
    assert_eq!(engine.state(), &FlipState::Idle);

    down(&mut engine, GRAB_X, 0.0);
    mv(&mut engine, 400.0, 1000.0);
    mv(&mut engine, f32::NAN, 1010.0);
    up(&mut engine, f32::NAN, 1020.0);
    engine.tick(16.0);
    let FlipState::Dragging { progress, .. } = *engine.state() else {
        panic!("expected drag to survive, got {:?}", engine.state());
    };
    approx(progress, 0.16, 1e-5);

    up(&mut engine, 400.0, 1030.0);
    let seen = settle(&mut engine);
    assert!(seen.iter().all(|p| p.is_finite() && (0.0..=1.0).contains(p)));
    assert_eq!(engine.pages().index(), 0);
    assert!(committed(&engine.drain_events()).is_empty());
}

/// it should ignore presses that are not from the primary contact
#[test]
fn non_primary_press_is_ignored() {
    let mut engine = book(5);
    let mut ev = ptr(GRAB_X, 0.0);
    ev.is_primary = false;
    engine.handle(InputEvent::PointerDown(ev));
    assert_eq!(engine.state(), &FlipState::Idle);
}

/// it should start a backward flip from the spine side of a single page
#[test]
fn backward_drag_from_the_spine() {
    let mut engine = book(5);
    engine.go_to(2).unwrap();
    down(&mut engine, 20.0, 0.0);
    mv(&mut engine, 420.0, 1000.0);
    match engine.state() {
        FlipState::Dragging {
            direction,
            progress,
        } => {
            assert_eq!(*direction, Direction::Backward);
            approx(*progress, 0.8, 1e-5);
        }
        other => panic!("expected dragging, got {other:?}"),
    }
    up(&mut engine, 420.0, 1010.0);
    settle(&mut engine);
    assert_eq!(engine.pages().index(), 1);
}

/// it should mirror hotzones and drag direction for right-to-left books
#[test]
fn rtl_single_page_mirrors() {
    let cfg = Config {
        reading: Reading::RightToLeft,
        ..Config::default()
    };
    let mut engine = book_with(cfg, 4);
    // Spine on the right; the forward edge is on the left.
    down(&mut engine, 20.0, 0.0);
    mv(&mut engine, 320.0, 1000.0);
    match engine.state() {
        FlipState::Dragging {
            direction,
            progress,
        } => {
            assert_eq!(*direction, Direction::Forward);
            approx(*progress, 0.6, 1e-5);
        }
        other => panic!("expected dragging, got {other:?}"),
    }
    up(&mut engine, 320.0, 1010.0);
    settle(&mut engine);
    assert_eq!(engine.pages().index(), 1);
}

/// it should walk a double-page book cover to back with programmatic flips
#[test]
fn double_layout_programmatic_walk() {
    let cfg = Config {
        layout: Layout::Double,
        ..Config::default()
    };
    let mut engine = book_with(cfg, 6);
    assert_eq!(engine.pages().spread_count(), 4);
    for expected in 1..4 {
        engine.flip(Direction::Forward).unwrap();
        settle(&mut engine);
        assert_eq!(engine.current_spread().index, expected);
    }
    assert!(!engine.can_flip(Direction::Forward));
    assert!(matches!(
        engine.flip(Direction::Forward),
        Err(FlipError::OutOfRange { index: 3, .. })
    ));
    let spread = engine.current_spread();
    assert!(spread.left.is_some());
    assert!(spread.right.is_none());
}

/// it should ignore flips and jumps while a flip is already in flight
#[test]
fn busy_engine_drops_commands() {
    let mut engine = book(5);
    engine.flip(Direction::Forward).unwrap();
    engine.tick(16.0);
    engine.drain_events();
    assert!(engine.flip(Direction::Forward).is_ok());
    assert!(engine.command(BookCommand::GoTo { spread: 4 }).is_ok());
    assert!(engine.drain_events().is_empty());
    settle(&mut engine);
    assert_eq!(engine.pages().index(), 1);
}

/// it should drop an in-flight flip when the book is reloaded
#[test]
fn reinitialize_mid_flip_resets() {
    let mut engine = book(5);
    drag_slow(&mut engine, 0.4);
    engine
        .initialize(vec![Some("a".to_string()), Some("b".to_string())])
        .unwrap();
    assert_eq!(engine.state(), &FlipState::Idle);
    assert!(!engine.tracker().is_tracking());
    assert_eq!(engine.pages().index(), 0);
    assert!(matches!(
        engine.initialize(Vec::new()),
        Err(FlipError::EmptyBook)
    ));
}

/// it should batch commands and pointer events through update
#[test]
fn update_applies_commands_then_events() {
    let mut engine = book(5);
    let inputs = Inputs {
        commands: vec![BookCommand::GoTo { spread: 2 }],
        events: vec![InputEvent::PointerDown(ptr(GRAB_X, 0.0))],
    };
    let out = engine.update(16.0, inputs);
    assert_eq!(out.committed(), Some((0, 2)));
    assert_eq!(out.snapshot.state, StateTag::Dragging);
    assert_eq!(out.snapshot.spread.index, 2);
    assert_eq!(out.snapshot.revealed.map(|s| s.index), Some(3));

    let out = engine.update(16.0, Inputs::default());
    assert!(out.events.is_empty());
}

/// it should build an engine from a partial camelCase JSON config
#[test]
fn json_config_overrides() {
    let cfg = Config::from_json(r#"{ "flickVelocityThreshold": 5.0, "strips": 4 }"#).unwrap();
    assert_eq!(cfg.flick_velocity_threshold, 5.0);
    assert_eq!(cfg.drag_hotzone_width, 0.25);
    let mut engine = book_with(cfg, 3);

    // 10 page widths per second clears 5.
    down(&mut engine, GRAB_X, 0.0);
    mv(&mut engine, GRAB_X - 50.0, 10.0);
    assert_eq!(engine.snapshot().turning.map(|t| t.strips.len()), Some(4));
    up(&mut engine, GRAB_X - 50.0, 15.0);
    settle(&mut engine);
    assert_eq!(engine.pages().index(), 1);

    assert!(Engine::new(Config {
        min_tick_ms: 0.0,
        ..Config::default()
    })
    .is_err());
}
