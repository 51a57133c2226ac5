//! Movement tests: commanded paths, arrival interactions, idle wandering
//! and step animation.

use refugio_core::{
    command::PlayerCommand,
    config::{MovementPolicy, SimConfig},
    engine::SimEngine,
    event::SimEvent,
    grid::Grid,
    pathfinding::shortest_path,
    status::ObjectStatus,
    subject::{MovementPhase, MoveTarget},
    types::Tile,
};

fn build(seed: u64) -> SimEngine {
    SimEngine::build_test(seed)
}

/// One frame of tick length, then the tick.
fn step(engine: &mut SimEngine) -> Vec<SimEvent> {
    let mut events = engine.frame(engine.config.tick_ms).unwrap();
    events.extend(engine.tick().unwrap());
    events
}

#[test]
fn path_is_minimal_and_orthogonally_connected() {
    let grid = Grid::from_config(&SimConfig::default_test());
    let pairs = [
        (Tile::new(0, 0), Tile::new(9, 9)),
        (Tile::new(3, 7), Tile::new(3, 2)),
        (Tile::new(9, 0), Tile::new(0, 9)),
        (Tile::new(4, 4), Tile::new(5, 4)),
    ];
    for (from, to) in pairs {
        let path = shortest_path(&grid, from, to);
        assert_eq!(path.len() as u32, from.manhattan(to), "{from} -> {to}");
        assert_eq!(path.last(), Some(&to));
        assert!(from.is_adjacent(path[0]));
        assert!(path.windows(2).all(|w| w[0].is_adjacent(w[1])));
    }
    assert!(shortest_path(&grid, Tile::new(2, 2), Tile::new(2, 2)).is_empty());
}

#[test]
fn move_to_object_walks_there_and_uses_it() {
    let mut engine = build(1);
    let fridge = Tile::new(3, 1);

    engine.handle_command(PlayerCommand::MoveTo { x: fridge.x, y: fridge.y }).unwrap();
    assert_eq!(engine.subject().movement.path.len(), 4);
    assert_eq!(engine.subject().movement_phase(), MovementPhase::FollowingPath);

    let mut events = Vec::new();
    for _ in 0..5 {
        events.extend(step(&mut engine));
    }

    let subject = engine.subject();
    assert_eq!(subject.position, fridge);
    assert!(subject.movement.target.is_none(), "target clears on arrival");
    assert!(subject.is_on_cooldown("nevera"));
    assert_eq!(engine.object_status("nevera"), ObjectStatus::Done);
    assert!(events.iter().any(|e| matches!(
        e,
        SimEvent::InteractionSucceeded { object_id, .. } if object_id == "nevera"
    )));
    let steps = events.iter().filter(|e| matches!(e, SimEvent::StepStarted { .. })).count();
    assert_eq!(steps, 4);
}

#[test]
fn arrival_on_cooldown_shows_cooldown_status() {
    let mut engine = build(2);
    engine.subject_mut().cooldowns.insert("nevera".into(), 1.0e9);
    engine.handle_command(PlayerCommand::MoveTo { x: 3, y: 1 }).unwrap();

    let mut events = Vec::new();
    for _ in 0..5 {
        events.extend(step(&mut engine));
    }
    assert_eq!(engine.subject().position, Tile::new(3, 1));
    assert_eq!(engine.object_status("nevera"), ObjectStatus::Cooldown);
    assert!(events.iter().any(|e| matches!(e, SimEvent::InteractionRejected { .. })));
}

#[test]
fn status_feedback_resets_to_idle() {
    let mut engine = build(3);
    engine.handle_command(PlayerCommand::UseObject { object_id: "sofa".into() }).unwrap();
    assert_eq!(engine.object_status("sofa"), ObjectStatus::Done);
    for _ in 0..3 {
        step(&mut engine);
    }
    assert_eq!(engine.object_status("sofa"), ObjectStatus::Idle);
}

#[test]
fn pending_target_keeps_the_subject_in_place() {
    let mut engine = build(4);
    engine.subject_mut().movement.target =
        Some(MoveTarget { object_id: "nevera".into(), tile: Tile::new(3, 1) });

    for _ in 0..8 {
        step(&mut engine);
    }
    assert_eq!(engine.subject().position, Tile::new(0, 0));
    assert!(engine.subject().movement.target.is_some());
}

#[test]
fn idle_subject_wanders_one_tile_at_a_time() {
    let mut engine = build(5);
    let mut last = engine.subject().position;
    let mut moved = false;
    for _ in 0..30 {
        step(&mut engine);
        let now = engine.subject().position;
        if now != last {
            let dx = (now.x - last.x).abs();
            let dy = (now.y - last.y).abs();
            assert!(dx <= 1 && dy <= 1, "jumped from {last} to {now}");
            moved = true;
        }
        last = now;
    }
    assert!(moved, "an idle subject should wander");
}

#[test]
fn path_priority_wanders_orthogonally_only() {
    let mut engine = build(6);
    engine.config.movement.policy = MovementPolicy::PathPriority;
    for _ in 0..40 {
        for event in step(&mut engine) {
            if let SimEvent::StepStarted { from, to, .. } = event {
                assert!(from.is_adjacent(to), "{from} -> {to} is not orthogonal");
            }
        }
    }
}

#[test]
fn step_animation_interpolates_between_tiles() {
    let mut engine = build(7);
    engine.handle_command(PlayerCommand::MoveTo { x: 1, y: 0 }).unwrap();
    engine.tick().unwrap();
    assert_eq!(engine.subject().movement_phase(), MovementPhase::AnimatingStep);

    // 1.75 progress per tick-length frame: a fifth of a tick is 0.35.
    engine.frame(engine.config.tick_ms * 0.2).unwrap();
    let p = engine.subject().interpolated_position();
    assert!((p.x - 0.35).abs() < 1e-9, "x = {}", p.x);
    assert_eq!(p.y, 0.0);
    assert_eq!(engine.subject().position, Tile::new(0, 0));

    engine.frame(engine.config.tick_ms).unwrap();
    assert_eq!(engine.subject().position, Tile::new(1, 0));
    assert!(!engine.subject().movement.moving);
}

#[test]
fn out_of_bounds_move_is_ignored() {
    let mut engine = build(8);
    let events = engine.handle_command(PlayerCommand::MoveTo { x: -1, y: 40 }).unwrap();
    assert!(events.is_empty());
    assert!(engine.subject().movement.path.is_empty());
}

#[test]
fn moving_onto_own_tile_uses_the_object_there() {
    let mut engine = build(9);
    engine.subject_mut().position = Tile::new(1, 1);
    engine.subject_mut().stats.energy = 30.0;

    let events = engine.handle_command(PlayerCommand::MoveTo { x: 1, y: 1 }).unwrap();
    assert!(matches!(events.as_slice(), [SimEvent::InteractionSucceeded { .. }]));
    assert_eq!(engine.subject().stats.energy, 100.0);
}

#[test]
fn random_walk_into_a_free_object_uses_it_instead_of_stepping() {
    // From the corner, the only in-bounds walk directions lead onto objects.
    let mut config = SimConfig::default_test();
    for obj in &mut config.objects {
        match obj.id.as_str() {
            "sofa" => obj.pos = Tile::new(1, 0),
            "nevera" => obj.pos = Tile::new(0, 1),
            _ => {}
        }
    }
    config.validate().unwrap();
    let mut engine = SimEngine::build("walk-into", config, 10);
    assert_eq!(engine.subject().position, Tile::new(0, 0));

    let events = engine.tick().unwrap();

    assert!(!events.iter().any(|e| matches!(e, SimEvent::StepStarted { .. })), "{events:?}");
    assert_eq!(engine.subject().position, Tile::new(0, 0));
    let used: Vec<_> = ["sofa", "nevera"]
        .into_iter()
        .filter(|id| engine.subject().is_on_cooldown(id))
        .collect();
    assert_eq!(used.len(), 1, "exactly one neighbour should have been used: {used:?}");
}
