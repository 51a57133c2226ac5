//! Two engines, same seed, same inputs.
//! They must produce identical event streams and identical world state.

use refugio_core::{command::PlayerCommand, engine::SimEngine, event::SimEvent};

fn build_engine(seed: u64) -> SimEngine {
    let mut engine = SimEngine::build_test(seed);
    engine.config.features.random_events = true;
    engine
}

/// Frame + tick, the way the runner drives a session.
fn drive(engine: &mut SimEngine, steps: u64) -> Vec<SimEvent> {
    let mut events = Vec::new();
    for i in 0..steps {
        events.extend(engine.frame(engine.config.tick_ms).expect("frame"));
        events.extend(engine.tick().expect("tick"));
        if i == 40 {
            events.extend(engine.handle_command(PlayerCommand::MoveTo { x: 8, y: 8 }).expect("move"));
        }
        if i == 90 {
            events.extend(engine.handle_command(PlayerCommand::CallVisitor).expect("call"));
        }
    }
    events
}

fn to_json(events: &[SimEvent]) -> Vec<String> {
    events.iter().map(|e| serde_json::to_string(e).expect("serialize")).collect()
}

#[test]
fn same_seed_produces_identical_event_streams() {
    const SEED: u64 = 0xDEAD_BEEF_CAFE_1234;
    const STEPS: u64 = 300; // thirty in-game days

    let mut engine_a = build_engine(SEED);
    let mut engine_b = build_engine(SEED);

    let log_a = to_json(&drive(&mut engine_a, STEPS));
    let log_b = to_json(&drive(&mut engine_b, STEPS));

    assert_eq!(
        log_a.len(), log_b.len(),
        "Event stream lengths differ: {} vs {}",
        log_a.len(), log_b.len()
    );
    for (i, (a, b)) in log_a.iter().zip(log_b.iter()).enumerate() {
        assert_eq!(a, b, "Event stream diverged at entry {i}:\n  A: {a}\n  B: {b}");
    }

    let snap_a = serde_json::to_string(&engine_a.snapshot()).unwrap();
    let snap_b = serde_json::to_string(&engine_b.snapshot()).unwrap();
    assert_eq!(snap_a, snap_b, "Final snapshots differ");
}

#[test]
fn different_seeds_produce_different_streams() {
    let mut engine_a = build_engine(42);
    let mut engine_b = build_engine(99);

    let log_a = to_json(&drive(&mut engine_a, 100));
    let log_b = to_json(&drive(&mut engine_b, 100));

    // Wandering and visit planning both draw from the seed.
    let any_different =
        log_a.len() != log_b.len() || log_a.iter().zip(log_b.iter()).any(|(a, b)| a != b);
    assert!(any_different, "Different seeds produced identical streams — seed is not being used");
}
