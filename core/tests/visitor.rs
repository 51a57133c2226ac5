//! Cris: visit planning, visits and the daily call.

use refugio_core::{
    clock::SimClock,
    command::PlayerCommand,
    config::{SimConfig, StatKind},
    engine::SimEngine,
    event::SimEvent,
    grid::Grid,
    rng::{RngBank, SubsystemSlot},
    status::ObjectStatusBoard,
    subject::Subject,
    subsystem::{SimSubsystem, TickContext},
    visitor_subsystem::{VisitorSubsystem, CYCLE_DAYS},
};

#[test]
fn planned_days_are_distinct_sorted_and_in_range() {
    let config = SimConfig::default_test();
    let bank = RngBank::new(0xC0FFEE);
    for step in 0..500 {
        let mut rng = bank.for_subsystem_at(SubsystemSlot::Visitor, step);
        let days = VisitorSubsystem::plan_visits(&config, &mut rng);

        let n = days.len() as u32;
        assert!(n >= config.cris.min_appearances && n <= config.cris.max_appearances, "{days:?}");
        assert!(days.iter().all(|d| (1..=CYCLE_DAYS).contains(d)), "{days:?}");
        assert!(days.windows(2).all(|w| w[0] < w[1]), "not sorted or duplicated: {days:?}");
    }
}

#[test]
fn engine_plans_on_the_first_turn() {
    let mut engine = SimEngine::build_test(11);
    let events = engine.tick().unwrap();
    assert!(events.iter().any(|e| matches!(e, SimEvent::VisitsPlanned { turn: 0, .. })));
    let state = engine.visitor().expect("visitor registered");
    assert!(!state.visit_days.is_empty());
    assert_eq!(state.planned_on_turn, Some(0));

    // Planned once per turn, not once per tick.
    let events = engine.tick().unwrap();
    assert!(!events.iter().any(|e| matches!(e, SimEvent::VisitsPlanned { .. })));
}

#[test]
fn one_tick_turns_still_plan_on_the_first_tick() {
    let mut config = SimConfig::default_test();
    config.ticks_per_turn = Some(1);
    let mut engine = SimEngine::build("one-tick", config, 11);

    let events = engine.tick().unwrap();
    assert_eq!(engine.clock.turn, 1, "first tick already closes turn 0");
    assert!(
        events.iter().any(|e| matches!(e, SimEvent::VisitsPlanned { turn: 1, .. })),
        "no plan on the first tick: {events:?}"
    );
    let state = engine.visitor().expect("visitor registered");
    assert!(!state.visit_days.is_empty());
    assert_eq!(state.planned_on_turn, Some(1));

    // Next cycle on February 1st, turn 26.
    let later = engine.run_ticks(29).unwrap();
    let replanned: Vec<_> = later
        .iter()
        .filter_map(|e| match e {
            SimEvent::VisitsPlanned { turn, .. } => Some(*turn),
            _ => None,
        })
        .collect();
    assert_eq!(replanned, vec![26]);
}

#[test]
fn scheduled_day_brings_a_visit_that_ends_after_its_duration() {
    let config = SimConfig::default_test();
    let grid = Grid::from_config(&config);
    let mut subject = Subject::from_template(&config.subject);
    subject.set(StatKind::Anxiety, 50.0);
    let mut board = ObjectStatusBoard::default();
    let mut termination = None;
    let bank = RngBank::new(3);

    let mut visitor = VisitorSubsystem::new();
    // Turn 1 falls on the 7th.
    visitor.state.visit_days = vec![7];
    visitor.state.planned_on_turn = Some(0);

    let mut clock = SimClock::new(config.ticks_per_turn());
    let mut events = Vec::new();
    for _ in 0..2 * config.ticks_per_turn() {
        let outcome = clock.advance_tick();
        let mut rng = bank.for_subsystem_at(SubsystemSlot::Visitor, outcome.tick);
        let mut ctx = TickContext {
            config:        &config,
            grid:          &grid,
            clock:         &clock,
            tick:          outcome,
            subject:       &mut subject,
            object_status: &mut board,
            termination:   &mut termination,
        };
        events.extend(visitor.update(&mut ctx, &[], &mut rng).unwrap());
    }

    let started: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            SimEvent::VisitStarted { turn, position, until_turn } => Some((*turn, *position, *until_turn)),
            _ => None,
        })
        .collect();
    assert_eq!(started.len(), 1, "one visit per scheduled day");
    let (turn, position, until_turn) = started[0];
    assert_eq!(turn, 1);
    assert_eq!(until_turn, 2);
    assert!(position.is_adjacent(subject.position) || position == subject.position);

    // The visit effect applies once: anxiety 50 - 20.
    assert_eq!(subject.anxiety, 30.0);
    assert!(events.iter().any(|e| matches!(e, SimEvent::VisitEnded { turn: 2 })));
    assert!(!visitor.state.on_map);
}

#[test]
fn calling_is_limited_to_once_per_turn() {
    let mut engine = SimEngine::build_test(12);
    engine.subject_mut().set(StatKind::Anxiety, 40.0);

    let first = engine.handle_command(PlayerCommand::CallVisitor).unwrap();
    assert!(matches!(first.as_slice(), [SimEvent::VisitorCalled { turn: 0 }]));
    assert_eq!(engine.subject().anxiety, 30.0);

    let second = engine.handle_command(PlayerCommand::CallVisitor).unwrap();
    assert!(matches!(second.as_slice(), [SimEvent::CallRejected { turn: 0 }]));
    assert_eq!(engine.subject().anxiety, 30.0);

    engine.run_turns(1).unwrap();
    let next_day = engine.handle_command(PlayerCommand::CallVisitor).unwrap();
    assert!(matches!(next_day.as_slice(), [SimEvent::VisitorCalled { turn: 1 }]));
}

#[test]
fn music_is_limited_to_once_per_turn() {
    let mut engine = SimEngine::build_test(13);
    let first = engine.handle_command(PlayerCommand::PlayMusic).unwrap();
    assert!(matches!(first.as_slice(), [SimEvent::MusicPlayed { .. }]));
    let second = engine.handle_command(PlayerCommand::PlayMusic).unwrap();
    assert!(matches!(second.as_slice(), [SimEvent::MusicRejected { .. }]));
}
