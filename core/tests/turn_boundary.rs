//! Turn-boundary rules: ordering, missed work, crisis, depression and
//! the death check.

use refugio_core::{
    clock::GameDate,
    config::{SimConfig, StatKind},
    engine::SimEngine,
    event::{DeathCause, SimEvent},
    needs_subsystem::{apply_depression, apply_turn_boundary, check_death},
    subject::{EmotionalState, MoveTarget, Subject},
    types::{Tile, Turn},
};

const TUESDAY: Turn = 1;
const SATURDAY: Turn = 5;

fn setup() -> (SimConfig, Subject) {
    let config = SimConfig::default_test();
    let subject = Subject::from_template(&config.subject);
    (config, subject)
}

fn boundary(subject: &mut Subject, config: &SimConfig, turn: Turn) -> Vec<SimEvent> {
    apply_turn_boundary(subject, config, turn, &GameDate::for_turn(turn))
}

#[test]
fn missed_work_adds_exactly_the_configured_penalty() {
    let (config, mut subject) = setup();
    let penalty = config.turn_rules.missed_work_anxiety;

    let events = boundary(&mut subject, &config, TUESDAY);

    let added = events.iter().find_map(|e| match e {
        SimEvent::WorkMissed { anxiety_added, .. } => Some(*anxiety_added),
        _ => None,
    });
    assert_eq!(added, Some(penalty));
    // Penalty first, then the flat per-turn rebate.
    assert_eq!(subject.anxiety, penalty - config.turn_rules.anxiety_rebate_per_turn);
}

#[test]
fn working_the_previous_turn_avoids_the_penalty() {
    let (config, mut subject) = setup();
    subject.last_work_turn = Some(TUESDAY - 1);

    let events = boundary(&mut subject, &config, TUESDAY);
    assert!(!events.iter().any(|e| matches!(e, SimEvent::WorkMissed { .. })));
    assert_eq!(subject.anxiety, 0.0);
}

#[test]
fn weekends_carry_no_work_penalty() {
    let (config, mut subject) = setup();
    let events = boundary(&mut subject, &config, SATURDAY);
    assert!(!events.iter().any(|e| matches!(e, SimEvent::WorkMissed { .. })));
}

#[test]
fn trust_and_bond_grow_and_feed_mental_health() {
    let (config, mut subject) = setup();
    subject.last_work_turn = Some(0);

    boundary(&mut subject, &config, TUESDAY);

    assert_eq!(subject.stats.trust, 50.0);
    assert_eq!(subject.bond, 10.0);
    // floor((50 + 10) / 20) = 3
    assert_eq!(subject.stats.mental_health, 63.0);
}

#[test]
fn high_anxiety_erodes_mental_health_and_happiness() {
    let (config, mut subject) = setup();
    subject.set(StatKind::Anxiety, 60.0);

    boundary(&mut subject, &config, SATURDAY);

    // +3 from trust/bond, -6 from anxiety.
    assert_eq!(subject.stats.mental_health, 57.0);
    assert_eq!(subject.stats.happiness, 48.0);
    assert_eq!(subject.anxiety, 53.0);
}

/// Anxiety 75 and mental health 30 going into a workday boundary ends in
/// crisis.
#[test]
fn crisis_scenario_sets_state_and_flag() {
    let (config, mut subject) = setup();
    subject.set(StatKind::Anxiety, 75.0);
    subject.set(StatKind::MentalHealth, 30.0);

    let events = boundary(&mut subject, &config, TUESDAY);

    assert_eq!(subject.emotional_state, EmotionalState::InCrisis);
    assert!(subject.in_crisis);
    assert!(events.iter().any(|e| matches!(e, SimEvent::CrisisEntered { .. })));
}

#[test]
fn crisis_flag_is_sticky() {
    let (config, mut subject) = setup();
    subject.set(StatKind::Anxiety, 95.0);
    subject.set(StatKind::MentalHealth, 10.0);
    boundary(&mut subject, &config, SATURDAY);
    assert!(subject.in_crisis);

    subject.set(StatKind::Anxiety, 0.0);
    subject.set(StatKind::MentalHealth, 90.0);
    subject.set(StatKind::Happiness, 90.0);
    let events = boundary(&mut subject, &config, SATURDAY + 1);

    assert_eq!(subject.emotional_state, EmotionalState::Happy);
    assert!(subject.in_crisis, "the crisis flag never clears");
    assert!(!events.iter().any(|e| matches!(e, SimEvent::CrisisEntered { .. })));
}

#[test]
fn middle_happiness_band_reads_as_happy() {
    let (config, mut subject) = setup();
    subject.set(StatKind::Happiness, 50.0);
    boundary(&mut subject, &config, SATURDAY);
    assert_eq!(subject.emotional_state, EmotionalState::Happy);

    subject.set(StatKind::Happiness, 10.0);
    boundary(&mut subject, &config, SATURDAY + 1);
    assert_eq!(subject.emotional_state, EmotionalState::Sad);
}

#[test]
fn boundary_decays_cooldowns_by_one_turn() {
    let (config, mut subject) = setup();
    subject.cooldowns.insert("cama".into(), config.turn_ms * 1.5);
    subject.cooldowns.insert("sofa".into(), config.turn_ms * 0.5);

    boundary(&mut subject, &config, SATURDAY);

    assert_eq!(subject.cooldown("cama"), config.turn_ms * 0.5);
    assert_eq!(subject.cooldown("sofa"), 0.0);
}

#[test]
fn depression_activates_once_and_accumulates() {
    let (config, mut subject) = setup();
    subject.set(StatKind::Anxiety, 80.0);
    subject.set(StatKind::Happiness, 20.0);

    let first = apply_depression(&mut subject, &config, 1);
    assert!(subject.depression_active);
    assert_eq!(first.len(), 1);
    assert_eq!(subject.stats.depression, config.depression.rise_per_turn);
    // The configured depression bundle drains happiness too.
    assert_eq!(subject.stats.happiness, 15.0);

    subject.set(StatKind::Anxiety, 0.0);
    let second = apply_depression(&mut subject, &config, 2);
    assert!(second.is_empty(), "activation warning fires only once");
    assert!(subject.depression_active);
    assert_eq!(subject.stats.depression, 2.0 * config.depression.rise_per_turn);
}

#[test]
fn inactive_depression_decays() {
    let (config, mut subject) = setup();
    subject.set(StatKind::Depression, 10.0);
    apply_depression(&mut subject, &config, 1);
    assert_eq!(subject.stats.depression, 10.0 - config.depression.decay_per_turn);
}

#[test]
fn death_conditions_map_to_causes() {
    let (_, mut subject) = setup();
    assert_eq!(check_death(&subject), None);

    subject.set(StatKind::Hunger, 100.0);
    assert_eq!(check_death(&subject), Some(DeathCause::Hunger));

    let (_, mut subject) = setup();
    subject.set(StatKind::Depression, 100.0);
    assert_eq!(check_death(&subject), Some(DeathCause::Depression));

    let (_, mut subject) = setup();
    subject.set(StatKind::PhysicalHealth, 0.0);
    assert_eq!(check_death(&subject), Some(DeathCause::Health));
    assert_eq!(DeathCause::Health.tag(), "salud");
}

#[test]
fn stats_stay_clamped_through_many_boundaries() {
    let (config, mut subject) = setup();
    subject.set(StatKind::Anxiety, 100.0);
    for turn in 1..=60 {
        boundary(&mut subject, &config, turn);
        apply_depression(&mut subject, &config, turn);
        for kind in StatKind::ALL {
            let v = subject.get(kind);
            assert!((0.0..=100.0).contains(&v), "turn {turn}: {kind:?} = {v}");
        }
    }
}

/// Engine with the subject parked on `tile`. A target elsewhere with no
/// path keeps it from wandering off.
fn parked_on(seed: u64, tile: Tile) -> SimEngine {
    let mut engine = SimEngine::build_test(seed);
    let subject = engine.subject_mut();
    subject.position = tile;
    subject.movement.target = Some(MoveTarget { object_id: "cama".into(), tile: Tile::new(1, 1) });
    engine
}

fn used_on(events: &[SimEvent], object: &str) -> Vec<Turn> {
    events
        .iter()
        .filter_map(|e| match e {
            SimEvent::InteractionSucceeded { turn, object_id, .. } if object_id == object => Some(*turn),
            _ => None,
        })
        .collect()
}

#[test]
fn standing_at_the_desk_goes_to_work_on_workdays() {
    let mut engine = parked_on(41, Tile::new(7, 2));

    let events = engine.run_turns(6).unwrap();

    // Monday is turn 0; turns 5 and 6 are the weekend.
    assert_eq!(used_on(&events, "puesto-trabajo"), vec![1, 2, 3, 4]);
    assert_eq!(engine.subject().last_work_turn, Some(4));
    assert_eq!(engine.subject().position, Tile::new(7, 2));

    // Only Tuesday morning finds the previous day unworked.
    let missed: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            SimEvent::WorkMissed { turn, .. } => Some(*turn),
            _ => None,
        })
        .collect();
    assert_eq!(missed, vec![1]);
}

#[test]
fn standing_at_the_psychologist_books_a_session_when_due() {
    let mut engine = parked_on(42, Tile::new(8, 8));

    let events = engine.run_turns(3).unwrap();

    assert_eq!(used_on(&events, "psicologo"), vec![1]);
    assert_eq!(engine.subject().last_psychologist_turn, Some(1));
}
