//! Interaction engine — validates and applies the use of a map object.
//!
//! PRECONDITIONS (evaluated in order, first failure wins):
//!   1. Cooldown active                 → RejectReason::Cooldown
//!   2. Effect would push a saturated stat further past its bound
//!                                      → RejectReason::Saturated
//!   3. Object-specific eligibility (workplace, psychologist)
//!
//! A rejected attempt leaves the subject untouched. The only trace is
//! an `InteractionRejected` event, emitted when `announce` is set.

use crate::{
    clock::GameDate,
    config::{Effect, ObjectConfig, ObjectKind, SimConfig, StatKind},
    event::{RejectReason, SimEvent},
    rng::SubsystemRng,
    status::{ObjectStatus, ObjectStatusBoard},
    subject::{Subject, STAT_MAX},
    types::{Tick, Turn},
};

/// Happiness floor restored by chocolate when the subject is feeling low.
pub const CHOCOLATE_HAPPINESS_FLOOR: f64 = 50.0;

/// Read-only world facts an interaction needs.
pub struct InteractionEnv<'a> {
    pub config: &'a SimConfig,
    pub turn:   Turn,
    pub date:   &'a GameDate,
}

/// Workday and not already worked this turn.
pub fn can_visit_work(subject: &Subject, env: &InteractionEnv<'_>) -> bool {
    env.date.is_workday() && !subject.worked_on(env.turn)
}

pub fn can_visit_psychologist(subject: &Subject, env: &InteractionEnv<'_>) -> bool {
    subject.can_visit_psychologist(env.turn, env.config.psychologist_min_days)
}

/// Try to use `object`. Returns true when the interaction happened.
pub fn attempt_use(
    subject:  &mut Subject,
    object:   &ObjectConfig,
    env:      &InteractionEnv<'_>,
    rng:      &mut SubsystemRng,
    announce: bool,
    out:      &mut Vec<SimEvent>,
) -> bool {
    let empty = Effect::new();
    let effect = env.config.effect(object.effect_id()).unwrap_or(&empty);
    let kind = object.kind();

    if let Err(reason) = check_preconditions(subject, object, kind, effect, env) {
        log::debug!("turn={} use '{}' rejected: {reason:?}", env.turn, object.id);
        if announce {
            out.push(SimEvent::InteractionRejected {
                turn:        env.turn,
                object_id:   object.id.clone(),
                object_name: object.name.clone(),
                reason,
            });
        }
        return false;
    }

    let message = match kind {
        ObjectKind::Workplace => {
            subject.apply_effect(effect);
            subject.last_work_turn = Some(env.turn);
            "You went to work! ☕".to_string()
        }
        ObjectKind::Psychologist => {
            subject.apply_effect(effect);
            subject.last_psychologist_turn = Some(env.turn);
            "Session with the psychologist finished!".to_string()
        }
        ObjectKind::Gym => {
            subject.apply_effect(effect);
            "You trained at the gym. 💪".to_string()
        }
        ObjectKind::Bed => {
            subject.set(StatKind::Energy, STAT_MAX);
            "You slept deeply. Energy at maximum.".to_string()
        }
        ObjectKind::Chocolate if subject.stats.happiness < CHOCOLATE_HAPPINESS_FLOOR => {
            subject.set(StatKind::Happiness, CHOCOLATE_HAPPINESS_FLOOR);
            "You ate chocolate. Yum!".to_string()
        }
        ObjectKind::Chocolate | ObjectKind::Generic => {
            subject.apply_effect(effect);
            if let Some(range) = env.config.action_anxiety_rebate {
                let rebate = rng.range_inclusive(range.min, range.max) as f64;
                subject.add(StatKind::Anxiety, -rebate);
            }
            format!("You used {}!", object.name)
        }
    };

    let unit = if kind.uses_turn_cooldown() { env.config.turn_ms } else { env.config.minute_ms };
    subject
        .cooldowns
        .insert(object.id.clone(), env.config.base_cooldown(&object.id) * unit);
    subject.clamp_all();

    log::debug!("turn={} used '{}'", env.turn, object.id);
    if announce {
        out.push(SimEvent::InteractionSucceeded {
            turn:      env.turn,
            object_id: object.id.clone(),
            message,
        });
    }
    true
}

fn check_preconditions(
    subject: &Subject,
    object:  &ObjectConfig,
    kind:    ObjectKind,
    effect:  &Effect,
    env:     &InteractionEnv<'_>,
) -> Result<(), RejectReason> {
    if subject.is_on_cooldown(&object.id) {
        return Err(RejectReason::Cooldown);
    }
    if subject.is_saturated_by(effect) {
        return Err(RejectReason::Saturated);
    }
    match kind {
        ObjectKind::Workplace if !can_visit_work(subject, env) => {
            Err(RejectReason::NotAvailableToday)
        }
        ObjectKind::Psychologist if !can_visit_psychologist(subject, env) => {
            Err(RejectReason::TooSoon)
        }
        ObjectKind::Psychologist
            if subject.stats.mental_health >= STAT_MAX && subject.stats.trust >= STAT_MAX =>
        {
            Err(RejectReason::NoNeed)
        }
        _ => Ok(()),
    }
}

/// `attempt_use` wrapped with renderer feedback: the object shows
/// in-progress, then done, cooldown or blocked.
pub fn use_with_feedback(
    subject: &mut Subject,
    object:  &ObjectConfig,
    env:     &InteractionEnv<'_>,
    rng:     &mut SubsystemRng,
    board:   &mut ObjectStatusBoard,
    now:     Tick,
    out:     &mut Vec<SimEvent>,
) -> bool {
    board.set(&object.id, ObjectStatus::InProgress, now);
    let cooling = subject.is_on_cooldown(&object.id);
    let used = attempt_use(subject, object, env, rng, true, out);
    let status = match (used, cooling) {
        (true, _) => ObjectStatus::Done,
        (false, true) => ObjectStatus::Cooldown,
        (false, false) => ObjectStatus::Blocked,
    };
    board.set(&object.id, status, now);
    used
}
