//! Needs subsystem — the turn-boundary update.
//!
//! Runs only on ticks that close a turn. ORDER (fixed):
//!   1. Trust and bond grow; mental health improves by floor((trust+bond)/20).
//!   2. Workday without work on the previous turn → missed-work anxiety.
//!   3. Anxiety erodes mental health by floor(anxiety/10).
//!   4. High anxiety erodes happiness.
//!   5. Flat anxiety rebate.
//!   6. Emotional state from happiness.
//!   7. Crisis check (sticky flag).
//!   8. Cooldowns decay by one turn unit.
//!   9. Clamp.
//! With normal progression on, the depression sub-model and the death
//! check follow. Last, scheduled objects the subject stands on are used.
//!
//! Execution: every tick, after movement.

use crate::{
    clock::GameDate,
    config::{ObjectKind, SimConfig, StatKind},
    error::SimResult,
    event::{DeathCause, SimEvent},
    interaction::{attempt_use, can_visit_psychologist, can_visit_work, InteractionEnv},
    rng::SubsystemRng,
    subject::{EmotionalState, Subject, STAT_MAX, STAT_MIN},
    subsystem::{SimSubsystem, TickContext},
    types::Turn,
};

#[derive(Default)]
pub struct NeedsSubsystem {
    pub turns_processed: u64,
}

impl NeedsSubsystem {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Steps 1–9 of the turn-boundary update for the turn that just began.
pub fn apply_turn_boundary(
    subject: &mut Subject,
    config:  &SimConfig,
    turn:    Turn,
    date:    &GameDate,
) -> Vec<SimEvent> {
    let rules = &config.turn_rules;
    let mut out = Vec::new();
    let previous_state = subject.emotional_state;

    // 1.
    subject.add(StatKind::Trust, rules.trust_per_turn);
    subject.add(StatKind::Bond, rules.bond_per_turn);
    let improvement = ((subject.stats.trust + subject.bond) / 20.0).floor();
    subject.add(StatKind::MentalHealth, improvement);

    // 2.
    let worked_yesterday = turn > 0 && subject.worked_on(turn - 1);
    if date.is_workday() && !worked_yesterday {
        subject.add(StatKind::Anxiety, rules.missed_work_anxiety);
        out.push(SimEvent::WorkMissed { turn, anxiety_added: rules.missed_work_anxiety });
    }

    // 3.
    if subject.anxiety > 0.0 {
        let penalty = (subject.anxiety / 10.0).floor();
        subject.add(StatKind::MentalHealth, -penalty);
    }

    // 4.
    if subject.anxiety > rules.happiness_anxiety_threshold {
        subject.add(StatKind::Happiness, -rules.happiness_anxiety_decay);
    }

    // 5.
    if subject.anxiety > 0.0 {
        subject.add(StatKind::Anxiety, -rules.anxiety_rebate_per_turn);
    }

    // 6. The middle band falls through to Happy on purpose; see DESIGN.md.
    subject.emotional_state = if subject.stats.happiness > rules.happy_above {
        EmotionalState::Happy
    } else if subject.stats.happiness < rules.sad_below {
        EmotionalState::Sad
    } else {
        EmotionalState::Happy
    };

    // 7.
    if subject.anxiety > rules.crisis_anxiety_above
        && subject.stats.mental_health < rules.crisis_mental_health_below
    {
        subject.emotional_state = EmotionalState::InCrisis;
        subject.in_crisis = true;
        if previous_state != EmotionalState::InCrisis {
            log::warn!(
                "turn={turn} crisis: anxiety={:.0} mental_health={:.0}",
                subject.anxiety,
                subject.stats.mental_health
            );
            out.push(SimEvent::CrisisEntered {
                turn,
                anxiety: subject.anxiety,
                mental_health: subject.stats.mental_health,
            });
        }
    }

    // 8.
    subject.decay_cooldowns(config.turn_ms);

    // 9.
    subject.clamp_all();
    out
}

/// Depression sub-model. Activation is sticky; the warning fires once.
pub fn apply_depression(subject: &mut Subject, config: &SimConfig, turn: Turn) -> Vec<SimEvent> {
    let model = &config.depression;
    let mut out = Vec::new();

    if !subject.depression_active
        && subject.anxiety > model.activation_anxiety_above
        && subject.stats.happiness < model.activation_happiness_below
    {
        subject.depression_active = true;
        log::warn!("turn={turn} depression activated");
        out.push(SimEvent::DepressionActivated { turn });
    }

    if subject.depression_active {
        subject.add(StatKind::Depression, model.rise_per_turn);
        if let Some(effect) = model.effect.as_deref().and_then(|id| config.effect(id)) {
            subject.apply_effect(effect);
        }
    } else {
        subject.add(StatKind::Depression, -model.decay_per_turn);
    }
    subject.clamp_all();
    out
}

/// Terminal conditions checked at each turn boundary.
pub fn check_death(subject: &Subject) -> Option<DeathCause> {
    if subject.stats.hunger >= STAT_MAX {
        Some(DeathCause::Hunger)
    } else if subject.stats.depression >= STAT_MAX {
        Some(DeathCause::Depression)
    } else if subject.stats.physical_health <= STAT_MIN {
        Some(DeathCause::Health)
    } else {
        None
    }
}

impl SimSubsystem for NeedsSubsystem {
    fn name(&self) -> &'static str { "needs" }

    fn update(
        &mut self,
        ctx: &mut TickContext<'_>,
        _events_in: &[SimEvent],
        rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>> {
        if !ctx.tick.turn_boundary {
            return Ok(vec![]);
        }

        let turn = ctx.tick.turn;
        let date = ctx.clock.date();
        let mut out = vec![SimEvent::TurnStarted { turn, date: date.label() }];

        out.extend(apply_turn_boundary(ctx.subject, ctx.config, turn, &date));

        if ctx.config.features.normal_progression {
            out.extend(apply_depression(ctx.subject, ctx.config, turn));
            if let Some(cause) = check_death(ctx.subject) {
                log::warn!("turn={turn} subject died: {cause}");
                *ctx.termination = Some(cause);
                out.push(SimEvent::SubjectDied { turn, cause });
                return Ok(out);
            }
        }

        // Scheduled objects resolve on their own when the subject is there.
        if let Some(object) = ctx.grid.object_at(ctx.subject.position) {
            let env = InteractionEnv { config: ctx.config, turn, date: &date };
            let due = match object.kind() {
                ObjectKind::Workplace => can_visit_work(ctx.subject, &env),
                ObjectKind::Psychologist => can_visit_psychologist(ctx.subject, &env),
                _ => false,
            };
            if due {
                attempt_use(ctx.subject, object, &env, rng, true, &mut out);
            }
        }

        self.turns_processed += 1;
        log::info!(
            "turn={turn} {} hunger={:.0} happiness={:.0} energy={:.0} anxiety={:.0} mental={:.0} state={:?}",
            date.label(),
            ctx.subject.stats.hunger,
            ctx.subject.stats.happiness,
            ctx.subject.stats.energy,
            ctx.subject.anxiety,
            ctx.subject.stats.mental_health,
            ctx.subject.emotional_state,
        );

        Ok(out)
    }

    fn as_any(&self) -> &dyn std::any::Any { self }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any { self }
}
