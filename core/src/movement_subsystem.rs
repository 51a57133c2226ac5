//! Movement subsystem — path following, arrival and idle wandering.
//!
//! Per tick, in priority order:
//!   1. Mid-animation        → wait for the frame loop to finish the step.
//!   2. Path queued          → pop the next tile and start animating.
//!   3. Target object set    → on its tile, use it; otherwise stay put.
//!   4. Nothing to do        → one autonomous step per the movement policy.
//!
//! Every step rolls the destination zone's random events and, with
//! normal progression on, the outdoor accident hazard.
//!
//! Execution: every tick, first in registration order.

use crate::{
    config::MovementPolicy,
    error::SimResult,
    event::{DeathCause, SimEvent},
    grid::{ORTHOGONAL, WALK_DIRECTIONS},
    interaction::{attempt_use, use_with_feedback, InteractionEnv},
    rng::SubsystemRng,
    subsystem::{SimSubsystem, TickContext},
    types::Tile,
};

#[derive(Default)]
pub struct MovementSubsystem {
    /// Steps started since the session began.
    pub steps_taken: u64,
}

impl MovementSubsystem {
    pub fn new() -> Self {
        Self::default()
    }

    fn take_step(
        &mut self,
        ctx: &mut TickContext<'_>,
        to: Tile,
        rng: &mut SubsystemRng,
        out: &mut Vec<SimEvent>,
    ) {
        let from = ctx.subject.position;
        ctx.subject.begin_step(to);
        self.steps_taken += 1;
        out.push(SimEvent::StepStarted { tick: ctx.tick.tick, from, to });
        roll_step_events(ctx, to, rng, out);
    }

    fn arrive(&mut self, ctx: &mut TickContext<'_>, rng: &mut SubsystemRng, out: &mut Vec<SimEvent>) {
        let Some(target) = ctx.subject.movement.target.take() else {
            return;
        };
        let Some(object) = ctx.grid.object(&target.object_id) else {
            return;
        };
        let date = ctx.clock.date();
        let env = InteractionEnv { config: ctx.config, turn: ctx.tick.turn, date: &date };
        use_with_feedback(ctx.subject, object, &env, rng, ctx.object_status, ctx.tick.tick, out);
    }

    fn wander(&mut self, ctx: &mut TickContext<'_>, rng: &mut SubsystemRng, out: &mut Vec<SimEvent>) {
        let policy = ctx.config.movement.policy;
        let offsets: &[(i32, i32)] = match policy {
            MovementPolicy::RandomWalk => &WALK_DIRECTIONS,
            MovementPolicy::PathPriority => &ORTHOGONAL,
        };
        let options = ctx.grid.neighbors(ctx.subject.position, offsets);
        let Some(&next) = rng.pick(&options) else {
            return;
        };

        if policy == MovementPolicy::RandomWalk {
            if let Some(object) = ctx.grid.object_at(next) {
                if !ctx.subject.is_on_cooldown(&object.id) {
                    let date = ctx.clock.date();
                    let env = InteractionEnv { config: ctx.config, turn: ctx.tick.turn, date: &date };
                    if attempt_use(ctx.subject, object, &env, rng, false, out) {
                        return;
                    }
                }
            }
        }
        self.take_step(ctx, next, rng, out);
    }
}

/// Random environmental events and the accident hazard for a step into `to`.
fn roll_step_events(
    ctx: &mut TickContext<'_>,
    to: Tile,
    rng: &mut SubsystemRng,
    out: &mut Vec<SimEvent>,
) {
    let zone = ctx.grid.zone_at(to);

    if ctx.config.features.random_events {
        for event in ctx.config.random_events.iter().filter(|e| e.zone == zone.id) {
            if rng.chance(event.probability) {
                ctx.subject.apply_effect(&event.effect);
                out.push(SimEvent::RandomEvent {
                    turn:    ctx.tick.turn,
                    zone:    zone.id.clone(),
                    message: event.message.clone(),
                });
            }
        }
    }

    let hazard = &ctx.config.hazard;
    if ctx.config.features.normal_progression
        && zone.outdoor
        && ctx.subject.anxiety > hazard.accident_anxiety_above
        && rng.chance(hazard.accident_probability)
    {
        log::warn!("tick={} fatal accident in zone '{}'", ctx.tick.tick, zone.id);
        *ctx.termination = Some(DeathCause::Accident);
        out.push(SimEvent::SubjectDied { turn: ctx.tick.turn, cause: DeathCause::Accident });
    }
}

impl SimSubsystem for MovementSubsystem {
    fn name(&self) -> &'static str { "movement" }

    fn update(
        &mut self,
        ctx: &mut TickContext<'_>,
        _events_in: &[SimEvent],
        rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>> {
        let mut out = Vec::new();

        if ctx.subject.movement.moving {
            return Ok(out);
        }

        if let Some(next) = ctx.subject.movement.path.pop_front() {
            self.take_step(ctx, next, rng, &mut out);
            return Ok(out);
        }

        let position = ctx.subject.position;
        match ctx.subject.movement.target.as_ref().map(|t| t.tile == position) {
            Some(true) => self.arrive(ctx, rng, &mut out),
            // Heading somewhere: never wander off.
            Some(false) => {}
            None => self.wander(ctx, rng, &mut out),
        }

        Ok(out)
    }

    fn as_any(&self) -> &dyn std::any::Any { self }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any { self }
}
