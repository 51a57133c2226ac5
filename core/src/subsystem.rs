//! Subsystem trait and per-tick context.
//!
//! RULE: Every scheduled rule set implements SimSubsystem.
//! The engine calls update() on each registered subsystem
//! in registration order, every tick.
//! Execution order is fixed and documented in engine.rs.

use crate::{
    clock::{SimClock, TickOutcome},
    config::SimConfig,
    error::SimResult,
    event::{DeathCause, SimEvent},
    grid::Grid,
    rng::SubsystemRng,
    status::ObjectStatusBoard,
    subject::Subject,
};
use std::any::Any;

/// Everything a subsystem may read or mutate during one tick.
/// Owned by the engine and lent out for the duration of `update`.
pub struct TickContext<'a> {
    pub config:        &'a SimConfig,
    pub grid:          &'a Grid,
    pub clock:         &'a SimClock,
    pub tick:          TickOutcome,
    pub subject:       &'a mut Subject,
    pub object_status: &'a mut ObjectStatusBoard,
    /// Set by a subsystem to end the session. Later subsystems are skipped.
    pub termination:   &'a mut Option<DeathCause>,
}

/// The contract every subsystem must fulfill.
pub trait SimSubsystem: Send {
    /// Unique stable name for this subsystem.
    fn name(&self) -> &'static str;

    /// Called once per tick by the engine.
    ///
    /// - `ctx`:       the shared simulation context for this tick
    /// - `events_in`: events emitted by earlier subsystems this tick
    /// - `rng`:       this subsystem's deterministic RNG for this tick
    ///
    /// Returns a vec of new events to add to the tick's event list.
    fn update(
        &mut self,
        ctx: &mut TickContext<'_>,
        events_in: &[SimEvent],
        rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>>;

    /// For downcasting in the engine's accessors, tests and tooling.
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}
