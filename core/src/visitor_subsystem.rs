//! Visitor subsystem — Cris's scheduled visits and the daily call.
//!
//! On the first tick of the session and on every calendar day 1 a fresh
//! set of visit days is drawn from 1..=30. A visit starts when today's date is scheduled and
//! no visit is active, lasts `visit_duration_days` turns, and applies the
//! visit effect once. Calling Cris is independent of visits and limited
//! to once per turn.
//!
//! Execution: every tick, last in registration order. Monthly replanning
//! keys off the needs subsystem's TurnStarted event.

use crate::{
    config::SimConfig,
    error::SimResult,
    event::SimEvent,
    grid::{Grid, ORTHOGONAL},
    rng::SubsystemRng,
    subject::Subject,
    subsystem::{SimSubsystem, TickContext},
    types::{Tile, Turn},
};
use serde::{Deserialize, Serialize};

/// Length of a visit-planning cycle, in days.
pub const CYCLE_DAYS: u32 = 30;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisitorState {
    /// Scheduled dates for the current cycle, ascending.
    pub visit_days:      Vec<u32>,
    pub on_map:          bool,
    pub visit_ends_turn: Option<Turn>,
    pub position:        Option<Tile>,
    pub last_call_turn:  Option<Turn>,
    /// Turn the current cycle was drawn on.
    pub planned_on_turn: Option<Turn>,
}

#[derive(Default)]
pub struct VisitorSubsystem {
    pub state: VisitorState,
}

impl VisitorSubsystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw between min and max distinct days from 1..=CYCLE_DAYS.
    pub fn plan_visits(config: &SimConfig, rng: &mut SubsystemRng) -> Vec<u32> {
        let cris = &config.cris;
        let count = rng.range_inclusive(cris.min_appearances as i64, cris.max_appearances as i64);
        let mut days = rng.sample_distinct(1, CYCLE_DAYS, count as usize);
        days.sort_unstable();
        days
    }

    fn start_visit(
        &mut self,
        subject: &mut Subject,
        config: &SimConfig,
        grid: &Grid,
        turn: Turn,
        rng: &mut SubsystemRng,
    ) -> SimEvent {
        let options = grid.neighbors(subject.position, &ORTHOGONAL);
        let position = rng.pick(&options).copied().unwrap_or(subject.position);
        let until_turn = turn + config.cris.visit_duration_days;

        self.state.on_map = true;
        self.state.visit_ends_turn = Some(until_turn);
        self.state.position = Some(position);

        if let Some(effect) = config.effect(&config.cris.visit_effect) {
            subject.apply_effect(effect);
        }
        log::info!("turn={turn} Cris arrives at {position}, staying until turn {until_turn}");
        SimEvent::VisitStarted { turn, position, until_turn }
    }

    fn end_visit(&mut self, turn: Turn) -> SimEvent {
        self.state.on_map = false;
        self.state.visit_ends_turn = None;
        self.state.position = None;
        log::info!("turn={turn} Cris leaves");
        SimEvent::VisitEnded { turn }
    }

    /// Phone Cris. Allowed once per turn, whether or not Cris is visiting.
    pub fn call(&mut self, subject: &mut Subject, config: &SimConfig, turn: Turn) -> SimEvent {
        if self.state.last_call_turn == Some(turn) {
            return SimEvent::CallRejected { turn };
        }
        self.state.last_call_turn = Some(turn);
        if let Some(effect) = config.effect(&config.cris.call_effect) {
            subject.apply_effect(effect);
        }
        SimEvent::VisitorCalled { turn }
    }
}

impl SimSubsystem for VisitorSubsystem {
    fn name(&self) -> &'static str { "visitor" }

    fn update(
        &mut self,
        ctx: &mut TickContext<'_>,
        events_in: &[SimEvent],
        rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>> {
        let mut out = Vec::new();
        let turn = ctx.tick.turn;
        let date = ctx.clock.date();

        // A one-tick turn means the first tick already reports turn 1, so
        // "never planned" opens the first cycle rather than turn 0.
        let turn_started = events_in.iter().any(|e| matches!(e, SimEvent::TurnStarted { .. }));
        let new_cycle =
            self.state.planned_on_turn.is_none() || (turn_started && date.date == 1);
        if new_cycle && self.state.planned_on_turn != Some(turn) {
            let days = Self::plan_visits(ctx.config, rng);
            log::debug!("turn={turn} Cris visit days: {days:?}");
            self.state.visit_days = days.clone();
            self.state.planned_on_turn = Some(turn);
            out.push(SimEvent::VisitsPlanned { turn, days });
        }

        if !self.state.on_map && self.state.visit_days.contains(&date.date) {
            out.push(self.start_visit(ctx.subject, ctx.config, ctx.grid, turn, rng));
        }

        if self.state.on_map && self.state.visit_ends_turn.is_some_and(|end| turn >= end) {
            out.push(self.end_visit(turn));
        }

        Ok(out)
    }

    fn as_any(&self) -> &dyn std::any::Any { self }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any { self }
}
