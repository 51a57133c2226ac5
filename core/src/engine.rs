//! The simulation engine. Owns every piece of session state.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Movement subsystem  (path following, wandering, step events)
//!   2. Needs subsystem     (turn boundary, depression, death check)
//!   3. Visitor subsystem   (Cris: planning, visits)
//!
//! RULES:
//!   - `frame()` carries the continuous scale: drift, animation, inactivity.
//!   - `tick()` carries the discrete scale: clock, then subsystems.
//!   - All randomness flows through the RngBank.
//!   - Every player-facing event lands in the event log.
//!   - Once the subject dies, every further call returns SessionOver.

use crate::{
    clock::SimClock,
    command::PlayerCommand,
    config::SimConfig,
    error::{SimError, SimResult},
    event::{DeathCause, EventLog, RejectReason, SimEvent},
    grid::Grid,
    inactivity::InactivityMonitor,
    interaction::{use_with_feedback, InteractionEnv},
    movement_subsystem::MovementSubsystem,
    needs_subsystem::NeedsSubsystem,
    pathfinding::shortest_path,
    rng::{RngBank, SubsystemSlot},
    snapshot::{
        ClockSnapshot, ObjectSnapshot, SessionCounters, SubjectSnapshot, ViewState, VisitorSnapshot,
        WorldSnapshot,
    },
    status::{ObjectStatus, ObjectStatusBoard},
    subject::{MoveTarget, Subject},
    subsystem::{SimSubsystem, TickContext},
    types::{Tile, Turn},
    visitor_subsystem::{VisitorState, VisitorSubsystem},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionStatus {
    Running,
    Terminated { cause: DeathCause, turn: Turn },
}

pub struct SimEngine {
    pub session_id:  String,
    pub config:      SimConfig,
    pub grid:        Grid,
    pub clock:       SimClock,
    pub rng_bank:    RngBank,
    subject:         Subject,
    subsystems:      Vec<(SubsystemSlot, Box<dyn SimSubsystem>)>,
    event_log:       EventLog,
    object_status:   ObjectStatusBoard,
    status:          SessionStatus,
    inactivity:      InactivityMonitor,
    view:            ViewState,
    last_music_turn: Option<Turn>,
    command_seq:     u64,
    /// Milliseconds of simulated real time fed through `frame()`.
    elapsed_ms:      f64,
}

impl SimEngine {
    pub fn new(session_id: impl Into<String>, config: SimConfig, seed: u64) -> Self {
        Self {
            session_id:      session_id.into(),
            grid:            Grid::from_config(&config),
            clock:           SimClock::new(config.ticks_per_turn()),
            rng_bank:        RngBank::new(seed),
            subject:         Subject::from_template(&config.subject),
            subsystems:      Vec::new(),
            event_log:       EventLog::default(),
            object_status:   ObjectStatusBoard::default(),
            status:          SessionStatus::Running,
            inactivity:      InactivityMonitor::new(),
            view:            ViewState::default(),
            last_music_turn: None,
            command_seq:     0,
            elapsed_ms:      0.0,
            config,
        }
    }

    /// Build a fully wired engine with all subsystems registered.
    /// Call this instead of new() + manual register() calls.
    pub fn build(session_id: impl Into<String>, config: SimConfig, seed: u64) -> Self {
        let mut engine = SimEngine::new(session_id, config, seed);
        engine.register(SubsystemSlot::Movement, Box::new(MovementSubsystem::new()));
        engine.register(SubsystemSlot::Needs, Box::new(NeedsSubsystem::new()));
        engine.register(SubsystemSlot::Visitor, Box::new(VisitorSubsystem::new()));
        engine
    }

    /// Fully wired engine on `SimConfig::default_test()`.
    pub fn build_test(seed: u64) -> Self {
        Self::build(format!("test-{seed}"), SimConfig::default_test(), seed)
    }

    /// Register a subsystem. Call in the documented execution order.
    pub fn register(&mut self, slot: SubsystemSlot, subsystem: Box<dyn SimSubsystem>) {
        self.subsystems.push((slot, subsystem));
    }

    fn ensure_running(&self) -> SimResult<()> {
        match self.status {
            SessionStatus::Running => Ok(()),
            SessionStatus::Terminated { cause, .. } => Err(SimError::SessionOver { cause }),
        }
    }

    fn record(&mut self, events: &[SimEvent]) {
        let turn = self.clock.turn;
        for event in events {
            self.event_log.record(turn, event);
        }
    }

    fn terminate(&mut self, cause: DeathCause) {
        let turn = self.clock.turn;
        log::warn!("session {} over at turn={turn}: {cause}", self.session_id);
        self.status = SessionStatus::Terminated { cause, turn };
    }

    // ── Continuous scale ───────────────────────────────────────────

    /// Advance the continuous scale by `elapsed_ms` of real time: stat
    /// drift for the current zone, the step animation and the neglect
    /// timer. A paused session ignores frames.
    pub fn frame(&mut self, elapsed_ms: f64) -> SimResult<Vec<SimEvent>> {
        self.ensure_running()?;
        if self.clock.paused || elapsed_ms <= 0.0 {
            return Ok(vec![]);
        }

        self.elapsed_ms += elapsed_ms;
        let dt = elapsed_ms / self.config.tick_ms;

        self.subject.advance_animation(dt * self.config.movement.animation_speed);

        self.subject.apply_drift(&self.config.global_modifiers, dt);
        let zone_id = &self.grid.zone_at(self.subject.position).id;
        if let Some(rates) = self.config.zone_modifiers.get(zone_id) {
            self.subject.apply_drift(rates, dt);
        }

        let mut events = Vec::new();
        events.extend(self.inactivity.poll(
            self.elapsed_ms,
            &mut self.subject,
            &self.config.inactivity,
            self.clock.turn,
        ));
        self.record(&events);
        Ok(events)
    }

    // ── Discrete scale ─────────────────────────────────────────────

    /// Advance one tick. This is the core simulation step.
    pub fn tick(&mut self) -> SimResult<Vec<SimEvent>> {
        self.ensure_running()?;
        if self.clock.paused {
            return Err(SimError::PausedClock);
        }

        let outcome = self.clock.advance_tick();
        self.object_status.expire(outcome.tick);

        let mut termination: Option<DeathCause> = None;
        let mut tick_events: Vec<SimEvent> = Vec::new();

        // Each subsystem sees all events emitted so far this tick.
        for (slot, subsystem) in &mut self.subsystems {
            let mut rng = self.rng_bank.for_subsystem_at(*slot, outcome.tick);
            let mut ctx = TickContext {
                config:        &self.config,
                grid:          &self.grid,
                clock:         &self.clock,
                tick:          outcome,
                subject:       &mut self.subject,
                object_status: &mut self.object_status,
                termination:   &mut termination,
            };
            let new_events = subsystem.update(&mut ctx, &tick_events, &mut rng)?;
            if !new_events.is_empty() {
                log::debug!(
                    "tick={} {} emitted {} event(s)",
                    outcome.tick,
                    subsystem.name(),
                    new_events.len()
                );
            }
            tick_events.extend(new_events);
            if termination.is_some() {
                break;
            }
        }

        self.record(&tick_events);
        if let Some(cause) = termination {
            self.terminate(cause);
        }
        Ok(tick_events)
    }

    /// Run n ticks in a loop. Used for testing and fast-forward.
    /// Stops early, without error, when the session ends.
    pub fn run_ticks(&mut self, n: u64) -> SimResult<Vec<SimEvent>> {
        let mut events = Vec::new();
        for _ in 0..n {
            events.extend(self.tick()?);
            if self.is_over() {
                break;
            }
        }
        Ok(events)
    }

    /// Run whole turns. Returns at the first turn boundary reached after
    /// each of the `n` turns.
    pub fn run_turns(&mut self, n: u64) -> SimResult<Vec<SimEvent>> {
        let target = self.clock.turn + n;
        let mut events = Vec::new();
        while self.clock.turn < target && !self.is_over() {
            events.extend(self.tick()?);
        }
        Ok(events)
    }

    // ── Player input ───────────────────────────────────────────────

    /// Apply one player command. Any command counts as attention and
    /// resets the neglect timer.
    pub fn handle_command(&mut self, cmd: PlayerCommand) -> SimResult<Vec<SimEvent>> {
        self.ensure_running()?;
        self.inactivity.register_input(self.elapsed_ms);
        self.command_seq += 1;
        log::debug!("command #{}: {cmd:?}", self.command_seq);

        let turn = self.clock.turn;
        let mut events = Vec::new();
        match cmd {
            PlayerCommand::Pause => self.clock.pause(),
            PlayerCommand::Resume => self.clock.resume(),
            PlayerCommand::MoveTo { x, y } => self.move_to(Tile::new(x, y), &mut events),
            PlayerCommand::UseObject { object_id } => self.use_object(&object_id, &mut events),
            PlayerCommand::CallVisitor => {
                let config = &self.config;
                let subject = &mut self.subject;
                let visitor = self.subsystems.iter_mut().find_map(|(_, sub)| {
                    sub.as_any_mut().downcast_mut::<VisitorSubsystem>()
                });
                if let Some(visitor) = visitor {
                    events.push(visitor.call(subject, config, turn));
                }
            }
            PlayerCommand::PlayMusic => {
                if self.last_music_turn == Some(turn) {
                    events.push(SimEvent::MusicRejected { turn });
                } else {
                    self.last_music_turn = Some(turn);
                    if let Some(effect) = self.config.effect(&self.config.music_effect) {
                        self.subject.apply_effect(effect);
                    }
                    events.push(SimEvent::MusicPlayed { turn });
                }
            }
            PlayerCommand::SetZoom { zoom } => self.set_zoom(zoom),
            PlayerCommand::ZoomIn => self.set_zoom(self.view.zoom + self.config.view.zoom_step),
            PlayerCommand::ZoomOut => self.set_zoom(self.view.zoom - self.config.view.zoom_step),
            PlayerCommand::Pan { dx, dy } => {
                self.view.pan_x += dx;
                self.view.pan_y += dy;
            }
        }

        self.record(&events);
        Ok(events)
    }

    /// Route the subject to `tile`. An object on that tile becomes the
    /// target and is used on arrival.
    fn move_to(&mut self, tile: Tile, events: &mut Vec<SimEvent>) {
        if !self.grid.in_bounds(tile) {
            log::debug!("move_to {tile} ignored: out of bounds");
            return;
        }
        let object = self.grid.object_at(tile).cloned();

        if tile == self.subject.position && !self.subject.movement.moving {
            self.subject.clear_route();
            if let Some(object) = object {
                self.use_object(&object.id, events);
            }
            return;
        }

        // A step in flight always completes; the new route starts where it lands.
        let start = if self.subject.movement.moving {
            self.subject.movement.anim.to
        } else {
            self.subject.position
        };
        let path = shortest_path(&self.grid, start, tile);
        self.subject.movement.path = path.into();
        self.subject.movement.target = object.map(|o| MoveTarget { object_id: o.id, tile });
    }

    fn use_object(&mut self, object_id: &str, events: &mut Vec<SimEvent>) {
        let turn = self.clock.turn;
        let Some(object) = self.grid.object(object_id) else {
            events.push(SimEvent::InteractionRejected {
                turn,
                object_id:   object_id.to_string(),
                object_name: object_id.to_string(),
                reason:      RejectReason::UnknownObject,
            });
            return;
        };
        let date = self.clock.date();
        let env = InteractionEnv { config: &self.config, turn, date: &date };
        let mut rng = self.rng_bank.for_subsystem_at(SubsystemSlot::Command, self.command_seq);
        use_with_feedback(
            &mut self.subject,
            object,
            &env,
            &mut rng,
            &mut self.object_status,
            self.clock.total_ticks,
            events,
        );
    }

    fn set_zoom(&mut self, zoom: f64) {
        let view = &self.config.view;
        self.view.zoom = zoom.clamp(view.zoom_min, view.zoom_max);
    }

    // ── Accessors ──────────────────────────────────────────────────

    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    /// Mutable access for tooling and tests that stage a scenario.
    pub fn subject_mut(&mut self) -> &mut Subject {
        &mut self.subject
    }

    /// Query the VisitorSubsystem's current state.
    pub fn visitor(&self) -> Option<&VisitorState> {
        self.subsystems.iter().find_map(|(_, sub)| {
            sub.as_any().downcast_ref::<VisitorSubsystem>().map(|v| &v.state)
        })
    }

    /// Steps from the MovementSubsystem, turns from the NeedsSubsystem.
    pub fn counters(&self) -> SessionCounters {
        let mut counters = SessionCounters::default();
        for (_, sub) in &self.subsystems {
            if let Some(movement) = sub.as_any().downcast_ref::<MovementSubsystem>() {
                counters.steps_taken = movement.steps_taken;
            } else if let Some(needs) = sub.as_any().downcast_ref::<NeedsSubsystem>() {
                counters.turns_processed = needs.turns_processed;
            }
        }
        counters
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    pub fn object_status(&self, object_id: &str) -> ObjectStatus {
        self.object_status.get(object_id)
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_over(&self) -> bool {
        matches!(self.status, SessionStatus::Terminated { .. })
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    /// Everything the renderer draws, as one owned value.
    pub fn snapshot(&self) -> WorldSnapshot {
        let objects = self
            .grid
            .objects()
            .iter()
            .map(|o| ObjectSnapshot {
                id:       o.id.clone(),
                name:     o.name.clone(),
                icon:     o.icon.clone(),
                pos:      o.pos,
                status:   self.object_status.get(&o.id),
                cooldown: self.subject.cooldown(&o.id),
            })
            .collect();
        WorldSnapshot {
            session_id: self.session_id.clone(),
            seed:       self.rng_bank.master_seed(),
            status:     self.status,
            clock:      ClockSnapshot::from(&self.clock),
            subject:    SubjectSnapshot::from(&self.subject),
            visitor:    self.visitor().map(|v| VisitorSnapshot::new(v, self.clock.turn)),
            objects,
            log:        self.event_log.entries().cloned().collect(),
            view:       self.view.clone(),
            counters:   self.counters(),
        }
    }
}
