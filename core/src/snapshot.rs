//! Read-side contract for the renderer.
//!
//! Snapshots are plain serializable copies; the renderer never holds a
//! reference into live simulation state.

use crate::{
    clock::SimClock,
    engine::SessionStatus,
    event::LogEntry,
    status::ObjectStatus,
    subject::{EmotionalState, Mood, MovementPhase, Stats, Subject},
    types::{ObjectId, Point, Tile, Tick, Turn},
    visitor_subsystem::VisitorState,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectSnapshot {
    pub name:              String,
    pub personality:       String,
    pub position:          Tile,
    pub render_position:   Point,
    pub stats:             Stats,
    pub anxiety:           f64,
    pub bond:              f64,
    pub emotional_state:   EmotionalState,
    pub mood:              Mood,
    pub in_crisis:         bool,
    pub depression_active: bool,
    pub movement_phase:    MovementPhase,
    pub path_remaining:    usize,
    pub cooldowns:         BTreeMap<ObjectId, f64>,
}

impl From<&Subject> for SubjectSnapshot {
    fn from(s: &Subject) -> Self {
        Self {
            name:              s.name.clone(),
            personality:       s.personality.clone(),
            position:          s.position,
            render_position:   s.interpolated_position(),
            stats:             s.stats.clone(),
            anxiety:           s.anxiety,
            bond:              s.bond,
            emotional_state:   s.emotional_state,
            mood:              s.mood(),
            in_crisis:         s.in_crisis,
            depression_active: s.depression_active,
            movement_phase:    s.movement_phase(),
            path_remaining:    s.movement.path.len(),
            cooldowns:         s.cooldowns.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockSnapshot {
    pub turn:         Turn,
    pub tick_in_turn: u32,
    pub total_ticks:  Tick,
    pub paused:       bool,
    pub label:        String,
    pub weekday:      u32,
    pub weekday_name: String,
    pub date:         u32,
    pub month:        u32,
    pub workday:      bool,
}

impl From<&SimClock> for ClockSnapshot {
    fn from(clock: &SimClock) -> Self {
        let date = clock.date();
        Self {
            turn:         clock.turn,
            tick_in_turn: clock.tick_in_turn,
            total_ticks:  clock.total_ticks,
            paused:       clock.paused,
            label:        date.label(),
            weekday:      date.weekday,
            workday:      date.is_workday(),
            weekday_name: date.weekday_name,
            date:         date.date,
            month:        date.month,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitorSnapshot {
    pub on_map:       bool,
    pub position:     Option<Tile>,
    pub visit_days:   Vec<u32>,
    pub called_today: bool,
}

impl VisitorSnapshot {
    pub fn new(state: &VisitorState, turn: Turn) -> Self {
        Self {
            on_map:       state.on_map,
            position:     state.position,
            visit_days:   state.visit_days.clone(),
            called_today: state.last_call_turn == Some(turn),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectSnapshot {
    pub id:       ObjectId,
    pub name:     String,
    pub icon:     String,
    pub pos:      Tile,
    pub status:   ObjectStatus,
    pub cooldown: f64,
}

/// Rendering-only view parameters. Never read by the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub zoom:  f64,
    pub pan_x: f64,
    pub pan_y: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self { zoom: 1.0, pan_x: 0.0, pan_y: 0.0 }
    }
}

/// Running totals kept by the scheduled subsystems.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCounters {
    pub steps_taken:     u64,
    pub turns_processed: u64,
}

/// Everything the renderer needs for one redraw.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub session_id: String,
    pub seed:       u64,
    pub status:     SessionStatus,
    pub clock:      ClockSnapshot,
    pub subject:    SubjectSnapshot,
    pub visitor:    Option<VisitorSnapshot>,
    pub objects:    Vec<ObjectSnapshot>,
    pub log:        Vec<LogEntry>,
    pub view:       ViewState,
    pub counters:   SessionCounters,
}
