//! Simulation events and the user-facing event log.
//!
//! Subsystems and the interaction engine report what happened by
//! returning `SimEvent`s; the engine appends the ones that carry a
//! message to the bounded `EventLog` the renderer reads.

use crate::types::{ObjectId, Tick, Tile, Turn};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Maximum number of entries kept in the event log.
pub const EVENT_LOG_CAPACITY: usize = 100;

/// Every event emitted during simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    // ── Clock ──────────────────────────────────────
    TurnStarted {
        turn: Turn,
        date: String,
    },

    // ── Movement ───────────────────────────────────
    StepStarted {
        tick: Tick,
        from: Tile,
        to: Tile,
    },
    RandomEvent {
        turn: Turn,
        zone: String,
        message: String,
    },

    // ── Interactions ───────────────────────────────
    InteractionSucceeded {
        turn: Turn,
        object_id: ObjectId,
        message: String,
    },
    InteractionRejected {
        turn: Turn,
        object_id: ObjectId,
        object_name: String,
        reason: RejectReason,
    },
    MusicPlayed {
        turn: Turn,
    },
    MusicRejected {
        turn: Turn,
    },

    // ── Turn boundary ──────────────────────────────
    WorkMissed {
        turn: Turn,
        anxiety_added: f64,
    },
    CrisisEntered {
        turn: Turn,
        anxiety: f64,
        mental_health: f64,
    },
    DepressionActivated {
        turn: Turn,
    },
    Neglected {
        turn: Turn,
    },

    // ── Visitor ────────────────────────────────────
    VisitsPlanned {
        turn: Turn,
        days: Vec<u32>,
    },
    VisitStarted {
        turn: Turn,
        position: Tile,
        until_turn: Turn,
    },
    VisitEnded {
        turn: Turn,
    },
    VisitorCalled {
        turn: Turn,
    },
    CallRejected {
        turn: Turn,
    },

    // ── Termination ────────────────────────────────
    SubjectDied {
        turn: Turn,
        cause: DeathCause,
    },
}

impl SimEvent {
    /// Stable string name, used in logs and by the runner.
    pub fn type_name(&self) -> &'static str {
        match self {
            SimEvent::TurnStarted { .. }          => "turn_started",
            SimEvent::StepStarted { .. }          => "step_started",
            SimEvent::RandomEvent { .. }          => "random_event",
            SimEvent::InteractionSucceeded { .. } => "interaction_succeeded",
            SimEvent::InteractionRejected { .. }  => "interaction_rejected",
            SimEvent::MusicPlayed { .. }          => "music_played",
            SimEvent::MusicRejected { .. }        => "music_rejected",
            SimEvent::WorkMissed { .. }           => "work_missed",
            SimEvent::CrisisEntered { .. }        => "crisis_entered",
            SimEvent::DepressionActivated { .. }  => "depression_activated",
            SimEvent::Neglected { .. }            => "neglected",
            SimEvent::VisitsPlanned { .. }        => "visits_planned",
            SimEvent::VisitStarted { .. }         => "visit_started",
            SimEvent::VisitEnded { .. }           => "visit_ended",
            SimEvent::VisitorCalled { .. }        => "visitor_called",
            SimEvent::CallRejected { .. }         => "call_rejected",
            SimEvent::SubjectDied { .. }          => "subject_died",
        }
    }

    /// The line shown to the player, if this event is player-facing.
    pub fn log_line(&self) -> Option<(Severity, String)> {
        let line = match self {
            SimEvent::TurnStarted { date, .. } => (Severity::Info, format!("A new day begins: {date}")),
            SimEvent::StepStarted { .. } | SimEvent::VisitsPlanned { .. } => return None,
            SimEvent::RandomEvent { message, .. } => (Severity::Info, message.clone()),
            SimEvent::InteractionSucceeded { message, .. } => (Severity::Good, message.clone()),
            SimEvent::InteractionRejected { object_name, reason, .. } => {
                (Severity::Warn, reason.message(object_name))
            }
            SimEvent::MusicPlayed { .. } => {
                (Severity::Good, "Listening to music. Feeling a little better :)".into())
            }
            SimEvent::MusicRejected { .. } => {
                (Severity::Warn, "You can only listen to music once per day.".into())
            }
            SimEvent::WorkMissed { .. } => {
                (Severity::Warn, "Oops! You forgot to go to work. Anxiety rises!".into())
            }
            SimEvent::CrisisEntered { .. } => {
                (Severity::Bad, "Anxiety is overwhelming. This is a crisis.".into())
            }
            SimEvent::DepressionActivated { .. } => {
                (Severity::Bad, "Sadness has settled in. Depression is active.".into())
            }
            SimEvent::Neglected { .. } => {
                (Severity::Warn, "You have been neglectful! Trust and bond drop!".into())
            }
            SimEvent::VisitStarted { .. } => (
                Severity::Good,
                "Cris came to visit! You spend the day together; anxiety drops and mental health improves."
                    .into(),
            ),
            SimEvent::VisitEnded { .. } => (Severity::Info, "Cris went home.".into()),
            SimEvent::VisitorCalled { .. } => {
                (Severity::Good, "You called Cris. You talked and feel better.".into())
            }
            SimEvent::CallRejected { .. } => {
                (Severity::Warn, "You already called Cris today!".into())
            }
            SimEvent::SubjectDied { cause, .. } => (Severity::Bad, cause.message().into()),
        };
        Some(line)
    }
}

/// Why an interaction was refused. Refusals never change state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    Cooldown,
    Saturated,
    /// Workplace on a weekend, or work already done this turn.
    NotAvailableToday,
    /// Psychologist visited fewer than the minimum days ago.
    TooSoon,
    /// Psychologist has nothing left to improve.
    NoNeed,
    UnknownObject,
}

impl RejectReason {
    pub fn message(&self, object_name: &str) -> String {
        match self {
            Self::Cooldown => format!("You must wait before using {object_name} again!"),
            Self::Saturated => format!("Your stats are already maxed out, you don't need {object_name}!"),
            Self::NotAvailableToday => "It's not a workday, or you already worked today.".into(),
            Self::TooSoon => "You must wait longer between psychologist visits!".into(),
            Self::NoNeed => "You don't need the psychologist right now!".into(),
            Self::UnknownObject => format!("There is no {object_name} here."),
        }
    }
}

/// Terminal cause tag. The session cannot continue after one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    #[serde(rename = "hambre")]
    Hunger,
    #[serde(rename = "depresion")]
    Depression,
    #[serde(rename = "salud")]
    Health,
    #[serde(rename = "accidente")]
    Accident,
}

impl DeathCause {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Hunger => "hambre",
            Self::Depression => "depresion",
            Self::Health => "salud",
            Self::Accident => "accidente",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Hunger => "Starvation. Nobody made sure there was food.",
            Self::Depression => "Depression won. Please reach out to someone if you feel like this.",
            Self::Health => "The body gave out. Physical health reached zero.",
            Self::Accident => "Too anxious to pay attention outside. There was an accident.",
        }
    }
}

impl std::fmt::Display for DeathCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Good,
    Warn,
    Bad,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub turn: Turn,
    pub severity: Severity,
    pub message: String,
}

/// Append-only ring buffer, newest last.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::with_capacity(EVENT_LOG_CAPACITY)
    }
}

impl EventLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { entries: VecDeque::with_capacity(capacity), capacity: capacity.max(1) }
    }

    pub fn push(&mut self, entry: LogEntry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Append the player-facing line of `event`, if it has one.
    pub fn record(&mut self, turn: Turn, event: &SimEvent) {
        if let Some((severity, message)) = event.log_line() {
            self.push(LogEntry { turn, severity, message });
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
