//! The pet: needs, position, movement state and cooldowns.
//!
//! INVARIANT: every stat, anxiety and bond is in [0, 100] after any
//! public mutating method returns.

use crate::{
    config::{Effect, StatKind, StatRates, SubjectTemplate},
    types::{ObjectId, Point, Tile, Turn},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

pub const STAT_MIN: f64 = 0.0;
pub const STAT_MAX: f64 = 100.0;

fn clamp_stat(v: f64) -> f64 {
    v.clamp(STAT_MIN, STAT_MAX)
}

/// The bounded stat set. Anxiety and bond live on `Subject` directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub hunger:          f64,
    pub happiness:       f64,
    pub energy:          f64,
    pub trust:           f64,
    pub mental_health:   f64,
    pub physical_health: f64,
    pub depression:      f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmotionalState {
    Happy,
    Sad,
    InCrisis,
}

/// One animated step between two adjacent tiles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepAnimation {
    pub from: Tile,
    pub to:   Tile,
    /// Interpolation fraction in [0, 1].
    pub t:    f64,
}

/// The object a commanded path is leading to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveTarget {
    pub object_id: ObjectId,
    pub tile:      Tile,
}

/// Face the renderer draws over the pet. Finer-grained than
/// `EmotionalState` and purely cosmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Overwhelmed,
    Panicking,
    VeryAnxious,
    Worried,
    Elated,
    Content,
    Crying,
    Down,
    Fragile,
    Tense,
    Calm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementPhase {
    Idle,
    FollowingPath,
    AnimatingStep,
    ArrivedAtTarget,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    pub path:   VecDeque<Tile>,
    pub target: Option<MoveTarget>,
    pub anim:   StepAnimation,
    pub moving: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub name:                   String,
    pub personality:            String,
    pub position:               Tile,
    pub stats:                  Stats,
    pub anxiety:                f64,
    pub bond:                   f64,
    pub emotional_state:        EmotionalState,
    /// Sticky: set on a severe anxiety episode, never cleared.
    pub in_crisis:              bool,
    /// Sticky: set when the depression sub-model activates.
    pub depression_active:      bool,
    pub movement:               Movement,
    /// Remaining cooldown per object, in real-time units.
    pub cooldowns:              BTreeMap<ObjectId, f64>,
    pub last_psychologist_turn: Option<Turn>,
    pub last_work_turn:         Option<Turn>,
}

impl Subject {
    pub fn from_template(template: &SubjectTemplate) -> Self {
        let init = |k: StatKind| clamp_stat(template.initial(k));
        let position = template.position;
        Self {
            name:        template.name.clone(),
            personality: template.personality.clone(),
            position,
            stats: Stats {
                hunger:          init(StatKind::Hunger),
                happiness:       init(StatKind::Happiness),
                energy:          init(StatKind::Energy),
                trust:           init(StatKind::Trust),
                mental_health:   init(StatKind::MentalHealth),
                physical_health: init(StatKind::PhysicalHealth),
                depression:      init(StatKind::Depression),
            },
            anxiety:           init(StatKind::Anxiety),
            bond:              init(StatKind::Bond),
            emotional_state:   EmotionalState::Happy,
            in_crisis:         false,
            depression_active: false,
            movement: Movement {
                path:   VecDeque::new(),
                target: None,
                anim:   StepAnimation { from: position, to: position, t: 1.0 },
                moving: false,
            },
            cooldowns:              BTreeMap::new(),
            last_psychologist_turn: None,
            last_work_turn:         None,
        }
    }

    // ── Stats ──────────────────────────────────────────────────────

    pub fn get(&self, kind: StatKind) -> f64 {
        match kind {
            StatKind::Hunger => self.stats.hunger,
            StatKind::Happiness => self.stats.happiness,
            StatKind::Energy => self.stats.energy,
            StatKind::Trust => self.stats.trust,
            StatKind::MentalHealth => self.stats.mental_health,
            StatKind::PhysicalHealth => self.stats.physical_health,
            StatKind::Depression => self.stats.depression,
            StatKind::Anxiety => self.anxiety,
            StatKind::Bond => self.bond,
        }
    }

    fn slot(&mut self, kind: StatKind) -> &mut f64 {
        match kind {
            StatKind::Hunger => &mut self.stats.hunger,
            StatKind::Happiness => &mut self.stats.happiness,
            StatKind::Energy => &mut self.stats.energy,
            StatKind::Trust => &mut self.stats.trust,
            StatKind::MentalHealth => &mut self.stats.mental_health,
            StatKind::PhysicalHealth => &mut self.stats.physical_health,
            StatKind::Depression => &mut self.stats.depression,
            StatKind::Anxiety => &mut self.anxiety,
            StatKind::Bond => &mut self.bond,
        }
    }

    pub fn set(&mut self, kind: StatKind, value: f64) {
        *self.slot(kind) = clamp_stat(value);
    }

    /// Clamped addition.
    pub fn add(&mut self, kind: StatKind, delta: f64) {
        let slot = self.slot(kind);
        *slot = clamp_stat(*slot + delta);
    }

    pub fn apply_effect(&mut self, effect: &Effect) {
        for (&kind, &delta) in effect {
            self.add(kind, delta);
        }
    }

    /// Add `rate * dt` for every rate, clamping once at the end.
    pub fn apply_drift(&mut self, rates: &StatRates, dt: f64) {
        for (&kind, &rate) in rates {
            *self.slot(kind) += rate * dt;
        }
        self.clamp_all();
    }

    pub fn clamp_all(&mut self) {
        for kind in StatKind::ALL {
            let slot = self.slot(kind);
            *slot = clamp_stat(*slot);
        }
    }

    /// True when any bounded stat already sits on the bound the effect
    /// pushes towards.
    pub fn is_saturated_by(&self, effect: &Effect) -> bool {
        effect.iter().any(|(&kind, &delta)| {
            kind.is_bounded_stat() && {
                let v = self.get(kind);
                (delta > 0.0 && v >= STAT_MAX) || (delta < 0.0 && v <= STAT_MIN)
            }
        })
    }

    pub fn mood(&self) -> Mood {
        let (h, a, m) = (self.stats.happiness, self.anxiety, self.stats.mental_health);
        if self.emotional_state == EmotionalState::InCrisis || (a > 85.0 && m < 40.0) {
            Mood::Overwhelmed
        } else if m < 30.0 && a > 70.0 {
            Mood::Panicking
        } else if a > 80.0 {
            Mood::VeryAnxious
        } else if a > 60.0 {
            Mood::Worried
        } else if h >= 70.0 && a < 30.0 && m > 60.0 {
            Mood::Elated
        } else if h >= 70.0 && m > 50.0 {
            Mood::Content
        } else if h < 30.0 && m < 40.0 {
            Mood::Crying
        } else if h < 30.0 {
            Mood::Down
        } else if m < 40.0 {
            Mood::Fragile
        } else if a > 50.0 {
            Mood::Tense
        } else {
            Mood::Calm
        }
    }

    // ── Cooldowns and schedules ────────────────────────────────────

    pub fn cooldown(&self, object_id: &str) -> f64 {
        self.cooldowns.get(object_id).copied().unwrap_or(0.0)
    }

    pub fn is_on_cooldown(&self, object_id: &str) -> bool {
        self.cooldown(object_id) > 0.0
    }

    /// Decrement every cooldown by `amount`, flooring at 0.
    pub fn decay_cooldowns(&mut self, amount: f64) {
        for remaining in self.cooldowns.values_mut() {
            *remaining = (*remaining - amount).max(0.0);
        }
    }

    pub fn can_visit_psychologist(&self, turn: Turn, min_days: u64) -> bool {
        self.last_psychologist_turn
            .map_or(true, |last| turn.saturating_sub(last) >= min_days)
    }

    pub fn worked_on(&self, turn: Turn) -> bool {
        self.last_work_turn == Some(turn)
    }

    // ── Movement ───────────────────────────────────────────────────

    pub fn movement_phase(&self) -> MovementPhase {
        let m = &self.movement;
        if m.moving {
            MovementPhase::AnimatingStep
        } else if !m.path.is_empty() {
            MovementPhase::FollowingPath
        } else if m.target.as_ref().is_some_and(|t| t.tile == self.position) {
            MovementPhase::ArrivedAtTarget
        } else {
            MovementPhase::Idle
        }
    }

    pub fn begin_step(&mut self, to: Tile) {
        self.movement.moving = true;
        self.movement.anim = StepAnimation { from: self.position, to, t: 0.0 };
    }

    /// Advance the step animation; snaps to the target tile on completion.
    pub fn advance_animation(&mut self, progress: f64) {
        if !self.movement.moving {
            return;
        }
        let anim = &mut self.movement.anim;
        anim.t += progress;
        if anim.t >= 1.0 {
            anim.t = 1.0;
            self.movement.moving = false;
            self.position = anim.to;
        }
    }

    /// Position for drawing, linearly interpolated while a step animates.
    pub fn interpolated_position(&self) -> Point {
        if !self.movement.moving {
            return Point { x: self.position.x as f64, y: self.position.y as f64 };
        }
        let StepAnimation { from, to, t } = self.movement.anim;
        Point {
            x: from.x as f64 * (1.0 - t) + to.x as f64 * t,
            y: from.y as f64 * (1.0 - t) + to.y as f64 * t,
        }
    }

    pub fn clear_route(&mut self) {
        self.movement.path.clear();
        self.movement.target = None;
    }
}
