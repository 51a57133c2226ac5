//! Ruleset loaded once at startup from a single JSON document.
//!
//! Everything here is read-only after `SimConfig::load`. Effect tables are
//! typed: keys are `StatKind`, so an unknown stat name fails deserialization
//! instead of being silently ignored at runtime.

use crate::{
    error::{SimError, SimResult},
    types::{ObjectId, Tile, ZoneId},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

// ── Stats and effects ──────────────────────────────────────────────

/// Closed set of stats an effect or modifier may touch.
/// Spanish aliases accept the older Spanish-keyed config documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    #[serde(alias = "hambre")]
    Hunger,
    #[serde(alias = "felicidad")]
    Happiness,
    #[serde(alias = "energia")]
    Energy,
    #[serde(alias = "confianza")]
    Trust,
    #[serde(alias = "saludMental")]
    MentalHealth,
    #[serde(alias = "saludFisica")]
    PhysicalHealth,
    #[serde(alias = "depresion")]
    Depression,
    #[serde(alias = "ansiedad")]
    Anxiety,
    #[serde(alias = "vinculo")]
    Bond,
}

impl StatKind {
    pub const ALL: [StatKind; 9] = [
        StatKind::Hunger,
        StatKind::Happiness,
        StatKind::Energy,
        StatKind::Trust,
        StatKind::MentalHealth,
        StatKind::PhysicalHealth,
        StatKind::Depression,
        StatKind::Anxiety,
        StatKind::Bond,
    ];

    /// Anxiety and bond live outside the bounded-stat set. They are still
    /// clamped, but never take part in the saturation check.
    pub fn is_bounded_stat(self) -> bool {
        !matches!(self, StatKind::Anxiety | StatKind::Bond)
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::Hunger => "hunger",
            Self::Happiness => "happiness",
            Self::Energy => "energy",
            Self::Trust => "trust",
            Self::MentalHealth => "mental_health",
            Self::PhysicalHealth => "physical_health",
            Self::Depression => "depression",
            Self::Anxiety => "anxiety",
            Self::Bond => "bond",
        }
    }

    /// Starting value when the subject template leaves a stat out.
    pub fn default_initial(self) -> f64 {
        match self {
            Self::Happiness | Self::Trust | Self::MentalHealth => 50.0,
            Self::Energy | Self::PhysicalHealth => 100.0,
            Self::Hunger | Self::Depression | Self::Anxiety | Self::Bond => 0.0,
        }
    }
}

/// A named bundle of per-stat deltas, applied atomically.
pub type Effect = BTreeMap<StatKind, f64>;

/// Per-stat drift rates, multiplied by the frame `dt`.
pub type StatRates = BTreeMap<StatKind, f64>;

// ── Map ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneConfig {
    pub id: ZoneId,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    pub from_x: i32,
    pub to_x: i32,
    pub from_y: i32,
    pub to_y: i32,
    /// Outdoor zones are where the accident hazard applies.
    #[serde(default)]
    pub outdoor: bool,
}

impl ZoneConfig {
    pub fn contains(&self, tile: Tile) -> bool {
        tile.x >= self.from_x && tile.x <= self.to_x && tile.y >= self.from_y && tile.y <= self.to_y
    }
}

/// Dedicated interaction logic. Objects without an explicit kind get one
/// from their id, so documents without a `kind` field keep working.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Generic,
    Bed,
    Gym,
    Chocolate,
    Workplace,
    Psychologist,
}

impl ObjectKind {
    pub fn from_id(id: &str) -> Self {
        match id {
            "cama" | "bed" => Self::Bed,
            "gimnasio" | "gym" => Self::Gym,
            "chocolate" => Self::Chocolate,
            "puesto-trabajo" | "workplace" => Self::Workplace,
            "psicologo" | "psychologist" => Self::Psychologist,
            _ => Self::Generic,
        }
    }

    /// Scheduled actions use the turn as cooldown unit; everything else
    /// uses the minute.
    pub fn uses_turn_cooldown(self) -> bool {
        matches!(self, Self::Workplace | Self::Psychologist)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectConfig {
    pub id: ObjectId,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    pub pos: Tile,
    /// Effect reference; defaults to the object id.
    #[serde(default)]
    pub effect: Option<String>,
    #[serde(default)]
    pub kind: Option<ObjectKind>,
}

impl ObjectConfig {
    pub fn effect_id(&self) -> &str {
        self.effect.as_deref().unwrap_or(&self.id)
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind.unwrap_or_else(|| ObjectKind::from_id(&self.id))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomEventConfig {
    pub zone: ZoneId,
    pub probability: f64,
    pub effect: Effect,
    pub message: String,
}

// ── Rules ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RangeConfig {
    pub min: i64,
    pub max: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnRulesConfig {
    pub trust_per_turn: f64,
    pub bond_per_turn: f64,
    /// Anxiety added on a workday when work was skipped the day before.
    pub missed_work_anxiety: f64,
    pub happiness_anxiety_threshold: f64,
    pub happiness_anxiety_decay: f64,
    pub anxiety_rebate_per_turn: f64,
    pub happy_above: f64,
    pub sad_below: f64,
    pub crisis_anxiety_above: f64,
    pub crisis_mental_health_below: f64,
}

impl Default for TurnRulesConfig {
    fn default() -> Self {
        Self {
            trust_per_turn: 10.0,
            bond_per_turn: 10.0,
            missed_work_anxiety: 18.0,
            happiness_anxiety_threshold: 50.0,
            happiness_anxiety_decay: 12.0,
            anxiety_rebate_per_turn: 7.0,
            happy_above: 70.0,
            sad_below: 30.0,
            crisis_anxiety_above: 70.0,
            crisis_mental_health_below: 40.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DepressionConfig {
    pub activation_anxiety_above: f64,
    pub activation_happiness_below: f64,
    pub rise_per_turn: f64,
    pub decay_per_turn: f64,
    /// Effect bundle applied every turn while depression is active.
    pub effect: Option<String>,
}

impl Default for DepressionConfig {
    fn default() -> Self {
        Self {
            activation_anxiety_above: 70.0,
            activation_happiness_below: 35.0,
            rise_per_turn: 5.0,
            decay_per_turn: 2.0,
            effect: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HazardConfig {
    pub accident_probability: f64,
    pub accident_anxiety_above: f64,
}

impl Default for HazardConfig {
    fn default() -> Self {
        Self { accident_probability: 0.02, accident_anxiety_above: 90.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InactivityConfig {
    pub threshold_ms: f64,
    pub trust_penalty: f64,
    pub bond_penalty: f64,
    pub mental_health_penalty: f64,
    pub anxiety_penalty: f64,
}

impl Default for InactivityConfig {
    fn default() -> Self {
        Self {
            threshold_ms: 120_000.0,
            trust_penalty: 20.0,
            bond_penalty: 20.0,
            mental_health_penalty: 10.0,
            anxiety_penalty: 15.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrisConfig {
    pub min_appearances: u32,
    pub max_appearances: u32,
    pub visit_duration_days: u64,
    #[serde(default = "CrisConfig::default_visit_effect")]
    pub visit_effect: String,
    #[serde(default = "CrisConfig::default_call_effect")]
    pub call_effect: String,
}

impl CrisConfig {
    fn default_visit_effect() -> String { "cris-visita".into() }
    fn default_call_effect() -> String { "cris-llamada".into() }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MovementPolicy {
    /// Six-direction random walk that uses objects it bumps into.
    #[default]
    RandomWalk,
    /// Follow commanded paths; idle steps are plain 4-direction moves.
    PathPriority,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub policy: MovementPolicy,
    /// Animation progress per unit of frame `dt`.
    pub animation_speed: f64,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self { policy: MovementPolicy::RandomWalk, animation_speed: 1.75 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    pub random_events: bool,
    /// Depression sub-model plus death checks.
    pub normal_progression: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self { random_events: true, normal_progression: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub zoom_min: f64,
    pub zoom_max: f64,
    pub zoom_step: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self { zoom_min: 0.5, zoom_max: 2.0, zoom_step: 0.1 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectTemplate {
    pub name: String,
    #[serde(default)]
    pub personality: String,
    pub position: Tile,
    /// Starting values. Missing stats take `StatKind::default_initial`.
    #[serde(default)]
    pub stats: BTreeMap<StatKind, f64>,
}

impl SubjectTemplate {
    pub fn initial(&self, kind: StatKind) -> f64 {
        self.stats.get(&kind).copied().unwrap_or_else(|| kind.default_initial())
    }
}

// ── Root ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    pub grid_width: i32,
    pub grid_height: i32,
    /// Real-time length of one tick.
    pub tick_ms: f64,
    /// Real-time length of one turn; also the turn cooldown unit.
    pub turn_ms: f64,
    /// Cooldown unit for everyday objects.
    pub minute_ms: f64,
    #[serde(default)]
    pub ticks_per_turn: Option<u32>,
    pub zones: Vec<ZoneConfig>,
    #[serde(default)]
    pub zone_modifiers: HashMap<ZoneId, StatRates>,
    #[serde(default)]
    pub global_modifiers: StatRates,
    pub objects: Vec<ObjectConfig>,
    pub effects: HashMap<String, Effect>,
    /// Base cooldown per object, multiplied by the object's unit.
    #[serde(default)]
    pub cooldowns: HashMap<ObjectId, f64>,
    #[serde(default)]
    pub turn_rules: TurnRulesConfig,
    #[serde(default)]
    pub action_anxiety_rebate: Option<RangeConfig>,
    pub psychologist_min_days: u64,
    pub cris: CrisConfig,
    #[serde(default = "SimConfig::default_music_effect")]
    pub music_effect: String,
    #[serde(default)]
    pub random_events: Vec<RandomEventConfig>,
    #[serde(default)]
    pub depression: DepressionConfig,
    #[serde(default)]
    pub hazard: HazardConfig,
    #[serde(default)]
    pub inactivity: InactivityConfig,
    #[serde(default)]
    pub features: FeatureFlags,
    #[serde(default)]
    pub movement: MovementConfig,
    #[serde(default)]
    pub view: ViewConfig,
    pub subject: SubjectTemplate,
}

pub const DEFAULT_OBJECT_COOLDOWN: f64 = 5.0;

impl SimConfig {
    fn default_music_effect() -> String { "musica".into() }

    /// Load and validate the ruleset document at `path`.
    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        log::debug!("loading ruleset from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> SimResult<Self> {
        let config: SimConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Ticks that compose one turn. Derived from the real-time lengths
    /// when the document does not set it.
    pub fn ticks_per_turn(&self) -> u32 {
        self.ticks_per_turn
            .unwrap_or_else(|| (self.turn_ms / self.tick_ms).round().max(1.0) as u32)
    }

    pub fn effect(&self, id: &str) -> Option<&Effect> {
        self.effects.get(id)
    }

    pub fn object(&self, id: &str) -> Option<&ObjectConfig> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn base_cooldown(&self, object_id: &str) -> f64 {
        self.cooldowns.get(object_id).copied().unwrap_or(DEFAULT_OBJECT_COOLDOWN)
    }

    pub fn in_bounds(&self, tile: Tile) -> bool {
        tile.x >= 0 && tile.y >= 0 && tile.x < self.grid_width && tile.y < self.grid_height
    }

    /// Reject documents the simulation cannot run on.
    pub fn validate(&self) -> SimResult<()> {
        if self.grid_width <= 0 || self.grid_height <= 0 {
            return Err(SimError::invalid_config(format!(
                "grid must be positive, got {}x{}",
                self.grid_width, self.grid_height
            )));
        }
        if self.tick_ms <= 0.0 || self.turn_ms <= 0.0 || self.minute_ms <= 0.0 {
            return Err(SimError::invalid_config("tick_ms, turn_ms and minute_ms must be > 0"));
        }
        if self.ticks_per_turn == Some(0) {
            return Err(SimError::invalid_config("ticks_per_turn must be >= 1"));
        }
        if !self.in_bounds(self.subject.position) {
            return Err(SimError::invalid_config(format!(
                "subject start {} is outside the grid",
                self.subject.position
            )));
        }
        for obj in &self.objects {
            if !self.in_bounds(obj.pos) {
                return Err(SimError::invalid_config(format!(
                    "object '{}' at {} is outside the grid",
                    obj.id, obj.pos
                )));
            }
            // The bed sets energy directly and needs no effect entry.
            if obj.kind() != ObjectKind::Bed {
                self.require_effect(&format!("object '{}'", obj.id), obj.effect_id())?;
            }
            if self.objects.iter().filter(|o| o.id == obj.id).count() > 1 {
                return Err(SimError::invalid_config(format!("duplicate object id '{}'", obj.id)));
            }
        }
        for zone_id in self.zone_modifiers.keys() {
            if zone_id != crate::grid::STREET_ZONE_ID && !self.zones.iter().any(|z| &z.id == zone_id) {
                return Err(SimError::invalid_config(format!(
                    "zone_modifiers references unknown zone '{zone_id}'"
                )));
            }
        }
        for event in &self.random_events {
            if !(0.0..=1.0).contains(&event.probability) {
                return Err(SimError::invalid_config(format!(
                    "random event '{}' has probability {} outside [0, 1]",
                    event.message, event.probability
                )));
            }
        }
        self.require_effect("cris.visit_effect", &self.cris.visit_effect)?;
        self.require_effect("cris.call_effect", &self.cris.call_effect)?;
        self.require_effect("music_effect", &self.music_effect)?;
        if let Some(id) = &self.depression.effect {
            self.require_effect("depression.effect", id)?;
        }
        let cris = &self.cris;
        if cris.min_appearances > cris.max_appearances || cris.max_appearances > 30 {
            return Err(SimError::invalid_config(format!(
                "cris appearances must satisfy min <= max <= 30, got {}..={}",
                cris.min_appearances, cris.max_appearances
            )));
        }
        if cris.visit_duration_days == 0 {
            return Err(SimError::invalid_config("cris.visit_duration_days must be >= 1"));
        }
        if let Some(range) = self.action_anxiety_rebate {
            if range.min > range.max || range.min < 0 {
                return Err(SimError::invalid_config(format!(
                    "action_anxiety_rebate must satisfy 0 <= min <= max, got {}..={}",
                    range.min, range.max
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.hazard.accident_probability) {
            return Err(SimError::invalid_config("hazard.accident_probability outside [0, 1]"));
        }
        if self.view.zoom_min > self.view.zoom_max {
            return Err(SimError::invalid_config("view.zoom_min exceeds view.zoom_max"));
        }
        Ok(())
    }

    fn require_effect(&self, owner: &str, id: &str) -> SimResult<()> {
        if self.effects.contains_key(id) {
            Ok(())
        } else {
            Err(SimError::invalid_config(format!("{owner} references unknown effect '{id}'")))
        }
    }

    /// Config with hardcoded defaults for use in tests.
    ///
    /// A 10x10 map, 10 ticks per turn, random events and the
    /// depression/death model disabled (opt-in per test).
    pub fn default_test() -> Self {
        let zone = |id: &str, name: &str, x: (i32, i32), y: (i32, i32), outdoor: bool| ZoneConfig {
            id: id.into(),
            name: name.into(),
            icon: String::new(),
            from_x: x.0,
            to_x: x.1,
            from_y: y.0,
            to_y: y.1,
            outdoor,
        };
        let object = |id: &str, name: &str, x: i32, y: i32| ObjectConfig {
            id: id.into(),
            name: name.into(),
            icon: String::new(),
            pos: Tile::new(x, y),
            effect: None,
            kind: None,
        };
        let effect = |pairs: &[(StatKind, f64)]| -> Effect { pairs.iter().copied().collect() };

        let effects: HashMap<String, Effect> = [
            ("cama".into(), effect(&[(StatKind::Energy, 100.0)])),
            ("nevera".into(), effect(&[(StatKind::Hunger, -35.0), (StatKind::Happiness, 5.0)])),
            (
                "gimnasio".into(),
                effect(&[
                    (StatKind::PhysicalHealth, 10.0),
                    (StatKind::MentalHealth, 5.0),
                    (StatKind::Anxiety, -10.0),
                    (StatKind::Energy, -15.0),
                ]),
            ),
            ("chocolate".into(), effect(&[(StatKind::Happiness, 10.0), (StatKind::Hunger, -5.0)])),
            (
                "puesto-trabajo".into(),
                effect(&[
                    (StatKind::Anxiety, 5.0),
                    (StatKind::Energy, -8.0),
                    (StatKind::MentalHealth, -6.0),
                    (StatKind::Happiness, 7.0),
                ]),
            ),
            (
                "psicologo".into(),
                effect(&[
                    (StatKind::MentalHealth, 25.0),
                    (StatKind::Trust, 10.0),
                    (StatKind::Anxiety, -20.0),
                ]),
            ),
            ("sofa".into(), effect(&[(StatKind::Energy, 10.0), (StatKind::Happiness, 5.0)])),
            ("cris-visita".into(), effect(&[(StatKind::Anxiety, -20.0), (StatKind::MentalHealth, 15.0)])),
            (
                "cris-llamada".into(),
                effect(&[
                    (StatKind::Anxiety, -10.0),
                    (StatKind::MentalHealth, 5.0),
                    (StatKind::Happiness, 5.0),
                ]),
            ),
            (
                "musica".into(),
                effect(&[
                    (StatKind::Anxiety, -5.0),
                    (StatKind::Happiness, 4.0),
                    (StatKind::MentalHealth, 2.0),
                ]),
            ),
            (
                "depresion".into(),
                effect(&[(StatKind::Energy, -5.0), (StatKind::Happiness, -5.0)]),
            ),
        ]
        .into();

        let cooldowns: HashMap<ObjectId, f64> = [
            ("cama".into(), 30.0),
            ("nevera".into(), 10.0),
            ("gimnasio".into(), 20.0),
            ("chocolate".into(), 15.0),
            ("puesto-trabajo".into(), 1.0),
            ("psicologo".into(), 20.0),
            ("sofa".into(), 5.0),
        ]
        .into();

        Self {
            grid_width: 10,
            grid_height: 10,
            tick_ms: 1_000.0,
            turn_ms: 10_000.0,
            minute_ms: 1_000.0,
            ticks_per_turn: None,
            zones: vec![
                zone("casa", "Home", (0, 4), (0, 4), false),
                zone("oficina", "Office", (5, 9), (0, 4), false),
                zone("parque", "Park", (0, 9), (5, 9), true),
            ],
            zone_modifiers: [
                ("casa".into(), effect(&[(StatKind::Anxiety, -0.02)])),
                ("oficina".into(), effect(&[(StatKind::Anxiety, 0.05)])),
                ("parque".into(), effect(&[(StatKind::Happiness, 0.03)])),
            ]
            .into(),
            global_modifiers: effect(&[(StatKind::Hunger, 0.05), (StatKind::Energy, -0.03)]),
            objects: vec![
                object("cama", "Bed", 1, 1),
                object("nevera", "Fridge", 3, 1),
                object("sofa", "Sofa", 2, 3),
                object("chocolate", "Chocolate", 4, 4),
                object("gimnasio", "Gym", 2, 7),
                object("puesto-trabajo", "Desk", 7, 2),
                object("psicologo", "Psychologist", 8, 8),
            ],
            effects,
            cooldowns,
            turn_rules: TurnRulesConfig::default(),
            action_anxiety_rebate: Some(RangeConfig { min: 1, max: 3 }),
            psychologist_min_days: 20,
            cris: CrisConfig {
                min_appearances: 3,
                max_appearances: 6,
                visit_duration_days: 1,
                visit_effect: CrisConfig::default_visit_effect(),
                call_effect: CrisConfig::default_call_effect(),
            },
            music_effect: Self::default_music_effect(),
            random_events: vec![RandomEventConfig {
                zone: "parque".into(),
                probability: 0.1,
                effect: effect(&[(StatKind::Happiness, 5.0)]),
                message: "A dog came over to say hello.".into(),
            }],
            depression: DepressionConfig { effect: Some("depresion".into()), ..Default::default() },
            hazard: HazardConfig::default(),
            inactivity: InactivityConfig { threshold_ms: 60_000.0, ..Default::default() },
            features: FeatureFlags { random_events: false, normal_progression: false },
            movement: MovementConfig::default(),
            view: ViewConfig::default(),
            subject: SubjectTemplate {
                name: "Luna".into(),
                personality: "curious".into(),
                position: Tile::new(0, 0),
                stats: [
                    (StatKind::Hunger, 20.0),
                    (StatKind::Happiness, 60.0),
                    (StatKind::Energy, 80.0),
                    (StatKind::Trust, 40.0),
                    (StatKind::MentalHealth, 60.0),
                    (StatKind::PhysicalHealth, 90.0),
                ]
                .into(),
            },
        }
    }
}
