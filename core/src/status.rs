//! Per-object interaction feedback for the renderer.
//!
//! Decorative only: nothing in the simulation reads these statuses to
//! gate gameplay. Non-idle statuses fall back to idle after a short delay.

use crate::types::{ObjectId, Tick};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ticks a non-idle status stays visible.
pub const STATUS_RESET_TICKS: Tick = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ObjectStatus {
    #[default]
    Idle,
    InProgress,
    Done,
    Cooldown,
    Blocked,
}

#[derive(Debug, Clone, Default)]
pub struct ObjectStatusBoard {
    entries: BTreeMap<ObjectId, (ObjectStatus, Tick)>,
}

impl ObjectStatusBoard {
    /// Show `status` for `object_id` until `now + STATUS_RESET_TICKS`.
    pub fn set(&mut self, object_id: &str, status: ObjectStatus, now: Tick) {
        self.entries
            .insert(object_id.to_string(), (status, now + STATUS_RESET_TICKS));
    }

    pub fn get(&self, object_id: &str) -> ObjectStatus {
        self.entries.get(object_id).map(|(s, _)| *s).unwrap_or_default()
    }

    /// Drop every status whose display window has passed.
    pub fn expire(&mut self, now: Tick) {
        self.entries.retain(|_, (_, reset_at)| *reset_at > now);
    }
}
