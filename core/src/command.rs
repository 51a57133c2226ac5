use serde::{Deserialize, Serialize};

/// All player-issued commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum PlayerCommand {
    // ── Clock control ─────────────────────────────
    Pause,
    Resume,

    // ── Gameplay ──────────────────────────────────
    /// Walk to a tile; if an object sits there, use it on arrival.
    MoveTo { x: i32, y: i32 },
    /// Use an object right away, without walking.
    UseObject { object_id: String },
    CallVisitor,
    PlayMusic,

    // ── View (no gameplay effect) ─────────────────
    SetZoom { zoom: f64 },
    ZoomIn,
    ZoomOut,
    Pan { dx: f64, dy: f64 },
}

impl PlayerCommand {
    /// Commands that only touch the view never reach the simulation.
    pub fn is_view_only(&self) -> bool {
        matches!(self, Self::SetZoom { .. } | Self::ZoomIn | Self::ZoomOut | Self::Pan { .. })
    }
}
