//! Static spatial index: which zone and which object sit on a tile.

use crate::{
    config::{ObjectConfig, SimConfig, ZoneConfig},
    types::Tile,
};
use std::collections::HashMap;

/// Tiles outside every configured zone belong to the street.
pub const STREET_ZONE_ID: &str = "calle";

/// Orthogonal steps, the only moves the pathfinder takes.
pub const ORTHOGONAL: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Idle random-walk directions: the four orthogonal steps plus two diagonals.
pub const WALK_DIRECTIONS: [(i32, i32); 6] = [(1, 0), (-1, 0), (0, 1), (0, -1), (1, -1), (-1, 1)];

#[derive(Debug, Clone)]
pub struct Grid {
    pub width:  i32,
    pub height: i32,
    zones:      Vec<ZoneConfig>,
    street:     ZoneConfig,
    objects:    Vec<ObjectConfig>,
    by_tile:    HashMap<Tile, usize>,
}

impl Grid {
    pub fn from_config(config: &SimConfig) -> Self {
        let by_tile = config
            .objects
            .iter()
            .enumerate()
            .map(|(i, o)| (o.pos, i))
            .collect();
        Self {
            width:   config.grid_width,
            height:  config.grid_height,
            zones:   config.zones.clone(),
            street:  ZoneConfig {
                id:      STREET_ZONE_ID.into(),
                name:    "Street".into(),
                icon:    String::new(),
                from_x:  0,
                to_x:    config.grid_width - 1,
                from_y:  0,
                to_y:    config.grid_height - 1,
                outdoor: true,
            },
            objects: config.objects.clone(),
            by_tile,
        }
    }

    pub fn in_bounds(&self, tile: Tile) -> bool {
        tile.x >= 0 && tile.y >= 0 && tile.x < self.width && tile.y < self.height
    }

    /// First configured zone containing `tile`, else the street.
    pub fn zone_at(&self, tile: Tile) -> &ZoneConfig {
        self.zones.iter().find(|z| z.contains(tile)).unwrap_or(&self.street)
    }

    pub fn object_at(&self, tile: Tile) -> Option<&ObjectConfig> {
        self.by_tile.get(&tile).and_then(|&i| self.objects.get(i))
    }

    pub fn object(&self, id: &str) -> Option<&ObjectConfig> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn objects(&self) -> &[ObjectConfig] {
        &self.objects
    }

    /// In-bounds tiles reachable from `tile` with the given offsets.
    pub fn neighbors(&self, tile: Tile, offsets: &[(i32, i32)]) -> Vec<Tile> {
        offsets
            .iter()
            .map(|&(dx, dy)| tile.offset(dx, dy))
            .filter(|t| self.in_bounds(*t))
            .collect()
    }
}
