//! Shortest walking routes on the grid.
//!
//! Breadth-first search over orthogonal steps. Obstacles are not
//! modelled: every in-bounds tile is passable.

use crate::{
    grid::{Grid, ORTHOGONAL},
    types::Tile,
};
use std::collections::{HashMap, VecDeque};

/// Route from `from` to `to`, excluding the start tile and ending on the
/// goal. Empty when the endpoints coincide or either lies off the grid.
pub fn shortest_path(grid: &Grid, from: Tile, to: Tile) -> Vec<Tile> {
    if from == to || !grid.in_bounds(from) || !grid.in_bounds(to) {
        return Vec::new();
    }

    let mut came_from: HashMap<Tile, Tile> = HashMap::new();
    let mut queue: VecDeque<Tile> = VecDeque::new();
    came_from.insert(from, from);
    queue.push_back(from);

    while let Some(current) = queue.pop_front() {
        if current == to {
            break;
        }
        for next in grid.neighbors(current, &ORTHOGONAL) {
            if let std::collections::hash_map::Entry::Vacant(slot) = came_from.entry(next) {
                slot.insert(current);
                queue.push_back(next);
            }
        }
    }

    // Walk the parent links back from the goal.
    let mut path = Vec::new();
    let mut cursor = to;
    while cursor != from {
        path.push(cursor);
        match came_from.get(&cursor) {
            Some(&prev) => cursor = prev,
            None => return Vec::new(),
        }
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;

    fn grid() -> Grid {
        Grid::from_config(&SimConfig::default_test())
    }

    #[test]
    fn identical_endpoints_give_empty_path() {
        let g = grid();
        assert!(shortest_path(&g, Tile::new(3, 3), Tile::new(3, 3)).is_empty());
    }

    #[test]
    fn path_is_minimal_and_orthogonally_connected() {
        let g = grid();
        for &(from, to) in &[
            (Tile::new(0, 0), Tile::new(9, 9)),
            (Tile::new(5, 2), Tile::new(1, 8)),
            (Tile::new(9, 0), Tile::new(0, 0)),
            (Tile::new(4, 4), Tile::new(4, 5)),
        ] {
            let path = shortest_path(&g, from, to);
            assert_eq!(path.len() as u32, from.manhattan(to), "{from} -> {to} not minimal");
            assert_eq!(path.last().copied(), Some(to));
            let mut prev = from;
            for step in &path {
                assert!(prev.is_adjacent(*step), "{prev} -> {step} is not an orthogonal step");
                prev = *step;
            }
        }
    }

    #[test]
    fn out_of_bounds_goal_has_no_path() {
        let g = grid();
        assert!(shortest_path(&g, Tile::new(0, 0), Tile::new(10, 0)).is_empty());
        assert!(shortest_path(&g, Tile::new(0, 0), Tile::new(-1, 3)).is_empty());
    }
}
