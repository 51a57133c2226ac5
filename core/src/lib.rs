//! Refugio simulation core: a single pet on a tile grid, driven by a
//! frame clock for continuous drift and a tick clock for turn rules.

pub mod clock;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod grid;
pub mod inactivity;
pub mod interaction;
pub mod movement_subsystem;
pub mod needs_subsystem;
pub mod pathfinding;
pub mod rng;
pub mod snapshot;
pub mod status;
pub mod subject;
pub mod subsystem;
pub mod types;
pub mod visitor_subsystem;
