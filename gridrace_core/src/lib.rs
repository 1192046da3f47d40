//! Core rules for the gridrace shared-board race.
//!
//! Four racers share one mutable board, pick up carrots and deliver them
//! to a wandering mountain; one racer can eliminate the others. This
//! crate holds the pure rules: the grid, the roster, the move resolver
//! and the owned simulation state. Nothing here is async and nothing
//! here performs I/O - serialization of turns is the harness's job
//! (`gridrace_sim`), entropy comes from the environment layer
//! (`gridrace_env`).
//!
//! # Invariants
//!
//! - The set of racer-marked cells equals the positions of alive racers,
//!   with no duplicates, at every between-turns point.
//! - `carrots_delivered` only grows and never exceeds the required count;
//!   `game_over` never reverts to false.
//! - At most one mountain mark exists; its tracked position survives
//!   occlusion by a racer standing on it.

mod config;
mod error;
mod grid;
mod racer;
mod resolver;
mod state;

pub use config::RaceConfig;
pub use error::RaceError;
pub use grid::{Cell, Direction, Grid, Position};
pub use racer::{Racer, RacerId, RACER_COUNT};
pub use resolver::{BlockReason, MoveReport};
pub use state::{BoardSnapshot, RaceState, RacerSnapshot};
