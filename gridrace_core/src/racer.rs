//! Per-racer mutable state.
//!
//! A racer has no thread of control of its own in this crate; its record
//! is mutated only by the move resolver, one turn at a time.

use crate::grid::Position;
use serde::{Deserialize, Serialize};

/// Index of a racer in the roster. Stable for the whole race.
pub type RacerId = usize;

/// Number of racers in every race. Fixed at compile time.
pub const RACER_COUNT: usize = 4;

/// One racer's record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Racer {
    /// Unique board symbol.
    pub symbol: char,

    /// Current board position.
    pub position: Position,

    /// True while the racer holds a carrot.
    pub carrying: bool,

    /// Flips false exactly once, on elimination. Never reverts.
    pub alive: bool,

    /// Roster index.
    pub id: RacerId,

    /// True for the one racer with the elimination and warp abilities.
    pub predator: bool,
}

impl Racer {
    /// Creates a racer at a caller-supplied position, alive and
    /// empty-handed.
    pub fn new(id: RacerId, symbol: char, position: Position, predator: bool) -> Self {
        Self {
            symbol,
            position,
            carrying: false,
            alive: true,
            id,
            predator,
        }
    }

    /// Marks the racer eliminated. Idempotent.
    pub fn mark_eliminated(&mut self) {
        self.alive = false;
    }

    /// Sets the carrying flag.
    pub fn set_carrying(&mut self, carrying: bool) {
        self.carrying = carrying;
    }
}
