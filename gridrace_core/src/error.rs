//! Fatal error taxonomy for the race core.
//!
//! In-game rule conflicts (blocked moves, blocked mountain entry) are
//! ordinary outcomes resolved by the stay-in-place policy and never appear
//! here. Everything in this enum indicates a broken invariant or a
//! configuration that cannot host the race.

use crate::grid::Position;
use thiserror::Error;

/// Errors that abort a race run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RaceError {
    /// Position outside the board. Unreachable through the checked move
    /// path; hitting it means a caller bypassed the bounds check.
    #[error("position {0} is outside the board")]
    OutOfBounds(Position),

    /// The board and the racer records disagree. Indicates a
    /// serialization bug, not a rule conflict.
    #[error("board invariant violated: {0}")]
    InvariantViolation(String),

    /// Placement or relocation found no empty cell.
    #[error("no empty cell available for placement")]
    NoEmptyCell,

    /// The configuration cannot fit the fixed content counts.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
