//! Move resolution - the interaction rules applied to one arbitrated turn.
//!
//! A turn never fails for rule reasons: out-of-bounds steps, mountain
//! entry without cargo and occupied cells all resolve to "stay in place".
//! Errors out of here mean a broken invariant, not a bad move.

use crate::error::RaceError;
use crate::grid::{Cell, Direction, Position};
use crate::racer::{RacerId, RACER_COUNT};
use crate::state::RaceState;

/// Why a move resolved to "stay in place".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    /// The step would leave the board.
    OffBoard,

    /// The candidate cell holds the mountain and the mover has no carrot.
    MountainWithoutCarrot,

    /// The candidate cell holds another racer and the mover cannot
    /// eliminate it.
    Occupied,
}

/// Everything that happened during one resolved turn.
///
/// The harness logs from this; the resolver itself stays silent.
#[derive(Debug, Clone)]
pub struct MoveReport {
    /// Who moved.
    pub racer: RacerId,

    /// The mover's board symbol.
    pub symbol: char,

    /// The direction that was drawn for this turn.
    pub direction: Direction,

    /// Position before the turn.
    pub from: Position,

    /// Position after the turn. Equals `from` for a blocked move.
    pub to: Position,

    /// Set when the stay-in-place policy applied.
    pub blocked: Option<BlockReason>,

    /// A carrot was picked up from the candidate cell.
    pub picked_carrot: bool,

    /// A carrot was delivered to the mountain.
    pub delivered_carrot: bool,

    /// A victim's carrot transferred to the mover.
    pub stole_carrot: bool,

    /// Racers eliminated this turn, with the cell it happened on.
    pub victims: Vec<(char, Position)>,

    /// This delivery reached the required count and ended the race.
    pub won: bool,
}

impl RaceState {
    /// Resolves one turn for a live racer.
    ///
    /// Callers serialize invocations; the whole rule pipeline runs
    /// against a board no other racer can touch mid-turn. Rule order:
    /// candidate computation, predator eliminations, cell interaction
    /// (block / pickup / deposit), commit.
    pub fn resolve_move(
        &mut self,
        id: RacerId,
        direction: Direction,
    ) -> Result<MoveReport, RaceError> {
        if self.game_over {
            return Err(RaceError::InvariantViolation(
                "turn resolved after game over".into(),
            ));
        }
        if !self.racers[id].alive {
            return Err(RaceError::InvariantViolation(format!(
                "turn resolved for eliminated racer '{}'",
                self.racers[id].symbol
            )));
        }

        let symbol = self.racers[id].symbol;
        let predator = self.racers[id].predator;
        let from = self.racers[id].position;

        let mut report = MoveReport {
            racer: id,
            symbol,
            direction,
            from,
            to: from,
            blocked: None,
            picked_carrot: false,
            delivered_carrot: false,
            stole_carrot: false,
            victims: Vec::new(),
            won: false,
        };

        let mut dest = from;
        match from.step(direction).filter(|p| self.grid.in_bounds(*p)) {
            Some(p) => dest = p,
            None => report.blocked = Some(BlockReason::OffBoard),
        }

        if report.blocked.is_none() {
            // Predator clears every alive occupant of the candidate cell
            // before the cell itself is examined. Victim order carries no
            // weight: each is eliminated independently.
            if predator {
                for vid in 0..RACER_COUNT {
                    if vid == id || !self.racers[vid].alive || self.racers[vid].position != dest
                    {
                        continue;
                    }
                    if self.racers[vid].carrying {
                        self.racers[vid].set_carrying(false);
                        self.racers[id].set_carrying(true);
                        report.stole_carrot = true;
                    }
                    self.racers[vid].mark_eliminated();
                    self.grid.set_cell(dest, self.underlying_cell(dest))?;
                    report.victims.push((self.racers[vid].symbol, dest));
                }
            }

            match self.grid.cell_at(dest)? {
                Cell::Mountain if !self.racers[id].carrying => {
                    report.blocked = Some(BlockReason::MountainWithoutCarrot);
                    dest = from;
                }
                Cell::Racer(_) => {
                    // Only reachable for a non-predator: the predator just
                    // cleared every alive occupant.
                    report.blocked = Some(BlockReason::Occupied);
                    dest = from;
                }
                Cell::Carrot if !self.racers[id].carrying => {
                    self.racers[id].set_carrying(true);
                    self.grid.set_cell(dest, Cell::Empty)?;
                    report.picked_carrot = true;
                }
                Cell::Mountain => {
                    self.carrots_delivered += 1;
                    self.racers[id].set_carrying(false);
                    report.delivered_carrot = true;
                    if self.carrots_delivered >= self.config.carrots_required {
                        self.game_over = true;
                        self.winner = Some(id);
                        report.won = true;
                    }
                }
                // A carried-over carrot is trampled by the commit below;
                // an empty cell needs nothing.
                Cell::Carrot | Cell::Empty => {}
            }
        }

        report.to = dest;
        if dest != from {
            match self.grid.cell_at(from)? {
                Cell::Racer(s) if s == symbol => {
                    self.grid.set_cell(from, self.underlying_cell(from))?;
                }
                other => {
                    return Err(RaceError::InvariantViolation(format!(
                        "mover '{}' expected its own mark at {}, found {:?}",
                        symbol, from, other
                    )));
                }
            }
            self.grid.set_cell(dest, Cell::Racer(symbol))?;
            self.racers[id].position = dest;
        }

        Ok(report)
    }
}
