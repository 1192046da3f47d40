//! Owned simulation state and setup placement.
//!
//! `RaceState` is the one place all mutable race data lives: the board,
//! the roster, the shared counters and the termination flag. Owning them
//! in a single struct keeps the mutation path auditable: after setup,
//! exactly one task may hold `&mut RaceState` at a time.

use crate::config::RaceConfig;
use crate::error::RaceError;
use crate::grid::{Cell, Grid, Position};
use crate::racer::{Racer, RacerId, RACER_COUNT};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Per-racer slice of a [`BoardSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RacerSnapshot {
    pub symbol: char,
    pub position: Position,
    pub carrying: bool,
    pub alive: bool,
}

/// A consistent copy of everything a renderer needs, taken between turns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSnapshot {
    /// Board edge length.
    pub size: usize,

    /// Cells in row-major order.
    pub cells: Vec<Cell>,

    /// Roster state at snapshot time.
    pub racers: Vec<RacerSnapshot>,
}

/// The complete mutable state of one race.
#[derive(Debug, Clone)]
pub struct RaceState {
    pub(crate) config: RaceConfig,
    pub(crate) grid: Grid,
    pub(crate) racers: [Racer; RACER_COUNT],
    pub(crate) carrots_delivered: u32,
    pub(crate) steps: u64,
    pub(crate) predator_turns: u32,
    pub(crate) game_over: bool,
    pub(crate) winner: Option<RacerId>,
    /// Tracked explicitly so an occupant's mark can occlude the mountain
    /// without losing it.
    pub(crate) mountain: Position,
}

impl RaceState {
    /// Builds a race with random placement: mountain first, then carrots,
    /// then the roster, each on a uniformly random empty cell.
    pub fn new<R: Rng>(config: &RaceConfig, rng: &mut R) -> Result<Self, RaceError> {
        config.validate()?;

        let mut grid = Grid::new(config.size);

        let mountain = random_empty_cell(&grid, rng)?;
        grid.set_cell(mountain, Cell::Mountain)?;

        for _ in 0..config.carrots_required {
            let pos = random_empty_cell(&grid, rng)?;
            grid.set_cell(pos, Cell::Carrot)?;
        }

        let mut positions = [Position::new(0, 0); RACER_COUNT];
        for (id, slot) in positions.iter_mut().enumerate() {
            let pos = random_empty_cell(&grid, rng)?;
            grid.set_cell(pos, Cell::Racer(config.symbols[id]))?;
            *slot = pos;
        }
        let racers: [Racer; RACER_COUNT] = std::array::from_fn(|id| {
            Racer::new(id, config.symbols[id], positions[id], id == config.predator)
        });

        Ok(Self {
            config: config.clone(),
            grid,
            racers,
            carrots_delivered: 0,
            steps: 0,
            predator_turns: 0,
            game_over: false,
            winner: None,
            mountain,
        })
    }

    /// Builds a race from an explicit layout. Scenario construction for
    /// tests and demos; placement rules are the same as [`RaceState::new`]
    /// except that positions are caller-chosen.
    ///
    /// `racers` gives each roster slot its position and carrying flag.
    /// All pieces must land on distinct in-bounds cells, and the carrot
    /// accounting (`on board + carried <= carrots_required`) must hold.
    pub fn with_layout(
        config: &RaceConfig,
        mountain: Position,
        carrots: &[Position],
        racers: [(Position, bool); RACER_COUNT],
    ) -> Result<Self, RaceError> {
        config.validate()?;

        let mut grid = Grid::new(config.size);

        let mut occupied = Vec::with_capacity(1 + carrots.len() + RACER_COUNT);
        occupied.push(mountain);
        occupied.extend_from_slice(carrots);
        occupied.extend(racers.iter().map(|(pos, _)| *pos));
        for (i, pos) in occupied.iter().enumerate() {
            if !grid.in_bounds(*pos) {
                return Err(RaceError::OutOfBounds(*pos));
            }
            if occupied[i + 1..].contains(pos) {
                return Err(RaceError::InvalidConfig(format!(
                    "layout places two pieces at {}",
                    pos
                )));
            }
        }

        let carried = racers.iter().filter(|(_, carrying)| *carrying).count();
        if carrots.len() + carried > config.carrots_required as usize {
            return Err(RaceError::InvalidConfig(format!(
                "layout holds {} carrots but only {} exist",
                carrots.len() + carried,
                config.carrots_required
            )));
        }

        grid.set_cell(mountain, Cell::Mountain)?;
        for pos in carrots {
            grid.set_cell(*pos, Cell::Carrot)?;
        }

        let roster: [Racer; RACER_COUNT] = std::array::from_fn(|id| {
            let (position, carrying) = racers[id];
            let mut racer = Racer::new(id, config.symbols[id], position, id == config.predator);
            racer.set_carrying(carrying);
            racer
        });
        for racer in &roster {
            grid.set_cell(racer.position, Cell::Racer(racer.symbol))?;
        }

        Ok(Self {
            config: config.clone(),
            grid,
            racers: roster,
            carrots_delivered: 0,
            steps: 0,
            predator_turns: 0,
            game_over: false,
            winner: None,
            mountain,
        })
    }

    /// The configuration this race was built from.
    pub fn config(&self) -> &RaceConfig {
        &self.config
    }

    /// The board.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// One racer's record.
    pub fn racer(&self, id: RacerId) -> &Racer {
        &self.racers[id]
    }

    /// The whole roster.
    pub fn racers(&self) -> &[Racer] {
        &self.racers
    }

    /// Carrots delivered so far. Monotonic, bounded by the required count.
    pub fn carrots_delivered(&self) -> u32 {
        self.carrots_delivered
    }

    /// Total arbitrated turns so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Monotonic: once true, stays true.
    pub fn game_over(&self) -> bool {
        self.game_over
    }

    /// The winner, once decided.
    pub fn winner(&self) -> Option<RacerId> {
        self.winner
    }

    /// Current mountain position (its mark may be occluded by a racer).
    pub fn mountain(&self) -> Position {
        self.mountain
    }

    /// Counts a new arbitrated turn and returns the running total.
    pub fn begin_step(&mut self) -> u64 {
        self.steps += 1;
        self.steps
    }

    /// Counts a completed predator turn; true when the warp is due.
    pub fn tick_predator_cycle(&mut self) -> bool {
        self.predator_turns += 1;
        self.predator_turns % self.config.warp_period == 0
    }

    /// Step-budget fallback: the first alive racer in roster order wins.
    /// Ends the race. Returns the winner, if any racer is still alive.
    pub fn declare_fallback_winner(&mut self) -> Option<RacerId> {
        let winner = self.racers.iter().find(|r| r.alive).map(|r| r.id);
        if winner.is_some() {
            self.winner = winner;
        }
        self.game_over = true;
        winner
    }

    /// Moves the mountain to a uniformly random empty cell.
    ///
    /// If a racer's mark currently occludes the old cell the mark stays;
    /// the departing commit will restore `Empty` there since the tracked
    /// position has moved on.
    pub fn relocate_mountain<R: Rng>(&mut self, rng: &mut R) -> Result<Position, RaceError> {
        let target = random_empty_cell(&self.grid, rng)?;
        if self.grid.cell_at(self.mountain)? == Cell::Mountain {
            self.grid.set_cell(self.mountain, Cell::Empty)?;
        }
        self.grid.set_cell(target, Cell::Mountain)?;
        self.mountain = target;
        Ok(target)
    }

    /// What a cell reverts to when the racer standing on it departs.
    pub(crate) fn underlying_cell(&self, pos: Position) -> Cell {
        if pos == self.mountain {
            Cell::Mountain
        } else {
            Cell::Empty
        }
    }

    /// Takes a consistent copy for rendering or reporting.
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            size: self.grid.size(),
            cells: self.grid.cells().to_vec(),
            racers: self
                .racers
                .iter()
                .map(|r| RacerSnapshot {
                    symbol: r.symbol,
                    position: r.position,
                    carrying: r.carrying,
                    alive: r.alive,
                })
                .collect(),
        }
    }

    /// Verifies the board/roster consistency invariants.
    ///
    /// The set of racer-marked cells must equal the positions of alive
    /// racers with no duplicates; the mountain mark must sit at the
    /// tracked position unless an alive racer occludes it; the carrot
    /// accounting must never exceed the required count.
    pub fn check_consistency(&self) -> Result<(), RaceError> {
        let mut marked = 0usize;
        let mut mountains = 0usize;
        let mut carrots_on_board = 0u32;

        for pos in self.grid.positions() {
            match self.grid.cell_at(pos)? {
                Cell::Racer(symbol) => {
                    marked += 1;
                    let matches = self
                        .racers
                        .iter()
                        .any(|r| r.alive && r.position == pos && r.symbol == symbol);
                    if !matches {
                        return Err(RaceError::InvariantViolation(format!(
                            "mark '{}' at {} has no alive racer",
                            symbol, pos
                        )));
                    }
                }
                Cell::Mountain => {
                    mountains += 1;
                    if pos != self.mountain {
                        return Err(RaceError::InvariantViolation(format!(
                            "mountain mark at {} but tracked at {}",
                            pos, self.mountain
                        )));
                    }
                }
                Cell::Carrot => carrots_on_board += 1,
                Cell::Empty => {}
            }
        }

        let alive: Vec<&Racer> = self.racers.iter().filter(|r| r.alive).collect();
        if marked != alive.len() {
            return Err(RaceError::InvariantViolation(format!(
                "{} marks on board for {} alive racers",
                marked,
                alive.len()
            )));
        }
        for (i, racer) in alive.iter().enumerate() {
            if self.grid.cell_at(racer.position)? != Cell::Racer(racer.symbol) {
                return Err(RaceError::InvariantViolation(format!(
                    "racer '{}' at {} is not marked there",
                    racer.symbol, racer.position
                )));
            }
            if alive[i + 1..].iter().any(|o| o.position == racer.position) {
                return Err(RaceError::InvariantViolation(format!(
                    "two alive racers share {}",
                    racer.position
                )));
            }
        }

        if mountains > 1 {
            return Err(RaceError::InvariantViolation(
                "more than one mountain mark".into(),
            ));
        }
        let occluded = alive.iter().any(|r| r.position == self.mountain);
        if mountains == 0 && !occluded {
            return Err(RaceError::InvariantViolation(format!(
                "mountain mark missing at {}",
                self.mountain
            )));
        }

        for racer in &self.racers {
            if !racer.alive && racer.carrying {
                return Err(RaceError::InvariantViolation(format!(
                    "eliminated racer '{}' still carries a carrot",
                    racer.symbol
                )));
            }
        }
        let carried = self.racers.iter().filter(|r| r.carrying).count() as u32;
        if carrots_on_board + carried + self.carrots_delivered > self.config.carrots_required {
            return Err(RaceError::InvariantViolation(format!(
                "carrot accounting exceeds {}: {} on board, {} carried, {} delivered",
                self.config.carrots_required, carrots_on_board, carried, self.carrots_delivered
            )));
        }

        Ok(())
    }
}

/// Picks a uniformly random empty cell, or [`RaceError::NoEmptyCell`].
///
/// Collects the empties and indexes once: the draw stays uniform and
/// terminates even on a nearly full board.
fn random_empty_cell<R: Rng>(grid: &Grid, rng: &mut R) -> Result<Position, RaceError> {
    let empties: Vec<Position> = grid
        .positions()
        .filter(|p| grid.cell_at(*p).map(|c| c.is_empty()).unwrap_or(false))
        .collect();
    if empties.is_empty() {
        return Err(RaceError::NoEmptyCell);
    }
    Ok(empties[rng.gen_range(0..empties.len())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Direction;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn default_layout() -> RaceState {
        // Mountain centered, carrots in the corners away from the roster.
        RaceState::with_layout(
            &RaceConfig::default(),
            Position::new(2, 2),
            &[Position::new(0, 4), Position::new(4, 4)],
            [
                (Position::new(0, 0), false),
                (Position::new(0, 2), false),
                (Position::new(4, 0), false),
                (Position::new(4, 2), false),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_random_setup_is_consistent() {
        let config = RaceConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let state = RaceState::new(&config, &mut rng).unwrap();

        state.check_consistency().unwrap();

        let carrots = state
            .grid()
            .cells()
            .iter()
            .filter(|c| **c == Cell::Carrot)
            .count();
        assert_eq!(carrots, config.carrots_required as usize);
        assert_eq!(
            state.grid().cell_at(state.mountain()).unwrap(),
            Cell::Mountain
        );
        for racer in state.racers() {
            assert_eq!(
                state.grid().cell_at(racer.position).unwrap(),
                Cell::Racer(racer.symbol)
            );
        }
        assert!(state.racer(config.predator).predator);
        assert_eq!(state.steps(), 0);
        assert!(!state.game_over());
    }

    #[test]
    fn test_layout_rejects_overlapping_pieces() {
        let config = RaceConfig::default();
        let result = RaceState::with_layout(
            &config,
            Position::new(2, 2),
            &[Position::new(2, 2)],
            [
                (Position::new(0, 0), false),
                (Position::new(0, 1), false),
                (Position::new(0, 2), false),
                (Position::new(0, 3), false),
            ],
        );
        assert!(matches!(result, Err(RaceError::InvalidConfig(_))));
    }

    #[test]
    fn test_layout_rejects_excess_carrots() {
        let config = RaceConfig::default(); // 2 required
        let result = RaceState::with_layout(
            &config,
            Position::new(2, 2),
            &[Position::new(0, 4), Position::new(4, 4)],
            [
                (Position::new(0, 0), true), // third carrot in hand
                (Position::new(0, 2), false),
                (Position::new(4, 0), false),
                (Position::new(4, 2), false),
            ],
        );
        assert!(matches!(result, Err(RaceError::InvalidConfig(_))));
    }

    #[test]
    fn test_fallback_winner_prefers_lowest_alive_index() {
        // Racers 0 and 2 are out; the lowest alive index (1) must win.
        let mut state = default_layout();
        for id in [0usize, 2] {
            let pos = state.racers[id].position;
            state.racers[id].mark_eliminated();
            state.grid.set_cell(pos, Cell::Empty).unwrap();
        }

        let winner = state.declare_fallback_winner();
        assert_eq!(winner, Some(1));
        assert_eq!(state.winner(), Some(1));
        assert!(state.game_over());
    }

    #[test]
    fn test_relocation_lands_on_empty_cell() {
        let mut state = default_layout();
        let old = state.mountain();
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let new = state.relocate_mountain(&mut rng).unwrap();

        assert_ne!(new, old);
        assert_eq!(state.grid().cell_at(new).unwrap(), Cell::Mountain);
        assert_eq!(state.grid().cell_at(old).unwrap(), Cell::Empty);
        assert_eq!(state.mountain(), new);
        state.check_consistency().unwrap();
    }

    #[test]
    fn test_relocation_keeps_occluding_racer_mark() {
        // Racer 1 deposits and ends up standing on the mountain cell.
        let mut state = RaceState::with_layout(
            &RaceConfig::default(),
            Position::new(2, 2),
            &[Position::new(0, 4)],
            [
                (Position::new(0, 0), false),
                (Position::new(2, 1), true),
                (Position::new(4, 0), false),
                (Position::new(4, 2), false),
            ],
        )
        .unwrap();
        let report = state.resolve_move(1, Direction::Right).unwrap();
        assert!(report.delivered_carrot);
        assert_eq!(state.racer(1).position, Position::new(2, 2));

        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let new = state.relocate_mountain(&mut rng).unwrap();

        // The occupant's mark survives where the mountain used to be.
        assert_eq!(
            state.grid().cell_at(Position::new(2, 2)).unwrap(),
            Cell::Racer('D')
        );
        assert_eq!(state.grid().cell_at(new).unwrap(), Cell::Mountain);
        state.check_consistency().unwrap();
    }

    #[test]
    fn test_warp_cycle_fires_on_period_multiples() {
        let mut state = default_layout(); // warp_period = 3
        assert!(!state.tick_predator_cycle());
        assert!(!state.tick_predator_cycle());
        assert!(state.tick_predator_cycle());
        assert!(!state.tick_predator_cycle());
        assert!(!state.tick_predator_cycle());
        assert!(state.tick_predator_cycle());
    }

    #[test]
    fn test_begin_step_counts_up() {
        let mut state = default_layout();
        assert_eq!(state.begin_step(), 1);
        assert_eq!(state.begin_step(), 2);
        assert_eq!(state.steps(), 2);
    }

    #[test]
    fn test_snapshot_reflects_board_and_roster() {
        let state = default_layout();
        let snapshot = state.snapshot();
        assert_eq!(snapshot.size, 5);
        assert_eq!(snapshot.cells.len(), 25);
        assert_eq!(snapshot.racers.len(), RACER_COUNT);
        assert!(snapshot.racers.iter().all(|r| r.alive && !r.carrying));
    }
}
