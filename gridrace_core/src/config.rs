//! Race configuration.

use crate::error::RaceError;
use crate::racer::{RacerId, RACER_COUNT};
use std::time::Duration;

/// Configuration for one race.
#[derive(Debug, Clone)]
pub struct RaceConfig {
    /// Board edge length; the board is `size * size` cells.
    pub size: usize,

    /// Carrots placed at start; deliveries needed to win.
    pub carrots_required: u32,

    /// Predator turns between mountain relocations.
    pub warp_period: u32,

    /// Hard cap on total arbitrated turns.
    pub max_steps: u64,

    /// Think time each racer sleeps between proposals, outside any
    /// shared state.
    pub think_time: Duration,

    /// Roster symbols, one per racer.
    pub symbols: [char; RACER_COUNT],

    /// Roster index of the racer with the elimination + warp abilities.
    pub predator: RacerId,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            size: 5,
            carrots_required: 2,
            warp_period: 3,
            max_steps: 100,
            think_time: Duration::from_millis(200),
            symbols: ['B', 'D', 'T', 'M'],
            predator: 3,
        }
    }
}

impl RaceConfig {
    /// Checks that the fixed content fits the board.
    ///
    /// Demands one spare empty cell beyond the mountain, the carrots and
    /// the racers so that relocation always has a landing cell.
    pub fn validate(&self) -> Result<(), RaceError> {
        if self.size == 0 {
            return Err(RaceError::InvalidConfig("board size must be positive".into()));
        }
        if self.max_steps == 0 {
            return Err(RaceError::InvalidConfig("step budget must be at least 1".into()));
        }
        if self.warp_period == 0 {
            return Err(RaceError::InvalidConfig("warp period must be at least 1".into()));
        }
        if self.predator >= RACER_COUNT {
            return Err(RaceError::InvalidConfig(format!(
                "predator index {} out of roster",
                self.predator
            )));
        }
        for (i, a) in self.symbols.iter().enumerate() {
            if self.symbols[i + 1..].contains(a) {
                return Err(RaceError::InvalidConfig(format!(
                    "duplicate roster symbol '{}'",
                    a
                )));
            }
        }
        let occupied = 1 + self.carrots_required as usize + RACER_COUNT;
        if self.size * self.size < occupied + 1 {
            return Err(RaceError::InvalidConfig(format!(
                "{}x{} board cannot hold {} pieces plus a spare cell",
                self.size, self.size, occupied
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(RaceConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_board_too_small() {
        let config = RaceConfig {
            size: 2,
            ..Default::default()
        };
        // 4 cells cannot hold mountain + 2 carrots + 4 racers
        assert!(matches!(
            config.validate(),
            Err(RaceError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_duplicate_symbols() {
        let config = RaceConfig {
            symbols: ['B', 'D', 'B', 'M'],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(RaceError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_zero_step_budget() {
        let config = RaceConfig {
            max_steps: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(RaceError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_predator_outside_roster() {
        let config = RaceConfig {
            predator: RACER_COUNT,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(RaceError::InvalidConfig(_))
        ));
    }
}
