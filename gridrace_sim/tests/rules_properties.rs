//! Property tests for the rule invariants.
//!
//! The resolver is pure and synchronous, so these drive it directly with
//! arbitrary seeds and turn orders - every interleaving the arbiter
//! could produce is some sequential order like these.

use gridrace_core::{Direction, RaceConfig, RaceState, RACER_COUNT};
use proptest::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

proptest! {
    #[test]
    fn invariants_hold_under_arbitrary_turn_orders(
        seed in any::<u64>(),
        turns in 1usize..300,
    ) {
        let config = RaceConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut state = RaceState::new(&config, &mut rng).unwrap();
        prop_assert!(state.check_consistency().is_ok());

        let mut last_delivered = 0u32;
        for _ in 0..turns {
            if state.game_over() {
                break;
            }
            let id = rng.gen_range(0..RACER_COUNT);
            if !state.racer(id).alive {
                continue;
            }
            let direction = Direction::random(&mut rng);
            state.resolve_move(id, direction).unwrap();

            prop_assert!(state.check_consistency().is_ok());
            prop_assert!(state.carrots_delivered() >= last_delivered);
            prop_assert!(state.carrots_delivered() <= config.carrots_required);
            last_delivered = state.carrots_delivered();
        }
    }

    #[test]
    fn relocation_preserves_consistency(seed in any::<u64>()) {
        let config = RaceConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut state = RaceState::new(&config, &mut rng).unwrap();

        for _ in 0..50 {
            if state.game_over() {
                break;
            }
            let id = rng.gen_range(0..RACER_COUNT);
            if state.racer(id).alive {
                state.resolve_move(id, Direction::random(&mut rng)).unwrap();
            }
            if state.tick_predator_cycle() {
                state.relocate_mountain(&mut rng).unwrap();
            }
            prop_assert!(state.check_consistency().is_ok());
        }
    }

    #[test]
    fn eliminations_never_revive(seed in any::<u64>()) {
        let config = RaceConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut state = RaceState::new(&config, &mut rng).unwrap();

        let mut dead: Vec<char> = Vec::new();
        for _ in 0..200 {
            if state.game_over() {
                break;
            }
            let id = rng.gen_range(0..RACER_COUNT);
            if !state.racer(id).alive {
                continue;
            }
            state.resolve_move(id, Direction::random(&mut rng)).unwrap();

            for symbol in &dead {
                let revived = state
                    .racers()
                    .iter()
                    .any(|r| r.alive && r.symbol == *symbol);
                prop_assert!(!revived, "racer {} came back to life", symbol);
            }
            dead = state
                .racers()
                .iter()
                .filter(|r| !r.alive)
                .map(|r| r.symbol)
                .collect();
        }
    }
}
