//! Production implementation of RaceContext using Tokio.

use crate::RaceContext;
use async_trait::async_trait;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Production context: real sleeps, seeded entropy.
///
/// Time comes from the system clock; randomness is derived from the one
/// seed fixed at process start, so a rerun with the same seed draws the
/// same directions and placements (scheduling still varies).
pub struct TokioContext {
    /// Start time for monotonic duration calculations
    start: Instant,

    /// Master seed fixed at construction
    seed: u64,
}

impl TokioContext {
    /// Creates a new TokioContext with the given master seed.
    pub fn new(seed: u64) -> Self {
        Self {
            start: Instant::now(),
            seed,
        }
    }

    /// Creates an Arc-wrapped context for sharing across tasks.
    pub fn shared(seed: u64) -> Arc<Self> {
        Arc::new(Self::new(seed))
    }
}

#[async_trait]
impl RaceContext for TokioContext {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    fn derive_rng(&self, stream: u64) -> ChaCha8Rng {
        let combined = self.seed.wrapping_mul(0x517cc1b727220a95) ^ stream;
        ChaCha8Rng::seed_from_u64(combined)
    }

    fn seed(&self) -> u64 {
        self.seed
    }
}
