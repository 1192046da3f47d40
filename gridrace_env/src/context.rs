//! Core environment context trait for race tasks.

use async_trait::async_trait;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

/// The central interface for environment interaction.
///
/// Race tasks use this for everything non-deterministic: think-time
/// sleeps, elapsed-time measurement and entropy. Implementations decide
/// whether those are real (production) or virtual (tests).
///
/// # Implementations
///
/// - **Production**: [`crate::TokioContext`] - wraps `tokio::time`, seeded once
///   at process start.
/// - **Simulation**: the harness's `SimContext` - virtual clock, the
///   sleep only yields to the scheduler.
#[async_trait]
pub trait RaceContext: Send + Sync + 'static {
    /// Monotonic time since context creation.
    fn now(&self) -> Duration;

    /// Suspends the calling task for the given duration.
    ///
    /// Racer loops call this for their think time, always outside any
    /// shared state. In simulation it advances a virtual clock instead
    /// of blocking.
    async fn sleep(&self, duration: Duration);

    /// Derives an independent RNG stream from the context's seed.
    ///
    /// Distinct `stream` values yield independent generators, so the
    /// placement draws and the direction draws cannot perturb each
    /// other across configuration changes.
    fn derive_rng(&self, stream: u64) -> ChaCha8Rng;

    /// The master seed this context was built from.
    fn seed(&self) -> u64;
}
