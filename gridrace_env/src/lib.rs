//! Environment abstraction layer for gridrace.
//!
//! The race harness never talks to the clock or the OS entropy pool
//! directly; it goes through [`RaceContext`]. That keeps the rules and
//! the task plumbing identical whether a race runs in real time
//! (production [`TokioContext`]) or on a virtual clock with seeded
//! entropy (the harness's test context).
//!
//! All randomness derives from a single 64-bit seed via
//! [`RaceContext::derive_rng`]: any race outcome is reproducible from
//! its seed number, turn order permitting.

mod context;
mod tokio_impl;

pub use context::RaceContext;
pub use tokio_impl::TokioContext;
