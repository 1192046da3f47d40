//! gridrace simulation harness.
//!
//! Runs the concurrent race: one tokio task per racer plus a single
//! arbiter task that owns the whole board.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    run_race                         │
//! │  ┌─────────┐  ┌─────────┐  ┌─────────┐  ┌─────────┐ │
//! │  │ racer B │  │ racer D │  │ racer T │  │ racer M │ │
//! │  └────┬────┘  └────┬────┘  └────┬────┘  └────┬────┘ │
//! │       │ proposal   │            │            │      │
//! │       ▼ (mpsc)     ▼            ▼            ▼      │
//! │  ┌──────────────────────────────────────────────┐   │
//! │  │       arbiter (sole owner of RaceState)      │   │
//! │  │  double-check → step budget → resolve → warp │   │
//! │  └──────────────────────────────────────────────┘   │
//! │       │ verdict (oneshot) back to each racer        │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! Racer tasks sleep their think time outside any shared state, then
//! contend on the proposal channel. Serialization of board mutation is
//! structural: only the arbiter can touch the state at all.

mod context;
mod driver;
mod render;

pub use context::SimContext;
pub use driver::{run_race, RaceReport, StopReason, TurnVerdict};
pub use render::format_board;
