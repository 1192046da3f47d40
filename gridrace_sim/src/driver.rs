//! The arbiter and the racer tasks - the serialization core.
//!
//! Every racer runs its own task: sleep the think time, propose a move,
//! await the verdict. The arbiter is the sole owner of [`RaceState`] and
//! applies proposals strictly one at a time, which makes the
//! one-mutator-at-a-time invariant structural - there is no lock to
//! misuse and no board access outside the arbiter.
//!
//! The total order of board mutations is exactly the arbiter's dequeue
//! order. It varies run to run; the rules do not care.

use gridrace_core::{
    Direction, MoveReport, RaceConfig, RaceError, RaceState, RacerId, RACER_COUNT,
};
use gridrace_env::RaceContext;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::render;

/// RNG stream for setup placement draws.
const SETUP_STREAM: u64 = 0;

/// RNG stream for per-turn direction and relocation draws.
const TURN_STREAM: u64 = 1;

/// Why a racer task was told to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The racer was eliminated by the predator.
    Eliminated,

    /// The race has ended.
    RaceOver,

    /// The global step budget ran out.
    StepBudget,
}

/// The arbiter's answer to one move proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnVerdict {
    /// Keep racing.
    Continue,

    /// Terminate the racer loop.
    Stop(StopReason),
}

/// One racer's request for an arbitrated turn.
struct MoveProposal {
    racer: RacerId,
    reply: oneshot::Sender<TurnVerdict>,
}

/// Final outcome of a race.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceReport {
    /// Winning symbol, if any racer was left to win.
    pub winner: Option<char>,

    /// Arbitrated turns consumed.
    pub steps: u64,

    /// Carrots delivered to the mountain.
    pub carrots_delivered: u32,

    /// Symbols still alive at the end.
    pub survivors: Vec<char>,

    /// Symbols eliminated during the race.
    pub eliminated: Vec<char>,

    /// Seed the race was derived from.
    pub seed: u64,
}

/// Runs one complete race: setup, four racer tasks, the arbiter, join.
pub async fn run_race<C: RaceContext>(
    config: RaceConfig,
    ctx: Arc<C>,
) -> Result<RaceReport, RaceError> {
    let mut setup_rng = ctx.derive_rng(SETUP_STREAM);
    let state = RaceState::new(&config, &mut setup_rng)?;
    info!(
        seed = ctx.seed(),
        "initial board\n{}",
        render::format_board(&state.snapshot())
    );

    let (proposal_tx, proposal_rx) = mpsc::channel::<MoveProposal>(RACER_COUNT);
    let turn_rng = ctx.derive_rng(TURN_STREAM);
    let arbiter = tokio::spawn(arbiter_loop(state, config.clone(), proposal_rx, turn_rng));

    let mut racers = Vec::with_capacity(RACER_COUNT);
    for id in 0..RACER_COUNT {
        racers.push(tokio::spawn(racer_loop(
            id,
            config.think_time,
            proposal_tx.clone(),
            ctx.clone(),
        )));
    }
    // The arbiter must see the channel close once the racers are done.
    drop(proposal_tx);

    for handle in racers {
        if let Err(e) = handle.await {
            warn!("racer task failed to join: {e}");
        }
    }

    let state = arbiter
        .await
        .map_err(|e| RaceError::InvariantViolation(format!("arbiter task panicked: {e}")))??;

    info!(
        "final board\n{}",
        render::format_board(&state.snapshot())
    );

    Ok(RaceReport {
        winner: state.winner().map(|id| state.racer(id).symbol),
        steps: state.steps(),
        carrots_delivered: state.carrots_delivered(),
        survivors: state
            .racers()
            .iter()
            .filter(|r| r.alive)
            .map(|r| r.symbol)
            .collect(),
        eliminated: state
            .racers()
            .iter()
            .filter(|r| !r.alive)
            .map(|r| r.symbol)
            .collect(),
        seed: ctx.seed(),
    })
}

/// One racer's loop: think, propose, obey the verdict.
async fn racer_loop<C: RaceContext>(
    id: RacerId,
    think_time: Duration,
    proposals: mpsc::Sender<MoveProposal>,
    ctx: Arc<C>,
) -> StopReason {
    loop {
        // Think time burns outside any shared state.
        ctx.sleep(think_time).await;

        let (reply_tx, reply_rx) = oneshot::channel();
        let proposal = MoveProposal {
            racer: id,
            reply: reply_tx,
        };
        if proposals.send(proposal).await.is_err() {
            // Arbiter is gone; the race ended without us.
            return StopReason::RaceOver;
        }
        match reply_rx.await {
            Ok(TurnVerdict::Continue) => {}
            Ok(TurnVerdict::Stop(reason)) => return reason,
            Err(_) => return StopReason::RaceOver,
        }
    }
}

/// Applies proposals one at a time against the solely-owned state.
async fn arbiter_loop(
    mut state: RaceState,
    config: RaceConfig,
    mut proposals: mpsc::Receiver<MoveProposal>,
    mut rng: ChaCha8Rng,
) -> Result<RaceState, RaceError> {
    while let Some(proposal) = proposals.recv().await {
        let id = proposal.racer;

        // Double-check at dequeue time: elimination and game over may
        // both have happened while this proposal sat in the queue.
        if !state.racer(id).alive {
            let _ = proposal
                .reply
                .send(TurnVerdict::Stop(StopReason::Eliminated));
            continue;
        }
        if state.game_over() {
            let _ = proposal.reply.send(TurnVerdict::Stop(StopReason::RaceOver));
            continue;
        }

        let step = state.begin_step();
        if step >= config.max_steps {
            if let Some(winner) = state.declare_fallback_winner() {
                info!(
                    "step budget exhausted - {} wins by roster order",
                    state.racer(winner).symbol
                );
            }
            let _ = proposal
                .reply
                .send(TurnVerdict::Stop(StopReason::StepBudget));
            continue;
        }

        let direction = Direction::random(&mut rng);
        let report = state.resolve_move(id, direction)?;
        log_move(&report);

        // The warp is keyed to the predator's own completed turns.
        if state.racer(id).predator && !state.game_over() && state.tick_predator_cycle() {
            let target = state.relocate_mountain(&mut rng)?;
            info!("{} warped the mountain to {}", report.symbol, target);
        }

        debug!(
            "board after {}'s turn\n{}",
            report.symbol,
            render::format_board(&state.snapshot())
        );
        state.check_consistency()?;

        let verdict = if state.game_over() {
            TurnVerdict::Stop(StopReason::RaceOver)
        } else {
            TurnVerdict::Continue
        };
        let _ = proposal.reply.send(verdict);
    }

    Ok(state)
}

fn log_move(report: &MoveReport) {
    for (victim, pos) in &report.victims {
        info!("{} eliminated {} at {}", report.symbol, victim, pos);
    }
    if report.stole_carrot {
        info!("{} stole a carrot", report.symbol);
    }
    if report.picked_carrot {
        info!("{} picked up a carrot at {}", report.symbol, report.to);
    }
    if report.delivered_carrot {
        info!("{} placed a carrot on the mountain", report.symbol);
    }
    if report.won {
        info!("{} wins the race!", report.symbol);
    }
    match report.blocked {
        Some(reason) => debug!("{} blocked: {:?}", report.symbol, reason),
        None => debug!(
            "{} moved {:?} from {} to {}",
            report.symbol, report.direction, report.from, report.to
        ),
    }
}
