//! gridrace CLI
//!
//! Run a concurrent shared-board race and report the outcome.

use clap::Parser;
use gridrace_core::RaceConfig;
use gridrace_env::{RaceContext, TokioContext};
use gridrace_sim::run_race;
use std::time::Duration;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Concurrent shared-board race simulator
#[derive(Parser, Debug)]
#[command(name = "gridrace-sim")]
#[command(about = "Run a concurrent race on a shared grid", long_about = None)]
struct Args {
    /// Master seed for placement and direction draws (0 = from system time)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Board edge length
    #[arg(long, default_value = "5")]
    size: usize,

    /// Carrots to place, and deliveries needed to win
    #[arg(short, long, default_value = "2")]
    carrots: u32,

    /// Hard cap on total arbitrated turns
    #[arg(long, default_value = "100")]
    max_steps: u64,

    /// Racer think time between proposals, in milliseconds
    #[arg(long, default_value = "200")]
    think_ms: u64,

    /// Predator turns between mountain relocations
    #[arg(long, default_value = "3")]
    warp_period: u32,

    /// Verbose output (per-turn board dumps)
    #[arg(short, long)]
    verbose: bool,

    /// JSON report for CI parsing
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    let seed = if args.seed == 0 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos() as u64
    } else {
        args.seed
    };

    let config = RaceConfig {
        size: args.size,
        carrots_required: args.carrots,
        max_steps: args.max_steps,
        think_time: Duration::from_millis(args.think_ms),
        warp_period: args.warp_period,
        ..RaceConfig::default()
    };

    let ctx = TokioContext::shared(seed);
    let started = ctx.now();

    match run_race(config, ctx.clone()).await {
        Ok(report) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report).unwrap());
            } else {
                match report.winner {
                    Some(symbol) => info!(
                        "{} won after {} steps ({} carrots delivered)",
                        symbol, report.steps, report.carrots_delivered
                    ),
                    None => info!("race ended after {} steps with no winner", report.steps),
                }
                info!(
                    "race finished in {:?} (seed={})",
                    ctx.now() - started,
                    seed
                );
            }
        }
        Err(e) => {
            error!("race aborted: {e}");
            std::process::exit(1);
        }
    }
}
