//! CLI entrypoint for the parallel rollout runner, grounded in the
//! teacher's `bin/sim.rs`: a `clap::Parser` args struct layered over
//! `GameConfig`, with a terminal summary reduced to the 1v1 variant (player
//! 0 / player 1, no per-color breakdown).

use catan_duel::game::state::GameConfig;
use catan_duel::policy::{Policy, RandomPolicy};
use catan_duel::rollout::{RolloutConfig, run_rollout};
use clap::Parser;

#[derive(Debug, Parser, Clone)]
#[command(name = "rollout")]
#[command(about = "Self-play rollout runner for the 1v1 Catan engine")]
struct Args {
    /// Total number of episodes to simulate.
    #[arg(short = 'n', long, default_value_t = 100)]
    episodes: u64,

    /// Number of worker threads.
    #[arg(long, default_value_t = 1)]
    workers: usize,

    /// Step cap per episode, to bound non-terminating policies.
    #[arg(long, default_value_t = 2000)]
    max_steps: u32,

    /// Base seed; worker k is assigned a contiguous range starting here.
    #[arg(long, default_value_t = 0)]
    base_seed: u64,

    /// Silence per-episode console output.
    #[arg(long)]
    quiet: bool,
}

fn main() {
    let args = Args::parse();

    let rollout_config = RolloutConfig {
        base_config: GameConfig::default(),
        total_episodes: args.episodes,
        num_workers: args.workers.max(1),
        max_steps_per_episode: args.max_steps,
        base_seed: args.base_seed,
    };

    let summary = run_rollout(rollout_config, |worker_id| -> Box<dyn Policy + Send> {
        Box::new(RandomPolicy::new(worker_id as u64))
    });

    if !args.quiet {
        for worker in &summary.worker_summaries {
            println!(
                "worker {:>2}: episodes={:<4} steps={:<6} duration={:?}",
                worker.worker_id,
                worker.episode_count(),
                worker.step_count(),
                worker.duration
            );
        }
    }

    let wins_p0 = summary.wins(0);
    let wins_p1 = summary.wins(1);
    let undecided = summary.total_episodes() - wins_p0 - wins_p1;

    println!("{}", "=".repeat(60));
    println!("ROLLOUT SUMMARY");
    println!("{}", "=".repeat(60));
    println!("Total workers:  {}", summary.total_workers());
    println!("Total episodes: {}", summary.total_episodes());
    println!("Total steps:    {}", summary.total_steps());
    println!(
        "Player 0 wins:  {} ({:.1}%)",
        wins_p0,
        100.0 * wins_p0 as f64 / summary.total_episodes().max(1) as f64
    );
    println!(
        "Player 1 wins:  {} ({:.1}%)",
        wins_p1,
        100.0 * wins_p1 as f64 / summary.total_episodes().max(1) as f64
    );
    println!("Undecided:      {}", undecided);
    println!("Duration:       {:?}", summary.duration);
}
