use std::path::PathBuf;

use chrono::{DateTime, Utc};
use oxidrive_evaluator::{
    episode::{EpisodeLimits, NoopObserver},
    report::{EpisodeReport, Generation},
};
use serde::Serialize;

use crate::{
    simulation::{PolicyKind, SimulationArg},
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct RunArg {
    #[clap(flatten)]
    simulation: SimulationArg,
    /// Number of generations to run
    #[arg(long, default_value_t = 10)]
    generations: u64,
    /// Tick limit per episode (0 for no limit)
    #[arg(long, default_value_t = 5000)]
    max_ticks: u64,
    /// Output file path for the JSON run report (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
struct RunReport {
    started_at: DateTime<Utc>,
    track: String,
    policy: PolicyKind,
    population: usize,
    seed: u64,
    max_ticks: Option<u64>,
    episodes: Vec<EpisodeReport>,
}

pub(crate) fn run(arg: &RunArg) -> anyhow::Result<()> {
    let RunArg {
        simulation,
        generations,
        max_ticks,
        output,
    } = arg;

    util::init_tracing();
    let simulation = simulation.load()?;
    let limits = EpisodeLimits {
        max_ticks: (*max_ticks > 0).then_some(*max_ticks),
    };

    let mut report = RunReport {
        started_at: Utc::now(),
        track: simulation.track.clone(),
        policy: simulation.policy,
        population: simulation.population,
        seed: simulation.seed,
        max_ticks: limits.max_ticks,
        episodes: vec![],
    };

    let mut generation = Generation::FIRST;
    for _ in 0..*generations {
        let mut episode = simulation.episode(generation, limits);
        let outcome = episode.run(&mut NoopObserver);
        let episode_report = EpisodeReport::from_episode(generation, &outcome, &episode);

        eprintln!("Generation #{generation}:");
        eprintln!("  Ticks:    {} ({})", outcome.ticks, outcome.end);
        if outcome.policy_failures > 0 {
            eprintln!("  Policy failures: {}", outcome.policy_failures);
        }
        if let Some(stats) = &episode_report.stats {
            eprintln!("  Fitness Stats:");
            eprintln!("    Min:    {:.3}", stats.min);
            eprintln!("    Max:    {:.3}", stats.max);
            eprintln!("    Mean:   {:.3}", stats.mean);
            eprintln!("    Median: {:.3}", stats.median);
            eprintln!("    Stddev: {:.3}", stats.std_dev);
        }
        if let Some(best) = episode_report.best_agent() {
            let agent = &episode_report.agents[best];
            eprintln!(
                "  Best: #{best} survived {} ticks, traveled {:.1}",
                agent.ticks_survived, agent.distance_traveled
            );
        }

        report.episodes.push(episode_report);
        generation = generation.next();
    }

    Output::save_json(&report, output.as_deref())?;

    eprintln!();
    eprintln!("Run completed");
    if let Some(path) = output {
        eprintln!("  Report: {}", path.display());
    }
    eprintln!("  Track: {}", report.track);
    eprintln!("  Seed: {}", report.seed);
    eprintln!("  Generations: {}", report.episodes.len());

    Ok(())
}
