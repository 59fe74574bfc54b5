use oxidrive_evaluator::episode::EpisodeLimits;

use crate::{simulation::SimulationArg, tui::Tui};

use self::app::ViewerApp;

mod app;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ViewArg {
    #[clap(flatten)]
    simulation: SimulationArg,
    /// Simulation ticks per second at startup
    #[arg(long, default_value_t = 30.0, value_parser = parse_tick_rate)]
    tick_rate: f64,
    /// Tick limit per episode (0 for no limit)
    #[arg(long, default_value_t = 0)]
    max_ticks: u64,
}

pub(crate) fn run(arg: &ViewArg) -> anyhow::Result<()> {
    let ViewArg {
        simulation,
        tick_rate,
        max_ticks,
    } = arg;

    // No log subscriber here: output on stderr would tear the terminal UI.
    let simulation = simulation.load()?;
    let limits = EpisodeLimits {
        max_ticks: (*max_ticks > 0).then_some(*max_ticks),
    };

    let mut app = ViewerApp::new(simulation, limits, *tick_rate);
    Tui::new().run(&mut app)?;

    let summary = app.summary();
    eprintln!("Viewer closed");
    eprintln!("  Generations finished: {}", summary.finished_generations);
    if let Some(best) = summary.best_fitness {
        eprintln!("  Best fitness: {best:.3}");
    }

    Ok(())
}

fn parse_tick_rate(s: &str) -> Result<f64, String> {
    let rate: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if rate.is_finite() && rate > 0.0 {
        Ok(rate)
    } else {
        Err(format!("tick rate must be a positive finite number, got {s}"))
    }
}
