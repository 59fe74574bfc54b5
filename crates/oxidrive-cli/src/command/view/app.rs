use crossterm::event::{Event, KeyCode};
use oxidrive_engine::{Agent, Vec2};
use oxidrive_evaluator::{
    episode::{Episode, EpisodeLimits},
    policy::Policy,
    report::{FitnessStats, Generation},
};
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    style::{Color, Style},
    symbols::Marker,
    text::Text,
    widgets::{
        Block,
        canvas::{Canvas, Context, Line as CanvasLine, Points},
    },
};

use crate::{
    simulation::Simulation,
    tui::{App, Tui},
};

const FRAME_RATE: f64 = 30.0;
const DEFAULT_TICK_RATE: f64 = 30.0;
const MIN_TICK_RATE: f64 = 1.0;
const MAX_TICK_RATE: f64 = 960.0;
/// Upper bound on sampled track points per axis.
const TRACK_SAMPLES: usize = 320;

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub(crate) struct ViewerSummary {
    pub finished_generations: u64,
    pub best_fitness: Option<f64>,
}

#[derive(Debug, Clone, Copy)]
struct FinishedGeneration {
    generation: Generation,
    ticks: u64,
    stats: Option<FitnessStats>,
}

pub(crate) struct ViewerApp {
    simulation: Simulation,
    limits: EpisodeLimits,
    generation: Generation,
    episode: Episode<Box<dyn Policy>, f64>,
    /// Border points in canvas coordinates.
    track_points: Vec<(f64, f64)>,
    tick_rate: f64,
    paused: bool,
    is_exiting: bool,
    last_finished: Option<FinishedGeneration>,
    summary: ViewerSummary,
}

impl ViewerApp {
    #[expect(clippy::cast_precision_loss)]
    pub(crate) fn new(simulation: Simulation, limits: EpisodeLimits, tick_rate: f64) -> Self {
        let environment = &simulation.environment;
        let height = environment.height() as f64;
        let stride = environment
            .width()
            .max(environment.height())
            .div_ceil(TRACK_SAMPLES);
        let track_points = environment
            .impassable_points(stride)
            .map(|(x, y)| (x as f64, height - y as f64))
            .collect();

        let generation = Generation::FIRST;
        let episode = simulation.episode(generation, limits);
        Self {
            simulation,
            limits,
            generation,
            episode,
            track_points,
            tick_rate: if tick_rate.is_nan() {
                DEFAULT_TICK_RATE
            } else {
                tick_rate.clamp(MIN_TICK_RATE, MAX_TICK_RATE)
            },
            paused: false,
            is_exiting: false,
            last_finished: None,
            summary: ViewerSummary::default(),
        }
    }

    pub(crate) fn summary(&self) -> ViewerSummary {
        self.summary
    }

    fn apply_tick_rate(&self, tui: &mut Tui) {
        tui.set_tick_rate((!self.paused).then_some(self.tick_rate));
    }

    fn step(&mut self) {
        let report = self.episode.step();
        let hit_limit = self.limits.max_ticks.is_some_and(|max| report.tick >= max);
        if report.still_alive == 0 || hit_limit {
            self.start_next_generation();
        }
    }

    fn start_next_generation(&mut self) {
        let stats = FitnessStats::new(self.episode.fitness().iter().copied());
        if let Some(stats) = &stats {
            self.summary.best_fitness = Some(
                self.summary
                    .best_fitness
                    .map_or(stats.max, |best| best.max(stats.max)),
            );
        }
        self.summary.finished_generations += 1;
        self.last_finished = Some(FinishedGeneration {
            generation: self.generation,
            ticks: self.episode.tick(),
            stats,
        });

        self.generation = self.generation.next();
        self.episode = self.simulation.episode(self.generation, self.limits);
    }

    fn status_line(&self) -> String {
        let mut status = format!(
            "Tick {} | Alive {}/{} | {:.0} ticks/s",
            self.episode.tick(),
            self.episode.still_alive(),
            self.episode.len(),
            self.tick_rate,
        );
        if self.paused {
            status.push_str(" (paused)");
        }
        if let Some(last) = &self.last_finished {
            status.push_str(&format!(
                " | Generation #{} ended after {} ticks",
                last.generation, last.ticks
            ));
            if let Some(stats) = &last.stats {
                status.push_str(&format!(", best {:.1}", stats.max));
            }
        }
        status
    }
}

impl App for ViewerApp {
    fn init(&mut self, tui: &mut Tui) {
        tui.set_frame_rate(FRAME_RATE);
        self.apply_tick_rate(tui);
    }

    fn should_exit(&self) -> bool {
        self.is_exiting
    }

    fn handle_event(&mut self, tui: &mut Tui, event: Event) {
        let Some(key) = event.as_key_event() else {
            return;
        };
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.is_exiting = true,
            KeyCode::Char('p') => {
                self.paused = !self.paused;
                self.apply_tick_rate(tui);
            }
            KeyCode::Char('+') => {
                self.tick_rate = (self.tick_rate * 2.0).min(MAX_TICK_RATE);
                self.apply_tick_rate(tui);
            }
            KeyCode::Char('-') => {
                self.tick_rate = (self.tick_rate / 2.0).max(MIN_TICK_RATE);
                self.apply_tick_rate(tui);
            }
            _ => {}
        }
    }

    #[expect(clippy::cast_precision_loss)]
    fn draw(&self, frame: &mut Frame) {
        let [canvas_area, status_area, help_area] = Layout::vertical([
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        let environment = self.episode.environment();
        let width = environment.width() as f64;
        let height = environment.height() as f64;
        let view = self.episode.frame();
        let canvas = Canvas::default()
            .block(Block::bordered().title(format!(" Generation #{} ", self.generation)))
            .marker(Marker::Braille)
            .x_bounds([0.0, width])
            .y_bounds([0.0, height])
            .paint(|ctx| {
                ctx.draw(&Points {
                    coords: &self.track_points,
                    color: Color::DarkGray,
                });
                ctx.layer();
                for agent in view.live_agents() {
                    draw_agent(ctx, agent, height);
                }
            });

        let help_text = if self.paused {
            "Controls: p (Resume) | +/- (Speed) | q (Quit)"
        } else {
            "Controls: p (Pause) | +/- (Speed) | q (Quit)"
        };
        let help_text = Text::from(help_text)
            .style(Style::default().fg(Color::DarkGray))
            .centered();

        frame.render_widget(canvas, canvas_area);
        frame.render_widget(Text::from(self.status_line()), status_area);
        frame.render_widget(help_text, help_area);
    }

    fn update(&mut self, _tui: &mut Tui) {
        if !self.paused {
            self.step();
        }
    }
}

/// Sensor rays from the center to each hit point, then the footprint outline.
fn draw_agent(ctx: &mut Context<'_>, agent: &Agent, height: f64) {
    let flip = |v: Vec2| (v.x, height - v.y);

    let (cx, cy) = flip(agent.center());
    for hit in agent.sensors().hits() {
        let (hx, hy) = flip(hit.hit_point.to_vec2());
        ctx.draw(&CanvasLine::new(cx, cy, hx, hy, Color::Yellow));
    }

    let corners = agent.corners().map(flip);
    for (&(x1, y1), &(x2, y2)) in corners.iter().zip(corners.iter().cycle().skip(1)) {
        ctx.draw(&CanvasLine::new(x1, y1, x2, y2, Color::Cyan));
    }
}
