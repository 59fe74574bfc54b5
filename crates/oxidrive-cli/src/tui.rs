//! Minimal terminal application loop.
//!
//! [`Tui::run`] drives an [`App`] with three kinds of events:
//!
//! - **Tick** - fixed-rate simulation steps (`App::update`), disabled while no tick rate is set
//! - **Render** - redraws after any state change, at most once per frame interval
//! - **Terminal** - key presses, resizes and other crossterm events
//!
//! The tick rate can be changed from inside the app at any time.

use std::{
    io,
    time::{Duration, Instant},
};

use crossterm::event::{self, Event};
use ratatui::Frame;

pub trait App {
    /// Called once before the loop starts. Use this to set tick and frame rates.
    fn init(&mut self, tui: &mut Tui);

    fn should_exit(&self) -> bool;

    fn handle_event(&mut self, tui: &mut Tui, event: Event);

    fn draw(&self, frame: &mut Frame);

    fn update(&mut self, tui: &mut Tui);
}

#[derive(Debug)]
enum TuiEvent {
    Tick,
    Render,
    Terminal(Event),
}

#[derive(Debug)]
pub struct Tui {
    tick_interval: Option<Duration>,
    frame_interval: Duration,
    last_tick: Instant,
    last_render: Option<Instant>,
    dirty: bool,
}

impl Default for Tui {
    fn default() -> Self {
        Self::new()
    }
}

impl Tui {
    pub fn new() -> Self {
        Self {
            tick_interval: None,
            frame_interval: Duration::from_secs_f64(1.0 / 30.0),
            last_tick: Instant::now(),
            last_render: None,
            dirty: true,
        }
    }

    /// Sets the tick rate in Hz; `None` or a rate that is not positive and finite stops ticking.
    pub fn set_tick_rate(&mut self, rate: Option<f64>) {
        self.tick_interval = rate
            .filter(|rate| rate.is_finite() && *rate > 0.0)
            .map(|rate| Duration::from_secs_f64(1.0 / rate));
    }

    /// Caps how often the screen is redrawn.
    pub fn set_frame_rate(&mut self, rate: f64) {
        self.frame_interval = Duration::from_secs_f64(1.0 / rate);
    }

    pub fn run<A>(mut self, app: &mut A) -> anyhow::Result<()>
    where
        A: App,
    {
        app.init(&mut self);

        ratatui::run(|terminal| {
            while !app.should_exit() {
                match self.next_event()? {
                    TuiEvent::Tick => app.update(&mut self),
                    TuiEvent::Render => {
                        terminal.draw(|frame| app.draw(frame))?;
                    }
                    TuiEvent::Terminal(event) => app.handle_event(&mut self, event),
                }
            }
            Ok(())
        })
    }

    fn next_event(&mut self) -> io::Result<TuiEvent> {
        loop {
            let now = Instant::now();
            // rendering takes precedence over an overdue tick
            if let Some(render_at) = self.next_render_at(now)
                && now >= render_at
            {
                self.last_render = Some(now);
                self.dirty = false;
                return Ok(TuiEvent::Render);
            }

            if let Some(interval) = self.tick_interval
                && now.duration_since(self.last_tick) >= interval
            {
                self.last_tick = now;
                self.dirty = true;
                return Ok(TuiEvent::Tick);
            }

            let deadline = [self.next_tick_at(), self.next_render_at(now)]
                .into_iter()
                .flatten()
                .min();
            let ready = match deadline {
                Some(deadline) => event::poll(deadline.saturating_duration_since(now))?,
                None => true,
            };
            if ready {
                self.dirty = true;
                return Ok(TuiEvent::Terminal(event::read()?));
            }
        }
    }

    fn next_tick_at(&self) -> Option<Instant> {
        self.tick_interval.map(|interval| self.last_tick + interval)
    }

    fn next_render_at(&self, now: Instant) -> Option<Instant> {
        self.dirty.then(|| {
            self.last_render
                .map_or(now, |last| last + self.frame_interval)
        })
    }
}
