use std::fmt;
use std::time::Duration;
use std::time::Instant;

use thiserror::Error;
use tracing::debug;
use tracing::trace;
use tracing::warn;

use crate::cell::CellState;
use crate::config::Config;
use crate::events::EngineEvent;
use crate::grid::Grid;
use crate::grid::GridError;
use crate::pattern::Pattern;
use crate::rule_set::RuleSet;

/// Generation-advance period used when none is configured.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Running,
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackState::Stopped => write!(f, "stopped"),
            PlaybackState::Running => write!(f, "running"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("Cannot {op} while {state}")]
    InvalidTransition {
        state: PlaybackState,
        op: &'static str,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimulationError {
    #[error("Grid error: {0}")]
    Grid(#[from] GridError),

    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),
}

/// A recurring deadline. Dropping it cancels every future tick.
#[derive(Debug, Clone, Copy)]
struct Ticker {
    period: Duration,
    next_due: Instant,
}

impl Ticker {
    fn new(period: Duration, now: Instant) -> Self {
        Self {
            period,
            next_due: now + period,
        }
    }

    /// Consume the deadline if it has passed. When the caller fell more than a period behind, the
    /// next deadline is anchored to `now` instead of firing a burst of catch-up ticks.
    fn fire(&mut self, now: Instant) -> bool {
        if now < self.next_due {
            return false;
        }

        self.next_due += self.period;

        if self.next_due <= now {
            self.next_due = now + self.period;
        }

        true
    }
}

/// One Game of Life session: the grid, the rules it evolves under and the play/pause lifecycle.
///
/// Every mutation goes through `&mut self`, so toggles and generation steps are applied one at a
/// time, in the order they are requested.
#[derive(Debug)]
pub struct Simulation {
    grid: Grid,
    rules: RuleSet,
    state: PlaybackState,
    ticker: Option<Ticker>,
    period: Duration,
    generation: u64,

    /// Re-applied to the fresh grid on every reset
    seed: Option<Pattern>,
}

impl Simulation {
    /// An empty, stopped simulation under Conway's rules.
    pub fn new(rows: usize, cols: usize) -> Result<Self, SimulationError> {
        Ok(Self {
            grid: Grid::new(rows, cols)?,
            rules: RuleSet::default(),
            state: PlaybackState::Stopped,
            ticker: None,
            period: DEFAULT_TICK_INTERVAL,
            generation: 0,
            seed: None,
        })
    }

    /// A simulation set up from `config`. Without `--rule`, a seed pattern that declares a rule runs
    /// under it.
    pub fn from_config(config: &Config, rows: usize, cols: usize) -> Result<Self, SimulationError> {
        let own = config.pattern.as_ref().and_then(Pattern::rules);

        if let (Some(rules), Some(own)) = (config.rules, own) {
            if rules != own {
                warn!(%rules, pattern = %own, "configured rule overrides the pattern's rule");
            }
        }

        let mut sim = Self::new(rows, cols)?
            .with_rules(config.rules.or(own).unwrap_or_default())
            .with_tick_interval(config.tick_interval);

        if let Some(seed) = &config.pattern {
            sim.seed(seed.clone())?;
        }

        Ok(sim)
    }

    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_tick_interval(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Center `pattern` in the grid and remember it, so that `reset` brings it back.
    pub fn seed(&mut self, pattern: Pattern) -> Result<(), SimulationError> {
        let (rows, cols) = (self.grid.rows(), self.grid.cols());
        let (top, left) = pattern
            .centered_in(rows, cols)
            .ok_or(GridError::OutOfBounds {
                row: pattern.height().saturating_sub(1),
                col: pattern.width().saturating_sub(1),
                rows,
                cols,
            })?;

        self.grid.stamp(&pattern, top, left)?;

        debug!(pattern = pattern.name(), top, left, "seeded grid");
        self.seed = Some(pattern);

        Ok(())
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn rules(&self) -> RuleSet {
        self.rules
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == PlaybackState::Running
    }

    pub fn tick_interval(&self) -> Duration {
        self.period
    }

    /// Generations advanced since the last reset
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// When the next tick is due, if playback is running
    pub fn next_deadline(&self) -> Option<Instant> {
        self.ticker.map(|t| t.next_due)
    }

    /// Time left until the next tick. `None` while stopped.
    pub fn time_until_tick(&self, now: Instant) -> Option<Duration> {
        self.next_deadline()
            .map(|due| due.saturating_duration_since(now))
    }

    pub fn toggle_cell(&mut self, row: usize, col: usize) -> Result<CellState, SimulationError> {
        let state = self.grid.toggle(row, col)?;
        trace!(row, col, ?state, "toggled cell");

        Ok(state)
    }

    pub fn start(&mut self) -> Result<(), SimulationError> {
        self.start_at(Instant::now())
    }

    /// Begin playback, with the first tick due one period after `now`.
    pub fn start_at(&mut self, now: Instant) -> Result<(), SimulationError> {
        if self.state == PlaybackState::Running {
            return Err(PlaybackError::InvalidTransition {
                state: self.state,
                op: "start",
            }
            .into());
        }

        self.state = PlaybackState::Running;
        self.ticker = Some(Ticker::new(self.period, now));
        debug!(period = ?self.period, "playback started");

        Ok(())
    }

    /// Stop playback. Stopping a stopped simulation does nothing.
    pub fn stop(&mut self) {
        if self.ticker.take().is_some() {
            debug!(generation = self.generation, "playback stopped");
        }

        self.state = PlaybackState::Stopped;
    }

    /// Play/pause: stop when running, start otherwise.
    pub fn toggle_playback(&mut self, now: Instant) -> PlaybackState {
        match self.state {
            PlaybackState::Running => self.stop(),
            PlaybackState::Stopped => {
                // Stopped, so starting cannot be rejected
                let _ = self.start_at(now);
            }
        }

        self.state
    }

    /// Stop playback and replace the grid with a fresh one of the same size, re-seeded with the
    /// configured pattern if any.
    pub fn reset(&mut self) {
        self.stop();

        let (rows, cols) = (self.grid.rows(), self.grid.cols());
        self.grid = self.grid.cleared();
        self.generation = 0;

        if let Some(seed) = &self.seed {
            if let Some((top, left)) = seed.centered_in(rows, cols) {
                // The seed was stamped onto a grid of these exact dimensions before
                let _ = self.grid.stamp(seed, top, left);
            }
        }

        debug!(rows, cols, "simulation reset");
    }

    /// Advance `n` generations, whatever the playback state.
    pub fn advance(&mut self, n: usize) {
        for _ in 0..n {
            self.step();
        }
    }

    /// Fire the tick if it is due, returning whether a generation was advanced.
    ///
    /// At most one generation is advanced per call.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(ticker) = self.ticker.as_mut() else {
            return false;
        };

        if !ticker.fire(now) {
            return false;
        }

        self.step();

        true
    }

    /// Apply a single engine request.
    pub fn apply(&mut self, event: EngineEvent, now: Instant) -> Result<(), SimulationError> {
        match event {
            EngineEvent::Toggle { row, col } => {
                self.toggle_cell(row, col)?;
            }
            EngineEvent::PlayPause => {
                self.toggle_playback(now);
            }
            EngineEvent::Start => self.start_at(now)?,
            EngineEvent::Stop => self.stop(),
            EngineEvent::Reset => self.reset(),
            EngineEvent::Advance(n) => self.advance(n),
        }

        Ok(())
    }

    fn step(&mut self) {
        self.grid = self.grid.next_generation_with(&self.rules);
        self.generation += 1;

        trace!(
            generation = self.generation,
            population = self.grid.population(),
            "advanced"
        );
    }
}
