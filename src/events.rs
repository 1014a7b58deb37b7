use crate::ScreenSize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    EngineEvent(EngineEvent),
    AppEvent(AppEvent),
}

/// Requests handled by the [`Simulation`](crate::simulation::Simulation)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    /// Flip a single cell
    Toggle { row: usize, col: usize },

    /// Start when stopped, stop when running
    PlayPause,

    Start,
    Stop,

    /// Stop and bring back a fresh grid
    Reset,

    /// Advance the world state by `n`
    Advance(usize),
}

/// Requests handled by the terminal front end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    MoveCursor(Direction),

    /// Toggle the cell under the cursor
    ToggleAtCursor,

    /// Left click at a terminal position
    Click { column: ScreenSize, row: ScreenSize },

    Resize { cols: ScreenSize, rows: ScreenSize },

    /// Exit the application
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl From<EngineEvent> for Event {
    fn from(event: EngineEvent) -> Self {
        Event::EngineEvent(event)
    }
}

impl From<AppEvent> for Event {
    fn from(event: AppEvent) -> Self {
        Event::AppEvent(event)
    }
}
