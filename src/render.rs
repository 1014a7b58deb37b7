use crate::ScreenSize;
use crate::cell::CellState;
use crate::events::Direction;
use crate::grid::Grid;
use crate::simulation::PlaybackState;
use crate::simulation::Simulation;

/// Terminal columns used to draw a single cell. Terminal cells are roughly twice as tall as they
/// are wide, so two columns per cell keeps the grid square.
pub const CELL_WIDTH: ScreenSize = 2;

/// Terminal lines below the grid, reserved for the status line.
pub const STATUS_LINES: ScreenSize = 1;

const ALIVE: &str = "██";
const DEAD: &str = "··";
const CURSOR_ALIVE: &str = "▓▓";
const CURSOR_DEAD: &str = "░░";

/// Position of the keyboard cursor on the grid
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub row: usize,
    pub col: usize,
}

impl Cursor {
    /// Move one cell in `dir`, staying within a `rows x cols` grid.
    pub fn shift(self, dir: Direction, rows: usize, cols: usize) -> Self {
        let Cursor { row, col } = self;

        let (row, col) = match dir {
            Direction::Up => (row.saturating_sub(1), col),
            Direction::Down => ((row + 1).min(rows.saturating_sub(1)), col),
            Direction::Left => (row, col.saturating_sub(1)),
            Direction::Right => (row, (col + 1).min(cols.saturating_sub(1))),
        };

        Cursor { row, col }
    }
}

/// Text frame buffer of a grid, redrawn in place after every mutation.
pub struct Canvas {
    /// The frame buffer
    fb: String,

    /// Height of the grid, in cells
    rows: usize,

    /// Width of the grid, in cells
    cols: usize,
}

impl Canvas {
    /// The frame buffer grows on the first draw and is reused afterwards.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            fb: String::new(),
            rows,
            cols,
        }
    }

    /// Render `grid`, one text line per row.
    pub fn draw(&mut self, grid: &Grid, cursor: Option<Cursor>) -> &str {
        self.fb.clear();

        for (r, row) in grid.iter_rows().enumerate() {
            for (c, &cell) in row.iter().enumerate() {
                let on_cursor = cursor.is_some_and(|cur| cur == Cursor { row: r, col: c });

                let glyph = match (cell, on_cursor) {
                    (CellState::Alive, false) => ALIVE,
                    (CellState::Dead, false) => DEAD,
                    (CellState::Alive, true) => CURSOR_ALIVE,
                    (CellState::Dead, true) => CURSOR_DEAD,
                };

                self.fb.push_str(glyph);
            }

            self.fb.push('\n');
        }

        &self.fb
    }

    /// The grid cell drawn at a terminal position, if any.
    pub fn cell_at(&self, column: ScreenSize, row: ScreenSize) -> Option<(usize, usize)> {
        let (r, c) = (row as usize, (column / CELL_WIDTH) as usize);

        if r < self.rows && c < self.cols {
            Some((r, c))
        } else {
            None
        }
    }
}

/// One line summary of a simulation, shown under the grid.
pub fn status_line(sim: &Simulation) -> String {
    let state = match sim.state() {
        PlaybackState::Running => "▶",
        PlaybackState::Stopped => "■",
    };

    format!(
        "{state} gen {} | pop {} | {} | space play/pause, n step, r reset, q quit",
        sim.generation(),
        sim.grid().population(),
        sim.rules(),
    )
}
