use std::fmt;

use thiserror::Error;

use crate::cell::CellState;
use crate::pattern::Pattern;
use crate::rule_set::B3S23;
use crate::rule_set::RuleSet;

/// Relative positions of the Moore neighborhood, as `(d_row, d_col)`.
const NEIGHBORHOOD: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("Invalid grid dimensions {rows}x{cols}")]
    InvalidDimension { rows: usize, cols: usize },

    #[error("Cell ({row}, {col}) is outside of the {rows}x{cols} grid")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
}

/// A bounded `rows x cols` matrix of cells. Edges are hard: positions outside the grid do not
/// exist, nothing wraps around.
///
/// Cells are stored row-major, so the cell at `(row, col)` lives at `row * cols + col`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    cells: Vec<CellState>,
    rows: usize,
    cols: usize,
}

impl Grid {
    /// Create a grid of `rows x cols` dead cells.
    pub fn new(rows: usize, cols: usize) -> Result<Self, GridError> {
        let len = match rows.checked_mul(cols) {
            Some(len) if len > 0 && len <= isize::MAX as usize => len,
            _ => return Err(GridError::InvalidDimension { rows, cols }),
        };

        Ok(Self {
            cells: vec![CellState::Dead; len],
            rows,
            cols,
        })
    }

    /// A fresh all-dead grid with the same dimensions.
    pub fn cleared(&self) -> Grid {
        Grid {
            cells: vec![CellState::Dead; self.cells.len()],
            rows: self.rows,
            cols: self.cols,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Result<CellState, GridError> {
        let i = self.index(row, col)?;

        Ok(self.cells[i])
    }

    pub fn set(&mut self, row: usize, col: usize, state: CellState) -> Result<(), GridError> {
        let i = self.index(row, col)?;
        self.cells[i] = state;

        Ok(())
    }

    /// Flip the state of a single cell, returning its new state.
    pub fn toggle(&mut self, row: usize, col: usize) -> Result<CellState, GridError> {
        let i = self.index(row, col)?;
        self.cells[i] = !self.cells[i];

        Ok(self.cells[i])
    }

    /// Count the alive cells among the (at most) 8 neighbors of `(row, col)`.
    pub fn count_alive_neighbors(&self, row: usize, col: usize) -> Result<u8, GridError> {
        self.index(row, col)?;

        Ok(self.neighbors(row, col))
    }

    /// Compute the next generation under Conway's rules.
    pub fn next_generation(&self) -> Grid {
        self.next_generation_with(&B3S23)
    }

    /// Compute the next generation under the given rules.
    ///
    /// Every cell is evaluated against `self`, never against the grid being built, so all cells
    /// transition simultaneously.
    pub fn next_generation_with(&self, rules: &RuleSet) -> Grid {
        let mut next = Vec::with_capacity(self.cells.len());

        for row in 0..self.rows {
            for col in 0..self.cols {
                let alive = self.cells[self.xy_from(row, col)].is_alive();
                let n = self.neighbors(row, col);

                next.push(CellState::from(rules.next_state(alive, n)));
            }
        }

        Grid {
            cells: next,
            rows: self.rows,
            cols: self.cols,
        }
    }

    /// Number of alive cells
    pub fn population(&self) -> usize {
        self.cells.iter().filter(|c| c.is_alive()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.population() == 0
    }

    /// Iterate over the rows of the grid, top to bottom.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[CellState]> {
        self.cells.chunks_exact(self.cols)
    }

    /// Positions of every alive cell, in row-major order.
    pub fn alive_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_alive())
            .map(|(i, _)| self.xy_to(i))
    }

    /// Bring `pattern` to life with its top left corner at `(top, left)`.
    ///
    /// Every target position is checked before anything is written, so a pattern that does not
    /// fit leaves the grid untouched.
    pub fn stamp(&mut self, pattern: &Pattern, top: usize, left: usize) -> Result<(), GridError> {
        let mut targets = Vec::with_capacity(pattern.cells().len());

        for &(row, col) in pattern.cells() {
            let (row, col) = (top + row, left + col);
            targets.push(self.index(row, col)?);
        }

        for i in targets {
            self.cells[i] = CellState::Alive;
        }

        Ok(())
    }

    /// Alive neighbors of an in-bounds cell.
    fn neighbors(&self, row: usize, col: usize) -> u8 {
        let mut n = 0;

        for (dr, dc) in NEIGHBORHOOD {
            let (Some(r), Some(c)) = (row.checked_add_signed(dr), col.checked_add_signed(dc)) else {
                continue;
            };

            if r < self.rows && c < self.cols && self.cells[self.xy_from(r, c)].is_alive() {
                n += 1;
            }
        }

        n
    }

    fn index(&self, row: usize, col: usize) -> Result<usize, GridError> {
        if row >= self.rows || col >= self.cols {
            return Err(GridError::OutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }

        Ok(self.xy_from(row, col))
    }

    fn xy_from(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    fn xy_to(&self, i: usize) -> (usize, usize) {
        (i / self.cols, i % self.cols)
    }
}

/// One line per row, `O` for alive cells and `.` for dead ones.
impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.iter_rows() {
            for cell in row {
                write!(f, "{cell}")?;
            }

            writeln!(f)?;
        }

        Ok(())
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Grid {}x{}", self.rows, self.cols)?;
        write!(f, "{self}")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// Build a grid from rows of `O` and `.`
    fn grid(rows: &[&str]) -> Grid {
        let mut g = Grid::new(rows.len(), rows[0].len()).unwrap();

        for (r, line) in rows.iter().enumerate() {
            for (c, b) in line.bytes().enumerate() {
                if b == b'O' {
                    g.set(r, c, CellState::Alive).unwrap();
                }
            }
        }

        g
    }

    #[test]
    fn new_is_all_dead() {
        let g = Grid::new(3, 4).unwrap();

        assert_eq!(g.rows(), 3);
        assert_eq!(g.cols(), 4);
        assert_eq!(g.iter_rows().count(), 3);
        assert!(g.iter_rows().all(|r| r.len() == 4));
        assert!(g.is_empty());
    }

    #[test]
    fn new_rejects_zero_dimension() {
        assert_eq!(
            Grid::new(0, 4),
            Err(GridError::InvalidDimension { rows: 0, cols: 4 })
        );
        assert_eq!(
            Grid::new(4, 0),
            Err(GridError::InvalidDimension { rows: 4, cols: 0 })
        );
    }

    #[test]
    fn new_rejects_overflowing_dimensions() {
        assert_eq!(
            Grid::new(usize::MAX, 2),
            Err(GridError::InvalidDimension {
                rows: usize::MAX,
                cols: 2
            })
        );
        assert_eq!(
            Grid::new(usize::MAX / 2 + 1, 2),
            Err(GridError::InvalidDimension {
                rows: usize::MAX / 2 + 1,
                cols: 2
            })
        );
    }

    #[test]
    fn toggle_out_of_bounds_leaves_grid_untouched() {
        let mut g = grid(&["O..", "...", "..."]);
        let before = g.clone();

        assert_eq!(
            g.toggle(3, 0),
            Err(GridError::OutOfBounds {
                row: 3,
                col: 0,
                rows: 3,
                cols: 3
            })
        );
        assert!(g.toggle(0, 3).is_err());
        assert_eq!(g, before);
    }

    #[test]
    fn count_surrounded_center() {
        let g = grid(&["OOO", "O.O", "OOO"]);

        assert_eq!(g.count_alive_neighbors(1, 1), Ok(8));
        assert_eq!(g.count_alive_neighbors(0, 0), Ok(2));
        assert!(g.count_alive_neighbors(1, 3).is_err());
    }

    #[test]
    fn edges_do_not_wrap() {
        let g = grid(&["O...", "....", "....", "...."]);

        assert_eq!(g.count_alive_neighbors(3, 3), Ok(0));
        assert_eq!(g.count_alive_neighbors(0, 3), Ok(0));
        assert_eq!(g.count_alive_neighbors(3, 0), Ok(0));
        assert_eq!(g.count_alive_neighbors(1, 1), Ok(1));
    }

    #[test]
    fn block_is_still() {
        let g = grid(&["....", ".OO.", ".OO.", "...."]);

        assert_eq!(g.next_generation(), g);
    }

    #[test]
    fn empty_stays_empty() {
        let g = Grid::new(5, 7).unwrap();

        assert!(g.next_generation().is_empty());
    }

    #[test]
    fn isolated_cell_dies() {
        let g = grid(&["...", ".O.", "..."]);

        assert!(g.next_generation().is_empty());
    }

    #[test]
    fn blinker_oscillates() {
        let horizontal = grid(&[".....", ".....", ".OOO.", ".....", "....."]);
        let vertical = grid(&[".....", "..O..", "..O..", "..O..", "....."]);

        let next = horizontal.next_generation();
        assert_eq!(next, vertical);
        assert_eq!(next.next_generation(), horizontal);
    }

    #[test]
    fn transition_is_simultaneous() {
        // Updating in place from left to right would kill (0, 0) before (0, 1) is evaluated,
        // and then neither (0, 1) survives nor (1, 1) is born.
        let g = grid(&["OOO", "...", "..."]);
        let next = g.next_generation();

        assert_eq!(next, grid(&[".O.", ".O.", "..."]));
    }

    #[test]
    fn display() {
        let g = grid(&["O.", ".O"]);

        assert_eq!(g.to_string(), "O.\n.O\n");
        assert_eq!(g.alive_cells().collect::<Vec<_>>(), vec![(0, 0), (1, 1)]);
        assert_eq!(g.population(), 2);
    }

    #[test]
    fn stamp_is_all_or_nothing() {
        let blinker = Pattern::from_cells("blinker", [(0, 0), (0, 1), (0, 2)]);
        let mut g = Grid::new(3, 3).unwrap();

        assert!(g.stamp(&blinker, 0, 1).is_err());
        assert!(g.is_empty());

        g.stamp(&blinker, 1, 0).unwrap();
        assert_eq!(g, grid(&["...", "OOO", "..."]));
    }
}
