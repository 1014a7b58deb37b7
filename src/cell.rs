use std::fmt;
use std::ops::Not;

/// State of a single grid position.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Hash)]
pub enum CellState {
    Alive,

    #[default]
    Dead,
}

impl CellState {
    pub const fn is_alive(self) -> bool {
        matches!(self, CellState::Alive)
    }

    /// Flip `Alive <-> Dead`
    pub const fn flipped(self) -> Self {
        match self {
            CellState::Alive => CellState::Dead,
            CellState::Dead => CellState::Alive,
        }
    }

    /// Character used by the plain text rendering of a grid.
    pub const fn as_char(self) -> char {
        match self {
            CellState::Alive => 'O',
            CellState::Dead => '.',
        }
    }
}

impl Not for CellState {
    type Output = Self;

    fn not(self) -> Self::Output {
        self.flipped()
    }
}

impl From<bool> for CellState {
    fn from(alive: bool) -> Self {
        if alive {
            CellState::Alive
        } else {
            CellState::Dead
        }
    }
}

impl fmt::Display for CellState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

#[cfg(test)]
mod test {
    use super::CellState;

    #[test]
    fn default_is_dead() {
        assert_eq!(CellState::default(), CellState::Dead);
    }

    #[test]
    fn flip_is_an_involution() {
        for c in [CellState::Alive, CellState::Dead] {
            assert_ne!(c.flipped(), c);
            assert_eq!(!!c, c);
        }
    }
}
