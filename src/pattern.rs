use std::str::FromStr;

use thiserror::Error;

use crate::WorldOffset;
use crate::parse_rle::RleEncodingError;
use crate::parse_rle::RleError;
use crate::parse_rle::read_rle;
use crate::rule_set::RuleSet;

/// A named set of alive cells, positioned relative to its own top left corner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    name: String,
    rules: Option<RuleSet>,
    height: usize,
    width: usize,

    /// Alive cells as `(row, col)`, sorted in row-major order.
    cells: Vec<(usize, usize)>,
}

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("Unknown pattern \"{0}\"")]
    Unknown(String),

    #[error("Invalid RLE: {0}")]
    Rle(#[from] RleError),
}

impl Pattern {
    pub fn from_cells<I>(name: &str, cells: I) -> Self
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut cells: Vec<_> = cells.into_iter().collect();
        cells.sort_unstable();
        cells.dedup();

        let height = cells.iter().map(|&(r, _)| r + 1).max().unwrap_or(0);
        let width = cells.iter().map(|&(_, c)| c + 1).max().unwrap_or(0);

        Self {
            name: name.to_string(),
            rules: None,
            height,
            width,
            cells,
        }
    }

    /// Parse a pattern in RLE format. Any `#P` offset is discarded: the pattern is shifted so that
    /// its bounding box starts at `(0, 0)`.
    pub fn from_rle(bytes: &[u8]) -> Result<Self, RleError> {
        let mut alive: Vec<(WorldOffset, WorldOffset)> = Vec::new();
        let file = read_rle(bytes, |row, col| alive.push((row, col)))?;

        let min_row = alive.iter().map(|&(r, _)| r).min().unwrap_or(0);
        let min_col = alive.iter().map(|&(_, c)| c).min().unwrap_or(0);

        let mut cells = Vec::with_capacity(alive.len());
        for (r, c) in alive {
            let (Ok(row), Ok(col)) = (
                usize::try_from(r.abs_diff(min_row)),
                usize::try_from(c.abs_diff(min_col)),
            ) else {
                return Err(RleEncodingError::Overflow.into());
            };

            cells.push((row, col));
        }

        let name = file
            .name
            .map(|n| String::from_utf8_lossy(n).into_owned())
            .unwrap_or_default();

        let mut pattern = Self::from_cells(&name, cells);
        pattern.rules = file.set;

        Ok(pattern)
    }

    /// Look up one of the built-in patterns by name (case insensitive).
    pub fn builtin(name: &str) -> Result<Self, PatternError> {
        let Some((_, rle)) = BUILTIN
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
        else {
            return Err(PatternError::Unknown(name.to_string()));
        };

        Ok(Self::from_rle(rle.as_bytes())?)
    }

    pub fn builtin_names() -> impl Iterator<Item = &'static str> {
        BUILTIN.iter().map(|(n, _)| *n)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rule the pattern was designed for, if its source declared one
    pub fn rules(&self) -> Option<RuleSet> {
        self.rules
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn cells(&self) -> &[(usize, usize)] {
        &self.cells
    }

    /// Top left position that centers the pattern in a `rows x cols` grid, or `None` if it does
    /// not fit.
    pub fn centered_in(&self, rows: usize, cols: usize) -> Option<(usize, usize)> {
        let top = rows.checked_sub(self.height)? / 2;
        let left = cols.checked_sub(self.width)? / 2;

        Some((top, left))
    }
}

impl FromStr for Pattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::builtin(s)
    }
}

const BUILTIN: &[(&str, &str)] = &[
    ("block", "#N Block\nx = 2, y = 2, rule = B3/S23\n2o$2o!\n"),
    ("blinker", "#N Blinker\nx = 3, y = 1, rule = B3/S23\n3o!\n"),
    ("toad", "#N Toad\nx = 4, y = 2, rule = B3/S23\nb3o$3o!\n"),
    (
        "beacon",
        "#N Beacon\nx = 4, y = 4, rule = B3/S23\n2o$2o$2b2o$2b2o!\n",
    ),
    ("glider", "#N Glider\nx = 3, y = 3, rule = B3/S23\nbob$2bo$3o!\n"),
    (
        "pulsar",
        "#N Pulsar\nx = 13, y = 13, rule = B3/S23\n\
         2b3o3b3o2b2$o4bobo4bo$o4bobo4bo$o4bobo4bo$2b3o3b3o2b2$2b3o3b3o2b$\
         o4bobo4bo$o4bobo4bo$o4bobo4bo2$2b3o3b3o!\n",
    ),
    (
        "r-pentomino",
        "#N R-pentomino\nx = 3, y = 3, rule = B3/S23\nb2o$2o$bo!\n",
    ),
    (
        "glider-gun",
        "#N Gosper glider gun\nx = 36, y = 9, rule = B3/S23\n\
         24bo$22bobo$12b2o6b2o12b2o$11bo3bo4b2o12b2o$2o8bo5bo3b2o$2o8bo3bob2o4b\
         obo$10bo5bo7bo$11bo3bo$12b2o!\n",
    ),
];

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn builtins_parse() {
        for name in Pattern::builtin_names() {
            let p = Pattern::builtin(name).unwrap();

            assert!(!p.cells().is_empty(), "{name} has no cells");
            assert!(p.rules().is_some(), "{name} has no rule");
        }
    }

    #[test]
    fn builtin_sizes() {
        let sizes = [
            ("block", 2, 2, 4),
            ("blinker", 1, 3, 3),
            ("toad", 2, 4, 6),
            ("beacon", 4, 4, 8),
            ("glider", 3, 3, 5),
            ("pulsar", 13, 13, 48),
            ("r-pentomino", 3, 3, 5),
            ("glider-gun", 9, 36, 36),
        ];

        for (name, height, width, population) in sizes {
            let p = Pattern::builtin(name).unwrap();

            assert_eq!(p.height(), height, "{name}");
            assert_eq!(p.width(), width, "{name}");
            assert_eq!(p.cells().len(), population, "{name}");
        }
    }

    #[test]
    fn offsets_at_the_limits() {
        assert!(matches!(
            Pattern::from_rle(b"#P 9223372036854775807 0\n2o!"),
            Err(RleError::Encoding(RleEncodingError::Overflow))
        ));

        let p = Pattern::from_rle(b"#P -9223372036854775808 9223372036854775806\nobo!").unwrap();
        assert_eq!(p.cells(), &[(0, 0), (0, 2)]);
        assert_eq!((p.height(), p.width()), (1, 3));
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(Pattern::builtin("Glider").unwrap().name(), "Glider");
        assert!(matches!(
            "spaceship".parse::<Pattern>(),
            Err(PatternError::Unknown(_))
        ));
    }

    #[test]
    fn centered() {
        let blinker = Pattern::builtin("blinker").unwrap();

        assert_eq!(blinker.centered_in(5, 5), Some((2, 1)));
        assert_eq!(blinker.centered_in(1, 2), None);
    }

    #[test]
    fn from_cells_normalizes() {
        let p = Pattern::from_cells("dup", [(1, 2), (0, 0), (1, 2)]);

        assert_eq!(p.cells(), &[(0, 0), (1, 2)]);
        assert_eq!((p.height(), p.width()), (2, 3));
    }
}
