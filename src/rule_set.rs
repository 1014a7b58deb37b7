use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::parse_util;

/// Rules of Conway's Game of Life.
pub const B3S23: RuleSet = RuleSet::new(0b1000, 0b1100);

/// # Representation
/// Life rules are represented as
/// ```notrust
/// |------birth------|
/// 0000_0000_0000_0000_0000_0000_0000_0000
///                     |----survival-----|
/// ```
///
/// # Examples
/// ```notrust
/// b3s23:                0000_0000_0000_1000_0000_0000_0000_1100
///
/// b0s0:                 0000_0000_0000_0000_0000_0000_0000_0000
/// b012345678s012345678: 0000_0001_1111_1111_0000_0001_1111_1111
/// ```
///
/// See: https://conwaylife.com/wiki/Rulestring
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleSet {
    rule: u32,
}

impl Default for RuleSet {
    fn default() -> Self {
        B3S23
    }
}

impl RuleSet {
    /// Create a new `RuleSet` for the given births and survivals. For both `b` and
    /// `s`, numbers are set on a bit basis. For instance if bit `i` in `b` is on, it
    /// means `i` is included in the set of births. Any bit past the 8th is ignored.
    ///
    /// Big endian is used here (i.e. `b = 0b1` means b1, and `b = 0b1_0000_0000` means b8).
    pub const fn new(b: u16, s: u16) -> Self {
        let b = b & 0x1FF;
        let s = s & 0x1FF;

        Self {
            rule: (b as u32) << 16 | s as u32,
        }
    }

    pub const fn births(&self) -> u16 {
        ((self.rule & 0x1FF0000) >> 0x10) as u16
    }

    pub const fn survivals(&self) -> u16 {
        (self.rule & 0x1FF) as u16
    }

    /// Whether a cell is alive in the next generation, given its current state and the number of
    /// alive cells in its Moore neighborhood.
    pub const fn next_state(&self, alive: bool, neighbors: u8) -> bool {
        if neighbors > 8 {
            return false;
        }

        let mask = 1 << neighbors;

        if alive {
            self.survivals() & mask == mask
        } else {
            self.births() & mask == mask
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleError {
    #[error("Empty rule")]
    Empty,

    #[error("Neighbor count must be within 0..=8, found '{got}'")]
    InvalidDigit { got: char },

    #[error("Unexpected character '{got}' in rule")]
    UnexpectedChar { got: char },

    #[error("Expected a rule of the form \"23/3\", found \"{got}\"")]
    Nameless { got: String },

    #[error("Rule is not valid UTF-8")]
    NotUtf8,
}

impl FromStr for RuleSet {
    type Err = RuleError;

    /// Accepts `B3/S23`, `b3s23`, `S23/B3` and the nameless `23/3` (survivals first) notation.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        match s.chars().next() {
            None => Err(RuleError::Empty),
            Some('b' | 'B' | 's' | 'S') => parse_named(s),
            Some(_) => parse_nameless(s),
        }
    }
}

fn parse_named(s: &str) -> Result<RuleSet, RuleError> {
    enum State {
        Birth,
        Survival,
    }

    let mut state = State::Birth;
    let (mut b, mut s_) = (0, 0);

    for c in s.chars() {
        match c {
            'b' | 'B' => state = State::Birth,
            's' | 'S' => state = State::Survival,
            '/' => {}
            n => {
                let n = digit(n)?;

                match state {
                    State::Birth => b |= n,
                    State::Survival => s_ |= n,
                }
            }
        }
    }

    Ok(RuleSet::new(b, s_))
}

fn parse_nameless(s: &str) -> Result<RuleSet, RuleError> {
    let Some((survivals, births)) = s.split_once('/') else {
        return Err(RuleError::Nameless { got: s.to_string() });
    };

    let s_ = digits(survivals)?;
    let b = digits(births)?;

    Ok(RuleSet::new(b, s_))
}

/// Convert the human readable birth/survival numbers to a packed bit representation
fn digits(s: &str) -> Result<u16, RuleError> {
    let mut n = 0;

    for c in s.chars() {
        n |= digit(c)?;
    }

    Ok(n)
}

fn digit(c: char) -> Result<u16, RuleError> {
    match c.to_digit(10) {
        Some(n) if n <= 8 => Ok(1 << n),
        Some(_) => Err(RuleError::InvalidDigit { got: c }),
        None => Err(RuleError::UnexpectedChar { got: c }),
    }
}

/// Parse a rule token (e.g. `B3/S23` or `23/3`) at the head of `bytes`, stopping at the first
/// whitespace character.
pub(crate) fn parse_rule(bytes: &[u8]) -> Result<(RuleSet, &[u8]), RuleError> {
    let (Some(rule), bytes) = parse_util::take_until_ws(bytes) else {
        return Err(RuleError::Empty);
    };

    let rule = std::str::from_utf8(rule).map_err(|_| RuleError::NotUtf8)?;

    Ok((rule.parse()?, bytes))
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_set = |f: &mut fmt::Formatter<'_>, set: u16| -> fmt::Result {
            (0..=8)
                .filter(|&n| set & (1u16 << n) != 0)
                .try_for_each(|n| write!(f, "{n}"))
        };

        write!(f, "B")?;
        write_set(f, self.births())?;
        write!(f, "/S")?;
        write_set(f, self.survivals())
    }
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RuleSet({self})")
    }
}
