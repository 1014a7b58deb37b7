use thiserror::Error;
use tracing::warn;

use crate::WorldOffset;
use crate::parse_util;
use crate::parse_util::ConvertError;
use crate::parse_util::ParseError;
use crate::parse_util::convert;
use crate::rule_set;
use crate::rule_set::RuleError;
use crate::rule_set::RuleSet;

#[derive(Debug, Default)]
pub struct RleFile<'a> {
    pub name: Option<&'a [u8]>,
    pub author: Option<&'a [u8]>,
    pub comments: Vec<&'a [u8]>,

    /// Position of the top left corner of the pattern, as `(x, y)`
    pub offset: Option<(WorldOffset, WorldOffset)>,

    /// Bounding box declared by the header line, as `(x, y)`
    pub size: Option<(WorldOffset, WorldOffset)>,

    pub set: Option<RuleSet>,
}

#[derive(Debug, Error)]
pub enum RleError {
    #[error("Comment line error: {0}")]
    CommentLine(#[from] RleCommentLineError),

    #[error("Header line error: {0}")]
    HeaderLine(#[from] RleHeaderLineError),

    #[error("Encoding error: {0}")]
    Encoding(#[from] RleEncodingError),
}

/// Parse the RLE file format. Assumes the bytes are valid Ascii.
///
/// `f` is called with the `(row, col)` of every alive cell, rows growing downwards.
///
/// See: https://conwaylife.com/wiki/Run_Length_Encoded
pub fn read_rle<F>(mut bytes: &'_ [u8], f: F) -> Result<RleFile<'_>, RleError>
where
    F: FnMut(WorldOffset, WorldOffset),
{
    let mut file = RleFile::default();

    // Parse as many comment lines as possible
    loop {
        bytes = parse_util::take_ws(bytes);

        let (Some(line), rest) = read_line_comment(bytes)? else {
            break;
        };

        match line {
            RleCommentLine::Comment { text } => file.comments.push(text),
            RleCommentLine::Name { name } => {
                if file.name.is_some() {
                    warn!("RLE file name already defined. Using latest");
                }

                file.name = Some(name);
            }
            RleCommentLine::Author { author } => {
                if file.author.is_some() {
                    warn!("RLE author already defined. Using latest");
                }

                file.author = Some(author);
            }
            RleCommentLine::Offset { x, y } => {
                if file.offset.is_some() {
                    warn!("RLE offset already defined. Using latest");
                }

                file.offset = Some((x, y))
            }
            RleCommentLine::RuleSet { set } => {
                file.set = Some(set);
            }
        }

        bytes = rest;
    }

    // Parse header line, if it's present
    if let (Some(header), rest) = read_line_header(bytes)? {
        let RleHeaderLine { x, y, set } = header;

        file.size = Some((x, y));

        if let Some(set) = set {
            if file.set.is_some_and(|s| s != set) {
                warn!("RLE header rule {set} overrides comment rule. Using latest");
            }

            file.set = Some(set);
        }

        bytes = rest;
    }

    let (dx, dy) = file.offset.unwrap_or_default();

    // Parse encoding
    read_encoding(bytes, dy, dx, f)?;

    Ok(file)
}

enum RleCommentLine<'a> {
    Comment { text: &'a [u8] },
    Name { name: &'a [u8] },
    Author { author: &'a [u8] },
    Offset { x: WorldOffset, y: WorldOffset },
    RuleSet { set: RuleSet },
}

#[derive(Debug, Error)]
pub enum RleCommentLineError {
    #[error("No comment type")]
    NoType,

    #[error("Empty name line")]
    EmptyName,

    #[error("Empty author line")]
    EmptyAuthor,

    #[error("Invalid rule: {0}")]
    InvalidRule(#[from] RuleError),

    #[error("Invalid coordinates: {0}")]
    InvalidCoord(#[from] RleCoordError),

    #[error("Invalid comment type, found '{got}'")]
    InvalidType { got: char },
}

/// Attempt to parse a comment line, otherwise leaves `bytes` as-is.
fn read_line_comment(
    bytes: &'_ [u8],
) -> Result<(Option<RleCommentLine<'_>>, &'_ [u8]), RleCommentLineError> {
    let Ok(bytes) = parse_util::expect(b'#', bytes) else {
        return Ok((None, bytes));
    };

    let (Some(b), bytes) = parse_util::take_1(bytes) else {
        return Err(RleCommentLineError::NoType);
    };

    match b {
        // Comment line
        b'C' | b'c' => {
            let bytes = parse_util::take_ws_inline(bytes);
            let (text, bytes) = parse_util::take_line(bytes);

            Ok((Some(RleCommentLine::Comment { text }), bytes))
        }

        // Pattern name
        b'N' => {
            let bytes = parse_util::take_ws_inline(bytes);
            let (name, bytes) = parse_util::take_line(bytes);

            if name.is_empty() {
                return Err(RleCommentLineError::EmptyName);
            }

            Ok((Some(RleCommentLine::Name { name }), bytes))
        }

        // Pattern author
        b'O' => {
            let bytes = parse_util::take_ws_inline(bytes);
            let (author, bytes) = parse_util::take_line(bytes);

            if author.is_empty() {
                return Err(RleCommentLineError::EmptyAuthor);
            }

            Ok((Some(RleCommentLine::Author { author }), bytes))
        }

        // Pattern offset
        b'R' | b'P' => {
            let ((x, y), bytes) = read_offset(bytes)?;
            let (_, bytes) = parse_util::take_line(bytes);

            Ok((Some(RleCommentLine::Offset { x, y }), bytes))
        }

        // Pattern rules
        b'r' => {
            let bytes = parse_util::take_ws_inline(bytes);
            let (set, bytes) = rule_set::parse_rule(bytes)?;
            let (_, bytes) = parse_util::take_line(bytes);

            Ok((Some(RleCommentLine::RuleSet { set }), bytes))
        }

        b => Err(RleCommentLineError::InvalidType { got: b as char }),
    }
}

struct RleHeaderLine {
    x: WorldOffset,
    y: WorldOffset,
    set: Option<RuleSet>,
}

#[derive(Debug, Error)]
pub enum RleHeaderLineError {
    #[error("Parse error: {0}")]
    ParseError(#[from] ParseError),

    #[error("Invalid coordinates: {0}")]
    InvalidCoord(#[from] RleCoordError),

    #[error("Invalid token: expected ',' or '\\n', found '{got}'")]
    InvalidToken { got: char },

    #[error("Invalid rule: {0}")]
    InvalidRule(#[from] RuleError),
}

/// Attempt to parse a header line (`x = 3, y = 1, rule = B3/S23`), otherwise leaves `bytes` as-is.
fn read_line_header(bytes: &[u8]) -> Result<(Option<RleHeaderLine>, &[u8]), RleHeaderLineError> {
    if parse_util::peek_1(bytes) != Some(b'x') {
        return Ok((None, bytes));
    }

    let ((x, y), bytes) = read_coordinates(bytes)?;
    let bytes = parse_util::take_ws_inline(bytes);

    match parse_util::take_1(bytes) {
        (Some(b','), bytes) => {
            let bytes = parse_util::take_ws_inline(bytes);
            let bytes = parse_util::expect_slice(b"rule", bytes)?;
            let bytes = parse_util::take_ws_inline(bytes);
            let bytes = parse_util::expect(b'=', bytes)?;
            let bytes = parse_util::take_ws_inline(bytes);

            let (set, bytes) = rule_set::parse_rule(bytes)?;
            let (_, bytes) = parse_util::take_line(bytes);

            let line = RleHeaderLine {
                x,
                y,
                set: Some(set),
            };

            Ok((Some(line), bytes))
        }
        (Some(b'\r' | b'\n') | None, _) => {
            let (_, bytes) = parse_util::take_line(bytes);
            let line = RleHeaderLine { x, y, set: None };

            Ok((Some(line), bytes))
        }
        (Some(b), _) => Err(RleHeaderLineError::InvalidToken { got: b as char }),
    }
}

#[derive(Debug, Error)]
pub enum RleEncodingError {
    #[error("Unexpected EOF")]
    UnexpectedEof,

    #[error("Failed to convert run length: {0}")]
    RunLength(#[from] ConvertError),

    #[error("Unrecognized byte: 0x{got:0X}")]
    UnrecognizedByte { got: u8 },

    #[error("Cell coordinates overflow")]
    Overflow,

    #[error("Pattern has more than {max} alive cells")]
    TooManyCells { max: u64 },
}

/// Upper bound on the alive cells a single RLE file may describe
pub const MAX_ALIVE_CELLS: u64 = 1 << 22;

fn read_encoding<F>(
    mut bytes: &[u8],
    d_row: WorldOffset,
    d_col: WorldOffset,
    mut f: F,
) -> Result<(), RleEncodingError>
where
    F: FnMut(WorldOffset, WorldOffset),
{
    let mut rep: WorldOffset = 1;
    let mut alive: u64 = 0;

    let (mut row, mut col): (WorldOffset, WorldOffset) = (0, 0);

    loop {
        let Some(b) = parse_util::peek_1(bytes) else {
            return Err(RleEncodingError::UnexpectedEof);
        };

        match b {
            b'\r' | b'\n' | b' ' | b'\t' => {
                let (_, rest) = parse_util::take_1(bytes);
                bytes = rest;
            }

            // End of input
            b'!' => break,

            // Dead cell
            b'b' | b'.' => {
                let (_, rest) = parse_util::take_1(bytes);
                bytes = rest;

                col = col.checked_add(rep).ok_or(RleEncodingError::Overflow)?;

                rep = 1;
            }

            // Live cell
            b'o' | b'A' => {
                let (_, rest) = parse_util::take_1(bytes);
                bytes = rest;

                alive = alive.saturating_add(rep.unsigned_abs());
                if alive > MAX_ALIVE_CELLS {
                    return Err(RleEncodingError::TooManyCells {
                        max: MAX_ALIVE_CELLS,
                    });
                }

                let end = col.checked_add(rep).ok_or(RleEncodingError::Overflow)?;
                let r = d_row.checked_add(row).ok_or(RleEncodingError::Overflow)?;

                for c in col..end {
                    f(r, d_col.checked_add(c).ok_or(RleEncodingError::Overflow)?)
                }

                col = end;

                rep = 1;
            }

            // End of line
            b'$' => {
                let (_, rest) = parse_util::take_1(bytes);
                bytes = rest;

                row = row.checked_add(rep).ok_or(RleEncodingError::Overflow)?;
                col = 0;

                rep = 1;
            }

            n if n.is_ascii_digit() => {
                let (Some(n), rest) = parse_util::take_until_fn(|b| !b.is_ascii_digit(), bytes)
                else {
                    unreachable!("We peeked and found a digit")
                };
                bytes = rest;

                let n: u64 = convert(n)?;
                rep = WorldOffset::try_from(n).map_err(|_| RleEncodingError::Overflow)?;
            }

            b => return Err(RleEncodingError::UnrecognizedByte { got: b }),
        }
    }

    Ok(())
}

#[derive(Debug, Error)]
pub enum RleCoordError {
    #[error("Parse error: {0}")]
    ParseError(#[from] ParseError),

    #[error("Expected x coordinate, found end of input")]
    NoX,

    #[error("Failed to parse x coordinate: {0}")]
    ParseX(#[source] ConvertError),

    #[error("Expected y coordinate, found end of input")]
    NoY,

    #[error("Failed to parse y coordinate: {0}")]
    ParseY(#[source] ConvertError),
}

/// Reads `x = 3, y = 1`, stopping right after the `y` value.
fn read_coordinates(bytes: &[u8]) -> Result<((WorldOffset, WorldOffset), &[u8]), RleCoordError> {
    let bytes = parse_util::expect(b'x', bytes)?;
    let bytes = parse_util::take_ws_inline(bytes);
    let bytes = parse_util::expect(b'=', bytes)?;
    let bytes = parse_util::take_ws_inline(bytes);

    let (Some(x_bytes), bytes) = parse_util::take_until(b',', bytes) else {
        return Err(RleCoordError::NoX);
    };
    let x: WorldOffset = convert(x_bytes).map_err(RleCoordError::ParseX)?;

    let bytes = parse_util::expect(b',', bytes)?;
    let bytes = parse_util::take_ws_inline(bytes);
    let bytes = parse_util::expect(b'y', bytes)?;
    let bytes = parse_util::take_ws_inline(bytes);
    let bytes = parse_util::expect(b'=', bytes)?;
    let bytes = parse_util::take_ws_inline(bytes);

    // Coordinates can be terminated with either `,` or a linebreak.
    let p = |b| b == b',' || b == b'\n' || b == b'\r';
    let (Some(y_bytes), bytes) = parse_util::take_until_fn(p, bytes) else {
        return Err(RleCoordError::NoY);
    };
    let y: WorldOffset = convert(y_bytes).map_err(RleCoordError::ParseY)?;

    Ok(((x, y), bytes))
}

/// Reads the `-1 -1` of a `#P -1 -1` line.
fn read_offset(bytes: &[u8]) -> Result<((WorldOffset, WorldOffset), &[u8]), RleCoordError> {
    let bytes = parse_util::take_ws_inline(bytes);
    let (Some(x_bytes), bytes) = parse_util::take_until_ws(bytes) else {
        return Err(RleCoordError::NoX);
    };
    let x: WorldOffset = convert(x_bytes).map_err(RleCoordError::ParseX)?;

    let bytes = parse_util::take_ws_inline(bytes);
    let (Some(y_bytes), bytes) = parse_util::take_until_ws(bytes) else {
        return Err(RleCoordError::NoY);
    };
    let y: WorldOffset = convert(y_bytes).map_err(RleCoordError::ParseY)?;

    Ok(((x, y), bytes))
}
