use std::str::FromStr;

use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unexpected end of file, expected '{exp}'")]
    UnexpectedEof { exp: char },

    #[error("Expected '{exp}', but got '{got}'")]
    UnexpectedToken { exp: char, got: char },

    #[error("Expected \"{exp}\", but got \"{got}\"")]
    UnexpectedSlice { exp: String, got: String },
}

/// Consumes the slice until a non-ascii whitespace character is reached.
pub fn take_ws(bytes: &[u8]) -> &[u8] {
    let i = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());

    &bytes[i..]
}

/// Like `take_ws` but never crosses a linebreak.
pub fn take_ws_inline(bytes: &[u8]) -> &[u8] {
    let i = bytes
        .iter()
        .position(|&b| !(b == b' ' || b == b'\t'))
        .unwrap_or(bytes.len());

    &bytes[i..]
}

/// Takes the next character from the slice. If none is found, the slice is left as-is.
pub const fn take_1(bytes: &[u8]) -> (Option<u8>, &[u8]) {
    let [b, bytes @ ..] = bytes else {
        return (None, bytes);
    };

    (Some(*b), bytes)
}

/// Like `take_1`, but doesn't consume the token
pub fn peek_1(bytes: &[u8]) -> Option<u8> {
    bytes.first().copied()
}

/// Expects the next character in `bytes` to be `b`.
pub fn expect(b: u8, bytes: &[u8]) -> ParseResult<&[u8]> {
    let (Some(a), bytes) = take_1(bytes) else {
        return Err(ParseError::UnexpectedEof { exp: b as char });
    };

    if a != b {
        return Err(ParseError::UnexpectedToken {
            exp: b as char,
            got: a as char,
        });
    }

    Ok(bytes)
}

/// Expects `bytes` to start with `bs`.
pub fn expect_slice<'a>(bs: &[u8], bytes: &'a [u8]) -> ParseResult<&'a [u8]> {
    match bytes.strip_prefix(bs) {
        Some(bytes) => Ok(bytes),
        None => {
            let n = bs.len().min(bytes.len());

            Err(ParseError::UnexpectedSlice {
                exp: String::from_utf8_lossy(bs).to_string(),
                got: String::from_utf8_lossy(&bytes[..n]).to_string(),
            })
        }
    }
}

/// Advance the slice until `P` is satisfied, without consuming the matching byte. If `P` is never
/// satisfied, the whole slice is taken.
///
/// Returns `None` when nothing was taken, in which case `bytes` is left as-is.
#[inline]
pub fn take_until_fn<P>(p: P, bytes: &[u8]) -> (Option<&[u8]>, &[u8])
where
    P: Fn(u8) -> bool,
{
    let i = bytes.iter().position(|&b| p(b)).unwrap_or(bytes.len());

    if i == 0 {
        (None, bytes)
    } else {
        let (res, bytes) = bytes.split_at(i);

        (Some(res), bytes)
    }
}

/// Advance the slice until byte `b` is found, without consuming it.
pub fn take_until(b: u8, bytes: &[u8]) -> (Option<&[u8]>, &[u8]) {
    take_until_fn(|a| a == b, bytes)
}

/// Like `take_until`, but stops at the first ascii whitespace character found, without consuming it.
pub fn take_until_ws(bytes: &[u8]) -> (Option<&[u8]>, &[u8]) {
    take_until_fn(|a| a.is_ascii_whitespace(), bytes)
}

/// Like `take_until`, but also consumes `b` without adding it to the output.
pub fn take_with(b: u8, bytes: &[u8]) -> (Option<&[u8]>, &[u8]) {
    let (res, bytes) = take_until(b, bytes);

    match take_1(bytes) {
        (Some(a), rest) if a == b => (res, rest),
        _ => (res, bytes),
    }
}

/// Takes the rest of the current line, consuming its terminator. A trailing `\r` is dropped from
/// the returned line.
pub fn take_line(bytes: &[u8]) -> (&[u8], &[u8]) {
    let (line, bytes) = take_with(b'\n', bytes);
    let line = line.unwrap_or_default();
    let line = line.strip_suffix(b"\r").unwrap_or(line);

    (line, bytes)
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConvertError {
    #[error("Input is not valid UTF-8")]
    InvalidUtf8,

    #[error("Failed to convert \"{str}\"")]
    ParseError { str: String },
}

/// Converts `&[u8]` to `T` if `T: FromStr`. Surrounding whitespace is ignored.
pub fn convert<T: FromStr>(bytes: &[u8]) -> Result<T, ConvertError> {
    let str = std::str::from_utf8(bytes).map_err(|_| ConvertError::InvalidUtf8)?;
    let str = str.trim();

    str.parse::<T>().map_err(|_| ConvertError::ParseError {
        str: str.to_string(),
    })
}
