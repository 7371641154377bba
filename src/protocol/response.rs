//! Response grammar
//!
//! Turns one raw response line into its status, result and value fields.

use crate::error::{AgiError, Result};

/// Command accepted
pub const STATUS_OK: u16 = 200;

/// Command not understood
pub const STATUS_INVALID: u16 = 510;

/// Command not permitted on a dead (hung up) channel
pub const STATUS_DEAD_CHANNEL: u16 = 511;

/// Usage error; the body of the block is the command's usage text
pub const STATUS_END_USAGE: u16 = 520;

/// Sentinel line sent when the channel hangs up mid-command
pub const HANGUP: &str = "HANGUP";

/// Structured fields of a `DDD result=RESULT[ (VALUE)]` line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    /// Three-digit status code
    pub status: u16,

    /// Result token as an integer, when it is one
    pub result: Option<i64>,

    /// Result token exactly as received
    pub result_text: String,

    /// Text between the parentheses of the trailing segment
    pub value: String,

    /// Whole trailing segment after the result token, trimmed
    /// (e.g. `endpos=12345` for STREAM FILE)
    pub trailer: String,
}

impl Reply {
    /// Whether the status is 200
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }
}

/// Parse a single response line
///
/// `HANGUP` yields [`AgiError::Hangup`], anything that is not
/// `DDD result=...` yields [`AgiError::Parse`]. A non-200 status still
/// parses; judging the status is left to the caller.
pub fn parse_response(line: &str) -> Result<Reply> {
    if line == HANGUP {
        return Err(AgiError::Hangup);
    }

    let parse_error = || AgiError::Parse {
        line: line.to_string(),
    };

    let status = parse_status(line).ok_or_else(parse_error)?;
    let rest = line
        .get(3..)
        .and_then(|rest| rest.strip_prefix(" result="))
        .ok_or_else(parse_error)?;

    let token_len = result_token_len(rest);
    let (result_text, tail) = rest.split_at(token_len);

    // The token must be followed by whitespace or the end of the line
    if tail.chars().next().is_some_and(|c| !c.is_whitespace()) {
        return Err(parse_error());
    }

    let trailer = tail.trim();
    let value = trailer
        .strip_prefix('(')
        .and_then(|inner| inner.strip_suffix(')'))
        .unwrap_or_default();

    Ok(Reply {
        status,
        result: result_text.parse().ok(),
        result_text: result_text.to_string(),
        value: value.to_string(),
        trailer: trailer.to_string(),
    })
}

/// Leading three-digit status code of a line
pub(crate) fn parse_status(line: &str) -> Option<u16> {
    let digits = line.get(..3)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Byte length of `-?[[:alnum:]]*` at the start of `s`
fn result_token_len(s: &str) -> usize {
    let sign = usize::from(s.starts_with('-'));
    sign + s[sign..]
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric())
        .count()
}
