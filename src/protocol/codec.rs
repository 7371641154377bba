//! Protocol codec
//!
//! Line framing for commands and responses.
//!
//! ## Framing
//! - Commands: tokens joined by single spaces, one `\n` at the end
//! - Responses: one line, except for the `520-` usage block which runs
//!   until a line starting with `520 `

use std::io::{self, BufRead, Write};

use crate::error::{AgiError, Result};
use super::response::{parse_response, parse_status, Reply};

// =============================================================================
// Command Encoding
// =============================================================================

/// Join command tokens into a command line (without the trailing newline)
pub fn encode_command<S: AsRef<str>>(tokens: &[S]) -> String {
    tokens
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Write a command line followed by `\n` and flush it
///
/// The line is assembled first so that it reaches the stream in a single
/// `write_all`.
pub fn write_command<W: Write + ?Sized>(writer: &mut W, command: &str) -> Result<()> {
    let mut line = String::with_capacity(command.len() + 1);
    line.push_str(command);
    line.push('\n');

    writer.write_all(line.as_bytes())?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Line Reading
// =============================================================================

/// Read one line, stripping its `\n` or `\r\n` terminator
///
/// Returns `None` at end-of-stream. Invalid UTF-8 is replaced rather than
/// rejected.
pub fn read_line<R: BufRead + ?Sized>(reader: &mut R) -> Result<Option<String>> {
    let mut buf = Vec::new();
    if reader.read_until(b'\n', &mut buf)? == 0 {
        return Ok(None);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }

    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}

/// Read and parse the response to one command
///
/// Leading empty lines are skipped. `raw` receives the text that was read
/// (all lines of a usage block, joined by `\n`) so callers can log it
/// whatever the outcome.
pub fn read_response<R: BufRead + ?Sized>(reader: &mut R, raw: &mut String) -> Result<Reply> {
    raw.clear();

    let line = loop {
        match read_line(reader)? {
            Some(line) if line.is_empty() => continue,
            Some(line) => break line,
            None => return Err(closed_before_response()),
        }
    };
    raw.push_str(&line);

    match usage_block_status(&line) {
        Some(status) => read_usage_block(reader, status, &line, raw),
        None => parse_response(&line),
    }
}

/// Status of a line that opens a `DDD-` continuation block
fn usage_block_status(line: &str) -> Option<u16> {
    let status = parse_status(line)?;
    (line.as_bytes().get(3) == Some(&b'-')).then_some(status)
}

/// Collect a `DDD-...` block up to its `DDD ...` terminator
///
/// The usage text (everything between the opening and closing lines)
/// becomes the reply value.
fn read_usage_block<R: BufRead + ?Sized>(
    reader: &mut R,
    status: u16,
    first: &str,
    raw: &mut String,
) -> Result<Reply> {
    let terminator = format!("{status} ");
    let mut usage: Vec<String> = Vec::new();

    loop {
        let line = read_line(reader)?.ok_or_else(closed_before_response)?;
        raw.push('\n');
        raw.push_str(&line);

        if line.starts_with(&terminator) {
            break;
        }
        usage.push(line);
    }

    Ok(Reply {
        status,
        result: None,
        result_text: String::new(),
        value: usage.join("\n"),
        trailer: first.get(4..).unwrap_or_default().trim().to_string(),
    })
}

fn closed_before_response() -> AgiError {
    AgiError::Io(io::Error::new(
        io::ErrorKind::UnexpectedEof,
        "stream closed before a response was received",
    ))
}
