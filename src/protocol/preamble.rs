//! Preamble reader
//!
//! Parses the block of `key: value` lines Asterisk sends before the first
//! command.

use std::collections::HashMap;
use std::io::BufRead;

use crate::error::Result;
use super::codec::read_line;

/// Channel variables delivered in the preamble (`agi_request`, `agi_channel`, ...)
pub type Variables = HashMap<String, String>;

/// Read the preamble up to (and including) its blank-line terminator
///
/// Each line is split at the first colon, so values keep any colons of
/// their own. Lines without a colon are skipped and later duplicates
/// overwrite earlier ones. End-of-stream before the terminator is not an
/// error; whatever was read so far is returned.
pub fn read_preamble<R: BufRead>(reader: &mut R) -> Result<Variables> {
    let mut variables = Variables::new();

    while let Some(line) = read_line(reader)? {
        if line.is_empty() {
            break;
        }

        if let Some((key, value)) = line.split_once(':') {
            variables.insert(key.trim().to_string(), value.trim().to_string());
        }
    }

    Ok(variables)
}
