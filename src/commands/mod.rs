//! Commands Module
//!
//! Typed wrappers over [`Session::command`] for the common AGI commands.
//! Each one builds a token list, sends it, and reshapes the response.

mod channel;
mod record;
mod speech;

pub use channel::ChannelState;
pub use record::RecordOptions;
pub use speech::{RecognitionInterpretation, RecognitionResult, SynthResult};

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::{AgiError, Result};
use crate::session::{Response, Session};

/// Sound played by `get_data` when none is given
pub const DEFAULT_GET_DATA_SOUND: &str = "silence/1";

/// Asterisk's default `SAY DATETIME` format
pub const DEFAULT_DATETIME_FORMAT: &str = "ABdY 'digits/at' IMp";

/// Verbose level used by `verbosef`
const VERBOSEF_LEVEL: u8 = 9;

impl Session {
    // =========================================================================
    // Channel Control
    // =========================================================================

    /// Answer the channel
    pub fn answer(&self) -> Result<()> {
        self.command(&["ANSWER"]).check()
    }

    /// Hang up the channel
    pub fn hangup(&self) -> Result<()> {
        self.command(&["HANGUP"]).check()
    }

    /// Current state of the channel
    pub fn status(&self) -> Result<ChannelState> {
        let reply = self.command(&["CHANNEL STATUS"]).into_reply()?;
        reply
            .result
            .and_then(ChannelState::from_code)
            .ok_or(AgiError::InvalidValue {
                what: "channel state",
                value: reply.result_text,
            })
    }

    /// Run a dialplan application, returning its result code as text
    ///
    /// Asterisk answers `-2` when the application does not exist.
    pub fn exec(&self, application: &str, options: &str) -> Result<String> {
        let mut tokens = vec!["EXEC".to_string(), application.to_string()];
        if !options.is_empty() {
            tokens.push(quote_if_needed(options));
        }
        self.command(&tokens).into_result_text()
    }

    // =========================================================================
    // Variables
    // =========================================================================

    /// Value of a channel variable (empty when unset)
    pub fn get(&self, name: &str) -> Result<String> {
        self.command(&["GET VARIABLE", name]).into_value()
    }

    /// Set a channel variable
    pub fn set(&self, name: &str, value: &str) -> Result<()> {
        self.command(&["SET VARIABLE", name, quote_if_needed(value).as_str()])
            .check()
    }

    // =========================================================================
    // Playback and Input
    // =========================================================================

    /// Play a prompt and collect up to `max_digits` DTMF digits
    pub fn get_data(&self, sound: &str, timeout: Duration, max_digits: u32) -> Result<String> {
        let sound = if sound.is_empty() {
            DEFAULT_GET_DATA_SOUND
        } else {
            sound
        };
        self.command(&[
            "GET DATA",
            sound,
            millis(timeout).as_str(),
            max_digits.to_string().as_str(),
        ])
        .into_result_text()
    }

    /// Play a file; returns the escape digit pressed, if any
    pub fn stream_file(
        &self,
        name: &str,
        escape_digits: &str,
        offset: u64,
    ) -> Result<Option<char>> {
        let response = self.command(&[
            "STREAM FILE",
            name,
            escape(escape_digits).as_str(),
            offset.to_string().as_str(),
        ]);
        pressed_digit(response)
    }

    /// Wait up to `timeout` for a DTMF digit
    pub fn wait_for_digit(&self, timeout: Duration) -> Result<Option<char>> {
        pressed_digit(self.command(&["WAIT FOR DIGIT", millis(timeout).as_str()]))
    }

    /// Record audio from the channel into `name`
    pub fn record(&self, name: &str, options: &RecordOptions) -> Result<()> {
        self.command(&options.tokens(name)).check()
    }

    // =========================================================================
    // Say
    // =========================================================================

    /// Spell out a string character by character
    pub fn say_alpha(&self, label: &str, escape_digits: &str) -> Result<Option<char>> {
        pressed_digit(self.command(&["SAY ALPHA", label, escape(escape_digits).as_str()]))
    }

    /// Say a string of digits
    pub fn say_digits(&self, number: &str, escape_digits: &str) -> Result<Option<char>> {
        pressed_digit(self.command(&["SAY DIGITS", number, escape(escape_digits).as_str()]))
    }

    /// Say a number
    pub fn say_number(&self, number: &str, escape_digits: &str) -> Result<Option<char>> {
        pressed_digit(self.command(&["SAY NUMBER", number, escape(escape_digits).as_str()]))
    }

    /// Say a phrase using the phonetic alphabet
    pub fn say_phonetic(&self, phrase: &str, escape_digits: &str) -> Result<Option<char>> {
        pressed_digit(self.command(&["SAY PHONETIC", phrase, escape(escape_digits).as_str()]))
    }

    /// Say the date part of `when`
    pub fn say_date(&self, when: SystemTime, escape_digits: &str) -> Result<Option<char>> {
        pressed_digit(self.command(&[
            "SAY DATE",
            epoch(when).as_str(),
            escape(escape_digits).as_str(),
        ]))
    }

    /// Say the time part of `when`
    pub fn say_time(&self, when: SystemTime, escape_digits: &str) -> Result<Option<char>> {
        pressed_digit(self.command(&[
            "SAY TIME",
            epoch(when).as_str(),
            escape(escape_digits).as_str(),
        ]))
    }

    /// Say `when` using a `voicemail.conf` style format
    ///
    /// An empty format falls back to [`DEFAULT_DATETIME_FORMAT`]; without a
    /// timezone Asterisk uses its own.
    pub fn say_datetime(
        &self,
        when: SystemTime,
        escape_digits: &str,
        format: &str,
        timezone: Option<&str>,
    ) -> Result<Option<char>> {
        let format = if format.is_empty() {
            DEFAULT_DATETIME_FORMAT
        } else {
            format
        };

        let mut tokens = vec![
            "SAY DATETIME".to_string(),
            epoch(when),
            escape(escape_digits),
            quote(format),
        ];
        if let Some(zone) = timezone {
            tokens.push(zone.to_string());
        }
        pressed_digit(self.command(&tokens))
    }

    // =========================================================================
    // Logging
    // =========================================================================

    /// Send a message to the Asterisk verbose log
    pub fn verbose(&self, message: &str, level: u8) -> Result<()> {
        self.command(&["VERBOSE", quote(message).as_str(), level.to_string().as_str()])
            .check()
    }

    /// Send a formatted message at the most detailed verbose level
    ///
    /// ```ignore
    /// session.verbosef(format_args!("caller {} entered {}", caller, digits))?;
    /// ```
    pub fn verbosef(&self, args: fmt::Arguments<'_>) -> Result<()> {
        self.verbose(&args.to_string(), VERBOSEF_LEVEL)
    }
}

// =============================================================================
// Argument and Result Helpers
// =============================================================================

/// Empty escape digits must still occupy their argument slot
fn escape(digits: &str) -> String {
    if digits.is_empty() {
        "\"\"".to_string()
    } else {
        digits.to_string()
    }
}

/// Wrap an argument in double quotes, escaping quotes and backslashes
pub(crate) fn quote(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for c in s.chars() {
        match c {
            '"' | '\\' => {
                quoted.push('\\');
                quoted.push(c);
            }
            '\n' => quoted.push_str("\\n"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Quote only when Asterisk's argument splitter would alter the value
fn quote_if_needed(s: &str) -> String {
    if s.is_empty() || s.contains(|c: char| c.is_whitespace() || c == '"' || c == '\\') {
        quote(s)
    } else {
        s.to_string()
    }
}

fn millis(d: Duration) -> String {
    d.as_millis().to_string()
}

pub(crate) fn seconds(d: Duration) -> String {
    d.as_secs().to_string()
}

/// Unix timestamp; times before the epoch clamp to 0
fn epoch(when: SystemTime) -> String {
    when.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
        .to_string()
}

/// Digit reported as an ASCII code in the result
///
/// 0 means no digit was pressed; a negative result means the command
/// failed on the channel (missing file, channel error).
fn pressed_digit(response: Response) -> Result<Option<char>> {
    let reply = response.into_reply()?;
    let invalid = || AgiError::InvalidValue {
        what: "digit",
        value: reply.result_text.clone(),
    };

    match reply.result {
        Some(0) => Ok(None),
        Some(code) if code > 0 => u32::try_from(code)
            .ok()
            .and_then(char::from_u32)
            .filter(|c| !c.is_control())
            .map(Some)
            .ok_or_else(invalid),
        _ => Err(invalid()),
    }
}
