//! RECORD FILE options

use std::time::Duration;

use super::seconds;

/// Options for [`Session::record`](crate::Session::record)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordOptions {
    /// Audio format of the file
    pub format: String,

    /// Digits that end the recording; must not be empty
    pub escape_digits: String,

    /// Maximum length of the recording
    pub timeout: Duration,

    /// Stop after this much silence (whole seconds; zero disables)
    pub silence: Duration,

    /// Play a beep before recording starts
    pub beep: bool,

    /// Samples to skip at the start of the recording
    pub offset: u64,
}

impl Default for RecordOptions {
    fn default() -> Self {
        Self {
            format: "wav".to_string(),
            escape_digits: "#".to_string(),
            timeout: Duration::from_secs(5 * 60),
            silence: Duration::ZERO,
            beep: false,
            offset: 0,
        }
    }
}

impl RecordOptions {
    /// Command tokens for recording into `name`
    ///
    /// `RECORD FILE name format escape timeout_ms [offset] [BEEP] [s=secs]`
    pub(crate) fn tokens(&self, name: &str) -> Vec<String> {
        let defaults = RecordOptions::default();
        let format = non_empty(&self.format, &defaults.format);
        let escape_digits = non_empty(&self.escape_digits, &defaults.escape_digits);
        let timeout = if self.timeout.is_zero() {
            defaults.timeout
        } else {
            self.timeout
        };

        let mut tokens = vec![
            "RECORD FILE".to_string(),
            name.to_string(),
            format.to_string(),
            escape_digits.to_string(),
            timeout.as_millis().to_string(),
        ];
        if self.offset > 0 {
            tokens.push(self.offset.to_string());
        }
        if self.beep {
            tokens.push("BEEP".to_string());
        }
        if self.silence.as_secs() > 0 {
            tokens.push(format!("s={}", seconds(self.silence)));
        }
        tokens
    }
}

fn non_empty<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}
