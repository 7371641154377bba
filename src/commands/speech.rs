//! Speech (UniMRCP) helpers
//!
//! Wrap the `MRCPSynth`, `MRCPRecog` and `SynthAndRecog` dialplan
//! applications and read back the channel variables they leave behind.
//! These need the UniMRCP modules loaded in Asterisk.

use crate::error::{AgiError, Result};
use crate::session::Session;

use super::quote;

/// Result code `EXEC` returns when the application is missing
const APPLICATION_MISSING: &str = "-2";

/// Outcome of a recognition
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecognitionResult {
    /// `OK`, `ERROR` or `INTERRUPTED`
    pub status: String,

    /// 0 = success, 1 = no match, 2 = no input
    pub cause: i32,

    /// Raw NLSML returned by the MRCP server
    pub result: String,
}

/// One interpretation of the recognized speech
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecognitionInterpretation {
    /// 0-100, higher is better
    pub confidence: i32,

    /// Text of the recognized speech
    pub input: String,

    /// Grammar that matched
    pub grammar: String,
}

/// Outcome of a synthesis
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SynthResult {
    /// `OK`, `ERROR` or `INTERRUPTED`
    pub status: String,

    /// 0 = normal, 1 = barge-in, 2 = parse failure
    pub cause: i32,
}

impl Session {
    /// Speak `prompt` through MRCP
    pub fn mrcp_synth(&self, prompt: &str, options: &str) -> Result<SynthResult> {
        self.exec_mrcp("MRCPSynth", &join_options(&[prompt, options]))?;

        Ok(SynthResult {
            status: self.get("SYNTHSTATUS")?,
            cause: self.get_number("SYNTH_COMPLETION_CAUSE", "synthesis cause")?,
        })
    }

    /// Listen for speech matching `grammar`
    pub fn mrcp_recog(&self, grammar: &str, options: &str) -> Result<RecognitionResult> {
        self.exec_mrcp("MRCPRecog", &join_options(&[grammar, options]))?;
        self.recognition_result("RECOGSTATUS")
    }

    /// Speak `prompt`, then listen for speech matching `grammar`
    pub fn synth_and_recog(
        &self,
        prompt: &str,
        grammar: &str,
        options: &str,
    ) -> Result<RecognitionResult> {
        let prompt = quote(prompt);
        let options = join_options(&[prompt.as_str(), grammar, options]);
        self.exec_mrcp("SynthAndRecog", &options)?;
        self.recognition_result("RECOG_STATUS")
    }

    /// Interpretation `index` of the last recognition (0 is the best match)
    pub fn recognition_interpretation(&self, index: usize) -> Result<RecognitionInterpretation> {
        Ok(RecognitionInterpretation {
            input: self.recognition_input(index)?,
            confidence: self.recognition_confidence(index)?,
            grammar: self.recognition_grammar(index)?,
        })
    }

    pub fn recognition_input(&self, index: usize) -> Result<String> {
        self.get(&format!("RECOG_INPUT({index})"))
    }

    pub fn recognition_confidence(&self, index: usize) -> Result<i32> {
        self.get_number(&format!("RECOG_CONFIDENCE({index})"), "recognition confidence")
    }

    pub fn recognition_grammar(&self, index: usize) -> Result<String> {
        self.get(&format!("RECOG_GRAMMAR({index})"))
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn exec_mrcp(&self, application: &str, options: &str) -> Result<()> {
        if self.exec(application, options)? == APPLICATION_MISSING {
            return Err(AgiError::ApplicationUnavailable("MRCP".to_string()));
        }
        Ok(())
    }

    /// The synthesis-and-recognition combo stores its status under a
    /// different variable name than plain recognition.
    fn recognition_result(&self, status_var: &str) -> Result<RecognitionResult> {
        Ok(RecognitionResult {
            status: self.get(status_var)?,
            cause: self.get_number("RECOG_COMPLETION_CAUSE", "recognition cause")?,
            result: self.get("RECOG_RESULT")?,
        })
    }

    fn get_number(&self, name: &str, what: &'static str) -> Result<i32> {
        let value = self.get(name)?;
        value
            .trim()
            .parse()
            .map_err(|_| AgiError::InvalidValue { what, value })
    }
}

/// Join application options with commas, dropping trailing empty ones
fn join_options(options: &[&str]) -> String {
    let used = options
        .iter()
        .rposition(|o| !o.is_empty())
        .map_or(0, |last| last + 1);
    options[..used].join(",")
}
