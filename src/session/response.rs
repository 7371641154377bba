//! Command outcome
//!
//! What a single `Session::command` call produced.

use crate::error::{AgiError, Result};
use crate::protocol::Reply;

/// Outcome of one command/response exchange
///
/// Exactly one of these holds:
/// - a 200 reply and no error
/// - a non-200 reply together with [`AgiError::Status`]
/// - no reply, with a hangup, transport or parse error
#[derive(Debug)]
pub struct Response {
    reply: Option<Reply>,
    error: Option<AgiError>,
}

impl Response {
    /// Build the response for a parsed reply, flagging non-200 statuses
    pub(crate) fn from_reply(reply: Reply, raw: &str) -> Self {
        let error = (!reply.is_ok()).then(|| AgiError::Status {
            status: reply.status,
            line: raw.to_string(),
        });
        Self {
            reply: Some(reply),
            error,
        }
    }

    /// Build the response for an exchange that produced no reply
    pub(crate) fn from_error(error: AgiError) -> Self {
        Self {
            reply: None,
            error: Some(error),
        }
    }

    /// Parsed reply fields (present for any structurally valid response)
    pub fn reply(&self) -> Option<&Reply> {
        self.reply.as_ref()
    }

    /// Error raised by the exchange, if any
    pub fn error(&self) -> Option<&AgiError> {
        self.error.as_ref()
    }

    /// True when the reply carried status 200
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// True when the channel hung up during the exchange
    pub fn is_hangup(&self) -> bool {
        self.error.as_ref().is_some_and(AgiError::is_hangup)
    }

    pub fn status(&self) -> Option<u16> {
        self.reply.as_ref().map(|r| r.status)
    }

    pub fn result(&self) -> Option<i64> {
        self.reply.as_ref().and_then(|r| r.result)
    }

    pub fn result_text(&self) -> &str {
        self.reply.as_ref().map_or("", |r| r.result_text.as_str())
    }

    pub fn value(&self) -> &str {
        self.reply.as_ref().map_or("", |r| r.value.as_str())
    }

    /// Succeed only on status 200
    pub fn check(self) -> Result<()> {
        self.into_reply().map(drop)
    }

    /// The reply, or the error that replaced it
    pub fn into_reply(self) -> Result<Reply> {
        match (self.error, self.reply) {
            (Some(error), _) => Err(error),
            (None, Some(reply)) => Ok(reply),
            (None, None) => Err(AgiError::Parse {
                line: String::new(),
            }),
        }
    }

    /// The parenthesised value of a successful reply
    pub fn into_value(self) -> Result<String> {
        self.into_reply().map(|r| r.value)
    }

    /// The raw result token of a successful reply
    pub fn into_result_text(self) -> Result<String> {
        self.into_reply().map(|r| r.result_text)
    }

    /// Compact rendering used by transcripts
    ///
    /// `{Sta:200 Res:1 Str:1 Val:foo}` on success, `{Err:...}` otherwise.
    pub fn summary(&self) -> String {
        if let Some(error) = &self.error {
            return format!("{{Err:{error}}}");
        }

        let mut parts = Vec::with_capacity(4);
        if let Some(reply) = &self.reply {
            parts.push(format!("Sta:{}", reply.status));
            if let Some(result) = reply.result {
                parts.push(format!("Res:{result}"));
            }
            if !reply.result_text.is_empty() {
                parts.push(format!("Str:{}", reply.result_text));
            }
            if !reply.value.is_empty() {
                parts.push(format!("Val:{}", reply.value));
            }
        }
        format!("{{{}}}", parts.join(" "))
    }
}
