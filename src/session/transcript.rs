//! Session transcripts
//!
//! A transcript observes what a session sends and receives without
//! affecting it. One is attached per session through
//! [`SessionBuilder::transcript`](super::SessionBuilder::transcript).

use std::fmt;
use std::sync::Arc;

use crossbeam::channel::Sender;

/// One command/response pair as seen on the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    /// Command line as sent, without its newline
    pub command: String,

    /// Raw response text (empty if nothing was read)
    pub raw: String,

    /// Compact rendering of the outcome, see [`Response::summary`](super::Response::summary)
    pub summary: String,
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} -> {} -> {}", self.command, self.raw, self.summary)
    }
}

/// Observer of a session's preamble and command traffic
pub trait Transcript: Send + Sync {
    /// Called once per preamble variable when the session is built
    fn variable(&self, _name: &str, _value: &str) {}

    /// Called after every command, whatever its outcome
    fn exchange(&self, exchange: &Exchange);
}

/// Transcript that writes to `tracing` at debug level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTranscript;

impl Transcript for TracingTranscript {
    fn variable(&self, name: &str, value: &str) {
        tracing::debug!(target: "fastagi::transcript", "${}={}", name, value);
    }

    fn exchange(&self, exchange: &Exchange) {
        tracing::debug!(target: "fastagi::transcript", "{}", exchange);
    }
}

/// Forwards exchanges to a channel; a disconnected receiver is ignored
impl Transcript for Sender<Exchange> {
    fn exchange(&self, exchange: &Exchange) {
        let _ = self.send(exchange.clone());
    }
}

/// Lets one transcript be shared by many sessions (e.g. all server sessions)
impl<T: Transcript + ?Sized> Transcript for Arc<T> {
    fn variable(&self, name: &str, value: &str) {
        (**self).variable(name, value)
    }

    fn exchange(&self, exchange: &Exchange) {
        (**self).exchange(exchange)
    }
}
