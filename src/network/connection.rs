//! Connection Handler
//!
//! Prepares an accepted socket and turns it into a session.

use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::session::{Session, SessionBuilder, Transcript};

/// An accepted FastAGI connection that has not read its preamble yet
pub struct Connection {
    /// Accepted TCP stream
    stream: TcpStream,

    /// Peer address for logging
    peer_addr: SocketAddr,
}

impl Connection {
    /// Wrap an accepted stream, applying the socket options from `config`
    pub fn new(stream: TcpStream, peer_addr: SocketAddr, config: &Config) -> Result<Self> {
        // Commands are single short lines; don't let Nagle hold them back
        stream.set_nodelay(config.nodelay)?;

        // Deadlines are opt-in, the protocol itself has none
        stream.set_read_timeout(config.read_timeout())?;
        stream.set_write_timeout(config.write_timeout())?;

        Ok(Self { stream, peer_addr })
    }

    /// Get the peer address
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Read the preamble and hand back the session
    pub fn into_session(self, transcript: Option<Arc<dyn Transcript>>) -> Result<Session> {
        let builder = SessionBuilder::for_stream(self.stream)?;
        match transcript {
            Some(transcript) => builder.transcript(transcript).build(),
            None => builder.build(),
        }
    }

    /// Build the session and run `handler` on it (blocking)
    ///
    /// Failures before the handler starts are logged and end this
    /// connection only.
    pub fn handle<F: FnOnce(Session)>(self, transcript: Option<Arc<dyn Transcript>>, handler: F) {
        let peer_addr = self.peer_addr;
        tracing::debug!("Connection established from {}", peer_addr);

        match self.into_session(transcript) {
            Ok(session) => {
                handler(session);
                tracing::debug!("Handler finished for {}", peer_addr);
            }
            Err(e) => {
                tracing::warn!("Failed to start AGI session for {}: {}", peer_addr, e);
            }
        }
    }
}
