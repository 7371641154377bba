//! TCP Server
//!
//! Accepts FastAGI connections and runs a handler per connection on its
//! own thread.

use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::thread;

use crate::config::{Config, DEFAULT_LISTEN_ADDR};
use crate::error::{AgiError, Result};
use crate::session::{Session, Transcript};

use super::Connection;

/// Per-connection session handler
///
/// Implemented for any `Fn(Session)` closure that can be shared across
/// threads.
pub trait Handler: Send + Sync + 'static {
    fn handle(&self, session: Session);
}

impl<F> Handler for F
where
    F: Fn(Session) + Send + Sync + 'static,
{
    fn handle(&self, session: Session) {
        self(session)
    }
}

/// FastAGI server
pub struct Server {
    config: Config,
    listener: TcpListener,
    local_addr: SocketAddr,
    transcript: Option<Arc<dyn Transcript>>,
}

impl Server {
    /// Bind the listening socket; failing to bind is fatal
    pub fn bind(config: Config) -> Result<Self> {
        config.validate()?;

        let listener = TcpListener::bind(config.listen_addr.as_str()).map_err(|source| {
            AgiError::Bind {
                addr: config.listen_addr.clone(),
                source,
            }
        })?;
        let local_addr = listener.local_addr()?;

        tracing::info!("FastAGI server listening on {}", local_addr);

        Ok(Self {
            config,
            listener,
            local_addr,
            transcript: None,
        })
    }

    /// Attach a transcript shared by every session this server creates
    pub fn transcript<T: Transcript + 'static>(mut self, transcript: T) -> Self {
        self.transcript = Some(Arc::new(transcript));
        self
    }

    /// Address the listener is bound to (useful with port 0)
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Accept connections until `accept` fails (blocking)
    ///
    /// Every connection gets a fresh session and its own handler thread.
    /// Handler failures and panics stay on that thread; only an accept
    /// error stops the loop.
    pub fn run<H: Handler>(&self, handler: H) -> Result<()> {
        let handler = Arc::new(handler);

        loop {
            let (stream, peer_addr) = self.listener.accept().map_err(AgiError::Accept)?;
            tracing::trace!("Accepted connection from {}", peer_addr);

            let connection = match Connection::new(stream, peer_addr, &self.config) {
                Ok(connection) => connection,
                Err(e) => {
                    tracing::warn!("Failed to configure connection from {}: {}", peer_addr, e);
                    continue;
                }
            };

            let handler = Arc::clone(&handler);
            let transcript = self.transcript.clone();
            let spawned = thread::Builder::new()
                .name(format!("agi-{peer_addr}"))
                .spawn(move || connection.handle(transcript, |session| handler.handle(session)));

            if let Err(e) = spawned {
                tracing::warn!("Failed to spawn handler for {}: {}", peer_addr, e);
            }
        }
    }
}

/// Serve `handler` on `addr` (default `localhost:4573`) until accept fails
pub fn listen<H: Handler>(addr: Option<&str>, handler: H) -> Result<()> {
    let addr = addr.filter(|a| !a.is_empty()).unwrap_or(DEFAULT_LISTEN_ADDR);
    let config = Config::builder().listen_addr(addr).build();

    Server::bind(config)?.run(handler)
}
