//! Session Module
//!
//! One AGI session: the transport, the preamble variables and the
//! command/response engine.
//!
//! ## Concurrency
//! - `channel`: one lock held across the whole write-then-read of a
//!   command, so concurrent callers never interleave on the wire
//! - `variables`: filled once during construction, read-only afterwards
//! - All methods use `&self`; a session can be shared behind an `Arc`

mod response;
mod transcript;

pub use response::Response;
pub use transcript::{Exchange, TracingTranscript, Transcript};

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};

use parking_lot::{Mutex, MutexGuard};

use crate::error::{AgiError, Result};
use crate::protocol::{self, Reply, Variables};

/// Where the EAGI audio stream is found in standalone mode (file descriptor 3)
pub const EAGI_FD_PATH: &str = "/dev/fd/3";

/// The command transport: buffered input and output halves
struct Channel {
    reader: Box<dyn BufRead + Send>,
    writer: Box<dyn Write + Send>,
}

/// An AGI session bound to one transport
pub struct Session {
    /// Preamble variables (`agi_request`, `agi_channel`, ...)
    variables: Variables,

    /// Command transport, locked for the duration of each command
    channel: Mutex<Channel>,

    /// Extended (EAGI) input stream, if any
    eagi: Option<Mutex<Box<dyn Read + Send>>>,

    /// Owned network connection in FastAGI mode, cleared on close
    conn: Mutex<Option<TcpStream>>,

    /// Peer address in FastAGI mode, for logging
    peer_addr: Option<SocketAddr>,

    /// Optional observer of all traffic
    transcript: Option<Box<dyn Transcript>>,
}

impl Session {
    /// Create a builder over the given input and output streams
    pub fn builder<R, W>(reader: R, writer: W) -> SessionBuilder
    where
        R: Read + Send + 'static,
        W: Write + Send + 'static,
    {
        SessionBuilder {
            reader: Box::new(BufReader::new(reader)),
            writer: Box::new(BufWriter::new(writer)),
            eagi: None,
            conn: None,
            peer_addr: None,
            transcript: None,
        }
    }

    /// Create a session over the given streams, reading the preamble
    pub fn new<R, W>(reader: R, writer: W) -> Result<Self>
    where
        R: Read + Send + 'static,
        W: Write + Send + 'static,
    {
        Self::builder(reader, writer).build()
    }

    /// Standalone AGI: stdin and stdout
    pub fn stdio() -> Result<Self> {
        Self::new(io::stdin(), io::stdout())
    }

    /// Standalone EAGI: stdin, stdout and the audio stream on fd 3
    pub fn stdio_eagi() -> Result<Self> {
        let eagi = File::open(EAGI_FD_PATH)?;
        Self::builder(io::stdin(), io::stdout()).eagi(eagi).build()
    }

    /// FastAGI: a session that owns an accepted TCP connection
    pub fn from_stream(stream: TcpStream) -> Result<Self> {
        SessionBuilder::for_stream(stream)?.build()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// All preamble variables
    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    /// A single preamble variable
    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    /// Remote address when the session runs over TCP
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer_addr
    }

    /// Exclusive access to the EAGI audio stream, if the session has one
    pub fn eagi(&self) -> Option<EagiReader<'_>> {
        self.eagi.as_ref().map(|m| EagiReader(m.lock()))
    }

    // =========================================================================
    // Command/Response Engine
    // =========================================================================

    /// Send one command and wait for its response
    ///
    /// Tokens are joined with single spaces. The session lock is held from
    /// the write until the response is parsed; there is no retry and no
    /// timeout beyond whatever the transport itself enforces.
    pub fn command<S: AsRef<str>>(&self, tokens: &[S]) -> Response {
        let command = protocol::encode_command(tokens);
        let mut raw = String::new();

        let mut channel = self.channel.lock();
        let response = match exchange(&mut channel, &command, &mut raw) {
            Ok(reply) => Response::from_reply(reply, &raw),
            Err(e) => Response::from_error(e),
        };

        tracing::trace!(command = %command, raw = %raw, "AGI exchange");
        if let Some(transcript) = &self.transcript {
            transcript.exchange(&Exchange {
                command,
                raw,
                summary: response.summary(),
            });
        }
        drop(channel);

        response
    }

    /// Release the network connection, if any
    ///
    /// Safe to call more than once; only the first call shuts the socket
    /// down. Standalone sessions have nothing to close.
    pub fn close(&self) -> Result<()> {
        let Some(conn) = self.conn.lock().take() else {
            return Ok(());
        };

        tracing::debug!(peer = ?self.peer_addr, "closing AGI session");
        match conn.shutdown(Shutdown::Both) {
            Err(e) if e.kind() != io::ErrorKind::NotConnected => Err(AgiError::Io(e)),
            _ => Ok(()),
        }
    }

    /// Whether a network connection is still held
    pub fn is_connected(&self) -> bool {
        self.conn.lock().is_some()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("variables", &self.variables)
            .field("peer_addr", &self.peer_addr)
            .field("eagi", &self.eagi.is_some())
            .field("transcript", &self.transcript.is_some())
            .finish()
    }
}

/// Write one command and read its response while the channel is locked
fn exchange(channel: &mut Channel, command: &str, raw: &mut String) -> Result<Reply> {
    protocol::write_command(&mut channel.writer, command)?;
    protocol::read_response(&mut channel.reader, raw)
}

/// Locked handle on the EAGI stream
pub struct EagiReader<'a>(MutexGuard<'a, Box<dyn Read + Send>>);

impl Read for EagiReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for [`Session`]
///
/// `build` reads the preamble before returning, so the variables are
/// complete before the first command can be issued.
pub struct SessionBuilder {
    reader: Box<dyn BufRead + Send>,
    writer: Box<dyn Write + Send>,
    eagi: Option<Box<dyn Read + Send>>,
    conn: Option<TcpStream>,
    peer_addr: Option<SocketAddr>,
    transcript: Option<Box<dyn Transcript>>,
}

impl SessionBuilder {
    /// Builder over a TCP stream; the session will own (and close) it
    pub fn for_stream(stream: TcpStream) -> Result<Self> {
        let peer_addr = stream.peer_addr().ok();
        let read_stream = stream.try_clone()?;
        let write_stream = stream.try_clone()?;

        let mut builder = Session::builder(read_stream, write_stream);
        builder.conn = Some(stream);
        builder.peer_addr = peer_addr;
        Ok(builder)
    }

    /// Attach an extended (EAGI) input stream
    pub fn eagi<E: Read + Send + 'static>(mut self, eagi: E) -> Self {
        self.eagi = Some(Box::new(eagi));
        self
    }

    /// Attach a transcript that observes the preamble and every command
    pub fn transcript<T: Transcript + 'static>(mut self, transcript: T) -> Self {
        self.transcript = Some(Box::new(transcript));
        self
    }

    /// Read the preamble and produce the session
    pub fn build(mut self) -> Result<Session> {
        let variables = protocol::read_preamble(&mut self.reader)?;

        tracing::debug!(
            peer = ?self.peer_addr,
            variables = variables.len(),
            request = variables.get("agi_request").map(String::as_str).unwrap_or("-"),
            "read AGI preamble"
        );

        if let Some(transcript) = &self.transcript {
            for (name, value) in &variables {
                transcript.variable(name, value);
            }
        }

        Ok(Session {
            variables,
            channel: Mutex::new(Channel {
                reader: self.reader,
                writer: self.writer,
            }),
            eagi: self.eagi.map(Mutex::new),
            conn: Mutex::new(self.conn),
            peer_addr: self.peer_addr,
            transcript: self.transcript,
        })
    }
}
