//! # fastagi
//!
//! A client for the Asterisk Gateway Interface (AGI):
//! - Standalone scripts talking to Asterisk over stdin/stdout (plus the
//!   EAGI audio stream on fd 3)
//! - A FastAGI server that accepts connections from Asterisk and runs one
//!   handler per call, each on its own thread
//! - Typed wrappers for the common AGI commands
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │              FastAGI Server (network::Server)                │
//! │            accept loop, one thread per connection            │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ TcpStream            stdin/stdout
//! ┌─────────────────────▼──────────────────────────▼────────────┐
//! │                         Session                              │
//! │      preamble variables · command lock · transcript          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  Preamble   │          │  Response   │
//!   │   Reader    │          │   Grammar   │
//!   └─────────────┘          └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use fastagi::network::listen;
//! use fastagi::Session;
//!
//! fn main() -> fastagi::Result<()> {
//!     listen(Some("0.0.0.0:4573"), |session: Session| {
//!         let _ = session.answer();
//!         let _ = session.stream_file("hello-world", "", 0);
//!         let _ = session.hangup();
//!         let _ = session.close();
//!     })
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod session;
pub mod network;
pub mod commands;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{AgiError, Result};
pub use config::{Config, DEFAULT_LISTEN_ADDR};
pub use protocol::{Reply, Variables};
pub use session::{Exchange, Response, Session, SessionBuilder, TracingTranscript, Transcript};
pub use commands::{ChannelState, RecordOptions};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of fastagi
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
