//! Network Module
//!
//! FastAGI server: Asterisk connects to us, one session per connection.
//!
//! ## Architecture
//! - Single acceptor loop, blocking on `accept`
//! - One thread per accepted connection running the user's handler
//! - Sessions share nothing; each owns its own socket

mod connection;
mod server;

pub use connection::Connection;
pub use server::{listen, Handler, Server};
