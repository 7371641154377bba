//! Protocol Module
//!
//! Defines the AGI wire protocol spoken between Asterisk and the script.
//!
//! ## Protocol Format (line oriented, `\n` terminated)
//!
//! ### Preamble (server → script, once per session)
//! ```text
//! agi_request: hello.agi
//! agi_channel: SIP/1000-00000001
//! ...
//! <empty line>
//! ```
//!
//! ### Command (script → server)
//! ```text
//! STREAM FILE hello-world ""
//! ```
//!
//! ### Response (server → script)
//! ```text
//! DDD result=RESULT[ (VALUE)]
//! HANGUP
//! ```
//!
//! ### Status Codes
//! - 200: command accepted
//! - 510: command not understood
//! - 511: command not permitted on a dead channel
//! - 520: usage error (sent as a `520-` ... `520 ` block)

mod codec;
mod preamble;
mod response;

pub use codec::{encode_command, read_line, read_response, write_command};
pub use preamble::{read_preamble, Variables};
pub use response::{
    parse_response, Reply, HANGUP, STATUS_DEAD_CHANNEL, STATUS_END_USAGE, STATUS_INVALID,
    STATUS_OK,
};
