//! Channel state
//!
//! States reported by `CHANNEL STATUS`, numbered as in Asterisk.

use std::fmt;

/// Asterisk channel state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ChannelState {
    /// Channel is down and available
    Down = 0,
    /// Channel is down, but reserved
    Reserved = 1,
    /// Channel is off hook
    OffHook = 2,
    /// Digits (or equivalent) have been dialed
    Dialing = 3,
    /// Line is ringing
    Ring = 4,
    /// Remote end is ringing (we are receiving ringback)
    Ringing = 5,
    /// Line is up
    Up = 6,
    /// Line is busy
    Busy = 7,
    /// Digits have been dialed while off hook
    DialingOffHook = 8,
    /// Incoming call detected, waiting for ring
    PreRing = 9,
}

impl ChannelState {
    /// Map the numeric state code
    pub fn from_code(code: i64) -> Option<Self> {
        let state = match code {
            0 => ChannelState::Down,
            1 => ChannelState::Reserved,
            2 => ChannelState::OffHook,
            3 => ChannelState::Dialing,
            4 => ChannelState::Ring,
            5 => ChannelState::Ringing,
            6 => ChannelState::Up,
            7 => ChannelState::Busy,
            8 => ChannelState::DialingOffHook,
            9 => ChannelState::PreRing,
            _ => return None,
        };
        Some(state)
    }

    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelState::Down => "Down",
            ChannelState::Reserved => "Rsrvd",
            ChannelState::OffHook => "OffHook",
            ChannelState::Dialing => "Dialing",
            ChannelState::Ring => "Ring",
            ChannelState::Ringing => "Ringing",
            ChannelState::Up => "Up",
            ChannelState::Busy => "Busy",
            ChannelState::DialingOffHook => "Dialing Offhook",
            ChannelState::PreRing => "Pre-ring",
        }
    }
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
